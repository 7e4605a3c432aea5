use std::path::PathBuf;
use std::process::Command;

/// Embeds `INKVEIL_GIT_HASH` for `inkveil --version`.
///
/// Outside a git checkout (crate tarballs, vendored builds) the hash is
/// reported as "unknown".
fn main() {
    let hash = git(&["describe", "--always", "--dirty", "--abbrev=8"])
        .unwrap_or_else(|| "unknown".to_owned());
    println!("cargo:rustc-env=INKVEIL_GIT_HASH={hash}");
    println!("cargo:rerun-if-env-changed=GIT_DIR");

    if let Some(git_dir) = git(&["rev-parse", "--git-dir"]).map(PathBuf::from) {
        for watched in ["HEAD", "index", "packed-refs"] {
            let path = git_dir.join(watched);
            if path.exists() {
                println!("cargo:rerun-if-changed={}", path.display());
            }
        }
    }
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_owned();
    (!text.is_empty()).then_some(text)
}
