use anyhow::{Context, Result};
use clap::Parser;
use inkveil::config::Config;
use inkveil::draw::SurfaceSize;
use inkveil::export::{self, FileSaveConfig};
use inkveil::input::{OverlaySettings, OverlayState};
use inkveil::runtime::OverlayLoop;
use inkveil::script::Script;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "inkveil")]
#[command(
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("INKVEIL_GIT_HASH"), ")"),
    about = "Translucent drawing overlay engine: replay gestures and export the canvas"
)]
struct Cli {
    /// Gesture script to replay (TOML list of [[step]] tables)
    #[arg(long, short = 's', value_name = "FILE")]
    script: Option<PathBuf>,

    /// Write the exported PNG here instead of the configured export directory
    #[arg(long, short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,

    /// PNG to composite the drawing onto (defaults to the canvas background color)
    #[arg(long, short = 'b', value_name = "FILE")]
    background: Option<PathBuf>,

    /// Canvas width in logical pixels
    #[arg(long, default_value_t = 800)]
    width: i32,

    /// Canvas height in logical pixels
    #[arg(long, default_value_t = 600)]
    height: i32,

    /// Device scale factor applied to the canvas
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Config file to use instead of ~/.config/inkveil/config.toml
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let Some(script_path) = cli.script.as_deref() else {
        println!("inkveil: translucent drawing overlay engine");
        println!();
        println!("Usage:");
        println!("  inkveil --script gestures.toml --output drawing.png");
        println!("  inkveil --script gestures.toml --background screen.png");
        println!("  inkveil --help");
        println!();
        println!("Script steps: down, move, up, stroke, brush, mode, style,");
        println!("              undo, redo, reset, fill, cancel, wait_fade");
        return Ok(());
    };

    let config = match cli.config.as_deref() {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let script = Script::load(script_path)?;

    let size = SurfaceSize::new(cli.width, cli.height, cli.scale)
        .context("Invalid canvas dimensions")?;
    let mut state = OverlayState::new(OverlaySettings::from(&config));
    state.configure_surface(size)?;

    let mut overlay = OverlayLoop::new(state)?;
    let stats = script.replay(&mut overlay)?;
    log::info!(
        "Replayed {} step(s): {} stroke(s), {} undo, {} redo",
        stats.steps,
        stats.strokes,
        stats.undone,
        stats.redone
    );
    let state = overlay.into_state();

    let image = match cli.background.as_deref() {
        Some(path) => {
            let bytes = fs::read(path)
                .with_context(|| format!("Failed to read background {}", path.display()))?;
            let background = export::decode_png(&bytes)
                .with_context(|| format!("Invalid background image {}", path.display()))?;
            state.export_image(&background)?
        }
        None => state.export_on_color(state.background())?,
    };
    let png = export::encode_png(&image)?;

    let saved = match cli.output {
        Some(path) => {
            export::write_png(&path, &png)?;
            path
        }
        None => export::save_png(&png, &FileSaveConfig::from(&config.export))?,
    };

    println!("Saved {}", saved.display());
    Ok(())
}
