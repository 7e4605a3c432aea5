//! Raster layers backing the overlay canvas.

use crate::error::OverlayError;
use cairo::{Context, Format, ImageSurface};

/// Logical surface size plus the device scale factor.
///
/// Layers are allocated at `width * scale` by `height * scale` pixels, while
/// pointer coordinates stay in logical units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSize {
    pub width: i32,
    pub height: i32,
    pub scale: f64,
}

impl SurfaceSize {
    pub fn new(width: i32, height: i32, scale: f64) -> Result<Self, OverlayError> {
        let size = Self {
            width,
            height,
            scale,
        };
        if width <= 0 || height <= 0 || !scale.is_finite() || scale <= 0.0 {
            return Err(OverlayError::InvalidSurfaceSize {
                width,
                height,
                scale,
            });
        }
        Ok(size)
    }

    /// Width of the backing raster in device pixels.
    pub fn pixel_width(&self) -> i32 {
        ((self.width as f64) * self.scale).round().max(1.0) as i32
    }

    /// Height of the backing raster in device pixels.
    pub fn pixel_height(&self) -> i32 {
        ((self.height as f64) * self.scale).round().max(1.0) as i32
    }
}

/// One ARGB raster buffer with its own compositing opacity.
///
/// `has_content` is a cheap emptiness hint: it is set by every draw and reset by
/// [`Layer::clear`], so it may report content for a layer whose pixels happen
/// to be transparent, never the other way around.
pub struct Layer {
    surface: ImageSurface,
    scale: f64,
    opacity: f64,
    has_content: bool,
}

impl Layer {
    /// Allocates a transparent layer for the given surface size.
    pub fn new(size: SurfaceSize) -> Result<Self, OverlayError> {
        let surface = ImageSurface::create(Format::ARgb32, size.pixel_width(), size.pixel_height())?;
        Ok(Self {
            surface,
            scale: size.scale,
            opacity: 1.0,
            has_content: false,
        })
    }

    /// Context in logical coordinates (device scale applied).
    pub fn draw_context(&mut self) -> Result<Context, OverlayError> {
        let ctx = Context::new(&self.surface)?;
        ctx.scale(self.scale, self.scale);
        self.has_content = true;
        Ok(ctx)
    }

    /// Context in raw device pixels, for layer-to-layer compositing.
    pub fn pixel_context(&mut self) -> Result<Context, OverlayError> {
        let ctx = Context::new(&self.surface)?;
        self.has_content = true;
        Ok(ctx)
    }

    /// Makes every pixel fully transparent.
    pub fn clear(&mut self) -> Result<(), OverlayError> {
        let ctx = Context::new(&self.surface)?;
        ctx.set_operator(cairo::Operator::Clear);
        ctx.paint()?;
        self.has_content = false;
        Ok(())
    }

    /// Deep copy of the current pixels.
    pub fn snapshot(&self) -> Result<ImageSurface, OverlayError> {
        copy_surface(&self.surface)
    }

    /// Replaces the pixels with `image`, returning the previous buffer.
    pub fn replace(&mut self, image: ImageSurface) -> Result<ImageSurface, OverlayError> {
        if image.width() != self.surface.width() || image.height() != self.surface.height() {
            return Err(OverlayError::SurfaceMismatch {
                width: self.surface.width(),
                height: self.surface.height(),
                found_width: image.width(),
                found_height: image.height(),
            });
        }
        self.has_content = true;
        Ok(std::mem::replace(&mut self.surface, image))
    }

    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn is_empty(&self) -> bool {
        !self.has_content
    }
}

/// Copies a surface pixel-for-pixel into a freshly allocated one.
pub fn copy_surface(source: &ImageSurface) -> Result<ImageSurface, OverlayError> {
    let copy = ImageSurface::create(source.format(), source.width(), source.height())?;
    {
        let ctx = Context::new(&copy)?;
        ctx.set_operator(cairo::Operator::Source);
        ctx.set_source_surface(source, 0.0, 0.0)?;
        ctx.paint()?;
    }
    copy.flush();
    Ok(copy)
}

/// Reads one pixel as premultiplied `[r, g, b, a]` bytes.
///
/// Requires exclusive access to the surface (no live contexts or clones).
pub fn read_pixel(surface: &mut ImageSurface, x: i32, y: i32) -> Result<[u8; 4], OverlayError> {
    if x < 0 || y < 0 || x >= surface.width() || y >= surface.height() {
        return Err(OverlayError::PixelOutOfBounds { x, y });
    }
    surface.flush();
    let stride = surface.stride() as usize;
    let data = surface
        .data()
        .map_err(|err| OverlayError::SurfaceBorrow(err.to_string()))?;
    let offset = y as usize * stride + x as usize * 4;
    let argb = u32::from_ne_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ]);
    Ok([
        (argb >> 16) as u8,
        (argb >> 8) as u8,
        argb as u8,
        (argb >> 24) as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size() -> SurfaceSize {
        SurfaceSize::new(20, 10, 1.0).unwrap()
    }

    #[test]
    fn surface_size_rejects_degenerate_dimensions() {
        assert!(SurfaceSize::new(0, 10, 1.0).is_err());
        assert!(SurfaceSize::new(10, -1, 1.0).is_err());
        assert!(SurfaceSize::new(10, 10, 0.0).is_err());
        assert!(SurfaceSize::new(10, 10, f64::NAN).is_err());
    }

    #[test]
    fn scale_multiplies_pixel_dimensions() {
        let size = SurfaceSize::new(100, 50, 2.0).unwrap();
        assert_eq!((size.pixel_width(), size.pixel_height()), (200, 100));
        let layer = Layer::new(size).unwrap();
        assert_eq!(layer.surface().width(), 200);
        assert_eq!(layer.surface().height(), 100);
    }

    #[test]
    fn clear_resets_pixels_and_content_flag() {
        let mut layer = Layer::new(size()).unwrap();
        assert!(layer.is_empty());
        {
            let ctx = layer.draw_context().unwrap();
            ctx.set_source_rgb(1.0, 0.0, 0.0);
            ctx.paint().unwrap();
        }
        assert!(!layer.is_empty());

        layer.clear().unwrap();
        assert!(layer.is_empty());
        let mut snapshot = layer.snapshot().unwrap();
        assert_eq!(read_pixel(&mut snapshot, 5, 5).unwrap(), [0, 0, 0, 0]);
    }

    #[test]
    fn snapshot_is_independent_of_later_drawing() {
        let mut layer = Layer::new(size()).unwrap();
        let mut before = layer.snapshot().unwrap();
        {
            let ctx = layer.draw_context().unwrap();
            ctx.set_source_rgb(0.0, 0.0, 1.0);
            ctx.paint().unwrap();
        }
        let mut after = layer.snapshot().unwrap();
        assert_eq!(read_pixel(&mut before, 3, 3).unwrap(), [0, 0, 0, 0]);
        assert_eq!(read_pixel(&mut after, 3, 3).unwrap(), [0, 0, 255, 255]);
    }

    #[test]
    fn replace_rejects_mismatched_sizes() {
        let mut layer = Layer::new(size()).unwrap();
        let other = ImageSurface::create(Format::ARgb32, 5, 5).unwrap();
        let err = layer.replace(other).unwrap_err();
        let (width, height) = (size().pixel_width(), size().pixel_height());
        assert!(matches!(
            err,
            OverlayError::SurfaceMismatch { width: w, height: h, found_width: 5, found_height: 5 }
                if w == width && h == height
        ));
    }

    #[test]
    fn read_pixel_rejects_out_of_bounds() {
        let mut surface = ImageSurface::create(Format::ARgb32, 4, 4).unwrap();
        assert!(read_pixel(&mut surface, 4, 0).is_err());
        assert!(read_pixel(&mut surface, 0, -1).is_err());
    }
}
