//! Two-layer raster compositor.
//!
//! The compositor owns two layers of identical size:
//! - the *committed* layer holds permanent content and is the unit of undo/redo
//! - the *scratch* layer holds the stroke in progress (or a fading one) and is
//!   blended on top at its own opacity
//!
//! Strokes only ever touch the scratch layer. [`Compositor::flatten`] is the one
//! path that merges scratch into committed.

use super::brush::{BrushStyle, stroke_rule};
use super::color::Color;
use super::geometry::{ArrowGeometry, Point};
use super::layer::{Layer, SurfaceSize};
use super::render;
use crate::error::OverlayError;
use crate::input::BrushType;
use cairo::ImageSurface;
use log::debug;

pub struct Compositor {
    size: SurfaceSize,
    committed: Layer,
    scratch: Layer,
}

impl Compositor {
    /// Allocates both layers for the given surface size.
    pub fn new(size: SurfaceSize) -> Result<Self, OverlayError> {
        debug!(
            "Allocating canvas layers: {}x{} px (scale {})",
            size.pixel_width(),
            size.pixel_height(),
            size.scale
        );
        Ok(Self {
            size,
            committed: Layer::new(size)?,
            scratch: Layer::new(size)?,
        })
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Strokes one segment into the scratch layer on top of its current content.
    ///
    /// The scratch opacity is set to `style.opacity` afterwards; the stroke itself
    /// is rasterized opaque.
    pub fn draw_segment(
        &mut self,
        from: Point,
        to: Point,
        style: &BrushStyle,
        brush: BrushType,
        background: Color,
    ) -> Result<(), OverlayError> {
        let rule = stroke_rule(brush);
        let ctx = self.scratch.draw_context()?;
        render::render_segment(&ctx, from, to, &rule, rule.color(style, background), style.width)?;
        self.scratch.set_opacity(style.opacity);
        Ok(())
    }

    /// Draws the arrowhead for a shaft from `start` to `end` into the scratch layer.
    ///
    /// Returns the two tail points that were stroked.
    pub fn draw_arrow_head(
        &mut self,
        start: Point,
        end: Point,
        style: &BrushStyle,
        geometry: &ArrowGeometry,
    ) -> Result<[Point; 2], OverlayError> {
        let tails = geometry.tails(start, end, style.width);
        let ctx = self.scratch.draw_context()?;
        render::render_arrow_head(&ctx, end, tails, style.color.opaque(), style.width)?;
        Ok(tails)
    }

    /// Blends scratch onto committed at the scratch opacity, then clears scratch.
    pub fn flatten(&mut self) -> Result<(), OverlayError> {
        if !self.scratch.is_empty() {
            let ctx = self.committed.pixel_context()?;
            render::paint_layer(&ctx, self.scratch.surface(), self.scratch.opacity())?;
        }
        self.scratch.clear()
    }

    /// Empties both layers.
    pub fn clear(&mut self) -> Result<(), OverlayError> {
        self.scratch.clear()?;
        self.committed.clear()
    }

    /// Empties the scratch layer only.
    pub fn clear_scratch(&mut self) -> Result<(), OverlayError> {
        self.scratch.clear()
    }

    /// Floods the committed layer with a solid color.
    pub fn fill(&mut self, color: Color) -> Result<(), OverlayError> {
        let ctx = self.committed.pixel_context()?;
        render::fill_solid(&ctx, color)
    }

    /// Deep copy of the committed layer.
    pub fn committed_snapshot(&self) -> Result<ImageSurface, OverlayError> {
        self.committed.snapshot()
    }

    /// Deep copy of the scratch layer (without its opacity applied).
    pub fn scratch_snapshot(&self) -> Result<ImageSurface, OverlayError> {
        self.scratch.snapshot()
    }

    /// Swaps in a new committed image, returning the one it replaces.
    pub fn replace_committed(&mut self, image: ImageSurface) -> Result<ImageSurface, OverlayError> {
        self.committed.replace(image)
    }

    pub fn scratch_opacity(&self) -> f64 {
        self.scratch.opacity()
    }

    pub fn set_scratch_opacity(&mut self, opacity: f64) {
        self.scratch.set_opacity(opacity);
    }

    pub fn scratch_is_empty(&self) -> bool {
        self.scratch.is_empty()
    }

    /// Paints what the overlay currently shows: committed, then scratch on top.
    ///
    /// `ctx` is expected to target a surface of the same pixel size.
    pub fn render(&self, ctx: &cairo::Context) -> Result<(), OverlayError> {
        render::paint_layer(ctx, self.committed.surface(), 1.0)?;
        if !self.scratch.is_empty() {
            render::paint_layer(ctx, self.scratch.surface(), self.scratch.opacity())?;
        }
        Ok(())
    }

    /// Renders `background` with the committed layer on top at native resolution.
    ///
    /// The in-progress scratch layer is not part of the export.
    pub fn composite_for_export(
        &self,
        background: &ImageSurface,
    ) -> Result<ImageSurface, OverlayError> {
        let (width, height) = (self.size.pixel_width(), self.size.pixel_height());
        let output = ImageSurface::create(cairo::Format::ARgb32, width, height)?;
        {
            let ctx = cairo::Context::new(&output)?;
            render::paint_background(&ctx, background, width, height)?;
            render::paint_layer(&ctx, self.committed.surface(), 1.0)?;
        }
        output.flush();
        Ok(output)
    }
}

/// Builds a solid-color image matching a surface size, for exports without a
/// host-provided background.
pub fn solid_background(size: SurfaceSize, color: Color) -> Result<ImageSurface, OverlayError> {
    let image = ImageSurface::create(
        cairo::Format::ARgb32,
        size.pixel_width(),
        size.pixel_height(),
    )?;
    {
        let ctx = cairo::Context::new(&image)?;
        render::fill_solid(&ctx, color)?;
    }
    image.flush();
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::{BLUE, RED, WHITE};
    use crate::draw::layer::read_pixel;

    fn compositor() -> Compositor {
        Compositor::new(SurfaceSize::new(100, 100, 1.0).unwrap()).unwrap()
    }

    fn style(color: Color, width: f64) -> BrushStyle {
        BrushStyle {
            color,
            width,
            opacity: 1.0,
        }
    }

    #[test]
    fn segment_draws_into_scratch_only() {
        let mut comp = compositor();
        comp.draw_segment(
            Point::new(10.0, 50.0),
            Point::new(90.0, 50.0),
            &style(RED, 6.0),
            BrushType::Round,
            WHITE,
        )
        .unwrap();

        let mut scratch = comp.scratch_snapshot().unwrap();
        let mut committed = comp.committed_snapshot().unwrap();
        assert_eq!(read_pixel(&mut scratch, 50, 50).unwrap(), [255, 0, 0, 255]);
        assert_eq!(read_pixel(&mut committed, 50, 50).unwrap(), [0, 0, 0, 0]);
    }

    #[test]
    fn segments_accumulate_on_scratch() {
        let mut comp = compositor();
        let brush = style(BLUE, 4.0);
        comp.draw_segment(Point::new(10.0, 20.0), Point::new(40.0, 20.0), &brush, BrushType::Round, WHITE)
            .unwrap();
        comp.draw_segment(Point::new(40.0, 20.0), Point::new(40.0, 80.0), &brush, BrushType::Round, WHITE)
            .unwrap();

        let mut scratch = comp.scratch_snapshot().unwrap();
        assert_eq!(read_pixel(&mut scratch, 20, 20).unwrap()[3], 255);
        assert_eq!(read_pixel(&mut scratch, 40, 70).unwrap()[3], 255);
    }

    #[test]
    fn segment_sets_scratch_opacity_from_style() {
        let mut comp = compositor();
        let brush = BrushStyle {
            color: RED,
            width: 4.0,
            opacity: 0.25,
        };
        comp.draw_segment(Point::new(10.0, 10.0), Point::new(20.0, 10.0), &brush, BrushType::Round, WHITE)
            .unwrap();
        assert_eq!(comp.scratch_opacity(), 0.25);

        // Stroke pixels stay opaque; opacity applies when compositing.
        let mut scratch = comp.scratch_snapshot().unwrap();
        assert_eq!(read_pixel(&mut scratch, 15, 10).unwrap()[3], 255);
    }

    #[test]
    fn flatten_moves_scratch_into_committed() {
        let mut comp = compositor();
        comp.draw_segment(
            Point::new(10.0, 50.0),
            Point::new(90.0, 50.0),
            &style(RED, 6.0),
            BrushType::Square,
            WHITE,
        )
        .unwrap();
        comp.flatten().unwrap();

        assert!(comp.scratch_is_empty());
        let mut committed = comp.committed_snapshot().unwrap();
        let mut scratch = comp.scratch_snapshot().unwrap();
        assert_eq!(read_pixel(&mut committed, 50, 50).unwrap(), [255, 0, 0, 255]);
        assert_eq!(read_pixel(&mut scratch, 50, 50).unwrap(), [0, 0, 0, 0]);
    }

    #[test]
    fn flatten_blends_at_scratch_opacity() {
        let mut comp = compositor();
        let brush = BrushStyle {
            color: RED,
            width: 10.0,
            opacity: 0.5,
        };
        comp.draw_segment(Point::new(10.0, 50.0), Point::new(90.0, 50.0), &brush, BrushType::Round, WHITE)
            .unwrap();
        comp.flatten().unwrap();

        let [r, _, _, a] = read_pixel(&mut comp.committed_snapshot().unwrap(), 50, 50).unwrap();
        assert!((120..=135).contains(&a), "alpha was {a}");
        assert_eq!(r, a); // premultiplied pure red
    }

    #[test]
    fn eraser_paints_background_color() {
        let mut comp = compositor();
        comp.draw_segment(
            Point::new(10.0, 50.0),
            Point::new(90.0, 50.0),
            &style(RED, 20.0),
            BrushType::Round,
            WHITE,
        )
        .unwrap();
        comp.flatten().unwrap();

        comp.draw_segment(
            Point::new(10.0, 50.0),
            Point::new(90.0, 50.0),
            &style(BLUE, 8.0),
            BrushType::Eraser,
            WHITE,
        )
        .unwrap();
        comp.flatten().unwrap();

        let mut committed = comp.committed_snapshot().unwrap();
        assert_eq!(read_pixel(&mut committed, 50, 50).unwrap(), [255, 255, 255, 255]);
        // Outside the eraser path the red stroke survives.
        assert_eq!(read_pixel(&mut committed, 50, 58).unwrap(), [255, 0, 0, 255]);
    }

    #[test]
    fn zero_length_segment_renders_a_dot() {
        let mut comp = compositor();
        let tap = Point::new(50.0, 50.0);
        comp.draw_segment(tap, tap, &style(RED, 10.0), BrushType::Round, WHITE)
            .unwrap();

        let mut scratch = comp.scratch_snapshot().unwrap();
        assert_eq!(read_pixel(&mut scratch, 50, 50).unwrap()[3], 255);
        assert_eq!(read_pixel(&mut scratch, 53, 50).unwrap()[3], 255);
        assert_eq!(read_pixel(&mut scratch, 50, 46).unwrap()[3], 255);
        assert_eq!(read_pixel(&mut scratch, 58, 50).unwrap()[3], 0);
        assert_eq!(read_pixel(&mut scratch, 50, 41).unwrap()[3], 0);
    }

    #[test]
    fn square_tap_renders_a_square() {
        let mut comp = compositor();
        let tap = Point::new(50.0, 50.0);
        comp.draw_segment(tap, tap, &style(RED, 10.0), BrushType::Square, WHITE)
            .unwrap();

        let mut scratch = comp.scratch_snapshot().unwrap();
        // Corner of the square, outside the inscribed circle.
        assert_eq!(read_pixel(&mut scratch, 45, 45).unwrap()[3], 255);
        assert_eq!(read_pixel(&mut scratch, 56, 50).unwrap()[3], 0);
    }

    #[test]
    fn dotted_brush_leaves_gaps() {
        let mut comp = compositor();
        comp.draw_segment(
            Point::new(0.0, 50.0),
            Point::new(100.0, 50.0),
            &style(RED, 4.0),
            BrushType::Dotted,
            WHITE,
        )
        .unwrap();

        let mut scratch = comp.scratch_snapshot().unwrap();
        // Dash starts at x=0 and repeats every 31 units.
        assert_eq!(read_pixel(&mut scratch, 0, 50).unwrap()[3], 255);
        assert_eq!(read_pixel(&mut scratch, 15, 50).unwrap()[3], 0);
        assert_eq!(read_pixel(&mut scratch, 31, 50).unwrap()[3], 255);
    }

    #[test]
    fn arrow_head_draws_over_existing_scratch() {
        let mut comp = compositor();
        let brush = style(RED, 4.0);
        let start = Point::new(10.0, 50.0);
        let end = Point::new(90.0, 50.0);
        comp.draw_segment(start, end, &brush, BrushType::Arrow, WHITE)
            .unwrap();
        let tails = comp
            .draw_arrow_head(start, end, &brush, &ArrowGeometry::default())
            .unwrap();
        assert!(tails[0].x < end.x && tails[1].x < end.x);

        let mut scratch = comp.scratch_snapshot().unwrap();
        // Shaft still present.
        assert_eq!(read_pixel(&mut scratch, 30, 50).unwrap()[3], 255);
        // Point on the upper arrowhead side, well outside the shaft.
        assert_eq!(read_pixel(&mut scratch, 81, 45).unwrap()[3], 255);
        assert_eq!(read_pixel(&mut scratch, 81, 54).unwrap()[3], 255);
    }

    #[test]
    fn clear_empties_both_layers() {
        let mut comp = compositor();
        let brush = style(RED, 6.0);
        comp.draw_segment(Point::new(10.0, 10.0), Point::new(90.0, 10.0), &brush, BrushType::Round, WHITE)
            .unwrap();
        comp.flatten().unwrap();
        comp.draw_segment(Point::new(10.0, 90.0), Point::new(90.0, 90.0), &brush, BrushType::Round, WHITE)
            .unwrap();

        comp.clear().unwrap();
        assert!(comp.scratch_is_empty());
        assert_eq!(read_pixel(&mut comp.committed_snapshot().unwrap(), 50, 10).unwrap(), [0, 0, 0, 0]);
        assert_eq!(read_pixel(&mut comp.scratch_snapshot().unwrap(), 50, 90).unwrap(), [0, 0, 0, 0]);
    }

    #[test]
    fn export_puts_committed_over_background_and_skips_scratch() {
        let mut comp = compositor();
        let brush = style(RED, 6.0);
        comp.draw_segment(Point::new(10.0, 10.0), Point::new(90.0, 10.0), &brush, BrushType::Round, WHITE)
            .unwrap();
        comp.flatten().unwrap();
        comp.draw_segment(Point::new(10.0, 90.0), Point::new(90.0, 90.0), &brush, BrushType::Round, WHITE)
            .unwrap();

        let background = solid_background(comp.size(), BLUE).unwrap();
        let mut output = comp.composite_for_export(&background).unwrap();
        assert_eq!(read_pixel(&mut output, 50, 10).unwrap(), [255, 0, 0, 255]);
        assert_eq!(read_pixel(&mut output, 50, 50).unwrap(), [0, 0, 255, 255]);
        assert_eq!(read_pixel(&mut output, 50, 90).unwrap(), [0, 0, 255, 255]);
    }

    #[test]
    fn export_uses_native_pixel_resolution() {
        let comp = Compositor::new(SurfaceSize::new(40, 30, 2.0).unwrap()).unwrap();
        let background = ImageSurface::create(cairo::Format::ARgb32, 10, 10).unwrap();
        let output = comp.composite_for_export(&background).unwrap();
        assert_eq!((output.width(), output.height()), (80, 60));
    }

    #[test]
    fn fill_floods_committed_layer() {
        let mut comp = compositor();
        comp.fill(BLUE).unwrap();
        assert_eq!(read_pixel(&mut comp.committed_snapshot().unwrap(), 99, 99).unwrap(), [0, 0, 255, 255]);
    }
}
