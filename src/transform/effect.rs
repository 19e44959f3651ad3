use crate::foundation::core::{Rect, Rgba8};
use crate::foundation::error::PixelFxResult;
use crate::surface::view::SourceView;
use crate::transform::point::PointTransform;

/// Scanline/region transform with read access to the whole source surface.
///
/// The engine calls [`Effect::on_begin_render`] once per top-level call, before any scanline,
/// then [`Effect::render_line`] once per scanline of the ROI, possibly from several workers at
/// once. Implement whichever level fits:
///
/// - override `render_line` for line-at-a-time algorithms;
/// - override only `render_pixel` for neighbourhood filters (the default `render_line` walks the
///   line left to right calling it);
/// - for pure per-pixel maps, implement [`PointTransform`] and wrap it in [`PointEffect`].
///
/// Effects must only read from `src`. When source and destination are the same surface the engine
/// renders into a scratch buffer first, so `src` always holds unmodified pixels.
pub trait Effect: Send + Sync {
    /// One-time setup with the full source and the ROI about to be rendered.
    fn on_begin_render(&mut self, _src: &SourceView<'_>, _roi: Rect) -> PixelFxResult<()> {
        Ok(())
    }

    /// Render one scanline. `dst[0]` is pixel `(line.x, line.y)`, `dst.len() == line.width`.
    fn render_line(
        &self,
        src: &SourceView<'_>,
        dst: &mut [Rgba8],
        line: Rect,
    ) -> PixelFxResult<()> {
        let y = line.y as u32;
        for (i, px) in dst.iter_mut().enumerate() {
            *px = self.render_pixel(src, line.x as u32 + i as u32, y);
        }
        Ok(())
    }

    /// Output pixel at `(x, y)`. Defaults to copying the source pixel.
    fn render_pixel(&self, src: &SourceView<'_>, x: u32, y: u32) -> Rgba8 {
        src.pixel(x, y)
    }
}

/// Runs a [`PointTransform`] as an [`Effect`]: each scanline resolves the source span at the line
/// start and hands it to the transform's copy-applier.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointEffect<P>(pub P);

impl<P: PointTransform> Effect for PointEffect<P> {
    fn render_line(
        &self,
        src: &SourceView<'_>,
        dst: &mut [Rgba8],
        line: Rect,
    ) -> PixelFxResult<()> {
        let span = src.span(line.x as u32, line.y as u32);
        self.0.apply_line_copy(&span[..dst.len()], dst);
        Ok(())
    }

    fn render_pixel(&self, src: &SourceView<'_>, x: u32, y: u32) -> Rgba8 {
        self.0.transform(src.pixel(x, y))
    }
}

impl<E: Effect + ?Sized> Effect for Box<E> {
    fn on_begin_render(&mut self, src: &SourceView<'_>, roi: Rect) -> PixelFxResult<()> {
        (**self).on_begin_render(src, roi)
    }

    fn render_line(
        &self,
        src: &SourceView<'_>,
        dst: &mut [Rgba8],
        line: Rect,
    ) -> PixelFxResult<()> {
        (**self).render_line(src, dst, line)
    }

    fn render_pixel(&self, src: &SourceView<'_>, x: u32, y: u32) -> Rgba8 {
        (**self).render_pixel(src, x, y)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/effect.rs"]
mod tests;
