use crate::foundation::core::Rgba8;
use crate::foundation::math::luma_u8;

/// Pure per-pixel mapping: the output depends on the input pixel alone.
///
/// Only [`PointTransform::transform`] is required. The line appliers loop over it one pixel at a
/// time, left to right; override them to vectorize.
pub trait PointTransform: Send + Sync {
    fn transform(&self, color: Rgba8) -> Rgba8;

    /// Transform `line` in place.
    fn apply_line(&self, line: &mut [Rgba8]) {
        for px in line.iter_mut() {
            *px = self.transform(*px);
        }
    }

    /// Write `transform(src[i])` to `dst[i]` for every pixel of `dst`.
    ///
    /// `src` must hold at least `dst.len()` pixels. In-place use goes through
    /// [`PointTransform::apply_line`] instead; the borrow rules rule out partial overlap.
    fn apply_line_copy(&self, src: &[Rgba8], dst: &mut [Rgba8]) {
        debug_assert!(src.len() >= dst.len(), "source line shorter than destination");
        for (d, s) in dst.iter_mut().zip(src) {
            *d = self.transform(*s);
        }
    }
}

/// Returns its input unchanged. Also the copy-applier behind in-place effect rendering.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl PointTransform for Identity {
    fn transform(&self, color: Rgba8) -> Rgba8 {
        color
    }

    fn apply_line(&self, _line: &mut [Rgba8]) {}

    fn apply_line_copy(&self, src: &[Rgba8], dst: &mut [Rgba8]) {
        let n = dst.len();
        dst.copy_from_slice(&src[..n]);
    }
}

/// Inverts the color channels, keeping alpha. Applying it twice restores the input.
#[derive(Clone, Copy, Debug, Default)]
pub struct InvertRgb;

impl PointTransform for InvertRgb {
    fn transform(&self, c: Rgba8) -> Rgba8 {
        Rgba8::new(255 - c.r, 255 - c.g, 255 - c.b, c.a)
    }
}

/// Replaces the color channels with their luma, keeping alpha.
#[derive(Clone, Copy, Debug, Default)]
pub struct Desaturate;

impl PointTransform for Desaturate {
    fn transform(&self, c: Rgba8) -> Rgba8 {
        let y = luma_u8(c.r, c.g, c.b);
        Rgba8::new(y, y, y, c.a)
    }
}

/// Overwrites alpha with a constant.
#[derive(Clone, Copy, Debug)]
pub struct SetAlpha(pub u8);

impl PointTransform for SetAlpha {
    fn transform(&self, c: Rgba8) -> Rgba8 {
        Rgba8 { a: self.0, ..c }
    }
}

/// Writes a constant color regardless of input.
#[derive(Clone, Copy, Debug)]
pub struct Fill(pub Rgba8);

impl PointTransform for Fill {
    fn transform(&self, _color: Rgba8) -> Rgba8 {
        self.0
    }

    fn apply_line(&self, line: &mut [Rgba8]) {
        line.fill(self.0);
    }

    fn apply_line_copy(&self, _src: &[Rgba8], dst: &mut [Rgba8]) {
        dst.fill(self.0);
    }
}

/// Adapts a closure into a [`PointTransform`].
#[derive(Clone, Copy)]
pub struct FnTransform<F>(pub F);

impl<F> PointTransform for FnTransform<F>
where
    F: Fn(Rgba8) -> Rgba8 + Send + Sync,
{
    fn transform(&self, color: Rgba8) -> Rgba8 {
        (self.0)(color)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/point.rs"]
mod tests;
