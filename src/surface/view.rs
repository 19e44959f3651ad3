use crate::foundation::core::{Rect, Rgba8};
use crate::surface::Surface;

/// Read-only view of a surface's pixels, shareable across scanline workers.
///
/// Valid for the lifetime of one apply/render call. This is what effects read from; the
/// destination scanline is handed to them separately as a mutable slice.
#[derive(Clone, Copy, Debug)]
pub struct SourceView<'a> {
    pixels: &'a [Rgba8],
    width: u32,
    height: u32,
    stride: usize,
}

impl<'a> SourceView<'a> {
    /// View the whole of `surface`.
    pub fn of<S: Surface + ?Sized>(surface: &'a S) -> Self {
        Self {
            pixels: surface.pixels(),
            width: surface.width(),
            height: surface.height(),
            stride: surface.stride(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Pixel at `(x, y)`. Panics outside the bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba8 {
        self.span(x, y)[0]
    }

    /// Pixel at `(x, y)` with coordinates clamped to the nearest edge.
    ///
    /// The view must not be empty.
    pub fn pixel_clamped(&self, x: i64, y: i64) -> Rgba8 {
        let cx = x.clamp(0, i64::from(self.width) - 1) as u32;
        let cy = y.clamp(0, i64::from(self.height) - 1) as u32;
        self.pixel(cx, cy)
    }

    /// Pixels from `(x, y)` to the end of row `y`. Panics outside the bounds.
    pub fn span(&self, x: u32, y: u32) -> &'a [Rgba8] {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} view",
            self.width,
            self.height
        );
        let row = y as usize * self.stride;
        &self.pixels[row + x as usize..row + self.width as usize]
    }

    /// Whole row `y`.
    pub fn row(&self, y: u32) -> &'a [Rgba8] {
        self.span(0, y)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/view.rs"]
mod tests;
