pub(crate) mod buffer;
pub(crate) mod view;

use std::ops::{Deref, DerefMut};

use crate::foundation::core::{Rect, Rgba8};
use crate::foundation::error::{PixelFxError, PixelFxResult};

/// Minimal capability contract the engine needs from an image buffer.
///
/// Storage is row-major: row `y` starts at `y * stride()` in [`Surface::pixels`] and holds at
/// least `width()` pixels. Surfaces are not internally synchronized; the engine borrows them
/// exclusively for the duration of one call.
///
/// `begin_update`/`end_update` bracket every batch of mutations (cache invalidation, dirty
/// tracking). The engine calls them exactly once per top-level call, matched on every exit
/// path. Implementations do not need to be reentrant.
pub trait Surface {
    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Distance between the starts of consecutive rows, in pixels.
    fn stride(&self) -> usize {
        self.width() as usize
    }

    /// Backing pixel storage.
    fn pixels(&self) -> &[Rgba8];

    /// Mutable backing pixel storage.
    fn pixels_mut(&mut self) -> &mut [Rgba8];

    /// Opens a batch of mutations.
    fn begin_update(&mut self) {}

    /// Closes the batch opened by [`Surface::begin_update`].
    fn end_update(&mut self) {}

    /// `{0, 0, width, height}`.
    fn bounds(&self) -> Rect {
        Rect::from_size(self.width(), self.height())
    }

    /// Pixels from `(x, y)` to the end of row `y`.
    ///
    /// Panics when `(x, y)` lies outside the bounds.
    fn span(&self, x: u32, y: u32) -> &[Rgba8] {
        let (start, end) = span_range(self.width(), self.height(), self.stride(), x, y);
        &self.pixels()[start..end]
    }

    /// Mutable pixels from `(x, y)` to the end of row `y`.
    ///
    /// Panics when `(x, y)` lies outside the bounds.
    fn span_mut(&mut self, x: u32, y: u32) -> &mut [Rgba8] {
        let (start, end) = span_range(self.width(), self.height(), self.stride(), x, y);
        &mut self.pixels_mut()[start..end]
    }
}

fn span_range(width: u32, height: u32, stride: usize, x: u32, y: u32) -> (usize, usize) {
    assert!(
        x < width && y < height,
        "pixel ({x}, {y}) outside {width}x{height} surface"
    );
    let row = y as usize * stride;
    (row + x as usize, row + width as usize)
}

/// Check that a surface's storage can hold its declared geometry.
pub(crate) fn validate_storage<S: Surface + ?Sized>(surface: &S) -> PixelFxResult<()> {
    let (w, h, stride) = (surface.width() as usize, surface.height(), surface.stride());
    if stride < w {
        return Err(PixelFxError::validation(format!(
            "surface stride {stride} is smaller than its width {w}"
        )));
    }
    if h == 0 || w == 0 {
        return Ok(());
    }
    let required = stride
        .checked_mul(h as usize - 1)
        .and_then(|v| v.checked_add(w))
        .ok_or_else(|| PixelFxError::validation("surface size overflow"))?;
    if surface.pixels().len() < required {
        return Err(PixelFxError::validation(format!(
            "surface storage holds {} pixels, {w}x{h} with stride {stride} needs {required}",
            surface.pixels().len()
        )));
    }
    Ok(())
}

/// Split the ROI of `pixels` into one mutable slice per scanline, top to bottom.
///
/// Each slice covers `roi.width` pixels starting at `roi.x`. The ROI must already be validated
/// against the surface the storage belongs to.
pub(crate) fn roi_rows_mut(pixels: &mut [Rgba8], stride: usize, roi: Rect) -> Vec<&mut [Rgba8]> {
    if roi.is_empty() {
        return Vec::new();
    }
    let x0 = roi.x as usize;
    let x1 = x0 + roi.width as usize;
    pixels
        .chunks_mut(stride)
        .skip(roi.y as usize)
        .take(roi.height as usize)
        .map(|row| &mut row[x0..x1])
        .collect()
}

/// RAII update bracket: `begin_update` on construction, `end_update` on drop.
///
/// Dropping runs on every exit path, including `?` propagation and unwinding, so the pair stays
/// matched without the call sites tracking it.
pub struct UpdateGuard<'a, S: Surface + ?Sized> {
    surface: &'a mut S,
}

impl<'a, S: Surface + ?Sized> UpdateGuard<'a, S> {
    pub fn begin(surface: &'a mut S) -> Self {
        surface.begin_update();
        Self { surface }
    }
}

impl<S: Surface + ?Sized> Deref for UpdateGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: Surface + ?Sized> DerefMut for UpdateGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: Surface + ?Sized> Drop for UpdateGuard<'_, S> {
    fn drop(&mut self) {
        self.surface.end_update();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/mod.rs"]
mod tests;
