use crate::foundation::core::Rgba8;
use crate::foundation::error::{PixelFxError, PixelFxResult};
use crate::surface::Surface;

/// Owned, tightly packed RGBA8 surface (`stride == width`).
///
/// Also tracks its update brackets: [`PixelBuffer::update_depth`] is the number of currently
/// open `begin_update` calls and [`PixelBuffer::update_count`] how many were ever opened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<Rgba8>,
    update_depth: u32,
    update_count: u64,
}

impl PixelBuffer {
    /// Transparent-black buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgba8::transparent())
    }

    pub fn filled(width: u32, height: u32, color: Rgba8) -> Self {
        let len = (width as usize) * (height as usize);
        Self {
            width,
            height,
            data: vec![color; len],
            update_depth: 0,
            update_count: 0,
        }
    }

    /// Wrap existing row-major pixels. `pixels.len()` must equal `width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgba8>) -> PixelFxResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| PixelFxError::validation("pixel buffer size overflow"))?;
        if pixels.len() != expected {
            return Err(PixelFxError::validation(format!(
                "pixel buffer expects {expected} pixels for {width}x{height}, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data: pixels,
            update_depth: 0,
            update_count: 0,
        })
    }

    /// Copy an `image` crate RGBA buffer.
    pub fn from_rgba_image(img: &image::RgbaImage) -> Self {
        let data = img
            .as_raw()
            .chunks_exact(4)
            .map(|px| Rgba8::new(px[0], px[1], px[2], px[3]))
            .collect();
        Self {
            width: img.width(),
            height: img.height(),
            data,
            update_depth: 0,
            update_count: 0,
        }
    }

    /// Copy into an `image` crate RGBA buffer.
    pub fn to_rgba_image(&self) -> PixelFxResult<image::RgbaImage> {
        let raw: Vec<u8> = self.data.iter().flat_map(|px| px.to_array()).collect();
        image::RgbaImage::from_raw(self.width, self.height, raw)
            .ok_or_else(|| PixelFxError::render("pixel buffer does not match its dimensions"))
    }

    /// Pixel at `(x, y)`, `None` outside the bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Overwrite the pixel at `(x, y)`. Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba8) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = y as usize * self.width as usize + x as usize;
        if let Some(px) = self.data.get_mut(idx) {
            *px = color;
        }
    }

    pub fn as_slice(&self) -> &[Rgba8] {
        &self.data
    }

    pub fn into_pixels(self) -> Vec<Rgba8> {
        self.data
    }

    /// Open `begin_update` brackets not yet closed.
    pub fn update_depth(&self) -> u32 {
        self.update_depth
    }

    /// Total `begin_update` calls seen.
    pub fn update_count(&self) -> u64 {
        self.update_count
    }
}

impl Surface for PixelBuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn pixels(&self) -> &[Rgba8] {
        &self.data
    }

    fn pixels_mut(&mut self) -> &mut [Rgba8] {
        &mut self.data
    }

    fn begin_update(&mut self) {
        self.update_depth += 1;
        self.update_count += 1;
    }

    fn end_update(&mut self) {
        debug_assert!(self.update_depth > 0, "end_update without begin_update");
        self.update_depth = self.update_depth.saturating_sub(1);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/buffer.rs"]
mod tests;
