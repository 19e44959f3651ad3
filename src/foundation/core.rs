/// Integer rectangle in pixel space.
///
/// `x`/`y` name the top-left pixel. Width and height are unsigned, so a rectangle can be empty
/// but never negative; an empty rectangle means "nothing to do".
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: i32,
    /// Top edge (inclusive).
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Build a rectangle from its top-left corner and size.
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle anchored at the origin, as used for surface bounds.
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Inclusive right edge (`x + width - 1`).
    pub fn right(&self) -> i32 {
        (i64::from(self.x) + i64::from(self.width) - 1) as i32
    }

    /// Inclusive bottom edge (`y + height - 1`).
    pub fn bottom(&self) -> i32 {
        (i64::from(self.y) + i64::from(self.height) - 1) as i32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Whether `other` lies entirely inside `self`. Empty rectangles are contained anywhere.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        if other.is_empty() {
            return true;
        }
        let (sx0, sy0) = (i64::from(self.x), i64::from(self.y));
        let (sx1, sy1) = (
            sx0 + i64::from(self.width),
            sy0 + i64::from(self.height),
        );
        let (ox0, oy0) = (i64::from(other.x), i64::from(other.y));
        let (ox1, oy1) = (
            ox0 + i64::from(other.width),
            oy0 + i64::from(other.height),
        );
        ox0 >= sx0 && oy0 >= sy0 && ox1 <= sx1 && oy1 <= sy1
    }

    /// Overlapping area of two rectangles, `None` when they do not overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = i64::from(self.x).max(i64::from(other.x));
        let y0 = i64::from(self.y).max(i64::from(other.y));
        let x1 = (i64::from(self.x) + i64::from(self.width))
            .min(i64::from(other.x) + i64::from(other.width));
        let y1 = (i64::from(self.y) + i64::from(self.height))
            .min(i64::from(other.y) + i64::from(other.height));
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Rect::new(
            x0 as i32,
            y0 as i32,
            (x1 - x0) as u32,
            (y1 - y0) as u32,
        ))
    }

    /// The single scanline of this rectangle's horizontal extent at row `y`.
    pub fn row(&self, y: i32) -> Rect {
        Rect::new(self.x, y, self.width, 1)
    }

    /// Top-anchored sub-rectangle covering the first `rows` rows (clamped to the height).
    pub fn top_rows(&self, rows: u32) -> Rect {
        Rect::new(self.x, self.y, self.width, rows.min(self.height))
    }
}

/// One RGBA8 pixel. The engine never interprets channel order or premultiplication; only the
/// point transforms do.
#[repr(C)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    pub const fn from_array(px: [u8; 4]) -> Self {
        Self::new(px[0], px[1], px[2], px[3])
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[u8; 4]> for Rgba8 {
    fn from(px: [u8; 4]) -> Self {
        Self::from_array(px)
    }
}

impl From<Rgba8> for [u8; 4] {
    fn from(px: Rgba8) -> Self {
        px.to_array()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
