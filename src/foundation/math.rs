/// Round a Q16 fixed-point accumulator back to a saturated `u8`.
pub(crate) fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    (v.min(255)) as u8
}

/// Integer Rec. 601 luma, weights summing to 256.
pub(crate) fn luma_u8(r: u8, g: u8, b: u8) -> u8 {
    let y = u32::from(r) * 77 + u32::from(g) * 150 + u32::from(b) * 29;
    ((y + 128) >> 8).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
