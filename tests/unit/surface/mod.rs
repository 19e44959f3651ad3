use super::buffer::PixelBuffer;
use super::*;

/// Surface with padding at the end of each row.
struct Padded {
    width: u32,
    height: u32,
    stride: usize,
    data: Vec<Rgba8>,
}

impl Padded {
    fn new(width: u32, height: u32, stride: usize) -> Self {
        let data = (0..stride * height as usize)
            .map(|i| Rgba8::new((i % 251) as u8, (i / 251) as u8, 0, 255))
            .collect();
        Self {
            width,
            height,
            stride,
            data,
        }
    }
}

impl Surface for Padded {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn stride(&self) -> usize {
        self.stride
    }

    fn pixels(&self) -> &[Rgba8] {
        &self.data
    }

    fn pixels_mut(&mut self) -> &mut [Rgba8] {
        &mut self.data
    }
}

#[test]
fn span_runs_to_row_end_honoring_stride() {
    let s = Padded::new(4, 3, 6);
    let span = s.span(1, 2);
    assert_eq!(span.len(), 3);
    assert_eq!(span[0], s.data[2 * 6 + 1]);
}

#[test]
#[should_panic(expected = "outside")]
fn span_out_of_bounds_panics() {
    let s = PixelBuffer::new(2, 2);
    let _ = s.span(2, 0);
}

#[test]
fn validate_storage_rejects_short_buffers() {
    let mut s = Padded::new(4, 3, 6);
    assert!(validate_storage(&s).is_ok());

    // The last row may omit its padding.
    s.data.truncate(6 * 2 + 4);
    assert!(validate_storage(&s).is_ok());

    s.data.truncate(6 * 2 + 3);
    assert!(matches!(
        validate_storage(&s),
        Err(PixelFxError::Validation(_))
    ));

    let narrow = Padded::new(4, 3, 3);
    assert!(validate_storage(&narrow).is_err());
}

#[test]
fn roi_rows_cover_exactly_the_roi() {
    let mut s = Padded::new(5, 4, 7);
    let roi = Rect::new(1, 1, 3, 2);
    let stride = s.stride();
    let rows = roi_rows_mut(s.pixels_mut(), stride, roi);
    assert_eq!(rows.len(), 2);
    for row in rows {
        assert_eq!(row.len(), 3);
        for px in row.iter_mut() {
            *px = Rgba8::new(1, 1, 1, 1);
        }
    }
    let marked: Vec<usize> = s
        .data
        .iter()
        .enumerate()
        .filter(|(_, px)| **px == Rgba8::new(1, 1, 1, 1))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(marked, vec![8, 9, 10, 15, 16, 17]);
}

#[test]
fn roi_rows_of_empty_roi_is_empty() {
    let mut s = PixelBuffer::new(3, 3);
    assert!(roi_rows_mut(s.pixels_mut(), 3, Rect::new(0, 0, 0, 3)).is_empty());
}

#[test]
fn update_guard_pairs_on_drop() {
    let mut s = PixelBuffer::new(1, 1);
    {
        let mut guard = UpdateGuard::begin(&mut s);
        assert_eq!(guard.update_depth(), 1);
        guard.pixels_mut()[0] = Rgba8::opaque(1, 2, 3);
    }
    assert_eq!(s.update_depth(), 0);
    assert_eq!(s.update_count(), 1);
    assert_eq!(s.pixel(0, 0), Some(Rgba8::opaque(1, 2, 3)));
}

#[test]
fn update_guard_pairs_on_unwind() {
    let mut s = PixelBuffer::new(1, 1);
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _guard = UpdateGuard::begin(&mut s);
        panic!("transform fault");
    }));
    assert!(result.is_err());
    assert_eq!(s.update_depth(), 0);
    assert_eq!(s.update_count(), 1);
}
