use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::exec::cancel::CancelToken;
use crate::transform::point::InvertRgb;

fn engine(threads: usize, single_threaded: bool) -> PixelEngine {
    PixelEngine::new(EngineSettings {
        single_threaded,
        threads: Some(threads),
    })
    .unwrap()
}

fn gradient(w: u32, h: u32) -> PixelBuffer {
    let px = (0..w * h)
        .map(|i| Rgba8::new((i % w) as u8 * 10, (i / w) as u8 * 10, 7, 255))
        .collect();
    PixelBuffer::from_pixels(w, h, px).unwrap()
}

#[test]
fn resolve_roi_defaults_to_source_bounds() {
    let b = Rect::from_size(4, 3);
    assert_eq!(resolve_roi(None, b, None).unwrap(), b);
    assert_eq!(resolve_roi(None, b, Some(b)).unwrap(), b);
}

#[test]
fn resolve_roi_rejects_mismatched_bounds_without_roi() {
    let err = resolve_roi(None, Rect::from_size(4, 3), Some(Rect::from_size(3, 4))).unwrap_err();
    assert!(matches!(err, PixelFxError::Validation(_)));
}

#[test]
fn resolve_roi_accepts_explicit_roi_inside_both() {
    let roi = Rect::new(1, 1, 2, 2);
    let got = resolve_roi(
        Some(roi),
        Rect::from_size(4, 3),
        Some(Rect::from_size(3, 5)),
    )
    .unwrap();
    assert_eq!(got, roi);
}

#[test]
fn resolve_roi_rejects_roi_outside_either_surface() {
    let roi = Rect::new(2, 0, 3, 1);
    assert!(resolve_roi(Some(roi), Rect::from_size(4, 3), None).is_err());
    assert!(resolve_roi(Some(roi), Rect::from_size(8, 8), Some(Rect::from_size(4, 4))).is_err());
}

/// Cancels its own token once `after` scanlines have rendered. Inverts what it renders.
struct CancelAfter {
    after: usize,
    seen: AtomicUsize,
    token: CancelToken,
}

impl Effect for CancelAfter {
    fn render_line(
        &self,
        src: &SourceView<'_>,
        dst: &mut [Rgba8],
        line: Rect,
    ) -> PixelFxResult<()> {
        InvertRgb.apply_line_copy(src.span(line.x as u32, line.y as u32), dst);
        if self.seen.fetch_add(1, Ordering::SeqCst) + 1 == self.after {
            self.token.cancel();
        }
        Ok(())
    }
}

#[test]
fn cancelled_in_place_render_copies_back_only_finished_rows() {
    let eng = engine(2, true);
    let original = gradient(5, 6);
    let mut surface = original.clone();
    let token = CancelToken::new();
    let mut fx = CancelAfter {
        after: 2,
        seen: AtomicUsize::new(0),
        token: token.clone(),
    };
    let opts = RenderOptions::new()
        .with_roi(Rect::new(1, 1, 3, 4))
        .with_cancel(token.clone());

    eng.render_in_place(&mut fx, &mut surface, &opts).unwrap();
    assert!(token.is_cancelled());
    assert_eq!(surface.update_depth(), 0);

    for y in 0..6 {
        for x in 0..5 {
            let before = original.pixel(x, y).unwrap();
            let after = surface.pixel(x, y).unwrap();
            let rendered = (1..4).contains(&x) && (1..3).contains(&y);
            if rendered {
                assert_eq!(after, InvertRgb.transform(before), "({x}, {y})");
            } else {
                assert_eq!(after, before, "({x}, {y})");
            }
        }
    }
}

struct FailOnRow(i32);

impl Effect for FailOnRow {
    fn render_line(
        &self,
        _src: &SourceView<'_>,
        dst: &mut [Rgba8],
        line: Rect,
    ) -> PixelFxResult<()> {
        if line.y == self.0 {
            return Err(PixelFxError::render(format!("row {} failed", line.y)));
        }
        dst.fill(Rgba8::opaque(1, 2, 3));
        Ok(())
    }
}

#[test]
fn failed_in_place_render_leaves_surface_untouched() {
    for single in [true, false] {
        let eng = engine(3, single);
        let original = gradient(4, 8);
        let mut surface = original.clone();
        let err = eng
            .render_in_place(&mut FailOnRow(5), &mut surface, &RenderOptions::new())
            .unwrap_err();
        assert!(err.to_string().contains("row 5 failed"));
        assert_eq!(surface.as_slice(), original.as_slice());
        assert_eq!(surface.update_depth(), 0);
        assert_eq!(surface.update_count(), 1);
    }
}

#[test]
fn empty_roi_pairs_brackets_and_skips_work() {
    let eng = engine(2, false);
    let mut surface = gradient(3, 3);
    let before = surface.clone();
    eng.apply(
        &InvertRgb,
        &mut surface,
        &RenderOptions::new().with_roi(Rect::new(1, 1, 0, 2)),
    )
    .unwrap();
    assert_eq!(surface.as_slice(), before.as_slice());
    assert_eq!(surface.update_count(), 1);
    assert_eq!(surface.update_depth(), 0);
}

#[test]
fn validation_failure_opens_no_brackets() {
    let eng = engine(2, false);
    let mut src = gradient(3, 3);
    let mut dst = gradient(4, 3);
    assert!(
        eng.apply_copy(&InvertRgb, &mut src, &mut dst, &RenderOptions::new())
            .is_err()
    );
    assert_eq!(src.update_count(), 0);
    assert_eq!(dst.update_count(), 0);
}

#[test]
fn single_threaded_toggle_is_visible_in_settings() {
    let mut eng = engine(2, false);
    assert!(!eng.settings().single_threaded);
    eng.set_single_threaded(true);
    assert!(eng.settings().single_threaded);
    assert_eq!(eng.threads(), 2);
}

#[test]
fn zero_thread_settings_are_rejected() {
    let err = PixelEngine::new(EngineSettings {
        single_threaded: false,
        threads: Some(0),
    })
    .err()
    .unwrap();
    assert!(matches!(err, PixelFxError::Validation(_)));
}
