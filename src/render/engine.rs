use std::sync::Arc;

use crate::exec::cancel::is_cancelled;
use crate::exec::progress::LineTracker;
use crate::exec::range::{RangeExecutor, build_thread_pool};
use crate::foundation::config::EngineSettings;
use crate::foundation::core::{Rect, Rgba8};
use crate::foundation::error::{PixelFxError, PixelFxResult};
use crate::render::options::RenderOptions;
use crate::render::task::RenderTask;
use crate::surface::buffer::PixelBuffer;
use crate::surface::view::SourceView;
use crate::surface::{Surface, UpdateGuard, roi_rows_mut, validate_storage};
use crate::transform::effect::Effect;
use crate::transform::point::{Identity, PointTransform};

/// Applies point transforms and effects over a ROI, one scanline per unit of work.
///
/// Four call shapes, each with an async twin:
///
/// | entry point          | transform          | surfaces                      |
/// |----------------------|--------------------|-------------------------------|
/// | [`apply`]            | [`PointTransform`] | one, mutated in place         |
/// | [`apply_copy`]       | [`PointTransform`] | source -> destination         |
/// | [`render`]           | [`Effect`]         | source -> destination         |
/// | [`render_in_place`]  | [`Effect`]         | one, via a scratch buffer     |
///
/// Every call validates its arguments before touching a surface, brackets each surface with
/// `begin_update`/`end_update` (paired on every exit path), honours the ROI end-to-end, and
/// returns normally when cancelled. Callers tell "cancelled" from "completed" by checking their
/// token afterwards.
///
/// The engine is cheap to clone; clones share the worker pool.
///
/// [`apply`]: PixelEngine::apply
/// [`apply_copy`]: PixelEngine::apply_copy
/// [`render`]: PixelEngine::render
/// [`render_in_place`]: PixelEngine::render_in_place
#[derive(Clone)]
pub struct PixelEngine {
    settings: EngineSettings,
    pool: Arc<rayon::ThreadPool>,
}

impl PixelEngine {
    /// Build an engine with its own worker pool sized by `settings.threads`.
    pub fn new(settings: EngineSettings) -> PixelFxResult<Self> {
        settings.validate()?;
        let pool = build_thread_pool(settings.threads)?;
        tracing::debug!(
            threads = pool.current_num_threads(),
            single_threaded = settings.single_threaded,
            "pixel engine ready"
        );
        Ok(Self {
            settings,
            pool: Arc::new(pool),
        })
    }

    /// Build an engine on an existing pool. `settings.threads` is ignored.
    pub fn with_pool(settings: EngineSettings, pool: Arc<rayon::ThreadPool>) -> Self {
        Self { settings, pool }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Toggle strictly sequential execution for subsequent calls.
    pub fn set_single_threaded(&mut self, single_threaded: bool) {
        self.settings.single_threaded = single_threaded;
    }

    /// Worker count of the pool.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    fn executor(&self) -> RangeExecutor {
        RangeExecutor::new(Arc::clone(&self.pool), self.settings.single_threaded)
    }

    /// Apply `op` to the ROI of `surface` in place.
    #[tracing::instrument(skip_all, fields(roi = ?opts.roi))]
    pub fn apply<P, S>(&self, op: &P, surface: &mut S, opts: &RenderOptions) -> PixelFxResult<()>
    where
        P: PointTransform + ?Sized,
        S: Surface + ?Sized,
    {
        validate_storage(&*surface)?;
        let roi = resolve_roi(opts.roi, surface.bounds(), None)?;

        let mut surface = UpdateGuard::begin(surface);
        if roi.is_empty() {
            return Ok(());
        }
        let stride = surface.stride();
        let rows = roi_rows_mut(surface.pixels_mut(), stride, roi);
        self.dispatch_rows(rows, roi, opts, |_, row| {
            op.apply_line(row);
            Ok(())
        })?;
        Ok(())
    }

    /// Write `op(src)` into `dst` over the ROI. `src` is only read.
    #[tracing::instrument(skip_all, fields(roi = ?opts.roi))]
    pub fn apply_copy<P, S, D>(
        &self,
        op: &P,
        src: &mut S,
        dst: &mut D,
        opts: &RenderOptions,
    ) -> PixelFxResult<()>
    where
        P: PointTransform + ?Sized,
        S: Surface + ?Sized,
        D: Surface + ?Sized,
    {
        validate_storage(&*src)?;
        validate_storage(&*dst)?;
        let roi = resolve_roi(opts.roi, src.bounds(), Some(dst.bounds()))?;

        let src = UpdateGuard::begin(src);
        let mut dst = UpdateGuard::begin(dst);
        if roi.is_empty() {
            return Ok(());
        }
        let view = SourceView::of(&*src);
        let stride = dst.stride();
        let rows = roi_rows_mut(dst.pixels_mut(), stride, roi);
        self.dispatch_rows(rows, roi, opts, |line, row| {
            let span = view.span(line.x as u32, line.y as u32);
            op.apply_line_copy(&span[..row.len()], row);
            Ok(())
        })?;
        Ok(())
    }

    /// Render `effect` from `src` into `dst` over the ROI.
    ///
    /// `on_begin_render` runs once with the full source before any scanline.
    #[tracing::instrument(skip_all, fields(roi = ?opts.roi))]
    pub fn render<E, S, D>(
        &self,
        effect: &mut E,
        src: &mut S,
        dst: &mut D,
        opts: &RenderOptions,
    ) -> PixelFxResult<()>
    where
        E: Effect + ?Sized,
        S: Surface + ?Sized,
        D: Surface + ?Sized,
    {
        validate_storage(&*src)?;
        validate_storage(&*dst)?;
        let roi = resolve_roi(opts.roi, src.bounds(), Some(dst.bounds()))?;

        let src = UpdateGuard::begin(src);
        let mut dst = UpdateGuard::begin(dst);
        if roi.is_empty() {
            return Ok(());
        }
        let view = SourceView::of(&*src);
        effect.on_begin_render(&view, roi)?;

        let effect: &E = effect;
        let stride = dst.stride();
        let rows = roi_rows_mut(dst.pixels_mut(), stride, roi);
        self.dispatch_rows(rows, roi, opts, |line, row| {
            effect.render_line(&view, row, line)
        })?;
        Ok(())
    }

    /// Render `effect` over the ROI of a single surface.
    ///
    /// The effect reads the untouched surface and writes a full-size scratch buffer; the
    /// scanlines it finished are then copied back. The copy-back ignores cancellation, so a
    /// cancelled call leaves whole rendered rows plus untouched rows, never a half-copied one.
    /// If the effect fails, nothing is copied back.
    #[tracing::instrument(skip_all, fields(roi = ?opts.roi))]
    pub fn render_in_place<E, S>(
        &self,
        effect: &mut E,
        surface: &mut S,
        opts: &RenderOptions,
    ) -> PixelFxResult<()>
    where
        E: Effect + ?Sized,
        S: Surface + ?Sized,
    {
        validate_storage(&*surface)?;
        let roi = resolve_roi(opts.roi, surface.bounds(), None)?;

        let mut surface = UpdateGuard::begin(surface);
        if roi.is_empty() {
            return Ok(());
        }

        let mut scratch = PixelBuffer::new(surface.width(), surface.height());
        let completed = {
            let view = SourceView::of(&*surface);
            effect.on_begin_render(&view, roi)?;
            let effect: &E = effect;
            let scratch_stride = scratch.stride();
            let rows = roi_rows_mut(scratch.pixels_mut(), scratch_stride, roi);
            self.dispatch_rows(rows, roi, opts, |line, row| {
                effect.render_line(&view, row, line)
            })?
        };

        let stride = surface.stride();
        let scratch_stride = scratch.stride();
        let finished: Vec<(&mut [Rgba8], &mut [Rgba8])> =
            roi_rows_mut(surface.pixels_mut(), stride, roi)
                .into_iter()
                .zip(roi_rows_mut(scratch.pixels_mut(), scratch_stride, roi))
                .zip(&completed)
                .filter(|(_, done)| **done)
                .map(|(pair, _)| pair)
                .collect();
        tracing::trace!(rows = finished.len(), "copying rendered scanlines back");
        self.executor()
            .run_items(0, finished, None, |_, (dst_row, scratch_row)| {
                Identity.apply_line_copy(scratch_row, dst_row);
                Ok(())
            })?;
        Ok(())
    }

    /// Async [`PixelEngine::apply`]. Resolves to the surface.
    ///
    /// Arguments are validated before anything is scheduled; on error the inputs are dropped.
    pub fn apply_async<P, S>(
        &self,
        op: P,
        surface: S,
        opts: RenderOptions,
    ) -> PixelFxResult<RenderTask<S>>
    where
        P: PointTransform + 'static,
        S: Surface + Send + 'static,
    {
        validate_storage(&surface)?;
        resolve_roi(opts.roi, surface.bounds(), None)?;
        let (opts, cancel) = opts.ensure_cancel_token();
        let engine = self.clone();
        Ok(RenderTask::spawn(&self.pool, cancel, move || {
            let mut surface = surface;
            engine.apply(&op, &mut surface, &opts)?;
            Ok(surface)
        }))
    }

    /// Async [`PixelEngine::apply_copy`]. Resolves to `(src, dst)`.
    pub fn apply_copy_async<P, S, D>(
        &self,
        op: P,
        src: S,
        dst: D,
        opts: RenderOptions,
    ) -> PixelFxResult<RenderTask<(S, D)>>
    where
        P: PointTransform + 'static,
        S: Surface + Send + 'static,
        D: Surface + Send + 'static,
    {
        validate_storage(&src)?;
        validate_storage(&dst)?;
        resolve_roi(opts.roi, src.bounds(), Some(dst.bounds()))?;
        let (opts, cancel) = opts.ensure_cancel_token();
        let engine = self.clone();
        Ok(RenderTask::spawn(&self.pool, cancel, move || {
            let (mut src, mut dst) = (src, dst);
            engine.apply_copy(&op, &mut src, &mut dst, &opts)?;
            Ok((src, dst))
        }))
    }

    /// Async [`PixelEngine::render`]. Resolves to `(src, dst)`.
    pub fn render_async<E, S, D>(
        &self,
        effect: E,
        src: S,
        dst: D,
        opts: RenderOptions,
    ) -> PixelFxResult<RenderTask<(S, D)>>
    where
        E: Effect + 'static,
        S: Surface + Send + 'static,
        D: Surface + Send + 'static,
    {
        validate_storage(&src)?;
        validate_storage(&dst)?;
        resolve_roi(opts.roi, src.bounds(), Some(dst.bounds()))?;
        let (opts, cancel) = opts.ensure_cancel_token();
        let engine = self.clone();
        Ok(RenderTask::spawn(&self.pool, cancel, move || {
            let (mut effect, mut src, mut dst) = (effect, src, dst);
            engine.render(&mut effect, &mut src, &mut dst, &opts)?;
            Ok((src, dst))
        }))
    }

    /// Async [`PixelEngine::render_in_place`]. Resolves to the surface; the ROI is honoured.
    pub fn render_in_place_async<E, S>(
        &self,
        effect: E,
        surface: S,
        opts: RenderOptions,
    ) -> PixelFxResult<RenderTask<S>>
    where
        E: Effect + 'static,
        S: Surface + Send + 'static,
    {
        validate_storage(&surface)?;
        resolve_roi(opts.roi, surface.bounds(), None)?;
        let (opts, cancel) = opts.ensure_cancel_token();
        let engine = self.clone();
        Ok(RenderTask::spawn(&self.pool, cancel, move || {
            let (mut effect, mut surface) = (effect, surface);
            engine.render_in_place(&mut effect, &mut surface, &opts)?;
            Ok(surface)
        }))
    }

    /// Run `line_fn` once per ROI scanline and track contiguous progress.
    ///
    /// Returns the per-row completion flags (all `true` unless cancelled).
    fn dispatch_rows<F>(
        &self,
        rows: Vec<&mut [Rgba8]>,
        roi: Rect,
        opts: &RenderOptions,
        line_fn: F,
    ) -> PixelFxResult<Vec<bool>>
    where
        F: Fn(Rect, &mut [Rgba8]) -> PixelFxResult<()> + Sync + Send,
    {
        let exec = self.executor();
        tracing::debug!(
            rows = rows.len(),
            single_threaded = self.settings.single_threaded,
            threads = exec.threads(),
            "dispatching scanlines"
        );

        let tracker = LineTracker::new(roi, opts.progress.as_deref());
        let top = roi.y as usize;
        exec.run_items(top, rows, opts.cancel.as_ref(), |y, row| {
            line_fn(roi.row(y as i32), row)?;
            tracker.mark_complete(y - top)
        })?;

        if is_cancelled(opts.cancel.as_ref()) {
            tracing::debug!(
                completed_prefix = tracker.completed_prefix()?,
                total = roi.height,
                "scanline dispatch cancelled"
            );
        }
        tracker.into_completed()
    }
}

/// Resolve the ROI for a call over `src` (and optionally `dst`).
///
/// Without an explicit ROI both surfaces must share bounds. An explicit ROI must lie inside every
/// supplied surface.
fn resolve_roi(requested: Option<Rect>, src: Rect, dst: Option<Rect>) -> PixelFxResult<Rect> {
    let Some(roi) = requested else {
        if let Some(dst) = dst
            && dst != src
        {
            return Err(PixelFxError::validation(format!(
                "source bounds {}x{} and destination bounds {}x{} differ; pass an explicit roi",
                src.width, src.height, dst.width, dst.height
            )));
        }
        return Ok(src);
    };

    if !src.contains_rect(&roi) {
        return Err(PixelFxError::validation(format!(
            "roi {roi:?} is outside source bounds {src:?}"
        )));
    }
    if let Some(dst) = dst
        && !dst.contains_rect(&roi)
    {
        return Err(PixelFxError::validation(format!(
            "roi {roi:?} is outside destination bounds {dst:?}"
        )));
    }
    Ok(roi)
}

#[cfg(test)]
#[path = "../../tests/unit/render/engine.rs"]
mod tests;
