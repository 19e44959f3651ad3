use std::sync::Mutex;

use crate::foundation::core::Rect;
use crate::foundation::error::{PixelFxError, PixelFxResult};

/// One progress notification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressUpdate {
    /// Top-anchored part of the ROI whose every scanline is finished.
    pub completed_roi: Rect,
    /// `completed_roi.height / roi.height`, in `[0, 1]`.
    pub percent_complete: f32,
}

/// Receiver of progress updates for one apply/render call.
///
/// Updates arrive in order, each covering at least as many rows as the previous one. Calls may
/// come from any worker thread.
pub trait ProgressSink: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        self(update)
    }
}

struct LineState {
    completed: Vec<bool>,
    /// Rows `[0, prefix)` are all complete. Never regresses.
    prefix: usize,
}

/// Tracks which scanlines of a ROI are done and publishes the contiguous completed prefix.
///
/// Lines finish out of order under parallel dispatch; progress only advances once every line
/// above has finished too, so the reported rectangle is always safe to redraw.
pub(crate) struct LineTracker<'a> {
    roi: Rect,
    sink: Option<&'a dyn ProgressSink>,
    state: Mutex<LineState>,
}

impl<'a> LineTracker<'a> {
    pub(crate) fn new(roi: Rect, sink: Option<&'a dyn ProgressSink>) -> Self {
        Self {
            roi,
            sink,
            state: Mutex::new(LineState {
                completed: vec![false; roi.height as usize],
                prefix: 0,
            }),
        }
    }

    /// Record row `index` (relative to the ROI top) as finished.
    pub(crate) fn mark_complete(&self, index: usize) -> PixelFxResult<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| PixelFxError::render("progress tracker lock poisoned"))?;
        let slot = state
            .completed
            .get_mut(index)
            .ok_or_else(|| PixelFxError::render(format!("scanline {index} outside roi")))?;
        *slot = true;

        let before = state.prefix;
        let mut cursor = before;
        while cursor < state.completed.len() && state.completed[cursor] {
            cursor += 1;
        }
        if cursor == before {
            return Ok(());
        }
        state.prefix = cursor;

        // Published under the lock so sink calls stay ordered.
        if let Some(sink) = self.sink {
            let rows = cursor as u32;
            sink.report(ProgressUpdate {
                completed_roi: self.roi.top_rows(rows),
                percent_complete: rows as f32 / self.roi.height as f32,
            });
        }
        Ok(())
    }

    /// Length of the contiguous completed prefix.
    pub(crate) fn completed_prefix(&self) -> PixelFxResult<usize> {
        self.state
            .lock()
            .map(|s| s.prefix)
            .map_err(|_| PixelFxError::render("progress tracker lock poisoned"))
    }

    /// Per-row completion flags, indexed from the ROI top.
    pub(crate) fn into_completed(self) -> PixelFxResult<Vec<bool>> {
        self.state
            .into_inner()
            .map(|s| s.completed)
            .map_err(|_| PixelFxError::render("progress tracker lock poisoned"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/exec/progress.rs"]
mod tests;
