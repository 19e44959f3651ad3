use std::fmt;
use std::sync::Arc;

use crate::exec::cancel::CancelToken;
use crate::exec::progress::ProgressSink;
use crate::foundation::core::Rect;

/// Per-call options shared by every apply/render entry point.
#[derive(Clone, Default)]
pub struct RenderOptions {
    /// Region to process. `None` means the full bounds (which must then agree between source
    /// and destination).
    pub roi: Option<Rect>,
    /// Checked before each scanline starts.
    pub cancel: Option<CancelToken>,
    /// Receives contiguous-prefix progress.
    pub progress: Option<Arc<dyn ProgressSink>>,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_roi(mut self, roi: Rect) -> Self {
        self.roi = Some(roi);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn with_progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Some(Arc::new(sink));
        self
    }

    /// Make sure a token exists so an async task can be cancelled through its handle.
    pub(crate) fn ensure_cancel_token(mut self) -> (Self, CancelToken) {
        let token = self.cancel.get_or_insert_with(CancelToken::new).clone();
        (self, token)
    }
}

impl fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderOptions")
            .field("roi", &self.roi)
            .field("cancel", &self.cancel)
            .field("progress", &self.progress.as_ref().map(|_| "<sink>"))
            .finish()
    }
}
