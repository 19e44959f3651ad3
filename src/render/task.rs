use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::mpsc;

use crate::exec::cancel::CancelToken;
use crate::foundation::error::{PixelFxError, PixelFxResult};

/// Handle to an apply/render call running on the engine's worker pool.
///
/// Resolves to the surfaces that were moved into the call. Dropping the handle does not stop the
/// work; use [`RenderTask::cancel`] for that.
pub struct RenderTask<T> {
    rx: mpsc::Receiver<PixelFxResult<T>>,
    cancel: CancelToken,
    done: Option<PixelFxResult<T>>,
}

impl<T: Send + 'static> RenderTask<T> {
    pub(crate) fn spawn<F>(pool: &rayon::ThreadPool, cancel: CancelToken, job: F) -> Self
    where
        F: FnOnce() -> PixelFxResult<T> + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel(1);
        pool.spawn(move || {
            let result = catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|payload| {
                Err(PixelFxError::render(format!(
                    "render task panicked: {}",
                    panic_message(payload.as_ref())
                )))
            });
            if tx.send(result).is_err() {
                tracing::trace!("render task finished after its handle was dropped");
            }
        });
        Self {
            rx,
            cancel,
            done: None,
        }
    }
}

impl<T> RenderTask<T> {
    /// Request cooperative cancellation; scanlines already started still finish.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Whether the result is available.
    pub fn is_finished(&mut self) -> bool {
        self.poll();
        self.done.is_some()
    }

    /// Take the result if the task has finished, without blocking.
    pub fn try_wait(&mut self) -> Option<PixelFxResult<T>> {
        self.poll();
        self.done.take()
    }

    /// Block until the task finishes.
    pub fn wait(mut self) -> PixelFxResult<T> {
        if let Some(done) = self.done.take() {
            return done;
        }
        self.rx
            .recv()
            .map_err(|_| PixelFxError::render("render task ended without a result"))?
    }

    fn poll(&mut self) {
        if self.done.is_some() {
            return;
        }
        match self.rx.try_recv() {
            Ok(result) => self.done = Some(result),
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => {
                self.done = Some(Err(PixelFxError::render(
                    "render task ended without a result",
                )));
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
