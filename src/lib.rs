//! pixelfx is a parallel scanline pixel-processing engine.
//!
//! It applies a per-pixel or per-scanline transform across a rectangular region of interest
//! (ROI) of one or two RGBA8 surfaces, splitting the work by scanline over a rayon worker pool.
//!
//! # Pieces
//!
//! - **Surfaces** ([`Surface`]): row-major pixel storage with `begin_update`/`end_update`
//!   brackets. [`PixelBuffer`] is the owned implementation.
//! - **Transforms**: a [`PointTransform`] maps one pixel to one pixel; an [`Effect`] renders a
//!   whole scanline with read access to the entire source (blurs, convolutions) and gets a
//!   one-time [`Effect::on_begin_render`] setup hook.
//! - **Engine** ([`PixelEngine`]): four entry points (in-place, copy, effect copy, effect
//!   in-place), each with an async twin returning a [`RenderTask`].
//! - **Progress** ([`ProgressSink`]): reports the largest top-anchored rectangle whose every
//!   scanline is done, regardless of the order workers finish in.
//! - **Cancellation** ([`CancelToken`]): checked at scanline boundaries only.
//!
//! The key constraints:
//!
//! - **No unsafe**: rows are handed to workers as disjoint `&mut [Rgba8]` slices.
//! - **Deterministic output**: sequential and parallel execution produce identical pixels.
//! - **Brackets always pair**: `end_update` runs on completion, cancellation, error and panic.
#![forbid(unsafe_code)]

mod exec;
mod foundation;
mod render;
mod surface;
mod transform;

pub use exec::cancel::CancelToken;
pub use exec::progress::{ProgressSink, ProgressUpdate};
pub use exec::range::RangeExecutor;
pub use foundation::config::{ENV_SINGLE_THREADED, ENV_THREADS, EngineSettings};
pub use foundation::core::{Rect, Rgba8};
pub use foundation::error::{PixelFxError, PixelFxResult};
pub use render::engine::PixelEngine;
pub use render::options::RenderOptions;
pub use render::task::RenderTask;
pub use surface::buffer::PixelBuffer;
pub use surface::view::SourceView;
pub use surface::{Surface, UpdateGuard};
pub use transform::blur::GaussianBlurEffect;
pub use transform::effect::{Effect, PointEffect};
pub use transform::point::{
    Desaturate, Fill, FnTransform, Identity, InvertRgb, PointTransform, SetAlpha,
};
