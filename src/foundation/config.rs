use crate::foundation::error::{PixelFxError, PixelFxResult};

/// Env var forcing strictly sequential scanline execution when truthy.
pub const ENV_SINGLE_THREADED: &str = "PIXELFX_SINGLE_THREADED";
/// Env var overriding the worker pool size (positive integer).
pub const ENV_THREADS: &str = "PIXELFX_THREADS";

/// Engine-wide execution settings.
///
/// Consulted at the start of every apply/render call. Held by a [`crate::PixelEngine`] rather than
/// living in global state; mutate it between calls, never during one.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Run every scanline on the calling thread, top to bottom, checking cancellation before each.
    pub single_threaded: bool,
    /// Override the number of rayon worker threads. `None` uses rayon defaults (hardware
    /// parallelism).
    pub threads: Option<usize>,
}

impl EngineSettings {
    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> PixelFxResult<Self> {
        serde_json::from_str(json).map_err(|e| PixelFxError::serde(e.to_string()))
    }

    /// Apply `PIXELFX_SINGLE_THREADED` / `PIXELFX_THREADS` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides using `lookup` as the variable source.
    ///
    /// Unparseable values are ignored and leave the current setting in place.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup(ENV_SINGLE_THREADED) {
            self.single_threaded = is_truthy(&raw);
        }
        if let Some(n) = lookup(ENV_THREADS)
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
        {
            self.threads = Some(n);
        }
        self
    }

    pub(crate) fn validate(&self) -> PixelFxResult<()> {
        if let Some(n) = self.threads
            && n == 0
        {
            return Err(PixelFxError::validation(
                "engine settings 'threads' must be >= 1 when set",
            ));
        }
        Ok(())
    }
}

fn is_truthy(raw: &str) -> bool {
    let normalized = raw.trim().to_ascii_lowercase();
    normalized == "1" || normalized == "true" || normalized == "yes" || normalized == "on"
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
