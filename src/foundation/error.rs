/// Convenience result type used across pixelfx.
pub type PixelFxResult<T> = Result<T, PixelFxError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum PixelFxError {
    /// Invalid caller-provided arguments: mismatched bounds, out-of-bounds ROI, bad settings.
    #[error("validation error: {0}")]
    Validation(String),

    /// Failures raised while rendering scanlines, including client effect faults.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing settings.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from client code or dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PixelFxError {
    /// Build a [`PixelFxError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PixelFxError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`PixelFxError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
