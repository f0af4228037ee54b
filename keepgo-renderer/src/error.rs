//! Error types for keepgo-renderer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// A user override template failed to parse or render.
    #[error("custom {key} template failed: {source}")]
    Override {
        key: &'static str,
        #[source]
        source: tera::Error,
    },

    /// Building the tera context failed.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    #[error("failed to format unit: {0}")]
    Format(#[from] std::fmt::Error),
}
