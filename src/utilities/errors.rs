//! Error types for configuration and file utilities.

use thiserror::Error;

/// Errors reading or writing JSON configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("config io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file content is not valid JSON for the expected shape.
    #[error("config parse error at {path}: {message}")]
    Parse { path: String, message: String },
}
