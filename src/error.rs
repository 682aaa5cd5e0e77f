//! Error handling for abcweb.
//! Defines the error type and result alias used throughout the application.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while scaffolding a new application.
///
/// Skipping a directory subtree is not an error; see [`crate::skip::SkipDecision`].
#[derive(Error, Debug)]
pub enum Error {
    /// The path argument does not resolve to a usable application path or name.
    #[error("Invalid application path '{path}': {reason}.")]
    InvalidPath { path: String, reason: &'static str },

    /// A filesystem operation failed. Always carries the offending path.
    #[error("IO error at '{}': {source}.", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A template file could not be parsed or rendered.
    #[error("Failed to render template '{path}': {source}.")]
    TemplateRenderError {
        path: String,
        #[source]
        source: minijinja::Error,
    },

    /// A rendered source file was rejected by its formatter.
    #[error("Failed to format '{}': {message}.", .path.display())]
    FormatError { path: PathBuf, message: String },

    /// Key pair or certificate construction failed.
    #[error("Certificate generation error: {0}.")]
    CertGenerationError(#[from] openssl::error::ErrorStack),

    /// Certificate files already exist and regeneration was not requested.
    #[error(
        "Certificate file '{}' already exists, use --tls-certs-only or --force to replace it.",
        .path.display()
    )]
    CertExistsError { path: PathBuf },

    /// The defaults file or the render context is invalid.
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    #[error("Output directory '{output_dir}' already exists. Use --force to overwrite it.")]
    OutputDirectoryExistsError { output_dir: String },
}

impl Error {
    /// Wraps an [`io::Error`] together with the path it happened on.
    pub fn io<P: AsRef<Path>>(path: P, source: io::Error) -> Self {
        Error::IoError { path: path.as_ref().to_path_buf(), source }
    }
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    eprintln!("{}", err);
    std::process::exit(1);
}
