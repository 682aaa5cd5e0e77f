//! abcweb generates the source tree of a new web application from a template
//! tree. Which files end up in the project depends on feature toggles, and a
//! self-signed TLS key pair is provisioned for local development.

/// Command-line interface module
pub mod cli;

/// Run configuration, also used as the template render context
pub mod config;

pub mod constants;

/// Error types and handling
pub mod error;

/// Formatting of rendered source files
pub mod format;

/// Filesystem capability: real disk and in-memory implementations
pub mod fs;

pub mod logger;

/// Application path resolution and template path projection
pub mod paths;

/// Template tree traversal and output generation
pub mod processor;

pub mod renderer;

/// Rules deciding which template entries are left out
pub mod skip;

/// Development TLS certificate generation
pub mod tls;
