//! Common constants used throughout abcweb.

/// Name of the directory segment that roots the template tree.
pub const TEMPLATES_DIR: &str = "templates";

/// Suffix marking a file as a template; stripped from the output filename.
pub const TEMPLATE_SUFFIX: &str = ".tmpl";

/// Directories that are never generated, for any configuration.
pub const SKIP_DIRS: [&str; 1] = ["i18n"];

/// Certificate file written by the TLS provisioner.
pub const CERT_FILE: &str = "cert.pem";

/// Private key file written by the TLS provisioner.
pub const KEY_FILE: &str = "private.key";
