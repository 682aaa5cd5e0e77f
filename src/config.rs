//! Configuration of a single scaffolding run.
//! A [`Config`] is assembled once from the command line, an optional defaults
//! file and the resolved application path, and is never mutated afterwards.
//! It doubles as the render context of template files.

use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::error::{Error, Result};
use crate::paths::AppPath;

/// Default subject of the development certificate.
pub const DEFAULT_TLS_COMMON_NAME: &str = "localhost";

/// CSS framework flavour shipped with the generated application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Bootstrap {
    None,
    #[default]
    Regular,
    Flex,
    #[value(name = "gridonly")]
    GridOnly,
    #[value(name = "rebootonly")]
    RebootOnly,
    #[value(name = "gridrebootonly")]
    GridRebootOnly,
}

impl fmt::Display for Bootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Bootstrap::None => "none",
            Bootstrap::Regular => "regular",
            Bootstrap::Flex => "flex",
            Bootstrap::GridOnly => "gridonly",
            Bootstrap::RebootOnly => "rebootonly",
            Bootstrap::GridRebootOnly => "gridrebootonly",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Config {
    pub app_path: PathBuf,
    pub app_name: String,
    pub import_path: String,
    pub no_readme: bool,
    pub no_git_ignore: bool,
    pub no_config: bool,
    pub no_font_awesome: bool,
    pub no_bootstrap_js: bool,
    pub no_sessions: bool,
    pub bootstrap: Bootstrap,
    pub tls_common_name: String,
    pub tls_certs_only: bool,
    /// Rerun over an existing application, replacing its files.
    pub force: bool,
    pub silent: bool,
}

/// Persisted user preferences. Every field is optional; flags given on the
/// command line win over values found here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Defaults {
    pub no_readme: Option<bool>,
    pub no_git_ignore: Option<bool>,
    pub no_config: Option<bool>,
    pub no_font_awesome: Option<bool>,
    pub no_bootstrap_js: Option<bool>,
    pub no_sessions: Option<bool>,
    pub bootstrap: Option<Bootstrap>,
    pub tls_common_name: Option<String>,
    pub silent: Option<bool>,
}

/// Parses defaults file content, trying JSON first and YAML second.
///
/// # Errors
/// * `Error::ConfigError` if the content is neither valid JSON nor valid YAML
pub fn parse_defaults(content: &str) -> Result<Defaults> {
    if content.trim().is_empty() {
        return Ok(Defaults::default());
    }
    match serde_json::from_str(content) {
        Ok(defaults) => Ok(defaults),
        Err(_) => serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid defaults file: {}", e))),
    }
}

/// Loads a defaults file from disk.
pub fn load_defaults<P: AsRef<Path>>(path: P) -> Result<Defaults> {
    let path = path.as_ref();
    debug!("Loading defaults from {}", path.display());
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_defaults(&content)
}

impl Config {
    /// Builds the run configuration. Command line flags take precedence over
    /// `defaults`, which take precedence over built-in values.
    pub fn new(args: &Args, app: AppPath, defaults: Defaults) -> Self {
        let AppPath { app_path, import_path, app_name } = app;
        let flag = |set: bool, default: Option<bool>| set || default.unwrap_or(false);

        Self {
            app_path,
            app_name,
            import_path,
            no_readme: flag(args.no_readme, defaults.no_readme),
            no_git_ignore: flag(args.no_gitignore, defaults.no_git_ignore),
            no_config: flag(args.no_config, defaults.no_config),
            no_font_awesome: flag(args.no_fontawesome, defaults.no_font_awesome),
            no_bootstrap_js: flag(args.no_bootstrap_js, defaults.no_bootstrap_js),
            no_sessions: flag(args.no_sessions, defaults.no_sessions),
            bootstrap: args.bootstrap.or(defaults.bootstrap).unwrap_or_default(),
            tls_common_name: args
                .tls_common_name
                .clone()
                .or(defaults.tls_common_name)
                .unwrap_or_else(|| DEFAULT_TLS_COMMON_NAME.to_string()),
            tls_certs_only: args.tls_certs_only,
            force: args.force,
            silent: flag(args.silent, defaults.silent),
        }
    }

    /// The configuration as a template render context.
    ///
    /// # Errors
    /// * `Error::ConfigError` if the application path is not valid UTF-8
    pub fn to_context(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self)
            .map_err(|e| Error::ConfigError(format!("Invalid render context: {}", e)))
    }
}
