//! Command-line interface implementation for abcweb.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser};
use std::path::PathBuf;

use crate::config::Bootstrap;

/// Command-line arguments structure for abcweb.
#[derive(Parser, Debug)]
#[command(author, version, about = "abcweb: generate a new web application", long_about = None)]
pub struct Args {
    /// Import path of the new application, e.g. ./github.com/me/app
    #[arg(value_name = "IMPORT_PATH")]
    pub import_path: String,

    /// Directory holding the application template tree
    #[arg(short, long, value_name = "DIR", default_value = "templates")]
    pub templates: PathBuf,

    /// Workspace root the application is created under [default: $GOPATH]
    #[arg(long, value_name = "DIR")]
    pub workspace_root: Option<PathBuf>,

    /// JSON or YAML file with default answers for the flags below
    #[arg(long, value_name = "FILE")]
    pub defaults: Option<PathBuf>,

    /// Skip README.md
    #[arg(long)]
    pub no_readme: bool,

    /// Skip .gitignore
    #[arg(long)]
    pub no_gitignore: bool,

    /// Skip the application configuration file
    #[arg(long)]
    pub no_config: bool,

    /// Skip the Font Awesome assets
    #[arg(long)]
    pub no_fontawesome: bool,

    /// Skip the Bootstrap JavaScript bundle
    #[arg(long)]
    pub no_bootstrap_js: bool,

    /// Skip session support
    #[arg(long)]
    pub no_sessions: bool,

    /// Bootstrap flavour to include [default: regular]
    #[arg(long, value_enum, value_name = "VARIANT")]
    pub bootstrap: Option<Bootstrap>,

    /// Common name of the development TLS certificate [default: localhost]
    #[arg(long, value_name = "NAME")]
    pub tls_common_name: Option<String>,

    /// Only (re)generate the TLS certificate and private key
    #[arg(long)]
    pub tls_certs_only: bool,

    /// Do not print the generated files
    #[arg(short, long)]
    pub silent: bool,

    /// Force overwrite of an existing application directory
    #[arg(short, long)]
    pub force: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                let printed = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                if printed.is_err() {
                    e.exit();
                }
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
