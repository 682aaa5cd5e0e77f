//! abcweb's application entry point.
//! Parses the command line, resolves the application path and runs the
//! template processor and the TLS provisioner.

use abcweb::{
    cli::{get_args, Args},
    config::{load_defaults, Config, Defaults},
    error::{default_error_handler, Result},
    format::GoFmt,
    fs::{FileSystem, OsFs},
    logger::init_logger,
    paths::{resolve_app_path, workspace_root},
    processor::{ensure_output_dir, Processor},
    renderer::MiniJinjaRenderer,
    skip::SkipRules,
    tls::{check_existing_certs, generate_tls_certs},
};
use log::{debug, info};

fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// # Flow
/// 1. Resolves the application path under the workspace root
/// 2. Builds the configuration from flags and the defaults file
/// 3. Generates the application tree (unless only certificates are requested)
/// 4. Provisions the development TLS certificate
fn run(args: Args) -> Result<()> {
    let fs = OsFs::new();

    let root = workspace_root(args.workspace_root.as_deref())?;
    let app = resolve_app_path(&args.import_path, &root)?;
    debug!("Resolved '{}' to {}", args.import_path, app.app_path.display());

    let defaults = match &args.defaults {
        Some(path) => load_defaults(path)?,
        None => Defaults::default(),
    };
    let config = Config::new(&args, app, defaults);

    if !config.tls_certs_only {
        generate_app(&fs, &config, &args)?;
    }

    generate_tls_certs(&fs, &config)?;

    if !config.silent {
        println!("Application '{}' is ready in {}.", config.app_name, config.app_path.display());
    }
    Ok(())
}

fn generate_app(fs: &dyn FileSystem, config: &Config, args: &Args) -> Result<()> {
    ensure_output_dir(fs, &config.app_path, args.force)?;
    check_existing_certs(fs, config)?;

    let renderer = MiniJinjaRenderer::new();
    let rules = SkipRules::new()?;
    let gofmt = GoFmt::new();
    let processor =
        Processor::new(fs, &renderer, &rules, config, &args.templates)?.with_formatter(&gofmt);

    let generated = processor.run(|item| {
        if !config.silent {
            println!("{}: '{}'", item.action, item.clean_path);
        }
    })?;

    info!("Generated {} entries from {}", generated, args.templates.display());
    Ok(())
}
