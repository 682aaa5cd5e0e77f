use abcweb::cli::Args;
use abcweb::config::Bootstrap;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

fn make_args(args: &[&str]) -> Vec<OsString> {
    let mut res = vec![OsString::from("abcweb")];
    res.extend(args.iter().map(OsString::from));
    res
}

#[test]
fn test_basic_args() {
    let args = make_args(&["./github.com/me/app"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert_eq!(parsed.import_path, "./github.com/me/app");
    assert_eq!(parsed.templates, PathBuf::from("templates"));
    assert_eq!(parsed.workspace_root, None);
    assert_eq!(parsed.bootstrap, None);
    assert_eq!(parsed.tls_common_name, None);
    assert!(!parsed.no_readme);
    assert!(!parsed.tls_certs_only);
    assert!(!parsed.force);
    assert!(!parsed.silent);
    assert!(!parsed.verbose);
}

#[test]
fn test_all_flags() {
    let args = make_args(&[
        "--no-readme",
        "--no-gitignore",
        "--no-config",
        "--no-fontawesome",
        "--no-bootstrap-js",
        "--no-sessions",
        "--bootstrap",
        "gridrebootonly",
        "--tls-common-name",
        "dragons",
        "--tls-certs-only",
        "--templates",
        "/tmp/templates",
        "--workspace-root",
        "/go",
        "--defaults",
        "defaults.yaml",
        "--force",
        "--silent",
        "--verbose",
        "/app",
    ]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert!(parsed.no_readme);
    assert!(parsed.no_gitignore);
    assert!(parsed.no_config);
    assert!(parsed.no_fontawesome);
    assert!(parsed.no_bootstrap_js);
    assert!(parsed.no_sessions);
    assert_eq!(parsed.bootstrap, Some(Bootstrap::GridRebootOnly));
    assert_eq!(parsed.tls_common_name.as_deref(), Some("dragons"));
    assert!(parsed.tls_certs_only);
    assert_eq!(parsed.templates, PathBuf::from("/tmp/templates"));
    assert_eq!(parsed.workspace_root, Some(PathBuf::from("/go")));
    assert_eq!(parsed.defaults, Some(PathBuf::from("defaults.yaml")));
    assert!(parsed.force);
    assert!(parsed.silent);
    assert!(parsed.verbose);
}

#[test]
fn test_short_flags() {
    let args = make_args(&["-f", "-s", "-v", "-t", "tpl", "/app"]);
    let parsed = Args::try_parse_from(args).unwrap();

    assert!(parsed.force);
    assert!(parsed.silent);
    assert!(parsed.verbose);
    assert_eq!(parsed.templates, PathBuf::from("tpl"));
}

#[test]
fn test_bootstrap_variants() {
    for (value, expected) in [
        ("none", Bootstrap::None),
        ("regular", Bootstrap::Regular),
        ("flex", Bootstrap::Flex),
        ("gridonly", Bootstrap::GridOnly),
        ("rebootonly", Bootstrap::RebootOnly),
    ] {
        let parsed = Args::try_parse_from(make_args(&["--bootstrap", value, "/app"])).unwrap();
        assert_eq!(parsed.bootstrap, Some(expected));
    }

    assert!(Args::try_parse_from(make_args(&["--bootstrap", "tailwind", "/app"])).is_err());
}

#[test]
fn test_missing_args() {
    let args = make_args(&[]);
    assert!(Args::try_parse_from(args).is_err());
}

#[test]
fn test_too_many_args() {
    let args = make_args(&["/app", "extra"]);
    assert!(Args::try_parse_from(args).is_err());
}
