use std::path::{Path, PathBuf};

use abcweb::config::Config;
use abcweb::error::Error;
use abcweb::fs::{FileSystem, MemoryFs, OsFs};
use abcweb::processor::{ensure_output_dir, Processor};
use abcweb::renderer::MiniJinjaRenderer;
use abcweb::skip::SkipRules;
use abcweb::tls::{build_self_signed, check_existing_certs, generate_tls_certs, RSA_BITS};
use openssl::nid::Nid;
use openssl::pkey::PKey;
use openssl::x509::X509;
use tempfile::TempDir;

fn config() -> Config {
    Config {
        app_path: PathBuf::from("/out/spiders"),
        app_name: "spiders".to_string(),
        tls_common_name: "dragons".to_string(),
        tls_certs_only: false,
        silent: true,
        ..Default::default()
    }
}

#[test]
fn test_generate_writes_both_files() {
    let fs = MemoryFs::new();
    generate_tls_certs(&fs, &config()).unwrap();

    let cert = fs.read(Path::new("/out/spiders/cert.pem")).unwrap();
    let key = fs.read(Path::new("/out/spiders/private.key")).unwrap();
    assert!(!cert.is_empty(), "expected non-0 size for cert file");
    assert!(!key.is_empty(), "expected non-0 size for private key file");

    assert_eq!(fs.metadata(Path::new("/out/spiders/private.key")).unwrap().mode, 0o600);
}

#[test]
fn test_certificate_contents() {
    let pair = build_self_signed("dragons").unwrap();
    let cert = X509::from_pem(&pair.cert_pem).unwrap();
    let key = PKey::private_key_from_pem(&pair.key_pem).unwrap();

    let common_name = cert
        .subject_name()
        .entries_by_nid(Nid::COMMONNAME)
        .next()
        .unwrap()
        .data()
        .as_utf8()
        .unwrap()
        .to_string();
    assert_eq!(common_name, "dragons");

    assert!(cert.public_key().unwrap().public_eq(&key));
    assert_eq!(key.bits(), RSA_BITS);

    let validity = cert.not_before().diff(cert.not_after()).unwrap();
    assert!(validity.days >= 364);

    let alt_names = cert.subject_alt_names().unwrap();
    assert_eq!(alt_names.iter().next().unwrap().dnsname(), Some("dragons"));
}

#[test]
fn test_ip_common_name_uses_ip_alt_name() {
    let pair = build_self_signed("127.0.0.1").unwrap();
    let cert = X509::from_pem(&pair.cert_pem).unwrap();

    let alt_names = cert.subject_alt_names().unwrap();
    assert_eq!(alt_names.iter().next().unwrap().ipaddress(), Some(&[127, 0, 0, 1][..]));
}

#[test]
fn test_blank_common_name_is_rejected() {
    assert!(matches!(build_self_signed("  "), Err(Error::ConfigError(_))));
}

#[test]
fn test_second_run_fails_without_certs_only() {
    let fs = MemoryFs::new();
    let config = config();
    generate_tls_certs(&fs, &config).unwrap();
    let first = fs.read(Path::new("/out/spiders/cert.pem")).unwrap();

    match generate_tls_certs(&fs, &config) {
        Err(Error::CertExistsError { path }) => {
            assert_eq!(path, PathBuf::from("/out/spiders/cert.pem"))
        }
        other => panic!("Expected CertExistsError, got {:?}", other),
    }
    assert_eq!(fs.read(Path::new("/out/spiders/cert.pem")).unwrap(), first);
}

#[test]
fn test_certs_only_regenerates() {
    let fs = MemoryFs::new();
    let config = Config { tls_certs_only: true, ..config() };
    generate_tls_certs(&fs, &config).unwrap();
    let first = fs.read(Path::new("/out/spiders/private.key")).unwrap();

    generate_tls_certs(&fs, &config).unwrap();
    let second = fs.read(Path::new("/out/spiders/private.key")).unwrap();
    assert_ne!(first, second);
}

fn generate_app(fs: &MemoryFs, config: &Config) -> abcweb::error::Result<()> {
    ensure_output_dir(fs, &config.app_path, config.force)?;
    check_existing_certs(fs, config)?;
    let renderer = MiniJinjaRenderer::new();
    let rules = SkipRules::new()?;
    Processor::new(fs, &renderer, &rules, config, Path::new("/templates"))?.run(|_| {})?;
    generate_tls_certs(fs, config)
}

#[test]
fn test_forced_rerun_replaces_tree_and_certs() {
    let fs = MemoryFs::new();
    fs.write(Path::new("/templates/main.go.tmpl"), b"package {{ app_name }}\n", 0o644)
        .unwrap();
    let config = config();
    generate_app(&fs, &config).unwrap();
    let first = fs.read(Path::new("/out/spiders/private.key")).unwrap();

    let forced = Config { force: true, ..config.clone() };
    generate_app(&fs, &forced).unwrap();

    let second = fs.read(Path::new("/out/spiders/private.key")).unwrap();
    assert_ne!(first, second);
    assert_eq!(fs.read(Path::new("/out/spiders/main.go")).unwrap(), b"package spiders\n");
}

#[test]
fn test_cert_conflict_found_before_tree_is_written() {
    let fs = MemoryFs::new();
    fs.write(Path::new("/templates/main.go.tmpl"), b"package {{ app_name }}\n", 0o644)
        .unwrap();
    fs.write(Path::new("/out/spiders/cert.pem"), b"old", 0o644).unwrap();
    let config = config();

    // The application directory is allowed to exist here, only the certificate conflicts.
    assert!(ensure_output_dir(&fs, &config.app_path, true).is_ok());
    assert!(matches!(
        check_existing_certs(&fs, &config),
        Err(Error::CertExistsError { .. })
    ));
    assert!(!fs.exists(Path::new("/out/spiders/main.go")));
    assert!(check_existing_certs(&fs, &Config { force: true, ..config }).is_ok());
}

#[test]
fn test_write_failure_names_the_file() {
    let fs = MemoryFs::new();
    // A directory where the key should go makes the second write fail.
    fs.create_dir_all(Path::new("/out/spiders/private.key"), 0o755).unwrap();
    let config = Config { tls_certs_only: true, ..config() };

    match generate_tls_certs(&fs, &config) {
        Err(Error::IoError { path, .. }) => {
            assert_eq!(path, PathBuf::from("/out/spiders/private.key"))
        }
        other => panic!("Expected IoError, got {:?}", other),
    }
    assert!(fs.exists(Path::new("/out/spiders/cert.pem")));
}

#[test]
fn test_generate_on_disk() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config { app_path: temp_dir.path().join("spiders"), ..config() };

    generate_tls_certs(&OsFs::new(), &config).unwrap();

    let cert = std::fs::read(config.app_path.join("cert.pem")).unwrap();
    assert!(X509::from_pem(&cert).is_ok());
    let key = std::fs::read(config.app_path.join("private.key")).unwrap();
    assert!(PKey::private_key_from_pem(&key).is_ok());
}
