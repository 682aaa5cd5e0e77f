//! Development TLS certificate provisioning.
//!
//! Generates an RSA key and a self-signed certificate for the configured common
//! name and writes them as `cert.pem` and `private.key` into the application root.

use std::net::IpAddr;

use log::{debug, info, warn};
use openssl::asn1::Asn1Time;
use openssl::bn::{BigNum, MsbOption};
use openssl::hash::MessageDigest;
use openssl::pkey::PKey;
use openssl::rsa::Rsa;
use openssl::x509::extension::{
    BasicConstraints, ExtendedKeyUsage, KeyUsage, SubjectAlternativeName,
};
use openssl::x509::{X509NameBuilder, X509};

use crate::config::Config;
use crate::constants::{CERT_FILE, KEY_FILE};
use crate::error::{Error, Result};
use crate::fs::FileSystem;

pub const RSA_BITS: u32 = 2048;
pub const VALIDITY_DAYS: u32 = 365;
pub const ORGANIZATION: &str = "abcweb";

const CERT_MODE: u32 = 0o644;
const KEY_MODE: u32 = 0o600;

/// PEM encoded certificate and matching private key.
pub struct CertPair {
    pub cert_pem: Vec<u8>,
    pub key_pem: Vec<u8>,
}

/// Builds a self-signed server certificate for `common_name`.
///
/// # Errors
/// * `Error::ConfigError` if `common_name` is blank
/// * `Error::CertGenerationError` on any OpenSSL failure
pub fn build_self_signed(common_name: &str) -> Result<CertPair> {
    if common_name.trim().is_empty() {
        return Err(Error::ConfigError("TLS common name must not be empty".to_string()));
    }

    let rsa = Rsa::generate(RSA_BITS)?;
    let key_pem = rsa.private_key_to_pem()?;
    let key = PKey::from_rsa(rsa)?;

    let mut name = X509NameBuilder::new()?;
    name.append_entry_by_text("O", ORGANIZATION)?;
    name.append_entry_by_text("CN", common_name)?;
    let name = name.build();

    let serial = {
        let mut serial = BigNum::new()?;
        serial.rand(128, MsbOption::MAYBE_ZERO, false)?;
        serial.to_asn1_integer()?
    };

    let mut builder = X509::builder()?;
    builder.set_version(2)?;
    builder.set_serial_number(&serial)?;
    builder.set_subject_name(&name)?;
    builder.set_issuer_name(&name)?;
    builder.set_pubkey(&key)?;
    let not_before: Asn1Time = Asn1Time::days_from_now(0)?;
    let not_after: Asn1Time = Asn1Time::days_from_now(VALIDITY_DAYS)?;
    builder.set_not_before(&not_before)?;
    builder.set_not_after(&not_after)?;

    builder.append_extension(BasicConstraints::new().critical().build()?)?;
    builder.append_extension(
        KeyUsage::new().critical().digital_signature().key_encipherment().build()?,
    )?;
    builder.append_extension(ExtendedKeyUsage::new().server_auth().build()?)?;

    let mut alt_names = SubjectAlternativeName::new();
    if common_name.parse::<IpAddr>().is_ok() {
        alt_names.ip(common_name);
    } else {
        alt_names.dns(common_name);
    }
    let alt_names = alt_names.build(&builder.x509v3_context(None, None))?;
    builder.append_extension(alt_names)?;

    builder.sign(&key, MessageDigest::sha256())?;
    let cert = builder.build();

    Ok(CertPair { cert_pem: cert.to_pem()?, key_pem })
}

/// Fails if certificate files already exist and may not be replaced.
///
/// Called before the application tree is written so a conflicting rerun
/// fails without touching anything.
///
/// # Errors
/// * `Error::CertExistsError` naming the first existing file
pub fn check_existing_certs(fs: &dyn FileSystem, config: &Config) -> Result<()> {
    let replace = config.tls_certs_only || config.force;
    for path in [config.app_path.join(CERT_FILE), config.app_path.join(KEY_FILE)] {
        if !replace && fs.exists(&path) {
            return Err(Error::CertExistsError { path });
        }
    }
    Ok(())
}

/// Writes a fresh certificate and private key into `config.app_path`.
///
/// Existing files are only replaced in certs-only mode or on a forced run;
/// otherwise finding either of them is an error and nothing is written.
///
/// # Errors
/// * `Error::CertExistsError` if a file exists and neither `tls_certs_only`
///   nor `force` is set
/// * `Error::CertGenerationError` if OpenSSL fails
/// * `Error::IoError` naming the file that could not be written; the other
///   file may already be on disk
pub fn generate_tls_certs(fs: &dyn FileSystem, config: &Config) -> Result<()> {
    let cert_path = config.app_path.join(CERT_FILE);
    let key_path = config.app_path.join(KEY_FILE);

    check_existing_certs(fs, config)?;
    for path in [&cert_path, &key_path].into_iter().filter(|p| fs.exists(p)) {
        warn!("Overwriting {}", path.display());
    }

    debug!("Generating {} bit RSA key for '{}'", RSA_BITS, config.tls_common_name);
    let pair = build_self_signed(&config.tls_common_name)?;

    fs.write(&cert_path, &pair.cert_pem, CERT_MODE).map_err(|e| Error::io(&cert_path, e))?;
    fs.write(&key_path, &pair.key_pem, KEY_MODE).map_err(|e| Error::io(&key_path, e))?;

    info!(
        "TLS certificate for '{}' written to {}",
        config.tls_common_name,
        config.app_path.display()
    );
    Ok(())
}
