//! Source formatting of rendered output files.

use std::cell::Cell;
use std::ffi::{OsStr, OsString};
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use log::{debug, warn};

use crate::error::{Error, Result};

/// Post-processes rendered template output.
pub trait SourceFormatter {
    /// Returns the formatted `source` of the output file `path`, or `None`
    /// when the output is kept as rendered.
    fn format(&self, path: &Path, source: &str) -> Result<Option<String>>;
}

/// Runs rendered `.go` files through `gofmt`.
///
/// A missing `gofmt` binary is not an error: a warning is logged once and
/// output is kept as rendered.
pub struct GoFmt {
    command: OsString,
    missing: Cell<bool>,
}

impl Default for GoFmt {
    fn default() -> Self {
        Self::new()
    }
}

impl GoFmt {
    pub fn new() -> Self {
        Self::with_command("gofmt")
    }

    pub fn with_command<S: Into<OsString>>(command: S) -> Self {
        Self { command: command.into(), missing: Cell::new(false) }
    }

    fn run(&self, path: &Path, source: &str) -> io::Result<std::process::Output> {
        let mut child = Command::new(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // gofmt reads all of its input before writing anything.
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(source.as_bytes())?;
        }

        debug!("Formatting {}", path.display());
        child.wait_with_output()
    }
}

impl SourceFormatter for GoFmt {
    fn format(&self, path: &Path, source: &str) -> Result<Option<String>> {
        if path.extension() != Some(OsStr::new("go")) || self.missing.get() {
            return Ok(None);
        }

        let output = match self.run(path, source) {
            Ok(output) => output,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(
                    "'{}' not found, Go sources are written unformatted",
                    self.command.to_string_lossy()
                );
                self.missing.set(true);
                return Ok(None);
            }
            Err(e) => return Err(Error::io(path, e)),
        };

        if !output.status.success() {
            return Err(Error::FormatError {
                path: path.to_path_buf(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout)
            .map(Some)
            .map_err(|e| Error::io(path, io::Error::new(io::ErrorKind::InvalidData, e)))
    }
}
