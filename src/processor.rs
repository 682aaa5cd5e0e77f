//! Turns a template tree into a new application tree.
//!
//! The [`Processor`] handles one entry at a time: skip check, path projection,
//! then a directory creation, a byte copy or a template render. [`Processor::run`]
//! drives it over the whole tree through [`FileSystem::walk`].

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::SourceFormatter;
use crate::fs::{Entry, FileSystem, WalkControl};
use crate::paths::{project_path, strip_template_suffix};
use crate::renderer::TemplateRenderer;
use crate::skip::{SkipDecision, SkipRules};

/// What was done to produce an output entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Created,
    Copied,
    Rendered,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Created => write!(f, "Created"),
            Action::Copied => write!(f, "Copied"),
            Action::Rendered => write!(f, "Rendered"),
        }
    }
}

/// An entry written to the application tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    /// Display path rooted at the application name.
    pub clean_path: String,
    pub dest_path: PathBuf,
    pub action: Action,
}

/// Result of processing a single template tree entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visit {
    Skipped,
    /// The entry is a directory whose contents must not be visited.
    SkippedSubtree,
    Generated(Generated),
}

/// Returns true when `path` names a template file, e.g. `main.go.tmpl`.
pub fn is_template_file<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(strip_template_suffix)
        .is_some()
}

/// Ensures the application directory is safe to write to.
///
/// # Errors
/// * `Error::OutputDirectoryExistsError` if it exists and `force` is false
pub fn ensure_output_dir(fs: &dyn FileSystem, output_dir: &Path, force: bool) -> Result<()> {
    if fs.exists(output_dir) && !force {
        return Err(Error::OutputDirectoryExistsError {
            output_dir: output_dir.display().to_string(),
        });
    }
    Ok(())
}

pub struct Processor<'a> {
    fs: &'a dyn FileSystem,
    renderer: &'a dyn TemplateRenderer,
    formatter: Option<&'a dyn SourceFormatter>,
    rules: &'a SkipRules,
    config: &'a Config,
    context: serde_json::Value,
    tree_root: &'a Path,
}

impl<'a> Processor<'a> {
    /// # Errors
    /// * `Error::ConfigError` if `config` cannot be turned into a render context
    pub fn new(
        fs: &'a dyn FileSystem,
        renderer: &'a dyn TemplateRenderer,
        rules: &'a SkipRules,
        config: &'a Config,
        tree_root: &'a Path,
    ) -> Result<Self> {
        let context = config.to_context()?;
        Ok(Self { fs, renderer, formatter: None, rules, config, context, tree_root })
    }

    /// Passes rendered output through `formatter` before it is written.
    pub fn with_formatter(mut self, formatter: &'a dyn SourceFormatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Processes one entry of the template tree.
    ///
    /// # Errors
    /// * `Error::IoError` if reading the entry or writing its output fails
    /// * `Error::TemplateRenderError` if a template file fails to render
    pub fn process(&self, entry: &Entry) -> Result<Visit> {
        match self.rules.decide(self.config, self.tree_root, &entry.path, entry.is_dir) {
            SkipDecision::SkipSubtree => return Ok(Visit::SkippedSubtree),
            SkipDecision::SkipEntry => return Ok(Visit::Skipped),
            SkipDecision::Keep => {}
        }

        let (clean_path, dest_path) =
            project_path(&entry.path, self.tree_root, entry.is_dir, self.config)?;
        debug!("Processing source: {} -> {}", entry.path.display(), dest_path.display());

        let action = if entry.is_dir {
            self.fs
                .create_dir_all(&dest_path, entry.mode)
                .map_err(|e| Error::io(&dest_path, e))?;
            Action::Created
        } else if is_template_file(&entry.path) {
            let content = self.read(&entry.path)?;
            let content = String::from_utf8(content).map_err(|e| {
                Error::io(&entry.path, io::Error::new(io::ErrorKind::InvalidData, e))
            })?;
            let mut rendered =
                self.renderer.render(&entry.path.display().to_string(), &content, &self.context)?;
            if let Some(formatter) = self.formatter {
                if let Some(formatted) = formatter.format(&dest_path, &rendered)? {
                    rendered = formatted;
                }
            }
            self.write(&dest_path, rendered.as_bytes(), entry.mode)?;
            Action::Rendered
        } else {
            let content = self.read(&entry.path)?;
            self.write(&dest_path, &content, entry.mode)?;
            Action::Copied
        };

        Ok(Visit::Generated(Generated { clean_path, dest_path, action }))
    }

    /// Walks the whole template tree, calling `on_progress` for every entry
    /// written. Returns the number of written entries.
    ///
    /// The first failure aborts the walk; whatever was written stays in place.
    pub fn run<F: FnMut(&Generated)>(&self, mut on_progress: F) -> Result<usize> {
        debug!("Processing template tree {}", self.tree_root.display());
        let mut generated = 0;

        self.fs.walk(self.tree_root, &mut |entry| match self.process(entry)? {
            Visit::SkippedSubtree => Ok(WalkControl::SkipSubtree),
            Visit::Skipped => Ok(WalkControl::Continue),
            Visit::Generated(item) => {
                generated += 1;
                on_progress(&item);
                Ok(WalkControl::Continue)
            }
        })?;

        Ok(generated)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.fs.read(path).map_err(|e| Error::io(path, e))
    }

    fn write(&self, path: &Path, content: &[u8], mode: u32) -> Result<()> {
        self.fs.write(path, content, mode).map_err(|e| Error::io(path, e))
    }
}
