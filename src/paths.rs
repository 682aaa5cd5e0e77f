//! Path handling: where the application goes and where each template entry lands.
//!
//! Both halves are pure; nothing here touches the filesystem.

use std::ffi::{OsStr, OsString};
use std::path::{Component, Path, PathBuf};

use crate::config::Config;
use crate::constants::{TEMPLATES_DIR, TEMPLATE_SUFFIX};
use crate::error::{Error, Result};

/// The three values derived from the user supplied path argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPath {
    /// Filesystem destination of the generated project.
    pub app_path: PathBuf,
    /// Import path of the application's package.
    pub import_path: String,
    /// Short application name, the last segment of `app_path`.
    pub app_name: String,
}

/// Resolves the path argument against the workspace root.
///
/// * `/a/b` resolves to `<root>/src/a/b` with import path `/a/b`.
/// * `./a/b` and `a/b` resolve to `<root>/src/a/b` with import path `a/b`.
///
/// # Errors
/// * `Error::InvalidPath` for `.`, `/`, empty input, or any input containing an
///   empty, `.` or `..` segment.
pub fn resolve_app_path<P: AsRef<Path>>(arg: &str, workspace_root: P) -> Result<AppPath> {
    let invalid = |reason| Error::InvalidPath { path: arg.to_string(), reason };

    let trimmed = arg.trim_end_matches('/');
    let relative = trimmed.strip_prefix("./").unwrap_or(trimmed).trim_start_matches('/');
    if relative.is_empty() {
        return Err(invalid("no application name can be derived from it"));
    }

    let segments: Vec<&str> = relative.split('/').collect();
    if segments.iter().any(|s| s.is_empty() || *s == "." || *s == "..") {
        return Err(invalid("empty, '.' and '..' segments are not allowed"));
    }

    let import_path = if trimmed.starts_with('/') { trimmed } else { relative };
    let app_name = segments[segments.len() - 1];

    Ok(AppPath {
        app_path: workspace_root.as_ref().join("src").join(relative),
        import_path: import_path.to_string(),
        app_name: app_name.to_string(),
    })
}

/// Picks the workspace root: the explicit one, else the first `GOPATH`
/// entry, else `$HOME/go`.
pub fn workspace_root(explicit: Option<&Path>) -> Result<PathBuf> {
    workspace_root_from(
        explicit,
        std::env::var_os("GOPATH"),
        std::env::var_os("HOME"),
    )
}

pub fn workspace_root_from(
    explicit: Option<&Path>,
    gopath: Option<OsString>,
    home: Option<OsString>,
) -> Result<PathBuf> {
    if let Some(root) = explicit {
        return Ok(root.to_path_buf());
    }
    if let Some(first) = gopath
        .as_deref()
        .and_then(|gopath| std::env::split_paths(gopath).next())
        .filter(|p| !p.as_os_str().is_empty())
    {
        return Ok(first);
    }
    match home.filter(|h| !h.is_empty()) {
        Some(home) => Ok(PathBuf::from(home).join("go")),
        None => Err(Error::InvalidPath {
            path: String::new(),
            reason: "cannot determine the workspace root, set GOPATH or --workspace-root",
        }),
    }
}

/// Returns the output name of a template file, or `None` when `name` does not
/// carry the template suffix.
pub fn strip_template_suffix(name: &str) -> Option<&str> {
    name.strip_suffix(TEMPLATE_SUFFIX).filter(|stem| !stem.is_empty())
}

/// Maps a template tree path to its display path and its destination.
///
/// The display ("clean") path is rooted at the application name and always
/// uses `/`. The template suffix is removed from the last component of files
/// only; directories keep their names.
///
/// # Errors
/// * `Error::InvalidPath` if `template_path` is not below `tree_root`
pub fn project_path(
    template_path: &Path,
    tree_root: &Path,
    is_dir: bool,
    config: &Config,
) -> Result<(String, PathBuf)> {
    let relative = template_path.strip_prefix(tree_root).map_err(|_| Error::InvalidPath {
        path: template_path.display().to_string(),
        reason: "it is outside of the template tree",
    })?;

    let mut components: Vec<&OsStr> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name),
            _ => None,
        })
        .collect();

    // A tree rooted directly above the templates directory maps its contents
    // to the application root. From the filesystem root the first templates
    // segment marks the tree, wherever it sits.
    if tree_root.file_name() != Some(OsStr::new(TEMPLATES_DIR)) {
        let from_fs_root = tree_root.has_root() && tree_root.parent().is_none();
        let pos = if from_fs_root {
            components.iter().position(|c| *c == TEMPLATES_DIR)
        } else {
            components.first().filter(|c| **c == TEMPLATES_DIR).map(|_| 0)
        };
        if let Some(pos) = pos {
            components.drain(..=pos);
        }
    }

    if let Some(last) = components.last_mut().filter(|_| !is_dir) {
        let name: &OsStr = *last;
        if let Some(stripped) = name.to_str().and_then(strip_template_suffix) {
            *last = OsStr::new(stripped);
        }
    }

    let remainder: PathBuf = components.iter().collect();
    let mut clean_path = config.app_name.clone();
    for component in &components {
        clean_path.push('/');
        clean_path.push_str(&component.to_string_lossy());
    }

    Ok((clean_path, config.app_path.join(remainder)))
}
