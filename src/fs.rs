//! Filesystem access for the scaffolding engine.
//!
//! Every component takes the filesystem as an explicit `&dyn FileSystem`
//! argument. [`OsFs`] talks to the real disk, [`MemoryFs`] keeps a whole tree in
//! memory so tests and dry runs never touch it.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};

const DEFAULT_DIR_MODE: u32 = 0o755;

/// A node of a template tree as seen by a traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: PathBuf,
    pub is_dir: bool,
    /// Permission bits (`0o7777` mask).
    pub mode: u32,
}

/// What a traversal visitor wants the driver to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkControl {
    Continue,
    /// Do not descend into the directory that was just visited.
    SkipSubtree,
}

/// Filesystem capability used by the processor and the TLS provisioner.
pub trait FileSystem {
    /// Visits `root` and everything below it depth-first, parents before
    /// children, siblings in name order. Symbolic links are followed. The first
    /// visitor error aborts the walk.
    fn walk(
        &self,
        root: &Path,
        visit: &mut dyn FnMut(&Entry) -> Result<WalkControl>,
    ) -> Result<()>;

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Writes `contents` to `path`, creating missing parent directories, and
    /// applies `mode` to the file.
    fn write(&self, path: &Path, contents: &[u8], mode: u32) -> io::Result<()>;

    fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool;

    fn metadata(&self, path: &Path) -> io::Result<Entry>;
}

/// The real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFs;

impl OsFs {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
fn mode_of(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn mode_of(metadata: &fs::Metadata) -> u32 {
    if metadata.is_dir() {
        DEFAULT_DIR_MODE
    } else {
        0o644
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}

fn walk_error(root: &Path, err: walkdir::Error) -> Error {
    let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
    Error::io(path, err.into())
}

impl FileSystem for OsFs {
    fn walk(
        &self,
        root: &Path,
        visit: &mut dyn FnMut(&Entry) -> Result<WalkControl>,
    ) -> Result<()> {
        // Symlinks are reported as what they point to; loops surface as errors.
        let mut entries = WalkDir::new(root).follow_links(true).sort_by_file_name().into_iter();
        while let Some(dir_entry) = entries.next() {
            let dir_entry = dir_entry.map_err(|e| walk_error(root, e))?;
            let metadata = dir_entry.metadata().map_err(|e| walk_error(root, e))?;
            let entry = Entry {
                path: dir_entry.path().to_path_buf(),
                is_dir: metadata.is_dir(),
                mode: mode_of(&metadata),
            };

            if visit(&entry)? == WalkControl::SkipSubtree && entry.is_dir {
                debug!("Not descending into {}", entry.path.display());
                entries.skip_current_dir();
            }
        }
        Ok(())
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Path, contents: &[u8], mode: u32) -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
        set_mode(path, mode)
    }

    fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
        fs::create_dir_all(path)?;
        set_mode(path, mode)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn metadata(&self, path: &Path) -> io::Result<Entry> {
        let metadata = fs::metadata(path)?;
        Ok(Entry { path: path.to_path_buf(), is_dir: metadata.is_dir(), mode: mode_of(&metadata) })
    }
}

#[derive(Debug, Clone)]
enum Node {
    Dir { mode: u32 },
    File { contents: Vec<u8>, mode: u32 },
}

/// An in-memory filesystem.
///
/// Paths are stored as given; no normalisation of `.` or `..` happens.
#[derive(Debug, Default)]
pub struct MemoryFs {
    nodes: RefCell<BTreeMap<PathBuf, Node>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_dirs(nodes: &mut BTreeMap<PathBuf, Node>, path: &Path, mode: u32) -> io::Result<()> {
        let mut missing = Vec::new();
        for ancestor in path.ancestors().filter(|p| !p.as_os_str().is_empty()) {
            match nodes.get(ancestor) {
                Some(Node::Dir { .. }) => break,
                Some(Node::File { .. }) => {
                    return Err(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!("'{}' is a file", ancestor.display()),
                    ))
                }
                None => missing.push(ancestor.to_path_buf()),
            }
        }
        for dir in missing {
            nodes.insert(dir, Node::Dir { mode: mode & 0o7777 });
        }
        Ok(())
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("'{}' does not exist", path.display()))
}

impl FileSystem for MemoryFs {
    fn walk(
        &self,
        root: &Path,
        visit: &mut dyn FnMut(&Entry) -> Result<WalkControl>,
    ) -> Result<()> {
        // Snapshot first so the visitor may write into the same tree.
        let entries: Vec<Entry> = self
            .nodes
            .borrow()
            .iter()
            .filter(|(path, _)| path.starts_with(root))
            .map(|(path, node)| match node {
                Node::Dir { mode } => Entry { path: path.clone(), is_dir: true, mode: *mode },
                Node::File { mode, .. } => Entry { path: path.clone(), is_dir: false, mode: *mode },
            })
            .collect();

        if entries.first().map(|e| e.path.as_path()) != Some(root) {
            return Err(Error::io(root, not_found(root)));
        }

        let mut skipped: Option<PathBuf> = None;
        for entry in &entries {
            if let Some(dir) = &skipped {
                if entry.path.starts_with(dir) {
                    continue;
                }
                skipped = None;
            }
            if visit(entry)? == WalkControl::SkipSubtree && entry.is_dir {
                skipped = Some(entry.path.clone());
            }
        }
        Ok(())
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        match self.nodes.borrow().get(path) {
            Some(Node::File { contents, .. }) => Ok(contents.clone()),
            Some(Node::Dir { .. }) => Err(io::Error::new(
                io::ErrorKind::Other,
                format!("'{}' is a directory", path.display()),
            )),
            None => Err(not_found(path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8], mode: u32) -> io::Result<()> {
        let mut nodes = self.nodes.borrow_mut();
        if let Some(Node::Dir { .. }) = nodes.get(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("'{}' is a directory", path.display()),
            ));
        }
        if let Some(parent) = path.parent() {
            Self::insert_dirs(&mut nodes, parent, DEFAULT_DIR_MODE)?;
        }
        nodes.insert(
            path.to_path_buf(),
            Node::File { contents: contents.to_vec(), mode: mode & 0o7777 },
        );
        Ok(())
    }

    fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
        Self::insert_dirs(&mut self.nodes.borrow_mut(), path, mode)
    }

    fn exists(&self, path: &Path) -> bool {
        self.nodes.borrow().contains_key(path)
    }

    fn metadata(&self, path: &Path) -> io::Result<Entry> {
        match self.nodes.borrow().get(path) {
            Some(Node::Dir { mode }) => Ok(Entry { path: path.to_path_buf(), is_dir: true, mode: *mode }),
            Some(Node::File { mode, .. }) => {
                Ok(Entry { path: path.to_path_buf(), is_dir: false, mode: *mode })
            }
            None => Err(not_found(path)),
        }
    }
}
