//! Per-attempt build directories.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// An isolated directory holding one build attempt's checkout.
///
/// The directory tree is removed when the workspace is released or dropped, whichever
/// happens first, so every exit path of a build attempt cleans up after itself.
#[derive(Debug)]
pub struct Workspace {
    /// Location of the workspace.
    path: PathBuf,
    /// Tool specific cache directories, relative to `path`, removed before the tree itself.
    cache_dirs: Vec<PathBuf>,
    /// Whether the tree has already been removed.
    released: bool,
}

impl Workspace {
    /// Allocate a fresh, empty directory under `parent`.
    ///
    /// Names are random UUIDs. A name is only accepted once `create_dir` succeeds on it,
    /// so concurrent builds sharing `parent` never end up in the same directory.
    ///
    /// # Errors
    /// Errors if `parent` cannot be created or a directory cannot be created inside it.
    pub fn allocate(parent: &Path, cache_dirs: &[PathBuf]) -> io::Result<Self> {
        fs::create_dir_all(parent)?;
        loop {
            let path = parent.join(Uuid::new_v4().to_string());
            match fs::create_dir(&path) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "Allocated workspace");
                    return Ok(Self {
                        path,
                        cache_dirs: cache_dirs.to_vec(),
                        released: false,
                    });
                }
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                    tracing::trace!(path = %path.display(), "Workspace name taken, retrying");
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Location of the workspace.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the workspace. Safe to call more than once.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        for cache_dir in &self.cache_dirs {
            release(&self.path.join(cache_dir));
        }
        release(&self.path);
        self.released = true;
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.release();
    }
}

/// Recursively remove `path` if it exists.
///
/// Never fails: removal errors are logged and otherwise ignored.
pub fn release(path: &Path) {
    if !path.exists() {
        return;
    }
    match fs::remove_dir_all(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed directory"),
        Err(err) => tracing::warn!(path = %path.display(), "Failed to remove directory: {err}"),
    }
}
