//! The gated directory: file listing and archive packaging.
//!
//! Archives are gzip-compressed tarballs whose entries are prefixed with
//! the directory's own name, so extracting one recreates the directory.

use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use thiserror::Error;
use walkdir::WalkDir;

/// Errors raised while packaging the bundle.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("bundle directory {0} not found")]
    Missing(PathBuf),

    #[error("failed to read bundle: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("failed to build archive: {0}")]
    Io(#[from] std::io::Error),
}

/// A directory released once the payment is confirmed.
#[derive(Debug, Clone)]
pub struct Bundle {
    root: PathBuf,
}

impl Bundle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    /// Name used inside the archive and for the download.
    pub fn dir_name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "bundle".to_string())
    }

    pub fn archive_name(&self) -> String {
        format!("{}.tar.gz", self.dir_name())
    }

    /// Relative paths of every regular file, `/`-separated and sorted.
    ///
    /// A missing directory lists as empty.
    pub fn list_contents(&self) -> Vec<String> {
        if !self.exists() {
            return Vec::new();
        }

        let mut files: Vec<String> = self
            .files()
            .filter_map(|entry| entry.ok())
            .filter_map(|path| relative_name(&self.root, &path))
            .collect();
        files.sort();
        files
    }

    /// Package the directory as a `.tar.gz` held in memory.
    pub fn build_archive(&self) -> Result<Vec<u8>, BundleError> {
        if !self.exists() {
            return Err(BundleError::Missing(self.root.clone()));
        }

        let prefix = self.dir_name();
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut archive = tar::Builder::new(encoder);

        let mut files = Vec::new();
        for entry in self.files() {
            let path = entry?;
            if let Some(name) = relative_name(&self.root, &path) {
                files.push((name, path));
            }
        }
        files.sort();

        for (name, path) in files {
            archive.append_path_with_name(&path, format!("{}/{}", prefix, name))?;
        }

        let mut encoder = archive.into_inner()?;
        encoder.flush()?;
        Ok(encoder.finish()?)
    }

    fn files(&self) -> impl Iterator<Item = Result<PathBuf, walkdir::Error>> {
        WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) if e.file_type().is_file() => Some(Ok(e.into_path())),
                Ok(_) => None,
                Err(e) => Some(Err(e)),
            })
    }
}

fn relative_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
