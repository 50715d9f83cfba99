use crate::error::ShareError;
use crate::metadata::RawMetadata;
use crate::types::DirectoryEntry;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};
use std::cell::Cell;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Pre-authenticated handle to a hierarchical file store. Paths are slash-separated and
/// relative to the share root; the empty string is the root itself.
pub trait Share {
    fn list_children(&self, path: &str) -> Result<Vec<DirectoryEntry>, ShareError>;
    fn delete_file(&self, path: &str) -> Result<(), ShareError>;
    fn write_file(&self, path: &str, content: &[u8]) -> Result<(), ShareError>;
    fn directory_exists(&self, path: &str) -> bool;
    fn create_directory(&self, path: &str) -> Result<(), ShareError>;
}

/// A share that is already mounted on this host (SMB/CIFS, NFS, ...).
/// Authentication happened at mount time.
#[derive(Debug, Clone)]
pub struct MountedShare {
    root: PathBuf,
    skipped_names: Cell<usize>,
}

impl MountedShare {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ShareError> {
        let root = root.into();
        let meta = fs::metadata(&root).map_err(|e| map_io(e, &root.display().to_string()))?;
        if !meta.is_dir() {
            return Err(ShareError::NotFound(format!(
                "{} is not a directory",
                root.display()
            )));
        }
        Ok(Self {
            root,
            skipped_names: Cell::new(0),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Entries left out of listings because their names are not valid UTF-8.
    /// Such a name has no slash-separated relative path, so it can be neither
    /// reported nor deleted by path.
    #[must_use]
    pub fn skipped_names(&self) -> usize {
        self.skipped_names.get()
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, ShareError> {
        let rel = Path::new(path.trim_matches('/'));
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(ShareError::Access(format!("path escapes share root: {path}")));
        }
        Ok(self.root.join(rel))
    }
}

fn map_io(err: std::io::Error, path: &str) -> ShareError {
    match err.kind() {
        ErrorKind::PermissionDenied => ShareError::Access(path.to_string()),
        ErrorKind::NotFound => ShareError::NotFound(path.to_string()),
        _ => ShareError::Io(err),
    }
}

fn file_metadata(meta: &fs::Metadata) -> RawMetadata {
    let mut properties = Map::new();
    if let Ok(modified) = meta.modified() {
        let modified: DateTime<Utc> = modified.into();
        properties.insert("last_modified".to_string(), json!(modified.timestamp()));
    }
    properties.insert("content_length".to_string(), json!(meta.len()));
    RawMetadata::from_value(json!({ "properties": Value::Object(properties) }))
}

impl Share for MountedShare {
    fn list_children(&self, path: &str) -> Result<Vec<DirectoryEntry>, ShareError> {
        let dir = self.resolve(path)?;
        let meta = fs::metadata(&dir).map_err(|e| map_io(e, path))?;
        if !meta.is_dir() {
            return Err(ShareError::NotFound(format!("{path} is not a directory")));
        }

        let mut children = Vec::new();
        for entry in WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| match e.into_io_error() {
                Some(io) => map_io(io, path),
                None => ShareError::Access(format!("{path}: filesystem loop")),
            })?;
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                log::warn!(
                    "Skipping {}: name is not valid UTF-8",
                    entry.path().display()
                );
                self.skipped_names.set(self.skipped_names.get() + 1);
                continue;
            };

            if entry.file_type().is_dir() {
                children.push(DirectoryEntry::directory(&name));
            } else {
                let metadata = match entry.metadata() {
                    Ok(m) => file_metadata(&m),
                    Err(e) => {
                        log::debug!("No metadata for {}: {e}", entry.path().display());
                        RawMetadata::default()
                    }
                };
                children.push(DirectoryEntry::file(&name, metadata));
            }
        }
        Ok(children)
    }

    fn delete_file(&self, path: &str) -> Result<(), ShareError> {
        let full = self.resolve(path)?;
        fs::remove_file(&full).map_err(|e| ShareError::Delete {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    fn write_file(&self, path: &str, content: &[u8]) -> Result<(), ShareError> {
        let full = self.resolve(path)?;
        fs::write(&full, content).map_err(|e| map_io(e, path))
    }

    fn directory_exists(&self, path: &str) -> bool {
        self.resolve(path).is_ok_and(|p| p.is_dir())
    }

    fn create_directory(&self, path: &str) -> Result<(), ShareError> {
        let full = self.resolve(path)?;
        fs::create_dir_all(&full).map_err(|e| map_io(e, path))
    }
}
