use crate::metadata::RawMetadata;
use chrono::{DateTime, Utc};

/// One file discovered on the share.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    pub relative_path: String,
    pub name: String,
    pub last_modified: Option<DateTime<Utc>>,
    /// Modification value that was present but could not be parsed.
    pub last_modified_raw: Option<String>,
    pub size_bytes: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub kind: EntryKind,
    pub name: String,
    pub metadata: RawMetadata,
}

impl DirectoryEntry {
    #[must_use]
    pub fn directory(name: &str) -> Self {
        Self {
            kind: EntryKind::Directory,
            name: name.to_string(),
            metadata: RawMetadata::default(),
        }
    }

    #[must_use]
    pub fn file(name: &str, metadata: RawMetadata) -> Self {
        Self {
            kind: EntryKind::File,
            name: name.to_string(),
            metadata,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetentionDecision {
    pub record: FileRecord,
    pub expired: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionOutcome {
    pub relative_path: String,
    pub succeeded: bool,
    pub error_message: Option<String>,
}

/// Joins a parent path and a child name without leading, trailing or doubled slashes.
#[must_use]
pub fn join_path(parent: &str, name: &str) -> String {
    let parent = parent.trim_matches('/');
    let name = name.trim_matches('/');
    if parent.is_empty() {
        name.to_string()
    } else if name.is_empty() {
        parent.to_string()
    } else {
        format!("{parent}/{name}")
    }
}
