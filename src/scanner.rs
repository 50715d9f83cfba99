use crate::error::JanitorError;
use crate::metadata::normalize;
use crate::share::Share;
use crate::types::{EntryKind, FileRecord, join_path};

/// Deeper than this and the share is assumed to be presenting a cycle.
pub const MAX_DEPTH: usize = 1000;

/// Options that narrow a walk. The default walks everything.
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Relative directory paths whose subtrees are not descended into.
    pub skip_dirs: Vec<String>,
}

/// Lists every file below `root`, depth first. Any listing failure aborts the whole walk:
/// a partial inventory would make the retention decision unsafe.
pub fn walk(share: &dyn Share, root: &str) -> Result<Vec<FileRecord>, JanitorError> {
    walk_with(share, root, &WalkOptions::default())
}

pub fn walk_with(
    share: &dyn Share,
    root: &str,
    options: &WalkOptions,
) -> Result<Vec<FileRecord>, JanitorError> {
    let mut records = Vec::new();
    let root = join_path(root, "");
    walk_dir(share, &root, 0, options, &mut records)?;
    log::debug!("Walk of '{root}' found {} files", records.len());
    Ok(records)
}

fn walk_dir(
    share: &dyn Share,
    dir: &str,
    depth: usize,
    options: &WalkOptions,
    out: &mut Vec<FileRecord>,
) -> Result<(), JanitorError> {
    if depth > MAX_DEPTH {
        return Err(JanitorError::Traversal {
            path: dir.to_string(),
            depth,
        });
    }

    for child in share.list_children(dir)? {
        match child.kind {
            EntryKind::Directory => {
                let child_path = join_path(dir, &child.name);
                if options.skip_dirs.iter().any(|s| *s == child_path) {
                    log::debug!("Skipping {child_path}");
                    continue;
                }
                walk_dir(share, &child_path, depth + 1, options, out)?;
            }
            EntryKind::File => out.push(normalize(&child, dir)),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShareError;
    use crate::share::memory::MemoryShare;
    use crate::types::DirectoryEntry;
    use serde_json::json;
    use std::collections::HashSet;

    fn sample_share() -> MemoryShare {
        let share = MemoryShare::new();
        share.add_file("a.txt", json!({ "content_length": 1 }));
        share.add_file("b/c.txt", json!({ "content_length": 2 }));
        share.add_file("b/d/e/f.txt", json!({ "content_length": 3 }));
        share.add_file("b/d/g.txt", json!({}));
        share.add_dir("empty");
        share
    }

    #[test]
    fn test_walk_finds_every_file_once() {
        let share = sample_share();
        let records = walk(&share, "").unwrap();
        let paths: HashSet<_> = records.iter().map(|r| r.relative_path.clone()).collect();
        assert_eq!(records.len(), 4);
        assert_eq!(paths.len(), 4);
        let expected: HashSet<String> = share.file_paths().into_iter().collect();
        assert_eq!(paths, expected);
    }

    #[test]
    fn test_walk_paths_have_no_empty_segments() {
        let records = walk(&sample_share(), "").unwrap();
        for r in &records {
            assert!(!r.relative_path.starts_with('/'));
            assert!(!r.relative_path.ends_with('/'));
            assert!(r.relative_path.split('/').all(|seg| !seg.is_empty()));
            assert!(r.relative_path.ends_with(&r.name));
        }
    }

    #[test]
    fn test_walk_from_subdirectory() {
        let records = walk(&sample_share(), "b/d").unwrap();
        let mut paths: Vec<_> = records.iter().map(|r| r.relative_path.as_str()).collect();
        paths.sort_unstable();
        assert_eq!(paths, vec!["b/d/e/f.txt", "b/d/g.txt"]);
    }

    #[test]
    fn test_walk_subtree_completes_before_siblings() {
        let records = walk(&sample_share(), "").unwrap();
        let pos = |p: &str| records.iter().position(|r| r.relative_path == p).unwrap();
        // MemoryShare lists directories before files
        assert!(pos("b/d/e/f.txt") < pos("a.txt"));
        assert!(pos("b/d/g.txt") < pos("b/c.txt"));
    }

    #[test]
    fn test_walk_skips_configured_dirs() {
        let options = WalkOptions {
            skip_dirs: vec!["b/d".to_string()],
        };
        let records = walk_with(&sample_share(), "", &options).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_walk_listing_failure_aborts() {
        let mut share = sample_share();
        share.deny_listing("b/d");
        let err = walk(&share, "").unwrap_err();
        assert!(matches!(err, JanitorError::Share(ShareError::Access(_))));
    }

    #[test]
    fn test_walk_missing_root() {
        let err = walk(&sample_share(), "nope").unwrap_err();
        assert!(matches!(err, JanitorError::Share(ShareError::NotFound(_))));
    }

    struct EndlessShare;

    impl Share for EndlessShare {
        fn list_children(&self, _path: &str) -> Result<Vec<DirectoryEntry>, ShareError> {
            Ok(vec![DirectoryEntry::directory("loop")])
        }
        fn delete_file(&self, _path: &str) -> Result<(), ShareError> {
            Ok(())
        }
        fn write_file(&self, _path: &str, _content: &[u8]) -> Result<(), ShareError> {
            Ok(())
        }
        fn directory_exists(&self, _path: &str) -> bool {
            true
        }
        fn create_directory(&self, _path: &str) -> Result<(), ShareError> {
            Ok(())
        }
    }

    #[test]
    fn test_walk_cyclic_share_hits_depth_bound() {
        let err = walk(&EndlessShare, "").unwrap_err();
        assert!(matches!(err, JanitorError::Traversal { depth, .. } if depth == MAX_DEPTH + 1));
    }
}
