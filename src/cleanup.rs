use crate::share::Share;
use crate::types::{DeletionOutcome, FileRecord};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletionSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl DeletionSummary {
    #[must_use]
    pub fn from_outcomes(outcomes: &[DeletionOutcome]) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.succeeded).count();
        Self {
            attempted: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
        }
    }
}

/// Deletes each expired file in order. A failed delete is recorded and the batch moves on.
pub fn delete_all(share: &dyn Share, expired: &[FileRecord]) -> Vec<DeletionOutcome> {
    expired
        .iter()
        .map(|record| {
            let path = &record.relative_path;
            match share.delete_file(path) {
                Ok(()) => {
                    log::info!("Deleted {path}");
                    DeletionOutcome {
                        relative_path: path.clone(),
                        succeeded: true,
                        error_message: None,
                    }
                }
                Err(e) => {
                    log::warn!("Failed to delete {path}: {e}");
                    DeletionOutcome {
                        relative_path: path.clone(),
                        succeeded: false,
                        error_message: Some(e.to_string()),
                    }
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::share::memory::MemoryShare;
    use serde_json::json;

    fn record(path: &str) -> FileRecord {
        FileRecord {
            relative_path: path.to_string(),
            name: path.to_string(),
            last_modified: None,
            last_modified_raw: None,
            size_bytes: None,
        }
    }

    #[test]
    fn test_failure_in_middle_does_not_stop_batch() {
        let mut share = MemoryShare::new();
        let paths = ["f1", "f2", "f3", "f4", "f5"];
        for p in paths {
            share.add_file(p, json!({}));
        }
        share.fail_delete("f3");

        let records: Vec<_> = paths.iter().map(|p| record(p)).collect();
        let outcomes = delete_all(&share, &records);

        assert_eq!(outcomes.len(), 5);
        assert_eq!(*share.delete_attempts.borrow(), paths.to_vec());
        let ok: Vec<_> = outcomes.iter().map(|o| o.succeeded).collect();
        assert_eq!(ok, vec![true, true, false, true, true]);
        assert!(
            outcomes[2]
                .error_message
                .as_deref()
                .is_some_and(|m| m.contains("sharing violation"))
        );
        assert_eq!(share.file_paths(), vec!["f3".to_string()]);
    }

    #[test]
    fn test_summary_tally() {
        let outcomes = vec![
            DeletionOutcome {
                relative_path: "a".to_string(),
                succeeded: true,
                error_message: None,
            },
            DeletionOutcome {
                relative_path: "b".to_string(),
                succeeded: false,
                error_message: Some("locked".to_string()),
            },
        ];
        assert_eq!(
            DeletionSummary::from_outcomes(&outcomes),
            DeletionSummary {
                attempted: 2,
                succeeded: 1,
                failed: 1
            }
        );
    }

    #[test]
    fn test_empty_expire_set() {
        let share = MemoryShare::new();
        assert!(delete_all(&share, &[]).is_empty());
        assert_eq!(DeletionSummary::from_outcomes(&[]), DeletionSummary::default());
    }
}
