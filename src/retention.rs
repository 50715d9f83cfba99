use crate::error::JanitorError;
use crate::types::{FileRecord, RetentionDecision};
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub retain: Vec<FileRecord>,
    pub expire: Vec<FileRecord>,
}

/// `now - retention_days`, computed once at run start. Fails when the window reaches
/// past the earliest representable date.
pub fn cutoff(now: DateTime<Utc>, retention_days: u32) -> Result<DateTime<Utc>, JanitorError> {
    Duration::try_days(i64::from(retention_days))
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or_else(|| {
            JanitorError::Config(format!(
                "retention window of {retention_days} days is out of range"
            ))
        })
}

/// Unknown age means keep.
#[must_use]
pub fn decide(record: &FileRecord, cutoff: DateTime<Utc>) -> RetentionDecision {
    RetentionDecision {
        record: record.clone(),
        expired: record.last_modified.is_some_and(|ts| ts < cutoff),
    }
}

#[must_use]
pub fn partition(records: &[FileRecord], cutoff: DateTime<Utc>) -> Partition {
    let mut result = Partition::default();
    for decision in records.iter().map(|r| decide(r, cutoff)) {
        if decision.expired {
            result.expire.push(decision.record);
        } else {
            result.retain.push(decision.record);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(path: &str, modified: Option<DateTime<Utc>>) -> FileRecord {
        FileRecord {
            relative_path: path.to_string(),
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            last_modified: modified,
            last_modified_raw: None,
            size_bytes: Some(10),
        }
    }

    #[test]
    fn test_cutoff_subtracts_days() {
        let now = Utc.with_ymd_and_hms(2024, 8, 10, 12, 0, 0).unwrap();
        assert_eq!(
            cutoff(now, 7).unwrap(),
            Utc.with_ymd_and_hms(2024, 8, 3, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_cutoff_out_of_range_is_config_error() {
        let now = Utc.with_ymd_and_hms(2024, 8, 10, 12, 0, 0).unwrap();
        let err = cutoff(now, u32::MAX).unwrap_err();
        assert!(matches!(err, JanitorError::Config(_)));
        assert!(cutoff(now, 36_500).is_ok());
    }

    #[test]
    fn test_partition_boundaries() {
        let c = Utc.with_ymd_and_hms(2024, 8, 3, 12, 0, 0).unwrap();
        let records = vec![
            record("old.txt", Some(c - Duration::seconds(1))),
            record("edge.txt", Some(c)),
            record("new.txt", Some(c + Duration::days(1))),
            record("unknown.txt", None),
        ];
        let p = partition(&records, c);
        let expired: Vec<_> = p.expire.iter().map(|r| r.relative_path.as_str()).collect();
        let retained: Vec<_> = p.retain.iter().map(|r| r.relative_path.as_str()).collect();
        assert_eq!(expired, vec!["old.txt"]);
        assert_eq!(retained, vec!["edge.txt", "new.txt", "unknown.txt"]);
        assert_eq!(p.expire.len() + p.retain.len(), records.len());
    }

    #[test]
    fn test_raw_only_timestamp_is_retained() {
        let c = Utc.with_ymd_and_hms(2024, 8, 3, 0, 0, 0).unwrap();
        let mut r = record("weird.txt", None);
        r.last_modified_raw = Some("1999-ish".to_string());
        assert!(!decide(&r, c).expired);
    }

    #[test]
    fn test_partition_is_idempotent() {
        let c = Utc.with_ymd_and_hms(2024, 8, 3, 0, 0, 0).unwrap();
        let records = vec![
            record("a", Some(c - Duration::days(3))),
            record("b", Some(c + Duration::days(3))),
            record("c", None),
        ];
        assert_eq!(partition(&records, c), partition(&records, c));
    }
}
