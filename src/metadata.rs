use crate::types::{DirectoryEntry, FileRecord, join_path};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};

/// Key-value view over whatever properties a listing call handed back for one entry.
/// Different listing surfaces nest their fields differently, so lookups go through
/// [`FieldPath`]s rather than fixed struct fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMetadata {
    fields: Map<String, Value>,
}

/// Nested key path inside a [`RawMetadata`], e.g. `["properties", "last_modified"]`.
pub type FieldPath = &'static [&'static str];

/// Where a modification time may live, most preferred first.
pub const MODIFIED_FIELDS: &[FieldPath] = &[
    &["properties", "last_modified"],
    &["last_modified"],
    &["metadata", "last_write_time"],
];

/// Where a content length may live, most preferred first.
pub const SIZE_FIELDS: &[FieldPath] = &[
    &["properties", "content_length"],
    &["content_length"],
    &["metadata", "size"],
];

impl RawMetadata {
    /// Anything that is not a JSON object yields an empty view.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }

    #[must_use]
    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.fields.get(*first)?;
        for key in rest {
            current = current.as_object()?.get(*key)?;
        }
        if current.is_null() { None } else { Some(current) }
    }

    /// First non-null value found along `candidates`.
    #[must_use]
    pub fn locate(&self, candidates: &[FieldPath]) -> Option<&Value> {
        candidates.iter().find_map(|path| self.get(path))
    }
}

impl From<Value> for RawMetadata {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

/// Result of reading a located modification value.
#[derive(Debug, Clone, PartialEq)]
pub enum Modified {
    Parsed(DateTime<Utc>),
    Unparsed(String),
}

/// Builds the canonical record for a file entry listed under `parent`.
/// Never fails: missing fields become `None`, unparseable times are kept raw.
#[must_use]
pub fn normalize(entry: &DirectoryEntry, parent: &str) -> FileRecord {
    let relative_path = join_path(parent, &entry.name);

    let (last_modified, last_modified_raw) = match extract_modified(&entry.metadata) {
        Some(Modified::Parsed(ts)) => (Some(ts), None),
        Some(Modified::Unparsed(raw)) => {
            log::warn!("Unparseable modification time '{raw}' on {relative_path}; file will be retained");
            (None, Some(raw))
        }
        None => (None, None),
    };

    FileRecord {
        name: entry.name.clone(),
        relative_path,
        last_modified,
        last_modified_raw,
        size_bytes: extract_size(&entry.metadata),
    }
}

#[must_use]
pub fn extract_modified(raw: &RawMetadata) -> Option<Modified> {
    let value = raw.locate(MODIFIED_FIELDS)?;
    let modified = match value {
        Value::String(s) => {
            parse_timestamp(s).map_or_else(|| Modified::Unparsed(s.clone()), Modified::Parsed)
        }
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map_or_else(|| Modified::Unparsed(n.to_string()), Modified::Parsed),
        other => Modified::Unparsed(other.to_string()),
    };
    Some(modified)
}

#[must_use]
pub fn extract_size(raw: &RawMetadata) -> Option<u64> {
    match raw.locate(SIZE_FIELDS)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

/// Accepts RFC 3339, RFC 2822 / HTTP dates, and naive `YYYY-MM-DD HH:MM:SS` (taken as UTC).
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_rfc2822(s) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}
