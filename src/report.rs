use crate::error::JanitorError;
use crate::share::Share;
use crate::types::{FileRecord, join_path};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use comfy_table::{Attribute, Cell, Color, Table};

pub const CSV_HEADER: [&str; 4] = ["FilePath", "Name", "LastModified", "LengthBytes"];

#[must_use]
pub fn default_report_name(date: NaiveDate) -> String {
    format!("FileReport_{}.csv", date.format("%Y-%m-%d"))
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn modified_text(record: &FileRecord) -> String {
    match (&record.last_modified, &record.last_modified_raw) {
        (Some(ts), _) => ts.to_rfc3339_opts(SecondsFormat::Secs, true),
        (None, Some(raw)) => raw.clone(),
        (None, None) => String::new(),
    }
}

#[must_use]
pub fn render_csv(records: &[FileRecord]) -> String {
    let mut out = CSV_HEADER.join(",");
    out.push_str("\r\n");
    for r in records {
        let row = [
            escape_field(&r.relative_path),
            escape_field(&r.name),
            escape_field(&modified_text(r)),
            r.size_bytes.map(|s| s.to_string()).unwrap_or_default(),
        ];
        out.push_str(&row.join(","));
        out.push_str("\r\n");
    }
    out
}

/// Writes the inventory to `<export_dir>/<file_name>` inside the share, creating the
/// directory if needed. Returns the relative path written.
pub fn write_report(
    share: &dyn Share,
    export_dir: &str,
    file_name: &str,
    records: &[FileRecord],
) -> Result<String, JanitorError> {
    if file_name.is_empty() || file_name.contains('/') {
        return Err(JanitorError::Report(format!(
            "invalid report file name '{file_name}'"
        )));
    }
    if !share.directory_exists(export_dir) {
        log::info!("Creating export directory {export_dir}");
        share.create_directory(export_dir)?;
    }
    let path = join_path(export_dir, file_name);
    share.write_file(&path, render_csv(records).as_bytes())?;
    Ok(path)
}

/// Newest first; records without a timestamp go last.
pub fn sort_for_display(records: &mut [FileRecord]) {
    records.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
}

fn records_table(rows: &[FileRecord], color: impl Fn(&FileRecord) -> Color) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_HORIZONTAL_ONLY);
    table.set_header(vec!["File", "Last Modified", "Size"]);

    let mut total_bytes = 0u64;
    for r in rows {
        total_bytes += r.size_bytes.unwrap_or(0);
        let size = r
            .size_bytes
            .map_or_else(|| "-".to_string(), |s| human_bytes::human_bytes(s as f64));
        table.add_row(vec![
            Cell::new(&r.relative_path).fg(color(r)),
            Cell::new(modified_text(r)),
            Cell::new(size),
        ]);
    }

    table.add_row(vec![
        Cell::new(format!("TOTAL ({} files)", rows.len())).add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(human_bytes::human_bytes(total_bytes as f64)).add_attribute(Attribute::Bold),
    ]);
    table
}

pub fn print_expired_table(expired: &[FileRecord], dry_run: bool) {
    if expired.is_empty() {
        println!("No files older than the retention window.");
        return;
    }

    let mut rows = expired.to_vec();
    sort_for_display(&mut rows);
    let color = if dry_run { Color::Yellow } else { Color::Red };
    println!("{}", records_table(&rows, |_| color));
}

/// Full inventory in the order given; expired rows red, unknown ages yellow.
pub fn print_inventory_table(inventory: &[FileRecord], cutoff: DateTime<Utc>) {
    if inventory.is_empty() {
        println!("No files found.");
        return;
    }

    let table = records_table(inventory, |r| match r.last_modified {
        Some(ts) if ts < cutoff => Color::Red,
        Some(_) => Color::White,
        None => Color::Yellow,
    });
    println!("{table}");
}
