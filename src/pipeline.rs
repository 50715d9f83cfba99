use crate::cleanup::{DeletionSummary, delete_all};
use crate::config::Config;
use crate::error::JanitorError;
use crate::report::{sort_for_display, write_report};
use crate::retention::{cutoff, partition};
use crate::scanner::{WalkOptions, walk, walk_with};
use crate::share::Share;
use crate::types::{DeletionOutcome, FileRecord, join_path};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct RunReport {
    pub discovered: usize,
    pub unparsed_timestamps: usize,
    pub report_path: String,
    pub cutoff: DateTime<Utc>,
    /// Every discovered file, newest first.
    pub inventory: Vec<FileRecord>,
    pub expired: Vec<FileRecord>,
    pub outcomes: Vec<DeletionOutcome>,
    pub summary: DeletionSummary,
    pub dry_run: bool,
}

/// One maintenance run: walk, export the inventory, then delete what has expired.
/// Walk and export failures abort before anything is deleted.
pub fn run(share: &dyn Share, config: &Config, now: DateTime<Utc>) -> Result<RunReport, JanitorError> {
    let cutoff = cutoff(now, config.retention_days)?;

    log::info!("Walking share from '{}'", config.root_path);
    let records = if config.skip_export_dir {
        let options = WalkOptions {
            skip_dirs: vec![join_path(&config.export_subdirectory, "")],
        };
        walk_with(share, &config.root_path, &options)?
    } else {
        walk(share, &config.root_path)?
    };
    let unparsed_timestamps = records
        .iter()
        .filter(|r| r.last_modified_raw.is_some())
        .count();
    log::info!("Discovered {} files", records.len());
    if unparsed_timestamps > 0 {
        log::warn!("{unparsed_timestamps} files have an unparseable modification time and are kept");
    }

    let report_path = write_report(
        share,
        &config.export_subdirectory,
        &config.report_file_name,
        &records,
    )?;
    log::info!("Report written to {report_path}");

    let discovered = records.len();
    let split = partition(&records, cutoff);
    log::info!(
        "{} files older than {} ({} days), {} retained",
        split.expire.len(),
        cutoff.format("%Y-%m-%d %H:%M"),
        config.retention_days,
        split.retain.len()
    );

    let outcomes = if config.dry_run {
        for r in &split.expire {
            log::info!("Would delete {}", r.relative_path);
        }
        Vec::new()
    } else {
        delete_all(share, &split.expire)
    };
    let summary = DeletionSummary::from_outcomes(&outcomes);
    let mut inventory = records;
    sort_for_display(&mut inventory);
    if !config.dry_run {
        log::info!(
            "{} of {} deletions succeeded",
            summary.succeeded,
            summary.attempted
        );
    }

    Ok(RunReport {
        discovered,
        unparsed_timestamps,
        report_path,
        cutoff,
        inventory,
        expired: split.expire,
        outcomes,
        summary,
        dry_run: config.dry_run,
    })
}
