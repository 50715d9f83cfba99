mod cleanup;
mod config;
mod email;
mod error;
mod metadata;
mod pipeline;
mod report;
mod retention;
mod scanner;
mod share;
mod types;

use chrono::{Local, Utc};
use clap::Parser;
use colored::Colorize;
use config::{Args, Config};
use error::JanitorError;
use share::MountedShare;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

/// Removes the lockfile when the run ends, however it ends.
struct LockGuard {
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        fs::remove_file(&self.path).ok();
    }
}

fn acquire_lock(lockfile: &Path) -> Result<LockGuard, JanitorError> {
    use std::io::ErrorKind;

    match OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o644)
        .open(lockfile)
    {
        Ok(mut file) => {
            let pid = std::process::id();
            writeln!(file, "{pid}").ok();
            Ok(LockGuard {
                path: lockfile.to_path_buf(),
            })
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(JanitorError::Lock(format!(
            "{} already exists (another run in progress?)",
            lockfile.display()
        ))),
        Err(e) => Err(JanitorError::Lock(format!(
            "failed to create {}: {e}",
            lockfile.display()
        ))),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("{} {e}", "ERROR:".red().bold());
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), JanitorError> {
    let config = Config::load(args, Local::now().date_naive())?;
    let _lock = acquire_lock(&config.lockfile)?;

    let share_label = config.share_path.display().to_string();
    println!(
        "{}",
        format!(
            "=== Share Cleanup for {}: {} ===",
            share_label,
            Local::now().format("%Y-%m-%d %H:%M")
        )
        .cyan()
    );
    if config.dry_run {
        println!("{}", "Dry run: no files will be deleted.".yellow());
    }

    let share = MountedShare::open(&config.share_path)?;
    log::debug!("Opened share at {}", share.root().display());
    let report = pipeline::run(&share, &config, Utc::now())?;

    println!(
        "\n{}",
        format!(
            "=== Files older than {} ({} days) ===",
            report.cutoff.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            config.retention_days
        )
        .cyan()
    );
    report::print_expired_table(&report.expired, config.dry_run);

    if config.list_all {
        println!("\n{}", "=== Inventory ===".cyan());
        report::print_inventory_table(&report.inventory, report.cutoff);
    }

    println!("\n{}", "=== Summary ===".cyan());
    println!("Files found:    {}", report.discovered.to_string().green());
    println!("Expired:        {}", report.expired.len().to_string().yellow());
    if report.unparsed_timestamps > 0 {
        println!(
            "Unparsed times: {} (kept)",
            report.unparsed_timestamps.to_string().yellow()
        );
    }
    if share.skipped_names() > 0 {
        println!(
            "Skipped names:  {} (not valid UTF-8)",
            share.skipped_names().to_string().yellow()
        );
    }
    println!("Report:         {}", report.report_path);
    if !config.dry_run {
        let failed = if report.summary.failed > 0 {
            report.summary.failed.to_string().red()
        } else {
            report.summary.failed.to_string().green()
        };
        println!(
            "Deleted:        {} of {} ({} failed)",
            report.summary.succeeded.to_string().green(),
            report.summary.attempted,
            failed
        );
        for o in report.outcomes.iter().filter(|o| !o.succeeded) {
            println!(
                "  {} {}: {}",
                "⚠️".yellow(),
                o.relative_path,
                o.error_message.as_deref().unwrap_or("unknown error").red()
            );
        }
    }

    if let Some(email_cfg) = &config.email {
        email::send_summary(&share_label, &report, email_cfg);
    }

    println!("\n{}", "=== Cleanup Complete ===".cyan());
    Ok(())
}
