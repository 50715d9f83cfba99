use crate::email::EmailConfig;
use crate::error::JanitorError;
use crate::report::default_report_name;
use chrono::NaiveDate;
use clap::Parser;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_RETENTION_DAYS: u32 = 7;
pub const DEFAULT_EXPORT_DIR: &str = "Export";
pub const DEFAULT_CONFIG_FILE: &str = ".janitor_config";

#[derive(Parser, Debug)]
#[command(version, about = "Inventory a mounted share and delete files past their retention window", long_about = None)]
pub struct Args {
    /// Mount point of the share (falls back to SHARE_PATH in the config file)
    pub share: Option<PathBuf>,

    /// Directory inside the share to start from (empty = share root)
    #[arg(long, short = 'r')]
    pub root: Option<String>,

    /// Files last modified more than this many days ago are deleted
    #[arg(long, short = 'd')]
    pub retention_days: Option<u32>,

    /// Subdirectory of the share that receives the CSV report
    #[arg(long, short = 'e')]
    pub export_dir: Option<String>,

    /// Report file name (default: FileReport_<date>.csv)
    #[arg(long)]
    pub report_name: Option<String>,

    /// Walk and report, but do not delete anything
    #[arg(long, short = 'n')]
    pub dry_run: bool,

    /// Leave the export directory out of the walk
    #[arg(long)]
    pub skip_export_dir: bool,

    /// Print the full inventory, newest first, not just the expired files
    #[arg(long, short = 'a')]
    pub list_all: bool,

    /// Lockfile preventing overlapping runs
    #[arg(long, default_value = "/tmp/share_janitor.lock")]
    pub lockfile: PathBuf,

    /// KEY=VALUE config file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub share_path: PathBuf,
    pub root_path: String,
    pub retention_days: u32,
    pub export_subdirectory: String,
    pub report_file_name: String,
    pub dry_run: bool,
    pub skip_export_dir: bool,
    pub lockfile: PathBuf,
    pub list_all: bool,
    pub email: Option<EmailConfig>,
}

/// Parses `KEY=VALUE` lines; blank lines and `#` comments are ignored, values may be quoted.
#[must_use]
pub fn parse_key_values(content: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((k, v)) = line.split_once('=') {
            map.insert(k.trim().to_string(), v.trim().trim_matches('"').to_string());
        }
    }
    map
}

fn load_file(explicit: Option<&Path>) -> Result<HashMap<String, String>, JanitorError> {
    let path = explicit.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(path) {
        Ok(content) => {
            log::debug!("Loaded config from {}", path.display());
            Ok(parse_key_values(&content))
        }
        Err(_) if explicit.is_none() => Ok(HashMap::new()),
        Err(e) => Err(JanitorError::Config(format!(
            "cannot read {}: {e}",
            path.display()
        ))),
    }
}

impl Config {
    /// Reads the config file named by `--config` (or `.janitor_config` if present) and
    /// layers the command line on top.
    pub fn load(args: Args, today: NaiveDate) -> Result<Self, JanitorError> {
        let file = load_file(args.config.as_deref())?;
        Self::resolve(args, &file, today)
    }

    pub fn resolve(
        args: Args,
        file: &HashMap<String, String>,
        today: NaiveDate,
    ) -> Result<Self, JanitorError> {
        let share_path = args
            .share
            .or_else(|| file.get("SHARE_PATH").map(PathBuf::from))
            .ok_or_else(|| {
                JanitorError::Config("no share given (argument or SHARE_PATH)".to_string())
            })?;

        let retention_days = match args.retention_days {
            Some(days) => days,
            None => match file.get("RETENTION_DAYS") {
                Some(v) => v.parse::<u32>().map_err(|_| {
                    JanitorError::Config(format!("RETENTION_DAYS is not a number: '{v}'"))
                })?,
                None => DEFAULT_RETENTION_DAYS,
            },
        };
        if retention_days == 0 {
            return Err(JanitorError::Config(
                "retention days must be greater than zero".to_string(),
            ));
        }

        let pick = |cli: Option<String>, key: &str, default: String| {
            cli.or_else(|| file.get(key).cloned()).unwrap_or(default)
        };

        Ok(Self {
            share_path,
            root_path: pick(args.root, "ROOT_PATH", String::new()),
            retention_days,
            export_subdirectory: pick(args.export_dir, "EXPORT_DIR", DEFAULT_EXPORT_DIR.to_string()),
            report_file_name: pick(args.report_name, "REPORT_NAME", default_report_name(today)),
            dry_run: args.dry_run,
            skip_export_dir: args.skip_export_dir,
            lockfile: args.lockfile,
            list_all: args.list_all,
            email: EmailConfig::from_map(file),
        })
    }
}
