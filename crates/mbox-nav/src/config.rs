//! Run configuration: defaults for the production archive host, overridable
//! from the environment and then from the command line.

use crate::error::{NavError, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Root of the mod_mbox archive tree on the archive host.
pub const DEFAULT_ARCHIVE_ROOT: &str = "/x1/mail-archives/mod_mbox";

/// Incubator PMC maintained list of podlings and their status.
pub const DEFAULT_PODLINGS_URL: &str = "http://incubator.apache.org/podlings.xml";

/// Prefix of every `<loc>` written into a sitemap index.
pub const DEFAULT_BASE_URL: &str = "http://mail-archives.apache.org/mod_mbox/";

/// Lists at or above this estimated size are split into several sitemaps.
pub const DEFAULT_PARTITION_BYTES: u64 = 100 * 1024 * 1024;

/// Maximum number of `<sitemap>` entries per index file.
pub const DEFAULT_ENTRY_CAP: usize = 500;

/// Per-list marker file; directories without it are not mailing lists.
pub const DEFAULT_INDEX_FILE: &str = "listinfo.db";

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Everything a run needs to know about its surroundings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavConfig {
    pub archive_root: PathBuf,
    pub podlings_url: String,
    pub base_url: String,
    pub partition_bytes: u64,
    pub entry_cap: usize,
    pub index_file: String,
    pub fetch_timeout_secs: u64,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            archive_root: PathBuf::from(DEFAULT_ARCHIVE_ROOT),
            podlings_url: DEFAULT_PODLINGS_URL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            partition_bytes: DEFAULT_PARTITION_BYTES,
            entry_cap: DEFAULT_ENTRY_CAP,
            index_file: DEFAULT_INDEX_FILE.to_string(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
        }
    }
}

impl NavConfig {
    /// Defaults with `MBOX_NAV_*` environment overrides applied.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(root) = lookup("MBOX_NAV_ARCHIVE_ROOT") {
            config.archive_root = PathBuf::from(root);
        }
        if let Some(url) = lookup("MBOX_NAV_PODLINGS_URL") {
            config.podlings_url = url;
        }
        if let Some(url) = lookup("MBOX_NAV_BASE_URL") {
            config.base_url = url;
        }
        if let Some(raw) = lookup("MBOX_NAV_PARTITION_BYTES") {
            config.partition_bytes = parse_number("MBOX_NAV_PARTITION_BYTES", &raw)?;
        }
        if let Some(raw) = lookup("MBOX_NAV_ENTRY_CAP") {
            config.entry_cap = parse_number("MBOX_NAV_ENTRY_CAP", &raw)?;
        }
        if let Some(raw) = lookup("MBOX_NAV_FETCH_TIMEOUT_SECS") {
            config.fetch_timeout_secs = parse_number("MBOX_NAV_FETCH_TIMEOUT_SECS", &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make partitioning or rollover meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.partition_bytes == 0 {
            return Err(NavError::Config(
                "partition size must be greater than zero".to_string(),
            ));
        }
        if self.entry_cap == 0 {
            return Err(NavError::Config(
                "sitemap entry cap must be greater than zero".to_string(),
            ));
        }
        if self.index_file.is_empty() {
            return Err(NavError::Config("index file name is empty".to_string()));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| NavError::Config(format!("{key}={raw} is not a valid number")))
}
