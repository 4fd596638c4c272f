//! CLI subcommand implementations for the mbox-nav binary.

pub mod index_cmd;
pub mod output;
pub mod sitemap_cmd;

use mbox_nav::NavConfig;
use std::path::PathBuf;

/// Command-line values that take precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub archive_root: Option<PathBuf>,
    pub podlings_url: Option<String>,
    pub base_url: Option<String>,
    pub entry_cap: Option<usize>,
    pub partition_bytes: Option<u64>,
    pub fetch_timeout_secs: Option<u64>,
}

impl ConfigOverrides {
    /// Apply the overrides and re-validate the result.
    pub fn apply(self, mut config: NavConfig) -> mbox_nav::Result<NavConfig> {
        if let Some(root) = self.archive_root {
            config.archive_root = root;
        }
        if let Some(url) = self.podlings_url {
            config.podlings_url = url;
        }
        if let Some(url) = self.base_url {
            config.base_url = url;
        }
        if let Some(cap) = self.entry_cap {
            config.entry_cap = cap;
        }
        if let Some(bytes) = self.partition_bytes {
            config.partition_bytes = bytes;
        }
        if let Some(secs) = self.fetch_timeout_secs {
            config.fetch_timeout_secs = secs;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Print the effective configuration in --verbose mode.
pub fn print_config(config: &NavConfig) {
    if output::is_json() {
        output::eprint_json(&config_json(config));
        return;
    }

    eprintln!("  Configuration:");
    eprintln!("    archive_root:    {}", config.archive_root.display());
    eprintln!("    podlings_url:    {}", config.podlings_url);
    eprintln!("    base_url:        {}", config.base_url);
    eprintln!("    partition_bytes: {}", config.partition_bytes);
    eprintln!("    entry_cap:       {}", config.entry_cap);
    eprintln!("    fetch_timeout:   {}s", config.fetch_timeout_secs);
    eprintln!();
}

/// The effective configuration wrapped for `--json` output.
pub fn config_json(config: &NavConfig) -> serde_json::Value {
    serde_json::json!({ "config": config })
}
