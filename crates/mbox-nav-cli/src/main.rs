//! `mbox-nav` — generate the mail archive index page and sitemap indexes.

use anyhow::Result;
use clap::{Parser, Subcommand};
use mbox_nav::NavConfig;
use mbox_nav_cli::cli::{self, output, ConfigOverrides};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mbox-nav", version, about = "Navigation artifacts for mod_mbox mail archives")]
struct Cli {
    /// Archive root holding one directory per mailing list.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// URL of the Incubator podlings document.
    #[arg(long, global = true)]
    podlings_url: Option<String>,

    /// Timeout for the podlings fetch, in seconds.
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Suppress the run summary.
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Print configuration and per-file details.
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Emit the run summary as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the mailing list index page (stdout unless --output is given).
    Index {
        /// Write the page to this file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Write sitemap index files named by TEMPLATE (e.g. sitemap-%d.xml).
    Sitemap {
        /// Output path with a single %d replaced by the file number.
        template: String,

        /// Prefix of every sitemap location.
        #[arg(long)]
        base_url: Option<String>,

        /// Maximum entries per sitemap index file.
        #[arg(long)]
        entry_cap: Option<usize>,

        /// Lists at or above this size (bytes) are split into parts.
        #[arg(long)]
        partition_bytes: Option<u64>,

        /// Classify podlings as incubating (fetches the podlings document).
        #[arg(long)]
        with_podlings: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Output helpers read these flags from the environment.
    if cli.quiet {
        std::env::set_var("MBOX_NAV_QUIET", "1");
    }
    if cli.verbose {
        std::env::set_var("MBOX_NAV_VERBOSE", "1");
    }
    if cli.json {
        std::env::set_var("MBOX_NAV_JSON", "1");
    }
    if cli.no_color {
        std::env::set_var("MBOX_NAV_NO_COLOR", "1");
    }

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!("mbox_nav={default_level}"))
            }),
        )
        .init();

    let mut overrides = ConfigOverrides {
        archive_root: cli.root,
        podlings_url: cli.podlings_url,
        fetch_timeout_secs: cli.timeout,
        ..ConfigOverrides::default()
    };

    match cli.command {
        Commands::Index { output: out } => {
            let config = overrides.apply(NavConfig::from_env()?)?;
            if output::is_verbose() {
                cli::print_config(&config);
            }
            cli::index_cmd::run(&config, out.as_deref()).await
        }
        Commands::Sitemap {
            template,
            base_url,
            entry_cap,
            partition_bytes,
            with_podlings,
        } => {
            overrides.base_url = base_url;
            overrides.entry_cap = entry_cap;
            overrides.partition_bytes = partition_bytes;
            let config = overrides.apply(NavConfig::from_env()?)?;
            if output::is_verbose() {
                cli::print_config(&config);
            }
            cli::sitemap_cmd::run(&config, &template, with_podlings).await
        }
    }
}
