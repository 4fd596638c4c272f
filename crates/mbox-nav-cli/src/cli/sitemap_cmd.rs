//! `mbox-nav sitemap <TEMPLATE>` — write partitioned sitemap index files.

use crate::cli::output::{self, Styled};
use anyhow::{Context, Result};
use chrono::Utc;
use mbox_nav::{
    build_sitemaps, classify_archive, resolve_incubating_identifiers, FsArchive, IncubatingSet,
    NavConfig, OutputTemplate, SitemapOptions, SitemapReport, SITEMAP_SENTINEL,
};
use std::time::Instant;

/// Run the sitemap command.
///
/// Sitemap URLs use raw directory names, so podlings are only consulted
/// when `with_podlings` is set.
pub async fn run(config: &NavConfig, template: &str, with_podlings: bool) -> Result<()> {
    let s = Styled::new();
    let start = Instant::now();

    // Reject a bad template before doing any expensive work.
    let template = OutputTemplate::parse(template)?;

    let podlings = if with_podlings {
        resolve_incubating_identifiers(&config.podlings_url, config.fetch_timeout())
            .await
            .context("failed to resolve incubating projects")?
    } else {
        IncubatingSet::empty()
    };

    let archive = FsArchive::new(&config.archive_root, &config.index_file);
    let groups = classify_archive(&archive, &podlings, SITEMAP_SENTINEL, true).with_context(|| {
        format!("failed to scan archive {}", config.archive_root.display())
    })?;

    let report = build_sitemaps(&groups, &template, &SitemapOptions::from(config))
        .context("failed to write sitemap index")?;

    let archive_bytes: u64 = groups
        .iter()
        .flat_map(|(_, lists)| lists.values())
        .filter_map(|record| record.size)
        .sum();

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "generated_at": Utc::now().to_rfc3339(),
            "lists": groups.list_count(),
            "archive_bytes": archive_bytes,
            "entries": report.total_entries(),
            "files": report.files,
            "duration_ms": start.elapsed().as_millis(),
        }));
        return Ok(());
    }

    if !output::is_quiet() {
        print_summary(&s, &report, groups.list_count(), archive_bytes, start.elapsed());
    }

    Ok(())
}

fn print_summary(
    s: &Styled,
    report: &SitemapReport,
    lists: usize,
    archive_bytes: u64,
    elapsed: std::time::Duration,
) {
    output::print_header(s);
    output::print_check(
        s.ok_sym(),
        "Lists:",
        &format!("{lists} ({})", output::format_size(archive_bytes)),
    );
    output::print_check(
        s.ok_sym(),
        "Entries:",
        &format!("{} in {} files", report.total_entries(), report.files.len()),
    );
    if output::is_verbose() {
        for file in &report.files {
            eprintln!("      {} {}", s.dim(&format!("{:>4}", file.entries)), file.path.display());
        }
    }
    eprintln!();
    eprintln!("  Done in {:.1}s", elapsed.as_secs_f64());
}
