//! `mbox-nav index` — write the "Available Mailing Lists" page.

use crate::cli::output::{self, Styled};
use anyhow::{Context, Result};
use mbox_nav::{
    classify_archive, resolve_incubating_identifiers, write_index_html, ArchiveGroups, FsArchive,
    IncubatingSet, IndexPageOptions, NavConfig, INCUBATOR_MARKER, INDEX_SENTINEL,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

/// Run the index command. The page goes to `output`, or stdout when absent.
pub async fn run(config: &NavConfig, output: Option<&Path>) -> Result<()> {
    let s = Styled::new();
    let start = Instant::now();

    let podlings = resolve_incubating_identifiers(&config.podlings_url, config.fetch_timeout())
        .await
        .context("failed to resolve incubating projects")?;

    let archive = FsArchive::new(&config.archive_root, &config.index_file);
    let groups = classify_archive(&archive, &podlings, INDEX_SENTINEL, false).with_context(|| {
        format!("failed to scan archive {}", config.archive_root.display())
    })?;

    let options = IndexPageOptions::default();
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut out = BufWriter::new(file);
            write_index_html(&groups, &options, &mut out)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            write_index_html(&groups, &options, &mut out).context("failed to write index page")?;
            out.flush()?;
        }
    }

    let incubating = groups
        .keys()
        .filter(|key| key.ends_with(INCUBATOR_MARKER))
        .count();

    if output::is_json() {
        output::eprint_json(&serde_json::json!({
            "lists": groups.list_count(),
            "groups": groups.group_count(),
            "incubating_groups": incubating,
            "podlings": podlings.len(),
            "output": output.map(|p| p.display().to_string()),
            "duration_ms": start.elapsed().as_millis(),
        }));
        return Ok(());
    }

    if !output::is_quiet() {
        print_summary(&s, &groups, &podlings, incubating, output, start.elapsed());
    }

    Ok(())
}

fn print_summary(
    s: &Styled,
    groups: &ArchiveGroups,
    podlings: &IncubatingSet,
    incubating: usize,
    output: Option<&Path>,
    elapsed: std::time::Duration,
) {
    output::print_header(s);
    if groups.is_empty() {
        output::print_check(s.warn_sym(), "Lists:", &s.yellow("none found"));
    } else {
        output::print_check(
            s.ok_sym(),
            "Lists:",
            &format!("{} in {} groups", groups.list_count(), groups.group_count()),
        );
    }
    if podlings.is_empty() {
        output::print_check(s.warn_sym(), "Podlings:", &s.yellow("none incubating"));
    } else {
        output::print_check(s.ok_sym(), "Podlings:", &format!("{} identifiers", podlings.len()));
    }
    output::print_check(s.ok_sym(), "Incubating:", &format!("{incubating} groups"));
    let target = output
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdout".to_string());
    output::print_check(s.ok_sym(), "Written to:", &s.green(&target));
    eprintln!();
    eprintln!("  Done in {:.1}s", elapsed.as_secs_f64());
}
