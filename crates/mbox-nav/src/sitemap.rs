//! Sitemap index generation.
//!
//! Every mailing list gets a `<sitemap>` entry pointing at the archive's
//! own sitemap. Lists at or above the partition size are split into
//! `pmax` parts, and output rolls over to a new index file once the entry
//! cap is reached.

use crate::classify::ArchiveGroups;
use crate::config::{NavConfig, DEFAULT_BASE_URL, DEFAULT_ENTRY_CAP, DEFAULT_PARTITION_BYTES};
use crate::error::{NavError, Result};
use quick_xml::escape::escape;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const SITEMAP_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<sitemapindex xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n";

const SITEMAP_FOOTER: &str = "</sitemapindex>\n";

/// Placeholder replaced by the file index in output templates.
const INDEX_PLACEHOLDER: &str = "%d";

/// Output path pattern such as `/www/sitemaps/sitemap-%d.xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTemplate {
    template: String,
}

impl OutputTemplate {
    /// Accepts templates with exactly one `%d`.
    pub fn parse(template: &str) -> Result<Self> {
        if template.matches(INDEX_PLACEHOLDER).count() != 1 {
            return Err(NavError::Template(template.to_string()));
        }
        Ok(Self {
            template: template.to_string(),
        })
    }

    pub fn render(&self, index: usize) -> PathBuf {
        PathBuf::from(
            self.template
                .replacen(INDEX_PLACEHOLDER, &index.to_string(), 1),
        )
    }
}

/// Limits and URL prefix for one sitemap run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapOptions {
    pub base_url: String,
    pub entry_cap: usize,
    pub partition_bytes: u64,
}

impl Default for SitemapOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            entry_cap: DEFAULT_ENTRY_CAP,
            partition_bytes: DEFAULT_PARTITION_BYTES,
        }
    }
}

impl From<&NavConfig> for SitemapOptions {
    fn from(config: &NavConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            entry_cap: config.entry_cap,
            partition_bytes: config.partition_bytes,
        }
    }
}

/// One written sitemap index file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SitemapFile {
    pub path: PathBuf,
    pub entries: usize,
}

/// Files written by [`build_sitemaps`], in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SitemapReport {
    pub files: Vec<SitemapFile>,
}

impl SitemapReport {
    pub fn total_entries(&self) -> usize {
        self.files.iter().map(|f| f.entries).sum()
    }
}

/// Number of sitemap parts for a list of `size` bytes; 1 means unpartitioned.
pub fn partition_count(size: u64, partition_bytes: u64) -> u64 {
    if size < partition_bytes {
        1
    } else {
        size / partition_bytes + 1
    }
}

/// `<loc>` values for one list, already XML-escaped.
pub fn list_locations(base_url: &str, dir_name: &str, size: u64, partition_bytes: u64) -> Vec<String> {
    let sitemap = escape(format!("{base_url}{dir_name}/?format=sitemap"));
    if size < partition_bytes {
        return vec![sitemap.into_owned()];
    }

    let parts = partition_count(size, partition_bytes);
    (0..parts)
        .map(|part| format!("{sitemap}&amp;pmax={parts}&amp;part={part}"))
        .collect()
}

/// Every `<loc>` of a run in output order: groups by key, lists by name.
///
/// Lists classified without a size are never partitioned.
pub fn plan_entries(groups: &ArchiveGroups, options: &SitemapOptions) -> Vec<String> {
    let mut locs = Vec::new();
    for (_, lists) in groups.iter() {
        for record in lists.values() {
            let size = record.size.unwrap_or(0);
            let mut entries = list_locations(&options.base_url, &record.dir_name, size, options.partition_bytes);
            if entries.len() > 1 {
                debug!("{} ({size} bytes) split into {} sitemaps", record.dir_name, entries.len());
            }
            locs.append(&mut entries);
        }
    }
    locs
}

/// The sitemap index file currently being written.
struct SitemapSink {
    path: PathBuf,
    out: BufWriter<File>,
    entries: usize,
}

impl SitemapSink {
    fn create(path: PathBuf) -> Result<Self> {
        let file = File::create(&path).map_err(|e| NavError::io(&path, e))?;
        let mut sink = Self {
            path,
            out: BufWriter::new(file),
            entries: 0,
        };
        sink.write_raw(SITEMAP_HEADER)?;
        Ok(sink)
    }

    fn write_entry(&mut self, loc: &str) -> Result<()> {
        self.write_raw(&format!("<sitemap><loc>{loc}</loc></sitemap>\n"))?;
        self.entries += 1;
        Ok(())
    }

    /// Write the footer and close the file.
    fn finish(mut self) -> Result<SitemapFile> {
        self.write_raw(SITEMAP_FOOTER)?;
        self.out.flush().map_err(|e| NavError::io(&self.path, e))?;
        info!("wrote {} ({} entries)", self.path.display(), self.entries);
        Ok(SitemapFile {
            path: self.path,
            entries: self.entries,
        })
    }

    fn write_raw(&mut self, text: &str) -> Result<()> {
        self.out
            .write_all(text.as_bytes())
            .map_err(|e| NavError::io(&self.path, e))
    }
}

/// Write sitemap index files for `groups`, starting at index 0.
///
/// The cap is checked after every entry, so a partitioned list may be split
/// across two files. The last file is always closed, even when empty.
pub fn build_sitemaps(
    groups: &ArchiveGroups,
    template: &OutputTemplate,
    options: &SitemapOptions,
) -> Result<SitemapReport> {
    if options.entry_cap == 0 || options.partition_bytes == 0 {
        return Err(NavError::Config(
            "entry cap and partition size must be greater than zero".to_string(),
        ));
    }

    let mut report = SitemapReport::default();
    let mut index = 0usize;
    let mut sink = SitemapSink::create(template.render(index))?;

    for loc in plan_entries(groups, options) {
        sink.write_entry(&loc)?;
        if sink.entries >= options.entry_cap {
            report.files.push(sink.finish()?);
            index += 1;
            sink = SitemapSink::create(template.render(index))?;
        }
    }

    report.files.push(sink.finish()?);
    Ok(report)
}

/// Read back the `<loc>` values of a written sitemap index.
pub fn read_locations(path: &Path) -> Result<Vec<String>> {
    let xml = std::fs::read_to_string(path).map_err(|e| NavError::io(path, e))?;
    let mut reader = quick_xml::Reader::from_str(&xml);
    reader.config_mut().trim_text(true);

    let mut locs = Vec::new();
    let mut in_loc = false;
    loop {
        match reader.read_event()? {
            quick_xml::events::Event::Start(ref e) if e.name().as_ref() == b"loc" => in_loc = true,
            quick_xml::events::Event::End(ref e) if e.name().as_ref() == b"loc" => in_loc = false,
            quick_xml::events::Event::Text(ref e) if in_loc => {
                locs.push(e.unescape()?.into_owned());
            }
            quick_xml::events::Event::Eof => break,
            _ => {}
        }
    }
    Ok(locs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify_archive, testing::MemoryArchive, SITEMAP_SENTINEL};
    use crate::podlings::IncubatingSet;

    const MIB: u64 = 1024 * 1024;

    fn groups_for(source: &MemoryArchive) -> ArchiveGroups {
        classify_archive(source, &IncubatingSet::empty(), SITEMAP_SENTINEL, true).unwrap()
    }

    fn template_in(dir: &Path) -> OutputTemplate {
        OutputTemplate::parse(dir.join("sitemap-%d.xml").to_str().unwrap()).unwrap()
    }

    #[test]
    fn test_template_requires_single_placeholder() {
        assert!(OutputTemplate::parse("sitemap.xml").is_err());
        assert!(OutputTemplate::parse("sitemap-%d-%d.xml").is_err());

        let template = OutputTemplate::parse("/tmp/sitemap-%d.xml").unwrap();
        assert_eq!(template.render(3), PathBuf::from("/tmp/sitemap-3.xml"));
    }

    #[test]
    fn test_below_threshold_single_entry() {
        let locs = list_locations(DEFAULT_BASE_URL, "httpd-dev", 100 * MIB - 1, 100 * MIB);
        assert_eq!(
            locs,
            vec!["http://mail-archives.apache.org/mod_mbox/httpd-dev/?format=sitemap"]
        );
    }

    #[test]
    fn test_at_threshold_two_parts() {
        let locs = list_locations(DEFAULT_BASE_URL, "httpd-dev", 100 * MIB, 100 * MIB);
        assert_eq!(
            locs,
            vec![
                "http://mail-archives.apache.org/mod_mbox/httpd-dev/?format=sitemap&amp;pmax=2&amp;part=0",
                "http://mail-archives.apache.org/mod_mbox/httpd-dev/?format=sitemap&amp;pmax=2&amp;part=1",
            ]
        );
    }

    #[test]
    fn test_markup_in_dir_name_escaped() {
        let tmp = tempfile::tempdir().unwrap();
        let source = MemoryArchive::default()
            .with("r&d-dev", true, 10)
            .with("r&d-<big>", true, 250);
        let options = SitemapOptions {
            partition_bytes: 100,
            ..SitemapOptions::default()
        };

        let report = build_sitemaps(&groups_for(&source), &template_in(tmp.path()), &options).unwrap();
        let locs = read_locations(&report.files[0].path).unwrap();
        assert_eq!(
            locs,
            vec![
                format!("{DEFAULT_BASE_URL}r&d-<big>/?format=sitemap&pmax=3&part=0"),
                format!("{DEFAULT_BASE_URL}r&d-<big>/?format=sitemap&pmax=3&part=1"),
                format!("{DEFAULT_BASE_URL}r&d-<big>/?format=sitemap&pmax=3&part=2"),
                format!("{DEFAULT_BASE_URL}r&d-dev/?format=sitemap"),
            ]
        );

        let raw = std::fs::read_to_string(&report.files[0].path).unwrap();
        assert!(raw.contains("r&amp;d-&lt;big&gt;/?format=sitemap&amp;pmax=3&amp;part=0"));
    }

    #[test]
    fn test_partition_count() {
        assert_eq!(partition_count(0, 100), 1);
        assert_eq!(partition_count(99, 100), 1);
        assert_eq!(partition_count(100, 100), 2);
        assert_eq!(partition_count(250, 100), 3);
        assert_eq!(partition_count(300, 100), 4);
    }

    #[test]
    fn test_plan_order_and_sentinel() {
        let source = MemoryArchive::default()
            .with("www-announce", true, 10)
            .with("ant-user", true, 10)
            .with("ant-dev", true, 10)
            .with("zebra-dev", false, 10);
        let locs = plan_entries(&groups_for(&source), &SitemapOptions::default());

        let base = DEFAULT_BASE_URL;
        assert_eq!(
            locs,
            vec![
                format!("{base}ant-dev/?format=sitemap"),
                format!("{base}ant-user/?format=sitemap"),
                format!("{base}www-announce/?format=sitemap"),
            ]
        );
    }

    #[test]
    fn test_rollover_after_cap() {
        let tmp = tempfile::tempdir().unwrap();
        let mut source = MemoryArchive::default();
        for i in 0..501 {
            source = source.with(&format!("proj{i:03}-dev"), true, 1024);
        }

        let report = build_sitemaps(
            &groups_for(&source),
            &template_in(tmp.path()),
            &SitemapOptions::default(),
        )
        .unwrap();

        assert_eq!(report.files.len(), 2);
        assert_eq!(report.files[0].entries, 500);
        assert_eq!(report.files[1].entries, 1);
        assert_eq!(read_locations(&report.files[0].path).unwrap().len(), 500);

        let second = read_locations(&tmp.path().join("sitemap-1.xml")).unwrap();
        assert_eq!(
            second,
            vec![format!("{DEFAULT_BASE_URL}proj500-dev/?format=sitemap")]
        );
    }

    #[test]
    fn test_partitioned_list_straddles_files() {
        let tmp = tempfile::tempdir().unwrap();
        let source = MemoryArchive::default()
            .with("a-dev", true, 1)
            .with("b-dev", true, 350);
        let options = SitemapOptions {
            entry_cap: 3,
            partition_bytes: 100,
            ..SitemapOptions::default()
        };

        let report = build_sitemaps(&groups_for(&source), &template_in(tmp.path()), &options).unwrap();
        let counts: Vec<usize> = report.files.iter().map(|f| f.entries).collect();
        // a-dev + b-dev parts 0,1 | b-dev parts 2,3
        assert_eq!(counts, vec![3, 2]);

        let second = read_locations(&report.files[1].path).unwrap();
        assert_eq!(
            second,
            vec![
                format!("{DEFAULT_BASE_URL}b-dev/?format=sitemap&pmax=4&part=2"),
                format!("{DEFAULT_BASE_URL}b-dev/?format=sitemap&pmax=4&part=3"),
            ]
        );
    }

    #[test]
    fn test_empty_archive_still_writes_valid_file() {
        let tmp = tempfile::tempdir().unwrap();
        let report = build_sitemaps(
            &ArchiveGroups::new(),
            &template_in(tmp.path()),
            &SitemapOptions::default(),
        )
        .unwrap();

        assert_eq!(report.files.len(), 1);
        let content = std::fs::read_to_string(&report.files[0].path).unwrap();
        assert_eq!(content, format!("{SITEMAP_HEADER}{SITEMAP_FOOTER}"));
    }

    #[test]
    fn test_file_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let source = MemoryArchive::default().with("httpd-dev", true, 5);
        let report = build_sitemaps(
            &groups_for(&source),
            &template_in(tmp.path()),
            &SitemapOptions::default(),
        )
        .unwrap();

        let content = std::fs::read_to_string(&report.files[0].path).unwrap();
        assert_eq!(
            content,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <sitemapindex xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n\
             <sitemap><loc>http://mail-archives.apache.org/mod_mbox/httpd-dev/?format=sitemap</loc></sitemap>\n\
             </sitemapindex>\n"
        );
    }

    #[test]
    fn test_unwritable_output_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let template =
            OutputTemplate::parse(tmp.path().join("missing/sitemap-%d.xml").to_str().unwrap()).unwrap();
        let err = build_sitemaps(&ArchiveGroups::new(), &template, &SitemapOptions::default()).unwrap_err();
        assert!(matches!(err, NavError::Io { .. }));
    }
}
