//! Group archive directories into project groups.
//!
//! Directory names follow `<prefix>-<listname>`. The prefix names the
//! top-level project (TLP); `www` lists are site-wide and podling prefixes
//! are tagged with [`INCUBATOR_MARKER`].

use crate::archive::ArchiveSource;
use crate::error::Result;
use crate::podlings::IncubatingSet;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Suffix appended to the group key of incubating projects.
pub const INCUBATOR_MARKER: &str = ".incubator";

/// Prefix of site-wide lists (`www-announce`, ...).
pub const SITE_WIDE_PREFIX: &str = "www";

/// Group key used for site-wide lists on the index page.
pub const INDEX_SENTINEL: &str = "asf-wide";

/// Group key used for site-wide lists in sitemaps.
pub const SITEMAP_SENTINEL: &str = "asf";

/// Directory prefix under which podling archives are served.
const INCUBATOR_PATH_PREFIX: &str = "incubator-";

/// One mailing list inside a project group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRecord {
    /// Directory name under the archive root.
    pub dir_name: String,
    /// Path the index page links to.
    pub link_path: String,
    /// Estimated disk usage, when the classifier was asked to measure.
    pub size: Option<u64>,
}

/// Result of a classification scan: group key -> listname -> record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveGroups {
    groups: BTreeMap<String, BTreeMap<String, ListRecord>>,
    accepted: usize,
}

impl ArchiveGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a list, replacing any previous record with the same name.
    pub fn insert(&mut self, group: impl Into<String>, list: impl Into<String>, record: ListRecord) {
        self.groups
            .entry(group.into())
            .or_default()
            .insert(list.into(), record);
        self.accepted += 1;
    }

    /// Groups in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, ListRecord>)> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, group: &str) -> Option<&BTreeMap<String, ListRecord>> {
        self.groups.get(group)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Number of accepted directories, duplicates included.
    pub fn total_entries(&self) -> usize {
        self.accepted
    }

    /// Number of distinct lists across all groups.
    pub fn list_count(&self) -> usize {
        self.groups.values().map(BTreeMap::len).sum()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Split a directory name at its first `-`.
///
/// A name without a delimiter is all prefix, with an empty listname.
pub fn split_dir_name(name: &str) -> (&str, &str) {
    name.split_once('-').unwrap_or((name, ""))
}

/// Classifies archive directory names into [`ArchiveGroups`].
#[derive(Debug, Clone)]
pub struct Classifier<'a> {
    incubating: &'a IncubatingSet,
    sentinel_key: &'a str,
    measure_sizes: bool,
}

impl<'a> Classifier<'a> {
    pub fn new(incubating: &'a IncubatingSet, sentinel_key: &'a str) -> Self {
        Self {
            incubating,
            sentinel_key,
            measure_sizes: false,
        }
    }

    /// Record the disk usage of every accepted list.
    pub fn with_sizes(mut self, measure: bool) -> Self {
        self.measure_sizes = measure;
        self
    }

    /// Group key for a directory prefix.
    pub fn group_key(&self, prefix: &str) -> String {
        let prefix = if prefix == SITE_WIDE_PREFIX {
            self.sentinel_key
        } else {
            prefix
        };
        if self.incubating.contains(prefix) {
            format!("{prefix}{INCUBATOR_MARKER}")
        } else {
            prefix.to_string()
        }
    }

    /// Path the index page should link to for `dir_name` in `group_key`.
    pub fn link_path(&self, group_key: &str, dir_name: &str) -> String {
        let incubating = group_key
            .strip_suffix(INCUBATOR_MARKER)
            .is_some_and(|base| self.incubating.contains(base));
        if incubating {
            format!("{INCUBATOR_PATH_PREFIX}{dir_name}")
        } else {
            dir_name.to_string()
        }
    }

    /// Scan `names`, keeping only directories `source` reports as indexed.
    pub fn classify<I, S>(&self, names: I, source: &dyn ArchiveSource) -> Result<ArchiveGroups>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<S> = names.into_iter().collect();
        names.sort_by(|a, b| a.as_ref().cmp(b.as_ref()));

        let mut groups = ArchiveGroups::new();
        for name in &names {
            let name = name.as_ref();
            if !source.has_index(name) {
                debug!("skipping {name}: no list index");
                continue;
            }

            let (prefix, list) = split_dir_name(name);
            if list.is_empty() {
                warn!("archive directory {name} has no listname part");
            }

            let key = self.group_key(prefix);
            let size = if self.measure_sizes {
                Some(source.disk_usage(name)?)
            } else {
                None
            };
            let record = ListRecord {
                dir_name: name.to_string(),
                link_path: self.link_path(&key, name),
                size,
            };
            groups.insert(key, list, record);
        }

        debug!(
            "classified {} lists into {} groups",
            groups.total_entries(),
            groups.group_count()
        );
        Ok(groups)
    }
}

/// Classify every directory the source lists.
pub fn classify_archive(
    source: &dyn ArchiveSource,
    incubating: &IncubatingSet,
    sentinel_key: &str,
    measure_sizes: bool,
) -> Result<ArchiveGroups> {
    let names = source.list_directories()?;
    Classifier::new(incubating, sentinel_key)
        .with_sizes(measure_sizes)
        .classify(names, source)
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::archive::ArchiveSource;
    use crate::error::{NavError, Result};
    use std::collections::BTreeMap;

    /// In-memory archive: name -> (indexed, size).
    #[derive(Debug, Default)]
    pub struct MemoryArchive {
        pub dirs: BTreeMap<String, (bool, u64)>,
    }

    impl MemoryArchive {
        pub fn with(mut self, name: &str, indexed: bool, size: u64) -> Self {
            self.dirs.insert(name.to_string(), (indexed, size));
            self
        }
    }

    impl ArchiveSource for MemoryArchive {
        fn list_directories(&self) -> Result<Vec<String>> {
            Ok(self.dirs.keys().cloned().collect())
        }

        fn has_index(&self, name: &str) -> bool {
            self.dirs.get(name).is_some_and(|(indexed, _)| *indexed)
        }

        fn disk_usage(&self, name: &str) -> Result<u64> {
            self.dirs.get(name).map(|(_, size)| *size).ok_or_else(|| {
                NavError::io(name, std::io::Error::from(std::io::ErrorKind::NotFound))
            })
        }
    }
}
