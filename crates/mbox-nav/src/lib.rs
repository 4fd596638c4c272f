//! Navigation artifacts for a mod_mbox mail archive.
//!
//! Two outputs are generated from the archive tree:
//!
//! - the "Available Mailing Lists" index page ([`index_page`]), grouping
//!   lists by top-level project with podlings marked as incubating;
//! - sitemap index files ([`sitemap`]) pointing at each list's own sitemap,
//!   partitioned by estimated archive size.
//!
//! Both start from [`classify`], which turns the directory listing of an
//! [`archive::ArchiveSource`] into ordered project groups. Incubation status
//! comes from the Incubator's podlings document via [`podlings`].

pub mod archive;
pub mod classify;
pub mod config;
pub mod error;
pub mod index_page;
pub mod podlings;
pub mod sitemap;

pub use archive::{disk_usage, ArchiveSource, FsArchive};
pub use classify::{
    classify_archive, ArchiveGroups, Classifier, ListRecord, INCUBATOR_MARKER, INDEX_SENTINEL,
    SITEMAP_SENTINEL,
};
pub use config::NavConfig;
pub use error::{NavError, Result};
pub use index_page::{build_index_html, write_index_html, IndexPageOptions};
pub use podlings::{parse_podlings, resolve_incubating_identifiers, IncubatingSet};
pub use sitemap::{build_sitemaps, OutputTemplate, SitemapOptions, SitemapReport};
