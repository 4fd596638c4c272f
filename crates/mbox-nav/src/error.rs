//! Error type shared by every stage of index and sitemap generation.

use std::path::PathBuf;

/// Errors raised while resolving podlings, scanning the archive or writing output.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("podlings document is not well-formed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("podlings document has no root element")]
    EmptyDocument,

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid output template '{0}': expected a single %d placeholder")]
    Template(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl NavError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, NavError>;
