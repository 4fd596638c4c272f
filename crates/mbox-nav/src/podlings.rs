//! Podling resolution.
//!
//! The Incubator PMC publishes `podlings.xml`, one element per podling with
//! `status`, `resource` and `resourceAliases` attributes. Every podling that
//! has not graduated contributes its resource name and aliases to the
//! [`IncubatingSet`] used when classifying archive directories.

use crate::error::{NavError, Result};
use quick_xml::events::{BytesStart, Event};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, info};

/// Status value of podlings that left the incubator.
const GRADUATED: &str = "graduated";

/// Identifiers of projects still in incubation, aliases included.
///
/// Never contains the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncubatingSet {
    ids: BTreeSet<String>,
}

impl IncubatingSet {
    /// A set with no podlings, for runs that do not consult the Incubator.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for IncubatingSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut ids: BTreeSet<String> = iter.into_iter().map(Into::into).collect();
        ids.remove("");
        Self { ids }
    }
}

/// Fetch the podlings document and resolve the incubating identifiers.
///
/// Any failure is returned as-is: classifying without this set would file
/// podling lists under the wrong project, so callers must not fall back.
pub async fn resolve_incubating_identifiers(url: &str, timeout: Duration) -> Result<IncubatingSet> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|source| NavError::Fetch {
            url: url.to_string(),
            source,
        })?;

    let resp = client.get(url).send().await.map_err(|source| NavError::Fetch {
        url: url.to_string(),
        source,
    })?;

    let status = resp.status();
    if !status.is_success() {
        return Err(NavError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = resp.text().await.map_err(|source| NavError::Fetch {
        url: url.to_string(),
        source,
    })?;

    let set = parse_podlings(&body)?;
    info!("resolved {} incubating identifiers from {url}", set.len());
    Ok(set)
}

/// Parse a podlings document into the set of incubating identifiers.
///
/// Only direct children of the root element are considered.
pub fn parse_podlings(xml: &str) -> Result<IncubatingSet> {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut ids: Vec<String> = Vec::new();
    let mut depth = 0usize;
    let mut saw_root = false;

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => {
                if depth == 1 {
                    collect_podling(e, &mut ids)?;
                }
                saw_root = true;
                depth += 1;
            }
            Event::Empty(ref e) => {
                if depth == 1 {
                    collect_podling(e, &mut ids)?;
                }
                saw_root = true;
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(NavError::EmptyDocument);
    }

    Ok(ids.into_iter().collect())
}

/// Add the resource and aliases of one podling element unless it graduated.
fn collect_podling(e: &BytesStart<'_>, ids: &mut Vec<String>) -> Result<()> {
    let mut status = None;
    let mut resource = None;
    let mut aliases = None;

    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let value = attr.unescape_value()?.into_owned();
        match attr.key.as_ref() {
            b"status" => status = Some(value),
            b"resource" => resource = Some(value),
            b"resourceAliases" => aliases = Some(value),
            _ => {}
        }
    }

    if status.as_deref() == Some(GRADUATED) {
        debug!("skipping graduated podling {}", resource.as_deref().unwrap_or("?"));
        return Ok(());
    }

    if let Some(resource) = resource {
        ids.push(resource);
    }
    let aliases = aliases.unwrap_or_else(|| ",".to_string());
    ids.extend(aliases.split(',').map(str::to_string));
    Ok(())
}
