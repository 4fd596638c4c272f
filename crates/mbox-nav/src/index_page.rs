//! The "Available Mailing Lists" page.
//!
//! An XHTML page with a jump menu of project groups and, per group, the
//! links to its list archives laid out in balanced columns.

use crate::classify::{ArchiveGroups, INCUBATOR_MARKER, INDEX_SENTINEL};
use quick_xml::escape::escape;
use std::io::{self, Write};

const PAGE_HEADER: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN"
"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd">
<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="en">
<head>
  <title>Available Mailing Lists</title>
</head>
<!-- Background white, links blue (unvisited), navy (visited), red
(active) -->
 <body
  bgcolor="#FFFFFF" text="#000000" link="#0000FF"
  vlink="#000080" alink="#FF0000">
<script type="text/javascript">
<!--
function TLP_onchange() {
document.location.hash = document.forms[0].TLP[document.forms[0].TLP.selectedIndex].value
}
-->
</script>
"##;

const MENU_CLOSE: &str = r#"
</select>
</form>
<table width="100%">
<tr valign="top"><td>
<ul>

"#;

const PAGE_FOOTER: &str = "
</ul>
</td>
</tr>
</table>
</body>
</html>

";

const COLUMN_BREAK: &str = "</ul></td><td><ul>";

/// Presentation knobs for the index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPageOptions {
    /// Host named in the welcome banner.
    pub host: String,
    /// Domain appended to group keys in headings (`httpd.apache.org lists:`).
    pub domain: String,
    /// Group key that receives `sentinel_label` instead of a domain heading.
    pub sentinel_key: String,
    pub sentinel_label: String,
}

impl Default for IndexPageOptions {
    fn default() -> Self {
        Self {
            host: "mail-archives.apache.org".to_string(),
            domain: "apache.org".to_string(),
            sentinel_key: INDEX_SENTINEL.to_string(),
            sentinel_label: "ASF-wide lists:".to_string(),
        }
    }
}

/// Render the index page into a string.
pub fn build_index_html(groups: &ArchiveGroups, options: &IndexPageOptions) -> io::Result<String> {
    let mut buf = Vec::new();
    write_index_html(groups, options, &mut buf)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Stream the index page into `out`.
pub fn write_index_html<W: Write>(
    groups: &ArchiveGroups,
    options: &IndexPageOptions,
    out: &mut W,
) -> io::Result<()> {
    out.write_all(PAGE_HEADER.as_bytes())?;
    writeln!(
        out,
        "<h2>Welcome to the mail archives on {}.</h2>",
        escape(options.host.as_str())
    )?;
    writeln!(out, r#"<form action="" method="get" id="tlpform">"#)?;
    writeln!(out, r#"<table width="100%">"#)?;
    writeln!(out, r#"<tr align="left">"#)?;
    writeln!(out, "<i>Jump to a specific top-level archive section: </i>")?;
    writeln!(
        out,
        r#"<select size="1" name="TLP" onchange="return TLP_onchange()">"#
    )?;
    writeln!(out)?;

    for key in groups.keys() {
        writeln!(
            out,
            r#"<option value="{}">{}</option>"#,
            escape(key),
            escape(menu_label(key).as_str())
        )?;
    }

    out.write_all(MENU_CLOSE.as_bytes())?;

    let threshold = groups.total_entries() / 3;
    let mut column_count = 0usize;

    for (key, lists) in groups.iter() {
        if key == options.sentinel_key {
            writeln!(
                out,
                "<li><h3><a name='{}'>{}</a></h3>",
                escape(key),
                escape(options.sentinel_label.as_str())
            )?;
        } else {
            writeln!(
                out,
                "<li><h3><a name='{key}'>{key}.{domain} lists:</a></h3>",
                key = escape(key),
                domain = escape(options.domain.as_str())
            )?;
        }

        writeln!(out, "<ul>")?;
        for (list, record) in lists {
            writeln!(
                out,
                "    <li><a href='{}/'>{}</a></li>",
                escape(record.link_path.as_str()),
                escape(list.as_str())
            )?;
            column_count += 1;
        }
        writeln!(out, "</ul></li>")?;

        // Columns only break between groups.
        if column_count >= threshold {
            writeln!(out, "{COLUMN_BREAK}")?;
            column_count = 0;
        }
    }

    out.write_all(PAGE_FOOTER.as_bytes())?;
    out.flush()
}

/// Jump menu label: `foo.incubator` reads `foo (incubating)`.
pub fn menu_label(key: &str) -> String {
    key.replace(INCUBATOR_MARKER, " (incubating)")
}
