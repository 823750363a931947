//! HTML rendering of directory listings.

use std::fmt::Write;

use crate::vfs::{IconKind, ListingRecord, RecordKind, SortCriteria};

use super::request::percent_encode_path;

const STYLE: &str = "body{font-family:sans-serif;margin:2em}\
table{border-collapse:collapse}\
td,th{padding:.2em 1em;text-align:left}\
td.size{text-align:right}\
a{text-decoration:none}";

/// Render the listing of `directory_url` from its records, in the order given.
pub fn listing_page(directory_url: &str, records: &[ListingRecord]) -> String {
    let title = escape_html(if directory_url.is_empty() { "/" } else { directory_url });

    let mut html = String::with_capacity(512 + records.len() * 256);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>Index of {title}</title>");
    let _ = writeln!(html, "<style>{STYLE}</style>");
    html.push_str("</head>\n<body>\n");
    let _ = writeln!(html, "<h1>Index of {title}</h1>");
    html.push_str("<table>\n<tr><th></th>");
    for (criteria, label) in [
        (SortCriteria::ByName, "Name"),
        (SortCriteria::BySize, "Size"),
        (SortCriteria::ByDate, "Modified"),
    ] {
        let _ = write!(html, "<th><a href=\"?sort={}\">{label}</a></th>", criteria.as_str());
    }
    html.push_str("<th></th></tr>\n");

    for record in records {
        row(&mut html, record);
    }

    html.push_str("</table>\n</body>\n</html>\n");
    html
}

fn row(html: &mut String, record: &ListingRecord) {
    let href = escape_html(&percent_encode_path(&record.url_path));
    let name = escape_html(&record.display_name);
    let suffix = if record.kind == RecordKind::Dir && !record.display_name.ends_with('/') {
        "/"
    } else {
        ""
    };

    let _ = write!(
        html,
        "<tr class=\"{}\"><td title=\"{}\">{}</td>",
        record.kind.as_str(),
        record.icon.as_str(),
        icon_glyph(record.icon)
    );
    let _ = write!(html, "<td><a href=\"{href}\">{name}{suffix}</a></td>");
    let _ = write!(
        html,
        "<td class=\"size\">{}</td>",
        record.size_display.as_deref().unwrap_or("")
    );
    let _ = write!(html, "<td>{}</td>", escape_html(&record.age_display));
    if record.downloadable {
        let _ = write!(html, "<td><a href=\"{href}?download\">download</a></td>");
    } else {
        html.push_str("<td></td>");
    }
    html.push_str("</tr>\n");
}

fn icon_glyph(icon: IconKind) -> &'static str {
    match icon {
        IconKind::Directory => "&#128193;",
        IconKind::Archive => "&#128230;",
        IconKind::PlainFile => "&#128196;",
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
