use chrono::TimeZone;
use std::fmt::Display;

use crate::format::{render_date, render_size};

use super::entry::{Entry, IconKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Dir,
    File,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Dir => "dir",
            RecordKind::File => "file",
        }
    }
}

/// Flat description of one listed entry, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRecord {
    pub kind: RecordKind,
    /// Link target, under the context path
    pub url_path: String,
    /// Present only for non-directories
    pub size_display: Option<String>,
    /// Empty for parent links
    pub age_display: String,
    pub icon: IconKind,
    pub downloadable: bool,
    pub display_name: String,
}

impl ListingRecord {
    pub fn from_entry<Tz>(entry: &Entry, context_path: &str, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let is_dir = entry.is_directory();
        Self {
            kind: if is_dir { RecordKind::Dir } else { RecordKind::File },
            url_path: entry.url_path(context_path),
            size_display: (!is_dir).then(|| render_size(entry.size())),
            age_display: if entry.is_parent_link() {
                String::new()
            } else {
                render_date(entry.last_modified(), tz)
            },
            icon: entry.icon_kind(),
            downloadable: entry.is_downloadable(),
            display_name: entry.display_name().to_string(),
        }
    }
}
