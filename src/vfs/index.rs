//! The member list of one archive and the parent/child relation over it.

use chrono::{Local, TimeZone};
use log::debug;
use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::zip::CentralDirectoryEntry;

use super::path::{canonical, parent_of};

/// One member of an archive.
#[derive(Debug, Clone)]
pub struct MemberRecord {
    /// Path as stored in the archive (directories usually end in `/`)
    pub path: String,
    key: String,
    pub size: u64,
    pub modified: SystemTime,
    pub is_directory: bool,
    /// Central Directory entry to read the data from; `None` for directories
    /// that are only implied by the paths of deeper members
    pub(crate) source: Option<CentralDirectoryEntry>,
}

impl MemberRecord {
    fn stored(key: String, entry: CentralDirectoryEntry) -> Self {
        Self {
            path: entry.file_name.clone(),
            key,
            size: if entry.is_directory {
                0
            } else {
                entry.uncompressed_size
            },
            modified: entry_mtime(&entry),
            is_directory: entry.is_directory,
            source: Some(entry),
        }
    }

    fn implied(dir: &str, modified: SystemTime) -> Self {
        Self {
            path: format!("{dir}/"),
            key: dir.to_string(),
            size: 0,
            modified,
            is_directory: true,
            source: None,
        }
    }

    /// Canonical path, without empty or `.` segments or a trailing separator.
    /// Every lookup compares against this.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_implied(&self) -> bool {
        self.source.is_none()
    }
}

/// Immutable, ordered member list of one archive.
///
/// Stored members come first in Central Directory order, followed by a
/// synthesized directory record for every ancestor directory the archive
/// does not store explicitly. Keys are unique: a repeated member name keeps
/// its first occurrence.
#[derive(Debug, Clone, Default)]
pub struct ArchiveIndex {
    records: Vec<MemberRecord>,
}

impl ArchiveIndex {
    pub fn from_entries(entries: Vec<CentralDirectoryEntry>) -> Self {
        let mut slots: HashMap<String, usize> = HashMap::with_capacity(entries.len());
        let mut records = Vec::with_capacity(entries.len());

        for entry in entries {
            let Some(key) = canonical(&entry.file_name) else {
                debug!("skipping member {:?} outside the archive root", entry.file_name);
                continue;
            };
            if key.is_empty() {
                debug!("skipping member with empty name {:?}", entry.file_name);
                continue;
            }
            if slots.contains_key(&key) {
                debug!("skipping duplicate member {:?}", entry.file_name);
                continue;
            }
            slots.insert(key.clone(), records.len());
            records.push(MemberRecord::stored(key, entry));
        }

        let stored = records.len();
        let mut implied = 0;
        for slot in 0..stored {
            let modified = records[slot].modified;
            let mut dir = parent_of(&records[slot].key).to_string();
            while !dir.is_empty() {
                if let Some(&existing) = slots.get(&dir) {
                    let record = &mut records[existing];
                    if !record.is_directory {
                        debug!("member {:?} has members below it, listing it as a directory", record.path);
                        record.is_directory = true;
                        record.size = 0;
                    }
                    break;
                }
                slots.insert(dir.clone(), records.len());
                records.push(MemberRecord::implied(&dir, modified));
                implied += 1;
                dir = parent_of(&dir).to_string();
            }
        }
        if implied > 0 {
            debug!("synthesized {} implied directories", implied);
        }

        Self { records }
    }

    pub fn get(&self, slot: usize) -> Option<&MemberRecord> {
        self.records.get(slot)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Slot of the member at `path`, compared after canonicalization.
    pub fn position(&self, path: &str) -> Option<usize> {
        let path = canonical(path)?;
        self.records.iter().position(|record| record.key == path)
    }

    /// Slots of the members whose parent is `node_path` (`""` for the
    /// archive's top level). A linear scan: the format has no other index.
    pub fn direct_children_of(&self, node_path: &str) -> impl Iterator<Item = usize> + '_ {
        let node_path = canonical(node_path).unwrap_or_default();
        self.records
            .iter()
            .enumerate()
            .filter(move |(_, record)| parent_of(&record.key) == node_path)
            .map(|(slot, _)| slot)
    }
}

/// Modification time of a member: the extended timestamp when stored,
/// otherwise the MS-DOS fields read as local time.
fn entry_mtime(entry: &CentralDirectoryEntry) -> SystemTime {
    if let Some(secs) = entry.unix_mtime {
        return if secs >= 0 {
            UNIX_EPOCH + Duration::from_secs(secs as u64)
        } else {
            UNIX_EPOCH - Duration::from_secs(secs.unsigned_abs())
        };
    }

    entry
        .dos_datetime()
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(SystemTime::from)
        .unwrap_or(UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zip::CompressionMethod;

    fn entry(name: &str, size: u64, mtime: i64) -> CentralDirectoryEntry {
        CentralDirectoryEntry {
            file_name: name.to_string(),
            compression_method: CompressionMethod::Stored,
            compressed_size: size,
            uncompressed_size: size,
            crc32: 0,
            lfh_offset: 0,
            last_mod_time: 0,
            last_mod_date: 0,
            unix_mtime: Some(mtime),
            is_directory: name.ends_with('/'),
        }
    }

    fn children(index: &ArchiveIndex, node: &str) -> Vec<String> {
        index
            .direct_children_of(node)
            .map(|slot| index.get(slot).unwrap().key().to_string())
            .collect()
    }

    #[test]
    fn top_level_children() {
        let index = ArchiveIndex::from_entries(vec![
            entry("summary.txt", 12, 10),
            entry("charts/", 0, 10),
            entry("charts/fig1.png", 900, 10),
            entry("charts/raw/data.csv", 5, 10),
        ]);

        assert_eq!(children(&index, ""), ["summary.txt", "charts"]);
        assert_eq!(children(&index, "charts"), ["charts/fig1.png", "charts/raw"]);
        assert_eq!(children(&index, "charts/"), ["charts/fig1.png", "charts/raw"]);
        assert_eq!(children(&index, "charts/raw"), ["charts/raw/data.csv"]);
    }

    #[test]
    fn implied_directories_are_synthesized() {
        let index = ArchiveIndex::from_entries(vec![entry("a/b/c.txt", 3, 42)]);

        assert_eq!(index.len(), 3);
        let slot = index.position("a/b/").unwrap();
        let record = index.get(slot).unwrap();
        assert!(record.is_directory);
        assert!(record.is_implied());
        assert_eq!(record.size, 0);
        assert_eq!(record.modified, UNIX_EPOCH + Duration::from_secs(42));

        assert_eq!(children(&index, ""), ["a"]);
        assert_eq!(children(&index, "a"), ["a/b"]);
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let index = ArchiveIndex::from_entries(vec![
            entry("dup.txt", 1, 10),
            entry("dup.txt", 2, 10),
            entry("dir/", 0, 10),
            entry("dir", 7, 10),
        ]);

        assert_eq!(children(&index, ""), ["dup.txt", "dir"]);
        let dup = index.get(index.position("dup.txt").unwrap()).unwrap();
        assert_eq!(dup.size, 1);
        assert!(index.get(index.position("dir").unwrap()).unwrap().is_directory);
    }

    #[test]
    fn lookup_normalizes_both_sides() {
        let index = ArchiveIndex::from_entries(vec![entry("docs/", 0, 10)]);
        assert_eq!(index.position("docs"), Some(0));
        assert_eq!(index.position("docs/"), Some(0));
        assert_eq!(index.position("doc"), None);
    }

    #[test]
    fn stored_names_are_canonicalized() {
        let index = ArchiveIndex::from_entries(vec![
            entry("/abs.txt", 1, 10),
            entry("./dot.txt", 2, 10),
            entry("docs//./guide.md", 3, 10),
            entry("../escape.txt", 4, 10),
            entry("ok.txt", 5, 10),
        ]);

        assert_eq!(children(&index, ""), ["abs.txt", "dot.txt", "ok.txt", "docs"]);
        assert_eq!(children(&index, "docs"), ["docs/guide.md"]);
        assert_eq!(index.position("abs.txt"), Some(0));
        assert_eq!(index.position("/docs/guide.md"), Some(2));
        assert_eq!(index.get(0).unwrap().path, "/abs.txt");
        assert_eq!(index.position("escape.txt"), None);
    }

    #[test]
    fn file_with_members_below_becomes_a_directory() {
        let index = ArchiveIndex::from_entries(vec![entry("a", 7, 10), entry("a/b.txt", 3, 10)]);

        assert_eq!(index.len(), 2);
        let a = index.get(index.position("a").unwrap()).unwrap();
        assert!(a.is_directory);
        assert_eq!(a.size, 0);
        assert!(!a.is_implied());
        assert_eq!(children(&index, "a"), ["a/b.txt"]);
    }

    #[test]
    fn directory_records_have_no_size() {
        let mut dir = entry("d/", 0, 10);
        dir.uncompressed_size = 99;
        let index = ArchiveIndex::from_entries(vec![dir]);
        assert_eq!(index.get(0).unwrap().size, 0);
    }
}
