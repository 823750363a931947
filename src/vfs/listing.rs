//! Child listing and ordering of directory entries.

use log::debug;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::entry::{ArchiveMember, ArchiveRoot, Entry, Node, PlainNode};
use super::error::VfsError;
use super::path::join;

/// Names starting with this marker are left out of listings.
pub const HIDDEN_MARKER: char = '.';

/// Caller-selectable ordering, applied after the fixed
/// parent-link-first and directories-first rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortCriteria {
    /// Newest first
    ByDate,
    /// Lexicographic by name, ascending
    ByName,
    /// Largest first
    BySize,
}

impl SortCriteria {
    pub const ALL: [SortCriteria; 3] = [SortCriteria::ByDate, SortCriteria::ByName, SortCriteria::BySize];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortCriteria::ByDate => "DATE",
            SortCriteria::ByName => "NAME",
            SortCriteria::BySize => "SIZE",
        }
    }

    pub fn compare(&self, a: &Entry, b: &Entry) -> Ordering {
        match self {
            SortCriteria::ByDate => b.last_modified().cmp(&a.last_modified()),
            SortCriteria::ByName => a.name().cmp(b.name()),
            SortCriteria::BySize => b.size().cmp(&a.size()),
        }
    }
}

impl fmt::Display for SortCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort criteria {0:?} (expected DATE, NAME or SIZE)")]
pub struct UnknownSortCriteria(pub String);

impl FromStr for SortCriteria {
    type Err = UnknownSortCriteria;

    /// Accepts `DATE`, `NAME`, `SIZE`, optionally prefixed with `BY_`,
    /// in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        match upper.strip_prefix("BY_").unwrap_or(&upper) {
            "DATE" => Ok(SortCriteria::ByDate),
            "NAME" => Ok(SortCriteria::ByName),
            "SIZE" => Ok(SortCriteria::BySize),
            _ => Err(UnknownSortCriteria(s.to_string())),
        }
    }
}

/// Full comparator chain: parent links, then directories, then `criteria`
/// in order.
pub fn compare_entries(a: &Entry, b: &Entry, criteria: &[SortCriteria]) -> Ordering {
    b.is_parent_link()
        .cmp(&a.is_parent_link())
        .then_with(|| b.is_directory().cmp(&a.is_directory()))
        .then_with(|| {
            criteria
                .iter()
                .map(|criterion| criterion.compare(a, b))
                .find(|ord| ord.is_ne())
                .unwrap_or(Ordering::Equal)
        })
}

/// Stable sort; entries equal under every rule keep their relative order.
pub fn sort_entries(entries: &mut [Entry], criteria: &[SortCriteria]) {
    entries.sort_by(|a, b| compare_entries(a, b, criteria));
}

fn is_hidden(entry: &Entry) -> bool {
    entry.display_name().starts_with(HIDDEN_MARKER)
}

impl Entry {
    /// List the children of a directory.
    ///
    /// Hidden children are dropped, then, below the top of the hierarchy, a
    /// parent link is added. The result is computed afresh on every call.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotADirectory`] for leaves
    /// - [`VfsError::ListingUnavailable`] if the directory cannot be read
    pub async fn list_children(&self, criteria: &[SortCriteria]) -> Result<Vec<Entry>, VfsError> {
        if !self.is_directory() {
            return Err(VfsError::NotADirectory { path: self.path() });
        }

        let raw = match &self.node {
            Node::Plain(plain) => read_plain_dir(plain).await?,
            Node::ArchiveRoot(root) => archive_children(root, ""),
            Node::ArchiveMember(member) => archive_children(&member.root, &member.path),
        };

        let mut children: Vec<Entry> = raw.into_iter().filter(|child| !is_hidden(child)).collect();

        // An empty name marks the top of the hierarchy
        if !self.name().is_empty() {
            children.push(self.parent().await.into_parent_link());
        }

        sort_entries(&mut children, criteria);
        debug!(
            "listed {:?}: {} entries, sort {:?}",
            self.path(),
            children.len(),
            criteria
        );
        Ok(children)
    }
}

async fn read_plain_dir(dir: &PlainNode) -> Result<Vec<Entry>, VfsError> {
    let unavailable = |source: std::io::Error| VfsError::ListingUnavailable {
        path: dir.path.clone(),
        source,
    };

    let mut read_dir = tokio::fs::read_dir(dir.fs_path()).await.map_err(unavailable)?;
    let mut children = Vec::new();
    while let Some(dirent) = read_dir.next_entry().await.map_err(unavailable)? {
        let Ok(name) = dirent.file_name().into_string() else {
            debug!("skipping non UTF-8 name in {:?}", dir.path);
            continue;
        };
        let child = PlainNode::load(dir.base.clone(), join(&dir.path, &name)).await;
        if !child.stat.exists {
            // removed since the directory was read, or a dangling link
            continue;
        }
        children.push(Entry::new(Node::Plain(child)));
    }
    Ok(children)
}

/// Direct children of the directory `node_path` (`""` for the top level)
/// inside `root`.
fn archive_children(root: &Arc<ArchiveRoot>, node_path: &str) -> Vec<Entry> {
    root.index()
        .direct_children_of(node_path)
        .filter_map(|slot| {
            let record = root.index().get(slot)?;
            Some(Entry::new(Node::ArchiveMember(ArchiveMember::at(
                root.clone(),
                record.key(),
                Some(slot),
            ))))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_criteria() {
        assert_eq!("DATE".parse::<SortCriteria>(), Ok(SortCriteria::ByDate));
        assert_eq!("name".parse::<SortCriteria>(), Ok(SortCriteria::ByName));
        assert_eq!("BY_SIZE".parse::<SortCriteria>(), Ok(SortCriteria::BySize));
        assert!("COLOR".parse::<SortCriteria>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for criterion in SortCriteria::ALL {
            assert_eq!(criterion.to_string().parse::<SortCriteria>(), Ok(criterion));
        }
    }
}
