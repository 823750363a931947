//! Nodes of the virtual hierarchy.
//!
//! An [`Entry`] is one of three variants:
//!
//! - **Plain**: a file or directory of the real filesystem under the base root
//! - **ArchiveRoot**: a `.zip` file presented as a directory
//! - **ArchiveMember**: a file or directory stored inside an archive
//!
//! Entries are cheap values built per request. Filesystem metadata is captured
//! when the entry is constructed; archive members share their root's index
//! through an `Arc` and never outlive the request that opened it.

use log::debug;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::io::LocalFileReader;
use crate::zip::ZipExtractor;

use super::error::VfsError;
use super::index::{ArchiveIndex, MemberRecord};
use super::path::{is_archive_name, join, leaf_name, parent_of};

/// Display name of a parent-link entry.
pub const PARENT_LINK_NAME: &str = "..";

/// Which backing store an entry comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Plain,
    ArchiveRoot,
    ArchiveMember,
}

/// Role of an entry inside a listing, fixed when the entry is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Normal,
    /// Synthesized "go up" entry injected by the listing engine
    ParentLink,
}

/// Display hint for the icon shown next to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconKind {
    Directory,
    Archive,
    PlainFile,
}

impl IconKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IconKind::Directory => "directory",
            IconKind::Archive => "archive",
            IconKind::PlainFile => "file",
        }
    }
}

/// Filesystem metadata captured at construction.
#[derive(Debug, Clone, Copy)]
pub(super) struct Stat {
    pub(super) exists: bool,
    pub(super) is_dir: bool,
    pub(super) size: u64,
    pub(super) modified: SystemTime,
}

impl Stat {
    const MISSING: Stat = Stat {
        exists: false,
        is_dir: false,
        size: 0,
        modified: UNIX_EPOCH,
    };
}

impl From<Metadata> for Stat {
    fn from(meta: Metadata) -> Self {
        Stat {
            exists: true,
            is_dir: meta.is_dir(),
            size: if meta.is_dir() { 0 } else { meta.len() },
            modified: meta.modified().unwrap_or(UNIX_EPOCH),
        }
    }
}

/// Map a logical path onto the filesystem below `base`.
pub(super) fn fs_path(base: &Path, path: &str) -> PathBuf {
    if path.is_empty() {
        base.to_path_buf()
    } else {
        base.join(path)
    }
}

#[derive(Debug, Clone)]
pub(super) struct PlainNode {
    pub(super) base: Arc<Path>,
    pub(super) path: String,
    pub(super) stat: Stat,
}

impl PlainNode {
    /// Stat `path` below `base`. A path that cannot be stat'ed yields a node
    /// that does not exist.
    pub(super) async fn load(base: Arc<Path>, path: String) -> Self {
        let stat = match tokio::fs::metadata(fs_path(&base, &path)).await {
            Ok(meta) => Stat::from(meta),
            Err(err) => {
                debug!("stat {:?}: {}", path, err);
                Stat::MISSING
            }
        };
        Self { base, path, stat }
    }

    pub(super) fn fs_path(&self) -> PathBuf {
        fs_path(&self.base, &self.path)
    }
}

/// A `.zip` file presented as a directory, with its parsed member index.
#[derive(Debug)]
pub struct ArchiveRoot {
    base: Arc<Path>,
    path: String,
    stat: Stat,
    index: ArchiveIndex,
}

impl ArchiveRoot {
    /// Open the archive at logical `path` and index its members.
    ///
    /// The archive handle is held only for the scan.
    ///
    /// # Errors
    ///
    /// [`VfsError::ArchiveUnreadable`] if the file cannot be opened or is not
    /// a valid ZIP archive.
    pub async fn open(base: Arc<Path>, path: String) -> Result<Self, VfsError> {
        let location = fs_path(&base, &path);
        let meta = tokio::fs::metadata(&location)
            .await
            .map_err(|err| VfsError::unreadable(&path, err.into()))?;
        let reader = LocalFileReader::open(location)
            .await
            .map_err(|err| VfsError::unreadable(&path, err))?;

        let entries = ZipExtractor::new(Arc::new(reader))
            .list_entries()
            .await
            .map_err(|err| VfsError::unreadable(&path, err))?;
        let index = ArchiveIndex::from_entries(entries);
        debug!("indexed {} members of {:?}", index.len(), path);

        Ok(Self {
            base,
            path,
            stat: Stat::from(meta),
            index,
        })
    }

    /// Logical path of the archive file.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn index(&self) -> &ArchiveIndex {
        &self.index
    }

    pub(super) fn fs_path(&self) -> PathBuf {
        fs_path(&self.base, &self.path)
    }

    /// Read one member's bytes by re-opening the archive.
    pub(super) async fn read_member(&self, member_path: &str, record: &MemberRecord) -> Result<Vec<u8>, VfsError> {
        let logical = join(&self.path, member_path);
        let Some(source) = &record.source else {
            return Err(VfsError::IsADirectory { path: logical });
        };

        let reader = LocalFileReader::open(self.fs_path()).await.map_err(|err| {
            debug!("reopen {:?}: {:#}", self.path, err);
            VfsError::not_found(&logical)
        })?;

        ZipExtractor::new(Arc::new(reader))
            .extract_to_memory(source)
            .await
            .map_err(|err| VfsError::unreadable(&self.path, err))
    }
}

#[derive(Debug, Clone)]
pub(super) struct ArchiveMember {
    pub(super) root: Arc<ArchiveRoot>,
    /// Member path with trailing separators removed
    pub(super) path: String,
    /// Position in the root's index; `None` if no member has this path
    pub(super) slot: Option<usize>,
}

impl ArchiveMember {
    pub(super) fn lookup(root: Arc<ArchiveRoot>, path: &str) -> Self {
        let slot = root.index.position(path);
        Self::at(root, path, slot)
    }

    pub(super) fn at(root: Arc<ArchiveRoot>, path: &str, slot: Option<usize>) -> Self {
        Self {
            root,
            path: super::path::normalize(path).to_string(),
            slot,
        }
    }

    pub(super) fn record(&self) -> Option<&MemberRecord> {
        self.slot.and_then(|slot| self.root.index.get(slot))
    }
}

#[derive(Debug, Clone)]
pub(super) enum Node {
    Plain(PlainNode),
    ArchiveRoot(Arc<ArchiveRoot>),
    ArchiveMember(ArchiveMember),
}

/// One addressable node of the virtual hierarchy.
#[derive(Debug, Clone)]
pub struct Entry {
    pub(super) node: Node,
    role: Role,
}

impl Entry {
    pub(super) fn new(node: Node) -> Self {
        Self {
            node,
            role: Role::Normal,
        }
    }

    pub(super) fn into_parent_link(self) -> Self {
        Self {
            node: self.node,
            role: Role::ParentLink,
        }
    }

    pub fn kind(&self) -> EntryKind {
        match &self.node {
            Node::Plain(_) => EntryKind::Plain,
            Node::ArchiveRoot(_) => EntryKind::ArchiveRoot,
            Node::ArchiveMember(_) => EntryKind::ArchiveMember,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_parent_link(&self) -> bool {
        self.role == Role::ParentLink
    }

    /// Last path component. Empty only for the top of the hierarchy.
    pub fn name(&self) -> &str {
        match &self.node {
            Node::Plain(plain) => leaf_name(&plain.path),
            Node::ArchiveRoot(root) => leaf_name(&root.path),
            Node::ArchiveMember(member) => leaf_name(&member.path),
        }
    }

    pub fn display_name(&self) -> &str {
        if self.is_parent_link() {
            PARENT_LINK_NAME
        } else {
            self.name()
        }
    }

    /// Path relative to the base root, `/` separated.
    pub fn path(&self) -> String {
        match &self.node {
            Node::Plain(plain) => plain.path.clone(),
            Node::ArchiveRoot(root) => root.path.clone(),
            Node::ArchiveMember(member) => join(&member.root.path, &member.path),
        }
    }

    /// URL of the entry under `context_path`.
    pub fn url_path(&self, context_path: &str) -> String {
        format!("{}/{}", context_path.trim_end_matches('/'), self.path())
    }

    pub fn is_directory(&self) -> bool {
        match &self.node {
            Node::Plain(plain) => plain.stat.is_dir,
            Node::ArchiveRoot(_) => true,
            Node::ArchiveMember(member) => member.record().is_some_and(|r| r.is_directory),
        }
    }

    /// Size in bytes; 0 for directories, archive roots included.
    pub fn size(&self) -> u64 {
        match &self.node {
            Node::Plain(plain) => plain.stat.size,
            Node::ArchiveRoot(_) => 0,
            Node::ArchiveMember(member) => member.record().map_or(0, |r| r.size),
        }
    }

    pub fn last_modified(&self) -> SystemTime {
        match &self.node {
            Node::Plain(plain) => plain.stat.modified,
            Node::ArchiveRoot(root) => root.stat.modified,
            Node::ArchiveMember(member) => member.record().map_or(UNIX_EPOCH, |r| r.modified),
        }
    }

    pub fn exists(&self) -> bool {
        match &self.node {
            Node::Plain(plain) => plain.stat.exists,
            Node::ArchiveRoot(_) => true,
            Node::ArchiveMember(member) => member.slot.is_some(),
        }
    }

    /// The enclosing directory.
    ///
    /// Archive members at the top of their archive return the archive root,
    /// and archive roots return the filesystem directory holding the file.
    /// The top of the hierarchy is its own parent.
    pub async fn parent(&self) -> Entry {
        let node = match &self.node {
            Node::Plain(plain) if plain.path.is_empty() => Node::Plain(plain.clone()),
            Node::Plain(plain) => Node::Plain(
                PlainNode::load(plain.base.clone(), parent_of(&plain.path).to_string()).await,
            ),
            Node::ArchiveRoot(root) => Node::Plain(
                PlainNode::load(root.base.clone(), parent_of(&root.path).to_string()).await,
            ),
            Node::ArchiveMember(member) => match parent_of(&member.path) {
                "" => Node::ArchiveRoot(member.root.clone()),
                dir => Node::ArchiveMember(ArchiveMember::lookup(member.root.clone(), dir)),
            },
        };
        Entry::new(node)
    }

    pub fn icon_kind(&self) -> IconKind {
        if self.kind() == EntryKind::ArchiveRoot {
            IconKind::Archive
        } else if self.is_directory() {
            IconKind::Directory
        } else if is_archive_name(self.name()) {
            IconKind::Archive
        } else {
            IconKind::PlainFile
        }
    }

    /// Whether a download link should be offered. Archives can be
    /// downloaded whole even though they browse as directories.
    pub fn is_downloadable(&self) -> bool {
        if self.is_parent_link() {
            return false;
        }
        !self.is_directory() || self.kind() == EntryKind::ArchiveRoot
    }
}

impl From<Arc<ArchiveRoot>> for Entry {
    fn from(root: Arc<ArchiveRoot>) -> Self {
        Entry::new(Node::ArchiveRoot(root))
    }
}
