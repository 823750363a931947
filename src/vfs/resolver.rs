use log::debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::entry::{ArchiveMember, ArchiveRoot, Entry, Node, PlainNode};
use super::error::VfsError;
use super::path::{self, is_archive_name};

/// Maps request paths onto entries below a base directory.
///
/// The first path segment ending in `.zip` is the archive boundary: the path
/// up to it names the archive file and the rest names a member inside it.
/// Further `.zip` segments after the boundary are ordinary member names;
/// archives nested in archives are not opened.
#[derive(Debug, Clone)]
pub struct Resolver {
    base: Arc<Path>,
}

impl Resolver {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        let base: PathBuf = base.into();
        Self {
            base: Arc::from(base),
        }
    }

    /// Resolve a `/`-separated path relative to the base directory.
    ///
    /// Empty and `.` segments are ignored, so `lib.zip/` and `lib.zip` name
    /// the same archive and the empty path names the base directory itself.
    ///
    /// # Errors
    ///
    /// - [`VfsError::NotFound`] if nothing exists at the path, or the path
    ///   contains a `..` segment
    /// - [`VfsError::ArchiveUnreadable`] if the archive on the path cannot be
    ///   opened or parsed
    pub async fn resolve(&self, request_path: &str) -> Result<Entry, VfsError> {
        let segments = path::segments(request_path).ok_or_else(|| VfsError::not_found(request_path))?;

        let Some(boundary) = segments.iter().position(|segment| is_archive_name(segment)) else {
            let plain = PlainNode::load(self.base.clone(), segments.join("/")).await;
            if !plain.stat.exists {
                return Err(VfsError::not_found(plain.path));
            }
            debug!("resolved {:?} as plain entry", request_path);
            return Ok(Entry::new(Node::Plain(plain)));
        };

        let archive_path = segments[..=boundary].join("/");
        let root = Arc::new(ArchiveRoot::open(self.base.clone(), archive_path).await?);
        if boundary + 1 == segments.len() {
            debug!("resolved {:?} as archive root", request_path);
            return Ok(Entry::from(root));
        }

        let member_path = segments[boundary + 1..].join("/");
        let member = ArchiveMember::lookup(root, &member_path);
        if member.slot.is_none() {
            return Err(VfsError::not_found(format!(
                "{}/{}",
                member.root.path(),
                member_path
            )));
        }
        debug!("resolved {:?} as archive member {:?}", request_path, member_path);
        Ok(Entry::new(Node::ArchiveMember(member)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_path_is_the_unnamed_top() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = Resolver::new(dir.path());

        let top = resolver.resolve("").await.unwrap();
        assert_eq!(top.name(), "");
        assert!(top.is_directory());
        assert_eq!(top.path(), "");
    }

    #[tokio::test]
    async fn missing_plain_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = Resolver::new(dir.path());

        let err = resolver.resolve("nope/nothing.txt").await.unwrap_err();
        assert!(matches!(err, VfsError::NotFound { .. }));
    }

    #[tokio::test]
    async fn missing_archive_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = Resolver::new(dir.path());

        let err = resolver.resolve("gone.zip/a.txt").await.unwrap_err();
        assert!(matches!(err, VfsError::ArchiveUnreadable { .. }));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn garbage_archive_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.zip"), b"this is not a zip file at all").unwrap();
        let resolver = Resolver::new(dir.path());

        let err = resolver.resolve("bad.zip").await.unwrap_err();
        assert!(matches!(err, VfsError::ArchiveUnreadable { .. }));
    }
}
