//! Byte streams for leaf entries.

use log::debug;
use std::io::Cursor;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};

use super::entry::{Entry, Node};
use super::error::VfsError;

/// Readable content of an entry.
///
/// Plain files are streamed from an open handle; archive members are
/// decompressed in full into memory first.
#[derive(Debug)]
pub enum Content {
    File { file: tokio::fs::File, len: u64 },
    Buffer(Cursor<Vec<u8>>),
}

impl Content {
    /// Total number of bytes the stream yields.
    pub fn len(&self) -> u64 {
        match self {
            Content::File { len, .. } => *len,
            Content::Buffer(cursor) => cursor.get_ref().len() as u64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Convert into a blocking reader for synchronous consumers.
    pub async fn into_std_reader(self) -> Box<dyn std::io::Read + Send> {
        match self {
            Content::File { file, .. } => Box::new(file.into_std().await),
            Content::Buffer(cursor) => Box::new(cursor),
        }
    }
}

impl AsyncRead for Content {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            Content::File { file, .. } => Pin::new(file).poll_read(cx, buf),
            Content::Buffer(cursor) => Pin::new(cursor).poll_read(cx, buf),
        }
    }
}

impl Entry {
    /// Open the bytes of a leaf entry.
    ///
    /// # Errors
    ///
    /// - [`VfsError::IsADirectory`] for directories and archive roots
    /// - [`VfsError::NotFound`] if the file or member is gone
    /// - [`VfsError::ArchiveUnreadable`] if a member cannot be decompressed
    pub async fn open_content(&self) -> Result<Content, VfsError> {
        if self.is_directory() {
            return Err(VfsError::IsADirectory { path: self.path() });
        }

        match &self.node {
            Node::Plain(plain) => open_file(&plain.fs_path(), &plain.path).await,
            Node::ArchiveRoot(root) => Err(VfsError::IsADirectory {
                path: root.path().to_string(),
            }),
            Node::ArchiveMember(member) => {
                let Some(record) = member.record() else {
                    return Err(VfsError::not_found(self.path()));
                };
                let data = member.root.read_member(&member.path, record).await?;
                debug!("read {} bytes of {:?}", data.len(), self.path());
                Ok(Content::Buffer(Cursor::new(data)))
            }
        }
    }

    /// Open what a download of this entry delivers: the raw file for an
    /// archive root, the content for leaves.
    pub async fn open_download(&self) -> Result<Content, VfsError> {
        match &self.node {
            Node::ArchiveRoot(root) => open_file(&root.fs_path(), root.path()).await,
            _ => self.open_content().await,
        }
    }
}

async fn open_file(location: &Path, logical: &str) -> Result<Content, VfsError> {
    let file = tokio::fs::File::open(location).await.map_err(|err| {
        debug!("open {:?}: {}", logical, err);
        VfsError::not_found(logical)
    })?;
    let len = file
        .metadata()
        .await
        .map_err(|_| VfsError::not_found(logical))?
        .len();
    Ok(Content::File { file, len })
}
