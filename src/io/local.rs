use super::ReadAt;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Local file reader with random access support.
///
/// Reads run on tokio's blocking pool, so a slow disk never stalls the
/// worker that awaits them. The handle is closed when the last clone of the
/// reader's `Arc<File>` is dropped.
pub struct LocalFileReader {
    file: Arc<File>,
    size: u64,
}

impl LocalFileReader {
    pub fn new(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
        let metadata = file.metadata()?;
        if metadata.is_dir() {
            anyhow::bail!("{} is a directory", path.display());
        }
        Ok(Self {
            file: Arc::new(file),
            size: metadata.len(),
        })
    }

    /// [`LocalFileReader::new`] on the blocking pool.
    pub async fn open(path: PathBuf) -> Result<Self> {
        tokio::task::spawn_blocking(move || Self::new(&path)).await?
    }
}

#[async_trait]
impl ReadAt for LocalFileReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let file = self.file.clone();
        let len = buf.len();
        let (data, n) = tokio::task::spawn_blocking(move || -> std::io::Result<(Vec<u8>, usize)> {
            let mut data = vec![0u8; len];
            let n = positioned_read(&file, offset, &mut data)?;
            Ok((data, n))
        })
        .await??;
        buf[..n].copy_from_slice(&data[..n]);
        Ok(n)
    }

    fn size(&self) -> u64 {
        self.size
    }
}

fn positioned_read(file: &File, offset: u64, buf: &mut [u8]) -> std::io::Result<usize> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::FileExt;
        file.read_at(buf, offset)
    }

    #[cfg(windows)]
    {
        // seek_read moves the cursor, but every read here is positioned
        use std::os::windows::fs::FileExt;
        file.seek_read(buf, offset)
    }

    #[cfg(not(any(unix, windows)))]
    {
        use std::io::{Read, Seek, SeekFrom};
        let mut file = file;
        file.seek(SeekFrom::Start(offset))?;
        file.read(buf)
    }
}
