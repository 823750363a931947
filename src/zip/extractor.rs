use flate2::Crc;
use flate2::read::DeflateDecoder;
use std::io::Read;
use std::sync::Arc;

use crate::io::ReadAt;
use anyhow::{Context, Result, bail};

use super::parser::ZipParser;
use super::structures::{CentralDirectoryEntry, CompressionMethod};

/// ZIP member extractor
pub struct ZipExtractor<R: ReadAt> {
    parser: ZipParser<R>,
}

impl<R: ReadAt> ZipExtractor<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self {
            parser: ZipParser::new(reader),
        }
    }

    /// List all members in the archive
    pub async fn list_entries(&self) -> Result<Vec<CentralDirectoryEntry>> {
        self.parser.list_entries().await
    }

    /// Extract a member's uncompressed bytes into memory.
    ///
    /// The whole member is buffered; the result is checked against the
    /// declared size and CRC-32 from the Central Directory.
    pub async fn extract_to_memory(&self, entry: &CentralDirectoryEntry) -> Result<Vec<u8>> {
        if entry.is_directory {
            bail!("{} is a directory", entry.file_name);
        }

        let expected_len = usize::try_from(entry.uncompressed_size)
            .with_context(|| format!("{} is too large to buffer", entry.file_name))?;
        let data_offset = self.parser.data_offset(entry).await?;
        if data_offset.saturating_add(entry.compressed_size) > self.parser.reader().size() {
            bail!("Data of {} extends past end of archive", entry.file_name);
        }

        let mut raw = vec![0u8; entry.compressed_size as usize];
        self.parser.reader().read_exact_at(data_offset, &mut raw).await?;

        let entry = entry.clone();
        tokio::task::spawn_blocking(move || decode(&entry, raw, expected_len)).await?
    }
}

/// Decompress `raw` and check it against the sizes and CRC-32 in `entry`.
fn decode(entry: &CentralDirectoryEntry, raw: Vec<u8>, expected_len: usize) -> Result<Vec<u8>> {
    let data = match entry.compression_method {
        CompressionMethod::Stored => raw,
        CompressionMethod::Deflate => {
            let mut out = Vec::with_capacity(expected_len.min(raw.len().saturating_mul(16)));
            DeflateDecoder::new(raw.as_slice())
                .take(entry.uncompressed_size.saturating_add(1))
                .read_to_end(&mut out)
                .with_context(|| format!("Corrupt deflate stream in {}", entry.file_name))?;
            out
        }
        CompressionMethod::Unknown(method) => {
            bail!(
                "Unsupported compression method {} for {} (only STORED and DEFLATE are supported)",
                method,
                entry.file_name
            );
        }
    };

    if data.len() != expected_len {
        bail!(
            "{} decoded to {} bytes, expected {}",
            entry.file_name,
            data.len(),
            expected_len
        );
    }

    let mut crc = Crc::new();
    crc.update(&data);
    if crc.sum() != entry.crc32 {
        bail!(
            "CRC mismatch for {}: stored {:08x}, computed {:08x}",
            entry.file_name,
            entry.crc32,
            crc.sum()
        );
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(name: &str, data: &[u8]) -> CentralDirectoryEntry {
        let mut crc = Crc::new();
        crc.update(data);
        CentralDirectoryEntry {
            file_name: name.to_string(),
            compression_method: CompressionMethod::Stored,
            compressed_size: data.len() as u64,
            uncompressed_size: data.len() as u64,
            crc32: crc.sum(),
            lfh_offset: 0,
            last_mod_time: 0,
            last_mod_date: 0,
            unix_mtime: None,
            is_directory: false,
        }
    }

    #[test]
    fn stored_data_passes_through() {
        let entry = stored("a.txt", b"abc");
        assert_eq!(decode(&entry, b"abc".to_vec(), 3).unwrap(), b"abc");
    }

    #[test]
    fn length_and_crc_are_checked() {
        let entry = stored("a.txt", b"abc");
        assert!(decode(&entry, b"ab".to_vec(), 3).is_err());
        let err = decode(&entry, b"abd".to_vec(), 3).unwrap_err();
        assert!(err.to_string().contains("CRC mismatch"));
    }

    #[test]
    fn unknown_methods_are_rejected() {
        let mut entry = stored("a.bz2", b"abc");
        entry.compression_method = CompressionMethod::Unknown(12);
        let err = decode(&entry, b"abc".to_vec(), 3).unwrap_err();
        assert!(err.to_string().contains("Unsupported compression method 12"));
    }
}
