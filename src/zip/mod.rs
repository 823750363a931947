//! Read-only ZIP codec used to browse archives in place.
//!
//! [`ZipParser`] locates the End of Central Directory record (ZIP64 aware)
//! and decodes the Central Directory into [`CentralDirectoryEntry`] values;
//! nothing else of the archive is read to list it. [`ZipExtractor`] then
//! fetches a single member: it jumps to the member's Local File Header via
//! the offset stored in its Central Directory entry, inflates the data when
//! it is DEFLATE compressed and checks length and CRC-32.
//!
//! Member names are taken as UTF-8 (lossily). Members using any method other
//! than STORED or DEFLATE are rejected, and multi-disk archives are not
//! supported.

mod extractor;
mod parser;
mod structures;

pub use extractor::ZipExtractor;
pub use parser::ZipParser;
pub use structures::*;
