//! # zipbrowse
//!
//! Browse a directory tree over HTTP, treating ZIP archives as directories.
//!
//! Any `.zip` file below the base directory can be opened like a folder: its
//! members are listed, sorted and served as if they were ordinary files,
//! without extracting the archive to disk. The archive's central directory is
//! read on each request and members are inflated on demand.
//!
//! ## Features
//!
//! - Uniform listing of plain directories, archives and directories inside
//!   archives, with `..` parent links and dot-files hidden
//! - Sorting by name, size and date, composable in any order
//! - Support for ZIP64 archives and STORED / DEFLATE members
//! - Downloads of whole archives or single members
//!
//! ## Example
//!
//! ```no_run
//! use zipbrowse::vfs::{Resolver, SortCriteria};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let resolver = Resolver::new("/data");
//!
//!     let archive = resolver.resolve("reports/q1.zip").await?;
//!     for child in archive.list_children(&[SortCriteria::BySize]).await? {
//!         println!("{} {}", child.display_name(), child.size());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod format;
pub mod io;
pub mod server;
pub mod vfs;
pub mod zip;

pub use self::cli::Cli;
pub use self::io::{LocalFileReader, ReadAt};
pub use self::vfs::{Entry, Resolver, SortCriteria, VfsError};
pub use self::zip::{CentralDirectoryEntry, ZipExtractor};
