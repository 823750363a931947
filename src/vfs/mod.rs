//! Virtual filesystem over a directory tree with ZIP archives as directories.
//!
//! ## Overview
//!
//! A [`Resolver`] turns a request path into an [`Entry`]:
//!
//! - paths with no `.zip` segment are plain files and directories
//! - a path ending at a `.zip` segment is the archive, browsed as a directory
//! - anything after that segment is a member path inside the archive
//!
//! Directories are listed with [`Entry::list_children`], which hides
//! dot-entries, adds a `..` parent link below the top of the hierarchy and
//! orders the result. Leaves are read with [`Entry::open_content`].
//!
//! Nothing is cached: each resolution re-reads the filesystem and re-indexes
//! the archive it crosses.
//!
//! ## Example
//!
//! ```no_run
//! use zipbrowse::vfs::{Resolver, SortCriteria};
//!
//! # async fn demo() -> Result<(), zipbrowse::vfs::VfsError> {
//! let resolver = Resolver::new("/data");
//! let charts = resolver.resolve("reports/q1.zip/charts").await?;
//! for child in charts.list_children(&[SortCriteria::ByName]).await? {
//!     println!("{} {}", child.display_name(), child.size());
//! }
//! # Ok(())
//! # }
//! ```

mod content;
mod entry;
mod error;
mod index;
mod listing;
mod path;
mod record;
mod resolver;

pub use content::Content;
pub use entry::{ArchiveRoot, Entry, EntryKind, IconKind, PARENT_LINK_NAME, Role};
pub use error::VfsError;
pub use index::{ArchiveIndex, MemberRecord};
pub use listing::{HIDDEN_MARKER, SortCriteria, UnknownSortCriteria, compare_entries, sort_entries};
pub use path::{ARCHIVE_EXTENSION, is_archive_name};
pub use record::{ListingRecord, RecordKind};
pub use resolver::Resolver;
