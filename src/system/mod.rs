//! System abstraction for filesystem operations
//!
//! The file-backed configuration provider and override store reach the disk
//! only through this trait, so they can be tested against an in-memory
//! filesystem.

use std::io;
use std::path::{Path, PathBuf};

pub mod mock;
pub mod real;

pub use mock::MockSystem;
pub use real::RealSystem;

/// Unified trait for filesystem operations
///
/// # Implementations
/// - `RealSystem`: Production implementation using `std::fs`, `tempfile` and `fd-lock`
/// - `MockSystem`: Test implementation using in-memory storage
pub trait System: Send + Sync {
    /// Read entire file contents as a string
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replace a file's contents in a single step
    ///
    /// Readers observe either the previous contents or the new contents,
    /// never a partially written file. The parent directory must exist.
    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Run `critical` while holding an exclusive lock on the file at `path`
    ///
    /// The lock file is created if missing and the parent directory must
    /// exist. The lock excludes other holders of the same path in this and
    /// other processes; it blocks until the lock is free.
    fn with_exclusive_lock(
        &self,
        path: &Path,
        critical: &mut dyn FnMut() -> io::Result<()>,
    ) -> io::Result<()>;

    /// Recursively create a directory and all parent directories
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if a path points to a file
    fn is_file(&self, path: &Path) -> bool;

    /// Check if a path points to a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Read directory entries, returning paths of all entries
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;
}
