//! Service context bundling all port trait objects.

use crate::adapters::live::LiveFileSystem;
use crate::ports::filesystem::FileSystem;

/// Bundles the port trait objects a check run reads through.
///
/// Constructors wire up different adapter implementations (live disk,
/// or any `FileSystem` supplied by the caller).
pub struct ServiceContext {
    /// Filesystem for reading pipelines, config, and task files.
    pub fs: Box<dyn FileSystem>,
}

impl ServiceContext {
    /// Creates a live context that reads from the real disk.
    #[must_use]
    pub fn live() -> Self {
        Self { fs: Box::new(LiveFileSystem) }
    }

    /// Creates a context around the given filesystem adapter.
    #[must_use]
    pub fn with_fs(fs: impl FileSystem + 'static) -> Self {
        Self { fs: Box::new(fs) }
    }
}
