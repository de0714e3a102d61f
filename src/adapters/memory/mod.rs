//! In-memory adapters for embedding the checker without disk access.

pub mod filesystem;

pub use filesystem::MemoryFileSystem;
