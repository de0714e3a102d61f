//! Port traits defining external boundaries.
//!
//! The checker core only ever reads files; that boundary is the
//! `FileSystem` trait. Implementations live in `src/adapters/`.

pub mod filesystem;

pub use filesystem::FileSystem;
