//! Live adapters backed by the real disk.

pub mod filesystem;

pub use filesystem::LiveFileSystem;
