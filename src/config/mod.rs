//! Checker configuration.
//!
//! The config document is a small YAML file:
//!
//! ```yaml
//! resource_map:
//!   ci-tasks: ./ci
//!   app-source: ../app
//! ```
//!
//! Each entry tells the checker where a resource's contents live on disk so
//! that `file: <resource>/<path>` task references can be loaded.

mod resource_map;

use std::path::Path;

use serde::Deserialize;

pub use resource_map::ResourceMap;

use crate::context::ServiceContext;
use crate::error::{Error, Result};

/// Parsed checker configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Resource name to checkout directory.
    #[serde(default)]
    pub resource_map: ResourceMap,
}

impl Config {
    /// Parses a config document from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigParse` if the text is not a valid config document.
    pub fn from_yaml(path: &Path, contents: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a map.
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
            .map_err(|e| Error::ConfigParse { path: path.to_path_buf(), message: e.to_string() })
    }

    /// Loads the config at `path` through the context's filesystem.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(ctx: &ServiceContext, path: &Path) -> Result<Self> {
        let contents = ctx
            .fs
            .read_to_string(path)
            .map_err(|e| Error::ConfigRead { path: path.to_path_buf(), message: e.to_string() })?;
        let config = Self::from_yaml(path, &contents)?;
        tracing::debug!(
            path = %path.display(),
            resources = config.resource_map.len(),
            "loaded config"
        );
        Ok(config)
    }
}
