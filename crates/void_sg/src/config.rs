//! Scene graph configuration
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables: `VOID_SG_SYMBOL_PREFIX`, `VOID_SG_PLUGINS`
//!    (paths separated like `PATH`), `VOID_SG_INDENT`
//! 2. Config file: `void_sg.toml` in the working directory, or an explicit path
//! 3. Built-in defaults
//!
//! # Example Config File
//!
//! ```toml
//! symbol_prefix = "void_create_sg_node__"
//! plugin_libraries = ["target/release/libvoid_sg_nodes.so"]
//! print_indent = 4
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneGraphError};
use crate::registry::DEFAULT_SYMBOL_PREFIX;

/// Default config file looked up by [`SceneGraphConfig::load`]
pub const CONFIG_FILE: &str = "void_sg.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneGraphConfig {
    /// Prefix prepended to a type name to form its creator symbol
    pub symbol_prefix: String,
    /// Shared libraries searched for node types the built-ins do not cover
    pub plugin_libraries: Vec<PathBuf>,
    /// Spaces per level in print output
    pub print_indent: usize,
    /// File the configuration was read from
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for SceneGraphConfig {
    fn default() -> Self {
        Self {
            symbol_prefix: DEFAULT_SYMBOL_PREFIX.to_string(),
            plugin_libraries: Vec::new(),
            print_indent: 2,
            config_path: None,
        }
    }
}

impl SceneGraphConfig {
    /// Load from `void_sg.toml` if present, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = if Path::new(CONFIG_FILE).is_file() {
            Self::load_from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Load from an explicit file, then apply environment overrides
    pub fn load_with(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::load_from_file(path)?;
        config.apply_env();
        Ok(config)
    }

    /// Parse a config file without consulting the environment
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)
            .map_err(|e| SceneGraphError::Config(format!("{}: {}", path.display(), e)))?;
        config.config_path = Some(path.to_path_buf());
        log::info!("Loaded scene graph config from {}", path.display());
        Ok(config)
    }

    /// Apply `VOID_SG_*` environment overrides
    pub fn apply_env(&mut self) {
        if let Ok(prefix) = std::env::var("VOID_SG_SYMBOL_PREFIX") {
            if !prefix.is_empty() {
                self.symbol_prefix = prefix;
            }
        }

        if let Some(plugins) = std::env::var_os("VOID_SG_PLUGINS") {
            let paths = std::env::split_paths(&plugins).filter(|p| !p.as_os_str().is_empty());
            self.plugin_libraries.extend(paths);
        }

        if let Ok(indent) = std::env::var("VOID_SG_INDENT") {
            match indent.parse() {
                Ok(indent) => self.print_indent = indent,
                Err(_) => log::warn!("ignoring VOID_SG_INDENT={:?}: not a number", indent),
            }
        }
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SceneGraphError::Config(e.to_string()))
    }
}
