//! Configuration loading
//!
//! `defaults/tokenfold.default.toml` is embedded into the binary so that docs and runtime
//! behavior stay in sync. Callers layer user files on top of those defaults via [Loader]
//! before deserializing into [Settings].
//!
//! Grammar files declare node kinds as `[[kinds]]` tables and are turned into a
//! [NodeRegistry] by [GrammarConfig::into_registry]:
//!
//! ```toml
//! [[kinds]]
//! name = "function"
//! absorb_previous = "description"
//! children = ["param", "returns"]
//!
//! [[kinds]]
//! name = "param"
//! primary = false
//! ```

use crate::fold::error::Result;
use crate::fold::node::NodeKind;
use crate::fold::registry::NodeRegistry;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../../defaults/tokenfold.default.toml");

/// Top-level settings consumed by tokenfold applications.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub extractor: ExtractorConfig,
    pub output: OutputConfig,
}

/// Comment block delimiters
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtractorConfig {
    pub open: String,
    pub close: String,
    pub remove: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        ExtractorConfig {
            open: "/**".to_string(),
            close: "*/".to_string(),
            remove: "*".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: String,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<Settings> {
        Ok(self.builder.build()?.try_deserialize()?)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<Settings> {
    Loader::new().build()
}

/// One `[[kinds]]` entry of a grammar file
#[derive(Debug, Clone, Deserialize)]
pub struct KindDecl {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default = "default_primary")]
    pub primary: bool,
    #[serde(default)]
    pub absorb_previous: Option<String>,
    #[serde(default)]
    pub absorb_next: Option<String>,
    #[serde(default)]
    pub children: Vec<String>,
}

fn default_primary() -> bool {
    true
}

impl From<KindDecl> for NodeKind {
    fn from(decl: KindDecl) -> Self {
        let mut names = vec![decl.name];
        names.extend(decl.aliases);
        NodeKind {
            names,
            primary: decl.primary,
            absorb_previous: decl.absorb_previous,
            absorb_next: decl.absorb_next,
            child_kinds: decl.children,
        }
    }
}

/// Node kinds declared in a grammar file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GrammarConfig {
    #[serde(default)]
    pub kinds: Vec<KindDecl>,
}

impl GrammarConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        Ok(Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?)
    }

    pub fn from_toml_str(toml: &str) -> Result<Self> {
        Ok(Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?)
    }

    /// Register every declared kind, stopping at the first invalid one
    pub fn into_registry(self) -> Result<NodeRegistry> {
        let mut registry = NodeRegistry::new();
        for decl in self.kinds {
            registry.register_kind(decl.into())?;
        }
        Ok(registry)
    }
}
