//! Configuration lookup.
//!
//! A [`Config`] is a parsed TOML document queried with dotted keys such as
//! `processing.chunk.max_chars`. Keys may be written as nested tables or as
//! flat dotted assignments; both forms resolve the same way. Missing files
//! and missing keys fall back to the caller's default.

use std::path::Path;

use serde::{Deserialize, Serialize};
use toml::Value;

use crate::chunk::ChunkOptions;
use crate::error::{Error, Result};
use crate::render::RenderOptions;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "DOCSPLIT_CONFIG";

pub const KEY_MAX_CHARS: &str = "processing.chunk.max_chars";
pub const KEY_OVERLAP_CHARS: &str = "processing.chunk.overlap_chars";
pub const KEY_RENDER_DPI: &str = "processing.pdf.render_dpi";

/// Parsed configuration document.
#[derive(Debug, Clone)]
pub struct Config {
    root: Value,
}

impl Config {
    /// An empty configuration; every lookup returns its default.
    pub fn empty() -> Self {
        Self {
            root: Value::Table(Default::default()),
        }
    }

    /// Parse configuration text.
    pub fn parse(text: &str) -> Result<Self> {
        let table: toml::Table = text.parse().map_err(|e: toml::de::Error| {
            Error::Config(e.message().to_string())
        })?;
        Ok(Self {
            root: Value::Table(table),
        })
    }

    /// Load a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::parse(&text)
    }

    /// Load the file named by `DOCSPLIT_CONFIG`.
    ///
    /// An unset variable or a missing file yields an empty configuration.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if Path::new(&path).exists() => Self::from_file(path),
            Some(path) => {
                log::warn!(
                    "{} points to missing file {}, using defaults",
                    CONFIG_ENV,
                    Path::new(&path).display()
                );
                Ok(Self::empty())
            }
            None => Ok(Self::empty()),
        }
    }

    /// Look up a dotted key.
    ///
    /// Nested tables are walked first; if the path breaks off, a flat key
    /// containing the literal dots is tried at the top level.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut current = &self.root;
        for part in key.split('.') {
            match current.get(part) {
                Some(next) => current = next,
                None => return self.root.get(key),
            }
        }
        Some(current)
    }

    /// Integer lookup with default. Floats are truncated; numeric strings parse.
    pub fn get_i64(&self, key: &str, default: i64) -> i64 {
        match self.get(key) {
            Some(Value::Integer(i)) => *i,
            Some(Value::Float(f)) => *f as i64,
            Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// String lookup with default.
    pub fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).and_then(Value::as_str).unwrap_or(default)
    }

    /// Boolean lookup with default.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    /// Typed view of the settings this crate consumes.
    pub fn settings(&self) -> Settings {
        let defaults = Settings::default();
        Settings {
            chunk: ChunkOptions {
                max_chars: clamp_to_usize(
                    self.get_i64(KEY_MAX_CHARS, defaults.chunk.max_chars as i64),
                ),
                overlap_chars: clamp_to_usize(
                    self.get_i64(KEY_OVERLAP_CHARS, defaults.chunk.overlap_chars as i64),
                ),
            },
            render: RenderOptions::new().with_dpi(
                self.get_i64(KEY_RENDER_DPI, defaults.render.dpi as i64)
                    .clamp(1, u32::MAX as i64) as u32,
            ),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::empty()
    }
}

/// Settings consumed by the chunker and the page renderer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Settings {
    pub chunk: ChunkOptions,
    pub render: RenderOptions,
}

/// Negative values select the chunker's whole-text passthrough.
fn clamp_to_usize(value: i64) -> usize {
    usize::try_from(value).unwrap_or(0)
}
