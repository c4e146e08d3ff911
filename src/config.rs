//! Plugin configuration loader.
//!
//! Options are read from `preload.config.json` (or a YAML equivalent) using the same keys the
//! JavaScript ecosystem uses for this plugin: `rel`, `include`, `fileWhitelist`,
//! `fileBlacklist`, `as` and `excludeHtmlNames`.

use std::fs;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::chunks::{BuildVersion, IncludeMode};
use crate::error::{PreloadError, PreloadResult};
use crate::hints::{AsStrategy, PRELOAD};
use crate::plugin::PreloadOptions;
use crate::selection::SelectionRules;

const CONFIG_FILES: [&str; 3] = [
  "preload.config.json",
  "preload.config.yaml",
  "preload.config.yml",
];

/// Deny pattern applied when `fileBlacklist` is not configured.
pub const DEFAULT_BLACKLIST: &str = r"\.map$";

/// Raw plugin configuration as written by users.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PreloadConfig {
  /// Link relation keyword.
  pub rel: String,
  /// Chunk selection mode.
  pub include: IncludeMode,
  /// Patterns a file must match at least one of. `None` disables the list.
  pub file_whitelist: Option<Vec<String>>,
  /// Patterns a file must match none of. `None` disables the list.
  pub file_blacklist: Option<Vec<String>>,
  /// Override for `as` inference.
  #[serde(rename = "as")]
  pub as_type: Option<AsConfig>,
  /// Output names of documents that never receive hints.
  pub exclude_html_names: Vec<String>,
  /// Build-system version selecting the association rules.
  pub build_version: String,
  /// Replaces the compilation's public path when set.
  pub public_path: Option<String>,
}

/// `as` option: a fixed value or a list of pattern overrides.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AsConfig {
  /// Same `as` value for every file.
  Fixed(String),
  /// Per-file overrides, first match wins.
  Overrides(Vec<AsOverride>),
}

/// Single `as` override entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AsOverride {
  /// Pattern matched against the file URL.
  pub pattern: String,
  /// Value used when the pattern matches.
  #[serde(rename = "as")]
  pub as_type: String,
}

impl Default for PreloadConfig {
  fn default() -> Self {
    Self {
      rel: PRELOAD.into(),
      include: IncludeMode::default(),
      file_whitelist: None,
      file_blacklist: Some(vec![DEFAULT_BLACKLIST.into()]),
      as_type: None,
      exclude_html_names: Vec::new(),
      build_version: BuildVersion::default().as_str().into(),
      public_path: None,
    }
  }
}

impl PreloadConfig {
  /// Look for a configuration file in `dir`, falling back to defaults.
  ///
  /// Unreadable or malformed files are logged and skipped.
  pub fn discover(dir: &Path) -> Self {
    for file_name in CONFIG_FILES {
      let candidate = dir.join(file_name);
      if !candidate.is_file() {
        continue;
      }
      match Self::from_path(&candidate) {
        Ok(config) => {
          debug!("loaded preload configuration from {}", candidate.display());
          return config;
        }
        Err(err) => warn!("ignoring preload configuration: {err}"),
      }
    }
    Self::default()
  }

  /// Read configuration from a specific JSON or YAML file.
  pub fn from_path(path: &Path) -> PreloadResult<Self> {
    let content = fs::read_to_string(path).map_err(|source| PreloadError::ConfigRead {
      path: path.to_path_buf(),
      source,
    })?;

    let is_yaml = path
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    let parsed = if is_yaml {
      serde_yaml::from_str(&content).map_err(|err| err.to_string())
    } else {
      serde_json::from_str(&content).map_err(|err| err.to_string())
    };

    parsed.map_err(|message| PreloadError::ConfigParse {
      path: path.to_path_buf(),
      message,
    })
  }

  /// Validate the configuration and compile its patterns.
  pub fn build(&self) -> PreloadResult<PreloadOptions> {
    let version: BuildVersion = self.build_version.parse()?;
    let rules = SelectionRules::new(
      self.file_whitelist.as_deref(),
      self.file_blacklist.as_deref(),
    )?;

    let as_strategy = match &self.as_type {
      None => AsStrategy::Infer,
      Some(AsConfig::Fixed(value)) => AsStrategy::Fixed(value.clone()),
      Some(AsConfig::Overrides(overrides)) => AsStrategy::Patterns(
        overrides
          .iter()
          .map(|entry| {
            Regex::new(&entry.pattern)
              .map(|pattern| (pattern, entry.as_type.clone()))
              .map_err(|source| PreloadError::InvalidPattern {
                option: "as",
                pattern: entry.pattern.clone(),
                source,
              })
          })
          .collect::<PreloadResult<_>>()?,
      ),
    };

    Ok(PreloadOptions {
      rel: self.rel.clone(),
      include: self.include.clone(),
      rules,
      as_strategy,
      exclude_html_names: self.exclude_html_names.iter().cloned().collect(),
      version,
      public_path: self.public_path.clone(),
    })
  }
}
