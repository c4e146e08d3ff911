//! Error type shared by the preload pipeline, its configuration and the hook boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while configuring or running the resource hint pipeline.
#[derive(Debug, Error)]
pub enum PreloadError {
  /// The configured build-system version has no association variant.
  #[error("unsupported build version '{found}' (supported: {supported})")]
  UnsupportedVersion {
    /// Identifier supplied by the caller.
    found: String,
    /// Comma separated list of accepted identifiers.
    supported: String,
  },

  /// A file or `as` pattern failed to compile.
  #[error("invalid {option} pattern '{pattern}': {source}")]
  InvalidPattern {
    /// Option the pattern was configured under.
    option: &'static str,
    /// Raw pattern text.
    pattern: String,
    /// Regex compilation error.
    source: regex::Error,
  },

  /// The `include` option named an unknown selection mode.
  #[error(
    "invalid include mode '{0}' (expected associated, allAssets, initial, asyncChunks, allChunks or a list of chunk names)"
  )]
  InvalidInclude(String),

  /// The host exposes neither hook style.
  #[error(
    "no HTML generation hook found; register the HTML generator plugin before the preload plugin"
  )]
  MissingHook,

  /// A chunk referenced an id that is not part of the compilation.
  #[error("chunk '{0}' is referenced but not present in the compilation")]
  UnknownChunk(String),

  /// A chunk group referenced an id that is not part of the compilation.
  #[error("chunk group '{0}' is referenced but not present in the compilation")]
  UnknownChunkGroup(String),

  /// Failed to read a configuration file from disk.
  #[error("failed to read {}: {source}", .path.display())]
  ConfigRead {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },

  /// Failed to parse a configuration file.
  #[error("failed to parse {}: {message}", .path.display())]
  ConfigParse {
    /// Path that caused the error.
    path: PathBuf,
    /// Parser error message.
    message: String,
  },
}

/// Result alias used throughout the crate.
pub type PreloadResult<T> = Result<T, PreloadError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_hook_names_the_remediation() {
    let message = PreloadError::MissingHook.to_string();
    assert!(message.contains("before the preload plugin"));
  }

  #[test]
  fn unsupported_version_lists_supported_set() {
    let error = PreloadError::UnsupportedVersion {
      found: "v9".into(),
      supported: "v3, v4".into(),
    };
    assert_eq!(
      error.to_string(),
      "unsupported build version 'v9' (supported: v3, v4)"
    );
  }
}
