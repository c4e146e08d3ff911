//! Allow/deny filtering and deterministic ordering of candidate files.

use std::collections::BTreeSet;

use regex::Regex;

use crate::error::{PreloadError, PreloadResult};
use crate::models::Chunk;

/// Trait describing selection filters for hinted files.
pub trait FileInclusion {
  /// Returns `true` when the file should receive a resource hint.
  fn is_included(&self, file: &str) -> bool;
}

/// Allow-list and deny-list of file patterns.
///
/// An absent list imposes no constraint. A present but empty allow-list therefore rejects
/// every file, while a present but empty deny-list rejects none.
#[derive(Debug, Clone, Default)]
pub struct SelectionRules {
  allow: Option<Vec<Regex>>,
  deny: Option<Vec<Regex>>,
}

impl SelectionRules {
  /// Compile raw allow/deny patterns.
  pub fn new(allow: Option<&[String]>, deny: Option<&[String]>) -> PreloadResult<Self> {
    Ok(Self {
      allow: allow
        .map(|patterns| compile_patterns("fileWhitelist", patterns))
        .transpose()?,
      deny: deny
        .map(|patterns| compile_patterns("fileBlacklist", patterns))
        .transpose()?,
    })
  }

  /// Determine whether a file passes both lists.
  pub fn is_included(&self, file: &str) -> bool {
    let allowed = self
      .allow
      .as_ref()
      .is_none_or(|patterns| patterns.iter().any(|pattern| pattern.is_match(file)));
    let denied = self
      .deny
      .as_ref()
      .is_some_and(|patterns| patterns.iter().any(|pattern| pattern.is_match(file)));
    allowed && !denied
  }

  /// Returns true when no filtering rules are active.
  #[cfg(test)]
  fn is_unfiltered(&self) -> bool {
    self.allow.is_none() && self.deny.is_none()
  }
}

impl FileInclusion for SelectionRules {
  fn is_included(&self, file: &str) -> bool {
    SelectionRules::is_included(self, file)
  }
}

/// Compile a list of patterns, trimming whitespace and discarding blank entries.
fn compile_patterns(option: &'static str, patterns: &[String]) -> PreloadResult<Vec<Regex>> {
  patterns
    .iter()
    .map(|pattern| pattern.trim())
    .filter(|pattern| !pattern.is_empty())
    .map(|pattern| {
      Regex::new(pattern).map_err(|source| PreloadError::InvalidPattern {
        option,
        pattern: pattern.to_string(),
        source,
      })
    })
    .collect()
}

/// Flatten chunks into a sorted, de-duplicated list of selected files.
pub fn select_files<'a, I, S>(chunks: I, selection: &S) -> Vec<String>
where
  I: IntoIterator<Item = &'a Chunk>,
  S: FileInclusion + ?Sized,
{
  let unique: BTreeSet<&str> = chunks
    .into_iter()
    .flat_map(|chunk| chunk.files.iter().map(String::as_str))
    .collect();

  unique
    .into_iter()
    .filter(|file| selection.is_included(file))
    .map(str::to_string)
    .collect()
}
