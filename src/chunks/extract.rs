use std::borrow::Cow;
use std::collections::BTreeSet;

use serde::Deserialize;

use crate::error::PreloadError;
use crate::models::{Chunk, Compilation};

/// Which chunks of a compilation are candidates for resource hints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "IncludeRepr")]
pub enum IncludeMode {
  /// Every chunk, narrowed down to the ones associated with the document.
  #[default]
  Associated,
  /// Every chunk and loose asset, without association filtering.
  AllAssets,
  /// Chunks loaded on initial page load.
  Initial,
  /// Chunks loaded on demand.
  AsyncChunks,
  /// Every chunk. Association still applies.
  AllChunks,
  /// Chunks whose name appears in the list.
  Named(Vec<String>),
}

impl IncludeMode {
  /// Returns `true` when candidates bypass chunk-to-document association.
  pub fn skips_association(&self) -> bool {
    matches!(self, Self::AllAssets)
  }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IncludeRepr {
  Mode(String),
  Chunks(Vec<String>),
}

impl TryFrom<IncludeRepr> for IncludeMode {
  type Error = PreloadError;

  fn try_from(repr: IncludeRepr) -> Result<Self, Self::Error> {
    match repr {
      IncludeRepr::Chunks(names) => Ok(Self::Named(names)),
      IncludeRepr::Mode(mode) => match mode.as_str() {
        "associated" => Ok(Self::Associated),
        "allAssets" => Ok(Self::AllAssets),
        "initial" => Ok(Self::Initial),
        "asyncChunks" => Ok(Self::AsyncChunks),
        "allChunks" => Ok(Self::AllChunks),
        _ => Err(PreloadError::InvalidInclude(mode)),
      },
    }
  }
}

/// Produce the candidate chunks for the given include mode.
///
/// In [`IncludeMode::AllAssets`] mode, emitted assets that no chunk claims are gathered into
/// one trailing pseudo-chunk so copied files and images can be hinted as well.
pub fn extract_chunks<'a>(compilation: &'a Compilation, mode: &IncludeMode) -> Vec<Cow<'a, Chunk>> {
  let borrowed = |chunk: &'a Chunk| Cow::Borrowed(chunk);

  match mode {
    IncludeMode::Associated | IncludeMode::AllChunks => {
      compilation.chunks.iter().map(borrowed).collect()
    }
    IncludeMode::Initial => compilation
      .chunks
      .iter()
      .filter(|chunk| chunk.initial)
      .map(borrowed)
      .collect(),
    IncludeMode::AsyncChunks => compilation
      .chunks
      .iter()
      .filter(|chunk| !chunk.initial)
      .map(borrowed)
      .collect(),
    IncludeMode::Named(names) => compilation
      .chunks
      .iter()
      .filter(|chunk| {
        chunk
          .name
          .as_ref()
          .is_some_and(|name| names.iter().any(|wanted| wanted == name))
      })
      .map(borrowed)
      .collect(),
    IncludeMode::AllAssets => {
      let mut chunks: Vec<Cow<'a, Chunk>> = compilation.chunks.iter().map(borrowed).collect();
      let claimed: BTreeSet<&str> = compilation
        .chunks
        .iter()
        .flat_map(|chunk| chunk.files.iter().map(String::as_str))
        .collect();
      let loose: Vec<&String> = compilation
        .assets
        .iter()
        .filter(|asset| !claimed.contains(asset.as_str()))
        .collect();
      if !loose.is_empty() {
        chunks.push(Cow::Owned(Chunk::new("__assets__", loose)));
      }
      chunks
    }
  }
}
