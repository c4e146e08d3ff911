use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{PreloadError, PreloadResult};
use crate::models::{Chunk, Compilation};

/// Supported build-system major versions, each with its own association rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildVersion {
  /// Chunks form a parent tree; the root chunk names the entry.
  V3,
  /// Chunks live in chunk groups; entrypoint groups name the entry.
  #[default]
  V4,
}

impl BuildVersion {
  /// Every supported version, in identifier order.
  pub const SUPPORTED: [BuildVersion; 2] = [BuildVersion::V3, BuildVersion::V4];

  /// Identifier used in configuration.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::V3 => "v3",
      Self::V4 => "v4",
    }
  }

  /// Decide whether `chunk` is emitted into the document that references `chunk_names`.
  pub fn chunk_belongs_to_document(
    self,
    chunk: &Chunk,
    compilation: &Compilation,
    chunk_names: &[String],
  ) -> PreloadResult<bool> {
    let entry_names = match self {
      Self::V3 => root_chunk_names(chunk, compilation)?,
      Self::V4 => entrypoint_names(chunk, compilation)?,
    };
    Ok(
      entry_names
        .iter()
        .any(|name| chunk_names.iter().any(|wanted| wanted == name)),
    )
  }
}

impl fmt::Display for BuildVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for BuildVersion {
  type Err = PreloadError;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    Self::SUPPORTED
      .into_iter()
      .find(|version| version.as_str() == value)
      .ok_or_else(|| PreloadError::UnsupportedVersion {
        found: value.to_string(),
        supported: Self::SUPPORTED
          .iter()
          .map(|version| version.as_str())
          .collect::<Vec<_>>()
          .join(", "),
      })
  }
}

/// Names of the chunk itself and of every root reached through its `parents` chain.
fn root_chunk_names<'a>(
  chunk: &'a Chunk,
  compilation: &'a Compilation,
) -> PreloadResult<BTreeSet<&'a str>> {
  let mut names: BTreeSet<&str> = chunk.name.as_deref().into_iter().collect();
  let mut seen = BTreeSet::from([chunk.id.as_str()]);
  let mut pending: Vec<&Chunk> = vec![chunk];

  while let Some(current) = pending.pop() {
    if current.parents.is_empty() {
      names.extend(current.name.as_deref());
      continue;
    }

    for parent_id in &current.parents {
      if !seen.insert(parent_id.as_str()) {
        continue;
      }
      let parent = compilation
        .chunk(parent_id)
        .ok_or_else(|| PreloadError::UnknownChunk(parent_id.clone()))?;
      pending.push(parent);
    }
  }

  Ok(names)
}

/// Names of the entrypoint groups reached from any group containing the chunk.
fn entrypoint_names<'a>(
  chunk: &'a Chunk,
  compilation: &'a Compilation,
) -> PreloadResult<BTreeSet<&'a str>> {
  let mut names = BTreeSet::new();
  let mut seen = BTreeSet::new();
  let mut pending: Vec<&str> = chunk.groups.iter().map(String::as_str).collect();

  while let Some(group_id) = pending.pop() {
    if !seen.insert(group_id) {
      continue;
    }
    let group = compilation
      .chunk_group(group_id)
      .ok_or_else(|| PreloadError::UnknownChunkGroup(group_id.to_string()))?;

    if group.entrypoint {
      names.extend(group.name.as_deref());
    } else {
      pending.extend(group.parents.iter().map(String::as_str));
    }
  }

  Ok(names)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::ChunkGroup;

  fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
  }

  fn group(id: &str, name: Option<&str>, entrypoint: bool, parents: &[&str]) -> ChunkGroup {
    ChunkGroup {
      id: id.into(),
      name: name.map(Into::into),
      entrypoint,
      parents: names(parents),
    }
  }

  fn v3_compilation() -> Compilation {
    let vendor = Chunk::new("0", ["vendor.js"]).named("vendor");
    let mut main = Chunk::new("1", ["main.js"]).named("main");
    main.parents = names(&["0"]);
    let mut lazy = Chunk::new("2", ["lazy.js"]);
    lazy.parents = names(&["1"]);
    let admin = Chunk::new("3", ["admin.js"]).named("admin");
    Compilation {
      chunks: vec![vendor, main, lazy, admin],
      ..Compilation::default()
    }
  }

  fn v4_compilation() -> Compilation {
    let mut main = Chunk::new("0", ["main.js"]).named("main");
    main.groups = names(&["g-main"]);
    let mut lazy = Chunk::new("1", ["lazy.js"]);
    lazy.groups = names(&["g-lazy"]);
    let mut admin = Chunk::new("2", ["admin.js"]).named("admin");
    admin.groups = names(&["g-admin"]);
    Compilation {
      chunks: vec![main, lazy, admin],
      chunk_groups: vec![
        group("g-main", Some("main"), true, &[]),
        group("g-lazy", None, false, &["g-main"]),
        group("g-admin", Some("admin"), true, &[]),
      ],
      ..Compilation::default()
    }
  }

  #[test]
  fn parses_supported_versions() {
    assert_eq!("v3".parse::<BuildVersion>().unwrap(), BuildVersion::V3);
    assert_eq!("v4".parse::<BuildVersion>().unwrap(), BuildVersion::V4);
    assert_eq!(BuildVersion::default(), BuildVersion::V4);
  }

  #[test]
  fn rejects_unknown_version_with_supported_list() {
    let error = "v5".parse::<BuildVersion>().unwrap_err();
    assert!(error.to_string().contains("supported: v3, v4"));
  }

  #[test]
  fn v3_follows_parent_chain_to_root() {
    let compilation = v3_compilation();
    let html_chunks = names(&["vendor", "main"]);

    for id in ["0", "1", "2"] {
      let chunk = compilation.chunk(id).unwrap();
      assert!(
        BuildVersion::V3
          .chunk_belongs_to_document(chunk, &compilation, &html_chunks)
          .unwrap()
      );
    }

    let admin = compilation.chunk("3").unwrap();
    assert!(
      !BuildVersion::V3
        .chunk_belongs_to_document(admin, &compilation, &html_chunks)
        .unwrap()
    );
  }

  #[test]
  fn v3_reports_dangling_parent() {
    let mut orphan = Chunk::new("9", ["orphan.js"]);
    orphan.parents = names(&["missing"]);
    let compilation = Compilation {
      chunks: vec![orphan.clone()],
      ..Compilation::default()
    };

    let error = BuildVersion::V3
      .chunk_belongs_to_document(&orphan, &compilation, &[])
      .unwrap_err();
    assert!(matches!(error, PreloadError::UnknownChunk(id) if id == "missing"));
  }

  #[test]
  fn v4_walks_chunk_groups_to_entrypoints() {
    let compilation = v4_compilation();
    let html_chunks = names(&["main"]);

    let lazy = compilation.chunk("1").unwrap();
    assert!(
      BuildVersion::V4
        .chunk_belongs_to_document(lazy, &compilation, &html_chunks)
        .unwrap()
    );

    let admin = compilation.chunk("2").unwrap();
    assert!(
      !BuildVersion::V4
        .chunk_belongs_to_document(admin, &compilation, &html_chunks)
        .unwrap()
    );
  }

  #[test]
  fn v4_terminates_on_cyclic_groups() {
    let mut chunk = Chunk::new("0", ["loop.js"]);
    chunk.groups = names(&["a"]);
    let compilation = Compilation {
      chunks: vec![chunk.clone()],
      chunk_groups: vec![group("a", None, false, &["b"]), group("b", None, false, &["a"])],
      ..Compilation::default()
    };

    assert!(
      !BuildVersion::V4
        .chunk_belongs_to_document(&chunk, &compilation, &names(&["main"]))
        .unwrap()
    );
  }

  #[test]
  fn v4_reports_dangling_group() {
    let mut chunk = Chunk::new("0", ["main.js"]);
    chunk.groups = names(&["nowhere"]);
    let compilation = Compilation::default();

    let error = BuildVersion::V4
      .chunk_belongs_to_document(&chunk, &compilation, &[])
      .unwrap_err();
    assert!(matches!(error, PreloadError::UnknownChunkGroup(id) if id == "nowhere"));
  }
}
