//! Data structures exchanged between the build system, the HTML generator and the pipeline.

use serde::{Deserialize, Deserializer};

/// Read-only view of a finished compilation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Compilation {
  /// Chunks produced by the build, in build order.
  pub chunks: Vec<Chunk>,
  /// Chunk groups (entrypoints and async split points) used by v4 association.
  pub chunk_groups: Vec<ChunkGroup>,
  /// Every emitted asset name, including files that belong to no chunk.
  pub assets: Vec<String>,
  /// Output public path prepended to every hinted file.
  pub public_path: String,
}

impl Compilation {
  /// Look up a chunk by id.
  pub fn chunk(&self, id: &str) -> Option<&Chunk> {
    self.chunks.iter().find(|chunk| chunk.id == id)
  }

  /// Look up a chunk group by id.
  pub fn chunk_group(&self, id: &str) -> Option<&ChunkGroup> {
    self.chunk_groups.iter().find(|group| group.id == id)
  }
}

/// Named group of output files contributed by the build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Chunk {
  /// Stable chunk identifier. Numeric ids are accepted and stored as text.
  #[serde(deserialize_with = "id_string")]
  pub id: String,
  /// Optional chunk name, usually the entry or split point name.
  pub name: Option<String>,
  /// Output files in emission order.
  pub files: Vec<String>,
  /// Whether the chunk is loaded on initial page load.
  pub initial: bool,
  /// Parent chunk ids (v3 build graphs).
  #[serde(deserialize_with = "id_strings")]
  pub parents: Vec<String>,
  /// Ids of the chunk groups containing this chunk (v4 build graphs).
  #[serde(deserialize_with = "id_strings")]
  pub groups: Vec<String>,
}

impl Chunk {
  /// Create a chunk with the given id and files and no graph information.
  pub fn new(id: impl Into<String>, files: impl IntoIterator<Item = impl Into<String>>) -> Self {
    Self {
      id: id.into(),
      files: files.into_iter().map(Into::into).collect(),
      ..Self::default()
    }
  }

  /// Builder-style name setter.
  pub fn named(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }
}

/// Node in the v4 chunk graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChunkGroup {
  /// Group identifier.
  #[serde(deserialize_with = "id_string")]
  pub id: String,
  /// Group name; entrypoint groups carry the entry name.
  pub name: Option<String>,
  /// Whether this group is an entrypoint.
  pub entrypoint: bool,
  /// Parent group ids.
  #[serde(deserialize_with = "id_strings")]
  pub parents: Vec<String>,
}

/// Markup tag as exchanged with the HTML generator's tag-group hook.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlTag {
  /// Element name, e.g. `link`.
  pub tag_name: String,
  /// Attributes in rendering order.
  pub attributes: Vec<(String, String)>,
}

/// In-progress HTML document handed over by the HTML generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocumentPayload {
  /// Output file name of the document being generated.
  pub output_name: String,
  /// Markup generated so far.
  pub html: String,
  /// Chunk names the HTML generator already placed in this document.
  pub chunk_names: Vec<String>,
  /// Structured head tags, filled by the tag-group hook style.
  pub head_tags: Vec<HtmlTag>,
}

/// Resolved attributes for one hinted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDescriptor {
  /// Public URL of the file.
  pub href: String,
  /// Link relation keyword.
  pub rel: String,
  /// Resource type, only set for `preload`.
  pub as_type: Option<String>,
  /// CORS mode, only set for preloaded fonts.
  pub crossorigin: Option<String>,
}

impl LinkDescriptor {
  /// Attributes in the order they are rendered: href, rel, as, crossorigin.
  pub fn attributes(&self) -> Vec<(String, String)> {
    let mut attributes = vec![
      ("href".to_string(), self.href.clone()),
      ("rel".to_string(), self.rel.clone()),
    ];
    if let Some(as_type) = &self.as_type {
      attributes.push(("as".to_string(), as_type.clone()));
    }
    if let Some(crossorigin) = &self.crossorigin {
      attributes.push(("crossorigin".to_string(), crossorigin.clone()));
    }
    attributes
  }

  /// Structured `<link>` tag for the tag-group hook.
  pub fn to_tag(&self) -> HtmlTag {
    HtmlTag {
      tag_name: "link".to_string(),
      attributes: self.attributes(),
    }
  }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
  Number(u64),
  Text(String),
}

impl RawId {
  fn into_string(self) -> String {
    match self {
      Self::Number(value) => value.to_string(),
      Self::Text(value) => value,
    }
  }
}

fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
  RawId::deserialize(deserializer).map(RawId::into_string)
}

fn id_strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
  let raw = Vec::<RawId>::deserialize(deserializer)?;
  Ok(raw.into_iter().map(RawId::into_string).collect())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accepts_numeric_and_textual_ids() {
    let compilation: Compilation = serde_json::from_str(
      r#"{
        "publicPath": "/dist/",
        "chunks": [
          {"id": 0, "name": "main", "files": ["main.js"], "initial": true, "groups": [1]},
          {"id": "lazy", "files": ["lazy.js"], "parents": [0]}
        ],
        "chunkGroups": [{"id": 1, "name": "main", "entrypoint": true}]
      }"#,
    )
    .unwrap();

    assert_eq!(compilation.public_path, "/dist/");
    assert_eq!(compilation.chunks[0].id, "0");
    assert_eq!(compilation.chunks[0].groups, vec!["1".to_string()]);
    assert_eq!(compilation.chunks[1].parents, vec!["0".to_string()]);
    assert!(compilation.chunk_group("1").is_some_and(|group| group.entrypoint));
    assert!(compilation.chunk("missing").is_none());
  }

  #[test]
  fn descriptor_attributes_follow_render_order() {
    let descriptor = LinkDescriptor {
      href: "/font.woff2".into(),
      rel: "preload".into(),
      as_type: Some("font".into()),
      crossorigin: Some("anonymous".into()),
    };

    let names: Vec<String> = descriptor
      .attributes()
      .into_iter()
      .map(|(name, _)| name)
      .collect();
    assert_eq!(names, vec!["href", "rel", "as", "crossorigin"]);
    assert_eq!(descriptor.to_tag().tag_name, "link");
  }
}
