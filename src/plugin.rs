//! Per-document orchestration and the boundary towards the host build system.
//!
//! A host binds the plugin once, which probes for the hook style it supports, and then hands
//! every generated document to [`PreloadPlugin::handle`]. Documents are processed
//! independently; a failure is reported through the host and leaves the document untouched.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::chunks::{BuildVersion, IncludeMode, extract_chunks};
use crate::config::PreloadConfig;
use crate::error::{PreloadError, PreloadResult};
use crate::hints::{
  AsStrategy, PRELOAD, find_link_tags, head_section, inject_into_head, render_link,
  resolve_link,
};
use crate::models::{Chunk, Compilation, DocumentPayload, LinkDescriptor};
use crate::selection::{SelectionRules, select_files};

/// Validated plugin options.
#[derive(Debug, Clone)]
pub struct PreloadOptions {
  /// Link relation keyword.
  pub rel: String,
  /// Chunk selection mode.
  pub include: IncludeMode,
  /// Compiled allow/deny file patterns.
  pub rules: SelectionRules,
  /// Strategy used for the `as` attribute of preload hints.
  pub as_strategy: AsStrategy,
  /// Output names of documents that never receive hints.
  pub exclude_html_names: BTreeSet<String>,
  /// Association rules to apply.
  pub version: BuildVersion,
  /// Overrides the compilation's public path when set.
  pub public_path: Option<String>,
}

impl Default for PreloadOptions {
  fn default() -> Self {
    Self {
      rel: PRELOAD.into(),
      include: IncludeMode::default(),
      rules: SelectionRules::default(),
      as_strategy: AsStrategy::default(),
      exclude_html_names: BTreeSet::new(),
      version: BuildVersion::default(),
      public_path: None,
    }
  }
}

/// Hook styles a host can expose for document generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStyle {
  /// Structured head tags are handed over before rendering.
  TagGroups,
  /// Rendered markup is handed over before it is written.
  HtmlProcessing,
}

/// Host build system the plugin is registered with.
pub trait HtmlHost {
  /// Whether the HTML generator exposes the structured tag-group hook.
  fn has_tag_groups_hook(&self) -> bool;

  /// Whether the HTML generator exposes the legacy markup processing hook.
  fn has_html_processing_hook(&self) -> bool;

  /// Report an error through the host's build diagnostics.
  fn report_error(&mut self, error: PreloadError);
}

/// Resource hint plugin.
#[derive(Debug, Clone, Default)]
pub struct PreloadPlugin {
  options: PreloadOptions,
}

impl PreloadPlugin {
  /// Create a plugin from validated options.
  pub fn new(options: PreloadOptions) -> Self {
    Self { options }
  }

  /// Validate raw configuration and create a plugin.
  pub fn from_config(config: &PreloadConfig) -> PreloadResult<Self> {
    config.build().map(Self::new)
  }

  /// Options the plugin runs with.
  pub fn options(&self) -> &PreloadOptions {
    &self.options
  }

  /// Pick the hook style to register with, preferring structured tag groups.
  ///
  /// When the host exposes neither style, [`PreloadError::MissingHook`] is reported through
  /// the host and `None` is returned.
  pub fn bind<H: HtmlHost + ?Sized>(&self, host: &mut H) -> Option<HookStyle> {
    if host.has_tag_groups_hook() {
      Some(HookStyle::TagGroups)
    } else if host.has_html_processing_hook() {
      Some(HookStyle::HtmlProcessing)
    } else {
      host.report_error(PreloadError::MissingHook);
      None
    }
  }

  /// Run the pipeline for one document, reporting failures through the host.
  ///
  /// On error the original payload is returned unchanged.
  pub fn handle<H: HtmlHost + ?Sized>(
    &self,
    style: HookStyle,
    compilation: &Compilation,
    payload: DocumentPayload,
    host: &mut H,
  ) -> DocumentPayload {
    match self.process(style, compilation, &payload) {
      Ok(updated) => updated,
      Err(err) => {
        warn!("preload hints skipped for {}: {err}", payload.output_name);
        host.report_error(err);
        payload
      }
    }
  }

  /// Run the pipeline for one document and return the updated payload.
  pub fn process(
    &self,
    style: HookStyle,
    compilation: &Compilation,
    payload: &DocumentPayload,
  ) -> PreloadResult<DocumentPayload> {
    if self.options.exclude_html_names.contains(&payload.output_name) {
      debug!("{} is excluded from preload hints", payload.output_name);
      return Ok(payload.clone());
    }

    let existing = existing_hints(style, payload);
    let links: Vec<LinkDescriptor> = self
      .link_descriptors(compilation, &payload.chunk_names)?
      .into_iter()
      .filter(|link| {
        let duplicate = existing.contains(&(link.rel.to_ascii_lowercase(), link.href.clone()));
        if duplicate {
          debug!("{} already declares {} {}", payload.output_name, link.rel, link.href);
        }
        !duplicate
      })
      .collect();

    let mut updated = payload.clone();
    match style {
      HookStyle::TagGroups => {
        updated
          .head_tags
          .extend(links.iter().map(LinkDescriptor::to_tag));
      }
      HookStyle::HtmlProcessing => {
        let tags: Vec<String> = links.iter().map(render_link).collect();
        updated.html = inject_into_head(&payload.html, &tags);
        if !tags.is_empty() && updated.html == payload.html {
          debug!("{} has no closing head tag", payload.output_name);
        }
      }
    }
    Ok(updated)
  }

  /// Resolve the hints for a document referencing `chunk_names`, in href order.
  pub fn link_descriptors(
    &self,
    compilation: &Compilation,
    chunk_names: &[String],
  ) -> PreloadResult<Vec<LinkDescriptor>> {
    let options = &self.options;
    let candidates = extract_chunks(compilation, &options.include);

    let chunks: Vec<&Chunk> = if options.include.skips_association() {
      candidates.iter().map(|chunk| &**chunk).collect()
    } else {
      let mut associated = Vec::with_capacity(candidates.len());
      for chunk in &candidates {
        if options
          .version
          .chunk_belongs_to_document(chunk, compilation, chunk_names)?
        {
          associated.push(&**chunk);
        }
      }
      associated
    };

    let public_path = options
      .public_path
      .as_deref()
      .unwrap_or(&compilation.public_path);

    Ok(
      select_files(chunks, &options.rules)
        .iter()
        .map(|file| resolve_link(file, public_path, &options.rel, &options.as_strategy))
        .collect(),
    )
  }
}

/// `(rel, href)` pairs already declared in the document's head, `rel` lowercased.
fn existing_hints(style: HookStyle, payload: &DocumentPayload) -> BTreeSet<(String, String)> {
  let link_attributes: Vec<Vec<(String, String)>> = match style {
    HookStyle::TagGroups => payload
      .head_tags
      .iter()
      .filter(|tag| tag.tag_name.eq_ignore_ascii_case("link"))
      .map(|tag| tag.attributes.clone())
      .collect(),
    HookStyle::HtmlProcessing => find_link_tags(head_section(&payload.html)),
  };

  link_attributes
    .into_iter()
    .filter_map(|attributes| {
      let lookup = |key: &str| {
        attributes
          .iter()
          .find(|(name, _)| name.eq_ignore_ascii_case(key))
          .map(|(_, value)| value.clone())
      };
      Some((lookup("rel")?.to_ascii_lowercase(), lookup("href")?))
    })
    .collect()
}
