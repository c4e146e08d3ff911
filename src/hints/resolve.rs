use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::models::LinkDescriptor;

/// Relation keyword that enables `as` and `crossorigin` resolution.
pub const PRELOAD: &str = "preload";

/// CORS mode applied to every preloaded font.
pub const FONT_CROSSORIGIN: &str = "anonymous";

/// File name suffixes mapped to `as` values, checked in order.
///
/// Compound suffixes come first so `app.worker.js` resolves to `worker` rather than `script`.
pub const AS_TABLE: &[(&str, &str)] = &[
  (".worker.js", "worker"),
  (".worker.mjs", "worker"),
  (".js", "script"),
  (".mjs", "script"),
  (".cjs", "script"),
  (".css", "style"),
  (".png", "image"),
  (".jpg", "image"),
  (".jpeg", "image"),
  (".gif", "image"),
  (".webp", "image"),
  (".avif", "image"),
  (".svg", "image"),
  (".ico", "image"),
  (".bmp", "image"),
  (".woff", "font"),
  (".woff2", "font"),
  (".ttf", "font"),
  (".otf", "font"),
  (".eot", "font"),
  (".mp3", "audio"),
  (".wav", "audio"),
  (".oga", "audio"),
  (".m4a", "audio"),
  (".aac", "audio"),
  (".flac", "audio"),
  (".opus", "audio"),
  (".mp4", "video"),
  (".webm", "video"),
  (".ogv", "video"),
  (".mov", "video"),
  (".m4v", "video"),
  (".html", "document"),
  (".htm", "document"),
];

/// Callback computing an `as` value from a file URL.
pub type AsCallback = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// How the `as` attribute of a preload hint is chosen.
#[derive(Clone, Default)]
pub enum AsStrategy {
  /// Look the URL's extension up in [`AS_TABLE`].
  #[default]
  Infer,
  /// Use the same value for every file.
  Fixed(String),
  /// First matching pattern wins, otherwise fall back to [`AS_TABLE`].
  Patterns(Vec<(Regex, String)>),
  /// Delegate to a callback receiving the full URL.
  Custom(AsCallback),
}

impl AsStrategy {
  /// Resolve the `as` value for a URL.
  pub fn resolve(&self, href: &str) -> Option<String> {
    match self {
      Self::Infer => infer_as_type(href).map(str::to_string),
      Self::Fixed(value) => Some(value.clone()),
      Self::Patterns(overrides) => overrides
        .iter()
        .find(|(pattern, _)| pattern.is_match(href))
        .map(|(_, value)| value.clone())
        .or_else(|| infer_as_type(href).map(str::to_string)),
      Self::Custom(callback) => callback(href),
    }
  }
}

impl fmt::Debug for AsStrategy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Infer => f.write_str("Infer"),
      Self::Fixed(value) => f.debug_tuple("Fixed").field(value).finish(),
      Self::Patterns(overrides) => f
        .debug_list()
        .entries(overrides.iter().map(|(pattern, value)| (pattern.as_str(), value)))
        .finish(),
      Self::Custom(_) => f.write_str("Custom(..)"),
    }
  }
}

/// Infer the `as` value from the URL's file extension.
///
/// Query strings and fragments are ignored and the comparison is case-insensitive. Unknown
/// or missing extensions yield `None`.
pub fn infer_as_type(href: &str) -> Option<&'static str> {
  let path = href.split(['?', '#']).next().unwrap_or(href);
  let file_name = path.rsplit('/').next().unwrap_or(path).to_ascii_lowercase();

  AS_TABLE
    .iter()
    .find(|(suffix, _)| file_name.len() > suffix.len() && file_name.ends_with(suffix))
    .map(|(_, as_type)| *as_type)
}

/// Compute the link attributes for one selected file.
pub fn resolve_link(
  file: &str,
  public_path: &str,
  rel: &str,
  strategy: &AsStrategy,
) -> LinkDescriptor {
  let href = format!("{public_path}{file}");

  let (as_type, crossorigin) = if rel == PRELOAD {
    let as_type = strategy.resolve(&href);
    let crossorigin = as_type
      .as_deref()
      .filter(|value| *value == "font")
      .map(|_| FONT_CROSSORIGIN.to_string());
    (as_type, crossorigin)
  } else {
    (None, None)
  };

  LinkDescriptor {
    href,
    rel: rel.to_string(),
    as_type,
    crossorigin,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn infers_common_resource_types() {
    assert_eq!(infer_as_type("/dist/app.js"), Some("script"));
    assert_eq!(infer_as_type("/dist/app.css"), Some("style"));
    assert_eq!(infer_as_type("/img/hero.WEBP"), Some("image"));
    assert_eq!(infer_as_type("/fonts/inter.woff2"), Some("font"));
    assert_eq!(infer_as_type("/media/intro.mp4"), Some("video"));
    assert_eq!(infer_as_type("/media/chime.mp3"), Some("audio"));
    assert_eq!(infer_as_type("/frames/embed.html"), Some("document"));
    assert_eq!(infer_as_type("/sw/sync.worker.js"), Some("worker"));
  }

  #[test]
  fn ignores_query_strings_and_fragments() {
    assert_eq!(infer_as_type("/app.css?v=123"), Some("style"));
    assert_eq!(infer_as_type("/app.js#main"), Some("script"));
    assert_eq!(infer_as_type("/data?format=.css"), None);
  }

  #[test]
  fn unknown_or_missing_extensions_yield_none() {
    assert_eq!(infer_as_type("/LICENSE"), None);
    assert_eq!(infer_as_type("/data.bin"), None);
    assert_eq!(infer_as_type("/v1.2/manifest"), None);
  }

  #[test]
  fn preload_sets_as_and_font_crossorigin() {
    let font = resolve_link("font.woff2", "/", PRELOAD, &AsStrategy::Infer);
    assert_eq!(font.as_type.as_deref(), Some("font"));
    assert_eq!(font.crossorigin.as_deref(), Some("anonymous"));

    let script = resolve_link("app.js", "/dist/", PRELOAD, &AsStrategy::Infer);
    assert_eq!(script.href, "/dist/app.js");
    assert_eq!(script.as_type.as_deref(), Some("script"));
    assert_eq!(script.crossorigin, None);
  }

  #[test]
  fn preload_without_known_extension_omits_as() {
    let descriptor = resolve_link("blob", "/", PRELOAD, &AsStrategy::Infer);
    assert_eq!(descriptor.as_type, None);
    assert_eq!(descriptor.crossorigin, None);
  }

  #[test]
  fn prefetch_never_sets_as_or_crossorigin() {
    for file in ["app.js", "font.woff2", "style.css", "unknown"] {
      let descriptor = resolve_link(file, "/", "prefetch", &AsStrategy::Fixed("font".into()));
      assert_eq!(descriptor.rel, "prefetch");
      assert_eq!(descriptor.as_type, None);
      assert_eq!(descriptor.crossorigin, None);
    }
  }

  #[test]
  fn public_path_is_concatenated_verbatim() {
    let descriptor = resolve_link(
      "app.js",
      "https://cdn.example.com/assets",
      "prefetch",
      &AsStrategy::Infer,
    );
    assert_eq!(descriptor.href, "https://cdn.example.com/assetsapp.js");
  }

  #[test]
  fn fixed_and_pattern_overrides_win_over_inference() {
    let fixed = resolve_link("app.js", "/", PRELOAD, &AsStrategy::Fixed("fetch".into()));
    assert_eq!(fixed.as_type.as_deref(), Some("fetch"));

    let overrides = AsStrategy::Patterns(vec![(Regex::new(r"\.json$").unwrap(), "fetch".into())]);
    assert_eq!(overrides.resolve("/data.json").as_deref(), Some("fetch"));
    assert_eq!(overrides.resolve("/app.css").as_deref(), Some("style"));
  }

  #[test]
  fn fixed_font_override_still_marks_crossorigin() {
    let descriptor = resolve_link("glyphs.bin", "/", PRELOAD, &AsStrategy::Fixed("font".into()));
    assert_eq!(descriptor.crossorigin.as_deref(), Some("anonymous"));
  }

  #[test]
  fn custom_callback_receives_full_url() {
    let strategy = AsStrategy::Custom(Arc::new(|href: &str| {
      href.starts_with("/static/").then(|| "image".to_string())
    }));

    assert_eq!(strategy.resolve("/static/a.bin").as_deref(), Some("image"));
    assert_eq!(strategy.resolve("/other/a.bin"), None);
    assert_eq!(format!("{strategy:?}"), "Custom(..)");
  }
}
