use std::sync::OnceLock;

use regex::Regex;

use crate::models::LinkDescriptor;

/// Render an element as a void tag, attributes in the given order.
///
/// Values are written verbatim; they come from build configuration and computed URLs.
pub fn render_tag(tag_name: &str, attributes: &[(String, String)]) -> String {
  let mut markup = format!("<{tag_name}");
  for (name, value) in attributes {
    markup.push(' ');
    markup.push_str(name);
    markup.push_str("=\"");
    markup.push_str(value);
    markup.push('"');
  }
  markup.push('>');
  markup
}

/// Render a resolved link descriptor.
pub fn render_link(descriptor: &LinkDescriptor) -> String {
  render_tag("link", &descriptor.attributes())
}

fn link_tag_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN
    .get_or_init(|| Regex::new(r"(?is)<link((?:\s|/)[^>]*)?>").expect("invalid link regex"))
}

fn comment_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("invalid comment regex"))
}

/// Attributes of every `<link>` element found in the markup, in document order.
///
/// Commented-out markup is skipped, and custom elements such as `<link-card>` do not count.
pub fn find_link_tags(html: &str) -> Vec<Vec<(String, String)>> {
  let markup = comment_pattern().replace_all(html, "");
  link_tag_pattern()
    .captures_iter(&markup)
    .map(|caps| parse_attributes(caps.get(1).map_or("", |body| body.as_str())))
    .collect()
}

/// Parse the attribute section of a tag.
///
/// Input: `href="/a.js" rel='preload' as=script crossorigin /`
/// Output: `[("href", "/a.js"), ("rel", "preload"), ("as", "script"), ("crossorigin", "")]`
///
/// Attribute names are lowercased; a trailing self-closing slash is ignored.
pub fn parse_attributes(source: &str) -> Vec<(String, String)> {
  let mut attributes = Vec::new();
  let mut chars = source.chars().peekable();

  while let Some(c) = chars.next() {
    if c.is_whitespace() || c == '/' {
      continue;
    }

    let mut name = String::from(c);
    while let Some(&next) = chars.peek() {
      if next == '=' || next == '/' || next.is_whitespace() {
        break;
      }
      name.push(next);
      chars.next();
    }

    while chars.next_if(|next| next.is_whitespace()).is_some() {}

    let mut value = String::new();
    if chars.next_if_eq(&'=').is_some() {
      while chars.next_if(|next| next.is_whitespace()).is_some() {}

      match chars.next_if(|next| *next == '"' || *next == '\'') {
        Some(quote) => {
          for c in chars.by_ref() {
            if c == quote {
              break;
            }
            value.push(c);
          }
        }
        None => {
          while let Some(next) = chars.next_if(|next| !next.is_whitespace()) {
            value.push(next);
          }
        }
      }
    }

    attributes.push((name.to_ascii_lowercase(), value));
  }

  attributes
}
