const HEAD_CLOSE: &str = "</head>";

fn head_close_position(html: &str) -> Option<usize> {
  html.to_ascii_lowercase().find(HEAD_CLOSE)
}

/// Markup preceding the first `</head>`, or an empty string when there is none.
pub fn head_section(html: &str) -> &str {
  head_close_position(html).map_or("", |position| &html[..position])
}

/// Insert serialized tags as one block right before the first `</head>`.
///
/// The closing tag is matched case-insensitively. Documents without one are returned as-is.
pub fn inject_into_head<S: AsRef<str>>(html: &str, tags: &[S]) -> String {
  let Some(position) = head_close_position(html) else {
    return html.to_string();
  };

  let block_len: usize = tags.iter().map(|tag| tag.as_ref().len()).sum();
  let mut output = String::with_capacity(html.len() + block_len);
  output.push_str(&html[..position]);
  for tag in tags {
    output.push_str(tag.as_ref());
  }
  output.push_str(&html[position..]);
  output
}
