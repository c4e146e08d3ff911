//! Resource hint attribute resolution, tag rendering and head injection.

mod inject;
mod resolve;
mod serialize;

pub use inject::{head_section, inject_into_head};
pub use resolve::{
  AS_TABLE, AsCallback, AsStrategy, FONT_CROSSORIGIN, PRELOAD, infer_as_type, resolve_link,
};
pub use serialize::{find_link_tags, parse_attributes, render_link, render_tag};
