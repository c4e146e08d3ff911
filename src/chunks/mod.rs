//! Candidate chunk extraction and chunk-to-document association.
//!
//! Extraction decides which chunks of a compilation are worth considering at all, while
//! association decides whether a candidate is actually emitted into the document being
//! generated. The two steps are kept apart so every build-system variant shares the same
//! extraction rules.

mod association;
mod extract;

pub use association::BuildVersion;
pub use extract::{IncludeMode, extract_chunks};
