#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod chunks;
pub mod config;
pub mod error;
pub mod hints;
pub mod models;
pub mod plugin;
pub mod selection;

pub use chunks::{BuildVersion, IncludeMode};
pub use config::PreloadConfig;
pub use error::{PreloadError, PreloadResult};
pub use models::{Chunk, ChunkGroup, Compilation, DocumentPayload, HtmlTag, LinkDescriptor};
pub use plugin::{HookStyle, HtmlHost, PreloadOptions, PreloadPlugin};
