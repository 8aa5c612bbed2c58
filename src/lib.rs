//! refdoc — render parsed API reference docblocks as linked HTML.
//!
//! Entries (functions, classes, traits, interfaces, methods, hooks) come
//! from a JSON catalog produced by a docblock parser. The library formats
//! their text, resolves `{@link}` / `{@see}` references against the
//! catalog, and assembles a [`Page`] per entry for the renderers.

pub mod config;
pub mod error;
pub mod escape;
pub mod fields;
pub mod format;
pub mod hash;
pub mod links;
pub mod model;
pub mod render;
pub mod repository;
pub mod resolve;
pub mod source;

pub use config::Config;
pub use error::{Error, Result};
pub use fields::{Context, Page};
pub use format::{format_param_description, format_summary, make_doclinks_clickable};
pub use hash::format_hash_param;
pub use model::{Entry, EntryId, Kind, Relation};
pub use repository::{ContentRepository, MemoryRepository};
pub use resolve::{Reference, Resolver};
pub use source::{SourceCache, SourceReader};
