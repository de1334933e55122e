//! Document Model - Storage-format document tree and structure analysis
//!
//! This crate parses wiki storage-format markup (XHTML with `ac:`, `ri:` and
//! `at:` namespaced elements) into an arena tree with stable node ids, writes
//! it back out, and derives headings, sections, content blocks and insertion
//! points from it.

mod node;
mod node_id;
mod namespace;
mod tree;
mod error;
mod config;
mod parser;
mod serializer;
pub mod section;
pub mod blocks;
pub mod structure;
pub mod table;
pub mod list;

pub use node::*;
pub use node_id::*;
pub use namespace::*;
pub use tree::*;
pub use error::*;
pub use config::*;
pub use parser::*;
pub use serializer::*;
pub use section::*;
pub use blocks::*;
pub use structure::*;
