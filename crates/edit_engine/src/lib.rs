//! Edit Engine - Structure-preserving edits of storage-format content
//!
//! This crate implements whole-page additions, heading-addressed section
//! edits, text and regex replacement restricted to text runs, and
//! index-addressed table and list edits. Every edit is described by an [`Operation`] and reported as an
//! [`OperationResult`] that carries the original content as a backup.

mod command;
mod config;
mod error;
mod executor;
mod operation;
mod result;
mod page_commands;
mod section_commands;
mod find_replace;
mod table_commands;
mod list_commands;
mod structural_editor;

pub use command::*;
pub use config::*;
pub use error::*;
pub use executor::*;
pub use operation::{Operation, OperationKind};
pub use result::*;
pub use page_commands::*;
pub use section_commands::*;
pub use find_replace::*;
pub use table_commands::*;
pub use list_commands::*;
pub use structural_editor::*;
