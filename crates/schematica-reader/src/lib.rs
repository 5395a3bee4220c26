//! Incremental pushdown expression parser (reader) for schematica.
//!
//! Feeds pre-lexed [`schematica_common::Token`]s into a stack of per-construct
//! sub-parsers and reports a completed top-level [`schematica_ast::Expression`]
//! as soon as enough tokens have arrived to finish it. See
//! [`Parser::include_token`] for the entry point.

pub mod env;
pub mod error;
pub mod psm;
pub mod stack;
pub mod state;

mod parser;

pub use error::ReaderError;
pub use parser::Parser;
