//! # sqlporter
//!
//! Move a SQL database's structure and content in and out of two
//! interchange forms: a flat SQL statement dump, or a structured JSON
//! document of tables, indexes, inserts, updates and deletes.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use sqlporter::prelude::*;
//!
//! let mut backend = SqlxBackend::connect("sqlite://app.db").await?;
//!
//! // Seed the database from a JSON document
//! let count = sqlporter::import_json(&mut backend, &json_text, Options::default()).await?;
//!
//! // Extract it back out as a SQL dump
//! let dump = sqlporter::export_sql(&mut backend, Options::default()).await?;
//! println!("{} statements", dump.count);
//! ```
//!
//! ## How it works
//!
//! | Component | Module      | Job                                         |
//! |-----------|-------------|---------------------------------------------|
//! | Tokenizer | `tokenizer` | Split raw SQL text into statements          |
//! | Escaper   | `escape`    | Value sanitizing, identifier delimiting     |
//! | Compiler  | `compiler`  | Document → batched, ordered statements      |
//! | Pipeline  | `engine`    | Drive statements sequentially, stop on fail |
//! | Walker    | `export`    | Catalog + rows → dump or document           |
//!
//! Index-creation statements compile into a **deferred** batch executed
//! after everything else, so bulk inserts are not slowed by index
//! maintenance.

pub mod compiler;
pub mod document;
pub mod engine;
pub mod error;
pub mod escape;
pub mod export;
pub mod porter;
pub mod tokenizer;

pub mod prelude {
    pub use crate::compiler::{CompiledBatch, Statement, compile};
    pub use crate::document::{Data, Document, Row, Scalar, Structure, Update};
    pub use crate::engine::{BackendRow, ExecutionBackend, Pipeline, RunState, SqlxBackend};
    pub use crate::error::{BackendError, PorterError, PorterResult};
    pub use crate::export::{JsonExport, SqlExport};
    pub use crate::porter::{Options, ProgressFn};
    pub use crate::tokenizer::tokenize;
}

pub use porter::{
    Options, export_json, export_sql, import_document, import_json, import_sql, wipe,
};
