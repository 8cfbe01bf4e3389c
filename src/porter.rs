//! The public operation surface: import, export and wipe.

use crate::compiler::{CompiledBatch, Statement, compile};
use crate::document::Document;
use crate::engine::{ExecutionBackend, Pipeline};
use crate::error::{PorterError, PorterResult};
use crate::export;
pub use crate::export::{JsonExport, SqlExport};
use crate::tokenizer::tokenize;

/// Progress notification: (statements executed so far, total statements).
pub type ProgressFn = Box<dyn FnMut(usize, usize) + Send>;

/// Options recognized by every operation. All fields are optional in the
/// sense that `Options::default()` is always valid.
pub struct Options {
    /// Export data without structure.
    pub data_only: bool,
    /// Export/compile structure without rows.
    pub structure_only: bool,
    /// Restrict operations to the named tables.
    pub table_filter: Option<Vec<String>>,
    /// Rows per compiled INSERT statement; values below 1 count as 1
    /// (batching disabled).
    pub batch_insert_size: usize,
    /// Fires after each successfully executed statement.
    pub progress: Option<ProgressFn>,
}

impl Options {
    pub const DEFAULT_BATCH_INSERT_SIZE: usize = 250;

    pub fn effective_batch_size(&self) -> usize {
        self.batch_insert_size.max(1)
    }

    pub fn table_allowed(&self, name: &str) -> bool {
        match &self.table_filter {
            Some(filter) => filter.iter().any(|t| t == name),
            None => true,
        }
    }

    fn validate(&self) -> PorterResult<()> {
        if self.structure_only && self.data_only {
            return Err(PorterError::validation(
                "structure_only and data_only are mutually exclusive",
            ));
        }
        Ok(())
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            data_only: false,
            structure_only: false,
            table_filter: None,
            batch_insert_size: Self::DEFAULT_BATCH_INSERT_SIZE,
            progress: None,
        }
    }
}

/// Execute the statements of a raw SQL dump, in order, stopping at the
/// first failure. Returns the number of executed statements.
pub async fn import_sql<B: ExecutionBackend>(
    backend: &mut B,
    sql_text: &str,
    mut opts: Options,
) -> PorterResult<usize> {
    opts.validate()?;
    let batch = CompiledBatch {
        main: tokenize(sql_text).map(Statement).collect(),
        deferred: Vec::new(),
    };
    Pipeline::new(backend).run(&batch, &mut opts.progress).await
}

/// Parse a JSON document and apply it to the database.
pub async fn import_json<B: ExecutionBackend>(
    backend: &mut B,
    json_text: &str,
    opts: Options,
) -> PorterResult<usize> {
    opts.validate()?;
    let doc = Document::from_json(json_text)?;
    import_document(backend, &doc, opts).await
}

/// Apply an already parsed [`Document`]: compile it, run the main batch,
/// then the deferred index batch.
pub async fn import_document<B: ExecutionBackend>(
    backend: &mut B,
    doc: &Document,
    mut opts: Options,
) -> PorterResult<usize> {
    opts.validate()?;
    let batch = compile(doc, &opts);
    Pipeline::new(backend).run(&batch, &mut opts.progress).await
}

/// Export the database as a flat SQL dump.
pub async fn export_sql<B: ExecutionBackend>(
    backend: &mut B,
    opts: Options,
) -> PorterResult<SqlExport> {
    opts.validate()?;
    export::walk_sql(backend, &opts).await
}

/// Export the database as a structured JSON document.
pub async fn export_json<B: ExecutionBackend>(
    backend: &mut B,
    opts: Options,
) -> PorterResult<JsonExport> {
    opts.validate()?;
    export::walk_json(backend, &opts).await
}

/// Drop every non-reserved table, index, trigger and view. Returns the
/// number of executed statements.
pub async fn wipe<B: ExecutionBackend>(backend: &mut B, mut opts: Options) -> PorterResult<usize> {
    opts.validate()?;
    let batch = CompiledBatch {
        main: export::wipe_statements(backend, &opts).await?,
        deferred: Vec::new(),
    };
    Pipeline::new(backend).run(&batch, &mut opts.progress).await
}
