//! Export walker.
//!
//! Enumerates the backend's schema catalog and table contents, excluding
//! reserved tables and anything outside the caller's table filter, and
//! produces either a flat SQL dump or a structured [`Document`]. Also
//! builds the statement list for a wipe.

use crate::compiler::{Statement, compile};
use crate::document::{Data, Document, Row, Scalar, Structure};
use crate::engine::{BackendRow, ExecutionBackend};
use crate::error::{BackendError, PorterError, PorterResult};
use crate::escape::{escape_identifier, is_reserved_table, literal};
use crate::porter::Options;
use crate::tokenizer::{normalize_whitespace, table_definition};

/// Result of a SQL-mode export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlExport {
    pub sql: String,
    /// Number of statements in the dump.
    pub count: usize,
}

/// Result of a JSON-mode export.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonExport {
    pub document: Document,
    /// Number of statements the document would compile to.
    pub count: usize,
}

const CATALOG_SQL: &str = "SELECT type, name, tbl_name, sql FROM sqlite_master";

struct CatalogEntry {
    kind: String,
    name: String,
    tbl_name: String,
    sql: String,
}

impl CatalogEntry {
    fn is_table(&self) -> bool {
        self.kind == "table"
    }

    /// The table this object belongs to (itself, for tables).
    fn owner(&self) -> &str {
        if self.is_table() { &self.name } else { &self.tbl_name }
    }
}

pub(crate) async fn walk_sql<B: ExecutionBackend>(
    backend: &mut B,
    opts: &Options,
) -> PorterResult<SqlExport> {
    let catalog = read_catalog(backend).await?;
    let mut statements: Vec<Statement> = Vec::new();

    let tables: Vec<&CatalogEntry> = qualifying_tables(&catalog, opts);

    if !opts.data_only {
        for entry in &tables {
            statements.push(Statement(format!(
                "DROP TABLE IF EXISTS {}",
                escape_identifier(&entry.name)
            )));
            statements.push(Statement(normalize_whitespace(&entry.sql)));
        }
        for entry in other_entries(&catalog, opts) {
            statements.push(Statement(normalize_whitespace(&entry.sql)));
        }
    }

    if !opts.structure_only {
        for entry in &tables {
            let target = escape_identifier(&entry.name);
            let select = format!("SELECT * FROM {}", target);
            let rows = backend
                .query(&select)
                .await
                .map_err(|e| query_error(&select, e))?;
            for row in &rows {
                let cols = row
                    .keys()
                    .map(|c| escape_identifier(c))
                    .collect::<Vec<_>>()
                    .join(",");
                let values = row
                    .values()
                    .map(|v| literal(Some(&scalar_of(v))))
                    .collect::<Vec<_>>()
                    .join(",");
                statements.push(Statement(format!(
                    "INSERT OR REPLACE INTO {}({}) VALUES({})",
                    target, cols, values
                )));
            }
        }
    }

    let count = statements.len();
    let mut sql = format!(
        "-- sqlporter dump\n-- exported {}\n",
        chrono::Utc::now().to_rfc3339()
    );
    for stmt in &statements {
        sql.push_str(stmt.as_str());
        sql.push_str(";\n");
    }
    Ok(SqlExport { sql, count })
}

pub(crate) async fn walk_json<B: ExecutionBackend>(
    backend: &mut B,
    opts: &Options,
) -> PorterResult<JsonExport> {
    let catalog = read_catalog(backend).await?;
    let tables: Vec<&CatalogEntry> = qualifying_tables(&catalog, opts);

    let mut structure = Structure::default();
    if !opts.data_only {
        for entry in &tables {
            // The stored CREATE TABLE text, minus its prefix, is the
            // column clause the document carries.
            if let Some((name, clause)) = table_definition(&normalize_whitespace(&entry.sql)) {
                structure.tables.insert(name, clause);
            }
        }
        for entry in other_entries(&catalog, opts) {
            structure.other_sql.push(normalize_whitespace(&entry.sql));
        }
    }

    let mut data = Data::default();
    if !opts.structure_only {
        for entry in &tables {
            let select = format!("SELECT * FROM {}", escape_identifier(&entry.name));
            let rows = backend
                .query(&select)
                .await
                .map_err(|e| query_error(&select, e))?;
            data.inserts
                .insert(entry.name.clone(), rows.iter().map(recover_row).collect());
        }
    }

    let document = Document {
        structure: (!structure.tables.is_empty() || !structure.other_sql.is_empty())
            .then_some(structure),
        data: (!data.inserts.is_empty()).then_some(data),
    };
    let count = compile(&document, opts).total();
    Ok(JsonExport { document, count })
}

/// Build DROP statements for every non-reserved catalog object passing the
/// filter: tables, indexes, triggers and views.
pub(crate) async fn wipe_statements<B: ExecutionBackend>(
    backend: &mut B,
    opts: &Options,
) -> PorterResult<Vec<Statement>> {
    let catalog = read_catalog(backend).await?;
    let mut statements = Vec::new();
    for entry in &catalog {
        let keyword = match entry.kind.as_str() {
            "table" => "TABLE",
            "index" => "INDEX",
            "trigger" => "TRIGGER",
            "view" => "VIEW",
            _ => continue,
        };
        if is_reserved_table(&entry.name)
            || is_reserved_table(entry.owner())
            || !opts.table_allowed(entry.owner())
        {
            continue;
        }
        statements.push(Statement(format!(
            "DROP {} IF EXISTS {}",
            keyword,
            escape_identifier(&entry.name)
        )));
    }
    Ok(statements)
}

async fn read_catalog<B: ExecutionBackend>(backend: &mut B) -> PorterResult<Vec<CatalogEntry>> {
    let rows = backend
        .query(CATALOG_SQL)
        .await
        .map_err(|e| query_error(CATALOG_SQL, e))?;
    Ok(rows
        .iter()
        .map(|row| CatalogEntry {
            kind: text(row, "type"),
            name: text(row, "name"),
            tbl_name: text(row, "tbl_name"),
            sql: text(row, "sql"),
        })
        .collect())
}

fn qualifying_tables<'a>(catalog: &'a [CatalogEntry], opts: &Options) -> Vec<&'a CatalogEntry> {
    catalog
        .iter()
        .filter(|e| e.is_table() && !is_reserved_table(&e.name) && opts.table_allowed(&e.name))
        .collect()
}

fn other_entries<'a>(
    catalog: &'a [CatalogEntry],
    opts: &'a Options,
) -> impl Iterator<Item = &'a CatalogEntry> {
    catalog.iter().filter(|e| {
        !e.is_table()
            && !e.sql.is_empty()
            && !is_reserved_table(e.owner())
            && opts.table_allowed(e.owner())
    })
}

fn text(row: &BackendRow, key: &str) -> String {
    match row.get(key) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn scalar_of(value: &serde_json::Value) -> Scalar {
    match value {
        serde_json::Value::Null => Scalar::Null,
        serde_json::Value::Bool(b) => Scalar::Bool(*b),
        serde_json::Value::Number(n) => Scalar::Number(n.clone()),
        serde_json::Value::String(s) => Scalar::String(s.clone()),
        other => Scalar::String(other.to_string()),
    }
}

/// Recover the caller's intended types from stored text: `"true"` and
/// `"false"` become booleans, `"null"` becomes JSON null, and a literal
/// `"undefined"` means the field is omitted from the row object.
fn recover_row(row: &BackendRow) -> Row {
    let mut out = Row::new();
    for (col, value) in row {
        if let Some(scalar) = typed_recovery(value) {
            out.insert(col.clone(), scalar);
        }
    }
    out
}

fn typed_recovery(value: &serde_json::Value) -> Option<Scalar> {
    match value {
        serde_json::Value::String(s) => match s.as_str() {
            "true" => Some(Scalar::Bool(true)),
            "false" => Some(Scalar::Bool(false)),
            "null" => Some(Scalar::Null),
            "undefined" => None,
            _ => Some(Scalar::String(s.clone())),
        },
        other => Some(scalar_of(other)),
    }
}

fn query_error(statement: &str, e: BackendError) -> PorterError {
    PorterError::Execution {
        statement: statement.to_string(),
        detail: e.0,
        executed: 0,
    }
}
