//! Document → statement compiler.
//!
//! Turns a [`Document`] into two ordered statement sequences: the **main**
//! batch (table re-creation, non-index schema SQL, inserts, updates,
//! deletes) and the **deferred** batch (index creation, executed after the
//! main batch so bulk loads are not slowed by index maintenance).
//!
//! Inserts are batched: up to `batch_insert_size` rows become one statement
//! using the multi-row emulation `SELECT ... AS col` / `UNION SELECT ...`
//! form, so a table with N rows compiles to ceil(N / batch) statements.

use std::fmt;

use crate::document::{Document, Row};
use crate::escape::{escape_identifier, is_reserved_table, literal};
use crate::porter::Options;
use crate::tokenizer::is_index_statement;

/// One opaque, independently executable unit of SQL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement(pub String);

impl Statement {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Statement {
    fn from(text: String) -> Self {
        Statement(text)
    }
}

/// The compiler's output: ordered main and deferred statement sequences.
/// The deferred batch runs only after the whole main batch succeeded.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CompiledBatch {
    pub main: Vec<Statement>,
    pub deferred: Vec<Statement>,
}

impl CompiledBatch {
    pub fn total(&self) -> usize {
        self.main.len() + self.deferred.len()
    }

    pub fn is_empty(&self) -> bool {
        self.main.is_empty() && self.deferred.is_empty()
    }
}

/// Compile a document into executable statements.
///
/// Reserved tables and tables outside `opts.table_filter` are skipped in
/// every section. Shape errors cannot occur here: they are caught when the
/// document is deserialized.
pub fn compile(doc: &Document, opts: &Options) -> CompiledBatch {
    let mut batch = CompiledBatch::default();
    let wanted = |table: &str| !is_reserved_table(table) && opts.table_allowed(table);

    if !opts.data_only {
        if let Some(structure) = &doc.structure {
            for (name, clause) in &structure.tables {
                if !wanted(name) {
                    continue;
                }
                let table = escape_identifier(name);
                batch
                    .main
                    .push(Statement(format!("DROP TABLE IF EXISTS {}", table)));
                batch
                    .main
                    .push(Statement(format!("CREATE TABLE {}{}", table, clause)));
            }
            for sql in &structure.other_sql {
                let stmt = Statement(sql.trim().to_string());
                if is_index_statement(sql) {
                    batch.deferred.push(stmt);
                } else {
                    batch.main.push(stmt);
                }
            }
        }
    }

    if !opts.structure_only {
        if let Some(data) = &doc.data {
            for (name, rows) in &data.inserts {
                if !wanted(name) {
                    continue;
                }
                compile_inserts(&mut batch.main, name, rows, opts.effective_batch_size());
            }
            for (name, entries) in &data.updates {
                if !wanted(name) {
                    continue;
                }
                let table = escape_identifier(name);
                for update in entries {
                    let set = assignments(&update.set).join(",");
                    let mut sql = format!("UPDATE {} SET {}", table, set);
                    push_where(&mut sql, &update.where_clause);
                    batch.main.push(Statement(sql));
                }
            }
            for (name, entries) in &data.deletes {
                if !wanted(name) {
                    continue;
                }
                let table = escape_identifier(name);
                for row in entries {
                    let mut sql = format!("DELETE FROM {}", table);
                    push_where(&mut sql, row);
                    batch.main.push(Statement(sql));
                }
            }
        }
    }

    batch
}

/// Compile one table's rows into ceil(rows / batch_size) INSERT statements.
///
/// The first row of each batch fixes the column list; later rows are
/// projected onto it, with missing fields rendered as NULL.
fn compile_inserts(out: &mut Vec<Statement>, table: &str, rows: &[Row], batch_size: usize) {
    let target = escape_identifier(table);
    for chunk in rows.chunks(batch_size) {
        let Some(first) = chunk.first() else { continue };
        let cols: Vec<&String> = first.keys().collect();
        if cols.is_empty() {
            continue;
        }

        let col_list = cols
            .iter()
            .map(|c| escape_identifier(c))
            .collect::<Vec<_>>()
            .join(",");
        let projection = cols
            .iter()
            .map(|c| format!("{} AS {}", literal(first.get(*c)), escape_identifier(c)))
            .collect::<Vec<_>>()
            .join(",");

        let mut sql = format!(
            "INSERT OR REPLACE INTO {}({}) SELECT {}",
            target, col_list, projection
        );
        for row in &chunk[1..] {
            let values = cols
                .iter()
                .map(|c| literal(row.get(*c)))
                .collect::<Vec<_>>()
                .join(",");
            sql.push_str(" UNION SELECT ");
            sql.push_str(&values);
        }
        out.push(Statement(sql));
    }
}

fn assignments(row: &Row) -> Vec<String> {
    row.iter()
        .map(|(col, val)| format!("{}={}", escape_identifier(col), literal(Some(val))))
        .collect()
}

fn push_where(sql: &mut String, row: &Row) {
    let conditions = assignments(row);
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
}
