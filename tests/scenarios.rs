//! End-to-end scenarios: documents compiled to exact SQL, full imports
//! driven through a scripted backend, and re-import of exported dumps.

use pretty_assertions::assert_eq;
use sqlporter::prelude::*;

/// Records every statement it is asked to execute; optionally fails on a
/// chosen statement text.
#[derive(Default)]
struct RecordingBackend {
    log: Vec<String>,
    fail_on: Option<String>,
}

impl ExecutionBackend for RecordingBackend {
    async fn execute(&mut self, sql: &str) -> Result<u64, BackendError> {
        if self.fail_on.as_deref() == Some(sql) {
            return Err(BackendError::new("table is locked"));
        }
        self.log.push(sql.to_string());
        Ok(0)
    }

    async fn query(&mut self, _sql: &str) -> Result<Vec<BackendRow>, BackendError> {
        Ok(Vec::new())
    }
}

fn artist_document() -> &'static str {
    r#"{"structure":{"tables":{"Artist":"([Id] PRIMARY KEY,[Title])"}},"data":{"inserts":{"Artist":[{"Id":"1","Title":"Fred"},{"Id":"2","Title":"Bob"}]}}}"#
}

#[test]
fn scenario_a_batch_size_one() {
    let doc = Document::from_json(artist_document()).unwrap();
    let opts = Options {
        batch_insert_size: 1,
        ..Options::default()
    };
    let batch = compile(&doc, &opts);
    assert_eq!(batch.main.len(), 4);
    assert_eq!(batch.deferred.len(), 0);
    assert_eq!(batch.main[0].as_str(), "DROP TABLE IF EXISTS Artist");
    assert_eq!(
        batch.main[1].as_str(),
        "CREATE TABLE Artist([Id] PRIMARY KEY,[Title])"
    );
    assert!(batch.main[2].as_str().starts_with("INSERT OR REPLACE INTO Artist"));
    assert!(batch.main[3].as_str().starts_with("INSERT OR REPLACE INTO Artist"));
}

#[test]
fn scenario_b_one_batched_insert() {
    let doc = Document::from_json(artist_document()).unwrap();
    let opts = Options {
        batch_insert_size: 500,
        ..Options::default()
    };
    let batch = compile(&doc, &opts);
    let inserts: Vec<&str> = batch
        .main
        .iter()
        .map(|s| s.as_str())
        .filter(|s| s.starts_with("INSERT"))
        .collect();
    assert_eq!(inserts.len(), 1);
    assert_eq!(inserts[0].matches(" AS ").count(), 2);
    assert_eq!(inserts[0].matches(" UNION SELECT ").count(), 1);
}

#[test]
fn scenario_c_delete() {
    let doc =
        Document::from_json(r#"{"data":{"deletes":{"Artist":[{"Id":"5"}]}}}"#).unwrap();
    let batch = compile(&doc, &Options::default());
    assert_eq!(batch.main.len(), 1);
    assert_eq!(batch.main[0].as_str(), "DELETE FROM Artist WHERE Id='5'");
}

#[test]
fn scenario_d_update() {
    let doc = Document::from_json(
        r#"{"data":{"updates":{"Artist":[{"set":{"Title":"Susan"},"where":{"Id":"2"}}]}}}"#,
    )
    .unwrap();
    let batch = compile(&doc, &Options::default());
    assert_eq!(batch.main.len(), 1);
    assert_eq!(
        batch.main[0].as_str(),
        "UPDATE Artist SET Title='Susan' WHERE Id='2'"
    );
}

#[tokio::test]
async fn scenario_e_view_runs_before_deferred_index() {
    let doc = Document::from_json(
        r#"{"structure":{"otherSQL":[
            "CREATE INDEX idx ON Artist(Title)",
            "CREATE VIEW v AS SELECT Title FROM Artist"]}}"#,
    )
    .unwrap();
    let mut backend = RecordingBackend::default();
    let count = sqlporter::import_document(&mut backend, &doc, Options::default())
        .await
        .unwrap();
    assert_eq!(count, 2);
    let view_at = backend
        .log
        .iter()
        .position(|s| s.starts_with("CREATE VIEW"))
        .unwrap();
    let index_at = backend
        .log
        .iter()
        .position(|s| s.starts_with("CREATE INDEX"))
        .unwrap();
    assert!(view_at < index_at);
}

#[test]
fn batch_count_law() {
    for (rows, size) in [(1usize, 1usize), (7, 3), (250, 250), (251, 250), (1000, 250)] {
        let rows_json: Vec<String> = (0..rows).map(|i| format!("{{\"Id\":\"{i}\"}}")).collect();
        let doc = Document::from_json(&format!(
            "{{\"data\":{{\"inserts\":{{\"t\":[{}]}}}}}}",
            rows_json.join(",")
        ))
        .unwrap();
        let opts = Options {
            batch_insert_size: size,
            ..Options::default()
        };
        assert_eq!(compile(&doc, &opts).main.len(), rows.div_ceil(size));
    }
}

#[tokio::test]
async fn import_sql_executes_tokenized_statements_in_order() {
    let dump = "-- seed\nDROP TABLE IF EXISTS a;\nCREATE TABLE a(x);\nINSERT INTO a VALUES ('1;2')";
    let mut backend = RecordingBackend::default();
    let count = sqlporter::import_sql(&mut backend, dump, Options::default())
        .await
        .unwrap();
    assert_eq!(count, 3);
    assert_eq!(
        backend.log,
        [
            "BEGIN",
            "DROP TABLE IF EXISTS a",
            "CREATE TABLE a(x)",
            "INSERT INTO a VALUES ('1;2')",
            "COMMIT",
        ]
    );
}

#[tokio::test]
async fn import_stops_at_first_failure_and_reports_counts() {
    let mut backend = RecordingBackend {
        fail_on: Some("CREATE TABLE a(x)".to_string()),
        ..RecordingBackend::default()
    };
    let err = sqlporter::import_sql(
        &mut backend,
        "DROP TABLE IF EXISTS a; CREATE TABLE a(x); INSERT INTO a VALUES ('1')",
        Options::default(),
    )
    .await
    .unwrap_err();
    match err {
        PorterError::Execution {
            statement,
            detail,
            executed,
        } => {
            assert_eq!(statement, "CREATE TABLE a(x)");
            assert_eq!(detail, "table is locked");
            assert_eq!(executed, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!backend.log.iter().any(|s| s.starts_with("INSERT")));
}

#[tokio::test]
async fn import_json_full_round() {
    let mut backend = RecordingBackend::default();
    let count = sqlporter::import_json(&mut backend, artist_document(), Options::default())
        .await
        .unwrap();
    assert_eq!(count, 3); // drop, create, one batched insert
    assert_eq!(
        backend.log[3],
        "INSERT OR REPLACE INTO Artist(Id,Title) SELECT '1' AS Id,'Fred' AS Title UNION SELECT '2','Bob'"
    );
}

#[tokio::test]
async fn import_json_rejects_malformed_document_before_execution() {
    let mut backend = RecordingBackend::default();
    let err = sqlporter::import_json(&mut backend, "{not json", Options::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PorterError::Parse(_)));
    assert!(backend.log.is_empty());
}

/// Typed recovery round trip: a document carrying recovered types compiles
/// to text literals that would recover to the same types again.
#[test]
fn typed_recovery_round_trip_literals() {
    let doc = Document::from_json(
        r#"{"data":{"inserts":{"t":[{"flag":true,"gone":null,"name":"x"}]}}}"#,
    )
    .unwrap();
    let batch = compile(&doc, &Options::default());
    assert_eq!(
        batch.main[0].as_str(),
        "INSERT OR REPLACE INTO t(flag,gone,name) SELECT 'true' AS flag,NULL AS gone,'x' AS name"
    );
}

/// An exported SQL dump must tokenize back into exactly its statements,
/// header comments stripped.
#[test]
fn dump_header_is_stripped_on_reimport() {
    let dump = "-- sqlporter dump\n-- exported 2026-01-01T00:00:00Z\nDROP TABLE IF EXISTS a;\nCREATE TABLE a(x);\n";
    let statements: Vec<String> = tokenize(dump).collect();
    assert_eq!(statements, ["DROP TABLE IF EXISTS a", "CREATE TABLE a(x)"]);
}
