//! Integration tests for dataset ingestion
//!
//! These tests load CSV files from disk into the SQLite engine and check the
//! resulting tables.

use csvql::engine::{Engine, SqliteEngine, Value};
use csvql::ingest::{ingest, ingest_all, load_all, DatasetSource, IngestOutcome};
use tempfile::tempdir;

fn write_csv(dir: &std::path::Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Test that column types survive the trip from CSV text to the engine
#[tokio::test]
async fn test_csv_to_typed_table() {
    let dir = tempdir().unwrap();
    let path = write_csv(
        dir.path(),
        "products.csv",
        "sku,price,stock,label\n001,9.99,4,Widget\n002,12,0,Gadget\n",
    );

    let datasets = load_all(vec![DatasetSource::from_path(&path).unwrap()])
        .await
        .unwrap();
    let mut engine = SqliteEngine::open_in_memory().unwrap();
    let outcome = ingest(&mut engine, &datasets[0]).unwrap();
    assert_eq!(outcome, IngestOutcome::Created { rows: 2 });

    let rows = engine
        .query("SELECT * FROM products ORDER BY sku")
        .unwrap();
    assert_eq!(rows.len(), 2);
    // Leading zeros are whole numbers, so sku is INTEGER
    assert_eq!(rows[0].get("sku"), Some(&Value::Integer(1)));
    assert_eq!(rows[0].get("price"), Some(&Value::Real(9.99)));
    // DECIMAL has NUMERIC affinity, which stores whole reals as integers
    assert_eq!(rows[1].get("price"), Some(&Value::Integer(12)));
    assert_eq!(rows[1].get("stock"), Some(&Value::Integer(0)));
    assert_eq!(rows[1].get("label"), Some(&Value::Text("Gadget".into())));
}

/// Test that ingesting the same dataset twice leaves one copy of each row
#[tokio::test]
async fn test_repeated_ingestion_is_idempotent() {
    let dir = tempdir().unwrap();
    let path = write_csv(dir.path(), "users.csv", "id,name\n1,Al\n2,Bo\n");
    let datasets = load_all(vec![DatasetSource::from_path(&path).unwrap()])
        .await
        .unwrap();

    let mut engine = SqliteEngine::open_in_memory().unwrap();
    ingest_all(&mut engine, &datasets).unwrap();
    let second = ingest_all(&mut engine, &datasets).unwrap();
    assert_eq!(second, vec![IngestOutcome::AlreadyExists]);

    let rows = engine.query("SELECT COUNT(*) AS n FROM users").unwrap();
    assert_eq!(rows[0].get("n"), Some(&Value::Integer(2)));
}

/// Test that a pre-existing table with the dataset's name is left alone
#[tokio::test]
async fn test_existing_table_schema_is_not_checked() {
    let dir = tempdir().unwrap();
    let path = write_csv(dir.path(), "users.csv", "id,name\n1,Al\n");
    let datasets = load_all(vec![DatasetSource::from_path(&path).unwrap()])
        .await
        .unwrap();

    let mut engine = SqliteEngine::open_in_memory().unwrap();
    engine
        .execute_batch("CREATE TABLE users (other TEXT);")
        .unwrap();

    let outcome = ingest(&mut engine, &datasets[0]).unwrap();
    assert_eq!(outcome, IngestOutcome::AlreadyExists);

    let rows = engine.query("SELECT COUNT(*) AS n FROM users").unwrap();
    assert_eq!(rows[0].get("n"), Some(&Value::Integer(0)));
}

/// Test that a header-only file creates no table
#[tokio::test]
async fn test_header_only_file_creates_nothing() {
    let dir = tempdir().unwrap();
    let path = write_csv(dir.path(), "empty.csv", "a,b\n");
    let datasets = load_all(vec![DatasetSource::from_path(&path).unwrap()])
        .await
        .unwrap();

    let mut engine = SqliteEngine::open_in_memory().unwrap();
    assert_eq!(
        ingest(&mut engine, &datasets[0]).unwrap(),
        IngestOutcome::Empty
    );
    assert!(!engine.table_exists("empty").unwrap());
}

/// Test that headers with spaces and punctuation become usable columns
#[tokio::test]
async fn test_sanitized_headers_are_queryable() {
    let dir = tempdir().unwrap();
    let path = write_csv(
        dir.path(),
        "time zones.csv",
        "zone name,utc-offset\nCET,1\nPST,-8\n",
    );
    let datasets = load_all(vec![DatasetSource::from_path(&path).unwrap()])
        .await
        .unwrap();
    assert_eq!(datasets[0].name, "time_zones");

    let mut engine = SqliteEngine::open_in_memory().unwrap();
    ingest(&mut engine, &datasets[0]).unwrap();

    let rows = engine
        .query("SELECT zone_name FROM time_zones WHERE utc_offset < 0")
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("zone_name"), Some(&Value::Text("PST".into())));
}

/// Test that a mixed column falls back to text for every row
#[tokio::test]
async fn test_mixed_column_is_text() {
    let dir = tempdir().unwrap();
    let path = write_csv(dir.path(), "codes.csv", "code\n10\nA7\n");
    let datasets = load_all(vec![DatasetSource::from_path(&path).unwrap()])
        .await
        .unwrap();

    let mut engine = SqliteEngine::open_in_memory().unwrap();
    ingest(&mut engine, &datasets[0]).unwrap();

    let rows = engine.query("SELECT code FROM codes").unwrap();
    assert_eq!(rows[0].get("code"), Some(&Value::Text("10".into())));
}
