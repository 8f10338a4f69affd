use std::fs;

use rusqlite::Connection;
use tempfile::tempdir;

use bmc_bench_core::db::{sha256_file, DbError, InvocationRecord, RunLedger};

fn record(benchmark: &str, backend: &str, strategy: Option<&str>) -> InvocationRecord {
    InvocationRecord {
        benchmark: benchmark.into(),
        backend: backend.into(),
        strategy: strategy.map(String::from),
        log_path: format!("output/{backend}/{benchmark}.log"),
        source_hash: None,
        exit_code: Some(0),
        timed_out: false,
        started_at: "2024-01-01T00:00:00+00:00".into(),
        finished_at: "2024-01-01T00:00:01+00:00".into(),
    }
}

#[test]
fn ledger_round_trips_and_filters_by_backend() {
    let dir = tempdir().expect("tempdir");
    let ledger = RunLedger::open(&dir.path().join("runs.db")).expect("open ledger");

    let mut timed_out = record("slow", "esbmc", None);
    timed_out.exit_code = None;
    timed_out.timed_out = true;

    ledger.record(&record("a", "rbmc", Some("forward"))).unwrap();
    ledger.record(&record("a", "rbmc", Some("once"))).unwrap();
    ledger.record(&timed_out).unwrap();

    let all = ledger.list(None).expect("list");
    assert_eq!(all.len(), 3);
    assert_eq!(all[2], timed_out);

    let rbmc = ledger.list(Some("rbmc")).expect("filter");
    assert_eq!(rbmc.len(), 2);
    assert_eq!(rbmc[0].strategy.as_deref(), Some("forward"));
    assert_eq!(rbmc[1].strategy.as_deref(), Some("once"));
    assert!(ledger.list(Some("kani")).unwrap().is_empty());
}

#[test]
fn reopening_keeps_existing_rows() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("runs.db");
    {
        let ledger = RunLedger::open(&path).expect("open ledger");
        ledger.record(&record("a", "kani", None)).unwrap();
    }
    let ledger = RunLedger::open(&path).expect("reopen ledger");
    assert_eq!(ledger.list(None).unwrap().len(), 1);

    let conn = Connection::open(&path).unwrap();
    let version: i32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0)).unwrap();
    assert_eq!(version, 1);
}

#[test]
fn newer_schema_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("runs.db");
    Connection::open(&path).unwrap().execute_batch("PRAGMA user_version = 99;").unwrap();

    match RunLedger::open(&path) {
        Err(DbError::UnsupportedSchemaVersion { found, .. }) => assert_eq!(found, 99),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected schema version error"),
    }
}

#[test]
fn sha256_file_hashes_contents() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("abc.c");
    fs::write(&path, "abc").unwrap();
    assert_eq!(
        sha256_file(&path).unwrap(),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert!(sha256_file(&dir.path().join("missing.c")).is_err());
}
