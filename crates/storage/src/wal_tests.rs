// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use snooze_core::{ManagedResource, ResourceRef};

fn upsert(name: &str) -> Operation {
    Operation::ResourceUpsert {
        resource: ManagedResource::new("apps/v1", "Deployment", "dev", name),
    }
}

#[test]
fn wal_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.wal");

    {
        let mut wal = Wal::open(&path).unwrap();
        wal.append(&upsert("web")).unwrap();
        wal.append(&Operation::ResourceDelete {
            id: ResourceRef::new("Deployment", "dev", "web"),
        })
        .unwrap();
    }

    let ops = Wal::replay(&path).unwrap();
    assert_eq!(ops.len(), 2);
    assert_eq!(ops[0], upsert("web"));
    assert!(matches!(ops[1], Operation::ResourceDelete { .. }));
}

#[test]
fn wal_sequence_continues() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.wal");

    {
        let mut wal = Wal::open(&path).unwrap();
        assert_eq!(wal.sequence(), 0);
        assert_eq!(wal.append(&upsert("web")).unwrap(), 1);
    }

    {
        let mut wal = Wal::open(&path).unwrap();
        assert_eq!(wal.sequence(), 1);
        assert_eq!(wal.append(&upsert("api")).unwrap(), 2);
    }
}

#[test]
fn wal_replay_nonexistent() {
    let path = Path::new("/nonexistent/path/wal");
    let ops = Wal::replay(path).unwrap();
    assert!(ops.is_empty());
}

#[test]
fn wal_replay_skips_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.wal");
    {
        let mut wal = Wal::open(&path).unwrap();
        wal.append(&upsert("web")).unwrap();
    }
    let mut contents = std::fs::read_to_string(&path).unwrap();
    contents.push_str("\n\n");
    std::fs::write(&path, contents).unwrap();

    assert_eq!(Wal::replay(&path).unwrap().len(), 1);
    assert_eq!(Wal::open(&path).unwrap().sequence(), 1);
}

#[test]
fn wal_replay_reports_corrupt_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.wal");
    {
        let mut wal = Wal::open(&path).unwrap();
        wal.append(&upsert("web")).unwrap();
    }
    let mut contents = std::fs::read_to_string(&path).unwrap();
    contents.push_str("{not json\n");
    std::fs::write(&path, contents).unwrap();

    let err = Wal::replay(&path).unwrap_err();
    assert!(matches!(err, WalError::Corrupt { line: 2, .. }), "{err}");
}

#[test]
fn torn_tail_is_dropped_and_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.wal");
    {
        let mut wal = Wal::open(&path).unwrap();
        wal.append(&upsert("web")).unwrap();
    }
    let mut contents = std::fs::read_to_string(&path).unwrap();
    contents.push_str(r#"{"seq":2,"op":{"#);
    std::fs::write(&path, contents).unwrap();

    assert_eq!(Wal::replay(&path).unwrap(), vec![upsert("web")]);

    let mut wal = Wal::open(&path).unwrap();
    assert_eq!(wal.sequence(), 1);
    assert_eq!(wal.append(&upsert("api")).unwrap(), 2);
    drop(wal);

    assert_eq!(Wal::replay(&path).unwrap(), vec![upsert("web"), upsert("api")]);
}

#[test]
fn record_without_newline_is_kept() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.wal");
    {
        let mut wal = Wal::open(&path).unwrap();
        wal.append(&upsert("web")).unwrap();
    }
    let contents = std::fs::read_to_string(&path).unwrap();
    std::fs::write(&path, contents.trim_end()).unwrap();

    let mut wal = Wal::open(&path).unwrap();
    assert_eq!(wal.append(&upsert("api")).unwrap(), 2);
    drop(wal);

    assert_eq!(Wal::replay(&path).unwrap(), vec![upsert("web"), upsert("api")]);
}
