use dupsweep::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dupsweep::scanner::{FileRecord, HashError, SearchTarget, Walker, WalkerConfig};
use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;
use tempfile::tempdir;

fn finder() -> DuplicateFinder {
    DuplicateFinder::new(FinderConfig::default()).unwrap()
}

#[test]
fn test_missing_files_are_warnings_not_failures() {
    let file1 = FileRecord::new(PathBuf::from("nonexistent_1.txt"), 100, SystemTime::now());
    let file2 = FileRecord::new(PathBuf::from("nonexistent_2.txt"), 100, SystemTime::now());

    let (groups, summary) = finder()
        .find_duplicates_from_records(vec![file1, file2])
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.hash_errors.len(), 2);
    for err in &summary.hash_errors {
        assert!(
            matches!(err, HashError::NotFound(_)),
            "Expected NotFound HashError, got: {:?}",
            err
        );
    }
}

#[test]
fn test_file_vanishing_between_scan_and_hash() {
    let dir = tempdir().unwrap();
    for name in ["a.txt", "b.txt", "c.txt", "d.txt"] {
        fs::write(dir.path().join(name), b"same").unwrap();
    }
    fs::write(dir.path().join("e.txt"), b"diff").unwrap();
    fs::write(dir.path().join("f.txt"), b"diff").unwrap();

    let target = SearchTarget::new(dir.path());
    let records: Vec<FileRecord> = Walker::new(&target, WalkerConfig::default())
        .walk()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(records.len(), 6);

    fs::remove_file(dir.path().join("b.txt")).unwrap();

    let (groups, summary) = finder().find_duplicates_from_records(records).unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(
        groups[0].paths(),
        vec![
            dir.path().join("a.txt"),
            dir.path().join("c.txt"),
            dir.path().join("d.txt")
        ]
    );
    assert_eq!(
        groups[1].paths(),
        vec![dir.path().join("e.txt"), dir.path().join("f.txt")]
    );

    assert_eq!(summary.hash_errors.len(), 1);
    assert_eq!(summary.hash_errors[0].path(), dir.path().join("b.txt"));
    assert!(summary.has_warnings());
}

#[test]
fn test_missing_root_is_fatal_before_scanning() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");

    let result = finder().find_duplicates(&[
        SearchTarget::new(dir.path()),
        SearchTarget::new(&missing),
    ]);

    match result {
        Err(FinderError::PathNotFound(path)) => assert_eq!(path, missing),
        other => panic!("Expected PathNotFound, got: {:?}", other.map(|(g, _)| g.len())),
    }
}

#[cfg(unix)]
#[test]
fn test_broken_symlink_is_scan_warning() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"dup").unwrap();
    fs::write(dir.path().join("b.txt"), b"dup").unwrap();
    std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("dangling")).unwrap();

    let (groups, summary) = finder()
        .find_duplicates(&[SearchTarget::new(dir.path())])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(summary.scan_errors.len(), 1);
    assert_eq!(summary.scan_errors[0].path(), dir.path().join("dangling"));
}
