use dupsweep::actions::{resolve, NoProgress, ResolveConfig, ResolveMode};
use dupsweep::duplicates::{DuplicateFinder, FinderConfig};
use dupsweep::scanner::{FileRecord, SearchTarget};
use std::fs::{self, File};
use std::io::Write;
use std::time::SystemTime;
use tempfile::tempdir;

fn finder() -> DuplicateFinder {
    DuplicateFinder::new(FinderConfig::default()).unwrap()
}

#[test]
fn test_scan_two_non_overlapping_directories() {
    let dir1 = tempdir().unwrap();
    let dir2 = tempdir().unwrap();

    File::create(dir1.path().join("a.txt"))
        .unwrap()
        .write_all(b"dup")
        .unwrap();
    File::create(dir2.path().join("b.txt"))
        .unwrap()
        .write_all(b"dup")
        .unwrap();

    let (groups, summary) = finder()
        .find_duplicates(&[SearchTarget::new(dir1.path()), SearchTarget::new(dir2.path())])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files.len(), 2);
    assert_eq!(summary.total_files, 2);
}

#[test]
fn test_target_order_sets_discovery_order() {
    let dir1 = tempdir().unwrap();
    let dir2 = tempdir().unwrap();
    fs::write(dir1.path().join("z.txt"), b"content").unwrap();
    fs::write(dir2.path().join("a.txt"), b"content").unwrap();

    let (groups, _) = finder()
        .find_duplicates(&[SearchTarget::new(dir2.path()), SearchTarget::new(dir1.path())])
        .unwrap();
    assert_eq!(groups[0].files[0].path, dir2.path().join("a.txt"));
    assert_eq!(groups[0].files[0].discovery_index, 0);

    let (groups, _) = finder()
        .find_duplicates(&[SearchTarget::new(dir1.path()), SearchTarget::new(dir2.path())])
        .unwrap();
    assert_eq!(groups[0].files[0].path, dir1.path().join("z.txt"));
}

#[test]
fn test_per_target_recursion() {
    let dir1 = tempdir().unwrap();
    let dir2 = tempdir().unwrap();
    fs::create_dir(dir1.path().join("nested")).unwrap();
    fs::create_dir(dir2.path().join("nested")).unwrap();
    fs::write(dir1.path().join("nested").join("one.txt"), b"payload").unwrap();
    fs::write(dir2.path().join("nested").join("two.txt"), b"payload").unwrap();
    fs::write(dir2.path().join("three.txt"), b"payload").unwrap();

    let targets = [
        SearchTarget::new(dir1.path()).with_recursive(true),
        SearchTarget::new(dir2.path()),
    ];
    let (groups, summary) = finder().find_duplicates(&targets).unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(
        groups[0].paths(),
        vec![
            dir1.path().join("nested").join("one.txt"),
            dir2.path().join("three.txt")
        ]
    );
}

#[test]
fn test_same_directory_twice_counts_once() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"content").unwrap();
    fs::write(dir.path().join("b.txt"), b"content").unwrap();

    let targets = [SearchTarget::new(dir.path()), SearchTarget::new(dir.path())];
    let (groups, summary) = finder().find_duplicates(&targets).unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(summary.overlapping_files, 2);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files.len(), 2);
}

#[test]
fn test_same_directory_under_two_spellings_counts_once() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("only.txt"), b"single copy").unwrap();

    let alias = dir.path().join("sub").join("..");
    let targets = [SearchTarget::new(dir.path()), SearchTarget::new(&alias)];
    let (groups, summary) = finder().find_duplicates(&targets).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 1);
    assert_eq!(summary.overlapping_files, 1);

    let config = ResolveConfig::default().with_mode(ResolveMode::Permanent);
    let report = resolve::<NoProgress>(&groups, &config, None);
    assert!(report.removed.is_empty());
    assert!(dir.path().join("only.txt").exists());
}

#[test]
fn test_resolver_keeps_file_listed_under_two_spellings() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    let real = dir.path().join("only.txt");
    fs::write(&real, b"single copy").unwrap();
    let alias = dir.path().join("sub").join("..").join("only.txt");

    let records = vec![
        FileRecord::new(real.clone(), 11, SystemTime::now()),
        FileRecord::new(alias, 11, SystemTime::now()),
    ];
    let (groups, _) = finder().find_duplicates_from_records(records).unwrap();
    assert_eq!(groups.len(), 1);

    let config = ResolveConfig::default().with_mode(ResolveMode::Permanent);
    let report = resolve::<NoProgress>(&groups, &config, None);

    assert!(report.removed.is_empty());
    assert!(report.all_succeeded());
    assert_eq!(report.plans[0].same_as_keep.len(), 1);
    assert!(real.exists());
}
