use dupsweep::duplicates::{DuplicateFinder, FinderConfig};
use dupsweep::scanner::{HashAlgorithm, SearchTarget, Walker, WalkerConfig};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

fn write(path: &Path, content: &[u8]) {
    File::create(path).unwrap().write_all(content).unwrap();
}

fn finder() -> DuplicateFinder {
    DuplicateFinder::new(FinderConfig::default()).unwrap()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();

    let (groups, summary) = finder()
        .find_duplicates(&[SearchTarget::new(dir.path())])
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_only_same_content_grouped() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"AAAAAAAAAA");
    write(&dir.path().join("b.txt"), b"AAAAAAAAAA");
    write(&dir.path().join("c.txt"), b"BBBBBBBBBB");
    write(&dir.path().join("d.txt"), b"CCCCCCCCCCC");

    let (groups, summary) = finder()
        .find_duplicates(&[SearchTarget::new(dir.path())])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size, 10);
    assert_eq!(
        groups[0].paths(),
        vec![dir.path().join("a.txt"), dir.path().join("b.txt")]
    );

    let grouped: Vec<_> = groups.iter().flat_map(|g| g.paths()).collect();
    assert!(!grouped.contains(&dir.path().join("c.txt")));
    assert!(!grouped.contains(&dir.path().join("d.txt")));

    assert_eq!(summary.total_files, 4);
    assert_eq!(summary.eliminated_by_size, 1);
    assert_eq!(summary.hashed_files, 3);
    assert_eq!(summary.reclaimable_space, 10);
}

#[test]
fn test_non_recursive_vs_recursive_counts() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("top1.txt"), b"1");
    write(&dir.path().join("top2.txt"), b"22");
    write(&dir.path().join("top3.txt"), b"333");
    for sub in ["m1", "m2"] {
        let sub_dir = dir.path().join(sub);
        fs::create_dir_all(sub_dir.join("deeper")).unwrap();
        write(&sub_dir.join("x.txt"), b"x");
        write(&sub_dir.join("deeper").join("y.txt"), b"y");
    }

    let flat = SearchTarget::new(dir.path());
    let flat_count = Walker::new(&flat, WalkerConfig::default())
        .walk()
        .filter(Result::is_ok)
        .count();
    assert_eq!(flat_count, 3);

    let deep = SearchTarget::new(dir.path()).with_recursive(true);
    let deep_count = Walker::new(&deep, WalkerConfig::default())
        .walk()
        .filter(Result::is_ok)
        .count();
    assert_eq!(deep_count, 7);
}

#[test]
fn test_recursive_flag_controls_grouping() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("subdir");
    fs::create_dir(&sub).unwrap();
    write(&dir.path().join("a.txt"), b"dup");
    write(&sub.join("b.txt"), b"dup");

    let (groups, _) = finder()
        .find_duplicates(&[SearchTarget::new(dir.path())])
        .unwrap();
    assert!(groups.is_empty());

    let (groups, summary) = finder()
        .find_duplicates(&[SearchTarget::new(dir.path()).with_recursive(true)])
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(summary.total_files, 2);
}

#[test]
fn test_repeated_runs_are_identical() {
    let dir = tempdir().unwrap();
    for (name, content) in [
        ("q.bin", b"one".as_slice()),
        ("r.bin", b"two"),
        ("s.bin", b"one"),
        ("t.bin", b"two"),
        ("u.bin", b""),
        ("v.bin", b""),
    ] {
        write(&dir.path().join(name), content);
    }

    let target = [SearchTarget::new(dir.path())];
    let (first, _) = finder().find_duplicates(&target).unwrap();
    let (second, _) = finder().find_duplicates(&target).unwrap();

    assert_eq!(first.len(), 3);
    assert_eq!(
        first.iter().map(|g| g.paths()).collect::<Vec<_>>(),
        second.iter().map(|g| g.paths()).collect::<Vec<_>>()
    );
    assert_eq!(
        first.iter().map(|g| g.signature.clone()).collect::<Vec<_>>(),
        second.iter().map(|g| g.signature.clone()).collect::<Vec<_>>()
    );
}

#[test]
fn test_signature_follows_algorithm_order() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"abc");
    write(&dir.path().join("b.txt"), b"abc");

    let config = FinderConfig::default()
        .with_algorithms(vec![HashAlgorithm::Sha256, HashAlgorithm::Md5])
        .with_block_size(2);
    let (groups, _) = DuplicateFinder::new(config)
        .unwrap()
        .find_duplicates(&[SearchTarget::new(dir.path())])
        .unwrap();

    assert_eq!(
        groups[0].signature,
        "sha256#ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad\
         _md5#900150983cd24fb0d6963f7d28e17f72"
    );
}

#[test]
fn test_size_filters_applied() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("small1.txt"), b"s");
    write(&dir.path().join("small2.txt"), b"s");
    write(&dir.path().join("big1.txt"), b"bigger content");
    write(&dir.path().join("big2.txt"), b"bigger content");

    let config = FinderConfig::default().with_walker_config(WalkerConfig::new(false, Some(2), None));
    let (groups, summary) = DuplicateFinder::new(config)
        .unwrap()
        .find_duplicates(&[SearchTarget::new(dir.path())])
        .unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size, 14);
}
