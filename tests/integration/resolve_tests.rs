use dupsweep::actions::{
    resolve, DeleteError, DeleteProgressCallback, KeepPolicy, NoProgress, ResolveConfig,
    ResolveMode, ResolveReport,
};
use dupsweep::duplicates::{DuplicateFinder, FinderConfig};
use dupsweep::scanner::SearchTarget;
use filetime::{set_file_mtime, FileTime};
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tempfile::tempdir;

fn scan(dir: &Path) -> Vec<dupsweep::duplicates::DuplicateGroup> {
    DuplicateFinder::new(FinderConfig::default())
        .unwrap()
        .find_duplicates(&[SearchTarget::new(dir)])
        .unwrap()
        .0
}

#[test]
fn test_keep_first_removes_all_but_first() {
    let dir = tempdir().unwrap();
    for name in ["a.bin", "b.bin", "c.bin"] {
        fs::write(dir.path().join(name), [7u8; 100]).unwrap();
    }
    let groups = scan(dir.path());
    assert_eq!(groups.len(), 1);

    let config = ResolveConfig::default()
        .with_mode(ResolveMode::Permanent)
        .with_keep(KeepPolicy::First);
    let report = resolve::<NoProgress>(&groups, &config, None);

    assert_eq!(report.removed.len(), 2);
    assert_eq!(report.bytes_reclaimed, 200);
    assert_eq!(report.affected_count(), 2);
    assert!(report.all_succeeded());
    assert!(dir.path().join("a.bin").exists());
    assert!(!dir.path().join("b.bin").exists());
    assert!(!dir.path().join("c.bin").exists());
}

#[test]
fn test_dry_run_is_default_and_reports_candidates() {
    let dir = tempdir().unwrap();
    for name in ["a.bin", "b.bin", "c.bin"] {
        fs::write(dir.path().join(name), [1u8; 50]).unwrap();
    }
    let groups = scan(dir.path());

    let report = resolve::<NoProgress>(&groups, &ResolveConfig::default(), None);

    assert_eq!(report.mode, ResolveMode::DryRun);
    assert_eq!(report.affected_count(), 2);
    assert_eq!(report.affected_bytes(), 100);
    assert_eq!(report.bytes_reclaimed, 0);
    for name in ["a.bin", "b.bin", "c.bin"] {
        assert!(dir.path().join(name).exists());
    }

    let again = scan(dir.path());
    assert_eq!(again, groups);
}

#[test]
fn test_keep_newest_uses_mtime() {
    let dir = tempdir().unwrap();
    for (name, secs) in [("a.txt", 1_000), ("b.txt", 3_000), ("c.txt", 2_000)] {
        let path = dir.path().join(name);
        fs::write(&path, b"same bytes").unwrap();
        set_file_mtime(&path, FileTime::from_unix_time(secs, 0)).unwrap();
    }
    let groups = scan(dir.path());

    let config = ResolveConfig::default().with_keep(KeepPolicy::Newest);
    let report = resolve::<NoProgress>(&groups, &config, None);
    assert_eq!(report.plans[0].keep.path, dir.path().join("b.txt"));

    let config = ResolveConfig::default().with_keep(KeepPolicy::Oldest);
    let report = resolve::<NoProgress>(&groups, &config, None);
    assert_eq!(report.plans[0].keep.path, dir.path().join("a.txt"));
}

#[test]
fn test_failure_in_one_group_does_not_stop_others() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a1.txt"), b"first group").unwrap();
    fs::write(dir.path().join("a2.txt"), b"first group").unwrap();
    fs::write(dir.path().join("b1.txt"), b"second").unwrap();
    fs::write(dir.path().join("b2.txt"), b"second").unwrap();
    let groups = scan(dir.path());
    assert_eq!(groups.len(), 2);

    fs::remove_file(dir.path().join("a2.txt")).unwrap();

    let config = ResolveConfig::default().with_mode(ResolveMode::Permanent);
    let report = resolve::<NoProgress>(&groups, &config, None);

    assert_eq!(report.failures.len(), 1);
    assert!(matches!(report.failures[0].error, DeleteError::NotFound(_)));
    assert_eq!(report.removed.len(), 1);
    assert_eq!(report.bytes_reclaimed, 6);
    assert!(!dir.path().join("b2.txt").exists());
    assert!(report.summary().contains("1 failed"));
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

impl DeleteProgressCallback for Recorder {
    fn on_before_delete(&self, path: &Path, index: usize, total: usize) {
        self.events.lock().unwrap().push(format!(
            "before {} {}/{}",
            path.file_name().unwrap().to_string_lossy(),
            index,
            total
        ));
    }
    fn on_delete_success(&self, _path: &Path, size: u64) {
        self.events.lock().unwrap().push(format!("ok {}", size));
    }
    fn on_delete_failure(&self, _path: &Path, _error: &DeleteError) {
        self.events.lock().unwrap().push("failed".to_string());
    }
    fn on_complete(&self, report: &ResolveReport) {
        self.events
            .lock()
            .unwrap()
            .push(format!("done {}", report.removed.len()));
    }
}

#[test]
fn test_progress_callback_sequence() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"xy").unwrap();
    fs::write(dir.path().join("b.txt"), b"xy").unwrap();
    let groups = scan(dir.path());

    let recorder = Recorder::default();
    let config = ResolveConfig::default().with_mode(ResolveMode::Permanent);
    resolve(&groups, &config, Some(&recorder));

    assert_eq!(
        *recorder.events.lock().unwrap(),
        vec!["before b.txt 0/1", "ok 2", "done 1"]
    );
}

#[cfg(unix)]
#[test]
fn test_kept_symlink_never_loses_its_target() {
    let dir = tempdir().unwrap();
    let real = dir.path().join("b_real.txt");
    let copy = dir.path().join("c_copy.txt");
    let link = dir.path().join("a_link.txt");
    fs::write(&real, b"linked content").unwrap();
    fs::write(&copy, b"linked content").unwrap();
    std::os::unix::fs::symlink(&real, &link).unwrap();

    let groups = scan(dir.path());
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths(), vec![link.clone(), real.clone(), copy.clone()]);

    let config = ResolveConfig::default().with_mode(ResolveMode::Permanent);
    let report = resolve::<NoProgress>(&groups, &config, None);

    assert_eq!(report.plans[0].keep.path, link);
    assert_eq!(report.plans[0].same_as_keep[0].path, real);
    assert_eq!(report.removed.len(), 1);
    assert_eq!(report.removed[0].path, copy);
    assert!(report.all_succeeded());

    assert!(real.exists());
    assert!(!copy.exists());
    assert_eq!(fs::read(&link).unwrap(), b"linked content");
}

#[cfg(unix)]
#[test]
fn test_link_and_target_alone_remove_nothing() {
    let dir = tempdir().unwrap();
    let real = dir.path().join("b_real.txt");
    let link = dir.path().join("a_link.txt");
    fs::write(&real, b"only one copy").unwrap();
    std::os::unix::fs::symlink(&real, &link).unwrap();

    let groups = scan(dir.path());
    let config = ResolveConfig::default().with_mode(ResolveMode::Permanent);
    let report = resolve::<NoProgress>(&groups, &config, None);

    assert!(report.removed.is_empty());
    assert_eq!(report.bytes_reclaimed, 0);
    assert_eq!(fs::read(&link).unwrap(), b"only one copy");
}
