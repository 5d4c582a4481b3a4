use clap::Parser;
use dupsweep::cli::Cli;
use dupsweep::error::ExitCode;
use std::fs;
use tempfile::tempdir;

fn run(args: &[&str]) -> anyhow::Result<ExitCode> {
    let mut argv = vec!["dupsweep", "-q", "--no-color"];
    argv.extend_from_slice(args);
    dupsweep::run_app(Cli::try_parse_from(argv).unwrap())
}

#[test]
fn test_exit_code_for_duplicates_and_none() {
    let dir = tempdir().unwrap();
    let root = dir.path().to_str().unwrap();
    fs::write(dir.path().join("a.txt"), b"one").unwrap();
    fs::write(dir.path().join("b.txt"), b"two").unwrap();

    assert_eq!(run(&["scan", root]).unwrap(), ExitCode::NoDuplicates);

    fs::write(dir.path().join("c.txt"), b"one").unwrap();
    assert_eq!(
        run(&["scan", root, "--output", "json"]).unwrap(),
        ExitCode::Success
    );
}

#[test]
fn test_delete_requires_confirmation() {
    let dir = tempdir().unwrap();
    let root = dir.path().to_str().unwrap();
    fs::write(dir.path().join("a.txt"), b"same").unwrap();
    fs::write(dir.path().join("b.txt"), b"same").unwrap();

    let err = run(&["scan", root, "--delete"]).unwrap_err();
    assert!(err.to_string().contains("--yes"));
    assert!(dir.path().join("b.txt").exists());

    assert_eq!(
        run(&["scan", root, "--delete", "-y"]).unwrap(),
        ExitCode::Success
    );
    assert!(dir.path().join("a.txt").exists());
    assert!(!dir.path().join("b.txt").exists());
}

#[test]
fn test_missing_root_is_general_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");

    let err = run(&["scan", missing.to_str().unwrap()]).unwrap_err();
    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    assert!(err.to_string().contains("Path not found"));
}

#[test]
fn test_config_file_and_show() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "algorithms = [\"nope\"]\n").unwrap();

    let root = dir.path().to_str().unwrap();
    let config = config_path.to_str().unwrap();
    assert!(run(&["scan", root, "--config", config]).is_err());

    fs::write(&config_path, "keep = \"last\"\n").unwrap();
    assert_eq!(
        run(&["config", "show", "--config", config]).unwrap(),
        ExitCode::Success
    );
}
