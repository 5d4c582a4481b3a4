use clap::Parser;
use dupsweep::actions::KeepPolicy;
use dupsweep::cli::{Cli, Commands};
use dupsweep::config::{ConfigError, Settings, ENV_PREFIX};
use dupsweep::scanner::HashAlgorithm;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_settings_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
algorithms = ["sha512", "xxh64"]
block_size = 65536
keep = "longest-path"
recursive = true
skip_hidden = true
min_size = 1
"#;
    fs::write(&config_path, toml_content).unwrap();

    let figment =
        Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file(&config_path));
    let settings = Settings::from_figment(figment).unwrap();

    assert_eq!(
        settings.algorithms,
        vec![HashAlgorithm::Sha512, HashAlgorithm::Xxh64]
    );
    assert_eq!(settings.block_size, 65536);
    assert_eq!(settings.keep, KeepPolicy::LongestPath);
    assert!(settings.recursive);
    assert!(settings.skip_hidden);
    assert_eq!(settings.min_size, Some(1));
    assert_eq!(settings.max_size, None);
}

#[test]
fn test_settings_env_overrides_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "io_threads = 2\nblock_size = 4096\n").unwrap();

    std::env::set_var("DUPSWEEP_IO_THREADS", "16");

    let figment = Figment::from(Serialized::defaults(Settings::default()))
        .merge(Toml::file(&config_path))
        .merge(Env::prefixed(ENV_PREFIX));
    let settings = Settings::from_figment(figment).unwrap();

    std::env::remove_var("DUPSWEEP_IO_THREADS");

    assert_eq!(settings.io_threads, 16);
    assert_eq!(settings.block_size, 4096);
}

#[test]
fn test_settings_load_explicit_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("dupsweep.toml");
    fs::write(&config_path, "keep = \"oldest\"\n").unwrap();

    let settings = Settings::load(Some(&config_path)).unwrap();

    assert_eq!(settings.keep, KeepPolicy::Oldest);
}

#[test]
fn test_settings_invalid_file_is_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "block_size = 0\n").unwrap();

    let settings = Settings::load(Some(&config_path)).unwrap();
    assert!(matches!(settings.validate(), Err(ConfigError::Invalid(_))));

    fs::write(&config_path, "keep = \"random\"\n").unwrap();
    let result = Settings::load(Some(&config_path));
    assert!(matches!(result, Err(ConfigError::Load(_))));
}

#[test]
fn test_cli_flag_overrides_invalid_file_value() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "block_size = 0\n").unwrap();

    let cli = Cli::try_parse_from([
        "dupsweep",
        "scan",
        ".",
        "--block-size",
        "4KiB",
        "--config",
        config_path.to_str().unwrap(),
    ])
    .unwrap();
    let Commands::Scan(args) = cli.command else {
        panic!("Expected Scan command");
    };

    let mut settings = Settings::load(args.config.as_deref()).unwrap();
    assert!(settings.validate().is_err());

    args.apply_to(&mut settings);
    assert_eq!(settings.block_size, 4096);
    assert!(settings.validate().is_ok());
}
