//! CLI parsing tests

use super::*;
use crate::config::FiwganConfig;
use std::path::PathBuf;

#[test]
fn test_parse_train_with_overrides() {
    let cli = parse_args([
        "fiwgan", "train", "config.yaml", "--job-id", "run1", "--epochs", "3", "--loss", "dcgan", "--seed", "42",
        "--dry-run",
    ])
    .expect("parse");
    let Command::Train(args) = cli.command else {
        panic!("expected train command");
    };
    assert_eq!(args.config, PathBuf::from("config.yaml"));
    assert_eq!(args.job_id.as_deref(), Some("run1"));
    assert_eq!(args.epochs, Some(3));
    assert!(args.dry_run);

    let mut config = FiwganConfig::default();
    apply_overrides(&mut config, &args);
    assert_eq!(config.train.epochs, 3);
    assert_eq!(config.model.loss, "dcgan");
    assert_eq!(config.train.seed, Some(42));
    assert_eq!(config.train.job_id.as_deref(), Some("run1"));
    assert_eq!(config.train.batch_size, 64);
}

#[test]
fn test_parse_generate() {
    let cli = parse_args(["fiwgan", "-q", "generate", "--run-dir", "train/a", "--output", "out", "-n", "4"])
        .expect("parse");
    assert!(cli.quiet);
    let Command::Generate(args) = cli.command else {
        panic!("expected generate command");
    };
    assert_eq!(args.num, 4);
    assert_eq!(args.run_dir, PathBuf::from("train/a"));
    assert!(args.seed.is_none());
}

#[test]
fn test_generate_defaults_to_one_clip() {
    let cli = parse_args(["fiwgan", "generate", "-r", "run", "-o", "out"]).expect("parse");
    assert!(matches!(cli.command, Command::Generate(GenerateArgs { num: 1, .. })));
}

#[test]
fn test_info_format() {
    let cli = parse_args(["fiwgan", "info", "c.yaml", "--format", "JSON"]).expect("parse");
    assert!(matches!(cli.command, Command::Info(InfoArgs { format: OutputFormat::Json, .. })));
    assert!(parse_args(["fiwgan", "info", "c.yaml", "--format", "xml"]).is_err());
}

#[test]
fn test_missing_config_is_error() {
    assert!(parse_args(["fiwgan", "train"]).is_err());
    assert!(parse_args(["fiwgan", "validate"]).is_err());
}
