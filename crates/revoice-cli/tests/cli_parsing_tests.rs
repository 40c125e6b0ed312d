//! CLI argument parsing tests.
//!
//! These tests verify that command-line arguments are parsed correctly
//! without actually executing the monitor (which would require the game
//! process).

use std::path::PathBuf;

use clap::Parser;

// Re-create Args structure for testing since it's not publicly exported
#[derive(Parser)]
#[command(name = "revoice")]
struct Args {
    #[arg(short, long, default_value = "revoice.ini")]
    config: PathBuf,

    #[arg(short, long)]
    archive: Option<PathBuf>,

    #[arg(short, long, default_value = "revoice.log")]
    log: PathBuf,

    #[arg(long)]
    pid: Option<u32>,
}

#[test]
fn test_parse_no_args() {
    let args = Args::try_parse_from(["revoice"]).unwrap();
    assert_eq!(args.config, PathBuf::from("revoice.ini"));
    assert_eq!(args.log, PathBuf::from("revoice.log"));
    assert!(args.archive.is_none());
    assert!(args.pid.is_none());
}

#[test]
fn test_parse_archive_override() {
    let args = Args::try_parse_from(["revoice", "-a", "custom/voice.afs"]).unwrap();
    assert_eq!(args.archive, Some(PathBuf::from("custom/voice.afs")));
}

#[test]
fn test_parse_config_path() {
    let args = Args::try_parse_from(["revoice", "--config", "other.ini"]).unwrap();
    assert_eq!(args.config, PathBuf::from("other.ini"));
}

#[test]
fn test_parse_with_pid() {
    let args = Args::try_parse_from(["revoice", "--pid", "12345"]).unwrap();
    assert_eq!(args.pid, Some(12345));
}

#[test]
fn test_invalid_pid_fails() {
    let result = Args::try_parse_from(["revoice", "--pid", "not-a-pid"]);
    assert!(result.is_err());
}
