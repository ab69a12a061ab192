//! Tests for status, config and the global verbosity flags.

use super::parse;
use crate::cli::commands::run_config;
use crate::cli::{Cli, CliCommand};
use anyhow::anyhow;
use clap::Parser;
use opsdl_core::control::CancelToken;
use opsdl_core::logging::Verbosity;
use std::fs;

#[test]
fn cli_parse_status() {
    match parse(&["opsdl", "status"]) {
        CliCommand::Status => {}
        _ => panic!("expected Status"),
    }
}

#[test]
fn cli_parse_config() {
    match parse(&["opsdl", "config"]) {
        CliCommand::Config { edit } => assert!(!edit),
        _ => panic!("expected Config"),
    }
    match parse(&["opsdl", "config", "--edit"]) {
        CliCommand::Config { edit } => assert!(edit),
        _ => panic!("expected Config with --edit"),
    }
}

#[test]
fn verbosity_flags() {
    let v = |args: &[&str]| Cli::try_parse_from(args).unwrap().verbosity();
    assert_eq!(v(&["opsdl", "status"]), Verbosity::Normal);
    assert_eq!(v(&["opsdl", "--debug", "status"]), Verbosity::Debug);
    assert_eq!(v(&["opsdl", "sync", "-v"]), Verbosity::Verbose);
    assert_eq!(v(&["opsdl", "status", "--silent"]), Verbosity::Silent);
}

#[test]
fn conflicting_verbosity_flags_rejected() {
    assert!(Cli::try_parse_from(["opsdl", "--debug", "--silent", "status"]).is_err());
}

#[test]
fn missing_subcommand_rejected() {
    assert!(Cli::try_parse_from(["opsdl"]).is_err());
}

#[test]
fn config_command_leaves_a_broken_file_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let broken = "media_dir = \"/m\"\ntypes = [\"PODCAST\"]\n";
    fs::write(&path, broken).unwrap();

    run_config(&path, false).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), broken);
}

#[test]
fn config_command_creates_a_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("opsdl").join("config.toml");

    run_config(&path, false).unwrap();
    let created = opsdl_core::config::load_from_path(&path).unwrap();
    assert!(created.media_dir.as_os_str().is_empty());
}

#[tokio::test]
async fn status_needs_a_valid_config() {
    let cli = Cli::try_parse_from(["opsdl", "status"]).unwrap();
    let err = cli
        .run(Err(anyhow!("parse config.toml: unknown variant")), CancelToken::new())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("unknown variant"));
}
