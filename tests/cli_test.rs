//! Command dispatch against a SQLite file

use std::path::Path;

use clap::Parser;
use rstest::rstest;
use tempfile::TempDir;

use orgchart::cli::commands::execute;
use orgchart::cli::{Cli, CliError, Commands};
use orgchart::exitcode;
use orgchart::util::testing::init_test_setup;

fn cli(db: &Path, args: &[&str]) -> Cli {
    let db = db.to_string_lossy().to_string();
    let argv = ["orgchart", "--database", db.as_str()]
        .into_iter()
        .chain(args.iter().copied());
    Cli::try_parse_from(argv).unwrap()
}

#[test]
fn given_insert_command_when_executed_then_check_passes() {
    init_test_setup();
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("orgchart.db");

    execute(cli(
        &db,
        &["insert", "7", "--name", "English=Asia", "--name", "Italian=Asia"],
    ))
    .unwrap();

    execute(cli(&db, &["check"])).unwrap();
    execute(cli(&db, &["get", "13", "-l", "Italian"])).unwrap();
    execute(cli(&db, &["children", "7", "-s", "asia"])).unwrap();
    execute(cli(&db, &["tree"])).unwrap();
}

#[test]
fn given_missing_node_when_getting_then_noinput_exit_code() {
    init_test_setup();
    let dir = TempDir::new().unwrap();

    let err = execute(cli(&dir.path().join("orgchart.db"), &["get", "999"])).unwrap_err();

    assert!(matches!(err, CliError::Query(_)));
    assert_eq!(err.to_string(), "Not found");
    assert_eq!(err.exit_code(), exitcode::NOINPUT);
}

#[rstest]
#[case(&["insert", "5", "--name", "English=Legal"], exitcode::DATAERR)]
#[case(&["insert", "5", "--name", "Legal"], exitcode::USAGE)]
#[case(&["list", "--page-num", "9"], exitcode::DATAERR)]
fn given_bad_input_when_executing_then_exit_code(#[case] args: &[&str], #[case] code: i32) {
    init_test_setup();
    let dir = TempDir::new().unwrap();

    let err = execute(cli(&dir.path().join("orgchart.db"), args)).unwrap_err();

    assert_eq!(err.exit_code(), code);
}

#[test]
fn given_no_command_when_executing_then_usage() {
    init_test_setup();
    let err = execute(Cli::try_parse_from(["orgchart"]).unwrap()).unwrap_err();
    assert_eq!(err.exit_code(), exitcode::USAGE);
}

#[test]
fn given_serve_with_bind_when_parsing_then_socket_addr() {
    let parsed = Cli::try_parse_from(["orgchart", "serve", "--bind", "0.0.0.0:9000"]).unwrap();
    match parsed.command {
        Some(Commands::Serve { bind }) => assert_eq!(bind, Some("0.0.0.0:9000".parse().unwrap())),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn given_insert_without_names_when_parsing_then_rejected() {
    assert!(Cli::try_parse_from(["orgchart", "insert", "5"]).is_err());
}
