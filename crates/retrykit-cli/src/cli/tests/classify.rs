use super::*;
use crate::cli::commands::ClassifyArgs;

fn classify_args(args: &[&str]) -> ClassifyArgs {
    match parse(args).command {
        CliCommand::Classify(a) => a,
        other => panic!("expected Classify, got {other:?}"),
    }
}

#[test]
fn cli_parse_classify_status_and_server_message() {
    let a = classify_args(&[
        "retrykit",
        "classify",
        "--status",
        "404",
        "--server-message",
        "Not found",
    ]);
    assert_eq!(a.status, Some(404));
    assert_eq!(a.server_message.as_deref(), Some("Not found"));
    assert!(!a.json);
}

#[test]
fn cli_parse_classify_code_json() {
    let a = classify_args(&["retrykit", "classify", "--code", "ECONNREFUSED", "--json"]);
    assert_eq!(a.code.as_deref(), Some("ECONNREFUSED"));
    assert!(a.json);
}

#[test]
fn cli_parse_classify_without_flags() {
    let a = classify_args(&["retrykit", "classify"]);
    assert!(a.status.is_none() && a.code.is_none() && a.message.is_none());
}

#[test]
fn cli_server_message_requires_status() {
    assert!(Cli::try_parse_from(["retrykit", "classify", "--server-message", "x"]).is_err());
}

#[test]
fn cli_status_conflicts_with_code() {
    let res = Cli::try_parse_from([
        "retrykit",
        "classify",
        "--status",
        "404",
        "--code",
        "ECONNRESET",
    ]);
    assert!(res.is_err());
}

#[test]
fn cli_status_conflicts_with_message() {
    let res = Cli::try_parse_from(["retrykit", "classify", "--status", "500", "--message", "x"]);
    assert!(res.is_err());
}

#[test]
fn cli_parse_classify_code_and_message() {
    let a = classify_args(&[
        "retrykit",
        "classify",
        "--code",
        "ECONNRESET",
        "--message",
        "socket hang up",
    ]);
    assert_eq!(a.code.as_deref(), Some("ECONNRESET"));
    assert_eq!(a.message.as_deref(), Some("socket hang up"));
}
