use super::*;

#[test]
fn only_http_401_counts_as_unauthorized() {
    let expired = CliError::Api { status: 401, message: "Invalid or expired token".into() };
    let bad = CliError::Api { status: 400, message: "Message cannot be empty".into() };
    assert!(expired.is_unauthorized());
    assert!(!bad.is_unauthorized());
    assert!(!CliError::NotLoggedIn.is_unauthorized());
}

#[test]
fn chat_subcommand_parses_with_defaults() {
    let cli = Cli::try_parse_from(["huddle-cli", "chat"]).expect("parse");
    assert!(matches!(cli.command, Command::Chat));
    assert!(cli.base_url.starts_with("http"));
}

#[test]
fn history_limit_is_optional() {
    let cli = Cli::try_parse_from(["huddle-cli", "history", "--limit", "10"]).expect("parse");
    assert!(matches!(cli.command, Command::History { limit: Some(10) }));

    let cli = Cli::try_parse_from(["huddle-cli", "history"]).expect("parse");
    assert!(matches!(cli.command, Command::History { limit: None }));
}

#[test]
fn require_reports_missing_session() {
    assert!(matches!(require(None), Err(CliError::NotLoggedIn)));
}

#[test]
fn relay_failure_after_store_is_only_a_note() {
    assert_eq!(delivery_note(Ok(())), None);
    let note = delivery_note(Err(CliError::WsClosed)).expect("failure is reported");
    assert!(note.starts_with("saved, but live delivery failed"));
    assert!(note.contains("websocket closed"));
}
