mod api;
mod chat_view;
mod relay;
mod session;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use frames::ChatMessage;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::api::ApiClient;
use crate::chat_view::{ChatView, SendOutcome};
use crate::relay::{RelayConnection, RelayEvent};
use crate::session::Session;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("not logged in; run `huddle-cli login` first")]
    NotLoggedIn,
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },
    #[error("websocket connect failed: {0}")]
    WsConnect(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket closed")]
    WsClosed,
    #[error("frame decode failed: {0}")]
    Decode(#[from] frames::CodecError),
    #[error("timed out waiting for websocket frame")]
    Timeout,
    #[error("missing expected field `{0}`")]
    MissingField(&'static str),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. })
    }
}

#[derive(Parser, Debug)]
#[command(name = "huddle-cli", about = "Huddle community chat client")]
struct Cli {
    #[arg(long, env = "HUDDLE_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[arg(long, env = "HUDDLE_SESSION_FILE")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the server is up.
    Ping,
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long, env = "HUDDLE_PASSWORD")]
        password: String,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "HUDDLE_PASSWORD")]
        password: String,
    },
    Logout,
    /// Show the identity behind the stored token.
    Whoami,
    /// Print recent community messages, oldest first.
    History {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Post one message and broadcast it.
    Post { text: String },
    /// Ask the chatbot a question.
    Ask { question: String },
    /// Interactive chat: read lines from stdin, print live messages.
    Chat,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let session_path = cli.session_file.unwrap_or_else(session::default_path);
    let stored = session::load(&session_path)?;
    let api = ApiClient::new(&cli.base_url, stored.as_ref().map(|s| s.token.clone()));

    match cli.command {
        Command::Ping => {
            api.ping().await?;
            println!("ok");
        }
        Command::Register { name, email, phone, password } => {
            let user = api.register(&name, &email, &phone, &password).await?;
            println!("registered {} <{}>; run `huddle-cli login` to sign in", user.name, user.email);
        }
        Command::Login { email, password } => {
            let session = api.login(&email, &password).await?;
            session::save(&session_path, &session)?;
            println!("logged in as {}", session.user.display_name());
        }
        Command::Logout => {
            session::clear(&session_path)?;
            println!("logged out");
        }
        Command::Whoami => {
            require(stored.as_ref())?;
            let me = with_session_check(&session_path, api.me().await)?;
            println!("{}", serde_json::to_string_pretty(&me)?);
        }
        Command::History { limit } => {
            for message in api.history(limit).await? {
                print_message(&message);
            }
        }
        Command::Post { text } => {
            let session = require(stored.as_ref())?;
            post_once(&cli.base_url, &api, &session_path, session, &text).await?;
        }
        Command::Ask { question } => {
            println!("{}", api.ask(&question).await?);
        }
        Command::Chat => {
            let session = require(stored.as_ref())?;
            run_chat(&cli.base_url, &api, &session_path, session).await?;
        }
    }
    Ok(())
}

fn require(session: Option<&Session>) -> Result<&Session, CliError> {
    session.ok_or(CliError::NotLoggedIn)
}

/// Clear the stored session when the server rejects the token.
fn with_session_check<T>(session_path: &Path, result: Result<T, CliError>) -> Result<T, CliError> {
    if let Err(e) = &result {
        if e.is_unauthorized() {
            session::clear(session_path)?;
            eprintln!("session expired; please log in again");
        }
    }
    result
}

/// A stored message that could not be relayed is reported, never fatal.
fn delivery_note(result: Result<(), CliError>) -> Option<String> {
    result.err().map(|e| format!("saved, but live delivery failed: {e}"))
}

fn print_message(message: &ChatMessage) {
    let when = message.timestamp.format("%H:%M");
    println!("[{when}] {}: {}", message.author, message.text);
}

async fn post_once(
    base_url: &str,
    api: &ApiClient,
    session_path: &Path,
    session: &Session,
    text: &str,
) -> Result<(), CliError> {
    let mut view = ChatView::new();
    let result = api.post_message(text).await;
    match view.apply_post(session.user.display_name(), text, result) {
        SendOutcome::Ignored => eprintln!("nothing to send"),
        SendOutcome::Posted(message) => {
            print_message(&message);
            match RelayConnection::connect(base_url).await {
                Ok(mut relay) => {
                    if let Some(note) = delivery_note(relay.publish(&message).await) {
                        eprintln!("{note}");
                    }
                    relay.close().await;
                }
                Err(e) => eprintln!("saved, but live delivery failed: {e}"),
            }
        }
        SendOutcome::SessionExpired => {
            session::clear(session_path)?;
            return Err(CliError::NotLoggedIn);
        }
        SendOutcome::LocalOnly { message, reason } => {
            print_message(&message);
            eprintln!("not saved: {reason}");
        }
    }
    Ok(())
}

enum ChatInput {
    Line(Option<String>),
    Relay(RelayEvent),
}

async fn run_chat(base_url: &str, api: &ApiClient, session_path: &Path, session: &Session) -> Result<(), CliError> {
    let mut view = ChatView::new();
    view.load_history(api.history(None).await);
    for message in view.messages() {
        print_message(message);
    }

    let mut relay = RelayConnection::connect(base_url).await?;
    eprintln!(
        "connected as {} (client {}); type to chat, Ctrl-D to quit",
        session.user.display_name(),
        relay.client_id()
    );

    let author = session.user.display_name().to_owned();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let input = tokio::select! {
            line = lines.next_line() => ChatInput::Line(line?),
            event = relay.next_event() => ChatInput::Relay(event?),
        };

        match input {
            ChatInput::Line(None) => break,
            ChatInput::Line(Some(line)) => {
                let result = api.post_message(&line).await;
                match view.apply_post(&author, &line, result) {
                    SendOutcome::Ignored => {}
                    SendOutcome::Posted(message) => {
                        print_message(&message);
                        if let Some(note) = delivery_note(relay.publish(&message).await) {
                            eprintln!("({note})");
                        }
                    }
                    SendOutcome::SessionExpired => {
                        session::clear(session_path)?;
                        eprintln!("session expired; please log in again");
                        break;
                    }
                    SendOutcome::LocalOnly { message, reason } => {
                        print_message(&message);
                        eprintln!("(not saved: {reason})");
                    }
                }
            }
            ChatInput::Relay(RelayEvent::Chat(message)) => {
                if view.receive(message.clone()) {
                    print_message(&message);
                }
            }
            ChatInput::Relay(RelayEvent::Error(message)) => eprintln!("relay: {message}"),
            ChatInput::Relay(RelayEvent::Other) => {}
        }
    }

    relay.close().await;
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
