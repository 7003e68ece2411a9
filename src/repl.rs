//! Interactive session.
//!
//! Reads one line at a time from stdin. Lines starting with `:` are
//! commands; anything else is submitted as a query in the current mode.

use crate::backend::AnalysisBackend;
use crate::models::Mode;
use crate::report;
use crate::session::Session;
use crate::view::{messages, LoadingVariant};
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

const HELP: &str = "\
Commands:
  :agent     switch to multi-stream analysis
  :simple    switch to simple questions
  :mode      toggle between the two
  :retry     re-run the last failed request
  :clear     clear the current result
  :help      show this help
  :quit      leave (also :q, :exit)
Anything else is sent as a query.";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Submit(String),
    SetMode(Mode),
    ToggleMode,
    Retry,
    Clear,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    /// Parse an input line.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }

        let Some(name) = line.strip_prefix(':') else {
            return Command::Submit(line.to_string());
        };

        match name.trim().to_lowercase().as_str() {
            "agent" => Command::SetMode(Mode::Agent),
            "simple" => Command::SetMode(Mode::Simple),
            "mode" => Command::ToggleMode,
            "retry" | "r" => Command::Retry,
            "clear" => Command::Clear,
            "help" | "h" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        }
    }
}

/// Run the interactive loop until EOF or `:quit`.
pub async fn run<B: AnalysisBackend>(session: &mut Session<B>, show_progress: bool) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("📈 Finlab - Investment Intelligence at Your Fingertips");
    println!("   Type :help for commands.\n");
    print_mode(session.mode());

    loop {
        print_prompt(session.mode())?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let command = Command::parse(&line);
        debug!("Command: {:?}", command);

        match command {
            Command::Quit => break,
            Command::Empty => continue,
            Command::Help => println!("{}\n", HELP),
            Command::SetMode(mode) => {
                if session.set_mode(mode) {
                    print_mode(mode);
                }
            }
            Command::ToggleMode => {
                if session.toggle_mode() {
                    print_mode(session.mode());
                }
            }
            Command::Clear => {
                session.reset();
                print!("{}", report::render_screen(&session.screen(), true));
            }
            Command::Retry => {
                let retry_mode = session
                    .last_submission()
                    .map(|submission| submission.mode)
                    .filter(|_| session.can_retry());

                match retry_mode {
                    Some(mode) => {
                        with_spinner(mode, show_progress, session.retry()).await;
                        print!("{}", report::render_screen(&session.screen(), true));
                    }
                    None => println!("Nothing to retry.\n"),
                }
            }
            Command::Submit(query) => {
                let mode = session.mode();
                if with_spinner(mode, show_progress, session.submit(&query))
                    .await
                    .is_some()
                {
                    print!("{}", report::render_screen(&session.screen(), true));
                }
            }
            Command::Unknown(name) => println!("Unknown command ':{}'. Type :help.\n", name),
        }
    }

    println!("👋 Bye.");
    Ok(())
}

/// Await a request while a spinner shows the loading text for `mode`.
pub async fn with_spinner<F: Future>(mode: Mode, show_progress: bool, request: F) -> F::Output {
    let variant = LoadingVariant::from(mode);
    let spinner = show_progress.then(|| start_spinner(report::loading_text(variant)));

    let output = request.await;

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    output
}

fn start_spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg} [{elapsed}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

fn print_mode(mode: Mode) {
    match mode {
        Mode::Simple => println!("🔍 Simple mode"),
        Mode::Agent => println!("📊 Multi-Stream Analysis (agent) {}", messages::AGENT_DESCRIPTION),
    }
    println!("   {}\n", messages::placeholder(mode));
}

fn print_prompt(mode: Mode) -> Result<()> {
    print!("{} > ", messages::action_label(mode));
    std::io::stdout().flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_queries() {
        assert_eq!(
            Command::parse("  What is AAPL's P/E?  "),
            Command::Submit("What is AAPL's P/E?".to_string())
        );
        assert_eq!(Command::parse(""), Command::Empty);
        assert_eq!(Command::parse("   "), Command::Empty);
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse(":agent"), Command::SetMode(Mode::Agent));
        assert_eq!(Command::parse(":SIMPLE"), Command::SetMode(Mode::Simple));
        assert_eq!(Command::parse(":mode"), Command::ToggleMode);
        assert_eq!(Command::parse(":retry"), Command::Retry);
        assert_eq!(Command::parse(":clear"), Command::Clear);
        assert_eq!(Command::parse(":?"), Command::Help);
        assert_eq!(Command::parse(":q"), Command::Quit);
        assert_eq!(Command::parse(":exit"), Command::Quit);
    }

    #[tokio::test]
    async fn test_with_spinner_returns_request_output() {
        let output = with_spinner(Mode::Agent, false, async { 42 }).await;
        assert_eq!(output, 42);
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(
            Command::parse(":portfolio"),
            Command::Unknown("portfolio".to_string())
        );
    }
}
