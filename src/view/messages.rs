//! Fixed interface text.

use crate::models::Mode;

pub const PLACEHOLDER_SIMPLE: &str = "Ask about any company, stock, or market trend...";
pub const PLACEHOLDER_AGENT: &str = "Enter company name or ticker symbol (e.g., Apple, AAPL)";
pub const EMPTY_RESPONSE: &str = "Your response will appear here...";
pub const LOADING: &str = "Processing...";
pub const LOADING_AGENT: &str = "Running fundamental, momentum and sentiment analysis...";
pub const AGENT_DESCRIPTION: &str =
    "(Comprehensive 3-stream analysis: Fundamental, Momentum, and Market Sentiment)";
pub const ERROR_TITLE: &str = "Error processing request";
pub const RETRY_HINT: &str = "Type :retry to try again.";

/// Input prompt hint for a mode.
pub fn placeholder(mode: Mode) -> &'static str {
    match mode {
        Mode::Simple => PLACEHOLDER_SIMPLE,
        Mode::Agent => PLACEHOLDER_AGENT,
    }
}

/// Label of the submit action for a mode.
pub fn action_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Simple => "Search",
        Mode::Agent => "Analyze",
    }
}
