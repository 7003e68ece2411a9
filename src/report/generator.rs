//! Markdown and JSON rendering.
//!
//! This module turns selected screens and finished results into the text
//! printed to the terminal or saved with `--output`.

use crate::models::{AgentAnalysis, AnalysisResult, FinalRecommendation, Mode};
use crate::view::messages;
use crate::view::{Body, LoadingVariant, Screen};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// A finished result together with what was asked.
#[derive(Debug, Clone, Serialize)]
pub struct ExportRecord<'a> {
    pub query: &'a str,
    pub mode: Mode,
    pub generated_at: DateTime<Utc>,
    pub result: &'a AnalysisResult,
}

impl<'a> ExportRecord<'a> {
    pub fn new(query: &'a str, result: &'a AnalysisResult) -> Self {
        Self {
            query,
            mode: result.mode(),
            generated_at: Utc::now(),
            result,
        }
    }
}

/// Render a screen: error banner first, then the body.
pub fn render_screen(screen: &Screen<'_>, retry_hint: bool) -> String {
    let mut output = String::new();

    if let Some(ref message) = screen.error {
        output.push_str(&generate_error_banner(message, retry_hint));
    }

    output.push_str(&render_body(&screen.body));
    output
}

/// Render the body of a screen.
pub fn render_body(body: &Body<'_>) -> String {
    match body {
        Body::Loading(variant) => format!("{}\n", loading_text(*variant)),
        Body::Structured(analysis) => generate_analysis_markdown(analysis),
        Body::Text(text) => format!("{}\n", text),
        Body::Empty(placeholder) => format!("{}\n", placeholder),
    }
}

/// Placeholder text while a request is in flight.
pub fn loading_text(variant: LoadingVariant) -> &'static str {
    match variant {
        LoadingVariant::Simple => messages::LOADING,
        LoadingVariant::Full => messages::LOADING_AGENT,
    }
}

/// Generate the error banner.
fn generate_error_banner(message: &str, retry_hint: bool) -> String {
    let mut banner = String::new();

    banner.push_str(&format!("> ❌ **{}**\n>\n", messages::ERROR_TITLE));
    for line in message.lines() {
        banner.push_str(&format!("> {}\n", line));
    }
    if retry_hint {
        banner.push_str(&format!(">\n> 🔄 {}\n", messages::RETRY_HINT));
    }
    banner.push('\n');

    banner
}

/// Generate the full markdown view of a structured analysis.
pub fn generate_analysis_markdown(analysis: &AgentAnalysis) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {} - Complete Analysis\n\n", analysis.ticker));
    output.push_str(&format!(
        "*Execution time: {:.2}s*\n\n",
        analysis.execution_time
    ));

    output.push_str(&generate_recommendation_banner(&analysis.final_recommendation));
    output.push_str(&generate_analysis_cards(analysis));
    output.push_str(&generate_list_section(
        "Key Risks",
        &analysis.final_recommendation.key_risks,
    ));
    output.push_str(&generate_list_section(
        "Key Opportunities",
        &analysis.final_recommendation.key_opportunities,
    ));

    output
}

/// Generate the final recommendation banner.
fn generate_recommendation_banner(recommendation: &FinalRecommendation) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "## {} Final Recommendation: {}\n\n",
        recommendation.action.emoji(),
        recommendation.action
    ));
    section.push_str(&format!(
        "**Confidence:** {}%\n\n",
        recommendation.confidence_percent()
    ));
    section.push_str(&format!("{}\n\n", recommendation.rationale));
    section.push_str(&format!(
        "**Time Horizon:** {}\n\n",
        recommendation.time_horizon
    ));

    section
}

/// Generate the fundamental, momentum and sentiment cards.
fn generate_analysis_cards(analysis: &AgentAnalysis) -> String {
    let fundamental = &analysis.fundamental_analysis;
    let momentum = &analysis.momentum_analysis;
    let sentiment = &analysis.sentiment_analysis;

    let mut section = String::new();

    section.push_str(&generate_card(
        "Fundamental Analysis",
        &[
            ("Grade", fundamental.investment_grade.clone()),
            ("Recommendation", fundamental.recommendation.clone()),
        ],
        Some(fundamental.overall_investment_thesis.as_str()),
    ));

    section.push_str(&generate_card(
        "Momentum Analysis",
        &[
            ("Momentum", momentum.overall_momentum.clone()),
            ("Score", format_score(momentum.momentum_score)),
            ("Outlook", momentum.short_term_outlook.clone()),
        ],
        None,
    ));

    section.push_str(&generate_card(
        "Market Sentiment",
        &[
            ("Sentiment", sentiment.sentiment_direction.clone()),
            ("Score", format_score(sentiment.sentiment_score)),
        ],
        Some(sentiment.market_outlook.as_str()),
    ));

    section
}

/// Generate one labelled card.
fn generate_card(title: &str, items: &[(&str, String)], description: Option<&str>) -> String {
    let mut card = String::new();

    card.push_str(&format!("### {}\n\n", title));
    for (label, value) in items {
        card.push_str(&format!("- **{}:** {}\n", label, value));
    }
    card.push('\n');

    if let Some(text) = description.filter(|d| !d.is_empty()) {
        card.push_str(&format!("*{}*\n\n", text));
    }

    card
}

/// Generate a bullet list section; empty lists render nothing.
fn generate_list_section(title: &str, items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str(&format!("### {}\n\n", title));
    for item in items {
        section.push_str(&format!("- {}\n", item));
    }
    section.push('\n');

    section
}

fn format_score(score: f64) -> String {
    format!("{}/10", score)
}

/// Generate a saved markdown report with a metadata header.
pub fn generate_markdown_report(record: &ExportRecord<'_>) -> String {
    let mut output = String::new();

    output.push_str("# Finlab Report\n\n");
    output.push_str("## Metadata\n\n");
    output.push_str(&format!("- **Query:** {}\n", record.query));
    output.push_str(&format!("- **Mode:** {}\n", record.mode));
    output.push_str(&format!(
        "- **Generated:** {}\n\n",
        record.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    match record.result {
        AnalysisResult::Simple(answer) => {
            output.push_str("## Answer\n\n");
            if answer.is_empty() {
                output.push_str(messages::EMPTY_RESPONSE);
            } else {
                output.push_str(answer);
            }
            output.push_str("\n\n");
        }
        AnalysisResult::Structured(analysis) => {
            output.push_str(&generate_analysis_markdown(analysis));
        }
    }

    output.push_str("---\n\n");
    output.push_str("*Report generated by Finlab*\n");

    output
}

/// Generate a JSON report.
pub fn generate_json_report(record: &ExportRecord<'_>) -> Result<String> {
    serde_json::to_string_pretty(record).map_err(Into::into)
}

/// Write rendered report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::models::tests::sample_analysis;
    use crate::models::Action;
    use crate::session::state::RequestState;
    use crate::view;

    #[test]
    fn test_generate_analysis_markdown() {
        let mut analysis = sample_analysis();
        analysis.execution_time = 12.3456;

        let markdown = generate_analysis_markdown(&analysis);

        assert!(markdown.contains("# AAPL - Complete Analysis"));
        assert!(markdown.contains("Execution time: 12.35s"));
        assert!(markdown.contains("Final Recommendation: BUY"));
        assert!(markdown.contains("**Confidence:** 85%"));
        assert!(markdown.contains("**Time Horizon:** 6-12 months"));
        assert!(markdown.contains("- **Grade:** A-"));
        assert!(markdown.contains("- **Score:** 7/10"));
        assert!(markdown.contains("- **Score:** 6.5/10"));
        assert!(markdown.contains("### Key Risks"));
        assert!(markdown.contains("- Supply chain concentration"));
        assert!(markdown.contains("### Key Opportunities"));
    }

    #[test]
    fn test_recommendation_banner_rounds_confidence() {
        let mut recommendation = sample_analysis().final_recommendation;
        recommendation.action = Action::Sell;
        recommendation.confidence = 0.625;

        let banner = generate_recommendation_banner(&recommendation);
        assert!(banner.contains("🔴 Final Recommendation: SELL"));
        assert!(banner.contains("**Confidence:** 63%"));
    }

    #[test]
    fn test_empty_lists_are_omitted() {
        let mut analysis = sample_analysis();
        analysis.final_recommendation.key_opportunities.clear();

        let markdown = generate_analysis_markdown(&analysis);
        assert!(!markdown.contains("Key Opportunities"));
        assert!(markdown.contains("Key Risks"));
    }

    #[test]
    fn test_render_simple_answer_verbatim() {
        let state = RequestState::Success(AnalysisResult::Simple("**X** rallied.".to_string()));
        let screen = view::select(&state, Mode::Simple);

        assert_eq!(render_screen(&screen, true), "**X** rallied.\n");
    }

    #[test]
    fn test_render_error_banner_with_retry_hint() {
        let state = RequestState::Failed(AnalysisError::Backend {
            status: 404,
            body: "ticker not found".to_string(),
        });
        let screen = view::select(&state, Mode::Agent);

        let rendered = render_screen(&screen, true);
        assert!(rendered.contains(messages::ERROR_TITLE));
        assert!(rendered.contains("HTTP error! status: 404, message: ticker not found"));
        assert!(rendered.contains(messages::RETRY_HINT));
        assert!(rendered.ends_with(&format!("{}\n", messages::EMPTY_RESPONSE)));

        assert!(!render_screen(&screen, false).contains(messages::RETRY_HINT));
    }

    #[test]
    fn test_render_loading_variants() {
        assert_eq!(
            render_body(&Body::Loading(LoadingVariant::Simple)),
            format!("{}\n", messages::LOADING)
        );
        assert_eq!(
            render_body(&Body::Loading(LoadingVariant::Full)),
            format!("{}\n", messages::LOADING_AGENT)
        );
    }

    #[test]
    fn test_generate_markdown_report() {
        let result = AnalysisResult::Structured(sample_analysis());
        let record = ExportRecord::new("Apple", &result);

        let markdown = generate_markdown_report(&record);
        assert!(markdown.contains("# Finlab Report"));
        assert!(markdown.contains("- **Query:** Apple"));
        assert!(markdown.contains("- **Mode:** agent"));
        assert!(markdown.contains("# AAPL - Complete Analysis"));
    }

    #[test]
    fn test_generate_json_report() {
        let result = AnalysisResult::Simple("Flat quarter.".to_string());
        let record = ExportRecord::new("MSFT", &result);

        let json = generate_json_report(&record).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["query"], "MSFT");
        assert_eq!(value["mode"], "simple");
        assert_eq!(value["result"]["kind"], "simple");
        assert_eq!(value["result"]["data"], "Flat quarter.");
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn test_write_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");

        write_report("# Finlab Report\n", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Finlab Report\n");
    }
}
