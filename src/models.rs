//! Data models for the analysis client.
//!
//! This module contains the request mode, the result union, and the
//! structured multi-stream analysis returned by the agent endpoint.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Which kind of request a submission issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Single free-text question/answer.
    #[default]
    Simple,
    /// Structured fundamental/momentum/sentiment analysis.
    Agent,
}

impl Mode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            Mode::Simple => Mode::Agent,
            Mode::Agent => Mode::Simple,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Simple => write!(f, "simple"),
            Mode::Agent => write!(f, "agent"),
        }
    }
}

/// Final recommendation action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", from = "String")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl Action {
    /// Marker shown next to the action in rendered reports.
    pub fn emoji(&self) -> &'static str {
        match self {
            Action::Buy => "🟢",
            Action::Sell => "🔴",
            Action::Hold => "🟡",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "BUY"),
            Action::Sell => write!(f, "SELL"),
            Action::Hold => write!(f, "HOLD"),
        }
    }
}

impl From<&str> for Action {
    fn from(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Action::Buy,
            "SELL" => Action::Sell,
            "HOLD" => Action::Hold,
            other => {
                warn!("Unknown recommendation action '{}', displaying as HOLD", other);
                Action::Hold
            }
        }
    }
}

impl From<String> for Action {
    fn from(s: String) -> Self {
        Action::from(s.as_str())
    }
}

/// Answer returned by the simple-query endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleAnswer {
    pub answer: String,
}

/// Fundamental analysis stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalAnalysis {
    pub overall_investment_thesis: String,
    pub investment_grade: String,
    pub confidence_score: f64,
    #[serde(default)]
    pub key_strengths: Vec<String>,
    #[serde(default)]
    pub key_concerns: Vec<String>,
    pub recommendation: String,
}

/// Momentum analysis stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentumAnalysis {
    pub overall_momentum: String,
    pub momentum_strength: String,
    #[serde(default)]
    pub key_momentum_drivers: Vec<String>,
    #[serde(default)]
    pub momentum_risks: Vec<String>,
    pub short_term_outlook: String,
    /// Out of 10.
    pub momentum_score: f64,
}

/// Market sentiment stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    /// Out of 10.
    pub sentiment_score: f64,
    pub sentiment_direction: String,
    #[serde(default)]
    pub key_news_themes: Vec<String>,
    #[serde(default)]
    pub recent_catalysts: Vec<String>,
    pub market_outlook: String,
}

/// The combined recommendation across all streams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalRecommendation {
    pub action: Action,
    /// Fraction in [0, 1].
    pub confidence: f64,
    pub rationale: String,
    #[serde(default)]
    pub key_risks: Vec<String>,
    #[serde(default)]
    pub key_opportunities: Vec<String>,
    pub time_horizon: String,
}

impl FinalRecommendation {
    /// Confidence as a whole percentage, clamped to 0..=100.
    pub fn confidence_percent(&self) -> u32 {
        if self.confidence.is_nan() {
            return 0;
        }
        (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u32
    }
}

/// Structured result of the agent endpoint.
///
/// The backend does not send `execution_time`; the session stamps it with
/// the wall-clock time it observed between submission and response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentAnalysis {
    #[serde(default)]
    pub query: String,
    pub ticker: String,
    /// Seconds, measured client-side.
    #[serde(default)]
    pub execution_time: f64,
    pub fundamental_analysis: FundamentalAnalysis,
    pub momentum_analysis: MomentumAnalysis,
    pub sentiment_analysis: SentimentAnalysis,
    pub final_recommendation: FinalRecommendation,
}

/// Outcome of a successful request: exactly one of the two shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum AnalysisResult {
    /// Markdown answer from the simple endpoint.
    Simple(String),
    /// Multi-stream analysis from the agent endpoint.
    Structured(AgentAnalysis),
}

impl AnalysisResult {
    /// The mode that produces this kind of result.
    pub fn mode(&self) -> Mode {
        match self {
            AnalysisResult::Simple(_) => Mode::Simple,
            AnalysisResult::Structured(_) => Mode::Agent,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const AGENT_FIXTURE: &str = include_str!("../fixtures/agent_response.json");

    pub(crate) fn sample_analysis() -> AgentAnalysis {
        serde_json::from_str(AGENT_FIXTURE).unwrap()
    }

    #[test]
    fn test_parse_agent_fixture() {
        let analysis = sample_analysis();
        assert_eq!(analysis.ticker, "AAPL");
        assert_eq!(analysis.execution_time, 0.0);
        assert_eq!(analysis.final_recommendation.action, Action::Buy);
        assert_eq!(analysis.final_recommendation.key_risks.len(), 2);
        assert_eq!(analysis.momentum_analysis.momentum_score, 7.0);
        assert_eq!(analysis.sentiment_analysis.key_news_themes.len(), 2);
    }

    #[test]
    fn test_action_parsing() {
        assert_eq!(Action::from("BUY"), Action::Buy);
        assert_eq!(Action::from("sell"), Action::Sell);
        assert_eq!(Action::from(" Hold "), Action::Hold);
        assert_eq!(Action::from("STRONG BUY"), Action::Hold);
    }

    #[test]
    fn test_action_serializes_uppercase() {
        let json = serde_json::to_string(&Action::Sell).unwrap();
        assert_eq!(json, "\"SELL\"");

        let action: Action = serde_json::from_str("\"buy\"").unwrap();
        assert_eq!(action, Action::Buy);
    }

    #[test]
    fn test_confidence_percent() {
        let mut rec = sample_analysis().final_recommendation;

        rec.confidence = 0.85;
        assert_eq!(rec.confidence_percent(), 85);

        rec.confidence = 0.666;
        assert_eq!(rec.confidence_percent(), 67);

        rec.confidence = 1.7;
        assert_eq!(rec.confidence_percent(), 100);

        rec.confidence = f64::NAN;
        assert_eq!(rec.confidence_percent(), 0);
    }

    #[test]
    fn test_mode_toggle() {
        assert_eq!(Mode::Simple.toggled(), Mode::Agent);
        assert_eq!(Mode::Agent.toggled(), Mode::Simple);
        assert_eq!(Mode::default(), Mode::Simple);
    }

    #[test]
    fn test_result_tagging() {
        let result = AnalysisResult::Simple("Apple looks fine.".to_string());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["kind"], "simple");
        assert_eq!(json["data"], "Apple looks fine.");
        assert_eq!(result.mode(), Mode::Simple);

        let structured = AnalysisResult::Structured(sample_analysis());
        assert_eq!(structured.mode(), Mode::Agent);
    }
}
