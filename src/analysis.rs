//! Typed view over the upstream analysis payload.

use crate::error::ReportError;
use crate::extract::{self, *};
use crate::rating::ScoreGrade;
use serde_json::{Map, Value};

/// One of the seven upstream sub-analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKey {
    SourceCredibility,
    BiasDetector,
    FactChecker,
    AuthorAnalyzer,
    TransparencyAnalyzer,
    ManipulationDetector,
    ContentAnalyzer,
}

impl ServiceKey {
    /// Report order.
    pub const ALL: [ServiceKey; 7] = [
        ServiceKey::SourceCredibility,
        ServiceKey::BiasDetector,
        ServiceKey::FactChecker,
        ServiceKey::AuthorAnalyzer,
        ServiceKey::TransparencyAnalyzer,
        ServiceKey::ManipulationDetector,
        ServiceKey::ContentAnalyzer,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ServiceKey::SourceCredibility => "source_credibility",
            ServiceKey::BiasDetector => "bias_detector",
            ServiceKey::FactChecker => "fact_checker",
            ServiceKey::AuthorAnalyzer => "author_analyzer",
            ServiceKey::TransparencyAnalyzer => "transparency_analyzer",
            ServiceKey::ManipulationDetector => "manipulation_detector",
            ServiceKey::ContentAnalyzer => "content_analyzer",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|service| service.key() == key)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ServiceKey::SourceCredibility => "Source Credibility",
            ServiceKey::BiasDetector => "Bias Detection",
            ServiceKey::FactChecker => "Fact Checking",
            ServiceKey::AuthorAnalyzer => "Author Analysis",
            ServiceKey::TransparencyAnalyzer => "Transparency",
            ServiceKey::ManipulationDetector => "Manipulation Detection",
            ServiceKey::ContentAnalyzer => "Content Quality",
        }
    }

    /// Display-only share of the overall score, in percent. Sums to 100.
    pub fn weight(self) -> u8 {
        match self {
            ServiceKey::SourceCredibility => 25,
            ServiceKey::BiasDetector => 20,
            ServiceKey::FactChecker => 15,
            ServiceKey::AuthorAnalyzer => 15,
            ServiceKey::TransparencyAnalyzer => 10,
            ServiceKey::ManipulationDetector => 10,
            ServiceKey::ContentAnalyzer => 5,
        }
    }

    /// What the service measures, as a noun phrase.
    pub fn description(self) -> &'static str {
        match self {
            ServiceKey::SourceCredibility => "the publishing source's track record",
            ServiceKey::BiasDetector => "the article's balance and neutrality",
            ServiceKey::FactChecker => "the verifiability of the article's factual claims",
            ServiceKey::AuthorAnalyzer => "the author's credentials and history",
            ServiceKey::TransparencyAnalyzer => "how openly the article cites its sources",
            ServiceKey::ManipulationDetector => "resistance to emotional or manipulative framing",
            ServiceKey::ContentAnalyzer => "writing quality and structure",
        }
    }

    /// Generated sentence used whenever the payload has no usable narrative.
    pub fn fallback_sentence(self, score: u8) -> String {
        let adjective = ScoreGrade::for_score(score).adjective();
        let article = if adjective.starts_with(['a', 'e', 'i', 'o', 'u']) {
            "an"
        } else {
            "a"
        };
        format!(
            "{} scored {}/100, {} {} result for {}.",
            self.display_name(),
            score,
            article,
            adjective,
            self.description()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceScoreView {
    pub key: ServiceKey,
    pub display_name: &'static str,
    pub score: u8,
    pub weight: u8,
}

impl ServiceScoreView {
    pub fn grade(&self) -> ScoreGrade {
        ScoreGrade::for_score(self.score)
    }
}

/// A single finding, normalized from whatever shape the service used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    Text(String),
    Detail {
        text: String,
        severity: Option<String>,
    },
}

impl Finding {
    pub fn from_value(value: &Value) -> Option<Finding> {
        match value {
            Value::String(raw) => crate::sanitize::clean_text(raw).map(Finding::Text),
            Value::Object(_) => {
                let text = extract::extract_text(value, FINDING_TEXT_KEYS)?;
                let severity = extract::extract_text(value, SEVERITY_KEYS);
                Some(Finding::Detail { text, severity })
            }
            _ => None,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Finding::Text(text) => text,
            Finding::Detail { text, .. } => text,
        }
    }

    /// Text prefixed with a capitalized severity tag when one is known.
    pub fn display(&self) -> String {
        match self {
            Finding::Detail {
                text,
                severity: Some(severity),
            } => format!("[{}] {}", capitalize(severity), text),
            _ => self.text().to_string(),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The raw payload for one render. Accessors never fail; missing data comes
/// back as a fallback string, `None`, or a zero score.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    raw: Value,
}

impl AnalysisResult {
    pub const UNTITLED: &'static str = "Untitled Article";
    pub const UNKNOWN_SOURCE: &'static str = "Unknown Source";
    pub const UNKNOWN_AUTHOR: &'static str = "Unknown Author";

    pub fn from_value(raw: Value) -> Self {
        Self { raw }
    }

    pub fn from_json_str(text: &str) -> Result<Self, ReportError> {
        Ok(Self::from_value(serde_json::from_str(text)?))
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn trust_score(&self) -> u8 {
        extract::score_from_keys(&self.raw, TRUST_SCORE_KEYS).unwrap_or_else(|| {
            log::trace!("payload has no usable trust score");
            0
        })
    }

    pub fn title(&self) -> String {
        text_or(&self.raw, TITLE_KEYS, Self::UNTITLED)
    }

    pub fn source(&self) -> Option<String> {
        extract_text(&self.raw, SOURCE_KEYS)
            .or_else(|| self.service_text(ServiceKey::SourceCredibility, SOURCE_KEYS))
    }

    pub fn source_or_default(&self) -> String {
        self.source()
            .unwrap_or_else(|| Self::UNKNOWN_SOURCE.to_string())
    }

    pub fn author(&self) -> Option<String> {
        extract_text(&self.raw, AUTHOR_KEYS)
            .or_else(|| self.service_text(ServiceKey::AuthorAnalyzer, AUTHOR_KEYS))
    }

    pub fn author_or_default(&self) -> String {
        self.author()
            .unwrap_or_else(|| Self::UNKNOWN_AUTHOR.to_string())
    }

    pub fn word_count(&self) -> Option<u64> {
        extract_count(&self.raw, WORD_COUNT_KEYS)
    }

    pub fn summary(&self) -> Option<String> {
        extract_text(&self.raw, SUMMARY_KEYS)
    }

    pub fn analyzed_at(&self) -> Option<String> {
        extract_text(&self.raw, ANALYZED_AT_KEYS)
    }

    pub fn url(&self) -> Option<String> {
        extract_text(&self.raw, URL_KEYS)
    }

    fn detailed_analysis(&self) -> Option<&Map<String, Value>> {
        find_object(&self.raw, DETAILED_ANALYSIS_KEYS)
    }

    /// Raw result object for `service`, if the payload carries one.
    pub fn service(&self, service: ServiceKey) -> Option<&Value> {
        let found = self
            .detailed_analysis()
            .and_then(|services| services.get(service.key()))
            .filter(|value| value.is_object());
        if found.is_none() {
            log::trace!("service {} missing from payload", service.key());
        }
        found
    }

    pub fn service_score(&self, service: ServiceKey) -> u8 {
        self.service(service).map(extract_score).unwrap_or(0)
    }

    pub fn service_text(&self, service: ServiceKey, keys: &[&str]) -> Option<String> {
        self.service(service)
            .and_then(|value| extract_text(value, keys))
    }

    /// Narrative for `service`, or the generated fallback sentence.
    pub fn service_narrative(&self, service: ServiceKey) -> String {
        self.service_text(service, NARRATIVE_KEYS)
            .unwrap_or_else(|| service.fallback_sentence(self.service_score(service)))
    }

    pub fn service_interpretation(&self, service: ServiceKey) -> Option<String> {
        self.service_text(service, INTERPRETATION_KEYS)
    }

    pub fn findings(&self, service: ServiceKey) -> Vec<Finding> {
        self.service(service)
            .and_then(|value| find_array(value, FINDING_KEYS))
            .map(|items| items.iter().filter_map(Finding::from_value).collect())
            .unwrap_or_default()
    }

    /// All seven services in report order; absent ones score 0.
    pub fn service_views(&self) -> Vec<ServiceScoreView> {
        ServiceKey::ALL
            .into_iter()
            .map(|key| ServiceScoreView {
                key,
                display_name: key.display_name(),
                score: self.service_score(key),
                weight: key.weight(),
            })
            .collect()
    }
}
