//! Score bands. Every label or color derived from a 0–100 score goes
//! through this module so the cover, tables and findings never disagree.

use crate::types::Color;

const BAND_HIGH: u8 = 80;
const BAND_GOOD: u8 = 60;
const BAND_MIXED: u8 = 40;

const TONE_GOOD: u8 = 70;
const TONE_WARNING: u8 = 40;

/// Overall credibility rating for the trust score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustRating {
    HighlyTrustworthy,
    GenerallyReliable,
    ExerciseCaution,
    LowCredibility,
}

impl TrustRating {
    pub fn for_score(score: u8) -> Self {
        match score {
            s if s >= BAND_HIGH => TrustRating::HighlyTrustworthy,
            s if s >= BAND_GOOD => TrustRating::GenerallyReliable,
            s if s >= BAND_MIXED => TrustRating::ExerciseCaution,
            _ => TrustRating::LowCredibility,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrustRating::HighlyTrustworthy => "Highly Trustworthy",
            TrustRating::GenerallyReliable => "Generally Reliable",
            TrustRating::ExerciseCaution => "Exercise Caution",
            TrustRating::LowCredibility => "Low Credibility",
        }
    }

    pub fn verdict(self) -> &'static str {
        match self {
            TrustRating::HighlyTrustworthy => {
                "This article shows strong indicators of credibility. The source, \
                 author and factual claims held up well across the analysis."
            }
            TrustRating::GenerallyReliable => {
                "This article is generally reliable. Most credibility indicators are \
                 positive, though some areas deserve a closer look."
            }
            TrustRating::ExerciseCaution => {
                "This article shows mixed credibility signals. Verify key claims with \
                 independent sources before relying on them."
            }
            TrustRating::LowCredibility => {
                "This article shows significant credibility concerns. Treat its claims \
                 with skepticism and consult established sources."
            }
        }
    }
}

/// Per-service grade on the same cutoffs as [`TrustRating`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreGrade {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreGrade {
    pub fn for_score(score: u8) -> Self {
        match TrustRating::for_score(score) {
            TrustRating::HighlyTrustworthy => ScoreGrade::Excellent,
            TrustRating::GenerallyReliable => ScoreGrade::Good,
            TrustRating::ExerciseCaution => ScoreGrade::Fair,
            TrustRating::LowCredibility => ScoreGrade::Poor,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreGrade::Excellent => "Excellent",
            ScoreGrade::Good => "Good",
            ScoreGrade::Fair => "Fair",
            ScoreGrade::Poor => "Poor",
        }
    }

    /// Lowercase adjective for generated sentences.
    pub fn adjective(self) -> &'static str {
        match self {
            ScoreGrade::Excellent => "excellent",
            ScoreGrade::Good => "good",
            ScoreGrade::Fair => "fair",
            ScoreGrade::Poor => "poor",
        }
    }
}

/// Visual tone for score bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTone {
    Good,
    Warning,
    Danger,
}

impl ScoreTone {
    pub fn for_ratio(score: f64, max_score: f64) -> Self {
        let percent = if max_score > 0.0 {
            (score * 100.0 / max_score).clamp(0.0, 100.0)
        } else {
            0.0
        };
        if percent >= TONE_GOOD as f64 {
            ScoreTone::Good
        } else if percent >= TONE_WARNING as f64 {
            ScoreTone::Warning
        } else {
            ScoreTone::Danger
        }
    }

    pub fn color(self) -> Color {
        match self {
            ScoreTone::Good => Color::from_rgb8(16, 185, 129),
            ScoreTone::Warning => Color::from_rgb8(245, 158, 11),
            ScoreTone::Danger => Color::from_rgb8(239, 68, 68),
        }
    }
}
