//! Acquisition score: a weighted composite of module scores.

use super::module::AnalysisModule;
use super::prompts::{originality_prompt, system_prompt, ORIGINALITY_SYSTEM};
use super::types::{lenient, ModuleReport};
use crate::gateway::AiClient;
use crate::text::head;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Score assumed for any component with no input.
pub const NEUTRAL_SCORE: f64 = 50.0;

const ORIGINALITY_EXCERPT_CHARS: usize = 20_000;
const ORIGINALITY_MAX_TOKENS: u32 = 500;

/// Component weights. Defaults sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub structural_integrity: f64,
    pub voice_distinctiveness: f64,
    pub pacing_quality: f64,
    pub prose_craft: f64,
    pub narrative_originality: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            structural_integrity: 0.25,
            voice_distinctiveness: 0.20,
            pacing_quality: 0.20,
            prose_craft: 0.20,
            narrative_originality: 0.15,
        }
    }
}

impl ScoreWeights {
    fn as_array(&self) -> [f64; 5] {
        [
            self.structural_integrity,
            self.voice_distinctiveness,
            self.pacing_quality,
            self.prose_craft,
            self.narrative_originality,
        ]
    }

    /// Weights must be in [0, 1] and sum to 1 (within 0.01).
    pub fn validate(&self) -> Result<(), String> {
        let weights = self.as_array();
        if let Some(w) = weights.iter().find(|w| !(0.0..=1.0).contains(*w)) {
            return Err(format!("weight {} is outside [0, 1]", w));
        }
        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > 0.01 {
            return Err(format!("weights sum to {:.3}, expected 1.0", sum));
        }
        Ok(())
    }
}

/// Component scores feeding the composite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub structural_integrity: f64,
    pub voice_distinctiveness: f64,
    pub pacing_quality: f64,
    pub prose_craft: f64,
    pub narrative_originality: f64,
}

impl ComponentScores {
    /// Read components from completed reports; missing ones are neutral.
    pub fn from_reports(
        reports: &BTreeMap<AnalysisModule, ModuleReport>,
        originality: Option<f64>,
    ) -> Self {
        let mut scores = Self {
            structural_integrity: NEUTRAL_SCORE,
            voice_distinctiveness: NEUTRAL_SCORE,
            pacing_quality: NEUTRAL_SCORE,
            prose_craft: NEUTRAL_SCORE,
            narrative_originality: originality.unwrap_or(NEUTRAL_SCORE),
        };
        for report in reports.values() {
            match report {
                ModuleReport::IntelligenceEngine(r) => {
                    scores.structural_integrity = r.health_scores.structure
                }
                ModuleReport::VoiceIsolation(r) => scores.voice_distinctiveness = r.voice_score,
                ModuleReport::PacingArchitect(r) => scores.pacing_quality = r.pacing_score,
                ModuleReport::ProseRefinery(r) => scores.prose_craft = r.prose_score,
                _ => {}
            }
        }
        scores
    }

    fn as_array(&self) -> [f64; 5] {
        [
            self.structural_integrity,
            self.voice_distinctiveness,
            self.pacing_quality,
            self.prose_craft,
            self.narrative_originality,
        ]
    }
}

const COMPONENT_NAMES: [&str; 5] = [
    "structural_integrity",
    "voice_distinctiveness",
    "pacing_quality",
    "prose_craft",
    "narrative_originality",
];

/// Acquisition recommendation band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    #[serde(rename = "Strong Consider")]
    StrongConsider,
    Consider,
    Maybe,
    Pass,
}

impl Tier {
    pub fn for_score(score: u32) -> Self {
        match score {
            80.. => Self::StrongConsider,
            60..=79 => Self::Consider,
            40..=59 => Self::Maybe,
            _ => Self::Pass,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::StrongConsider => "Strong Consider",
            Self::Consider => "Consider",
            Self::Maybe => "Maybe",
            Self::Pass => "Pass",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::StrongConsider => "green",
            Self::Consider => "blue",
            Self::Maybe => "amber",
            Self::Pass => "red",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentBreakdown {
    pub component: String,
    pub score: f64,
    pub weight: f64,
    /// `score * weight`, one decimal place.
    pub weighted_contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionScore {
    /// Composite, 0–100.
    pub acquisition_score: u32,
    pub tier: Tier,
    pub tier_color: String,
    pub component_scores: ComponentScores,
    pub weights: ScoreWeights,
    pub breakdown: Vec<ComponentBreakdown>,
}

/// Weighted composite, clamped to [0, 100] and rounded.
pub fn compute_acquisition_score(
    components: ComponentScores,
    weights: &ScoreWeights,
) -> AcquisitionScore {
    let scores = components.as_array();
    let weight_values = weights.as_array();

    let composite: f64 = scores.iter().zip(weight_values).map(|(s, w)| s * w).sum();
    let acquisition_score = composite.clamp(0.0, 100.0).round() as u32;
    let tier = Tier::for_score(acquisition_score);

    let breakdown = COMPONENT_NAMES
        .iter()
        .zip(scores.iter().zip(weight_values))
        .map(|(name, (&score, weight))| ComponentBreakdown {
            component: name.to_string(),
            score,
            weight,
            weighted_contribution: (score * weight * 10.0).round() / 10.0,
        })
        .collect();

    AcquisitionScore {
        acquisition_score,
        tier,
        tier_color: tier.color().to_string(),
        component_scores: components,
        weights: weights.clone(),
        breakdown,
    }
}

/// Ask the model for an originality rating.
///
/// Any failure (transport, timeout, unparseable reply, missing field)
/// yields the neutral score.
pub async fn assess_originality(client: &dyn AiClient, raw_text: &str, timeout: Duration) -> f64 {
    let prompt = originality_prompt(head(raw_text, ORIGINALITY_EXCERPT_CHARS));
    let system = system_prompt(ORIGINALITY_SYSTEM);
    let call = client.analyze_json(&system, &prompt, Some(ORIGINALITY_MAX_TOKENS));

    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => match value.get("originality_score").and_then(lenient::as_number) {
            Some(score) => {
                debug!(score, "Originality assessed");
                score.clamp(0.0, 100.0)
            }
            None => {
                warn!("Originality reply had no score; using neutral");
                NEUTRAL_SCORE
            }
        },
        Ok(Err(e)) => {
            warn!(error = %e, "Originality assessment failed; using neutral");
            NEUTRAL_SCORE
        }
        Err(_) => {
            warn!(timeout_secs = timeout.as_secs(), "Originality assessment timed out; using neutral");
            NEUTRAL_SCORE
        }
    }
}
