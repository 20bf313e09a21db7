//! Typed module reports.
//!
//! Each AI-backed module asks for a JSON object with a fixed schema; the
//! reply is parsed into the matching report struct here. Fields that feed
//! the revision queue or the acquisition score are typed. Display-only
//! sections stay as `serde_json::Value` so schema drift in them never fails
//! a run. Every field defaults, so a sparse reply still parses.

use super::merger::EditQueue;
use super::module::AnalysisModule;
use super::score::AcquisitionScore;
use crate::model::label_enum;
use crate::stats::{CitationStats, DialogueStats, ManuscriptStats, PassiveVoiceStats, ProseStats};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Finding severity. Orders high < medium < low so a sort puts high first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    #[default]
    Medium,
    Low,
}

label_enum!(Severity, "severity", {
    High => "high",
    Medium => "medium",
    Low => "low",
});

impl Severity {
    /// Parse model output; anything unrecognized is medium.
    pub fn lenient(s: &str) -> Self {
        Self::from_str(s).unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|s| Severity::lenient(&s)).unwrap_or_default())
    }
}

/// Lenient field parsers for model output.
pub(crate) mod lenient {
    use super::Severity;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// A number, or a string containing one; anything else is 0.
    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(as_number(&value).unwrap_or(0.0))
    }

    /// A chapter number given as `3`, `"3"` or `"Chapter 3"`.
    pub fn chapter<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s
                .split(|c: char| !c.is_ascii_digit())
                .find(|part| !part.is_empty())
                .and_then(|digits| digits.parse().ok()),
            _ => None,
        })
    }

    /// A severity that may be absent; present-but-unknown is medium.
    pub fn severity<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Severity>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|s| Severity::lenient(&s)))
    }

    /// A string that may arrive as null or a non-string scalar.
    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    /// A count given as `3`, `3.0` or `"3"`; negatives and junk are 0.
    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(as_number(&value)
            .filter(|n| n.is_finite() && *n > 0.0)
            .map(|n| n.round().min(f64::from(u32::MAX)) as u32)
            .unwrap_or(0))
    }

    /// A boolean given as `true`, `"yes"`, `"true"` or a non-zero number.
    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
            Value::String(s) => matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "true" | "yes" | "y" | "1"
            ),
            _ => false,
        })
    }

    /// A list of strings; a single string becomes a one-element list and
    /// non-string entries are rendered as text.
    pub fn strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect(),
            Value::String(s) if !s.is_empty() => vec![s],
            _ => Vec::new(),
        })
    }

    /// An optional string; null and empty are `None`.
    pub fn opt_text<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s),
            Value::Null => None,
            other => Some(other.to_string()),
        })
    }

    pub(crate) fn as_number(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().trim_end_matches('%').parse().ok(),
            _ => None,
        }
    }
}

/// Render an optional chapter number for a queue entry.
pub(crate) fn chapter_label(chapter: Option<u32>) -> String {
    match chapter {
        Some(n) => format!("Chapter {}", n),
        None => "Chapter ?".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Intelligence engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthScores {
    #[serde(deserialize_with = "lenient::number")]
    pub structure: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub voice_consistency: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub pacing: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub character_development: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub prose_clarity: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub overall: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicationItem {
    #[serde(rename = "type", deserialize_with = "lenient::text")]
    pub kind: String,
    #[serde(deserialize_with = "lenient::text")]
    pub location_a: String,
    #[serde(deserialize_with = "lenient::text")]
    pub location_b: String,
    #[serde(deserialize_with = "lenient::number")]
    pub similarity_percent: f64,
    #[serde(deserialize_with = "lenient::text")]
    pub excerpt: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicationDetection {
    #[serde(deserialize_with = "lenient::count")]
    pub duplicates_found: u32,
    pub items: Vec<DuplicationItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineAnomaly {
    #[serde(deserialize_with = "lenient::text")]
    pub location: String,
    #[serde(deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(deserialize_with = "lenient::severity")]
    pub severity: Option<Severity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineAnomalies {
    #[serde(deserialize_with = "lenient::count")]
    pub anomalies_found: u32,
    pub items: Vec<TimelineAnomaly>,
}

/// Full-manuscript structural scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntelligenceReport {
    pub health_scores: HealthScores,
    pub duplication_detection: DuplicationDetection,
    pub character_census: Value,
    pub timeline_anomalies: TimelineAnomalies,
    pub lexical_fingerprint: Value,
    pub metaphor_density: Value,
    #[serde(deserialize_with = "lenient::text")]
    pub summary: String,
    pub local_stats: Option<ManuscriptStats>,
}

// ---------------------------------------------------------------------------
// Voice isolation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JargonBleed {
    #[serde(deserialize_with = "lenient::chapter")]
    pub chapter: Option<u32>,
    #[serde(deserialize_with = "lenient::text")]
    pub passage: String,
    #[serde(deserialize_with = "lenient::text")]
    pub jargon_type: String,
    #[serde(deserialize_with = "lenient::text")]
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceCharacter {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::count")]
    pub dialogue_count: u32,
    pub voice_fingerprint: Value,
    pub jargon_bleed: Vec<JargonBleed>,
    #[serde(deserialize_with = "lenient::strings")]
    pub sample_dialogue: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityPair {
    #[serde(deserialize_with = "lenient::text")]
    pub character_a: String,
    #[serde(deserialize_with = "lenient::text")]
    pub character_b: String,
    #[serde(deserialize_with = "lenient::number")]
    pub similarity_score: f64,
    #[serde(deserialize_with = "lenient::strings")]
    pub similar_traits: Vec<String>,
    #[serde(deserialize_with = "lenient::flag")]
    pub flagged: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceReport {
    #[serde(deserialize_with = "lenient::number")]
    pub voice_score: f64,
    pub characters: Vec<VoiceCharacter>,
    pub similarity_matrix: Vec<SimilarityPair>,
    #[serde(deserialize_with = "lenient::count")]
    pub jargon_bleed_total: u32,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub most_distinctive_character: Option<String>,
    #[serde(deserialize_with = "lenient::opt_text")]
    pub least_distinctive_character: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub summary: String,
    pub local_stats: Option<DialogueStats>,
}

// ---------------------------------------------------------------------------
// Pacing architect
// ---------------------------------------------------------------------------

/// A run of chapters flagged for too much or too little tension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingFlag {
    #[serde(deserialize_with = "lenient::chapter")]
    pub start_chapter: Option<u32>,
    #[serde(deserialize_with = "lenient::chapter")]
    pub end_chapter: Option<u32>,
    #[serde(deserialize_with = "lenient::count")]
    pub consecutive_count: u32,
    #[serde(deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(deserialize_with = "lenient::text")]
    pub suggestion: String,
}

impl PacingFlag {
    pub(crate) fn range_label(&self) -> String {
        let fmt = |c: Option<u32>| c.map(|n| n.to_string()).unwrap_or_else(|| "?".into());
        format!("Chapters {}-{}", fmt(self.start_chapter), fmt(self.end_chapter))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingReport {
    #[serde(deserialize_with = "lenient::number")]
    pub pacing_score: f64,
    pub chapter_beats: Vec<Value>,
    pub tension_curve: Value,
    pub breathing_space_flags: Vec<PacingFlag>,
    pub slow_zone_flags: Vec<PacingFlag>,
    pub act_structure: Value,
    #[serde(deserialize_with = "lenient::text")]
    pub summary: String,
}

// ---------------------------------------------------------------------------
// Character arc
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcInconsistency {
    #[serde(deserialize_with = "lenient::chapter")]
    pub chapter: Option<u32>,
    #[serde(deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(deserialize_with = "lenient::text")]
    pub expected_behavior: String,
    #[serde(deserialize_with = "lenient::text")]
    pub actual_behavior: String,
    #[serde(deserialize_with = "lenient::severity")]
    pub severity: Option<Severity>,
    #[serde(deserialize_with = "lenient::flag")]
    pub justified: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcCharacter {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub role: String,
    #[serde(deserialize_with = "lenient::text")]
    pub arc_type: String,
    #[serde(deserialize_with = "lenient::text")]
    pub want: String,
    #[serde(deserialize_with = "lenient::text")]
    pub fear: String,
    #[serde(deserialize_with = "lenient::text")]
    pub belief: String,
    #[serde(deserialize_with = "lenient::text")]
    pub arc_summary: String,
    pub chapter_tracking: Vec<Value>,
    pub inconsistencies: Vec<ArcInconsistency>,
    pub transformation_validation: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterArcReport {
    #[serde(deserialize_with = "lenient::number")]
    pub character_score: f64,
    pub characters: Vec<ArcCharacter>,
    pub relationship_dynamics: Vec<Value>,
    #[serde(deserialize_with = "lenient::text")]
    pub summary: String,
}

// ---------------------------------------------------------------------------
// Prose refinery
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicItem {
    #[serde(deserialize_with = "lenient::text")]
    pub word_or_phrase: String,
    #[serde(deserialize_with = "lenient::count")]
    pub total_count: u32,
    #[serde(deserialize_with = "lenient::number")]
    pub avg_per_chapter: f64,
    pub worst_chapters: Vec<Value>,
    #[serde(deserialize_with = "lenient::severity")]
    pub severity: Option<Severity>,
    #[serde(deserialize_with = "lenient::text")]
    pub suggestion: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicTracker {
    #[serde(deserialize_with = "lenient::count")]
    pub tics_found: u32,
    pub items: Vec<TicItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TellPassage {
    #[serde(deserialize_with = "lenient::text")]
    pub location: String,
    #[serde(deserialize_with = "lenient::text")]
    pub original: String,
    #[serde(deserialize_with = "lenient::text")]
    pub issue: String,
    #[serde(deserialize_with = "lenient::text")]
    pub suggestion: String,
    #[serde(deserialize_with = "lenient::severity")]
    pub severity: Option<Severity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowVsTell {
    #[serde(deserialize_with = "lenient::count")]
    pub tell_passages_found: u32,
    pub items: Vec<TellPassage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProseReport {
    #[serde(deserialize_with = "lenient::number")]
    pub prose_score: f64,
    pub tic_tracker: TicTracker,
    pub filter_words: Value,
    pub show_vs_tell: ShowVsTell,
    pub sentence_rhythm: Value,
    pub metaphor_frequency: Value,
    #[serde(deserialize_with = "lenient::text")]
    pub summary: String,
    pub local_stats: Option<ProseStats>,
}

// ---------------------------------------------------------------------------
// Argument coherence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StallPoint {
    #[serde(deserialize_with = "lenient::chapter")]
    pub chapter: Option<u32>,
    #[serde(deserialize_with = "lenient::text")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContradictionPoint {
    #[serde(deserialize_with = "lenient::chapter")]
    pub chapter_a: Option<u32>,
    #[serde(deserialize_with = "lenient::chapter")]
    pub chapter_b: Option<u32>,
    #[serde(deserialize_with = "lenient::text")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogicalProgression {
    #[serde(deserialize_with = "lenient::number")]
    pub overall_flow_score: f64,
    pub chapter_connections: Vec<Value>,
    pub stall_points: Vec<StallPoint>,
    pub contradiction_points: Vec<ContradictionPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Counterargument {
    #[serde(deserialize_with = "lenient::text")]
    pub counterargument: String,
    #[serde(deserialize_with = "lenient::chapter")]
    pub chapter: Option<u32>,
    #[serde(deserialize_with = "lenient::text")]
    pub how_addressed: String,
    #[serde(deserialize_with = "lenient::text")]
    pub adequacy: String,
    #[serde(deserialize_with = "lenient::text")]
    pub suggestion: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArgumentReport {
    #[serde(deserialize_with = "lenient::number")]
    pub coherence_score: f64,
    pub thesis_statement: Value,
    pub evidence_to_claim_ratio: Value,
    pub logical_progression: LogicalProgression,
    pub counterargument_coverage: Vec<Counterargument>,
    pub chapter_coherence_scores: Vec<Value>,
    #[serde(deserialize_with = "lenient::text")]
    pub summary: String,
}

// ---------------------------------------------------------------------------
// Citation architecture
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CitationGap {
    #[serde(deserialize_with = "lenient::chapter")]
    pub chapter: Option<u32>,
    #[serde(deserialize_with = "lenient::text")]
    pub claim: String,
    #[serde(deserialize_with = "lenient::text")]
    pub location: String,
    #[serde(deserialize_with = "lenient::number")]
    pub confidence: f64,
    #[serde(deserialize_with = "lenient::text")]
    pub suggested_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatError {
    #[serde(deserialize_with = "lenient::chapter")]
    pub chapter: Option<u32>,
    #[serde(deserialize_with = "lenient::text")]
    pub citation_text: String,
    #[serde(deserialize_with = "lenient::text")]
    pub issue: String,
    #[serde(deserialize_with = "lenient::text")]
    pub correction: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatValidation {
    #[serde(deserialize_with = "lenient::text")]
    pub format: String,
    #[serde(deserialize_with = "lenient::count")]
    pub errors_found: u32,
    pub errors: Vec<FormatError>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CitationReport {
    #[serde(deserialize_with = "lenient::number")]
    pub citation_score: f64,
    pub citation_frequency_heatmap: Value,
    pub citation_gaps: Vec<CitationGap>,
    pub source_recency: Value,
    pub primary_secondary_balance: Value,
    pub format_validation: FormatValidation,
    #[serde(deserialize_with = "lenient::text")]
    pub summary: String,
    pub local_stats: Option<CitationStats>,
}

// ---------------------------------------------------------------------------
// Academic voice
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HedgePassage {
    #[serde(deserialize_with = "lenient::chapter")]
    pub chapter: Option<u32>,
    #[serde(deserialize_with = "lenient::text")]
    pub passage: String,
    #[serde(deserialize_with = "lenient::strings")]
    pub hedge_words: Vec<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub issue: String,
    #[serde(deserialize_with = "lenient::text")]
    pub suggestion: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HedgeAnalysis {
    pub over_hedged: Vec<HedgePassage>,
    pub under_hedged: Vec<HedgePassage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcademicVoiceReport {
    #[serde(deserialize_with = "lenient::number")]
    pub voice_score: f64,
    pub sub_scores: Value,
    pub register_consistency: Value,
    pub hedge_analysis: HedgeAnalysis,
    pub passive_voice: Value,
    #[serde(deserialize_with = "lenient::text")]
    pub summary: String,
    pub local_stats: Option<PassiveVoiceStats>,
}

// ---------------------------------------------------------------------------
// Module report sum type
// ---------------------------------------------------------------------------

/// The report of one completed module run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "module", content = "data", rename_all = "snake_case")]
pub enum ModuleReport {
    IntelligenceEngine(IntelligenceReport),
    VoiceIsolation(VoiceReport),
    PacingArchitect(PacingReport),
    CharacterArc(CharacterArcReport),
    ProseRefinery(ProseReport),
    RevisionCenter(EditQueue),
    ArgumentCoherence(ArgumentReport),
    CitationArchitecture(CitationReport),
    AcademicVoice(AcademicVoiceReport),
    AcquisitionScore(AcquisitionScore),
}

impl ModuleReport {
    /// Parse a model reply for an AI-backed module.
    pub fn from_json(module: AnalysisModule, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match module {
            AnalysisModule::IntelligenceEngine => {
                Self::IntelligenceEngine(serde_json::from_value(value)?)
            }
            AnalysisModule::VoiceIsolation => Self::VoiceIsolation(serde_json::from_value(value)?),
            AnalysisModule::PacingArchitect => {
                Self::PacingArchitect(serde_json::from_value(value)?)
            }
            AnalysisModule::CharacterArc => Self::CharacterArc(serde_json::from_value(value)?),
            AnalysisModule::ProseRefinery => Self::ProseRefinery(serde_json::from_value(value)?),
            AnalysisModule::RevisionCenter => Self::RevisionCenter(serde_json::from_value(value)?),
            AnalysisModule::ArgumentCoherence => {
                Self::ArgumentCoherence(serde_json::from_value(value)?)
            }
            AnalysisModule::CitationArchitecture => {
                Self::CitationArchitecture(serde_json::from_value(value)?)
            }
            AnalysisModule::AcademicVoice => Self::AcademicVoice(serde_json::from_value(value)?),
            AnalysisModule::AcquisitionScore => {
                Self::AcquisitionScore(serde_json::from_value(value)?)
            }
        })
    }

    pub fn module(&self) -> AnalysisModule {
        match self {
            Self::IntelligenceEngine(_) => AnalysisModule::IntelligenceEngine,
            Self::VoiceIsolation(_) => AnalysisModule::VoiceIsolation,
            Self::PacingArchitect(_) => AnalysisModule::PacingArchitect,
            Self::CharacterArc(_) => AnalysisModule::CharacterArc,
            Self::ProseRefinery(_) => AnalysisModule::ProseRefinery,
            Self::RevisionCenter(_) => AnalysisModule::RevisionCenter,
            Self::ArgumentCoherence(_) => AnalysisModule::ArgumentCoherence,
            Self::CitationArchitecture(_) => AnalysisModule::CitationArchitecture,
            Self::AcademicVoice(_) => AnalysisModule::AcademicVoice,
            Self::AcquisitionScore(_) => AnalysisModule::AcquisitionScore,
        }
    }

    /// Score columns copied onto the result row.
    pub fn scores(&self) -> ModuleScores {
        let mut scores = ModuleScores::default();
        match self {
            Self::IntelligenceEngine(r) => {
                let h = &r.health_scores;
                scores.structure = Some(h.structure);
                scores.voice = Some(h.voice_consistency);
                scores.pacing = Some(h.pacing);
                scores.character = Some(h.character_development);
                scores.prose = Some(h.prose_clarity);
                scores.overall = Some(h.overall);
            }
            Self::VoiceIsolation(r) => scores.voice = Some(r.voice_score),
            Self::PacingArchitect(r) => scores.pacing = Some(r.pacing_score),
            Self::CharacterArc(r) => scores.character = Some(r.character_score),
            Self::ProseRefinery(r) => scores.prose = Some(r.prose_score),
            Self::RevisionCenter(_) => {}
            Self::ArgumentCoherence(r) => scores.overall = Some(r.coherence_score),
            Self::CitationArchitecture(r) => scores.overall = Some(r.citation_score),
            Self::AcademicVoice(r) => {
                scores.voice = Some(r.voice_score);
                scores.overall = Some(r.voice_score);
            }
            Self::AcquisitionScore(r) => scores.overall = Some(f64::from(r.acquisition_score)),
        }
        scores
    }

    /// Short prose summary, where the module produces one.
    pub fn summary(&self) -> Option<&str> {
        let text = match self {
            Self::IntelligenceEngine(r) => &r.summary,
            Self::VoiceIsolation(r) => &r.summary,
            Self::PacingArchitect(r) => &r.summary,
            Self::CharacterArc(r) => &r.summary,
            Self::ProseRefinery(r) => &r.summary,
            Self::ArgumentCoherence(r) => &r.summary,
            Self::CitationArchitecture(r) => &r.summary,
            Self::AcademicVoice(r) => &r.summary,
            Self::RevisionCenter(_) | Self::AcquisitionScore(_) => return None,
        };
        (!text.is_empty()).then_some(text.as_str())
    }
}

/// 0–100 scores stored on a result row; which are set depends on the module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleScores {
    pub structure: Option<f64>,
    pub voice: Option<f64>,
    pub pacing: Option<f64>,
    pub character: Option<f64>,
    pub prose: Option<f64>,
    pub overall: Option<f64>,
}

impl fmt::Display for ModuleScores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [
            ("structure", self.structure),
            ("voice", self.voice),
            ("pacing", self.pacing),
            ("character", self.character),
            ("prose", self.prose),
            ("overall", self.overall),
        ];
        let parts: Vec<String> = fields
            .iter()
            .filter_map(|(name, v)| v.map(|v| format!("{}={:.0}", name, v)))
            .collect();
        if parts.is_empty() {
            f.write_str("-")
        } else {
            f.write_str(&parts.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn severity_orders_high_first_and_parses_leniently() {
        let mut v = vec![Severity::Low, Severity::High, Severity::Medium];
        v.sort();
        assert_eq!(v, vec![Severity::High, Severity::Medium, Severity::Low]);
        assert_eq!(Severity::lenient("HIGH"), Severity::High);
        assert_eq!(Severity::lenient("critical"), Severity::Medium);
        assert!("critical".parse::<Severity>().is_err());
    }

    #[test]
    fn sparse_intelligence_reply_parses() {
        let report = ModuleReport::from_json(
            AnalysisModule::IntelligenceEngine,
            json!({
                "health_scores": {"structure": 72, "overall": "81"},
                "timeline_anomalies": {"items": [{"location": "Chapter 4", "description": "Two Tuesdays"}]},
                "summary": null
            }),
        )
        .unwrap();

        let ModuleReport::IntelligenceEngine(r) = &report else {
            panic!("wrong variant");
        };
        assert_eq!(r.health_scores.structure, 72.0);
        assert_eq!(r.health_scores.overall, 81.0);
        assert_eq!(r.timeline_anomalies.items[0].severity, None);
        assert!(r.summary.is_empty());
        assert!(report.summary().is_none());
    }

    #[test]
    fn chapter_references_accept_several_shapes() {
        let flag: PacingFlag = serde_json::from_value(json!({
            "start_chapter": "Chapter 3",
            "end_chapter": 5,
            "consecutive_count": 3
        }))
        .unwrap();
        assert_eq!(flag.start_chapter, Some(3));
        assert_eq!(flag.end_chapter, Some(5));
        assert_eq!(flag.range_label(), "Chapters 3-5");

        let gap: CitationGap = serde_json::from_value(json!({"chapter": null})).unwrap();
        assert_eq!(gap.chapter, None);
    }

    #[test]
    fn counts_flags_and_lists_tolerate_loose_types() {
        let report = ModuleReport::from_json(
            AnalysisModule::ProseRefinery,
            json!({
                "tic_tracker": {
                    "tics_found": "3",
                    "items": [{"word_or_phrase": "just", "total_count": 12.0, "severity": "high"}]
                },
                "show_vs_tell": {"tell_passages_found": 2.4, "items": []}
            }),
        )
        .unwrap();
        let ModuleReport::ProseRefinery(prose) = report else {
            panic!("wrong variant");
        };
        assert_eq!(prose.tic_tracker.tics_found, 3);
        assert_eq!(prose.tic_tracker.items[0].total_count, 12);
        assert_eq!(prose.show_vs_tell.tell_passages_found, 2);

        let voice: VoiceReport = serde_json::from_value(json!({
            "jargon_bleed_total": "-1",
            "most_distinctive_character": "",
            "characters": [{"name": "Ada", "dialogue_count": "14", "sample_dialogue": "Hello there."}],
            "similarity_matrix": [{"similar_traits": ["terse", 2], "flagged": "yes"}]
        }))
        .unwrap();
        assert_eq!(voice.jargon_bleed_total, 0);
        assert_eq!(voice.most_distinctive_character, None);
        assert_eq!(voice.characters[0].dialogue_count, 14);
        assert_eq!(voice.characters[0].sample_dialogue, vec!["Hello there."]);
        assert_eq!(voice.similarity_matrix[0].similar_traits, vec!["terse", "2"]);
        assert!(voice.similarity_matrix[0].flagged);

        let arc: ArcInconsistency =
            serde_json::from_value(json!({"justified": 0, "severity": "low"})).unwrap();
        assert!(!arc.justified);
        let hedge: HedgePassage = serde_json::from_value(json!({"hedge_words": null})).unwrap();
        assert!(hedge.hedge_words.is_empty());
    }

    #[test]
    fn scores_follow_module_mapping() {
        let intel = ModuleReport::IntelligenceEngine(IntelligenceReport {
            health_scores: HealthScores {
                structure: 70.0,
                voice_consistency: 65.0,
                pacing: 60.0,
                character_development: 55.0,
                prose_clarity: 50.0,
                overall: 62.0,
            },
            ..Default::default()
        });
        let s = intel.scores();
        assert_eq!(s.structure, Some(70.0));
        assert_eq!(s.voice, Some(65.0));
        assert_eq!(s.character, Some(55.0));
        assert_eq!(s.overall, Some(62.0));

        let academic = ModuleReport::AcademicVoice(AcademicVoiceReport {
            voice_score: 77.0,
            ..Default::default()
        });
        let s = academic.scores();
        assert_eq!((s.voice, s.overall, s.prose), (Some(77.0), Some(77.0), None));

        let citation = ModuleReport::CitationArchitecture(CitationReport {
            citation_score: 58.0,
            ..Default::default()
        });
        assert_eq!(citation.scores().overall, Some(58.0));
        assert_eq!(citation.scores().to_string(), "overall=58");
    }

    #[test]
    fn report_serializes_with_module_tag() {
        let report = ModuleReport::PacingArchitect(PacingReport {
            pacing_score: 64.0,
            ..Default::default()
        });
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["module"], "pacing_architect");
        assert_eq!(value["data"]["pacing_score"], 64.0);

        let back: ModuleReport = serde_json::from_value(value).unwrap();
        assert_eq!(back, report);
        assert_eq!(back.module(), AnalysisModule::PacingArchitect);
    }
}
