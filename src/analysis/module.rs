//! Analysis module identifiers and per-run options.

use crate::model::DocumentKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named analysis module.
///
/// Declaration order is the fixed processing order used when findings are
/// aggregated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisModule {
    #[serde(alias = "xray")]
    IntelligenceEngine,
    VoiceIsolation,
    PacingArchitect,
    CharacterArc,
    ProseRefinery,
    RevisionCenter,
    ArgumentCoherence,
    CitationArchitecture,
    AcademicVoice,
    AcquisitionScore,
}

/// Unknown module name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown analysis module '{0}'. Valid: {valid}", valid = AnalysisModule::valid_names())]
pub struct UnknownModule(pub String);

const FICTION_PLAN: &[AnalysisModule] = &[
    AnalysisModule::IntelligenceEngine,
    AnalysisModule::VoiceIsolation,
    AnalysisModule::PacingArchitect,
    AnalysisModule::CharacterArc,
    AnalysisModule::ProseRefinery,
    AnalysisModule::RevisionCenter,
];

const ACADEMIC_PLAN: &[AnalysisModule] = &[
    AnalysisModule::IntelligenceEngine,
    AnalysisModule::ArgumentCoherence,
    AnalysisModule::CitationArchitecture,
    AnalysisModule::AcademicVoice,
    AnalysisModule::ProseRefinery,
    AnalysisModule::RevisionCenter,
];

impl AnalysisModule {
    pub const ALL: [AnalysisModule; 10] = [
        Self::IntelligenceEngine,
        Self::VoiceIsolation,
        Self::PacingArchitect,
        Self::CharacterArc,
        Self::ProseRefinery,
        Self::RevisionCenter,
        Self::ArgumentCoherence,
        Self::CitationArchitecture,
        Self::AcademicVoice,
        Self::AcquisitionScore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IntelligenceEngine => "intelligence_engine",
            Self::VoiceIsolation => "voice_isolation",
            Self::PacingArchitect => "pacing_architect",
            Self::CharacterArc => "character_arc",
            Self::ProseRefinery => "prose_refinery",
            Self::RevisionCenter => "revision_center",
            Self::ArgumentCoherence => "argument_coherence",
            Self::CitationArchitecture => "citation_architecture",
            Self::AcademicVoice => "academic_voice",
            Self::AcquisitionScore => "acquisition_score",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::IntelligenceEngine => "Manuscript Intelligence Engine",
            Self::VoiceIsolation => "Voice Isolation Lab",
            Self::PacingArchitect => "Pacing Architect",
            Self::CharacterArc => "Character Arc Workshop",
            Self::ProseRefinery => "Prose Refinery",
            Self::RevisionCenter => "Revision Command Center",
            Self::ArgumentCoherence => "Argument Coherence Engine",
            Self::CitationArchitecture => "Citation & Source Architecture",
            Self::AcademicVoice => "Academic Voice Calibration",
            Self::AcquisitionScore => "Acquisition Score",
        }
    }

    /// Modules whose results come from earlier results rather than the text.
    pub fn is_derived(&self) -> bool {
        matches!(self, Self::RevisionCenter | Self::AcquisitionScore)
    }

    /// Modules run by a full analysis, in order.
    pub fn plan(kind: DocumentKind) -> &'static [AnalysisModule] {
        match kind {
            DocumentKind::Fiction => FICTION_PLAN,
            DocumentKind::Academic => ACADEMIC_PLAN,
        }
    }

    fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for AnalysisModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for AnalysisModule {
    type Err = UnknownModule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase().replace('-', "_");
        if name == "xray" {
            return Ok(Self::IntelligenceEngine);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == name)
            .ok_or_else(|| UnknownModule(s.to_string()))
    }
}

/// Options for the academic modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleOptions {
    pub discipline: String,
    pub document_type: String,
    pub citation_format: String,
}

impl Default for ModuleOptions {
    fn default() -> Self {
        Self {
            discipline: "general".to_string(),
            document_type: "dissertation".to_string(),
            citation_format: "APA".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_alias() {
        assert_eq!("xray".parse::<AnalysisModule>().unwrap(), AnalysisModule::IntelligenceEngine);
        assert_eq!(
            "pacing-architect".parse::<AnalysisModule>().unwrap(),
            AnalysisModule::PacingArchitect
        );
        let module: AnalysisModule = serde_json::from_str("\"xray\"").unwrap();
        assert_eq!(module, AnalysisModule::IntelligenceEngine);
    }

    #[test]
    fn unknown_module_lists_valid_names() {
        let err = "sentiment".parse::<AnalysisModule>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("'sentiment'"));
        assert!(message.contains("acquisition_score"));
    }

    #[test]
    fn every_module_round_trips_its_name() {
        for module in AnalysisModule::ALL {
            assert_eq!(module.as_str().parse::<AnalysisModule>().unwrap(), module);
            assert_eq!(
                serde_json::to_value(module).unwrap(),
                serde_json::Value::String(module.as_str().to_string())
            );
        }
    }

    #[test]
    fn plans_end_with_revision_center() {
        for kind in [DocumentKind::Fiction, DocumentKind::Academic] {
            let plan = AnalysisModule::plan(kind);
            assert_eq!(plan.last(), Some(&AnalysisModule::RevisionCenter));
            assert!(!plan.contains(&AnalysisModule::AcquisitionScore));
        }
        assert!(AnalysisModule::plan(DocumentKind::Academic)
            .contains(&AnalysisModule::CitationArchitecture));
    }

    #[test]
    fn options_default_from_partial_json() {
        let opts: ModuleOptions = serde_json::from_str(r#"{"discipline": "history"}"#).unwrap();
        assert_eq!(opts.discipline, "history");
        assert_eq!(opts.citation_format, "APA");
    }
}
