//! Core records: manuscripts and analysis result rows.

use crate::analysis::{AnalysisModule, ModuleReport, ModuleScores};
use crate::text::Chapter;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new random id (UUID v4).
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn from_string(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Identifier of an imported manuscript.
    ManuscriptId
);
string_id!(
    /// Identifier of one analysis run.
    ResultId
);
string_id!(
    /// Identifier of a reviewer annotation.
    AnnotationId
);

/// Error for an unrecognized enum label read from input or storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} '{value}'")]
pub struct ParseLabelError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseLabelError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Implements `as_str`, `Display` and `FromStr` for a snake_case label enum.
macro_rules! label_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::model::ParseLabelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($label => Ok(Self::$variant),)+
                    other => Err($crate::model::ParseLabelError::new($kind, other)),
                }
            }
        }
    };
}
pub(crate) use label_enum;

/// Fiction runs the craft modules; academic runs the scholarly ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    #[default]
    Fiction,
    Academic,
}

label_enum!(DocumentKind, "document kind", {
    Fiction => "fiction",
    Academic => "academic",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManuscriptStatus {
    #[default]
    Ready,
    Analyzing,
    Analyzed,
    Error,
}

label_enum!(ManuscriptStatus, "manuscript status", {
    Ready => "ready",
    Analyzing => "analyzing",
    Analyzed => "analyzed",
    Error => "error",
});

/// An imported manuscript with its detected chapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manuscript {
    pub id: ManuscriptId,
    pub title: String,
    pub file_type: String,
    pub kind: DocumentKind,
    pub author_name: Option<String>,
    pub genre: Option<String>,
    pub word_count: usize,
    pub chapter_count: usize,
    pub status: ManuscriptStatus,
    pub raw_text: String,
    pub chapters: Vec<Chapter>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_analyzed_at: Option<DateTime<Utc>>,
}

/// Manuscript listing entry, without text or chapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManuscriptSummary {
    pub id: ManuscriptId,
    pub title: String,
    pub file_type: String,
    pub kind: DocumentKind,
    pub author_name: Option<String>,
    pub genre: Option<String>,
    pub word_count: usize,
    pub chapter_count: usize,
    pub status: ManuscriptStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_analyzed_at: Option<DateTime<Utc>>,
}

impl From<&Manuscript> for ManuscriptSummary {
    fn from(m: &Manuscript) -> Self {
        Self {
            id: m.id.clone(),
            title: m.title.clone(),
            file_type: m.file_type.clone(),
            kind: m.kind,
            author_name: m.author_name.clone(),
            genre: m.genre.clone(),
            word_count: m.word_count,
            chapter_count: m.chapter_count,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
            last_analyzed_at: m.last_analyzed_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

label_enum!(AnalysisStatus, "analysis status", {
    Pending => "pending",
    Running => "running",
    Completed => "completed",
    Failed => "failed",
});

impl AnalysisStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot move analysis from {from} to {to}")]
pub struct TransitionError {
    pub from: AnalysisStatus,
    pub to: AnalysisStatus,
}

/// One module run against one manuscript.
///
/// Created `pending`, moved to `running`, then to a terminal status exactly
/// once. Rows are only removed when their manuscript is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: ResultId,
    pub manuscript_id: ManuscriptId,
    pub module: AnalysisModule,
    pub status: AnalysisStatus,
    pub scores: ModuleScores,
    pub report: Option<ModuleReport>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<f64>,
}

impl AnalysisResult {
    pub fn pending(manuscript_id: ManuscriptId, module: AnalysisModule) -> Self {
        Self {
            id: ResultId::new(),
            manuscript_id,
            module,
            status: AnalysisStatus::Pending,
            scores: ModuleScores::default(),
            report: None,
            error: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            duration_seconds: None,
        }
    }

    pub fn start(&mut self) -> Result<(), TransitionError> {
        self.check(AnalysisStatus::Pending, AnalysisStatus::Running)?;
        self.status = AnalysisStatus::Running;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// Record a successful run; scores are copied from the report.
    pub fn complete(&mut self, report: ModuleReport) -> Result<(), TransitionError> {
        self.check(AnalysisStatus::Running, AnalysisStatus::Completed)?;
        self.scores = report.scores();
        self.report = Some(report);
        self.finish(AnalysisStatus::Completed);
        Ok(())
    }

    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), TransitionError> {
        self.check(AnalysisStatus::Running, AnalysisStatus::Failed)?;
        self.error = Some(error.into());
        self.finish(AnalysisStatus::Failed);
        Ok(())
    }

    fn check(&self, expected: AnalysisStatus, to: AnalysisStatus) -> Result<(), TransitionError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(TransitionError {
                from: self.status,
                to,
            })
        }
    }

    fn finish(&mut self, status: AnalysisStatus) {
        let now = Utc::now();
        self.status = status;
        self.completed_at = Some(now);
        self.duration_seconds = self.started_at.map(|started| {
            let millis = (now - started).num_milliseconds().max(0);
            (millis as f64 / 10.0).round() / 100.0
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::EditQueue;

    #[test]
    fn ids_are_unique_and_display_raw() {
        let a = ManuscriptId::new();
        let b = ManuscriptId::new();
        assert_ne!(a, b);
        assert_eq!(ManuscriptId::from("abc").to_string(), "abc");
        assert_eq!(serde_json::to_string(&ResultId::from("r1")).unwrap(), "\"r1\"");
    }

    #[test]
    fn labels_round_trip_through_from_str() {
        assert_eq!("Academic".parse::<DocumentKind>().unwrap(), DocumentKind::Academic);
        assert_eq!("analyzed".parse::<ManuscriptStatus>().unwrap(), ManuscriptStatus::Analyzed);
        let err = "poetry".parse::<DocumentKind>().unwrap_err();
        assert_eq!(err.to_string(), "invalid document kind 'poetry'");
    }

    #[test]
    fn lifecycle_moves_forward_once() {
        let mut row = AnalysisResult::pending(ManuscriptId::new(), AnalysisModule::RevisionCenter);
        assert!(row.complete(ModuleReport::RevisionCenter(EditQueue::default())).is_err());

        row.start().unwrap();
        row.complete(ModuleReport::RevisionCenter(EditQueue::default()))
            .unwrap();
        assert_eq!(row.status, AnalysisStatus::Completed);
        assert!(row.completed_at.is_some());
        assert!(row.duration_seconds.unwrap() >= 0.0);

        let err = row.fail("late").unwrap_err();
        assert_eq!(err.from, AnalysisStatus::Completed);
        assert!(row.error.is_none());
    }

    #[test]
    fn failure_keeps_error_text() {
        let mut row = AnalysisResult::pending(ManuscriptId::new(), AnalysisModule::ProseRefinery);
        row.start().unwrap();
        row.fail("upstream 529").unwrap();
        assert_eq!(row.status, AnalysisStatus::Failed);
        assert_eq!(row.error.as_deref(), Some("upstream 529"));
        assert!(row.report.is_none());
    }
}
