//! Editorial decision workflow and manuscript annotations.

use crate::model::{label_enum, AnnotationId, ManuscriptId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Review stage, in order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Unreviewed,
    ReaderReviewed,
    EditorRecommended,
    DirectorDecision,
}

label_enum!(Stage, "stage", {
    Unreviewed => "unreviewed",
    ReaderReviewed => "reader_reviewed",
    EditorRecommended => "editor_recommended",
    DirectorDecision => "director_decision",
});

impl Stage {
    pub fn next(&self) -> Option<Stage> {
        match self {
            Self::Unreviewed => Some(Self::ReaderReviewed),
            Self::ReaderReviewed => Some(Self::EditorRecommended),
            Self::EditorRecommended => Some(Self::DirectorDecision),
            Self::DirectorDecision => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    #[default]
    Pending,
    Acquire,
    Consider,
    ReviseResubmit,
    Pass,
}

label_enum!(Outcome, "outcome", {
    Pending => "pending",
    Acquire => "acquire",
    Consider => "consider",
    ReviseResubmit => "revise_resubmit",
    Pass => "pass",
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("decision is already at the final stage")]
    AlreadyFinal,
    #[error("an outcome can only be set on the final advance")]
    OutcomeTooEarly,
}

/// One decision record per manuscript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub manuscript_id: ManuscriptId,
    pub stage: Stage,
    pub outcome: Outcome,
    pub reader_notes: Option<String>,
    pub editor_notes: Option<String>,
    pub director_notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Decision {
    pub fn new(manuscript_id: ManuscriptId) -> Self {
        Self {
            manuscript_id,
            stage: Stage::default(),
            outcome: Outcome::default(),
            reader_notes: None,
            editor_notes: None,
            director_notes: None,
            updated_at: Utc::now(),
        }
    }

    /// Move to the next stage, storing `notes` on that stage's field.
    ///
    /// `outcome` is only accepted when entering the director stage.
    pub fn advance(
        &mut self,
        notes: Option<String>,
        outcome: Option<Outcome>,
    ) -> Result<Stage, WorkflowError> {
        let next = self.stage.next().ok_or(WorkflowError::AlreadyFinal)?;
        if outcome.is_some() && next != Stage::DirectorDecision {
            return Err(WorkflowError::OutcomeTooEarly);
        }

        match next {
            Stage::ReaderReviewed => self.reader_notes = notes,
            Stage::EditorRecommended => self.editor_notes = notes,
            Stage::DirectorDecision => {
                self.director_notes = notes;
                if let Some(outcome) = outcome {
                    self.outcome = outcome;
                }
            }
            Stage::Unreviewed => {}
        }
        self.stage = next;
        self.updated_at = Utc::now();
        Ok(next)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    #[default]
    Comment,
    Suggestion,
    Question,
}

label_enum!(AnnotationKind, "annotation kind", {
    Comment => "comment",
    Suggestion => "suggestion",
    Question => "question",
});

/// A reviewer note pinned to a manuscript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    pub manuscript_id: ManuscriptId,
    pub chapter: Option<u32>,
    pub location_hint: Option<String>,
    pub content: String,
    pub kind: AnnotationKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Annotation {
    pub fn new(manuscript_id: ManuscriptId, content: impl Into<String>, kind: AnnotationKind) -> Self {
        let now = Utc::now();
        Self {
            id: AnnotationId::new(),
            manuscript_id,
            chapter: None,
            location_hint: None,
            content: content.into(),
            kind,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_chapter(mut self, chapter: u32) -> Self {
        self.chapter = Some(chapter);
        self
    }

    pub fn with_location(mut self, hint: impl Into<String>) -> Self {
        self.location_hint = Some(hint.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_walks_all_stages() {
        let mut decision = Decision::new(ManuscriptId::from_string("m1"));
        assert_eq!(decision.stage, Stage::Unreviewed);

        decision.advance(Some("Strong opening".into()), None).unwrap();
        assert_eq!(decision.reader_notes.as_deref(), Some("Strong opening"));

        decision.advance(Some("Recommend".into()), None).unwrap();
        assert_eq!(decision.stage, Stage::EditorRecommended);

        let stage = decision
            .advance(Some("Approved".into()), Some(Outcome::Acquire))
            .unwrap();
        assert_eq!(stage, Stage::DirectorDecision);
        assert_eq!(decision.outcome, Outcome::Acquire);
        assert_eq!(decision.director_notes.as_deref(), Some("Approved"));
    }

    #[test]
    fn advancing_past_final_stage_fails() {
        let mut decision = Decision::new(ManuscriptId::from_string("m1"));
        for _ in 0..3 {
            decision.advance(None, None).unwrap();
        }
        let before = decision.clone();
        assert_eq!(decision.advance(None, None), Err(WorkflowError::AlreadyFinal));
        assert_eq!(decision, before);
    }

    #[test]
    fn outcome_only_on_final_advance() {
        let mut decision = Decision::new(ManuscriptId::from_string("m1"));
        assert_eq!(
            decision.advance(None, Some(Outcome::Pass)),
            Err(WorkflowError::OutcomeTooEarly)
        );
        assert_eq!(decision.stage, Stage::Unreviewed);
    }

    #[test]
    fn labels_parse() {
        assert_eq!("revise_resubmit".parse::<Outcome>().unwrap(), Outcome::ReviseResubmit);
        assert_eq!("QUESTION".parse::<AnnotationKind>().unwrap(), AnnotationKind::Question);
        assert_eq!(Stage::EditorRecommended.to_string(), "editor_recommended");
        assert!("approved".parse::<Stage>().is_err());
    }
}
