//! Storage trait definitions

use crate::analysis::{AnalysisModule, EditQueueItem, ItemStatus, ModuleReport};
use crate::model::{
    AnalysisResult, AnalysisStatus, AnnotationId, Manuscript, ManuscriptId, ManuscriptStatus,
    ManuscriptSummary, ResultId,
};
use crate::workflow::{Annotation, Decision};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Date parsing error: {0}")]
    DateParse(String),

    /// A stored label no longer parses.
    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl StorageError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence for manuscripts and everything derived from them.
///
/// Implementations must be thread-safe (Send + Sync). Deleting a manuscript
/// removes its results, queue, decision and annotations.
pub trait ManuscriptStore: Send + Sync {
    // === Manuscripts ===

    /// Insert or replace a manuscript
    fn save_manuscript(&self, manuscript: &Manuscript) -> StorageResult<()>;

    fn load_manuscript(&self, id: &ManuscriptId) -> StorageResult<Option<Manuscript>>;

    /// All manuscripts, newest first
    fn list_manuscripts(&self) -> StorageResult<Vec<ManuscriptSummary>>;

    fn delete_manuscript(&self, id: &ManuscriptId) -> StorageResult<bool>;

    /// Update status (and optionally the last analysis time) in place
    fn set_manuscript_status(
        &self,
        id: &ManuscriptId,
        status: ManuscriptStatus,
        analyzed_at: Option<DateTime<Utc>>,
    ) -> StorageResult<()>;

    // === Analysis results ===

    /// Insert or update a result row
    fn save_result(&self, result: &AnalysisResult) -> StorageResult<()>;

    fn load_result(&self, id: &ResultId) -> StorageResult<Option<AnalysisResult>>;

    /// Results for a manuscript in creation order
    fn list_results(&self, manuscript_id: &ManuscriptId) -> StorageResult<Vec<AnalysisResult>>;

    /// Latest completed report per module
    fn completed_reports(
        &self,
        manuscript_id: &ManuscriptId,
    ) -> StorageResult<BTreeMap<AnalysisModule, ModuleReport>> {
        let mut latest = BTreeMap::new();
        for result in self.list_results(manuscript_id)? {
            if result.status != AnalysisStatus::Completed {
                continue;
            }
            if let Some(report) = result.report {
                // Later rows overwrite earlier ones.
                latest.insert(result.module, report);
            }
        }
        Ok(latest)
    }

    // === Edit queue ===

    /// Replace the whole queue for a manuscript
    fn replace_edit_queue(
        &self,
        manuscript_id: &ManuscriptId,
        items: &[EditQueueItem],
    ) -> StorageResult<()>;

    /// Queue items in position order, optionally filtered by status
    fn load_edit_queue(
        &self,
        manuscript_id: &ManuscriptId,
        status: Option<ItemStatus>,
    ) -> StorageResult<Vec<EditQueueItem>>;

    /// Returns false when no item has that position
    fn set_item_status(
        &self,
        manuscript_id: &ManuscriptId,
        item_id: u32,
        status: ItemStatus,
    ) -> StorageResult<bool>;

    // === Decisions ===

    fn load_decision(&self, manuscript_id: &ManuscriptId) -> StorageResult<Option<Decision>>;

    fn save_decision(&self, decision: &Decision) -> StorageResult<()>;

    // === Annotations ===

    /// Insert or update an annotation
    fn save_annotation(&self, annotation: &Annotation) -> StorageResult<()>;

    fn load_annotation(&self, id: &AnnotationId) -> StorageResult<Option<Annotation>>;

    /// Annotations for a manuscript, oldest first
    fn list_annotations(&self, manuscript_id: &ManuscriptId) -> StorageResult<Vec<Annotation>>;

    fn delete_annotation(&self, id: &AnnotationId) -> StorageResult<bool>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: ManuscriptStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
