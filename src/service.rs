//! Refinery service layer
//!
//! [`Refinery`] is the single entry point the CLI, MCP server and REST API
//! share. It owns the store and the module runner, and is the only place
//! that moves result rows through their lifecycle.

use crate::analysis::{
    carry_over_statuses, AcquisitionScore, AnalysisModule, EditQueue, EditQueueItem, ItemStatus,
    ModuleInput, ModuleOptions, ModuleReport, Orchestrator, QueueStats, UnknownModule,
};
use crate::config::{Config, LimitsConfig, QueueConfig};
use crate::gateway::{AiClient, AiError, AnthropicClient};
use crate::model::{
    AnalysisResult, AnnotationId, DocumentKind, Manuscript, ManuscriptId, ManuscriptStatus,
    ManuscriptSummary, ParseLabelError, ResultId, TransitionError,
};
use crate::reports::{Report, ReportContext, ReportRequest, ReportWriter};
use crate::storage::{ManuscriptStore, OpenStore, SqliteStore, StorageError};
use crate::text::{
    check_limits, detect_chapters, extract_text, normalize_text, read_source, word_count,
    ExtractError, ExtractedText,
};
use crate::config::AnalysisMode;
use crate::workflow::{Annotation, AnnotationKind, Decision, Outcome};
use chrono::Utc;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Service-level errors. Surfaces classify them with the `is_*` methods.
#[derive(Debug, thiserror::Error)]
pub enum RefineryError {
    #[error("{0}")]
    Validation(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("{module} analysis failed: {message}")]
    AnalysisFailed {
        module: AnalysisModule,
        message: String,
    },

    #[error("AI service error: {0}")]
    Ai(#[from] AiError),

    #[error("Storage error: {0}")]
    Storage(StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RefineryError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_analysis_failure(&self) -> bool {
        matches!(self, Self::AnalysisFailed { .. } | Self::Ai(_))
    }
}

impl From<StorageError> for RefineryError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound { kind, id } => Self::NotFound { kind, id },
            other => Self::Storage(other),
        }
    }
}

impl From<ExtractError> for RefineryError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::Io(io) => Self::Io(io),
            other => Self::Validation(other.to_string()),
        }
    }
}

impl From<ParseLabelError> for RefineryError {
    fn from(e: ParseLabelError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<UnknownModule> for RefineryError {
    fn from(e: UnknownModule) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<TransitionError> for RefineryError {
    fn from(e: TransitionError) -> Self {
        Self::Internal(e.to_string())
    }
}

pub type RefineryResult<T> = Result<T, RefineryError>;

/// Text import request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportRequest {
    pub title: String,
    pub text: String,
    /// Source extension; `txt` when absent.
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub kind: Option<DocumentKind>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
}

/// Fields accepted when adding an annotation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAnnotation {
    pub content: String,
    #[serde(default)]
    pub kind: AnnotationKind,
    #[serde(default)]
    pub chapter: Option<u32>,
    #[serde(default)]
    pub location_hint: Option<String>,
}

/// Build the AI client live mode needs, if it can be built.
///
/// Demo mode never needs one. A live config without an API key yields
/// `None`; module runs then fail with a not-configured error.
pub fn client_from_config(config: &Config) -> Option<Arc<dyn AiClient>> {
    if config.analysis.mode == AnalysisMode::Demo {
        return None;
    }
    match AnthropicClient::from_config(&config.ai) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            warn!(error = %e, "Live mode without a usable AI client");
            None
        }
    }
}

pub struct Refinery {
    store: Arc<dyn ManuscriptStore>,
    orchestrator: Orchestrator,
    limits: LimitsConfig,
    queue: QueueConfig,
}

impl Refinery {
    pub fn new(
        store: Arc<dyn ManuscriptStore>,
        config: &Config,
        client: Option<Arc<dyn AiClient>>,
    ) -> Self {
        Self {
            store,
            orchestrator: Orchestrator::new(
                client,
                config.analysis.clone(),
                config.scoring.clone(),
            ),
            limits: config.limits.clone(),
            queue: config.queue.clone(),
        }
    }

    /// Open the configured database and build the client for the mode.
    pub fn from_config(config: &Config) -> RefineryResult<Self> {
        let store = SqliteStore::open(config.database_path())?;
        Ok(Self::new(Arc::new(store), config, client_from_config(config)))
    }

    pub fn store(&self) -> &dyn ManuscriptStore {
        self.store.as_ref()
    }

    pub fn mode(&self) -> AnalysisMode {
        self.orchestrator.mode()
    }

    // ── Manuscripts ────────────────────────────────────────────────────────

    /// Import manuscript text supplied inline.
    pub fn import_text(&self, request: ImportRequest) -> RefineryResult<Manuscript> {
        let file_type = request.file_type.as_deref().unwrap_or("txt");
        let extracted = extract_text(request.text.as_bytes(), file_type)?;
        self.create_manuscript(extracted, request.text.len(), request)
    }

    /// Import a `.txt` or `.md` file. Missing fields fall back to
    /// frontmatter, then to the file name.
    pub fn import_file(
        &self,
        path: &Path,
        title: Option<String>,
        kind: Option<DocumentKind>,
    ) -> RefineryResult<Manuscript> {
        let byte_len = std::fs::metadata(path).map(|m| m.len() as usize).unwrap_or(0);
        let extracted = read_source(path)?;
        let fallback_title = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let request = ImportRequest {
            title: title
                .or_else(|| extracted.metadata.title.clone())
                .unwrap_or(fallback_title),
            text: String::new(),
            file_type: Some(extracted.format.as_str().to_string()),
            kind,
            author_name: None,
            genre: None,
        };
        self.create_manuscript(extracted, byte_len, request)
    }

    fn create_manuscript(
        &self,
        extracted: ExtractedText,
        byte_len: usize,
        request: ImportRequest,
    ) -> RefineryResult<Manuscript> {
        let metadata = extracted.metadata;
        let title = if request.title.trim().is_empty() {
            metadata.title.clone().unwrap_or_default()
        } else {
            request.title.trim().to_string()
        };
        if title.is_empty() {
            return Err(RefineryError::Validation("title is required".into()));
        }
        let kind = match (request.kind, metadata.kind.as_deref()) {
            (Some(kind), _) => kind,
            (None, Some(label)) => label.parse()?,
            (None, None) => DocumentKind::default(),
        };

        let raw_text = normalize_text(&extracted.text);
        let words = word_count(&raw_text);
        check_limits(byte_len, words, self.limits.max_upload_mb, self.limits.max_words)?;
        let chapters = detect_chapters(&raw_text);

        let now = Utc::now();
        let manuscript = Manuscript {
            id: ManuscriptId::new(),
            title,
            file_type: extracted.format.as_str().to_string(),
            kind,
            author_name: request.author_name.or(metadata.author),
            genre: request.genre.or(metadata.genre),
            word_count: words,
            chapter_count: chapters.len(),
            status: ManuscriptStatus::Ready,
            raw_text,
            chapters,
            created_at: now,
            updated_at: now,
            last_analyzed_at: None,
        };
        self.store.save_manuscript(&manuscript)?;

        info!(
            manuscript_id = %manuscript.id,
            words = manuscript.word_count,
            chapters = manuscript.chapter_count,
            kind = %manuscript.kind,
            "Imported manuscript"
        );
        Ok(manuscript)
    }

    pub fn list_manuscripts(&self) -> RefineryResult<Vec<ManuscriptSummary>> {
        Ok(self.store.list_manuscripts()?)
    }

    pub fn get_manuscript(&self, id: &ManuscriptId) -> RefineryResult<Manuscript> {
        self.store
            .load_manuscript(id)?
            .ok_or_else(|| RefineryError::not_found("Manuscript", id))
    }

    pub fn delete_manuscript(&self, id: &ManuscriptId) -> RefineryResult<()> {
        if !self.store.delete_manuscript(id)? {
            return Err(RefineryError::not_found("Manuscript", id));
        }
        info!(manuscript_id = %id, "Deleted manuscript");
        Ok(())
    }

    // ── Analysis ───────────────────────────────────────────────────────────

    /// Run one module, recording the result row through its lifecycle.
    ///
    /// Once the row is running it always ends completed or failed. A failed
    /// run is stored with its error text; analysis errors are returned as
    /// [`RefineryError::AnalysisFailed`], store errors as themselves.
    pub async fn run_module(
        &self,
        id: &ManuscriptId,
        module: AnalysisModule,
        options: &ModuleOptions,
    ) -> RefineryResult<AnalysisResult> {
        let manuscript = self.get_manuscript(id)?;

        let mut row = AnalysisResult::pending(id.clone(), module);
        self.store.save_result(&row)?;
        row.start()?;
        self.store.save_result(&row)?;

        let started = Instant::now();
        match self.execute(&manuscript, module, options).await {
            Ok(report) => {
                row.complete(report)?;
                self.store.save_result(&row)?;
                self.store
                    .set_manuscript_status(id, ManuscriptStatus::Analyzed, Some(Utc::now()))?;
                info!(
                    manuscript_id = %id,
                    module = %module,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Analysis completed"
                );
                Ok(row)
            }
            Err(err) => {
                let message = match &err {
                    RefineryError::AnalysisFailed { message, .. } => message.clone(),
                    other => other.to_string(),
                };
                row.fail(message.clone())?;
                if let Err(save_err) = self.store.save_result(&row) {
                    error!(manuscript_id = %id, module = %module, error = %save_err, "Could not record failed run");
                }
                if let Err(status_err) =
                    self.store
                        .set_manuscript_status(id, ManuscriptStatus::Error, None)
                {
                    warn!(manuscript_id = %id, error = %status_err, "Could not mark manuscript as errored");
                }
                error!(
                    manuscript_id = %id,
                    module = %module,
                    duration_ms = started.elapsed().as_millis() as u64,
                    error = %message,
                    "Analysis failed"
                );
                Err(err)
            }
        }
    }

    /// Everything between a row starting and reaching a terminal status.
    async fn execute(
        &self,
        manuscript: &Manuscript,
        module: AnalysisModule,
        options: &ModuleOptions,
    ) -> RefineryResult<ModuleReport> {
        let id = &manuscript.id;
        self.store
            .set_manuscript_status(id, ManuscriptStatus::Analyzing, None)?;
        let prior = self.store.completed_reports(id)?;
        let input = ModuleInput {
            raw_text: &manuscript.raw_text,
            chapters: &manuscript.chapters,
            options,
            prior: &prior,
        };

        let mut report = self
            .orchestrator
            .run(module, input)
            .await
            .map_err(|e| RefineryError::AnalysisFailed {
                module,
                message: e.to_string(),
            })?;
        if let ModuleReport::RevisionCenter(queue) = &mut report {
            self.store_queue(id, queue)?;
        }
        Ok(report)
    }

    /// Run the plan for the manuscript's kind in order.
    ///
    /// Stops at the first failing module; earlier results stay stored.
    pub async fn run_all(
        &self,
        id: &ManuscriptId,
        options: &ModuleOptions,
    ) -> RefineryResult<Vec<AnalysisResult>> {
        let manuscript = self.get_manuscript(id)?;
        let plan = AnalysisModule::plan(manuscript.kind);
        info!(manuscript_id = %id, modules = plan.len(), kind = %manuscript.kind, "Running full analysis");

        let mut results = Vec::with_capacity(plan.len());
        for module in plan {
            results.push(self.run_module(id, *module, options).await?);
        }
        Ok(results)
    }

    pub fn list_results(&self, id: &ManuscriptId) -> RefineryResult<Vec<AnalysisResult>> {
        self.get_manuscript(id)?;
        Ok(self.store.list_results(id)?)
    }

    pub fn get_result(&self, id: &ResultId) -> RefineryResult<AnalysisResult> {
        self.store
            .load_result(id)?
            .ok_or_else(|| RefineryError::not_found("Analysis result", id))
    }

    // ── Edit queue ─────────────────────────────────────────────────────────

    fn store_queue(&self, id: &ManuscriptId, queue: &mut EditQueue) -> RefineryResult<()> {
        if self.queue.preserve_review_status {
            let previous = self.store.load_edit_queue(id, None)?;
            let kept = carry_over_statuses(queue, &previous);
            info!(manuscript_id = %id, kept, "Carried over review statuses");
        }
        self.store.replace_edit_queue(id, &queue.items)?;
        Ok(())
    }

    /// Current queue, optionally filtered by status. Stats cover the
    /// returned items.
    pub fn edit_queue(
        &self,
        id: &ManuscriptId,
        status: Option<ItemStatus>,
    ) -> RefineryResult<EditQueue> {
        self.get_manuscript(id)?;
        let items = self.store.load_edit_queue(id, status)?;
        let stats = QueueStats::from_items(&items);
        Ok(EditQueue { items, stats })
    }

    pub fn set_item_status(
        &self,
        id: &ManuscriptId,
        item_id: u32,
        status: ItemStatus,
    ) -> RefineryResult<EditQueueItem> {
        self.get_manuscript(id)?;
        if !self.store.set_item_status(id, item_id, status)? {
            return Err(RefineryError::not_found("Edit queue item", item_id));
        }
        self.store
            .load_edit_queue(id, None)?
            .into_iter()
            .find(|item| item.id == item_id)
            .ok_or_else(|| RefineryError::not_found("Edit queue item", item_id))
    }

    // ── Scoring and reports ────────────────────────────────────────────────

    /// Compute (and store) the acquisition score from completed results.
    pub async fn acquisition_score(&self, id: &ManuscriptId) -> RefineryResult<AcquisitionScore> {
        let row = self
            .run_module(id, AnalysisModule::AcquisitionScore, &ModuleOptions::default())
            .await?;
        match row.report {
            Some(ModuleReport::AcquisitionScore(score)) => Ok(score),
            _ => Err(RefineryError::Internal(
                "acquisition score run produced no score".into(),
            )),
        }
    }

    pub async fn generate_report(
        &self,
        id: &ManuscriptId,
        request: &ReportRequest,
    ) -> RefineryResult<Report> {
        let manuscript = self.get_manuscript(id)?;
        let analysis = self.store.completed_reports(id)?;
        if analysis.is_empty() {
            return Err(RefineryError::Validation(
                "no completed analysis results; run an analysis first".into(),
            ));
        }

        let date = Utc::now().format("%B %Y").to_string();
        let ctx = ReportContext {
            title: &manuscript.title,
            author: manuscript.author_name.as_deref().unwrap_or("Author"),
            date: &date,
            analysis: &analysis,
        };

        let report = if self.orchestrator.is_demo() {
            ReportWriter::demo().write(&ctx, request).await?
        } else {
            let client = self.orchestrator.client()?;
            ReportWriter::live(client.as_ref(), self.orchestrator.timeout())
                .write(&ctx, request)
                .await?
        };
        info!(manuscript_id = %id, "Generated report");
        Ok(report)
    }

    // ── Workflow ───────────────────────────────────────────────────────────

    /// Decision record, created on first access.
    pub fn decision(&self, id: &ManuscriptId) -> RefineryResult<Decision> {
        self.get_manuscript(id)?;
        match self.store.load_decision(id)? {
            Some(decision) => Ok(decision),
            None => {
                let decision = Decision::new(id.clone());
                self.store.save_decision(&decision)?;
                Ok(decision)
            }
        }
    }

    pub fn advance_decision(
        &self,
        id: &ManuscriptId,
        notes: Option<String>,
        outcome: Option<Outcome>,
    ) -> RefineryResult<Decision> {
        let mut decision = self.decision(id)?;
        let stage = decision
            .advance(notes, outcome)
            .map_err(|e| RefineryError::Validation(e.to_string()))?;
        self.store.save_decision(&decision)?;
        info!(manuscript_id = %id, stage = %stage, "Decision advanced");
        Ok(decision)
    }

    // ── Annotations ────────────────────────────────────────────────────────

    pub fn add_annotation(
        &self,
        id: &ManuscriptId,
        new: NewAnnotation,
    ) -> RefineryResult<Annotation> {
        self.get_manuscript(id)?;
        if new.content.trim().is_empty() {
            return Err(RefineryError::Validation("annotation content is required".into()));
        }
        let mut annotation = Annotation::new(id.clone(), new.content, new.kind);
        annotation.chapter = new.chapter;
        annotation.location_hint = new.location_hint;
        self.store.save_annotation(&annotation)?;
        Ok(annotation)
    }

    pub fn list_annotations(&self, id: &ManuscriptId) -> RefineryResult<Vec<Annotation>> {
        self.get_manuscript(id)?;
        Ok(self.store.list_annotations(id)?)
    }

    pub fn update_annotation(
        &self,
        annotation_id: &AnnotationId,
        content: String,
    ) -> RefineryResult<Annotation> {
        if content.trim().is_empty() {
            return Err(RefineryError::Validation("annotation content is required".into()));
        }
        let mut annotation = self
            .store
            .load_annotation(annotation_id)?
            .ok_or_else(|| RefineryError::not_found("Annotation", annotation_id))?;
        annotation.content = content;
        annotation.updated_at = Utc::now();
        self.store.save_annotation(&annotation)?;
        Ok(annotation)
    }

    pub fn delete_annotation(&self, annotation_id: &AnnotationId) -> RefineryResult<()> {
        if !self.store.delete_annotation(annotation_id)? {
            return Err(RefineryError::not_found("Annotation", annotation_id));
        }
        Ok(())
    }
}
