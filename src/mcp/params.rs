//! MCP tool parameter structs with schemars-derived JSON schemas.

use schemars::JsonSchema;
use serde::Deserialize;

// ── Manuscript params ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ImportTextParams {
    #[schemars(description = "Manuscript title")]
    pub title: String,
    #[schemars(description = "Full manuscript text")]
    pub text: String,
    #[schemars(description = "Source format: 'txt' (default) or 'md'")]
    pub file_type: Option<String>,
    #[schemars(description = "Document kind: 'fiction' (default) or 'academic'")]
    pub kind: Option<String>,
    pub author_name: Option<String>,
    pub genre: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ImportFileParams {
    #[schemars(description = "Path to a .txt or .md file")]
    pub path: String,
    #[schemars(description = "Title (defaults to frontmatter, then the file name)")]
    pub title: Option<String>,
    #[schemars(description = "Document kind: 'fiction' or 'academic'")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ManuscriptIdParams {
    #[schemars(description = "The manuscript ID")]
    pub manuscript_id: String,
}

// ── Analysis params ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RunModuleParams {
    #[schemars(description = "The manuscript ID")]
    pub manuscript_id: String,
    #[schemars(
        description = "Module name, e.g. 'intelligence_engine', 'prose_refinery', 'revision_center'"
    )]
    pub module: String,
    #[schemars(description = "Academic discipline (academic modules only)")]
    pub discipline: Option<String>,
    #[schemars(description = "Document type, e.g. 'dissertation' (academic modules only)")]
    pub document_type: Option<String>,
    #[schemars(description = "Expected citation format, e.g. 'APA' (academic modules only)")]
    pub citation_format: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RunAllParams {
    #[schemars(description = "The manuscript ID")]
    pub manuscript_id: String,
    pub discipline: Option<String>,
    pub document_type: Option<String>,
    pub citation_format: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ResultIdParams {
    #[schemars(description = "The analysis result ID")]
    pub result_id: String,
}

// ── Edit queue params ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EditQueueParams {
    #[schemars(description = "The manuscript ID")]
    pub manuscript_id: String,
    #[schemars(description = "Filter by status: 'pending', 'accepted' or 'rejected'")]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SetItemStatusParams {
    #[schemars(description = "The manuscript ID")]
    pub manuscript_id: String,
    #[schemars(description = "Queue item ID (1-based position)")]
    pub item_id: u32,
    #[schemars(description = "New status: 'pending', 'accepted' or 'rejected'")]
    pub status: String,
}

// ── Report params ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReportParams {
    #[schemars(description = "The manuscript ID")]
    pub manuscript_id: String,
    #[schemars(description = "Report kind: 'committee', 'reader' or 'rejection'")]
    pub kind: String,
    #[schemars(
        description = "Committee template: 'proposal_defense', 'chapter_review', 'full_draft_review' or 'final_defense_prep'"
    )]
    pub template: Option<String>,
    #[schemars(description = "Advisor notes to fold into a committee report")]
    pub advisor_notes: Option<String>,
    #[schemars(description = "Rejection tone: 'standard', 'encouraging' or 'detailed'")]
    pub tone: Option<String>,
}

// ── Workflow params ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AdvanceDecisionParams {
    #[schemars(description = "The manuscript ID")]
    pub manuscript_id: String,
    #[schemars(description = "Notes for the stage being entered")]
    pub notes: Option<String>,
    #[schemars(
        description = "Outcome, only on the final advance: 'acquire', 'consider', 'revise_resubmit' or 'pass'"
    )]
    pub outcome: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddAnnotationParams {
    #[schemars(description = "The manuscript ID")]
    pub manuscript_id: String,
    pub content: String,
    #[schemars(description = "'comment' (default), 'suggestion' or 'question'")]
    pub kind: Option<String>,
    #[schemars(description = "Chapter number (1-based)")]
    pub chapter: Option<u32>,
    #[schemars(description = "Free-form location, e.g. 'second paragraph'")]
    pub location_hint: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateAnnotationParams {
    #[schemars(description = "The annotation ID")]
    pub annotation_id: String,
    pub content: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AnnotationIdParams {
    #[schemars(description = "The annotation ID")]
    pub annotation_id: String,
}
