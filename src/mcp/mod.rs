//! MCP server for Refinery: exposes manuscript import, analysis, the edit
//! queue, reports and the decision workflow via the Model Context Protocol.

pub mod params;

use params::*;
use crate::analysis::{AnalysisModule, ModuleOptions};
use crate::config::Config;
use crate::model::{AnnotationId, ManuscriptId, ManuscriptSummary, ResultId};
use crate::reports::ReportRequest;
use crate::service::{ImportRequest, NewAnnotation, Refinery, RefineryResult};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::Serialize;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ok_text(text: String) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

fn err_text(msg: String) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::error(vec![Content::text(msg)]))
}

fn ok_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    match serde_json::to_string_pretty(value) {
        Ok(text) => ok_text(text),
        Err(e) => err_text(e.to_string()),
    }
}

/// Tool errors are reported to the client as error content, not protocol errors.
fn respond<T: Serialize>(result: RefineryResult<T>) -> Result<CallToolResult, McpError> {
    match result {
        Ok(value) => ok_json(&value),
        Err(e) => err_text(e.to_string()),
    }
}

fn parse_opt<T>(label: Option<&str>) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: Display,
{
    label.map(|l| l.parse::<T>().map_err(|e| e.to_string())).transpose()
}

fn module_options(
    discipline: Option<String>,
    document_type: Option<String>,
    citation_format: Option<String>,
) -> ModuleOptions {
    let defaults = ModuleOptions::default();
    ModuleOptions {
        discipline: discipline.unwrap_or(defaults.discipline),
        document_type: document_type.unwrap_or(defaults.document_type),
        citation_format: citation_format.unwrap_or(defaults.citation_format),
    }
}

// ---------------------------------------------------------------------------
// RefineryMcpServer
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct RefineryMcpServer {
    refinery: Arc<Refinery>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl RefineryMcpServer {
    pub fn new(refinery: Arc<Refinery>) -> Self {
        Self {
            refinery,
            tool_router: Self::tool_router(),
        }
    }

    // ── Manuscript tools ────────────────────────────────────────────────

    #[tool(description = "Import manuscript text; chapters are detected automatically")]
    fn import_text(
        &self,
        Parameters(p): Parameters<ImportTextParams>,
    ) -> Result<CallToolResult, McpError> {
        let kind = match parse_opt(p.kind.as_deref()) {
            Ok(kind) => kind,
            Err(e) => return err_text(e),
        };
        let request = ImportRequest {
            title: p.title,
            text: p.text,
            file_type: p.file_type,
            kind,
            author_name: p.author_name,
            genre: p.genre,
        };
        respond(
            self.refinery
                .import_text(request)
                .map(|m| ManuscriptSummary::from(&m)),
        )
    }

    #[tool(description = "Import a .txt or .md manuscript file from disk")]
    fn import_file(
        &self,
        Parameters(p): Parameters<ImportFileParams>,
    ) -> Result<CallToolResult, McpError> {
        let kind = match parse_opt(p.kind.as_deref()) {
            Ok(kind) => kind,
            Err(e) => return err_text(e),
        };
        respond(
            self.refinery
                .import_file(Path::new(&p.path), p.title, kind)
                .map(|m| ManuscriptSummary::from(&m)),
        )
    }

    #[tool(description = "List all manuscripts, newest first")]
    fn list_manuscripts(&self) -> Result<CallToolResult, McpError> {
        respond(self.refinery.list_manuscripts())
    }

    #[tool(description = "Get a manuscript's metadata and chapter outline")]
    fn get_manuscript(
        &self,
        Parameters(p): Parameters<ManuscriptIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let id = ManuscriptId::from_string(p.manuscript_id);
        match self.refinery.get_manuscript(&id) {
            Ok(m) => {
                let chapters: Vec<serde_json::Value> = m
                    .chapters
                    .iter()
                    .map(|c| {
                        serde_json::json!({
                            "number": c.number(),
                            "title": c.title,
                            "word_count": c.word_count,
                        })
                    })
                    .collect();
                ok_json(&serde_json::json!({
                    "manuscript": ManuscriptSummary::from(&m),
                    "chapters": chapters,
                }))
            }
            Err(e) => err_text(e.to_string()),
        }
    }

    #[tool(description = "Delete a manuscript and everything derived from it")]
    fn delete_manuscript(
        &self,
        Parameters(p): Parameters<ManuscriptIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let id = ManuscriptId::from_string(p.manuscript_id);
        match self.refinery.delete_manuscript(&id) {
            Ok(()) => ok_text(format!("deleted manuscript {}", id)),
            Err(e) => err_text(e.to_string()),
        }
    }

    // ── Analysis tools ──────────────────────────────────────────────────

    #[tool(description = "Run one analysis module against a manuscript")]
    async fn run_module(
        &self,
        Parameters(p): Parameters<RunModuleParams>,
    ) -> Result<CallToolResult, McpError> {
        let module: AnalysisModule = match p.module.parse() {
            Ok(m) => m,
            Err(e) => return err_text(format!("{}", e)),
        };
        let options = module_options(p.discipline, p.document_type, p.citation_format);
        let id = ManuscriptId::from_string(p.manuscript_id);
        respond(self.refinery.run_module(&id, module, &options).await)
    }

    #[tool(description = "Run every module for the manuscript's kind, in order")]
    async fn run_all(
        &self,
        Parameters(p): Parameters<RunAllParams>,
    ) -> Result<CallToolResult, McpError> {
        let options = module_options(p.discipline, p.document_type, p.citation_format);
        let id = ManuscriptId::from_string(p.manuscript_id);
        match self.refinery.run_all(&id, &options).await {
            Ok(results) => {
                let summary: Vec<serde_json::Value> = results
                    .iter()
                    .map(|r| {
                        serde_json::json!({
                            "result_id": r.id,
                            "module": r.module,
                            "status": r.status,
                            "scores": r.scores,
                        })
                    })
                    .collect();
                ok_json(&summary)
            }
            Err(e) => err_text(e.to_string()),
        }
    }

    #[tool(description = "List analysis results for a manuscript")]
    fn list_results(
        &self,
        Parameters(p): Parameters<ManuscriptIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let id = ManuscriptId::from_string(p.manuscript_id);
        respond(self.refinery.list_results(&id))
    }

    #[tool(description = "Get one analysis result with its full report")]
    fn get_result(
        &self,
        Parameters(p): Parameters<ResultIdParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.refinery.get_result(&ResultId::from_string(p.result_id)))
    }

    // ── Edit queue tools ────────────────────────────────────────────────

    #[tool(description = "Get the severity-sorted edit queue, optionally filtered by status")]
    fn edit_queue(
        &self,
        Parameters(p): Parameters<EditQueueParams>,
    ) -> Result<CallToolResult, McpError> {
        let status = match parse_opt(p.status.as_deref()) {
            Ok(s) => s,
            Err(e) => return err_text(e),
        };
        let id = ManuscriptId::from_string(p.manuscript_id);
        respond(self.refinery.edit_queue(&id, status))
    }

    #[tool(description = "Accept, reject or reset an edit queue item")]
    fn set_item_status(
        &self,
        Parameters(p): Parameters<SetItemStatusParams>,
    ) -> Result<CallToolResult, McpError> {
        let status = match p.status.parse() {
            Ok(s) => s,
            Err(e) => return err_text(format!("{}", e)),
        };
        let id = ManuscriptId::from_string(p.manuscript_id);
        respond(self.refinery.set_item_status(&id, p.item_id, status))
    }

    // ── Scoring and report tools ────────────────────────────────────────

    #[tool(description = "Compute the acquisition score from completed analysis results")]
    async fn acquisition_score(
        &self,
        Parameters(p): Parameters<ManuscriptIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let id = ManuscriptId::from_string(p.manuscript_id);
        respond(self.refinery.acquisition_score(&id).await)
    }

    #[tool(description = "Generate a committee report, reader report or rejection letter")]
    async fn generate_report(
        &self,
        Parameters(p): Parameters<ReportParams>,
    ) -> Result<CallToolResult, McpError> {
        let request = match ReportRequest::from_labels(
            &p.kind,
            p.template.as_deref(),
            p.advisor_notes,
            p.tone.as_deref(),
        ) {
            Ok(r) => r,
            Err(e) => return err_text(e.to_string()),
        };
        let id = ManuscriptId::from_string(p.manuscript_id);
        respond(self.refinery.generate_report(&id, &request).await)
    }

    // ── Workflow tools ──────────────────────────────────────────────────

    #[tool(description = "Get the editorial decision record for a manuscript")]
    fn get_decision(
        &self,
        Parameters(p): Parameters<ManuscriptIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let id = ManuscriptId::from_string(p.manuscript_id);
        respond(self.refinery.decision(&id))
    }

    #[tool(description = "Advance the decision to its next stage")]
    fn advance_decision(
        &self,
        Parameters(p): Parameters<AdvanceDecisionParams>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = match parse_opt(p.outcome.as_deref()) {
            Ok(o) => o,
            Err(e) => return err_text(e),
        };
        let id = ManuscriptId::from_string(p.manuscript_id);
        respond(self.refinery.advance_decision(&id, p.notes, outcome))
    }

    #[tool(description = "Pin a comment, suggestion or question to a manuscript")]
    fn add_annotation(
        &self,
        Parameters(p): Parameters<AddAnnotationParams>,
    ) -> Result<CallToolResult, McpError> {
        let kind = match parse_opt(p.kind.as_deref()) {
            Ok(k) => k.unwrap_or_default(),
            Err(e) => return err_text(e),
        };
        let id = ManuscriptId::from_string(p.manuscript_id);
        respond(self.refinery.add_annotation(
            &id,
            NewAnnotation {
                content: p.content,
                kind,
                chapter: p.chapter,
                location_hint: p.location_hint,
            },
        ))
    }

    #[tool(description = "List annotations on a manuscript, oldest first")]
    fn list_annotations(
        &self,
        Parameters(p): Parameters<ManuscriptIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let id = ManuscriptId::from_string(p.manuscript_id);
        respond(self.refinery.list_annotations(&id))
    }

    #[tool(description = "Replace an annotation's content")]
    fn update_annotation(
        &self,
        Parameters(p): Parameters<UpdateAnnotationParams>,
    ) -> Result<CallToolResult, McpError> {
        let id = AnnotationId::from_string(p.annotation_id);
        respond(self.refinery.update_annotation(&id, p.content))
    }

    #[tool(description = "Delete an annotation")]
    fn delete_annotation(
        &self,
        Parameters(p): Parameters<AnnotationIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let id = AnnotationId::from_string(p.annotation_id);
        match self.refinery.delete_annotation(&id) {
            Ok(()) => ok_text(format!("deleted annotation {}", id)),
            Err(e) => err_text(e.to_string()),
        }
    }
}

#[tool_handler]
impl ServerHandler for RefineryMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Refinery MCP server: manuscript import, analysis modules, edit queue, acquisition scoring, reports and editorial workflow"
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run_mcp_server(config: &Config) -> i32 {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to create tokio runtime: {}", e);
            return 1;
        }
    };

    rt.block_on(async {
        let refinery = match Refinery::from_config(config) {
            Ok(r) => r,
            Err(e) => {
                eprintln!(
                    "failed to open database at {}: {}",
                    config.database_path().display(),
                    e
                );
                return 1;
            }
        };

        let server = RefineryMcpServer::new(Arc::new(refinery));

        info!(mode = ?config.analysis.mode, "refinery mcp server starting on stdio");

        let service = match server.serve(rmcp::transport::stdio()).await {
            Ok(s) => s,
            Err(e) => {
                eprintln!("failed to start MCP server: {}", e);
                return 1;
            }
        };

        if let Err(e) = service.waiting().await {
            eprintln!("MCP server error: {}", e);
            return 1;
        }

        0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{OpenStore, SqliteStore};

    fn server() -> RefineryMcpServer {
        let store = SqliteStore::open_in_memory().unwrap();
        let refinery = Refinery::new(Arc::new(store), &Config::default(), None);
        RefineryMcpServer::new(Arc::new(refinery))
    }

    fn text_of(result: &CallToolResult) -> String {
        serde_json::to_value(result).unwrap()["content"][0]["text"]
            .as_str()
            .unwrap_or_default()
            .to_string()
    }

    fn import(server: &RefineryMcpServer) -> String {
        let result = server
            .import_text(Parameters(ImportTextParams {
                title: "Salt Road".into(),
                text: "Chapter 1: Start\nShe felt tired.\n\nChapter 2: End\nShe left.\n".into(),
                file_type: None,
                kind: None,
                author_name: None,
                genre: None,
            }))
            .unwrap();
        let summary: serde_json::Value = serde_json::from_str(&text_of(&result)).unwrap();
        summary["id"].as_str().unwrap().to_string()
    }

    #[test]
    fn import_then_get_outline() {
        let server = server();
        let id = import(&server);

        let result = server
            .get_manuscript(Parameters(ManuscriptIdParams {
                manuscript_id: id,
            }))
            .unwrap();
        assert_ne!(result.is_error, Some(true));
        let body: serde_json::Value = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(body["chapters"].as_array().unwrap().len(), 2);
        assert_eq!(body["chapters"][1]["number"], 2);
    }

    #[test]
    fn bad_labels_are_tool_errors() {
        let server = server();
        let id = import(&server);

        let result = server
            .set_item_status(Parameters(SetItemStatusParams {
                manuscript_id: id,
                item_id: 1,
                status: "maybe".into(),
            }))
            .unwrap();
        assert_eq!(result.is_error, Some(true));

        let result = server
            .get_manuscript(Parameters(ManuscriptIdParams {
                manuscript_id: "missing".into(),
            }))
            .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert!(text_of(&result).contains("not found"));
    }

    #[tokio::test]
    async fn run_module_returns_result_row() {
        let server = server();
        let id = import(&server);

        let result = server
            .run_module(Parameters(RunModuleParams {
                manuscript_id: id,
                module: "prose_refinery".into(),
                discipline: None,
                document_type: None,
                citation_format: None,
            }))
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(body["status"], "completed");
        assert_eq!(body["module"], "prose_refinery");
    }
}
