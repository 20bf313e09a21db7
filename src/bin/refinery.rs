//! Refinery CLI: manuscript analysis with REST and MCP servers.
//!
//! Usage:
//!   refinery import <file> [--title t] [--kind fiction|academic]
//!   refinery analyze <id> [--module name]
//!   refinery queue <id> list|accept|reject|reset
//!   refinery serve [--bind addr]
//!   refinery mcp [--transport stdio]

use clap::{Parser, Subcommand};
use refinery::analysis::{AnalysisModule, ItemStatus, ModuleOptions};
use refinery::config::Config;
use refinery::model::{AnnotationId, DocumentKind, ManuscriptId};
use refinery::reports::ReportRequest;
use refinery::service::{NewAnnotation, Refinery};
use refinery::workflow::{AnnotationKind, Outcome};
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "refinery",
    version,
    about = "Manuscript analysis engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to SQLite database file
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a .txt or .md manuscript
    Import {
        path: PathBuf,
        #[arg(long)]
        title: Option<String>,
        /// fiction or academic
        #[arg(long)]
        kind: Option<DocumentKind>,
    },
    /// List manuscripts
    List,
    /// Show a manuscript and its chapters
    Show { id: String },
    /// Delete a manuscript and everything derived from it
    Delete { id: String },
    /// Run one module, or the full plan for the manuscript's kind
    Analyze {
        id: String,
        /// Module name; omit to run the full plan
        #[arg(long)]
        module: Option<AnalysisModule>,
        #[arg(long, default_value = "general")]
        discipline: String,
        #[arg(long, default_value = "dissertation")]
        document_type: String,
        #[arg(long, default_value = "APA")]
        citation_format: String,
    },
    /// List analysis results, or print one result in full
    Results {
        id: String,
        /// Print this result's report as JSON
        #[arg(long)]
        result: Option<String>,
    },
    /// Work the edit queue
    Queue {
        id: String,
        #[command(subcommand)]
        action: QueueAction,
    },
    /// Compute the acquisition score
    Score { id: String },
    /// Generate a report
    Report {
        id: String,
        /// committee, reader or rejection
        #[arg(long, default_value = "reader")]
        kind: String,
        /// Committee template
        #[arg(long)]
        template: Option<String>,
        /// Advisor notes for a committee report
        #[arg(long)]
        notes: Option<String>,
        /// Rejection tone
        #[arg(long)]
        tone: Option<String>,
    },
    /// Show or advance the editorial decision
    Workflow {
        id: String,
        #[command(subcommand)]
        action: Option<WorkflowAction>,
    },
    /// Manage annotations
    Annotate {
        #[command(subcommand)]
        action: AnnotateAction,
    },
    /// Start the REST API server
    Serve {
        /// Address to bind, overriding the config
        #[arg(long)]
        bind: Option<String>,
    },
    /// Start the MCP (Model Context Protocol) server
    Mcp {
        /// Transport type (currently only stdio)
        #[arg(long, default_value = "stdio")]
        transport: String,
    },
}

#[derive(Subcommand)]
enum QueueAction {
    /// List items
    List {
        #[arg(long)]
        status: Option<ItemStatus>,
    },
    /// Accept an item
    Accept { item: u32 },
    /// Reject an item
    Reject { item: u32 },
    /// Return an item to pending
    Reset { item: u32 },
}

#[derive(Subcommand)]
enum WorkflowAction {
    /// Move to the next stage
    Advance {
        #[arg(long)]
        notes: Option<String>,
        /// Final outcome (director stage only)
        #[arg(long)]
        outcome: Option<Outcome>,
    },
}

#[derive(Subcommand)]
enum AnnotateAction {
    /// Add an annotation to a manuscript
    Add {
        id: String,
        content: String,
        #[arg(long, default_value = "comment")]
        kind: AnnotationKind,
        #[arg(long)]
        chapter: Option<u32>,
        #[arg(long)]
        location: Option<String>,
    },
    /// List a manuscript's annotations
    List { id: String },
    /// Replace an annotation's content
    Edit { annotation_id: String, content: String },
    /// Delete an annotation
    Delete { annotation_id: String },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("refinery=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>, db: Option<PathBuf>) -> Result<Config, String> {
    let mut config = Config::load(path).map_err(|e| format!("Failed to load config: {}", e))?;
    if db.is_some() {
        config.database = db;
    }
    Ok(config)
}

fn block_on<F: Future<Output = i32>>(fut: F) -> i32 {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt.block_on(fut),
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            1
        }
    }
}

fn fail(e: impl std::fmt::Display) -> i32 {
    eprintln!("Error: {}", e);
    1
}

fn print_json<T: serde::Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{}", text);
            0
        }
        Err(e) => fail(e),
    }
}

// ── Manuscript commands ────────────────────────────────────────────────────

fn cmd_import(
    refinery: &Refinery,
    path: &Path,
    title: Option<String>,
    kind: Option<DocumentKind>,
) -> i32 {
    match refinery.import_file(path, title, kind) {
        Ok(m) => {
            println!(
                "Imported '{}' ({}): {} words, {} chapters, {}",
                m.title, m.id, m.word_count, m.chapter_count, m.kind
            );
            0
        }
        Err(e) => fail(e),
    }
}

fn cmd_list(refinery: &Refinery) -> i32 {
    match refinery.list_manuscripts() {
        Ok(manuscripts) => {
            if manuscripts.is_empty() {
                println!("No manuscripts.");
                return 0;
            }
            for m in manuscripts {
                println!(
                    "{}  {:<32}  {:<8}  {:>7} words  {:>3} ch  {}",
                    m.id, m.title, m.kind, m.word_count, m.chapter_count, m.status
                );
            }
            0
        }
        Err(e) => fail(e),
    }
}

fn cmd_show(refinery: &Refinery, id: &ManuscriptId) -> i32 {
    match refinery.get_manuscript(id) {
        Ok(m) => {
            println!("{} ({})", m.title, m.id);
            if let Some(author) = &m.author_name {
                println!("Author:   {}", author);
            }
            println!("Kind:     {}", m.kind);
            println!("Status:   {}", m.status);
            println!("Words:    {}", m.word_count);
            println!("Chapters:");
            for chapter in &m.chapters {
                println!(
                    "  {:>3}. {:<40} {:>6} words",
                    chapter.number(),
                    chapter.title,
                    chapter.word_count
                );
            }
            0
        }
        Err(e) => fail(e),
    }
}

fn cmd_delete(refinery: &Refinery, id: &ManuscriptId) -> i32 {
    match refinery.delete_manuscript(id) {
        Ok(()) => {
            println!("Deleted manuscript {}", id);
            0
        }
        Err(e) => fail(e),
    }
}

// ── Analysis commands ──────────────────────────────────────────────────────

async fn cmd_analyze(
    refinery: &Refinery,
    id: &ManuscriptId,
    module: Option<AnalysisModule>,
    options: ModuleOptions,
) -> i32 {
    let results = match module {
        Some(module) => refinery
            .run_module(id, module, &options)
            .await
            .map(|r| vec![r]),
        None => refinery.run_all(id, &options).await,
    };
    match results {
        Ok(results) => {
            for r in results {
                println!("{:<24} {:<10} {}", r.module.display_name(), r.status, r.scores);
            }
            0
        }
        Err(e) => fail(e),
    }
}

fn cmd_results(refinery: &Refinery, id: &ManuscriptId, result: Option<String>) -> i32 {
    if let Some(result_id) = result {
        return match refinery.get_result(&refinery::model::ResultId::from_string(result_id)) {
            Ok(r) => print_json(&r),
            Err(e) => fail(e),
        };
    }
    match refinery.list_results(id) {
        Ok(results) => {
            if results.is_empty() {
                println!("No analysis results.");
            }
            for r in results {
                let duration = r
                    .duration_seconds
                    .map(|d| format!("{:.1}s", d))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{}  {:<24} {:<10} {:>7}  {}",
                    r.id,
                    r.module.display_name(),
                    r.status,
                    duration,
                    r.error.as_deref().map(String::from).unwrap_or_else(|| r.scores.to_string())
                );
            }
            0
        }
        Err(e) => fail(e),
    }
}

fn cmd_queue(refinery: &Refinery, id: &ManuscriptId, action: QueueAction) -> i32 {
    let (item, status) = match action {
        QueueAction::List { status } => {
            return match refinery.edit_queue(id, status) {
                Ok(queue) => {
                    for item in &queue.items {
                        println!(
                            "#{:<3} [{:<6}] {:<9} {} | {}: {}",
                            item.id,
                            item.severity,
                            item.status,
                            item.module.display_name(),
                            item.chapter_ref,
                            item.finding
                        );
                        if !item.suggestion.is_empty() {
                            println!("      -> {}", item.suggestion);
                        }
                    }
                    let s = &queue.stats;
                    println!(
                        "{} items ({} high, {} medium, {} low)",
                        s.total, s.high, s.medium, s.low
                    );
                    0
                }
                Err(e) => fail(e),
            };
        }
        QueueAction::Accept { item } => (item, ItemStatus::Accepted),
        QueueAction::Reject { item } => (item, ItemStatus::Rejected),
        QueueAction::Reset { item } => (item, ItemStatus::Pending),
    };
    match refinery.set_item_status(id, item, status) {
        Ok(item) => {
            println!("Item #{} is now {}", item.id, item.status);
            0
        }
        Err(e) => fail(e),
    }
}

async fn cmd_score(refinery: &Refinery, id: &ManuscriptId) -> i32 {
    match refinery.acquisition_score(id).await {
        Ok(score) => {
            println!(
                "Acquisition score: {} ({})",
                score.acquisition_score,
                score.tier.label()
            );
            for part in &score.breakdown {
                println!(
                    "  {:<24} {:>5.1} x {:.2} = {:>5.1}",
                    part.component, part.score, part.weight, part.weighted_contribution
                );
            }
            0
        }
        Err(e) => fail(e),
    }
}

async fn cmd_report(refinery: &Refinery, id: &ManuscriptId, request: ReportRequest) -> i32 {
    match refinery.generate_report(id, &request).await {
        Ok(report) => print_json(&report),
        Err(e) => fail(e),
    }
}

// ── Workflow commands ──────────────────────────────────────────────────────

fn cmd_workflow(refinery: &Refinery, id: &ManuscriptId, action: Option<WorkflowAction>) -> i32 {
    let result = match action {
        None => refinery.decision(id),
        Some(WorkflowAction::Advance { notes, outcome }) => {
            refinery.advance_decision(id, notes, outcome)
        }
    };
    match result {
        Ok(decision) => {
            println!("Stage:   {}", decision.stage);
            println!("Outcome: {}", decision.outcome);
            for (label, notes) in [
                ("Reader", &decision.reader_notes),
                ("Editor", &decision.editor_notes),
                ("Director", &decision.director_notes),
            ] {
                if let Some(notes) = notes {
                    println!("{} notes: {}", label, notes);
                }
            }
            0
        }
        Err(e) => fail(e),
    }
}

fn cmd_annotate(refinery: &Refinery, action: AnnotateAction) -> i32 {
    match action {
        AnnotateAction::Add {
            id,
            content,
            kind,
            chapter,
            location,
        } => {
            let new = NewAnnotation {
                content,
                kind,
                chapter,
                location_hint: location,
            };
            match refinery.add_annotation(&ManuscriptId::from_string(id), new) {
                Ok(a) => {
                    println!("Added {} {}", a.kind, a.id);
                    0
                }
                Err(e) => fail(e),
            }
        }
        AnnotateAction::List { id } => match refinery.list_annotations(&ManuscriptId::from_string(id)) {
            Ok(annotations) => {
                for a in annotations {
                    let place = match (a.chapter, &a.location_hint) {
                        (Some(ch), Some(hint)) => format!("ch {} ({})", ch, hint),
                        (Some(ch), None) => format!("ch {}", ch),
                        (None, Some(hint)) => hint.clone(),
                        (None, None) => "-".to_string(),
                    };
                    println!("{}  {:<10} {:<16} {}", a.id, a.kind, place, a.content);
                }
                0
            }
            Err(e) => fail(e),
        },
        AnnotateAction::Edit {
            annotation_id,
            content,
        } => match refinery.update_annotation(&AnnotationId::from_string(annotation_id), content) {
            Ok(a) => {
                println!("Updated {}", a.id);
                0
            }
            Err(e) => fail(e),
        },
        AnnotateAction::Delete { annotation_id } => {
            let id = AnnotationId::from_string(annotation_id);
            match refinery.delete_annotation(&id) {
                Ok(()) => {
                    println!("Deleted {}", id);
                    0
                }
                Err(e) => fail(e),
            }
        }
    }
}

fn run(cli: Cli) -> i32 {
    let config = match load_config(cli.config.as_deref(), cli.db) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };

    match &cli.command {
        Commands::Mcp { transport } => {
            if transport != "stdio" {
                return fail("only 'stdio' transport is currently supported");
            }
            return refinery::mcp::run_mcp_server(&config);
        }
        Commands::Serve { bind } => {
            return block_on(async {
                match refinery::http::serve(&config, bind.as_deref()).await {
                    Ok(()) => 0,
                    Err(e) => fail(e),
                }
            });
        }
        _ => {}
    }

    let refinery = match Refinery::from_config(&config) {
        Ok(r) => r,
        Err(e) => return fail(format!("Failed to open database: {}", e)),
    };

    match cli.command {
        Commands::Import { path, title, kind } => cmd_import(&refinery, &path, title, kind),
        Commands::List => cmd_list(&refinery),
        Commands::Show { id } => cmd_show(&refinery, &ManuscriptId::from_string(id)),
        Commands::Delete { id } => cmd_delete(&refinery, &ManuscriptId::from_string(id)),
        Commands::Analyze {
            id,
            module,
            discipline,
            document_type,
            citation_format,
        } => {
            let options = ModuleOptions {
                discipline,
                document_type,
                citation_format,
            };
            let id = ManuscriptId::from_string(id);
            block_on(cmd_analyze(&refinery, &id, module, options))
        }
        Commands::Results { id, result } => {
            cmd_results(&refinery, &ManuscriptId::from_string(id), result)
        }
        Commands::Queue { id, action } => {
            cmd_queue(&refinery, &ManuscriptId::from_string(id), action)
        }
        Commands::Score { id } => {
            let id = ManuscriptId::from_string(id);
            block_on(cmd_score(&refinery, &id))
        }
        Commands::Report {
            id,
            kind,
            template,
            notes,
            tone,
        } => {
            let request = match ReportRequest::from_labels(
                &kind,
                template.as_deref(),
                notes,
                tone.as_deref(),
            ) {
                Ok(r) => r,
                Err(e) => return fail(e),
            };
            let id = ManuscriptId::from_string(id);
            block_on(cmd_report(&refinery, &id, request))
        }
        Commands::Workflow { id, action } => {
            cmd_workflow(&refinery, &ManuscriptId::from_string(id), action)
        }
        Commands::Annotate { action } => cmd_annotate(&refinery, action),
        Commands::Serve { .. } | Commands::Mcp { .. } => 0,
    }
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    std::process::exit(run(cli));
}
