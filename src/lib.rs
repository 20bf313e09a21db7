//! Refinery: manuscript analysis engine
//!
//! Imports plain-text and Markdown manuscripts, detects chapters, computes
//! local prose statistics and runs AI-backed editorial modules over them.
//! Findings from every module are merged into a severity-sorted edit queue,
//! and completed results feed an acquisition score, editorial reports and a
//! staged decision workflow.
//!
//! # Core Concepts
//!
//! - **Manuscripts**: normalized text split into chapters, stored once
//! - **Modules**: independent analyses (voice, pacing, prose, citations...)
//!   that each produce a typed report and a result row
//! - **Edit queue**: every module's findings merged and sorted by severity
//!
//! # Example
//!
//! ```
//! use refinery::text::detect_chapters;
//!
//! let chapters = detect_chapters("Chapter 1: Start\nIt began.\nChapter 2: End\nIt ended.\n");
//! assert_eq!(chapters.len(), 2);
//! ```

pub mod analysis;
pub mod config;
pub mod gateway;
pub mod http;
pub mod mcp;
pub mod model;
pub mod reports;
pub mod service;
pub mod stats;
pub mod storage;
pub mod text;
pub mod workflow;

pub use analysis::{AnalysisModule, ModuleOptions, ModuleReport, Orchestrator};
pub use config::{AnalysisMode, Config};
pub use model::{DocumentKind, Manuscript, ManuscriptId, ManuscriptStatus};
pub use service::{ImportRequest, Refinery, RefineryError, RefineryResult};
pub use storage::{ManuscriptStore, OpenStore, SqliteStore, StorageError, StorageResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
