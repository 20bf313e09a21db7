//! Manuscript analysis pipeline
//!
//! Each [`AnalysisModule`] turns manuscript text into a typed
//! [`ModuleReport`]. Eight modules read the text itself; two are derived
//! from earlier reports:
//!
//! - **Text modules** select an excerpt ([`excerpt`]), build a prompt with
//!   local statistics as hints ([`prompts`]) and parse the model's JSON
//!   reply leniently into a report ([`types`]). In demo mode the
//!   [`demo`] generator builds the same report shape from statistics.
//! - **Revision center** flattens findings from completed reports into a
//!   severity-sorted edit queue ([`merger`]).
//! - **Acquisition score** combines component scores into a weighted
//!   composite with a recommendation tier ([`score`]).
//!
//! The [`Orchestrator`] dispatches a module run; persistence of result rows
//! and their status lifecycle happens in the service layer.
//!
//! # Example
//!
//! ```ignore
//! use refinery::analysis::{AnalysisModule, ModuleInput, ModuleOptions, Orchestrator};
//!
//! let orchestrator = Orchestrator::demo();
//! let chapters = refinery::text::detect_chapters(&text);
//! let input = ModuleInput {
//!     raw_text: &text,
//!     chapters: &chapters,
//!     options: &ModuleOptions::default(),
//!     prior: &Default::default(),
//! };
//! let report = orchestrator.run(AnalysisModule::ProseRefinery, input).await?;
//! println!("{}", report.scores());
//! ```

pub mod demo;
pub mod excerpt;
mod merger;
mod module;
mod orchestrator;
pub mod prompts;
mod score;
mod types;

pub use excerpt::{build_excerpt, select_text, ExcerptStrategy};
pub use merger::{
    aggregate_edit_queue, carry_over_statuses, EditQueue, EditQueueItem, ItemStatus, QueueStats,
};
pub use module::{AnalysisModule, ModuleOptions, UnknownModule};
pub use orchestrator::{AnalysisError, ModuleInput, Orchestrator};
pub use score::{
    assess_originality, compute_acquisition_score, AcquisitionScore, ComponentBreakdown,
    ComponentScores, ScoreWeights, Tier, NEUTRAL_SCORE,
};
pub use types::*;
