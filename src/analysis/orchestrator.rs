//! Module runner
//!
//! Turns one module request into a typed report. Text modules go through
//! excerpting, prompt building and the AI gateway in live mode, or through
//! the demo generator in demo mode. Derived modules (revision center,
//! acquisition score) are built from reports that earlier runs produced.
//!
//! The runner holds no storage; result rows and their lifecycle belong to
//! the service layer.

use super::demo;
use super::excerpt::{select_text, ExcerptStrategy};
use super::merger::aggregate_edit_queue;
use super::module::{AnalysisModule, ModuleOptions};
use super::prompts::{self, system_prompt};
use super::score::{assess_originality, compute_acquisition_score, ComponentScores, ScoreWeights};
use super::types::ModuleReport;
use crate::config::{AnalysisConfig, AnalysisMode};
use crate::gateway::{AiClient, AiError};
use crate::stats::{detect_citations, dialogue_stats, manuscript_stats, passive_voice_stats, prose_stats};
use crate::text::Chapter;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Errors from running a single module.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Ai(#[from] AiError),

    #[error("could not read {module} reply: {message}")]
    Report {
        module: AnalysisModule,
        message: String,
    },
}

/// Everything a module run reads.
#[derive(Debug, Clone, Copy)]
pub struct ModuleInput<'a> {
    pub raw_text: &'a str,
    pub chapters: &'a [Chapter],
    pub options: &'a ModuleOptions,
    /// Latest completed report per module, for derived modules.
    pub prior: &'a BTreeMap<AnalysisModule, ModuleReport>,
}

/// Runs analysis modules against one manuscript.
pub struct Orchestrator {
    client: Option<Arc<dyn AiClient>>,
    config: AnalysisConfig,
    weights: ScoreWeights,
}

impl Orchestrator {
    pub fn new(
        client: Option<Arc<dyn AiClient>>,
        config: AnalysisConfig,
        weights: ScoreWeights,
    ) -> Self {
        Self {
            client,
            config,
            weights,
        }
    }

    /// Demo runner: no client, never fails.
    pub fn demo() -> Self {
        Self::new(None, AnalysisConfig::default(), ScoreWeights::default())
    }

    pub fn mode(&self) -> AnalysisMode {
        self.config.mode
    }

    pub fn is_demo(&self) -> bool {
        self.config.mode == AnalysisMode::Demo
    }

    /// Client for live calls, or an error naming why there is none.
    pub fn client(&self) -> Result<&Arc<dyn AiClient>, AiError> {
        self.client
            .as_ref()
            .ok_or_else(|| AiError::NotConfigured("no API key set for live analysis".to_string()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.analysis_timeout_secs)
    }

    /// Run one module and return its report.
    pub async fn run(
        &self,
        module: AnalysisModule,
        input: ModuleInput<'_>,
    ) -> Result<ModuleReport, AnalysisError> {
        let started = Instant::now();
        let report = match module {
            AnalysisModule::RevisionCenter => {
                ModuleReport::RevisionCenter(aggregate_edit_queue(input.prior))
            }
            AnalysisModule::AcquisitionScore => {
                let originality = self.originality(input.raw_text).await;
                let components = ComponentScores::from_reports(input.prior, Some(originality));
                ModuleReport::AcquisitionScore(compute_acquisition_score(components, &self.weights))
            }
            _ if self.is_demo() => {
                demo::demo_report(module, input.raw_text, input.chapters, input.options)
                    .ok_or_else(|| AnalysisError::Report {
                        module,
                        message: "no demo report for this module".to_string(),
                    })?
            }
            _ => self.run_live(module, input).await?,
        };

        info!(
            module = %module,
            mode = ?self.config.mode,
            duration_ms = started.elapsed().as_millis() as u64,
            scores = %report.scores(),
            "Module finished"
        );
        Ok(report)
    }

    async fn originality(&self, raw_text: &str) -> f64 {
        if self.is_demo() {
            return demo::originality(raw_text);
        }
        match &self.client {
            Some(client) => assess_originality(client.as_ref(), raw_text, self.timeout()).await,
            None => super::score::NEUTRAL_SCORE,
        }
    }

    async fn run_live(
        &self,
        module: AnalysisModule,
        input: ModuleInput<'_>,
    ) -> Result<ModuleReport, AnalysisError> {
        let client = self.client()?;
        let ModuleInput {
            raw_text,
            chapters,
            options,
            ..
        } = input;
        let excerpt = |strategy| {
            select_text(
                raw_text,
                chapters,
                strategy,
                self.config.excerpt_threshold_chars,
                self.config.prompt_char_cap,
            )
        };

        let (system, user) = match module {
            AnalysisModule::IntelligenceEngine => {
                let stats = manuscript_stats(raw_text, chapters);
                (
                    prompts::INTELLIGENCE_SYSTEM,
                    prompts::intelligence_prompt(
                        &excerpt(ExcerptStrategy::Structure),
                        stats.word_count,
                        chapters.len(),
                    ),
                )
            }
            AnalysisModule::VoiceIsolation => {
                let stats = dialogue_stats(raw_text, chapters);
                (
                    prompts::VOICE_SYSTEM,
                    prompts::voice_prompt(
                        &excerpt(ExcerptStrategy::Dialogue),
                        stats.total_dialogue_lines,
                    ),
                )
            }
            AnalysisModule::PacingArchitect => (
                prompts::PACING_SYSTEM,
                prompts::pacing_prompt(&excerpt(ExcerptStrategy::Pacing), chapters.len()),
            ),
            AnalysisModule::CharacterArc => (
                prompts::CHARACTER_ARC_SYSTEM,
                prompts::character_arc_prompt(&excerpt(ExcerptStrategy::Structure), chapters.len()),
            ),
            AnalysisModule::ProseRefinery => {
                let stats = prose_stats(raw_text, chapters);
                (
                    prompts::PROSE_SYSTEM,
                    prompts::prose_prompt(&excerpt(ExcerptStrategy::Prose), &stats),
                )
            }
            AnalysisModule::ArgumentCoherence => (
                prompts::ARGUMENT_SYSTEM,
                prompts::argument_prompt(
                    &excerpt(ExcerptStrategy::Argument),
                    chapters.len(),
                    options,
                ),
            ),
            AnalysisModule::CitationArchitecture => {
                let stats = detect_citations(raw_text);
                (
                    prompts::CITATION_SYSTEM,
                    prompts::citation_prompt(
                        &excerpt(ExcerptStrategy::HeadTail),
                        stats.estimated_citation_count,
                        options,
                    ),
                )
            }
            AnalysisModule::AcademicVoice => {
                let stats = passive_voice_stats(raw_text, chapters);
                (
                    prompts::ACADEMIC_VOICE_SYSTEM,
                    prompts::academic_voice_prompt(
                        &excerpt(ExcerptStrategy::HeadTail),
                        stats.total_passive_pct,
                        options,
                    ),
                )
            }
            AnalysisModule::RevisionCenter | AnalysisModule::AcquisitionScore => {
                return Err(AnalysisError::Report {
                    module,
                    message: "derived modules are not sent to the AI service".to_string(),
                })
            }
        };

        debug!(module = %module, prompt_chars = user.len(), "Calling AI service");
        let system = system_prompt(system);
        let call = client.analyze_json(&system, &user, None);
        let value = tokio::time::timeout(self.timeout(), call)
            .await
            .map_err(|_| AiError::Timeout(self.config.analysis_timeout_secs))??;

        let mut report =
            ModuleReport::from_json(module, value).map_err(|e| AnalysisError::Report {
                module,
                message: e.to_string(),
            })?;
        attach_local_stats(&mut report, raw_text, chapters);
        Ok(report)
    }
}

/// Attach the local statistics a module was prompted with.
fn attach_local_stats(report: &mut ModuleReport, raw_text: &str, chapters: &[Chapter]) {
    match report {
        ModuleReport::IntelligenceEngine(r) => {
            r.local_stats = Some(manuscript_stats(raw_text, chapters))
        }
        ModuleReport::VoiceIsolation(r) => r.local_stats = Some(dialogue_stats(raw_text, chapters)),
        ModuleReport::ProseRefinery(r) => r.local_stats = Some(prose_stats(raw_text, chapters)),
        ModuleReport::CitationArchitecture(r) => r.local_stats = Some(detect_citations(raw_text)),
        ModuleReport::AcademicVoice(r) => {
            r.local_stats = Some(passive_voice_stats(raw_text, chapters))
        }
        _ => {}
    }
}
