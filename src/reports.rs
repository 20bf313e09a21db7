//! Editorial report generation
//!
//! Three report kinds are written from completed analysis results: a
//! committee report for academic manuscripts, a reader report for
//! acquisition review and a rejection letter. Live mode asks the AI service
//! to write the prose; demo mode assembles the same shapes from scores and
//! summaries.

use crate::analysis::{AcquisitionScore, AnalysisModule, ModuleReport, Tier};
use crate::gateway::{AiClient, AiError};
use crate::model::{label_enum, ParseLabelError};
use crate::text::head;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

pub const REPORT_SYSTEM: &str = "You are Refinery's Report Generator, a professional editorial \
report writer. You generate clear, structured, professional reports based on manuscript analysis \
data. Write in professional prose, not bullet points. Be specific and constructive. Return ONLY \
valid JSON.";

const ANALYSIS_CHARS: usize = 15_000;
const REJECTION_ANALYSIS_CHARS: usize = 10_000;
const SCORE_CHARS: usize = 3_000;

// ── Report options ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitteeTemplate {
    ProposalDefense,
    ChapterReview,
    #[default]
    FullDraftReview,
    FinalDefensePrep,
}

label_enum!(CommitteeTemplate, "committee template", {
    ProposalDefense => "proposal_defense",
    ChapterReview => "chapter_review",
    FullDraftReview => "full_draft_review",
    FinalDefensePrep => "final_defense_prep",
});

impl CommitteeTemplate {
    pub fn description(&self) -> &'static str {
        match self {
            Self::ProposalDefense => "Dissertation proposal defense report; focus on thesis viability, methodology and argument structure",
            Self::ChapterReview => "Chapter review report; focus on individual chapter quality and connection to the overall argument",
            Self::FullDraftReview => "Full draft review report; comprehensive assessment of the complete manuscript",
            Self::FinalDefensePrep => "Final defense preparation report; identify remaining issues before the defense",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionTone {
    #[default]
    Standard,
    Encouraging,
    Detailed,
}

label_enum!(RejectionTone, "rejection tone", {
    Standard => "standard",
    Encouraging => "encouraging",
    Detailed => "detailed",
});

impl RejectionTone {
    pub fn instructions(&self) -> &'static str {
        match self {
            Self::Standard => "Professional and brief. Acknowledge the submission, decline, wish them well.",
            Self::Encouraging => "Warm and encouraging. Note 2-3 specific strengths before the pass. Encourage resubmission or continued writing.",
            Self::Detailed => "Specific craft-level notes. Mention 2-3 strengths and 2-3 specific areas for improvement.",
        }
    }
}

/// Which report to write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportRequest {
    Committee {
        #[serde(default)]
        template: CommitteeTemplate,
        #[serde(default)]
        advisor_notes: Option<String>,
    },
    Reader,
    Rejection {
        #[serde(default)]
        tone: RejectionTone,
    },
}

impl ReportRequest {
    /// Build a request from loose labels. Missing options take defaults.
    pub fn from_labels(
        kind: &str,
        template: Option<&str>,
        advisor_notes: Option<String>,
        tone: Option<&str>,
    ) -> Result<Self, ParseLabelError> {
        match kind.trim().to_ascii_lowercase().as_str() {
            "committee" => Ok(Self::Committee {
                template: template.map(str::parse).transpose()?.unwrap_or_default(),
                advisor_notes,
            }),
            "reader" => Ok(Self::Reader),
            "rejection" => Ok(Self::Rejection {
                tone: tone.map(str::parse).transpose()?.unwrap_or_default(),
            }),
            other => Err(ParseLabelError::new("report kind", other)),
        }
    }
}

// ── Report shapes ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSection {
    pub heading: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitteeReport {
    pub report_type: String,
    pub title: String,
    pub date: String,
    pub sections: Vec<ReportSection>,
    pub executive_summary: String,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub recommendations: Vec<String>,
    pub overall_assessment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderNote {
    pub category: String,
    pub description: String,
    /// `major` or `minor`; only set on concerns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderReport {
    pub title: String,
    pub author: String,
    pub synopsis: String,
    pub acquisition_score: u32,
    pub strengths: Vec<ReaderNote>,
    pub concerns: Vec<ReaderNote>,
    pub market_positioning: String,
    pub editorial_investment: String,
    /// ACQUIRE, CONSIDER, REVISE_AND_RESUBMIT or PASS.
    pub recommendation: String,
    pub recommendation_rationale: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RejectionLetter {
    pub subject: String,
    pub salutation: String,
    pub body: String,
    pub closing: String,
    pub tone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "report", rename_all = "snake_case")]
pub enum Report {
    Committee(CommitteeReport),
    Reader(ReaderReport),
    Rejection(RejectionLetter),
}

/// What a report is written from.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    pub title: &'a str,
    pub author: &'a str,
    /// Month and year shown on committee reports.
    pub date: &'a str,
    pub analysis: &'a BTreeMap<AnalysisModule, ModuleReport>,
}

impl ReportContext<'_> {
    fn acquisition(&self) -> Option<&AcquisitionScore> {
        match self.analysis.get(&AnalysisModule::AcquisitionScore) {
            Some(ModuleReport::AcquisitionScore(score)) => Some(score),
            _ => None,
        }
    }

    /// Pretty JSON of the analysis, cut to `limit` characters.
    fn digest(&self, limit: usize) -> String {
        let json = serde_json::to_string_pretty(self.analysis).unwrap_or_default();
        head(&json, limit).to_string()
    }
}

// ── Prompts ────────────────────────────────────────────────────────────────

pub fn committee_prompt(
    ctx: &ReportContext<'_>,
    template: CommitteeTemplate,
    advisor_notes: Option<&str>,
) -> String {
    format!(
        r#"Generate a committee-ready academic report for the manuscript "{title}".
Report type: {template} ({description})

Analysis data:
{analysis}

Advisor notes: {notes}

Return ONLY valid JSON with this structure:
{{
    "report_type": "{template}",
    "title": "Report title",
    "date": "{date}",
    "sections": [{{"heading": "Section heading", "content": "2-4 paragraphs of prose"}}],
    "executive_summary": "3-5 paragraph executive summary",
    "strengths": ["strength"],
    "areas_for_improvement": ["area"],
    "recommendations": ["recommendation"],
    "overall_assessment": "A final assessment paragraph"
}}"#,
        title = ctx.title,
        template = template,
        description = template.description(),
        analysis = ctx.digest(ANALYSIS_CHARS),
        notes = advisor_notes.filter(|n| !n.trim().is_empty()).unwrap_or("None provided"),
        date = ctx.date,
    )
}

pub fn reader_prompt(ctx: &ReportContext<'_>) -> String {
    let score = ctx.acquisition();
    let score_json = score
        .and_then(|s| serde_json::to_string_pretty(s).ok())
        .unwrap_or_else(|| "{}".to_string());
    format!(
        r#"Generate a professional reader report for manuscript acquisition review.

Title: {title}
Author: {author}
Acquisition Score: {score_json}

Analysis data:
{analysis}

Return ONLY valid JSON with this structure:
{{
    "title": "{title}",
    "author": "{author}",
    "synopsis": "200-word synopsis of the manuscript",
    "acquisition_score": {score},
    "strengths": [{{"category": "Voice, Pacing, Structure...", "description": "Detailed description"}}],
    "concerns": [{{"category": "Category", "description": "Detailed description", "severity": "major|minor"}}],
    "market_positioning": "Brief assessment of market fit and comparable titles",
    "editorial_investment": "How much editorial work would be needed",
    "recommendation": "ACQUIRE|CONSIDER|REVISE_AND_RESUBMIT|PASS",
    "recommendation_rationale": "2-3 paragraph rationale"
}}"#,
        title = ctx.title,
        author = ctx.author,
        score_json = head(&score_json, SCORE_CHARS),
        analysis = ctx.digest(ANALYSIS_CHARS),
        score = score.map(|s| s.acquisition_score).unwrap_or(0),
    )
}

pub fn rejection_prompt(ctx: &ReportContext<'_>, tone: RejectionTone) -> String {
    format!(
        r#"Generate a personalized rejection letter for a manuscript submission.

Title: {title}
Author: {author}
Tone: {tone} ({instructions})

Analysis highlights:
{analysis}

Return ONLY valid JSON with this structure:
{{
    "subject": "Email subject line",
    "salutation": "Dear {author},",
    "body": "The full letter body",
    "closing": "Professional closing",
    "tone": "{tone}"
}}"#,
        title = ctx.title,
        author = ctx.author,
        tone = tone,
        instructions = tone.instructions(),
        analysis = ctx.digest(REJECTION_ANALYSIS_CHARS),
    )
}

// ── Writer ─────────────────────────────────────────────────────────────────

/// Writes reports through the AI service, or deterministically without one.
pub struct ReportWriter<'a> {
    client: Option<&'a dyn AiClient>,
    timeout: Duration,
}

impl<'a> ReportWriter<'a> {
    pub fn live(client: &'a dyn AiClient, timeout: Duration) -> Self {
        Self {
            client: Some(client),
            timeout,
        }
    }

    pub fn demo() -> Self {
        Self {
            client: None,
            timeout: Duration::ZERO,
        }
    }

    pub async fn write(
        &self,
        ctx: &ReportContext<'_>,
        request: &ReportRequest,
    ) -> Result<Report, AiError> {
        let report = match request {
            ReportRequest::Committee {
                template,
                advisor_notes,
            } => {
                let notes = advisor_notes.as_deref();
                let report = match self.client {
                    Some(client) => {
                        let prompt = committee_prompt(ctx, *template, notes);
                        self.ask(client, &prompt).await?
                    }
                    None => demo_committee(ctx, *template, notes),
                };
                Report::Committee(report)
            }
            ReportRequest::Reader => Report::Reader(match self.client {
                Some(client) => self.ask(client, &reader_prompt(ctx)).await?,
                None => demo_reader(ctx),
            }),
            ReportRequest::Rejection { tone } => Report::Rejection(match self.client {
                Some(client) => self.ask(client, &rejection_prompt(ctx, *tone)).await?,
                None => demo_rejection(ctx, *tone),
            }),
        };
        Ok(report)
    }

    async fn ask<T: serde::de::DeserializeOwned>(
        &self,
        client: &dyn AiClient,
        prompt: &str,
    ) -> Result<T, AiError> {
        debug!(prompt_chars = prompt.len(), "Requesting report");
        let value = tokio::time::timeout(self.timeout, client.analyze_json(REPORT_SYSTEM, prompt, None))
            .await
            .map_err(|_| AiError::Timeout(self.timeout.as_secs()))??;
        serde_json::from_value(value).map_err(|e| AiError::Parse(e.to_string()))
    }
}

// ── Demo reports ───────────────────────────────────────────────────────────

/// Headline score of each scored module, in module order.
fn headline_scores(ctx: &ReportContext<'_>) -> Vec<(AnalysisModule, f64)> {
    ctx.analysis
        .iter()
        .filter(|(module, _)| !module.is_derived())
        .filter_map(|(module, report)| {
            let s = report.scores();
            s.overall
                .or(s.voice)
                .or(s.pacing)
                .or(s.character)
                .or(s.prose)
                .or(s.structure)
                .map(|score| (*module, score))
        })
        .collect()
}

fn strengths(ctx: &ReportContext<'_>) -> Vec<(AnalysisModule, f64)> {
    headline_scores(ctx).into_iter().filter(|(_, s)| *s >= 70.0).collect()
}

fn weaknesses(ctx: &ReportContext<'_>) -> Vec<(AnalysisModule, f64)> {
    headline_scores(ctx).into_iter().filter(|(_, s)| *s < 60.0).collect()
}

fn summaries(ctx: &ReportContext<'_>) -> Vec<ReportSection> {
    ctx.analysis
        .values()
        .filter_map(|report| {
            report.summary().map(|summary| ReportSection {
                heading: report.module().display_name().to_string(),
                content: summary.to_string(),
            })
        })
        .collect()
}

fn high_priority_findings(ctx: &ReportContext<'_>) -> Vec<String> {
    match ctx.analysis.get(&AnalysisModule::RevisionCenter) {
        Some(ModuleReport::RevisionCenter(queue)) => queue
            .items
            .iter()
            .filter(|i| i.severity == crate::analysis::Severity::High)
            .take(5)
            .map(|i| i.suggestion.clone())
            .collect(),
        _ => Vec::new(),
    }
}

fn demo_committee(
    ctx: &ReportContext<'_>,
    template: CommitteeTemplate,
    advisor_notes: Option<&str>,
) -> CommitteeReport {
    let strong = strengths(ctx);
    let weak = weaknesses(ctx);
    let mut recommendations = high_priority_findings(ctx);
    if recommendations.is_empty() {
        recommendations = weak
            .iter()
            .map(|(m, _)| format!("Revisit {} before the next committee meeting", m.display_name()))
            .collect();
    }
    if let Some(notes) = advisor_notes.filter(|n| !n.trim().is_empty()) {
        recommendations.push(format!("Address advisor notes: {}", notes.trim()));
    }

    let scored = headline_scores(ctx);
    let mean = scored.iter().map(|(_, s)| s).sum::<f64>() / scored.len().max(1) as f64;

    CommitteeReport {
        report_type: template.to_string(),
        title: format!("{}: {}", template_title(template), ctx.title),
        date: ctx.date.to_string(),
        sections: summaries(ctx),
        executive_summary: format!(
            "This {} covers \"{}\" across {} completed analyses with a mean module score of {:.0}.",
            template_title(template).to_lowercase(),
            ctx.title,
            scored.len(),
            mean
        ),
        strengths: strong
            .iter()
            .map(|(m, s)| format!("{} ({:.0}/100)", m.display_name(), s))
            .collect(),
        areas_for_improvement: weak
            .iter()
            .map(|(m, s)| format!("{} ({:.0}/100)", m.display_name(), s))
            .collect(),
        recommendations,
        overall_assessment: if weak.is_empty() {
            "The manuscript is in good shape for the next milestone.".to_string()
        } else {
            format!(
                "{} area(s) need revision before the next milestone.",
                weak.len()
            )
        },
    }
}

fn template_title(template: CommitteeTemplate) -> &'static str {
    match template {
        CommitteeTemplate::ProposalDefense => "Proposal Defense Report",
        CommitteeTemplate::ChapterReview => "Chapter Review Report",
        CommitteeTemplate::FullDraftReview => "Full Draft Review",
        CommitteeTemplate::FinalDefensePrep => "Final Defense Preparation Report",
    }
}

fn recommendation_for(tier: Option<Tier>) -> &'static str {
    match tier {
        Some(Tier::StrongConsider) => "ACQUIRE",
        Some(Tier::Consider) => "CONSIDER",
        Some(Tier::Maybe) | None => "REVISE_AND_RESUBMIT",
        Some(Tier::Pass) => "PASS",
    }
}

fn demo_reader(ctx: &ReportContext<'_>) -> ReaderReport {
    let score = ctx.acquisition();
    let tier = score.map(|s| s.tier);
    let weak = weaknesses(ctx);
    let intelligence = ctx
        .analysis
        .get(&AnalysisModule::IntelligenceEngine)
        .and_then(ModuleReport::summary);

    ReaderReport {
        title: ctx.title.to_string(),
        author: ctx.author.to_string(),
        synopsis: intelligence
            .unwrap_or("No structural analysis is available for a synopsis.")
            .to_string(),
        acquisition_score: score.map(|s| s.acquisition_score).unwrap_or(0),
        strengths: strengths(ctx)
            .into_iter()
            .map(|(m, s)| ReaderNote {
                category: m.display_name().to_string(),
                description: format!("Scored {:.0}/100.", s),
                severity: None,
            })
            .collect(),
        concerns: weak
            .iter()
            .map(|(m, s)| ReaderNote {
                category: m.display_name().to_string(),
                description: format!("Scored {:.0}/100.", s),
                severity: Some(if *s < 40.0 { "major" } else { "minor" }.to_string()),
            })
            .collect(),
        market_positioning: "Not assessed in demo mode.".to_string(),
        editorial_investment: match weak.len() {
            0 => "Light: line editing only.".to_string(),
            1 | 2 => "Moderate: targeted developmental passes.".to_string(),
            _ => "Heavy: structural revision required.".to_string(),
        },
        recommendation: recommendation_for(tier).to_string(),
        recommendation_rationale: match score {
            Some(s) => format!(
                "Acquisition score {} places the manuscript in the {} tier.",
                s.acquisition_score,
                s.tier.label()
            ),
            None => "No acquisition score has been computed.".to_string(),
        },
    }
}

fn demo_rejection(ctx: &ReportContext<'_>, tone: RejectionTone) -> RejectionLetter {
    let mut body = format!(
        "Thank you for submitting \"{}\" for our consideration. After careful review, we have decided not to pursue it further.",
        ctx.title
    );
    let strong = strengths(ctx);
    let weak = weaknesses(ctx);
    let list = |items: &[(AnalysisModule, f64)]| {
        items
            .iter()
            .take(3)
            .map(|(m, _)| m.display_name().to_lowercase())
            .collect::<Vec<_>>()
            .join(", ")
    };
    match tone {
        RejectionTone::Standard => {}
        RejectionTone::Encouraging => {
            if !strong.is_empty() {
                body.push_str(&format!("\n\nWe admired the {} in particular.", list(&strong)));
            }
            body.push_str("\n\nWe hope you will keep writing and consider us again in the future.");
        }
        RejectionTone::Detailed => {
            if !strong.is_empty() {
                body.push_str(&format!("\n\nStrengths we noted: {}.", list(&strong)));
            }
            if !weak.is_empty() {
                body.push_str(&format!("\n\nAreas that would benefit from revision: {}.", list(&weak)));
            }
        }
    }
    body.push_str("\n\nWe wish you every success in finding the right home for this work.");

    RejectionLetter {
        subject: format!("Your submission: {}", ctx.title),
        salutation: format!("Dear {},", ctx.author),
        body,
        closing: "Sincerely,\nThe Editorial Team".to_string(),
        tone: tone.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{
        compute_acquisition_score, ComponentScores, ProseReport, ScoreWeights, VoiceReport,
    };
    use crate::gateway::MockClient;

    #[test]
    fn request_from_labels() {
        assert_eq!(
            ReportRequest::from_labels("Reader", None, None, None).unwrap(),
            ReportRequest::Reader
        );
        assert_eq!(
            ReportRequest::from_labels("rejection", None, None, Some("detailed")).unwrap(),
            ReportRequest::Rejection {
                tone: RejectionTone::Detailed
            }
        );
        let err = ReportRequest::from_labels("committee", Some("viva"), None, None).unwrap_err();
        assert_eq!(err.kind, "committee template");
        assert!(ReportRequest::from_labels("memo", None, None, None).is_err());
    }

    fn analysis() -> BTreeMap<AnalysisModule, ModuleReport> {
        let mut reports = BTreeMap::new();
        reports.insert(
            AnalysisModule::VoiceIsolation,
            ModuleReport::VoiceIsolation(VoiceReport {
                voice_score: 82.0,
                summary: "Distinct voices.".into(),
                ..Default::default()
            }),
        );
        reports.insert(
            AnalysisModule::ProseRefinery,
            ModuleReport::ProseRefinery(ProseReport {
                prose_score: 45.0,
                ..Default::default()
            }),
        );
        let components = ComponentScores::from_reports(&reports, None);
        reports.insert(
            AnalysisModule::AcquisitionScore,
            ModuleReport::AcquisitionScore(compute_acquisition_score(
                components,
                &ScoreWeights::default(),
            )),
        );
        reports
    }

    fn ctx(analysis: &BTreeMap<AnalysisModule, ModuleReport>) -> ReportContext<'_> {
        ReportContext {
            title: "The Salt Road",
            author: "Ira Vance",
            date: "October 2026",
            analysis,
        }
    }

    #[test]
    fn template_and_tone_parse() {
        assert_eq!(
            "chapter_review".parse::<CommitteeTemplate>().unwrap(),
            CommitteeTemplate::ChapterReview
        );
        assert!("bogus".parse::<CommitteeTemplate>().is_err());
        assert_eq!("Detailed".parse::<RejectionTone>().unwrap(), RejectionTone::Detailed);
        assert_eq!(RejectionTone::default(), RejectionTone::Standard);
    }

    #[test]
    fn prompts_truncate_analysis() {
        let mut analysis = analysis();
        analysis.insert(
            AnalysisModule::PacingArchitect,
            ModuleReport::PacingArchitect(crate::analysis::PacingReport {
                summary: "x".repeat(40_000),
                ..Default::default()
            }),
        );
        let ctx = ctx(&analysis);
        let committee = committee_prompt(&ctx, CommitteeTemplate::default(), None);
        assert!(committee.contains("Advisor notes: None provided"));
        assert!(committee.len() < 17_000);
        let rejection = rejection_prompt(&ctx, RejectionTone::Encouraging);
        assert!(rejection.len() < 12_000);
        assert!(rejection.contains("Tone: encouraging"));
    }

    #[tokio::test]
    async fn demo_reports_follow_scores() {
        let analysis = analysis();
        let ctx = ctx(&analysis);
        let writer = ReportWriter::demo();

        let Report::Reader(reader) = writer.write(&ctx, &ReportRequest::Reader).await.unwrap()
        else {
            panic!("expected reader report");
        };
        assert_eq!(reader.strengths[0].category, "Voice Isolation Lab");
        assert_eq!(reader.concerns[0].severity.as_deref(), Some("minor"));
        assert_eq!(reader.recommendation, "REVISE_AND_RESUBMIT");

        let request = ReportRequest::Rejection {
            tone: RejectionTone::Detailed,
        };
        let Report::Rejection(letter) = writer.write(&ctx, &request).await.unwrap() else {
            panic!("expected rejection letter");
        };
        assert_eq!(letter.salutation, "Dear Ira Vance,");
        assert!(letter.body.contains("Areas that would benefit from revision"));
        assert_eq!(letter.tone, "detailed");
    }

    #[tokio::test]
    async fn demo_committee_includes_advisor_notes() {
        let analysis = analysis();
        let ctx = ctx(&analysis);
        let request = ReportRequest::Committee {
            template: CommitteeTemplate::ProposalDefense,
            advisor_notes: Some("Tighten chapter 2".into()),
        };
        let Report::Committee(report) = ReportWriter::demo().write(&ctx, &request).await.unwrap()
        else {
            panic!("expected committee report");
        };
        assert_eq!(report.report_type, "proposal_defense");
        assert_eq!(report.date, "October 2026");
        assert!(report.recommendations.iter().any(|r| r.contains("Tighten chapter 2")));
        assert_eq!(report.sections[0].content, "Distinct voices.");
    }

    #[tokio::test]
    async fn live_report_parses_reply() {
        let client = MockClient::new().with_response(
            "Report Generator",
            r#"{"subject": "Re: The Salt Road", "body": "No thanks.", "tone": "standard"}"#,
        );
        let writer = ReportWriter::live(&client, Duration::from_secs(5));
        let analysis = analysis();
        let request = ReportRequest::Rejection {
            tone: RejectionTone::Standard,
        };
        let report = writer.write(&ctx(&analysis), &request).await.unwrap();
        let Report::Rejection(letter) = report else {
            panic!("expected rejection letter");
        };
        assert_eq!(letter.subject, "Re: The Salt Road");
        assert!(client.calls()[0].user_prompt.contains("Author: Ira Vance"));
    }
}
