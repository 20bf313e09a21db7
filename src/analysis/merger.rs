//! Revision queue aggregation
//!
//! Merges findings from every completed module report into one edit queue:
//! modules are visited in their fixed order, findings are stably sorted by
//! severity (high first) and renumbered 1..N. The same reports always give
//! the same queue.

use super::module::AnalysisModule;
use super::types::{chapter_label, ModuleReport, Severity};
use crate::model::label_enum;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Review state of a queue entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

label_enum!(ItemStatus, "item status", {
    Pending => "pending",
    Accepted => "accepted",
    Rejected => "rejected",
});

/// One actionable finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditQueueItem {
    /// Position in the queue, 1-based.
    pub id: u32,
    pub module: AnalysisModule,
    pub finding_type: String,
    pub severity: Severity,
    pub chapter_ref: String,
    pub finding: String,
    pub suggestion: String,
    pub status: ItemStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueStats {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub by_module: BTreeMap<AnalysisModule, usize>,
}

impl QueueStats {
    pub fn from_items(items: &[EditQueueItem]) -> Self {
        let mut stats = Self {
            total: items.len(),
            ..Self::default()
        };
        for item in items {
            match item.severity {
                Severity::High => stats.high += 1,
                Severity::Medium => stats.medium += 1,
                Severity::Low => stats.low += 1,
            }
            *stats.by_module.entry(item.module).or_default() += 1;
        }
        stats
    }
}

/// The aggregated queue: the report of a revision-center run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditQueue {
    pub items: Vec<EditQueueItem>,
    pub stats: QueueStats,
}

struct Finding {
    module: AnalysisModule,
    finding_type: &'static str,
    severity: Severity,
    chapter_ref: String,
    finding: String,
    suggestion: String,
}

/// Build the edit queue from completed reports.
///
/// Map order is module order, so processing order is fixed regardless of
/// how the caller collected the reports.
pub fn aggregate_edit_queue(reports: &BTreeMap<AnalysisModule, ModuleReport>) -> EditQueue {
    let mut findings = Vec::new();
    for report in reports.values() {
        extract_findings(report, &mut findings);
    }

    // Stable: equal severities keep extraction order.
    findings.sort_by_key(|f| f.severity);

    let items: Vec<EditQueueItem> = findings
        .into_iter()
        .enumerate()
        .map(|(i, f)| EditQueueItem {
            id: i as u32 + 1,
            module: f.module,
            finding_type: f.finding_type.to_string(),
            severity: f.severity,
            chapter_ref: f.chapter_ref,
            finding: f.finding,
            suggestion: f.suggestion,
            status: ItemStatus::Pending,
        })
        .collect();

    EditQueue {
        stats: QueueStats::from_items(&items),
        items,
    }
}

/// Carry accepted/rejected decisions from a previous queue onto identical
/// findings in a rebuilt one.
///
/// Findings match on (module, finding type, chapter reference, finding
/// text). Returns how many statuses were carried over.
pub fn carry_over_statuses(queue: &mut EditQueue, previous: &[EditQueueItem]) -> usize {
    let decided: HashMap<(AnalysisModule, &str, &str, &str), ItemStatus> = previous
        .iter()
        .filter(|item| item.status != ItemStatus::Pending)
        .map(|item| {
            (
                (
                    item.module,
                    item.finding_type.as_str(),
                    item.chapter_ref.as_str(),
                    item.finding.as_str(),
                ),
                item.status,
            )
        })
        .collect();

    let mut carried = 0;
    for item in &mut queue.items {
        let key = (
            item.module,
            item.finding_type.as_str(),
            item.chapter_ref.as_str(),
            item.finding.as_str(),
        );
        if let Some(&status) = decided.get(&key) {
            item.status = status;
            carried += 1;
        }
    }
    carried
}

fn extract_findings(report: &ModuleReport, out: &mut Vec<Finding>) {
    let module = report.module();
    let mut push = |finding_type: &'static str,
                    severity: Severity,
                    chapter_ref: String,
                    finding: String,
                    suggestion: String| {
        out.push(Finding {
            module,
            finding_type,
            severity,
            chapter_ref,
            finding,
            suggestion,
        })
    };

    match report {
        ModuleReport::IntelligenceEngine(r) => {
            for dup in &r.duplication_detection.items {
                let severity = if dup.similarity_percent > 85.0 {
                    Severity::High
                } else {
                    Severity::Medium
                };
                push(
                    "duplication",
                    severity,
                    dup.location_a.clone(),
                    format!(
                        "Content duplication ({}% similar): {} <-> {}",
                        dup.similarity_percent, dup.location_a, dup.location_b
                    ),
                    format!("Review and resolve duplicated content: \"{}\"", dup.excerpt),
                );
            }
            for anomaly in &r.timeline_anomalies.items {
                push(
                    "timeline_anomaly",
                    anomaly.severity.unwrap_or_default(),
                    anomaly.location.clone(),
                    anomaly.description.clone(),
                    "Review and correct the chronological inconsistency".to_string(),
                );
            }
        }
        ModuleReport::ProseRefinery(r) => {
            for item in &r.show_vs_tell.items {
                push(
                    "show_vs_tell",
                    item.severity.unwrap_or_default(),
                    item.location.clone(),
                    format!("Telling instead of showing: \"{}\"", item.original),
                    item.suggestion.clone(),
                );
            }
            for tic in &r.tic_tracker.items {
                let Some(severity @ (Severity::High | Severity::Medium)) = tic.severity else {
                    continue;
                };
                push(
                    "writing_tic",
                    severity,
                    "Multiple".to_string(),
                    format!(
                        "Overused word/phrase: \"{}\" ({} occurrences)",
                        tic.word_or_phrase, tic.total_count
                    ),
                    tic.suggestion.clone(),
                );
            }
        }
        ModuleReport::VoiceIsolation(r) => {
            for character in &r.characters {
                for bleed in &character.jargon_bleed {
                    push(
                        "jargon_bleed",
                        Severity::Medium,
                        chapter_label(bleed.chapter),
                        format!(
                            "Jargon bleed in {}'s dialogue: \"{}\"",
                            character.name, bleed.passage
                        ),
                        bleed.reason.clone(),
                    );
                }
            }
            for pair in r.similarity_matrix.iter().filter(|p| p.flagged) {
                let severity = if pair.similarity_score > 75.0 {
                    Severity::High
                } else {
                    Severity::Medium
                };
                push(
                    "voice_similarity",
                    severity,
                    "All".to_string(),
                    format!(
                        "{} and {} sound too similar (score: {})",
                        pair.character_a, pair.character_b, pair.similarity_score
                    ),
                    format!(
                        "Differentiate voices. Similar traits: {}",
                        pair.similar_traits.join(", ")
                    ),
                );
            }
        }
        ModuleReport::PacingArchitect(r) => {
            for flag in &r.breathing_space_flags {
                push(
                    "breathing_space",
                    Severity::Medium,
                    flag.range_label(),
                    non_empty(
                        &flag.description,
                        "Consecutive high-action chapters without emotional decompression",
                    ),
                    flag.suggestion.clone(),
                );
            }
            for flag in &r.slow_zone_flags {
                push(
                    "slow_zone",
                    Severity::Medium,
                    flag.range_label(),
                    non_empty(
                        &flag.description,
                        "Consecutive low-action chapters without escalation",
                    ),
                    flag.suggestion.clone(),
                );
            }
        }
        ModuleReport::CharacterArc(r) => {
            for character in &r.characters {
                for inconsistency in &character.inconsistencies {
                    push(
                        "arc_inconsistency",
                        inconsistency.severity.unwrap_or_default(),
                        chapter_label(inconsistency.chapter),
                        format!("{}: {}", character.name, inconsistency.description),
                        format!(
                            "Expected: {}. Actual: {}",
                            inconsistency.expected_behavior, inconsistency.actual_behavior
                        ),
                    );
                }
            }
        }
        ModuleReport::ArgumentCoherence(r) => {
            let progression = &r.logical_progression;
            for point in &progression.contradiction_points {
                let fmt = |c: Option<u32>| c.map(|n| n.to_string()).unwrap_or_else(|| "?".into());
                push(
                    "contradiction",
                    Severity::High,
                    format!("Chapters {} and {}", fmt(point.chapter_a), fmt(point.chapter_b)),
                    point.description.clone(),
                    "Reconcile the conflicting claims or explain the tension explicitly".to_string(),
                );
            }
            for stall in &progression.stall_points {
                push(
                    "argument_stall",
                    Severity::Medium,
                    chapter_label(stall.chapter),
                    stall.description.clone(),
                    "Advance the argument with a new claim or evidence".to_string(),
                );
            }
            for counter in &r.counterargument_coverage {
                let adequacy = counter.adequacy.to_ascii_lowercase();
                if adequacy != "missing" && adequacy != "insufficient" {
                    continue;
                }
                push(
                    "counterargument",
                    Severity::Medium,
                    chapter_label(counter.chapter),
                    format!(
                        "Counterargument {} coverage: {}",
                        adequacy, counter.counterargument
                    ),
                    counter.suggestion.clone(),
                );
            }
        }
        ModuleReport::CitationArchitecture(r) => {
            for gap in &r.citation_gaps {
                let severity = if gap.confidence >= 80.0 {
                    Severity::High
                } else {
                    Severity::Medium
                };
                push(
                    "citation_gap",
                    severity,
                    chapter_label(gap.chapter),
                    format!("Unsupported claim: \"{}\"", gap.claim),
                    non_empty(&gap.suggested_type, "Add a supporting citation"),
                );
            }
            for error in &r.format_validation.errors {
                push(
                    "citation_format",
                    Severity::Low,
                    chapter_label(error.chapter),
                    format!("{}: \"{}\"", error.issue, error.citation_text),
                    error.correction.clone(),
                );
            }
        }
        ModuleReport::AcademicVoice(r) => {
            for passage in &r.hedge_analysis.over_hedged {
                push(
                    "over_hedged",
                    Severity::Low,
                    chapter_label(passage.chapter),
                    format!("Over-hedged: \"{}\"", passage.passage),
                    passage.suggestion.clone(),
                );
            }
            for passage in &r.hedge_analysis.under_hedged {
                push(
                    "under_hedged",
                    Severity::Medium,
                    chapter_label(passage.chapter),
                    format!("Overclaiming: \"{}\"", passage.passage),
                    passage.suggestion.clone(),
                );
            }
        }
        ModuleReport::RevisionCenter(_) | ModuleReport::AcquisitionScore(_) => {}
    }
}

fn non_empty(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}
