//! Deterministic stand-in reports
//!
//! Demo mode never calls the AI service. Each module's report is built from
//! local statistics and chapter structure, so the same manuscript always
//! gets the same report and a demo run cannot fail.

use super::module::{AnalysisModule, ModuleOptions};
use super::score::NEUTRAL_SCORE;
use super::types::*;
use crate::stats::dialogue::quoted_spans;
use crate::stats::passive::is_passive;
use crate::stats::{
    character_names, clean_word, detect_citations, dialogue_passages, dialogue_stats,
    manuscript_stats, passive_voice_stats, prose_stats, split_sentences, NameCount,
};
use crate::text::{head, word_count, Chapter};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use std::collections::{HashMap, HashSet};

static TELLING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:felt|feel|feels|was|were|seemed|looked)\s+(?:so\s+|very\s+|really\s+)?(?:angry|sad|happy|afraid|scared|nervous|excited|lonely|tired|furious|anxious|jealous|guilty|ashamed|relieved|confused|upset)\b",
    )
    .unwrap()
});
static HEDGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:perhaps|might|may|possibly|arguably|somewhat|could|seems?|apparently|likely)\b")
        .unwrap()
});
static OVERCLAIM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:proves?|undeniabl[ey]|always|never|clearly|certainly|without\s+doubt|obviously)\b")
        .unwrap()
});
static COUNTER_SIGNAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:however|critics|opponents|counterargument|objection|on\s+the\s+other\s+hand|conversely)\b")
        .unwrap()
});

const MAX_TELL_PASSAGES: usize = 8;
const MAX_HEDGE_PASSAGES: usize = 5;
const MAX_CHARACTERS: usize = 6;
const MIN_DUPLICATE_CHARS: usize = 60;

/// Build the demo report for a text-based module.
///
/// Derived modules (revision center, acquisition score) are assembled by
/// the orchestrator from earlier reports and are not handled here.
pub fn demo_report(
    module: AnalysisModule,
    raw_text: &str,
    chapters: &[Chapter],
    options: &ModuleOptions,
) -> Option<ModuleReport> {
    let report = match module {
        AnalysisModule::IntelligenceEngine => {
            ModuleReport::IntelligenceEngine(intelligence(raw_text, chapters))
        }
        AnalysisModule::VoiceIsolation => ModuleReport::VoiceIsolation(voice(raw_text, chapters)),
        AnalysisModule::PacingArchitect => ModuleReport::PacingArchitect(pacing(chapters)),
        AnalysisModule::CharacterArc => {
            ModuleReport::CharacterArc(character_arc(raw_text, chapters))
        }
        AnalysisModule::ProseRefinery => ModuleReport::ProseRefinery(prose(raw_text, chapters)),
        AnalysisModule::ArgumentCoherence => {
            ModuleReport::ArgumentCoherence(argument(raw_text, chapters, options))
        }
        AnalysisModule::CitationArchitecture => {
            ModuleReport::CitationArchitecture(citation(raw_text, chapters, options))
        }
        AnalysisModule::AcademicVoice => {
            ModuleReport::AcademicVoice(academic_voice(raw_text, chapters))
        }
        AnalysisModule::RevisionCenter | AnalysisModule::AcquisitionScore => return None,
    };
    Some(report)
}

/// Originality stand-in: lexical diversity of the opening 20,000 characters.
pub fn originality(raw_text: &str) -> f64 {
    let words: Vec<String> = head(raw_text, 20_000)
        .split_whitespace()
        .map(clean_word)
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return NEUTRAL_SCORE;
    }
    let unique: HashSet<&str> = words.iter().map(String::as_str).collect();
    let diversity = unique.len() as f64 / words.len() as f64;
    (30.0 + diversity * 100.0).clamp(30.0, 90.0).round()
}

fn score(value: f64, min: f64, max: f64) -> f64 {
    value.clamp(min, max).round()
}

/// Coefficient of variation of chapter word counts.
fn chapter_balance(chapters: &[Chapter]) -> Option<f64> {
    if chapters.len() < 2 {
        return None;
    }
    let counts: Vec<f64> = chapters.iter().map(|c| c.word_count as f64).collect();
    let mean = counts.iter().sum::<f64>() / counts.len() as f64;
    if mean == 0.0 {
        return None;
    }
    let variance = counts.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / counts.len() as f64;
    Some(variance.sqrt() / mean)
}

fn top_names(raw_text: &str) -> Vec<NameCount> {
    let mut names = character_names(raw_text);
    names.truncate(MAX_CHARACTERS);
    names
}

fn mentions(text: &str, name: &str) -> usize {
    text.matches(name).count()
}

// ---------------------------------------------------------------------------
// Craft modules
// ---------------------------------------------------------------------------

fn intelligence(raw_text: &str, chapters: &[Chapter]) -> IntelligenceReport {
    let local = manuscript_stats(raw_text, chapters);
    let prose_local = prose_stats(raw_text, chapters);
    let names = top_names(raw_text);
    let duplicates = duplicate_paragraphs(chapters);

    let structure = match chapter_balance(chapters) {
        Some(cv) => 88.0 - cv * 40.0,
        None => 55.0,
    } - duplicates.len() as f64 * 8.0;
    let voice = if local.dialogue_lines == 0 {
        45.0
    } else {
        60.0 + names.len().min(6) as f64 * 4.0
    };
    let pacing = 55.0 + prose_local.sentence_length_variance.sqrt() * 3.0;
    let character = 50.0 + names.len().min(8) as f64 * 5.0;
    let prose = 95.0
        - prose_local.filter_density_per_1000 * 1.5
        - (prose_local.avg_sentence_length - 22.0).max(0.0) * 1.5;

    let mut health = HealthScores {
        structure: score(structure, 35.0, 95.0),
        voice_consistency: score(voice, 40.0, 92.0),
        pacing: score(pacing, 40.0, 92.0),
        character_development: score(character, 40.0, 95.0),
        prose_clarity: score(prose, 30.0, 95.0),
        overall: 0.0,
    };
    health.overall = ((health.structure
        + health.voice_consistency
        + health.pacing
        + health.character_development
        + health.prose_clarity)
        / 5.0)
        .round();

    let census: Vec<_> = names
        .iter()
        .enumerate()
        .map(|(i, n)| {
            let appearances: Vec<usize> = chapters
                .iter()
                .filter(|c| c.text.contains(&n.name))
                .map(|c| c.number())
                .collect();
            json!({
                "name": n.name,
                "frequency": mentions(raw_text, &n.name),
                "first_appearance": appearances.first().map(|c| format!("Chapter {}", c)),
                "last_appearance": appearances.last().map(|c| format!("Chapter {}", c)),
                "role": if i == 0 { "protagonist" } else { "supporting" },
            })
        })
        .collect();

    let summary = format!(
        "{} words across {} chapters with {} dialogue lines. Structure scores {:.0}, prose clarity {:.0}. {}",
        local.word_count,
        local.chapter_count,
        local.dialogue_lines,
        health.structure,
        health.prose_clarity,
        if duplicates.is_empty() {
            "No repeated paragraphs were found.".to_string()
        } else {
            format!("{} repeated paragraph(s) need attention.", duplicates.len())
        }
    );

    IntelligenceReport {
        health_scores: health,
        duplication_detection: DuplicationDetection {
            duplicates_found: duplicates.len() as u32,
            items: duplicates,
        },
        character_census: json!({ "total_characters": census.len(), "characters": census }),
        timeline_anomalies: TimelineAnomalies::default(),
        lexical_fingerprint: json!({
            "distinctive_words": prose_local.top_recurring.iter().take(10).map(|w| &w.word).collect::<Vec<_>>(),
            "top_50_with_frequency": prose_local.top_recurring,
        }),
        metaphor_density: json!({ "dominant_families": [], "chapter_heatmap": [] }),
        summary,
        local_stats: Some(local),
    }
}

/// Paragraphs repeated verbatim (ignoring case and spacing).
fn duplicate_paragraphs(chapters: &[Chapter]) -> Vec<DuplicationItem> {
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut items = Vec::new();
    for chapter in chapters {
        let paragraphs = chapter.text.split("\n\n").filter(|p| !p.trim().is_empty());
        for (i, paragraph) in paragraphs.enumerate() {
            let key = paragraph
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase();
            if key.chars().count() < MIN_DUPLICATE_CHARS {
                continue;
            }
            let location = format!("Chapter {}, paragraph {}", chapter.number(), i + 1);
            match seen.get(&key) {
                Some(first) => items.push(DuplicationItem {
                    kind: "paragraph".to_string(),
                    location_a: first.clone(),
                    location_b: location,
                    similarity_percent: 100.0,
                    excerpt: head(paragraph.trim(), 80).to_string(),
                }),
                None => {
                    seen.insert(key, location);
                }
            }
        }
    }
    items
}

fn voice(raw_text: &str, chapters: &[Chapter]) -> VoiceReport {
    let local = dialogue_stats(raw_text, chapters);
    let names = top_names(raw_text);
    let passages = dialogue_passages(raw_text, usize::MAX);

    let characters: Vec<VoiceCharacter> = names
        .iter()
        .map(|n| {
            let lines: Vec<&str> = passages
                .iter()
                .copied()
                .filter(|p| p.contains(&n.name))
                .collect();
            let avg_len = if lines.is_empty() {
                0.0
            } else {
                lines
                    .iter()
                    .flat_map(|l| quoted_spans(l))
                    .map(|q| q.split_whitespace().count())
                    .sum::<usize>() as f64
                    / lines.len() as f64
            };
            VoiceCharacter {
                name: n.name.clone(),
                dialogue_count: lines.len() as u32,
                voice_fingerprint: json!({ "avg_sentence_length": (avg_len * 10.0).round() / 10.0 }),
                jargon_bleed: Vec::new(),
                sample_dialogue: lines.iter().take(3).map(|l| l.trim().to_string()).collect(),
            }
        })
        .collect();

    let voice_score = if local.total_dialogue_lines == 0 {
        45.0
    } else {
        score(58.0 + characters.len() as f64 * 5.0, 40.0, 90.0)
    };
    let most = characters
        .iter()
        .max_by_key(|c| c.dialogue_count)
        .map(|c| c.name.clone());

    VoiceReport {
        voice_score,
        summary: format!(
            "{} dialogue lines averaging {} words; {} recurring speakers identified.",
            local.total_dialogue_lines,
            local.avg_dialogue_length,
            characters.len()
        ),
        most_distinctive_character: most,
        least_distinctive_character: None,
        jargon_bleed_total: 0,
        similarity_matrix: Vec::new(),
        characters,
        local_stats: Some(local),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Beat {
    Action,
    Emotion,
    Transition,
}

impl Beat {
    fn label(self) -> &'static str {
        match self {
            Self::Action => "ACTION",
            Self::Emotion => "EMOTION",
            Self::Transition => "TRANSITION",
        }
    }

    /// (action density, emotional depth) on 0-10 scales.
    fn levels(self) -> (f64, f64) {
        match self {
            Self::Action => (8.0, 3.0),
            Self::Emotion => (4.0, 8.0),
            Self::Transition => (3.0, 4.0),
        }
    }
}

fn classify(chapter: &Chapter) -> Beat {
    let lengths: Vec<usize> = split_sentences(&chapter.text)
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.split_whitespace().count())
        .collect();
    let avg = lengths.iter().sum::<usize>() as f64 / lengths.len().max(1) as f64;
    let dialogue_per_1000 =
        quoted_spans(&chapter.text).len() as f64 * 1000.0 / chapter.word_count.max(1) as f64;

    if avg > 0.0 && avg < 11.0 {
        Beat::Action
    } else if dialogue_per_1000 > 15.0 {
        Beat::Emotion
    } else {
        Beat::Transition
    }
}

/// Runs of at least three consecutive chapters with the given beat.
fn beat_runs(beats: &[Beat], wanted: Beat) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = None;
    for (i, beat) in beats.iter().chain(std::iter::once(&Beat::Emotion)).enumerate() {
        match (start, *beat == wanted && i < beats.len()) {
            (None, true) => start = Some(i),
            (Some(s), false) => {
                if i - s >= 3 {
                    runs.push((s, i - 1));
                }
                start = None;
            }
            _ => {}
        }
    }
    runs
}

fn pacing(chapters: &[Chapter]) -> PacingReport {
    let beats: Vec<Beat> = chapters.iter().map(classify).collect();

    let chapter_beats: Vec<_> = chapters
        .iter()
        .zip(&beats)
        .map(|(ch, beat)| {
            let (action, emotion) = beat.levels();
            json!({
                "chapter": ch.number(),
                "title": ch.title,
                "action_density": action,
                "emotional_depth": emotion,
                "tension_level": action * 0.6 + emotion * 0.4,
                "beat_type": beat.label(),
            })
        })
        .collect();
    let tension: Vec<f64> = beats
        .iter()
        .map(|b| {
            let (action, emotion) = b.levels();
            action * 0.6 + emotion * 0.4
        })
        .collect();

    let flag = |(s, e): (usize, usize), description: &str, suggestion: &str| PacingFlag {
        start_chapter: Some(s as u32 + 1),
        end_chapter: Some(e as u32 + 1),
        consecutive_count: (e - s + 1) as u32,
        description: description.to_string(),
        suggestion: suggestion.to_string(),
    };
    let breathing_space_flags: Vec<PacingFlag> = beat_runs(&beats, Beat::Action)
        .into_iter()
        .map(|run| {
            flag(
                run,
                "Consecutive high-action chapters without emotional decompression",
                "Add a quieter scene that lets characters react to what just happened",
            )
        })
        .collect();
    let slow_zone_flags: Vec<PacingFlag> = beat_runs(&beats, Beat::Transition)
        .into_iter()
        .map(|run| {
            flag(
                run,
                "Consecutive low-action chapters without escalation",
                "Introduce a complication or raise the stakes within this stretch",
            )
        })
        .collect();

    let distinct: HashSet<Beat> = beats.iter().copied().collect();
    let pacing_score = score(
        52.0 + distinct.len() as f64 * 10.0
            - (breathing_space_flags.len() + slow_zone_flags.len()) as f64 * 6.0,
        35.0,
        90.0,
    );

    PacingReport {
        pacing_score,
        summary: format!(
            "{} chapters classified: {} breathing-space and {} slow-zone runs flagged.",
            chapters.len(),
            breathing_space_flags.len(),
            slow_zone_flags.len()
        ),
        chapter_beats,
        tension_curve: json!({ "tension_values": tension }),
        breathing_space_flags,
        slow_zone_flags,
        act_structure: json!({ "detected_structure": "other", "act_breaks": [] }),
    }
}

fn character_arc(raw_text: &str, chapters: &[Chapter]) -> CharacterArcReport {
    let names = top_names(raw_text);
    let characters: Vec<ArcCharacter> = names
        .iter()
        .enumerate()
        .map(|(i, n)| {
            let tracking: Vec<_> = chapters
                .iter()
                .filter_map(|ch| {
                    let count = mentions(&ch.text, &n.name);
                    (count > 0).then(|| {
                        json!({
                            "chapter": ch.number(),
                            "behavior": format!("Appears ({} mentions)", count),
                        })
                    })
                })
                .collect();
            ArcCharacter {
                name: n.name.clone(),
                role: if i == 0 { "protagonist" } else { "supporting" }.to_string(),
                arc_type: "other".to_string(),
                arc_summary: format!("Present in {} of {} chapters.", tracking.len(), chapters.len()),
                chapter_tracking: tracking,
                ..Default::default()
            }
        })
        .collect();

    CharacterArcReport {
        character_score: score(50.0 + names.len().min(8) as f64 * 5.0, 40.0, 90.0),
        summary: format!("{} recurring characters tracked.", characters.len()),
        characters,
        relationship_dynamics: Vec::new(),
    }
}

fn prose(raw_text: &str, chapters: &[Chapter]) -> ProseReport {
    let local = prose_stats(raw_text, chapters);
    let per_thousand = |count: usize| count as f64 * 1000.0 / local.word_count.max(1) as f64;

    let tics: Vec<TicItem> = local
        .filter_word_counts
        .iter()
        .filter_map(|fw| {
            let rate = per_thousand(fw.count);
            let severity = if rate >= 10.0 {
                Severity::High
            } else if rate >= 5.0 {
                Severity::Medium
            } else if rate >= 2.0 {
                Severity::Low
            } else {
                return None;
            };
            Some(TicItem {
                word_or_phrase: fw.word.clone(),
                total_count: fw.count as u32,
                avg_per_chapter: ((fw.count as f64 / chapters.len().max(1) as f64) * 10.0).round()
                    / 10.0,
                worst_chapters: Vec::new(),
                severity: Some(severity),
                suggestion: format!("Cut or vary \"{}\" ({:.1} per 1,000 words)", fw.word, rate),
            })
        })
        .collect();

    let tells: Vec<TellPassage> = chapters
        .iter()
        .flat_map(|ch| {
            split_sentences(&ch.text)
                .into_iter()
                .filter(|s| TELLING.is_match(s))
                .map(move |s| TellPassage {
                    location: format!("Chapter {}", ch.number()),
                    original: s.trim().to_string(),
                    issue: "Names the emotion instead of dramatizing it".to_string(),
                    suggestion: "Render the emotion through action, sensation or dialogue"
                        .to_string(),
                    severity: Some(Severity::Medium),
                })
        })
        .take(MAX_TELL_PASSAGES)
        .collect();

    let prose_score = score(
        95.0 - local.filter_density_per_1000 * 1.5
            - (local.avg_sentence_length - 22.0).max(0.0) * 1.5
            - tells.len() as f64,
        30.0,
        95.0,
    );

    ProseReport {
        prose_score,
        tic_tracker: TicTracker {
            tics_found: tics.len() as u32,
            items: tics,
        },
        filter_words: json!({
            "total_filter_words": local.total_filter_words,
            "density_per_1000_words": local.filter_density_per_1000,
            "top_filter_words": local.filter_word_counts,
        }),
        show_vs_tell: ShowVsTell {
            tell_passages_found: tells.len() as u32,
            items: tells,
        },
        sentence_rhythm: json!({
            "avg_sentence_length": local.avg_sentence_length,
            "variance": local.sentence_length_variance,
        }),
        metaphor_frequency: json!({ "metaphor_families": [] }),
        summary: format!(
            "{} filter words ({} per 1,000 words); average sentence length {} words.",
            local.total_filter_words, local.filter_density_per_1000, local.avg_sentence_length
        ),
        local_stats: Some(local),
    }
}

// ---------------------------------------------------------------------------
// Academic modules
// ---------------------------------------------------------------------------

fn argument(raw_text: &str, chapters: &[Chapter], options: &ModuleOptions) -> ArgumentReport {
    let mean_words =
        chapters.iter().map(|c| c.word_count).sum::<usize>() as f64 / chapters.len().max(1) as f64;

    let stall_points: Vec<StallPoint> = if chapters.len() >= 3 {
        chapters
            .iter()
            .filter(|c| (c.word_count as f64) < mean_words * 0.4)
            .map(|c| StallPoint {
                chapter: Some(c.number() as u32),
                description: format!(
                    "\"{}\" is far shorter than the other chapters; the argument may stall here",
                    c.title
                ),
            })
            .collect()
    } else {
        Vec::new()
    };

    let counterargument_coverage = if COUNTER_SIGNAL.is_match(raw_text) {
        Vec::new()
    } else {
        vec![Counterargument {
            counterargument: "No engagement with opposing views detected".to_string(),
            chapter: None,
            how_addressed: "absent".to_string(),
            adequacy: "missing".to_string(),
            suggestion: format!(
                "Address the strongest objections to the central claim, as expected in a {} {}",
                options.discipline, options.document_type
            ),
        }]
    };

    let coherence_score = score(
        78.0 - stall_points.len() as f64 * 6.0 - counterargument_coverage.len() as f64 * 10.0,
        35.0,
        90.0,
    );

    ArgumentReport {
        coherence_score,
        thesis_statement: json!({
            "extracted_thesis": chapters.first().map(|c| first_sentence(&c.text)),
        }),
        evidence_to_claim_ratio: json!({
            "chapters": chapters.iter().map(|c| json!({
                "chapter": c.number(),
                "title": c.title,
                "evidence_provided": detect_citations(&c.text).estimated_citation_count,
            })).collect::<Vec<_>>(),
        }),
        logical_progression: LogicalProgression {
            overall_flow_score: coherence_score,
            chapter_connections: Vec::new(),
            stall_points,
            contradiction_points: Vec::new(),
        },
        counterargument_coverage,
        chapter_coherence_scores: Vec::new(),
        summary: format!(
            "Argument structure reviewed across {} chapters of this {} {}.",
            chapters.len(),
            options.discipline,
            options.document_type
        ),
    }
}

fn first_sentence(text: &str) -> String {
    split_sentences(text)
        .into_iter()
        .find(|s| !s.trim().is_empty())
        .map(|s| head(s.trim(), 200).to_string())
        .unwrap_or_default()
}

fn citation(raw_text: &str, chapters: &[Chapter], options: &ModuleOptions) -> CitationReport {
    let local = detect_citations(raw_text);
    // Style is judged across the manuscript; the less used style is the error.
    let mixed = local.apa_style_count > 0 && local.numbered_style_count > 0;
    let numbered_dominant = local.numbered_style_count > local.apa_style_count;

    let mut gaps = Vec::new();
    let mut errors = Vec::new();
    for ch in chapters {
        let found = detect_citations(&ch.text);
        if found.estimated_citation_count == 0 && ch.word_count >= 150 {
            gaps.push(CitationGap {
                chapter: Some(ch.number() as u32),
                claim: first_sentence(&ch.text),
                location: ch.title.clone(),
                confidence: if ch.word_count >= 1000 { 85.0 } else { 65.0 },
                suggested_type: "A peer-reviewed source supporting the chapter's opening claim"
                    .to_string(),
            });
        }
        let stray = if numbered_dominant {
            found.apa_style_count
        } else {
            found.numbered_style_count
        };
        if mixed && stray > 0 {
            let (minority, majority) = if numbered_dominant {
                ("author-year", "numbered")
            } else {
                ("numbered", "author-year")
            };
            errors.push(FormatError {
                chapter: Some(ch.number() as u32),
                citation_text: format!("{} {} citation(s)", stray, minority),
                issue: format!("Mixed citation styles: the manuscript mostly uses {} citations", majority),
                correction: format!("Use {} style consistently", options.citation_format),
            });
        }
    }

    let density = local.estimated_citation_count as f64 * 1000.0
        / word_count(raw_text).max(1) as f64;
    let citation_score = score(
        50.0 + density.min(20.0) * 2.0 - gaps.len() as f64 * 5.0 - errors.len() as f64 * 2.0,
        20.0,
        95.0,
    );

    CitationReport {
        citation_score,
        citation_frequency_heatmap: json!({ "total_citations": local.estimated_citation_count }),
        citation_gaps: gaps,
        source_recency: serde_json::Value::Null,
        primary_secondary_balance: serde_json::Value::Null,
        format_validation: FormatValidation {
            format: options.citation_format.clone(),
            errors_found: errors.len() as u32,
            errors,
        },
        summary: format!(
            "About {} citations detected ({} author-year, {} numbered, {} footnote markers).",
            local.estimated_citation_count,
            local.apa_style_count,
            local.numbered_style_count,
            local.footnote_count
        ),
        local_stats: Some(local),
    }
}

fn academic_voice(raw_text: &str, chapters: &[Chapter]) -> AcademicVoiceReport {
    let local = passive_voice_stats(raw_text, chapters);

    let mut over_hedged = Vec::new();
    let mut under_hedged = Vec::new();
    for ch in chapters {
        for sentence in split_sentences(&ch.text) {
            let sentence = sentence.trim();
            if sentence.is_empty() {
                continue;
            }
            let hedges: Vec<String> = HEDGE
                .find_iter(sentence)
                .map(|m| m.as_str().to_lowercase())
                .collect();
            if hedges.len() >= 2 && over_hedged.len() < MAX_HEDGE_PASSAGES {
                over_hedged.push(HedgePassage {
                    chapter: Some(ch.number() as u32),
                    passage: sentence.to_string(),
                    hedge_words: hedges,
                    issue: "Stacked qualifiers weaken the claim".to_string(),
                    suggestion: "Keep one qualifier, or state the claim directly".to_string(),
                });
            } else if OVERCLAIM.is_match(sentence) && under_hedged.len() < MAX_HEDGE_PASSAGES {
                under_hedged.push(HedgePassage {
                    chapter: Some(ch.number() as u32),
                    passage: sentence.to_string(),
                    hedge_words: Vec::new(),
                    issue: "States as certain what the evidence only supports".to_string(),
                    suggestion: "Qualify the claim in proportion to the evidence".to_string(),
                });
            }
        }
    }

    let voice_score = score(
        85.0 - (local.total_passive_pct - 25.0).max(0.0)
            - over_hedged.len() as f64 * 2.0
            - under_hedged.len() as f64 * 3.0,
        30.0,
        95.0,
    );

    AcademicVoiceReport {
        voice_score,
        sub_scores: json!({
            "formality": voice_score,
            "precision": score(voice_score - under_hedged.len() as f64 * 2.0, 0.0, 100.0),
            "authorial_confidence": score(voice_score - over_hedged.len() as f64 * 2.0, 0.0, 100.0),
        }),
        register_consistency: serde_json::Value::Null,
        passive_voice: json!({
            "overall_percentage": local.total_passive_pct,
            "chapters": local.chapter_stats.iter().map(|c| json!({
                "chapter": c.chapter,
                "passive_pct": c.passive_pct,
                "flagged": c.flagged,
                "worst_examples": chapters
                    .get(c.chapter - 1)
                    .map(|ch| {
                        split_sentences(&ch.text)
                            .into_iter()
                            .filter(|s| is_passive(s))
                            .take(2)
                            .map(|s| json!({ "passive": s.trim() }))
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default(),
            })).collect::<Vec<_>>(),
        }),
        summary: format!(
            "{}% of sentences use the passive voice; {} over-hedged and {} under-hedged passages found.",
            local.total_passive_pct,
            over_hedged.len(),
            under_hedged.len()
        ),
        hedge_analysis: HedgeAnalysis {
            over_hedged,
            under_hedged,
        },
        local_stats: Some(local),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::merger::aggregate_edit_queue;
    use crate::text::detect_chapters;
    use std::collections::BTreeMap;

    const NOVEL: &str = "Chapter 1: Arrival\n\
        Mara Quill stepped off the train. She felt so tired. \"Is anyone waiting for me here?\" Mara Quill asked.\n\n\
        Tobias Reed waved from the platform. \"Welcome home, it has been years,\" Tobias Reed said.\n\n\
        Chapter 2: The House\n\
        The house was cold. Mara Quill just stood there. She was afraid of the dark hallway.\n\n\
        Chapter 3: Morning\n\
        Tobias Reed made coffee. They talked for hours about the war and the river and the town.\n";

    #[test]
    fn demo_reports_are_deterministic() {
        let chapters = detect_chapters(NOVEL);
        let options = ModuleOptions::default();
        for module in AnalysisModule::ALL.iter().filter(|m| !m.is_derived()) {
            let a = demo_report(*module, NOVEL, &chapters, &options);
            let b = demo_report(*module, NOVEL, &chapters, &options);
            assert!(a.is_some(), "{} has no demo report", module);
            assert_eq!(a, b);
        }
        assert!(demo_report(AnalysisModule::RevisionCenter, NOVEL, &chapters, &options).is_none());
    }

    #[test]
    fn demo_scores_stay_in_range() {
        let chapters = detect_chapters(NOVEL);
        let options = ModuleOptions::default();
        for module in AnalysisModule::ALL.iter().filter(|m| !m.is_derived()) {
            let report = demo_report(*module, NOVEL, &chapters, &options).unwrap();
            let s = report.scores();
            for v in [s.structure, s.voice, s.pacing, s.character, s.prose, s.overall]
                .into_iter()
                .flatten()
            {
                assert!((0.0..=100.0).contains(&v), "{} score {} out of range", module, v);
            }
        }
    }

    #[test]
    fn prose_demo_finds_telling() {
        let chapters = detect_chapters(NOVEL);
        let Some(ModuleReport::ProseRefinery(report)) =
            demo_report(AnalysisModule::ProseRefinery, NOVEL, &chapters, &ModuleOptions::default())
        else {
            panic!("expected prose report");
        };
        let originals: Vec<&str> = report
            .show_vs_tell
            .items
            .iter()
            .map(|t| t.original.as_str())
            .collect();
        assert!(originals.contains(&"She felt so tired."));
        assert!(originals.contains(&"She was afraid of the dark hallway."));
        assert!(report.local_stats.is_some());
    }

    #[test]
    fn intelligence_demo_detects_repeated_paragraphs() {
        let para = "The lighthouse keeper climbed the spiral stairs every night at nine o'clock.";
        let text = format!(
            "Chapter 1: One\n\n{p}\n\nOther words here.\n\nChapter 2: Two\n\n{p}\n",
            p = para
        );
        let chapters = detect_chapters(&text);
        let report = intelligence(&text, &chapters);
        assert_eq!(report.duplication_detection.duplicates_found, 1);
        let item = &report.duplication_detection.items[0];
        assert_eq!(item.location_a, "Chapter 1, paragraph 2");
        assert_eq!(item.location_b, "Chapter 2, paragraph 2");
    }

    #[test]
    fn beat_runs_need_three_in_a_row() {
        use Beat::*;
        let beats = [Action, Action, Action, Emotion, Action, Action, Transition, Transition, Transition];
        assert_eq!(beat_runs(&beats, Action), vec![(0, 2)]);
        assert_eq!(beat_runs(&beats, Transition), vec![(6, 8)]);
    }

    #[test]
    fn academic_demo_feeds_the_queue() {
        let text = "Chapter 1: Introduction\n\
            This study clearly proves that funding always improves outcomes. It might perhaps be possible that costs rise.\n\
            Chapter 2: Method\n\
            Data were collected from 40 schools (Smith, 2019).\n";
        let chapters = detect_chapters(text);
        let options = ModuleOptions::default();
        let reports: BTreeMap<_, _> = [
            AnalysisModule::ArgumentCoherence,
            AnalysisModule::AcademicVoice,
        ]
        .iter()
        .filter_map(|m| demo_report(*m, text, &chapters, &options))
        .map(|r| (r.module(), r))
        .collect();

        let queue = aggregate_edit_queue(&reports);
        let types: Vec<&str> = queue.items.iter().map(|i| i.finding_type.as_str()).collect();
        assert!(types.contains(&"counterargument"));
        assert!(types.contains(&"under_hedged"));
        assert!(types.contains(&"over_hedged"));
    }

    #[test]
    fn citation_styles_are_compared_across_chapters() {
        let text = "Chapter 1: Background\n\
            Commons persist under local rules (Ostrom, 1990). Monitoring matters (Agrawal, 2001).\n\
            Chapter 2: Results\n\
            Councils enforce quotas [1]. Costs fall over time [2].\n\
            Chapter 3: Discussion\n\
            Capture remains a risk (Berkes, 2006).\n";
        let chapters = detect_chapters(text);
        let Some(ModuleReport::CitationArchitecture(report)) = demo_report(
            AnalysisModule::CitationArchitecture,
            text,
            &chapters,
            &ModuleOptions::default(),
        ) else {
            panic!("expected a citation report");
        };

        // Author-year dominates, so only the numbered chapter is flagged.
        let errors = &report.format_validation.errors;
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].chapter, Some(2));
        assert!(errors[0].citation_text.contains("numbered"));
        assert_eq!(report.format_validation.errors_found, 1);
    }

    #[test]
    fn originality_is_bounded_and_stable() {
        let a = originality(NOVEL);
        assert_eq!(a, originality(NOVEL));
        assert!((30.0..=90.0).contains(&a));
        assert_eq!(originality(""), NEUTRAL_SCORE);
    }
}
