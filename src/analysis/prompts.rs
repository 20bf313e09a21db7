//! System prompts, reply schemas and user-prompt builders.
//!
//! Schemas are literal text: the model is shown the JSON shape it must
//! return, with `<...>` placeholders describing each value.

use super::module::ModuleOptions;
use crate::stats::ProseStats;

const JSON_ONLY: &str = "Return your analysis as a single valid JSON object matching the requested \
schema. Do not write anything outside the JSON.";

pub const INTELLIGENCE_SYSTEM: &str = "You are the Manuscript Intelligence Engine, an expert literary \
analyst working at the scale of the whole book. Cross-reference every element against every other \
element, cite chapter numbers and passage locations, and be honest and constructive: this is \
professional editorial intelligence.";

pub const VOICE_SYSTEM: &str = "You are the Voice Isolation Lab, an expert in character voice. Extract \
dialogue, fingerprint each character's speech patterns, and flag characters who sound alike or use \
language inconsistent with their background. Be specific about chapter locations.";

pub const PACING_SYSTEM: &str = "You are the Pacing Architect, an expert in narrative pacing and \
tension. Weigh action against emotion in every chapter and model the tension arc of the whole \
manuscript. Rate action and emotion on 0-10 scales.";

pub const CHARACTER_ARC_SYSTEM: &str = "You are the Character Arc Workshop, an expert in character \
development and motivation. Track each character's want, fear, belief and behavior across chapters \
and identify where development is strong, inconsistent or unearned.";

pub const PROSE_SYSTEM: &str = "You are the Prose Refinery, a master prose analyst. Identify writing \
tics, filter words, telling instead of showing, and sentence rhythm problems across the manuscript, \
with exact locations and actionable fixes.";

pub const ARGUMENT_SYSTEM: &str = "You are the Argument Coherence Engine, an expert in academic \
argumentation. Assess dissertations and scholarly manuscripts for argumentative rigor, evidence \
quality and logical progression.";

pub const CITATION_SYSTEM: &str = "You are the Citation & Source Architecture module, an expert in \
academic citation practice. Assess citation quality, source diversity, recency and format \
compliance.";

pub const ACADEMIC_VOICE_SYSTEM: &str = "You are the Academic Voice Calibration module, an expert in \
scholarly register. Assess register consistency, hedging, passive voice and the authority of the \
authorial voice.";

pub const ORIGINALITY_SYSTEM: &str = "You are a literary originality assessor.";

/// Append the JSON-only instruction to a module system prompt.
pub fn system_prompt(base: &str) -> String {
    format!("{}\n\n{}", base, JSON_ONLY)
}

const INTELLIGENCE_SCHEMA: &str = r#"{
  "health_scores": {
    "structure": <0-100>,
    "voice_consistency": <0-100>,
    "pacing": <0-100>,
    "character_development": <0-100>,
    "prose_clarity": <0-100>,
    "overall": <0-100>
  },
  "duplication_detection": {
    "duplicates_found": <int>,
    "items": [
      {
        "type": "paragraph|scene|chapter",
        "location_a": "Chapter X, paragraph Y",
        "location_b": "Chapter X, paragraph Y",
        "similarity_percent": <70-100>,
        "excerpt": "brief excerpt of the duplicated content"
      }
    ]
  },
  "character_census": {
    "total_characters": <int>,
    "characters": [
      {
        "name": "Character Name",
        "frequency": <int mentions>,
        "first_appearance": "Chapter X",
        "last_appearance": "Chapter Y",
        "role": "protagonist|antagonist|supporting|minor"
      }
    ]
  },
  "timeline_anomalies": {
    "anomalies_found": <int>,
    "items": [
      {
        "location": "Chapter X",
        "description": "the chronological inconsistency",
        "severity": "high|medium|low"
      }
    ]
  },
  "lexical_fingerprint": {
    "distinctive_words": ["word", "..."],
    "top_50_with_frequency": [{"word": "word", "count": <int>, "distinctiveness": <0-100>}]
  },
  "metaphor_density": {
    "dominant_families": ["family"],
    "average_density_per_chapter": <float>,
    "chapter_heatmap": [
      {"chapter": <int>, "title": "Title", "density": <float>, "flagged": <bool>, "dominant_metaphors": ["metaphor"]}
    ]
  },
  "summary": "2-3 paragraph executive summary of structural health, strengths and revision priorities"
}"#;

const VOICE_SCHEMA: &str = r#"{
  "voice_score": <0-100 overall voice distinctiveness>,
  "characters": [
    {
      "name": "Character Name",
      "dialogue_count": <int>,
      "voice_fingerprint": {
        "avg_sentence_length": <float>,
        "vocabulary_richness": <float 0-1>,
        "top_unique_words": ["word"],
        "punctuation_habits": "description",
        "register": "formal|casual|slang|mixed",
        "formality_score": <0-10>,
        "speech_patterns": "description"
      },
      "jargon_bleed": [
        {
          "chapter": <int>,
          "passage": "the flagged dialogue",
          "jargon_type": "medical|legal|technical|...",
          "reason": "why this character would not use this language"
        }
      ],
      "sample_dialogue": ["line"]
    }
  ],
  "similarity_matrix": [
    {
      "character_a": "Name A",
      "character_b": "Name B",
      "similarity_score": <0-100>,
      "similar_traits": ["trait"],
      "flagged": <bool, true if score > 60>
    }
  ],
  "jargon_bleed_total": <int>,
  "most_distinctive_character": "Name",
  "least_distinctive_character": "Name",
  "summary": "2-3 paragraph summary of the voice findings"
}"#;

const PACING_SCHEMA: &str = r#"{
  "pacing_score": <0-100>,
  "chapter_beats": [
    {
      "chapter": <int>,
      "title": "Chapter Title",
      "action_density": <0-10>,
      "emotional_depth": <0-10>,
      "tension_level": <0-10>,
      "beat_type": "ACTION|EMOTION|TRANSITION",
      "summary": "one sentence"
    }
  ],
  "tension_curve": {
    "shape": "rising|flat|falling|roller_coaster|inverted_u|custom",
    "description": "the overall tension arc",
    "peak_chapter": <int>,
    "lowest_chapter": <int>,
    "tension_values": [<0-10 per chapter>]
  },
  "breathing_space_flags": [
    {
      "start_chapter": <int>,
      "end_chapter": <int>,
      "consecutive_count": <int>,
      "description": "the high-action run that needs decompression",
      "suggestion": "how to add emotional breathing room"
    }
  ],
  "slow_zone_flags": [
    {
      "start_chapter": <int>,
      "end_chapter": <int>,
      "consecutive_count": <int>,
      "description": "the slow run",
      "suggestion": "how to add tension or escalation"
    }
  ],
  "act_structure": {
    "detected_structure": "three_act|four_act|five_act|episodic|other",
    "act_breaks": [<chapter numbers>],
    "description": "the detected structure"
  },
  "summary": "2-3 paragraph summary of pacing strengths and issues"
}"#;

const CHARACTER_ARC_SCHEMA: &str = r#"{
  "character_score": <0-100>,
  "characters": [
    {
      "name": "Character Name",
      "role": "protagonist|antagonist|supporting|minor",
      "arc_type": "positive_change|negative_change|flat|corruption|disillusionment|other",
      "want": "what the character consciously wants",
      "fear": "what the character fears most",
      "belief": "core belief about the world",
      "arc_summary": "2-3 sentences",
      "chapter_tracking": [
        {"chapter": <int>, "behavior": "key action", "belief_state": "how the belief shows", "development_note": "what changes"}
      ],
      "inconsistencies": [
        {
          "chapter": <int>,
          "description": "what is inconsistent",
          "expected_behavior": "what the established traits predict",
          "actual_behavior": "what the character does",
          "severity": "high|medium|low",
          "justified": false
        }
      ],
      "transformation_validation": {
        "climax_chapter": <int or null>,
        "change_earned": <bool>,
        "earning_evidence": "why the change is or is not earned",
        "missing_setup": ["moment that would strengthen the arc"]
      }
    }
  ],
  "relationship_dynamics": [
    {
      "character_a": "Name",
      "character_b": "Name",
      "relationship_type": "allies|adversaries|romantic|mentor_student|rivals|family",
      "evolution": "how the relationship changes",
      "key_scenes": [<chapter numbers>]
    }
  ],
  "summary": "2-3 paragraph summary of character development"
}"#;

const PROSE_SCHEMA: &str = r#"{
  "prose_score": <0-100>,
  "tic_tracker": {
    "tics_found": <int>,
    "items": [
      {
        "word_or_phrase": "the tic",
        "total_count": <int>,
        "avg_per_chapter": <float>,
        "worst_chapters": [{"chapter": <int>, "count": <int>, "ratio_vs_avg": <float>}],
        "severity": "high|medium|low",
        "suggestion": "how to address it"
      }
    ]
  },
  "filter_words": {
    "total_filter_words": <int>,
    "density_per_1000_words": <float>,
    "chapter_breakdown": [
      {"chapter": <int>, "title": "Title", "filter_word_count": <int>, "worst_offenders": ["word"], "examples": ["sentence"]}
    ],
    "top_filter_words": [{"word": "word", "count": <int>}]
  },
  "show_vs_tell": {
    "tell_passages_found": <int>,
    "items": [
      {
        "location": "Chapter X, paragraph Y",
        "original": "the telling passage",
        "issue": "why it tells rather than shows",
        "suggestion": "a showing alternative",
        "severity": "high|medium|low"
      }
    ]
  },
  "sentence_rhythm": {
    "avg_sentence_length": <float>,
    "variance": <float>,
    "consecutive_short_runs": [{"location": "Chapter X", "count": <int>, "excerpt": "text"}],
    "consecutive_long_runs": [{"location": "Chapter X", "count": <int>, "excerpt": "text"}],
    "chapter_rhythm_profile": [{"chapter": <int>, "avg_length": <float>, "variance": <float>, "rhythm_score": <0-100>}]
  },
  "metaphor_frequency": {
    "metaphor_families": [
      {
        "family": "e.g. water imagery",
        "count": <int>,
        "overuse_windows": [{"location": "approximate location", "count_in_window": <int>, "flagged": <bool>}]
      }
    ]
  },
  "summary": "2-3 paragraph summary of prose quality and priority fixes"
}"#;

const ARGUMENT_SCHEMA: &str = r#"{
  "coherence_score": <0-100>,
  "thesis_statement": {
    "extracted_thesis": "the central argument",
    "location": "chapter and approximate location",
    "clarity_score": <0-100>,
    "restated_in_chapters": [<int>],
    "contested_in_chapters": [<int>]
  },
  "evidence_to_claim_ratio": {
    "overall_ratio": <float>,
    "chapters": [
      {
        "chapter": <int>,
        "title": "Title",
        "claims_made": <int>,
        "evidence_provided": <int>,
        "ratio": <float>,
        "under_supported_claims": [{"claim": "text", "location": "where", "evidence_needed": "what kind"}]
      }
    ]
  },
  "logical_progression": {
    "overall_flow_score": <0-100>,
    "chapter_connections": [
      {
        "from_chapter": <int>,
        "to_chapter": <int>,
        "connection_strength": "strong|adequate|weak|missing",
        "connection_type": "builds_on|extends|contrasts|introduces_new|repeats",
        "gap_description": "the logical gap, or null"
      }
    ],
    "stall_points": [{"chapter": <int>, "description": "where the argument stalls or loops"}],
    "contradiction_points": [{"chapter_a": <int>, "chapter_b": <int>, "description": "what contradicts"}]
  },
  "counterargument_coverage": [
    {
      "counterargument": "the counterargument",
      "chapter": <int>,
      "how_addressed": "acknowledged|refuted|dismissed|absent",
      "adequacy": "adequate|insufficient|missing",
      "suggestion": "how to address it better"
    }
  ],
  "chapter_coherence_scores": [
    {
      "chapter": <int>,
      "title": "Title",
      "coherence_score": <0-100>,
      "connection_to_prior": <0-100 or null>,
      "connection_to_next": <0-100 or null>,
      "recommendation": "brief recommendation"
    }
  ],
  "summary": "2-3 paragraph summary of argumentative strengths and weaknesses"
}"#;

const CITATION_SCHEMA: &str = r#"{
  "citation_score": <0-100>,
  "citation_frequency_heatmap": {
    "total_citations": <int>,
    "unique_sources": <int>,
    "chapters": [
      {
        "chapter": <int>,
        "title": "Title",
        "citation_count": <int>,
        "top_cited_sources": [{"source": "Author (Year)", "count": <int>, "percentage_of_chapter": <float>, "over_reliant": <bool, true if > 30%>}]
      }
    ],
    "most_cited_overall": [{"source": "Author/Work", "total_citations": <int>, "chapters_cited_in": [<int>]}]
  },
  "citation_gaps": [
    {
      "chapter": <int>,
      "claim": "the unsupported claim",
      "location": "approximate location",
      "confidence": <0-100 that a citation is needed>,
      "suggested_type": "what kind of source would support it"
    }
  ],
  "source_recency": {
    "recent_5_years_pct": <float>,
    "mid_5_10_years_pct": <float>,
    "old_10_plus_years_pct": <float>,
    "flagged_chapters": [{"chapter": <int>, "old_source_pct": <float>, "concern": "text"}]
  },
  "primary_secondary_balance": {
    "primary_source_pct": <float>,
    "secondary_source_pct": <float>,
    "assessment": "adequate|needs_more_primary|needs_more_secondary",
    "recommendation": "brief recommendation"
  },
  "format_validation": {
    "format": "<the expected citation format>",
    "errors_found": <int>,
    "errors": [{"chapter": <int>, "citation_text": "as written", "issue": "what is wrong", "correction": "corrected form"}]
  },
  "summary": "2-3 paragraph summary of the citation architecture"
}"#;

const ACADEMIC_VOICE_SCHEMA: &str = r#"{
  "voice_score": <0-100>,
  "sub_scores": {"formality": <0-100>, "precision": <0-100>, "authorial_confidence": <0-100>},
  "register_consistency": {
    "overall_formality": <0-10>,
    "chapters": [
      {
        "chapter": <int>,
        "title": "Title",
        "formality_score": <0-10>,
        "flagged": <bool, true below 6.0>,
        "informal_passages": [{"text": "passage", "issue": "what makes it informal", "suggestion": "formal alternative"}]
      }
    ]
  },
  "hedge_analysis": {
    "over_hedged": [
      {"chapter": <int>, "passage": "text", "hedge_words": ["perhaps"], "issue": "how it weakens the claim", "suggestion": "more confident alternative"}
    ],
    "under_hedged": [
      {"chapter": <int>, "passage": "text", "issue": "why it needs qualification", "suggestion": "hedged alternative"}
    ]
  },
  "passive_voice": {
    "overall_percentage": <float>,
    "chapters": [
      {"chapter": <int>, "passive_pct": <float>, "flagged": <bool, true above 40%>, "worst_examples": [{"passive": "text", "active": "rewrite"}]}
    ]
  },
  "summary": "2-3 paragraph summary of academic voice quality"
}"#;

fn with_manuscript(intro: &str, manuscript: &str, schema: &str) -> String {
    format!(
        "{}\n\nMANUSCRIPT TEXT:\n\"\"\"\n{}\n\"\"\"\n\nReturn ONLY valid JSON with this structure:\n{}",
        intro, manuscript, schema
    )
}

pub fn intelligence_prompt(manuscript: &str, word_count: usize, chapter_count: usize) -> String {
    let intro = format!(
        "Analyze this complete manuscript. It has {} words across {} chapters.",
        word_count, chapter_count
    );
    with_manuscript(&intro, manuscript, INTELLIGENCE_SCHEMA)
}

pub fn voice_prompt(manuscript: &str, dialogue_lines: usize) -> String {
    let intro = format!(
        "Analyze the character voices in this manuscript. About {} dialogue lines were detected.",
        dialogue_lines
    );
    with_manuscript(&intro, manuscript, VOICE_SCHEMA)
}

pub fn pacing_prompt(manuscript: &str, chapter_count: usize) -> String {
    let intro = format!("Analyze the pacing of this {}-chapter manuscript.", chapter_count);
    with_manuscript(&intro, manuscript, PACING_SCHEMA)
}

pub fn character_arc_prompt(manuscript: &str, chapter_count: usize) -> String {
    let intro = format!(
        "Analyze the character arcs in this {}-chapter manuscript.",
        chapter_count
    );
    with_manuscript(&intro, manuscript, CHARACTER_ARC_SCHEMA)
}

/// The prose prompt carries the local counts as hints.
pub fn prose_prompt(manuscript: &str, stats: &ProseStats) -> String {
    let filter_words = &stats.filter_word_counts[..stats.filter_word_counts.len().min(20)];
    let recurring = &stats.top_recurring[..stats.top_recurring.len().min(30)];
    let intro = format!(
        "Analyze the prose quality of this manuscript.\n\n\
         LOCAL STATISTICS (already computed):\n\
         - Word count: {}\n\
         - Top filter words found: {}\n\
         - Average sentence length: {} words\n\
         - Top recurring words: {}",
        stats.word_count,
        serde_json::to_string(filter_words).unwrap_or_default(),
        stats.avg_sentence_length,
        serde_json::to_string(recurring).unwrap_or_default(),
    );
    with_manuscript(&intro, manuscript, PROSE_SCHEMA)
}

pub fn argument_prompt(manuscript: &str, chapter_count: usize, options: &ModuleOptions) -> String {
    let intro = format!(
        "Analyze the argumentative structure of this {} in the {} discipline. It has {} chapters.",
        options.document_type, options.discipline, chapter_count
    );
    with_manuscript(&intro, manuscript, ARGUMENT_SCHEMA)
}

pub fn citation_prompt(manuscript: &str, estimated_citations: usize, options: &ModuleOptions) -> String {
    let intro = format!(
        "Analyze the citation and source architecture of this academic manuscript.\n\
         Expected citation format: {}.\n\
         Local detection found approximately {} citations.",
        options.citation_format, estimated_citations
    );
    with_manuscript(&intro, manuscript, CITATION_SCHEMA)
}

pub fn academic_voice_prompt(manuscript: &str, passive_pct: f64, options: &ModuleOptions) -> String {
    let intro = format!(
        "Analyze the academic voice of this {} manuscript.\n\
         Local passive voice analysis found approximately {:.1}% passive constructions.",
        options.discipline, passive_pct
    );
    with_manuscript(&intro, manuscript, ACADEMIC_VOICE_SCHEMA)
}

pub fn originality_prompt(excerpt: &str) -> String {
    format!(
        "Rate the narrative originality of this manuscript excerpt on a scale of 0-100.\n\
         Consider premise uniqueness, genre innovation, fresh perspective and avoidance of cliches.\n\
         Return ONLY a JSON object: {{\"originality_score\": <0-100>, \"reasoning\": \"brief explanation\"}}\n\n\
         TEXT:\n\"\"\"{}\"\"\"",
        excerpt
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::prose_stats;

    #[test]
    fn manuscript_is_fenced_and_schema_follows() {
        let prompt = pacing_prompt("It was night.", 3);
        assert!(prompt.starts_with("Analyze the pacing of this 3-chapter manuscript."));
        assert!(prompt.contains("\"\"\"\nIt was night.\n\"\"\""));
        assert!(prompt.contains("\"breathing_space_flags\""));
    }

    #[test]
    fn academic_prompts_carry_options() {
        let options = ModuleOptions {
            discipline: "sociology".into(),
            document_type: "thesis".into(),
            citation_format: "Chicago".into(),
        };
        assert!(argument_prompt("x", 4, &options).contains("this thesis in the sociology discipline"));
        assert!(citation_prompt("x", 12, &options).contains("Expected citation format: Chicago."));
        assert!(academic_voice_prompt("x", 23.456, &options).contains("23.5% passive"));
    }

    #[test]
    fn prose_prompt_embeds_local_hints() {
        let text = "She just felt tired. He just seemed lost.";
        let stats = prose_stats(text, &[]);
        let prompt = prose_prompt(text, &stats);
        assert!(prompt.contains("LOCAL STATISTICS"));
        assert!(prompt.contains(r#"{"word":"just","count":2}"#));
    }

    #[test]
    fn system_prompt_demands_json() {
        assert!(system_prompt(PROSE_SYSTEM).ends_with(JSON_ONLY));
        assert!(originality_prompt("text").contains("\"originality_score\""));
    }
}
