//! Heuristic tool ranking against a free-text utterance.
//!
//! Score components, per tool:
//! - method intent: +3.0 if the method is desired, +2.0 more if it is the primary one
//! - token overlap: +1.0 per utterance token found in the tool text, +0.5 if only
//!   in the vocabulary, capped at 8.0 and then scaled by 1.2
//! - shallow paths: `max(0, 5 - slashes) * 0.2`
//! - upload suppression: -8.0 for upload-looking tools, -6.0 for multipart
//!   consumers, unless the utterance itself asks for an upload
//!
//! The weights are heuristic and kept as-is for behavioral compatibility.

use crate::ingestion::Tool;
use crate::selection::intent::Intent;
use crate::selection::tokenize::tokenize;
use crate::selection::vocabulary::Vocabulary;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

const DESIRED_METHOD_BONUS: f64 = 3.0;
const PRIMARY_METHOD_BONUS: f64 = 2.0;
const LITERAL_MATCH: f64 = 1.0;
const VOCABULARY_MATCH: f64 = 0.5;
const OVERLAP_CAP: f64 = 8.0;
const OVERLAP_WEIGHT: f64 = 1.2;
const MAX_DEPTH_BONUS_SLASHES: usize = 5;
const DEPTH_WEIGHT: f64 = 0.2;
const UPLOAD_PENALTY: f64 = 8.0;
const MULTIPART_PENALTY: f64 = 6.0;

/// Tool text that looks like an upload endpoint.
static UPLOAD_INDICATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(upload|image|file|avatar|photo|multipart)").expect("Failed to compile regex")
});

/// Utterance text that explicitly asks for an upload.
static UPLOAD_INTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(upload|image|file|photo|avatar|picture|binary)")
        .expect("Failed to compile regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankPolicy {
    /// Penalize upload/multipart tools unless the utterance asks for one.
    pub avoid_uploads: bool,
}

impl Default for RankPolicy {
    fn default() -> Self {
        Self { avoid_uploads: true }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScoredTool<'a> {
    pub tool: &'a Tool,
    pub score: f64,
}

/// An utterance tokenized and classified once, scored against many tools.
pub struct Query<'u> {
    utterance: &'u str,
    tokens: HashSet<String>,
    intent: Intent,
}

impl<'u> Query<'u> {
    pub fn new(utterance: &'u str) -> Self {
        let tokens = tokenize(utterance);
        let intent = Intent::infer(&tokens);
        Self {
            utterance,
            tokens: tokens.into_iter().collect(),
            intent,
        }
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    pub fn wants_upload(&self) -> bool {
        UPLOAD_INTENT.is_match(self.utterance)
    }

    pub fn score(&self, tool: &Tool, vocabulary: &Vocabulary, policy: RankPolicy) -> f64 {
        let mut score = 0.0;

        if self.intent.desired_methods().contains(&tool.method) {
            score += DESIRED_METHOD_BONUS;
        }
        if tool.method == self.intent.primary_method() {
            score += PRIMARY_METHOD_BONUS;
        }

        let text = tool.search_text();
        let overlap: f64 = self
            .tokens
            .iter()
            .map(|token| {
                if text.contains(token.as_str()) {
                    LITERAL_MATCH
                } else if vocabulary.contains(token) {
                    VOCABULARY_MATCH
                } else {
                    0.0
                }
            })
            .sum();
        score += overlap.min(OVERLAP_CAP) * OVERLAP_WEIGHT;

        let depth = tool.path.matches('/').count();
        score += MAX_DEPTH_BONUS_SLASHES.saturating_sub(depth) as f64 * DEPTH_WEIGHT;

        if policy.avoid_uploads && !self.wants_upload() {
            if UPLOAD_INDICATOR.is_match(&text) {
                score -= UPLOAD_PENALTY;
            }
            if tool.accepts_multipart() {
                score -= MULTIPART_PENALTY;
            }
        }

        score
    }
}

/// Score every tool and order by score descending. Ties keep input order.
pub fn rank_scored<'a>(
    utterance: &str,
    tools: &'a [Tool],
    vocabulary: &Vocabulary,
    policy: RankPolicy,
) -> Vec<ScoredTool<'a>> {
    let query = Query::new(utterance);

    let mut scored: Vec<ScoredTool<'a>> = tools
        .iter()
        .map(|tool| ScoredTool {
            tool,
            score: query.score(tool, vocabulary, policy),
        })
        .collect();

    // Vec::sort_by is stable
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    tracing::trace!(intent = ?query.intent(), candidates = scored.len(), "Tools scored");
    scored
}

/// The `limit` best tools for `utterance`. A limit of 0 is treated as 1.
pub fn rank<'a>(
    utterance: &str,
    tools: &'a [Tool],
    limit: usize,
    vocabulary: &Vocabulary,
    policy: RankPolicy,
) -> Vec<&'a Tool> {
    rank_scored(utterance, tools, vocabulary, policy)
        .into_iter()
        .take(limit.max(1))
        .map(|scored| scored.tool)
        .collect()
}
