//! Search documents, summaries, and the default lexical searcher.
//!
//! The index flattens each tool record into a [`SearchDoc`] and hands the full,
//! ID-sorted document set to a [`Searcher`]. Searchers only ever see summaries,
//! never schemas, so results stay cheap to return.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use toolmodel::Tool;

use crate::error::IndexResult;

/// Default truncation length for [`Summary::short_description`], in characters.
pub const MAX_SHORT_DESCRIPTION_LEN: usize = 120;

/// Token-cheap view of a tool returned by search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub short_description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Summary {
    pub(crate) fn from_tool(tool: &Tool, normalized_tags: &[String], max_len: usize) -> Self {
        Self {
            id: tool.tool_id(),
            name: tool.name.clone(),
            namespace: tool.namespace.clone(),
            short_description: truncate_chars(&tool.description, max_len),
            tags: normalized_tags.to_vec(),
        }
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => s[..byte_idx].to_string(),
        None => s.to_string(),
    }
}

/// Precomputed search data for one tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchDoc {
    /// Canonical tool ID.
    pub id: String,
    /// Lowercased name, namespace, description, and normalized tags.
    pub doc_text: String,
    pub summary: Summary,
}

pub(crate) fn build_doc_text(tool: &Tool, normalized_tags: &[String]) -> String {
    let mut parts = vec![
        tool.name.to_lowercase(),
        tool.namespace.to_lowercase(),
        tool.description.to_lowercase(),
    ];
    parts.extend(normalized_tags.iter().cloned());
    parts.join(" ")
}

/// Ranking over a materialized document set.
///
/// `docs` arrive sorted by ascending tool ID.
pub trait Searcher: Send + Sync {
    fn search(&self, query: &str, limit: usize, docs: &[SearchDoc]) -> IndexResult<Vec<Summary>>;

    /// Whether identical `(query, limit, docs)` always produce identical
    /// output order. Cursor pagination is refused for searchers that do not
    /// declare this.
    fn is_deterministic(&self) -> bool {
        false
    }
}

const NAME_MATCH_SCORE: u32 = 100;
const EXACT_NAME_BONUS: u32 = 50;
const NAMESPACE_MATCH_SCORE: u32 = 50;
const TEXT_MATCH_SCORE: u32 = 10;

/// Substring ranking over name, namespace, and document text.
///
/// - name contains query: +100, plus +50 when the name equals the query
/// - namespace contains query: +50
/// - otherwise, document text contains query: +10
///
/// Ties break on ascending tool ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalSearcher;

impl LexicalSearcher {
    fn score(query: &str, doc: &SearchDoc) -> u32 {
        let mut score = 0;

        let name = doc.summary.name.to_lowercase();
        if name.contains(query) {
            score += NAME_MATCH_SCORE;
            if name == query {
                score += EXACT_NAME_BONUS;
            }
        }

        if doc.summary.namespace.to_lowercase().contains(query) {
            score += NAMESPACE_MATCH_SCORE;
        }

        if score == 0 && doc.doc_text.contains(query) {
            score += TEXT_MATCH_SCORE;
        }

        score
    }
}

impl Searcher for LexicalSearcher {
    fn search(&self, query: &str, limit: usize, docs: &[SearchDoc]) -> IndexResult<Vec<Summary>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Ok(docs
                .iter()
                .take(limit)
                .map(|doc| doc.summary.clone())
                .collect());
        }

        let mut scored: Vec<(u32, &SearchDoc)> = docs
            .iter()
            .filter_map(|doc| {
                let score = Self::score(&query, doc);
                (score > 0).then_some((score, doc))
            })
            .collect();

        scored.sort_by(|(sa, a), (sb, b)| match sb.cmp(sa) {
            Ordering::Equal => a.id.cmp(&b.id),
            other => other,
        });

        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(_, doc)| doc.summary.clone())
            .collect())
    }

    fn is_deterministic(&self) -> bool {
        true
    }
}
