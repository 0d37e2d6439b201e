pub mod brave;

use std::future::Future;

use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Character budget for result descriptions. Keeps tool-result payloads
/// small enough that a round of 20 results stays around a hundred tokens.
pub const DESCRIPTION_BUDGET: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub description: String,
    pub url: String,
    /// Freeform recency hint from the provider ("2 days ago" etc.)
    pub published: Option<String>,
}

/// Web search behind the agent's `search_news` tool.
///
/// Infallible by contract: provider failures (network, auth, rate limits)
/// are logged by the implementation and surface as an empty result list,
/// so the agentic loop always has a uniform "no results" signal.
pub trait NewsSearch {
    /// Provider cap on results per request.
    const MAX_RESULTS: usize;

    fn search(
        &self,
        query: &str,
        count: usize,
    ) -> impl Future<Output = Vec<SearchResult>> + Send;
}

impl<T: NewsSearch + Send + Sync> NewsSearch for &T {
    const MAX_RESULTS: usize = T::MAX_RESULTS;

    async fn search(&self, query: &str, count: usize) -> Vec<SearchResult> {
        (**self).search(query, count).await
    }
}

/// Render results as a compact numbered block for a tool-result turn.
pub fn format_search_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No results found.".to_string();
    }

    let mut out = String::new();
    for (i, r) in results.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{}. \"{}\" - {}", i + 1, r.title, r.description);
        if let Some(published) = r.published.as_deref().filter(|p| !p.is_empty()) {
            let _ = write!(out, " ({published})");
        }
    }
    out
}

/// Truncate on a char boundary so multi-byte titles never split mid-char.
pub(crate) fn truncate_chars(s: &str, budget: usize) -> String {
    match s.char_indices().nth(budget) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(title: &str, published: Option<&str>) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            description: "desc".to_string(),
            url: "https://example.com".to_string(),
            published: published.map(str::to_string),
        }
    }

    #[test]
    fn empty_results_render_placeholder() {
        assert_eq!(format_search_results(&[]), "No results found.");
    }

    #[test]
    fn results_are_numbered_with_recency() {
        let formatted = format_search_results(&[
            result("First", Some("2 days ago")),
            result("Second", None),
            result("Third", Some("")),
        ]);

        let lines: Vec<&str> = formatted.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "1. \"First\" - desc (2 days ago)");
        assert_eq!(lines[1], "2. \"Second\" - desc");
        // empty recency hints are dropped, not rendered as "()"
        assert_eq!(lines[2], "3. \"Third\" - desc");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("héllö wörld", 5), "héllö");
    }
}
