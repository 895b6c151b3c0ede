use std::collections::HashSet;

use super::state::{SearchBatch, SearchResult, MISSING_FIELD};

/// Longest snippet, in characters, that is copied into a prompt.
pub const MAX_SNIPPET_CHARS: usize = 1500;

/// Cuts `text` to at most `max_chars` characters without splitting one.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Drops results whose URL was already seen in an earlier batch.
///
/// Results without a URL are always kept. Batches left without results are
/// removed. Order is preserved.
pub fn deduplicate_batches(batches: Vec<SearchBatch>) -> Vec<SearchBatch> {
    let mut seen: HashSet<String> = HashSet::new();
    batches
        .into_iter()
        .filter_map(|batch| {
            let results: Vec<SearchResult> = batch
                .results
                .into_iter()
                .filter(|r| r.url == MISSING_FIELD || seen.insert(r.url.clone()))
                .collect();
            if results.is_empty() {
                None
            } else {
                Some(SearchBatch {
                    query: batch.query,
                    results,
                })
            }
        })
        .collect()
}

/// Renders batches as the context block for the synthesis prompt.
pub fn format_search_batches(batches: &[SearchBatch], max_chars_per_source: usize) -> String {
    batches
        .iter()
        .map(|batch| {
            let sources = batch
                .results
                .iter()
                .map(|r| {
                    format!(
                        "Title: {}\nContent: {}\nURL: {}\n---",
                        r.title,
                        truncate_chars(&r.snippet, max_chars_per_source),
                        r.url
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");
            format!("Query: {}\n{}", batch.query, sources)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn format_sources(sources: &[SearchResult]) -> String {
    sources
        .iter()
        .map(|source| format!("* {} : {}", source.title, source.url))
        .collect::<Vec<String>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(title: &str, url: &str, snippet: &str) -> SearchResult {
        SearchResult {
            title: title.to_string(),
            url: url.to_string(),
            snippet: snippet.to_string(),
        }
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("日本語", 2), "日本");
    }

    #[test]
    fn duplicate_urls_are_dropped_across_batches() {
        let batches = vec![
            SearchBatch {
                query: "q1".to_string(),
                results: vec![result("A", "https://a", "1"), result("B", "https://b", "2")],
            },
            SearchBatch {
                query: "q2".to_string(),
                results: vec![result("A again", "https://a", "3")],
            },
            SearchBatch {
                query: "q3".to_string(),
                results: vec![result("C", "https://c", "4"), result("B again", "https://b", "5")],
            },
        ];
        let deduped = deduplicate_batches(batches);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].query, "q1");
        assert_eq!(deduped[1].query, "q3");
        assert_eq!(deduped[1].results, vec![result("C", "https://c", "4")]);
    }

    #[test]
    fn results_without_url_are_not_collapsed() {
        let batches = vec![SearchBatch {
            query: "q".to_string(),
            results: vec![
                result("A", MISSING_FIELD, "1"),
                result("B", MISSING_FIELD, "2"),
            ],
        }];
        assert_eq!(deduplicate_batches(batches)[0].results.len(), 2);
    }

    #[test]
    fn batches_render_with_query_headers_and_truncated_content() {
        let batches = vec![SearchBatch {
            query: "EV recent developments".to_string(),
            results: vec![result("Sales", "https://ev.example", &"x".repeat(20))],
        }];
        let text = format_search_batches(&batches, 5);
        assert_eq!(
            text,
            "Query: EV recent developments\nTitle: Sales\nContent: xxxxx\nURL: https://ev.example\n---"
        );
    }

    #[test]
    fn sources_render_as_bullets() {
        let sources = vec![result("A", "https://a", ""), result("B", "https://b", "")];
        assert_eq!(format_sources(&sources), "* A : https://a\n* B : https://b");
    }
}
