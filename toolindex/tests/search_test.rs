mod common;

use std::sync::Arc;

use common::{ids, init_test_logging, make_tool, register};
use parking_lot::Mutex;
use toolindex::{
    BackendKind, CursorToken, ErrorKind, InMemoryIndex, IndexError, IndexOptions, IndexResult,
    Refresher, SearchDoc, Searcher, Summary, ToolBackend, ToolIndex,
};

fn walk_search_pages(index: &InMemoryIndex, query: &str, limit: usize) -> Vec<Summary> {
    let mut collected = Vec::new();
    let mut cursor = String::new();
    loop {
        let page = index.search_page(query, limit, &cursor).unwrap();
        collected.extend(page.items);
        match page.next_cursor {
            Some(next) => cursor = next,
            None => return collected,
        }
    }
}

// ============================================================================
// Search
// ============================================================================

#[test]
fn test_ranking_across_fields() {
    init_test_logging();
    let index = InMemoryIndex::new();
    register(
        &index,
        make_tool("get_repo", "github", "Fetch a repository"),
        ToolBackend::mcp("github"),
    );
    register(
        &index,
        make_tool("list_issues", "github", "List issues for a repo"),
        ToolBackend::mcp("github"),
    );
    register(
        &index,
        make_tool("repo", "gitlab", "Exact name match"),
        ToolBackend::mcp("gitlab"),
    );

    let results = index.search("repo", 10).unwrap();
    assert_eq!(
        ids(&results),
        vec!["gitlab:repo", "github:get_repo", "github:list_issues"]
    );

    let results = index.search("github", 10).unwrap();
    assert_eq!(ids(&results), vec!["github:get_repo", "github:list_issues"]);
}

#[test]
fn test_empty_query_lists_in_id_order() {
    init_test_logging();
    let index = InMemoryIndex::new();
    for name in ["delta", "alpha", "charlie", "bravo"] {
        register(&index, make_tool(name, "ns", "d"), ToolBackend::mcp("s"));
    }

    let first = index.search("", 3).unwrap();
    assert_eq!(ids(&first), vec!["ns:alpha", "ns:bravo", "ns:charlie"]);
    assert_eq!(index.search("", 100).unwrap().len(), 4);
    assert_eq!(index.search("", 3).unwrap(), first);
    assert!(index.search("", 0).unwrap().is_empty());
}

#[test]
fn test_search_reflects_unregistration() {
    init_test_logging();
    let index = InMemoryIndex::new();
    register(&index, make_tool("alpha", "ns", "d"), ToolBackend::mcp("s"));
    register(&index, make_tool("beta", "ns", "d"), ToolBackend::mcp("s"));
    assert_eq!(index.search("", 10).unwrap().len(), 2);

    index
        .unregister_backend("ns:alpha", BackendKind::Mcp, "s")
        .unwrap();
    assert_eq!(ids(&index.search("", 10).unwrap()), vec!["ns:beta"]);
    assert_eq!(index.stats().cache_builds, 2);
}

// ============================================================================
// Search pagination
// ============================================================================

#[test]
fn test_search_page_walkthrough() {
    init_test_logging();
    let index = InMemoryIndex::new();
    for name in ["zebra", "alpha", "middle"] {
        register(
            &index,
            make_tool(name, "ns", "d"),
            ToolBackend::local(format!("{}_handler", name)),
        );
    }
    assert_eq!(index.list_namespaces().unwrap(), vec!["ns"]);

    let first = index.search_page("", 2, "").unwrap();
    assert_eq!(ids(&first.items), vec!["ns:alpha", "ns:middle"]);
    let cursor = first.next_cursor.unwrap();
    assert!(!cursor.is_empty());

    let second = index.search_page("", 2, &cursor).unwrap();
    assert_eq!(ids(&second.items), vec!["ns:zebra"]);
    assert!(second.next_cursor.is_none());
}

#[test]
fn test_pages_compose_to_full_result() {
    init_test_logging();
    let index = InMemoryIndex::new();
    for i in 0..23 {
        let namespace = if i % 2 == 0 { "even" } else { "odd" };
        register(
            &index,
            make_tool(&format!("tool_{:02}", i), namespace, "numbered tool"),
            ToolBackend::mcp("s"),
        );
    }

    for query in ["", "tool", "even", "numbered"] {
        let full = index.search(query, usize::MAX).unwrap();
        for limit in [1, 4, 7, 23, 50] {
            assert_eq!(
                walk_search_pages(&index, query, limit),
                full,
                "query={query:?} limit={limit}"
            );
        }
    }
}

#[test]
fn test_cursor_stale_after_mutation() {
    init_test_logging();
    let index = InMemoryIndex::new();
    for name in ["a", "b", "c"] {
        register(&index, make_tool(name, "ns", "d"), ToolBackend::mcp("s"));
    }
    let cursor = index.search_page("", 1, "").unwrap().next_cursor.unwrap();

    register(&index, make_tool("d", "ns", "d"), ToolBackend::mcp("s"));
    let err = index.search_page("", 1, &cursor).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidCursor);
}

#[test]
fn test_cursor_stale_after_refresh() {
    init_test_logging();
    let index = InMemoryIndex::new();
    for name in ["a", "b"] {
        register(&index, make_tool(name, "ns", "d"), ToolBackend::mcp("s"));
    }
    let cursor = index.search_page("", 1, "").unwrap().next_cursor.unwrap();

    index.refresh();
    assert!(matches!(
        index.search_page("", 1, &cursor),
        Err(IndexError::InvalidCursor(_))
    ));
}

#[test]
fn test_cursor_carries_index_version() {
    init_test_logging();
    let index = InMemoryIndex::new();
    for name in ["a", "b"] {
        register(&index, make_tool(name, "ns", "d"), ToolBackend::mcp("s"));
    }
    let cursor = index.search_page("", 1, "").unwrap().next_cursor.unwrap();
    let token = CursorToken::decode(&cursor).unwrap().unwrap();
    assert_eq!(token.offset, 1);
    assert_eq!(token.checksum, index.version());
}

#[test]
fn test_malformed_cursor_rejected() {
    init_test_logging();
    let index = InMemoryIndex::new();
    register(&index, make_tool("a", "ns", "d"), ToolBackend::mcp("s"));

    for bad in ["%%%", "aGVsbG8=", "eyJvZmZzZXQiOiJ4In0="] {
        let err = index.search_page("", 1, bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCursor, "{bad}");
        let err = index.list_namespaces_page(1, bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCursor, "{bad}");
    }
}

#[test]
fn test_zero_limit_rejected_for_pages() {
    init_test_logging();
    let index = InMemoryIndex::new();
    assert!(matches!(
        index.search_page("", 0, ""),
        Err(IndexError::InvalidLimit)
    ));
    assert!(matches!(
        index.list_namespaces_page(0, ""),
        Err(IndexError::InvalidLimit)
    ));
}

// ============================================================================
// Namespace pagination
// ============================================================================

#[test]
fn test_namespace_pages() {
    init_test_logging();
    let index = InMemoryIndex::new();
    for namespace in ["echo", "alpha", "delta", "bravo", "charlie"] {
        register(&index, make_tool("t", namespace, "d"), ToolBackend::mcp("s"));
    }

    let mut collected = Vec::new();
    let mut cursor = String::new();
    loop {
        let page = index.list_namespaces_page(2, &cursor).unwrap();
        assert!(page.items.len() <= 2);
        collected.extend(page.items);
        match page.next_cursor {
            Some(next) => cursor = next,
            None => break,
        }
    }
    assert_eq!(collected, index.list_namespaces().unwrap());
    assert_eq!(collected, vec!["alpha", "bravo", "charlie", "delta", "echo"]);
}

#[test]
fn test_namespace_cursor_stale_after_removal() {
    init_test_logging();
    let index = InMemoryIndex::new();
    for namespace in ["a", "b", "c"] {
        register(&index, make_tool("t", namespace, "d"), ToolBackend::mcp("s"));
    }
    let cursor = index.list_namespaces_page(2, "").unwrap().next_cursor.unwrap();

    index.unregister_backend("a:t", BackendKind::Mcp, "s").unwrap();
    assert!(matches!(
        index.list_namespaces_page(2, &cursor),
        Err(IndexError::InvalidCursor(_))
    ));
}

// ============================================================================
// Custom searchers
// ============================================================================

/// Records the documents it receives and returns them in reverse.
#[derive(Default)]
struct RecordingSearcher {
    seen: Mutex<Vec<SearchDoc>>,
    deterministic: bool,
}

impl Searcher for RecordingSearcher {
    fn search(&self, _query: &str, limit: usize, docs: &[SearchDoc]) -> IndexResult<Vec<Summary>> {
        *self.seen.lock() = docs.to_vec();
        Ok(docs
            .iter()
            .rev()
            .take(limit)
            .map(|doc| doc.summary.clone())
            .collect())
    }

    fn is_deterministic(&self) -> bool {
        self.deterministic
    }
}

struct FailingSearcher;

impl Searcher for FailingSearcher {
    fn search(&self, _: &str, _: usize, _: &[SearchDoc]) -> IndexResult<Vec<Summary>> {
        Err(IndexError::Search("backend unavailable".to_string()))
    }
}

#[test]
fn test_custom_searcher_receives_sorted_docs() {
    init_test_logging();
    let searcher = Arc::new(RecordingSearcher::default());
    let index =
        InMemoryIndex::with_options(IndexOptions::new().with_searcher(searcher.clone()));
    register(
        &index,
        make_tool("beta", "ns", "Second tool").with_tags(["Web Search"]),
        ToolBackend::mcp("s"),
    );
    register(&index, make_tool("alpha", "ns", "First"), ToolBackend::mcp("s"));

    let results = index.search("anything", 10).unwrap();
    assert_eq!(ids(&results), vec!["ns:beta", "ns:alpha"]);

    let seen = searcher.seen.lock().clone();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].id, "ns:alpha");
    assert_eq!(seen[1].id, "ns:beta");
    assert!(seen[1].doc_text.contains("web-search"));
    assert!(seen[1].doc_text.contains("second tool"));
    assert_eq!(seen[1].summary.short_description, "Second tool");
}

#[test]
fn test_nondeterministic_searcher_refused_for_pages() {
    init_test_logging();
    let index = InMemoryIndex::with_options(
        IndexOptions::new().with_searcher(Arc::new(RecordingSearcher::default())),
    );
    register(&index, make_tool("a", "ns", "d"), ToolBackend::mcp("s"));

    assert!(index.search("", 10).is_ok());
    let err = index.search_page("", 10, "").unwrap_err();
    assert!(matches!(err, IndexError::NonDeterministicSearcher));
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_determinism_check_can_be_disabled() {
    init_test_logging();
    let options = IndexOptions {
        require_deterministic_paging: false,
        ..IndexOptions::new().with_searcher(Arc::new(RecordingSearcher::default()))
    };
    let index = InMemoryIndex::with_options(options);
    register(&index, make_tool("a", "ns", "d"), ToolBackend::mcp("s"));
    register(&index, make_tool("b", "ns", "d"), ToolBackend::mcp("s"));

    let page = index.search_page("", 1, "").unwrap();
    assert_eq!(ids(&page.items), vec!["ns:b"]);
}

#[test]
fn test_deterministic_custom_searcher_pages() {
    init_test_logging();
    let searcher = RecordingSearcher {
        deterministic: true,
        ..Default::default()
    };
    let index = InMemoryIndex::with_options(IndexOptions::new().with_searcher(Arc::new(searcher)));
    for name in ["a", "b", "c"] {
        register(&index, make_tool(name, "ns", "d"), ToolBackend::mcp("s"));
    }
    assert_eq!(
        ids(&walk_search_pages(&index, "", 2)),
        vec!["ns:c", "ns:b", "ns:a"]
    );
}

#[test]
fn test_searcher_errors_propagate() {
    init_test_logging();
    let options = IndexOptions {
        require_deterministic_paging: false,
        ..IndexOptions::new().with_searcher(Arc::new(FailingSearcher))
    };
    let index = InMemoryIndex::with_options(options);
    register(&index, make_tool("a", "ns", "d"), ToolBackend::mcp("s"));

    assert_eq!(
        index.search("a", 10).unwrap_err().kind(),
        ErrorKind::Search
    );
    assert_eq!(
        index.search_page("a", 10, "").unwrap_err().kind(),
        ErrorKind::Search
    );
}
