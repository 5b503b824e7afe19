//! The registry core.
//!
//! [`InMemoryIndex`] keeps every tool record, the namespace counts, the
//! search-document cache, the version counter and the listener list in one
//! aggregate behind a single `RwLock`. Each mutation updates all of them in one
//! critical section, then notifies listeners after the lock is released.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::{Arc, Weak},
};

use parking_lot::RwLock;
use toolmodel::{normalize_tags, BackendKind, Tool, ToolBackend};
use tracing::{debug, warn};

use crate::{
    cache::{self, Materialize, StampedCache},
    config::IndexOptions,
    cursor::{paginate, Page},
    equality::protocol_fields_equal,
    error::{IndexError, IndexResult},
    events::{notify, ChangeEvent, ChangeListener, ChangeType, Listeners, Subscription},
    identity::{validate_backend, BackendKey},
    search::{build_doc_text, SearchDoc, Searcher, Summary},
    selector::BackendSelector,
};

/// One element of a batch registration.
#[derive(Debug, Clone)]
pub struct ToolRegistration {
    pub tool: Tool,
    pub backend: ToolBackend,
}

impl ToolRegistration {
    pub fn new(tool: Tool, backend: ToolBackend) -> Self {
        Self { tool, backend }
    }
}

/// Registration, lookup and discovery over a set of tools.
pub trait ToolIndex: Send + Sync {
    /// Register `tool` with `backend`, or attach `backend` to an existing
    /// record with the same ID.
    fn register_tool(&self, tool: Tool, backend: ToolBackend) -> IndexResult<()>;

    /// Register each entry in order, stopping at the first failure. Entries
    /// before the failing one stay registered.
    fn register_tools(&self, registrations: Vec<ToolRegistration>) -> IndexResult<()>;

    /// Register every tool against one MCP server backend.
    fn register_tools_from_mcp(&self, server_name: &str, tools: Vec<Tool>) -> IndexResult<()>;

    /// Detach one backend. Provider backends are addressed as
    /// `providerID:toolID`. Removing the last backend removes the tool.
    fn unregister_backend(
        &self,
        tool_id: &str,
        kind: BackendKind,
        backend_id: &str,
    ) -> IndexResult<()>;

    /// The tool and the backend chosen by the configured selector.
    fn get_tool(&self, id: &str) -> IndexResult<(Tool, ToolBackend)>;

    /// All backends of a tool, in registration order.
    fn get_all_backends(&self, id: &str) -> IndexResult<Vec<ToolBackend>>;

    fn search(&self, query: &str, limit: usize) -> IndexResult<Vec<Summary>>;

    fn search_page(&self, query: &str, limit: usize, cursor: &str) -> IndexResult<Page<Summary>>;

    /// Namespaces with at least one tool, sorted ascending. The empty
    /// namespace is included when any tool lacks a namespace.
    fn list_namespaces(&self) -> IndexResult<Vec<String>>;

    fn list_namespaces_page(&self, limit: usize, cursor: &str) -> IndexResult<Page<String>>;
}

pub trait ChangeNotifier {
    /// Register a listener. `None` registers nothing and returns a handle
    /// whose `unsubscribe` does nothing.
    fn on_change(&self, listener: Option<ChangeListener>) -> Subscription;
}

pub trait Refresher {
    /// Force a cache rebuild. Returns the new index version.
    fn refresh(&self) -> u64;
}

/// Point-in-time counters for an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexStats {
    pub tools: usize,
    pub namespaces: usize,
    pub backends: usize,
    pub version: u64,
    pub cache_builds: usize,
}

struct ToolRecord {
    tool: Tool,
    backends: Vec<ToolBackend>,
    /// Identity key -> position in `backends`.
    slots: HashMap<BackendKey, usize>,
    normalized_tags: Vec<String>,
    doc_text: String,
    summary: Summary,
}

impl ToolRecord {
    fn new(tool: Tool, normalized_tags: Vec<String>, max_description_len: usize) -> Self {
        let doc_text = build_doc_text(&tool, &normalized_tags);
        let summary = Summary::from_tool(&tool, &normalized_tags, max_description_len);
        Self {
            tool,
            backends: Vec::new(),
            slots: HashMap::new(),
            normalized_tags,
            doc_text,
            summary,
        }
    }

    /// Take namespace and tags from a re-registration and recompute the
    /// derived search fields.
    fn apply_extensions(&mut self, tool: Tool, normalized_tags: Vec<String>, max_len: usize) {
        self.tool.namespace = tool.namespace;
        self.tool.tags = tool.tags;
        self.normalized_tags = normalized_tags;
        self.doc_text = build_doc_text(&self.tool, &self.normalized_tags);
        self.summary = Summary::from_tool(&self.tool, &self.normalized_tags, max_len);
    }

    fn upsert_backend(&mut self, key: BackendKey, backend: ToolBackend) {
        match self.slots.get(&key) {
            Some(&slot) => self.backends[slot] = backend,
            None => {
                self.slots.insert(key, self.backends.len());
                self.backends.push(backend);
            }
        }
    }

    fn remove_backend(&mut self, key: &BackendKey) -> Option<ToolBackend> {
        let slot = self.slots.remove(key)?;
        let removed = self.backends.remove(slot);
        for position in self.slots.values_mut() {
            if *position > slot {
                *position -= 1;
            }
        }
        Some(removed)
    }

    fn search_doc(&self, id: &str) -> SearchDoc {
        SearchDoc {
            id: id.to_string(),
            doc_text: self.doc_text.clone(),
            summary: self.summary.clone(),
        }
    }
}

#[derive(Default)]
struct IndexState {
    tools: HashMap<String, ToolRecord>,
    /// Namespace -> number of tools in it. Entries never hold zero.
    namespaces: BTreeMap<String, usize>,
    version: u64,
    search_docs: StampedCache<SearchDoc>,
    listeners: Listeners,
}

impl IndexState {
    fn acquire_namespace(&mut self, namespace: &str) {
        *self.namespaces.entry(namespace.to_string()).or_insert(0) += 1;
    }

    fn release_namespace(&mut self, namespace: &str) {
        if let Some(count) = self.namespaces.get_mut(namespace) {
            *count -= 1;
            if *count == 0 {
                self.namespaces.remove(namespace);
            }
        }
    }

    /// Bump the version, mark the cache dirty, and capture the event and the
    /// listeners to notify once the lock is released.
    fn record_change(
        &mut self,
        change_type: ChangeType,
        tool_id: Option<String>,
        backend: Option<ToolBackend>,
    ) -> (ChangeEvent, Vec<ChangeListener>) {
        self.version += 1;
        self.search_docs.invalidate();
        let event = ChangeEvent {
            change_type,
            tool_id,
            backend,
            version: self.version,
        };
        (event, self.listeners.snapshot())
    }
}

impl Materialize for IndexState {
    type Item = SearchDoc;

    fn version(&self) -> u64 {
        self.version
    }

    fn cache(&self) -> &StampedCache<SearchDoc> {
        &self.search_docs
    }

    fn cache_mut(&mut self) -> &mut StampedCache<SearchDoc> {
        &mut self.search_docs
    }

    fn materialize(&self) -> Vec<SearchDoc> {
        let mut docs: Vec<SearchDoc> = self
            .tools
            .iter()
            .map(|(id, record)| record.search_doc(id))
            .collect();
        docs.sort_by(|a, b| a.id.cmp(&b.id));
        debug!(
            docs = docs.len(),
            version = self.version,
            "Rebuilt search documents"
        );
        docs
    }
}

/// Thread-safe in-memory [`ToolIndex`].
///
/// Cloning is cheap and yields a handle to the same index.
#[derive(Clone)]
pub struct InMemoryIndex {
    state: Arc<RwLock<IndexState>>,
    backend_selector: BackendSelector,
    searcher: Arc<dyn Searcher>,
    max_short_description_len: usize,
    require_deterministic_paging: bool,
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InMemoryIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryIndex")
            .field("stats", &self.stats())
            .field("listeners", &self.state.read().listeners.len())
            .field("max_short_description_len", &self.max_short_description_len)
            .field(
                "require_deterministic_paging",
                &self.require_deterministic_paging,
            )
            .finish_non_exhaustive()
    }
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::with_options(IndexOptions::default())
    }

    pub fn with_options(options: IndexOptions) -> Self {
        Self {
            state: Arc::new(RwLock::new(IndexState::default())),
            backend_selector: options.resolved_selector(),
            searcher: options.resolved_searcher(),
            max_short_description_len: options.max_short_description_len,
            require_deterministic_paging: options.require_deterministic_paging,
        }
    }

    /// Current index version. Every successful mutation and every refresh
    /// increments it.
    pub fn version(&self) -> u64 {
        self.state.read().version
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.state.read().tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().tools.is_empty()
    }

    pub fn stats(&self) -> IndexStats {
        let state = self.state.read();
        IndexStats {
            tools: state.tools.len(),
            namespaces: state.namespaces.len(),
            backends: state.tools.values().map(|r| r.backends.len()).sum(),
            version: state.version,
            cache_builds: state.search_docs.builds(),
        }
    }

    /// Register a closure as a change listener.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        self.on_change(Some(Arc::new(listener)))
    }

    fn search_docs(&self) -> cache::Snapshot<SearchDoc> {
        cache::snapshot(&*self.state)
    }
}

impl ToolIndex for InMemoryIndex {
    fn register_tool(&self, tool: Tool, backend: ToolBackend) -> IndexResult<()> {
        tool.validate()?;
        validate_backend(&backend)?;

        let tool_id = tool.tool_id();
        let key = BackendKey::of(&backend);
        let normalized_tags = normalize_tags(&tool.tags);
        let max_len = self.max_short_description_len;

        let (event, listeners) = {
            let mut guard = self.state.write();
            let state = &mut *guard;

            let change_type = if let Some(record) = state.tools.get_mut(&tool_id) {
                if !protocol_fields_equal(&record.tool, &tool) {
                    warn!(
                        tool_id = %tool_id,
                        backend = %key.as_str(),
                        "Rejected re-registration with different protocol fields"
                    );
                    return Err(IndexError::ToolMismatch(tool_id));
                }
                let previous_namespace = record.tool.namespace.clone();
                record.apply_extensions(tool, normalized_tags, max_len);
                record.upsert_backend(key, backend.clone());
                if previous_namespace != record.tool.namespace {
                    let namespace = record.tool.namespace.clone();
                    state.release_namespace(&previous_namespace);
                    state.acquire_namespace(&namespace);
                }
                ChangeType::Updated
            } else {
                let mut record = ToolRecord::new(tool, normalized_tags, max_len);
                record.upsert_backend(key, backend.clone());
                state.acquire_namespace(&record.tool.namespace);
                state.tools.insert(tool_id.clone(), record);
                ChangeType::Registered
            };

            state.record_change(change_type, Some(tool_id), Some(backend))
        };

        debug!(
            tool_id = event.tool_id.as_deref().unwrap_or_default(),
            change = %event.change_type,
            version = event.version,
            "Registered tool backend"
        );
        notify(&listeners, &event);
        Ok(())
    }

    fn register_tools(&self, registrations: Vec<ToolRegistration>) -> IndexResult<()> {
        for ToolRegistration { tool, backend } in registrations {
            self.register_tool(tool, backend)?;
        }
        Ok(())
    }

    fn register_tools_from_mcp(&self, server_name: &str, tools: Vec<Tool>) -> IndexResult<()> {
        let backend = ToolBackend::mcp(server_name);
        for tool in tools {
            self.register_tool(tool, backend.clone())?;
        }
        Ok(())
    }

    fn unregister_backend(
        &self,
        tool_id: &str,
        kind: BackendKind,
        backend_id: &str,
    ) -> IndexResult<()> {
        let key = BackendKey::for_removal(kind, backend_id)?;

        let (event, listeners) = {
            let mut guard = self.state.write();
            let state = &mut *guard;

            let record = state
                .tools
                .get_mut(tool_id)
                .ok_or_else(|| IndexError::NotFound(format!("tool '{}'", tool_id)))?;
            let removed = record.remove_backend(&key).ok_or_else(|| {
                IndexError::NotFound(format!(
                    "{} backend '{}' on tool '{}'",
                    kind, backend_id, tool_id
                ))
            })?;

            let change_type = if record.backends.is_empty() {
                if let Some(record) = state.tools.remove(tool_id) {
                    state.release_namespace(&record.tool.namespace);
                }
                ChangeType::ToolRemoved
            } else {
                ChangeType::BackendRemoved
            };

            state.record_change(change_type, Some(tool_id.to_string()), Some(removed))
        };

        debug!(
            tool_id = %tool_id,
            change = %event.change_type,
            version = event.version,
            "Unregistered tool backend"
        );
        notify(&listeners, &event);
        Ok(())
    }

    fn get_tool(&self, id: &str) -> IndexResult<(Tool, ToolBackend)> {
        let (tool, backends) = {
            let state = self.state.read();
            let record = state
                .tools
                .get(id)
                .ok_or_else(|| IndexError::NotFound(format!("tool '{}'", id)))?;
            (record.tool.clone(), record.backends.clone())
        };

        let backend = (self.backend_selector)(&backends)
            .or_else(|| backends.first().cloned())
            .ok_or_else(|| IndexError::NotFound(format!("backend for tool '{}'", id)))?;
        Ok((tool, backend))
    }

    fn get_all_backends(&self, id: &str) -> IndexResult<Vec<ToolBackend>> {
        let state = self.state.read();
        state
            .tools
            .get(id)
            .map(|record| record.backends.clone())
            .ok_or_else(|| IndexError::NotFound(format!("tool '{}'", id)))
    }

    fn search(&self, query: &str, limit: usize) -> IndexResult<Vec<Summary>> {
        let docs = self.search_docs();
        self.searcher.search(query, limit, &docs.items)
    }

    fn search_page(&self, query: &str, limit: usize, cursor: &str) -> IndexResult<Page<Summary>> {
        if limit == 0 {
            return Err(IndexError::InvalidLimit);
        }
        if self.require_deterministic_paging && !self.searcher.is_deterministic() {
            return Err(IndexError::NonDeterministicSearcher);
        }

        let docs = self.search_docs();
        let results = self.searcher.search(query, docs.items.len(), &docs.items)?;
        paginate(&results, limit, cursor, docs.version)
    }

    fn list_namespaces(&self) -> IndexResult<Vec<String>> {
        Ok(self.state.read().namespaces.keys().cloned().collect())
    }

    fn list_namespaces_page(&self, limit: usize, cursor: &str) -> IndexResult<Page<String>> {
        if limit == 0 {
            return Err(IndexError::InvalidLimit);
        }
        let (namespaces, version) = {
            let state = self.state.read();
            let namespaces: Vec<String> = state.namespaces.keys().cloned().collect();
            (namespaces, state.version)
        };
        paginate(&namespaces, limit, cursor, version)
    }
}

impl ChangeNotifier for InMemoryIndex {
    fn on_change(&self, listener: Option<ChangeListener>) -> Subscription {
        let Some(listener) = listener else {
            return Subscription::noop();
        };

        let id = self.state.write().listeners.add(listener);
        let state: Weak<RwLock<IndexState>> = Arc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = state.upgrade() {
                state.write().listeners.remove(id);
            }
        })
    }
}

impl Refresher for InMemoryIndex {
    fn refresh(&self) -> u64 {
        let (event, listeners) = {
            let mut state = self.state.write();
            let change = state.record_change(ChangeType::Refreshed, None, None);
            state.rebuild();
            change
        };

        debug!(version = event.version, "Refreshed tool index");
        notify(&listeners, &event);
        event.version
    }
}
