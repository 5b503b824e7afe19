//! In-process tool registry with cached search and cursor pagination.
//!
//! ## Modules
//!
//! - [`index`]: The registry core ([`InMemoryIndex`]) and its traits
//! - [`search`]: Search documents, summaries, and the default lexical searcher
//! - [`cursor`]: Opaque pagination cursors
//! - [`events`]: Change events and subscriptions
//! - [`selector`]: Default backend selection
//! - [`config`]: Index configuration
//!
//! Tools and backends come from the [`toolmodel`] crate.

pub mod cache;
pub mod config;
pub mod cursor;
pub mod equality;
pub mod error;
pub mod events;
pub mod identity;
pub mod index;
pub mod search;
pub mod selector;

pub use config::{IndexConfig, IndexOptions};
pub use cursor::{CursorToken, Page};
pub use error::{ErrorKind, IndexError, IndexResult};
pub use events::{ChangeEvent, ChangeListener, ChangeType, Subscription};
pub use index::{
    ChangeNotifier, InMemoryIndex, IndexStats, Refresher, ToolIndex, ToolRegistration,
};
pub use search::{LexicalSearcher, SearchDoc, Searcher, Summary, MAX_SHORT_DESCRIPTION_LEN};
pub use selector::{
    default_backend_selector, priority_selector, select_by_priority, BackendSelector,
    DEFAULT_BACKEND_PRIORITY,
};
pub use toolmodel::{BackendKind, Schema, Tool, ToolBackend};
