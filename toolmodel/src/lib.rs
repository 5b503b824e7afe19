//! Tool and backend value types.
//!
//! ## Modules
//!
//! - [`tool`]: Tool definitions, schemas, and validation
//! - [`backend`]: Execution backends (mcp, provider, local)
//! - [`tags`]: Tag normalization
//!
//! Annotation and icon types are reused from [`rmcp::model`] so that tools
//! discovered from an MCP server can be registered without conversion loss.

pub mod backend;
pub mod error;
pub mod tags;
pub mod tool;

pub use backend::{BackendKind, LocalBackend, McpBackend, ProviderBackend, ToolBackend};
pub use error::ToolError;
pub use rmcp::model::{Icon, ToolAnnotations};
pub use tags::normalize_tags;
pub use tool::{Schema, Tool, MAX_NAME_LEN};
