//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Once;

use serde_json::json;
use toolindex::{InMemoryIndex, Summary, Tool, ToolBackend, ToolIndex};
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

static INIT: Once = Once::new();

/// Initialize test logging infrastructure
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .with(
                EnvFilter::builder()
                    .with_default_directive(LevelFilter::INFO.into())
                    .from_env_lossy(),
            )
            .try_init();
    });
}

pub fn make_tool(name: &str, namespace: &str, description: &str) -> Tool {
    Tool::new(
        name,
        json!({
            "type": "object",
            "properties": {"query": {"type": "string"}}
        }),
    )
    .with_namespace(namespace)
    .with_description(description)
}

pub fn register(index: &InMemoryIndex, tool: Tool, backend: ToolBackend) {
    if let Err(e) = index.register_tool(tool, backend) {
        panic!("registration failed: {e}");
    }
}

pub fn ids<'a>(summaries: impl IntoIterator<Item = &'a Summary>) -> Vec<String> {
    summaries.into_iter().map(|s| s.id.clone()).collect()
}
