//! Execution backends.
//!
//! A tool may be bound to several backends at once. Each kind carries its own
//! identity fields:
//! - `mcp`: the MCP server name
//! - `provider`: provider ID plus the provider-local tool ID
//! - `local`: the in-process handler name

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ToolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Mcp,
    Provider,
    Local,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Mcp => "mcp",
            BackendKind::Provider => "provider",
            BackendKind::Local => "local",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mcp" => Ok(BackendKind::Mcp),
            "provider" => Ok(BackendKind::Provider),
            "local" => Ok(BackendKind::Local),
            other => Err(ToolError::UnknownBackendKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct McpBackend {
    pub server_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderBackend {
    pub provider_id: String,
    pub tool_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalBackend {
    pub name: String,
}

/// Execution binding for a tool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolBackend {
    Mcp(McpBackend),
    Provider(ProviderBackend),
    Local(LocalBackend),
}

impl ToolBackend {
    pub fn mcp(server_name: impl Into<String>) -> Self {
        ToolBackend::Mcp(McpBackend {
            server_name: server_name.into(),
        })
    }

    pub fn provider(provider_id: impl Into<String>, tool_id: impl Into<String>) -> Self {
        ToolBackend::Provider(ProviderBackend {
            provider_id: provider_id.into(),
            tool_id: tool_id.into(),
        })
    }

    pub fn local(name: impl Into<String>) -> Self {
        ToolBackend::Local(LocalBackend { name: name.into() })
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            ToolBackend::Mcp(_) => BackendKind::Mcp,
            ToolBackend::Provider(_) => BackendKind::Provider,
            ToolBackend::Local(_) => BackendKind::Local,
        }
    }
}
