//! Backend identity keys and backend validation.
//!
//! An identity key decides whether an incoming backend replaces an existing
//! slot or is appended as a new one. Keys are built from length-prefixed
//! components so that a separator inside a component (a provider ID such as
//! `acme:eu`) cannot make two distinct backends collide.

use std::fmt::Write;

use toolmodel::{BackendKind, ToolBackend};

use crate::error::{IndexError, IndexResult};

/// Identity of a backend within one tool record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BackendKey(String);

impl BackendKey {
    pub fn of(backend: &ToolBackend) -> Self {
        match backend {
            ToolBackend::Mcp(mcp) => Self::encode(BackendKind::Mcp, &[mcp.server_name.as_str()]),
            ToolBackend::Provider(p) => {
                Self::encode(
                    BackendKind::Provider,
                    &[p.provider_id.as_str(), p.tool_id.as_str()],
                )
            }
            ToolBackend::Local(local) => Self::encode(BackendKind::Local, &[local.name.as_str()]),
        }
    }

    /// Key for an unregistration request.
    ///
    /// Provider backends are addressed as `providerID:toolID`; the first colon
    /// splits the two halves and both must be non-empty.
    pub fn for_removal(kind: BackendKind, backend_id: &str) -> IndexResult<Self> {
        match kind {
            BackendKind::Provider => {
                let (provider_id, tool_id) = backend_id.split_once(':').ok_or_else(|| {
                    IndexError::InvalidBackend(
                        "provider backend ID must be in format 'providerID:toolID'".to_string(),
                    )
                })?;
                if provider_id.is_empty() || tool_id.is_empty() {
                    return Err(IndexError::InvalidBackend(
                        "provider backend ID must have non-empty providerID and toolID"
                            .to_string(),
                    ));
                }
                Ok(Self::encode(kind, &[provider_id, tool_id]))
            }
            BackendKind::Mcp | BackendKind::Local => Ok(Self::encode(kind, &[backend_id])),
        }
    }

    fn encode(kind: BackendKind, parts: &[&str]) -> Self {
        let kind = kind.as_str();
        let mut key = String::new();
        for part in std::iter::once(&kind).chain(parts) {
            if !key.is_empty() {
                key.push('|');
            }
            // Writing to a String is infallible; discard the always-Ok result.
            let _ = write!(key, "{}:{}", part.len(), part);
        }
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Check the kind-specific required fields of a backend.
pub fn validate_backend(backend: &ToolBackend) -> IndexResult<()> {
    match backend {
        ToolBackend::Mcp(mcp) if mcp.server_name.is_empty() => Err(IndexError::InvalidBackend(
            "MCP backend requires server_name".to_string(),
        )),
        ToolBackend::Provider(p) if p.provider_id.is_empty() => Err(IndexError::InvalidBackend(
            "provider backend requires provider_id".to_string(),
        )),
        ToolBackend::Provider(p) if p.tool_id.is_empty() => Err(IndexError::InvalidBackend(
            "provider backend requires tool_id".to_string(),
        )),
        ToolBackend::Local(local) if local.name.is_empty() => Err(IndexError::InvalidBackend(
            "local backend requires name".to_string(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_prefixed_encoding() {
        let key = BackendKey::of(&ToolBackend::provider("acme", "search"));
        assert_eq!(key.as_str(), "8:provider|4:acme|6:search");
    }

    #[test]
    fn test_separator_in_component_does_not_collide() {
        // Naive "kind:provider:tool" joining would map both of these to
        // "provider:a:b:c".
        let a = BackendKey::of(&ToolBackend::provider("a:b", "c"));
        let b = BackendKey::of(&ToolBackend::provider("a", "b:c"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_kinds_do_not_collide() {
        let mcp = BackendKey::of(&ToolBackend::mcp("same"));
        let local = BackendKey::of(&ToolBackend::local("same"));
        assert_ne!(mcp, local);
    }

    #[test]
    fn test_removal_key_matches_registration_key() {
        let registered = BackendKey::of(&ToolBackend::provider("provider1", "toolA"));
        let removal = BackendKey::for_removal(BackendKind::Provider, "provider1:toolA").unwrap();
        assert_eq!(registered, removal);

        let registered = BackendKey::of(&ToolBackend::mcp("github"));
        let removal = BackendKey::for_removal(BackendKind::Mcp, "github").unwrap();
        assert_eq!(registered, removal);
    }

    #[test]
    fn test_removal_provider_id_with_colon_in_tool_half() {
        let registered = BackendKey::of(&ToolBackend::provider("p", "tool:v2"));
        let removal = BackendKey::for_removal(BackendKind::Provider, "p:tool:v2").unwrap();
        assert_eq!(registered, removal);
    }

    #[test]
    fn test_removal_rejects_malformed_provider_id() {
        for bad in ["providerOnly", ":toolA", "provider1:", ":"] {
            let err = BackendKey::for_removal(BackendKind::Provider, bad).unwrap_err();
            assert!(matches!(err, IndexError::InvalidBackend(_)), "{bad}");
        }
    }

    #[test]
    fn test_validate_backend() {
        assert!(validate_backend(&ToolBackend::mcp("srv")).is_ok());
        assert!(validate_backend(&ToolBackend::local("h")).is_ok());
        assert!(validate_backend(&ToolBackend::provider("p", "t")).is_ok());

        for bad in [
            ToolBackend::mcp(""),
            ToolBackend::local(""),
            ToolBackend::provider("", "t"),
            ToolBackend::provider("p", ""),
        ] {
            assert!(matches!(
                validate_backend(&bad),
                Err(IndexError::InvalidBackend(_))
            ));
        }
    }
}
