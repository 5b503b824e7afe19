//! Index configuration.
//!
//! [`IndexConfig`] is the serializable form (YAML or JSON); [`IndexOptions`]
//! is what the index is built from and can also carry a custom selector or
//! searcher that has no serialized form.

use std::{fmt, path::Path, sync::Arc};

use serde::{Deserialize, Serialize};
use toolmodel::BackendKind;

use crate::{
    error::{IndexError, IndexResult},
    search::{LexicalSearcher, Searcher, MAX_SHORT_DESCRIPTION_LEN},
    selector::{
        default_backend_selector, priority_selector, BackendSelector, DEFAULT_BACKEND_PRIORITY,
    },
};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IndexConfig {
    /// Backend kinds in preference order for default backend selection.
    /// Default: local, provider, mcp
    #[serde(default = "default_backend_priority")]
    pub backend_priority: Vec<BackendKind>,

    /// Summary description truncation length, in characters.
    /// Default: 120
    #[serde(default = "default_short_description_len")]
    pub max_short_description_len: usize,

    /// Refuse cursor pagination over searchers that do not declare
    /// deterministic ordering.
    /// Default: true
    #[serde(default = "default_true")]
    pub require_deterministic_paging: bool,
}

fn default_backend_priority() -> Vec<BackendKind> {
    DEFAULT_BACKEND_PRIORITY.to_vec()
}

fn default_short_description_len() -> usize {
    MAX_SHORT_DESCRIPTION_LEN
}

fn default_true() -> bool {
    true
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            backend_priority: default_backend_priority(),
            max_short_description_len: default_short_description_len(),
            require_deterministic_paging: true,
        }
    }
}

impl IndexConfig {
    pub fn from_yaml(content: &str) -> IndexResult<Self> {
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| IndexError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> IndexResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| IndexError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> IndexResult<()> {
        if self.backend_priority.is_empty() {
            return Err(IndexError::Config(
                "backend_priority must list at least one backend kind".to_string(),
            ));
        }
        for (i, kind) in self.backend_priority.iter().enumerate() {
            if self.backend_priority[..i].contains(kind) {
                return Err(IndexError::Config(format!(
                    "backend_priority lists '{}' more than once",
                    kind
                )));
            }
        }
        if self.max_short_description_len == 0 {
            return Err(IndexError::Config(
                "max_short_description_len must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Construction options for an index. Unset fields use the defaults.
#[derive(Clone)]
pub struct IndexOptions {
    pub backend_selector: Option<BackendSelector>,
    pub searcher: Option<Arc<dyn Searcher>>,
    pub max_short_description_len: usize,
    pub require_deterministic_paging: bool,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            backend_selector: None,
            searcher: None,
            max_short_description_len: MAX_SHORT_DESCRIPTION_LEN,
            require_deterministic_paging: true,
        }
    }
}

impl fmt::Debug for IndexOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexOptions")
            .field("custom_backend_selector", &self.backend_selector.is_some())
            .field("custom_searcher", &self.searcher.is_some())
            .field("max_short_description_len", &self.max_short_description_len)
            .field(
                "require_deterministic_paging",
                &self.require_deterministic_paging,
            )
            .finish()
    }
}

impl IndexOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &IndexConfig) -> IndexResult<Self> {
        config.validate()?;
        let backend_selector = if config.backend_priority == DEFAULT_BACKEND_PRIORITY {
            None
        } else {
            Some(priority_selector(config.backend_priority.clone()))
        };
        Ok(Self {
            backend_selector,
            searcher: None,
            max_short_description_len: config.max_short_description_len,
            require_deterministic_paging: config.require_deterministic_paging,
        })
    }

    #[must_use]
    pub fn with_backend_selector(mut self, selector: BackendSelector) -> Self {
        self.backend_selector = Some(selector);
        self
    }

    #[must_use]
    pub fn with_searcher(mut self, searcher: Arc<dyn Searcher>) -> Self {
        self.searcher = Some(searcher);
        self
    }

    pub(crate) fn resolved_selector(&self) -> BackendSelector {
        self.backend_selector
            .clone()
            .unwrap_or_else(|| Arc::new(default_backend_selector) as BackendSelector)
    }

    pub(crate) fn resolved_searcher(&self) -> Arc<dyn Searcher> {
        self.searcher
            .clone()
            .unwrap_or_else(|| Arc::new(LexicalSearcher) as Arc<dyn Searcher>)
    }
}
