//! Tool definitions.
//!
//! A [`Tool`] carries the MCP protocol-level fields (name, title, description,
//! schemas, annotations, icons, meta) plus two registry extensions:
//! `namespace` and `tags`. Only the protocol-level fields describe *what* the
//! tool is; the extensions describe *where* it is filed.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::{error::ToolError, Icon, ToolAnnotations};

/// Maximum length of a tool name, in characters.
pub const MAX_NAME_LEN: usize = 128;

/// A JSON schema in whatever representation the caller produced it.
///
/// Tools arriving from the wire often keep their schema as raw bytes while
/// tools built in code hold a decoded value. Both serialize to the JSON they
/// contain, and [`Schema::to_value`] decodes either form.
#[derive(Debug, Clone)]
pub enum Schema {
    Value(Value),
    Raw(Vec<u8>),
}

impl Schema {
    /// Decode the schema into a JSON value.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            Schema::Value(v) => Ok(v.clone()),
            Schema::Raw(bytes) => serde_json::from_slice(bytes),
        }
    }

    fn expect_object(&self, field: &'static str) -> Result<(), ToolError> {
        let value = self.to_value().map_err(|e| ToolError::InvalidSchema {
            field,
            reason: e.to_string(),
        })?;
        if value.is_object() {
            Ok(())
        } else {
            Err(ToolError::InvalidSchema {
                field,
                reason: "schema must be a JSON object".to_string(),
            })
        }
    }
}

impl Default for Schema {
    fn default() -> Self {
        Schema::Value(Value::Null)
    }
}

impl From<Value> for Schema {
    fn from(value: Value) -> Self {
        Schema::Value(value)
    }
}

impl From<Map<String, Value>> for Schema {
    fn from(map: Map<String, Value>) -> Self {
        Schema::Value(Value::Object(map))
    }
}

impl From<Vec<u8>> for Schema {
    fn from(bytes: Vec<u8>) -> Self {
        Schema::Raw(bytes)
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Schema::Value(v) => v.serialize(serializer),
            Schema::Raw(bytes) => {
                let value: Value =
                    serde_json::from_slice(bytes).map_err(serde::ser::Error::custom)?;
                value.serialize(serializer)
            }
        }
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Schema::Value)
    }
}

/// A tool definition as stored by the registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub input_schema: Schema,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Schema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<ToolAnnotations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icons: Option<Vec<Icon>>,
    #[serde(default, rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,

    // Registry extensions
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Tool {
    pub fn new(name: impl Into<String>, input_schema: impl Into<Schema>) -> Self {
        Self {
            name: name.into(),
            input_schema: input_schema.into(),
            ..Default::default()
        }
    }

    /// Convert a tool reported by an MCP server. Namespace and tags start empty.
    pub fn from_mcp(tool: rmcp::model::Tool) -> Self {
        Self {
            name: tool.name.to_string(),
            title: tool.title.map(|t| t.to_string()),
            description: tool.description.map(|d| d.to_string()).unwrap_or_default(),
            input_schema: Schema::Value(Value::Object((*tool.input_schema).clone())),
            output_schema: tool
                .output_schema
                .map(|s| Schema::Value(Value::Object((*s).clone()))),
            annotations: tool.annotations,
            icons: tool.icons,
            meta: None,
            namespace: String::new(),
            tags: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Canonical identifier: `namespace:name`, or `name` without a namespace.
    pub fn tool_id(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}:{}", self.namespace, self.name)
        }
    }

    pub fn validate(&self) -> Result<(), ToolError> {
        if self.name.is_empty() {
            return Err(ToolError::EmptyName);
        }
        let len = self.name.chars().count();
        if len > MAX_NAME_LEN {
            return Err(ToolError::NameTooLong {
                len,
                max: MAX_NAME_LEN,
            });
        }
        if !is_valid_identifier(&self.name) {
            return Err(ToolError::InvalidName(self.name.clone()));
        }
        if !self.namespace.is_empty() && !is_valid_identifier(&self.namespace) {
            return Err(ToolError::InvalidNamespace(self.namespace.clone()));
        }

        self.input_schema.expect_object("input schema")?;
        if let Some(output) = &self.output_schema {
            output.expect_object("output schema")?;
        }
        Ok(())
    }
}

fn is_valid_identifier(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
