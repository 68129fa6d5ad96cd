//! Deploy manifest data model.
//!
//! The manifest is the canonical compile artifact:
//!
//! ```json
//! {
//!   "version": "0.1.0",
//!   "skillsName": "weather-skill",
//!   "tools": [
//!     {
//!       "name": "echo",
//!       "description": "Echoes the message back",
//!       "inputSchema": { "type": "object", "properties": { "message": { "type": "string" } }, "required": ["message"] },
//!       "outputSchema": { "type": "object", "properties": { "response": { "type": "string" } }, "required": ["response"] },
//!       "execute": "async (input) => {\n  return { response: input.message };\n}"
//!     }
//!   ]
//! }
//! ```

use crate::ToolName;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON Schema primitive kinds a schema field can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    /// `z.string()` and unrecognised zero-argument builders
    String,
    /// `z.number()`
    Number,
    /// `z.boolean()`
    Boolean,
}

impl PrimitiveType {
    /// Maps a schema-builder method name to its JSON Schema kind.
    ///
    /// Unrecognised kinds default to `string`.
    ///
    /// # Examples
    ///
    /// ```
    /// use skillc_core::PrimitiveType;
    ///
    /// assert_eq!(PrimitiveType::from_builder("number"), PrimitiveType::Number);
    /// assert_eq!(PrimitiveType::from_builder("date"), PrimitiveType::String);
    /// ```
    #[must_use]
    pub fn from_builder(kind: &str) -> Self {
        match kind {
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            _ => Self::String,
        }
    }

    /// Returns the JSON Schema type keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }
}

/// JSON-Schema-like description of a tool's input or output.
///
/// Always an object schema. Property order follows declaration order and
/// every discovered field is listed in `required`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaShape {
    /// Always `"object"`
    #[serde(rename = "type")]
    pub kind: String,
    /// Field name to `{ "type": <primitive> }`
    pub properties: Map<String, Value>,
    /// Field names, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl SchemaShape {
    /// Returns the empty object schema `{ "type": "object", "properties": {} }`.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            kind: "object".to_string(),
            properties: Map::new(),
            required: Vec::new(),
        }
    }

    /// Adds a required primitive field.
    ///
    /// A field that is already present keeps its first position and type.
    ///
    /// # Examples
    ///
    /// ```
    /// use skillc_core::{PrimitiveType, SchemaShape};
    ///
    /// let mut shape = SchemaShape::empty();
    /// shape.push_field("city", PrimitiveType::String);
    /// assert_eq!(shape.field_names(), vec!["city"]);
    /// assert_eq!(shape.required, vec!["city".to_string()]);
    /// ```
    pub fn push_field(&mut self, name: impl Into<String>, kind: PrimitiveType) {
        let name = name.into();
        if self.properties.contains_key(&name) {
            return;
        }
        let mut property = Map::new();
        property.insert("type".to_string(), Value::String(kind.as_str().to_string()));
        self.properties.insert(name.clone(), Value::Object(property));
        self.required.push(name);
    }

    /// Returns property names in declaration order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        self.properties.keys().map(String::as_str).collect()
    }

    /// Returns `true` if the schema has no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl Default for SchemaShape {
    fn default() -> Self {
        Self::empty()
    }
}

/// One compiled tool: metadata plus a self-contained execute function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledTool {
    /// Durable tool identifier
    pub name: ToolName,
    /// Human-readable description
    pub description: String,
    /// Input schema
    pub input_schema: SchemaShape,
    /// Output schema
    pub output_schema: SchemaShape,
    /// Source of an `async (input) => { ... }` expression
    pub execute: String,
}

/// Aggregate compile output for a skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployManifest {
    /// Skill version from the project descriptor
    pub version: String,
    /// Skill name from the project descriptor
    pub skills_name: String,
    /// Compiled tools in discovery order
    pub tools: Vec<CompiledTool>,
}

impl DeployManifest {
    /// Creates a manifest.
    #[must_use]
    pub fn new(
        version: impl Into<String>,
        skills_name: impl Into<String>,
        tools: Vec<CompiledTool>,
    ) -> Self {
        Self {
            version: version.into(),
            skills_name: skills_name.into(),
            tools,
        }
    }

    /// Looks up a tool by name.
    #[must_use]
    pub fn tool(&self, name: &str) -> Option<&CompiledTool> {
        self.tools.iter().find(|t| t.name.as_str() == name)
    }

    /// Returns the number of tools.
    #[must_use]
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }
}
