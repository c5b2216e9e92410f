//! Serialization view of built nodes
//!
//! A node is rendered as an object with sorted keys: `name`, `payload`, one array per child
//! slot and one entry per custom attribute. The `primary` flag and anything to do with the
//! sequence links stay out of the view. Formats turn a [Document] of such views into text and
//! are looked up by name in a [FormatRegistry].

use crate::fold::assembly::Document;
use crate::fold::error::{Error, Result};
use crate::fold::node::{Attribute, SequenceNode};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Structural value of a node and its children
pub fn to_value(node: &SequenceNode) -> Value {
    let mut fields: BTreeMap<String, Value> = BTreeMap::new();
    fields.insert("name".to_string(), Value::from(node.name.as_str()));
    fields.insert(
        "payload".to_string(),
        Value::Array(node.payload.iter().map(|p| Value::from(p.as_str())).collect()),
    );
    for (slot, children) in &node.children {
        fields.insert(
            slot.clone(),
            Value::Array(children.iter().map(to_value).collect()),
        );
    }
    for (key, attribute) in &node.attributes {
        if fields.contains_key(key) {
            debug!(node = %node.name, key = %key, "attribute shadowed by a field of the same name");
            continue;
        }
        fields.insert(key.clone(), attribute_value(attribute));
    }
    Value::Object(fields.into_iter().collect())
}

/// Array of the views of every top-level node
pub fn document_value(doc: &Document) -> Value {
    Value::Array(doc.nodes.iter().map(to_value).collect())
}

fn attribute_value(attribute: &Attribute) -> Value {
    match attribute {
        Attribute::Text(text) => Value::from(text.as_str()),
        Attribute::Flag(flag) => Value::from(*flag),
        Attribute::Number(number) => Value::from(*number),
        Attribute::List(values) => Value::Array(values.iter().map(attribute_value).collect()),
        Attribute::Node(node) => to_value(node),
    }
}

/// Trait for document formatters
pub trait Formatter: Send + Sync {
    /// The name of this format (e.g., "json", "yaml")
    fn name(&self) -> &str;

    /// Serialize a document to this format
    fn serialize(&self, doc: &Document) -> Result<String>;

    /// Optional description of this format
    fn description(&self) -> &str {
        ""
    }
}

/// Pretty-printed JSON
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn serialize(&self, doc: &Document) -> Result<String> {
        Ok(serde_json::to_string_pretty(&document_value(doc))?)
    }

    fn description(&self) -> &str {
        "Pretty-printed JSON array of node views"
    }
}

/// YAML sequence of node views
pub struct YamlFormatter;

impl Formatter for YamlFormatter {
    fn name(&self) -> &str {
        "yaml"
    }

    fn serialize(&self, doc: &Document) -> Result<String> {
        Ok(serde_yaml::to_string(&document_value(doc))?)
    }

    fn description(&self) -> &str {
        "YAML sequence of node views"
    }
}

/// Registry of document formatters
pub struct FormatRegistry {
    formatters: HashMap<String, Box<dyn Formatter>>,
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        FormatRegistry {
            formatters: HashMap::new(),
        }
    }

    /// Register a formatter
    ///
    /// If a formatter with the same name already exists, it will be replaced.
    pub fn register<F: Formatter + 'static>(&mut self, formatter: F) {
        self.formatters
            .insert(formatter.name().to_string(), Box::new(formatter));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Formatter> {
        self.formatters.get(name).map(|f| f.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.formatters.contains_key(name)
    }

    /// Serialize a document using the specified format
    pub fn serialize(&self, doc: &Document, format: &str) -> Result<String> {
        let formatter = self
            .get(format)
            .ok_or_else(|| Error::UnknownFormat(format.to_string()))?;
        formatter.serialize(doc)
    }

    /// List all available format names (sorted)
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formatters.keys().cloned().collect();
        names.sort();
        names
    }

    /// Create a registry with the built-in formatters
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(JsonFormatter);
        registry.register(YamlFormatter);
        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
