use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of one target-version directory (e.g. "1.37.0").
pub type VersionKey = String;

/// Consolidated index: version → mods sorted by name.
///
/// `BTreeMap` keeps the top-level keys in lexicographic order, which is the
/// order both the output file and the cache are serialized in.
pub type ModIndex = BTreeMap<VersionKey, Vec<ModRecord>>;

/// One mod's metadata document.
///
/// Only `name` is interpreted, since it is the sort key. `version`, `author`,
/// `description`, `modloader` and `download` are read through accessors and,
/// like any other field, written back out exactly as the document had them
/// (null, missing or non-string values included).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModRecord {
    pub name: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ModRecord {
    /// Interpret a parsed JSON value as a mod record.
    ///
    /// Any JSON object with a string `name` is accepted; anything else is
    /// rejected with a human-readable reason.
    pub fn from_value(value: Value) -> Result<Self, String> {
        if !value.is_object() {
            return Err(format!("expected a JSON object, got {}", kind_of(&value)));
        }
        serde_json::from_value(value).map_err(|e| e.to_string())
    }

    pub fn version(&self) -> Option<&str> {
        self.text("version")
    }

    pub fn author(&self) -> Option<&str> {
        self.text("author")
    }

    /// Free text, may contain `\n` / `\r\n`.
    pub fn description(&self) -> Option<&str> {
        self.text("description")
    }

    pub fn modloader(&self) -> Option<&str> {
        self.text("modloader")
    }

    pub fn download(&self) -> Option<&str> {
        self.text("download")
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
