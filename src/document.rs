//! The interchange document.
//!
//! A [`Document`] is the structured JSON description of a database: table
//! shapes, other schema statements (indexes, triggers), and row changes
//! (inserts, updates, deletes). All sections are optional and all maps
//! preserve their JSON order, which is also the compile order.
//!
//! # Example
//! ```
//! use sqlporter::document::Document;
//!
//! let json = r#"{
//!     "structure": { "tables": { "Artist": "([Id] PRIMARY KEY,[Title])" } },
//!     "data": { "inserts": { "Artist": [ { "Id": "1", "Title": "Fred" } ] } }
//! }"#;
//!
//! let doc = Document::from_json(json).unwrap();
//! assert_eq!(doc.structure.unwrap().tables["Artist"], "([Id] PRIMARY KEY,[Title])");
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::PorterResult;

/// A single JSON-representable value inside a row object.
///
/// There is no `Absent` variant: a field that is absent is simply not
/// present in the [`Row`] map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

/// One row object: field name → scalar, in JSON order.
pub type Row = IndexMap<String, Scalar>;

/// Top-level interchange document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<Structure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Data>,
}

/// Schema section: table shapes plus any other schema SQL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    /// Table name → raw column-definition clause, e.g. `"(id PRIMARY KEY, title)"`.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub tables: IndexMap<String, String>,
    /// Raw SQL statements not related to table shape (indexes, triggers, ...).
    #[serde(rename = "otherSQL", default, skip_serializing_if = "Vec::is_empty")]
    pub other_sql: Vec<String>,
}

/// Data section: row changes keyed by table name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Data {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub inserts: IndexMap<String, Vec<Row>>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub updates: IndexMap<String, Vec<Update>>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub deletes: IndexMap<String, Vec<Row>>,
}

/// One update entry: which fields to set and which rows to match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub set: Row,
    #[serde(rename = "where", default)]
    pub where_clause: Row,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document from JSON text. Shape violations surface as
    /// [`PorterError::Parse`](crate::error::PorterError) before any
    /// statement is compiled.
    pub fn from_json(json: &str) -> PorterResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> PorterResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> PorterResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// True if the document holds neither structure nor data.
    pub fn is_empty(&self) -> bool {
        self.structure.is_none() && self.data.is_none()
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Number(v.into())
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::String(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::String(v)
    }
}
