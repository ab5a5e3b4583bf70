//! Schema summaries fed into the generation prompt.

use serde::{Deserialize, Serialize};

/// One column with its declared type name (e.g. "integer", "text").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub declared_type: String,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
        }
    }
}

/// Ordered column listing for one table or file-backed frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSchema {
    pub name: String,
    pub columns: Vec<ColumnSchema>,
}

impl SourceSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_column(mut self, name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        self.columns.push(ColumnSchema::new(name, declared_type));
        self
    }
}

/// The set of sources a rule may legitimately reference.
///
/// Kept consistent with the live handles by deriving it from them; a
/// hand-maintained summary can still be constructed and passed in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaSummary {
    pub sources: Vec<SourceSchema>,
}

impl SchemaSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, source: SourceSchema) {
        self.sources.push(source);
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
