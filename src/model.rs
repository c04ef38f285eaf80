//! Parsed-resource model handed to the assembler.
//!
//! Everything here is produced upstream (by the declaration parser or the
//! JSON loader in [`crate::parser`]) and is read-only once assembly starts.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::ModelError;

/// Location reported when nothing better is known.
pub const UNKNOWN_FILE: &str = "<missing>";

/// What kind of token a field value was written as.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Integer,
    Percentage,
    String,
    Identifier,
    ResourceId,
    FileReference,
    Color,
}

/// Where a piece of input came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: usize,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

/// A single value as written in the declaration: raw text plus its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedValue {
    pub text: String,
    pub kind: ValueKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl ParsedValue {
    pub fn new(text: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            text: text.into(),
            kind,
            location: None,
        }
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

/// A named field and its ordered values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedField {
    name: String,
    values: Vec<ParsedValue>,
    location: Option<SourceLocation>,
}

impl ParsedField {
    pub fn new(name: impl Into<String>, values: Vec<ParsedValue>) -> Self {
        Self {
            name: name.into(),
            values,
            location: None,
        }
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[ParsedValue] {
        &self.values
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }
}

/// One declared resource: `type`, numeric id, display name and its fields.
///
/// Fields keep declaration order but are looked up by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    type_name: String,
    id: i64,
    name: String,
    fields: IndexMap<String, ParsedField>,
    location: Option<SourceLocation>,
}

impl Resource {
    pub fn new(type_name: impl Into<String>, id: i64, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            id,
            name: name.into(),
            fields: IndexMap::new(),
            location: None,
        }
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn add_field(&mut self, field: ParsedField) -> Result<(), ModelError> {
        if self.fields.contains_key(field.name()) {
            return Err(ModelError::DuplicateField(field.name().to_string()));
        }
        self.fields.insert(field.name().to_string(), field);
        Ok(())
    }

    /// Builder form of [`Resource::add_field`].
    pub fn with_field(mut self, field: ParsedField) -> Result<Self, ModelError> {
        self.add_field(field)?;
        Ok(self)
    }

    pub fn field_named(&self, name: &str) -> Option<&ParsedField> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &ParsedField> {
        self.fields.values()
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }
}
