//! Per-resource-type layout definitions.
//!
//! A [`Schema`] lists the fields a resource type expects. Each
//! [`FieldDefinition`] owns one or more [`ValueSlot`]s, and every slot pins a
//! value to a fixed byte offset and width in the output blob. Offsets and
//! sizes are part of the on-disk contract and are never derived from data.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::{BlobError, SchemaError};
use crate::model::ValueKind;
use crate::processor::blob::DataBlob;

bitflags! {
    /// Encodings a slot is willing to accept.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Capability: u32 {
        const INTEGER = 0x0001;
        const BITMASK = 0x0002;
        const STRING = 0x0004;
        const COLOR = 0x0008;
        const RESOURCE_REFERENCE = 0x0010;
        /// Length-prefixed rather than fixed-width string.
        const P_STRING = 0x0020;
    }
}

impl Capability {
    /// Capabilities of which at least one must be present for `kind`.
    ///
    /// Identifiers resolved through a symbol table name resources; bare
    /// identifiers behave like integers.
    pub fn required_for(kind: ValueKind, has_symbols: bool) -> Capability {
        match kind {
            ValueKind::ResourceId | ValueKind::FileReference => Capability::RESOURCE_REFERENCE,
            ValueKind::Identifier if has_symbols => Capability::RESOURCE_REFERENCE,
            ValueKind::Identifier | ValueKind::Integer => Capability::INTEGER | Capability::BITMASK,
            ValueKind::Percentage => Capability::INTEGER,
            ValueKind::String => Capability::STRING | Capability::P_STRING,
            ValueKind::Color => Capability::COLOR,
        }
    }

    fn is_integer_encoded(self) -> bool {
        self.intersects(Capability::INTEGER | Capability::BITMASK)
    }
}

/// Colours are always packed into a 4-byte long.
pub const COLOR_SIZE: usize = 4;

/// Resource ids are always a signed word.
pub const RESOURCE_ID_SIZE: usize = 2;

/// Function type behind [`DefaultValue::Custom`].
pub type GeneratorFn = dyn Fn(&mut DataBlob) -> Result<(), BlobError> + Send + Sync;

/// A caller-supplied default writer. It runs with the cursor already at the
/// slot offset.
#[derive(Clone)]
pub struct DefaultGenerator(Arc<GeneratorFn>);

impl DefaultGenerator {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut DataBlob) -> Result<(), BlobError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn generate(&self, blob: &mut DataBlob) -> Result<(), BlobError> {
        (self.0)(blob)
    }
}

impl fmt::Debug for DefaultGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DefaultGenerator(..)")
    }
}

/// What to write into a slot when its field is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    /// Unsigned integer at the slot width.
    Integer(u64),
    /// Signed integer at the slot width.
    Signed(i64),
    /// Fixed-width, zero padded.
    String(String),
    /// Length-prefixed.
    Pstring(String),
    Color(u32),
    /// Raw bytes, truncated to the slot size.
    Bytes(Vec<u8>),
    #[serde(skip)]
    Custom(DefaultGenerator),
}

/// Named integer constant usable by identifier values.
pub type Symbol = (String, i64);

/// One fixed position inside a field's encoded region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueSlot {
    pub name: String,
    pub capability: Capability,
    pub offset: usize,
    pub size: usize,
    #[serde(default)]
    pub symbols: Vec<Symbol>,
    #[serde(default)]
    pub default: Option<DefaultValue>,
}

impl ValueSlot {
    pub fn new(name: impl Into<String>, capability: Capability, offset: usize, size: usize) -> Self {
        Self {
            name: name.into(),
            capability,
            offset,
            size,
            symbols: Vec::new(),
            default: None,
        }
    }

    pub fn with_symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        self.symbols = symbols.into_iter().map(|(n, v)| (n.into(), v)).collect();
        self
    }

    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn end(&self) -> usize {
        self.offset + self.size
    }

    /// Linear scan, first match wins.
    pub fn resolve_symbol(&self, name: &str) -> Option<i64> {
        self.symbols
            .iter()
            .find(|(symbol, _)| symbol == name)
            .map(|(_, value)| *value)
    }

    /// Whether the slot is encoded as a plain integer of its own width.
    pub fn holds_integer(&self) -> bool {
        self.capability.is_integer_encoded() || !self.symbols.is_empty()
    }

    /// Whether a value of `kind` may be written into this slot.
    pub fn accepts(&self, kind: ValueKind) -> bool {
        self.capability
            .intersects(Capability::required_for(kind, !self.symbols.is_empty()))
    }
}

/// Expected field of a resource type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub deprecated: bool,
    pub values: Vec<ValueSlot>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, values: Vec<ValueSlot>) -> Self {
        Self {
            name: name.into(),
            required: false,
            deprecated: false,
            values,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// Smallest blob size that makes every slot of this field addressable.
    pub fn required_data_size(&self) -> usize {
        self.values.iter().map(ValueSlot::end).max().unwrap_or(0)
    }

    pub fn offset(&self) -> usize {
        self.values.first().map(|slot| slot.offset).unwrap_or(0)
    }

    fn too_narrow(&self, slot: &ValueSlot, needed: usize) -> SchemaError {
        SchemaError::SlotSize {
            field: self.name.clone(),
            slot: slot.name.clone(),
            size: slot.size,
            needed,
        }
    }

    fn validate(&self) -> Result<(), SchemaError> {
        for slot in &self.values {
            if slot.size == 0 {
                return Err(SchemaError::EmptySlot {
                    field: self.name.clone(),
                    slot: slot.name.clone(),
                });
            }
            if slot.holds_integer() && !matches!(slot.size, 1 | 2 | 4 | 8) {
                return Err(SchemaError::IllegalSlotWidth {
                    field: self.name.clone(),
                    slot: slot.name.clone(),
                    size: slot.size,
                });
            }
            if slot.capability.contains(Capability::COLOR) && slot.size != COLOR_SIZE {
                return Err(self.too_narrow(slot, COLOR_SIZE));
            }
            if slot.capability.contains(Capability::RESOURCE_REFERENCE)
                && slot.symbols.is_empty()
                && slot.size < RESOURCE_ID_SIZE
            {
                return Err(self.too_narrow(slot, RESOURCE_ID_SIZE));
            }
        }
        Ok(())
    }
}

/// Layout of one resource type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type")]
    pub type_name: String,
    pub fields: Vec<FieldDefinition>,
}

impl Schema {
    pub fn new(type_name: impl Into<String>, fields: Vec<FieldDefinition>) -> Self {
        Self {
            type_name: type_name.into(),
            fields,
        }
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        self.fields.iter().try_for_each(FieldDefinition::validate)
    }

    /// Size of a resource assembled with nothing but defaults.
    pub fn minimum_size(&self) -> usize {
        self.fields
            .iter()
            .map(FieldDefinition::required_data_size)
            .max()
            .unwrap_or(0)
    }
}

/// Schemas keyed by resource type name.
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    schemas: HashMap<String, Schema>,
}

impl SchemaSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, schema: Schema) -> Result<(), SchemaError> {
        if self.schemas.contains_key(&schema.type_name) {
            return Err(SchemaError::DuplicateSchema(schema.type_name));
        }
        self.schemas.insert(schema.type_name.clone(), schema);
        Ok(())
    }

    pub fn get(&self, type_name: &str) -> Option<&Schema> {
        self.schemas.get(type_name)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
