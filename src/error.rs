//! Fatal error conditions.
//!
//! Content problems in a resource (missing fields, wrong value kinds,
//! unknown symbols) are *not* errors in this sense: they go to the
//! [`DiagnosticSink`](crate::diagnostic::DiagnosticSink) and assembly carries
//! on. The types here cover the cases that stop the current operation.

use thiserror::Error;

/// Problems building the parsed-resource model.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ModelError {
    /// A resource may only carry one field per name.
    #[error("resource already has a field named '{0}'")]
    DuplicateField(String),
}

/// Cursor misuse on a [`DataBlob`](crate::processor::blob::DataBlob).
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BlobError {
    /// Attempted to move the insertion point past the end of the buffer.
    #[error("insertion point {offset} is beyond the blob size {size}")]
    OutOfBounds { offset: usize, size: usize },
}

/// Failures of the width-directed value encoders.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EncodeError {
    /// Integers can only be 1, 2, 4 or 8 bytes wide. This is a schema bug.
    #[error("illegal integer width of {0} bytes")]
    IllegalWidth(usize),

    /// The value text could not be read as an integer of the requested kind.
    #[error("'{text}' is not a valid {expected}")]
    InvalidInteger { text: String, expected: &'static str },

    #[error(transparent)]
    Blob(#[from] BlobError),
}

impl EncodeError {
    /// True for conditions caused by a broken schema rather than bad input.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EncodeError::IllegalWidth(_) | EncodeError::Blob(_))
    }
}

/// A schema definition that cannot be used for assembly.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SchemaError {
    #[error("slot '{slot}' of field '{field}' has a size of zero")]
    EmptySlot { field: String, slot: String },

    #[error("slot '{slot}' of field '{field}' is {size} bytes wide, integers must be 1, 2, 4 or 8")]
    IllegalSlotWidth {
        field: String,
        slot: String,
        size: usize,
    },

    #[error("slot '{slot}' of field '{field}' is {size} bytes wide, it must be {needed}")]
    SlotSize {
        field: String,
        slot: String,
        size: usize,
        needed: usize,
    },

    #[error("schema for '{0}' is defined more than once")]
    DuplicateSchema(String),
}

/// Aborts assembly of a resource.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("field '{field}', slot '{slot}': {source}")]
    Encode {
        field: String,
        slot: String,
        #[source]
        source: EncodeError,
    },

    #[error("field '{field}': {source}")]
    Blob {
        field: String,
        #[source]
        source: BlobError,
    },
}
