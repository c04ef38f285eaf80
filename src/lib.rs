pub mod diagnostic;
pub mod error;
pub mod model;
pub mod parser;
pub mod processor;
pub mod schema;

pub use diagnostic::{CollectingSink, Diagnostic, DiagnosticSink, LogSink, Severity};
pub use error::{AssemblyError, BlobError, EncodeError, ModelError, SchemaError};
pub use model::{ParsedField, ParsedValue, Resource, SourceLocation, ValueKind};
pub use processor::{Assembler, BatchOutcome, CompiledResource, DataBlob};
pub use schema::{Capability, DefaultValue, FieldDefinition, Schema, SchemaSet, ValueSlot};

use anyhow::Context;

/// Compile a JSON resource list against JSON schemas.
///
/// Content problems are sent to `sink`; check
/// [`BatchOutcome::succeeded`] rather than relying on `Ok` alone.
pub fn compile_json(
    resources_json: &str,
    schemas_json: &str,
    sink: &dyn DiagnosticSink,
) -> anyhow::Result<BatchOutcome> {
    // 1. ── Load ───────────────────────────────────────────────────────
    let schemas = parser::load_schemas(schemas_json).with_context(|| "Loading schemas")?;
    let resources = parser::load_resources(resources_json).with_context(|| "Loading resources")?;

    // 2. ── Assemble ───────────────────────────────────────────────────
    processor::compile_batch(&resources, &schemas, sink).with_context(|| "Assembling resources")
}
