//! The functional core: parsed resources in, encoded payloads out.
pub mod assembler;
pub mod blob;
pub mod encode;
pub mod fields;

pub use assembler::Assembler;
pub use blob::DataBlob;

use anyhow::{Context, Result};
use log::debug;
use rayon::prelude::*;

use crate::diagnostic::{DiagnosticSink, Severity};
use crate::error::AssemblyError;
use crate::model::Resource;
use crate::schema::SchemaSet;

/// Encoded payload of one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledResource {
    pub type_name: String,
    pub id: i64,
    pub name: String,
    pub data: Vec<u8>,
}

/// Everything a batch produced, plus how many errors were reported while
/// producing it.
#[derive(Debug)]
pub struct BatchOutcome {
    pub resources: Vec<CompiledResource>,
    pub error_count: usize,
}

impl BatchOutcome {
    /// Payloads exist even for resources with content errors, so success is
    /// decided by the diagnostic count alone.
    pub fn succeeded(&self) -> bool {
        self.error_count == 0
    }
}

/// Assemble one resource against the schema for its type.
///
/// `Ok(None)` means no schema exists for the type (already reported).
pub fn compile(
    resource: &Resource,
    schemas: &SchemaSet,
    sink: &dyn DiagnosticSink,
) -> Result<Option<CompiledResource>, AssemblyError> {
    let Some(schema) = schemas.get(resource.type_name()) else {
        sink.report(
            Severity::Error,
            resource.location(),
            &format!(
                "No schema is defined for resource type '{}'.",
                resource.type_name()
            ),
        );
        return Ok(None);
    };

    let mut assembler = Assembler::new(resource, sink);
    assembler.assemble_schema(schema)?;
    let blob = assembler.assemble();

    Ok(Some(CompiledResource {
        type_name: resource.type_name().to_string(),
        id: resource.id(),
        name: resource.name().to_string(),
        data: blob.into_bytes(),
    }))
}

/// Assemble independent resources in parallel, keeping input order.
pub fn compile_batch(
    resources: &[Resource],
    schemas: &SchemaSet,
    sink: &dyn DiagnosticSink,
) -> Result<BatchOutcome> {
    let errors_before = sink.error_count();

    let compiled = resources
        .par_iter()
        .map(|resource| {
            compile(resource, schemas, sink).with_context(|| {
                format!(
                    "Assembling {} #{} '{}'",
                    resource.type_name(),
                    resource.id(),
                    resource.name()
                )
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let resources: Vec<CompiledResource> = compiled.into_iter().flatten().collect();
    let error_count = sink.error_count().saturating_sub(errors_before);
    debug!(
        "compiled {} resources, {} errors reported",
        resources.len(),
        error_count
    );

    Ok(BatchOutcome {
        resources,
        error_count,
    })
}
