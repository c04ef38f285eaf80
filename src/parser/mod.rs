//! JSON interchange for parsed resources and schemas.
//!
//! Resources come in as an array of
//!
//! ```json
//! { "type": "shïp", "id": 128, "name": "Shuttle",
//!   "fields": [ { "name": "speed", "values": [ { "text": "300", "kind": "integer" } ] } ] }
//! ```
//!
//! and schemas as an array of [`Schema`] objects. Every schema is validated
//! before it is handed out.

use anyhow::{Context, Result, anyhow};
use log::debug;
use serde::Deserialize;

use crate::model::{ParsedField, ParsedValue, Resource, SourceLocation};
use crate::schema::{Schema, SchemaSet};

#[derive(Debug, Deserialize)]
struct RawResource {
    #[serde(rename = "type")]
    type_name: String,
    id: i64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    location: Option<SourceLocation>,
    #[serde(default)]
    fields: Vec<RawField>,
}

#[derive(Debug, Deserialize)]
struct RawField {
    name: String,
    #[serde(default)]
    values: Vec<ParsedValue>,
    #[serde(default)]
    location: Option<SourceLocation>,
}

/// Parse a JSON array of resources.
pub fn load_resources(json: &str) -> Result<Vec<Resource>> {
    let raw: Vec<RawResource> =
        serde_json::from_str(json).map_err(|e| anyhow!("Failed to parse resources: {e}"))?;
    debug!("found {} resources", raw.len());

    raw.into_iter()
        .enumerate()
        .map(|(i, r)| {
            let label = format!("resource {i} ({} #{})", r.type_name, r.id);
            to_resource(r).with_context(|| label)
        })
        .collect()
}

fn to_resource(raw: RawResource) -> Result<Resource> {
    let mut resource = Resource::new(raw.type_name, raw.id, raw.name);
    if let Some(location) = raw.location {
        resource = resource.at(location);
    }

    for f in raw.fields {
        let mut field = ParsedField::new(f.name, f.values);
        if let Some(location) = f.location {
            field = field.at(location);
        }
        resource.add_field(field)?;
    }
    Ok(resource)
}

/// Parse and validate a JSON array of schemas.
pub fn load_schemas(json: &str) -> Result<SchemaSet> {
    let schemas: Vec<Schema> =
        serde_json::from_str(json).map_err(|e| anyhow!("Failed to parse schemas: {e}"))?;
    debug!("found {} schemas", schemas.len());

    let mut set = SchemaSet::new();
    for schema in schemas {
        schema
            .validate()
            .with_context(|| format!("Invalid schema for '{}'", schema.type_name))?;
        set.insert(schema)?;
    }
    Ok(set)
}
