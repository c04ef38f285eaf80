//! Schema-driven field assembler.
//!
//! An [`Assembler`] walks the fields of a schema against one parsed
//! [`Resource`] and writes every value at its slot offset in a private
//! [`DataBlob`]. Bad input is reported to the sink and skipped; only schema
//! errors abort.

use log::{debug, trace};

use crate::diagnostic::{DiagnosticSink, Severity};
use crate::error::{AssemblyError, EncodeError};
use crate::model::{ParsedField, ParsedValue, Resource, SourceLocation, ValueKind};
use crate::processor::blob::{DataBlob, pstr_capacity};
use crate::processor::encode::{
    encode_integer, parse_color, parse_resource_id, write_integer,
};
use crate::schema::{
    COLOR_SIZE, Capability, DefaultValue, FieldDefinition, RESOURCE_ID_SIZE, Schema, ValueSlot,
};

pub struct Assembler<'a> {
    pub(super) resource: &'a Resource,
    pub(super) sink: &'a dyn DiagnosticSink,
    pub(super) blob: DataBlob,
}

impl<'a> Assembler<'a> {
    pub fn new(resource: &'a Resource, sink: &'a dyn DiagnosticSink) -> Self {
        Self {
            resource,
            sink,
            blob: DataBlob::new(),
        }
    }

    /// Hand over the accumulated payload.
    pub fn assemble(self) -> DataBlob {
        self.blob
    }

    pub fn blob(&self) -> &DataBlob {
        &self.blob
    }

    /// Assemble every field of `schema`, in schema order.
    pub fn assemble_schema(&mut self, schema: &Schema) -> Result<(), AssemblyError> {
        debug!(
            "assembling {} #{} '{}' ({} fields)",
            self.resource.type_name(),
            self.resource.id(),
            self.resource.name(),
            schema.fields.len()
        );
        for field in &schema.fields {
            self.assemble_field(field)?;
        }
        Ok(())
    }

    pub fn assemble_field(&mut self, definition: &FieldDefinition) -> Result<(), AssemblyError> {
        let parsed = self.find_field(&definition.name, definition.required);

        self.reserve(&definition.name, definition.required_data_size())?;

        if definition.deprecated {
            self.report(
                Severity::Warning,
                parsed.and_then(ParsedField::location),
                &format!("The '{}' field is deprecated.", definition.name),
            );
        }

        match parsed {
            Some(parsed) => self.assemble_present(definition, parsed),
            None => self.assemble_defaults(definition),
        }
    }

    fn assemble_present(
        &mut self,
        definition: &FieldDefinition,
        parsed: &ParsedField,
    ) -> Result<(), AssemblyError> {
        let expected = definition.values.len();
        if parsed.values().len() != expected {
            self.report(
                Severity::Error,
                parsed.location(),
                &format!(
                    "The '{}' field expects {} values, but {} were provided.",
                    definition.name,
                    expected,
                    parsed.values().len()
                ),
            );
        }

        for (slot, value) in definition.values.iter().zip(parsed.values()) {
            self.seek(&definition.name, slot.offset)?;
            let at = value.location.as_ref().or(parsed.location());

            if !slot.accepts(value.kind) {
                self.report(
                    Severity::Error,
                    at,
                    &format!(
                        "The '{}' value of the '{}' field does not accept a {} value.",
                        slot.name, definition.name, value.kind
                    ),
                );
            }

            trace!(
                "{}.{} <- {} '{}' at {}",
                definition.name, slot.name, value.kind, value.text, slot.offset
            );
            self.encode_value(definition, slot, value, at)?;
        }
        Ok(())
    }

    fn encode_value(
        &mut self,
        definition: &FieldDefinition,
        slot: &ValueSlot,
        value: &ParsedValue,
        at: Option<&SourceLocation>,
    ) -> Result<(), AssemblyError> {
        match value.kind {
            ValueKind::Integer => self.encode_number(definition, slot, &value.text, at),
            ValueKind::Percentage => {
                let text = value.text.trim().trim_end_matches('%');
                self.encode_number(definition, slot, text, at)
            }
            ValueKind::ResourceId => {
                match parse_resource_id(&value.text) {
                    Ok(id) => {
                        if self.fits(definition, slot, value.kind, RESOURCE_ID_SIZE, at) {
                            self.blob.write_signed_word(id);
                        }
                    }
                    Err(err) => self.report_invalid(definition, slot, &err, at),
                }
                Ok(())
            }
            ValueKind::String => {
                if slot.capability.contains(Capability::P_STRING) {
                    let capacity = pstr_capacity(slot.size);
                    if value.text.len() > capacity {
                        self.report(
                            Severity::Warning,
                            at,
                            &format!(
                                "The '{}' value of the '{}' field is longer than {} bytes and was truncated.",
                                slot.name, definition.name, capacity
                            ),
                        );
                    }
                    self.blob.write_pstr_within(&value.text, slot.size);
                } else {
                    self.blob.write_cstr(&value.text, slot.size);
                }
                Ok(())
            }
            ValueKind::Identifier => match slot.resolve_symbol(&value.text) {
                Some(constant) => self.write_number(definition, slot, constant as u64),
                None => {
                    self.report(
                        Severity::Error,
                        at,
                        &format!(
                            "Symbol '{}' not recognized for the '{}' value of the '{}' field.",
                            value.text, slot.name, definition.name
                        ),
                    );
                    Ok(())
                }
            },
            ValueKind::FileReference => {
                self.report_file_reference(&definition.name, at);
                Ok(())
            }
            ValueKind::Color => {
                match parse_color(&value.text) {
                    Ok(rgb) => {
                        if self.fits(definition, slot, value.kind, COLOR_SIZE, at) {
                            self.blob.write_long(rgb);
                        }
                    }
                    Err(err) => self.report_invalid(definition, slot, &err, at),
                }
                Ok(())
            }
        }
    }

    fn encode_number(
        &mut self,
        definition: &FieldDefinition,
        slot: &ValueSlot,
        text: &str,
        at: Option<&SourceLocation>,
    ) -> Result<(), AssemblyError> {
        match encode_integer(&mut self.blob, text, slot.size, false) {
            Ok(()) => Ok(()),
            // mismatched kind, already reported
            Err(EncodeError::IllegalWidth(_)) if !slot.holds_integer() => Ok(()),
            Err(err) if err.is_fatal() => Err(encode_error(definition, slot, err)),
            Err(err) => {
                self.report_invalid(definition, slot, &err, at);
                Ok(())
            }
        }
    }

    /// Integer write at the slot width. A width only integer slots must
    /// honour is a schema error there and a no-op elsewhere.
    fn write_number(
        &mut self,
        definition: &FieldDefinition,
        slot: &ValueSlot,
        bits: u64,
    ) -> Result<(), AssemblyError> {
        match write_integer(&mut self.blob, bits, slot.size) {
            Err(EncodeError::IllegalWidth(_)) if !slot.holds_integer() => Ok(()),
            result => result.map_err(|source| encode_error(definition, slot, source)),
        }
    }

    /// Whether a fixed-size encoding of `needed` bytes fits in `slot`. Too
    /// narrow a slot is reported unless the kind mismatch already was.
    fn fits(
        &self,
        definition: &FieldDefinition,
        slot: &ValueSlot,
        kind: ValueKind,
        needed: usize,
        at: Option<&SourceLocation>,
    ) -> bool {
        if slot.size >= needed {
            return true;
        }
        if slot.accepts(kind) {
            self.report(
                Severity::Error,
                at,
                &format!(
                    "The '{}' value of the '{}' field is {} bytes wide, too narrow for a {} value.",
                    slot.name, definition.name, slot.size, kind
                ),
            );
        }
        false
    }

    fn assemble_defaults(&mut self, definition: &FieldDefinition) -> Result<(), AssemblyError> {
        for slot in &definition.values {
            let Some(default) = &slot.default else {
                continue;
            };
            self.seek(&definition.name, slot.offset)?;
            trace!("{}.{} <- default {:?}", definition.name, slot.name, default);

            match default {
                DefaultValue::Integer(value) => write_integer(&mut self.blob, *value, slot.size)
                    .map_err(|source| encode_error(definition, slot, source))?,
                DefaultValue::Signed(value) => {
                    write_integer(&mut self.blob, *value as u64, slot.size)
                        .map_err(|source| encode_error(definition, slot, source))?
                }
                DefaultValue::String(text) => self.blob.write_cstr(text, slot.size),
                DefaultValue::Pstring(text) => {
                    self.blob.write_pstr_within(text, slot.size);
                }
                DefaultValue::Color(_) if slot.size < COLOR_SIZE => {
                    return Err(encode_error(
                        definition,
                        slot,
                        EncodeError::IllegalWidth(slot.size),
                    ));
                }
                DefaultValue::Color(rgb) => self.blob.write_long(*rgb),
                DefaultValue::Bytes(bytes) => {
                    let len = bytes.len().min(slot.size);
                    self.blob.write_bytes(&bytes[..len]);
                }
                DefaultValue::Custom(generator) => {
                    generator
                        .generate(&mut self.blob)
                        .map_err(|source| AssemblyError::Blob {
                            field: definition.name.clone(),
                            source,
                        })?
                }
            }
        }
        Ok(())
    }

    // ── shared helpers, also used by the convenience encoders ─────────

    /// Look up a field, reporting it when required and missing.
    pub(super) fn find_field(&self, name: &str, required: bool) -> Option<&'a ParsedField> {
        let resource: &'a Resource = self.resource;
        let field = resource.field_named(name);
        if field.is_none() && required {
            self.report(
                Severity::Error,
                resource.location(),
                &format!("Missing field '{name}' in resource."),
            );
        }
        field
    }

    /// Grow the blob so `size` bytes are addressable. The cursor is left at
    /// the old end of the blob.
    pub(super) fn reserve(&mut self, field: &str, size: usize) -> Result<(), AssemblyError> {
        let end = self.blob.size();
        self.seek(field, end)?;
        self.blob.pad_to_size(size);
        Ok(())
    }

    pub(super) fn seek(&mut self, field: &str, offset: usize) -> Result<(), AssemblyError> {
        self.blob
            .set_insertion_point(offset)
            .map_err(|source| AssemblyError::Blob {
                field: field.to_string(),
                source,
            })
    }

    /// Forward to the sink using the most specific location available.
    pub(super) fn report(&self, severity: Severity, at: Option<&SourceLocation>, message: &str) {
        let at = at.or(self.resource.location());
        self.sink.report(severity, at, message);
    }

    pub(super) fn report_file_reference(&self, field: &str, at: Option<&SourceLocation>) {
        self.report(
            Severity::Error,
            at,
            &format!("File references are not yet supported (the '{field}' field)."),
        );
    }

    fn report_invalid(
        &self,
        definition: &FieldDefinition,
        slot: &ValueSlot,
        err: &EncodeError,
        at: Option<&SourceLocation>,
    ) {
        self.report(
            Severity::Error,
            at,
            &format!(
                "The '{}' value of the '{}' field: {}.",
                slot.name, definition.name, err
            ),
        );
    }
}

fn encode_error(definition: &FieldDefinition, slot: &ValueSlot, source: EncodeError) -> AssemblyError {
    AssemblyError::Encode {
        field: definition.name.clone(),
        slot: slot.name.clone(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::CollectingSink;
    use crate::schema::{DefaultGenerator, DefaultValue};

    fn value(text: &str, kind: ValueKind) -> ParsedValue {
        ParsedValue::new(text, kind)
    }

    fn resource(fields: Vec<ParsedField>) -> Resource {
        let mut res = Resource::new("tëst", 128, "Test");
        for f in fields {
            res.add_field(f).unwrap();
        }
        res
    }

    fn assemble(res: &Resource, schema: &Schema) -> (Vec<u8>, CollectingSink) {
        let sink = CollectingSink::new();
        let mut asm = Assembler::new(res, &sink);
        asm.assemble_schema(schema).expect("schema is valid");
        let bytes = asm.assemble().into_bytes();
        (bytes, sink)
    }

    #[test]
    fn test_well_typed_field_matches_direct_writes() {
        let schema = Schema::new(
            "tëst",
            vec![FieldDefinition::new(
                "stats",
                vec![
                    ValueSlot::new("speed", Capability::INTEGER, 0, 2),
                    ValueSlot::new("mass", Capability::INTEGER, 2, 4),
                    ValueSlot::new("tint", Capability::COLOR, 6, 4),
                    ValueSlot::new("name", Capability::STRING, 10, 4),
                ],
            )],
        );
        let res = resource(vec![ParsedField::new(
            "stats",
            vec![
                value("300", ValueKind::Integer),
                value("70000", ValueKind::Integer),
                value("#102030", ValueKind::Color),
                value("Abc", ValueKind::String),
            ],
        )]);

        let (bytes, sink) = assemble(&res, &schema);

        let mut expected = DataBlob::new();
        expected.write_word(300);
        expected.write_long(70000);
        expected.write_long(0x102030);
        expected.write_cstr("Abc", 4);
        assert_eq!(bytes, expected.into_bytes());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_slots_are_written_at_their_offsets() {
        let schema = Schema::new(
            "tëst",
            vec![FieldDefinition::new(
                "pair",
                vec![
                    ValueSlot::new("second", Capability::INTEGER, 4, 1),
                    ValueSlot::new("first", Capability::INTEGER, 1, 1),
                ],
            )],
        );
        let res = resource(vec![ParsedField::new(
            "pair",
            vec![value("9", ValueKind::Integer), value("7", ValueKind::Integer)],
        )]);

        let (bytes, _) = assemble(&res, &schema);
        assert_eq!(bytes, vec![0, 7, 0, 0, 9]);
    }

    #[test]
    fn test_later_padding_keeps_earlier_bytes() {
        let schema = Schema::new(
            "tëst",
            vec![
                FieldDefinition::new("a", vec![ValueSlot::new("a", Capability::INTEGER, 0, 2)]),
                FieldDefinition::new("b", vec![ValueSlot::new("b", Capability::INTEGER, 6, 2)]),
            ],
        );
        let res = resource(vec![
            ParsedField::new("a", vec![value("4660", ValueKind::Integer)]),
            ParsedField::new("b", vec![value("1", ValueKind::Integer)]),
        ]);

        let (bytes, _) = assemble(&res, &schema);
        assert_eq!(bytes, vec![0x12, 0x34, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_missing_required_field() {
        let schema = Schema::new(
            "tëst",
            vec![
                FieldDefinition::new("id", vec![ValueSlot::new("id", Capability::INTEGER, 0, 2)])
                    .required(),
            ],
        );
        let res = resource(vec![]);

        let (bytes, sink) = assemble(&res, &schema);
        assert_eq!(bytes, vec![0, 0]);
        let errors = sink.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Missing field 'id' in resource.");
    }

    #[test]
    fn test_missing_optional_field_is_silent_and_uses_defaults() {
        let schema = Schema::new(
            "tëst",
            vec![FieldDefinition::new(
                "look",
                vec![
                    ValueSlot::new("sprite", Capability::RESOURCE_REFERENCE, 0, 2)
                        .with_default(DefaultValue::Signed(-1)),
                    ValueSlot::new("label", Capability::P_STRING, 2, 4)
                        .with_default(DefaultValue::Pstring("ok".into())),
                    ValueSlot::new("hue", Capability::COLOR, 6, 4),
                ],
            )],
        );
        let res = resource(vec![]);

        let (bytes, sink) = assemble(&res, &schema);
        assert!(sink.is_empty());
        assert_eq!(bytes, vec![0xFF, 0xFF, 2, b'o', b'k', 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_custom_default_generator() {
        let schema = Schema::new(
            "tëst",
            vec![FieldDefinition::new(
                "magic",
                vec![
                    ValueSlot::new("magic", Capability::INTEGER, 2, 2).with_default(
                        DefaultValue::Custom(DefaultGenerator::new(|blob| {
                            blob.write_word(0xBEEF);
                            Ok(())
                        })),
                    ),
                ],
            )],
        );
        let (bytes, _) = assemble(&resource(vec![]), &schema);
        assert_eq!(bytes, vec![0, 0, 0xBE, 0xEF]);
    }

    #[test]
    fn test_deprecated_field_warns() {
        let schema = Schema::new(
            "tëst",
            vec![
                FieldDefinition::new("old", vec![ValueSlot::new("v", Capability::INTEGER, 0, 1)])
                    .deprecated(),
            ],
        );
        let res = resource(vec![ParsedField::new("old", vec![value("5", ValueKind::Integer)])]);

        let (bytes, sink) = assemble(&res, &schema);
        assert_eq!(bytes, vec![5]);
        assert_eq!(sink.warnings().len(), 1);
        assert_eq!(sink.error_count(), 0);
    }

    #[test]
    fn test_value_count_mismatch_uses_shorter_length() {
        let schema = Schema::new(
            "tëst",
            vec![FieldDefinition::new(
                "xy",
                vec![
                    ValueSlot::new("x", Capability::INTEGER, 0, 1),
                    ValueSlot::new("y", Capability::INTEGER, 1, 1),
                ],
            )],
        );
        let res = resource(vec![ParsedField::new(
            "xy",
            vec![
                value("1", ValueKind::Integer),
                value("2", ValueKind::Integer),
                value("3", ValueKind::Integer),
            ],
        )]);

        let (bytes, sink) = assemble(&res, &schema);
        assert_eq!(bytes, vec![1, 2]);
        assert_eq!(sink.error_count(), 1);
    }

    #[test]
    fn test_type_mismatch_reported_once_per_value() {
        let schema = Schema::new(
            "tëst",
            vec![FieldDefinition::new(
                "counts",
                vec![
                    ValueSlot::new("a", Capability::STRING, 0, 2),
                    ValueSlot::new("b", Capability::STRING, 2, 2),
                    ValueSlot::new("c", Capability::INTEGER, 4, 2),
                ],
            )],
        );
        let res = resource(vec![ParsedField::new(
            "counts",
            vec![
                value("1", ValueKind::Integer),
                value("2", ValueKind::Integer),
                value("3", ValueKind::Integer),
            ],
        )]);

        let (bytes, sink) = assemble(&res, &schema);
        assert_eq!(sink.error_count(), 2);
        // best effort: mismatched values are still encoded
        assert_eq!(bytes, vec![0, 1, 0, 2, 0, 3]);
    }

    #[test]
    fn test_integer_in_odd_width_string_slot() {
        let schema = Schema::new(
            "tëst",
            vec![FieldDefinition::new(
                "label",
                vec![ValueSlot::new("label", Capability::STRING, 0, 3)],
            )],
        );
        let res = resource(vec![ParsedField::new("label", vec![value("7", ValueKind::Integer)])]);

        let sink = CollectingSink::new();
        let mut asm = Assembler::new(&res, &sink);
        asm.assemble_schema(&schema).expect("a mismatch is not a schema error");
        assert_eq!(asm.assemble().into_bytes(), vec![0, 0, 0]);
        let errors = sink.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("does not accept a integer value"));
    }

    #[test]
    fn test_pascal_string_stays_in_its_slot() {
        let schema = Schema::new(
            "tëst",
            vec![
                FieldDefinition::new("id", vec![ValueSlot::new("id", Capability::INTEGER, 4, 2)]),
                FieldDefinition::new(
                    "name",
                    vec![ValueSlot::new("name", Capability::STRING | Capability::P_STRING, 0, 4)],
                ),
            ],
        );
        let res = resource(vec![
            ParsedField::new("id", vec![value("4660", ValueKind::Integer)]),
            ParsedField::new("name", vec![value("Hello", ValueKind::String)]),
        ]);

        let (bytes, sink) = assemble(&res, &schema);
        assert_eq!(bytes, vec![3, b'H', b'e', b'l', 0x12, 0x34]);
        let warnings = sink.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("longer than 3 bytes"));
        assert_eq!(sink.error_count(), 0);
    }

    #[test]
    fn test_fixed_size_values_never_overflow_their_slot() {
        let schema = Schema::new(
            "tëst",
            vec![FieldDefinition::new(
                "mix",
                vec![
                    ValueSlot::new("hue", Capability::INTEGER, 0, 2),
                    ValueSlot::new("link", Capability::INTEGER, 2, 1),
                    ValueSlot::new("n", Capability::INTEGER, 3, 1),
                ],
            )],
        );
        let res = resource(vec![ParsedField::new(
            "mix",
            vec![
                value("#102030", ValueKind::Color),
                value("-1", ValueKind::ResourceId),
                value("5", ValueKind::Integer),
            ],
        )]);

        let (bytes, sink) = assemble(&res, &schema);
        assert_eq!(bytes, vec![0, 0, 0, 5]);
        // one mismatch each, nothing about width
        assert_eq!(sink.error_count(), 2);
        assert!(sink.errors().iter().all(|d| d.message.contains("does not accept")));
    }

    #[test]
    fn test_resource_id_in_symbol_byte_slot() {
        let slot = ValueSlot::new("role", Capability::RESOURCE_REFERENCE, 0, 1)
            .with_symbols([("fighter", 1)]);
        let schema = Schema::new("tëst", vec![FieldDefinition::new("role", vec![slot])]);
        let res = resource(vec![ParsedField::new("role", vec![value("-1", ValueKind::ResourceId)])]);

        let (bytes, sink) = assemble(&res, &schema);
        assert_eq!(bytes, vec![0]);
        let errors = sink.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("too narrow for a resource_id value"));
    }

    #[test]
    fn test_long_pstring_default_is_cut_to_slot() {
        let schema = Schema::new(
            "tëst",
            vec![FieldDefinition::new(
                "tag",
                vec![
                    ValueSlot::new("label", Capability::P_STRING, 0, 3)
                        .with_default(DefaultValue::Pstring("hello".into())),
                    ValueSlot::new("rank", Capability::INTEGER, 3, 1)
                        .with_default(DefaultValue::Integer(9)),
                ],
            )],
        );

        let (bytes, sink) = assemble(&resource(vec![]), &schema);
        assert_eq!(bytes, vec![2, b'h', b'e', 9]);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_color_default_in_narrow_slot_aborts() {
        let schema = Schema::new(
            "tëst",
            vec![FieldDefinition::new(
                "hue",
                vec![
                    ValueSlot::new("hue", Capability::INTEGER, 0, 2)
                        .with_default(DefaultValue::Color(0xFFFFFF)),
                ],
            )],
        );
        let res = resource(vec![]);

        let sink = CollectingSink::new();
        let mut asm = Assembler::new(&res, &sink);
        assert_eq!(
            asm.assemble_schema(&schema),
            Err(AssemblyError::Encode {
                field: "hue".into(),
                slot: "hue".into(),
                source: EncodeError::IllegalWidth(2),
            })
        );
    }

    #[test]
    fn test_identifier_resolution() {
        let slot = ValueSlot::new("kind", Capability::RESOURCE_REFERENCE, 0, 2)
            .with_symbols([("fighter", 1), ("freighter", 2)]);
        let schema = Schema::new("tëst", vec![FieldDefinition::new("kind", vec![slot])]);

        let res = resource(vec![ParsedField::new(
            "kind",
            vec![value("freighter", ValueKind::Identifier)],
        )]);
        let (bytes, sink) = assemble(&res, &schema);
        assert_eq!(bytes, vec![0, 2]);
        assert!(sink.is_empty());

        let res = resource(vec![ParsedField::new(
            "kind",
            vec![value("cruiser", ValueKind::Identifier)],
        )]);
        let (bytes, sink) = assemble(&res, &schema);
        assert_eq!(bytes, vec![0, 0]);
        let errors = sink.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("'cruiser' not recognized"));
    }

    #[test]
    fn test_strings_and_resource_ids() {
        let schema = Schema::new(
            "tëst",
            vec![FieldDefinition::new(
                "info",
                vec![
                    ValueSlot::new("title", Capability::STRING | Capability::P_STRING, 0, 3),
                    ValueSlot::new("short", Capability::STRING, 3, 5),
                    ValueSlot::new("link", Capability::RESOURCE_REFERENCE, 8, 2),
                ],
            )],
        );
        let res = resource(vec![ParsedField::new(
            "info",
            vec![
                value("AB", ValueKind::String),
                value("AB", ValueKind::String),
                value("-1", ValueKind::ResourceId),
            ],
        )]);

        let (bytes, sink) = assemble(&res, &schema);
        assert!(sink.is_empty());
        assert_eq!(bytes, vec![2, b'A', b'B', b'A', b'B', 0, 0, 0, 0xFF, 0xFF]);
    }

    #[test]
    fn test_percentage_and_bad_numbers() {
        let schema = Schema::new(
            "tëst",
            vec![FieldDefinition::new(
                "mix",
                vec![
                    ValueSlot::new("pct", Capability::INTEGER, 0, 1),
                    ValueSlot::new("n", Capability::INTEGER, 1, 2),
                ],
            )],
        );
        let res = resource(vec![ParsedField::new(
            "mix",
            vec![
                value("75%", ValueKind::Percentage),
                value("lots", ValueKind::Integer),
            ],
        )]);

        let (bytes, sink) = assemble(&res, &schema);
        assert_eq!(bytes, vec![75, 0, 0]);
        assert_eq!(sink.error_count(), 1);
    }

    #[test]
    fn test_file_reference_is_reported() {
        let schema = Schema::new(
            "tëst",
            vec![FieldDefinition::new(
                "sprite",
                vec![ValueSlot::new("sprite", Capability::RESOURCE_REFERENCE, 0, 2)],
            )],
        );
        let loc = SourceLocation::new("ships.kdl", 40);
        let res = resource(vec![ParsedField::new(
            "sprite",
            vec![value("art/ship.png", ValueKind::FileReference).at(loc)],
        )]);

        let (bytes, sink) = assemble(&res, &schema);
        assert_eq!(bytes, vec![0, 0]);
        let errors = sink.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("not yet supported"));
        assert_eq!((errors[0].location.as_str(), errors[0].line), ("ships.kdl", 40));
    }

    #[test]
    fn test_illegal_width_aborts() {
        let schema = Schema::new(
            "tëst",
            vec![FieldDefinition::new(
                "bad",
                vec![ValueSlot::new("bad", Capability::INTEGER, 0, 3)],
            )],
        );
        let res = resource(vec![ParsedField::new("bad", vec![value("1", ValueKind::Integer)])]);

        let sink = CollectingSink::new();
        let mut asm = Assembler::new(&res, &sink);
        let err = asm.assemble_schema(&schema).unwrap_err();
        assert_eq!(
            err,
            AssemblyError::Encode {
                field: "bad".into(),
                slot: "bad".into(),
                source: EncodeError::IllegalWidth(3),
            }
        );
    }
}
