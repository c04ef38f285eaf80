//! Fixed-shape field encoders.
//!
//! Shortcuts for layouts that recur across resource types and do not need a
//! full [`FieldDefinition`](crate::schema::FieldDefinition): integer arrays, a
//! single resource reference and a width/height pair. Each one sizes the blob,
//! validates its own input and falls back to defaults on its own.

use std::str::FromStr;

use log::trace;

use super::assembler::Assembler;
use crate::diagnostic::Severity;
use crate::error::AssemblyError;
use crate::model::ValueKind;
use crate::processor::blob::DataBlob;
use crate::processor::encode::parse_resource_id;

/// Integer types that can back an [`Assembler::integer_field`].
pub trait FieldInteger: Copy + FromStr {
    const WIDTH: usize;

    fn write_to(self, blob: &mut DataBlob);
}

macro_rules! field_integer {
    ($($ty:ty => $write:ident),* $(,)?) => {
        $(
            impl FieldInteger for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();

                fn write_to(self, blob: &mut DataBlob) {
                    blob.$write(self)
                }
            }
        )*
    };
}

field_integer!(
    u8 => write_byte,
    u16 => write_word,
    u32 => write_long,
    u64 => write_quad,
    i8 => write_signed_byte,
    i16 => write_signed_word,
    i32 => write_signed_long,
    i64 => write_signed_quad,
);

impl Assembler<'_> {
    /// `count` integers of type `T` packed from `offset`. Returns the values
    /// that ended up in the blob.
    pub fn integer_field<T: FieldInteger>(
        &mut self,
        name: &str,
        offset: usize,
        count: usize,
        default: T,
        required: bool,
    ) -> Result<Vec<T>, AssemblyError> {
        let field = self.find_field(name, required);

        if let Some(field) = field {
            if field.values().len() != count {
                self.report(
                    Severity::Error,
                    field.location(),
                    &format!("The '{name}' field expects {count} values provided."),
                );
            }
            for value in field.values() {
                if value.kind != ValueKind::Integer {
                    self.report(
                        Severity::Error,
                        value.location.as_ref().or(field.location()),
                        &format!("The '{name}' field expects only integer values to be provided."),
                    );
                }
            }
        }

        self.reserve(name, offset + T::WIDTH * count)?;
        self.seek(name, offset)?;

        let mut written = Vec::with_capacity(count);
        match field {
            Some(field) => {
                for value in field.values().iter().take(count) {
                    let parsed = match value.kind {
                        ValueKind::Integer => value.text.trim().parse::<T>().ok(),
                        _ => None,
                    };
                    let v = match parsed {
                        Some(v) => v,
                        None => {
                            if value.kind == ValueKind::Integer {
                                self.report(
                                    Severity::Error,
                                    value.location.as_ref().or(field.location()),
                                    &format!(
                                        "The '{name}' field value '{}' does not fit in {} bytes.",
                                        value.text,
                                        T::WIDTH
                                    ),
                                );
                            }
                            default
                        }
                    };
                    v.write_to(&mut self.blob);
                    written.push(v);
                }
            }
            None => {
                for _ in 0..count {
                    default.write_to(&mut self.blob);
                    written.push(default);
                }
            }
        }
        trace!("{name}: {} integers at {offset}", written.len());
        Ok(written)
    }

    /// A signed 16-bit resource id at `offset`. Returns the id written.
    pub fn resource_reference_field(
        &mut self,
        name: &str,
        offset: usize,
        default: i16,
        required: bool,
    ) -> Result<i64, AssemblyError> {
        let field = self.find_field(name, required);

        self.reserve(name, offset + 2)?;
        self.seek(name, offset)?;

        if let Some(field) = field {
            if field.values().len() != 1 {
                self.report(
                    Severity::Error,
                    field.location(),
                    &format!("The '{name}' field expects a single resource reference to be provided."),
                );
            }

            if let Some(value) = field.values().first() {
                let at = value.location.as_ref().or(field.location());
                match value.kind {
                    ValueKind::ResourceId => match parse_resource_id(&value.text) {
                        Ok(id) => {
                            self.blob.write_signed_word(id);
                            return Ok(i64::from(id));
                        }
                        Err(err) => {
                            self.report(Severity::Error, at, &format!("The '{name}' field: {err}."))
                        }
                    },
                    ValueKind::FileReference => self.report_file_reference(name, at),
                    _ => self.report(
                        Severity::Error,
                        at,
                        &format!(
                            "The '{name}' field expects a Resource ID or File Reference to be provided."
                        ),
                    ),
                }
            }
        }

        self.blob.write_signed_word(default);
        Ok(i64::from(default))
    }

    /// Width then height as two signed words at `offset`.
    ///
    /// When the field is absent both components take `default`.
    pub fn size_field(
        &mut self,
        name: &str,
        offset: usize,
        default: i16,
        required: bool,
    ) -> Result<(i16, i16), AssemblyError> {
        let field = self.find_field(name, required);

        self.reserve(name, offset + 4)?;
        self.seek(name, offset)?;

        if let Some(field) = field {
            let values = field.values();
            if values.len() != 2 {
                self.report(
                    Severity::Error,
                    field.location(),
                    &format!("The '{name}' field expects a width and a height to be provided."),
                );
            }

            let dimension = |i: usize| {
                values
                    .get(i)
                    .filter(|v| v.kind == ValueKind::Integer)
                    .and_then(|v| v.text.trim().parse::<i16>().ok())
            };
            if let (Some(width), Some(height)) = (dimension(0), dimension(1)) {
                self.blob.write_signed_word(width);
                self.blob.write_signed_word(height);
                return Ok((width, height));
            }

            self.report(
                Severity::Error,
                field.location(),
                &format!("The '{name}' field expects both the width and height to be integers."),
            );
        }

        self.blob.write_signed_word(default);
        self.blob.write_signed_word(default);
        Ok((default, default))
    }
}
