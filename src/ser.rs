//! Encoding typed values as RJ text.
//!
//! The [`Serializer`] writes text directly; no intermediate tree is built.
//!
//! - A top-level record or map becomes `Name: value` lines in field order.
//! - A record nested inside a value is framed as `TypeName:{ ... }` (or `{ ... }`
//!   without type names), its fields again written as lines.
//! - Sequences are `[a,b,c]`; `None` and unit are `null`.
//! - Strings are double-quoted, escaped only when
//!   [`EncodeOptions::escape_strings`] is set.
//! - Datetimes tagged through [`crate::datetime`] are written bare.
//!
//! ```rust
//! use serde::Serialize;
//! use serde_rj::to_string;
//!
//! #[derive(Serialize)]
//! struct Person {
//!     #[serde(rename = "Name")]
//!     name: String,
//!     #[serde(rename = "Age")]
//!     age: u32,
//! }
//!
//! let text = to_string(&Person { name: "abc".into(), age: 12 }).unwrap();
//! assert_eq!(text, "Name: \"abc\"\nAge: 12\n");
//!
//! assert_eq!(to_string(&vec![12, 23, 34]).unwrap(), "[12,23,34]");
//! ```

use crate::datetime::DATETIME_TOKEN;
use crate::{EncodeOptions, Error, Result};
use serde::{ser, Serialize};

/// The RJ text serializer.
pub struct Serializer {
    output: String,
    options: EncodeOptions,
    depth: usize,
    raw_next: bool,
}

impl Serializer {
    #[must_use]
    pub fn new(options: EncodeOptions) -> Self {
        Serializer {
            output: String::with_capacity(256),
            options,
            depth: 0,
            raw_next: false,
        }
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.output
    }

    fn write_quoted(&mut self, s: &str) {
        self.output.push('"');
        if self.options.escape_strings {
            for ch in s.chars() {
                match ch {
                    '"' => self.output.push_str("\\\""),
                    '\\' => self.output.push_str("\\\\"),
                    '\n' => self.output.push_str("\\n"),
                    '\r' => self.output.push_str("\\r"),
                    '\t' => self.output.push_str("\\t"),
                    '\u{8}' => self.output.push_str("\\b"),
                    '\u{c}' => self.output.push_str("\\f"),
                    c if c.is_control() => {
                        self.output.push_str(&format!("\\u{:04X}", u32::from(c)));
                    }
                    c => self.output.push(c),
                }
            }
        } else {
            self.output.push_str(s);
        }
        self.output.push('"');
    }

    /// Opens a record; top-level records are bare lines, nested ones are braced.
    fn begin_record(&mut self, type_name: Option<&str>) -> &'static str {
        let nested = self.depth > 0;
        self.depth += 1;
        if !nested {
            return "";
        }
        if let (Some(name), true) = (type_name, self.options.type_names) {
            self.output.push_str(name);
            self.output.push(':');
        }
        self.output.push('{');
        "}"
    }

    fn begin_variant(&mut self, variant: &str) {
        self.output.push('{');
        self.output.push_str(variant);
        self.output.push_str(": ");
    }

    fn compound(&mut self, close: &'static str) -> Compound<'_> {
        Compound {
            ser: self,
            first: true,
            close,
        }
    }
}

impl<'a> ser::Serializer for &'a mut Serializer {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = Compound<'a>;
    type SerializeTuple = Compound<'a>;
    type SerializeTupleStruct = Compound<'a>;
    type SerializeTupleVariant = Compound<'a>;
    type SerializeMap = Compound<'a>;
    type SerializeStruct = Compound<'a>;
    type SerializeStructVariant = Compound<'a>;

    fn serialize_bool(self, v: bool) -> Result<()> {
        self.output.push_str(if v { "true" } else { "false" });
        Ok(())
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        self.output.push_str(&v.to_string());
        Ok(())
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        self.output.push_str(&v.to_string());
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        self.serialize_f64(f64::from(v))
    }

    /// Shortest decimal form, never exponent notation.
    fn serialize_f64(self, v: f64) -> Result<()> {
        if !v.is_finite() {
            return Err(Error::custom(format!("cannot encode non-finite float {}", v)));
        }
        self.output.push_str(&v.to_string());
        Ok(())
    }

    fn serialize_char(self, v: char) -> Result<()> {
        let mut buf = [0u8; 4];
        self.serialize_str(v.encode_utf8(&mut buf))
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        if std::mem::take(&mut self.raw_next) {
            self.output.push_str(v);
        } else {
            self.write_quoted(v);
        }
        Ok(())
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        use serde::ser::SerializeSeq;
        let mut seq = self.serialize_seq(Some(v.len()))?;
        for byte in v {
            seq.serialize_element(byte)?;
        }
        seq.end()
    }

    fn serialize_none(self) -> Result<()> {
        self.serialize_unit()
    }

    fn serialize_some<T>(self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        self.output.push_str("null");
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T>(self, name: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        if name == DATETIME_TOKEN {
            self.raw_next = true;
        }
        let result = value.serialize(&mut *self);
        self.raw_next = false;
        result
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.begin_variant(variant);
        self.depth += 1;
        value.serialize(&mut *self)?;
        self.depth -= 1;
        self.output.push('}');
        Ok(())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Compound<'a>> {
        self.output.push('[');
        self.depth += 1;
        Ok(self.compound("]"))
    }

    fn serialize_tuple(self, len: usize) -> Result<Compound<'a>> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<Compound<'a>> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Compound<'a>> {
        self.begin_variant(variant);
        self.output.push('[');
        self.depth += 1;
        Ok(self.compound("]}"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Compound<'a>> {
        let close = self.begin_record(None);
        Ok(self.compound(close))
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<Compound<'a>> {
        let close = self.begin_record(Some(name));
        Ok(self.compound(close))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Compound<'a>> {
        self.begin_variant(variant);
        self.output.push('{');
        self.depth += 1;
        Ok(self.compound("}}"))
    }
}

/// State shared by every compound form: sequences, records and variants.
pub struct Compound<'a> {
    ser: &'a mut Serializer,
    first: bool,
    close: &'static str,
}

impl<'a> Compound<'a> {
    fn element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        if !std::mem::take(&mut self.first) {
            self.ser.output.push(',');
        }
        value.serialize(&mut *self.ser)
    }

    fn key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let name = key_text(key)?;
        self.ser.output.push_str(&name);
        self.ser.output.push_str(": ");
        Ok(())
    }

    fn value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(&mut *self.ser)?;
        self.ser.output.push('\n');
        Ok(())
    }

    fn field<T>(&mut self, name: &str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.ser.output.push_str(name);
        self.ser.output.push_str(": ");
        self.value(value)
    }

    fn finish(self) -> Result<()> {
        self.ser.depth -= 1;
        self.ser.output.push_str(self.close);
        Ok(())
    }
}

/// Renders a map key as a bare pair name.
fn key_text<T>(key: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let mut ser = Serializer::new(EncodeOptions::new());
    ser.depth = 1;
    key.serialize(&mut ser)?;
    let text = ser.into_inner();

    let name = text
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(&text);

    let valid = !name.is_empty()
        && !name
            .bytes()
            .any(|c| matches!(c, b' ' | b'\t' | b'\r' | b'\n' | b':' | b']' | b'[' | b'{' | b'}'));
    if valid {
        Ok(name.to_string())
    } else {
        Err(Error::NoName)
    }
}

impl<'a> ser::SerializeSeq for Compound<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<'a> ser::SerializeTuple for Compound<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<'a> ser::SerializeTupleStruct for Compound<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<'a> ser::SerializeTupleVariant for Compound<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<'a> ser::SerializeMap for Compound<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.key(key)
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.value(value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<'a> ser::SerializeStruct for Compound<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.field(key, value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}

impl<'a> ser::SerializeStructVariant for Compound<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.field(key, value)
    }

    fn end(self) -> Result<()> {
        self.finish()
    }
}
