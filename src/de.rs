//! Decoding a [`Node`] tree into typed records.
//!
//! The [`Deserializer`] walks a borrowed tree; nothing is copied except the strings
//! handed to visitors. Record fields are matched by name:
//!
//! - the key itself,
//! - then the key with its first letter upper-cased (`name:` fills `Name`),
//! - then the key with its first letter lower-cased (`Name:` fills `name`).
//!
//! Keys that match no field are ignored unless the record denies unknown fields.
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_rj::from_str;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Server {
//!     host: String,
//!     ports: Vec<u16>,
//!     debug: Option<bool>,
//! }
//!
//! let server: Server = from_str("Host: \"local\"\nports: [80, 443]\n").unwrap();
//! assert_eq!(server.host, "local");
//! assert_eq!(server.ports, vec![80, 443]);
//! assert_eq!(server.debug, None);
//! ```

use crate::datetime::{format_datetime, DATETIME_TOKEN};
use crate::{Datetime, Error, Node, Result, Value};
use serde::de::{self, DeserializeOwned, IntoDeserializer};

/// Decodes a record from a node.
///
/// # Errors
///
/// [`Error::TypeMismatch`] when a value's kind cannot fill its field, including
/// decoding into a target that is not a record, and [`Error::NotAssignable`] when an
/// integer does not fit its field's range.
pub fn from_node<T: DeserializeOwned>(node: &Node) -> Result<T> {
    T::deserialize(Deserializer::from_node(node))
}

/// Decodes any deserializable type from a single value.
pub fn from_value<T: DeserializeOwned>(value: &Value) -> Result<T> {
    T::deserialize(Deserializer::from_value(value))
}

#[derive(Clone, Copy)]
enum Input<'a> {
    Value(&'a Value),
    Node(&'a Node),
}

/// A serde deserializer over a borrowed value or node.
#[derive(Clone, Copy)]
pub struct Deserializer<'a> {
    input: Input<'a>,
}

impl<'a> Deserializer<'a> {
    #[must_use]
    pub fn from_value(value: &'a Value) -> Self {
        Deserializer {
            input: Input::Value(value),
        }
    }

    #[must_use]
    pub fn from_node(node: &'a Node) -> Self {
        Deserializer {
            input: Input::Node(node),
        }
    }

    fn value(&self) -> Option<&'a Value> {
        match self.input {
            Input::Value(value) => Some(value),
            Input::Node(_) => None,
        }
    }

    fn node(&self) -> Option<&'a Node> {
        match self.input {
            Input::Node(node) | Input::Value(Value::Node(node)) => Some(node),
            Input::Value(_) => None,
        }
    }

    fn mismatch(&self, expected: &'static str) -> Error {
        let found = match self.input {
            Input::Value(value) => value.kind(),
            Input::Node(_) => "node",
        };
        Error::type_mismatch(expected, found)
    }

    fn visit_array<'de, V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value() {
            Some(Value::StringArray(arr)) => visit_elements(visitor, arr.iter().map(String::as_str)),
            Some(Value::IntegerArray(arr)) => visit_elements(visitor, arr.iter().copied()),
            Some(Value::FloatArray(arr)) => visit_elements(visitor, arr.iter().copied()),
            Some(Value::BooleanArray(arr)) => visit_elements(visitor, arr.iter().copied()),
            Some(Value::DatetimeArray(arr)) => {
                visit_elements(visitor, arr.iter().copied().map(DatetimeDeserializer))
            }
            Some(Value::NodeList(list)) => visit_elements(visitor, list.iter().map(Deserializer::from_node)),
            _ => Err(self.mismatch("array")),
        }
    }

    fn visit_node<'de, V>(self, fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.node() {
            Some(node) => visitor.visit_map(MapAccess::new(node, fields)),
            None => Err(self.mismatch("node")),
        }
    }
}

fn visit_elements<'de, V, I>(visitor: V, elements: I) -> Result<V::Value>
where
    V: de::Visitor<'de>,
    I: Iterator,
    I::Item: IntoDeserializer<'de, Error>,
{
    let mut seq = de::value::SeqDeserializer::<_, Error>::new(elements);
    let value = visitor.visit_seq(&mut seq)?;
    seq.end()?;
    Ok(value)
}

impl<'de, 'a> IntoDeserializer<'de, Error> for Deserializer<'a> {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

/// A datetime handed to a self-describing visitor.
///
/// `deserialize_any` presents it as a one-entry map keyed by the private datetime
/// token, which [`Value`]'s visitor turns back into [`Value::Datetime`]. Every typed
/// request sees the RFC 3339 text.
#[derive(Clone, Copy)]
struct DatetimeDeserializer(Datetime);

impl<'de> de::Deserializer<'de> for DatetimeDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_map(DatetimeAccess {
            value: Some(self.0),
            key_taken: false,
        })
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_string(format_datetime(&self.0))
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char bytes byte_buf
        unit unit_struct seq tuple tuple_struct map struct enum identifier
    }
}

impl<'de> IntoDeserializer<'de, Error> for DatetimeDeserializer {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

struct DatetimeAccess {
    value: Option<Datetime>,
    key_taken: bool,
}

impl<'de> de::MapAccess<'de> for DatetimeAccess {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        if self.key_taken {
            return Ok(None);
        }
        self.key_taken = true;
        let key: de::value::StrDeserializer<'_, Error> = DATETIME_TOKEN.into_deserializer();
        seed.deserialize(key).map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(dt) => seed.deserialize(format_datetime(&dt).into_deserializer()),
            None => Err(Error::custom("datetime value already taken")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(usize::from(!self.key_taken))
    }
}

macro_rules! deserialize_integer {
    ($($method:ident => $ty:ty, $visit:ident;)*) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                match self.value() {
                    Some(Value::Integer(i)) => {
                        let narrowed = <$ty>::try_from(*i).map_err(|_| Error::NotAssignable)?;
                        visitor.$visit(narrowed)
                    }
                    _ => Err(self.mismatch("integer")),
                }
            }
        )*
    };
}

impl<'de, 'a> de::Deserializer<'de> for Deserializer<'a> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let value = match self.input {
            Input::Node(_) => return self.visit_node(&[], visitor),
            Input::Value(value) => value,
        };

        match value {
            Value::Null => visitor.visit_unit(),
            Value::String(s) => visitor.visit_str(s),
            Value::Integer(i) => visitor.visit_i64(*i),
            Value::Float(f) => visitor.visit_f64(*f),
            Value::Boolean(b) => visitor.visit_bool(*b),
            Value::Datetime(dt) => DatetimeDeserializer(*dt).deserialize_any(visitor),
            Value::Node(_) => self.visit_node(&[], visitor),
            _ => self.visit_array(visitor),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value() {
            Some(Value::Boolean(b)) => visitor.visit_bool(*b),
            _ => Err(self.mismatch("boolean")),
        }
    }

    deserialize_integer! {
        deserialize_i8 => i8, visit_i8;
        deserialize_i16 => i16, visit_i16;
        deserialize_i32 => i32, visit_i32;
        deserialize_i64 => i64, visit_i64;
        deserialize_i128 => i128, visit_i128;
        deserialize_u8 => u8, visit_u8;
        deserialize_u16 => u16, visit_u16;
        deserialize_u32 => u32, visit_u32;
        deserialize_u64 => u64, visit_u64;
        deserialize_u128 => u128, visit_u128;
    }

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_f64(visitor)
    }

    /// Integers widen to floats.
    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value().and_then(Value::as_f64) {
            Some(f) => visitor.visit_f64(f),
            None => Err(self.mismatch("float")),
        }
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value() {
            Some(Value::String(s)) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => visitor.visit_char(c),
                    _ => Err(Error::NotAssignable),
                }
            }
            _ => Err(self.mismatch("string")),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value() {
            Some(Value::String(s)) => visitor.visit_str(s),
            Some(Value::Datetime(dt)) => visitor.visit_string(format_datetime(dt)),
            _ => Err(self.mismatch("string")),
        }
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value() {
            Some(Value::String(s)) => visitor.visit_bytes(s.as_bytes()),
            _ => self.visit_array(visitor),
        }
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value() {
            Some(Value::Null) => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value() {
            Some(Value::Null) => visitor.visit_unit(),
            _ => Err(self.mismatch("null")),
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.visit_array(visitor)
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.visit_array(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.visit_array(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.visit_node(&[], visitor)
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.visit_node(fields, visitor)
    }

    /// A unit variant is its quoted name; other variants are a node with one entry.
    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        if let Some(Value::String(s)) = self.value() {
            return visitor.visit_enum(s.as_str().into_deserializer());
        }

        let node = self.node().ok_or_else(|| self.mismatch("enum"))?;
        match node.iter().next() {
            Some((variant, value)) if node.len() == 1 => visitor.visit_enum(EnumAccess {
                variant: variant.as_str(),
                value,
            }),
            _ => Err(Error::custom("expected a node with exactly one entry for an enum")),
        }
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

/// Maps a key onto one of the record's field names.
fn resolve_field<'k>(key: &'k str, fields: &'static [&'static str]) -> &'k str {
    if fields.is_empty() || fields.contains(&key) {
        return key;
    }

    let mut chars = key.chars();
    let Some(first) = chars.next() else {
        return key;
    };
    let rest = chars.as_str();

    let upper: String = first.to_uppercase().chain(rest.chars()).collect();
    let lower: String = first.to_lowercase().chain(rest.chars()).collect();

    fields
        .iter()
        .find(|field| **field == upper)
        .or_else(|| fields.iter().find(|field| **field == lower))
        .copied()
        .unwrap_or(key)
}

struct MapAccess<'a> {
    iter: indexmap::map::Iter<'a, String, Value>,
    fields: &'static [&'static str],
    value: Option<&'a Value>,
}

impl<'a> MapAccess<'a> {
    fn new(node: &'a Node, fields: &'static [&'static str]) -> Self {
        MapAccess {
            iter: node.iter(),
            fields,
            value: None,
        }
    }
}

impl<'de, 'a> de::MapAccess<'de> for MapAccess<'a> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                let field = resolve_field(key, self.fields);
                seed.deserialize(field.into_deserializer()).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(Deserializer::from_value(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct EnumAccess<'a> {
    variant: &'a str,
    value: &'a Value,
}

impl<'de, 'a> de::EnumAccess<'de> for EnumAccess<'a> {
    type Error = Error;
    type Variant = Deserializer<'a>;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let name: de::value::StrDeserializer<'_, Error> = self.variant.into_deserializer();
        let variant = seed.deserialize(name)?;
        Ok((variant, Deserializer::from_value(self.value)))
    }
}

impl<'de, 'a> de::VariantAccess<'de> for Deserializer<'a> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value() {
            Some(Value::Null) => Ok(()),
            _ => Err(self.mismatch("null")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(self)
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.visit_array(visitor)
    }

    fn struct_variant<V>(self, fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.visit_node(fields, visitor)
    }
}
