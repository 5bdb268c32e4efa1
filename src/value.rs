//! Dynamic value representation for RJ documents.
//!
//! A [`Value`] is exactly one of the kinds a document can hold: a scalar, a nested
//! [`Node`], a list of nodes produced by a section list, or a homogeneous scalar
//! array. Arrays never mix element kinds; the parser rejects such literals and
//! [`Value::try_from`] refuses to build them.
//!
//! ## Creating Values
//!
//! ```rust
//! use serde_rj::Value;
//!
//! let name = Value::from("Zoe");
//! let age = Value::from(12);
//! let tags = Value::from(vec!["a", "b"]);
//!
//! assert!(name.is_string());
//! assert_eq!(age.as_i64(), Some(12));
//! assert_eq!(tags.kind(), "string array");
//! ```
//!
//! ## Extracting Values
//!
//! ```rust
//! use serde_rj::Value;
//! use std::convert::TryFrom;
//!
//! let value = Value::from(42);
//! let num: i64 = i64::try_from(value).unwrap();
//! assert_eq!(num, 42);
//! ```

use crate::datetime::{format_datetime, DATETIME_TOKEN};
use crate::lex::parse_datetime;
use crate::{Error, Node};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A moment in time together with the offset it was written with.
pub type Datetime = DateTime<FixedOffset>;

/// A dynamically-typed RJ value.
///
/// # Examples
///
/// ```rust
/// use serde_rj::{Node, Value};
///
/// let mut child = Node::new();
/// child.insert("name", "Anna");
///
/// let value = Value::Node(child);
/// assert!(value.is_node());
/// assert_eq!(value.as_node().and_then(|n| n.get("name").ok()), Some(&Value::from("Anna")));
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Datetime(Datetime),
    Node(Node),
    NodeList(Vec<Node>),
    StringArray(Vec<String>),
    IntegerArray(Vec<i64>),
    FloatArray(Vec<f64>),
    BooleanArray(Vec<bool>),
    DatetimeArray(Vec<Datetime>),
}

impl Value {
    /// Human-readable name of this value's kind, used in type mismatch errors.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Boolean(_) => "boolean",
            Value::Datetime(_) => "datetime",
            Value::Node(_) => "node",
            Value::NodeList(_) => "node list",
            Value::StringArray(_) => "string array",
            Value::IntegerArray(_) => "integer array",
            Value::FloatArray(_) => "float array",
            Value::BooleanArray(_) => "boolean array",
            Value::DatetimeArray(_) => "datetime array",
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_node(&self) -> bool {
        matches!(self, Value::Node(_))
    }

    /// Returns `true` for the homogeneous scalar array kinds.
    #[inline]
    #[must_use]
    pub const fn is_scalar_array(&self) -> bool {
        matches!(
            self,
            Value::StringArray(_)
                | Value::IntegerArray(_)
                | Value::FloatArray(_)
                | Value::BooleanArray(_)
                | Value::DatetimeArray(_)
        )
    }

    /// Returns `true` for an array or node list with no elements.
    ///
    /// An empty literal `[]` carries no element kind, so every typed array
    /// accessor accepts it.
    #[must_use]
    pub fn is_empty_array(&self) -> bool {
        match self {
            Value::NodeList(v) => v.is_empty(),
            Value::StringArray(v) => v.is_empty(),
            Value::IntegerArray(v) => v.is_empty(),
            Value::FloatArray(v) => v.is_empty(),
            Value::BooleanArray(v) => v.is_empty(),
            Value::DatetimeArray(v) => v.is_empty(),
            _ => false,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the float, widening integers.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_datetime(&self) -> Option<Datetime> {
        match self {
            Value::Datetime(dt) => Some(*dt),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_node_list(&self) -> Option<&[Node]> {
        match self {
            Value::NodeList(list) => Some(list),
            v if v.is_empty_array() => Some(&[]),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_string_array(&self) -> Option<&[String]> {
        match self {
            Value::StringArray(arr) => Some(arr),
            v if v.is_empty_array() => Some(&[]),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int_array(&self) -> Option<&[i64]> {
        match self {
            Value::IntegerArray(arr) => Some(arr),
            v if v.is_empty_array() => Some(&[]),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_float_array(&self) -> Option<&[f64]> {
        match self {
            Value::FloatArray(arr) => Some(arr),
            v if v.is_empty_array() => Some(&[]),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool_array(&self) -> Option<&[bool]> {
        match self {
            Value::BooleanArray(arr) => Some(arr),
            v if v.is_empty_array() => Some(&[]),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_datetime_array(&self) -> Option<&[Datetime]> {
        match self {
            Value::DatetimeArray(arr) => Some(arr),
            v if v.is_empty_array() => Some(&[]),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Datetime(dt) => f.write_str(&format_datetime(dt)),
            _ => {
                let text = crate::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&text)
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::String(s) => serializer.serialize_str(s),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Datetime(dt) => {
                serializer.serialize_newtype_struct(DATETIME_TOKEN, &format_datetime(dt))
            }
            Value::Node(node) => node.serialize(serializer),
            Value::NodeList(list) => serializer.collect_seq(list),
            Value::StringArray(arr) => serializer.collect_seq(arr),
            Value::IntegerArray(arr) => serializer.collect_seq(arr),
            Value::FloatArray(arr) => serializer.collect_seq(arr),
            Value::BooleanArray(arr) => serializer.collect_seq(arr),
            Value::DatetimeArray(arr) => {
                serializer.collect_seq(arr.iter().copied().map(Value::Datetime))
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any valid RJ value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Value, E> {
                Ok(Value::Boolean(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Value, E> {
                Ok(Value::Integer(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Value, E> {
                Ok(i64::try_from(value)
                    .map(Value::Integer)
                    .unwrap_or(Value::Float(value as f64)))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Value, E> {
                Ok(Value::Float(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Value, E> {
                Ok(Value::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Value, E> {
                Ok(Value::String(value))
            }

            fn visit_unit<E>(self) -> Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> Result<Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut elements: Vec<Value> = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    elements.push(elem);
                }
                Value::try_from(elements).map_err(de::Error::custom)
            }

            fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut node = Node::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(key) = map.next_key::<String>()? {
                    if key == DATETIME_TOKEN && node.is_empty() {
                        let raw: String = map.next_value()?;
                        return parse_datetime(&raw).map(Value::Datetime).map_err(de::Error::custom);
                    }
                    let value: Value = map.next_value()?;
                    node.insert(key, value);
                }
                Ok(Value::Node(node))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

/// Builds a homogeneous array from loose elements.
///
/// The first element fixes the array kind; any later element of another kind
/// is [`Error::InvalidArray`]. Nested nodes become a [`Value::NodeList`].
impl TryFrom<Vec<Value>> for Value {
    type Error = Error;

    fn try_from(elements: Vec<Value>) -> crate::Result<Self> {
        fn collect<T>(
            elements: Vec<Value>,
            pick: impl Fn(Value) -> Option<T>,
        ) -> crate::Result<Vec<T>> {
            elements
                .into_iter()
                .map(|v| pick(v).ok_or(Error::InvalidArray))
                .collect()
        }

        let first = match elements.first() {
            Some(first) => first,
            None => return Ok(Value::StringArray(Vec::new())),
        };

        match first {
            Value::String(_) => collect(elements, |v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .map(Value::StringArray),
            Value::Integer(_) => collect(elements, |v| match v {
                Value::Integer(i) => Some(i),
                _ => None,
            })
            .map(Value::IntegerArray),
            Value::Float(_) => collect(elements, |v| match v {
                Value::Float(f) => Some(f),
                _ => None,
            })
            .map(Value::FloatArray),
            Value::Boolean(_) => collect(elements, |v| match v {
                Value::Boolean(b) => Some(b),
                _ => None,
            })
            .map(Value::BooleanArray),
            Value::Datetime(_) => collect(elements, |v| match v {
                Value::Datetime(dt) => Some(dt),
                _ => None,
            })
            .map(Value::DatetimeArray),
            Value::Node(_) => collect(elements, |v| match v {
                Value::Node(n) => Some(n),
                _ => None,
            })
            .map(Value::NodeList),
            _ => Err(Error::InvalidArray),
        }
    }
}

impl TryFrom<Value> for i64 {
    type Error = Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value
            .as_i64()
            .ok_or_else(|| Error::type_mismatch("integer", value.kind()))
    }
}

impl TryFrom<Value> for f64 {
    type Error = Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value
            .as_f64()
            .ok_or_else(|| Error::type_mismatch("float", value.kind()))
    }
}

impl TryFrom<Value> for bool {
    type Error = Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value
            .as_bool()
            .ok_or_else(|| Error::type_mismatch("boolean", value.kind()))
    }
}

impl TryFrom<Value> for String {
    type Error = Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(Error::type_mismatch("string", other.kind())),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => |$v:ident| $conv:expr),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from($v: $ty) -> Self {
                    $conv
                }
            }
        )*
    };
}

impl_from! {
    bool => |v| Value::Boolean(v),
    i8 => |v| Value::Integer(i64::from(v)),
    i16 => |v| Value::Integer(i64::from(v)),
    i32 => |v| Value::Integer(i64::from(v)),
    i64 => |v| Value::Integer(v),
    u8 => |v| Value::Integer(i64::from(v)),
    u16 => |v| Value::Integer(i64::from(v)),
    u32 => |v| Value::Integer(i64::from(v)),
    f32 => |v| Value::Float(f64::from(v)),
    f64 => |v| Value::Float(v),
    String => |v| Value::String(v),
    &str => |v| Value::String(v.to_string()),
    Datetime => |v| Value::Datetime(v),
    Node => |v| Value::Node(v),
    Vec<Node> => |v| Value::NodeList(v),
    Vec<String> => |v| Value::StringArray(v),
    Vec<&str> => |v| Value::StringArray(v.into_iter().map(str::to_string).collect()),
    Vec<i64> => |v| Value::IntegerArray(v),
    Vec<i32> => |v| Value::IntegerArray(v.into_iter().map(i64::from).collect()),
    Vec<f64> => |v| Value::FloatArray(v),
    Vec<bool> => |v| Value::BooleanArray(v),
    Vec<Datetime> => |v| Value::DatetimeArray(v),
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
