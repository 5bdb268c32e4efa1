//! The document tree.
//!
//! A [`Node`] maps unique keys to [`Value`]s. The root of every parsed document is a
//! `Node`; sections and nested `{ ... }` objects are `Node`s stored under their name,
//! and section lists are [`Value::NodeList`]s.
//!
//! Keys keep their insertion order through [`IndexMap`], so a tree built in code
//! encodes its pairs in the order they were inserted.
//!
//! ## Path lookup
//!
//! Every accessor takes a path. A path is a key, or several keys joined by `.`
//! where each key before the last names a nested node:
//!
//! ```rust
//! use serde_rj::{parse_str, Error};
//!
//! let (doc, _) = parse_str("[Server]\nhost: \"localhost\"\nport: 8080\n");
//!
//! assert_eq!(doc.get_string("Server.host"), "localhost");
//! assert_eq!(doc.get_int_or("Server.timeout", 30), 30);
//! assert_eq!(doc.get_int_or_error("Server.host"), Err(Error::type_mismatch("integer", "string")));
//! assert_eq!(doc.get("Server.host.x"), Err(Error::ValueNotFound));
//! assert_eq!(doc.get(""), Err(Error::NoName));
//! ```

use crate::{Datetime, Error, Result, Value};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A node of the document tree.
///
/// # Examples
///
/// ```rust
/// use serde_rj::{Node, Value};
///
/// let mut node = Node::new();
/// node.insert("first", 1);
/// node.insert("second", 2);
/// node.insert("first", 3);
///
/// let keys: Vec<_> = node.keys().cloned().collect();
/// assert_eq!(keys, vec!["first", "second"]);
/// assert_eq!(node.get_int("first"), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node(IndexMap<String, Value>);

macro_rules! typed_accessors {
    ($(
        $kind:literal, $as:ident => $ty:ty:
        $get:ident, $get_or:ident, $get_or_error:ident;
    )*) => {
        $(
            #[doc = concat!("Returns the ", $kind, " at `path`, or the zero value when it is missing or of another kind.")]
            #[must_use]
            pub fn $get<'a>(&'a self, path: &str) -> $ty {
                self.$get_or_error(path).unwrap_or_default()
            }

            #[doc = concat!("Returns the ", $kind, " at `path`, or `default` when it is missing or of another kind.")]
            #[must_use]
            pub fn $get_or<'a>(&'a self, path: &str, default: $ty) -> $ty {
                self.$get_or_error(path).unwrap_or(default)
            }

            #[doc = concat!("Returns the ", $kind, " at `path`.")]
            ///
            /// # Errors
            ///
            /// [`Error::ValueNotFound`] or [`Error::NoName`] from the path lookup, and
            /// [`Error::TypeMismatch`] when the stored value has another kind.
            pub fn $get_or_error<'a>(&'a self, path: &str) -> Result<$ty> {
                let value = self.get(path)?;
                value
                    .$as()
                    .ok_or_else(|| Error::type_mismatch($kind, value.kind()))
            }
        )*
    };
}

impl Node {
    #[must_use]
    pub fn new() -> Self {
        Node(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Node(IndexMap::with_capacity(capacity))
    }

    /// Stores `value` under `key`, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Looks up a direct child without interpreting `.` in the key.
    #[must_use]
    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_value_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.0.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.0.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Resolves a dotted path.
    ///
    /// # Errors
    ///
    /// [`Error::NoName`] for an empty path or an empty segment. [`Error::ValueNotFound`]
    /// when a key is missing or a key before the last does not hold a node.
    pub fn get(&self, path: &str) -> Result<&Value> {
        if path.is_empty() {
            return Err(Error::NoName);
        }

        match path.split_once('.') {
            None => self.0.get(path).ok_or(Error::ValueNotFound),
            Some(("", _)) => Err(Error::NoName),
            Some((head, rest)) => match self.0.get(head) {
                Some(Value::Node(child)) => child.get(rest),
                _ => Err(Error::ValueNotFound),
            },
        }
    }

    typed_accessors! {
        "string", as_str => &'a str:
            get_string, get_string_or, get_string_or_error;
        "integer", as_i64 => i64:
            get_int, get_int_or, get_int_or_error;
        "float", as_f64 => f64:
            get_float, get_float_or, get_float_or_error;
        "boolean", as_bool => bool:
            get_bool, get_bool_or, get_bool_or_error;
        "datetime", as_datetime => Datetime:
            get_datetime, get_datetime_or, get_datetime_or_error;
        "string array", as_string_array => &'a [String]:
            get_string_array, get_string_array_or, get_string_array_or_error;
        "integer array", as_int_array => &'a [i64]:
            get_int_array, get_int_array_or, get_int_array_or_error;
        "float array", as_float_array => &'a [f64]:
            get_float_array, get_float_array_or, get_float_array_or_error;
        "boolean array", as_bool_array => &'a [bool]:
            get_bool_array, get_bool_array_or, get_bool_array_or_error;
        "datetime array", as_datetime_array => &'a [Datetime]:
            get_datetime_array, get_datetime_array_or, get_datetime_array_or_error;
    }

    /// Returns the nested node (section or `{ ... }` object) at `path`.
    ///
    /// # Errors
    ///
    /// Path lookup errors, or [`Error::TypeMismatch`] when the value is not a node.
    pub fn get_node(&self, path: &str) -> Result<&Node> {
        let value = self.get(path)?;
        value
            .as_node()
            .ok_or_else(|| Error::type_mismatch("node", value.kind()))
    }

    /// Returns the section list at `path`.
    pub fn get_node_list(&self, path: &str) -> Result<&[Node]> {
        let value = self.get(path)?;
        value
            .as_node_list()
            .ok_or_else(|| Error::type_mismatch("node list", value.kind()))
    }

    /// Returns any scalar array stored at `path`, whatever its element kind.
    ///
    /// A `null` value counts as missing.
    pub fn get_array(&self, path: &str) -> Result<&Value> {
        match self.get(path)? {
            Value::Null => Err(Error::ValueNotFound),
            value if value.is_scalar_array() => Ok(value),
            value => Err(Error::type_mismatch("array", value.kind())),
        }
    }

    /// Decodes this node into a record.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde::Deserialize;
    /// use serde_rj::parse_str;
    ///
    /// #[derive(Deserialize, Debug, PartialEq)]
    /// struct Person {
    ///     name: String,
    ///     age: i64,
    /// }
    ///
    /// let (doc, _) = parse_str("Name: \"abc\"\nAge: 12\n");
    /// let person: Person = doc.to_record().unwrap();
    /// assert_eq!(person, Person { name: "abc".into(), age: 12 });
    /// ```
    pub fn to_record<T: DeserializeOwned>(&self) -> Result<T> {
        crate::de::from_node(self)
    }

    /// Decodes the nested node at `path` into a record.
    pub fn get_record<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_node(path)?.to_record()
    }

    /// Decodes every node of the section list at `path`.
    pub fn get_record_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        self.get_node_list(path)?
            .iter()
            .map(Node::to_record)
            .collect()
    }
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{MapAccess, Visitor};

        struct NodeVisitor;

        impl<'de> Visitor<'de> for NodeVisitor {
            type Value = Node;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of RJ values")
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<Node, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut node = Node::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, Value>()? {
                    node.insert(key, value);
                }
                Ok(node)
            }
        }

        deserializer.deserialize_map(NodeVisitor)
    }
}

impl IntoIterator for Node {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Node {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Node {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Node(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
