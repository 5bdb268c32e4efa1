//! # serde_rj
//!
//! A parser, tree model and Serde-compatible encoder/decoder for RJ, a line-oriented
//! document language that sits between INI and YAML.
//!
//! ## What does RJ look like?
//!
//! ```text
//! # comments start with '#' or '//'
//! name: "serde_rj"
//! version: 3
//! ratio: 0.75
//! released: 2019-09-09T13:54:46Z
//! tags: ["parser", "config"]      // arrays are homogeneous
//! limits: {cpu: 2, memory: 512}
//!
//! [Server]
//! host: "localhost"
//! port: 8080
//!
//! [Users]
//! -
//! name: "anna"
//! -
//! name: "bert"
//! ```
//!
//! See the [`grammar`] module for the full description.
//!
//! ## Key Features
//!
//! - **Error tolerant**: a malformed line is reported and skipped; the rest of the
//!   document is still parsed
//! - **Typed tree**: [`Node`] and [`Value`] with dotted-path accessors
//!   (`get_int("Server.port")`)
//! - **Serde compatible**: decode into and encode from any `#[derive(Serialize, Deserialize)]` type
//! - **No Unsafe Code**
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! serde_rj = "0.1"
//! serde = { version = "1.0", features = ["derive"] }
//! ```
//!
//! ### Parsing
//!
//! [`parse`] always returns a tree, together with every problem it recovered from:
//!
//! ```rust
//! use serde_rj::parse_str;
//!
//! let text = "name: \"a\\q\"\narray: [\"a\", \"b\"]\n[Section]\nkey: 1\n";
//! let (doc, err) = parse_str(text);
//!
//! assert!(err.is_some());
//! assert_eq!(doc.get_string_array("array"), ["a", "b"]);
//! assert_eq!(doc.get_int("Section.key"), 1);
//! ```
//!
//! ### Records
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_rj::{marshal, unmarshal};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug, Default)]
//! struct Person {
//!     #[serde(rename = "Name")]
//!     name: String,
//!     #[serde(rename = "Age")]
//!     age: i64,
//! }
//!
//! let person = Person { name: "abc".into(), age: 12 };
//! let bytes = marshal(&person).unwrap();
//! assert_eq!(bytes, b"Name: \"abc\"\nAge: 12\n");
//!
//! let mut back = Person::default();
//! unmarshal(&bytes, &mut back).unwrap();
//! assert_eq!(back, person);
//! ```
//!
//! ### Building trees
//!
//! ```rust
//! use serde_rj::{rj_node, to_string};
//!
//! let node = rj_node! { "port": 8080, "tags": ["a", "b"] };
//! assert_eq!(to_string(&node).unwrap(), "port: 8080\ntags: [\"a\",\"b\"]\n");
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (scanner dispatch at `trace`, recovered
//! problems and file access at `debug`) and never installs a subscriber.
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - parse, decode and encode a small config
//! - **`dynamic_values.rs`** - walk a parsed tree without a schema
//!
//! Run any example with: `cargo run --example <name>`

pub mod datetime;
pub mod de;
pub mod error;
pub mod grammar;
pub mod lex;
pub mod macros;
pub mod node;
pub mod options;
pub mod parser;
pub mod ser;
pub mod value;

pub use de::{from_node, from_value, Deserializer};
pub use error::{Diagnostic, Diagnostics, Error, Result};
pub use node::Node;
pub use options::EncodeOptions;
pub use ser::Serializer;
pub use value::{Datetime, Value};

use parser::Scanner;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tracing::{debug, error};

/// Parses a complete document.
///
/// The tree holds everything that could be recognized, even when the error is set.
/// The error is [`Error::Parse`] listing every recovered problem, or
/// [`Error::ParseFailed`] (with an empty tree) if the scanner faulted internally.
///
/// # Examples
///
/// ```rust
/// use serde_rj::{parse, Error};
///
/// let (doc, err) = parse(b"a: 1\nb: nope\n");
/// assert_eq!(doc.get_int("a"), 1);
/// assert!(matches!(err, Some(Error::Parse(d)) if d.len() == 1));
/// ```
pub fn parse(input: &[u8]) -> (Node, Option<Error>) {
    match panic::catch_unwind(AssertUnwindSafe(|| Scanner::new(input).scan())) {
        Ok((node, diagnostics)) => (node, Diagnostics::from(diagnostics).into_error()),
        Err(_) => {
            error!(len = input.len(), "scanner faulted, discarding partial tree");
            (Node::new(), Some(Error::ParseFailed))
        }
    }
}

pub fn parse_str(input: &str) -> (Node, Option<Error>) {
    parse(input.as_bytes())
}

/// Reads and parses the file at `path`.
///
/// A read failure yields an empty tree and [`Error::Io`].
pub fn load<P: AsRef<Path>>(path: P) -> (Node, Option<Error>) {
    let path = path.as_ref();
    match std::fs::read(path) {
        Ok(bytes) => {
            debug!(path = %path.display(), bytes = bytes.len(), "loaded document");
            parse(&bytes)
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "failed to read document");
            (Node::new(), Some(Error::io(&e)))
        }
    }
}

/// Parses, failing on any recovered problem.
fn parse_strict(input: &[u8]) -> Result<Node> {
    match parse(input) {
        (node, None) => Ok(node),
        (_, Some(err)) => Err(err),
    }
}

/// Encodes a value with the default options.
///
/// # Errors
///
/// Fails for map keys that cannot be pair names and for non-finite floats.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, EncodeOptions::default())
}

/// Encodes a value with custom options.
///
/// # Examples
///
/// ```rust
/// use serde::{Deserialize, Serialize};
/// use serde_rj::{from_str, to_string_with_options, EncodeOptions};
///
/// #[derive(Serialize, Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// #[derive(Serialize, Deserialize, PartialEq, Debug)]
/// struct Line { from: Point, to: Point, label: String }
///
/// let line = Line {
///     from: Point { x: 0, y: 0 },
///     to: Point { x: 3, y: 4 },
///     label: "tab\there".into(),
/// };
/// let text = to_string_with_options(&line, EncodeOptions::round_trip()).unwrap();
/// assert_eq!(from_str::<Line>(&text).unwrap(), line);
/// ```
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: EncodeOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    let mut serializer = Serializer::new(options);
    value.serialize(&mut serializer)?;
    Ok(serializer.into_inner())
}

/// Encodes a value to bytes with the default options.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn marshal<T>(value: &T) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    to_string(value).map(String::into_bytes)
}

#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, EncodeOptions::default())
}

#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(mut writer: W, value: &T, options: EncodeOptions) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let text = to_string_with_options(value, options)?;
    writer.write_all(text.as_bytes()).map_err(|e| Error::io(&e))
}

/// Encodes a value and writes it to `path`, replacing any existing file.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn marshal_to_file<T, P>(value: &T, path: P) -> Result<()>
where
    T: ?Sized + Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let bytes = marshal(value)?;
    std::fs::write(path, &bytes).map_err(|e| Error::io(&e))?;
    debug!(path = %path.display(), bytes = bytes.len(), "wrote document");
    Ok(())
}

/// Parses a document and decodes it into `target`.
///
/// Any parse problem fails the whole call. `target` is only replaced when decoding
/// succeeds.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use serde_rj::unmarshal;
///
/// #[derive(Deserialize, Debug, Default, PartialEq)]
/// struct Config { port: u16 }
///
/// let mut config = Config { port: 1 };
/// assert!(unmarshal(b"port: \"x\"\n", &mut config).is_err());
/// assert_eq!(config.port, 1);
///
/// unmarshal(b"port: 8080\n", &mut config).unwrap();
/// assert_eq!(config.port, 8080);
/// ```
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn unmarshal<T>(input: &[u8], target: &mut T) -> Result<()>
where
    T: DeserializeOwned,
{
    *target = from_slice(input)?;
    Ok(())
}

/// Reads the file at `path` and decodes it into `target`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn unmarshal_file<T, P>(path: P, target: &mut T) -> Result<()>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| Error::io(&e))?;
    debug!(path = %path.display(), bytes = bytes.len(), "decoding document");
    unmarshal(&bytes, target)
}

#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(input: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    let node = parse_strict(input)?;
    from_node(&node)
}

/// Decodes a record from document text.
///
/// # Examples
///
/// ```rust
/// use serde_rj::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("x: 1\ny: 2").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(input: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    from_slice(input.as_bytes())
}

#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(|e| Error::io(&e))?;
    from_slice(&bytes)
}
