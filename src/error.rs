//! Error types for RJ parsing, decoding and encoding.
//!
//! The scanner never stops at the first malformed construct. Every problem it
//! recovers from becomes a [`Diagnostic`], and the full list is surfaced once at
//! the [`parse`](crate::parse) boundary as [`Error::Parse`]. The decode and encode
//! engines and the [`Node`](crate::Node) accessors stop at the first error instead.
//!
//! ## Examples
//!
//! ```rust
//! use serde_rj::{parse_str, Error};
//!
//! let (node, err) = parse_str("name: \"a\\c\"\nage: 12\n");
//! assert_eq!(node.get_int("age"), 12);
//!
//! match err {
//!     Some(Error::Parse(diagnostics)) => {
//!         assert_eq!(diagnostics.len(), 1);
//!         assert_eq!(diagnostics.to_string(), "line 1: invalid escape, name: name");
//!     }
//!     other => panic!("expected parse diagnostics, got {:?}", other),
//! }
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors that can occur while parsing, decoding or encoding RJ.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A pair line with no name before the line ended, or a name not followed by `:`.
    #[error("invalid name")]
    InvalidName,

    /// A `[Section]` header whose name could not be read.
    #[error("invalid node name")]
    InvalidNodeName,

    /// A value whose first character starts no known value kind.
    #[error("invalid value")]
    InvalidValue,

    /// A malformed array literal or an element that breaks the array's element type.
    #[error("invalid array")]
    InvalidArray,

    /// An unterminated quoted or raw string, or a non-string array element.
    #[error("invalid string value")]
    InvalidStringValue,

    /// Malformed UTF-8 inside a string, or a malformed `\uXXXX` escape body.
    #[error("invalid utf-8 string value")]
    InvalidUtf8StringValue,

    #[error("invalid bool value")]
    InvalidBoolValue,

    #[error("invalid null value")]
    InvalidNullValue,

    /// An unknown escape character, or a backslash at the very end of input.
    #[error("invalid escape")]
    InvalidEscape,

    /// A nested `{ ... }` object missing its closing brace.
    #[error("invalid object")]
    InvalidObject,

    /// A numeric-looking token that is neither a number nor one of the datetime layouts.
    #[error("invalid time value")]
    InvalidTimeValue,

    #[error("value not found")]
    ValueNotFound,

    /// The stored value has a different kind than the one requested.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("no name provided")]
    NoName,

    #[error("value is not assignable")]
    NotAssignable,

    /// Every recoverable problem found while parsing one document.
    #[error("{0}")]
    Parse(Diagnostics),

    /// An internal fault caught at the parse boundary.
    #[error("parse RJ failed")]
    ParseFailed,

    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Custom error
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Creates a type mismatch error from the requested and the stored kind names.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_rj::Error;
    ///
    /// let err = Error::type_mismatch("integer", "string");
    /// assert_eq!(err.to_string(), "type mismatch: expected integer, found string");
    /// ```
    #[must_use]
    pub const fn type_mismatch(expected: &'static str, found: &'static str) -> Self {
        Error::TypeMismatch { expected, found }
    }

    /// Returns `true` for [`Error::TypeMismatch`] regardless of the kinds involved.
    #[must_use]
    pub const fn is_type_mismatch(&self) -> bool {
        matches!(self, Error::TypeMismatch { .. })
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for file reading/writing failures.
    pub fn io(err: &std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

/// One problem the scanner recovered from.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// One-based line where the offending construct starts.
    pub line: usize,
    /// Name of the pair whose value failed, when one was read.
    pub name: Option<String>,
    pub error: Error,
}

impl Diagnostic {
    pub fn new(line: usize, error: Error) -> Self {
        Diagnostic {
            line,
            name: None,
            error,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.error)?;
        if let Some(name) = &self.name {
            write!(f, ", name: {}", name)?;
        }
        Ok(())
    }
}

/// The ordered diagnostics of one parse, displayed as a single `;`-joined message.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Diagnostics(Vec::new())
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    /// Converts the list into the boundary error, or `None` when nothing went wrong.
    #[must_use]
    pub fn into_error(self) -> Option<Error> {
        if self.is_empty() {
            None
        } else {
            Some(Error::Parse(self))
        }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

impl From<Vec<Diagnostic>> for Diagnostics {
    fn from(list: Vec<Diagnostic>) -> Self {
        Diagnostics(list)
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
