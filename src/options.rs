//! Configuration options for encoding.
//!
//! The defaults reproduce the classic RJ output: nested records are framed with
//! their type name and string contents are written verbatim. Neither form parses
//! back losslessly, so [`EncodeOptions::round_trip`] turns both off.
//!
//! ## Examples
//!
//! ```rust
//! use serde::Serialize;
//! use serde_rj::{to_string_with_options, EncodeOptions};
//!
//! #[derive(Serialize)]
//! struct Inner { a: i32 }
//!
//! #[derive(Serialize)]
//! struct Outer { inner: Inner, note: String }
//!
//! let value = Outer { inner: Inner { a: 1 }, note: "x\ny".into() };
//!
//! let classic = to_string_with_options(&value, EncodeOptions::new()).unwrap();
//! assert_eq!(classic, "inner: Inner:{a: 1\n}\nnote: \"x\ny\"\n");
//!
//! let exact = to_string_with_options(&value, EncodeOptions::round_trip()).unwrap();
//! assert_eq!(exact, "inner: {a: 1\n}\nnote: \"x\\ny\"\n");
//! ```

/// Encoder configuration.
///
/// # Examples
///
/// ```rust
/// use serde_rj::EncodeOptions;
///
/// let options = EncodeOptions::new().with_type_names(false);
/// assert!(!options.type_names);
/// assert!(!options.escape_strings);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Frame records nested inside a value as `TypeName:{ ... }` instead of `{ ... }`.
    pub type_names: bool,
    /// Re-apply escapes to quoted strings.
    pub escape_strings: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions {
            type_names: true,
            escape_strings: false,
        }
    }
}

impl EncodeOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options whose output always parses back into the encoded value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_rj::EncodeOptions;
    ///
    /// let options = EncodeOptions::round_trip();
    /// assert!(!options.type_names);
    /// assert!(options.escape_strings);
    /// ```
    #[must_use]
    pub fn round_trip() -> Self {
        Self::new().with_type_names(false).with_escape_strings(true)
    }

    #[must_use]
    pub fn with_type_names(mut self, type_names: bool) -> Self {
        self.type_names = type_names;
        self
    }

    /// Escapes `"`, `\`, the named control characters and any other control
    /// character (as `\uXXXX`) when writing quoted strings.
    #[must_use]
    pub fn with_escape_strings(mut self, escape_strings: bool) -> Self {
        self.escape_strings = escape_strings;
        self
    }
}
