//! RJ Document Grammar
//!
//! This module documents the RJ document language as implemented by this library.
//!
//! # Overview
//!
//! An RJ document is a sequence of `name: value` pairs, one per line, optionally
//! followed by `[Section]` blocks. It reads like an INI file but carries typed
//! values, homogeneous arrays and nested objects.
//!
//! # Lines
//!
//! - Spaces and tabs are insignificant between tokens.
//! - A line ends at `\n` or `\r\n`.
//! - `#` and `//` start a comment that runs to the end of the line. Comments may
//!   follow a value or stand on their own line.
//!
//! ```text
//! # a comment
//! port: 8080   // trailing comment
//! ```
//!
//! # Pairs
//!
//! A pair is a name, optional spaces, a `:`, optional spaces and a value. The name
//! runs to the first space, `:` or `]`; it may contain any other characters,
//! including `.`, but then it cannot be reached through a dotted path.
//!
//! A later pair with the same name replaces the earlier value and keeps the first
//! position.
//!
//! # Values
//!
//! | Kind | Syntax | Example |
//! |------|--------|---------|
//! | Null | `null` | `value: null` |
//! | Boolean | `true` or `false` | `active: true` |
//! | Integer | optional sign and decimal digits, fits in `i64` | `count: -42` |
//! | Float | anything `f64` accepts that is only digits, signs, `.` and `e` | `ratio: 1.5e3` |
//! | Datetime | see below | `at: 2019-10-11T12:03:04Z` |
//! | String | `"quoted"` or `` `raw` `` | `name: "Alice"` |
//! | Array | `[a, b, ...]` of a single kind | `ports: [80, 443]` |
//! | Object | `{name: value, ...}` | `limits: {cpu: 2, memory: 512}` |
//!
//! ## Strings
//!
//! Quoted strings stay on one line and understand these escapes:
//!
//! | Escape | Meaning |
//! |--------|---------|
//! | `\"` `\\` `\/` `\'` | the character itself |
//! | `\b` `\f` `\n` `\r` `\t` | backspace, form feed, newline, carriage return, tab |
//! | `\uXXXX` | the code point with exactly four hex digits |
//!
//! Raw strings between backticks keep every byte literally, including line breaks,
//! and have no escapes.
//!
//! ```text
//! greeting: "汉 and \"quotes\""
//! query: `SELECT *
//! FROM users`
//! ```
//!
//! ## Numbers and Datetimes
//!
//! A value starting with a digit, `+` or `-` runs to the line end, a comment, `,`,
//! `]` or `}`. The token is tried as an integer, then as a float, then against the
//! datetime layouts:
//!
//! | Layout | Example | Zone |
//! |--------|---------|------|
//! | Date | `2019-10-11` | UTC midnight |
//! | Date and time | `2019-10-11 12:03:04` | UTC |
//! | Time | `12:03:04.5` | UTC, on 0000-01-01 |
//! | RFC 3339 | `2019-10-11T12:03:04.5+08:00` | as written, `Z` or an offset required |
//!
//! A token matching none of these is an invalid time value.
//!
//! ## Arrays
//!
//! Elements are separated by `,` and may spread over several lines. The first
//! element fixes the element kind and every other element must match it. Arrays of
//! objects hold nodes:
//!
//! ```text
//! ids: [1, 2, 3]
//! users: [
//!     {name: "anna"},
//!     {name: "bert"}
//! ]
//! ```
//!
//! A trailing comma before `]` is an invalid array.
//!
//! # Sections
//!
//! A line starting with `[` opens a section. Its body starts at the first pair line
//! after the header (comments and blank lines in between are skipped) and runs up to
//! a blank line (or a comment-only line) or the next `[` header:
//!
//! ```text
//! [Server]
//! host: "localhost"
//! port: 8080
//! ```
//!
//! When the first body line starts with `-`, the section is a list of nodes. Every
//! `-` starts a new node, and a pair may follow it on the same line:
//!
//! ```text
//! [Users]
//! - name: "anna"
//! age: 30
//! -
//! name: "bert"
//! ```
//!
//! # Error Recovery
//!
//! The scanner never stops at the first error. A malformed pair is reported with
//! its line and name and skipped through the end of its line; a malformed pair
//! inside an object skips to the end of the line or the closing `}`; a malformed
//! array skips past its closing `]`. Everything else still lands in the tree:
//!
//! ```rust
//! use serde_rj::parse_str;
//!
//! let (doc, err) = parse_str("a: tru\nb: [1, \"x\"]\nc: 3\n");
//! assert_eq!(doc.get_int("c"), 3);
//! assert!(!doc.contains_key("a"));
//! assert!(!doc.contains_key("b"));
//! assert_eq!(
//!     err.unwrap().to_string(),
//!     "line 1: invalid bool value, name: a;line 2: invalid array, name: b"
//! );
//! ```
//!
//! # Encoding
//!
//! The encoder writes a record as one `name: value` line per field. Nested records
//! and maps become objects, framed as `TypeName:{...}` unless
//! [`EncodeOptions::type_names`](crate::EncodeOptions::type_names) is off.
//! Sequences become arrays, `None` becomes `null`, unit enum variants become
//! strings and other variants become single-entry objects.
//!
//! By default strings are written between quotes without escaping. Use
//! [`EncodeOptions::round_trip`](crate::EncodeOptions::round_trip) for output that
//! always parses back.
//!
//! # Decoding
//!
//! Record fields are looked up by exact name first, then with the first letter
//! upper-cased, then lower-cased, so `name` in Rust matches `Name:` in a document.
//! Integers narrow with a range check and widen to floats; `null` only fits
//! `Option` fields; anything else of the wrong kind is a type mismatch.
