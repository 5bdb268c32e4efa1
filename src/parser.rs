//! The single-pass scanner that turns document bytes into a [`Node`] tree.
//!
//! The scanner never gives up on a document. A malformed construct is recorded as a
//! [`Diagnostic`] and scanning resumes at the next line (or, inside nested objects and
//! arrays, at the next `}` or `]`), so everything that could be recognized ends up in
//! the returned tree.
//!
//! ```rust
//! use serde_rj::parser::Scanner;
//!
//! let (node, diagnostics) = Scanner::new(b"a: 1\nb: tru\nc: [1, 2]\n").scan();
//! assert_eq!(node.get_int("a"), 1);
//! assert_eq!(node.get_int_array("c"), [1, 2]);
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].to_string(), "line 2: invalid bool value, name: b");
//! ```

use crate::error::Diagnostic;
use crate::lex::{decode_utf8_char, is_comment, is_line_end, is_space, parse_datetime, unescape_u4};
use crate::{Error, Node, Result, Value};
use tracing::{debug, trace};

/// Scanner state over one in-memory document.
pub struct Scanner<'a> {
    data: &'a [u8],
    pos: usize,
    line: usize,
    line_pos: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Scanner<'a> {
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Scanner {
            data,
            pos: 0,
            line: 1,
            line_pos: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Scans the whole document.
    ///
    /// Returns the root node and every problem recovered from, in document order.
    #[must_use]
    pub fn scan(mut self) -> (Node, Vec<Diagnostic>) {
        let mut root = Node::new();

        // The last byte is never dispatched on its own.
        while self.pos + 1 < self.data.len() {
            self.skip_insignificant();
            match self.peek() {
                None => break,
                Some(b'[') => self.scan_section(&mut root),
                Some(_) => {
                    self.scan_pair(&mut root);
                    self.skip_line();
                }
            }
        }

        (root, self.diagnostics)
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    #[inline]
    fn at_comment(&self) -> bool {
        match self.peek() {
            Some(c) => is_comment(c, self.data.get(self.pos + 1).copied()),
            None => false,
        }
    }

    /// One-based line number of the current position.
    ///
    /// Counts forward from the last position asked about; `pos` never moves back.
    fn line(&mut self) -> usize {
        let end = self.pos.min(self.data.len());
        if end > self.line_pos {
            self.line += self.data[self.line_pos..end]
                .iter()
                .filter(|&&c| c == b'\n')
                .count();
            self.line_pos = end;
        }
        self.line
    }

    fn record(&mut self, line: usize, name: Option<&str>, error: Error) {
        debug!(line, name, %error, "recovered from malformed construct");
        let mut diagnostic = Diagnostic::new(line, error);
        if let Some(name) = name {
            diagnostic = diagnostic.with_name(name);
        }
        self.diagnostics.push(diagnostic);
    }

    fn skip_spaces(&mut self) {
        while self.peek().map_or(false, is_space) {
            self.pos += 1;
        }
    }

    fn skip_until(&mut self, stop: impl Fn(u8) -> bool) {
        while self.peek().map_or(false, |c| !stop(c)) {
            self.pos += 1;
        }
    }

    /// Moves past the next line terminator, or to the end of input.
    fn skip_line(&mut self) {
        self.skip_until(is_line_end);
        if self.peek() == Some(b'\r') {
            self.pos += 1;
        }
        if self.peek() == Some(b'\n') {
            self.pos += 1;
        }
    }

    /// Skips spaces, comments and line terminators.
    fn skip_insignificant(&mut self) {
        loop {
            self.skip_spaces();
            if self.at_comment() {
                self.skip_line();
            } else if self.peek().map_or(false, is_line_end) {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Whether the rest of the current line holds only spaces and a comment.
    fn at_blank_line(&self) -> bool {
        let mut pos = self.pos;
        while self.data.get(pos).copied().map_or(false, is_space) {
            pos += 1;
        }
        match self.data.get(pos).copied() {
            None => true,
            Some(c) => is_line_end(c) || is_comment(c, self.data.get(pos + 1).copied()),
        }
    }

    /// Scans `name: value` into `node`. Returns `false` when a diagnostic was recorded.
    fn scan_pair(&mut self, node: &mut Node) -> bool {
        let line = self.line();
        let name = match self.scan_name() {
            Ok(name) => name,
            Err(error) => {
                self.record(line, None, error);
                return false;
            }
        };
        trace!(line, name = name.as_str(), "pair");

        match self.scan_value() {
            Ok(value) => {
                node.insert(name, value);
                true
            }
            Err(error) => {
                self.record(line, Some(name.as_str()), error);
                false
            }
        }
    }

    /// Reads a pair name and its `:`, leaving the position at the value.
    fn scan_name(&mut self) -> Result<String> {
        let start = self.pos;
        self.skip_until(|c| is_space(c) || is_line_end(c) || c == b':' || c == b']');
        let name = &self.data[start..self.pos];

        self.skip_spaces();
        if name.is_empty() || self.peek() != Some(b':') {
            return Err(Error::InvalidName);
        }
        self.pos += 1;
        self.skip_spaces();

        std::str::from_utf8(name)
            .map(str::to_string)
            .map_err(|_| Error::InvalidName)
    }

    fn scan_value(&mut self) -> Result<Value> {
        match self.peek() {
            Some(b'"') => self.scan_quoted().map(Value::String),
            Some(b'`') => self.scan_raw().map(Value::String),
            Some(b'0'..=b'9' | b'+' | b'-') => self.scan_number(),
            Some(b't' | b'f') => match self.scan_word() {
                b"true" => Ok(Value::Boolean(true)),
                b"false" => Ok(Value::Boolean(false)),
                _ => Err(Error::InvalidBoolValue),
            },
            Some(b'n') => match self.scan_word() {
                b"null" => Ok(Value::Null),
                _ => Err(Error::InvalidNullValue),
            },
            Some(b'[') => self.scan_array(),
            Some(b'{') => self.scan_object().map(Value::Node),
            _ => Err(Error::InvalidValue),
        }
    }

    fn scan_quoted(&mut self) -> Result<String> {
        self.pos += 1;
        let mut out = String::new();

        loop {
            let c = self.peek().ok_or(Error::InvalidStringValue)?;
            match c {
                b'"' => {
                    self.pos += 1;
                    return Ok(out);
                }
                b'\\' => {
                    self.pos += 1;
                    out.push(self.scan_escape()?);
                }
                c if is_line_end(c) => return Err(Error::InvalidStringValue),
                c if c.is_ascii() => {
                    out.push(char::from(c));
                    self.pos += 1;
                }
                _ => {
                    let (ch, width) = decode_utf8_char(&self.data[self.pos..])
                        .ok_or(Error::InvalidUtf8StringValue)?;
                    out.push(ch);
                    self.pos += width;
                }
            }
        }
    }

    fn scan_escape(&mut self) -> Result<char> {
        let c = self.peek().ok_or(Error::InvalidEscape)?;
        self.pos += 1;

        let ch = match c {
            b'"' | b'\\' | b'/' | b'\'' => char::from(c),
            b'b' => '\u{8}',
            b'f' => '\u{c}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => {
                let end = (self.pos + 4).min(self.data.len());
                let ch = unescape_u4(&self.data[self.pos..end])?;
                self.pos = end;
                ch
            }
            _ => return Err(Error::InvalidEscape),
        };
        Ok(ch)
    }

    fn scan_raw(&mut self) -> Result<String> {
        self.pos += 1;
        let start = self.pos;
        self.skip_until(|c| c == b'`');
        if self.peek().is_none() {
            return Err(Error::InvalidStringValue);
        }
        let body = &self.data[start..self.pos];
        self.pos += 1;

        std::str::from_utf8(body)
            .map(str::to_string)
            .map_err(|_| Error::InvalidUtf8StringValue)
    }

    /// Integer, then float, then the datetime layouts.
    fn scan_number(&mut self) -> Result<Value> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_line_end(c) || matches!(c, b',' | b']' | b'}') || self.at_comment() {
                break;
            }
            self.pos += 1;
        }

        let raw = std::str::from_utf8(&self.data[start..self.pos])
            .map_err(|_| Error::InvalidValue)?
            .trim_end();

        if let Ok(i) = raw.parse::<i64>() {
            return Ok(Value::Integer(i));
        }
        let numeric = raw
            .bytes()
            .all(|c| c.is_ascii_digit() || matches!(c, b'+' | b'-' | b'.' | b'e' | b'E'));
        if numeric {
            if let Ok(f) = raw.parse::<f64>() {
                return Ok(Value::Float(f));
            }
        }
        parse_datetime(raw).map(Value::Datetime)
    }

    /// Reads a bare identifier for the keyword literals.
    fn scan_word(&mut self) -> &'a [u8] {
        let start = self.pos;
        self.skip_until(|c| !(c.is_ascii_alphanumeric() || c == b'_'));
        &self.data[start..self.pos]
    }

    /// The first element fixes the element kind; a later element of another kind
    /// fails the whole array.
    fn scan_array(&mut self) -> Result<Value> {
        match self.scan_array_elements() {
            Ok(elements) => Value::try_from(elements),
            Err(error) => {
                self.skip_until(|c| c == b']');
                if self.peek().is_some() {
                    self.pos += 1;
                }
                Err(error)
            }
        }
    }

    /// Reads elements through the closing `]`.
    fn scan_array_elements(&mut self) -> Result<Vec<Value>> {
        self.pos += 1;
        let mut elements = Vec::new();

        self.skip_insignificant();
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Ok(elements);
        }

        loop {
            elements.push(self.scan_value()?);

            self.skip_insignificant();
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    self.skip_insignificant();
                    if self.peek() == Some(b']') {
                        return Err(Error::InvalidArray);
                    }
                }
                Some(b']') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(Error::InvalidArray),
            }
        }

        Ok(elements)
    }

    fn scan_object(&mut self) -> Result<Node> {
        let line = self.line();
        trace!(line, "nested object");
        self.pos += 1;
        let mut node = Node::new();

        loop {
            self.skip_insignificant();
            match self.peek() {
                None => return Err(Error::InvalidObject),
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(node);
                }
                Some(b',') => self.pos += 1,
                Some(_) => {
                    if !self.scan_pair(&mut node) {
                        self.skip_until(|c| is_line_end(c) || c == b'}');
                    }
                }
            }
        }
    }

    /// Reads `Name]` after the opening bracket.
    fn scan_section_name(&mut self) -> Result<String> {
        let start = self.pos;
        self.skip_until(|c| is_space(c) || is_line_end(c) || c == b']');
        let name = &self.data[start..self.pos];

        self.skip_spaces();
        if name.is_empty() || self.peek() != Some(b']') {
            return Err(Error::InvalidNodeName);
        }
        self.pos += 1;

        std::str::from_utf8(name)
            .map(str::to_string)
            .map_err(|_| Error::InvalidNodeName)
    }

    fn scan_section(&mut self, root: &mut Node) {
        let line = self.line();
        self.pos += 1;

        let name = match self.scan_section_name() {
            Ok(name) => name,
            Err(error) => {
                self.record(line, None, error);
                self.skip_line();
                return;
            }
        };
        // The body starts at the first significant line after the header.
        self.skip_line();
        self.skip_insignificant();

        if self.peek() == Some(b'-') {
            trace!(line, name = name.as_str(), "section list");
            let list = self.scan_section_list();
            root.insert(name, Value::NodeList(list));
        } else {
            trace!(line, name = name.as_str(), "section");
            let mut node = Node::new();
            self.scan_section_body(|scanner| {
                scanner.scan_pair(&mut node);
            });
            root.insert(name, node);
        }
    }

    fn scan_section_list(&mut self) -> Vec<Node> {
        let mut list: Vec<Node> = Vec::new();

        self.scan_section_body(|scanner| {
            if scanner.peek() == Some(b'-') {
                scanner.pos += 1;
                scanner.skip_spaces();
                list.push(Node::new());
                if scanner.at_blank_line() {
                    return;
                }
            }
            match list.last_mut() {
                Some(current) => {
                    scanner.scan_pair(current);
                }
                None => {
                    let line = scanner.line();
                    scanner.record(line, None, Error::InvalidNodeName);
                }
            }
        });

        list
    }

    /// Feeds each body line to `line_fn` until a blank line, which is consumed, or
    /// the next section header, which is not.
    fn scan_section_body(&mut self, mut line_fn: impl FnMut(&mut Self)) {
        loop {
            if self.at_blank_line() {
                self.skip_line();
                return;
            }
            self.skip_spaces();
            if self.peek() == Some(b'[') {
                return;
            }
            line_fn(self);
            self.skip_line();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(text: &str) -> (Node, Vec<Diagnostic>) {
        Scanner::new(text.as_bytes()).scan()
    }

    fn errors(diagnostics: &[Diagnostic]) -> Vec<Error> {
        diagnostics.iter().map(|d| d.error.clone()).collect()
    }

    #[test]
    fn test_scalars() {
        let (node, diagnostics) = scan(
            "s: \"hi\"\ni: -42\nf: 1.5e3\nb: false\nn: null\nd: 2018-08-08\nr: `a\\b`\n",
        );
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        assert_eq!(node.get_string("s"), "hi");
        assert_eq!(node.get_int("i"), -42);
        assert_eq!(node.get_float("f"), 1500.0);
        assert!(!node.get_bool_or("b", true));
        assert_eq!(node.get("n"), Ok(&Value::Null));
        assert!(node.get_datetime_or_error("d").is_ok());
        assert_eq!(node.get_string("r"), "a\\b");
    }

    #[test]
    fn test_escapes() {
        let (node, diagnostics) = scan(r#"s: "q\" b\\ s\/ a\' \b\f\n\r\t \u6C49""#);
        assert!(diagnostics.is_empty());
        assert_eq!(node.get_string("s"), "q\" b\\ s/ a' \u{8}\u{c}\n\r\t 汉");
    }

    #[test]
    fn test_string_errors() {
        let (_, diagnostics) = scan("a: \"x\\q\"\nb: \"open\nc: \"\\u12\"\nd: `raw\n");
        assert_eq!(
            errors(&diagnostics),
            vec![
                Error::InvalidEscape,
                Error::InvalidStringValue,
                Error::InvalidUtf8StringValue,
                Error::InvalidStringValue,
            ]
        );
        assert_eq!(diagnostics[1].line, 2);
        assert_eq!(diagnostics[1].name.as_deref(), Some("b"));
    }

    #[test]
    fn test_invalid_utf8_in_string() {
        let (_, diagnostics) = Scanner::new(b"a: \"\xE6\xB1\"\n").scan();
        assert_eq!(errors(&diagnostics), vec![Error::InvalidUtf8StringValue]);
    }

    #[test]
    fn test_keyword_errors() {
        let (node, diagnostics) = scan("a: trueish\nb: nil\nc: ?\nd: 12-34\nok: true\n");
        assert_eq!(
            errors(&diagnostics),
            vec![
                Error::InvalidBoolValue,
                Error::InvalidNullValue,
                Error::InvalidValue,
                Error::InvalidTimeValue,
            ]
        );
        assert!(node.get_bool("ok"));
        assert_eq!(node.len(), 1);
    }

    #[test]
    fn test_invalid_names() {
        let (node, diagnostics) = scan("novalue\n: 1\nkey 1\nx: 2\n");
        assert_eq!(
            errors(&diagnostics),
            vec![Error::InvalidName, Error::InvalidName, Error::InvalidName]
        );
        assert_eq!(node.get_int("x"), 2);
    }

    #[test]
    fn test_comments_everywhere() {
        let text = "# heading\n// another\na: 1 # trailing\nb: [1, # one\n 2] // two\n";
        let (node, diagnostics) = scan(text);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        assert_eq!(node.get_int("a"), 1);
        assert_eq!(node.get_int_array("b"), [1, 2]);
    }

    #[test]
    fn test_arrays() {
        let (node, diagnostics) = scan(
            "s: [\"a\", \"b\"]\nf: [1.5, 2.5]\nb: [true,false]\ne: []\nd: [2018-08-08, 13:54:46]\n",
        );
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        assert_eq!(node.get_string_array("s"), ["a", "b"]);
        assert_eq!(node.get_float_array("f"), [1.5, 2.5]);
        assert_eq!(node.get_bool_array("b"), [true, false]);
        assert!(node.get_int_array_or_error("e").unwrap().is_empty());
        assert_eq!(node.get_datetime_array("d").len(), 2);
    }

    #[test]
    fn test_malformed_arrays() {
        let (node, diagnostics) =
            scan("a: [1, \"x\"]\nb: [\"x\" \"y\"]\nc: [1,]\nok: 1\nd: [1, 2\ne: 5\n");
        assert_eq!(
            errors(&diagnostics),
            vec![Error::InvalidArray; 4],
            "{:?}",
            diagnostics
        );
        assert_eq!(node.len(), 1);
        assert_eq!(node.get_int("ok"), 1);
        // An unclosed array swallows the rest of the document.
        assert!(!node.contains_key("e"));
    }

    #[test]
    fn test_array_element_error_is_kept() {
        let (_, diagnostics) = scan("a: [true, fals]\n");
        assert_eq!(errors(&diagnostics), vec![Error::InvalidBoolValue]);
    }

    #[test]
    fn test_nested_objects() {
        let (node, diagnostics) = scan("o: {a: 1, b: {c: \"x\"}}\nm: {\n  k: true\n}\nafter: 1\n");
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        assert_eq!(node.get_int("o.a"), 1);
        assert_eq!(node.get_string("o.b.c"), "x");
        assert!(node.get_bool("m.k"));
        assert_eq!(node.get_int("after"), 1);
    }

    #[test]
    fn test_unclosed_object() {
        let (_, diagnostics) = scan("o: {a: 1\n");
        assert_eq!(errors(&diagnostics), vec![Error::InvalidObject]);
    }

    #[test]
    fn test_array_of_objects() {
        let (node, diagnostics) = scan("people: [{name: \"a\"}, {name: \"b\"}]\n");
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        let people = node.get_node_list("people").unwrap();
        assert_eq!(people.len(), 2);
        assert_eq!(people[1].get_string("name"), "b");
    }

    #[test]
    fn test_section() {
        let (node, diagnostics) = scan("[Server]\nhost: \"h\"\nport: 80\n\ntop: 1\n");
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        assert_eq!(node.get_int("Server.port"), 80);
        assert_eq!(node.get_int("top"), 1);
        assert!(!node.contains_key("host"));
    }

    #[test]
    fn test_section_list() {
        let text = "[Users]\n-\nname: \"a\"\nage: 1\n-\n  name: \"b\"\n- name: \"c\"\n\nx: 0\n";
        let (node, diagnostics) = scan(text);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);

        let users = node.get_node_list("Users").unwrap();
        assert_eq!(users.len(), 3);
        assert_eq!(users[0].get_int("age"), 1);
        assert_eq!(users[1].get_string("name"), "b");
        assert_eq!(users[2].get_string("name"), "c");
        assert_eq!(node.get_int("x"), 0);
    }

    #[test]
    fn test_section_ends_at_next_header() {
        let (node, diagnostics) = scan("[A]\na: 1\n[B]\nb: 2\n");
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        assert_eq!(node.get_int("A.a"), 1);
        assert_eq!(node.get_int("B.b"), 2);
    }

    #[test]
    fn test_invalid_section_name() {
        let (node, diagnostics) = scan("[Bad name]\nx: 1\n[]\n");
        assert_eq!(
            errors(&diagnostics),
            vec![Error::InvalidNodeName, Error::InvalidNodeName]
        );
        assert_eq!(node.get_int("x"), 1);
    }

    #[test]
    fn test_last_byte_is_not_dispatched() {
        let (node, diagnostics) = scan("a: 1\nb");
        assert!(diagnostics.is_empty());
        assert_eq!(node.len(), 1);

        let (node, _) = scan("a: 1");
        assert_eq!(node.get_int("a"), 1);
    }

    #[test]
    fn test_crlf_lines() {
        let (node, diagnostics) = scan("a: 1\r\n[S]\r\nb: \"x\"\r\n\r\nc: true\r\n");
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        assert_eq!(node.get_string("S.b"), "x");
        assert!(node.get_bool("c"));
    }

    #[test]
    fn test_diagnostic_lines() {
        let (_, diagnostics) = scan("a: 1\n\nb: ?\n[S]\nc: ?\n");
        let lines: Vec<_> = diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![3, 5]);
    }
    #[test]
    fn test_section_body_after_comment() {
        let (node, diagnostics) = scan("[Server]\n# server settings\nhost: \"h\"\nport: 80\n\n");
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        assert_eq!(node.get_string("Server.host"), "h");
        assert_eq!(node.get_int("Server.port"), 80);
        assert!(!node.contains_key("host"));

        let (node, _) = scan("[S] # trailing\n# c\nk: 1\n\n");
        assert_eq!(node.get_int("S.k"), 1);
        assert_eq!(node.len(), 1);
    }

    #[test]
    fn test_section_list_after_blank_line() {
        let (node, diagnostics) = scan("[L]\n\n- a: 1\n- a: 2\n\nafter: 3\n");
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        let list = node.get_node_list("L").unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].get_int("a"), 2);
        assert_eq!(node.get_int("after"), 3);
    }

    #[test]
    fn test_empty_section_before_header() {
        let (node, diagnostics) = scan("[A]\n\n[B]\nb: 1\n");
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        assert!(node.get_node("A").unwrap().is_empty());
        assert_eq!(node.get_int("B.b"), 1);
    }

    #[test]
    fn test_diagnostic_lines_after_multiline_values() {
        let text = "r: `one\ntwo\nthree`\na: ?\nb: [1,\n 2,\n \"x\"]\nc: ?\n[S]\n\n# c\nd: ?\n";
        let (node, diagnostics) = scan(text);
        assert_eq!(node.get_string("r"), "one\ntwo\nthree");
        let lines: Vec<_> = diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![4, 5, 8, 12]);
    }

    #[test]
    fn test_diagnostic_lines_in_long_document() {
        let lines = 50_000;
        let text: String = (1..=lines).map(|i| format!("k{}: ?\n", i)).collect();
        let (_, diagnostics) = scan(&text);
        assert_eq!(diagnostics.len(), lines);
        assert_eq!(diagnostics[lines - 1].line, lines);
        assert_eq!(diagnostics[lines - 1].name.as_deref(), Some("k50000"));
    }
}
