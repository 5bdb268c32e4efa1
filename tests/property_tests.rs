//! Property-based tests for the round-trip law: any record built from directly
//! supported field kinds decodes back to itself after encoding.

use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_rj::parser::Scanner;
use serde_rj::{
    from_str, marshal, parse, parse_str, to_string, to_string_with_options, unmarshal, EncodeOptions,
    Error,
};

fn roundtrip<T>(value: &T, options: EncodeOptions) -> bool
where
    T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug,
{
    match to_string_with_options(value, options) {
        Ok(serialized) => match from_str::<T>(&serialized) {
            Ok(deserialized) => *value == deserialized,
            Err(e) => {
                eprintln!("Deserialize failed: {}", e);
                eprintln!("Serialized was: {}", serialized);
                false
            }
        },
        Err(e) => {
            eprintln!("Serialize failed: {}", e);
            false
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Default)]
struct Person {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Age")]
    age: i64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Scalars {
    small: i32,
    unsigned: u32,
    big: i64,
    flag: bool,
    ratio: f64,
    label: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Arrays {
    ints: Vec<i64>,
    flags: Vec<bool>,
    words: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Inner {
    id: i64,
    text: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Outer {
    inner: Inner,
    list: Vec<Inner>,
}

/// Text the default encoder writes verbatim without breaking the quotes.
fn plain_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _.,:;!?汉字é-]{0,24}"
}

fn inner() -> impl Strategy<Value = Inner> {
    (any::<i64>(), any::<String>()).prop_map(|(id, text)| Inner { id, text })
}

proptest! {
    #[test]
    fn prop_name_age(name in plain_text(), age in any::<i64>()) {
        let person = Person { name, age };

        let bytes = marshal(&person).unwrap();
        let expected = format!("Name: \"{}\"\nAge: {}\n", person.name, person.age);
        prop_assert_eq!(&bytes, expected.as_bytes());

        let mut back = Person::default();
        unmarshal(&bytes, &mut back).unwrap();
        prop_assert_eq!(back, person);
    }

    #[test]
    fn prop_scalars(
        small in any::<i32>(),
        unsigned in any::<u32>(),
        big in any::<i64>(),
        flag in any::<bool>(),
        ratio in any::<f64>().prop_filter("finite", |f| f.is_finite()),
        label in proptest::option::of(plain_text()),
    ) {
        let value = Scalars { small, unsigned, big, flag, ratio, label };
        prop_assert!(roundtrip(&value, EncodeOptions::default()));
    }

    #[test]
    fn prop_arrays(
        ints in prop::collection::vec(any::<i64>(), 0..20),
        flags in prop::collection::vec(any::<bool>(), 0..20),
        words in prop::collection::vec(plain_text(), 0..10),
    ) {
        let value = Arrays { ints, flags, words };
        prop_assert!(roundtrip(&value, EncodeOptions::default()));
    }

    #[test]
    fn prop_any_string_with_escaping(text in any::<String>()) {
        let value = Inner { id: 0, text };
        prop_assert!(roundtrip(&value, EncodeOptions::round_trip()));
    }

    #[test]
    fn prop_nested_records(head in inner(), list in prop::collection::vec(inner(), 1..5)) {
        let value = Outer { inner: head, list };
        prop_assert!(roundtrip(&value, EncodeOptions::round_trip()));
    }

    #[test]
    fn prop_scanner_never_panics(input in any::<Vec<u8>>()) {
        let text = String::from_utf8_lossy(&input);
        let (_, diagnostics) = Scanner::new(text.as_bytes()).scan();
        prop_assert!(diagnostics.iter().all(|d| d.line >= 1));

        let (_, err) = parse(&input);
        prop_assert!(!matches!(err, Some(Error::ParseFailed)));
    }

    #[test]
    fn prop_encoded_tree_reparses(name in plain_text(), n in any::<i64>()) {
        let (doc, err) = parse_str(&format!("name: \"{}\"\n[S]\nn: {}\n", name, n));
        prop_assert!(err.is_none());

        let text = to_string(&doc).unwrap();
        let (again, err) = parse_str(&text);
        prop_assert!(err.is_none());
        prop_assert_eq!(again, doc);
    }
}
