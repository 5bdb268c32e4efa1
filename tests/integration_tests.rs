use chrono::{DateTime, FixedOffset, TimeZone};
use serde::{Deserialize, Serialize};
use serde_rj::{
    from_reader, from_str, marshal, parse_str, to_string, to_string_with_options, to_writer,
    unmarshal, EncodeOptions, Error, Node,
};
use std::collections::BTreeMap;
use std::io::Cursor;

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct User {
    id: u32,
    name: String,
    active: bool,
    tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Product {
    sku: String,
    price: f64,
    quantity: u32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Order {
    order_id: u32,
    customer: User,
    items: Vec<Product>,
    total: f64,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Default)]
struct Person {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Age")]
    age: i64,
}

fn sample_order() -> Order {
    Order {
        order_id: 12345,
        customer: User {
            id: 123,
            name: "Alice".to_string(),
            active: true,
            tags: vec!["vip".to_string()],
        },
        items: vec![
            Product {
                sku: "WIDGET-001".to_string(),
                price: 29.99,
                quantity: 2,
            },
            Product {
                sku: "GADGET-002".to_string(),
                price: 49.99,
                quantity: 1,
            },
        ],
        total: 109.97,
    }
}

#[test]
fn test_simple_struct() {
    let user = User {
        id: 123,
        name: "Alice".to_string(),
        active: true,
        tags: vec!["admin".to_string(), "developer".to_string()],
    };

    let rj = to_string(&user).unwrap();
    assert_eq!(
        rj,
        "id: 123\nname: \"Alice\"\nactive: true\ntags: [\"admin\",\"developer\"]\n"
    );

    let user_back: User = from_str(&rj).unwrap();
    assert_eq!(user, user_back);
}

#[test]
fn test_name_age_round_trip_keeps_field_order() {
    let person = Person {
        name: "abc".to_string(),
        age: 12,
    };

    let bytes = marshal(&person).unwrap();
    assert_eq!(bytes, b"Name: \"abc\"\nAge: 12\n");

    let mut back = Person::default();
    unmarshal(&bytes, &mut back).unwrap();
    assert_eq!(back, person);
}

#[test]
fn test_nested_struct_classic_framing() {
    let rj = to_string(&sample_order()).unwrap();
    assert!(rj.starts_with("order_id: 12345\ncustomer: User:{id: 123\n"));
    assert!(rj.contains("items: [Product:{sku: \"WIDGET-001\"\nprice: 29.99\nquantity: 2\n},"));
    assert!(rj.ends_with("total: 109.97\n"));
}

#[test]
fn test_nested_struct_round_trip() {
    let order = sample_order();

    let rj = to_string_with_options(&order, EncodeOptions::round_trip()).unwrap();
    let order_back: Order = from_str(&rj).unwrap();
    assert_eq!(order, order_back);
}

#[test]
fn test_sections_decode_into_records() {
    #[derive(Deserialize, Debug, PartialEq)]
    struct Server {
        host: String,
        port: u16,
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Config {
        name: String,
        server: Server,
        users: Vec<Person>,
    }

    let doc = r#"
# service config
name: "api"

[Server]
host: "localhost"
port: 8080

[Users]
-
Name: "anna"
Age: 30
- Name: "bert"
Age: 41
"#;

    let config: Config = from_str(doc).unwrap();
    assert_eq!(config.name, "api");
    assert_eq!(
        config.server,
        Server {
            host: "localhost".to_string(),
            port: 8080
        }
    );
    assert_eq!(config.users.len(), 2);
    assert_eq!(config.users[1].name, "bert");
    assert_eq!(config.users[1].age, 41);
}

#[test]
fn test_unknown_keys_are_ignored() {
    let person: Person = from_str("Name: \"x\"\nHeight: 180\nAge: 3\n").unwrap();
    assert_eq!(
        person,
        Person {
            name: "x".to_string(),
            age: 3
        }
    );
}

#[test]
fn test_missing_and_null_optionals() {
    #[derive(Deserialize, Debug, PartialEq)]
    struct Settings {
        level: Option<i32>,
        label: Option<String>,
        #[serde(default)]
        retries: u8,
    }

    let settings: Settings = from_str("level: null\n").unwrap();
    assert_eq!(
        settings,
        Settings {
            level: None,
            label: None,
            retries: 0
        }
    );

    let settings: Settings = from_str("level: 4\nlabel: `raw`\nretries: 2\n").unwrap();
    assert_eq!(settings.level, Some(4));
    assert_eq!(settings.label.as_deref(), Some("raw"));
    assert_eq!(settings.retries, 2);
}

#[test]
fn test_decode_errors() {
    let err = from_str::<Person>("Name: 12\n").unwrap_err();
    assert_eq!(err, Error::type_mismatch("string", "integer"));

    #[derive(Deserialize, Debug)]
    #[allow(dead_code)]
    struct Small {
        n: u8,
    }
    assert_eq!(from_str::<Small>("n: 300\n").unwrap_err(), Error::NotAssignable);

    let err = from_str::<Person>("Name: \"x\"\nAge: nope\n").unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}

#[test]
fn test_unmarshal_leaves_target_on_error() {
    let mut person = Person {
        name: "keep".to_string(),
        age: 1,
    };
    assert!(unmarshal(b"Name: \"x\"\nAge: \"y\"\n", &mut person).is_err());
    assert_eq!(person.name, "keep");
}

#[test]
fn test_enums() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    enum Shape {
        Empty,
        Circle(f64),
        Pair(i32, i32),
        Rect { w: u32, h: u32 },
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Drawing {
        shapes: Vec<Shape>,
        main: Shape,
    }

    let drawing = Drawing {
        shapes: vec![
            Shape::Empty,
            Shape::Circle(1.5),
            Shape::Pair(1, 2),
            Shape::Rect { w: 3, h: 4 },
        ],
        main: Shape::Rect { w: 1, h: 2 },
    };

    let rj = to_string_with_options(&drawing, EncodeOptions::round_trip()).unwrap();
    assert_eq!(
        rj,
        "shapes: [\"Empty\",{Circle: 1.5},{Pair: [1,2]},{Rect: {w: 3\nh: 4\n}}]\nmain: {Rect: {w: 1\nh: 2\n}}\n"
    );
}

#[test]
fn test_enum_fields_decode() {
    #[derive(Deserialize, Debug, PartialEq)]
    enum Mode {
        Fast,
        Limited(u32),
    }

    #[derive(Deserialize, Debug, PartialEq)]
    struct Job {
        first: Mode,
        second: Mode,
    }

    let job: Job = from_str("first: \"Fast\"\nsecond: {Limited: 10}\n").unwrap();
    assert_eq!(
        job,
        Job {
            first: Mode::Fast,
            second: Mode::Limited(10)
        }
    );
}

#[test]
fn test_datetime_fields() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Event {
        #[serde(with = "serde_rj::datetime")]
        at: DateTime<FixedOffset>,
        quoted: DateTime<FixedOffset>,
    }

    let offset = FixedOffset::east_opt(8 * 3600).unwrap();
    let at = offset.with_ymd_and_hms(2019, 9, 9, 13, 54, 46).unwrap();
    let event = Event { at, quoted: at };

    let rj = to_string(&event).unwrap();
    assert_eq!(
        rj,
        "at: 2019-09-09T13:54:46+08:00\nquoted: \"2019-09-09T13:54:46+08:00\"\n"
    );

    let back: Event = from_str(&rj).unwrap();
    assert_eq!(back, event);

    let (doc, err) = parse_str(&rj);
    assert!(err.is_none());
    assert_eq!(doc.get_datetime("at"), at);
    assert_eq!(doc.get_string("quoted"), "2019-09-09T13:54:46+08:00");
}

#[test]
fn test_map_round_trip() {
    let mut limits = BTreeMap::new();
    limits.insert("cpu".to_string(), 2);
    limits.insert("memory".to_string(), 512);

    let rj = to_string(&limits).unwrap();
    assert_eq!(rj, "cpu: 2\nmemory: 512\n");

    let back: BTreeMap<String, i32> = from_str(&rj).unwrap();
    assert_eq!(back, limits);
}

#[test]
fn test_map_key_without_name() {
    let mut bad = BTreeMap::new();
    bad.insert("has space".to_string(), 1);
    assert_eq!(to_string(&bad), Err(Error::NoName));
}

#[test]
fn test_escaped_strings_round_trip() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Note {
        text: String,
    }

    let note = Note {
        text: "line \"one\"\n\tline two \\ 汉字 \u{1}".to_string(),
    };

    let classic = to_string(&note).unwrap();
    assert_eq!(classic, format!("text: \"{}\"\n", note.text));

    let rj = to_string_with_options(&note, EncodeOptions::round_trip()).unwrap();
    assert_eq!(
        rj,
        "text: \"line \\\"one\\\"\\n\\tline two \\\\ 汉字 \\u0001\"\n"
    );
    let back: Note = from_str(&rj).unwrap();
    assert_eq!(back, note);
}

#[test]
fn test_non_finite_float() {
    #[derive(Serialize)]
    struct Ratio {
        value: f64,
    }

    assert!(matches!(
        to_string(&Ratio { value: f64::NAN }),
        Err(Error::Custom(_))
    ));
}

#[test]
fn test_tree_round_trip() {
    let doc = r#"
title: "demo"
ratio: 0.25
flags: [true, false]
when: 2019-10-11T12:03:04Z
limits: {cpu: 2, memory: 512}

[Users]
- name: "anna"
- name: "bert"
"#;

    let (tree, err) = parse_str(doc);
    assert!(err.is_none(), "{:?}", err);

    let text = to_string(&tree).unwrap();
    let (again, err) = parse_str(&text);
    assert!(err.is_none(), "{:?}\n{}", err, text);
    assert_eq!(again, tree);
}

#[test]
fn test_writer_and_reader() {
    let person = Person {
        name: "io".to_string(),
        age: 7,
    };

    let mut buffer = Vec::new();
    to_writer(&mut buffer, &person).unwrap();

    let back: Person = from_reader(Cursor::new(buffer)).unwrap();
    assert_eq!(back, person);
}

#[test]
fn test_records_from_tree() {
    let (doc, _) = parse_str("[Users]\n- Name: \"a\"\nAge: 1\n- Name: \"b\"\nAge: 2\n");
    let people: Vec<Person> = doc.get_record_list("Users").unwrap();
    assert_eq!(people.len(), 2);
    assert_eq!(people[0].age, 1);

    let node = Node::new();
    assert_eq!(node.get_record::<Person>("missing"), Err(Error::ValueNotFound));
}
