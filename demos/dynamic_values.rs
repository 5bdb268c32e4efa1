//! Walking a parsed tree without a schema.
//!
//! Run with: cargo run --example dynamic_values

use serde::Deserialize;
use serde_rj::{parse_str, rj_node, to_string, Value};
use std::error::Error;

#[derive(Debug, Deserialize)]
struct Member {
    name: String,
    roles: Vec<String>,
}

const DOCUMENT: &str = r#"
title: "team"
founded: 2019-09-09
budget: 1250.5
flags: [true, false, true]
limits: {cpu: 4, memory: 2048}
broken: [1, "two"]

[Members]
- name: "anna"
roles: ["admin", "dev"]
- name: "bert"
roles: ["dev"]
"#;

fn main() -> Result<(), Box<dyn Error>> {
    // Parsing always yields a tree; problems are reported alongside it
    let (doc, err) = parse_str(DOCUMENT);
    if let Some(err) = err {
        println!("Recovered from: {}\n", err);
    }

    println!("title:   {}", doc.get_string("title"));
    println!("founded: {}", doc.get_datetime("founded"));
    println!("budget:  {}", doc.get_float("budget"));
    println!("cpu:     {}", doc.get_int("limits.cpu"));
    println!("timeout: {}", doc.get_int_or("limits.timeout", 30));
    println!("flags:   {:?}\n", doc.get_bool_array("flags"));

    for (key, value) in &doc {
        println!("  {:<8} {}", key, value.kind());
    }
    println!();

    let members: Vec<Member> = doc.get_record_list("Members")?;
    for member in &members {
        println!("{} -> {}", member.name, member.roles.join(", "));
    }
    println!();

    // Type errors surface only through the _or_error accessors
    match doc.get_int_or_error("title") {
        Ok(_) => unreachable!(),
        Err(e) => println!("get_int_or_error(\"title\"): {}\n", e),
    }

    // Build a tree in code and encode it
    let mut tree = rj_node! {
        "host": "localhost",
        "port": 8080,
        "features": ["auth", "logging"],
    };
    tree.insert("debug", Value::Boolean(true));

    println!("Built tree:\n{}", to_string(&tree)?);

    Ok(())
}
