//! Decoding a config file into structs and encoding it back.
//!
//! Run with: cargo run --example simple

use serde::{Deserialize, Serialize};
use serde_rj::{from_str, to_string, to_string_with_options, EncodeOptions};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Server {
    host: String,
    port: u16,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct User {
    name: String,
    admin: bool,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Config {
    name: String,
    server: Server,
    users: Vec<User>,
}

const CONFIG: &str = r#"
# example service
Name: "inventory"

[Server]
host: "0.0.0.0"
port: 8080

[Users]
- name: "alice"
admin: true
- name: "bob"
admin: false
"#;

fn main() -> Result<(), Box<dyn Error>> {
    let config: Config = from_str(CONFIG)?;
    println!("Decoded: {:#?}\n", config);

    // The classic form frames nested records with their type name
    let classic = to_string(&config)?;
    println!("Classic output:\n{}\n", classic);

    let rj = to_string_with_options(&config, EncodeOptions::round_trip())?;
    println!("Round-trip output:\n{}\n", rj);

    let config_back: Config = from_str(&rj)?;
    assert_eq!(config, config_back);
    println!("✓ Round-trip successful");

    Ok(())
}
