//! Example: Compare a package part with its round-tripped output
//!
//! This example decodes an IDML resource, encodes it again and reports any
//! structural differences between the two.
//!
//! Usage: cargo run --example compare <Resource.xml>

use std::env;
use std::fs;

use xml_idml::{
    compare_bytes, decode_document, encode_document, format_differences, CompareOptions,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <Resource.xml>", args[0]);
        std::process::exit(1);
    }

    let original = fs::read(&args[1])?;

    eprintln!("Decoding: {}", args[1]);
    let document = decode_document(Some(&original))?;

    eprintln!("Encoding...");
    let generated = encode_document(&document)?;

    let differences = compare_bytes(Some(&original), Some(&generated), &CompareOptions::default())?;
    println!("{}", format_differences(&differences));

    Ok(())
}
