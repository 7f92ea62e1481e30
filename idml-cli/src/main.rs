//! IDML XML comparison and round-trip tool CLI

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use xml_idml::xml::print_to_string;
use xml_idml::{
    compact_empty_elements, decode_document, encode_document, format_differences, normalize,
    unwrap_element, Comparator, CompareOptions, TreeParser,
};

/// IDML XML comparison and round-trip tool
#[derive(Parser)]
#[command(name = "idml")]
#[command(version)]
#[command(about = "Compare and round-trip IDML XML resources", long_about = None)]
struct Cli {
    /// Log progress and pipeline details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two documents structurally
    #[command(visible_alias = "c")]
    Compare {
        /// Original file
        original: String,
        /// Generated file
        generated: String,

        /// Tag whose children are compared without regard to order
        /// (replaces the default set when given)
        #[arg(short, long = "unordered", value_name = "TAG")]
        unordered: Vec<String>,

        /// Stop after this many differences (0 = unlimited)
        #[arg(short, long, default_value_t = xml_idml::constants::DEFAULT_MAX_DIFFERENCES)]
        max: usize,

        /// Compare text content without trimming whitespace
        #[arg(long)]
        keep_whitespace: bool,
    },

    /// Re-serialize a document with canonical indentation
    #[command(visible_alias = "n")]
    Normalize {
        /// Input file
        input: String,
        /// Output file (default: stdout)
        output: Option<String>,
    },

    /// Decode and re-encode a document, keeping its prolog and prefixes
    #[command(visible_alias = "r")]
    Roundtrip {
        /// Input file
        input: String,
        /// Output file (default: stdout)
        output: Option<String>,
    },

    /// Show the DOMVersion and content of an idPkg wrapper element
    #[command(visible_alias = "u")]
    Unwrap {
        /// Input file
        input: String,
        /// Wrapper element name without prefix, e.g. Graphic
        element: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();

    let result = match cli.command {
        Commands::Compare {
            original,
            generated,
            unordered,
            max,
            keep_whitespace,
        } => run_compare(&original, &generated, unordered, max, keep_whitespace),
        Commands::Normalize { input, output } => {
            run_normalize(&input, output.as_deref()).map(|()| ExitCode::SUCCESS)
        }
        Commands::Roundtrip { input, output } => {
            run_roundtrip(&input, output.as_deref()).map(|()| ExitCode::SUCCESS)
        }
        Commands::Unwrap { input, element } => {
            run_unwrap(&input, &element).map(|()| ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

/// Compares two files; exits with 1 when they differ.
fn run_compare(
    original_path: &str,
    generated_path: &str,
    unordered: Vec<String>,
    max: usize,
    keep_whitespace: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut options = CompareOptions::default_policy()
        .with_max_differences(max)
        .with_ignore_whitespace(!keep_whitespace);
    if !unordered.is_empty() {
        options.unordered_tags = unordered.into_iter().collect();
    }

    log::info!("Parsing original: {}", original_path);
    let original = TreeParser::with_context("parse original").parse_file(original_path)?;
    log::info!("Parsing generated: {}", generated_path);
    let generated = TreeParser::with_context("parse generated").parse_file(generated_path)?;

    let differences = Comparator::with_options(options).compare(Some(&original), Some(&generated));
    println!("{}", format_differences(&differences));

    if differences.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

fn run_normalize(input_path: &str, output_path: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("Normalizing: {}", input_path);
    let input = fs::read(input_path)?;
    let normalized = normalize(Some(&input))?;
    write_output(output_path, &normalized)
}

fn run_roundtrip(input_path: &str, output_path: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("Decoding: {}", input_path);
    let input = fs::read(input_path)?;
    let document = decode_document(Some(&input))?;
    let encoded = encode_document(&document)?;
    log::info!("Encoded {} bytes", encoded.len());
    write_output(output_path, &encoded)
}

fn run_unwrap(input_path: &str, element: &str) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("Unwrapping {} from {}", element, input_path);
    let input = fs::read(input_path)?;
    let unwrapped = unwrap_element(Some(&input), element)?;
    let content = compact_empty_elements(&print_to_string(&unwrapped.content)?);

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "DOMVersion: {}", unwrapped.dom_version)?;
    writeln!(stdout, "{}", content)?;
    Ok(())
}

fn write_output(output_path: Option<&str>, bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
    let mut output: Box<dyn Write> = match output_path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout()),
    };
    output.write_all(bytes)?;
    output.write_all(b"\n")?;
    output.flush()?;
    Ok(())
}
