use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anstream::{eprintln, println};
use bqgen_core::{FieldType, Schema, SchemaGenerator, SchemaInferenceConfig, Validator};
use clap::Parser;
use rayon::prelude::*;
use serde_json::Value;
use tracing::{debug, Level};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

type CliResult<T> = Result<T, Box<dyn Error>>;

/// bqgen - warehouse table schema inference tool
#[derive(Parser, Debug)]
#[command(name = "bqgen", version, about)]
struct Cli {
    /// Input JSON file (reads from stdin if not provided)
    file: Option<PathBuf>,

    /// Treat input as newline-delimited JSON, one sample per line
    #[arg(long)]
    ndjson: bool,

    /// JSON file holding a schema inference config
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Force field types, e.g. --type created:TIMESTAMP,payload:STRING
    #[arg(long = "type", value_name = "FIELD:TYPE", value_delimiter = ',', value_parser = parse_type_override)]
    types: Vec<(String, FieldType)>,

    /// Force fields to REQUIRED mode
    #[arg(long, value_name = "FIELD", value_delimiter = ',')]
    required: Vec<String>,

    /// Maximum record nesting depth
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    /// Validate the input against this schema file instead of inferring
    #[arg(
        long,
        value_name = "SCHEMA",
        conflicts_with_all = ["config", "types", "required", "max_depth", "compact"]
    )]
    validate: Option<PathBuf>,

    /// Print schemas on a single line
    #[arg(long)]
    compact: bool,

    /// Log inference decisions to stderr
    #[arg(long)]
    debug: bool,

    /// Log string sniffing as well (implies --debug)
    #[arg(long)]
    verbose: bool,
}

fn parse_type_override(pair: &str) -> Result<(String, FieldType), String> {
    let (field, field_type) = pair
        .split_once(':')
        .ok_or_else(|| format!("expected FIELD:TYPE, got `{pair}`"))?;
    if field.is_empty() {
        return Err(format!("missing field name in `{pair}`"));
    }
    let field_type = field_type.parse::<FieldType>().map_err(|e| e.to_string())?;
    Ok((field.to_string(), field_type))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run_cli(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing(cli: &Cli) {
    let level = if cli.verbose {
        Level::TRACE
    } else if cli.debug {
        Level::DEBUG
    } else {
        return;
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

// Extract the main logic into a separate function so we can call it from tests
fn run_cli(cli: &Cli) -> CliResult<ExitCode> {
    let input = read_input(cli.file.as_deref())?;
    let samples = split_samples(&input, cli.ndjson);
    debug!(samples = samples.len(), ndjson = cli.ndjson, "read input");

    if let Some(schema_path) = &cli.validate {
        return validate_samples(schema_path, &samples);
    }

    let generator = SchemaGenerator::new(load_config(cli)?)?;
    if cli.ndjson {
        let results: Vec<Result<Schema, String>> = samples
            .par_iter()
            .map(|(line, text)| {
                generator
                    .infer_str(text)
                    .map_err(|e| format!("line {line}: {e}"))
            })
            .collect();
        // the earliest failing line wins, whatever order the workers finished in
        let schemas = results.into_iter().collect::<Result<Vec<Schema>, String>>()?;
        for schema in &schemas {
            println!("{}", serde_json::to_string(schema)?);
        }
    } else {
        let schema = generator.infer_str(&input)?;
        if cli.compact {
            println!("{}", serde_json::to_string(&schema)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    eprintln!("Processed {} sample(s)", samples.len());
    Ok(ExitCode::SUCCESS)
}

fn read_input(path: Option<&Path>) -> CliResult<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()).into()),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Samples paired with their 1-based line number; a whole document is line 1
fn split_samples(input: &str, ndjson: bool) -> Vec<(usize, &str)> {
    if ndjson {
        input
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| (i + 1, line))
            .collect()
    } else {
        vec![(1, input)]
    }
}

/// The config file (if any) with command-line overrides merged over it
fn load_config(cli: &Cli) -> CliResult<SchemaInferenceConfig> {
    let mut config: SchemaInferenceConfig = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            serde_json::from_str(&text)
                .map_err(|e| format!("invalid config {}: {e}", path.display()))?
        }
        None => SchemaInferenceConfig::default(),
    };
    for (field, field_type) in &cli.types {
        config = config.with_type(field.as_str(), *field_type);
    }
    for field in &cli.required {
        config = config.with_required(field.as_str());
    }
    if let Some(max_depth) = cli.max_depth {
        config = config.with_max_depth(max_depth);
    }
    Ok(config)
}

fn validate_samples(schema_path: &Path, samples: &[(usize, &str)]) -> CliResult<ExitCode> {
    let text = fs::read_to_string(schema_path)
        .map_err(|e| format!("cannot read {}: {e}", schema_path.display()))?;
    let schema: Schema = serde_json::from_str(&text)
        .map_err(|e| format!("invalid schema {}: {e}", schema_path.display()))?;
    let validator = Validator::new(schema)?;

    let mut mismatches = 0;
    for (line, text) in samples {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| format!("line {line}: Invalid JSON input: {e}"))?;
        for mismatch in validator.validate(&value) {
            println!("{mismatch}");
            mismatches += 1;
        }
    }

    eprintln!("Processed {} sample(s)", samples.len());
    Ok(if mismatches > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}
