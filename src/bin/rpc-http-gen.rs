//! Generator CLI: IR files in, Rust modules out.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use rpc_http_bridge::codegen::{generate_all, write_files, GenerateError, GeneratorOptions, MissingBindingPolicy};
use rpc_http_bridge::config::{load_config, ObservabilityConfig};
use rpc_http_bridge::descriptor::load_ir;
use rpc_http_bridge::observability::init_logging;

#[derive(Parser)]
#[command(name = "rpc-http-gen")]
#[command(about = "Generate HTTP/JSON client and server bindings from service IR", long_about = None)]
struct Cli {
    /// Output directory; one subdirectory per service
    #[arg(short, long, required_unless_present = "check")]
    out: Option<PathBuf>,

    /// Policy for methods without an HTTP binding (overrides the config file)
    #[arg(long, value_enum)]
    missing_binding: Option<MissingBindingPolicy>,

    /// Generated clients reject unknown response fields
    #[arg(long)]
    strict_decoding: bool,

    /// TOML configuration file; its `generator` section supplies defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate only; write nothing
    #[arg(long)]
    check: bool,

    /// IR files (.json or .toml)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    // Best effort; a second subscriber is the only failure mode.
    let _ = init_logging(&ObservabilityConfig {
        log_format: "compact".to_string(),
        ..ObservabilityConfig::default()
    });

    match run(&cli) {
        Ok(count) => {
            tracing::info!(services = count, check = cli.check, "Generation finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("rpc-http-gen: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<usize, Box<dyn std::error::Error>> {
    let mut options = match &cli.config {
        Some(path) => GeneratorOptions::from(&load_config(path)?.generator),
        None => GeneratorOptions::default(),
    };
    if let Some(policy) = cli.missing_binding {
        options.missing_binding = policy;
    }
    options.strict_decoding |= cli.strict_decoding;

    let mut services = Vec::new();
    for input in &cli.inputs {
        services.extend(load_ir(input).map_err(GenerateError::from)?);
    }

    let files = generate_all(&services, &options)?;
    if !cli.check {
        if let Some(out) = &cli.out {
            write_files(out, &files)?;
            tracing::info!(out = %out.display(), files = files.len(), "Wrote generated sources");
        }
    }
    Ok(services.len())
}
