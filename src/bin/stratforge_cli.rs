//! StratForge CLI - Bridge interface for the web service
//!
//! Commands: industries, synthesize, validate, export
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 on validation or render failure

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

use stratforge_core::{
    BrandingConfig, EngineConfig, ExportError, ExportOptions, ExportRenderer, StrategyInput, StrategyOutput,
    StrategySynthesizer,
};

#[derive(Parser)]
#[command(name = "stratforge-cli")]
#[command(about = "StratForge CLI - Marketing Strategy Compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to engine config (TOML). Overrides the default search.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List industry profiles in the catalog
    Industries,

    /// Synthesize a strategy with the rules engine
    Synthesize {
        /// JSON payload (StrategyInput)
        #[arg(short, long)]
        payload: String,
    },

    /// Validate a strategy against its request
    Validate {
        /// JSON payload (StrategyInput)
        #[arg(short, long)]
        input: String,

        /// JSON payload (StrategyOutput)
        #[arg(short, long)]
        output: String,
    },

    /// Export a strategy to pptx, docx or xlsx
    Export {
        /// JSON payload (StrategyOutput)
        #[arg(short, long)]
        strategy: String,

        #[arg(short, long)]
        business_name: String,

        #[arg(short, long)]
        format: String,

        /// JSON payload (BrandingConfig)
        #[arg(long)]
        branding: Option<String>,

        /// Generation date, YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,

        /// Write the file here instead of returning it base64-encoded
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportSummary {
    filename: String,
    mime_type: String,
    size_bytes: usize,
    sha256: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_base64: Option<String>,
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => error!(error = %e, "Failed to serialize response"),
    }
}

fn fail(message: String) -> ExitCode {
    print_json(&serde_json::json!({ "success": false, "error": message }));
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match EngineConfig::load_from_file(path) {
            Ok(c) => c,
            Err(e) => return fail(e.to_string()),
        },
        None => EngineConfig::load(),
    };

    let synthesizer = match StrategySynthesizer::from_config(&config) {
        Ok(s) => s,
        Err(e) => return fail(format!("Failed to load catalog: {e}")),
    };

    match cli.command {
        Commands::Industries => {
            let industries: Vec<_> = synthesizer
                .catalog()
                .list()
                .iter()
                .map(|p| serde_json::json!({
                    "key": p.key,
                    "name": p.name,
                    "aliases": p.aliases,
                    "channels": p.channels.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
                }))
                .collect();
            print_json(&industries);
            ExitCode::SUCCESS
        }

        Commands::Synthesize { payload } => {
            let input: StrategyInput = match serde_json::from_str(&payload) {
                Ok(i) => i,
                Err(e) => return fail(format!("Invalid payload: {e}")),
            };
            print_json(&synthesizer.process_strategy(&input));
            ExitCode::SUCCESS
        }

        Commands::Validate { input, output } => {
            let input: StrategyInput = match serde_json::from_str(&input) {
                Ok(i) => i,
                Err(e) => return fail(format!("Invalid input payload: {e}")),
            };
            let output: StrategyOutput = match serde_json::from_str(&output) {
                Ok(o) => o,
                Err(e) => return fail(format!("Invalid output payload: {e}")),
            };

            let report = synthesizer.validate_output(&output, &input);
            print_json(&report);
            if report.valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2) // Validation failure
            }
        }

        Commands::Export { strategy, business_name, format, branding, date, out_dir } => {
            let output: StrategyOutput = match serde_json::from_str(&strategy) {
                Ok(o) => o,
                Err(e) => return fail(format!("Invalid strategy payload: {e}")),
            };

            let mut options = ExportOptions::new(format);
            if let Some(raw) = branding {
                match serde_json::from_str::<BrandingConfig>(&raw) {
                    Ok(b) => options = options.with_customization(b),
                    Err(e) => return fail(format!("Invalid branding payload: {e}")),
                }
            }
            if let Some(raw) = date {
                match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
                    Ok(d) => options = options.with_date(d),
                    Err(e) => return fail(format!("Invalid date {raw}: {e}")),
                }
            }

            let result = match ExportRenderer::new().export(&output, &business_name, &options) {
                Ok(r) => r,
                Err(e @ ExportError::UnsupportedFormat(_)) => return fail(e.to_string()),
                Err(e) => {
                    print_json(&serde_json::json!({ "success": false, "error": e.to_string() }));
                    return ExitCode::from(2); // Render failure
                }
            };

            let mut summary = ExportSummary {
                filename: result.filename.clone(),
                mime_type: result.mime_type.clone(),
                size_bytes: result.buffer.len(),
                sha256: result.sha256(),
                path: None,
                data_base64: None,
            };
            match out_dir {
                Some(dir) => {
                    let path = dir.join(&result.filename);
                    if let Err(e) = std::fs::write(&path, &result.buffer) {
                        return fail(format!("Failed to write {}: {e}", path.display()));
                    }
                    summary.path = Some(path);
                }
                None => summary.data_base64 = Some(STANDARD.encode(&result.buffer)),
            }
            print_json(&summary);
            ExitCode::SUCCESS
        }
    }
}
