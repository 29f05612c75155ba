//! Vehicle ingress CLI - transform vehicle production events
//!
//! # Main Commands
//!
//! ```bash
//! vehicle-ingress transform event.json      # Event → headers + vehicle document
//! vehicle-ingress serve                     # Start HTTP server (port 3000)
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! vehicle-ingress aggregate demands.csv     # Flat demand list → material change indexes
//! vehicle-ingress validate document.json    # Validate a document against the schema
//! vehicle-ingress config                    # Show effective configuration
//! ```

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use vehicle_ingress::{
    aggregate, parse_demand_csv_file, parse_demand_json, process_bytes, validate_vehicle_document,
    vehicle_level_records, IngressConfig, IngressOptions,
};

#[derive(Parser)]
#[command(name = "vehicle-ingress")]
#[command(about = "Transform vehicle production events into vehicle documents", long_about = None)]
struct Cli {
    /// JSON configuration file (overrides INGRESS_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform a vehicle event into headers and a vehicle document
    Transform {
        /// Input event JSON file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Upstream tracking string (default: random UUID)
        #[arg(short, long)]
        tracking: Option<String>,

        /// Only write the documents, without headers and stats
        #[arg(long)]
        body_only: bool,

        /// Skip schema validation
        #[arg(long)]
        no_validate: bool,
    },

    /// Aggregate a flat demand list (JSON array or CSV) into material change indexes
    Aggregate {
        /// Input file (.json or .csv)
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a vehicle document against the schema
    Validate {
        /// Input document JSON file
        input: PathBuf,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match load_config(cli.config.as_deref()) {
        Ok(config) => run(cli.command, config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: IngressConfig) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Transform {
            input,
            output,
            tracking,
            body_only,
            no_validate,
        } => {
            let options = IngressOptions {
                config,
                tracking,
                skip_validation: no_validate,
            };
            cmd_transform(&input, output.as_deref(), &options, body_only)
        }

        Commands::Aggregate { input, output } => cmd_aggregate(&input, output.as_deref(), &config),

        Commands::Validate { input } => cmd_validate(&input),

        Commands::Serve { port } => {
            vehicle_ingress::server::start_server(port, config).await?;
            Ok(())
        }

        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

/// `--config` wins over `INGRESS_CONFIG`; environment overrides apply to both.
fn load_config(path: Option<&Path>) -> Result<IngressConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(p) => IngressConfig::from_file(p)?.with_overrides(|var| std::env::var(var).ok())?,
        None => IngressConfig::load()?,
    };
    Ok(config)
}

fn cmd_transform(
    input: &Path,
    output: Option<&Path>,
    options: &IngressOptions,
    body_only: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", input.display());

    let bytes = fs::read(input)?;
    let result = process_bytes(&bytes, options)?;

    eprintln!("   Records:   {}", result.stats.input_records);
    eprintln!("   Vehicle:   {}", result.stats.vehicle_records);
    eprintln!("   Materials: {}", result.stats.material_count);
    eprintln!("   Steps:     {}", result.stats.step_count);

    let json = if body_only {
        serde_json::to_string_pretty(&result.documents)?
    } else {
        serde_json::to_string_pretty(&result)?
    };
    write_output(&json, output)?;

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_aggregate(
    input: &Path,
    output: Option<&Path>,
    config: &IngressConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📦 Aggregating: {}", input.display());

    let records = if input.extension().is_some_and(|e| e == "csv") {
        parse_demand_csv_file(input)?
    } else {
        let content = fs::read_to_string(input)?;
        parse_demand_json(serde_json::from_str(&content)?)?
    };

    let filtered = vehicle_level_records(&records, &config.vehicle_order_prefix);
    eprintln!(
        "   {} demand records, {} on '{}' orders",
        records.len(),
        filtered.len(),
        config.vehicle_order_prefix
    );

    let nodes = aggregate(filtered)?;
    eprintln!("   {} material change indexes", nodes.len());

    let json = serde_json::to_string_pretty(&nodes)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_validate(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating: {}", input.display());

    let content = fs::read_to_string(input)?;
    let document: Value = serde_json::from_str(&content)?;

    match validate_vehicle_document(&document) {
        Ok(()) => {
            eprintln!("✅ Document valid");
            Ok(())
        }
        Err(errors) => {
            eprintln!("❌ {} violation(s):", errors.len());
            for err in errors.iter().take(10) {
                eprintln!("   - {}", err);
            }
            std::process::exit(1);
        }
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
