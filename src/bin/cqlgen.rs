//! cqlgen CLI - Java and CQL code generation from a CQL catalog
//!
//! Reads a cqlgen.yaml configuration and a catalog snapshot, then writes the
//! generated sources below the configured output folder.

use clap::{Parser, Subcommand};
use cqlgen::catalog::SnapshotCatalog;
use cqlgen::codegen::{GeneratorConfig, RunStatus, TypeMapper};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cqlgen")]
#[command(version, about = "Generate Java entities, factories, controllers and tests from a CQL catalog", long_about = None)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate sources for every table and type of the configured keyspace
    Generate {
        /// Path to cqlgen.yaml
        #[arg(short, long, default_value = "cqlgen.yaml")]
        config: PathBuf,

        /// Catalog snapshot (YAML or JSON)
        #[arg(long, default_value = "catalog.yaml")]
        catalog: PathBuf,

        /// Override output_folder from the config file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Render everything but write nothing
        #[arg(long)]
        dry_run: bool,

        /// Worker threads (0 = one per core)
        #[arg(short, long)]
        workers: Option<usize>,
    },

    /// Validate a configuration file without reading the catalog
    Validate {
        /// Path to cqlgen.yaml
        #[arg(short, long, default_value = "cqlgen.yaml")]
        config: PathBuf,
    },

    /// Show the Java type and imports for a CQL type
    MapType {
        /// CQL type, e.g. "map<text, frozen<list<int>>>"
        cql_type: String,

        /// User-defined types the type may reference
        #[arg(short, long)]
        udt: Vec<String>,

        /// Base package of generated UDT classes
        #[arg(short, long, default_value = "com.example")]
        package: String,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "cqlgen=debug" } else { "cqlgen=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Generate { config, catalog, output, dry_run, workers } => {
            generate(config, catalog, output, dry_run, workers)
        }
        Commands::Validate { config } => validate_config(config),
        Commands::MapType { cql_type, udt, package } => map_type(cql_type, udt, package),
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the run completed with failed entities
fn generate(
    config_path: PathBuf,
    catalog_path: PathBuf,
    output: Option<PathBuf>,
    dry_run: bool,
    workers: Option<usize>,
) -> Result<bool, String> {
    let mut config = GeneratorConfig::from_file(&config_path).map_err(|e| e.to_string())?;
    config.apply_env_overrides();
    if let Some(output) = output {
        config.output_folder = output;
    }
    if let Some(workers) = workers {
        config.workers = workers;
    }
    config.dry_run |= dry_run;

    let catalog = SnapshotCatalog::from_file(&catalog_path)?
        .with_connection(config.connection_options());

    println!(
        "🔧 Generating keyspace '{}' into {}{}",
        config.keyspace,
        config.output_folder.display(),
        if config.dry_run { " (dry run)" } else { "" }
    );

    let result = cqlgen::generate(&config, &catalog).map_err(|e| e.to_string())?;

    for outcome in &result.outcomes {
        match &outcome.result {
            Ok(artifacts) => println!(
                "  ✓ {} {} ({} files)",
                outcome.source_kind.as_str(),
                outcome.name,
                artifacts.len()
            ),
            Err(e) => println!("  ✗ {} {}: {}", outcome.source_kind.as_str(), outcome.name, e),
        }
    }

    match result.status() {
        RunStatus::Done => {
            println!("✨ Generated {} files", result.artifacts().count());
            Ok(true)
        }
        RunStatus::Failed => {
            let failures = result.failures();
            eprintln!("Failed entities ({}):", failures.len());
            for failure in &failures {
                eprintln!("  {}", failure);
            }
            Ok(false)
        }
    }
}

fn validate_config(config_path: PathBuf) -> Result<bool, String> {
    let config = GeneratorConfig::from_file(&config_path).map_err(|e| e.to_string())?;
    config.validate().map_err(|e| e.to_string())?;

    println!("✓ {} is valid", config_path.display());
    println!("  keyspace: {}", config.keyspace);
    println!("  package: {}", config.package_name);
    println!("  output: {}", config.output_folder.display());
    for table in config.tables.keys() {
        println!("  directives: {}", table);
    }
    Ok(true)
}

fn map_type(cql_type: String, udts: Vec<String>, package: String) -> Result<bool, String> {
    let mapper = TypeMapper::new(&udts, format!("{}.entity", package));
    let (java, imports) = mapper.map(&cql_type).map_err(|e| e.to_string())?;

    println!("{}", java.name);
    for import in &imports {
        println!("import {};", import);
    }
    Ok(true)
}
