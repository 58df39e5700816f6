use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::GeneratorConfig;
use crate::diagnostics::{has_errors, print_diagnostics};
use crate::generator::{GenerationScope, Generator};
use crate::metadata::SchemaTable;

/// Command-line interface for schemagen
///
/// Generates TypeScript declarations and client stubs from a schema table.
#[derive(Parser)]
#[command(name = "schemagen")]
#[command(
    about = "TypeScript declarations and client stubs from record metadata",
    long_about = None
)]
pub struct Cli {
    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info", env = "SCHEMAGEN_LOG_LEVEL")]
    pub log_level: String,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate `<date>.types.d.ts` and `<date>.<group>.api.ts` files
    Generate {
        /// Schema table with records, definitions and routes (YAML or JSON)
        #[arg(short, long)]
        schema: PathBuf,

        /// Output directory for generated files
        #[arg(short, long)]
        output: PathBuf,

        /// Generator configuration (YAML, JSON or TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Limit generation to specific artifacts (comma-separated or repeated)
        #[arg(long, value_enum, num_args = 1.., value_delimiter = ',')]
        only: Option<Vec<OnlyPart>>,

        /// Show what would be written without touching the filesystem
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Exit with an error if any error-level diagnostic is reported
        #[arg(long, default_value_t = false)]
        fail_on_error: bool,
    },
    /// Print the resolved records, enum aliases and route groups
    Inspect {
        /// Schema table with records, definitions and routes (YAML or JSON)
        #[arg(short, long)]
        schema: PathBuf,

        /// Generator configuration (YAML, JSON or TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Parts of the output that can be selected with `--only`
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OnlyPart {
    /// Type declarations
    Types,
    /// Client stub modules
    Apis,
}

/// Execute an already-parsed command
///
/// # Errors
///
/// Returns an error if the configuration or schema table cannot be loaded,
/// a route references an unknown model, the route template is invalid, an
/// output file cannot be written, or `--fail-on-error` is set and an
/// error-level diagnostic was reported.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate {
            schema,
            output,
            config,
            only,
            dry_run,
            fail_on_error,
        } => {
            let generator = load_generator(&schema, config.as_deref())?;
            let scope = map_only_to_scope(only.as_deref());
            let report = generator.generate_with_options(&output, &scope, dry_run)?;

            for path in &report.written {
                if dry_run {
                    println!("📝 would write {}", path.display());
                } else {
                    println!("✅ wrote {}", path.display());
                }
            }
            if report.written.is_empty() {
                warn!(schema = %schema.display(), "nothing to generate");
            }
            if !report.diagnostics.is_empty() {
                print_diagnostics(&report.diagnostics);
            }
            if fail_on_error && has_errors(&report.diagnostics) {
                anyhow::bail!("generation reported error-level diagnostics");
            }
            Ok(())
        }
        Commands::Inspect { schema, config } => {
            let generator = load_generator(&schema, config.as_deref())?;
            let (resolved, apis) = generator.resolve();

            println!("Records ({}):", resolved.records.len());
            for record in resolved.records.values() {
                println!("  {} ({} fields)", record.name, record.fields.len());
                for field in &record.fields {
                    let marker = if field.required { "" } else { "?" };
                    println!("    {}{}: {}", field.key, marker, field.ty);
                }
            }
            println!("Enums ({}):", resolved.enums.len());
            for constant in resolved.enums.values() {
                println!("  {} = {}", constant.name, constant.union());
            }
            println!("Routes ({}):", apis.len());
            for api in &apis {
                println!("  [{}] {} → {}", api.group, api.key(), api.function_name);
            }
            if !resolved.diagnostics.is_empty() {
                print_diagnostics(&resolved.diagnostics);
            }
            Ok(())
        }
    }
}

fn load_generator(schema: &Path, config: Option<&Path>) -> anyhow::Result<Generator> {
    let config = match config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    let table = SchemaTable::load(schema)?;
    info!(
        schema = %schema.display(),
        records = table.records.len(),
        definitions = table.definitions.len(),
        routes = table.routes.len(),
        "loaded schema table"
    );
    table.into_generator(config)
}

/// Convert CLI `--only` parts to a `GenerationScope` configuration
///
/// If `only` is `None`, all parts are enabled. If `only` is provided,
/// only the specified parts are enabled.
pub(super) fn map_only_to_scope(only: Option<&[OnlyPart]>) -> GenerationScope {
    let Some(parts) = only else {
        return GenerationScope::all();
    };
    let mut scope = GenerationScope {
        types: false,
        apis: false,
    };
    for part in parts {
        match part {
            OnlyPart::Types => scope.types = true,
            OnlyPart::Apis => scope.apis = true,
        }
    }
    scope
}
