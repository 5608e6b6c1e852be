//! CLI entry point for the assessment recommendation engine.
//!
//! Provides commands for building the vector index, recommending assessments
//! for hiring queries, and scoring retrieval quality against labeled datasets.

use aptrank::catalog::{self, CatalogOrigin};
use aptrank::display::{THEME, create_recall_table, create_recommendation_table, with_spinner};
use aptrank::error::RecommendError;
use aptrank::evaluate::{Evaluator, RECALL_K};
use aptrank::index::{IndexMetadata, artifact_set_exists};
use aptrank::io::{
    ExitCode, JsonResponse, OutputFormat, OutputManager, ResponseMeta, format_utc_timestamp,
};
use aptrank::{FastEmbedEncoder, IndexBuilder, Recommender, Settings, TextEncoder};
use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Status command JSON output structure
#[derive(Debug, Serialize)]
struct StatusReport {
    index_path: String,
    record_count: usize,
    dimension: usize,
    model_name: String,
    created: String,
    catalog_source: String,
    stale: bool,
}

impl std::fmt::Display for StatusReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Index: {}", self.index_path)?;
        writeln!(f, "  Records: {}", self.record_count)?;
        writeln!(f, "  Dimensions: {}", self.dimension)?;
        writeln!(f, "  Model: {}", self.model_name)?;
        writeln!(f, "  Created: {}", self.created)?;
        write!(f, "Catalog: {}", self.catalog_source)?;
        if self.stale {
            write!(
                f,
                "\nCatalog has changed since the last build, run 'aptrank build' to refresh"
            )?;
        }
        Ok(())
    }
}

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Create custom help text with consistent styling
fn create_custom_help() -> String {
    use aptrank::display::{create_help_text, format_help_section};

    let mut help = String::new();

    help.push_str("Recommend hiring assessments for free-text queries using semantic retrieval.\n\n");

    help.push_str(&format_help_section(
        "Usage:",
        "aptrank [OPTIONS] <COMMAND>",
        true,
    ));
    help.push('\n');

    let commands = "\
init        Set up .aptrank directory with default configuration
build       Encode the catalog and publish the vector index
recommend   Recommend assessments for a hiring query
evaluate    Score Recall@k against the labeled dataset
submit      Generate the submission file for unlabeled queries
status      Show index and catalog state
config      Display active settings
help        Print this message or the help of the given subcommand(s)";
    help.push_str(&format_help_section("Commands:", commands, true));
    help.push('\n');

    let options = "\
-c, --config <CONFIG>  Path to custom settings.toml file
    --info             Show detailed loading information
-h, --help             Print help
-V, --version          Print version";
    help.push_str(&format_help_section("Options:", options, true));
    help.push('\n');

    help.push_str(&create_help_text());

    help
}

/// Assessment recommendation engine
#[derive(Parser)]
#[command(
    name = "aptrank",
    version = env!("CARGO_PKG_VERSION"),
    about = "Assessment recommendation engine",
    long_about = "Recommend hiring assessments for free-text queries using semantic retrieval.",
    next_line_help = true,
    styles = clap_cargo_style(),
    override_help = create_custom_help()
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show detailed loading information
    #[arg(long, global = true)]
    info: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Initialize project
    #[command(about = "Set up .aptrank directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Build the vector index from the catalog
    #[command(
        about = "Encode the catalog and publish the vector index",
        after_help = "Examples:\n  aptrank build\n  aptrank build --force"
    )]
    Build {
        /// Force rebuild even when the stored index matches the catalog
        #[arg(short, long)]
        force: bool,
    },

    /// Recommend assessments for a query
    #[command(
        about = "Recommend assessments for a hiring query",
        after_help = "Examples:\n  aptrank recommend \"Hiring a Java developer who collaborates with teams\"\n  aptrank recommend \"Need a data analyst\" --json"
    )]
    Recommend {
        /// Free-text hiring query
        query: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Score retrieval quality against labeled queries
    #[command(about = "Compute Recall@k over the labeled dataset and write a report")]
    Evaluate {
        /// Ranking depth to measure recall over
        #[arg(long, default_value_t = RECALL_K)]
        k: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate the submission file
    #[command(about = "Write (query, URL) rows for the unlabeled dataset")]
    Submit,

    /// Show index status
    #[command(about = "Show index and catalog state")]
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show current configuration settings
    #[command(about = "Display active settings from .aptrank/settings.toml")]
    Config,
}

/// Entry point.
///
/// Handles config initialization and command dispatch. Auto-initializes
/// config for the build command.
fn main() {
    let cli = Cli::parse();

    init_tracing();

    // For build command, auto-initialize if needed
    if matches!(cli.command, Commands::Build { .. }) {
        if Settings::check_init().is_err() {
            // Auto-initialize for build command
            eprintln!("Initializing project configuration...");
            match Settings::init_config_file(false) {
                Ok(path) => {
                    eprintln!("Created configuration file at: {}", path.display());
                }
                Err(e) => {
                    eprintln!("Warning: Could not create config file: {e}");
                    eprintln!("Using default configuration.");
                }
            }
        }
    } else if !matches!(cli.command, Commands::Init { .. }) {
        // For other commands, just warn
        if let Err(warning) = Settings::check_init() {
            eprintln!("Warning: {warning}");
            eprintln!("Using default configuration for now.");
        }
    }

    // Load configuration
    let config = if let Some(config_path) = &cli.config {
        Settings::load_from(config_path).unwrap_or_else(|e| {
            eprintln!(
                "Configuration error loading from {}: {}",
                config_path.display(),
                e
            );
            std::process::exit(1);
        })
    } else {
        Settings::load().unwrap_or_else(|e| {
            eprintln!("Configuration error: {e}");
            Settings::default()
        })
    };

    aptrank::config::set_global_debug(config.debug);

    if cli.info {
        if let Some(root) = &config.workspace_root {
            eprintln!("Workspace root: {}", root.display());
        }
        eprintln!("Index directory: {}", config.index_dir().display());
        eprintln!("Embedding model: {}", config.embedding.model);
    }

    match &cli.command {
        Commands::Init { force } => {
            let config_path = PathBuf::from(".aptrank/settings.toml");

            if config_path.exists() && !force {
                eprintln!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                eprintln!("Use --force to overwrite");
                std::process::exit(1);
            }

            match Settings::init_config_file(*force) {
                Ok(path) => {
                    println!("Created configuration file at: {}", path.display());
                    println!("Edit this file to customize your settings.");
                }
                Err(e) => {
                    eprintln!("Error: {e}");
                    std::process::exit(1);
                }
            }
            return;
        }

        Commands::Config => {
            println!("Current Configuration:");
            println!("{}", "=".repeat(50));
            match toml::to_string_pretty(&config) {
                Ok(toml_str) => println!("{toml_str}"),
                Err(e) => eprintln!("Error displaying config: {e}"),
            }
            return;
        }

        _ => {}
    }

    let settings = Arc::new(config);

    let exit_code = match cli.command {
        Commands::Init { .. } | Commands::Config => {
            // Already handled above
            unreachable!()
        }

        Commands::Build { force } => run_build(&settings, force),

        Commands::Recommend { query, json } => {
            run_recommend(&settings, &query, OutputFormat::from_json_flag(json))
        }

        Commands::Evaluate { k, json } => {
            run_evaluate(&settings, k, OutputFormat::from_json_flag(json))
        }

        Commands::Submit => run_submit(&settings),

        Commands::Status { json } => run_status(&settings, OutputFormat::from_json_flag(json)),
    };

    std::process::exit(exit_code as i32);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the embedding model, showing a spinner while fastembed initializes.
fn load_encoder(
    settings: &Settings,
    output: &mut OutputManager,
) -> Result<Arc<dyn TextEncoder>, ExitCode> {
    let loaded = with_spinner("Loading embedding model", || {
        FastEmbedEncoder::from_config(&settings.embedding)
    });

    match loaded {
        Ok(encoder) => Ok(Arc::new(encoder)),
        Err(e) => {
            let error = RecommendError::from(e);
            Err(output.error(&error).unwrap_or(ExitCode::GeneralError))
        }
    }
}

fn run_build(settings: &Arc<Settings>, force: bool) -> ExitCode {
    let mut output = OutputManager::new(OutputFormat::Text);

    let (records, origin) = match catalog::load_catalog(settings) {
        Ok(loaded) => loaded,
        Err(e) => return output.error(&e).unwrap_or(ExitCode::GeneralError),
    };
    println!("Loaded {} assessments from {origin}", records.len());
    if matches!(origin, CatalogOrigin::Builtin) {
        println!(
            "Place a catalog at {} to index your own assessments",
            settings.resolve_path(&settings.catalog.path).display()
        );
    }

    let encoder = match load_encoder(settings, &mut output) {
        Ok(encoder) => encoder,
        Err(code) => return code,
    };

    let start = Instant::now();
    match IndexBuilder::new(settings, encoder.as_ref()).build_with_options(records, force, true) {
        Ok(outcome) if outcome.skipped => {
            println!(
                "Index already matches the catalog ({} records), skipping build",
                outcome.record_count
            );
            println!("Use --force to rebuild");
            ExitCode::Success
        }
        Ok(outcome) => {
            println!(
                "{}",
                THEME.success_with_icon(&format!(
                    "Indexed {} assessments ({} dimensions) in {:.2}s",
                    outcome.record_count,
                    outcome.dimension,
                    start.elapsed().as_secs_f64()
                ))
            );
            println!("Index saved to: {}", outcome.index_dir.display());
            ExitCode::Success
        }
        Err(e) => output.error(&e).unwrap_or(ExitCode::GeneralError),
    }
}

fn run_recommend(settings: &Arc<Settings>, query: &str, format: OutputFormat) -> ExitCode {
    let mut output = OutputManager::new(format);

    let encoder = match load_encoder(settings, &mut output) {
        Ok(encoder) => encoder,
        Err(code) => return code,
    };
    let recommender = Recommender::new(Arc::clone(settings), encoder);

    if let Err(e) = recommender.ensure_ready() {
        return output.error(&e).unwrap_or(ExitCode::GeneralError);
    }

    let start = Instant::now();
    match recommender.recommend(query) {
        Ok(recommendations) => match format {
            OutputFormat::Json => {
                let response = JsonResponse::success(&recommendations)
                    .with_meta(ResponseMeta {
                        version: env!("CARGO_PKG_VERSION").to_string(),
                        timestamp: Some(format_utc_timestamp()),
                        execution_time_ms: Some(start.elapsed().as_millis() as u64),
                    })
                    .with_system_message(
                        "Results are ranked by cosine similarity. Rebuild with 'aptrank build --force' after catalog changes.",
                    );
                print_json(&response)
            }
            OutputFormat::Text => {
                println!(
                    "Top {} assessments for: {query}",
                    recommendations.len()
                );
                println!("{}", create_recommendation_table(&recommendations));
                ExitCode::Success
            }
        },
        Err(e) => output.error(&e).unwrap_or(ExitCode::GeneralError),
    }
}

fn run_evaluate(settings: &Arc<Settings>, k: usize, format: OutputFormat) -> ExitCode {
    let mut output = OutputManager::new(format);

    let encoder = match load_encoder(settings, &mut output) {
        Ok(encoder) => encoder,
        Err(code) => return code,
    };
    let recommender = Recommender::new(Arc::clone(settings), encoder);
    let evaluator = Evaluator::new(&recommender).with_k(k);

    let start = Instant::now();
    match evaluator.run_evaluation() {
        Ok(outcome) => match format {
            OutputFormat::Json => {
                let response =
                    JsonResponse::success(&outcome.summary).with_meta(ResponseMeta {
                        version: env!("CARGO_PKG_VERSION").to_string(),
                        timestamp: Some(format_utc_timestamp()),
                        execution_time_ms: Some(start.elapsed().as_millis() as u64),
                    });
                print_json(&response)
            }
            OutputFormat::Text => {
                if outcome.summary.per_query.is_empty() {
                    println!("{}", THEME.warning_with_icon("No labeled queries evaluated"));
                } else {
                    println!("{}", create_recall_table(&outcome.summary));
                    println!(
                        "Mean Recall@{}: {}",
                        outcome.summary.k,
                        THEME.recall_badge(outcome.summary.mean_recall)
                    );
                }
                if let Some(path) = outcome.report_path {
                    println!("Report written to: {}", path.display());
                }
                ExitCode::Success
            }
        },
        Err(e) => output.error(&e).unwrap_or(ExitCode::GeneralError),
    }
}

fn run_submit(settings: &Arc<Settings>) -> ExitCode {
    let mut output = OutputManager::new(OutputFormat::Text);

    let encoder = match load_encoder(settings, &mut output) {
        Ok(encoder) => encoder,
        Err(code) => return code,
    };
    let recommender = Recommender::new(Arc::clone(settings), encoder);
    let evaluator = Evaluator::new(&recommender);

    match evaluator.run_submission() {
        Ok(Some(outcome)) => {
            println!(
                "{}",
                THEME.success_with_icon(&format!(
                    "Wrote {} rows for {} queries",
                    outcome.row_count, outcome.query_count
                ))
            );
            println!("Submission saved to: {}", outcome.submission_path.display());
            ExitCode::Success
        }
        Ok(None) => {
            let path = settings.resolve_path(&settings.evaluation.unlabeled_path);
            output
                .not_found("Unlabeled dataset", &path.display().to_string())
                .unwrap_or(ExitCode::NotFound)
        }
        Err(e) => output.error(&e).unwrap_or(ExitCode::GeneralError),
    }
}

fn run_status(settings: &Arc<Settings>, format: OutputFormat) -> ExitCode {
    let mut output = OutputManager::new(format);
    let index_dir = settings.index_dir();

    if !artifact_set_exists(&index_dir) {
        return output
            .item(None::<StatusReport>, "Index", &index_dir.display().to_string())
            .unwrap_or(ExitCode::NotFound);
    }

    let metadata = match IndexMetadata::load(&index_dir) {
        Ok(metadata) => metadata,
        Err(e) => return output.error(&e).unwrap_or(ExitCode::GeneralError),
    };

    match catalog::load_catalog(settings) {
        Ok((records, origin)) => {
            let stale = catalog::catalog_fingerprint(&records) != metadata.catalog_fingerprint;
            let report = StatusReport {
                index_path: index_dir.display().to_string(),
                record_count: metadata.record_count,
                dimension: metadata.dimension,
                model_name: metadata.model_name,
                created: format_created(metadata.created_at),
                catalog_source: origin.to_string(),
                stale,
            };
            output
                .item(Some(report), "Index", &index_dir.display().to_string())
                .unwrap_or(ExitCode::GeneralError)
        }
        Err(e) => output.error(&e).unwrap_or(ExitCode::GeneralError),
    }
}

fn format_created(created_at: u64) -> String {
    chrono::DateTime::from_timestamp(created_at as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| created_at.to_string())
}

fn print_json<T: Serialize>(response: &JsonResponse<T>) -> ExitCode {
    match serde_json::to_string_pretty(response) {
        Ok(json) => {
            println!("{json}");
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("Error serializing response: {e}");
            ExitCode::GeneralError
        }
    }
}
