//! snpsim - SNP Simulator CLI
//!
//! Generates a random DNA sequence with point mutations, asks a language
//! model to narrate the likely impact of each one, and turns the results
//! into reports.
//!
//! ## Commands
//!
//! - `generate`: Write a fresh run to `mutations.json`
//! - `classify`: Classify the stored run into `predictions.json`
//! - `run`: `generate` then `classify`
//! - `summary`: Print impact counts and the prediction table
//! - `export`: Write the predictions as CSV

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use snp_core::{
    connect_oracle, export_predictions_csv, render_summary_md, run_classify_stage,
    run_generate_stage, write_summary_json, FsDocumentStore, ImpactSummary, Pacing,
    PredictionDocument, RunDocument, SimConfig, SimError, DEFAULT_CSV_NAME,
};
use snp_oracle::Oracle;
use snp_state::DocumentStore;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "snpsim")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "SNP simulator with oracle-narrated impact predictions", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines (and JSON output for `summary`)
    #[arg(long, global = true)]
    json: bool,

    /// Directory holding mutations.json and predictions.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a random sequence and mutate it
    Generate(GenerateArgs),

    /// Classify every mutation of the stored run with the oracle
    Classify(ClassifyArgs),

    /// Generate, then classify
    Run {
        #[command(flatten)]
        generate: GenerateArgs,

        #[command(flatten)]
        classify: ClassifyArgs,
    },

    /// Show impact counts and the prediction table
    Summary {
        /// Also write the JSON summary to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export predictions as CSV
    Export {
        /// Output path
        #[arg(short, long, default_value = DEFAULT_CSV_NAME)]
        output: PathBuf,
    },
}

#[derive(Args, Default)]
struct GenerateArgs {
    /// Sequence length
    #[arg(short, long)]
    length: Option<usize>,

    /// Number of point mutations
    #[arg(short, long)]
    mutations: Option<usize>,

    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Default)]
struct ClassifyArgs {
    /// Pause between oracle calls, in seconds
    #[arg(long)]
    delay_secs: Option<f64>,

    /// Oracle model identifier
    #[arg(long)]
    model: Option<String>,

    /// Oracle API base URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Per-request timeout, in seconds
    #[arg(long)]
    timeout_secs: Option<f64>,
}

impl GenerateArgs {
    fn apply(&self, config: &mut SimConfig) {
        if let Some(length) = self.length {
            config.sequence_length = length;
        }
        if let Some(mutations) = self.mutations {
            config.mutation_count = mutations;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
    }
}

impl ClassifyArgs {
    fn apply(&self, config: &mut SimConfig) -> Result<()> {
        if let Some(secs) = self.delay_secs {
            config.call_delay = seconds("--delay-secs", secs)?;
        }
        if let Some(secs) = self.timeout_secs {
            config.request_timeout = seconds("--timeout-secs", secs)?;
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        Ok(())
    }
}

fn seconds(flag: &str, secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .with_context(|| format!("{} must be a non-negative number, got {}", flag, secs))
}

/// Layer command-line overrides on top of `base`.
fn resolve_config(
    base: SimConfig,
    data_dir: Option<PathBuf>,
    generate: Option<&GenerateArgs>,
    classify: Option<&ClassifyArgs>,
) -> Result<SimConfig> {
    let mut config = base;
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    if let Some(args) = generate {
        args.apply(&mut config);
    }
    if let Some(args) = classify {
        args.apply(&mut config)?;
    }
    Ok(config)
}

fn open_store(config: &SimConfig) -> Result<FsDocumentStore> {
    FsDocumentStore::new(&config.data_dir).with_context(|| {
        format!(
            "Failed to open data directory {}",
            config.data_dir.display()
        )
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    snp_core::init_tracing(cli.json, level);

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    // A .env file never overrides variables already set in the environment.
    dotenvy::dotenv().ok();
    let base = SimConfig::from_env().context("Invalid SNPSIM_* environment")?;

    match cli.command {
        Commands::Generate(args) => {
            let config = resolve_config(base, cli.data_dir, Some(&args), None)?;
            let store = open_store(&config)?;
            cmd_generate(&config, &store)
        }
        Commands::Classify(args) => {
            let config = resolve_config(base, cli.data_dir, None, Some(&args))?;
            let store = open_store(&config)?;
            cmd_classify(&config, &store).await
        }
        Commands::Run { generate, classify } => {
            let config = resolve_config(base, cli.data_dir, Some(&generate), Some(&classify))?;
            let store = open_store(&config)?;
            cmd_run(&config, &store).await
        }
        Commands::Summary { output } => {
            let config = resolve_config(base, cli.data_dir, None, None)?;
            let store = open_store(&config)?;
            cmd_summary(&store, cli.json, output.as_deref())
        }
        Commands::Export { output } => {
            let config = resolve_config(base, cli.data_dir, None, None)?;
            let store = open_store(&config)?;
            cmd_export(&store, &output)
        }
    }
}

/// Stage 1: write a fresh run
fn cmd_generate(config: &SimConfig, store: &dyn DocumentStore) -> Result<()> {
    let run = run_generate_stage(config, store)?;
    print_run(&run);
    Ok(())
}

/// Stage 2 against the configured oracle
async fn cmd_classify(config: &SimConfig, store: &dyn DocumentStore) -> Result<()> {
    let oracle = connect_oracle(config)?;
    cmd_classify_with(&oracle, &config.pacing(), store).await
}

async fn cmd_classify_with(
    oracle: &dyn Oracle,
    pacing: &dyn Pacing,
    store: &dyn DocumentStore,
) -> Result<()> {
    let doc = run_classify_stage(oracle, pacing, store).await?;
    print_predictions(&doc);
    Ok(())
}

/// Both stages; the credential is checked before anything is written.
async fn cmd_run(config: &SimConfig, store: &dyn DocumentStore) -> Result<()> {
    let oracle = connect_oracle(config)?;
    cmd_generate(config, store)?;
    cmd_classify_with(&oracle, &config.pacing(), store).await
}

fn cmd_summary(store: &dyn DocumentStore, json: bool, output: Option<&Path>) -> Result<()> {
    let doc = store.read_predictions().map_err(SimError::from)?;
    let summary = ImpactSummary::from_document(&doc);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", render_summary_md(&doc, &summary));
    }

    if let Some(path) = output {
        write_summary_json(path, &summary)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
        info!(path = %path.display(), "summary written");
    }
    Ok(())
}

fn cmd_export(store: &dyn DocumentStore, output: &Path) -> Result<()> {
    let doc = store.read_predictions().map_err(SimError::from)?;
    export_predictions_csv(output, &doc)
        .with_context(|| format!("Failed to export CSV to {}", output.display()))?;
    println!(
        "Exported {} predictions to {}",
        doc.predictions.len(),
        output.display()
    );
    Ok(())
}

fn print_run(run: &RunDocument) {
    println!("Wild-type: {}", run.wild_type_sequence);
    println!("Mutated:   {}", run.mutated_sequence);
    println!("\nMutations ({}):", run.mutations.len());
    for m in &run.mutations {
        println!("  {:>5}  {} -> {}", m.index, m.original, m.mutated);
    }
}

fn print_predictions(doc: &PredictionDocument) {
    for p in &doc.predictions {
        println!(
            "  {:>5}  {} -> {}  {}",
            p.mutation.index, p.mutation.original, p.mutation.mutated, p.prediction
        );
    }
    let failures = doc.failure_count();
    if failures > 0 {
        println!(
            "\n{} of {} oracle calls failed",
            failures,
            doc.predictions.len()
        );
    }
}
