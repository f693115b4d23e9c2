use anyhow::{bail, Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use command::{analyze, evaluate, AnalyzeOptions};
use config::{config_path, load_config, ConfigOverrides};
use pairs_collector::{
    open_sources, write_records, BuildSummary, CollectorError, OutputFormat, PairPipeline,
    SourceSpec,
};
use pairs_protocol::{output_record_schema, serialize_json, OUTPUT_SCHEMA_VERSION};
use pairs_vector_store::{ClusterCount, DEFAULT_DIM, DEFAULT_ITERATIONS, DEFAULT_SEED};
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

mod command;
mod config;
mod dataset;
mod report;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "pairs")]
#[command(about = "Build intent-tagged, clustered instruction datasets", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for data)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect, filter, deduplicate, tag and cluster pairs into JSONL
    Build(BuildArgs),

    /// Report quality metrics of an emitted dataset
    Evaluate(EvaluateArgs),

    /// Report cluster composition and source overlap of an emitted dataset
    Analyze(AnalyzeArgs),

    /// Print the JSON Schema of one output record
    Schema,
}

#[derive(Args)]
struct BuildArgs {
    /// Pair source: NAME=PATH or PATH (.json/.jsonl file or directory); repeatable
    #[arg(short, long = "source", required = true)]
    sources: Vec<String>,

    /// TOML config file (defaults to $PAIRS_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Minimum token length for both input and output
    #[arg(long)]
    min_len: Option<usize>,

    /// Maximum token length for both input and output
    #[arg(long)]
    max_len: Option<usize>,

    /// Target number of pairs to collect
    #[arg(long)]
    target: Option<usize>,

    /// Max examples to consider per source
    #[arg(long)]
    per_source_cap: Option<usize>,

    /// Retry with relaxed filters below this many pairs
    #[arg(long)]
    min_pairs: Option<usize>,

    /// Hashing TF-IDF dimension
    #[arg(long)]
    dim: Option<usize>,

    /// Cluster count: integer or 'auto'
    #[arg(long)]
    k: Option<ClusterCount>,

    /// K-means iterations
    #[arg(long)]
    iterations: Option<usize>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Output JSONL path (default: stdout)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Line layout: records | chat
    #[arg(long, default_value = "records")]
    format: OutputFormat,

    /// Write the run summary as JSON to this path
    #[arg(long)]
    summary_json: Option<PathBuf>,
}

impl BuildArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            min_len: self.min_len,
            max_len: self.max_len,
            target: self.target,
            per_source_cap: self.per_source_cap,
            min_pairs: self.min_pairs,
            dim: self.dim,
            k: self.k,
            iterations: self.iterations,
            seed: self.seed,
        }
    }
}

#[derive(Args)]
struct EvaluateArgs {
    /// Dataset JSONL produced by `pairs build`
    dataset: PathBuf,

    /// Output JSON instead of a markdown report
    #[arg(long)]
    json: bool,

    /// Also write the markdown report to this path
    #[arg(long)]
    out_md: Option<PathBuf>,

    /// Also write the JSON result to this path
    #[arg(long)]
    out_json: Option<PathBuf>,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Dataset JSONL produced by `pairs build`
    dataset: PathBuf,

    /// Hashing TF-IDF dimension for similarity and re-clustering
    #[arg(long, default_value_t = DEFAULT_DIM)]
    dim: usize,

    /// Re-cluster the records instead of using their cluster labels
    /// (always done when no record is labeled)
    #[arg(long)]
    recluster: bool,

    /// Re-clustering k (default: min(10, number of sources, records))
    #[arg(long)]
    k: Option<usize>,

    /// Re-clustering seed
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Re-clustering k-means iterations
    #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
    iterations: usize,

    /// Output JSON instead of a markdown report
    #[arg(long)]
    json: bool,

    /// Also write the markdown report to this path
    #[arg(long)]
    out_md: Option<PathBuf>,

    /// Also write the JSON result to this path
    #[arg(long)]
    out_json: Option<PathBuf>,
}

pub fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    // Keep stdout clean for JSON parsing
    let json_output = match &cli.command {
        Commands::Evaluate(args) => args.json,
        Commands::Analyze(args) => args.json,
        Commands::Schema => true,
        Commands::Build(_) => false,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Build(args) => run_build(args)?,
        Commands::Evaluate(args) => run_evaluate(args)?,
        Commands::Analyze(args) => run_analyze(args)?,
        Commands::Schema => run_schema()?,
    }

    Ok(())
}

fn run_build(args: BuildArgs) -> Result<()> {
    let mut config = load_config(config_path(args.config.as_deref()).as_deref())?;
    args.overrides().apply(&mut config);

    let specs = args
        .sources
        .iter()
        .map(|raw| SourceSpec::parse(raw))
        .collect::<pairs_collector::Result<Vec<_>>>()?;
    let sources = open_sources(&specs).context("Failed to open sources")?;
    if sources.is_empty() {
        bail!("No dataset files found in the given sources");
    }

    let pipeline = PairPipeline::new(config).context("Invalid pipeline configuration")?;
    let output = pipeline.run(&sources)?;

    match &args.out {
        Some(path) => {
            create_parent(path)?;
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_records(&mut writer, &output.records, args.format)?;
            log::info!("Wrote {} records to {}", output.records.len(), path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            match write_records(&mut stdout, &output.records, args.format) {
                Err(CollectorError::IoError(err)) if err.kind() == io::ErrorKind::BrokenPipe => {}
                other => other?,
            }
        }
    }

    if let Some(path) = &args.summary_json {
        write_summary(path, &output.summary)?;
    }
    Ok(())
}

fn write_summary(path: &Path, summary: &BuildSummary) -> Result<()> {
    create_parent(path)?;
    fs::write(path, serde_json::to_string_pretty(summary)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    let records = dataset::load_dataset(&args.dataset)?;
    let eval = evaluate(&records);
    let markdown = report::render_evaluation_report(&args.dataset, &eval);

    if let Some(path) = &args.out_json {
        create_parent(path)?;
        fs::write(path, serde_json::to_string_pretty(&eval)?)?;
    }
    if let Some(path) = &args.out_md {
        create_parent(path)?;
        fs::write(path, &markdown)?;
    }

    if args.json {
        print_stdout(&serialize_json(&eval)?)?;
    } else {
        print_stdout(&markdown)?;
    }
    Ok(())
}

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let records = dataset::load_dataset(&args.dataset)?;
    let options = AnalyzeOptions {
        dim: args.dim,
        recluster: args.recluster,
        k: args.k,
        seed: args.seed,
        iterations: args.iterations,
    };
    let analysis = analyze(&records, &options)?;
    let markdown = report::render_analysis_report(&args.dataset, &analysis);

    if let Some(path) = &args.out_json {
        create_parent(path)?;
        fs::write(path, serde_json::to_string_pretty(&analysis)?)?;
    }
    if let Some(path) = &args.out_md {
        create_parent(path)?;
        fs::write(path, &markdown)?;
    }

    if args.json {
        print_stdout(&serialize_json(&analysis)?)?;
    } else {
        print_stdout(&markdown)?;
    }
    Ok(())
}

fn run_schema() -> Result<()> {
    let mut schema = output_record_schema()?;
    if let Some(object) = schema.as_object_mut() {
        object.insert(
            "x-schema-version".to_string(),
            serde_json::Value::from(OUTPUT_SCHEMA_VERSION),
        );
    }
    print_stdout(&serde_json::to_string_pretty(&schema)?)
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}
