//! Symptom Triage Core - Training, Prediction and Dialog
//!
//! The main entry point for st-core, handling:
//! - Training a model from a labeled JSON-lines corpus
//! - One-shot disease ranking for a symptom description
//! - The interactive diagnostic chat
//! - Configuration inspection and validation

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use st_common::{
    Config, ConfigPaths, ConfigResolver, DialogPolicy, Error, OutputFormat, Result,
    StructuredError, SymptomTable, TrainingConfig, SCHEMA_VERSION,
};
use st_core::corpus::load_jsonl;
use st_core::dialog::{DialogController, SessionStore};
use st_core::exit_codes::ExitCode;
use st_core::logging::{
    event_names, generate_run_id, init_logging, LogConfig, LogFormat, LogLevel,
};
use st_core::model::{BackendKind, TrainedModel};
use st_core::tokenize::{Tokenizer, WordTokenizer};
use tracing::{error, info};

/// Symptom Triage Core - symptom-based disease triage with a hidden Markov model
#[derive(Parser)]
#[command(name = "st-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Override config directory
    #[arg(long, global = true, env = "SYMPTOM_TRIAGE_CONFIG")]
    config_dir: Option<PathBuf>,

    /// Explicit policy.json
    #[arg(long, global = true)]
    policy: Option<PathBuf>,

    /// Explicit training.json
    #[arg(long, global = true)]
    training: Option<PathBuf>,

    /// Explicit symptoms.json
    #[arg(long, global = true)]
    symptoms: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Log level (overrides ST_LOG / RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Log format on stderr (overrides ST_LOG_FORMAT)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a labeled corpus, train the HMM and classifier, save the model
    Train(TrainArgs),

    /// Rank diseases for a symptom description
    Predict(PredictArgs),

    /// Interactive diagnostic conversation on stdin/stdout
    Chat(ChatArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },

    /// Print version information
    Version,
}

// ============================================================================
// Command argument structs
// ============================================================================

#[derive(Args, Debug)]
struct TrainArgs {
    /// JSON-lines corpus, one {"text", "label"} object per line
    #[arg(long)]
    corpus: PathBuf,

    /// Where to write the trained model
    #[arg(long)]
    out: PathBuf,

    /// Override the initialization seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the Baum–Welch iteration budget
    #[arg(long)]
    max_iterations: Option<usize>,
}

#[derive(Args, Debug)]
struct PredictArgs {
    /// Trained model file
    #[arg(long)]
    model: PathBuf,

    /// Backend that ranks the diseases
    #[arg(long, default_value = "hmm")]
    backend: BackendKind,

    /// Number of candidates to report
    #[arg(long, default_value = "5")]
    top: usize,

    /// Free-text symptom description
    text: String,
}

#[derive(Args, Debug)]
struct ChatArgs {
    /// Trained model file
    #[arg(long)]
    model: PathBuf,

    /// Backend that ranks the diseases
    #[arg(long, default_value = "hmm")]
    backend: BackendKind,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the effective configuration and where it came from
    Show {
        /// Show one config file only
        #[arg(long)]
        file: Option<ConfigKind>,
    },
    /// Print JSON schema for a configuration file
    Schema {
        /// Schema to print
        #[arg(long)]
        file: ConfigKind,
    },
    /// Validate configuration files
    Validate {
        /// Specific file to validate (kind inferred from its name unless --file is given)
        path: Option<PathBuf>,

        /// Kind of the file at PATH
        #[arg(long)]
        file: Option<ConfigKind>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ConfigKind {
    Policy,
    Training,
    Symptoms,
}

impl ConfigKind {
    fn from_path(path: &Path) -> Option<Self> {
        match path.file_stem()?.to_str()? {
            "policy" => Some(ConfigKind::Policy),
            "training" => Some(ConfigKind::Training),
            "symptoms" => Some(ConfigKind::Symptoms),
            _ => None,
        }
    }
}

// ============================================================================
// Main entry point
// ============================================================================

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::from_env(cli.global.log_level, cli.global.log_format);
    init_logging(&log_config);

    let result = match &cli.command {
        Commands::Train(args) => run_train(&cli.global, args),
        Commands::Predict(args) => run_predict(&cli.global, args),
        Commands::Chat(args) => run_chat(&cli.global, args),
        Commands::Config(args) => run_config(&cli.global, args),
        Commands::Completions { shell } => {
            clap_complete::generate(*shell, &mut Cli::command(), "st-core", &mut io::stdout());
            Ok(())
        }
        Commands::Version => print_version(&cli.global),
    };

    let exit_code = match result {
        Ok(()) => ExitCode::Clean,
        Err(e) => output_error(&cli.global, &e),
    };
    std::process::exit(exit_code.as_i32());
}

fn resolver(global: &GlobalOpts) -> ConfigResolver {
    ConfigResolver::new(ConfigPaths {
        config_dir: global.config_dir.clone(),
        policy_path: global.policy.clone(),
        training_path: global.training.clone(),
        symptoms_path: global.symptoms.clone(),
    })
}

fn load_config(global: &GlobalOpts) -> Result<Config> {
    let config = Config::load(&resolver(global))?;
    info!(
        event = event_names::CONFIG_LOADED,
        combined_hash = %config.snapshot.combined_hash,
        defaults = config.snapshot.is_default(),
        "Configuration loaded"
    );
    Ok(config)
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_train(global: &GlobalOpts, args: &TrainArgs) -> Result<()> {
    let run_id = generate_run_id();
    let config = load_config(global)?;

    let mut training = config.training;
    if let Some(seed) = args.seed {
        training.init = training.init.with_seed(seed);
    }
    if let Some(n) = args.max_iterations {
        training = training.with_max_iterations(n);
    }
    training.validate()?;

    let records = load_jsonl(&args.corpus)?;
    info!(
        event = event_names::CORPUS_LOADED,
        run_id = %run_id,
        path = %args.corpus.display(),
        records = records.len(),
        "Corpus loaded"
    );

    let model = TrainedModel::fit(&records, &WordTokenizer::new(), &training)?;
    model.save(&args.out)?;

    match global.format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "run_id": run_id,
            "command": "train",
            "model_path": args.out.display().to_string(),
            "corpus_sha256": model.corpus_sha256,
            "corpus_records": model.corpus_records,
            "states": model.vocabulary.n_states(),
            "observations": model.vocabulary.n_observations(),
            "init": model.training.init,
            "report": model.report,
        }))?,
        OutputFormat::Human => {
            println!("# st-core train");
            println!();
            println!("Model: {}", args.out.display());
            println!(
                "Corpus: {} records, {} diseases, {} symptom tokens",
                model.corpus_records,
                model.vocabulary.n_states(),
                model.vocabulary.n_observations()
            );
            println!(
                "Baum–Welch: {} iterations, {}, log-likelihood {:.4}",
                model.report.iterations,
                if model.report.converged {
                    "converged"
                } else {
                    "iteration budget reached"
                },
                model.report.log_likelihood
            );
        }
    }
    Ok(())
}

fn run_predict(global: &GlobalOpts, args: &PredictArgs) -> Result<()> {
    let model = TrainedModel::load(&args.model)?;
    let backend = model.backend(args.backend)?;

    let tokens = WordTokenizer::new().tokenize(&args.text);
    let recognized: Vec<&String> = tokens
        .iter()
        .filter(|t| backend.vocabulary().contains_token(t))
        .collect();
    let prediction = backend.predict(&tokens)?;
    let candidates = prediction.top_k(args.top);

    match global.format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "command": "predict",
            "backend": backend.name(),
            "recognized": recognized,
            "calibrated": prediction.calibrated,
            "candidates": candidates,
        }))?,
        OutputFormat::Human => {
            println!(
                "Recognized: {}",
                recognized
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            for (rank, candidate) in candidates.iter().enumerate() {
                println!(
                    "{}. {} ({:.1}%)",
                    rank + 1,
                    candidate.label,
                    candidate.confidence * 100.0
                );
            }
            if !prediction.calibrated {
                println!("(scores rank the decoded path and are not probabilities)");
            }
        }
    }
    Ok(())
}

const GREETING: &str =
    "Describe your symptoms. Type \"done\" when you have listed them, or \"quit\" to leave.";

fn run_chat(global: &GlobalOpts, args: &ChatArgs) -> Result<()> {
    let config = load_config(global)?;
    let model = TrainedModel::load(&args.model)?;
    let controller = DialogController::new(
        model.backend(args.backend)?,
        Arc::new(WordTokenizer::new()),
        config.policy,
        config.symptoms,
    )?;

    let mut store = SessionStore::new();
    let session_id = store.open();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if global.format == OutputFormat::Human {
        writeln!(out, "{}", GREETING)?;
        out.flush()?;
    }

    let stdin = io::stdin();
    let mut turn = 0usize;
    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "quit" | "exit" | "bye") {
            break;
        }
        turn += 1;

        let reply = store.handle_turn(&controller, &session_id, input)?;
        let state = store.get(&session_id)?.state();
        match global.format {
            OutputFormat::Json => {
                let line = serde_json::json!({
                    "session_id": session_id.as_str(),
                    "turn": turn,
                    "state": state,
                    "reply": reply,
                    "text": reply.text(),
                });
                writeln!(out, "{}", serde_json::to_string(&line)?)?;
            }
            OutputFormat::Human => writeln!(out, "{}", reply)?,
        }
        out.flush()?;
    }

    store.close(&session_id)?;
    Ok(())
}

fn run_config(global: &GlobalOpts, args: &ConfigArgs) -> Result<()> {
    match &args.command {
        ConfigCommands::Show { file } => run_config_show(global, *file),
        ConfigCommands::Schema { file } => run_config_schema(*file),
        ConfigCommands::Validate { path, file } => {
            run_config_validate(global, path.as_deref(), *file)
        }
    }
}

/// Display the current configuration (including defaults if no files present).
fn run_config_show(global: &GlobalOpts, filter: Option<ConfigKind>) -> Result<()> {
    let resolver = resolver(global);
    let config = load_config(global)?;
    let snapshot = &config.snapshot;

    let response = match filter {
        Some(ConfigKind::Policy) => serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "source": snapshot.policy_source,
            "policy": config.policy,
        }),
        Some(ConfigKind::Training) => serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "source": snapshot.training_source,
            "training": config.training,
        }),
        Some(ConfigKind::Symptoms) => serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "source": snapshot.symptoms_source,
            "symptoms": config.symptoms,
        }),
        None => serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "config_dir": resolver.resolve_config_dir().map(|d| d.display().to_string()),
            "snapshot": snapshot,
            "policy": config.policy,
            "training": config.training,
            "symptoms": config.symptoms,
        }),
    };

    match global.format {
        OutputFormat::Json => print_json(&response)?,
        OutputFormat::Human => {
            println!("# st-core config show");
            println!();
            if let Some(dir) = resolver.resolve_config_dir() {
                println!("Config directory: {}", dir.display());
            }
            let sources = [
                (ConfigKind::Policy, "policy", &snapshot.policy_source),
                (ConfigKind::Training, "training", &snapshot.training_source),
                (ConfigKind::Symptoms, "symptoms", &snapshot.symptoms_source),
            ];
            for (kind, name, source) in sources {
                if filter.is_some_and(|f| f != kind) {
                    continue;
                }
                println!();
                println!("## {}", name);
                match &source.path {
                    Some(path) => {
                        println!("Source: {} ({})", path, source.resolution);
                        println!("Hash: {}", source.hash.as_deref().unwrap_or("n/a"));
                    }
                    None => println!("Source: built-in defaults"),
                }
            }
            println!();
            println!("Combined hash: {}", snapshot.combined_hash);
        }
    }
    Ok(())
}

fn run_config_schema(kind: ConfigKind) -> Result<()> {
    let schema = match kind {
        ConfigKind::Policy => schemars::schema_for!(DialogPolicy),
        ConfigKind::Training => schemars::schema_for!(TrainingConfig),
        ConfigKind::Symptoms => schemars::schema_for!(SymptomTable),
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

/// Validate configuration files.
fn run_config_validate(
    global: &GlobalOpts,
    path: Option<&Path>,
    kind: Option<ConfigKind>,
) -> Result<()> {
    let validated = match path {
        Some(path) => {
            let kind = kind.or_else(|| ConfigKind::from_path(path)).ok_or_else(|| {
                Error::Config(format!(
                    "cannot tell which config {} is; pass --file policy|training|symptoms",
                    path.display()
                ))
            })?;
            let mut paths = ConfigPaths::default();
            match kind {
                ConfigKind::Policy => paths.policy_path = Some(path.to_path_buf()),
                ConfigKind::Training => paths.training_path = Some(path.to_path_buf()),
                ConfigKind::Symptoms => paths.symptoms_path = Some(path.to_path_buf()),
            }
            let resolver = ConfigResolver::new(paths);
            let source = match kind {
                ConfigKind::Policy => resolver.load_policy()?.1,
                ConfigKind::Training => resolver.load_training()?.1,
                ConfigKind::Symptoms => resolver.load_symptoms()?.1,
            };
            vec![serde_json::json!({
                "path": source.path,
                "hash": source.hash,
            })]
        }
        None => {
            let config = load_config(global)?;
            config.validate()?;
            let snapshot = config.snapshot;
            [
                snapshot.policy_source,
                snapshot.training_source,
                snapshot.symptoms_source,
            ]
            .into_iter()
            .map(|s| serde_json::json!({ "path": s.path, "hash": s.hash, "resolution": s.resolution }))
            .collect()
        }
    };

    match global.format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "status": "valid",
            "files": validated,
        }))?,
        OutputFormat::Human => println!("✓ configuration is valid"),
    }
    Ok(())
}

fn print_version(global: &GlobalOpts) -> Result<()> {
    match global.format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "st_core_version": env!("CARGO_PKG_VERSION"),
            "model_schema_version": st_core::model::MODEL_SCHEMA_VERSION,
        }))?,
        OutputFormat::Human => {
            println!("st-core {}", env!("CARGO_PKG_VERSION"));
            println!("schema version: {}", SCHEMA_VERSION);
        }
    }
    Ok(())
}

/// Report a failed command on stderr and pick its exit code.
fn output_error(global: &GlobalOpts, error: &Error) -> ExitCode {
    let exit_code = ExitCode::from_error(error);
    if exit_code.is_internal_error() {
        error!(
            event = event_names::INTERNAL_ERROR,
            code = error.code(),
            error = %error,
            "Command failed"
        );
    }

    let structured = StructuredError::from(error);
    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "status": "error",
                "exit_code": exit_code.code_name(),
                "error": structured,
            });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&response).unwrap_or_else(|_| structured.to_json())
            );
        }
        OutputFormat::Human => eprintln!("{}", structured.to_human(error.headline())),
    }
    exit_code
}
