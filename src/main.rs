use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use paper_insight::config::{
    find_config_file, load_config, save_config, Config, Credentials, LogFormat, CONFIG_FILE_NAME,
    ENV_PREFIX, HF_TOKEN_ENV, HUGGINGFACE_API_KEY_ENV,
};
use paper_insight::models::{PaperEntry, PaperRecord, PipelineReport, SearchQuery};
use paper_insight::pipeline::{Pipeline, PipelineEvent};
use paper_insight::ui::{self, Spinner, Status};
use paper_insight::utils::redact_sensitive;
use paper_insight::{SearchClient, Summarizer};
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Paper Insight - search arXiv, summarize abstracts and synthesize an overall insight
#[derive(Parser, Debug)]
#[command(name = "paper-insight")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search arXiv, summarize abstracts and synthesize an overall research insight", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log line format (overrides the configuration file)
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormatArg>,

    /// Replace sensitive terms in printed summaries and insights with [REDACTED]
    #[arg(long, global = true)]
    redact: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Colored when stdout is a terminal, plain otherwise
    Auto,
    /// Plain text without colors
    Plain,
    /// JSON (machine-readable)
    Json,
}

/// Log line format
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormatArg {
    Plain,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Plain => LogFormat::Plain,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search arXiv and list matching papers
    #[command(alias = "s")]
    Search {
        /// Research topic
        query: String,

        /// Maximum number of results (default: from configuration)
        #[arg(long, short)]
        max_results: Option<usize>,
    },

    /// Summarize a piece of text ("-" reads standard input)
    Summarize {
        /// Text to summarize
        text: String,
    },

    /// Search, summarize every result and synthesize an insight
    #[command(alias = "run")]
    Analyze {
        /// Research topic
        topic: String,

        /// Maximum number of papers (default: from configuration)
        #[arg(long, short)]
        max_results: Option<usize>,
    },

    /// Write a configuration file with default values
    InitConfig {
        /// Destination (default: ./paper-insight.toml)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long, short)]
        force: bool,
    },

    /// Show recognised environment variables
    Env,

    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Print all recognised environment variables
fn print_env_vars() {
    println!("Paper Insight - Environment Variables");
    println!();
    println!("Credentials:");
    println!(
        "  {:<34}Hugging Face access token for summarization and insights",
        HUGGINGFACE_API_KEY_ENV
    );
    println!("  {:<34}Used when {} is not set", HF_TOKEN_ENV, HUGGINGFACE_API_KEY_ENV);
    println!();
    println!("Configuration overrides ({}__<SECTION>__<KEY>):", ENV_PREFIX);
    println!("  {}__SEARCH__MAX_RESULTS          Papers per run (default: 5)", ENV_PREFIX);
    println!("  {}__SEARCH__MAX_RETRIES          Search attempts (default: 3)", ENV_PREFIX);
    println!("  {}__SEARCH__BACKOFF_FACTOR       Backoff base in seconds (default: 2.0)", ENV_PREFIX);
    println!("  {}__SUMMARIZER__ENABLED          Use the remote summarizer (default: true)", ENV_PREFIX);
    println!("  {}__INSIGHT__MODEL               Chat model for insights", ENV_PREFIX);
    println!("  {}__LOGGING__FORMAT              plain or json", ENV_PREFIX);
    println!();
    println!("Other Settings:");
    println!("  RUST_LOG                          Rust logging filter (e.g., paper_insight=debug)");
    println!();
    println!("A .env file in the working directory is loaded at startup.");
}

fn init_tracing(cli: &Cli, config: &Config) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => config.logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("paper_insight={}", level)),
    );

    let format = cli
        .log_format
        .map(LogFormat::from)
        .unwrap_or(config.logging.format);

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Plain => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn resolve_config(cli: &Cli) -> Result<(Config, Option<PathBuf>)> {
    let path = cli.config.clone().or_else(find_config_file);
    let config = load_config(path.as_deref()).with_context(|| match &path {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load configuration from the environment".to_string(),
    })?;
    Ok((config, path))
}

fn spinner(cli: &Cli, msg: &str) -> Spinner {
    if cli.quiet || cli.output == OutputFormat::Json {
        Spinner::hidden()
    } else {
        Spinner::new(msg)
    }
}

fn redact_report(report: &mut PipelineReport) {
    for entry in &mut report.papers {
        entry.summary = redact_sensitive(&entry.summary);
    }
    report.insight = redact_sensitive(&report.insight);
}

fn redact_records(records: &mut [PaperRecord]) {
    for record in records {
        record.summary = redact_sensitive(&record.summary);
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Reject topics the search stage would turn into a placeholder, with a user-facing message
fn check_topic(topic: &str) -> bool {
    match SearchQuery::parse(topic) {
        Ok(_) => true,
        Err(err) => {
            ui::eprint_status(Status::Error, &format!("Please enter a research topic ({}).", err));
            false
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Commands that need neither configuration nor logging
    match &cli.command {
        None => {
            ui::print_banner();
            println!();
            Cli::command().print_help()?;
            return Ok(());
        }
        Some(Commands::Env) => {
            print_env_vars();
            return Ok(());
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                *shell,
                &mut Cli::command(),
                env!("CARGO_PKG_NAME"),
                &mut std::io::stdout(),
            );
            return Ok(());
        }
        Some(Commands::InitConfig { path, force }) => {
            let path = path.clone().unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            save_config(&Config::default(), &path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            ui::print_status(Status::Success, &format!("Wrote {}", path.display()));
            return Ok(());
        }
        Some(_) => {}
    }

    let (config, config_path) = resolve_config(&cli)?;
    init_tracing(&cli, &config);
    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    match cli.output {
        OutputFormat::Auto => ui::set_color_enabled(ui::is_terminal()),
        OutputFormat::Plain | OutputFormat::Json => ui::set_color_enabled(false),
    }

    let credentials = Credentials::from_env();
    tracing::debug!("Resolved {:?}", credentials);

    match &cli.command {
        Some(Commands::Search { query, max_results }) => {
            if !check_topic(query) {
                return Ok(());
            }

            let client = SearchClient::from_config(&config.search)?;
            let max_results = max_results.unwrap_or(config.search.max_results);

            let progress = spinner(&cli, &format!("Searching arXiv for \"{}\"", query.trim()));
            let mut records = client.search(query, max_results).await;
            progress.finish_and_clear();

            if cli.redact {
                redact_records(&mut records);
            }

            if cli.output == OutputFormat::Json {
                return print_json(&records);
            }

            ui::print_section(&format!("Papers on \"{}\"", query.trim()));
            for (index, record) in records.into_iter().enumerate() {
                let summary = record.summary.clone();
                ui::print_paper(index, &PaperEntry { record, summary });
            }
            println!();
        }

        Some(Commands::Summarize { text }) => {
            let text = if text == "-" {
                let mut buffer = String::new();
                std::io::stdin()
                    .read_to_string(&mut buffer)
                    .context("Failed to read standard input")?;
                buffer
            } else {
                text.clone()
            };

            let summarizer = Summarizer::new(&config.summarizer, &credentials);
            let progress = spinner(&cli, "Summarizing");
            let mut summary = summarizer.summarize(&text).await;
            progress.finish_and_clear();

            if cli.redact {
                summary = redact_sensitive(&summary);
            }

            if cli.output == OutputFormat::Json {
                return print_json(&serde_json::json!({ "summary": summary }));
            }
            println!("{}", summary);
        }

        Some(Commands::Analyze { topic, max_results }) => {
            if !check_topic(topic) {
                return Ok(());
            }

            let pipeline = Pipeline::from_config(&config, &credentials)?;
            let progress = spinner(&cli, &format!("Searching arXiv for \"{}\"", topic.trim()));

            let mut report = pipeline
                .run_with_progress(topic, *max_results, |event| match event {
                    PipelineEvent::SearchFinished { count, .. } => {
                        progress.set_message(format!("Summarizing {} papers", count));
                    }
                    PipelineEvent::Summarized {
                        index,
                        total,
                        title,
                    } => {
                        progress.set_message(format!(
                            "Summarized ({}/{}) {}",
                            index + 1,
                            total,
                            ui::truncate_with_ellipsis(&title, 50)
                        ));
                        if index + 1 == total {
                            progress.set_message("Synthesizing insight");
                        }
                    }
                    PipelineEvent::InsightReady => {}
                })
                .await;

            if report.is_degraded() {
                progress.finish_with_warning("Search degraded; showing what is available");
            } else {
                progress.finish_with_success(&format!("Analyzed {} papers", report.papers.len()));
            }

            if cli.redact {
                redact_report(&mut report);
            }

            if cli.output == OutputFormat::Json {
                return print_json(&report);
            }
            ui::print_report(&report);
        }

        None
        | Some(Commands::Env)
        | Some(Commands::Completions { .. })
        | Some(Commands::InitConfig { .. }) => {}
    }

    Ok(())
}
