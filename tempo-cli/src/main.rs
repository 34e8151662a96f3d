use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::env;
use std::fs;
use std::path::PathBuf;
use tempo_core::{compute_analytics, time::parse_instant, weekly_report, AnalyticsConfig, Task};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod auth;
mod config;
mod insights;
mod llm;
mod render;
mod state;

use llm::{LlmClient, Provider};
use render::Section;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TEMPO_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "tempo", version = VERSION, about = "Productivity analytics over your task list")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute analytics over a task export and print one section (or all)
    Report {
        /// Task export JSON (defaults to ~/.tempo/tasks.json)
        #[arg(long)]
        tasks: Option<PathBuf>,

        /// Evaluate as of this instant (RFC 3339 or local "YYYY-MM-DD HH:MM")
        #[arg(long)]
        now: Option<String>,

        #[arg(long, value_enum, default_value_t = Section::Comprehensive)]
        section: Section,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Summary of the current week compared with the previous one
    Weekly {
        #[arg(long)]
        tasks: Option<PathBuf>,

        #[arg(long)]
        now: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Print the report followed by narrative suggestions from an LLM provider
    Insights {
        #[arg(long)]
        tasks: Option<PathBuf>,

        /// Overrides [insights].provider from config.toml
        #[arg(long, value_enum)]
        provider: Option<Provider>,

        /// Ignore any cached insights and ask the provider again
        #[arg(long)]
        refresh: bool,
    },

    /// Manage ~/.tempo/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Store provider API keys in ~/.tempo/auth.json
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Paste an API key for a provider (read from stdin)
    SetKey {
        #[arg(value_enum)]
        provider: Provider,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TEMPO_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "tempo=debug,info"
        } else {
            "tempo=info,warn"
        })
    });

    let format = env::var("TEMPO_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    // stderr keeps `--json` output on stdout machine-readable
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn load_tasks(path: Option<PathBuf>) -> Result<Vec<Task>> {
    let path = match path {
        Some(p) => p,
        None => state::tasks_path()?,
    };
    let text = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let report = tempo_ingest::parse_task_export(&text).with_context(|| format!("parsing {}", path.display()))?;

    for w in &report.warnings {
        warn!(task = %w.task_id, field = w.field, "{}", w.message);
    }
    info!(
        path = %path.display(),
        tasks = report.tasks.len(),
        skipped = report.skipped.len(),
        "loaded task export"
    );
    Ok(report.tasks)
}

fn resolve_now(now: Option<&str>, analytics: &AnalyticsConfig) -> Result<DateTime<Utc>> {
    match now {
        Some(s) => parse_instant(s, analytics.timezone).with_context(|| format!("invalid --now {s:?}")),
        None => Ok(Utc::now()),
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Report {
            tasks,
            now,
            section,
            json,
        } => {
            let cfg = config::load_config()?;
            let tasks = load_tasks(tasks)?;
            let now = resolve_now(now.as_deref(), &cfg.analytics)?;
            let report = compute_analytics(&tasks, now, &cfg.analytics);
            if json {
                print_json(&render::section_json(&report, section)?)?;
            } else {
                print!("{}", render::render_section(&report, section));
            }
        }

        Command::Weekly { tasks, now, json } => {
            let cfg = config::load_config()?;
            let tasks = load_tasks(tasks)?;
            let now = resolve_now(now.as_deref(), &cfg.analytics)?;
            let weekly = weekly_report(&tasks, now, &cfg.analytics);
            if json {
                print_json(&weekly)?;
            } else {
                print!("{}", render::render_weekly_report(&weekly));
            }
        }

        Command::Insights {
            tasks,
            provider,
            refresh,
        } => {
            let mut cfg = config::load_config()?;
            if let Some(p) = provider {
                cfg.insights.provider = p;
                cfg.insights.model = None;
            }
            let tasks = load_tasks(tasks)?;
            let now = Utc::now();
            let report = compute_analytics(&tasks, now, &cfg.analytics);
            print!("{}", render::render_section(&report, Section::ProductivityScore));

            let provider = cfg.insights.provider;
            let key = auth::load_auth()?.api_key(provider, |name| env::var(name).ok());
            let client = LlmClient::new(provider, cfg.insights.model(), cfg.insights.temperature, key)?;

            let mut cache = state::FileCache::open(state::insights_cache_path()?)?;
            info!(cache = %cache.path().display(), provider = %provider, "requesting insights");
            let out = insights::generate_insights(
                &mut cache,
                &insights::cache_key(&provider.to_string(), &client.model),
                &tasks,
                &report,
                cfg.insights.cache_policy(),
                now,
                refresh,
                |system, user| client.complete(system, user),
            )?;

            let source = if out.cached { "cached" } else { provider.display_name() };
            println!("== Insights ({source}) ==");
            println!("{}", out.text);
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },

        Command::Auth { command } => match command {
            AuthCommand::SetKey { provider } => auth::paste_api_key(provider)?,
        },
    }

    Ok(())
}
