mod config;
mod experiment;
mod prompts;
mod report;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use prefbench_openai::OpenAiClient;
use prefbench_store::{load_topics, read_results, write_results};

use crate::config::Config;
use crate::experiment::Experiment;

#[derive(Parser)]
#[command(
    name = "prefbench",
    version,
    about = "Compare full-history and summarized-history memory for chat assistants"
)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log request-level detail
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the experiment over every topic and save the results
    Run {
        /// Topics JSON file
        #[arg(short, long)]
        topics: Option<PathBuf>,

        /// Results JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Simulated turns per topic
        #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..))]
        turns: Option<u32>,
    },
    /// Load and list topics without calling any model
    Topics {
        /// Topics JSON file
        #[arg(short, long)]
        topics: Option<PathBuf>,
    },
    /// Re-tally a saved results file
    Report {
        /// Results JSON file
        results: PathBuf,
    },
    /// Show configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref(), cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    // A missing .env is fine; the key may already be in the environment.
    let _ = dotenvy::dotenv();

    let mut cfg = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            topics,
            output,
            turns,
        } => {
            apply_overrides(&mut cfg, topics, output, turns);
            cmd_run(&cfg)
        }
        Commands::Topics { topics } => {
            apply_overrides(&mut cfg, topics, None, None);
            cmd_topics(&cfg)
        }
        Commands::Report { results } => cmd_report(&results),
        Commands::Config => cmd_config(&cfg, cli.config.as_deref()),
    }
}

/// `RUST_LOG` wins when set; otherwise `info`, or `debug` with `--verbose`.
fn log_filter(rust_log: Option<&str>, verbose: bool) -> EnvFilter {
    match rust_log.map(str::trim).filter(|s| !s.is_empty()) {
        Some(directives) => EnvFilter::new(directives),
        None if verbose => EnvFilter::new("debug"),
        None => EnvFilter::new("info"),
    }
}

fn apply_overrides(
    cfg: &mut Config,
    topics: Option<PathBuf>,
    output: Option<PathBuf>,
    turns: Option<u32>,
) {
    if let Some(p) = topics {
        cfg.run.topics_file = p;
    }
    if let Some(p) = output {
        cfg.run.output_file = p;
    }
    if let Some(n) = turns {
        cfg.run.turns = n as usize;
    }
}

fn cmd_run(cfg: &Config) -> Result<()> {
    let topics = match load_topics(&cfg.run.topics_file) {
        Ok(t) if !t.is_empty() => t,
        Ok(_) => {
            error!("{} contains no topics. Exiting.", cfg.run.topics_file.display());
            return Ok(());
        }
        Err(e) => {
            error!("{e}");
            error!("No topics data loaded. Exiting.");
            return Ok(());
        }
    };

    let api_key = std::env::var(&cfg.api.api_key_env)
        .with_context(|| format!("${} is not set", cfg.api.api_key_env))?;
    let client = OpenAiClient::new(&cfg.api.base_url, api_key, cfg.api.timeout());
    info!(
        "target={} user={} summarizer={} turns={} endpoint={}",
        cfg.models.target,
        cfg.models.user,
        cfg.models.summarizer,
        cfg.run.turns,
        client.endpoint()
    );

    let summary = Experiment::new(&client, cfg).run(&topics);

    report::print_tally(
        &format!(
            "Preference Retention ({} topics, target: {})",
            topics.len(),
            cfg.models.target
        ),
        &summary.tally,
        Some(summary.abandoned),
    );

    write_results(&cfg.run.output_file, &summary.results)
        .with_context(|| format!("writing {}", cfg.run.output_file.display()))?;
    println!(
        "All experiment results saved to {}",
        cfg.run.output_file.display()
    );
    Ok(())
}

fn cmd_topics(cfg: &Config) -> Result<()> {
    let topics = load_topics(&cfg.run.topics_file)?;
    if topics.is_empty() {
        println!("No topics in {}", cfg.run.topics_file.display());
        return Ok(());
    }
    for t in &topics {
        let p = &t.preferences;
        println!("[{}] {}", t.id, t.name);
        println!("  prompt:   {}", t.initial_user_prompt);
        println!("  focus:    {}", p.content.focus);
        println!("  dislikes: {}", p.content.dislikes_statement);
        println!("  style:    {} / {}", p.stylistic.tone, p.stylistic.format);
    }
    println!("\n{} topics", topics.len());
    Ok(())
}

fn cmd_report(path: &Path) -> Result<()> {
    let records = read_results(path).with_context(|| format!("reading {}", path.display()))?;
    let tally = prefbench_core::WinTally::from_records(&records);
    report::print_tally(
        &format!("Preference Retention ({})", path.display()),
        &tally,
        None,
    );
    Ok(())
}

fn cmd_config(cfg: &Config, explicit: Option<&Path>) -> Result<()> {
    println!("Config: {}", config::show_config_path(explicit));
    println!();
    println!("[api]");
    println!("  base_url = {}", cfg.api.base_url);
    println!("  api_key_env = {}", cfg.api.api_key_env);
    println!("  timeout_secs = {}", cfg.api.timeout_secs);
    println!();
    println!("[models]");
    println!("  target = {}", cfg.models.target);
    println!("  user = {}", cfg.models.user);
    println!("  summarizer = {}", cfg.models.summarizer);
    println!();
    println!("[run]");
    println!("  turns = {}", cfg.run.turns);
    println!("  max_context_tokens = {}", cfg.run.max_context_tokens);
    println!("  max_response_tokens = {}", cfg.run.max_response_tokens);
    println!("  topics_file = {}", cfg.run.topics_file.display());
    println!("  output_file = {}", cfg.run.output_file.display());
    println!();
    println!("[sampling]");
    println!("  target = {}", cfg.sampling.target);
    println!("  user = {}", cfg.sampling.user);
    println!("  probe = {}", cfg.sampling.probe);
    println!("  summary = {}", cfg.sampling.summary);
    println!("  judge = {}", cfg.sampling.judge);
    println!();
    println!("[delays]");
    println!("  turn_ms = {}", cfg.delays.turn_ms);
    println!("  topic_ms = {}", cfg.delays.topic_ms);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "prefbench", "--verbose", "run", "-t", "t.json", "-o", "out.json", "-n", "3",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Run {
                topics,
                output,
                turns,
            } => {
                let mut cfg = Config::default();
                apply_overrides(&mut cfg, topics, output, turns);
                assert_eq!(cfg.run.topics_file, PathBuf::from("t.json"));
                assert_eq!(cfg.run.output_file, PathBuf::from("out.json"));
                assert_eq!(cfg.run.turns, 3);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_zero_turns_rejected() {
        assert!(Cli::try_parse_from(["prefbench", "run", "--turns", "0"]).is_err());
        assert!(Cli::try_parse_from(["prefbench", "run", "-n", "1"]).is_ok());
    }

    #[test]
    fn test_rust_log_overrides_default_level() {
        use tracing_subscriber::filter::LevelFilter;

        let filter = log_filter(Some("warn"), true);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
        let filter = log_filter(None, false);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
        let filter = log_filter(Some("  "), true);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_overrides_keep_defaults() {
        let mut cfg = Config::default();
        apply_overrides(&mut cfg, None, None, None);
        assert_eq!(cfg.run.topics_file, PathBuf::from("topics_data.json"));
        assert_eq!(cfg.run.turns, 10);
    }

    #[test]
    fn test_run_without_topics_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::default();
        cfg.run.topics_file = dir.path().join("missing.json");
        cfg.run.output_file = dir.path().join("results.json");
        cmd_run(&cfg).unwrap();
        assert!(!cfg.run.output_file.exists());
    }

    #[test]
    fn test_report_reads_saved_results() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        let topic = prompts::tests::hiking();
        let mut record =
            prefbench_core::ExperimentRecord::new(&topic, prompts::SUMMARIZATION_PROMPT);
        record.finalize(prefbench_core::JudgeDecision::SummarizedHistory);
        write_results(&path, &[record]).unwrap();
        cmd_report(&path).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[0]["llm_judge_decision"], "Summarized History");
    }
}
