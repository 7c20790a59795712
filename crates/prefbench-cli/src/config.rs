//! Configuration loading from TOML files.
//!
//! Lookup order:
//! 1. `--config <path>` on the command line
//! 2. `$PREFBENCH_CONFIG` environment variable
//! 3. `~/.config/prefbench/config.toml`
//! 4. Built-in defaults (everything is optional)

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub models: ModelsConfig,
    pub run: RunConfig,
    pub sampling: SamplingConfig,
    pub delays: DelaysConfig,
}

/// Completion endpoint settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

/// Model identifiers for each role.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub target: String,
    pub user: String,
    pub summarizer: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Simulated turns per topic.
    pub turns: usize,
    /// Token budget for trimmed histories (approximate).
    pub max_context_tokens: usize,
    pub max_response_tokens: u32,
    pub topics_file: PathBuf,
    pub output_file: PathBuf,
}

/// Temperatures per call site.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub target: f32,
    pub user: f32,
    pub probe: f32,
    pub summary: f32,
    pub judge: f32,
}

/// Fixed pauses to stay under provider rate limits.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DelaysConfig {
    pub turn_ms: u64,
    pub topic_ms: u64,
}

// --- Defaults ---

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: prefbench_openai::client::DEFAULT_BASE_URL.into(),
            api_key_env: "OPENAI_API_KEY".into(),
            timeout_secs: 60,
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            target: "gpt-4o-mini".into(),
            user: "gpt-4o-mini".into(),
            summarizer: "gpt-4o-mini".into(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            turns: 10,
            max_context_tokens: 8000,
            max_response_tokens: 500,
            topics_file: PathBuf::from("topics_data.json"),
            output_file: PathBuf::from("llm_preference_experiment_results.json"),
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            target: 0.7,
            user: 0.8,
            probe: 0.5,
            summary: 0.2,
            judge: 0.1,
        }
    }
}

impl Default for DelaysConfig {
    fn default() -> Self {
        Self {
            turn_ms: 1000,
            topic_ms: 2000,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl DelaysConfig {
    pub fn turn(&self) -> Duration {
        Duration::from_millis(self.turn_ms)
    }

    pub fn topic(&self) -> Duration {
        Duration::from_millis(self.topic_ms)
    }
}

impl Config {
    fn validate(&self) -> Result<()> {
        let s = &self.sampling;
        for (name, t) in [
            ("target", s.target),
            ("user", s.user),
            ("probe", s.probe),
            ("summary", s.summary),
            ("judge", s.judge),
        ] {
            if !(0.0..=2.0).contains(&t) {
                bail!("sampling.{name} = {t} is outside [0, 2]");
            }
        }
        if self.run.turns == 0 {
            bail!("run.turns must be at least 1");
        }
        Ok(())
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load config from disk. Returns defaults if no config file exists.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(p) = explicit {
        // An explicitly requested file must exist.
        return read_config(p);
    }

    if let Some(p) = config_path() {
        if p.exists() {
            return read_config(&p);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_config(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Resolve the config file path.
fn config_path() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("PREFBENCH_CONFIG") {
        return Some(PathBuf::from(p));
    }

    directories::BaseDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(".config")
            .join("prefbench")
            .join("config.toml")
    })
}

/// Show the active config path (for `prefbench config`).
pub fn show_config_path(explicit: Option<&Path>) -> String {
    match explicit.map(Path::to_path_buf).or_else(config_path) {
        Some(p) if p.exists() => format!("{} (loaded)", p.display()),
        Some(p) => format!("{} (not found, using defaults)", p.display()),
        None => "no config path resolved (using defaults)".into(),
    }
}
