use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub prompts: PromptsConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default = "default_source_base_url")]
    pub base_url: String,
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_source_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_source_base_url(),
            token_env: default_token_env(),
            timeout_secs: default_source_timeout_secs(),
        }
    }
}

fn default_source_base_url() -> String {
    "https://www.googleapis.com/drive/v3".to_string()
}
fn default_token_env() -> String {
    "GOOGLE_ACCESS_TOKEN".to_string()
}
fn default_source_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeminiConfig {
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_gemini_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_gemini_base_url(),
            api_key_env: default_api_key_env(),
            model: default_model(),
            timeout_secs: default_gemini_timeout_secs(),
        }
    }
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}
fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}
fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}
fn default_gemini_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Deserialize, Clone)]
pub struct PromptsConfig {
    #[serde(default = "default_analysis_prompt")]
    pub analysis: PathBuf,
    #[serde(default = "default_ocr_prompt")]
    pub ocr: PathBuf,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            analysis: default_analysis_prompt(),
            ocr: default_ocr_prompt(),
        }
    }
}

fn default_analysis_prompt() -> PathBuf {
    PathBuf::from("prompts/analysis_prompt.txt")
}
fn default_ocr_prompt() -> PathBuf {
    PathBuf::from("prompts/ocr_prompt.txt")
}

/// Fixed delays applied between remote calls.
#[derive(Debug, Deserialize, Clone)]
pub struct PacingConfig {
    #[serde(default = "default_upload_delay_ms")]
    pub upload_delay_ms: u64,
    #[serde(default = "default_analysis_delay_ms")]
    pub analysis_delay_ms: u64,
    #[serde(default = "default_rate_limit_backoff_ms")]
    pub rate_limit_backoff_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            upload_delay_ms: default_upload_delay_ms(),
            analysis_delay_ms: default_analysis_delay_ms(),
            rate_limit_backoff_ms: default_rate_limit_backoff_ms(),
        }
    }
}

fn default_upload_delay_ms() -> u64 {
    1000
}
fn default_analysis_delay_ms() -> u64 {
    1000
}
fn default_rate_limit_backoff_ms() -> u64 {
    5000
}

impl PacingConfig {
    pub fn pacing(&self) -> Pacing {
        Pacing {
            upload_delay: Duration::from_millis(self.upload_delay_ms),
            analysis_delay: Duration::from_millis(self.analysis_delay_ms),
            rate_limit_backoff: Duration::from_millis(self.rate_limit_backoff_ms),
        }
    }
}

/// Resolved pacing used by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Pause after each successful upload.
    pub upload_delay: Duration,
    /// Pause after each successful analysis call.
    pub analysis_delay: Duration,
    /// Pause after a rate-limit or service error.
    pub rate_limit_backoff: Duration,
}

impl Pacing {
    /// No delays at all. Useful for tests and dry runs.
    pub fn none() -> Self {
        Self {
            upload_delay: Duration::ZERO,
            analysis_delay: Duration::ZERO,
            rate_limit_backoff: Duration::ZERO,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        PacingConfig::default().pacing()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_responses_path")]
    pub responses: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            responses: default_responses_path(),
        }
    }
}

fn default_responses_path() -> PathBuf {
    PathBuf::from("responses.json")
}

/// Which prompt file a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PromptKind {
    /// Document analysis.
    Analysis,
    /// Plain text transcription.
    Ocr,
}

impl Config {
    /// Read the prompt text for `kind`.
    pub fn load_prompt(&self, kind: PromptKind) -> Result<String> {
        let path = match kind {
            PromptKind::Analysis => &self.prompts.analysis,
            PromptKind::Ocr => &self.prompts.ocr,
        };
        let prompt = std::fs::read_to_string(path)
            .with_context(|| format!("Prompt file not found: {}", path.display()))?;
        if prompt.trim().is_empty() {
            bail!("Prompt file is empty: {}", path.display());
        }
        Ok(prompt)
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.gemini.model.trim().is_empty() {
        bail!("gemini.model must not be empty");
    }

    for (key, url) in [
        ("source.base_url", &config.source.base_url),
        ("gemini.base_url", &config.gemini.base_url),
    ] {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            bail!("{} must be an http(s) URL, got '{}'", key, url);
        }
    }

    if config.source.timeout_secs == 0 || config.gemini.timeout_secs == 0 {
        bail!("timeout_secs must be > 0");
    }

    Ok(())
}
