use crate::tools::generate::CompletionSettings;
use clap::Parser;
use std::time::Duration;

pub const SERVER_NAME: &str = "pipeline-ai-mcp";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Runtime settings. Every flag can also be supplied through the environment.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pipeline-ai-mcp",
    version,
    about = "Generates CI/CD pipeline configuration over JSON-RPC on stdio"
)]
pub struct Config {
    /// Credential for the completion service. Without it every request is
    /// answered from the local templates.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, env = "PIPELINE_AI_MODEL", default_value = "gpt-4o")]
    pub model: String,

    #[arg(long, env = "PIPELINE_AI_TEMPERATURE", default_value_t = 0.7)]
    pub temperature: f64,

    #[arg(long, env = "PIPELINE_AI_MAX_TOKENS", default_value_t = 4000)]
    pub max_tokens: u32,

    /// Per-request timeout for the completion service; 0 disables it.
    #[arg(long, env = "PIPELINE_AI_REQUEST_TIMEOUT_SECS", default_value_t = 120)]
    pub request_timeout_secs: u64,

    /// Longest accepted request line, in bytes.
    #[arg(
        long,
        env = "PIPELINE_AI_MAX_MESSAGE_BYTES",
        default_value_t = 1024 * 1024,
        value_parser = parse_positive
    )]
    pub max_message_bytes: usize,

    /// Number of requests handled concurrently before reading pauses.
    #[arg(
        long,
        env = "PIPELINE_AI_MAX_IN_FLIGHT",
        default_value_t = 64,
        value_parser = parse_positive
    )]
    pub max_in_flight: usize,
}

fn parse_positive(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_owned()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

impl Config {
    /// The configured credential, ignoring blank values.
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_owned)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    pub fn completion_settings(&self) -> CompletionSettings {
        CompletionSettings {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}
