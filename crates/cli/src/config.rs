//! Generation backend settings shared by the `serve` and `export` commands.

use clap::Args;
use notes_service::generator::{DEFAULT_API_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use notes_service::GeminiConfig;

#[derive(Args, Debug, Clone)]
pub struct GeminiArgs {
    /// Gemini API key (notes cannot be generated without one)
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model name
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Base URL of the Generative Language API
    #[arg(long, env = "GEMINI_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "STUDYNOTES_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

impl From<GeminiArgs> for GeminiConfig {
    fn from(args: GeminiArgs) -> Self {
        Self {
            api_key: args.api_key,
            model: args.model,
            api_url: args.api_url,
            timeout_secs: args.timeout_secs,
        }
    }
}
