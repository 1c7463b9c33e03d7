//! Command-line interface for Recroute
//!
//! Provides argument parsing and subcommand handling for the Recroute binary.

use clap::{Parser, Subcommand};

/// LLM recommendation proxy for parent-guided math tutoring sessions
#[derive(Parser)]
#[command(name = "recroute")]
#[command(version)]
#[command(about = "LLM recommendation proxy for parent-guided math tutoring sessions")]
#[command(
    long_about = "Recroute routes tutoring-session requests to hosted LLM backends, renders \
    templated prompts from session data, and validates replies into exactly three \
    parent-utterance recommendations with a retry-then-fallback policy."
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# Recroute Configuration
# ======================
#
# This file configures the HTTP server, generation parameters, and the
# model routing table for Recroute.

[server]
# IP address to bind to (0.0.0.0 for all interfaces, 127.0.0.1 for localhost only)
host = "0.0.0.0"

# Port to listen on
port = 3000

# Request timeout in seconds for backend model calls
request_timeout_seconds = 30

[generation]
# Maximum output length for every model invocation
max_tokens = 512

# Sampling temperature for every model invocation
temperature = 0.7

# One [[backends]] entry per supported inbound model identifier.
# kind is "bedrock" (managed-inference invoke API) or "openai"
# (chat completions API).

[[backends]]
model_id = "Llama3-8B"
kind = "bedrock"
model_key = "meta.llama3-8b-instruct-v1:0"
base_url = "https://bedrock-runtime.us-east-1.amazonaws.com"

[[backends]]
model_id = "Llama3-70B"
kind = "bedrock"
model_key = "meta.llama3-70b-instruct-v1:0"
base_url = "https://bedrock-runtime.us-east-1.amazonaws.com"

[[backends]]
model_id = "GPT-4o"
kind = "openai"
model_key = "gpt-4o"
base_url = "https://api.openai.com/v1"
# API key resolution order: api_key_env (if set), OPENAI_API_KEY,
# OPEN_AI_API_KEY, then this file
# api_key_env = "TUTOR_OPENAI_KEY"
api_key_file = "openai.key"

[observability]
# Log level: trace, debug, info, warn, error
log_level = "info"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_config_path() {
        let cli = Cli::parse_from(["recroute"]);
        assert_eq!(cli.config, "config.toml");
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_config_subcommand_with_output() {
        let cli = Cli::parse_from(["recroute", "config", "--output", "out.toml"]);
        match cli.command {
            Some(Command::Config { output }) => assert_eq!(output.as_deref(), Some("out.toml")),
            None => panic!("expected config subcommand"),
        }
    }

    #[test]
    fn test_template_is_a_valid_config() {
        let config = Config::from_toml(generate_config_template()).expect("template parses");
        assert_eq!(config.model_ids(), vec!["Llama3-8B", "Llama3-70B", "GPT-4o"]);
    }
}
