use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::debug;

use chatllm_core::config::{self, ClientConfig, ConfigValidator};
use chatllm_core::{logging, ExtractionMode, NetworkRuntime};

const DEMO_PROMPT: &str = "You are an expert in networking protocols. For the RTSP protocol, \
    the typical sequence is: DESCRIBE, SETUP, PLAY. Please explain where \
    SET_PARAMETER and TEARDOWN should be placed in this sequence.";

#[derive(Parser)]
#[command(name = "chatllm", version, about = "Send one prompt to a chat-completion endpoint")]
struct Cli {
    /// Prompt to send
    #[arg(default_value = DEMO_PROMPT)]
    prompt: String,

    /// Model identifier (defaults to the configured model)
    #[arg(long)]
    model: Option<String>,

    /// Total number of attempts
    #[arg(long)]
    tries: Option<u32>,

    /// Sampling temperature
    #[arg(long)]
    temperature: Option<f32>,

    /// Base URL of the endpoint, e.g. https://api.example.com
    #[arg(long)]
    endpoint: Option<String>,

    /// Log each request and response at debug level
    #[arg(long)]
    debug: bool,

    /// Parse the response as JSON instead of scanning for the content key
    #[arg(long)]
    structured: bool,

    /// YAML or JSON configuration file; `KEY` and `CHATLLM_*` still apply on top
    #[arg(long, short)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(if cli.debug {
        "chatllm_core=debug"
    } else {
        logging::DEFAULT_FILTER
    });

    let config = load_config(&cli)?;
    debug!(endpoint = %config.endpoint_url(), model = %config.model, "configuration loaded");

    let runtime = NetworkRuntime::init(&config)?;
    let client = runtime.client(config);

    let model = cli.model.unwrap_or_else(|| client.config().model.clone());
    let tries = cli.tries.unwrap_or(client.config().max_attempts);
    let temperature = cli.temperature.unwrap_or(client.config().temperature);

    println!("Sending request to LLM API...");
    let response = runtime.chat_blocking(&client, &cli.prompt, &model, tries, temperature);
    runtime.shutdown();

    match response {
        Some(content) => {
            println!("\n=== LLM Response ===");
            println!("{}", content);
            Ok(())
        }
        None => bail!("no response from LLM API after {} attempt(s)", tries.max(1)),
    }
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = config::load_from_file(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?;
            config::apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
            config
        }
        None => ClientConfig::from_env()?,
    };

    if let Some(endpoint) = &cli.endpoint {
        config.base_url = endpoint.clone();
    }
    if cli.structured {
        config.extraction = ExtractionMode::Structured;
    }

    ConfigValidator::new()
        .validate(&config)
        .context("invalid configuration")?;
    Ok(config)
}
