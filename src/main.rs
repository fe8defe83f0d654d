use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use weatherwise::config::AssistantConfig;
use weatherwise::pipeline::{ConsoleSink, WeatherPipeline};
use weatherwise::{AssistantError, telemetry, web};

const DEFAULT_QUESTION: &str = "Will it be sunny in Boston tomorrow?";

/// Answers natural-language weather questions
#[derive(Debug, Parser)]
#[command(name = "weatherwise", version, about)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true, env = "WEATHERWISE_CONFIG")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP service exposing POST /weather
    Serve {
        /// Address to bind, overrides server.host
        #[arg(long)]
        host: Option<String>,
        /// Port to bind, overrides server.port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Answer a single question and print every intermediate result
    Ask {
        #[arg(default_value = DEFAULT_QUESTION)]
        question: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = AssistantConfig::load_from_path(cli.config.clone())?;
    config.validate_settings()?;
    telemetry::init(&config.logging, cli.verbose)?;

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let pipeline = Arc::new(WeatherPipeline::from_config(&config)?);
            web::run(&config.server, pipeline).await
        }
        Command::Ask { question } => ask_once(&config, &question).await,
    }
}

async fn ask_once(config: &AssistantConfig, question: &str) -> Result<()> {
    let mut sink = ConsoleSink::new(std::io::stdout());

    let pipeline = WeatherPipeline::from_config(config)?;

    match pipeline.answer(question, &mut sink).await {
        Ok(_) => Ok(()),
        Err(err @ AssistantError::WeatherUnavailable { .. }) => {
            sink.report_failure(&err);
            Ok(())
        }
        Err(err) if err.is_client_error() => {
            sink.report_failure(&err);
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
