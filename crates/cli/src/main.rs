use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use spacelift_outputs_api::{FixtureSource, OutputClient, ProcessEnvironment, StackOutputRecord, StackOutputsRecord, resolve};
use spacelift_outputs_types::ExplicitConfig;
use tracing::debug;

/// Read Spacelift stack outputs.
#[derive(Parser, Debug)]
#[command(name = "spacelift-outputs", version, about)]
struct Cli {
    /// SpaceLift API token (defaults to SPACELIFT_API_TOKEN)
    #[arg(long, global = true)]
    api_token: Option<String>,

    /// GraphQL endpoint (defaults to https://<account>.app.spacelift.io/graphql)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Account name (defaults to TF_VAR_spacelift_account_name or spacelift_account_name)
    #[arg(long, global = true)]
    account_name: Option<String>,

    /// Serve outputs from a JSON fixture file instead of the API
    #[arg(long, global = true, conflicts_with = "offline")]
    fixture_file: Option<PathBuf>,

    /// Serve placeholder outputs without contacting the API
    #[arg(long, global = true)]
    offline: bool,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every output of a stack
    Outputs { stack_id: String },
    /// Print a single output of a stack
    Output { stack_id: String, output_name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let client = build_client(&cli)?;

    let rendered = match &cli.command {
        Command::Outputs { stack_id } => serde_json::to_string_pretty(&StackOutputsRecord::read(&client, stack_id).await?)?,
        Command::Output { stack_id, output_name } => {
            serde_json::to_string_pretty(&StackOutputRecord::read(&client, stack_id, output_name).await?)?
        }
    };
    println!("{rendered}");
    Ok(())
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_client(cli: &Cli) -> Result<OutputClient> {
    if let Some(path) = &cli.fixture_file {
        debug!(path = %path.display(), "using fixture outputs");
        return Ok(OutputClient::fixture(FixtureSource::from_path(path)?));
    }
    if cli.offline {
        debug!("offline mode, using placeholder outputs");
        return Ok(OutputClient::fixture(FixtureSource::new()));
    }

    let config = resolve(&explicit_config(cli), &ProcessEnvironment).context("Unable to configure the SpaceLift API client")?;
    let client = OutputClient::remote_with_timeout(&config, Duration::from_secs(cli.timeout_secs))
        .context("Unable to Create SpaceLift API Client")?;
    Ok(client)
}

fn explicit_config(cli: &Cli) -> ExplicitConfig {
    ExplicitConfig {
        api_token: cli.api_token.clone().into(),
        api_url: cli.api_url.clone().into(),
        account_name: cli.account_name.clone().into(),
    }
}
