use std::{
    io::{self, IsTerminal, Read},
    path::PathBuf,
    process::ExitCode,
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{ClientError, DeleteOutcome, HttpRepositoryApi, RepositoryClient};
use shared::domain::DescriptionId;
use tracing_subscriber::EnvFilter;

mod config;
mod terminal;

use config::load_settings;
use terminal::TerminalNotifier;

#[derive(Parser, Debug)]
#[command(about = "Manage the device descriptions held by a discovery repository")]
struct Cli {
    /// Settings file; defaults to ./repository-client.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Repository base url, overriding settings and environment.
    #[arg(long)]
    base_url: Option<String>,
    /// Answer yes to every confirmation prompt.
    #[arg(long, short = 'y', global = true)]
    yes: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all device descriptions.
    List,
    /// Print the example device description.
    Example,
    /// Show repository and broker status.
    Status,
    /// Show the capabilities summary.
    Capabilities,
    /// Insert a device description read from a file, stdin, or the example.
    Add {
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Delete one device description.
    Delete { id: String },
    /// Delete every device description.
    Clear,
}

fn read_description_text(file: Option<&PathBuf>) -> Result<Option<String>> {
    if let Some(path) = file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        return Ok(Some(text));
    }
    if io::stdin().is_terminal() {
        return Ok(None);
    }
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("failed to read device description from stdin")?;
    Ok(Some(text))
}

fn success(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        settings.base_url = base_url;
    }

    let api = HttpRepositoryApi::new(&settings.base_url, settings.request_timeout())?;
    let notifier = TerminalNotifier::new(cli.yes);
    let client =
        RepositoryClient::with_options(Arc::new(api), Arc::new(notifier), settings.client_options());

    client.initialize().await;

    let code = match cli.command {
        Command::List => {
            let state = client.snapshot().await;
            for description in &state.descriptions {
                println!("{}\t{}", description.id(), description.name());
            }
            success(state.descriptions_loaded)
        }
        Command::Example => {
            let state = client.snapshot().await;
            if state.example.is_some() {
                println!("{}", state.input);
            }
            success(state.example.is_some())
        }
        Command::Status => {
            let state = client.snapshot().await;
            for (key, value) in state.status.entries() {
                println!("{key}: {value}");
            }
            success(!state.status.is_empty())
        }
        Command::Capabilities => match client.refresh_capabilities().await {
            Ok(capabilities) => {
                for (key, kind) in capabilities {
                    println!("{key}\t{kind}");
                }
                ExitCode::SUCCESS
            }
            Err(_) => ExitCode::FAILURE,
        },
        Command::Add { file } => {
            let result = match read_description_text(file.as_ref())? {
                Some(text) => client.add_description(text).await,
                None => client.add_from_input().await,
            };
            match result {
                Ok(created) => {
                    println!("{}", created.id());
                    ExitCode::SUCCESS
                }
                Err(_) => {
                    if let Some(errors) = client.snapshot().await.validation_errors {
                        for error in errors {
                            eprintln!("  - {error}");
                        }
                    }
                    ExitCode::FAILURE
                }
            }
        }
        Command::Delete { id } => {
            match client.delete_description(&DescriptionId::from(id)).await {
                Ok(DeleteOutcome::Deleted | DeleteOutcome::Cancelled) => ExitCode::SUCCESS,
                Err(err @ ClientError::UnknownDescription(_)) => {
                    eprintln!("{err}");
                    ExitCode::FAILURE
                }
                Err(ClientError::Request(_)) => ExitCode::FAILURE,
            }
        }
        Command::Clear => success(client.clear_repository().await.is_ok()),
    };

    Ok(code)
}
