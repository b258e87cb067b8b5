use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use toolbridge::{Config, FsAuditSink, Registry, Server};

fn usage() -> &'static str {
    "Usage:\n  toolbridge serve\n  toolbridge help\n  toolbridge --help\n"
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("--help") | Some("-h") | Some("help") => {
            print!("{}", usage());
            ExitCode::SUCCESS
        }
        Some("serve") => {
            if args.len() > 1 {
                if matches!(args[1].as_str(), "--help" | "-h" | "help") {
                    print!("Usage:\n  toolbridge serve\n");
                    return ExitCode::SUCCESS;
                }
                eprint!("{}", usage());
                return ExitCode::from(2);
            }
            match serve().await {
                Ok(()) => ExitCode::SUCCESS,
                Err(error) => {
                    eprintln!("toolbridge: {error}");
                    ExitCode::FAILURE
                }
            }
        }
        _ => {
            eprint!("{}", usage());
            ExitCode::from(2)
        }
    }
}

async fn serve() -> toolbridge::BridgeResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load()?;
    tokio::fs::create_dir_all(config.runs_path())
        .await
        .map_err(|error| {
            toolbridge::BridgeError::Internal(format!(
                "failed to create runs dir {}: {error}",
                config.runs_dir
            ))
        })?;
    let registry = Registry::load(&config.registry_path())?;
    tracing::info!(tools = registry.len(), "registry loaded");

    let audit = Arc::new(FsAuditSink::new(config.runs_path()));
    let mut server = Server::bind(&config, registry, audit).await?;

    tokio::signal::ctrl_c().await.map_err(|error| {
        toolbridge::BridgeError::Internal(format!("failed to wait for shutdown signal: {error}"))
    })?;
    tracing::info!("shutting down");
    server.shutdown();
    Ok(())
}
