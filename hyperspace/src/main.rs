use anyhow::bail;
use clap::Parser;
use hyperspace::bundle;
use hyperspace::client::HttpDashboardClient;
use hyperspace::config::{Args, Command};
use hyperspace::editor::{EditorSession, SyncReport};
use hyperspace::{Application, Config, telemetry};
use std::path::PathBuf;

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}

fn check_report(what: &str, report: SyncReport) -> anyhow::Result<()> {
    if !report.is_complete() {
        bail!("Failed to persist {} ranks for ids {:?}; reload to see the stored order", what, report.failed);
    }
    if report.is_noop() {
        println!("Nothing to move.");
    } else {
        println!("Updated {} {} ranks.", report.updated.len(), what);
    }
    Ok(())
}

/// Run a client subcommand against the server at `client.api_url`
async fn run_client(command: Command, config: &Config) -> anyhow::Result<()> {
    let client = HttpDashboardClient::from_config(&config.client)?;
    tracing::debug!(api_url = %client.base_url(), "Loading dashboard");
    let mut session = EditorSession::load(client).await?;

    match command {
        Command::Serve => bail!("serve is not a client command"),
        Command::Export { output } => {
            let archive = session.export().await?;
            let path = output.unwrap_or_else(|| PathBuf::from(bundle::export_file_name(chrono::Utc::now())));
            tokio::fs::write(&path, &archive).await?;
            println!("Exported {} groups to {}", session.tree().groups().len(), path.display());
        }
        Command::Import { file } => {
            let archive = tokio::fs::read(&file).await?;
            session.import(&archive).await?;
            println!("Imported {} groups from {}", session.tree().groups().len(), file.display());
        }
        Command::MoveGroup { from, to } => check_report("group", session.move_group(from, to).await)?,
        Command::MoveLink { group_id, from, to } => check_report("link", session.move_link(group_id, from, to).await)?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before anything else that might build a TLS client
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    // Parse CLI args
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args)?;

    // If --validate flag is set, exit successfully after config validation
    if args.validate {
        println!("Configuration is valid.");
        return Ok(());
    }

    telemetry::init_telemetry()?;

    tracing::debug!("{:?}", args);

    match args.command {
        None | Some(Command::Serve) => {
            // Run the application with graceful shutdown on SIGTERM/Ctrl+C
            let shutdown = shutdown_signal();
            Application::new(config).await?.serve(shutdown).await
        }
        Some(command) => run_client(command, &config).await,
    }
}
