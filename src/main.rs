use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use factcheck_rs::config::Config;
use factcheck_rs::runner::DEFAULT_SESSION;
use factcheck_rs::{server, PipelineRunner};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "factcheck", version, about = "Claim classification + web evidence + LLM verdicts")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
    /// TOML config file
    #[arg(long, global = true, env = "FACTCHECK_CONFIG")]
    config: Option<PathBuf>,
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Serve POST /transcribe and GET /health
    Serve {
        #[arg(long)] host: Option<String>,
        #[arg(short, long)] port: Option<u16>,
    },
    /// Fact-check one piece of text and print the result
    Check {
        #[arg(long, conflicts_with = "file", required_unless_present = "file")] text: Option<String>,
        #[arg(long)] file: Option<PathBuf>,
        #[arg(long, default_value = DEFAULT_SESSION)] session: String,
        /// Also write the JSON result here
        #[arg(long)] out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut cfg = Config::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(level) = cli.log_level {
        cfg.logging.level = level;
    }

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("factcheck_rs={0},factcheck={0},tower_http={0}", cfg.logging.level).into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.cmd {
        Cmd::Serve { host, port } => {
            if let Some(host) = host { cfg.server.host = host; }
            if let Some(port) = port { cfg.server.port = port; }
            let runner = PipelineRunner::from_config(&cfg).context("initializing pipeline")?;
            let addr = format!("{}:{}", cfg.server.host, cfg.server.port);
            info!(addr = %addr, search = ?cfg.search.provider, "starting fact-check server");
            server::run_server(runner, &addr, shutdown_signal()).await?;
            info!("server shutdown complete");
        }
        Cmd::Check { text, file, session, out } => {
            let text = match (text, file) {
                (Some(t), _) => t,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                (None, None) => anyhow::bail!("one of --text or --file is required"),
            };
            let runner = PipelineRunner::from_config(&cfg).context("initializing pipeline")?;
            let resp = runner.run(&text, &session).await?;
            let pretty = serde_json::to_string_pretty(&resp)?;
            println!("{pretty}");
            if let Some(out) = out {
                std::fs::write(&out, &pretty).with_context(|| format!("writing {}", out.display()))?;
                info!("wrote result to {}", out.display());
            }
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received terminate signal, shutting down"),
    }
}
