//! `hold-on` entrypoint: an MCP server that asks a human before the agent moves on.

mod config;
#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use channels::{BrowserLauncher, NoBrowser, SystemBrowser, WebFeedbackHandler};
use clap::Parser;
use gateway::McpServer;
use proto::{FeedbackHandler, Theme};
use tools::{CheckpointTool, RequestApprovalTool, ToolRegistry};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, FeedbackConfig, state_dir};

/// Command-line arguments. Flags take precedence over env and config file.
#[derive(Debug, Parser)]
#[command(name = "hold-on")]
#[command(about = "MCP server that routes agent approvals through a local browser page", version)]
struct Cli {
    /// Path to config file (default: ~/.hold-on/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Also write debug logs to ~/.hold-on/logs/debug.log.YYYY-MM-DD
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// Page theme (auto, light, dark)
    #[arg(long)]
    theme: Option<Theme>,

    /// Seconds to wait for the reviewer before treating silence as approval
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,

    /// Do not launch a browser; log the session URL instead
    #[arg(long, default_value_t = false)]
    no_browser: bool,
}

impl Cli {
    fn apply_overrides(&self, feedback: &mut FeedbackConfig) {
        if let Some(theme) = self.theme {
            feedback.theme = theme;
        }
        if let Some(secs) = self.timeout_secs {
            feedback.timeout_secs = secs;
        }
        if self.no_browser {
            feedback.open_browser = false;
        }
    }
}

/// Program entrypoint.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    // Held until exit so buffered file writes are flushed.
    let _file_guard = init_tracing(&cli);

    let mut config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    cli.apply_overrides(&mut config.feedback);
    let feedback = config.feedback;
    info!(
        theme = %feedback.theme,
        timeout_secs = feedback.timeout_secs,
        open_browser = feedback.open_browser,
        "hold-on starting"
    );

    let browser: Arc<dyn BrowserLauncher> = if feedback.open_browser {
        Arc::new(SystemBrowser)
    } else {
        Arc::new(NoBrowser)
    };
    let handler: Arc<dyn FeedbackHandler> =
        Arc::new(WebFeedbackHandler::new(browser, feedback.timeout()));

    let server = Arc::new(McpServer::new(
        build_registry(handler, feedback.theme),
        env!("CARGO_PKG_VERSION"),
    ));
    server
        .serve(tokio::io::stdin(), tokio::io::stdout())
        .await
        .context("MCP transport failed")?;
    Ok(())
}

fn build_registry(handler: Arc<dyn FeedbackHandler>, theme: Theme) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(RequestApprovalTool::new(handler.clone(), theme));
    registry.register(CheckpointTool::new(handler, theme));
    registry
}

/// Installs the stderr subscriber, plus a daily-rolling debug file with `--debug`.
///
/// stdout carries the MCP stream, so nothing is ever logged there.
fn init_tracing(cli: &Cli) -> Option<WorkerGuard> {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if !cli.debug {
        fmt()
            .with_env_filter(console_filter)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .with_target(false)
            .init();
        return None;
    }

    let log_dir = state_dir().join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let appender = tracing_appender::rolling::daily(&log_dir, "debug.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_filter(console_filter);
    let file = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_ansi(false)
        .with_filter(EnvFilter::new("debug,hyper=info,hyper_util=info,tower_http=debug"));
    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .init();
    info!(dir = %log_dir.display(), "Debug logging enabled");
    Some(guard)
}
