// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Reeltag-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Reeltag and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Reeltag CLI entrypoint.
//!
//! By default this runs the interactive TUI and serves MCP over streamable HTTP at
//! `http://127.0.0.1:<port>/mcp`.
//!
//! Use `--mcp` to run the MCP server over stdio instead (intended for tool integrations).

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use clap::Parser;
use reeltag::config::Config;
use reeltag::engine::{SystemClock, Workspace};
use reeltag::logging::{init_logging, LogOutput};
use reeltag::mcp::ReeltagMcp;
use reeltag::store::Seed;
use reeltag::ui::UiState;
use rmcp::transport::{
    streamable_http_server::session::local::LocalSessionManager, StreamableHttpServerConfig,
    StreamableHttpService,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

const DEFAULT_MCP_HTTP_PORT: u16 = 27436;

#[derive(Debug, Parser)]
#[command(name = "reeltag", version, about = "Tag and annotate session replays")]
struct Cli {
    /// JSON seed with tags and sessions. The built-in demo data is used when omitted.
    #[arg(long, value_name = "PATH")]
    seed: Option<PathBuf>,

    /// TOML config file (actor, top_tags, log).
    #[arg(long, value_name = "PATH", env = "REELTAG_CONFIG")]
    config: Option<PathBuf>,

    /// Serve MCP over stdio instead of running the TUI.
    #[arg(long)]
    mcp: bool,

    /// Port for the streamable HTTP MCP endpoint in TUI mode (0 = ephemeral).
    #[arg(
        long,
        value_name = "PORT",
        default_value_t = DEFAULT_MCP_HTTP_PORT,
        conflicts_with = "mcp"
    )]
    mcp_http_port: u16,
}

fn load_workspace(cli: &Cli, config: &Config) -> Result<Workspace, Box<dyn Error>> {
    let seed = match &cli.seed {
        Some(path) => Seed::load(path)?,
        None => Seed::demo(),
    };
    Ok(seed.into_workspace(config.actor.clone(), Arc::new(SystemClock))?)
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let output = if cli.mcp { LogOutput::Stderr } else { LogOutput::FileOnly };
    init_logging(&config.log, output)?;

    let workspace = load_workspace(&cli, &config)?;
    info!(
        actor = %config.actor,
        tags = workspace.tags().len(),
        sessions = workspace.sessions().len(),
        "workspace ready"
    );

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

    if cli.mcp {
        runtime.block_on(ReeltagMcp::new(workspace).serve_stdio())?;
        return Ok(());
    }

    let workspace = Arc::new(Mutex::new(workspace));
    let ui_state = Arc::new(Mutex::new(UiState::default()));
    let mcp = ReeltagMcp::new_shared(workspace.clone(), Some(ui_state.clone()));
    let top_tags = config.top_tags;
    let port = cli.mcp_http_port;

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        info!(addr = %listener.local_addr()?, "serving MCP over streamable HTTP at /mcp");

        let config = StreamableHttpServerConfig {
            stateful_mode: true,
            ..StreamableHttpServerConfig::default()
        };
        let shutdown_token = config.cancellation_token.clone();
        let server_shutdown = shutdown_token.clone();

        let session_manager = Arc::new(LocalSessionManager::default());
        let mcp_service =
            StreamableHttpService::new(move || Ok(mcp.clone()), session_manager, config);

        let router = Router::new().nest_service("/mcp", mcp_service);
        let server_handle = tokio::spawn(async move {
            let serve = axum::serve(listener, router).with_graceful_shutdown(async move {
                server_shutdown.cancelled().await;
            });
            if let Err(err) = serve.await {
                warn!(%err, "MCP HTTP server stopped");
                eprintln!("reeltag: MCP HTTP server error: {err}");
            }
        });

        let tui_join = tokio::task::spawn_blocking(move || {
            reeltag::tui::run_with_workspace(workspace, Some(ui_state), top_tags)
                .map_err(|err| err.to_string())
        })
        .await;

        shutdown_token.cancel();
        let _ = server_handle.await;

        let tui_result = tui_join.map_err(|err| -> Box<dyn Error> { Box::new(err) })?;
        tui_result.map_err(|err| -> Box<dyn Error> { err.into() })?;
        Ok::<(), Box<dyn Error>>(())
    })
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("reeltag: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, DEFAULT_MCP_HTTP_PORT};
    use clap::{CommandFactory, Parser};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_empty_args() {
        let cli = Cli::try_parse_from(["reeltag"]).expect("parse");
        assert!(cli.seed.is_none());
        assert!(!cli.mcp);
        assert_eq!(cli.mcp_http_port, DEFAULT_MCP_HTTP_PORT);
    }

    #[test]
    fn parses_seed_and_config_paths() {
        let cli = Cli::try_parse_from([
            "reeltag",
            "--seed",
            "data/sessions.json",
            "--config",
            "reeltag.toml",
        ])
        .expect("parse");
        assert_eq!(cli.seed.as_deref(), Some(std::path::Path::new("data/sessions.json")));
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("reeltag.toml")));
    }

    #[test]
    fn parses_mcp_flag() {
        let cli = Cli::try_parse_from(["reeltag", "--mcp"]).expect("parse");
        assert!(cli.mcp);
    }

    #[test]
    fn parses_mcp_http_port() {
        let cli = Cli::try_parse_from(["reeltag", "--mcp-http-port", "0"]).expect("parse");
        assert_eq!(cli.mcp_http_port, 0);
    }

    #[test]
    fn rejects_http_port_with_stdio_mode() {
        Cli::try_parse_from(["reeltag", "--mcp", "--mcp-http-port", "1234"]).unwrap_err();
    }

    #[test]
    fn rejects_unknown_args_and_bad_ports() {
        Cli::try_parse_from(["reeltag", "--nope"]).unwrap_err();
        Cli::try_parse_from(["reeltag", "--mcp-http-port", "70000"]).unwrap_err();
        Cli::try_parse_from(["reeltag", "--seed"]).unwrap_err();
    }
}
