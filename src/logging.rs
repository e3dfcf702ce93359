// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Reeltag-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Reeltag and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Structured logging.
//!
//! Engine commands emit `tracing` events with `tag_id`, `session_id`, `note_id` and `rev` fields.
//! `init_logging` installs the global subscriber once. `RUST_LOG` overrides the configured level.
//!
//! The MCP stdio transport owns stdout and the TUI owns the terminal, so events never go to
//! stdout; in TUI mode they go to the configured file or nowhere.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::time::SystemTime;
use tracing_subscriber::layer::Layered;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter, Registry};

static LOGGING_INITIALIZED: OnceLock<()> = OnceLock::new();

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `info` or `reeltag=debug`.
    pub level: String,
    pub format: LogFormat,
    /// Appended to when set.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), format: LogFormat::Pretty, file: None }
    }
}

/// Where events may go besides the optional log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Stderr,
    /// The terminal is taken (TUI); only the log file receives events.
    FileOnly,
}

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("logging already initialized")]
    AlreadyInitialized,
    #[error("invalid log level '{0}'")]
    InvalidLevel(String),
    #[error("failed to open log file {}: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to set global subscriber: {0}")]
    SetSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

type BoxedLayer = Box<dyn tracing_subscriber::Layer<Layered<EnvFilter, Registry>> + Send + Sync>;

/// Installs the global subscriber.
///
/// Returns `Ok(false)` without installing anything when `output` is [`LogOutput::FileOnly`] and
/// no file is configured.
pub fn init_logging(config: &LogConfig, output: LogOutput) -> Result<bool, LogError> {
    if LOGGING_INITIALIZED.get().is_some() {
        return Err(LogError::AlreadyInitialized);
    }
    if output == LogOutput::FileOnly && config.file.is_none() {
        return Ok(false);
    }

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|_| LogError::InvalidLevel(config.level.clone()))?,
    };

    let mut layers: Vec<BoxedLayer> = Vec::new();
    if output == LogOutput::Stderr {
        layers.push(match config.format {
            LogFormat::Pretty => {
                fmt::layer().with_writer(io::stderr).with_target(true).with_ansi(true).boxed()
            }
            LogFormat::Json => fmt::layer()
                .json()
                .with_timer(SystemTime)
                .with_writer(io::stderr)
                .with_target(true)
                .flatten_event(true)
                .boxed(),
        });
    }
    if let Some(path) = &config.file {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|source| LogError::FileOpen { path: path.clone(), source })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| LogError::FileOpen { path: path.clone(), source })?;
        layers.push(match config.format {
            LogFormat::Pretty => {
                fmt::layer().with_writer(file).with_target(true).with_ansi(false).boxed()
            }
            LogFormat::Json => fmt::layer()
                .json()
                .with_timer(SystemTime)
                .with_writer(file)
                .with_target(true)
                .flatten_event(true)
                .boxed(),
        });
    }

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry().with(env_filter).with(layers),
    )?;
    let _ = LOGGING_INITIALIZED.set(());

    tracing::info!(
        level = %config.level,
        format = ?config.format,
        file = ?config.file,
        "logging initialized"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::{init_logging, LogConfig, LogFormat, LogOutput};

    #[test]
    fn defaults_are_info_pretty_without_file() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.file.is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: LogConfig = toml::from_str("format = \"json\"").expect("toml");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "info");
    }

    #[test]
    fn file_only_without_file_installs_nothing() {
        let installed =
            init_logging(&LogConfig::default(), LogOutput::FileOnly).expect("no-op init");
        assert!(!installed);
    }
}
