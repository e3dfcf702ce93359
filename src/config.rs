// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Reeltag-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Reeltag and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::{DEFAULT_ACTOR, DEFAULT_TOP_TAGS};
use crate::logging::LogConfig;

/// Runtime settings, read from an optional TOML file. Every field has a default.
///
/// ```toml
/// actor = "dana"
/// top_tags = 3
///
/// [log]
/// level = "debug"
/// file = "reeltag.log"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Stamped into `created_by` of new tags and notes.
    pub actor: String,
    /// Entries in the TUI top-tags strip.
    pub top_tags: usize,
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            actor: DEFAULT_ACTOR.to_owned(),
            top_tags: DEFAULT_TOP_TAGS,
            log: LogConfig::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config {}: actor must not be blank", path.display())]
    BlankActor { path: PathBuf },
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let mut config: Self = toml::from_str(&content)
            .map_err(|source| ConfigError::Toml { path: path.to_path_buf(), source })?;
        config.actor = config.actor.trim().to_owned();
        if config.actor.is_empty() {
            return Err(ConfigError::BlankActor { path: path.to_path_buf() });
        }
        Ok(config)
    }
}
