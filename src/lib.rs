// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Reeltag-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Reeltag and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Reeltag: session replay annotation (tags, notes, filters) with a TUI and MCP tools.
//!
//! The [`engine::Workspace`] owns every store; the TUI and the MCP server drive it through
//! [`ops::apply_command`] and read it through [`query`].

pub mod config;
pub mod engine;
pub mod logging;
pub mod mcp;
pub mod model;
pub mod ops;
pub mod query;
pub mod store;
pub mod tui;
pub mod ui;
