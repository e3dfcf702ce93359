// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Reeltag-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Reeltag and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Seed data for a workspace.
//!
//! The store module reads the JSON seed format (tags plus sessions) used by both the TUI and the
//! MCP server, or falls back to the built-in demo data set.

pub mod seed_file;

pub use seed_file::{Seed, SeedError};
