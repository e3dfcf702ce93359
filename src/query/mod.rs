// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Reeltag-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Reeltag and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only queries over tags and sessions.
//!
//! Queries provide derived views (picker search, availability, usage) that power the UI and MCP
//! tools.

pub mod tags;

pub use tags::{available_tags, has_exact_name, search_tags, tag_usage};
