// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Reeltag-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Reeltag and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

pub mod clock;
pub mod error;
pub mod filter;
pub mod notes;
pub mod ranker;
pub mod registry;
pub mod sessions;
pub mod workspace;

pub use clock::{Clock, SteppingClock, SystemClock};
pub use error::{EngineError, EntityKind};
pub use filter::FilterEngine;
pub use notes::NoteStore;
pub use ranker::{ranked_usage, top_n, TagUsage, DEFAULT_TOP_TAGS};
pub use registry::TagRegistry;
pub use sessions::SessionStore;
pub use workspace::{TagDeletion, Workspace, DEFAULT_ACTOR};
