// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Reeltag-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Reeltag and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! Tags are owned by the registry; session replays reference them by id and own their notes.

pub(crate) mod fixtures;
pub mod ids;
pub mod note;
pub mod replay;
pub mod tag;

pub(crate) use ids::IdSequence;
pub use ids::{Id, IdError, NoteId, SessionId, TagId};
pub use note::Note;
pub use replay::SessionReplay;
pub use tag::{ParseTagColorError, Tag, TagColor};
