// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Reeltag-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Reeltag and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::{Clock, SessionStore, TagRegistry, Workspace};
use crate::model::{fixtures, NoteId, SessionId, SessionReplay, Tag, TagId};

/// Initial tags and sessions for a workspace.
///
/// Read once at startup; the workspace never writes back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Seed {
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub sessions: Vec<SessionReplay>,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid seed JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("duplicate tag id '{tag_id}'")]
    DuplicateTagId { tag_id: TagId },
    #[error("tag '{tag_id}' has a blank name")]
    BlankTagName { tag_id: TagId },
    #[error("duplicate session id '{session_id}'")]
    DuplicateSessionId { session_id: SessionId },
    #[error("session '{session_id}' references unknown tag '{tag_id}'")]
    UnknownTag { session_id: SessionId, tag_id: TagId },
    #[error("session '{session_id}' lists tag '{tag_id}' more than once")]
    DuplicateSessionTag { session_id: SessionId, tag_id: TagId },
    #[error("session '{session_id}' has duplicate note id '{note_id}'")]
    DuplicateNoteId { session_id: SessionId, note_id: NoteId },
    #[error("note '{note_id}' in session '{session_id}' was updated before it was created")]
    NoteUpdatedBeforeCreated { session_id: SessionId, note_id: NoteId },
}

impl Seed {
    /// The built-in demo data set.
    pub fn demo() -> Self {
        Self { tags: fixtures::demo_tags(), sessions: fixtures::demo_sessions() }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|source| SeedError::Io { path: path.to_path_buf(), source })?;
        let seed: Self = serde_json::from_str(&raw)
            .map_err(|source| SeedError::Json { path: path.to_path_buf(), source })?;
        seed.validate()?;
        info!(
            path = %path.display(),
            tags = seed.tags.len(),
            sessions = seed.sessions.len(),
            "seed loaded"
        );
        Ok(seed)
    }

    /// Checks the invariants the engine relies on and names the first offending id.
    pub fn validate(&self) -> Result<(), SeedError> {
        let mut tag_ids = HashSet::with_capacity(self.tags.len());
        for tag in &self.tags {
            if !tag_ids.insert(tag.tag_id()) {
                return Err(SeedError::DuplicateTagId { tag_id: tag.tag_id().clone() });
            }
            if tag.name().trim().is_empty() {
                return Err(SeedError::BlankTagName { tag_id: tag.tag_id().clone() });
            }
        }

        let mut session_ids = HashSet::with_capacity(self.sessions.len());
        for session in &self.sessions {
            let session_id = session.session_id();
            if !session_ids.insert(session_id) {
                return Err(SeedError::DuplicateSessionId { session_id: session_id.clone() });
            }

            let mut attached = HashSet::new();
            for tag_id in session.tag_ids() {
                if !tag_ids.contains(tag_id) {
                    return Err(SeedError::UnknownTag {
                        session_id: session_id.clone(),
                        tag_id: tag_id.clone(),
                    });
                }
                if !attached.insert(tag_id) {
                    return Err(SeedError::DuplicateSessionTag {
                        session_id: session_id.clone(),
                        tag_id: tag_id.clone(),
                    });
                }
            }

            let mut note_ids = HashSet::new();
            for note in session.notes() {
                if !note_ids.insert(note.note_id()) {
                    return Err(SeedError::DuplicateNoteId {
                        session_id: session_id.clone(),
                        note_id: note.note_id().clone(),
                    });
                }
                if note.updated_at() < note.created_at() {
                    return Err(SeedError::NoteUpdatedBeforeCreated {
                        session_id: session_id.clone(),
                        note_id: note.note_id().clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn into_workspace(
        self,
        actor: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Result<Workspace, SeedError> {
        self.validate()?;
        debug!(tags = self.tags.len(), sessions = self.sessions.len(), "building workspace");
        Ok(Workspace::from_parts(
            TagRegistry::from_tags(self.tags),
            SessionStore::from_sessions(self.sessions),
            actor,
            clock,
        ))
    }
}
