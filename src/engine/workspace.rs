// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Reeltag-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Reeltag and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The single owner of annotation state.
//!
//! Every command runs to completion against the registry, the sessions and the filter before it
//! returns, so cascades (tag deletion reaching sessions and the filter) are never observable
//! half-applied. Hosts that share a workspace across threads wrap it in one mutex.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::model::{Note, NoteId, SessionId, SessionReplay, Tag, TagColor, TagId};

use super::clock::{Clock, SystemClock};
use super::error::{EngineError, EntityKind};
use super::filter::FilterEngine;
use super::ranker::{self, TagUsage};
use super::registry::TagRegistry;
use super::sessions::SessionStore;

pub const DEFAULT_ACTOR: &str = "current-user";

/// Result of deleting a registered tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDeletion {
    pub tag: Tag,
    pub detached_from: Vec<SessionId>,
    pub removed_from_filter: bool,
}

pub struct Workspace {
    registry: TagRegistry,
    sessions: SessionStore,
    filter: FilterEngine,
    actor: String,
    clock: Arc<dyn Clock>,
    rev: u64,
}

impl fmt::Debug for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace")
            .field("registry", &self.registry)
            .field("sessions", &self.sessions)
            .field("filter", &self.filter)
            .field("actor", &self.actor)
            .field("rev", &self.rev)
            .finish_non_exhaustive()
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(DEFAULT_ACTOR, Arc::new(SystemClock))
    }
}

impl Workspace {
    pub fn new(actor: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self::from_parts(TagRegistry::default(), SessionStore::default(), actor, clock)
    }

    pub(crate) fn from_parts(
        registry: TagRegistry,
        sessions: SessionStore,
        actor: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            sessions,
            filter: FilterEngine::default(),
            actor: actor.into(),
            clock,
            rev: 0,
        }
    }

    /// Number of applied mutations. Rejected commands and no-ops leave it unchanged.
    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    pub fn tags(&self) -> &[Tag] {
        self.registry.tags()
    }

    pub fn tag(&self, tag_id: &TagId) -> Option<&Tag> {
        self.registry.get(tag_id)
    }

    pub fn sessions(&self) -> &[SessionReplay] {
        self.sessions.sessions()
    }

    pub fn session(&self, session_id: &SessionId) -> Option<&SessionReplay> {
        self.sessions.get(session_id)
    }

    /// The session's tags resolved through the registry, in attachment order.
    pub fn session_tags(&self, session: &SessionReplay) -> Vec<&Tag> {
        session.tag_ids().iter().filter_map(|tag_id| self.registry.get(tag_id)).collect()
    }

    pub fn filter(&self) -> &FilterEngine {
        &self.filter
    }

    pub fn filter_tags(&self) -> Vec<&Tag> {
        self.filter.selected().iter().filter_map(|tag_id| self.registry.get(tag_id)).collect()
    }

    pub fn visible_sessions(&self) -> Vec<&SessionReplay> {
        self.filter.visible_sessions(self.sessions.sessions())
    }

    pub fn top_tags(&self, n: usize) -> Vec<&Tag> {
        ranker::top_n(n, self.registry.tags(), self.sessions.sessions())
    }

    pub fn ranked_usage(&self) -> Vec<TagUsage<'_>> {
        ranker::ranked_usage(self.registry.tags(), self.sessions.sessions())
    }

    fn bump_rev(&mut self) -> u64 {
        self.rev = self.rev.saturating_add(1);
        self.rev
    }

    fn require_tag(&self, tag_id: &TagId) -> Result<(), EngineError> {
        if self.registry.contains(tag_id) {
            Ok(())
        } else {
            Err(EngineError::not_found(EntityKind::Tag, tag_id))
        }
    }

    fn require_session(&self, session_id: &SessionId) -> Result<(), EngineError> {
        if self.sessions.contains(session_id) {
            Ok(())
        } else {
            Err(EngineError::not_found(EntityKind::Session, session_id))
        }
    }

    pub fn create_tag(&mut self, name: &str, color: TagColor) -> Result<Tag, EngineError> {
        let now = self.clock.now();
        let tag = self.registry.create(name, color, &self.actor, now).inspect_err(|err| {
            warn!(error = %err, "tag create rejected");
        })?;
        let rev = self.bump_rev();
        info!(tag_id = %tag.tag_id(), name = tag.name(), color = %tag.color(), rev, "tag created");
        Ok(tag)
    }

    /// Renames/recolors in place. Sessions and the filter reference tags by id, so they observe
    /// the new name and color immediately.
    pub fn update_tag(
        &mut self,
        tag_id: &TagId,
        name: &str,
        color: TagColor,
    ) -> Result<Tag, EngineError> {
        let tag = self.registry.update(tag_id, name, color).inspect_err(|err| {
            warn!(tag_id = %tag_id, error = %err, "tag update rejected");
        })?;
        let rev = self.bump_rev();
        info!(tag_id = %tag_id, name = tag.name(), color = %tag.color(), rev, "tag updated");
        Ok(tag)
    }

    /// Deletes the tag and every reference to it. Unknown ids are a no-op (`None`).
    pub fn delete_tag(&mut self, tag_id: &TagId) -> Option<TagDeletion> {
        let Some(tag) = self.registry.remove(tag_id) else {
            debug!(tag_id = %tag_id, "tag delete ignored (not registered)");
            return None;
        };
        let detached_from = self.sessions.purge_tag(tag_id);
        let removed_from_filter = self.filter.remove(tag_id);
        let rev = self.bump_rev();
        info!(
            tag_id = %tag_id,
            sessions = detached_from.len(),
            removed_from_filter,
            rev,
            "tag deleted"
        );
        Some(TagDeletion { tag, detached_from, removed_from_filter })
    }

    /// Returns `false` when the tag was already attached.
    pub fn attach_tag(
        &mut self,
        session_id: &SessionId,
        tag_id: &TagId,
    ) -> Result<bool, EngineError> {
        self.require_tag(tag_id).inspect_err(|err| {
            warn!(session_id = %session_id, error = %err, "tag attach rejected");
        })?;
        let attached = self.sessions.attach_tag(session_id, tag_id).inspect_err(|err| {
            warn!(session_id = %session_id, error = %err, "tag attach rejected");
        })?;
        if attached {
            let rev = self.bump_rev();
            info!(session_id = %session_id, tag_id = %tag_id, rev, "tag attached");
        } else {
            debug!(session_id = %session_id, tag_id = %tag_id, "tag already attached");
        }
        Ok(attached)
    }

    /// Returns `false` when the tag was not attached.
    pub fn detach_tag(
        &mut self,
        session_id: &SessionId,
        tag_id: &TagId,
    ) -> Result<bool, EngineError> {
        let detached = self.sessions.detach_tag(session_id, tag_id).inspect_err(|err| {
            warn!(session_id = %session_id, error = %err, "tag detach rejected");
        })?;
        if detached {
            let rev = self.bump_rev();
            info!(session_id = %session_id, tag_id = %tag_id, rev, "tag detached");
        } else {
            debug!(session_id = %session_id, tag_id = %tag_id, "tag detach ignored (not attached)");
        }
        Ok(detached)
    }

    /// Creates a tag and attaches it in one step (the tag picker's "create" entry).
    ///
    /// The session is checked first so a missing session never leaves an orphan tag behind.
    pub fn create_and_attach_tag(
        &mut self,
        session_id: &SessionId,
        name: &str,
        color: TagColor,
    ) -> Result<Tag, EngineError> {
        self.require_session(session_id).inspect_err(|err| {
            warn!(error = %err, "tag create-and-attach rejected");
        })?;
        let now = self.clock.now();
        let tag = self.registry.create(name, color, &self.actor, now).inspect_err(|err| {
            warn!(error = %err, "tag create-and-attach rejected");
        })?;
        self.sessions.attach_tag(session_id, tag.tag_id())?;
        let rev = self.bump_rev();
        info!(
            session_id = %session_id,
            tag_id = %tag.tag_id(),
            name = tag.name(),
            rev,
            "tag created and attached"
        );
        Ok(tag)
    }

    pub fn add_note(&mut self, session_id: &SessionId, content: &str) -> Result<Note, EngineError> {
        let now = self.clock.now();
        let mut notes = self.sessions.notes_mut(session_id).inspect_err(|err| {
            warn!(error = %err, "note add rejected");
        })?;
        let note = notes.add(content, &self.actor, now);
        let rev = self.bump_rev();
        info!(session_id = %session_id, note_id = %note.note_id(), rev, "note added");
        Ok(note)
    }

    pub fn edit_note(
        &mut self,
        session_id: &SessionId,
        note_id: &NoteId,
        content: &str,
    ) -> Result<Note, EngineError> {
        let now = self.clock.now();
        let note = self
            .sessions
            .notes_mut(session_id)
            .and_then(|mut notes| notes.edit(note_id, content, now))
            .inspect_err(|err| {
                warn!(session_id = %session_id, error = %err, "note edit rejected");
            })?;
        let rev = self.bump_rev();
        info!(session_id = %session_id, note_id = %note_id, rev, "note edited");
        Ok(note)
    }

    /// Unknown note ids are a no-op (`Ok(None)`); an unknown session is still `NotFound`.
    pub fn delete_note(
        &mut self,
        session_id: &SessionId,
        note_id: &NoteId,
    ) -> Result<Option<Note>, EngineError> {
        let removed = self.sessions.notes_mut(session_id)?.delete(note_id);
        match &removed {
            Some(_) => {
                let rev = self.bump_rev();
                info!(session_id = %session_id, note_id = %note_id, rev, "note deleted");
            }
            None => debug!(session_id = %session_id, note_id = %note_id, "note delete ignored"),
        }
        Ok(removed)
    }

    /// Returns whether the tag is selected afterwards.
    pub fn toggle_filter_tag(&mut self, tag_id: &TagId) -> Result<bool, EngineError> {
        self.require_tag(tag_id)?;
        let selected = self.filter.toggle(tag_id);
        let rev = self.bump_rev();
        info!(tag_id = %tag_id, selected, rev, "filter toggled");
        Ok(selected)
    }

    /// Replaces the filter. Every id must be registered; otherwise nothing changes.
    pub fn set_filter_tags(&mut self, tag_ids: &[TagId]) -> Result<(), EngineError> {
        for tag_id in tag_ids {
            self.require_tag(tag_id).inspect_err(|err| {
                warn!(error = %err, "filter set rejected");
            })?;
        }
        let before = self.filter.clone();
        self.filter.set_all(tag_ids.iter().cloned());
        if self.filter != before {
            let rev = self.bump_rev();
            info!(selected = self.filter.selected().len(), rev, "filter set");
        }
        Ok(())
    }

    /// Returns whether anything was selected.
    pub fn clear_filter(&mut self) -> bool {
        let cleared = self.filter.clear();
        if cleared {
            let rev = self.bump_rev();
            info!(rev, "filter cleared");
        }
        cleared
    }
}
