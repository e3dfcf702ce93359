// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Reeltag-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Reeltag and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{SessionId, SessionReplay, TagId};

use super::error::{EngineError, EntityKind};
use super::notes::NoteStore;

/// The session collection in the order the data source supplied it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStore {
    sessions: Vec<SessionReplay>,
}

impl SessionStore {
    /// Callers guarantee unique session ids (see `store::Seed::validate`).
    pub(crate) fn from_sessions(sessions: Vec<SessionReplay>) -> Self {
        Self { sessions }
    }

    pub fn sessions(&self) -> &[SessionReplay] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn get(&self, session_id: &SessionId) -> Option<&SessionReplay> {
        self.sessions.iter().find(|session| session.session_id() == session_id)
    }

    pub fn contains(&self, session_id: &SessionId) -> bool {
        self.get(session_id).is_some()
    }

    fn get_mut(&mut self, session_id: &SessionId) -> Result<&mut SessionReplay, EngineError> {
        self.sessions
            .iter_mut()
            .find(|session| session.session_id() == session_id)
            .ok_or_else(|| EngineError::not_found(EntityKind::Session, session_id))
    }

    /// Appends `tag_id` to the session's tags. Returns `false` when it was already attached.
    pub fn attach_tag(
        &mut self,
        session_id: &SessionId,
        tag_id: &TagId,
    ) -> Result<bool, EngineError> {
        let session = self.get_mut(session_id)?;
        if session.has_tag(tag_id) {
            return Ok(false);
        }
        session.tag_ids_mut().push(tag_id.clone());
        Ok(true)
    }

    /// Returns `false` when the tag was not attached.
    pub fn detach_tag(
        &mut self,
        session_id: &SessionId,
        tag_id: &TagId,
    ) -> Result<bool, EngineError> {
        let session = self.get_mut(session_id)?;
        let tag_ids = session.tag_ids_mut();
        let before = tag_ids.len();
        tag_ids.retain(|attached| attached != tag_id);
        Ok(tag_ids.len() != before)
    }

    /// Note operations for one session.
    pub fn notes_mut(&mut self, session_id: &SessionId) -> Result<NoteStore<'_>, EngineError> {
        let (notes, seq) = self.get_mut(session_id)?.notes_parts_mut();
        Ok(NoteStore::new(notes, seq))
    }

    pub fn sessions_with_tag<'a>(
        &'a self,
        tag_id: &'a TagId,
    ) -> impl Iterator<Item = &'a SessionReplay> + 'a {
        self.sessions.iter().filter(move |session| session.has_tag(tag_id))
    }

    /// Drops `tag_id` from every session and returns the ids of the sessions that carried it.
    pub fn purge_tag(&mut self, tag_id: &TagId) -> Vec<SessionId> {
        let mut affected = Vec::new();
        for session in &mut self.sessions {
            let tag_ids = session.tag_ids_mut();
            let before = tag_ids.len();
            tag_ids.retain(|attached| attached != tag_id);
            if tag_ids.len() != before {
                affected.push(session.session_id().clone());
            }
        }
        affected
    }
}
