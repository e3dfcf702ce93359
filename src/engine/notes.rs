// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Reeltag-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Reeltag and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::{DateTime, Utc};

use crate::model::{IdSequence, Note, NoteId};

use super::error::{EngineError, EntityKind};

/// Note operations scoped to a single session's note list.
///
/// Borrowed from the owning `SessionReplay`; note ids only need to be unique inside that list.
#[derive(Debug)]
pub struct NoteStore<'a> {
    notes: &'a mut Vec<Note>,
    seq: &'a mut IdSequence,
}

impl<'a> NoteStore<'a> {
    pub(crate) fn new(notes: &'a mut Vec<Note>, seq: &'a mut IdSequence) -> Self {
        Self { notes, seq }
    }

    pub fn notes(&self) -> &[Note] {
        self.notes.as_slice()
    }

    pub fn add(&mut self, content: &str, created_by: &str, now: DateTime<Utc>) -> Note {
        let notes = &*self.notes;
        let note_id: NoteId = self
            .seq
            .allocate(|candidate| notes.iter().any(|note| note.note_id().as_str() == candidate));
        let note = Note::new(note_id, content, created_by, now);
        self.notes.push(note.clone());
        note
    }

    pub fn edit(
        &mut self,
        note_id: &NoteId,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<Note, EngineError> {
        let Some(note) = self.notes.iter_mut().find(|note| note.note_id() == note_id) else {
            return Err(EngineError::not_found(EntityKind::Note, note_id));
        };
        note.revise(content, now);
        Ok(note.clone())
    }

    /// Removes the note; `None` when it was not present.
    pub fn delete(&mut self, note_id: &NoteId) -> Option<Note> {
        let index = self.notes.iter().position(|note| note.note_id() == note_id)?;
        Some(self.notes.remove(index))
    }
}
