// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Reeltag-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Reeltag and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{IdSequence, SessionId, TagId};
use super::note::Note;

/// A recorded user session under review.
///
/// Identity fields (user, timestamps, country) come from the external data source and are
/// read-only here. Only `tag_ids` and `notes` change, through the engine. Tags are stored as ids
/// in attachment order; names and colors are resolved through the tag registry on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReplay {
    #[serde(rename = "id")]
    session_id: SessionId,
    user_id: String,
    user_email: String,
    #[serde(default)]
    time: String,
    date: DateTime<Utc>,
    #[serde(default)]
    session_length: String,
    #[serde(default)]
    country: String,
    #[serde(rename = "tags", default)]
    tag_ids: Vec<TagId>,
    #[serde(default)]
    notes: Vec<Note>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    has_warning: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(skip, default = "note_sequence")]
    note_seq: IdSequence,
}

fn note_sequence() -> IdSequence {
    IdSequence::new("note-")
}

// Compares the visible record only. The note id counter is allocation state.
impl PartialEq for SessionReplay {
    fn eq(&self, other: &Self) -> bool {
        self.session_id == other.session_id
            && self.user_id == other.user_id
            && self.user_email == other.user_email
            && self.time == other.time
            && self.date == other.date
            && self.session_length == other.session_length
            && self.country == other.country
            && self.tag_ids == other.tag_ids
            && self.notes == other.notes
            && self.has_warning == other.has_warning
            && self.category == other.category
    }
}

impl Eq for SessionReplay {}

impl SessionReplay {
    pub fn new(
        session_id: SessionId,
        user_id: impl Into<String>,
        user_email: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id,
            user_id: user_id.into(),
            user_email: user_email.into(),
            time: String::new(),
            date,
            session_length: String::new(),
            country: String::new(),
            tag_ids: Vec::new(),
            notes: Vec::new(),
            has_warning: None,
            category: None,
            note_seq: note_sequence(),
        }
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = time.into();
        self
    }

    pub fn with_session_length(mut self, session_length: impl Into<String>) -> Self {
        self.session_length = session_length.into();
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn with_warning(mut self, has_warning: bool) -> Self {
        self.has_warning = Some(has_warning);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Seeds the initial tag references. Duplicate ids are collapsed, first position wins.
    pub fn with_tag_ids(mut self, tag_ids: impl IntoIterator<Item = TagId>) -> Self {
        for tag_id in tag_ids {
            if !self.tag_ids.contains(&tag_id) {
                self.tag_ids.push(tag_id);
            }
        }
        self
    }

    pub fn with_notes(mut self, notes: impl IntoIterator<Item = Note>) -> Self {
        self.notes.extend(notes);
        self
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn user_email(&self) -> &str {
        &self.user_email
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn session_length(&self) -> &str {
        &self.session_length
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn has_warning(&self) -> bool {
        self.has_warning.unwrap_or(false)
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn tag_ids(&self) -> &[TagId] {
        &self.tag_ids
    }

    pub fn has_tag(&self, tag_id: &TagId) -> bool {
        self.tag_ids.contains(tag_id)
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub(crate) fn tag_ids_mut(&mut self) -> &mut Vec<TagId> {
        &mut self.tag_ids
    }

    pub(crate) fn notes_parts_mut(&mut self) -> (&mut Vec<Note>, &mut IdSequence) {
        (&mut self.notes, &mut self.note_seq)
    }
}
