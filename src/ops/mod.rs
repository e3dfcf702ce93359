// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Reeltag-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Reeltag and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mutation commands for the annotation workspace.
//!
//! Each command is applied to completion and produces a minimal delta that the UI and MCP layers
//! use to refresh derived state (visible sessions, top tags, chips).

use std::collections::HashSet;

use crate::engine::{EngineError, TagDeletion, Workspace};
use crate::model::{Note, NoteId, SessionId, Tag, TagColor, TagId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateTag { name: String, color: TagColor },
    UpdateTag { tag_id: TagId, name: String, color: TagColor },
    DeleteTag { tag_id: TagId },
    AttachTag { session_id: SessionId, tag_id: TagId },
    DetachTag { session_id: SessionId, tag_id: TagId },
    CreateAndAttachTag { session_id: SessionId, name: String, color: TagColor },
    AddNote { session_id: SessionId, content: String },
    EditNote { session_id: SessionId, note_id: NoteId, content: String },
    DeleteNote { session_id: SessionId, note_id: NoteId },
    ToggleFilterTag { tag_id: TagId },
    SetFilterTags { tag_ids: Vec<TagId> },
    ClearFilter,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::CreateTag { .. } => CommandKind::CreateTag,
            Self::UpdateTag { .. } => CommandKind::UpdateTag,
            Self::DeleteTag { .. } => CommandKind::DeleteTag,
            Self::AttachTag { .. } => CommandKind::AttachTag,
            Self::DetachTag { .. } => CommandKind::DetachTag,
            Self::CreateAndAttachTag { .. } => CommandKind::CreateAndAttachTag,
            Self::AddNote { .. } => CommandKind::AddNote,
            Self::EditNote { .. } => CommandKind::EditNote,
            Self::DeleteNote { .. } => CommandKind::DeleteNote,
            Self::ToggleFilterTag { .. } => CommandKind::ToggleFilterTag,
            Self::SetFilterTags { .. } => CommandKind::SetFilterTags,
            Self::ClearFilter => CommandKind::ClearFilter,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    CreateTag,
    UpdateTag,
    DeleteTag,
    AttachTag,
    DetachTag,
    CreateAndAttachTag,
    AddNote,
    EditNote,
    DeleteNote,
    ToggleFilterTag,
    SetFilterTags,
    ClearFilter,
}

/// The authoritative value a command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Tag(Tag),
    /// `None` when the tag was not registered.
    TagDeleted(Option<TagDeletion>),
    /// `changed` is `false` for an attach of an attached tag or a detach of a detached one.
    Attachment { session_id: SessionId, changed: bool },
    Note(Note),
    /// `None` when the note was not present.
    NoteDeleted(Option<Note>),
    Filter { selected: Vec<TagId> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub rev: u64,
    pub delta: Delta,
    pub outcome: Outcome,
}

/// Minimal delta describing what changed as the result of a command.
///
/// Coarse on purpose: a session counts as updated whether its tags or its notes moved.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub tags_added: Vec<TagId>,
    pub tags_updated: Vec<TagId>,
    pub tags_removed: Vec<TagId>,
    pub sessions_updated: Vec<SessionId>,
    pub filter_changed: bool,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.tags_added.is_empty()
            && self.tags_updated.is_empty()
            && self.tags_removed.is_empty()
            && self.sessions_updated.is_empty()
            && !self.filter_changed
    }
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    tags_added: HashSet<TagId>,
    tags_updated: HashSet<TagId>,
    tags_removed: HashSet<TagId>,
    sessions_updated: HashSet<SessionId>,
    filter_changed: bool,
}

impl DeltaBuilder {
    fn record_tag_added(&mut self, tag_id: &TagId) {
        self.tags_removed.remove(tag_id);
        self.tags_updated.remove(tag_id);
        self.tags_added.insert(tag_id.clone());
    }

    fn record_tag_removed(&mut self, tag_id: &TagId) {
        self.tags_added.remove(tag_id);
        self.tags_updated.remove(tag_id);
        self.tags_removed.insert(tag_id.clone());
    }

    fn record_tag_updated(&mut self, tag_id: &TagId) {
        if self.tags_added.contains(tag_id) || self.tags_removed.contains(tag_id) {
            return;
        }
        self.tags_updated.insert(tag_id.clone());
    }

    fn record_session_updated(&mut self, session_id: &SessionId) {
        self.sessions_updated.insert(session_id.clone());
    }

    fn record_filter_changed(&mut self) {
        self.filter_changed = true;
    }

    fn finish(self) -> Delta {
        let mut tags_added = self.tags_added.into_iter().collect::<Vec<_>>();
        let mut tags_updated = self.tags_updated.into_iter().collect::<Vec<_>>();
        let mut tags_removed = self.tags_removed.into_iter().collect::<Vec<_>>();
        let mut sessions_updated = self.sessions_updated.into_iter().collect::<Vec<_>>();

        tags_added.sort();
        tags_updated.sort();
        tags_removed.sort();
        sessions_updated.sort();

        Delta {
            tags_added,
            tags_updated,
            tags_removed,
            sessions_updated,
            filter_changed: self.filter_changed,
        }
    }
}

/// Applies one command. On error the workspace is unchanged and no revision is consumed.
pub fn apply_command(workspace: &mut Workspace, command: Command) -> Result<Applied, EngineError> {
    let mut delta = DeltaBuilder::default();

    let outcome = match command {
        Command::CreateTag { name, color } => {
            let tag = workspace.create_tag(&name, color)?;
            delta.record_tag_added(tag.tag_id());
            Outcome::Tag(tag)
        }
        Command::UpdateTag { tag_id, name, color } => {
            let tag = workspace.update_tag(&tag_id, &name, color)?;
            delta.record_tag_updated(&tag_id);
            Outcome::Tag(tag)
        }
        Command::DeleteTag { tag_id } => {
            let deletion = workspace.delete_tag(&tag_id);
            if let Some(deletion) = &deletion {
                delta.record_tag_removed(&tag_id);
                for session_id in &deletion.detached_from {
                    delta.record_session_updated(session_id);
                }
                if deletion.removed_from_filter {
                    delta.record_filter_changed();
                }
            }
            Outcome::TagDeleted(deletion)
        }
        Command::AttachTag { session_id, tag_id } => {
            let changed = workspace.attach_tag(&session_id, &tag_id)?;
            if changed {
                delta.record_session_updated(&session_id);
            }
            Outcome::Attachment { session_id, changed }
        }
        Command::DetachTag { session_id, tag_id } => {
            let changed = workspace.detach_tag(&session_id, &tag_id)?;
            if changed {
                delta.record_session_updated(&session_id);
            }
            Outcome::Attachment { session_id, changed }
        }
        Command::CreateAndAttachTag { session_id, name, color } => {
            let tag = workspace.create_and_attach_tag(&session_id, &name, color)?;
            delta.record_tag_added(tag.tag_id());
            delta.record_session_updated(&session_id);
            Outcome::Tag(tag)
        }
        Command::AddNote { session_id, content } => {
            let note = workspace.add_note(&session_id, &content)?;
            delta.record_session_updated(&session_id);
            Outcome::Note(note)
        }
        Command::EditNote { session_id, note_id, content } => {
            let note = workspace.edit_note(&session_id, &note_id, &content)?;
            delta.record_session_updated(&session_id);
            Outcome::Note(note)
        }
        Command::DeleteNote { session_id, note_id } => {
            let removed = workspace.delete_note(&session_id, &note_id)?;
            if removed.is_some() {
                delta.record_session_updated(&session_id);
            }
            Outcome::NoteDeleted(removed)
        }
        Command::ToggleFilterTag { tag_id } => {
            workspace.toggle_filter_tag(&tag_id)?;
            delta.record_filter_changed();
            Outcome::Filter { selected: workspace.filter().selected().to_vec() }
        }
        Command::SetFilterTags { tag_ids } => {
            let before = workspace.rev();
            workspace.set_filter_tags(&tag_ids)?;
            if workspace.rev() != before {
                delta.record_filter_changed();
            }
            Outcome::Filter { selected: workspace.filter().selected().to_vec() }
        }
        Command::ClearFilter => {
            if workspace.clear_filter() {
                delta.record_filter_changed();
            }
            Outcome::Filter { selected: Vec::new() }
        }
    };

    Ok(Applied { rev: workspace.rev(), delta: delta.finish(), outcome })
}

#[cfg(test)]
mod tests;
