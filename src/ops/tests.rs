// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Reeltag-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Reeltag and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use crate::engine::{SessionStore, SteppingClock, TagRegistry, Workspace};
use crate::model::{fixtures, NoteId, SessionId, TagColor, TagId};

use super::{apply_command, Command, CommandKind, Delta, Outcome};

fn sid(value: &str) -> SessionId {
    SessionId::new(value).expect("session id")
}

fn tid(value: &str) -> TagId {
    TagId::new(value).expect("tag id")
}

fn demo_workspace() -> Workspace {
    let start = Utc.with_ymd_and_hms(2025, 4, 28, 9, 0, 0).single().expect("start");
    Workspace::from_parts(
        TagRegistry::from_tags(fixtures::demo_tags()),
        SessionStore::from_sessions(fixtures::demo_sessions()),
        "current-user",
        Arc::new(SteppingClock::new(start, Duration::seconds(1))),
    )
}

#[test]
fn create_tag_reports_added_tag_and_new_rev() {
    let mut workspace = demo_workspace();
    let applied = apply_command(
        &mut workspace,
        Command::CreateTag { name: "Regression".to_owned(), color: TagColor::Red },
    )
    .expect("apply");

    assert_eq!(applied.rev, 1);
    let Outcome::Tag(tag) = &applied.outcome else {
        panic!("expected tag outcome");
    };
    assert_eq!(applied.delta.tags_added, vec![tag.tag_id().clone()]);
    assert!(applied.delta.sessions_updated.is_empty());
    assert!(!applied.delta.filter_changed);
}

#[test]
fn delete_tag_delta_lists_cascaded_sessions_and_filter() {
    let mut workspace = demo_workspace();
    workspace.attach_tag(&sid("4"), &tid("1")).expect("attach");
    apply_command(&mut workspace, Command::ToggleFilterTag { tag_id: tid("1") }).expect("toggle");

    let applied =
        apply_command(&mut workspace, Command::DeleteTag { tag_id: tid("1") }).expect("delete");
    assert_eq!(
        applied.delta,
        Delta {
            tags_removed: vec![tid("1")],
            sessions_updated: vec![sid("3"), sid("4")],
            filter_changed: true,
            ..Delta::default()
        }
    );
    assert!(workspace.filter().is_empty());
    assert_eq!(applied.rev, 3);
}

#[test]
fn deleting_unknown_tag_yields_empty_delta_and_same_rev() {
    let mut workspace = demo_workspace();
    let applied =
        apply_command(&mut workspace, Command::DeleteTag { tag_id: tid("nope") }).expect("apply");
    assert_eq!(applied.outcome, Outcome::TagDeleted(None));
    assert!(applied.delta.is_empty());
    assert_eq!(applied.rev, 0);
}

#[test]
fn repeated_attach_reports_unchanged() {
    let mut workspace = demo_workspace();
    let command = Command::AttachTag { session_id: sid("2"), tag_id: tid("9") };

    let first = apply_command(&mut workspace, command.clone()).expect("first");
    assert_eq!(first.outcome, Outcome::Attachment { session_id: sid("2"), changed: true });
    assert_eq!(first.delta.sessions_updated, vec![sid("2")]);

    let second = apply_command(&mut workspace, command).expect("second");
    assert_eq!(second.outcome, Outcome::Attachment { session_id: sid("2"), changed: false });
    assert!(second.delta.is_empty());
    assert_eq!(second.rev, first.rev);
}

#[test]
fn create_and_attach_records_both_sides() {
    let mut workspace = demo_workspace();
    let applied = apply_command(
        &mut workspace,
        Command::CreateAndAttachTag {
            session_id: sid("4"),
            name: "Churn Risk".to_owned(),
            color: TagColor::Yellow,
        },
    )
    .expect("apply");
    let Outcome::Tag(tag) = &applied.outcome else {
        panic!("expected tag outcome");
    };
    assert_eq!(applied.delta.tags_added, vec![tag.tag_id().clone()]);
    assert_eq!(applied.delta.sessions_updated, vec![sid("4")]);
    assert_eq!(applied.rev, 1);
}

#[test]
fn note_commands_touch_only_their_session() {
    let mut workspace = demo_workspace();
    let added = apply_command(
        &mut workspace,
        Command::AddNote { session_id: sid("2"), content: "x".to_owned() },
    )
    .expect("add");
    let Outcome::Note(note) = added.outcome else {
        panic!("expected note outcome");
    };
    assert_eq!(added.delta.sessions_updated, vec![sid("2")]);

    let edited = apply_command(
        &mut workspace,
        Command::EditNote {
            session_id: sid("2"),
            note_id: note.note_id().clone(),
            content: "y".to_owned(),
        },
    )
    .expect("edit");
    let Outcome::Note(edited_note) = edited.outcome else {
        panic!("expected note outcome");
    };
    assert_eq!(edited_note.content(), "y");
    assert!(edited_note.updated_at() >= edited_note.created_at());

    let deleted = apply_command(
        &mut workspace,
        Command::DeleteNote { session_id: sid("2"), note_id: note.note_id().clone() },
    )
    .expect("delete");
    assert!(matches!(deleted.outcome, Outcome::NoteDeleted(Some(_))));
    assert!(workspace.session(&sid("2")).expect("s2").notes().is_empty());

    let again = apply_command(
        &mut workspace,
        Command::DeleteNote {
            session_id: sid("2"),
            note_id: NoteId::new("note-1").expect("note id"),
        },
    )
    .expect("delete again");
    assert_eq!(again.outcome, Outcome::NoteDeleted(None));
    assert!(again.delta.is_empty());
}

#[test]
fn rejected_command_leaves_workspace_untouched() {
    let mut workspace = demo_workspace();
    let err = apply_command(
        &mut workspace,
        Command::UpdateTag { tag_id: tid("1"), name: "   ".to_owned(), color: TagColor::Blue },
    )
    .expect_err("blank name");
    assert!(!err.is_not_found());
    assert_eq!(workspace.rev(), 0);
    assert_eq!(workspace.tag(&tid("1")).expect("bug").name(), "Bug");
}

#[test]
fn set_filter_to_same_selection_is_not_a_change() {
    let mut workspace = demo_workspace();
    let command = Command::SetFilterTags { tag_ids: vec![tid("1"), tid("6")] };
    let first = apply_command(&mut workspace, command.clone()).expect("first");
    assert!(first.delta.filter_changed);
    assert_eq!(first.outcome, Outcome::Filter { selected: vec![tid("1"), tid("6")] });

    let second = apply_command(&mut workspace, command).expect("second");
    assert!(!second.delta.filter_changed);
    assert_eq!(second.rev, first.rev);

    let cleared = apply_command(&mut workspace, Command::ClearFilter).expect("clear");
    assert!(cleared.delta.filter_changed);
    assert_eq!(cleared.outcome, Outcome::Filter { selected: Vec::new() });
}

#[test]
fn command_kind_matches_variant() {
    assert_eq!(Command::ClearFilter.kind(), CommandKind::ClearFilter);
    assert_eq!(
        Command::DeleteTag { tag_id: tid("1") }.kind(),
        CommandKind::DeleteTag
    );
}
