// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Reeltag-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Reeltag and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::*;

use crate::engine::SteppingClock;
use crate::store::Seed;
use crate::tui::testing::HeadlessTui;
use chrono::{Duration, TimeZone, Utc};
use crossterm::event::KeyCode;

fn new_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread().enable_all().build().expect("tokio runtime")
}

/// One workspace and one UI state shared by a headless TUI and an MCP server, as in TUI mode.
struct CollabHarness {
    runtime: tokio::runtime::Runtime,
    tui: HeadlessTui,
    mcp: ReeltagMcp,
}

impl CollabHarness {
    fn new() -> Self {
        let start = Utc.with_ymd_and_hms(2025, 4, 28, 9, 0, 0).single().expect("start");
        let clock = Arc::new(SteppingClock::new(start, Duration::seconds(1)));
        let workspace = Seed::demo().into_workspace("operator", clock).expect("demo workspace");
        let workspace = Arc::new(Mutex::new(workspace));
        let ui_state = Arc::new(Mutex::new(UiState::default()));

        Self {
            runtime: new_runtime(),
            tui: HeadlessTui::new(workspace.clone(), Some(ui_state.clone()), 2),
            mcp: ReeltagMcp::new_shared(workspace, Some(ui_state)),
        }
    }
}

#[test]
fn agent_sees_the_session_the_operator_selected() {
    let mut harness = CollabHarness::new();
    harness.tui.press(KeyCode::Down);
    harness.tui.press(KeyCode::Down);

    let Json(view) = harness.runtime.block_on(harness.mcp.view_read()).expect("view.read");
    assert_eq!(view.selected_session_id.as_deref(), Some("3"));
    assert_eq!(view.show_top_tags, Some(false));
    let top: Vec<&str> = view.top_tags.iter().map(|tag| tag.name.as_str()).collect();
    assert_eq!(top, ["Bug", "Feature Request"]);
}

#[test]
fn agent_tagging_reaches_the_tui_on_next_sync() {
    let mut harness = CollabHarness::new();

    let Json(attached) = harness
        .runtime
        .block_on(harness.mcp.session_attach_tag(Parameters(SessionTagParams {
            session_id: "4".to_owned(),
            tag_id: "9".to_owned(),
        })))
        .expect("session.attach_tag");
    assert!(attached.changed);

    assert!(harness.tui.session_tag_names("4").is_empty());
    harness.tui.sync_from_workspace();
    assert_eq!(harness.tui.session_tag_names("4"), ["Mobile"]);
}

#[test]
fn operator_filter_is_what_the_agent_reads() {
    let mut harness = CollabHarness::new();
    harness.tui.press(KeyCode::Char('t'));
    harness.tui.press(KeyCode::Char('1'));

    let Json(filter) = harness.runtime.block_on(harness.mcp.filter_read()).expect("filter.read");
    let selected: Vec<&str> = filter.selected.iter().map(|tag| tag.name.as_str()).collect();
    assert_eq!(selected, ["Bug"]);
    assert_eq!(filter.visible_sessions, 1);

    let Json(view) = harness.runtime.block_on(harness.mcp.view_read()).expect("view.read");
    assert_eq!(view.visible_session_ids, ["3"]);
    assert_eq!(view.selected_session_id.as_deref(), Some("3"));
}

#[test]
fn agent_tag_delete_clears_operator_filter() {
    let mut harness = CollabHarness::new();
    harness.tui.press(KeyCode::Char('t'));
    harness.tui.press(KeyCode::Char('1'));
    assert_eq!(harness.tui.visible_session_ids(), ["3"]);

    let Json(deleted) = harness
        .runtime
        .block_on(harness.mcp.tag_delete(Parameters(TagDeleteParams { tag_id: "1".to_owned() })))
        .expect("tag.delete");
    assert!(deleted.delta.filter_changed);

    harness.tui.sync_from_workspace();
    assert_eq!(harness.tui.visible_session_ids().len(), 6);
    assert_eq!(harness.tui.session_tag_names("3"), ["High Priority"]);
}

#[test]
fn operator_created_tag_is_listed_for_the_agent() {
    let mut harness = CollabHarness::new();
    harness.tui.press(KeyCode::Char('a'));
    harness.tui.type_text("Churn Risk");
    harness.tui.press(KeyCode::Enter);

    let Json(list) = harness.runtime.block_on(harness.mcp.tag_list()).expect("tag.list");
    let created = list.tags.last().expect("created tag");
    assert_eq!(created.name, "Churn Risk");
    assert_eq!(created.created_by, "operator");
    assert_eq!(list.rev, 1);
}
