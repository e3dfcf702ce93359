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
use chrono::{Duration, TimeZone, Utc};
use rmcp::model::ErrorCode;
use std::collections::BTreeSet;

fn demo_workspace() -> Workspace {
    let start = Utc.with_ymd_and_hms(2025, 4, 28, 9, 0, 0).single().expect("start");
    Seed::demo()
        .into_workspace("agent", Arc::new(SteppingClock::new(start, Duration::seconds(1))))
        .expect("demo workspace")
}

fn demo_server() -> ReeltagMcp {
    ReeltagMcp::new(demo_workspace())
}

fn tag_names(tags: &[McpTagRef]) -> Vec<&str> {
    tags.iter().map(|tag| tag.name.as_str()).collect()
}

fn session_tag(session_id: &str, tag_id: &str) -> Parameters<SessionTagParams> {
    Parameters(SessionTagParams { session_id: session_id.to_owned(), tag_id: tag_id.to_owned() })
}

#[test]
fn tools_advertise_descriptions_and_schemas() {
    let tools = ReeltagMcp::tool_router().list_all();
    assert_eq!(tools.len(), 21);

    let mut seen_names = BTreeSet::new();
    for tool in tools {
        let name = tool.name.to_string();
        assert!(seen_names.insert(name.clone()), "duplicate tool name: {name}");

        let desc_missing =
            tool.description.as_deref().map(|desc| desc.trim().is_empty()).unwrap_or(true);
        assert!(!desc_missing, "tool missing description: {name}");
        assert_eq!(
            tool.input_schema.get("type").and_then(|v| v.as_str()),
            Some("object"),
            "non-object input schema: {name}"
        );
        let output_type = tool
            .output_schema
            .as_ref()
            .and_then(|schema| schema.get("type"))
            .and_then(|v| v.as_str());
        assert_eq!(output_type, Some("object"), "missing object output schema: {name}");
    }

    for expected in ["tag.create", "session.attach_tag", "note.add", "filter.set", "view.read"] {
        assert!(seen_names.contains(expected), "missing tool {expected}");
    }
}

#[tokio::test]
async fn tag_list_keeps_registry_order() {
    let server = demo_server();
    let Json(result) = server.tag_list().await.expect("tag.list");

    assert_eq!(result.rev, 0);
    let ids: Vec<&str> = result.tags.iter().map(|tag| tag.tag_id.as_str()).collect();
    assert_eq!(ids, ["1", "2", "3", "4", "5", "6", "7", "8", "9", "10"]);
    assert_eq!(result.tags[0].color, "red");
    assert_eq!(result.tags[0].created_by, "admin");
}

#[tokio::test]
async fn tag_create_stamps_actor_and_reports_delta() {
    let server = demo_server();
    let Json(result) = server
        .tag_create(Parameters(TagCreateParams {
            name: "  Regression ".to_owned(),
            color: Some("Pink".to_owned()),
        }))
        .await
        .expect("tag.create");

    assert_eq!(result.rev, 1);
    assert_eq!(result.tag.name, "Regression");
    assert_eq!(result.tag.color, "pink");
    assert_eq!(result.tag.created_by, "agent");
    assert_eq!(result.delta.tags_added, [result.tag.tag_id.clone()]);
    assert!(result.delta.sessions_updated.is_empty());
}

#[tokio::test]
async fn tag_create_rejects_blank_name_and_unknown_color() {
    let server = demo_server();

    let err = server
        .tag_create(Parameters(TagCreateParams { name: "   ".to_owned(), color: None }))
        .await
        .err().expect("blank name");
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);

    let err = server
        .tag_create(Parameters(TagCreateParams {
            name: "Teal".to_owned(),
            color: Some("teal".to_owned()),
        }))
        .await
        .err().expect("unknown color");
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);

    let Json(list) = server.tag_list().await.expect("tag.list");
    assert_eq!(list.rev, 0);
    assert_eq!(list.tags.len(), 10);
}

#[tokio::test]
async fn tag_update_keeps_omitted_fields_and_propagates_to_sessions() {
    let server = demo_server();
    let Json(updated) = server
        .tag_update(Parameters(TagUpdateParams {
            tag_id: "1".to_owned(),
            name: Some("Defect".to_owned()),
            color: None,
        }))
        .await
        .expect("tag.update");

    assert_eq!(updated.tag.name, "Defect");
    assert_eq!(updated.tag.color, "red");
    assert_eq!(updated.delta.tags_updated, ["1"]);

    let Json(session) = server
        .session_get(Parameters(SessionGetParams { session_id: "3".to_owned() }))
        .await
        .expect("session.get");
    assert_eq!(tag_names(&session.session.summary.tags), ["Defect", "High Priority"]);
}

#[tokio::test]
async fn tag_update_unknown_tag_is_not_found() {
    let server = demo_server();
    let err = server
        .tag_update(Parameters(TagUpdateParams {
            tag_id: "missing".to_owned(),
            name: Some("X".to_owned()),
            color: None,
        }))
        .await
        .err().expect("unknown tag");
    assert_eq!(err.code, ErrorCode::RESOURCE_NOT_FOUND);
}

#[tokio::test]
async fn tag_delete_cascades_and_unknown_is_noop() {
    let server = demo_server();
    server
        .filter_toggle(Parameters(FilterToggleParams { tag_id: "1".to_owned() }))
        .await
        .expect("filter.toggle");

    let Json(deleted) = server
        .tag_delete(Parameters(TagDeleteParams { tag_id: "1".to_owned() }))
        .await
        .expect("tag.delete");
    assert!(deleted.deleted);
    assert_eq!(deleted.detached_from, ["3"]);
    assert!(deleted.delta.filter_changed);
    assert_eq!(deleted.rev, 2);

    let Json(filter) = server.filter_read().await.expect("filter.read");
    assert!(filter.selected.is_empty());
    assert_eq!(filter.visible_sessions, 6);

    let Json(again) = server
        .tag_delete(Parameters(TagDeleteParams { tag_id: "1".to_owned() }))
        .await
        .expect("tag.delete again");
    assert!(!again.deleted);
    assert_eq!(again.rev, 2);
}

#[tokio::test]
async fn tag_search_excludes_attached_and_reports_can_create() {
    let server = demo_server();
    let Json(result) = server
        .tag_search(Parameters(TagSearchParams {
            query: "f".to_owned(),
            session_id: Some("5".to_owned()),
            exclude_tag_ids: None,
            limit: None,
        }))
        .await
        .expect("tag.search");

    let names: Vec<&str> = result.tags.iter().map(|tag| tag.name.as_str()).collect();
    assert_eq!(names, ["Follow Up", "Checkout Flow"]);
    assert!(result.can_create);

    let Json(exact) = server
        .tag_search(Parameters(TagSearchParams {
            query: "bug".to_owned(),
            session_id: None,
            exclude_tag_ids: None,
            limit: Some(1),
        }))
        .await
        .expect("tag.search exact");
    assert_eq!(exact.tags.len(), 1);
    assert!(!exact.can_create);
}

#[tokio::test]
async fn tag_top_breaks_ties_by_registry_order() {
    let server = demo_server();
    let Json(top) =
        server.tag_top(Parameters(TagTopParams { n: None })).await.expect("tag.top");
    let names: Vec<&str> = top.tags.iter().map(|tag| tag.name.as_str()).collect();
    assert_eq!(names, ["Bug", "Feature Request"]);

    server.session_attach_tag(session_tag("4", "9")).await.expect("attach");
    server.session_attach_tag(session_tag("2", "9")).await.expect("attach");

    let Json(top) =
        server.tag_top(Parameters(TagTopParams { n: Some(3) })).await.expect("tag.top");
    let names: Vec<&str> = top.tags.iter().map(|tag| tag.name.as_str()).collect();
    assert_eq!(names, ["Mobile", "Bug", "Feature Request"]);
    assert_eq!(top.tags[0].sessions, 2);
}

#[tokio::test]
async fn tag_usage_includes_unused_tags() {
    let server = demo_server();
    let Json(usage) = server.tag_usage().await.expect("tag.usage");
    assert_eq!(usage.tags.len(), 10);
    let mobile = usage.tags.iter().find(|tag| tag.name == "Mobile").expect("mobile");
    assert_eq!(mobile.sessions, 0);
}

#[tokio::test]
async fn attach_is_idempotent_and_requires_known_ids() {
    let server = demo_server();

    let Json(first) = server.session_attach_tag(session_tag("4", "1")).await.expect("attach");
    assert!(first.changed);
    assert_eq!(first.rev, 1);
    assert_eq!(tag_names(&first.tags), ["Bug"]);
    assert_eq!(first.delta.sessions_updated, ["4"]);

    let Json(second) = server.session_attach_tag(session_tag("4", "1")).await.expect("attach");
    assert!(!second.changed);
    assert_eq!(second.rev, 1);
    assert!(second.delta.sessions_updated.is_empty());

    let err = server.session_attach_tag(session_tag("4", "nope")).await.err().expect("unknown");
    assert_eq!(err.code, ErrorCode::RESOURCE_NOT_FOUND);
    let err = server.session_attach_tag(session_tag("nope", "1")).await.err().expect("unknown");
    assert_eq!(err.code, ErrorCode::RESOURCE_NOT_FOUND);
    let err = server.session_attach_tag(session_tag(" 4", "1")).await.err().expect("bad id");
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);

    let Json(detached) = server.session_detach_tag(session_tag("4", "1")).await.expect("detach");
    assert!(detached.changed);
    assert!(detached.tags.is_empty());
    assert_eq!(detached.rev, 2);
}

/// Runs `first` and `second` queued on the workspace lock in that order, then releases it.
async fn queued<A, B>(
    workspace: &Mutex<Workspace>,
    first: impl std::future::Future<Output = A>,
    second: impl std::future::Future<Output = B>,
) -> (A, B) {
    let guard = workspace.lock().await;
    let release = async move {
        tokio::task::yield_now().await;
        drop(guard);
    };
    let (a, b, ()) = tokio::join!(first, second, release);
    (a, b)
}

#[tokio::test]
async fn attach_reply_matches_its_revision_when_a_delete_is_queued() {
    let workspace = Arc::new(Mutex::new(demo_workspace()));
    let server = ReeltagMcp::new_shared(workspace.clone(), None);

    let (attached, deleted) = queued(
        &workspace,
        server.session_attach_tag(session_tag("4", "9")),
        server.tag_delete(Parameters(TagDeleteParams { tag_id: "9".to_owned() })),
    )
    .await;
    let Json(attached) = attached.expect("attach");
    let Json(deleted) = deleted.expect("delete");

    assert_eq!(attached.rev, 1);
    assert_eq!(tag_names(&attached.tags), ["Mobile"]);
    assert_eq!(attached.delta.sessions_updated, ["4"]);
    assert_eq!(deleted.rev, 2);
    assert_eq!(deleted.detached_from, ["4"]);
}

#[tokio::test]
async fn filter_reply_matches_its_revision_when_a_delete_is_queued() {
    let workspace = Arc::new(Mutex::new(demo_workspace()));
    let server = ReeltagMcp::new_shared(workspace.clone(), None);

    let (toggled, deleted) = queued(
        &workspace,
        server.filter_toggle(Parameters(FilterToggleParams { tag_id: "9".to_owned() })),
        server.tag_delete(Parameters(TagDeleteParams { tag_id: "9".to_owned() })),
    )
    .await;
    let Json(toggled) = toggled.expect("filter.toggle");
    let Json(deleted) = deleted.expect("delete");

    assert_eq!(toggled.rev, 1);
    assert_eq!(tag_names(&toggled.selected), ["Mobile"]);
    assert_eq!(toggled.visible_sessions, 0);
    assert!(deleted.delta.filter_changed);
    assert_eq!(deleted.rev, 2);
}

#[tokio::test]
async fn create_and_attach_tag_links_new_tag() {
    let server = demo_server();
    let Json(created) = server
        .session_create_and_attach_tag(Parameters(SessionCreateAndAttachTagParams {
            session_id: "2".to_owned(),
            name: "Payments".to_owned(),
            color: None,
        }))
        .await
        .expect("session.create_and_attach_tag");

    assert_eq!(created.tag.color, "blue");
    assert_eq!(created.delta.sessions_updated, ["2"]);

    let Json(session) = server
        .session_get(Parameters(SessionGetParams { session_id: "2".to_owned() }))
        .await
        .expect("session.get");
    assert_eq!(tag_names(&session.session.summary.tags), ["Checkout Flow", "Payments"]);
    assert!(!session.available_tags.iter().any(|tag| tag.name == "Payments"));
}

#[tokio::test]
async fn note_lifecycle_round_trips_through_tools() {
    let server = demo_server();
    let Json(added) = server
        .note_add(Parameters(NoteAddParams {
            session_id: "4".to_owned(),
            content: "Bounced on pricing page".to_owned(),
        }))
        .await
        .expect("note.add");
    assert_eq!(added.note.created_by, "agent");
    assert_eq!(added.note.created_at, added.note.updated_at);

    let Json(edited) = server
        .note_edit(Parameters(NoteEditParams {
            session_id: "4".to_owned(),
            note_id: added.note.note_id.clone(),
            content: "Bounced on pricing page twice".to_owned(),
        }))
        .await
        .expect("note.edit");
    assert_eq!(edited.note.created_at, added.note.created_at);
    assert_ne!(edited.note.updated_at, added.note.updated_at);

    let Json(deleted) = server
        .note_delete(Parameters(NoteDeleteParams {
            session_id: "4".to_owned(),
            note_id: added.note.note_id.clone(),
        }))
        .await
        .expect("note.delete");
    assert!(deleted.deleted);
    assert_eq!(deleted.rev, 3);

    let Json(missing) = server
        .note_delete(Parameters(NoteDeleteParams {
            session_id: "4".to_owned(),
            note_id: added.note.note_id,
        }))
        .await
        .expect("note.delete unknown note");
    assert!(!missing.deleted);
    assert_eq!(missing.rev, 3);
}

#[tokio::test]
async fn filter_is_and_over_selected_tags() {
    let server = demo_server();
    let Json(filter) = server
        .filter_set(Parameters(FilterSetParams { tag_ids: vec!["1".to_owned(), "6".to_owned()] }))
        .await
        .expect("filter.set");
    assert_eq!(filter.visible_sessions, 1);
    assert_eq!(tag_names(&filter.selected), ["Bug", "High Priority"]);

    let Json(visible) = server.session_visible().await.expect("session.visible");
    let ids: Vec<&str> = visible.sessions.iter().map(|s| s.session_id.as_str()).collect();
    assert_eq!(ids, ["3"]);
    assert_eq!(visible.filter_tag_ids, ["1", "6"]);

    let Json(toggled) = server
        .filter_toggle(Parameters(FilterToggleParams { tag_id: "6".to_owned() }))
        .await
        .expect("filter.toggle");
    assert_eq!(tag_names(&toggled.selected), ["Bug"]);

    let Json(cleared) = server.filter_clear().await.expect("filter.clear");
    assert!(cleared.selected.is_empty());
    assert_eq!(cleared.visible_sessions, 6);
}

#[tokio::test]
async fn filter_set_with_unknown_tag_changes_nothing() {
    let server = demo_server();
    let err = server
        .filter_set(Parameters(FilterSetParams {
            tag_ids: vec!["1".to_owned(), "missing".to_owned()],
        }))
        .await
        .err().expect("unknown tag");
    assert_eq!(err.code, ErrorCode::RESOURCE_NOT_FOUND);

    let Json(filter) = server.filter_read().await.expect("filter.read");
    assert!(filter.selected.is_empty());
    assert_eq!(filter.rev, 0);
}

#[tokio::test]
async fn view_read_without_ui_state_uses_defaults() {
    let server = demo_server();
    let Json(view) = server.view_read().await.expect("view.read");

    assert_eq!(view.ui_rev, None);
    assert_eq!(view.selected_session_id, None);
    assert_eq!(view.show_top_tags, None);
    assert_eq!(view.top_tags.len(), 2);
    assert_eq!(view.visible_session_ids.len(), 6);
}

#[tokio::test]
async fn view_read_reflects_shared_ui_state() {
    let ui_state = Arc::new(Mutex::new(UiState::default()));
    let server = ReeltagMcp::new_shared(
        Arc::new(Mutex::new(demo_workspace())),
        Some(ui_state.clone()),
    );

    {
        let mut ui = ui_state.lock().await;
        ui.set_selected_session(Some(SessionId::new("5").expect("session id")));
        ui.set_top_tags_strip(true, 3);
    }

    let Json(view) = server.view_read().await.expect("view.read");
    assert_eq!(view.ui_rev, Some(2));
    assert_eq!(view.selected_session_id.as_deref(), Some("5"));
    assert_eq!(view.show_top_tags, Some(true));
    assert_eq!(view.top_tags.len(), 3);
}

#[tokio::test]
async fn streamable_http_tools_call_mutates_shared_workspace() {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use rmcp::transport::{
        streamable_http_server::session::local::LocalSessionManager, StreamableHttpServerConfig,
        StreamableHttpService,
    };

    let workspace = Arc::new(Mutex::new(demo_workspace()));
    let server = ReeltagMcp::new_shared(workspace.clone(), None);

    let config = StreamableHttpServerConfig {
        stateful_mode: false,
        sse_keep_alive: None,
        ..StreamableHttpServerConfig::default()
    };

    let session_manager = Arc::new(LocalSessionManager::default());
    let service = {
        let server = server.clone();
        StreamableHttpService::new(move || Ok(server.clone()), session_manager, config)
    };

    let body = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": {
            "name": "session.attach_tag",
            "arguments": { "session_id": "4", "tag_id": "9" }
        }
    })
    .to_string();

    let response = service
        .handle(
            Request::builder()
                .method("POST")
                .uri("/mcp")
                .header(axum::http::header::ACCEPT, "application/json, text/event-stream")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .expect("request"),
        )
        .await;

    assert_eq!(response.status(), axum::http::StatusCode::OK);

    let response_body = Body::new(response.into_body());
    let bytes = tokio::time::timeout(
        std::time::Duration::from_secs(3),
        to_bytes(response_body, usize::MAX),
    )
    .await
    .expect("timeout collecting response body")
    .expect("collect response body");
    assert!(!bytes.is_empty());

    let workspace = workspace.lock().await;
    assert_eq!(workspace.rev(), 1);
    let session = workspace.session(&SessionId::new("4").expect("session id")).expect("session");
    assert!(session.has_tag(&TagId::new("9").expect("tag id")));
}
