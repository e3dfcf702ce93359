// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Reeltag-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Reeltag and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::{Json, Parameters};
use rmcp::model::{ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ErrorData, ServerHandler, ServiceExt};
use tokio::sync::Mutex;

use crate::engine::{EngineError, EntityKind, TagUsage, Workspace, DEFAULT_TOP_TAGS};
use crate::model::{Id, Note, SessionId, SessionReplay, Tag, TagColor, TagId};
use crate::ops::{apply_command, Applied, Command, Delta, Outcome};
use crate::query;
use crate::ui::UiState;

use super::types::*;

#[derive(Clone)]
pub struct ReeltagMcp {
    workspace: Arc<Mutex<Workspace>>,
    ui_state: Option<Arc<Mutex<UiState>>>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ReeltagMcp {
    pub fn new(workspace: Workspace) -> Self {
        Self::new_shared(Arc::new(Mutex::new(workspace)), None)
    }

    /// Serves a workspace that a TUI edits at the same time.
    pub fn new_shared(
        workspace: Arc<Mutex<Workspace>>,
        ui_state: Option<Arc<Mutex<UiState>>>,
    ) -> Self {
        Self { workspace, ui_state, tool_router: Self::tool_router() }
    }

    pub async fn serve_stdio(self) -> Result<(), rmcp::RmcpError> {
        let service = self.serve((tokio::io::stdin(), tokio::io::stdout())).await?;
        service.waiting().await?;
        Ok(())
    }

    async fn apply(&self, command: Command) -> Result<Applied, ErrorData> {
        self.apply_with(command, |_, applied| Ok(applied)).await
    }

    /// Applies `command` and builds the reply under the same guard, so the reply describes
    /// exactly the revision the command produced.
    async fn apply_with<R>(
        &self,
        command: Command,
        respond: impl FnOnce(&Workspace, Applied) -> Result<R, ErrorData>,
    ) -> Result<R, ErrorData> {
        let mut workspace = self.workspace.lock().await;
        let applied = apply_command(&mut workspace, command).map_err(map_engine_error)?;
        respond(&workspace, applied)
    }

    /// List every tag in registry order (the order ties are broken by); start here to learn
    /// tag ids.
    #[tool(name = "tag.list")]
    async fn tag_list(&self) -> Result<Json<TagListResponse>, ErrorData> {
        let workspace = self.workspace.lock().await;
        let tags = workspace.tags().iter().map(mcp_tag).collect();
        Ok(Json(TagListResponse { rev: workspace.rev(), tags }))
    }

    /// Create a tag; the name is trimmed and must not be blank. Names may repeat.
    #[tool(name = "tag.create")]
    async fn tag_create(
        &self,
        params: Parameters<TagCreateParams>,
    ) -> Result<Json<TagMutationResponse>, ErrorData> {
        let TagCreateParams { name, color } = params.0;
        let color = parse_color(color.as_deref())?.unwrap_or_default();
        let applied = self.apply(Command::CreateTag { name, color }).await?;
        tag_mutation_response(applied)
    }

    /// Rename and/or recolor a tag; every session and the filter see the change at once.
    #[tool(name = "tag.update")]
    async fn tag_update(
        &self,
        params: Parameters<TagUpdateParams>,
    ) -> Result<Json<TagMutationResponse>, ErrorData> {
        let TagUpdateParams { tag_id, name, color } = params.0;
        let tag_id: TagId = parse_id("tag_id", &tag_id)?;
        let color = parse_color(color.as_deref())?;

        let mut workspace = self.workspace.lock().await;
        let Some(current) = workspace.tag(&tag_id) else {
            return Err(map_engine_error(EngineError::not_found(EntityKind::Tag, &tag_id)));
        };
        let name = name.unwrap_or_else(|| current.name().to_owned());
        let color = color.unwrap_or(current.color());
        let applied = apply_command(&mut workspace, Command::UpdateTag { tag_id, name, color })
            .map_err(map_engine_error)?;
        drop(workspace);
        tag_mutation_response(applied)
    }

    /// Delete a tag and detach it from every session and the filter. Unknown ids are a no-op.
    #[tool(name = "tag.delete")]
    async fn tag_delete(
        &self,
        params: Parameters<TagDeleteParams>,
    ) -> Result<Json<TagDeleteResponse>, ErrorData> {
        let tag_id: TagId = parse_id("tag_id", &params.0.tag_id)?;
        let applied = self.apply(Command::DeleteTag { tag_id }).await?;
        let Outcome::TagDeleted(deletion) = applied.outcome else {
            return Err(unexpected_outcome("tag.delete"));
        };
        Ok(Json(TagDeleteResponse {
            rev: applied.rev,
            deleted: deletion.is_some(),
            detached_from: deletion
                .map(|deletion| deletion.detached_from.iter().map(ToString::to_string).collect())
                .unwrap_or_default(),
            delta: mcp_delta(&applied.delta),
        }))
    }

    /// Search tags by name like the tag picker does (substring first, fuzzy fallback).
    #[tool(name = "tag.search")]
    async fn tag_search(
        &self,
        params: Parameters<TagSearchParams>,
    ) -> Result<Json<TagSearchResponse>, ErrorData> {
        let TagSearchParams { query, session_id, exclude_tag_ids, limit } = params.0;
        let mut exclude = exclude_tag_ids
            .unwrap_or_default()
            .iter()
            .map(|tag_id| parse_id("exclude_tag_ids", tag_id))
            .collect::<Result<Vec<TagId>, _>>()?;

        let workspace = self.workspace.lock().await;
        if let Some(session_id) = session_id {
            let session_id = parse_id("session_id", &session_id)?;
            let session = workspace.session(&session_id).ok_or_else(|| {
                map_engine_error(EngineError::not_found(EntityKind::Session, &session_id))
            })?;
            exclude.extend(session.tag_ids().iter().cloned());
        }

        let limit = limit.map(|limit| limit as usize).unwrap_or(usize::MAX);
        let tags = query::search_tags(workspace.tags(), &query, &exclude)
            .into_iter()
            .take(limit)
            .map(mcp_tag)
            .collect();
        let can_create =
            !query.trim().is_empty() && !query::has_exact_name(workspace.tags(), &query);
        Ok(Json(TagSearchResponse { rev: workspace.rev(), tags, can_create }))
    }

    /// The `n` most attached tags (default 2); ties keep registry order, unused tags included.
    #[tool(name = "tag.top")]
    async fn tag_top(
        &self,
        params: Parameters<TagTopParams>,
    ) -> Result<Json<TagUsageResponse>, ErrorData> {
        let n = params.0.n.map(|n| n as usize).unwrap_or(DEFAULT_TOP_TAGS);
        let workspace = self.workspace.lock().await;
        let tags = workspace.ranked_usage().into_iter().take(n).map(mcp_tag_usage).collect();
        Ok(Json(TagUsageResponse { rev: workspace.rev(), tags }))
    }

    /// Session counts for every tag, in registry order.
    #[tool(name = "tag.usage")]
    async fn tag_usage(&self) -> Result<Json<TagUsageResponse>, ErrorData> {
        let workspace = self.workspace.lock().await;
        let tags = query::tag_usage(workspace.tags(), workspace.sessions())
            .into_iter()
            .map(mcp_tag_usage)
            .collect();
        Ok(Json(TagUsageResponse { rev: workspace.rev(), tags }))
    }

    /// Every session, ignoring the filter.
    #[tool(name = "session.list")]
    async fn session_list(&self) -> Result<Json<SessionListResponse>, ErrorData> {
        let workspace = self.workspace.lock().await;
        let sessions = workspace
            .sessions()
            .iter()
            .map(|session| session_summary(&workspace, session))
            .collect();
        Ok(Json(SessionListResponse { rev: workspace.rev(), sessions }))
    }

    /// Sessions that carry every tag in the active filter.
    #[tool(name = "session.visible")]
    async fn session_visible(&self) -> Result<Json<SessionVisibleResponse>, ErrorData> {
        let workspace = self.workspace.lock().await;
        let sessions = workspace
            .visible_sessions()
            .into_iter()
            .map(|session| session_summary(&workspace, session))
            .collect();
        Ok(Json(SessionVisibleResponse {
            rev: workspace.rev(),
            filter_tag_ids: workspace.filter().selected().iter().map(ToString::to_string).collect(),
            sessions,
        }))
    }

    /// One session with its notes and the tags that could still be attached.
    #[tool(name = "session.get")]
    async fn session_get(
        &self,
        params: Parameters<SessionGetParams>,
    ) -> Result<Json<SessionGetResponse>, ErrorData> {
        let session_id = parse_id("session_id", &params.0.session_id)?;
        let workspace = self.workspace.lock().await;
        let session = workspace.session(&session_id).ok_or_else(|| {
            map_engine_error(EngineError::not_found(EntityKind::Session, &session_id))
        })?;
        let available_tags =
            query::available_tags(workspace.tags(), session).into_iter().map(mcp_tag_ref).collect();
        Ok(Json(SessionGetResponse {
            rev: workspace.rev(),
            session: McpSession {
                summary: session_summary(&workspace, session),
                note_list: session.notes().iter().map(mcp_note).collect(),
            },
            available_tags,
        }))
    }

    /// Attach a registered tag to a session; attaching twice is a no-op (`changed = false`).
    #[tool(name = "session.attach_tag")]
    async fn session_attach_tag(
        &self,
        params: Parameters<SessionTagParams>,
    ) -> Result<Json<SessionTagResponse>, ErrorData> {
        let SessionTagParams { session_id, tag_id } = params.0;
        let command = Command::AttachTag {
            session_id: parse_id("session_id", &session_id)?,
            tag_id: parse_id("tag_id", &tag_id)?,
        };
        self.apply_with(command, |workspace, applied| session_tag_response(applied, workspace))
            .await
    }

    /// Detach a tag from a session; detaching an unattached tag is a no-op.
    #[tool(name = "session.detach_tag")]
    async fn session_detach_tag(
        &self,
        params: Parameters<SessionTagParams>,
    ) -> Result<Json<SessionTagResponse>, ErrorData> {
        let SessionTagParams { session_id, tag_id } = params.0;
        let command = Command::DetachTag {
            session_id: parse_id("session_id", &session_id)?,
            tag_id: parse_id("tag_id", &tag_id)?,
        };
        self.apply_with(command, |workspace, applied| session_tag_response(applied, workspace))
            .await
    }

    /// Create a new tag and attach it to the session in one step.
    #[tool(name = "session.create_and_attach_tag")]
    async fn session_create_and_attach_tag(
        &self,
        params: Parameters<SessionCreateAndAttachTagParams>,
    ) -> Result<Json<TagMutationResponse>, ErrorData> {
        let SessionCreateAndAttachTagParams { session_id, name, color } = params.0;
        let command = Command::CreateAndAttachTag {
            session_id: parse_id("session_id", &session_id)?,
            name,
            color: parse_color(color.as_deref())?.unwrap_or_default(),
        };
        let applied = self.apply(command).await?;
        tag_mutation_response(applied)
    }

    /// Add a note to a session, stamped with the workspace actor.
    #[tool(name = "note.add")]
    async fn note_add(
        &self,
        params: Parameters<NoteAddParams>,
    ) -> Result<Json<NoteResponse>, ErrorData> {
        let NoteAddParams { session_id, content } = params.0;
        let session_id = parse_id("session_id", &session_id)?;
        let applied =
            self.apply(Command::AddNote { session_id: session_id.clone(), content }).await?;
        note_response(applied, &session_id)
    }

    /// Replace a note's content; `updated_at` moves, `created_at` does not.
    #[tool(name = "note.edit")]
    async fn note_edit(
        &self,
        params: Parameters<NoteEditParams>,
    ) -> Result<Json<NoteResponse>, ErrorData> {
        let NoteEditParams { session_id, note_id, content } = params.0;
        let session_id = parse_id("session_id", &session_id)?;
        let command = Command::EditNote {
            session_id: session_id.clone(),
            note_id: parse_id("note_id", &note_id)?,
            content,
        };
        let applied = self.apply(command).await?;
        note_response(applied, &session_id)
    }

    /// Delete a note; an unknown note id is a no-op (`deleted = false`).
    #[tool(name = "note.delete")]
    async fn note_delete(
        &self,
        params: Parameters<NoteDeleteParams>,
    ) -> Result<Json<NoteDeleteResponse>, ErrorData> {
        let NoteDeleteParams { session_id, note_id } = params.0;
        let session_id = parse_id("session_id", &session_id)?;
        let command = Command::DeleteNote {
            session_id: session_id.clone(),
            note_id: parse_id("note_id", &note_id)?,
        };
        let applied = self.apply(command).await?;
        let Outcome::NoteDeleted(removed) = applied.outcome else {
            return Err(unexpected_outcome("note.delete"));
        };
        Ok(Json(NoteDeleteResponse {
            rev: applied.rev,
            session_id: session_id.to_string(),
            deleted: removed.is_some(),
            delta: mcp_delta(&applied.delta),
        }))
    }

    /// The active filter (AND over the selected tags).
    #[tool(name = "filter.read")]
    async fn filter_read(&self) -> Result<Json<FilterResponse>, ErrorData> {
        let workspace = self.workspace.lock().await;
        Ok(Json(filter_response(&workspace, None)))
    }

    /// Add the tag to the filter, or remove it if already selected.
    #[tool(name = "filter.toggle")]
    async fn filter_toggle(
        &self,
        params: Parameters<FilterToggleParams>,
    ) -> Result<Json<FilterResponse>, ErrorData> {
        let tag_id = parse_id("tag_id", &params.0.tag_id)?;
        self.apply_with(Command::ToggleFilterTag { tag_id }, |workspace, applied| {
            Ok(Json(filter_response(workspace, Some(&applied.delta))))
        })
        .await
    }

    /// Replace the filter; every tag id must exist or nothing changes.
    #[tool(name = "filter.set")]
    async fn filter_set(
        &self,
        params: Parameters<FilterSetParams>,
    ) -> Result<Json<FilterResponse>, ErrorData> {
        let tag_ids = params
            .0
            .tag_ids
            .iter()
            .map(|tag_id| parse_id("tag_ids", tag_id))
            .collect::<Result<Vec<TagId>, _>>()?;
        self.apply_with(Command::SetFilterTags { tag_ids }, |workspace, applied| {
            Ok(Json(filter_response(workspace, Some(&applied.delta))))
        })
        .await
    }

    /// Clear the filter so every session is visible.
    #[tool(name = "filter.clear")]
    async fn filter_clear(&self) -> Result<Json<FilterResponse>, ErrorData> {
        self.apply_with(Command::ClearFilter, |workspace, applied| {
            Ok(Json(filter_response(workspace, Some(&applied.delta))))
        })
        .await
    }

    /// What the human operator sees: selected session, top-tags strip, filter and visible rows.
    #[tool(name = "view.read")]
    async fn view_read(&self) -> Result<Json<ViewReadResponse>, ErrorData> {
        let ui = match self.ui_state.as_ref() {
            Some(ui_state) => Some(ui_state.lock().await.clone()),
            None => None,
        };
        let top_n = ui.as_ref().map(UiState::top_tags).unwrap_or(DEFAULT_TOP_TAGS);

        let workspace = self.workspace.lock().await;
        Ok(Json(ViewReadResponse {
            rev: workspace.rev(),
            ui_rev: ui.as_ref().map(UiState::rev),
            selected_session_id: ui
                .as_ref()
                .and_then(UiState::selected_session_id)
                .map(ToString::to_string),
            show_top_tags: ui.as_ref().map(UiState::show_top_tags),
            top_tags: workspace.ranked_usage().into_iter().take(top_n).map(mcp_tag_usage).collect(),
            filter_tag_ids: workspace.filter().selected().iter().map(ToString::to_string).collect(),
            visible_session_ids: workspace
                .visible_sessions()
                .into_iter()
                .map(|session| session.session_id().to_string())
                .collect(),
        }))
    }
}

#[tool_handler]
impl ServerHandler for ReeltagMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Reeltag session annotation server (tools: tag.list, tag.create, tag.update, tag.delete, tag.search, tag.top, tag.usage, session.list, session.visible, session.get, session.attach_tag, session.detach_tag, session.create_and_attach_tag, note.add, note.edit, note.delete, filter.read, filter.toggle, filter.set, filter.clear, view.read)"
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

include!("server/helpers.rs");

#[cfg(test)]
mod e2e;

#[cfg(test)]
mod tests;
