// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Reeltag-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Reeltag and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// MCP server helper functions:
/// model-to-wire mapping, response assembly, and parameter parsing.
fn mcp_tag(tag: &Tag) -> McpTag {
    McpTag {
        tag_id: tag.tag_id().to_string(),
        name: tag.name().to_owned(),
        color: tag.color().to_string(),
        created_by: tag.created_by().to_owned(),
        created_at: tag.created_at().to_rfc3339(),
    }
}

fn mcp_tag_ref(tag: &Tag) -> McpTagRef {
    McpTagRef {
        tag_id: tag.tag_id().to_string(),
        name: tag.name().to_owned(),
        color: tag.color().to_string(),
    }
}

fn mcp_tag_usage(usage: TagUsage<'_>) -> McpTagUsage {
    McpTagUsage {
        tag_id: usage.tag.tag_id().to_string(),
        name: usage.tag.name().to_owned(),
        color: usage.tag.color().to_string(),
        sessions: usage.sessions as u64,
    }
}

fn mcp_note(note: &Note) -> McpNote {
    McpNote {
        note_id: note.note_id().to_string(),
        content: note.content().to_owned(),
        created_by: note.created_by().to_owned(),
        created_at: note.created_at().to_rfc3339(),
        updated_at: note.updated_at().to_rfc3339(),
    }
}

fn session_summary(workspace: &Workspace, session: &SessionReplay) -> McpSessionSummary {
    McpSessionSummary {
        session_id: session.session_id().to_string(),
        user_id: session.user_id().to_owned(),
        user_email: session.user_email().to_owned(),
        date: session.date().to_rfc3339(),
        time: session.time().to_owned(),
        session_length: session.session_length().to_owned(),
        country: session.country().to_owned(),
        has_warning: session.has_warning(),
        category: session.category().map(str::to_owned),
        tags: workspace.session_tags(session).into_iter().map(mcp_tag_ref).collect(),
        notes: session.notes().len() as u64,
    }
}

fn mcp_delta(delta: &Delta) -> McpDelta {
    McpDelta {
        tags_added: delta.tags_added.iter().map(ToString::to_string).collect(),
        tags_updated: delta.tags_updated.iter().map(ToString::to_string).collect(),
        tags_removed: delta.tags_removed.iter().map(ToString::to_string).collect(),
        sessions_updated: delta.sessions_updated.iter().map(ToString::to_string).collect(),
        filter_changed: delta.filter_changed,
    }
}

fn parse_id<T>(field: &'static str, value: &str) -> Result<Id<T>, ErrorData> {
    Id::new(value.to_owned()).map_err(|err| {
        ErrorData::invalid_params(
            format!("invalid {field}: {err}"),
            Some(serde_json::json!({ "field": field, "value": value })),
        )
    })
}

fn parse_color(value: Option<&str>) -> Result<Option<TagColor>, ErrorData> {
    value
        .map(|value| {
            value.parse::<TagColor>().map_err(|err| {
                ErrorData::invalid_params(
                    err.to_string(),
                    Some(serde_json::json!({ "color": value })),
                )
            })
        })
        .transpose()
}

fn map_engine_error(err: EngineError) -> ErrorData {
    match &err {
        EngineError::InvalidInput { field, reason } => ErrorData::invalid_params(
            err.to_string(),
            Some(serde_json::json!({ "field": field, "reason": reason })),
        ),
        EngineError::NotFound { kind, id } => ErrorData::resource_not_found(
            err.to_string(),
            Some(serde_json::json!({ "kind": kind.to_string(), "id": id })),
        ),
    }
}

fn unexpected_outcome(tool: &'static str) -> ErrorData {
    ErrorData::internal_error(
        format!("{tool}: command produced an unexpected outcome"),
        Some(serde_json::json!({ "tool": tool })),
    )
}

fn tag_mutation_response(applied: Applied) -> Result<Json<TagMutationResponse>, ErrorData> {
    let Outcome::Tag(tag) = &applied.outcome else {
        return Err(unexpected_outcome("tag mutation"));
    };
    Ok(Json(TagMutationResponse {
        rev: applied.rev,
        tag: mcp_tag(tag),
        delta: mcp_delta(&applied.delta),
    }))
}

fn session_tag_response(
    applied: Applied,
    workspace: &Workspace,
) -> Result<Json<SessionTagResponse>, ErrorData> {
    let Outcome::Attachment { session_id, changed } = &applied.outcome else {
        return Err(unexpected_outcome("session tag mutation"));
    };
    let tags = workspace
        .session(session_id)
        .map(|session| workspace.session_tags(session).into_iter().map(mcp_tag_ref).collect())
        .unwrap_or_default();
    Ok(Json(SessionTagResponse {
        rev: applied.rev,
        session_id: session_id.to_string(),
        changed: *changed,
        tags,
        delta: mcp_delta(&applied.delta),
    }))
}

fn note_response(
    applied: Applied,
    session_id: &SessionId,
) -> Result<Json<NoteResponse>, ErrorData> {
    let Outcome::Note(note) = &applied.outcome else {
        return Err(unexpected_outcome("note mutation"));
    };
    Ok(Json(NoteResponse {
        rev: applied.rev,
        session_id: session_id.to_string(),
        note: mcp_note(note),
        delta: mcp_delta(&applied.delta),
    }))
}

fn filter_response(workspace: &Workspace, delta: Option<&Delta>) -> FilterResponse {
    FilterResponse {
        rev: workspace.rev(),
        selected: workspace.filter_tags().into_iter().map(mcp_tag_ref).collect(),
        visible_sessions: workspace.visible_sessions().len() as u64,
        delta: delta.map(mcp_delta),
    }
}
