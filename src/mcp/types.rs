// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Reeltag-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Reeltag and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpTag {
    pub tag_id: String,
    pub name: String,
    pub color: String,
    pub created_by: String,
    /// RFC 3339.
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpTagRef {
    pub tag_id: String,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpTagUsage {
    pub tag_id: String,
    pub name: String,
    pub color: String,
    pub sessions: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpNote {
    pub note_id: String,
    pub content: String,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpSessionSummary {
    pub session_id: String,
    pub user_id: String,
    pub user_email: String,
    pub date: String,
    pub time: String,
    pub session_length: String,
    pub country: String,
    pub has_warning: bool,
    pub category: Option<String>,
    pub tags: Vec<McpTagRef>,
    pub notes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpSession {
    #[serde(flatten)]
    pub summary: McpSessionSummary,
    pub note_list: Vec<McpNote>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct McpDelta {
    pub tags_added: Vec<String>,
    pub tags_updated: Vec<String>,
    pub tags_removed: Vec<String>,
    pub sessions_updated: Vec<String>,
    pub filter_changed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TagListResponse {
    pub rev: u64,
    pub tags: Vec<McpTag>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TagCreateParams {
    pub name: String,
    /// gray, red, yellow, green, blue, indigo, purple or pink (default blue).
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TagUpdateParams {
    pub tag_id: String,
    /// Keeps the current name when omitted.
    pub name: Option<String>,
    /// Keeps the current color when omitted.
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TagMutationResponse {
    pub rev: u64,
    pub tag: McpTag,
    pub delta: McpDelta,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TagDeleteParams {
    pub tag_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TagDeleteResponse {
    pub rev: u64,
    pub deleted: bool,
    pub detached_from: Vec<String>,
    pub delta: McpDelta,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TagSearchParams {
    pub query: String,
    /// Leave out tags already attached to this session.
    pub session_id: Option<String>,
    /// Leave out these tags as well.
    pub exclude_tag_ids: Option<Vec<String>>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TagSearchResponse {
    pub rev: u64,
    pub tags: Vec<McpTag>,
    /// True when the query is non-blank and no tag carries exactly that name.
    pub can_create: bool,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TagTopParams {
    /// Defaults to 2.
    pub n: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TagUsageResponse {
    pub rev: u64,
    pub tags: Vec<McpTagUsage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionListResponse {
    pub rev: u64,
    pub sessions: Vec<McpSessionSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionVisibleResponse {
    pub rev: u64,
    pub filter_tag_ids: Vec<String>,
    pub sessions: Vec<McpSessionSummary>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SessionGetParams {
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionGetResponse {
    pub rev: u64,
    pub session: McpSession,
    /// Registry tags not yet attached to the session.
    pub available_tags: Vec<McpTagRef>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SessionTagParams {
    pub session_id: String,
    pub tag_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionTagResponse {
    pub rev: u64,
    pub session_id: String,
    /// False when the attachment was already in the requested state.
    pub changed: bool,
    pub tags: Vec<McpTagRef>,
    pub delta: McpDelta,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SessionCreateAndAttachTagParams {
    pub session_id: String,
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NoteAddParams {
    pub session_id: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NoteEditParams {
    pub session_id: String,
    pub note_id: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NoteDeleteParams {
    pub session_id: String,
    pub note_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NoteResponse {
    pub rev: u64,
    pub session_id: String,
    pub note: McpNote,
    pub delta: McpDelta,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NoteDeleteResponse {
    pub rev: u64,
    pub session_id: String,
    pub deleted: bool,
    pub delta: McpDelta,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FilterToggleParams {
    pub tag_id: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FilterSetParams {
    pub tag_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FilterResponse {
    pub rev: u64,
    pub selected: Vec<McpTagRef>,
    pub visible_sessions: u64,
    pub delta: Option<McpDelta>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ViewReadResponse {
    pub rev: u64,
    /// `None` when no TUI shares this server.
    pub ui_rev: Option<u64>,
    pub selected_session_id: Option<String>,
    pub show_top_tags: Option<bool>,
    pub top_tags: Vec<McpTagUsage>,
    pub filter_tag_ids: Vec<String>,
    pub visible_session_ids: Vec<String>,
}
