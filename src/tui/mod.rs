// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Reeltag-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Reeltag and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal UI.
//!
//! Session browser over the shared workspace (ratatui + crossterm): session table with tag chips,
//! a top-tags strip whose number keys toggle the filter, a tag picker, a tag manager, a filter
//! picker over every tag, and a notes pane.
//!
//! The app renders from a snapshot that is recaptured whenever the workspace revision moves, so
//! edits made by MCP clients show up on the next tick.

use std::{
    error::Error,
    io,
    sync::Arc,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{
        Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState,
        Wrap,
    },
};
use tokio::sync::Mutex;

use crate::engine::Workspace;
use crate::model::{NoteId, SessionId, Tag, TagColor, TagId};
use crate::ops::{apply_command, Applied, Command, Outcome};
use crate::query;
use crate::ui::UiState;

mod theme;

use theme::{
    chip, panel_border_style, selected_chip, selection_style, FOOTER_KEY_COLOR,
    FOOTER_LABEL_COLOR, MUTED_COLOR, WARNING_COLOR,
};

const TICK: Duration = Duration::from_millis(250);
const TOAST_TTL: Duration = Duration::from_secs(2);
const NUMBERED_TOP_TAGS: usize = 9;

/// Runs the interactive session browser until the operator quits.
pub fn run_with_workspace(
    workspace: Arc<Mutex<Workspace>>,
    ui_state: Option<Arc<Mutex<UiState>>>,
    top_tags: usize,
) -> Result<(), Box<dyn Error>> {
    let mut terminal = TerminalSession::new()?;
    let mut app = App::new(workspace, ui_state, top_tags);

    while !app.should_quit {
        app.sync_from_workspace();
        terminal.draw(|frame| draw(frame, &mut app))?;

        if event::poll(TICK)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                _ => {}
            }
        }
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ChipView {
    tag_id: TagId,
    name: String,
    color: TagColor,
}

impl ChipView {
    fn of(tag: &Tag) -> Self {
        Self { tag_id: tag.tag_id().clone(), name: tag.name().to_owned(), color: tag.color() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct NoteView {
    note_id: NoteId,
    content: String,
    created_by: String,
    updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SessionRow {
    session_id: SessionId,
    user_email: String,
    time: String,
    session_length: String,
    country: String,
    has_warning: bool,
    tags: Vec<ChipView>,
    notes: Vec<NoteView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TopTagView {
    chip: ChipView,
    sessions: usize,
    selected: bool,
}

/// Everything the browser draws, captured under one workspace lock.
#[derive(Debug, Clone, Default)]
struct Snapshot {
    rev: u64,
    total_sessions: usize,
    rows: Vec<SessionRow>,
    top_tags: Vec<TopTagView>,
    filter: Vec<ChipView>,
}

impl Snapshot {
    fn capture(workspace: &Workspace, top_n: usize) -> Self {
        let rows = workspace
            .visible_sessions()
            .into_iter()
            .map(|session| SessionRow {
                session_id: session.session_id().clone(),
                user_email: session.user_email().to_owned(),
                time: session.time().to_owned(),
                session_length: session.session_length().to_owned(),
                country: session.country().to_owned(),
                has_warning: session.has_warning(),
                tags: workspace.session_tags(session).into_iter().map(ChipView::of).collect(),
                notes: session
                    .notes()
                    .iter()
                    .map(|note| NoteView {
                        note_id: note.note_id().clone(),
                        content: note.content().to_owned(),
                        created_by: note.created_by().to_owned(),
                        updated_at: note.updated_at().format("%Y-%m-%d %H:%M").to_string(),
                    })
                    .collect(),
            })
            .collect();

        let top_tags = workspace
            .ranked_usage()
            .into_iter()
            .take(top_n)
            .map(|usage| TopTagView {
                chip: ChipView::of(usage.tag),
                sessions: usage.sessions,
                selected: workspace.filter().is_selected(usage.tag.tag_id()),
            })
            .collect();

        Self {
            rev: workspace.rev(),
            total_sessions: workspace.sessions().len(),
            rows,
            top_tags,
            filter: workspace.filter_tags().into_iter().map(ChipView::of).collect(),
        }
    }
}

#[derive(Debug, Clone)]
struct Toast {
    message: String,
    expires_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Sessions,
    Notes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PickerKind {
    Attach,
    Detach,
}

#[derive(Debug, Clone)]
struct TagPicker {
    kind: PickerKind,
    session_id: SessionId,
    query: String,
    color: TagColor,
    results: Vec<ChipView>,
    can_create: bool,
    cursor: usize,
}

impl TagPicker {
    fn new(kind: PickerKind, session_id: SessionId) -> Self {
        Self {
            kind,
            session_id,
            query: String::new(),
            color: TagColor::default(),
            results: Vec::new(),
            can_create: false,
            cursor: 0,
        }
    }

    fn entries(&self) -> usize {
        self.results.len() + usize::from(self.can_create)
    }

    /// Re-runs the search. Attach offers tags not on the session (and "create" when no tag has
    /// the exact name); detach offers the session's own tags.
    fn refresh(&mut self, workspace: &Workspace) {
        let Some(session) = workspace.session(&self.session_id) else {
            self.results.clear();
            self.can_create = false;
            self.cursor = 0;
            return;
        };

        match self.kind {
            PickerKind::Attach => {
                self.results = query::search_tags(workspace.tags(), &self.query, session.tag_ids())
                    .into_iter()
                    .map(ChipView::of)
                    .collect();
                self.can_create = !self.query.trim().is_empty()
                    && !query::has_exact_name(workspace.tags(), &self.query);
            }
            PickerKind::Detach => {
                let attached: Vec<Tag> =
                    workspace.session_tags(session).into_iter().cloned().collect();
                self.results = query::search_tags(&attached, &self.query, &[])
                    .into_iter()
                    .map(ChipView::of)
                    .collect();
                self.can_create = false;
            }
        }
        self.cursor = self.cursor.min(self.entries().saturating_sub(1));
    }
}

#[derive(Debug, Clone)]
struct NoteEditor {
    session_id: SessionId,
    /// `None` while composing a new note.
    note_id: Option<NoteId>,
    buffer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ManagedTag {
    chip: ChipView,
    sessions: usize,
}

#[derive(Debug, Clone)]
struct TagRename {
    tag_id: TagId,
    buffer: String,
    color: TagColor,
}

/// Registry-wide tag maintenance: search, create, rename, recolor and delete.
#[derive(Debug, Clone)]
struct TagManager {
    query: String,
    color: TagColor,
    results: Vec<ManagedTag>,
    can_create: bool,
    cursor: usize,
    rename: Option<TagRename>,
}

impl TagManager {
    fn new() -> Self {
        Self {
            query: String::new(),
            color: TagColor::default(),
            results: Vec::new(),
            can_create: false,
            cursor: 0,
            rename: None,
        }
    }

    fn entries(&self) -> usize {
        self.results.len() + usize::from(self.can_create)
    }

    fn selected(&self) -> Option<&ChipView> {
        self.results.get(self.cursor).map(|entry| &entry.chip)
    }

    fn refresh(&mut self, workspace: &Workspace) {
        self.results = query::search_tags(workspace.tags(), &self.query, &[])
            .into_iter()
            .map(|tag| ManagedTag {
                chip: ChipView::of(tag),
                sessions: workspace
                    .sessions()
                    .iter()
                    .filter(|session| session.has_tag(tag.tag_id()))
                    .count(),
            })
            .collect();
        self.can_create = !self.query.trim().is_empty()
            && !query::has_exact_name(workspace.tags(), &self.query);
        self.cursor = self.cursor.min(self.entries().saturating_sub(1));
    }
}

/// Filter selection over every registered tag, not only the top-tags strip.
#[derive(Debug, Clone)]
struct FilterPicker {
    query: String,
    results: Vec<ChipView>,
    selected: Vec<TagId>,
    cursor: usize,
}

impl FilterPicker {
    fn new() -> Self {
        Self { query: String::new(), results: Vec::new(), selected: Vec::new(), cursor: 0 }
    }

    fn refresh(&mut self, workspace: &Workspace) {
        self.results = query::search_tags(workspace.tags(), &self.query, &[])
            .into_iter()
            .map(ChipView::of)
            .collect();
        self.selected = workspace.filter().selected().to_vec();
        self.cursor = self.cursor.min(self.results.len().saturating_sub(1));
    }

    /// The filter after flipping `tag_id`, keeping the order of the current selection.
    fn toggled(&self, tag_id: &TagId) -> Vec<TagId> {
        if self.selected.contains(tag_id) {
            self.selected.iter().filter(|selected| *selected != tag_id).cloned().collect()
        } else {
            self.selected.iter().cloned().chain([tag_id.clone()]).collect()
        }
    }
}

#[derive(Debug, Clone)]
enum Overlay {
    Picker(TagPicker),
    Note(NoteEditor),
    Manager(TagManager),
    Filter(FilterPicker),
}

struct App {
    workspace: Arc<Mutex<Workspace>>,
    ui_state: Option<Arc<Mutex<UiState>>>,
    top_n: usize,
    show_top_tags: bool,
    snapshot: Snapshot,
    seen_rev: Option<u64>,
    selected_session_id: Option<SessionId>,
    sessions_state: TableState,
    notes_state: ListState,
    focus: Focus,
    overlay: Option<Overlay>,
    toast: Option<Toast>,
    should_quit: bool,
}

impl App {
    fn new(
        workspace: Arc<Mutex<Workspace>>,
        ui_state: Option<Arc<Mutex<UiState>>>,
        top_n: usize,
    ) -> Self {
        let mut app = Self {
            workspace,
            ui_state,
            top_n,
            show_top_tags: false,
            snapshot: Snapshot::default(),
            seen_rev: None,
            selected_session_id: None,
            sessions_state: TableState::default(),
            notes_state: ListState::default(),
            focus: Focus::Sessions,
            overlay: None,
            toast: None,
            should_quit: false,
        };
        app.sync_from_workspace();
        app
    }

    /// Recaptures the snapshot when the workspace revision moved since the last capture.
    fn sync_from_workspace(&mut self) {
        let workspace = self.workspace.blocking_lock();
        if self.seen_rev == Some(workspace.rev()) {
            return;
        }
        let snapshot = Snapshot::capture(&workspace, self.top_n);
        drop(workspace);
        self.apply_snapshot(snapshot);
    }

    fn apply_snapshot(&mut self, snapshot: Snapshot) {
        let previous_index = self.sessions_state.selected().unwrap_or(0);
        self.seen_rev = Some(snapshot.rev);
        self.snapshot = snapshot;

        let rows = &self.snapshot.rows;
        let index = self
            .selected_session_id
            .as_ref()
            .and_then(|selected| rows.iter().position(|row| &row.session_id == selected))
            .or_else(|| (!rows.is_empty()).then(|| previous_index.min(rows.len() - 1)));
        self.sessions_state.select(index);
        self.selected_session_id = index.map(|idx| rows[idx].session_id.clone());
        self.clamp_note_selection();
        self.publish_to_ui_state();
    }

    fn clamp_note_selection(&mut self) {
        let notes = self.selected_row().map(|row| row.notes.len()).unwrap_or(0);
        let selected = match (notes, self.notes_state.selected()) {
            (0, _) => None,
            (n, Some(idx)) => Some(idx.min(n - 1)),
            (_, None) => Some(0),
        };
        self.notes_state.select(selected);
    }

    fn publish_to_ui_state(&self) {
        let Some(ui_state) = self.ui_state.as_ref() else {
            return;
        };
        let mut ui_state = ui_state.blocking_lock();
        ui_state.set_selected_session(self.selected_session_id.clone());
        ui_state.set_top_tags_strip(self.show_top_tags, self.top_n);
    }

    fn selected_row(&self) -> Option<&SessionRow> {
        self.sessions_state.selected().and_then(|idx| self.snapshot.rows.get(idx))
    }

    fn selected_note(&self) -> Option<&NoteView> {
        let row = self.selected_row()?;
        self.notes_state.selected().and_then(|idx| row.notes.get(idx))
    }

    fn set_toast(&mut self, message: impl Into<String>) {
        self.toast =
            Some(Toast { message: message.into(), expires_at: Instant::now() + TOAST_TTL });
    }

    /// Applies a command under the workspace lock, then resyncs. Rejections become a toast.
    fn run_command(&mut self, command: Command) -> Option<Applied> {
        let result = {
            let mut workspace = self.workspace.blocking_lock();
            apply_command(&mut workspace, command)
        };
        match result {
            Ok(applied) => {
                self.sync_from_workspace();
                Some(applied)
            }
            Err(err) => {
                self.set_toast(err.to_string());
                None
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.handle_key_code(key.code) {
            self.should_quit = true;
        }
    }

    /// Returns `true` when the app should quit.
    fn handle_key_code(&mut self, code: KeyCode) -> bool {
        match self.overlay {
            Some(Overlay::Picker(_)) => {
                self.handle_picker_key(code);
                return false;
            }
            Some(Overlay::Note(_)) => {
                self.handle_note_key(code);
                return false;
            }
            Some(Overlay::Manager(_)) => {
                self.handle_manager_key(code);
                return false;
            }
            Some(Overlay::Filter(_)) => {
                self.handle_filter_key(code);
                return false;
            }
            None => {}
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Tab => self.toggle_focus(),
            KeyCode::Char('t') => self.toggle_top_tags_strip(),
            KeyCode::Char(ch @ '1'..='9') => {
                let idx = ch as usize - '1' as usize;
                self.toggle_top_tag_filter(idx);
            }
            KeyCode::Char('c') => self.clear_filter(),
            KeyCode::Char('f') => self.open_filter_picker(),
            KeyCode::Char('m') => self.open_manager(),
            KeyCode::Char('a') => self.open_picker(PickerKind::Attach),
            KeyCode::Char('x') => self.open_picker(PickerKind::Detach),
            KeyCode::Char('n') => self.open_note_editor(false),
            KeyCode::Char('e') => self.open_note_editor(true),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected_note(),
            _ => {}
        }

        false
    }

    fn move_selection(&mut self, delta: isize) {
        match self.focus {
            Focus::Sessions => {
                let len = self.snapshot.rows.len();
                let Some(idx) = step_index(self.sessions_state.selected(), len, delta) else {
                    return;
                };
                self.sessions_state.select(Some(idx));
                self.selected_session_id = Some(self.snapshot.rows[idx].session_id.clone());
                self.notes_state.select(None);
                self.clamp_note_selection();
                self.publish_to_ui_state();
            }
            Focus::Notes => {
                let len = self.selected_row().map(|row| row.notes.len()).unwrap_or(0);
                if let Some(idx) = step_index(self.notes_state.selected(), len, delta) {
                    self.notes_state.select(Some(idx));
                }
            }
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Sessions => Focus::Notes,
            Focus::Notes => Focus::Sessions,
        };
    }

    fn toggle_top_tags_strip(&mut self) {
        self.show_top_tags = !self.show_top_tags;
        self.publish_to_ui_state();
        self.set_toast(if self.show_top_tags { "Top tags shown" } else { "Top tags hidden" });
    }

    fn toggle_top_tag_filter(&mut self, idx: usize) {
        if !self.show_top_tags {
            self.set_toast("Top tags hidden (t to show)");
            return;
        }
        let Some(top) = self.snapshot.top_tags.get(idx) else {
            self.set_toast(format!("No top tag {}", idx + 1));
            return;
        };
        let tag_id = top.chip.tag_id.clone();
        let name = top.chip.name.clone();
        if self.run_command(Command::ToggleFilterTag { tag_id: tag_id.clone() }).is_some() {
            let selected = self.snapshot.filter.iter().any(|chip| chip.tag_id == tag_id);
            self.set_toast(if selected {
                format!("Filter + {name}")
            } else {
                format!("Filter - {name}")
            });
        }
    }

    fn clear_filter(&mut self) {
        if self.snapshot.filter.is_empty() {
            self.set_toast("Filter already empty");
            return;
        }
        if self.run_command(Command::ClearFilter).is_some() {
            self.set_toast("Filter cleared");
        }
    }

    fn open_picker(&mut self, kind: PickerKind) {
        let Some(session_id) = self.selected_session_id.clone() else {
            self.set_toast("No session selected");
            return;
        };
        let mut picker = TagPicker::new(kind, session_id);
        picker.refresh(&self.workspace.blocking_lock());
        if kind == PickerKind::Detach && picker.results.is_empty() {
            self.set_toast("Session has no tags");
            return;
        }
        self.overlay = Some(Overlay::Picker(picker));
    }

    fn refresh_picker(&mut self) {
        let workspace = self.workspace.blocking_lock();
        if let Some(Overlay::Picker(picker)) = self.overlay.as_mut() {
            picker.refresh(&workspace);
        }
    }

    fn handle_picker_key(&mut self, code: KeyCode) {
        let Some(Overlay::Picker(picker)) = self.overlay.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => self.overlay = None,
            KeyCode::Enter => self.confirm_picker(),
            KeyCode::Down => {
                if let Some(idx) = step_index(Some(picker.cursor), picker.entries(), 1) {
                    picker.cursor = idx;
                }
            }
            KeyCode::Up => {
                if let Some(idx) = step_index(Some(picker.cursor), picker.entries(), -1) {
                    picker.cursor = idx;
                }
            }
            KeyCode::Tab if picker.kind == PickerKind::Attach => {
                picker.color = picker.color.next();
            }
            KeyCode::Backspace => {
                picker.query.pop();
                picker.cursor = 0;
                self.refresh_picker();
            }
            KeyCode::Char(ch) => {
                picker.query.push(ch);
                picker.cursor = 0;
                self.refresh_picker();
            }
            _ => {}
        }
    }

    fn confirm_picker(&mut self) {
        let Some(Overlay::Picker(picker)) = self.overlay.take() else {
            return;
        };

        let (command, message) = if let Some(chip) = picker.results.get(picker.cursor) {
            let session_id = picker.session_id.clone();
            let tag_id = chip.tag_id.clone();
            match picker.kind {
                PickerKind::Attach => {
                    (Command::AttachTag { session_id, tag_id }, format!("Tagged {}", chip.name))
                }
                PickerKind::Detach => {
                    (Command::DetachTag { session_id, tag_id }, format!("Removed {}", chip.name))
                }
            }
        } else if picker.can_create {
            let name = picker.query.trim().to_owned();
            let message = format!("Created {name}");
            let command = Command::CreateAndAttachTag {
                session_id: picker.session_id.clone(),
                name,
                color: picker.color,
            };
            (command, message)
        } else {
            self.set_toast("No matching tags");
            self.overlay = Some(Overlay::Picker(picker));
            return;
        };

        if self.run_command(command).is_some() {
            self.set_toast(message);
        }
    }

    fn open_manager(&mut self) {
        let mut manager = TagManager::new();
        manager.refresh(&self.workspace.blocking_lock());
        self.overlay = Some(Overlay::Manager(manager));
    }

    fn refresh_manager(&mut self) {
        let workspace = self.workspace.blocking_lock();
        if let Some(Overlay::Manager(manager)) = self.overlay.as_mut() {
            manager.refresh(&workspace);
        }
    }

    fn handle_manager_key(&mut self, code: KeyCode) {
        let Some(Overlay::Manager(manager)) = self.overlay.as_mut() else {
            return;
        };
        if manager.rename.is_some() {
            self.handle_rename_key(code);
            return;
        }
        match code {
            KeyCode::Esc => self.overlay = None,
            KeyCode::Enter => self.confirm_manager(),
            KeyCode::Tab => self.recolor_managed_tag(),
            KeyCode::Delete => self.delete_managed_tag(),
            KeyCode::Down => {
                if let Some(idx) = step_index(Some(manager.cursor), manager.entries(), 1) {
                    manager.cursor = idx;
                }
            }
            KeyCode::Up => {
                if let Some(idx) = step_index(Some(manager.cursor), manager.entries(), -1) {
                    manager.cursor = idx;
                }
            }
            KeyCode::Backspace => {
                manager.query.pop();
                manager.cursor = 0;
                self.refresh_manager();
            }
            KeyCode::Char(ch) => {
                manager.query.push(ch);
                manager.cursor = 0;
                self.refresh_manager();
            }
            _ => {}
        }
    }

    fn handle_rename_key(&mut self, code: KeyCode) {
        let Some(Overlay::Manager(manager)) = self.overlay.as_mut() else {
            return;
        };
        let Some(rename) = manager.rename.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => manager.rename = None,
            KeyCode::Enter => self.save_rename(),
            KeyCode::Tab => rename.color = rename.color.next(),
            KeyCode::Backspace => {
                rename.buffer.pop();
            }
            KeyCode::Char(ch) => rename.buffer.push(ch),
            _ => {}
        }
    }

    /// Enter on a tag starts renaming it; on the create entry it registers the query as a tag.
    fn confirm_manager(&mut self) {
        let Some(Overlay::Manager(manager)) = self.overlay.as_mut() else {
            return;
        };
        let rename = manager.selected().map(|chip| TagRename {
            tag_id: chip.tag_id.clone(),
            buffer: chip.name.clone(),
            color: chip.color,
        });
        if let Some(rename) = rename {
            manager.rename = Some(rename);
            return;
        }
        if !manager.can_create {
            self.set_toast("No matching tags");
            return;
        }

        let name = manager.query.trim().to_owned();
        let color = manager.color;
        if self.run_command(Command::CreateTag { name: name.clone(), color }).is_some() {
            if let Some(Overlay::Manager(manager)) = self.overlay.as_mut() {
                manager.query.clear();
                manager.cursor = 0;
            }
            self.refresh_manager();
            self.set_toast(format!("Created {name}"));
        }
    }

    fn save_rename(&mut self) {
        let Some(Overlay::Manager(manager)) = self.overlay.as_ref() else {
            return;
        };
        let Some(rename) = manager.rename.clone() else {
            return;
        };
        let name = rename.buffer.trim().to_owned();
        let command =
            Command::UpdateTag { tag_id: rename.tag_id, name: name.clone(), color: rename.color };
        // A rejected rename keeps the editor open with the error as a toast.
        if self.run_command(command).is_none() {
            return;
        }
        if let Some(Overlay::Manager(manager)) = self.overlay.as_mut() {
            manager.rename = None;
        }
        self.refresh_manager();
        self.set_toast(format!("Renamed to {name}"));
    }

    /// Tab on a tag recolors it in place; on the create entry it picks the new tag's color.
    fn recolor_managed_tag(&mut self) {
        let Some(Overlay::Manager(manager)) = self.overlay.as_mut() else {
            return;
        };
        let Some(chip) = manager.selected() else {
            manager.color = manager.color.next();
            return;
        };
        let command = Command::UpdateTag {
            tag_id: chip.tag_id.clone(),
            name: chip.name.clone(),
            color: chip.color.next(),
        };
        if self.run_command(command).is_some() {
            self.refresh_manager();
        }
    }

    fn delete_managed_tag(&mut self) {
        let chip = match self.overlay.as_ref() {
            Some(Overlay::Manager(manager)) => manager.selected().cloned(),
            _ => None,
        };
        let Some(chip) = chip else {
            self.set_toast("No tag selected");
            return;
        };
        let Some(applied) = self.run_command(Command::DeleteTag { tag_id: chip.tag_id }) else {
            return;
        };
        self.refresh_manager();
        let detached = match applied.outcome {
            Outcome::TagDeleted(Some(deletion)) => deletion.detached_from.len(),
            _ => 0,
        };
        self.set_toast(format!("Deleted {} from {detached} sessions", chip.name));
    }

    fn open_filter_picker(&mut self) {
        let mut picker = FilterPicker::new();
        picker.refresh(&self.workspace.blocking_lock());
        if picker.results.is_empty() {
            self.set_toast("No tags yet (m to manage)");
            return;
        }
        self.overlay = Some(Overlay::Filter(picker));
    }

    fn refresh_filter_picker(&mut self) {
        let workspace = self.workspace.blocking_lock();
        if let Some(Overlay::Filter(picker)) = self.overlay.as_mut() {
            picker.refresh(&workspace);
        }
    }

    fn handle_filter_key(&mut self, code: KeyCode) {
        let Some(Overlay::Filter(picker)) = self.overlay.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => self.overlay = None,
            KeyCode::Enter => self.toggle_picked_filter_tag(),
            KeyCode::Down => {
                if let Some(idx) = step_index(Some(picker.cursor), picker.results.len(), 1) {
                    picker.cursor = idx;
                }
            }
            KeyCode::Up => {
                if let Some(idx) = step_index(Some(picker.cursor), picker.results.len(), -1) {
                    picker.cursor = idx;
                }
            }
            KeyCode::Backspace => {
                picker.query.pop();
                picker.cursor = 0;
                self.refresh_filter_picker();
            }
            KeyCode::Char(ch) => {
                picker.query.push(ch);
                picker.cursor = 0;
                self.refresh_filter_picker();
            }
            _ => {}
        }
    }

    /// Flips the tag under the cursor and sends the whole selection, so the picker stays open
    /// for the next pick.
    fn toggle_picked_filter_tag(&mut self) {
        let Some(Overlay::Filter(picker)) = self.overlay.as_ref() else {
            return;
        };
        let Some(chip) = picker.results.get(picker.cursor).cloned() else {
            self.set_toast("No matching tags");
            return;
        };
        let tag_ids = picker.toggled(&chip.tag_id);
        let added = tag_ids.contains(&chip.tag_id);
        if self.run_command(Command::SetFilterTags { tag_ids }).is_some() {
            self.refresh_filter_picker();
            self.set_toast(if added {
                format!("Filter + {}", chip.name)
            } else {
                format!("Filter - {}", chip.name)
            });
        }
    }

    fn open_note_editor(&mut self, edit_selected: bool) {
        let Some(session_id) = self.selected_session_id.clone() else {
            self.set_toast("No session selected");
            return;
        };
        let editor = if edit_selected {
            let Some(note) = self.selected_note() else {
                self.set_toast("No note selected");
                return;
            };
            NoteEditor {
                session_id,
                note_id: Some(note.note_id.clone()),
                buffer: note.content.clone(),
            }
        } else {
            NoteEditor { session_id, note_id: None, buffer: String::new() }
        };
        self.overlay = Some(Overlay::Note(editor));
    }

    fn handle_note_key(&mut self, code: KeyCode) {
        let Some(Overlay::Note(editor)) = self.overlay.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => self.overlay = None,
            KeyCode::Enter => self.save_note(),
            KeyCode::Backspace => {
                editor.buffer.pop();
            }
            KeyCode::Char(ch) => editor.buffer.push(ch),
            _ => {}
        }
    }

    fn save_note(&mut self) {
        let Some(Overlay::Note(editor)) = self.overlay.take() else {
            return;
        };
        let content = editor.buffer.trim().to_owned();
        if content.is_empty() {
            self.set_toast("Note is empty");
            self.overlay = Some(Overlay::Note(editor));
            return;
        }

        let NoteEditor { session_id, note_id, .. } = editor;
        let (command, message) = match note_id {
            Some(note_id) => (Command::EditNote { session_id, note_id, content }, "Note saved"),
            None => (Command::AddNote { session_id, content }, "Note added"),
        };
        if self.run_command(command).is_some() {
            self.set_toast(message);
        }
    }

    fn delete_selected_note(&mut self) {
        if self.focus != Focus::Notes {
            self.set_toast("Tab to the notes pane to delete a note");
            return;
        }
        let target = self
            .selected_session_id
            .clone()
            .zip(self.selected_note().map(|note| note.note_id.clone()));
        let Some((session_id, note_id)) = target else {
            self.set_toast("No note selected");
            return;
        };
        if self.run_command(Command::DeleteNote { session_id, note_id }).is_some() {
            self.set_toast("Note deleted");
        }
    }
}

/// Moves a list cursor by `delta`, clamped to `0..len`. `None` when the list is empty.
fn step_index(current: Option<usize>, len: usize, delta: isize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let current = current.unwrap_or(0) as isize;
    Some((current + delta).clamp(0, len as isize - 1) as usize)
}

fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let area = frame.size();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(u16::from(app.show_top_tags)),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    if app.show_top_tags {
        frame.render_widget(Paragraph::new(top_tags_line(&app.snapshot)), layout[0]);
    }
    frame.render_widget(Paragraph::new(filter_line(&app.snapshot)), layout[1]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(layout[2]);
    draw_sessions(frame, app, panes[0]);
    draw_details(frame, app, panes[1]);

    let toast = app
        .toast
        .as_ref()
        .filter(|toast| toast.expires_at > Instant::now())
        .map(|toast| toast.message.clone());
    if toast.is_none() {
        app.toast = None;
    }
    frame.render_widget(Paragraph::new(footer_line(app, toast.as_deref())), layout[3]);

    match app.overlay.as_ref() {
        Some(Overlay::Picker(picker)) => draw_picker(frame, picker, area),
        Some(Overlay::Note(editor)) => draw_note_editor(frame, editor, area),
        Some(Overlay::Manager(manager)) => draw_manager(frame, manager, area),
        Some(Overlay::Filter(picker)) => draw_filter_picker(frame, picker, area),
        None => {}
    }
}

fn top_tags_line(snapshot: &Snapshot) -> Line<'static> {
    let mut spans = vec![Span::styled("Top tags ", Style::default().fg(FOOTER_LABEL_COLOR))];
    if snapshot.top_tags.is_empty() {
        spans.push(Span::styled("none", Style::default().fg(MUTED_COLOR)));
        return Line::from(spans);
    }
    for (idx, top) in snapshot.top_tags.iter().enumerate() {
        if idx < NUMBERED_TOP_TAGS {
            let key_style = Style::default().fg(FOOTER_KEY_COLOR);
            spans.push(Span::styled(format!("{} ", idx + 1), key_style));
        }
        spans.push(if top.selected {
            selected_chip(&top.chip.name, top.chip.color)
        } else {
            chip(&top.chip.name, top.chip.color)
        });
        spans.push(Span::styled(format!(" {}  ", top.sessions), Style::default().fg(MUTED_COLOR)));
    }
    Line::from(spans)
}

fn filter_line(snapshot: &Snapshot) -> Line<'static> {
    let mut spans = vec![Span::styled("Filter ", Style::default().fg(FOOTER_LABEL_COLOR))];
    if snapshot.filter.is_empty() {
        spans.push(Span::styled("all sessions", Style::default().fg(MUTED_COLOR)));
    } else {
        for chip_view in &snapshot.filter {
            spans.push(chip(&chip_view.name, chip_view.color));
            spans.push(Span::raw(" "));
        }
    }
    spans.push(Span::styled(
        format!("  Showing {} of {} sessions", snapshot.rows.len(), snapshot.total_sessions),
        Style::default().fg(MUTED_COLOR),
    ));
    Line::from(spans)
}

fn chips_line(chips: &[ChipView]) -> Line<'static> {
    let mut spans = Vec::with_capacity(chips.len() * 2);
    for (idx, chip_view) in chips.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(chip(&chip_view.name, chip_view.color));
    }
    Line::from(spans)
}

fn draw_sessions(frame: &mut Frame<'_>, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Sessions ({})", app.snapshot.rows.len()))
        .border_style(panel_border_style(app.focus == Focus::Sessions));

    if app.snapshot.rows.is_empty() {
        let empty = Paragraph::new("No sessions match the filter (c to clear)")
            .style(Style::default().fg(MUTED_COLOR))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(["", "User", "Time", "Length", "Country", "Tags", "Notes"])
        .style(Style::default().fg(FOOTER_LABEL_COLOR).add_modifier(Modifier::BOLD));
    let rows = app.snapshot.rows.iter().map(|row| {
        let warning = if row.has_warning {
            Span::styled("!", Style::default().fg(WARNING_COLOR).add_modifier(Modifier::BOLD))
        } else {
            Span::raw(" ")
        };
        Row::new([
            Cell::from(warning),
            Cell::from(row.user_email.clone()),
            Cell::from(row.time.clone()),
            Cell::from(row.session_length.clone()),
            Cell::from(row.country.clone()),
            Cell::from(chips_line(&row.tags)),
            Cell::from(row.notes.len().to_string()),
        ])
    });
    let widths = [
        Constraint::Length(1),
        Constraint::Min(18),
        Constraint::Length(18),
        Constraint::Length(7),
        Constraint::Length(13),
        Constraint::Min(20),
        Constraint::Length(5),
    ];
    let table =
        Table::new(rows, widths).header(header).block(block).highlight_style(selection_style());
    frame.render_stateful_widget(table, area, &mut app.sessions_state);
}

fn draw_details(frame: &mut Frame<'_>, app: &mut App, area: Rect) {
    let split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let Some(row) = app.selected_row() else {
        let block = Block::default().borders(Borders::ALL).title("Session");
        frame.render_widget(Paragraph::new("No session selected").block(block), area);
        return;
    };

    let tags = if row.tags.is_empty() {
        Line::from(Span::styled("No tags (a to add)", Style::default().fg(MUTED_COLOR)))
    } else {
        chips_line(&row.tags)
    };
    let tags_block =
        Block::default().borders(Borders::ALL).title(format!("Session {}", row.session_id));
    frame.render_widget(Paragraph::new(tags).block(tags_block), split[0]);

    let notes_block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Notes ({})", row.notes.len()))
        .border_style(panel_border_style(app.focus == Focus::Notes));
    if row.notes.is_empty() {
        let empty = Paragraph::new("No notes (n to add)")
            .style(Style::default().fg(MUTED_COLOR))
            .block(notes_block);
        frame.render_widget(empty, split[1]);
        return;
    }

    let items: Vec<ListItem<'static>> = row
        .notes
        .iter()
        .map(|note| {
            ListItem::new(Text::from(vec![
                Line::from(Span::styled(
                    format!("{} · {}", note.created_by, note.updated_at),
                    Style::default().fg(MUTED_COLOR),
                )),
                Line::from(note.content.clone()),
            ]))
        })
        .collect();
    let list = List::new(items).block(notes_block).highlight_style(selection_style());
    frame.render_stateful_widget(list, split[1], &mut app.notes_state);
}

fn draw_picker(frame: &mut Frame<'_>, picker: &TagPicker, area: Rect) {
    let popup = centered_rect(60, 50, area);
    frame.render_widget(Clear, popup);

    let title = match picker.kind {
        PickerKind::Attach => format!("Add tag to session {}", picker.session_id),
        PickerKind::Detach => format!("Remove tag from session {}", picker.session_id),
    };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(inner);

    let mut prompt = vec![Span::raw(format!("> {}_", picker.query))];
    if picker.kind == PickerKind::Attach {
        prompt.push(Span::styled("   new tag color ", Style::default().fg(MUTED_COLOR)));
        prompt.push(chip(picker.color.as_str(), picker.color));
        prompt.push(Span::styled(" (Tab)", Style::default().fg(MUTED_COLOR)));
    }
    frame.render_widget(Paragraph::new(Line::from(prompt)), split[0]);

    let mut items: Vec<ListItem<'static>> = picker
        .results
        .iter()
        .map(|chip_view| ListItem::new(Line::from(chip(&chip_view.name, chip_view.color))))
        .collect();
    if picker.can_create {
        items.push(ListItem::new(Line::from(vec![
            Span::raw("+ Create "),
            chip(picker.query.trim(), picker.color),
        ])));
    }
    if items.is_empty() {
        let empty = Paragraph::new("No matching tags").style(Style::default().fg(MUTED_COLOR));
        frame.render_widget(empty, split[1]);
        return;
    }

    let mut state = ListState::default();
    state.select(Some(picker.cursor));
    let list = List::new(items).highlight_symbol("> ").highlight_style(selection_style());
    frame.render_stateful_widget(list, split[1], &mut state);
}

fn draw_manager(frame: &mut Frame<'_>, manager: &TagManager, area: Rect) {
    let popup = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup);

    let block = Block::default().borders(Borders::ALL).title("Manage tags");
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(inner);

    let muted = Style::default().fg(MUTED_COLOR);
    let prompt = match manager.rename.as_ref() {
        Some(rename) => Line::from(vec![
            Span::styled("Rename ", Style::default().fg(FOOTER_LABEL_COLOR)),
            Span::raw(format!("{}_", rename.buffer)),
            Span::styled("   color ", muted),
            chip(rename.color.as_str(), rename.color),
            Span::styled(" (Tab)", muted),
        ]),
        None => Line::from(vec![
            Span::raw(format!("> {}_", manager.query)),
            Span::styled("   new tag color ", muted),
            chip(manager.color.as_str(), manager.color),
        ]),
    };
    frame.render_widget(Paragraph::new(prompt), split[0]);

    let mut items: Vec<ListItem<'static>> = manager
        .results
        .iter()
        .map(|entry| {
            ListItem::new(Line::from(vec![
                chip(&entry.chip.name, entry.chip.color),
                Span::styled(format!("  {} sessions", entry.sessions), muted),
            ]))
        })
        .collect();
    if manager.can_create {
        items.push(ListItem::new(Line::from(vec![
            Span::raw("+ Create "),
            chip(manager.query.trim(), manager.color),
        ])));
    }
    if items.is_empty() {
        let empty = if manager.query.trim().is_empty() {
            "No tags have been created yet"
        } else {
            "No tags found"
        };
        frame.render_widget(Paragraph::new(empty).style(muted), split[1]);
        return;
    }

    let mut state = ListState::default();
    state.select(Some(manager.cursor));
    let list = List::new(items).highlight_symbol("> ").highlight_style(selection_style());
    frame.render_stateful_widget(list, split[1], &mut state);
}

fn draw_filter_picker(frame: &mut Frame<'_>, picker: &FilterPicker, area: Rect) {
    let popup = centered_rect(50, 50, area);
    frame.render_widget(Clear, popup);

    let title = format!("Filter by tags ({} selected)", picker.selected.len());
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(inner);
    frame.render_widget(Paragraph::new(format!("> {}_", picker.query)), split[0]);

    if picker.results.is_empty() {
        let empty = Paragraph::new("No matching tags").style(Style::default().fg(MUTED_COLOR));
        frame.render_widget(empty, split[1]);
        return;
    }
    let items: Vec<ListItem<'static>> = picker
        .results
        .iter()
        .map(|chip_view| {
            let selected = picker.selected.contains(&chip_view.tag_id);
            ListItem::new(Line::from(vec![
                Span::raw(if selected { "[x] " } else { "[ ] " }),
                if selected {
                    selected_chip(&chip_view.name, chip_view.color)
                } else {
                    chip(&chip_view.name, chip_view.color)
                },
            ]))
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(picker.cursor));
    let list = List::new(items).highlight_symbol("> ").highlight_style(selection_style());
    frame.render_stateful_widget(list, split[1], &mut state);
}

fn draw_note_editor(frame: &mut Frame<'_>, editor: &NoteEditor, area: Rect) {
    let popup = centered_rect(60, 30, area);
    frame.render_widget(Clear, popup);

    let title = match editor.note_id.as_ref() {
        Some(note_id) => format!("Edit note {note_id}"),
        None => format!("New note on session {}", editor.session_id),
    };
    let text = Text::from(vec![
        Line::from(format!("{}_", editor.buffer)),
        Line::from(""),
        Line::from(Span::styled("Enter save  Esc cancel", Style::default().fg(MUTED_COLOR))),
    ]);
    let paragraph = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(paragraph, popup);
}

fn footer_line(app: &App, toast: Option<&str>) -> Line<'static> {
    let hints: &[(&str, &str)] = match (&app.overlay, app.focus) {
        (Some(Overlay::Picker(_)), _) => {
            &[("type", "search"), ("↑↓", "move"), ("Enter", "apply"), ("Esc", "close")]
        }
        (Some(Overlay::Note(_)), _) => &[("Enter", "save"), ("Esc", "cancel")],
        (Some(Overlay::Manager(manager)), _) if manager.rename.is_some() => {
            &[("Enter", "save"), ("Tab", "color"), ("Esc", "back")]
        }
        (Some(Overlay::Manager(_)), _) => &[
            ("type", "search"),
            ("↑↓", "move"),
            ("Enter", "rename/create"),
            ("Tab", "color"),
            ("Del", "delete"),
            ("Esc", "close"),
        ],
        (Some(Overlay::Filter(_)), _) => {
            &[("type", "search"), ("↑↓", "move"), ("Enter", "toggle"), ("Esc", "close")]
        }
        (None, Focus::Sessions) => &[
            ("q", "quit"),
            ("j/k", "move"),
            ("1-9", "filter"),
            ("c", "clear"),
            ("f", "filter tags"),
            ("t", "top tags"),
            ("m", "manage tags"),
            ("a", "tag"),
            ("x", "untag"),
            ("n", "note"),
            ("Tab", "notes"),
        ],
        (None, Focus::Notes) => &[
            ("q", "quit"),
            ("j/k", "move"),
            ("n", "new"),
            ("e", "edit"),
            ("d", "delete"),
            ("Tab", "sessions"),
        ],
    };

    let mut spans = Vec::with_capacity(hints.len() * 2 + 1);
    for (key, label) in hints {
        spans.push(Span::styled(format!("{key} "), Style::default().fg(FOOTER_KEY_COLOR)));
        spans.push(Span::styled(format!("{label}  "), Style::default().fg(FOOTER_LABEL_COLOR)));
    }
    if let Some(toast) = toast {
        spans.push(Span::styled(
            format!("| {toast}"),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(|err| {
            teardown_terminal();
            err
        })?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).map_err(|err| {
            teardown_terminal();
            err
        })?;
        terminal.clear().map_err(|err| {
            teardown_terminal();
            err
        })?;

        Ok(Self { terminal })
    }

    fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal.draw(draw_fn)?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        teardown_terminal();
    }
}

fn teardown_terminal() {
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, LeaveAlternateScreen);
}
