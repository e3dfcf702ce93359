// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Reeltag-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Reeltag and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Shared UI state for cross-component coordination.
//!
//! The TUI publishes what the operator is looking at; MCP clients read it through `view.read` so
//! an agent can act on "the session the human has open".

use crate::engine::DEFAULT_TOP_TAGS;
use crate::model::SessionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    rev: u64,
    selected_session_id: Option<SessionId>,
    show_top_tags: bool,
    top_tags: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self { rev: 0, selected_session_id: None, show_top_tags: false, top_tags: DEFAULT_TOP_TAGS }
    }
}

impl UiState {
    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn selected_session_id(&self) -> Option<&SessionId> {
        self.selected_session_id.as_ref()
    }

    pub fn show_top_tags(&self) -> bool {
        self.show_top_tags
    }

    pub fn top_tags(&self) -> usize {
        self.top_tags
    }

    pub fn set_selected_session(&mut self, session_id: Option<SessionId>) {
        if self.selected_session_id == session_id {
            return;
        }
        self.selected_session_id = session_id;
        self.rev = self.rev.wrapping_add(1);
    }

    pub fn set_top_tags_strip(&mut self, show: bool, top_tags: usize) {
        if self.show_top_tags == show && self.top_tags == top_tags {
            return;
        }
        self.show_top_tags = show;
        self.top_tags = top_tags;
        self.rev = self.rev.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::UiState;
    use crate::model::SessionId;

    #[test]
    fn rev_moves_only_on_change() {
        let mut state = UiState::default();
        assert!(!state.show_top_tags());
        let s1 = SessionId::new("1").expect("session id");

        state.set_selected_session(Some(s1.clone()));
        assert_eq!(state.rev(), 1);
        state.set_selected_session(Some(s1));
        assert_eq!(state.rev(), 1);

        state.set_top_tags_strip(false, 2);
        assert_eq!(state.rev(), 1);
        state.set_top_tags_strip(true, 2);
        assert_eq!(state.rev(), 2);
        assert!(state.show_top_tags());
    }
}
