// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Reeltag-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Reeltag and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{SessionReplay, TagId};

/// The active tag filter: a conjunction over selected tag ids.
///
/// Selection order is kept so the UI can show chips in the order they were picked; it has no
/// effect on which sessions match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterEngine {
    selected: Vec<TagId>,
}

impl FilterEngine {
    pub fn selected(&self) -> &[TagId] {
        &self.selected
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn is_selected(&self, tag_id: &TagId) -> bool {
        self.selected.contains(tag_id)
    }

    /// Flips membership of `tag_id`; returns whether it is selected afterwards.
    pub fn toggle(&mut self, tag_id: &TagId) -> bool {
        if self.remove(tag_id) {
            return false;
        }
        self.selected.push(tag_id.clone());
        true
    }

    /// Replaces the selection. Repeated ids collapse onto their first occurrence.
    pub fn set_all(&mut self, tag_ids: impl IntoIterator<Item = TagId>) {
        self.selected.clear();
        for tag_id in tag_ids {
            if !self.selected.contains(&tag_id) {
                self.selected.push(tag_id);
            }
        }
    }

    /// Returns whether anything was selected.
    pub fn clear(&mut self) -> bool {
        let had_selection = !self.selected.is_empty();
        self.selected.clear();
        had_selection
    }

    /// Returns whether `tag_id` was selected.
    pub fn remove(&mut self, tag_id: &TagId) -> bool {
        let before = self.selected.len();
        self.selected.retain(|selected| selected != tag_id);
        self.selected.len() != before
    }

    pub fn matches(&self, session: &SessionReplay) -> bool {
        self.selected.iter().all(|tag_id| session.has_tag(tag_id))
    }

    /// Sessions carrying every selected tag, in input order. No selection means no narrowing.
    pub fn visible_sessions<'a>(&self, sessions: &'a [SessionReplay]) -> Vec<&'a SessionReplay> {
        sessions.iter().filter(|session| self.matches(session)).collect()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::FilterEngine;
    use crate::model::{fixtures, TagId};

    fn tid(value: &str) -> TagId {
        TagId::new(value).expect("tag id")
    }

    #[rstest]
    #[case::none(&[], &["s1", "s2", "s3"])]
    #[case::a(&["a"], &["s1", "s2"])]
    #[case::b(&["b"], &["s1", "s3"])]
    #[case::a_and_b(&["a", "b"], &["s1"])]
    #[case::b_and_a(&["b", "a"], &["s1"])]
    #[case::unused(&["c"], &[])]
    fn visible_sessions_are_the_and_of_selected_tags(
        #[case] selected: &[&str],
        #[case] expected: &[&str],
    ) {
        let (_, sessions) = fixtures::abc_fixture();
        let mut filter = FilterEngine::default();
        filter.set_all(selected.iter().map(|id| tid(id)));

        let visible = filter
            .visible_sessions(&sessions)
            .into_iter()
            .map(|session| session.session_id().as_str())
            .collect::<Vec<_>>();
        assert_eq!(visible, expected);
    }

    #[test]
    fn double_toggle_restores_selection() {
        let mut filter = FilterEngine::default();
        filter.toggle(&tid("a"));
        let before = filter.clone();

        assert!(filter.toggle(&tid("b")));
        assert!(!filter.toggle(&tid("b")));
        assert_eq!(filter, before);
    }

    #[test]
    fn set_all_collapses_duplicates() {
        let mut filter = FilterEngine::default();
        filter.set_all([tid("b"), tid("a"), tid("b")]);
        assert_eq!(filter.selected(), &[tid("b"), tid("a")]);
    }

    #[test]
    fn clear_reports_whether_anything_changed() {
        let mut filter = FilterEngine::default();
        assert!(!filter.clear());
        filter.toggle(&tid("a"));
        assert!(filter.clear());
        assert!(filter.is_empty());
    }
}
