// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Reeltag-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Reeltag and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashMap;

use crate::model::{SessionReplay, Tag};

/// Number of top tags the session browser shows by default.
pub const DEFAULT_TOP_TAGS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagUsage<'a> {
    pub tag: &'a Tag,
    pub sessions: usize,
}

/// Every tag in `all_tags` with its session count, most used first.
///
/// Ties keep `all_tags` order (the sort is stable), so repeated calls over unchanged input rank
/// identically. Unused tags are kept with a count of zero.
pub fn ranked_usage<'a>(all_tags: &'a [Tag], sessions: &[SessionReplay]) -> Vec<TagUsage<'a>> {
    let mut counts: HashMap<&str, usize> = HashMap::with_capacity(all_tags.len());
    for session in sessions {
        for tag_id in session.tag_ids() {
            *counts.entry(tag_id.as_str()).or_default() += 1;
        }
    }

    let mut ranked = all_tags
        .iter()
        .map(|tag| TagUsage {
            tag,
            sessions: counts.get(tag.tag_id().as_str()).copied().unwrap_or(0),
        })
        .collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.sessions.cmp(&a.sessions));
    ranked
}

/// The first `n` tags of [`ranked_usage`], zero-count tags included.
pub fn top_n<'a>(n: usize, all_tags: &'a [Tag], sessions: &[SessionReplay]) -> Vec<&'a Tag> {
    if n == 0 {
        return Vec::new();
    }
    ranked_usage(all_tags, sessions).into_iter().take(n).map(|usage| usage.tag).collect()
}
