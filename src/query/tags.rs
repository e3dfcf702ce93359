// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Reeltag-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Reeltag and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::engine::ranker::{self, TagUsage};
use crate::model::{SessionReplay, Tag, TagId};

/// Tags matching `query` for the tag picker, best first.
///
/// Tags in `exclude` (already attached or already selected) never appear. Case-insensitive
/// substring hits come first; if there are none, fuzzy subsequence matches are offered instead so
/// a typo still finds something. An empty query lists every remaining tag in registry order.
pub fn search_tags<'a>(tags: &'a [Tag], query: &str, exclude: &[TagId]) -> Vec<&'a Tag> {
    let candidates = tags
        .iter()
        .enumerate()
        .filter(|(_, tag)| !exclude.contains(tag.tag_id()))
        .collect::<Vec<_>>();

    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return candidates.into_iter().map(|(_, tag)| tag).collect();
    }

    let mut hits = candidates
        .iter()
        .filter_map(|(idx, tag)| {
            let haystack = tag.name().to_lowercase();
            substring_rank(&needle, &haystack).map(|rank| (rank, haystack.chars().count(), *idx))
        })
        .collect::<Vec<_>>();
    if !hits.is_empty() {
        hits.sort();
        return hits.into_iter().map(|(_, _, idx)| &tags[idx]).collect();
    }

    let mut fuzzy = candidates
        .iter()
        .filter_map(|(idx, tag)| {
            fuzzy_score(&needle, &tag.name().to_lowercase()).map(|score| (score, *idx))
        })
        .collect::<Vec<_>>();
    fuzzy.sort_by(|(score_a, idx_a), (score_b, idx_b)| {
        score_b.cmp(score_a).then_with(|| idx_a.cmp(idx_b))
    });
    fuzzy.into_iter().map(|(_, idx)| &tags[idx]).collect()
}

/// Whether `query` names an existing tag exactly (case-insensitive, trimmed).
///
/// The picker uses this to decide whether to offer "create".
pub fn has_exact_name(tags: &[Tag], query: &str) -> bool {
    let needle = query.trim();
    !needle.is_empty() && tags.iter().any(|tag| tag.name().eq_ignore_ascii_case(needle))
}

/// Registry tags not yet attached to `session`, in registry order.
pub fn available_tags<'a>(tags: &'a [Tag], session: &SessionReplay) -> Vec<&'a Tag> {
    tags.iter().filter(|tag| !session.has_tag(tag.tag_id())).collect()
}

/// Per-tag session counts in registry order.
pub fn tag_usage<'a>(tags: &'a [Tag], sessions: &[SessionReplay]) -> Vec<TagUsage<'a>> {
    let mut usage = ranker::ranked_usage(tags, sessions);
    usage.sort_by_key(|entry| {
        tags.iter().position(|tag| tag.tag_id() == entry.tag.tag_id()).unwrap_or(usize::MAX)
    });
    usage
}

/// 0 = prefix, 1 = word start, 2 = mid-word.
fn substring_rank(needle: &str, haystack: &str) -> Option<u8> {
    let first = haystack.find(needle)?;
    if first == 0 {
        return Some(0);
    }
    let at_boundary = haystack.match_indices(needle).any(|(idx, _)| {
        haystack[..idx].chars().last().is_some_and(is_boundary_char)
    });
    Some(if at_boundary { 1 } else { 2 })
}

fn fuzzy_score(needle: &str, haystack: &str) -> Option<i64> {
    let subseq = subsequence_stats(needle, haystack)?;
    let ratio = rapidfuzz::fuzz::ratio(needle.chars(), haystack.chars());

    let mut score = (ratio * 1000.0).round() as i64;
    score -= subseq.span as i64;
    score -= (subseq.first as i64) / 4;
    score += (subseq.consecutive as i64) * 40;
    if subseq.start_boundary {
        score += 150;
    }
    Some(score)
}

struct SubsequenceStats {
    first: usize,
    span: usize,
    consecutive: usize,
    start_boundary: bool,
}

fn subsequence_stats(needle: &str, haystack: &str) -> Option<SubsequenceStats> {
    let mut needle_iter = needle.chars().peekable();
    let mut first: Option<usize> = None;
    let mut last = 0usize;
    let mut prev_match: Option<usize> = None;
    let mut consecutive = 0usize;
    let mut start_boundary = false;
    let mut prev_hay: Option<char> = None;

    for (idx, ch) in haystack.chars().enumerate() {
        let Some(&want) = needle_iter.peek() else {
            break;
        };
        if ch == want {
            needle_iter.next();
            if first.is_none() {
                first = Some(idx);
                start_boundary = prev_hay.map_or(true, is_boundary_char);
            }
            if prev_match.is_some_and(|prev| idx == prev + 1) {
                consecutive += 1;
            }
            prev_match = Some(idx);
            last = idx;
        }
        prev_hay = Some(ch);
    }

    if needle_iter.peek().is_some() {
        return None;
    }
    let first = first?;
    Some(SubsequenceStats {
        first,
        span: last.saturating_sub(first).saturating_add(1),
        consecutive,
        start_boundary,
    })
}

fn is_boundary_char(ch: char) -> bool {
    matches!(ch, ' ' | '-' | '_' | '/' | ':')
}
