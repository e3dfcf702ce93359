// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Reeltag-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Reeltag and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::{DateTime, Utc};

use crate::model::{IdSequence, Tag, TagColor, TagId};

use super::error::{EngineError, EntityKind};

/// Canonical, ordered set of tags.
///
/// Registry order is creation order (seeded tags first) and doubles as the ranking tie-breaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRegistry {
    tags: Vec<Tag>,
    seq: IdSequence,
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::from_tags(Vec::new())
    }
}

impl TagRegistry {
    /// Callers guarantee unique ids (see `store::Seed::validate`).
    pub(crate) fn from_tags(tags: Vec<Tag>) -> Self {
        Self { tags, seq: IdSequence::new("tag-") }
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn get(&self, tag_id: &TagId) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.tag_id() == tag_id)
    }

    pub fn contains(&self, tag_id: &TagId) -> bool {
        self.get(tag_id).is_some()
    }

    pub fn create(
        &mut self,
        name: &str,
        color: TagColor,
        created_by: &str,
        now: DateTime<Utc>,
    ) -> Result<Tag, EngineError> {
        let name = normalized_name(name)?;
        let tags = &self.tags;
        let tag_id: TagId = self
            .seq
            .allocate(|candidate| tags.iter().any(|tag| tag.tag_id().as_str() == candidate));
        let tag = Tag::new(tag_id, name, color, created_by, now);
        self.tags.push(tag.clone());
        Ok(tag)
    }

    pub fn update(
        &mut self,
        tag_id: &TagId,
        name: &str,
        color: TagColor,
    ) -> Result<Tag, EngineError> {
        let Some(existing) = self.tags.iter_mut().find(|tag| tag.tag_id() == tag_id) else {
            return Err(EngineError::not_found(EntityKind::Tag, tag_id));
        };
        let name = normalized_name(name)?;
        existing.relabel(name, color);
        Ok(existing.clone())
    }

    /// Removes the tag; `None` when it was not registered.
    pub fn remove(&mut self, tag_id: &TagId) -> Option<Tag> {
        let index = self.tags.iter().position(|tag| tag.tag_id() == tag_id)?;
        Some(self.tags.remove(index))
    }
}

fn normalized_name(name: &str) -> Result<&str, EngineError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput {
            field: "name",
            reason: "tag name must not be empty",
        });
    }
    Ok(trimmed)
}
