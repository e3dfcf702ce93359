// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Reeltag-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Reeltag and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::TagId;

/// The fixed tag palette.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TagColor {
    Gray,
    Red,
    Yellow,
    Green,
    #[default]
    Blue,
    Indigo,
    Purple,
    Pink,
}

impl TagColor {
    /// Palette order as offered by the tag picker.
    pub const ALL: [TagColor; 8] = [
        Self::Gray,
        Self::Red,
        Self::Yellow,
        Self::Green,
        Self::Blue,
        Self::Indigo,
        Self::Purple,
        Self::Pink,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gray => "gray",
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Indigo => "indigo",
            Self::Purple => "purple",
            Self::Pink => "pink",
        }
    }

    /// Next color in palette order, wrapping around. Used by the picker's color cycling.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|color| *color == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for TagColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tag color '{0}' (expected one of gray, red, yellow, green, blue, indigo, purple, pink)")]
pub struct ParseTagColorError(String);

impl FromStr for TagColor {
    type Err = ParseTagColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|color| color.as_str() == needle)
            .ok_or_else(|| ParseTagColorError(s.to_owned()))
    }
}

/// A reusable, colored label. Identity is `tag_id`; names may repeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    #[serde(rename = "id")]
    tag_id: TagId,
    name: String,
    color: TagColor,
    created_by: String,
    created_at: DateTime<Utc>,
}

impl Tag {
    pub fn new(
        tag_id: TagId,
        name: impl Into<String>,
        color: TagColor,
        created_by: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            tag_id,
            name: name.into(),
            color,
            created_by: created_by.into(),
            created_at,
        }
    }

    pub fn tag_id(&self) -> &TagId {
        &self.tag_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> TagColor {
        self.color
    }

    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub(crate) fn relabel(&mut self, name: impl Into<String>, color: TagColor) {
        self.name = name.into();
        self.color = color;
    }
}

#[cfg(test)]
mod tests {
    use super::TagColor;

    #[test]
    fn color_parses_case_insensitively() {
        assert_eq!("Indigo".parse::<TagColor>(), Ok(TagColor::Indigo));
        assert!("teal".parse::<TagColor>().is_err());
    }

    #[test]
    fn color_cycle_wraps() {
        assert_eq!(TagColor::Gray.next(), TagColor::Red);
        assert_eq!(TagColor::Pink.next(), TagColor::Gray);
    }
}
