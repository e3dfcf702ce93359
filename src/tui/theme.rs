// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Reeltag-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Reeltag and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;

use crate::model::TagColor;

pub(crate) const FOCUS_COLOR: Color = Color::LightGreen;
pub(crate) const MUTED_COLOR: Color = Color::DarkGray;
pub(crate) const FOOTER_LABEL_COLOR: Color = Color::Gray;
pub(crate) const FOOTER_KEY_COLOR: Color = Color::Cyan;
pub(crate) const WARNING_COLOR: Color = Color::LightRed;

/// Terminal color for a palette entry. Indigo has no ANSI slot and borrows light blue.
pub(crate) fn tag_color(color: TagColor) -> Color {
    match color {
        TagColor::Gray => Color::Gray,
        TagColor::Red => Color::Red,
        TagColor::Yellow => Color::Yellow,
        TagColor::Green => Color::Green,
        TagColor::Blue => Color::Blue,
        TagColor::Indigo => Color::LightBlue,
        TagColor::Purple => Color::Magenta,
        TagColor::Pink => Color::LightMagenta,
    }
}

pub(crate) fn chip_style(color: TagColor) -> Style {
    Style::default().fg(Color::Black).bg(tag_color(color))
}

pub(crate) fn chip(name: &str, color: TagColor) -> Span<'static> {
    Span::styled(format!(" {name} "), chip_style(color))
}

pub(crate) fn selected_chip(name: &str, color: TagColor) -> Span<'static> {
    Span::styled(
        format!("[{name}]"),
        Style::default().fg(tag_color(color)).add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    )
}

pub(crate) fn panel_border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(FOCUS_COLOR)
    } else {
        Style::default()
    }
}

pub(crate) fn selection_style() -> Style {
    Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{chip, tag_color};
    use crate::model::TagColor;
    use ratatui::style::Color;

    #[test]
    fn every_palette_entry_has_a_distinct_terminal_color() {
        let colors: HashSet<Color> = TagColor::ALL.into_iter().map(tag_color).collect();
        assert_eq!(colors.len(), TagColor::ALL.len());
    }

    #[test]
    fn chips_pad_the_name() {
        assert_eq!(chip("Bug", TagColor::Red).content, " Bug ");
    }
}
