// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Reeltag-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Reeltag and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Built-in demo data set (`--demo`, tests, benches).

use chrono::{DateTime, TimeZone, Utc};

use super::ids::{NoteId, SessionId, TagId};
use super::note::Note;
use super::replay::SessionReplay;
use super::tag::{Tag, TagColor};

fn tid(value: &str) -> TagId {
    TagId::new(value).expect("tag id")
}

fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).single().expect("valid date")
}

fn at(hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 28, hour, min, sec).single().expect("valid time")
}

pub(crate) fn demo_tags() -> Vec<Tag> {
    const TAGS: [(&str, &str, TagColor); 10] = [
        ("1", "Bug", TagColor::Red),
        ("2", "Feature Request", TagColor::Blue),
        ("3", "Customer Issue", TagColor::Yellow),
        ("4", "Onboarding", TagColor::Green),
        ("5", "Checkout Flow", TagColor::Purple),
        ("6", "High Priority", TagColor::Red),
        ("7", "Follow Up", TagColor::Indigo),
        ("8", "UI Confusion", TagColor::Pink),
        ("9", "Mobile", TagColor::Gray),
        ("10", "Desktop", TagColor::Gray),
    ];

    TAGS.iter()
        .zip(10u32..)
        .map(|((id, name, color), created_day)| {
            Tag::new(tid(id), *name, *color, "admin", day(2025, 4, created_day))
        })
        .collect()
}

fn demo_note(id: &str, content: &str, created_by: &str, created: u32, updated: u32) -> Note {
    Note::new(NoteId::new(id).expect("note id"), content, created_by, day(2025, 4, created))
        .with_updated_at(day(2025, 4, updated))
}

pub(crate) fn demo_sessions() -> Vec<SessionReplay> {
    let session = |id: &str, user: &str, email: &str, date: DateTime<Utc>| {
        SessionReplay::new(SessionId::new(id).expect("session id"), user, email, date)
            .with_country("United States")
    };

    vec![
        session("1", "user1", "tyler@skillit.com", at(8, 37, 49))
            .with_time("Today, 8:37:49 AM")
            .with_session_length("9m 12s")
            .with_tag_ids([tid("4"), tid("10")])
            .with_notes([demo_note(
                "3",
                "Great example of successful onboarding flow. User completed all steps in record time.",
                "product",
                27,
                27,
            )]),
        session("2", "user2", "hannah.parker@calm.com", at(8, 19, 11))
            .with_time("Today, 8:19:11 AM")
            .with_session_length("3m 12s")
            .with_tag_ids([tid("5")]),
        session("3", "user3", "jeanmarie_white@us.ibm.com", at(8, 10, 1))
            .with_time("Today, 8:10:01 AM")
            .with_session_length("17m 3s")
            .with_tag_ids([tid("1"), tid("6")])
            .with_notes([demo_note(
                "1",
                "User encountered an error during checkout process. Needs investigation.",
                "admin",
                25,
                25,
            )])
            .with_warning(true),
        session("4", "user4", "suprabathc@remitly.com", at(8, 6, 11))
            .with_time("Today, 8:06:11 AM")
            .with_session_length("1m 4s"),
        session("5", "user5", "scott.newsome@imail.org", at(7, 25, 53))
            .with_time("Today, 7:25:53 AM")
            .with_session_length("1h 17m")
            .with_tag_ids([tid("2"), tid("8")])
            .with_notes([demo_note(
                "2",
                "Customer was confused by the new feature implementation. Consider updating documentation.",
                "support",
                26,
                27,
            )]),
        session("6", "user6", "greeshma.puchakayala@zaxbys.com", at(6, 56, 5))
            .with_time("Today, 6:56:05 AM")
            .with_session_length("59m 6s")
            .with_tag_ids([tid("3"), tid("7")]),
    ]
}

/// Three tags and three sessions shaped for filter and ranking checks:
/// `s1 {a, b}`, `s2 {a}`, `s3 {b}`, with `c` unused.
#[cfg(test)]
pub(crate) fn abc_fixture() -> (Vec<Tag>, Vec<SessionReplay>) {
    let tags = ["a", "b", "c"]
        .into_iter()
        .map(|id| Tag::new(tid(id), id.to_uppercase(), TagColor::Gray, "admin", day(2025, 1, 1)))
        .collect();
    let session = |id: &str, tag_ids: &[&str]| {
        SessionReplay::new(SessionId::new(id).expect("session id"), id, "", day(2025, 1, 2))
            .with_tag_ids(tag_ids.iter().map(|id| tid(id)))
    };
    let sessions = vec![session("s1", &["a", "b"]), session("s2", &["a"]), session("s3", &["b"])];
    (tags, sessions)
}
