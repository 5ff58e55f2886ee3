//! Plain-text note summaries
//!
//! Used for page descriptions and OpenGraph tags of note pages.

use crate::store::PackedNote;

pub fn summarize(note: &PackedNote) -> String {
    summarize_at(note, true)
}

fn summarize_at(note: &PackedNote, nested: bool) -> String {
    let mut summary = note
        .cw
        .as_deref()
        .or(note.text.as_deref())
        .unwrap_or_default()
        .to_string();

    if !note.file_ids.is_empty() {
        summary.push_str(&format!(" ({} files)", note.file_ids.len()));
    }

    if note.poll.is_some() {
        summary.push_str(" (poll)");
    }

    // Only one level of quoted context
    if nested {
        if let Some(reply) = &note.reply {
            summary.push_str(&format!("\n\nRE: {}", summarize_at(reply, false)));
        }
        if let Some(renote) = &note.renote {
            summary.push_str(&format!(" RN: {}", summarize_at(renote, false)));
        }
    }

    summary.trim().to_string()
}
