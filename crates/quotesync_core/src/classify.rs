/*
 * SPDX-FileCopyrightText: 2026 Quotesync Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use quotesync_protocol::{Channel, ChannelKind, Message};

/// Whether a channel is scanned and listened to for quotes.
/// Name-based: any text channel whose name mentions "quote".
pub fn is_quote_source(channel: &Channel) -> bool {
    channel.kind == ChannelKind::Text && channel.name.to_ascii_lowercase().contains("quote")
}

/// Structural quote test: a quotation marker somewhere in the content,
/// with an attribution tail after the closing marker. Runs on the hot
/// live-event path and per historical message, so it stays allocation-free.
pub fn is_quote(message: &Message) -> bool {
    let content = message.content.trim();
    let mut marks = content.match_indices(is_quote_mark);
    let Some((first, _)) = marks.next() else {
        return false;
    };
    let last = marks.last().map(|(i, _)| i).unwrap_or(first);
    let after_mark = content[last..]
        .chars()
        .next()
        .map(|c| last + c.len_utf8())
        .unwrap_or(last);
    has_attribution(&content[after_mark..])
}

fn is_quote_mark(c: char) -> bool {
    matches!(c, '"' | '\u{201C}' | '\u{201D}' | '\u{201E}')
}

fn has_attribution(tail: &str) -> bool {
    let tail = tail.trim_start();
    match tail.strip_prefix(['-', '~']) {
        Some(author) => !author.trim().is_empty(),
        None => false,
    }
}
