/*
 * SPDX-FileCopyrightText: 2026 Quotesync Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::classify::{is_quote, is_quote_source};
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::remote::HistoryApi;
use futures_util::future::join_all;
use quotesync_protocol::{Channel, ChannelId, Message, MessageId};
use tracing::{debug, warn};

/// Lazy page puller over a channel's history, newest first.
///
/// The cursor is the oldest message id seen so far. Pulling stops when the
/// page cap is reached or a page comes back empty; a cursor that fails to
/// advance is an invariant violation (the remote is misbehaving) and fails
/// this one backfill rather than looping forever.
pub struct HistoryPages<'a> {
    history: &'a dyn HistoryApi,
    channel: ChannelId,
    before: Option<MessageId>,
    pages_fetched: usize,
    max_pages: usize,
    page_size: usize,
    done: bool,
}

impl<'a> HistoryPages<'a> {
    pub fn new(history: &'a dyn HistoryApi, channel: ChannelId, cfg: &SyncConfig) -> Self {
        Self {
            history,
            channel,
            before: None,
            pages_fetched: 0,
            max_pages: cfg.max_fetch_pages,
            page_size: cfg.page_size,
            done: false,
        }
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// The next most-recent unseen page, or None once drained or capped.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Message>>, SyncError> {
        if self.done || self.pages_fetched >= self.max_pages {
            return Ok(None);
        }
        let page = self
            .history
            .fetch_page(&self.channel, self.before.as_ref(), self.page_size)
            .await?;
        self.pages_fetched += 1;

        let Some(oldest) = page.last().map(|m| m.id.clone()) else {
            self.done = true;
            return Ok(None);
        };
        if self.before.as_ref() == Some(&oldest) {
            self.done = true;
            return Err(SyncError::CursorStalled {
                channel: self.channel.clone(),
            });
        }
        self.before = Some(oldest);
        Ok(Some(page))
    }
}

/// Every message in the channel's reachable history satisfying the quote
/// predicate. A failed page fetch propagates; the result is never silently
/// truncated.
pub async fn fetch_channel_quotes(
    history: &dyn HistoryApi,
    channel: &Channel,
    cfg: &SyncConfig,
) -> Result<Vec<Message>, SyncError> {
    let mut pages = HistoryPages::new(history, channel.id.clone(), cfg);
    let mut quotes = Vec::new();
    while let Some(page) = pages.next_page().await? {
        quotes.extend(page.into_iter().filter(is_quote));
    }
    debug!(
        "backfilled {} quotes from channel {} in {} pages",
        quotes.len(),
        channel.id,
        pages.pages_fetched()
    );
    Ok(quotes)
}

/// Outcome of a community-wide backfill. `NoSources` is distinct from an
/// empty result so callers can skip registration entirely.
#[derive(Debug)]
pub enum CommunityBackfill {
    NoSources,
    Quotes {
        sources: Vec<Channel>,
        quotes: Vec<Message>,
    },
}

/// Discover a community's quote-source channels and backfill them
/// concurrently. One channel failing does not abort its siblings; its
/// error is logged and its quotes are picked up on the next full sync.
pub async fn fetch_community_quotes(
    history: &dyn HistoryApi,
    channels: &[Channel],
    cfg: &SyncConfig,
) -> CommunityBackfill {
    let sources: Vec<Channel> = channels
        .iter()
        .filter(|c| is_quote_source(c))
        .cloned()
        .collect();
    if sources.is_empty() {
        return CommunityBackfill::NoSources;
    }

    let fetches = sources
        .iter()
        .map(|channel| fetch_channel_quotes(history, channel, cfg));
    let results = join_all(fetches).await;

    let mut quotes = Vec::new();
    for (channel, result) in sources.iter().zip(results) {
        match result {
            Ok(batch) => quotes.extend(batch),
            Err(e) => warn!("backfill failed for channel {}: {e:#}", channel.id),
        }
    }
    CommunityBackfill::Quotes { sources, quotes }
}
