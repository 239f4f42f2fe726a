/*
 * SPDX-FileCopyrightText: 2026 Quotesync Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::backfill::{fetch_channel_quotes, fetch_community_quotes, CommunityBackfill};
use crate::cache::QuoteCache;
use crate::classify::{is_quote, is_quote_source};
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::remote::{Directory, HistoryApi};
use crate::topology::{SourceTracker, SubscriptionHandle};
use anyhow::{Context, Result};
use futures_util::future::join_all;
use quotesync_protocol::{CommunityId, GatewayEvent, Message};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Composes the cache, the topology tracker and the backfill fetcher.
///
/// `initialize` runs the one-time startup sync; after that the engine is
/// driven purely by gateway events through `handle_event`. Handlers for
/// different communities may interleave; per-partition mutations are
/// serialized inside [`QuoteCache`] and the live path is generation-checked
/// against the tracker.
pub struct SyncEngine {
    cfg: SyncConfig,
    cache: Arc<QuoteCache>,
    tracker: Arc<SourceTracker>,
    history: Arc<dyn HistoryApi>,
    directory: Arc<dyn Directory>,
    ready: AtomicBool,
}

impl SyncEngine {
    pub fn new(cfg: SyncConfig, history: Arc<dyn HistoryApi>, directory: Arc<dyn Directory>) -> Self {
        Self {
            cfg,
            cache: Arc::new(QuoteCache::new()),
            tracker: Arc::new(SourceTracker::new()),
            history,
            directory,
            ready: AtomicBool::new(false),
        }
    }

    pub fn cache(&self) -> &Arc<QuoteCache> {
        &self.cache
    }

    pub fn tracker(&self) -> &Arc<SourceTracker> {
        &self.tracker
    }

    /// Whether the startup sync has completed. Events delivered earlier
    /// are still applied; this only gates the startup report.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub fn total_quotes(&self) -> usize {
        self.cache.total_len()
    }

    pub fn community_quotes(&self, community: &CommunityId) -> usize {
        self.cache.community_len(community)
    }

    /// One-time startup sync: enumerate communities, backfill them
    /// concurrently, register every discovered source channel, report the
    /// total. A community failing its sync does not abort the others.
    pub async fn initialize(&self) -> Result<()> {
        let communities = self
            .directory
            .list_communities()
            .await
            .context("enumerating communities")?;

        let results = join_all(communities.iter().map(|community| async move {
            (community, self.initialize_community(community).await)
        }))
        .await;
        for (community, result) in results {
            if let Err(e) = result {
                warn!("initial sync failed for community {community}: {e:#}");
            }
        }

        self.ready.store(true, Ordering::SeqCst);
        info!(
            "quote sync initialized: {} quotes across {} communities ({} source channels)",
            self.cache.total_len(),
            self.cache.community_count(),
            self.tracker.len()
        );
        Ok(())
    }

    /// Full per-community sync, also run when a community is joined at
    /// runtime: backfill, populate the partition, then register sources.
    pub async fn initialize_community(&self, community: &CommunityId) -> Result<(), SyncError> {
        let channels = self.directory.list_channels(community).await?;
        match fetch_community_quotes(self.history.as_ref(), &channels, &self.cfg).await {
            CommunityBackfill::NoSources => {
                debug!("community {community} has no quote source channels");
            }
            CommunityBackfill::Quotes { sources, quotes } => {
                let count = quotes.len();
                self.cache.bulk_put(community, quotes);
                for channel in &sources {
                    self.tracker.register(channel);
                }
                info!(
                    "community {community}: cached {count} quotes from {} source channels",
                    sources.len()
                );
            }
        }
        Ok(())
    }

    /// Gateway event entry point. Handler failures are logged and never
    /// take down the event loop.
    pub async fn handle_event(&self, event: GatewayEvent) {
        if let Err(e) = self.dispatch(event).await {
            warn!("gateway event handler error: {e:#}");
        }
    }

    async fn dispatch(&self, event: GatewayEvent) -> Result<(), SyncError> {
        match event {
            GatewayEvent::CommunityJoined { community } => {
                info!("joined community {community}");
                self.initialize_community(&community).await?;
            }
            GatewayEvent::CommunityLeft { community } => {
                info!("left community {community}");
                let dropped = self.tracker.unregister_community(&community);
                debug!("cancelled {} quote subscriptions", dropped.len());
                self.cache.remove_community(&community);
            }
            GatewayEvent::ChannelCreated { channel } => {
                if is_quote_source(&channel) {
                    info!("new quote source channel {} in {}", channel.id, channel.community);
                    // a just-created channel has no history to backfill
                    self.cache.ensure_partition(&channel.community);
                    self.tracker.register(&channel);
                }
            }
            GatewayEvent::ChannelUpdated { old, new } => {
                let was_source = is_quote_source(&old);
                let is_source = is_quote_source(&new);
                if was_source && !is_source {
                    info!("channel {} is no longer a quote source", new.id);
                    // cancel before clearing, so an in-flight live event
                    // cannot re-insert into the partition being cleared
                    self.tracker.unregister(&new.id);
                    self.cache.remove_channel(&new.community, &new.id);
                } else if !was_source && is_source {
                    info!("channel {} became a quote source", new.id);
                    let quotes =
                        fetch_channel_quotes(self.history.as_ref(), &new, &self.cfg).await?;
                    self.cache.bulk_put(&new.community, quotes);
                    self.tracker.register(&new);
                }
            }
            GatewayEvent::ChannelDeleted { channel } => {
                if self.tracker.unregister(&channel.id) {
                    info!("quote source channel {} deleted", channel.id);
                    self.cache.remove_channel(&channel.community, &channel.id);
                }
            }
            GatewayEvent::MessageCreated { message } => {
                if let Some(handle) = self.tracker.current(&message.channel) {
                    if is_quote(&message) {
                        self.apply_live(&handle, message);
                    }
                }
            }
            // consumed by interactive list sessions, not the sync engine
            GatewayEvent::ReactionAdded { .. } => {}
        }
        Ok(())
    }

    /// Drive the engine from an inbound gateway queue. Events are applied
    /// in arrival order; the worker stops when the queue closes or the
    /// shutdown flag flips.
    pub fn start_event_worker(
        self: Arc<Self>,
        mut events: mpsc::Receiver<GatewayEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                    event = events.recv() => {
                        let Some(event) = event else { break };
                        self.handle_event(event).await;
                    }
                }
            }
        })
    }

    /// Insert a live quote under a subscription handle. The generation is
    /// re-checked at the last moment so a cancelled subscription's
    /// in-flight event never mutates the cache.
    pub fn apply_live(&self, handle: &SubscriptionHandle, message: Message) -> bool {
        if !self.tracker.is_current(handle) {
            debug!(
                "dropping quote {} for cancelled subscription on {}",
                message.id, handle.channel
            );
            return false;
        }
        debug!("new quote {} in community {}", message.id, handle.community);
        self.cache.put(&handle.community, message);
        true
    }
}
