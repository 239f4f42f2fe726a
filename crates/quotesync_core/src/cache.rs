/*
 * SPDX-FileCopyrightText: 2026 Quotesync Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use quotesync_protocol::{ChannelId, CommunityId, Message, MessageId};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory quote index, partitioned per community.
///
/// Mutations take the write lock, so backfill bulk inserts and live
/// single inserts into the same partition are serialized. Reads hand out
/// snapshots and never hold the lock across an await point. No eviction:
/// entries live until a topology change removes them, and the whole index
/// is rebuilt from channel history on restart.
#[derive(Default)]
pub struct QuoteCache {
    partitions: RwLock<HashMap<CommunityId, HashMap<MessageId, Message>>>,
}

impl QuoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one quote. Re-inserting the same id overwrites.
    pub fn put(&self, community: &CommunityId, message: Message) {
        let mut parts = self.partitions.write().unwrap();
        parts
            .entry(community.clone())
            .or_default()
            .insert(message.id.clone(), message);
    }

    /// Merge a batch into a partition, creating it if absent.
    pub fn bulk_put(&self, community: &CommunityId, messages: Vec<Message>) {
        let mut parts = self.partitions.write().unwrap();
        let partition = parts.entry(community.clone()).or_default();
        for message in messages {
            partition.insert(message.id.clone(), message);
        }
    }

    /// Create an empty partition if the community has none yet.
    pub fn ensure_partition(&self, community: &CommunityId) {
        let mut parts = self.partitions.write().unwrap();
        parts.entry(community.clone()).or_default();
    }

    /// Drop every quote affiliated with the given channel, leaving the
    /// rest of the partition untouched.
    pub fn remove_channel(&self, community: &CommunityId, channel: &ChannelId) {
        let mut parts = self.partitions.write().unwrap();
        if let Some(partition) = parts.get_mut(community) {
            partition.retain(|_, message| message.channel != *channel);
        }
    }

    pub fn remove_community(&self, community: &CommunityId) {
        let mut parts = self.partitions.write().unwrap();
        parts.remove(community);
    }

    /// Point-in-time copy of one partition. Empty map when absent.
    pub fn snapshot(&self, community: &CommunityId) -> HashMap<MessageId, Message> {
        let parts = self.partitions.read().unwrap();
        parts.get(community).cloned().unwrap_or_default()
    }

    pub fn community_len(&self, community: &CommunityId) -> usize {
        let parts = self.partitions.read().unwrap();
        parts.get(community).map(|p| p.len()).unwrap_or(0)
    }

    pub fn has_partition(&self, community: &CommunityId) -> bool {
        self.partitions.read().unwrap().contains_key(community)
    }

    pub fn total_len(&self) -> usize {
        let parts = self.partitions.read().unwrap();
        parts.values().map(|p| p.len()).sum()
    }

    pub fn community_count(&self) -> usize {
        self.partitions.read().unwrap().len()
    }
}
