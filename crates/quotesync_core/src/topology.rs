/*
 * SPDX-FileCopyrightText: 2026 Quotesync Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use quotesync_protocol::{Channel, ChannelId, CommunityId};
use std::collections::HashMap;
use std::sync::Mutex;

/// Which channels currently feed live quotes into the cache.
///
/// Each registration carries a generation drawn from a monotonically
/// increasing counter. A live subscription captures its generation in a
/// [`SubscriptionHandle`]; cache mutations on the live path must pass
/// [`SourceTracker::is_current`] first, so an event still in flight when
/// its channel was unregistered (or re-registered) is rejected instead of
/// re-inserting into a partition being cleared.
#[derive(Default)]
pub struct SourceTracker {
    inner: Mutex<TrackerInner>,
}

#[derive(Default)]
struct TrackerInner {
    registrations: HashMap<ChannelId, SourceRegistration>,
    next_generation: u64,
}

#[derive(Debug, Clone)]
struct SourceRegistration {
    community: CommunityId,
    generation: u64,
}

/// Cancellable handle held by one live subscription.
#[derive(Debug, Clone)]
pub struct SubscriptionHandle {
    pub channel: ChannelId,
    pub community: CommunityId,
    pub generation: u64,
}

impl SourceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transition `unregistered -> registered`. Registering a channel that
    /// is already registered replaces its registration, invalidating every
    /// handle issued for the previous one.
    pub fn register(&self, channel: &Channel) -> SubscriptionHandle {
        let mut inner = self.inner.lock().unwrap();
        inner.next_generation += 1;
        let generation = inner.next_generation;
        inner.registrations.insert(
            channel.id.clone(),
            SourceRegistration {
                community: channel.community.clone(),
                generation,
            },
        );
        SubscriptionHandle {
            channel: channel.id.clone(),
            community: channel.community.clone(),
            generation,
        }
    }

    /// Cancel a channel's subscription. Returns whether it was registered.
    /// Callers clear the channel's quotes only after this returns, so the
    /// cancellation happens-before the cache removal.
    pub fn unregister(&self, channel: &ChannelId) -> bool {
        let mut inner = self.inner.lock().unwrap();
        inner.registrations.remove(channel).is_some()
    }

    /// Cancel every subscription belonging to a community. Returns the
    /// channels that were registered.
    pub fn unregister_community(&self, community: &CommunityId) -> Vec<ChannelId> {
        let mut inner = self.inner.lock().unwrap();
        let dropped: Vec<ChannelId> = inner
            .registrations
            .iter()
            .filter(|(_, reg)| reg.community == *community)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &dropped {
            inner.registrations.remove(id);
        }
        dropped
    }

    /// Current handle for a channel, if registered.
    pub fn current(&self, channel: &ChannelId) -> Option<SubscriptionHandle> {
        let inner = self.inner.lock().unwrap();
        inner.registrations.get(channel).map(|reg| SubscriptionHandle {
            channel: channel.clone(),
            community: reg.community.clone(),
            generation: reg.generation,
        })
    }

    /// Whether a handle still names the live registration for its channel.
    pub fn is_current(&self, handle: &SubscriptionHandle) -> bool {
        let inner = self.inner.lock().unwrap();
        inner
            .registrations
            .get(&handle.channel)
            .map(|reg| reg.generation == handle.generation)
            .unwrap_or(false)
    }

    pub fn is_registered(&self, channel: &ChannelId) -> bool {
        self.inner.lock().unwrap().registrations.contains_key(channel)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
