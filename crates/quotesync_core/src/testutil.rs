/*
 * SPDX-FileCopyrightText: 2026 Quotesync Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! In-memory fakes for the collaborator traits, shared by module tests.

use crate::error::SyncError;
use crate::remote::{DeleteOutcome, Directory, FixStore, HistoryApi, MessageSurface, RemoteResult};
use async_trait::async_trait;
use quotesync_protocol::{
    Channel, ChannelId, ChannelKind, CommunityId, FixId, Message, ToFix, UserId,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Best-effort tracing setup for tests run with RUST_LOG set.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

pub fn channel(id: &str, community: &str, name: &str, kind: ChannelKind) -> Channel {
    Channel {
        id: id.into(),
        community: community.into(),
        name: name.to_string(),
        kind,
    }
}

pub fn message(id: &str, channel: &Channel, content: &str) -> Message {
    Message {
        id: id.into(),
        channel: channel.id.clone(),
        community: channel.community.clone(),
        author: "author".into(),
        content: content.to_string(),
        created_at_ms: 0,
    }
}

pub fn fix(id: &str, author: &str, message: Message) -> ToFix {
    ToFix {
        id: id.into(),
        author: author.into(),
        message,
    }
}

/// Channel histories stored newest-first; paging follows the `before`
/// cursor the way the real history API does. `set_stall` makes every page
/// ignore the cursor, for loop-safety tests.
#[derive(Default)]
pub struct FakeHistory {
    channels: Mutex<HashMap<ChannelId, Vec<Message>>>,
    failing: Mutex<HashSet<ChannelId>>,
    stall: AtomicBool,
    fetches: AtomicUsize,
}

impl FakeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, channel: &Channel, newest_first: Vec<Message>) {
        self.channels
            .lock()
            .unwrap()
            .insert(channel.id.clone(), newest_first);
    }

    pub fn set_stall(&self, stall: bool) {
        self.stall.store(stall, Ordering::SeqCst);
    }

    pub fn fail_channel(&self, channel: &ChannelId) {
        self.failing.lock().unwrap().insert(channel.clone());
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HistoryApi for FakeHistory {
    async fn fetch_page(
        &self,
        channel: &ChannelId,
        before: Option<&quotesync_protocol::MessageId>,
        limit: usize,
    ) -> RemoteResult<Vec<Message>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(channel) {
            return Err(SyncError::transient("history unavailable"));
        }
        let all = self
            .channels
            .lock()
            .unwrap()
            .get(channel)
            .cloned()
            .unwrap_or_default();
        if self.stall.load(Ordering::SeqCst) {
            return Ok(all.into_iter().take(limit).collect());
        }
        let start = match before {
            None => 0,
            Some(b) => all
                .iter()
                .position(|m| m.id == *b)
                .map(|i| i + 1)
                .unwrap_or(all.len()),
        };
        Ok(all.into_iter().skip(start).take(limit).collect())
    }
}

#[derive(Default)]
pub struct FakeDirectory {
    communities: Mutex<Vec<CommunityId>>,
    channels: Mutex<HashMap<CommunityId, Vec<Channel>>>,
    admins: Mutex<HashSet<UserId>>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_community(&self, community: &str) {
        self.communities.lock().unwrap().push(community.into());
    }

    pub fn add_channel(&self, channel: Channel) {
        let mut communities = self.communities.lock().unwrap();
        if !communities.contains(&channel.community) {
            communities.push(channel.community.clone());
        }
        drop(communities);
        self.channels
            .lock()
            .unwrap()
            .entry(channel.community.clone())
            .or_default()
            .push(channel);
    }

    pub fn grant_admin(&self, user: &str) {
        self.admins.lock().unwrap().insert(user.into());
    }
}

#[async_trait]
impl Directory for FakeDirectory {
    async fn list_communities(&self) -> RemoteResult<Vec<CommunityId>> {
        Ok(self.communities.lock().unwrap().clone())
    }

    async fn list_channels(&self, community: &CommunityId) -> RemoteResult<Vec<Channel>> {
        Ok(self
            .channels
            .lock()
            .unwrap()
            .get(community)
            .cloned()
            .unwrap_or_default())
    }

    async fn has_elevated_permission(
        &self,
        _community: &CommunityId,
        user: &UserId,
    ) -> RemoteResult<bool> {
        Ok(self.admins.lock().unwrap().contains(user))
    }
}

#[derive(Default)]
pub struct FakeFixStore {
    fixes: Mutex<Vec<ToFix>>,
    deleted: Mutex<Vec<FixId>>,
}

impl FakeFixStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, fix: ToFix) {
        self.fixes.lock().unwrap().push(fix);
    }

    pub fn remaining(&self) -> usize {
        self.fixes.lock().unwrap().len()
    }

    pub fn deleted_ids(&self) -> Vec<FixId> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl FixStore for FakeFixStore {
    async fn list_fixes(
        &self,
        community: &CommunityId,
        user: &UserId,
    ) -> RemoteResult<Vec<ToFix>> {
        Ok(self
            .fixes
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.message.community == *community && f.author == *user)
            .cloned()
            .collect())
    }

    async fn delete_fix(&self, fix: &FixId) -> RemoteResult<DeleteOutcome> {
        let mut fixes = self.fixes.lock().unwrap();
        let before = fixes.len();
        fixes.retain(|f| f.id != *fix);
        if fixes.len() < before {
            self.deleted.lock().unwrap().push(fix.clone());
            Ok(DeleteOutcome::Deleted)
        } else {
            Ok(DeleteOutcome::NotFound)
        }
    }
}

/// Records edits and tracks which bot reactions are currently attached.
#[derive(Default)]
pub struct FakeSurface {
    edits: Mutex<Vec<String>>,
    reactions: Mutex<Vec<String>>,
    removed: Mutex<Vec<(String, Option<UserId>)>>,
    clear_count: AtomicUsize,
}

impl FakeSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edits(&self) -> Vec<String> {
        self.edits.lock().unwrap().clone()
    }

    pub fn last_edit(&self) -> Option<String> {
        self.edits.lock().unwrap().last().cloned()
    }

    pub fn reactions(&self) -> Vec<String> {
        self.reactions.lock().unwrap().clone()
    }

    pub fn removed(&self) -> Vec<(String, Option<UserId>)> {
        self.removed.lock().unwrap().clone()
    }

    pub fn clear_count(&self) -> usize {
        self.clear_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MessageSurface for FakeSurface {
    async fn edit(&self, content: &str) -> RemoteResult<()> {
        self.edits.lock().unwrap().push(content.to_string());
        Ok(())
    }

    async fn add_reaction(&self, emoji: &str) -> RemoteResult<()> {
        self.reactions.lock().unwrap().push(emoji.to_string());
        Ok(())
    }

    async fn remove_reaction(&self, emoji: &str, user: Option<&UserId>) -> RemoteResult<()> {
        self.removed
            .lock()
            .unwrap()
            .push((emoji.to_string(), user.cloned()));
        if user.is_none() {
            self.reactions.lock().unwrap().retain(|e| e != emoji);
        }
        Ok(())
    }

    async fn remove_all_reactions(&self) -> RemoteResult<()> {
        self.reactions.lock().unwrap().clear();
        self.clear_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
