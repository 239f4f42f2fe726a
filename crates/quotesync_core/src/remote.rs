/*
 * SPDX-FileCopyrightText: 2026 Quotesync Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::error::SyncError;
use async_trait::async_trait;
use quotesync_protocol::{Channel, ChannelId, CommunityId, FixId, Message, MessageId, ToFix, UserId};

pub type RemoteResult<T> = Result<T, SyncError>;

/// Paginated channel history. No server-side filtering; callers filter.
#[async_trait]
pub trait HistoryApi: Send + Sync {
    /// Most-recent-first page of messages strictly older than `before`
    /// (or the newest page when `before` is None).
    async fn fetch_page(
        &self,
        channel: &ChannelId,
        before: Option<&MessageId>,
        limit: usize,
    ) -> RemoteResult<Vec<Message>>;
}

/// Directory of reachable communities, their channels and member rights.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn list_communities(&self) -> RemoteResult<Vec<CommunityId>>;

    async fn list_channels(&self, community: &CommunityId) -> RemoteResult<Vec<Channel>>;

    async fn has_elevated_permission(
        &self,
        community: &CommunityId,
        user: &UserId,
    ) -> RemoteResult<bool>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Remote key-value store of quotes flagged for correction.
#[async_trait]
pub trait FixStore: Send + Sync {
    async fn list_fixes(&self, community: &CommunityId, user: &UserId)
        -> RemoteResult<Vec<ToFix>>;

    async fn delete_fix(&self, fix: &FixId) -> RemoteResult<DeleteOutcome>;
}

/// Handle to one externally-owned message the bot may edit and decorate.
/// An interactive list session holds its surface exclusively.
#[async_trait]
pub trait MessageSurface: Send + Sync {
    async fn edit(&self, content: &str) -> RemoteResult<()>;

    async fn add_reaction(&self, emoji: &str) -> RemoteResult<()>;

    /// Remove one user's reaction, or the bot's own when `user` is None.
    async fn remove_reaction(&self, emoji: &str, user: Option<&UserId>) -> RemoteResult<()>;

    async fn remove_all_reactions(&self) -> RemoteResult<()>;
}
