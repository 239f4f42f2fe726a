/*
 * SPDX-FileCopyrightText: 2026 Quotesync Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use quotesync_protocol::ChannelId;
use thiserror::Error;

/// Failure taxonomy shared by the sync engine and its collaborators.
///
/// Transient failures are retryable, permission failures surface as a
/// no-op revert to the actor, not-found means the entity vanished
/// mid-operation and the intent is already satisfied, and a stalled
/// cursor is fatal to that one backfill task only.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("transient network failure: {0}")]
    Transient(String),

    #[error("insufficient permissions")]
    PermissionDenied,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("history cursor stalled for channel {channel}")]
    CursorStalled { channel: ChannelId },
}

impl SyncError {
    pub fn transient(err: impl std::fmt::Display) -> Self {
        Self::Transient(err.to_string())
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
