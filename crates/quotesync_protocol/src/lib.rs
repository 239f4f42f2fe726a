/*
 * SPDX-FileCopyrightText: 2026 Quotesync Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommunityId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixId(pub String);

macro_rules! id_impls {
    ($name:ident) => {
        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

id_impls!(CommunityId);
id_impls!(ChannelId);
id_impls!(MessageId);
id_impls!(UserId);
id_impls!(FixId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Text,
    Voice,
    Category,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    pub community: CommunityId,
    pub name: String,
    pub kind: ChannelKind,
}

/// Snapshot of a message as delivered by the gateway or the history API.
/// Cached quotes are these snapshots; edits are not re-synced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub channel: ChannelId,
    pub community: CommunityId,
    pub author: UserId,
    pub content: String,
    pub created_at_ms: i64,
}

/// A quote flagged for correction, as stored by the external fix-store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToFix {
    pub id: FixId,
    pub author: UserId,
    pub message: Message,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GatewayEvent {
    CommunityJoined { community: CommunityId },
    CommunityLeft { community: CommunityId },
    ChannelCreated { channel: Channel },
    ChannelUpdated { old: Channel, new: Channel },
    ChannelDeleted { channel: Channel },
    MessageCreated { message: Message },
    ReactionAdded {
        message: MessageId,
        user: UserId,
        emoji: String,
    },
}
