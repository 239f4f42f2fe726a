/*
 * SPDX-FileCopyrightText: 2026 Quotesync Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::remote::{DeleteOutcome, Directory, FixStore, MessageSurface};
use quotesync_protocol::{CommunityId, FixId, ToFix, UserId};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub const CLOSE_EMOJI: &str = "\u{274C}";

const DIGIT_EMOJIS: [&str; 8] = [
    "1\u{FE0F}\u{20E3}",
    "2\u{FE0F}\u{20E3}",
    "3\u{FE0F}\u{20E3}",
    "4\u{FE0F}\u{20E3}",
    "5\u{FE0F}\u{20E3}",
    "6\u{FE0F}\u{20E3}",
    "7\u{FE0F}\u{20E3}",
    "8\u{FE0F}\u{20E3}",
];

pub const NO_FIXES_REPLY: &str = "No quotes to be fixed by you";

/// Positional display emoji for a visible list slot.
pub fn index_emoji(index: usize) -> Option<&'static str> {
    DIGIT_EMOJIS.get(index).copied()
}

#[derive(Debug, Clone)]
struct VisibleFix {
    fix: ToFix,
    emoji: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Reaction handled, session stays open.
    Removed(FixId),
    /// Reaction reverted without touching any state.
    Reverted,
    /// Session is over; the closed view has been rendered.
    Closed,
}

/// One reaction-driven fix list bound to a single externally-owned
/// message, with a bounded lifetime.
///
/// The session owns its surface exclusively: nothing else edits the bound
/// message. Callers feed it `reactionAdded` events (already filtered to
/// this message and to non-bot actors) via [`handle_reaction`] and drive
/// expiry via [`tick`]; both converge on an idempotent [`finish`], so a
/// racing expiry and final removal still produce exactly one closed view.
///
/// [`handle_reaction`]: FixListSession::handle_reaction
/// [`tick`]: FixListSession::tick
/// [`finish`]: FixListSession::finish
pub struct FixListSession {
    store: Arc<dyn FixStore>,
    directory: Arc<dyn Directory>,
    surface: Arc<dyn MessageSurface>,
    community: CommunityId,
    target: UserId,
    total: usize,
    visible: Vec<VisibleFix>,
    deadline: Instant,
    finished: bool,
}

impl FixListSession {
    /// Fetch the target's fixes and render the list. Returns None without
    /// opening a session when there is nothing to fix (the surface gets
    /// the "no fixes" reply and no reactions). `now` pins the session
    /// deadline, like the `now` fed to `handle_reaction` and `tick`.
    pub async fn open(
        store: Arc<dyn FixStore>,
        directory: Arc<dyn Directory>,
        surface: Arc<dyn MessageSurface>,
        community: CommunityId,
        requester: &UserId,
        target: UserId,
        cfg: &SyncConfig,
        now: Instant,
    ) -> Result<Option<FixListSession>, SyncError> {
        info!("fix list requested by {requester} for {target} in {community}");
        let fixes = store.list_fixes(&community, &target).await?;
        if fixes.is_empty() {
            surface.edit(NO_FIXES_REPLY).await?;
            return Ok(None);
        }

        let total = fixes.len();
        let visible: Vec<VisibleFix> = fixes
            .into_iter()
            .take(cfg.list_max_visible.min(DIGIT_EMOJIS.len()))
            .enumerate()
            .map(|(index, fix)| VisibleFix {
                emoji: DIGIT_EMOJIS[index],
                fix,
            })
            .collect();

        let session = FixListSession {
            store,
            directory,
            surface,
            community,
            target,
            total,
            visible,
            deadline: now + Duration::from_secs(cfg.list_session_secs),
            finished: false,
        };

        session.surface.edit(&session.render(false)).await?;
        for item in &session.visible {
            session.surface.add_reaction(item.emoji).await?;
        }
        session.surface.add_reaction(CLOSE_EMOJI).await?;
        info!(
            "fix list for {}: showing {} of {total}",
            session.target,
            session.visible.len()
        );
        Ok(Some(session))
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// Advance the session on one reaction-add. `now` is the delivery
    /// time, checked against the session deadline first.
    pub async fn handle_reaction(
        &mut self,
        actor: &UserId,
        emoji: &str,
        now: Instant,
    ) -> Result<SessionOutcome, SyncError> {
        if self.finished {
            return Ok(SessionOutcome::Closed);
        }
        if now >= self.deadline {
            self.finish().await;
            return Ok(SessionOutcome::Closed);
        }

        let authorized = self.is_authorized(actor).await;

        if emoji == CLOSE_EMOJI {
            if authorized {
                self.finish().await;
                return Ok(SessionOutcome::Closed);
            }
            self.revert(actor, emoji).await;
            return Ok(SessionOutcome::Reverted);
        }

        let slot = self.visible.iter().position(|item| item.emoji == emoji);
        let Some(slot) = slot else {
            self.revert(actor, emoji).await;
            return Ok(SessionOutcome::Reverted);
        };
        if !authorized {
            self.revert(actor, emoji).await;
            return Ok(SessionOutcome::Reverted);
        }

        let item = self.visible.remove(slot);
        match self.store.delete_fix(&item.fix.id).await {
            Ok(DeleteOutcome::Deleted) => {
                info!("fix {} removed by {actor}", item.fix.id);
            }
            Ok(DeleteOutcome::NotFound) => {
                // already gone from the store; dropping it from the view
                // is all that is left to do
                debug!("fix {} was already deleted", item.fix.id);
            }
            Err(e) => {
                self.visible.insert(slot, item);
                return Err(e);
            }
        }

        self.surface.edit(&self.render(false)).await?;
        if self.visible.is_empty() {
            self.surface.remove_all_reactions().await?;
        } else {
            // emojis are assigned once at open, so no remaining item needs
            // this one: retract the actor's press and the bot's own copy
            self.surface.remove_reaction(emoji, Some(actor)).await?;
            self.surface.remove_reaction(emoji, None).await?;
        }
        Ok(SessionOutcome::Removed(item.fix.id))
    }

    /// Expiry driver. Returns true when this call closed the session.
    pub async fn tick(&mut self, now: Instant) -> bool {
        if self.finished || now < self.deadline {
            return false;
        }
        self.finish().await;
        true
    }

    /// Render the closed view and retract every affordance. Idempotent:
    /// only the first call does anything, so a racing expiry and explicit
    /// close still yield exactly one closed render. Cleanup failures
    /// degrade to warnings.
    pub async fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        if let Err(e) = self.surface.edit(&self.render(true)).await {
            warn!("fix list close render failed: {e:#}");
        }
        if let Err(e) = self.surface.remove_all_reactions().await {
            warn!("fix list reaction cleanup failed: {e:#}");
        }
        info!("fix list for {} closed", self.target);
    }

    /// Actor is the list's target, or holds elevated permission in the
    /// community. A failed permission lookup denies.
    async fn is_authorized(&self, actor: &UserId) -> bool {
        if *actor == self.target {
            return true;
        }
        match self
            .directory
            .has_elevated_permission(&self.community, actor)
            .await
        {
            Ok(elevated) => elevated,
            Err(e) => {
                warn!("permission lookup failed for {actor}: {e:#}");
                false
            }
        }
    }

    async fn revert(&self, actor: &UserId, emoji: &str) {
        if let Err(e) = self.surface.remove_reaction(emoji, Some(actor)).await {
            warn!("failed to revert reaction from {actor}: {e:#}");
        }
    }

    fn render(&self, closed: bool) -> String {
        let mut out = format!(
            "Quotes to be fixed by {} ({} total)\n",
            self.target, self.total
        );
        if self.visible.is_empty() {
            out.push_str("Nothing left to fix.\n");
        }
        for item in &self.visible {
            out.push_str(&format!("{} {}\n", item.emoji, item.fix.message.content));
        }
        if closed {
            out.push_str("(list closed)\n");
        }
        out
    }
}
