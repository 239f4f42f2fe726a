/*
 * SPDX-FileCopyrightText: 2026 Quotesync Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Upper bound on history pages pulled per channel during backfill.
    pub max_fetch_pages: usize,
    /// Messages requested per history page.
    pub page_size: usize,
    /// Fix items rendered at once in an interactive list.
    pub list_max_visible: usize,
    /// Lifetime of an interactive list session, in seconds.
    pub list_session_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_fetch_pages: 50,
            page_size: 100,
            list_max_visible: 8,
            list_session_secs: 3600,
        }
    }
}
