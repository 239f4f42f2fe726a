/*
 * SPDX-FileCopyrightText: 2026 Quotesync Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod backfill;
pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod fixlist;
pub mod remote;
pub mod sync;
pub mod topology;

#[cfg(test)]
pub(crate) mod testutil;
