// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Status Auto-Clear
//!
//! Every status message is cleared after [`STATUS_CLEAR_DELAY`]. Each card
//! holds at most one live timer; arming a new one cancels the previous, so
//! a stale timer never wipes a newer message.
//!
//! ## Shutdown
//!
//! Timers are children of a session-wide `CancellationToken`. Cancelling
//! it (explicitly or by dropping the scheduler) stops every pending timer
//! before it can touch the session state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use super::state::{CardState, SessionState};

/// How long a status message stays visible.
pub const STATUS_CLEAR_DELAY: Duration = Duration::from_millis(3500);

pub struct StatusScheduler {
    root: CancellationToken,
    delay: Duration,
}

impl StatusScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            root: CancellationToken::new(),
            delay,
        }
    }

    /// Schedule the card's status to be cleared, replacing any earlier timer.
    ///
    /// Must be called with the session write lock held (hence `&mut CardState`);
    /// the timer task itself takes the lock again when it fires.
    pub fn arm(&self, card: &mut CardState, state: &Arc<RwLock<SessionState>>) {
        self.disarm(card);
        if self.root.is_cancelled() {
            return;
        }

        let token = self.root.child_token();
        card.status_timer = Some(token.clone());

        let key = card.asset.key;
        let delay = self.delay;
        let state = Arc::clone(state);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let mut session = state.write().await;
                    // Re-armed or shut down while we waited for the lock.
                    if token.is_cancelled() {
                        return;
                    }
                    if let Some(card) = session.card_mut(key) {
                        card.clear_status();
                    }
                }
            }
        });
    }

    /// Cancel the card's live timer, if any. Used when a message that must
    /// stay visible (such as a pending action) replaces the current one.
    pub fn disarm(&self, card: &mut CardState) {
        if let Some(previous) = card.status_timer.take() {
            previous.cancel();
        }
    }

    pub fn shutdown(&self) {
        self.root.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.root.is_cancelled()
    }
}

impl Default for StatusScheduler {
    fn default() -> Self {
        Self::new(STATUS_CLEAR_DELAY)
    }
}

impl Drop for StatusScheduler {
    fn drop(&mut self) {
        self.root.cancel();
    }
}
