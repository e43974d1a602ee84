//! Settled search input.
//!
//! Typed text becomes the effective query only after no further input has
//! arrived for the configured quiet period. The clock is passed in by the
//! caller.
//!
//! Library API for interactive front ends that rebuild the view while the
//! user types. The `browse` command takes its search text whole and does not
//! use it. Build one with [`Config::search_settle`](crate::config::Config::search_settle)
//! and copy [`SettledQuery::settled`] into `ViewState::search` whenever
//! [`SettledQuery::poll`] reports a change.

use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
pub struct SettledQuery {
    delay: Duration,
    pending: Option<(String, Instant)>,
    settled: String,
}

impl SettledQuery {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            settled: String::new(),
        }
    }

    /// Records typed text. Replaces any pending input and restarts the quiet period.
    pub fn input(&mut self, text: impl Into<String>, now: Instant) {
        self.pending = Some((text.into(), now));
    }

    /// Promotes pending input once the quiet period has elapsed. Returns
    /// true when the settled query changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let quiet = self
            .pending
            .as_ref()
            .is_some_and(|(_, typed_at)| now.saturating_duration_since(*typed_at) >= self.delay);
        quiet && self.flush()
    }

    /// Promotes pending input immediately.
    pub fn flush(&mut self) -> bool {
        match self.pending.take() {
            Some((text, _)) if text != self.settled => {
                self.settled = text;
                true
            }
            _ => false,
        }
    }

    pub fn settled(&self) -> &str {
        &self.settled
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
