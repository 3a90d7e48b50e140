//! Sliding-window rate limiting
//!
//! Two limits guard the public surface:
//! - Failed logins per username (5 per 15 minutes)
//! - Inquiry submissions per client IP (10 per minute)

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::hash::Hash;
use tokio::sync::RwLock;

/// Counts events per key inside a trailing time window
pub struct SlidingWindow<K> {
    limit: usize,
    window: Duration,
    events: RwLock<HashMap<K, Vec<DateTime<Utc>>>>,
}

impl<K: Eq + Hash> SlidingWindow<K> {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            events: RwLock::new(HashMap::new()),
        }
    }

    /// True when `key` already has `limit` events inside the window
    pub async fn is_limited(&self, key: &K) -> bool {
        let cutoff = Utc::now() - self.window;
        let events = self.events.read().await;
        events
            .get(key)
            .map(|times| times.iter().filter(|t| **t > cutoff).count() >= self.limit)
            .unwrap_or(false)
    }

    pub async fn record(&self, key: K) {
        let now = Utc::now();
        let cutoff = now - self.window;
        let mut events = self.events.write().await;
        let times = events.entry(key).or_default();
        times.retain(|t| *t > cutoff);
        times.push(now);
    }

    /// Record an event for `key` unless it is already at the limit.
    ///
    /// Returns false when limited. The check and the insert happen under one
    /// write lock, so concurrent callers can't overshoot the limit.
    pub async fn check_and_record(&self, key: K) -> bool {
        let now = Utc::now();
        let cutoff = now - self.window;
        let mut events = self.events.write().await;
        let times = events.entry(key).or_default();
        times.retain(|t| *t > cutoff);
        if times.len() >= self.limit {
            return false;
        }
        times.push(now);
        true
    }

    pub async fn clear(&self, key: &K) {
        self.events.write().await.remove(key);
    }

    /// Drop expired events and empty keys
    pub async fn cleanup(&self) {
        let cutoff = Utc::now() - self.window;
        self.events.write().await.retain(|_, times| {
            times.retain(|t| *t > cutoff);
            !times.is_empty()
        });
    }
}

/// Limits applied to logins and public form submissions
pub struct RateLimiter {
    failed_logins: SlidingWindow<String>,
    submissions: SlidingWindow<String>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            failed_logins: SlidingWindow::new(5, Duration::minutes(15)),
            submissions: SlidingWindow::new(10, Duration::minutes(1)),
        }
    }

    /// Check if username is locked out (5 failures per 15 minutes)
    pub async fn is_username_limited(&self, username: &str) -> bool {
        self.failed_logins.is_limited(&username.to_lowercase()).await
    }

    pub async fn record_failed_login(&self, username: &str) {
        self.failed_logins.record(username.to_lowercase()).await;
    }

    /// Clear failed attempts for username (on successful login)
    pub async fn clear_username(&self, username: &str) {
        self.failed_logins.clear(&username.to_lowercase()).await;
    }

    /// Count a public form submission from `client` (10 per minute).
    ///
    /// Returns false, recording nothing, once the client is over the limit.
    pub async fn try_record_submission(&self, client: &str) -> bool {
        self.submissions.check_and_record(client.to_string()).await
    }

    /// Clean up old entries (called periodically from `main`)
    pub async fn cleanup(&self) {
        self.failed_logins.cleanup().await;
        self.submissions.cleanup().await;
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
