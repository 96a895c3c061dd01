//! Rate limiter for preventing brute force attacks on login

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Number of tracked keys above which expired entries are swept
const PRUNE_THRESHOLD: usize = 1024;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum number of attempts allowed inside one window
    pub max_attempts: u32,
    /// Time window
    pub window: Duration,
    /// How long a key stays locked out once the limit is hit
    pub ban_duration: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window: Duration::from_secs(300),       // 5 minutes
            ban_duration: Duration::from_secs(900), // 15 minutes
        }
    }
}

impl RateLimiterConfig {
    /// Create a configuration from environment variables
    ///
    /// # Environment Variables
    /// - `LOGIN_MAX_ATTEMPTS` (default: 5)
    /// - `LOGIN_WINDOW_SECONDS` (default: 300)
    /// - `LOGIN_BAN_SECONDS` (default: 900)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_attempts = std::env::var("LOGIN_MAX_ATTEMPTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_attempts);

        let window = std::env::var("LOGIN_WINDOW_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.window);

        let ban_duration = std::env::var("LOGIN_BAN_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.ban_duration);

        Self {
            max_attempts,
            window,
            ban_duration,
        }
    }
}

#[derive(Debug)]
struct RateLimiterEntry {
    attempts: u32,
    window_start: Instant,
    ban_expires: Option<Instant>,
}

impl RateLimiterEntry {
    fn is_stale(&self, now: Instant, window: Duration) -> bool {
        let banned = self.ban_expires.is_some_and(|expires| now < expires);
        !banned && now.saturating_duration_since(self.window_start) >= window
    }
}

/// Rate limiter keyed by an arbitrary string (the login email)
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    entries: Arc<Mutex<HashMap<String, RateLimiterEntry>>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record an attempt for `key` and report whether it may proceed
    pub async fn is_allowed(&self, key: &str) -> bool {
        self.check_at(key, Instant::now()).await
    }

    /// Forget every attempt recorded for `key`
    pub async fn reset(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }

    async fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut entries = self.entries.lock().await;

        if entries.len() >= PRUNE_THRESHOLD {
            let before = entries.len();
            entries.retain(|_, entry| !entry.is_stale(now, self.config.window));
            debug!("Pruned {} expired rate limiter entries", before - entries.len());
        }

        let entry = entries.entry(key.to_string()).or_insert(RateLimiterEntry {
            attempts: 0,
            window_start: now,
            ban_expires: None,
        });

        if let Some(ban_expires) = entry.ban_expires {
            if now < ban_expires {
                return false;
            }
            entry.attempts = 0;
            entry.ban_expires = None;
            entry.window_start = now;
        }

        if now.saturating_duration_since(entry.window_start) >= self.config.window {
            entry.attempts = 0;
            entry.window_start = now;
        }

        if entry.attempts >= self.config.max_attempts {
            entry.ban_expires = Some(now + self.config.ban_duration);
            warn!(
                "Locked out {} for {} seconds",
                key,
                self.config.ban_duration.as_secs()
            );
            return false;
        }

        entry.attempts += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> RateLimiter {
        RateLimiter::new(RateLimiterConfig {
            max_attempts: 3,
            window: Duration::from_secs(60),
            ban_duration: Duration::from_secs(120),
        })
    }

    #[tokio::test]
    async fn blocks_after_max_attempts() {
        let limiter = limiter();
        let now = Instant::now();

        for _ in 0..3 {
            assert!(limiter.check_at("a@example.com", now).await);
        }
        assert!(!limiter.check_at("a@example.com", now).await);
        // Other keys are unaffected
        assert!(limiter.check_at("b@example.com", now).await);
    }

    #[tokio::test]
    async fn ban_lifts_after_duration() {
        let limiter = limiter();
        let now = Instant::now();

        for _ in 0..4 {
            limiter.check_at("a@example.com", now).await;
        }
        assert!(
            !limiter
                .check_at("a@example.com", now + Duration::from_secs(119))
                .await
        );
        assert!(
            limiter
                .check_at("a@example.com", now + Duration::from_secs(121))
                .await
        );
    }

    #[tokio::test]
    async fn window_expiry_resets_count() {
        let limiter = limiter();
        let now = Instant::now();

        for _ in 0..3 {
            assert!(limiter.check_at("a@example.com", now).await);
        }
        assert!(
            limiter
                .check_at("a@example.com", now + Duration::from_secs(61))
                .await
        );
    }

    #[tokio::test]
    async fn expired_keys_are_evicted() {
        let limiter = limiter();
        let now = Instant::now();

        for i in 0..PRUNE_THRESHOLD * 2 {
            limiter.check_at(&format!("user{i}@example.com"), now).await;
        }
        // Still inside the window: nothing may be dropped
        assert!(limiter.entries.lock().await.len() >= PRUNE_THRESHOLD * 2);

        let later = now + Duration::from_secs(100_000);
        assert!(limiter.check_at("fresh@example.com", later).await);
        assert_eq!(limiter.entries.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn active_bans_survive_pruning() {
        let limiter = limiter();
        let now = Instant::now();

        for _ in 0..4 {
            limiter.check_at("banned@example.com", now).await;
        }
        for i in 0..PRUNE_THRESHOLD {
            limiter.check_at(&format!("user{i}@example.com"), now).await;
        }

        // Window is over but the ban is not
        let later = now + Duration::from_secs(90);
        assert!(limiter.check_at("fresh@example.com", later).await);
        assert!(!limiter.check_at("banned@example.com", later).await);
        assert_eq!(limiter.entries.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn reset_clears_attempts() {
        let limiter = limiter();

        for _ in 0..3 {
            assert!(limiter.is_allowed("a@example.com").await);
        }
        limiter.reset("a@example.com").await;
        assert!(limiter.is_allowed("a@example.com").await);
    }
}
