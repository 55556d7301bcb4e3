//! Sliding-window rate limiting with lockout for authentication attempts.
//!
//! Attempts are tracked per (subject, endpoint) pair, where the subject is
//! usually the client address and the endpoint is the operation name
//! ("login", "register", "verify"). Exceeding the allowance within the window
//! locks the key out for a fixed duration. A background thread evicts stale
//! keys so one-off clients do not accumulate.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;

/// Configuration for the rate limiter.
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// When false every check is allowed (default: true)
    pub enabled: bool,

    /// Attempts allowed within one window (default: 5)
    pub max_attempts: u32,

    /// Time window for counting attempts (default: 60 seconds)
    pub window_duration: Duration,

    /// How long to lock out after exceeding max attempts (default: 300 seconds)
    pub lockout_duration: Duration,

    /// How often the background task evicts stale keys (default: 60 seconds)
    pub cleanup_interval: Duration,

    /// Maximum number of keys to track (prevents memory exhaustion)
    pub max_tracked_keys: usize,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 5,
            window_duration: Duration::from_secs(60),
            lockout_duration: Duration::from_secs(300),
            cleanup_interval: Duration::from_secs(60),
            max_tracked_keys: 10000,
        }
    }
}

impl RateLimiterConfig {
    /// Configuration that allows every attempt.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Create a new configuration with custom max attempts.
    pub fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = max;
        self
    }

    /// Set the time window for counting attempts.
    pub fn with_window(mut self, duration: Duration) -> Self {
        self.window_duration = duration;
        self
    }

    /// Set the lockout duration.
    pub fn with_lockout(mut self, duration: Duration) -> Self {
        self.lockout_duration = duration;
        self
    }

    /// Set how often stale keys are evicted.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Set the maximum number of tracked keys.
    pub fn with_max_tracked(mut self, max: usize) -> Self {
        self.max_tracked_keys = max;
        self
    }
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Zero when allowed, otherwise how long the caller should wait
    pub retry_after: Duration,
}

impl RateLimitDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            retry_after: Duration::ZERO,
        }
    }

    fn deny(retry_after: Duration) -> Self {
        Self {
            allowed: false,
            retry_after,
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Retry-after rounded up to whole seconds, for a `Retry-After` header.
    pub fn retry_after_secs(&self) -> u64 {
        let secs = self.retry_after.as_secs();
        if self.retry_after.subsec_nanos() > 0 {
            secs + 1
        } else {
            secs
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RateLimitKey {
    subject: String,
    endpoint: String,
}

impl RateLimitKey {
    fn new(subject: &str, endpoint: &str) -> Self {
        Self {
            subject: subject.to_string(),
            endpoint: endpoint.to_string(),
        }
    }
}

/// An active lockout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lockout {
    Until(Instant),
    /// The end lies past what `Instant` can represent
    Indefinite,
}

impl Lockout {
    fn starting_at(now: Instant, duration: Duration) -> Self {
        now.checked_add(duration)
            .map_or(Lockout::Indefinite, Lockout::Until)
    }

    fn is_active(&self, now: Instant) -> bool {
        match *self {
            Lockout::Until(until) => now < until,
            Lockout::Indefinite => true,
        }
    }

    /// Time left at `now`; an indefinite lockout reports the configured duration.
    fn remaining(&self, now: Instant, configured: Duration) -> Option<Duration> {
        match *self {
            Lockout::Until(until) if now < until => Some(until - now),
            Lockout::Until(_) => None,
            Lockout::Indefinite => Some(configured),
        }
    }
}

/// Attempt history for a single key.
#[derive(Debug, Default)]
struct AttemptRecord {
    /// Attempt times in the order they were recorded
    timestamps: Vec<Instant>,
    /// Set while the key is locked out
    lockout: Option<Lockout>,
}

impl AttemptRecord {
    fn evaluate(&mut self, now: Instant, config: &RateLimiterConfig) -> RateLimitDecision {
        if let Some(lockout) = self.lockout {
            if let Some(left) = lockout.remaining(now, config.lockout_duration) {
                return RateLimitDecision::deny(left);
            }
            self.timestamps.clear();
            self.lockout = None;
        }

        if let Some(cutoff) = now.checked_sub(config.window_duration) {
            self.timestamps.retain(|t| *t >= cutoff);
        }

        if self.timestamps.len() >= config.max_attempts as usize {
            self.lockout = Some(Lockout::starting_at(now, config.lockout_duration));
            return RateLimitDecision::deny(config.lockout_duration);
        }

        self.timestamps.push(now);
        RateLimitDecision::allow()
    }

    fn is_locked(&self, now: Instant) -> bool {
        self.lockout.is_some_and(|lockout| lockout.is_active(now))
    }

    fn is_stale(&self, now: Instant, config: &RateLimiterConfig) -> bool {
        if self.is_locked(now) {
            return false;
        }
        let horizon = config
            .window_duration
            .saturating_add(config.lockout_duration);
        match self.timestamps.last() {
            Some(newest) => now.saturating_duration_since(*newest) > horizon,
            None => true,
        }
    }

    fn attempts_in_window(&self, now: Instant, window: Duration) -> usize {
        match now.checked_sub(window) {
            Some(cutoff) => self.timestamps.iter().filter(|t| **t >= cutoff).count(),
            None => self.timestamps.len(),
        }
    }
}

/// Tracked keys plus a count of the slots they occupy.
///
/// A new key reserves a slot before it is inserted, so the map never grows
/// past `max_tracked_keys` even when many new keys arrive at once.
#[derive(Default)]
struct Tracker {
    records: DashMap<RateLimitKey, AttemptRecord>,
    /// Inserted keys plus outstanding reservations
    slots: AtomicUsize,
}

impl Tracker {
    fn try_reserve(&self, max: usize) -> bool {
        self.slots
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < max).then_some(n + 1)
            })
            .is_ok()
    }

    fn release(&self, count: usize) {
        if count > 0 {
            self.slots.fetch_sub(count, Ordering::AcqRel);
        }
    }

    fn remove(&self, key: &RateLimitKey) {
        if self.records.remove(key).is_some() {
            self.release(1);
        }
    }

    /// Remove every stale, unlocked record. Returns the number evicted.
    fn evict_stale(&self, config: &RateLimiterConfig) -> usize {
        let now = Instant::now();
        let mut evicted = 0;
        self.records.retain(|_, record| {
            let stale = record.is_stale(now, config);
            if stale {
                evicted += 1;
            }
            !stale
        });
        self.release(evicted);
        evicted
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

/// Handle to the background cleanup thread.
struct CleanupTask {
    stop_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl CleanupTask {
    fn spawn(tracker: Arc<Tracker>, config: RateLimiterConfig) -> std::io::Result<Self> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name("rate-limit-cleanup".to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(config.cleanup_interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let evicted = tracker.evict_stale(&config);
                        if evicted > 0 {
                            tracing::info!(
                                evicted,
                                remaining = tracker.len(),
                                "Evicted stale rate limit records"
                            );
                        }
                    }
                    // Stop requested or limiter dropped
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;
        Ok(Self { stop_tx, handle })
    }

    fn shutdown(self) {
        // The receiver is gone if the thread already exited; joining still applies.
        let _ = self.stop_tx.send(());
        if self.handle.join().is_err() {
            tracing::error!("Rate limit cleanup thread panicked");
        }
    }
}

/// Per-(subject, endpoint) rate limiter for authentication.
///
/// Thread-safe: keys live in a sharded concurrent map, so checks against
/// different keys do not block each other. Construction starts a cleanup
/// thread that runs until [`RateLimiter::stop`] is called or the limiter is
/// dropped. Share one limiter between handlers with an `Arc`.
///
/// # Example
///
/// ```rust
/// use authstore::rate_limit::{RateLimiter, RateLimiterConfig};
/// use std::time::Duration;
///
/// let config = RateLimiterConfig::default()
///     .with_max_attempts(3)
///     .with_lockout(Duration::from_secs(600));
///
/// let limiter = RateLimiter::new(config);
///
/// let decision = limiter.check("192.168.1.1", "login");
/// if decision.allowed {
///     // Proceed with authentication
/// } else {
///     // Reject with Retry-After: decision.retry_after_secs()
/// }
///
/// limiter.stop();
/// ```
pub struct RateLimiter {
    config: RateLimiterConfig,
    tracker: Arc<Tracker>,
    cleanup: Mutex<Option<CleanupTask>>,
}

impl RateLimiter {
    /// Create a new rate limiter and start its cleanup thread.
    ///
    /// A disabled limiter tracks nothing and starts no thread.
    pub fn new(config: RateLimiterConfig) -> Self {
        let tracker = Arc::new(Tracker::default());

        let cleanup = if config.enabled {
            match CleanupTask::spawn(Arc::clone(&tracker), config.clone()) {
                Ok(task) => Some(task),
                Err(e) => {
                    // The key cap still bounds memory without the thread.
                    tracing::error!(error = %e, "Failed to start rate limit cleanup thread");
                    None
                }
            }
        } else {
            None
        };

        Self {
            config,
            tracker,
            cleanup: Mutex::new(cleanup),
        }
    }

    /// Create a rate limiter with default configuration.
    pub fn default_config() -> Self {
        Self::new(RateLimiterConfig::default())
    }

    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }

    /// Whether checks are enforced.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Record an attempt by `subject` against `endpoint` and decide whether
    /// it may proceed.
    ///
    /// Exactly `max_attempts` attempts are allowed within the window; the next
    /// one locks the key out for `lockout_duration`. While locked out nothing
    /// is recorded. After the lockout the next check starts a fresh window.
    pub fn check(&self, subject: &str, endpoint: &str) -> RateLimitDecision {
        if !self.config.enabled {
            return RateLimitDecision::allow();
        }

        let key = RateLimitKey::new(subject, endpoint);
        let max = self.config.max_tracked_keys;

        let mut record = match self.tracker.records.get_mut(&key) {
            Some(record) => record,
            None => {
                if !self.tracker.try_reserve(max) {
                    self.tracker.evict_stale(&self.config);
                    if !self.tracker.try_reserve(max) {
                        tracing::warn!(
                            subject = %subject,
                            endpoint = %endpoint,
                            tracked = self.tracker.len(),
                            "Rate limiter at capacity, rejecting untracked key"
                        );
                        return RateLimitDecision::deny(self.config.window_duration);
                    }
                }
                match self.tracker.records.entry(key) {
                    // Another thread inserted the key after the lookup
                    Entry::Occupied(entry) => {
                        self.tracker.release(1);
                        entry.into_ref()
                    }
                    Entry::Vacant(entry) => entry.insert(AttemptRecord::default()),
                }
            }
        };

        // Taken under the entry lock so timestamps stay ordered per key.
        let now = Instant::now();
        let was_locked = record.is_locked(now);
        let decision = record.evaluate(now, &self.config);

        if !decision.allowed && !was_locked {
            tracing::warn!(
                subject = %subject,
                endpoint = %endpoint,
                lockout_secs = self.config.lockout_duration.as_secs(),
                "Rate limit exceeded, key locked out"
            );
        }

        decision
    }

    /// Forget all attempts for a key, e.g. after a successful login.
    pub fn clear(&self, subject: &str, endpoint: &str) {
        self.tracker.remove(&RateLimitKey::new(subject, endpoint));
    }

    /// Number of attempts recorded for a key within the current window.
    pub fn attempt_count(&self, subject: &str, endpoint: &str) -> usize {
        self.tracker
            .records
            .get(&RateLimitKey::new(subject, endpoint))
            .map(|record| record.attempts_in_window(Instant::now(), self.config.window_duration))
            .unwrap_or(0)
    }

    /// Remaining lockout for a key, or `None` if it is not locked out.
    pub fn lockout_remaining(&self, subject: &str, endpoint: &str) -> Option<Duration> {
        let record = self
            .tracker
            .records
            .get(&RateLimitKey::new(subject, endpoint))?;
        record
            .lockout?
            .remaining(Instant::now(), self.config.lockout_duration)
    }

    /// Run one eviction pass now. Returns the number of records removed.
    pub fn cleanup(&self) -> usize {
        self.tracker.evict_stale(&self.config)
    }

    /// Get current number of tracked keys.
    pub fn tracked_count(&self) -> usize {
        self.tracker.len()
    }

    /// Stop the background cleanup thread and wait for it to exit.
    ///
    /// Checks keep working afterwards; only periodic eviction stops.
    /// Calling this more than once is a no-op.
    pub fn stop(&self) {
        let task = self.cleanup.lock().take();
        if let Some(task) = task {
            task.shutdown();
            tracing::debug!("Rate limit cleanup thread stopped");
        }
    }

    #[cfg(test)]
    fn is_cleanup_running(&self) -> bool {
        self.cleanup
            .lock()
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }
}

impl Drop for RateLimiter {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn limiter(config: RateLimiterConfig) -> RateLimiter {
        RateLimiter::new(config.with_cleanup_interval(Duration::from_secs(3600)))
    }

    #[test]
    fn test_basic_rate_limiting() {
        let limiter = limiter(
            RateLimiterConfig::default()
                .with_max_attempts(3)
                .with_window(Duration::from_secs(1)),
        );

        for _ in 0..3 {
            assert!(limiter.check("192.168.1.1", "login").allowed);
        }

        let denied = limiter.check("192.168.1.1", "login");
        assert!(!denied.allowed);
        assert!(denied.retry_after > Duration::ZERO);
    }

    #[test]
    fn test_lockout_reports_lockout_duration_then_remaining() {
        let limiter = limiter(
            RateLimiterConfig::default()
                .with_max_attempts(1)
                .with_lockout(Duration::from_secs(30)),
        );

        assert!(limiter.check("10.0.0.1", "login").allowed);

        let first = limiter.check("10.0.0.1", "login");
        assert!(!first.allowed);
        assert_eq!(first.retry_after, Duration::from_secs(30));
        assert_eq!(first.retry_after_secs(), 30);

        let second = limiter.check("10.0.0.1", "login");
        assert!(!second.allowed);
        assert!(second.retry_after <= Duration::from_secs(30));
        assert!(limiter.lockout_remaining("10.0.0.1", "login").is_some());
    }

    #[test]
    fn test_lockout_expires() {
        let limiter = limiter(
            RateLimiterConfig::default()
                .with_max_attempts(1)
                .with_lockout(Duration::from_millis(100)),
        );

        assert!(limiter.check("10.0.0.1", "login").allowed);
        assert!(!limiter.check("10.0.0.1", "login").allowed);

        sleep(Duration::from_millis(150));

        let decision = limiter.check("10.0.0.1", "login");
        assert!(decision.allowed);
        assert_eq!(decision.retry_after, Duration::ZERO);
        assert!(limiter.lockout_remaining("10.0.0.1", "login").is_none());
    }

    #[test]
    fn test_lockout_does_not_count_attempts() {
        let limiter = limiter(
            RateLimiterConfig::default()
                .with_max_attempts(2)
                .with_lockout(Duration::from_millis(100)),
        );

        assert!(limiter.check("10.0.0.2", "login").allowed);
        assert!(limiter.check("10.0.0.2", "login").allowed);
        for _ in 0..5 {
            assert!(!limiter.check("10.0.0.2", "login").allowed);
        }
        assert_eq!(limiter.attempt_count("10.0.0.2", "login"), 2);

        sleep(Duration::from_millis(150));

        // Full allowance after the lockout
        assert!(limiter.check("10.0.0.2", "login").allowed);
        assert!(limiter.check("10.0.0.2", "login").allowed);
        assert_eq!(limiter.attempt_count("10.0.0.2", "login"), 2);
    }

    #[test]
    fn test_window_slides() {
        let limiter = limiter(
            RateLimiterConfig::default()
                .with_max_attempts(2)
                .with_window(Duration::from_millis(50)),
        );

        assert!(limiter.check("10.0.0.3", "login").allowed);
        assert!(limiter.check("10.0.0.3", "login").allowed);

        sleep(Duration::from_millis(80));

        assert!(limiter.check("10.0.0.3", "login").allowed);
        assert!(limiter.check("10.0.0.3", "login").allowed);
    }

    #[test]
    fn test_different_keys_independent() {
        let limiter = limiter(RateLimiterConfig::default().with_max_attempts(1));

        assert!(limiter.check("ip-A", "login").allowed);
        assert!(!limiter.check("ip-A", "login").allowed);

        assert!(limiter.check("ip-B", "login").allowed);
        assert!(limiter.check("ip-A", "register").allowed);
    }

    #[test]
    fn test_clear_resets_key() {
        let limiter = limiter(RateLimiterConfig::default().with_max_attempts(1));

        assert!(limiter.check("172.16.0.1", "login").allowed);
        assert!(!limiter.check("172.16.0.1", "login").allowed);

        limiter.clear("172.16.0.1", "login");
        assert_eq!(limiter.attempt_count("172.16.0.1", "login"), 0);
        assert!(limiter.check("172.16.0.1", "login").allowed);
    }

    #[test]
    fn test_disabled_allows_everything() {
        let limiter = RateLimiter::new(RateLimiterConfig::disabled().with_max_attempts(1));

        for _ in 0..10 {
            let decision = limiter.check("1.1.1.1", "login");
            assert!(decision.allowed);
            assert_eq!(decision.retry_after, Duration::ZERO);
        }
        assert!(!limiter.is_enabled());
        assert_eq!(limiter.tracked_count(), 0);
        assert!(!limiter.is_cleanup_running());
    }

    #[test]
    fn test_manual_cleanup_evicts_stale_keys() {
        let limiter = limiter(
            RateLimiterConfig::default()
                .with_window(Duration::from_millis(10))
                .with_lockout(Duration::from_millis(10)),
        );

        limiter.check("1.1.1.1", "login");
        limiter.check("2.2.2.2", "login");
        assert_eq!(limiter.tracked_count(), 2);

        sleep(Duration::from_millis(60));
        limiter.check("3.3.3.3", "login");

        assert_eq!(limiter.cleanup(), 2);
        assert_eq!(limiter.tracked_count(), 1);
    }

    #[test]
    fn test_cleanup_keeps_locked_keys() {
        let limiter = limiter(
            RateLimiterConfig::default()
                .with_max_attempts(1)
                .with_window(Duration::from_millis(10))
                .with_lockout(Duration::from_secs(60)),
        );

        limiter.check("1.1.1.1", "login");
        limiter.check("1.1.1.1", "login");

        sleep(Duration::from_millis(30));
        assert_eq!(limiter.cleanup(), 0);
        assert_eq!(limiter.tracked_count(), 1);
    }

    #[test]
    fn test_background_cleanup() {
        let limiter = RateLimiter::new(
            RateLimiterConfig::default()
                .with_window(Duration::from_millis(10))
                .with_lockout(Duration::from_millis(10))
                .with_cleanup_interval(Duration::from_millis(10)),
        );

        limiter.check("1.1.1.1", "login");
        assert_eq!(limiter.tracked_count(), 1);

        sleep(Duration::from_millis(300));
        assert_eq!(limiter.tracked_count(), 0);
    }

    #[test]
    fn test_stop_joins_cleanup_thread() {
        let limiter = RateLimiter::new(
            RateLimiterConfig::default().with_cleanup_interval(Duration::from_millis(5)),
        );
        assert!(limiter.is_cleanup_running());

        limiter.stop();
        assert!(!limiter.is_cleanup_running());

        // Second stop is a no-op and checks still work
        limiter.stop();
        assert!(limiter.check("1.1.1.1", "login").allowed);
    }

    #[test]
    fn test_capacity_rejects_new_keys() {
        let limiter = limiter(
            RateLimiterConfig::default()
                .with_max_tracked(2)
                .with_window(Duration::from_secs(60)),
        );

        assert!(limiter.check("1.1.1.1", "login").allowed);
        assert!(limiter.check("2.2.2.2", "login").allowed);

        let rejected = limiter.check("3.3.3.3", "login");
        assert!(!rejected.allowed);
        assert_eq!(rejected.retry_after, Duration::from_secs(60));
        assert_eq!(limiter.tracked_count(), 2);

        // Tracked keys are unaffected
        assert!(limiter.check("1.1.1.1", "login").allowed);
    }

    #[test]
    fn test_capacity_frees_stale_keys() {
        let limiter = limiter(
            RateLimiterConfig::default()
                .with_max_tracked(1)
                .with_window(Duration::from_millis(10))
                .with_lockout(Duration::from_millis(10)),
        );

        assert!(limiter.check("1.1.1.1", "login").allowed);
        sleep(Duration::from_millis(60));

        assert!(limiter.check("2.2.2.2", "login").allowed);
        assert_eq!(limiter.tracked_count(), 1);
    }

    #[test]
    fn test_concurrent_new_keys_respect_capacity() {
        let limiter = Arc::new(limiter(
            RateLimiterConfig::default()
                .with_max_tracked(4)
                .with_window(Duration::from_secs(60)),
        ));
        let barrier = Arc::new(std::sync::Barrier::new(16));

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let limiter = Arc::clone(&limiter);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    limiter.check(&format!("10.2.0.{i}"), "login").allowed
                })
            })
            .collect();

        let allowed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|allowed| *allowed)
            .count();
        assert_eq!(allowed, 4);
        assert_eq!(limiter.tracked_count(), 4);
    }

    #[test]
    fn test_clear_frees_capacity() {
        let limiter = limiter(RateLimiterConfig::default().with_max_tracked(1));

        assert!(limiter.check("1.1.1.1", "login").allowed);
        assert!(!limiter.check("2.2.2.2", "login").allowed);

        limiter.clear("1.1.1.1", "login");
        assert!(limiter.check("2.2.2.2", "login").allowed);
        assert_eq!(limiter.tracked_count(), 1);
    }

    #[test]
    fn test_unrepresentable_lockout_locks_indefinitely() {
        let limiter = limiter(
            RateLimiterConfig::default()
                .with_max_attempts(1)
                .with_lockout(Duration::MAX),
        );

        assert!(limiter.check("10.3.0.1", "login").allowed);

        let denied = limiter.check("10.3.0.1", "login");
        assert!(!denied.allowed);
        assert_eq!(denied.retry_after, Duration::MAX);

        let again = limiter.check("10.3.0.1", "login");
        assert!(!again.allowed);
        assert_eq!(again.retry_after, Duration::MAX);
        assert_eq!(
            limiter.lockout_remaining("10.3.0.1", "login"),
            Some(Duration::MAX)
        );

        assert_eq!(limiter.cleanup(), 0);
        assert_eq!(limiter.tracked_count(), 1);
    }

    #[test]
    fn test_unbounded_window_cleanup() {
        let limiter = limiter(
            RateLimiterConfig::default()
                .with_window(Duration::MAX)
                .with_lockout(Duration::from_secs(1)),
        );

        assert!(limiter.check("10.3.0.2", "login").allowed);
        assert_eq!(limiter.attempt_count("10.3.0.2", "login"), 1);
        assert_eq!(limiter.cleanup(), 0);
        assert_eq!(limiter.tracked_count(), 1);
    }

    #[test]
    fn test_concurrent_checks_respect_limit() {
        let limiter = Arc::new(limiter(
            RateLimiterConfig::default()
                .with_max_attempts(10)
                .with_window(Duration::from_secs(60)),
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                thread::spawn(move || {
                    (0..10)
                        .filter(|_| limiter.check("10.1.1.1", "login").allowed)
                        .count()
                })
            })
            .collect();

        let allowed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(allowed, 10);
    }

    #[test]
    fn test_retry_after_secs_rounds_up() {
        let decision = RateLimitDecision::deny(Duration::from_millis(1500));
        assert_eq!(decision.retry_after_secs(), 2);
        assert_eq!(RateLimitDecision::allow().retry_after_secs(), 0);
    }
}
