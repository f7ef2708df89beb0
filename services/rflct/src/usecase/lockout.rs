//! Failed-login tracking with temporary lockout.
//!
//! The consuming login flow is expected to call these in a fixed order:
//! [`LockoutTracker::is_locked`] before credential verification (a locked
//! identifier is rejected without touching the password hash),
//! [`LockoutTracker::record_failed_attempt`] on a credential mismatch behind
//! a uniform "invalid credentials" message, and
//! [`LockoutTracker::reset_attempts`] on every successful login.
//!
//! Failure semantics are asymmetric on purpose: reads fail open (store down
//! means "not locked") and the write never propagates an error — a store
//! outage silently disables lockout for that attempt instead of blocking
//! legitimate logins. Operators learn about it from warn-level logs, not
//! users.

use crate::domain::repository::AttemptStore;

/// Thresholds and durations for the lockout tracker.
#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    /// Failures within the window before the identifier is locked.
    pub max_failed_attempts: u32,
    /// How long a lock lasts, in minutes.
    pub lockout_minutes: u64,
    /// Sliding window for the failure counter, in minutes.
    pub window_minutes: u64,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            lockout_minutes: 30,
            window_minutes: 15,
        }
    }
}

fn failed_attempts_key(identifier: &str) -> String {
    format!("auth:failed_attempts:{identifier}")
}

fn lockout_key(identifier: &str) -> String {
    format!("auth:lockout:{identifier}")
}

pub struct LockoutTracker<S: AttemptStore> {
    pub store: S,
    pub policy: LockoutPolicy,
}

impl<S: AttemptStore> LockoutTracker<S> {
    /// Record one failed attempt and return the post-increment count.
    ///
    /// The window TTL goes on the counter only when this call created it; the
    /// lock flag is set once at the threshold-crossing moment and never
    /// refreshed by later failures (set-if-absent, so a 6th failure while
    /// locked neither extends nor shortens the lock).
    pub async fn record_failed_attempt(&self, identifier: &str) -> u64 {
        let counter = failed_attempts_key(identifier);
        let count = match self.store.increment(&counter).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(error = %e, identifier, "attempt store unavailable, failed attempt not recorded");
                return 1;
            }
        };

        if count == 1 {
            if let Err(e) = self
                .store
                .expire(&counter, self.policy.window_minutes * 60)
                .await
            {
                tracing::warn!(error = %e, identifier, "failed to set attempt window expiry");
            }
        }

        if count >= i64::from(self.policy.max_failed_attempts) {
            match self
                .store
                .set_if_absent(&lockout_key(identifier), self.policy.lockout_minutes * 60)
                .await
            {
                Ok(true) => {
                    tracing::info!(identifier, attempts = count, "identifier locked out");
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(error = %e, identifier, "failed to set lockout flag");
                }
            }
        }

        count.max(0) as u64
    }

    /// Whether the identifier is currently locked. Fails open.
    pub async fn is_locked(&self, identifier: &str) -> bool {
        match self.store.exists(&lockout_key(identifier)).await {
            Ok(locked) => locked,
            Err(e) => {
                tracing::warn!(error = %e, identifier, "attempt store unavailable, treating as unlocked");
                false
            }
        }
    }

    /// Ceiling of the remaining lock TTL in minutes; 0 when unlocked,
    /// expired, or the store is unavailable.
    pub async fn remaining_lockout_minutes(&self, identifier: &str) -> u64 {
        match self.store.ttl_secs(&lockout_key(identifier)).await {
            Ok(ttl) if ttl > 0 => (ttl as u64).div_ceil(60),
            Ok(_) => 0,
            Err(e) => {
                tracing::warn!(error = %e, identifier, "attempt store unavailable, no lockout remaining");
                0
            }
        }
    }

    /// Clear both the counter and the lock. Runs on every successful login,
    /// so store failures are logged and swallowed — never propagated.
    pub async fn reset_attempts(&self, identifier: &str) {
        if let Err(e) = self.store.delete(&failed_attempts_key(identifier)).await {
            tracing::warn!(error = %e, identifier, "failed to clear attempt counter");
        }
        if let Err(e) = self.store.delete(&lockout_key(identifier)).await {
            tracing::warn!(error = %e, identifier, "failed to clear lockout flag");
        }
    }
}
