//! In-memory session registry.
//!
//! Maps opaque bearer tokens to the identity that logged in. Validity is
//! decided at lookup time against the stored expiry, so `sweep` is pure
//! housekeeping and may run on any cadence, or never.

use std::{collections::HashMap, sync::Arc};

use parking_lot::RwLock;
use rand::{rngs::OsRng, RngCore};
use serde::Serialize;
use time::{Duration, OffsetDateTime, PrimitiveDateTime};
use tracing::debug;

/// Token byte length before hex encoding (32 bytes = 64 hex chars).
const TOKEN_BYTES: usize = 32;

/// Expiry used when `now + ttl` is not representable.
const FAR_FUTURE: OffsetDateTime = PrimitiveDateTime::MAX.assume_utc();

/// Source of "now" for expiry decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Who a resolved session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
}

#[derive(Debug, Clone)]
struct Session {
    identity: Identity,
    created_at: OffsetDateTime,
    expires_at: OffsetDateTime,
}

impl Session {
    fn is_live(&self, now: OffsetDateTime) -> bool {
        now < self.expires_at
    }
}

pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl SessionRegistry {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn with_system_clock(ttl: Duration) -> Self {
        Self::new(ttl, Arc::new(SystemClock))
    }

    /// Issue a new token for the user. Earlier sessions stay valid.
    pub fn create(&self, user_id: i64, username: &str) -> String {
        let token = generate_token();
        let now = self.clock.now();
        let session = Session {
            identity: Identity {
                user_id,
                username: username.to_string(),
            },
            created_at: now,
            expires_at: now.checked_add(self.ttl).unwrap_or(FAR_FUTURE),
        };
        self.sessions.write().insert(token.clone(), session);
        debug!(user_id, "session created");
        token
    }

    /// Identity behind `token`, or `None` if unknown or expired.
    ///
    /// An expired entry is evicted on the spot.
    pub fn resolve(&self, token: &str) -> Option<Identity> {
        let now = self.clock.now();
        {
            let sessions = self.sessions.read();
            match sessions.get(token) {
                None => return None,
                Some(s) if s.is_live(now) => return Some(s.identity.clone()),
                Some(_) => {}
            }
        }
        let mut sessions = self.sessions.write();
        // Re-check under the write lock: the entry may have been replaced or removed.
        if sessions.get(token).is_some_and(|s| !s.is_live(now)) {
            sessions.remove(token);
            debug!("expired session evicted");
        }
        None
    }

    /// Forget `token`. Unknown tokens are ignored.
    pub fn invalidate(&self, token: &str) {
        if let Some(s) = self.sessions.write().remove(token) {
            let age = self.clock.now() - s.created_at;
            debug!(
                user_id = s.identity.user_id,
                age_secs = age.whole_seconds(),
                "session invalidated"
            );
        }
    }

    /// Drop every expired session and return how many were removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, s| s.is_live(now));
        before - sessions.len()
    }

    /// Number of sessions that would currently resolve.
    pub fn active_count(&self) -> usize {
        let now = self.clock.now();
        self.sessions
            .read()
            .values()
            .filter(|s| s.is_live(now))
            .count()
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Clock that only moves when told to.
    struct ManualClock(Mutex<OffsetDateTime>);

    impl ManualClock {
        fn new() -> Arc<Self> {
            Arc::new(Self(Mutex::new(OffsetDateTime::UNIX_EPOCH + Duration::days(20_000))))
        }

        fn advance(&self, by: Duration) {
            *self.0.lock() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> OffsetDateTime {
            *self.0.lock()
        }
    }

    fn registry(ttl: Duration) -> (Arc<ManualClock>, SessionRegistry) {
        let clock = ManualClock::new();
        let reg = SessionRegistry::new(ttl, clock.clone());
        (clock, reg)
    }

    #[test]
    fn resolve_within_ttl() {
        let (clock, reg) = registry(Duration::hours(24));
        let token = reg.create(7, "alice");
        assert_eq!(token.len(), TOKEN_BYTES * 2);

        let id = reg.resolve(&token).unwrap();
        assert_eq!(id.user_id, 7);
        assert_eq!(id.username, "alice");

        clock.advance(Duration::hours(23));
        assert!(reg.resolve(&token).is_some());
    }

    #[test]
    fn unrepresentable_expiry_is_clamped() {
        let (clock, reg) = registry(Duration::seconds(i64::MAX));
        let token = reg.create(3, "carol");
        assert_eq!(reg.resolve(&token).unwrap().user_id, 3);
        clock.advance(Duration::days(365 * 100));
        assert!(reg.resolve(&token).is_some());
        assert_eq!(reg.active_count(), 1);
    }

    #[test]
    fn expires_after_ttl() {
        let (clock, reg) = registry(Duration::hours(24));
        let token = reg.create(1, "alice");
        clock.advance(Duration::hours(24) + Duration::seconds(1));
        assert!(reg.resolve(&token).is_none());
        assert_eq!(reg.active_count(), 0);
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let (clock, reg) = registry(Duration::minutes(10));
        let token = reg.create(1, "alice");
        clock.advance(Duration::minutes(10));
        assert!(reg.resolve(&token).is_none());
    }

    #[test]
    fn unknown_token_is_none() {
        let (_clock, reg) = registry(Duration::hours(1));
        assert!(reg.resolve("deadbeef").is_none());
    }

    #[test]
    fn invalidate_is_idempotent() {
        let (clock, reg) = registry(Duration::hours(1));
        let token = reg.create(1, "alice");
        reg.invalidate(&token);
        assert!(reg.resolve(&token).is_none());
        reg.invalidate(&token);
        reg.invalidate("never-issued");

        let expired = reg.create(1, "alice");
        clock.advance(Duration::hours(2));
        reg.invalidate(&expired);
        assert!(reg.resolve(&expired).is_none());
    }

    #[test]
    fn tokens_are_distinct_per_login() {
        let (_clock, reg) = registry(Duration::hours(1));
        let a = reg.create(1, "alice");
        let b = reg.create(1, "alice");
        assert_ne!(a, b);
        reg.invalidate(&a);
        assert!(reg.resolve(&b).is_some());
        assert_eq!(reg.active_count(), 1);
    }

    #[test]
    fn sweep_removes_only_expired() {
        let (clock, reg) = registry(Duration::hours(1));
        let old = reg.create(1, "alice");
        clock.advance(Duration::minutes(45));
        let fresh = reg.create(2, "bob");
        clock.advance(Duration::minutes(30));

        assert_eq!(reg.sweep(), 1);
        assert!(reg.resolve(&old).is_none());
        assert!(reg.resolve(&fresh).is_some());
        assert_eq!(reg.sweep(), 0);
    }

    #[test]
    fn concurrent_resolves_agree() {
        let reg = Arc::new(SessionRegistry::with_system_clock(Duration::hours(1)));
        let token = reg.create(42, "carol");
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = reg.clone();
                let token = token.clone();
                std::thread::spawn(move || reg.resolve(&token))
            })
            .collect();
        for h in handles {
            let id = h.join().unwrap().unwrap();
            assert_eq!(id.user_id, 42);
        }
    }
}
