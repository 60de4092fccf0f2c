//! Rate limiting utilities

use governor::{
    clock::DefaultClock,
    state::{keyed::DefaultKeyedStateStore, InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;
use uuid::Uuid;

/// Rate limiter type alias
pub type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate limiter keyed by user
pub type UserLimiter = RateLimiter<Uuid, DefaultKeyedStateStore<Uuid>, DefaultClock>;

fn non_zero(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).unwrap_or(NonZeroU32::MIN)
}

/// Create a rate limiter with the specified requests per second
pub fn create_limiter(requests_per_second: u32) -> Arc<Limiter> {
    let quota = Quota::per_second(non_zero(requests_per_second));
    Arc::new(RateLimiter::direct(quota))
}

/// Inbound WebSocket messages per connection
pub const INPUT_RATE_LIMIT: u32 = 10; // Max 10 messages per second

/// Guild chat: burst of 5, refilled at one message per second
pub const CHAT_BURST: u32 = 5;
pub const CHAT_PER_SECOND: u32 = 1;

/// Per-connection limiter for realtime client messages
#[derive(Clone)]
pub struct ConnectionRateLimiter {
    input_limiter: Arc<Limiter>,
}

impl ConnectionRateLimiter {
    pub fn new() -> Self {
        Self {
            input_limiter: create_limiter(INPUT_RATE_LIMIT),
        }
    }

    /// Check if an input message is allowed (returns true if allowed)
    pub fn check_input(&self) -> bool {
        self.input_limiter.check().is_ok()
    }
}

impl Default for ConnectionRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-user limiter for guild chat posts
#[derive(Clone)]
pub struct ChatRateLimiter {
    limiter: Arc<UserLimiter>,
}

impl ChatRateLimiter {
    pub fn new() -> Self {
        Self::with_quota(CHAT_PER_SECOND, CHAT_BURST)
    }

    pub fn with_quota(per_second: u32, burst: u32) -> Self {
        let quota = Quota::per_second(non_zero(per_second)).allow_burst(non_zero(burst));
        Self {
            limiter: Arc::new(RateLimiter::keyed(quota)),
        }
    }

    /// Check if the user may post now (returns true if allowed)
    pub fn check(&self, user_id: Uuid) -> bool {
        self.limiter.check_key(&user_id).is_ok()
    }

    /// Drop state for users whose bucket has refilled
    pub fn purge_idle(&self) {
        self.limiter.retain_recent();
    }
}

impl Default for ChatRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
