//! Connected sessions and event fan-out

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};
use uuid::Uuid;

use super::protocol::{ServerEvent, SESSION_REPLACED};

const BROADCAST_CAPACITY: usize = 256;

/// Targeted events buffered per session before new ones are dropped
pub const SESSION_BUFFER: usize = 64;

/// One live connection of a user
struct Session {
    conn_id: Uuid,
    tx: mpsc::Sender<ServerEvent>,
    guild_id: Option<Uuid>,
}

/// Tracks who is connected and routes events to them
#[derive(Clone)]
pub struct RealtimeHub {
    inner: Arc<HubInner>,
}

struct HubInner {
    /// Events every connected client receives
    broadcast_tx: broadcast::Sender<ServerEvent>,
    /// user_id -> newest session
    sessions: DashMap<Uuid, Session>,
}

impl RealtimeHub {
    pub fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            inner: Arc::new(HubInner {
                broadcast_tx,
                sessions: DashMap::new(),
            }),
        }
    }

    /// Register a connection for targeted events. Returns its conn_id.
    ///
    /// A newer connection replaces the older one, which is told so and closed.
    pub fn connect(
        &self,
        user_id: Uuid,
        guild_id: Option<Uuid>,
        tx: mpsc::Sender<ServerEvent>,
    ) -> Uuid {
        let conn_id = Uuid::new_v4();
        let previous = self.inner.sessions.insert(
            user_id,
            Session {
                conn_id,
                tx,
                guild_id,
            },
        );

        if let Some(old) = previous {
            debug!(user_id = %user_id, "Replacing older realtime session");
            let _ = old.tx.try_send(ServerEvent::error(
                SESSION_REPLACED,
                "Connected from another tab",
            ));
        }
        conn_id
    }

    /// Remove a session, but only if conn_id still owns it
    pub fn disconnect(&self, user_id: Uuid, conn_id: Uuid) -> bool {
        self.inner
            .sessions
            .remove_if(&user_id, |_, session| session.conn_id == conn_id)
            .is_some()
    }

    /// Record the guild whose chat a user receives
    pub fn set_guild(&self, user_id: Uuid, guild_id: Option<Uuid>) {
        if let Some(mut session) = self.inner.sessions.get_mut(&user_id) {
            session.guild_id = guild_id;
        }
    }

    /// Send a targeted event. Returns false when the user is offline or
    /// their buffer is full.
    pub fn send_to_user(&self, user_id: Uuid, event: ServerEvent) -> bool {
        match self.inner.sessions.get(&user_id) {
            Some(session) => deliver(user_id, &session.tx, event),
            None => false,
        }
    }

    /// Send to every online member of a guild. Returns the number reached.
    pub fn send_to_guild(&self, guild_id: Uuid, event: ServerEvent) -> usize {
        self.inner
            .sessions
            .iter()
            .filter(|entry| entry.guild_id == Some(guild_id))
            .filter(|entry| deliver(*entry.key(), &entry.tx, event.clone()))
            .count()
    }

    /// Broadcast an event to all connected clients
    pub fn broadcast(&self, event: ServerEvent) -> usize {
        self.inner.broadcast_tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.inner.broadcast_tx.subscribe()
    }

    pub fn online_count(&self) -> usize {
        self.inner.sessions.len()
    }

    pub fn is_online(&self, user_id: Uuid) -> bool {
        self.inner.sessions.contains_key(&user_id)
    }
}

fn deliver(user_id: Uuid, tx: &mpsc::Sender<ServerEvent>, event: ServerEvent) -> bool {
    match tx.try_send(event) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Full(_)) => {
            warn!(user_id = %user_id, "Realtime buffer full, dropping event");
            false
        }
        Err(mpsc::error::TrySendError::Closed(_)) => false,
    }
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pong(t: u64) -> ServerEvent {
        ServerEvent::Pong { t }
    }

    #[tokio::test]
    async fn targeted_events_reach_only_that_user() {
        let hub = RealtimeHub::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let (alice_tx, mut alice_rx) = mpsc::channel(SESSION_BUFFER);
        let (bob_tx, mut bob_rx) = mpsc::channel(SESSION_BUFFER);
        hub.connect(alice, None, alice_tx);
        hub.connect(bob, None, bob_tx);

        assert!(hub.send_to_user(alice, pong(1)));
        assert!(matches!(alice_rx.recv().await, Some(ServerEvent::Pong { t: 1 })));
        assert!(bob_rx.try_recv().is_err());

        assert!(!hub.send_to_user(Uuid::new_v4(), pong(2)));
        assert_eq!(hub.online_count(), 2);
    }

    #[tokio::test]
    async fn guild_events_follow_membership() {
        let hub = RealtimeHub::new();
        let guild = Uuid::new_v4();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let (alice_tx, mut alice_rx) = mpsc::channel(SESSION_BUFFER);
        let (bob_tx, mut bob_rx) = mpsc::channel(SESSION_BUFFER);
        hub.connect(alice, Some(guild), alice_tx);
        hub.connect(bob, None, bob_tx);

        assert_eq!(hub.send_to_guild(guild, pong(1)), 1);
        tokio_test::assert_ok!(alice_rx.try_recv());
        assert!(bob_rx.try_recv().is_err());

        hub.set_guild(bob, Some(guild));
        hub.set_guild(alice, None);
        assert_eq!(hub.send_to_guild(guild, pong(2)), 1);
        tokio_test::assert_ok!(bob_rx.try_recv());
        assert!(alice_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn stale_disconnect_keeps_newer_session() {
        let hub = RealtimeHub::new();
        let user = Uuid::new_v4();
        let (old_tx, mut old_rx) = mpsc::channel(SESSION_BUFFER);
        let (new_tx, mut new_rx) = mpsc::channel(SESSION_BUFFER);

        let old_conn = hub.connect(user, None, old_tx);
        let new_conn = hub.connect(user, None, new_tx);
        assert!(matches!(
            old_rx.try_recv(),
            Ok(ref event) if event.ends_session()
        ));

        assert!(!hub.disconnect(user, old_conn));
        assert!(hub.send_to_user(user, pong(3)));
        assert!(new_rx.try_recv().is_ok());

        assert!(hub.disconnect(user, new_conn));
        assert!(!hub.is_online(user));
    }

    #[tokio::test]
    async fn stalled_session_drops_events_instead_of_growing() {
        let hub = RealtimeHub::new();
        let user = Uuid::new_v4();
        let (tx, mut rx) = mpsc::channel(2);
        hub.connect(user, None, tx);

        assert!(hub.send_to_user(user, pong(1)));
        assert!(hub.send_to_user(user, pong(2)));
        assert!(!hub.send_to_user(user, pong(3)));

        assert!(matches!(rx.recv().await, Some(ServerEvent::Pong { t: 1 })));
        assert!(hub.send_to_user(user, pong(4)));
    }

    #[tokio::test]
    async fn broadcast_reaches_subscribers() {
        let hub = RealtimeHub::new();
        assert_eq!(hub.broadcast(pong(0)), 0);

        let mut rx = hub.subscribe();
        assert_eq!(hub.broadcast(pong(9)), 1);
        assert!(matches!(rx.recv().await, Ok(ServerEvent::Pong { t: 9 })));
    }
}
