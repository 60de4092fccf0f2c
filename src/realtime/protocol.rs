//! Realtime protocol message definitions
//! These are the wire types pushed over the WebSocket

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::campaign::WorkoutNode;
use crate::store::guilds::Guild;
use crate::store::invites::WorkoutInvite;
use crate::store::messages::ChatMessage;

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Ping for latency measurement
    Ping {
        /// Client timestamp
        t: u64,
    },
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Welcome message after connection
    Welcome {
        user_id: Uuid,
        server_time: u64,
        online: usize,
    },

    /// A guild was founded (sent to everyone)
    GuildCreated { guild: Guild },

    /// New chat line in the receiver's guild
    GuildMessage {
        message: ChatMessage,
        /// Sender's local id for the optimistic entry
        #[serde(skip_serializing_if = "Option::is_none")]
        client_ref: Option<String>,
    },

    FriendRequest {
        request_id: Uuid,
        sender_id: Uuid,
        sender_name: String,
    },

    WorkoutInvite {
        invite: WorkoutInvite,
        sender_name: String,
    },

    /// The invited partner accepted; both sides start the same node
    InviteAccepted {
        invite_id: Uuid,
        partner_name: String,
        node: WorkoutNode,
    },

    InviteDeclined {
        invite_id: Uuid,
        partner_name: String,
    },

    /// Pong response
    Pong {
        /// Echo back client timestamp
        t: u64,
    },

    /// Error message
    Error { code: String, message: String },
}

/// Error code sent to a session that a newer connection took over
pub const SESSION_REPLACED: &str = "session_replaced";

impl ServerEvent {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// Last event a connection gets before the server closes it
    pub fn ends_session(&self) -> bool {
        matches!(self, Self::Error { code, .. } if code == SESSION_REPLACED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_replacement_ends_a_session() {
        assert!(ServerEvent::error(SESSION_REPLACED, "Connected from another tab").ends_session());
        assert!(!ServerEvent::error("rate_limited", "Too many messages").ends_session());
        assert!(!ServerEvent::Pong { t: 1 }.ends_session());
    }

    #[test]
    fn client_ping_parses() {
        let event: ClientEvent = serde_json::from_str(r#"{"type":"ping","t":42}"#).unwrap();
        assert!(matches!(event, ClientEvent::Ping { t: 42 }));
        assert!(serde_json::from_str::<ClientEvent>(r#"{"type":"join_match"}"#).is_err());
    }

    #[test]
    fn server_events_are_type_tagged() {
        let value = serde_json::to_value(ServerEvent::Pong { t: 7 }).unwrap();
        assert_eq!(value, serde_json::json!({ "type": "pong", "t": 7 }));

        let value = serde_json::to_value(ServerEvent::error("rate_limited", "Slow down")).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["code"], "rate_limited");
    }

    #[test]
    fn chat_event_omits_missing_client_ref() {
        let message = ChatMessage {
            id: Uuid::nil(),
            guild_id: Uuid::nil(),
            user_id: Uuid::nil(),
            username: "Hero".to_string(),
            content: "Leg day!".to_string(),
            created_at: chrono::Utc::now(),
        };
        let value = serde_json::to_value(ServerEvent::GuildMessage {
            message,
            client_ref: None,
        })
        .unwrap();
        assert_eq!(value["type"], "guild_message");
        assert_eq!(value["message"]["content"], "Leg day!");
        assert!(value.get("client_ref").is_none());
    }
}
