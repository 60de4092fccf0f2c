//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::hub::SESSION_BUFFER;
use super::protocol::{ClientEvent, ServerEvent};
use crate::app::AppState;
use crate::http::middleware::verify_jwt;
use crate::util::rate_limit::ConnectionRateLimiter;
use crate::util::time::unix_millis;

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Supabase access token
    pub token: String,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    // Verify JWT token before upgrading
    match verify_jwt(&query.token, &state.config.supabase_jwt_secret) {
        Ok(claims) => {
            info!(user_id = %claims.sub, "WebSocket upgrade for authenticated user");
            ws.on_upgrade(move |socket| handle_socket(socket, claims.sub, state))
        }
        Err(e) => {
            warn!(error = %e, "WebSocket auth failed");
            (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
        }
    }
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, user_id: Uuid, state: AppState) {
    let (mut ws_sink, mut ws_stream) = socket.split();

    // Guild chat routing needs the hero's current guild
    let guild_id = match state.profiles.get_profile(user_id).await {
        Ok(profile) => profile.and_then(|p| p.guild_id),
        Err(e) => {
            error!(user_id = %user_id, error = %e, "Failed to fetch profile for realtime session");
            None
        }
    };

    let (tx, mut rx) = mpsc::channel::<ServerEvent>(SESSION_BUFFER);
    let mut broadcast_rx = state.realtime.subscribe();
    let conn_id = state.realtime.connect(user_id, guild_id, tx.clone());
    info!(user_id = %user_id, conn_id = %conn_id, "Realtime session opened");

    let welcome = ServerEvent::Welcome {
        user_id,
        server_time: unix_millis(),
        online: state.realtime.online_count(),
    };
    if let Err(e) = send_event(&mut ws_sink, &welcome).await {
        error!(user_id = %user_id, error = %e, "Failed to send welcome");
        state.realtime.disconnect(user_id, conn_id);
        return;
    }

    // Writer task: targeted and broadcast events -> WebSocket
    let mut writer_handle = tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                targeted = rx.recv() => match targeted {
                    Some(event) => event,
                    None => break,
                },
                shared = broadcast_rx.recv() => match shared {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(user_id = %user_id, lagged_count = n, "Client lagged, skipping {} events", n);
                        // Continue - don't disconnect for lag
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            };

            if let Err(e) = send_event(&mut ws_sink, &event).await {
                debug!(user_id = %user_id, error = %e, "WebSocket send failed");
                break;
            }
            if event.ends_session() {
                info!(user_id = %user_id, "Closing replaced realtime session");
                let _ = ws_sink.send(Message::Close(None)).await;
                break;
            }
        }
    });

    // Reader loop: WebSocket -> replies
    let rate_limiter = ConnectionRateLimiter::new();
    loop {
        let result = tokio::select! {
            incoming = ws_stream.next() => match incoming {
                Some(result) => result,
                None => break,
            },
            // The writer stops when the socket is closed from our side
            _ = &mut writer_handle => break,
        };

        match result {
            Ok(Message::Text(text)) => {
                if !rate_limiter.check_input() {
                    warn!(user_id = %user_id, "Rate limited realtime message");
                    let _ = tx.try_send(ServerEvent::error("rate_limited", "Too many messages"));
                    continue;
                }

                match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(ClientEvent::Ping { t }) => {
                        if let Err(mpsc::error::TrySendError::Closed(_)) =
                            tx.try_send(ServerEvent::Pong { t })
                        {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(user_id = %user_id, error = %e, "Failed to parse client message");
                        let _ = tx.try_send(ServerEvent::error("bad_message", "Unrecognised message"));
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                warn!(user_id = %user_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                info!(user_id = %user_id, "Client initiated close");
                break;
            }
            Err(e) => {
                debug!(user_id = %user_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    writer_handle.abort();
    state.realtime.disconnect(user_id, conn_id);
    info!(user_id = %user_id, conn_id = %conn_id, "Realtime session closed");
}

/// Send an event over WebSocket
async fn send_event(
    sink: &mut SplitSink<WebSocket, Message>,
    event: &ServerEvent,
) -> Result<(), String> {
    let json = serde_json::to_string(event).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json)).await.map_err(|e| e.to_string())
}
