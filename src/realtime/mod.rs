//! Push channel for chat, social notifications and guild news

pub mod handler;
pub mod hub;
pub mod protocol;

pub use hub::RealtimeHub;
pub use protocol::ServerEvent;
