//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::realtime::RealtimeHub;
use crate::store::{
    AvatarStore, FriendStore, GuildStore, InventoryStore, InviteStore, MessageStore,
    ProfileStore, SupabaseClient, WorkoutLogStore,
};
use crate::util::rate_limit::ChatRateLimiter;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub profiles: ProfileStore,
    pub guilds: GuildStore,
    pub messages: MessageStore,
    pub friends: FriendStore,
    pub invites: InviteStore,
    pub workout_logs: WorkoutLogStore,
    pub inventory: InventoryStore,
    pub avatars: AvatarStore,
    pub realtime: RealtimeHub,
    pub chat_limiter: ChatRateLimiter,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);

        // Initialize Supabase client
        let supabase = SupabaseClient::new(&config);

        Self {
            profiles: ProfileStore::new(supabase.clone()),
            guilds: GuildStore::new(supabase.clone()),
            messages: MessageStore::new(supabase.clone()),
            friends: FriendStore::new(supabase.clone()),
            invites: InviteStore::new(supabase.clone()),
            workout_logs: WorkoutLogStore::new(supabase.clone()),
            inventory: InventoryStore::new(supabase.clone()),
            avatars: AvatarStore::new(supabase, &config.avatar_bucket),
            realtime: RealtimeHub::new(),
            chat_limiter: ChatRateLimiter::new(),
            config,
        }
    }
}
