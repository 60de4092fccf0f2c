//! Data store modules for Supabase integration

pub mod avatars;
pub mod friends;
pub mod guilds;
pub mod inventory;
pub mod invites;
pub mod messages;
pub mod profiles;
pub mod supabase;
pub mod workout_logs;

pub use avatars::AvatarStore;
pub use friends::FriendStore;
pub use guilds::GuildStore;
pub use inventory::InventoryStore;
pub use invites::InviteStore;
pub use messages::MessageStore;
pub use profiles::ProfileStore;
pub use supabase::{SupabaseClient, SupabaseError};
pub use workout_logs::WorkoutLogStore;
