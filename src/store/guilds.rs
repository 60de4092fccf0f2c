//! Guilds and their member counters

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::supabase::{Query, SupabaseClient, SupabaseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuildIcon {
    Shield,
    Sword,
    Crown,
    Zap,
}

/// Row of the `guilds` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guild {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_members")]
    pub members: u32,
    #[serde(default = "default_max_members")]
    pub max_members: u32,
    #[serde(default)]
    pub total_xp: u64,
    #[serde(default = "default_rank")]
    pub rank: u32,
    pub icon: GuildIcon,
}

fn default_members() -> u32 {
    1
}

fn default_max_members() -> u32 {
    50
}

fn default_rank() -> u32 {
    999
}

impl Guild {
    pub fn is_full(&self) -> bool {
        self.members >= self.max_members
    }
}

#[derive(Serialize)]
struct GuildParam {
    guild_id_param: Uuid,
}

#[derive(Clone)]
pub struct GuildStore {
    client: SupabaseClient,
}

impl GuildStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// All guilds, highest total XP first
    pub async fn list(&self) -> Result<Vec<Guild>, SupabaseError> {
        let query = Query::new().select("*").order("total_xp", false);
        self.client.get("guilds", &query).await
    }

    pub async fn get(&self, guild_id: Uuid) -> Result<Option<Guild>, SupabaseError> {
        let query = Query::new().eq("id", guild_id);
        self.client.get_one("guilds", &query).await
    }

    pub async fn count(&self) -> Result<usize, SupabaseError> {
        self.client.count("guilds", &Query::new()).await
    }

    pub async fn create(&self, guild: &Guild) -> Result<Guild, SupabaseError> {
        self.client.insert("guilds", guild).await
    }

    pub async fn increment_members(&self, guild_id: Uuid) -> Result<(), SupabaseError> {
        self.client
            .rpc(
                "increment_guild_member",
                &GuildParam {
                    guild_id_param: guild_id,
                },
            )
            .await
    }

    pub async fn decrement_members(&self, guild_id: Uuid) -> Result<(), SupabaseError> {
        self.client
            .rpc(
                "decrement_guild_member",
                &GuildParam {
                    guild_id_param: guild_id,
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_rows_get_defaults() {
        let row = serde_json::json!({
            "id": Uuid::nil(),
            "name": "Iron Legion",
            "icon": "shield"
        });
        let guild: Guild = serde_json::from_value(row).unwrap();
        assert_eq!(guild.members, 1);
        assert_eq!(guild.max_members, 50);
        assert_eq!(guild.rank, 999);
        assert!(!guild.is_full());
    }

    #[test]
    fn full_when_members_reach_capacity() {
        let guild = Guild {
            id: Uuid::nil(),
            name: "Morning Crew".to_string(),
            description: String::new(),
            members: 20,
            max_members: 20,
            total_xp: 112_000,
            rank: 2,
            icon: GuildIcon::Zap,
        };
        assert!(guild.is_full());
    }
}
