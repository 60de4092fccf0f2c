//! Inventory management - server-side only

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::supabase::{Query, SupabaseClient, SupabaseError};

/// Row of the `inventory_items` table. `item_id` is a merchant catalog id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub item_id: String,
    #[serde(default)]
    pub is_equipped: bool,
}

/// New inventory entry for insertion
#[derive(Debug, Clone, Serialize)]
struct NewInventoryEntry<'a> {
    user_id: Uuid,
    item_id: &'a str,
    is_equipped: bool,
}

#[derive(Serialize)]
struct EquipUpdate {
    is_equipped: bool,
}

/// Inventory store operations
#[derive(Clone)]
pub struct InventoryStore {
    client: SupabaseClient,
}

impl InventoryStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// Get all inventory entries for a user
    pub async fn list_for(&self, user_id: Uuid) -> Result<Vec<InventoryEntry>, SupabaseError> {
        let query = Query::new().eq("user_id", user_id);
        self.client.get("inventory_items", &query).await
    }

    /// Grant an item to a user. Duplicate purchases are separate entries.
    pub async fn grant(&self, user_id: Uuid, item_id: &str) -> Result<InventoryEntry, SupabaseError> {
        let entry = NewInventoryEntry {
            user_id,
            item_id,
            is_equipped: false,
        };
        self.client.insert("inventory_items", &entry).await
    }

    /// Set the equipped flag of one of the user's entries
    pub async fn set_equipped(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        is_equipped: bool,
    ) -> Result<(), SupabaseError> {
        let query = Query::new().eq("id", entry_id).eq("user_id", user_id);
        self.client
            .update("inventory_items", &query, &EquipUpdate { is_equipped })
            .await
    }
}
