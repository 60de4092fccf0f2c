//! Merchant and inventory endpoints

use axum::{
    extract::{Extension, Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::app::AppState;
use crate::http::error::AppError;
use crate::http::middleware::AuthenticatedUser;
use crate::http::profile::current_profile;
use crate::shop::{check_purchase, find_item, listing, plan_toggle, ShopError, ShopItem, ShopListing};
use crate::store::inventory::InventoryEntry;
use crate::store::profiles::UserProfile;

#[derive(Serialize)]
pub struct ShopResponse {
    gold: u32,
    level: u32,
    items: Vec<ShopListing>,
}

pub async fn shop_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<ShopResponse>, AppError> {
    let profile = current_profile(&state, &auth).await?;
    Ok(Json(ShopResponse {
        gold: profile.gold,
        level: profile.level,
        items: listing(profile.level, profile.gold),
    }))
}

/// An owned entry with its catalog details
#[derive(Serialize)]
pub struct InventoryItem {
    id: Uuid,
    is_equipped: bool,
    #[serde(flatten)]
    item: &'static ShopItem,
}

fn with_details(entries: Vec<InventoryEntry>) -> Vec<InventoryItem> {
    entries
        .into_iter()
        .filter_map(|entry| {
            find_item(&entry.item_id).map(|item| InventoryItem {
                id: entry.id,
                is_equipped: entry.is_equipped,
                item,
            })
        })
        .collect()
}

pub async fn inventory_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<InventoryItem>>, AppError> {
    let entries = state.inventory.list_for(auth.user_id).await?;
    Ok(Json(with_details(entries)))
}

#[derive(Deserialize)]
pub struct BuyRequest {
    item_id: String,
}

#[derive(Serialize)]
pub struct BuyResponse {
    profile: UserProfile,
    item: InventoryItem,
}

pub async fn buy_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(req): Json<BuyRequest>,
) -> Result<Json<BuyResponse>, AppError> {
    let item = find_item(&req.item_id).ok_or_else(|| ShopError::UnknownItem(req.item_id.clone()))?;
    let profile = current_profile(&state, &auth).await?;
    let remaining = check_purchase(profile.level, profile.gold, item)?;

    let profile = state
        .profiles
        .swap_gold(auth.user_id, profile.gold, remaining)
        .await?
        .ok_or_else(|| AppError::Conflict("Gold changed, please try again".to_string()))?;

    let entry = match state.inventory.grant(auth.user_id, item.id).await {
        Ok(entry) => entry,
        Err(e) => {
            // Give the gold back before surfacing the failure
            match state.profiles.credit_gold(auth.user_id, item.price).await {
                Ok(Some(_)) => {}
                Ok(None) => {
                    error!(user_id = %auth.user_id, price = item.price, "Refund did not land, profile kept changing");
                }
                Err(refund_err) => {
                    error!(user_id = %auth.user_id, error = %refund_err, "Failed to refund purchase");
                }
            }
            return Err(e.into());
        }
    };

    info!(user_id = %auth.user_id, item_id = item.id, price = item.price, "Item purchased");
    Ok(Json(BuyResponse {
        profile,
        item: InventoryItem {
            id: entry.id,
            is_equipped: entry.is_equipped,
            item,
        },
    }))
}

pub async fn toggle_equip_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(entry_id): Path<Uuid>,
) -> Result<Json<Vec<InventoryItem>>, AppError> {
    let mut entries = state.inventory.list_for(auth.user_id).await?;
    let plan = plan_toggle(&entries, entry_id)?;

    for id in &plan.unequip {
        state.inventory.set_equipped(auth.user_id, *id, false).await?;
    }
    if let Some(id) = plan.equip {
        state.inventory.set_equipped(auth.user_id, id, true).await?;
    }

    for entry in entries.iter_mut() {
        if plan.unequip.contains(&entry.id) {
            entry.is_equipped = false;
        }
        if plan.equip == Some(entry.id) {
            entry.is_equipped = true;
        }
    }
    info!(user_id = %auth.user_id, entry_id = %entry_id, equipped = plan.equip.is_some(), "Equipment toggled");
    Ok(Json(with_details(entries)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_catalog_ids_are_hidden() {
        let entries = vec![
            InventoryEntry {
                id: Uuid::new_v4(),
                user_id: Uuid::nil(),
                item_id: "s-2".to_string(),
                is_equipped: true,
            },
            InventoryEntry {
                id: Uuid::new_v4(),
                user_id: Uuid::nil(),
                item_id: "retired".to_string(),
                is_equipped: false,
            },
        ];
        let items = with_details(entries);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item.name, "Iron Belt");
        assert!(items[0].is_equipped);
    }
}
