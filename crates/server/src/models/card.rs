use serde::Serialize;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileCard {
    pub id: String,
    pub user_id: String,
    pub rarity: String,
    pub name: String,
    pub image_url: Option<String>,
    pub created_at: String,
}

/// A card in a user's collection, joined with its catalog entry.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CollectedCard {
    pub card_id: String,
    pub name: String,
    pub rarity: String,
    pub image_url: Option<String>,
    pub quantity: i64,
    pub showcased: i64,
    pub obtained_at: String,
}
