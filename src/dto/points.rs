use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One (player, points) pair inside a bulk upsert.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PlayerPointsUpdate {
    /// Player the override applies to.
    pub player_id: String,
    /// Contest-scoped points value. Must be finite.
    pub points: f64,
}

/// Payload upserting per-contest points overrides for a batch of players.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertPlayerPointsRequest {
    /// Pairs to upsert; one override per (player, contest).
    pub updates: Vec<PlayerPointsUpdate>,
}

/// Override joined with player display data. Display fields are empty when
/// the player record no longer exists.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerPointsItem {
    /// Player the override applies to.
    pub player_id: String,
    /// Player display name, if the player still exists.
    pub name: Option<String>,
    /// Player's real-world team, if known.
    pub team: Option<String>,
    /// Contest-scoped points value.
    pub points: f64,
    /// Last upsert timestamp (IST).
    pub updated_at: String,
}
