//! Per-contest points overrides and the conditional mirror into the player's
//! global points field. Overrides are authoritative per (player, contest);
//! the mirror only runs for full contests and is best-effort per player.

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    dao::models::{ContestType, PlayerEntity, PlayerPointsEntity},
    dto::points::{PlayerPointsItem, PlayerPointsUpdate},
    error::ServiceError,
    ist::{format_ist, now_ist},
    services::{
        contest_service::resolve_contest,
        side_effects::{DegradedWrite, MutationOutcome},
    },
    state::SharedState,
};

fn shape_item(points: &PlayerPointsEntity, player: Option<&PlayerEntity>) -> PlayerPointsItem {
    PlayerPointsItem {
        player_id: points.player_id.to_string(),
        name: player.map(|p| p.name.clone()),
        team: player.and_then(|p| p.team.clone()),
        points: points.points,
        updated_at: format_ist(points.updated_at),
    }
}

/// Every override recorded for a contest, joined with player display data.
/// Overrides whose player has since been deleted are still returned, with the
/// display fields empty.
pub async fn get_contest_points(
    state: &SharedState,
    contest_id: Uuid,
) -> Result<Vec<PlayerPointsItem>, ServiceError> {
    let store = state.require_entity_store().await?;
    resolve_contest(&store, contest_id).await?;

    let overrides = store.list_contest_points(contest_id).await?;
    let player_ids: Vec<Uuid> = overrides.iter().map(|p| p.player_id).collect();
    let players: HashMap<Uuid, PlayerEntity> = store
        .find_players(player_ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    Ok(overrides
        .iter()
        .map(|points| shape_item(points, players.get(&points.player_id)))
        .collect())
}

/// Upsert a batch of overrides for a contest.
///
/// The whole batch is validated before the first write: every id must parse
/// and every value must be finite. After that the overrides are written one
/// document at a time; for full contests each value is also mirrored into the
/// player's global points field, best-effort. An override for a player that
/// does not exist is still persisted (the mirror has nowhere to go and is
/// skipped), matching how reads tolerate orphaned overrides.
pub async fn upsert_contest_points(
    state: &SharedState,
    contest_id: Uuid,
    updates: Vec<PlayerPointsUpdate>,
) -> Result<MutationOutcome<Vec<PlayerPointsItem>>, ServiceError> {
    let store = state.require_entity_store().await?;
    let contest = resolve_contest(&store, contest_id).await?;

    let mut parsed: Vec<(Uuid, f64)> = Vec::with_capacity(updates.len());
    for update in &updates {
        let player_id = Uuid::parse_str(&update.player_id).map_err(|_| {
            ServiceError::InvalidInput(format!("invalid player id: {}", update.player_id))
        })?;
        if !update.points.is_finite() {
            return Err(ServiceError::InvalidInput(format!(
                "points for player {player_id} must be finite"
            )));
        }
        parsed.push((player_id, update.points));
    }

    let mut players: HashMap<Uuid, PlayerEntity> = store
        .find_players(parsed.iter().map(|(id, _)| *id).collect())
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let mirror = contest.contest_type == ContestType::Full;
    let mut items = Vec::with_capacity(parsed.len());
    let mut degraded = Vec::new();
    for (player_id, value) in parsed {
        let now = now_ist();
        let points = match store.find_contest_points(contest_id, player_id).await? {
            Some(mut existing) => {
                existing.points = value;
                existing.updated_at = now;
                store.save_contest_points(existing.clone()).await?;
                existing
            }
            None => {
                let fresh = PlayerPointsEntity {
                    id: Uuid::new_v4(),
                    contest_id,
                    player_id,
                    points: value,
                    updated_at: now,
                };
                store.insert_contest_points(fresh.clone()).await?;
                fresh
            }
        };

        if mirror && let Some(player) = players.get_mut(&player_id) {
            player.points = value;
            player.updated_at = now;
            if let Err(err) = store.save_player(player.clone()).await {
                degraded.push(DegradedWrite::new(
                    format!("player {player_id} points mirror"),
                    &err,
                ));
            }
        }

        items.push(shape_item(&points, players.get(&player_id)));
    }

    Ok(MutationOutcome {
        value: items,
        degraded,
    })
}
