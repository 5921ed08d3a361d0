//! Score accounting: point deltas, progress counters, and redistribution of a
//! departing player's points.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{SessionError, SessionResult};
use crate::player::{Player, PlayerId, ProgressKind};
use crate::registry::PlayerRegistry;

/// Kind applied to every redistribution delta.
pub const REDISTRIBUTION_KIND: ProgressKind = ProgressKind::Challenge;

/// Point award for a single player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointDelta {
    pub player_id: PlayerId,
    pub delta: u64,
}

/// Deltas produced by one redistribution, stored inline for typical rosters.
pub type DeltaSet = SmallVec<[PointDelta; 8]>;

/// Award `delta` points to a player and bump the counter matching `kind`.
///
/// Nothing is written unless every check passes.
///
/// # Errors
///
/// Returns [`SessionError::Validation`] for a negative delta or counter overflow,
/// and [`SessionError::NotFound`] for an unknown player.
pub fn apply_points(
    registry: &mut PlayerRegistry,
    player_id: PlayerId,
    delta: i64,
    kind: ProgressKind,
) -> SessionResult<Player> {
    let delta = u64::try_from(delta)
        .map_err(|_| SessionError::validation(format!("point delta must be >= 0 (got {delta})")))?;
    let player = registry
        .get_mut(player_id)
        .ok_or(SessionError::NotFound(player_id))?;

    let points = player
        .points
        .checked_add(delta)
        .ok_or_else(|| SessionError::validation("point total overflow"))?;
    let completed = player
        .completed(kind)
        .checked_add(1)
        .ok_or_else(|| SessionError::validation(format!("{} counter overflow", kind.label())))?;

    player.points = points;
    match kind {
        ProgressKind::Drink => player.drinks_completed = completed,
        ProgressKind::Challenge => player.challenges_completed = completed,
    }
    log::debug!(
        "{} +{delta} ({}) -> {} points",
        player.id,
        kind.label(),
        player.points
    );
    Ok(player.clone())
}

/// Split a departing player's points evenly across the remaining roster.
///
/// The share is `floor(points / remaining)`; the remainder is discarded. No
/// deltas are produced when nobody remains or the share rounds down to zero.
/// Output order follows `remaining`, so identical rosters always produce
/// identical sequences.
#[must_use]
pub fn redistribute(removed: &Player, remaining: &[Player]) -> DeltaSet {
    let Ok(count) = u64::try_from(remaining.len()) else {
        return DeltaSet::new();
    };
    if count == 0 {
        return DeltaSet::new();
    }
    let per_player = removed.points / count;
    if per_player == 0 {
        return DeltaSet::new();
    }
    remaining
        .iter()
        .map(|player| PointDelta {
            player_id: player.id,
            delta: per_player,
        })
        .collect()
}

/// Points lost to integer division when `removed` leaves `remaining` players.
#[must_use]
pub fn redistribution_remainder(removed: &Player, remaining: usize) -> u64 {
    match u64::try_from(remaining) {
        Ok(0) | Err(_) => removed.points,
        Ok(count) => removed.points % count,
    }
}

/// Convert a redistribution delta into the signed form [`apply_points`] accepts.
///
/// # Errors
///
/// Returns [`SessionError::Validation`] when the delta does not fit in `i64`.
pub fn signed_delta(delta: &PointDelta) -> SessionResult<i64> {
    i64::try_from(delta.delta)
        .map_err(|_| SessionError::validation(format!("delta {} too large", delta.delta)))
}
