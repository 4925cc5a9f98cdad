//! Flanking and other grid questions asked while building an attack.
//!
//! Only square-grid coordinates are used. Distances are Chebyshev (a
//! diagonal step is one square), matching [`GridPosition::distance`].

use crate::world::{EntityId, GridPosition, Token};
use std::collections::HashSet;

/// Name of an ally flanking `target` with `attacker`, if there is one.
///
/// The attacker must be adjacent to the target. A flanking ally is on the
/// attacker's side, not incapacitated, adjacent to the target, and on the
/// opposing side of it: the ally's offset from the target points away from
/// the attacker's offset (their dot product is negative). The first such
/// token in `tokens` order wins.
pub fn check_flanking(
    attacker: &Token,
    target: &Token,
    tokens: &[Token],
    incapacitated: &HashSet<EntityId>,
) -> Option<String> {
    if !attacker.position.is_within_5ft(target.position) || attacker.position == target.position {
        return None;
    }
    let attacker_offset = attacker.position.offset_from(target.position);

    tokens
        .iter()
        .filter(|t| t.id != attacker.id && t.id != target.id)
        .filter(|t| t.side == attacker.side)
        .filter(|t| !incapacitated.contains(&t.id))
        .filter(|t| t.position.is_within_5ft(target.position) && t.position != target.position)
        .find(|t| is_opposite(attacker_offset, t.position.offset_from(target.position)))
        .map(|t| t.name.clone())
}

fn is_opposite(a: (i32, i32), b: (i32, i32)) -> bool {
    a.0 * b.0 + a.1 * b.1 < 0
}

/// Whether any conscious enemy of `attacker` stands within 5 ft of it.
pub fn any_enemy_within_5ft(
    attacker: &Token,
    tokens: &[Token],
    incapacitated: &HashSet<EntityId>,
) -> bool {
    tokens.iter().any(|t| {
        t.id != attacker.id
            && t.side.is_enemy_of(attacker.side)
            && !incapacitated.contains(&t.id)
            && t.position.is_within_5ft(attacker.position)
    })
}

/// Distance in feet between two squares.
pub fn distance_feet(a: GridPosition, b: GridPosition) -> u32 {
    a.distance(b) * 5
}
