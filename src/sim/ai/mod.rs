//! Actor AI, one module per category
//!
//! Each update reads a per-tick snapshot of candidate targets, moves its own
//! pool in place and collects damage intents. Intents are applied through
//! `combat` only after the pool borrow ends, and every victim is re-resolved
//! at that point.

pub mod boss;
pub mod hostile;
pub mod minion;
pub mod pet;

use glam::Vec2;

use super::geometry::{Wall, line_obstructed};
use super::state::{GameState, Resolved};

/// Run every AI category in tick order
pub fn update(state: &mut GameState, dt_ms: f64) {
    hostile::update_hostiles(state, dt_ms);
    boss::update_bosses(state, dt_ms);
    minion::update_minions(state, dt_ms);
    pet::update_pet(state, dt_ms);
}

/// Nearest candidate within `range` (unlimited when `None`) that `from` can see
///
/// Occluded candidates are discarded outright, however close they are.
pub fn nearest_visible(
    from: Vec2,
    range: Option<f32>,
    candidates: &[Resolved],
    walls: &[Wall],
) -> Option<Resolved> {
    candidates
        .iter()
        .map(|c| (c, from.distance(c.pos)))
        .filter(|(_, d)| range.is_none_or(|r| *d <= r))
        .filter(|(c, _)| !line_obstructed(from, c.pos, walls))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(c, _)| *c)
}

/// Displacement toward `to` for one step, never overshooting it
pub fn step_toward(from: Vec2, to: Vec2, speed: f32, scale: f32) -> Vec2 {
    let offset = to - from;
    let dist = offset.length();
    if dist <= f32::EPSILON {
        return Vec2::ZERO;
    }
    offset / dist * (speed * scale).min(dist)
}

/// Displacement directly away from `from`
pub fn step_away(pos: Vec2, from: Vec2, speed: f32, scale: f32) -> Vec2 {
    (pos - from).normalize_or_zero() * speed * scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EntityId;
    use crate::sim::entity::{EntityKind, EntityRef};
    use crate::sim::geometry::Rect;

    fn candidate(id: u32, pos: Vec2) -> Resolved {
        Resolved {
            target: EntityRef::new(EntityKind::Undead, EntityId(id)),
            pos,
            radius: 8.0,
        }
    }

    #[test]
    fn test_occluded_candidate_is_ignored() {
        let walls = vec![Wall {
            id: EntityId(50),
            rect: Rect::new(40.0, -100.0, 15.0, 200.0),
            tier: 1,
        }];
        let near_blocked = candidate(1, Vec2::new(60.0, 0.0));
        let far_clear = candidate(2, Vec2::new(-150.0, 0.0));

        let picked = nearest_visible(Vec2::ZERO, Some(250.0), &[near_blocked, far_clear], &walls);
        assert_eq!(picked.map(|r| r.target.id), Some(EntityId(2)));

        let picked = nearest_visible(Vec2::ZERO, Some(100.0), &[near_blocked, far_clear], &walls);
        assert!(picked.is_none());

        let picked = nearest_visible(Vec2::ZERO, Some(100.0), &[near_blocked, far_clear], &[]);
        assert_eq!(picked.map(|r| r.target.id), Some(EntityId(1)));
    }

    #[test]
    fn test_unlimited_range() {
        let far = candidate(3, Vec2::new(9000.0, 0.0));
        assert!(nearest_visible(Vec2::ZERO, None, &[far], &[]).is_some());
    }

    #[test]
    fn test_step_does_not_overshoot() {
        let step = step_toward(Vec2::ZERO, Vec2::new(1.0, 0.0), 4.0, 1.0);
        assert_eq!(step, Vec2::new(1.0, 0.0));
        assert_eq!(step_toward(Vec2::ONE, Vec2::ONE, 4.0, 1.0), Vec2::ZERO);
    }
}
