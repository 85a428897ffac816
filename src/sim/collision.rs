//! Spatial collision resolver
//!
//! Movers are circles; obstacles are circles (objects, bosses, the player)
//! or axis-aligned rectangles (walls). Overlap is tested against a snapshot
//! of obstacles gathered for the current phase of the tick. Blocked moves
//! slide: full displacement first, then x alone, then y alone.

use glam::Vec2;

use super::entity::{BossBrain, EntityKind, EntityRef};
use super::geometry::Rect;
use super::state::GameState;
use crate::EntityId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle { center: Vec2, radius: f32 },
    Rect(Rect),
}

impl Shape {
    /// Whether a circle at `pos` overlaps this shape
    pub fn overlaps(&self, pos: Vec2, radius: f32) -> bool {
        match *self {
            Shape::Circle { center, radius: r } => {
                let reach = radius + r;
                pos.distance_squared(center) < reach * reach
            }
            Shape::Rect(rect) => rect.overlaps_circle(pos, radius),
        }
    }
}

/// What an obstacle is, for callers reacting to being blocked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    Wall,
    Object,
    Boss,
    Player,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub id: EntityId,
    pub kind: ObstacleKind,
    pub shape: Shape,
    /// Touching it inflicts contact damage (forest wolf)
    pub hazard: bool,
}

impl Obstacle {
    /// The entity behind this obstacle, if it is not a wall
    pub fn entity_ref(&self) -> Option<EntityRef> {
        let kind = match self.kind {
            ObstacleKind::Wall => return None,
            ObstacleKind::Object => EntityKind::Object,
            ObstacleKind::Boss => EntityKind::Boss,
            ObstacleKind::Player => EntityKind::Player,
        };
        Some(EntityRef::new(kind, self.id))
    }
}

/// Which obstacle categories a mover collides with
#[derive(Debug, Clone, Copy)]
pub struct ObstacleMask {
    pub walls: bool,
    pub objects: bool,
    pub bosses: bool,
    pub player: bool,
}

impl ObstacleMask {
    pub const ALL: Self = Self {
        walls: true,
        objects: true,
        bosses: true,
        player: true,
    };
    pub const STATIC: Self = Self {
        walls: true,
        objects: true,
        bosses: false,
        player: false,
    };
    pub const WALLS: Self = Self {
        walls: true,
        objects: false,
        bosses: false,
        player: false,
    };
}

/// Outcome of a sliding move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideResult {
    pub pos: Vec2,
    /// First obstacle that stopped the full displacement
    pub blocked_by: Option<Obstacle>,
}

/// Obstacles gathered once and queried many times
#[derive(Debug, Clone, Default)]
pub struct ObstacleSet {
    pub obstacles: Vec<Obstacle>,
}

impl ObstacleSet {
    /// Snapshot the solid, living entities selected by `mask`
    pub fn gather(state: &GameState, mask: ObstacleMask) -> Self {
        let mut obstacles = Vec::new();

        if mask.walls {
            obstacles.extend(state.walls.iter().map(|wall| Obstacle {
                id: wall.id,
                kind: ObstacleKind::Wall,
                shape: Shape::Rect(wall.rect),
                hazard: false,
            }));
        }
        if mask.objects {
            obstacles.extend(
                state
                    .objects
                    .iter()
                    .filter(|o| o.actor.solid && o.actor.is_alive())
                    .map(|o| Obstacle {
                        id: o.id,
                        kind: ObstacleKind::Object,
                        shape: Shape::Circle {
                            center: o.actor.pos,
                            radius: o.actor.radius,
                        },
                        hazard: false,
                    }),
            );
        }
        if mask.bosses {
            obstacles.extend(
                state
                    .bosses
                    .iter()
                    .filter(|b| b.actor.solid && b.actor.is_alive())
                    .map(|b| Obstacle {
                        id: b.id,
                        kind: ObstacleKind::Boss,
                        shape: Shape::Circle {
                            center: b.actor.pos,
                            radius: b.actor.radius,
                        },
                        hazard: matches!(b.brain, BossBrain::Territorial(_)),
                    }),
            );
        }
        if mask.player && state.player.actor.is_alive() {
            obstacles.push(Obstacle {
                id: state.player.id,
                kind: ObstacleKind::Player,
                shape: Shape::Circle {
                    center: state.player.actor.pos,
                    radius: state.player.actor.radius,
                },
                hazard: false,
            });
        }

        Self { obstacles }
    }

    pub fn check(&self, pos: Vec2, radius: f32, ignore: Option<EntityId>) -> Option<&Obstacle> {
        check_collision(pos, radius, ignore, &self.obstacles)
    }

    pub fn slide(&self, from: Vec2, delta: Vec2, radius: f32, ignore: Option<EntityId>) -> SlideResult {
        resolve_slide(from, delta, radius, ignore, &self.obstacles)
    }

    /// Every hazard a circle at `pos` touches, whatever else blocks it
    pub fn hazards_touching(&self, pos: Vec2, radius: f32) -> Vec<EntityId> {
        self.obstacles
            .iter()
            .filter(|o| o.hazard && o.shape.overlaps(pos, radius))
            .map(|o| o.id)
            .collect()
    }
}

/// First obstacle overlapping a circle at `pos`, skipping `ignore`
pub fn check_collision(
    pos: Vec2,
    radius: f32,
    ignore: Option<EntityId>,
    obstacles: &[Obstacle],
) -> Option<&Obstacle> {
    obstacles
        .iter()
        .filter(|o| Some(o.id) != ignore)
        .find(|o| o.shape.overlaps(pos, radius))
}

/// Move a circle by `delta`, sliding along whatever blocks it
pub fn resolve_slide(
    from: Vec2,
    delta: Vec2,
    radius: f32,
    ignore: Option<EntityId>,
    obstacles: &[Obstacle],
) -> SlideResult {
    let full = from + delta;
    let Some(blocker) = check_collision(full, radius, ignore, obstacles).copied() else {
        return SlideResult {
            pos: full,
            blocked_by: None,
        };
    };

    let candidates = [from + Vec2::new(delta.x, 0.0), from + Vec2::new(0.0, delta.y)];
    let pos = candidates
        .into_iter()
        .filter(|&p| p != from)
        .find(|&p| check_collision(p, radius, ignore, obstacles).is_none())
        .unwrap_or(from);

    SlideResult {
        pos,
        blocked_by: Some(blocker),
    }
}
