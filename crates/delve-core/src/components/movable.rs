//! Movement
//!
//! Invalid destinations are rejected silently: monsters probe walls and water
//! all the time and a refused step is not an error.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::entity::EntityId;
use crate::geometry::Point;
use crate::map::{Avoid, GameMap};
use crate::world::World;

/// Can change position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movable {
    /// Hazards pathfinding treats as impassable
    pub avoid: Avoid,
}

impl Movable {
    pub const fn new(avoid: Avoid) -> Self {
        Self { avoid }
    }

    /// Whether a tile accepts this mover: walkable, not blocked, and not
    /// water when water is avoided
    pub fn can_enter(&self, map: &GameMap, to: Point) -> bool {
        map.is_walkable(to)
            && !map.is_blocked(to)
            && !(map.is_water(to) && self.avoid.contains(Avoid::WATER))
    }

    /// Where a `(dx, dy)` step from `from` would land, if anywhere.
    /// Stepping onto free ice slides one extra tile when that tile is free.
    pub fn destination(&self, map: &GameMap, from: Point, dx: i32, dy: i32) -> Option<Point> {
        let step = from.offset(dx, dy);
        if !self.can_enter(map, step) {
            return None;
        }
        let slide = step.offset(dx, dy);
        if map.is_ice(step) && self.can_enter(map, slide) {
            return Some(slide);
        }
        Some(step)
    }
}

impl World {
    /// Move an entity to `to` if its movable accepts the tile.
    ///
    /// The blocked flag and the position index move with the entity in one
    /// step; no state is observable where both or neither tile is blocked.
    pub fn set_position_if_able(&mut self, id: EntityId, to: Point) -> bool {
        let Some(entity) = self.get(id) else {
            return false;
        };
        let Some(movable) = entity.components.movable else {
            return false;
        };
        let (from, blocks) = (entity.pos, entity.blocks);
        if from == to || !movable.can_enter(&self.map, to) {
            return false;
        }

        if blocks {
            self.map.move_blocker(from, to);
        }
        self.map.index_move(from, to, id);
        if let Some(entity) = self.get_mut(id) {
            entity.pos = to;
        }
        true
    }

    /// Step by `(dx, dy)`, sliding across ice
    pub fn move_by(&mut self, id: EntityId, dx: i32, dy: i32) -> bool {
        let Some(entity) = self.get(id) else {
            return false;
        };
        let Some(movable) = entity.components.movable else {
            return false;
        };
        let from = entity.pos;
        let step = from.offset(dx, dy);
        if !movable.can_enter(&self.map, step) {
            return false;
        }
        if self.map.is_ice(step) && self.set_position_if_able(id, step.offset(dx, dy)) {
            debug!(entity = id.0, ?from, "slid across ice");
            return true;
        }
        self.set_position_if_able(id, step)
    }

    /// Take one step along the shortest path to `target`.
    ///
    /// Routes around the avoid set first and falls back to an unrestricted
    /// path when that fails.
    pub fn move_towards(&mut self, id: EntityId, target: Point) -> bool {
        let Some(entity) = self.get(id) else {
            return false;
        };
        let Some(movable) = entity.components.movable else {
            return false;
        };
        let from = entity.pos;

        let path = self
            .map
            .find_path(from, target, movable.avoid)
            .or_else(|| {
                if movable.avoid.is_empty() {
                    return None;
                }
                warn!(entity = id.0, ?from, ?target, "no safe path, ignoring avoid set");
                self.map.find_path(from, target, Avoid::empty())
            });

        match path.as_deref() {
            Some([step, ..]) => {
                let (dx, dy) = (step.x - from.x, step.y - from.y);
                self.move_by(id, dx, dy)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Color, Entity, RenderOrder};
    use crate::map::{Rect, TileFlags};

    fn walker(pos: Point, avoid: Avoid) -> Entity {
        Entity::new("walker", pos, 'w', Color::WHITE, true, RenderOrder::Actor)
            .with(Movable::new(avoid))
    }

    fn world() -> World {
        let mut map = GameMap::new(8, 5);
        map.carve_room(Rect::new(1, 1, 5, 2));
        World::new(map)
    }

    #[test]
    fn test_move_updates_blocked_and_index() {
        let mut world = world();
        let id = world.spawn(walker(Point::new(1, 1), Avoid::empty()));
        assert!(world.move_by(id, 1, 0));
        assert!(!world.map.is_blocked(Point::new(1, 1)));
        assert!(world.map.is_blocked(Point::new(2, 1)));
        assert_eq!(world.map.entities_at(Point::new(2, 1)), &[id]);
        assert!(world.map.entities_at(Point::new(1, 1)).is_empty());
    }

    #[test]
    fn test_move_into_wall_is_silent_noop() {
        let mut world = world();
        let id = world.spawn(walker(Point::new(1, 1), Avoid::empty()));
        assert!(!world.move_by(id, -1, 0));
        assert_eq!(world.get(id).map(|e| e.pos), Some(Point::new(1, 1)));
        assert!(world.map.is_blocked(Point::new(1, 1)));
    }

    #[test]
    fn test_move_into_blocker_is_refused() {
        let mut world = world();
        let a = world.spawn(walker(Point::new(1, 1), Avoid::empty()));
        world.spawn(walker(Point::new(2, 1), Avoid::empty()));
        assert!(!world.move_by(a, 1, 0));
    }

    #[test]
    fn test_ice_under_a_blocker_stops_the_slide() {
        let mut world = world();
        world.map.insert_flags(Point::new(2, 1), TileFlags::ICE);
        let a = world.spawn(walker(Point::new(1, 1), Avoid::empty()));
        let b = world.spawn(walker(Point::new(2, 1), Avoid::empty()));
        let movable = world.get(a).and_then(|e| e.components.movable).unwrap();

        assert_eq!(movable.destination(&world.map, Point::new(1, 1), 1, 0), None);
        assert!(!world.move_by(a, 1, 0));
        assert_eq!(world.get(a).map(|e| e.pos), Some(Point::new(1, 1)));
        assert_eq!(world.get(b).map(|e| e.pos), Some(Point::new(2, 1)));
        assert!(world.map.entities_at(Point::new(3, 1)).is_empty());
    }

    #[test]
    fn test_move_towards_steps_once() {
        let mut world = world();
        let id = world.spawn(walker(Point::new(1, 1), Avoid::empty()));
        let target = Point::new(6, 1);
        assert!(world.move_towards(id, target));
        let pos = world.get(id).map(|e| e.pos).unwrap();
        assert_eq!(pos.x, 2);
        assert_eq!(pos.chebyshev(target), 4);
        assert_eq!(world.map.count(crate::map::Layer::Blocked), 1);
    }
}
