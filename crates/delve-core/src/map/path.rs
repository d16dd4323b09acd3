//! A* pathfinding honoring a routing-avoid set

use core::cmp::Reverse;
use std::collections::BinaryHeap;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::{GameMap, TileFlags};
use crate::geometry::Point;

bitflags! {
    /// Hazards a pathfinder treats as impassable
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Avoid: u8 {
        const WATER = 0x01;
        const FIRE = 0x02;
        const STEAM = 0x04;
        const ICE = 0x08;
    }
}

impl Serialize for Avoid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Avoid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(Avoid::from_bits_truncate(bits))
    }
}

impl Avoid {
    /// Tile layers this avoid set rules out
    pub fn layers(&self) -> TileFlags {
        let mut flags = TileFlags::empty();
        if self.contains(Avoid::WATER) {
            flags |= TileFlags::WATER;
        }
        if self.contains(Avoid::FIRE) {
            flags |= TileFlags::FIRE;
        }
        if self.contains(Avoid::STEAM) {
            flags |= TileFlags::STEAM;
        }
        if self.contains(Avoid::ICE) {
            flags |= TileFlags::ICE;
        }
        flags
    }
}

impl GameMap {
    /// Shortest 8-connected path from `from` to `to`, excluding `from`.
    ///
    /// The destination may be blocked (it usually holds the entity being
    /// chased) but must be walkable. Returns `None` when no route exists.
    pub fn find_path(&self, from: Point, to: Point, avoid: Avoid) -> Option<Vec<Point>> {
        if !self.in_bounds(from) || !self.is_walkable(to) {
            return None;
        }
        if from == to {
            return Some(Vec::new());
        }

        let hazards = avoid.layers();
        let passable = |p: Point| {
            let flags = self.flags(p);
            flags.contains(TileFlags::WALKABLE)
                && !flags.intersects(hazards)
                && (p == to || !flags.contains(TileFlags::BLOCKED))
        };

        let size = (self.width * self.height) as usize;
        let index = |p: Point| (p.y * self.width + p.x) as usize;
        let mut cost = vec![u32::MAX; size];
        let mut came_from: Vec<Option<Point>> = vec![None; size];
        let mut open = BinaryHeap::new();

        cost[index(from)] = 0;
        // Ties break on insertion order so equal-length routes are stable.
        let mut sequence = 0u32;
        open.push(Reverse((from.chebyshev(to) as u32, sequence, from)));

        while let Some(Reverse((_, _, current))) = open.pop() {
            if current == to {
                let mut path = vec![to];
                let mut step = to;
                while let Some(prev) = came_from[index(step)] {
                    if prev == from {
                        break;
                    }
                    path.push(prev);
                    step = prev;
                }
                path.reverse();
                return Some(path);
            }

            let current_cost = cost[index(current)];
            for next in current.neighbors() {
                if !self.in_bounds(next) || !passable(next) {
                    continue;
                }
                let next_cost = current_cost + 1;
                if next_cost < cost[index(next)] {
                    cost[index(next)] = next_cost;
                    came_from[index(next)] = Some(current);
                    sequence += 1;
                    open.push(Reverse((
                        next_cost + next.chebyshev(to) as u32,
                        sequence,
                        next,
                    )));
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Rect;

    fn room() -> GameMap {
        let mut map = GameMap::new(10, 5);
        map.carve_room(Rect::new(0, 0, 9, 4));
        map
    }

    #[test]
    fn test_straight_path() {
        let map = room();
        let path = map
            .find_path(Point::new(0, 2), Point::new(4, 2), Avoid::empty())
            .unwrap();
        assert_eq!(path.len(), 4);
        assert_eq!(path.last(), Some(&Point::new(4, 2)));
    }

    #[test]
    fn test_avoid_water_column() {
        let mut map = room();
        for y in 0..5 {
            map.insert_flags(Point::new(5, y), TileFlags::WATER);
        }
        let from = Point::new(2, 2);
        let to = Point::new(8, 2);
        assert!(map.find_path(from, to, Avoid::WATER).is_none());
        assert!(map.find_path(from, to, Avoid::empty()).is_some());
    }

    #[test]
    fn test_blocked_destination_is_reachable() {
        let mut map = room();
        map.mark_blocked(Point::new(6, 2));
        let path = map
            .find_path(Point::new(2, 2), Point::new(6, 2), Avoid::empty())
            .unwrap();
        assert_eq!(path.last(), Some(&Point::new(6, 2)));
    }

    #[test]
    fn test_routes_around_blockers() {
        let mut map = room();
        for y in 0..4 {
            map.mark_blocked(Point::new(4, y));
        }
        let path = map
            .find_path(Point::new(2, 0), Point::new(6, 0), Avoid::empty())
            .unwrap();
        assert!(path.contains(&Point::new(4, 4)));
        for pair in path.windows(2) {
            assert!(pair[0].is_adjacent(pair[1]));
        }
    }
}
