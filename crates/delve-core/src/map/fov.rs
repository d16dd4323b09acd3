//! Field of view

use super::{GameMap, TileFlags};
use crate::geometry::Point;

impl GameMap {
    /// Walls and steam block sight
    pub fn is_opaque(&self, p: Point) -> bool {
        !self.is_walkable(p) || self.has_steam(p)
    }

    /// Recompute the FOV layer from `origin`; newly seen tiles become explored
    pub fn compute_fov(&mut self, origin: Point, radius: i32) {
        for tile in &mut self.tiles {
            tile.remove(TileFlags::FOV);
        }

        if !self.in_bounds(origin) {
            return;
        }
        self.insert_flags(origin, TileFlags::FOV | TileFlags::EXPLORED);

        for dx in -radius..=radius {
            for dy in -radius..=radius {
                if dx * dx + dy * dy > radius * radius {
                    continue;
                }
                let target = origin.offset(dx, dy);
                if self.in_bounds(target) && self.has_line_of_sight(origin, target) {
                    self.insert_flags(target, TileFlags::FOV | TileFlags::EXPLORED);
                }
            }
        }
    }

    /// Bresenham line of sight; the opaque tile at the end of the line is
    /// itself visible
    pub fn has_line_of_sight(&self, from: Point, to: Point) -> bool {
        for p in from.line_to(to).into_iter().skip(1) {
            if !self.in_bounds(p) {
                return false;
            }
            if self.is_opaque(p) {
                return p == to;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::geometry::Point;
    use crate::map::{GameMap, Layer, Rect};

    #[test]
    fn test_wall_blocks_sight() {
        let mut map = GameMap::new(12, 5);
        map.carve_room(Rect::new(1, 1, 9, 2));
        // Wall column at x = 5
        for y in 0..5 {
            map.set_walkable(Point::new(5, y), false);
        }
        map.compute_fov(Point::new(2, 2), 8);

        assert!(map.is_in_fov(Point::new(4, 2)));
        assert!(map.is_in_fov(Point::new(5, 2)));
        assert!(!map.is_in_fov(Point::new(7, 2)));
        assert!(map.is_explored(Point::new(4, 2)));
    }

    #[test]
    fn test_fov_is_recomputed_but_explored_persists() {
        let mut map = GameMap::new(20, 3);
        map.carve_room(Rect::new(0, 0, 19, 2));
        map.compute_fov(Point::new(0, 1), 3);
        assert!(map.is_in_fov(Point::new(2, 1)));

        map.compute_fov(Point::new(19, 1), 3);
        assert!(!map.is_in_fov(Point::new(2, 1)));
        assert!(map.is_explored(Point::new(2, 1)));
        assert!(map.count(Layer::Fov) > 0);
    }
}
