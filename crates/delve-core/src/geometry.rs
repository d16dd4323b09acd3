//! Grid geometry: points, the eight compass directions, distances and lines

use core::ops::Add;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// A tile coordinate
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Chebyshev (L-infinity) distance
    pub fn chebyshev(self, other: Point) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Squared Euclidean (L2) distance
    pub fn distance_sq(self, other: Point) -> i32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// True when the two points touch, diagonals included
    pub fn is_adjacent(self, other: Point) -> bool {
        self.chebyshev(other) == 1
    }

    /// The eight surrounding tiles, clockwise from north
    pub fn neighbors(self) -> [Point; 8] {
        Direction::ALL.map(|dir| self + dir)
    }

    /// Direction of the first step from `self` towards `other`
    pub fn direction_to(self, other: Point) -> Option<Direction> {
        Direction::from_delta((other.x - self.x).signum(), (other.y - self.y).signum())
    }

    /// Bresenham line from `self` to `to`, both endpoints included
    pub fn line_to(self, to: Point) -> Vec<Point> {
        let mut points = Vec::new();
        let (mut x, mut y) = (self.x, self.y);
        let dx = (to.x - x).abs();
        let dy = -(to.y - y).abs();
        let sx = if x < to.x { 1 } else { -1 };
        let sy = if y < to.y { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            points.push(Point::new(x, y));
            if x == to.x && y == to.y {
                return points;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }
}

impl Add<Direction> for Point {
    type Output = Point;

    fn add(self, dir: Direction) -> Point {
        let (dx, dy) = dir.delta();
        self.offset(dx, dy)
    }
}

/// Compass directions, declared clockwise from north
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Get the delta (dx, dy) for this direction; y grows southwards
    pub const fn delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }

    /// Get direction from unit delta values
    pub const fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        match (dx, dy) {
            (0, -1) => Some(Direction::North),
            (1, -1) => Some(Direction::NorthEast),
            (1, 0) => Some(Direction::East),
            (1, 1) => Some(Direction::SouthEast),
            (0, 1) => Some(Direction::South),
            (-1, 1) => Some(Direction::SouthWest),
            (-1, 0) => Some(Direction::West),
            (-1, -1) => Some(Direction::NorthWest),
            _ => None,
        }
    }

    const fn index(&self) -> usize {
        *self as usize
    }

    /// Rotate 45 degrees clockwise
    pub const fn rotate_cw(&self) -> Self {
        Self::ALL[(self.index() + 1) % 8]
    }

    /// Rotate 45 degrees counter-clockwise
    pub const fn rotate_ccw(&self) -> Self {
        Self::ALL[(self.index() + 7) % 8]
    }

    pub const fn opposite(&self) -> Self {
        Self::ALL[(self.index() + 4) % 8]
    }

    pub const fn is_diagonal(&self) -> bool {
        let (dx, dy) = self.delta();
        dx != 0 && dy != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_delta_roundtrip() {
        for dir in Direction::iter() {
            let (dx, dy) = dir.delta();
            assert_eq!(Direction::from_delta(dx, dy), Some(dir));
        }
        assert_eq!(Direction::from_delta(0, 0), None);
        assert_eq!(Direction::from_delta(2, 0), None);
    }

    #[test]
    fn test_rotation() {
        assert_eq!(Direction::North.rotate_cw(), Direction::NorthEast);
        assert_eq!(Direction::North.rotate_ccw(), Direction::NorthWest);
        assert_eq!(Direction::NorthWest.rotate_cw(), Direction::North);
        for dir in Direction::iter() {
            assert_eq!(dir.rotate_cw().rotate_ccw(), dir);
            assert_eq!(dir.opposite().opposite(), dir);
        }
    }

    #[test]
    fn test_distances() {
        let a = Point::new(0, 0);
        let b = Point::new(3, 4);
        assert_eq!(a.chebyshev(b), 4);
        assert_eq!(a.distance_sq(b), 25);
        assert!(a.is_adjacent(Point::new(1, 1)));
        assert!(!a.is_adjacent(a));
    }

    #[test]
    fn test_line_endpoints() {
        let line = Point::new(1, 1).line_to(Point::new(5, 3));
        assert_eq!(line.first(), Some(&Point::new(1, 1)));
        assert_eq!(line.last(), Some(&Point::new(5, 3)));
        for pair in line.windows(2) {
            assert!(pair[0].is_adjacent(pair[1]));
        }
    }

    #[test]
    fn test_direction_to() {
        let origin = Point::new(5, 5);
        assert_eq!(origin.direction_to(Point::new(9, 1)), Some(Direction::NorthEast));
        assert_eq!(origin.direction_to(Point::new(5, 8)), Some(Direction::South));
        assert_eq!(origin.direction_to(origin), None);
    }
}
