//! Map state
//!
//! A fixed-size grid of per-tile layer flags plus a position index from tile
//! to the entities standing on it. Map generation hands over the walkable
//! layer and the room list; everything that tracks entity presence (blocked,
//! water, fire, steam, terrain, ice) is written only by
//! [`Commitable`](crate::components::Commitable) and by the movement code.

mod fov;
mod path;

use bitflags::bitflags;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::entity::EntityId;
use crate::geometry::Point;
use crate::rng::GameRng;

pub use path::Avoid;

bitflags! {
    /// Per-tile layer flags
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct TileFlags: u16 {
        const WALKABLE = 0x0001;
        const BLOCKED = 0x0002;
        const WATER = 0x0004;
        const FIRE = 0x0008;
        const STEAM = 0x0010;
        const TERRAIN = 0x0020;
        const ICE = 0x0040;
        const FOV = 0x0080;
        const EXPLORED = 0x0100;
    }
}

impl Serialize for TileFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TileFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u16::deserialize(deserializer)?;
        Ok(TileFlags::from_bits_truncate(bits))
    }
}

/// One boolean layer of the map, for snapshots handed to a renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum Layer {
    Walkable,
    Blocked,
    Water,
    Fire,
    Steam,
    Terrain,
    Ice,
    Fov,
    Explored,
}

impl Layer {
    pub const fn flag(&self) -> TileFlags {
        match self {
            Layer::Walkable => TileFlags::WALKABLE,
            Layer::Blocked => TileFlags::BLOCKED,
            Layer::Water => TileFlags::WATER,
            Layer::Fire => TileFlags::FIRE,
            Layer::Steam => TileFlags::STEAM,
            Layer::Terrain => TileFlags::TERRAIN,
            Layer::Ice => TileFlags::ICE,
            Layer::Fov => TileFlags::FOV,
            Layer::Explored => TileFlags::EXPLORED,
        }
    }
}

/// Rectangular room handed over by map generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x + width,
            y2: y + height,
        }
    }

    pub const fn center(&self) -> Point {
        Point::new((self.x1 + self.x2) / 2, (self.y1 + self.y2) / 2)
    }

    pub const fn contains(&self, p: Point) -> bool {
        p.x >= self.x1 && p.x <= self.x2 && p.y >= self.y1 && p.y <= self.y2
    }
}

/// The shared grid every component consults before mutating anything
#[derive(Debug, Clone)]
pub struct GameMap {
    width: i32,
    height: i32,
    tiles: Vec<TileFlags>,
    occupants: HashMap<Point, Vec<EntityId>>,
    /// Rooms as received from map generation
    pub rooms: Vec<Rect>,
}

impl GameMap {
    /// Create a map of solid rock
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            tiles: vec![TileFlags::empty(); (width * height) as usize],
            occupants: HashMap::new(),
            rooms: Vec::new(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub const fn in_bounds(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    fn index(&self, p: Point) -> Option<usize> {
        self.in_bounds(p)
            .then(|| (p.y * self.width + p.x) as usize)
    }

    /// Layer flags at a tile; out-of-bounds tiles have none
    pub fn flags(&self, p: Point) -> TileFlags {
        self.index(p)
            .map(|i| self.tiles[i])
            .unwrap_or_else(TileFlags::empty)
    }

    pub fn has(&self, p: Point, layer: Layer) -> bool {
        self.flags(p).contains(layer.flag())
    }

    pub fn is_walkable(&self, p: Point) -> bool {
        self.has(p, Layer::Walkable)
    }

    pub fn is_blocked(&self, p: Point) -> bool {
        self.has(p, Layer::Blocked)
    }

    pub fn is_water(&self, p: Point) -> bool {
        self.has(p, Layer::Water)
    }

    pub fn has_fire(&self, p: Point) -> bool {
        self.has(p, Layer::Fire)
    }

    pub fn has_steam(&self, p: Point) -> bool {
        self.has(p, Layer::Steam)
    }

    pub fn has_terrain(&self, p: Point) -> bool {
        self.has(p, Layer::Terrain)
    }

    pub fn is_ice(&self, p: Point) -> bool {
        self.has(p, Layer::Ice)
    }

    pub fn is_in_fov(&self, p: Point) -> bool {
        self.has(p, Layer::Fov)
    }

    pub fn is_explored(&self, p: Point) -> bool {
        self.has(p, Layer::Explored)
    }

    /// Walkable and not held by a blocking entity
    pub fn is_open(&self, p: Point) -> bool {
        self.is_walkable(p) && !self.is_blocked(p)
    }

    /// Set the walkable layer; this is the map-generation boundary
    pub fn set_walkable(&mut self, p: Point, walkable: bool) {
        if walkable {
            self.insert_flags(p, TileFlags::WALKABLE);
        } else {
            self.remove_flags(p, TileFlags::WALKABLE);
        }
    }

    /// Carve a room's interior and remember it
    pub fn carve_room(&mut self, room: Rect) {
        for y in room.y1..=room.y2 {
            for x in room.x1..=room.x2 {
                self.set_walkable(Point::new(x, y), true);
            }
        }
        self.rooms.push(room);
    }

    pub(crate) fn insert_flags(&mut self, p: Point, flags: TileFlags) {
        if let Some(i) = self.index(p) {
            self.tiles[i].insert(flags);
        }
    }

    pub(crate) fn remove_flags(&mut self, p: Point, flags: TileFlags) {
        if let Some(i) = self.index(p) {
            self.tiles[i].remove(flags);
        }
    }

    /// Mark a tile as held by a blocking entity
    pub(crate) fn mark_blocked(&mut self, p: Point) {
        assert!(
            !self.is_blocked(p),
            "second blocking entity committed onto blocked tile {:?}",
            p
        );
        self.insert_flags(p, TileFlags::BLOCKED);
    }

    /// Release a tile held by a blocking entity
    pub(crate) fn clear_blocked(&mut self, p: Point) {
        assert!(
            self.is_blocked(p),
            "blocking entity removed from unblocked tile {:?}",
            p
        );
        self.remove_flags(p, TileFlags::BLOCKED);
    }

    /// Hand the blocked flag from one tile to another in a single step
    pub(crate) fn move_blocker(&mut self, from: Point, to: Point) {
        if from == to {
            return;
        }
        self.clear_blocked(from);
        self.mark_blocked(to);
    }

    /// Entities standing on a tile, in arrival order
    pub fn entities_at(&self, p: Point) -> &[EntityId] {
        self.occupants.get(&p).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn index_insert(&mut self, p: Point, id: EntityId) {
        self.occupants.entry(p).or_default().push(id);
    }

    pub(crate) fn index_remove(&mut self, p: Point, id: EntityId) {
        if let Some(ids) = self.occupants.get_mut(&p) {
            ids.retain(|other| *other != id);
            if ids.is_empty() {
                self.occupants.remove(&p);
            }
        }
    }

    pub(crate) fn index_move(&mut self, from: Point, to: Point, id: EntityId) {
        if from == to {
            return;
        }
        self.index_remove(from, id);
        self.index_insert(to, id);
    }

    /// Row-major snapshot of one layer
    pub fn layer(&self, layer: Layer) -> Vec<bool> {
        let flag = layer.flag();
        self.tiles.iter().map(|t| t.contains(flag)).collect()
    }

    /// Number of tiles flagged on a layer
    pub fn count(&self, layer: Layer) -> usize {
        let flag = layer.flag();
        self.tiles.iter().filter(|t| t.contains(flag)).count()
    }

    /// Open, dry neighbors of a tile
    pub fn open_neighbors(&self, p: Point) -> Vec<Point> {
        p.neighbors()
            .into_iter()
            .filter(|n| self.is_open(*n) && !self.is_water(*n))
            .collect()
    }

    /// A random open, dry tile, or `None` after `max_tries` misses
    pub fn random_open_point(&self, rng: &mut GameRng, max_tries: u32) -> Option<Point> {
        (0..max_tries)
            .map(|_| rng.random_point(self.width, self.height))
            .find(|p| self.is_open(*p) && !self.is_water(*p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_map() -> GameMap {
        let mut map = GameMap::new(10, 10);
        map.carve_room(Rect::new(1, 1, 7, 7));
        map
    }

    #[test]
    fn test_out_of_bounds_has_no_flags() {
        let map = open_map();
        assert_eq!(map.flags(Point::new(-1, 0)), TileFlags::empty());
        assert_eq!(map.flags(Point::new(10, 0)), TileFlags::empty());
        assert!(!map.is_walkable(Point::new(0, 0)));
        assert!(map.is_walkable(Point::new(1, 1)));
    }

    #[test]
    fn test_move_blocker_keeps_single_flag() {
        let mut map = open_map();
        map.mark_blocked(Point::new(2, 2));
        map.move_blocker(Point::new(2, 2), Point::new(3, 2));
        assert!(!map.is_blocked(Point::new(2, 2)));
        assert!(map.is_blocked(Point::new(3, 2)));
        assert_eq!(map.count(Layer::Blocked), 1);
    }

    #[test]
    #[should_panic(expected = "unblocked tile")]
    fn test_double_clear_panics() {
        let mut map = open_map();
        map.clear_blocked(Point::new(2, 2));
    }

    #[test]
    #[should_panic(expected = "second blocking entity")]
    fn test_double_block_panics() {
        let mut map = open_map();
        map.mark_blocked(Point::new(2, 2));
        map.mark_blocked(Point::new(2, 2));
    }

    #[test]
    fn test_position_index() {
        let mut map = open_map();
        let p = Point::new(3, 3);
        map.index_insert(p, EntityId(1));
        map.index_insert(p, EntityId(2));
        assert_eq!(map.entities_at(p), &[EntityId(1), EntityId(2)]);
        map.index_move(p, Point::new(4, 3), EntityId(1));
        assert_eq!(map.entities_at(p), &[EntityId(2)]);
        assert_eq!(map.entities_at(Point::new(4, 3)), &[EntityId(1)]);
        map.index_remove(p, EntityId(2));
        assert!(map.entities_at(p).is_empty());
    }

    #[test]
    fn test_layer_snapshot_is_row_major() {
        let mut map = GameMap::new(3, 2);
        map.set_walkable(Point::new(2, 1), true);
        let layer = map.layer(Layer::Walkable);
        assert_eq!(layer, vec![false, false, false, false, false, true]);
    }

    #[test]
    fn test_random_open_point_exhausts() {
        let map = GameMap::new(5, 5);
        let mut rng = GameRng::new(1);
        assert_eq!(map.random_open_point(&mut rng, 20), None);
    }
}
