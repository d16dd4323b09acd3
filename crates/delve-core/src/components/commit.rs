//! Commitable: how an entity registers its presence on the map

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::map::{GameMap, TileFlags};

/// Layers that admit at most one entity per tile
const EXCLUSIVE: TileFlags = TileFlags::TERRAIN
    .union(TileFlags::FIRE)
    .union(TileFlags::STEAM)
    .union(TileFlags::WATER)
    .union(TileFlags::ICE);

/// Map bookkeeping for one entity: the blocked flag when it blocks, plus
/// whatever presence layers it marks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitable {
    pub layers: TileFlags,
}

impl Commitable {
    pub const fn new(layers: TileFlags) -> Self {
        Self { layers }
    }

    /// Terrain marker, optionally with extra presence layers
    pub const fn terrain(extra: TileFlags) -> Self {
        Self {
            layers: TileFlags::TERRAIN.union(extra),
        }
    }

    /// Whether committing `entity` would keep the map consistent
    pub fn can_commit(&self, entity: &Entity, map: &GameMap) -> bool {
        let here = map.flags(entity.pos);
        map.in_bounds(entity.pos)
            && here.contains(TileFlags::WALKABLE)
            && !(entity.blocks && here.contains(TileFlags::BLOCKED))
            && !here.intersects(self.layers & EXCLUSIVE)
    }

    /// Register `entity` on its tile
    pub fn commit(&self, entity: &Entity, map: &mut GameMap) {
        assert!(
            !(self.layers.contains(TileFlags::TERRAIN) && map.has_terrain(entity.pos)),
            "second terrain entity committed onto tile {:?}",
            entity.pos
        );
        if entity.blocks {
            map.mark_blocked(entity.pos);
        }
        map.insert_flags(entity.pos, self.layers);
        map.index_insert(entity.pos, entity.id);
    }

    /// Undo [`Commitable::commit`]
    pub fn delete(&self, entity: &Entity, map: &mut GameMap) {
        if entity.blocks {
            map.clear_blocked(entity.pos);
        }
        map.remove_flags(entity.pos, self.layers);
        map.index_remove(entity.pos, entity.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Color, EntityId, RenderOrder};
    use crate::geometry::Point;
    use crate::map::{Layer, Rect};

    fn map() -> GameMap {
        let mut map = GameMap::new(6, 6);
        map.carve_room(Rect::new(1, 1, 3, 3));
        map
    }

    fn water(pos: Point) -> Entity {
        let mut e = Entity::new("water", pos, '~', Color::BLUE, false, RenderOrder::Terrain);
        e.id = EntityId(3);
        e.components.commitable = Commitable::terrain(TileFlags::WATER);
        e
    }

    #[test]
    fn test_commit_and_delete_are_symmetric() {
        let mut map = map();
        let w = water(Point::new(2, 2));
        let c = w.components.commitable;
        c.commit(&w, &mut map);
        assert!(map.is_water(w.pos));
        assert!(map.has_terrain(w.pos));
        assert_eq!(map.entities_at(w.pos), &[EntityId(3)]);

        c.delete(&w, &mut map);
        assert_eq!(map.count(Layer::Water), 0);
        assert_eq!(map.count(Layer::Terrain), 0);
        assert!(map.entities_at(w.pos).is_empty());
    }

    #[test]
    fn test_can_commit_rejects_second_terrain_and_walls() {
        let mut map = map();
        let w = water(Point::new(2, 2));
        let c = w.components.commitable;
        assert!(c.can_commit(&w, &map));
        c.commit(&w, &mut map);
        assert!(!c.can_commit(&w, &map));
        assert!(!c.can_commit(&water(Point::new(0, 0)), &map));
    }

    #[test]
    #[should_panic(expected = "second terrain entity")]
    fn test_second_terrain_panics() {
        let mut map = map();
        let w = water(Point::new(2, 2));
        let c = w.components.commitable;
        c.commit(&w, &mut map);
        c.commit(&w, &mut map);
    }
}
