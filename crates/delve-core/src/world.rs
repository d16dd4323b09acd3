//! The world: map state plus every entity currently on it

use crate::entity::{Entity, EntityId};
use crate::geometry::Point;
use crate::map::GameMap;

/// Map and entity store
#[derive(Debug, Clone)]
pub struct World {
    pub map: GameMap,
    entities: Vec<Entity>,
    next_id: EntityId,
    player: Option<EntityId>,
}

impl World {
    pub fn new(map: GameMap) -> Self {
        Self {
            map,
            entities: Vec::new(),
            next_id: EntityId::NONE.next(),
            player: None,
        }
    }

    /// Give `entity` a fresh id and commit it to the map
    pub fn spawn(&mut self, mut entity: Entity) -> EntityId {
        entity.id = self.next_id;
        self.next_id = self.next_id.next();
        self.restore(entity)
    }

    /// Spawn the entity the player controls
    pub fn spawn_player(&mut self, entity: Entity) -> EntityId {
        let id = self.spawn(entity);
        self.player = Some(id);
        id
    }

    /// Commit an entity that already has an id, such as a dropped item
    pub fn restore(&mut self, entity: Entity) -> EntityId {
        let id = entity.id;
        entity.components.commitable.commit(&entity, &mut self.map);
        self.entities.push(entity);
        id
    }

    /// Uncommit an entity and hand it back, id intact
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.entities.iter().position(|e| e.id == id)?;
        let entity = self.entities.remove(index);
        entity.components.commitable.delete(&entity, &mut self.map);
        Some(entity)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Ids of every entity, in spawn order
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.iter().map(|e| e.id).collect()
    }

    /// Entities on a tile, through the position index
    pub fn entities_at(&self, p: Point) -> impl Iterator<Item = &Entity> {
        self.map
            .entities_at(p)
            .iter()
            .filter_map(move |id| self.get(*id))
    }

    /// The blocking entity holding a tile, if any
    pub fn blocking_at(&self, p: Point) -> Option<&Entity> {
        if !self.map.is_blocked(p) {
            return None;
        }
        self.entities_at(p).find(|e| e.blocks)
    }

    pub fn player_id(&self) -> Option<EntityId> {
        self.player
    }

    pub fn player(&self) -> Option<&Entity> {
        self.player.and_then(|id| self.get(id))
    }

    pub fn is_player(&self, id: EntityId) -> bool {
        self.player == Some(id)
    }

    /// Display name, for messages
    pub fn name_of(&self, id: EntityId) -> String {
        self.get(id)
            .map(|e| e.name.clone())
            .unwrap_or_else(|| String::from("Something"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maker;
    use crate::map::{Layer, Rect};

    fn world() -> World {
        let mut map = GameMap::new(8, 8);
        map.carve_room(Rect::new(1, 1, 5, 5));
        World::new(map)
    }

    #[test]
    fn test_spawn_assigns_ids_and_commits() {
        let mut world = world();
        let a = world.spawn(maker::orc(Point::new(2, 2)));
        let b = world.spawn(maker::healing_potion(Point::new(2, 2)));
        assert_ne!(a, b);
        assert!(!a.is_none());
        assert_eq!(world.blocking_at(Point::new(2, 2)).map(|e| e.id), Some(a));
        assert_eq!(world.entities_at(Point::new(2, 2)).count(), 2);
        assert_eq!(world.map.count(Layer::Blocked), 1);
    }

    #[test]
    fn test_despawn_then_restore_keeps_id() {
        let mut world = world();
        let id = world.spawn(maker::sword(Point::new(3, 3)));
        let mut sword = world.despawn(id).unwrap();
        assert!(world.map.entities_at(Point::new(3, 3)).is_empty());
        sword.pos = Point::new(4, 4);
        assert_eq!(world.restore(sword), id);
        assert_eq!(world.map.entities_at(Point::new(4, 4)), &[id]);
    }

    #[test]
    fn test_terrain_layers_follow_spawn_and_despawn() {
        let mut world = world();
        let id = world.spawn(maker::water(Point::new(2, 3)));
        assert!(world.map.is_water(Point::new(2, 3)));
        world.despawn(id);
        assert!(!world.map.is_water(Point::new(2, 3)));
        assert!(!world.map.has_terrain(Point::new(2, 3)));
    }
}
