//! Entities
//!
//! An entity is identity, position and render metadata plus a fixed table of
//! optional capabilities ([`Components`]). Entities are built by the factory
//! functions in [`crate::maker`] and enter the map through
//! [`World::spawn`](crate::world::World::spawn).

use serde::{Deserialize, Serialize};

use crate::components::{Component, ComponentKind, Components, Harmable};
use crate::geometry::Point;

/// Unique identifier for entity instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Placeholder carried by entities that have not been spawned yet
    pub const NONE: EntityId = EntityId(0);

    pub fn next(self) -> Self {
        EntityId(self.0 + 1)
    }

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

/// Draw layer; later variants are drawn on top
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum RenderOrder {
    #[default]
    Terrain,
    Corpse,
    Item,
    Actor,
}

/// RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const WHITE: Color = Color(255, 255, 255);
    pub const GREY: Color = Color(128, 128, 128);
    pub const RED: Color = Color(191, 0, 0);
    pub const DARK_RED: Color = Color(127, 0, 0);
    pub const ORANGE: Color = Color(255, 127, 0);
    pub const YELLOW: Color = Color(255, 255, 0);
    pub const GREEN: Color = Color(0, 191, 0);
    pub const DARK_GREEN: Color = Color(0, 100, 0);
    pub const BLUE: Color = Color(0, 0, 191);
    pub const LIGHT_BLUE: Color = Color(173, 216, 230);
    pub const PINK: Color = Color(255, 105, 180);
    pub const PURPLE: Color = Color(128, 0, 128);
    pub const BROWN: Color = Color(139, 69, 19);
}

/// A thing in the world
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub pos: Point,
    pub glyph: char,
    pub color: Color,
    /// Holds its tile exclusively
    pub blocks: bool,
    pub render_order: RenderOrder,
    pub components: Components,
}

impl Entity {
    pub fn new(
        name: impl Into<String>,
        pos: Point,
        glyph: char,
        color: Color,
        blocks: bool,
        render_order: RenderOrder,
    ) -> Self {
        Self {
            id: EntityId::NONE,
            name: name.into(),
            pos,
            glyph,
            color,
            blocks,
            render_order,
            components: Components::default(),
        }
    }

    /// Builder form of [`Entity::attach`]
    pub fn with(mut self, component: impl Into<Component>) -> Self {
        self.attach(component);
        self
    }

    /// Bind a component to its slot, replacing whatever was there
    pub fn attach(&mut self, component: impl Into<Component>) {
        let c = &mut self.components;
        match component.into() {
            Component::Attacker(x) => c.attacker = Some(x),
            Component::Harmable(x) => c.harmable = x,
            Component::Defender(x) => c.defender = Some(x),
            Component::Movable(x) => c.movable = Some(x),
            Component::Burnable(x) => c.burnable = Some(x),
            Component::Dissipatable(x) => c.dissipatable = Some(x),
            Component::Spreadable(x) => c.spreadable = Some(x),
            Component::Swimmable(x) => c.swimmable = Some(x),
            Component::Floatable(x) => c.floatable = Some(x),
            Component::Inventory(x) => c.inventory = Some(x),
            Component::Item(x) => c.item = Some(x),
            Component::Equipable(x) => c.equipable = Some(x),
            Component::Equipment(x) => c.equipment = Some(x),
            Component::Consumable(x) => c.consumable = Some(x),
            Component::Ai(x) => c.ai = Some(x),
            Component::Commitable(x) => c.commitable = x,
            Component::Encroachable(x) => c.encroachable = Some(x),
        }
    }

    /// Reset a slot to its inert default
    pub fn detach(&mut self, kind: ComponentKind) {
        let c = &mut self.components;
        match kind {
            ComponentKind::Attacker => c.attacker = None,
            ComponentKind::Harmable => c.harmable = Harmable::Null,
            ComponentKind::Defender => c.defender = None,
            ComponentKind::Movable => c.movable = None,
            ComponentKind::Burnable => c.burnable = None,
            ComponentKind::Dissipatable => c.dissipatable = None,
            ComponentKind::Spreadable => c.spreadable = None,
            ComponentKind::Swimmable => c.swimmable = None,
            ComponentKind::Floatable => c.floatable = None,
            ComponentKind::Inventory => c.inventory = None,
            ComponentKind::Item => c.item = None,
            ComponentKind::Equipable => c.equipable = None,
            ComponentKind::Equipment => c.equipment = None,
            ComponentKind::Consumable => c.consumable = None,
            ComponentKind::Ai => c.ai = None,
            ComponentKind::Commitable => c.commitable = Default::default(),
            ComponentKind::Encroachable => c.encroachable = None,
        }
    }

    /// True when the slot holds a live (non-null) component
    pub fn has(&self, kind: ComponentKind) -> bool {
        let c = &self.components;
        match kind {
            ComponentKind::Attacker => c.attacker.is_some(),
            ComponentKind::Harmable => !c.harmable.is_null(),
            ComponentKind::Defender => c.defender.is_some(),
            ComponentKind::Movable => c.movable.is_some(),
            ComponentKind::Burnable => c.burnable.is_some(),
            ComponentKind::Dissipatable => c.dissipatable.is_some(),
            ComponentKind::Spreadable => c.spreadable.is_some(),
            ComponentKind::Swimmable => c.swimmable.is_some(),
            ComponentKind::Floatable => c.floatable.is_some(),
            ComponentKind::Inventory => c.inventory.is_some(),
            ComponentKind::Item => c.item.is_some(),
            ComponentKind::Equipable => c.equipable.is_some(),
            ComponentKind::Equipment => c.equipment.is_some(),
            ComponentKind::Consumable => c.consumable.is_some(),
            ComponentKind::Ai => c.ai.is_some(),
            ComponentKind::Commitable => true,
            ComponentKind::Encroachable => c.encroachable.is_some(),
        }
    }

    /// Attached components, for debugging and inspection
    pub fn component_kinds(&self) -> Vec<ComponentKind> {
        use strum::IntoEnumIterator;
        ComponentKind::iter().filter(|k| self.has(*k)).collect()
    }

    pub fn is_alive(&self) -> bool {
        !self.components.harmable.is_null()
    }

    /// Can be picked up
    pub fn is_item(&self) -> bool {
        self.components.item.is_some() || self.components.equipable.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Attacker, Movable};

    fn dummy() -> Entity {
        Entity::new("dummy", Point::new(1, 1), 'd', Color::WHITE, true, RenderOrder::Actor)
    }

    #[test]
    fn test_empty_entity_is_valid() {
        let e = dummy();
        assert_eq!(e.component_kinds(), vec![ComponentKind::Commitable]);
        assert!(!e.is_alive());
        assert!(e.id.is_none());
    }

    #[test]
    fn test_attach_replaces_slot() {
        let mut e = dummy().with(Attacker::new(3));
        e.attach(Attacker::new(5));
        assert_eq!(e.components.attacker.as_ref().map(|a| a.power), Some(5));
        assert_eq!(
            e.component_kinds(),
            vec![ComponentKind::Attacker, ComponentKind::Commitable]
        );
    }

    #[test]
    fn test_detach_leaves_null_harmable() {
        let mut e = dummy()
            .with(Harmable::standard(10))
            .with(Movable::default());
        assert!(e.has(ComponentKind::Harmable));
        e.detach(ComponentKind::Harmable);
        e.detach(ComponentKind::Movable);
        assert!(!e.has(ComponentKind::Harmable));
        assert!(e.components.harmable.is_null());
        assert!(e.components.movable.is_none());
    }

    #[test]
    fn test_render_order_sorts_actors_last() {
        let mut orders = vec![
            RenderOrder::Actor,
            RenderOrder::Terrain,
            RenderOrder::Item,
            RenderOrder::Corpse,
        ];
        orders.sort();
        assert_eq!(
            orders,
            vec![
                RenderOrder::Terrain,
                RenderOrder::Corpse,
                RenderOrder::Item,
                RenderOrder::Actor
            ]
        );
    }
}
