//! Inventory, items, equipment and consumables

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::components::Components;
use crate::config::EngineConfig;
use crate::damage::{Elements, Origin, Pipeline};
use crate::effect::{Animation, Effect, EffectRecord};
use crate::entity::{Entity, EntityId};
use crate::geometry::Point;
use crate::maker;
use crate::world::World;

/// Carried items, in pickup order
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    pub capacity: usize,
    pub items: Vec<Entity>,
}

impl Inventory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Store an item; hands it back when there is no room
    pub fn add(&mut self, item: Entity) -> Result<(), Entity> {
        if self.is_full() {
            return Err(item);
        }
        self.items.push(item);
        Ok(())
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.items.iter().position(|e| e.id == id)?;
        Some(self.items.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.items.get(index)
    }

    pub fn find(&self, id: EntityId) -> Option<&Entity> {
        self.items.iter().find(|e| e.id == id)
    }

    pub fn find_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.items.iter_mut().find(|e| e.id == id)
    }
}

/// What using or throwing an item produced
#[derive(Debug, Clone, Default)]
pub struct ItemUse {
    pub records: Vec<EffectRecord>,
    /// The item did something and should be consumed
    pub spent: bool,
}

impl ItemUse {
    /// A refusal: a message and nothing spent
    pub fn refused(text: impl Into<String>) -> Self {
        Self {
            records: vec![EffectRecord::message(text)],
            spent: false,
        }
    }

    pub fn spent(records: Vec<EffectRecord>) -> Self {
        Self {
            records,
            spent: true,
        }
    }
}

/// Effect of using an item on its holder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Usable {
    #[default]
    Null,
    Heal { amount: i32 },
}

impl Usable {
    pub fn is_null(&self) -> bool {
        matches!(self, Usable::Null)
    }

    pub fn use_on(&self, user: &Entity, item: &Entity) -> ItemUse {
        match *self {
            Usable::Null => ItemUse::refused(format!("The {} cannot be used.", item.name)),
            Usable::Heal { amount } => {
                let Some(v) = user.components.harmable.vitality() else {
                    return ItemUse::refused("Nothing happens.");
                };
                if v.hp >= v.max_hp {
                    return ItemUse::refused("You are already at full health.");
                }
                ItemUse::spent(vec![
                    EffectRecord::message(format!("You drink the {}.", item.name.to_lowercase()))
                        .with(Effect::Harm {
                            target: user.id,
                            amount: -amount,
                            elements: Elements::HEALING,
                        }),
                ])
            }
        }
    }
}

/// Effect of throwing an item at a tile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Throwable {
    #[default]
    Null,
    /// Fire damage to everything within `radius`, igniting fuel and boiling
    /// water into steam
    Fireblast { damage: i32, radius: i32 },
    /// Hits the first blocking harmable along the line of flight
    MagicMissile { damage: i32 },
}

impl Throwable {
    pub fn is_null(&self) -> bool {
        matches!(self, Throwable::Null)
    }

    pub fn throw_at(
        &self,
        thrower: &Entity,
        item: &Entity,
        target: Point,
        world: &World,
        config: &EngineConfig,
    ) -> ItemUse {
        if !world.map.in_bounds(target) || !world.map.is_in_fov(target) {
            return ItemUse::refused("You cannot target a tile outside your field of view.");
        }
        match *self {
            Throwable::Null => ItemUse::refused(format!("The {} cannot be thrown.", item.name)),
            Throwable::Fireblast { damage, radius } => {
                ItemUse::spent(vec![fireblast(thrower, item, target, damage, radius, world, config)])
            }
            Throwable::MagicMissile { damage } => {
                let victim = thrower
                    .pos
                    .line_to(target)
                    .into_iter()
                    .skip(1)
                    .take_while(|p| world.map.is_walkable(*p))
                    .find_map(|p| world.blocking_at(p))
                    .filter(|e| !e.components.harmable.is_null());
                let Some(victim) = victim else {
                    return ItemUse::refused("There is no target there.");
                };
                ItemUse::spent(vec![
                    EffectRecord::single(Effect::Animation(Animation::MagicMissile {
                        source: thrower.pos,
                        target: victim.pos,
                    }))
                    .with(Effect::Message(format!(
                        "A magic missile strikes {}.",
                        victim.name
                    )))
                    .with(Effect::Damage {
                        source: Some(thrower.id),
                        target: victim.id,
                        amount: damage,
                        elements: Elements::MAGIC,
                    }),
                ])
            }
        }
    }
}

fn fireblast(
    thrower: &Entity,
    item: &Entity,
    center: Point,
    damage: i32,
    radius: i32,
    world: &World,
    config: &EngineConfig,
) -> EffectRecord {
    let in_blast = |p: Point| p.distance_sq(center) <= radius * radius;
    let mut record = EffectRecord::message(format!("The {} explodes!", item.name.to_lowercase()))
        .with(Effect::Animation(Animation::Fireblast { center, radius }));

    for entity in world.entities().filter(|e| in_blast(e.pos)) {
        if !entity.components.harmable.is_null() {
            record = record.with(Effect::Damage {
                source: Some(thrower.id),
                target: entity.id,
                amount: damage,
                elements: Elements::FIRE,
            });
        } else if entity.components.burnable.is_some() {
            record = record.with(Effect::Burn(entity.id));
        }
    }

    for y in center.y - radius..=center.y + radius {
        for x in center.x - radius..=center.x + radius {
            let p = Point::new(x, y);
            if in_blast(p) && world.map.is_water(p) && !world.map.has_steam(p) {
                record = record.with(Effect::AddEntity(Box::new(maker::steam(
                    p,
                    config.steam_spread_probability,
                    config.steam_dissipate_probability,
                ))));
            }
        }
    }
    record
}

/// Something that can be picked up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub usable: Usable,
    pub throwable: Throwable,
}

/// Equipment slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Slot {
    Weapon,
    Armor,
}

/// Can be worn or wielded. Both pipelines are copied into the wearer on
/// equip and removed again, by origin, on unequip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipable {
    pub slot: Slot,
    /// Merged into the wearer's attacker
    pub offense: Pipeline,
    /// Merged into the wearer's defender
    pub defense: Pipeline,
}

impl Equipable {
    pub fn new(slot: Slot) -> Self {
        Self {
            slot,
            offense: Pipeline::new(),
            defense: Pipeline::new(),
        }
    }

    pub fn merge_into(&self, item: EntityId, wearer: &mut Components) {
        let origin = Origin::Item(item);
        if let Some(attacker) = wearer.attacker.as_mut() {
            for m in self.offense.transformers() {
                attacker.pipeline.add_transformer(origin, m.value);
            }
            for m in self.offense.callbacks() {
                attacker.pipeline.add_callback(origin, m.value);
            }
        }
        if let Some(defender) = wearer.defender.as_mut() {
            for m in self.defense.transformers() {
                defender.pipeline.add_transformer(origin, m.value);
            }
            for m in self.defense.callbacks() {
                defender.pipeline.add_callback(origin, m.value);
            }
        }
    }

    pub fn strip_from(item: EntityId, wearer: &mut Components) {
        let origin = Origin::Item(item);
        if let Some(attacker) = wearer.attacker.as_mut() {
            attacker.pipeline.remove_origin(origin);
        }
        if let Some(defender) = wearer.defender.as_mut() {
            defender.pipeline.remove_origin(origin);
        }
    }
}

/// Worn and wielded items, by id
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub weapon: Option<EntityId>,
    pub armor: Option<EntityId>,
}

impl Equipment {
    pub fn slot(&self, slot: Slot) -> Option<EntityId> {
        match slot {
            Slot::Weapon => self.weapon,
            Slot::Armor => self.armor,
        }
    }

    pub fn slot_mut(&mut self, slot: Slot) -> &mut Option<EntityId> {
        match slot {
            Slot::Weapon => &mut self.weapon,
            Slot::Armor => &mut self.armor,
        }
    }

    pub fn is_equipped(&self, item: EntityId) -> bool {
        self.weapon == Some(item) || self.armor == Some(item)
    }
}

/// Remaining uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Uses {
    Finite(u32),
    Infinite,
}

/// Wears out with use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consumable {
    pub uses: Uses,
}

impl Consumable {
    pub const fn finite(uses: u32) -> Self {
        Self {
            uses: Uses::Finite(uses),
        }
    }

    /// Spend one use; true when the item is now used up
    pub fn consume(&mut self) -> bool {
        match &mut self.uses {
            Uses::Infinite => false,
            Uses::Finite(n) => {
                assert!(*n > 0, "consumed an exhausted finite-use item");
                *n -= 1;
                *n == 0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Attacker, Defender};
    use crate::damage::DamageTransformer;

    #[test]
    fn test_inventory_capacity() {
        let mut inv = Inventory::new(1);
        assert!(inv.add(maker::healing_potion(Point::new(0, 0))).is_ok());
        let back = inv.add(maker::sword(Point::new(0, 0)));
        assert!(back.is_err());
        assert_eq!(inv.items.len(), 1);
    }

    #[test]
    fn test_consume_counts_down() {
        let mut c = Consumable::finite(2);
        assert!(!c.consume());
        assert!(c.consume());
    }

    #[test]
    #[should_panic(expected = "exhausted finite-use item")]
    fn test_consume_exhausted_panics() {
        let mut c = Consumable::finite(0);
        c.consume();
    }

    #[test]
    fn test_infinite_never_runs_out() {
        let mut c = Consumable {
            uses: Uses::Infinite,
        };
        assert!((0..10).all(|_| !c.consume()));
    }

    #[test]
    fn test_merge_then_strip_restores_pipelines() {
        let mut wearer = Components {
            attacker: Some(Attacker::new(2).with_pipeline(
                Pipeline::new().with_transformer(DamageTransformer::Bonus { amount: 2 }),
            )),
            defender: Some(Defender::default()),
            ..Components::default()
        };
        let before_attacker = wearer.attacker.clone();
        let before_defender = wearer.defender.clone();

        let sword = maker::sword(Point::new(0, 0));
        let equipable = sword.components.equipable.clone().unwrap();
        equipable.merge_into(EntityId(42), &mut wearer);
        assert_eq!(wearer.attacker.as_ref().unwrap().outgoing().0, 6);

        Equipable::strip_from(EntityId(42), &mut wearer);
        assert_eq!(wearer.attacker, before_attacker);
        assert_eq!(wearer.defender, before_defender);
    }
}
