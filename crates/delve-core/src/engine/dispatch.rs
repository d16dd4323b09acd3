//! Effect interpreter: one handler per effect kind

use tracing::{debug, info, warn};

use super::{Engine, GameState};
use crate::components::{ComponentKind, Equipable, Harmable, Slot};
use crate::consts::S_CORPSE;
use crate::damage::{DamageContext, Elements};
use crate::effect::{Effect, EffectRecord};
use crate::entity::{Color, Entity, EntityId, RenderOrder};

impl Engine {
    /// Apply one effect, returning whatever it produces
    pub(super) fn apply(&mut self, effect: Effect) -> Vec<EffectRecord> {
        debug!(kind = effect.kind(), "applying effect");
        match effect {
            Effect::Message(text) => {
                self.messages.push(text);
                Vec::new()
            }
            Effect::Damage {
                source,
                target,
                amount,
                elements,
            } => self.damage(DamageContext {
                source,
                target,
                amount,
                elements,
            }),
            Effect::Harm {
                target,
                amount,
                elements,
            } => self.harm(target, amount, elements),
            Effect::AddEntity(entity) => {
                self.add_entity(*entity);
                Vec::new()
            }
            Effect::RemoveEntity(id) => {
                self.remove_entity(id);
                Vec::new()
            }
            Effect::DeadEntity(id) => {
                self.kill(id);
                Vec::new()
            }
            Effect::MoveTowards { entity, target } => {
                self.world.move_towards(entity, target);
                Vec::new()
            }
            Effect::Move { entity, dx, dy } => {
                self.world.move_by(entity, dx, dy);
                Vec::new()
            }
            Effect::Burn(id) => match self.world.get(id) {
                Some(e) => e
                    .components
                    .burnable
                    .map(|b| b.burn(e, &self.config))
                    .unwrap_or_default(),
                None => Vec::new(),
            },
            Effect::Split { entity, hp } => {
                self.split(entity, hp);
                Vec::new()
            }
            Effect::SwimCheck(id) => self.swim_check(id),
            Effect::PickUp { entity, item } => {
                self.pick_up(entity, item);
                Vec::new()
            }
            Effect::Drop { entity, item } => {
                self.drop_item(entity, item);
                Vec::new()
            }
            Effect::Equip { entity, item } => self.equip(entity, item),
            Effect::Unequip { entity, item } => {
                self.unequip(entity, item);
                Vec::new()
            }
            Effect::Consume { entity, item } => {
                self.consume(entity, item);
                Vec::new()
            }
            // split off by `drain` before a record's effects are applied
            Effect::Animation(_) => Vec::new(),
            Effect::Restore => {
                self.animation_holds = self.animation_holds.saturating_sub(1);
                if self.animation_holds == 0 {
                    self.flush_corpses();
                }
                Vec::new()
            }
        }
    }

    /// Defender first, then harm. The harm record is pushed last so it
    /// resolves before any callback the defender triggered.
    fn damage(&mut self, ctx: DamageContext) -> Vec<EffectRecord> {
        let Some(target) = self.world.get(ctx.target) else {
            return Vec::new();
        };
        if target.components.harmable.is_null() {
            return Vec::new();
        }
        let (ctx, mut records) = match &target.components.defender {
            Some(defender) => defender.transform(ctx, &self.world),
            None => (ctx, Vec::new()),
        };
        records.push(EffectRecord::single(Effect::Harm {
            target: ctx.target,
            amount: ctx.amount,
            elements: ctx.elements,
        }));
        records
    }

    fn harm(&mut self, id: EntityId, amount: i32, elements: Elements) -> Vec<EffectRecord> {
        let Some(entity) = self.world.get_mut(id) else {
            return Vec::new();
        };
        if entity.components.harmable.is_null() {
            return Vec::new();
        }
        let name = entity.name.clone();
        let outcome = entity.components.harmable.harm(id, amount, elements);

        match outcome.taken {
            n if n > 0 => {
                self.messages.push(format!("{name} takes {n} damage."));
                self.note_harmed(id);
            }
            n if n < 0 => self.messages.push(format!("{name} recovers {} HP.", -n)),
            _ if amount > 0 => self.messages.push(format!("{name} is unharmed.")),
            _ => {}
        }
        outcome.records
    }

    fn note_harmed(&mut self, id: EntityId) {
        self.recently_harmed.retain(|other| *other != id);
        self.recently_harmed.push_back(id);
        while self.recently_harmed.len() > self.config.recently_harmed_limit {
            self.recently_harmed.pop_front();
        }
    }

    fn add_entity(&mut self, entity: Entity) {
        if entity.components.commitable.can_commit(&entity, &self.world.map) {
            let name = entity.name.clone();
            let id = self.world.spawn(entity);
            debug!(entity = id.0, %name, "entity added");
        } else {
            debug!(name = %entity.name, pos = ?entity.pos, "tile occupied, entity not added");
        }
    }

    fn remove_entity(&mut self, id: EntityId) {
        if self.world.is_player(id) {
            warn!("refusing to remove the player entity");
            return;
        }
        if self.world.despawn(id).is_some() {
            self.recently_harmed.retain(|other| *other != id);
            self.deferred_corpses.retain(|other| *other != id);
        }
    }

    /// Strip a dead entity down to an inert husk; the corpse replaces it once
    /// no animation is holding effects back
    fn kill(&mut self, id: EntityId) {
        if self.world.is_player(id) {
            info!("player died");
            self.messages.push(String::from("You died!"));
            self.set_state(GameState::PlayerDead);
            return;
        }
        let Some(entity) = self.world.get_mut(id) else {
            return;
        };
        if entity.components.harmable.is_null() {
            return;
        }
        for kind in [
            ComponentKind::Ai,
            ComponentKind::Attacker,
            ComponentKind::Burnable,
            ComponentKind::Movable,
            ComponentKind::Defender,
            ComponentKind::Swimmable,
        ] {
            entity.detach(kind);
        }
        entity.components.harmable = Harmable::Null;
        info!(entity = id.0, name = %entity.name, "entity died");
        self.messages.push(format!("{} dies.", entity.name));

        if self.animation_holds > 0 {
            self.deferred_corpses.push(id);
        } else {
            self.make_corpse(id);
        }
    }

    fn make_corpse(&mut self, id: EntityId) {
        let Some(mut body) = self.world.despawn(id) else {
            return;
        };
        body.blocks = false;
        body.glyph = S_CORPSE;
        body.color = Color::DARK_RED;
        body.name = format!("remains of {}", body.name);
        body.render_order = RenderOrder::Corpse;
        body.components.commitable = Default::default();
        self.world.restore(body);
        self.recently_harmed.retain(|other| *other != id);
    }

    pub(super) fn flush_corpses(&mut self) {
        for id in std::mem::take(&mut self.deferred_corpses) {
            self.make_corpse(id);
        }
    }

    /// Bud a copy of `entity` onto a free neighbouring tile, moving `hp` of
    /// its hit points over
    fn split(&mut self, id: EntityId, hp: i32) {
        let Some(original) = self.world.get(id) else {
            return;
        };
        if original.components.harmable.is_null() {
            return;
        }
        let options = self.world.map.open_neighbors(original.pos);
        let Some(&pos) = self.rng.choose(&options) else {
            debug!(entity = id.0, "no room to split");
            return;
        };

        let mut offspring = original.clone();
        offspring.pos = pos;
        if let Some(v) = offspring.components.harmable.vitality_mut() {
            v.hp = hp;
        }
        if let Some(v) = self
            .world
            .get_mut(id)
            .and_then(|e| e.components.harmable.vitality_mut())
        {
            v.hp -= hp;
        }
        self.messages.push(format!("{} splits in two!", offspring.name));
        self.world.spawn(offspring);
    }

    fn swim_check(&mut self, id: EntityId) -> Vec<EffectRecord> {
        let drown_damage = self.config.drown_damage;
        let Some(entity) = self.world.get(id) else {
            return Vec::new();
        };
        if !self.world.map.is_water(entity.pos) || entity.components.floatable.is_some() {
            return Vec::new();
        }
        let Some(entity) = self.world.get_mut(id) else {
            return Vec::new();
        };
        let drowning = entity
            .components
            .swimmable
            .as_mut()
            .is_none_or(|s| s.swim());
        if !drowning {
            return Vec::new();
        }
        vec![
            EffectRecord::message(format!("{} is drowning!", entity.name)).with(Effect::Damage {
                source: None,
                target: id,
                amount: drown_damage,
                elements: Elements::WATER,
            }),
        ]
    }

    fn pick_up(&mut self, holder: EntityId, item: EntityId) {
        let full = self
            .world
            .get(holder)
            .and_then(|h| h.components.inventory.as_ref())
            .is_none_or(|inv| inv.is_full());
        if full {
            self.messages.push(String::from("You cannot carry any more."));
            return;
        }
        let Some(thing) = self.world.despawn(item) else {
            return;
        };
        let name = thing.name.clone();
        let rejected = match self
            .world
            .get_mut(holder)
            .and_then(|h| h.components.inventory.as_mut())
        {
            Some(inventory) => inventory.add(thing).err(),
            None => Some(thing),
        };
        match rejected {
            Some(thing) => {
                self.world.restore(thing);
            }
            None => self.messages.push(format!("You pick up the {}.", name.to_lowercase())),
        }
    }

    fn drop_item(&mut self, holder: EntityId, item: EntityId) {
        let Some(h) = self.world.get_mut(holder) else {
            return;
        };
        if h.components.equipment.is_some_and(|eq| eq.is_equipped(item)) {
            self.messages
                .push(String::from("You cannot drop an equipped item."));
            return;
        }
        let pos = h.pos;
        let Some(mut thing) = h
            .components
            .inventory
            .as_mut()
            .and_then(|inv| inv.remove(item))
        else {
            return;
        };
        thing.pos = pos;
        self.messages
            .push(format!("You drop the {}.", thing.name.to_lowercase()));
        self.world.restore(thing);
    }

    /// Equipping onto an occupied slot first queues the old item's removal
    fn equip(&mut self, holder: EntityId, item: EntityId) -> Vec<EffectRecord> {
        let Some(h) = self.world.get_mut(holder) else {
            return Vec::new();
        };
        let found = h
            .components
            .inventory
            .as_ref()
            .and_then(|inv| inv.find(item))
            .and_then(|i| Some((i.name.clone(), i.components.equipable.clone()?)));
        let (Some((name, equipable)), Some(equipment)) = (found, h.components.equipment) else {
            self.messages.push(String::from("You cannot equip that."));
            return Vec::new();
        };

        match equipment.slot(equipable.slot) {
            Some(current) if current == item => return Vec::new(),
            Some(current) => {
                return vec![
                    EffectRecord::single(Effect::Equip {
                        entity: holder,
                        item,
                    }),
                    EffectRecord::single(Effect::Unequip {
                        entity: holder,
                        item: current,
                    }),
                ];
            }
            None => {}
        }

        equipable.merge_into(item, &mut h.components);
        if let Some(equipment) = h.components.equipment.as_mut() {
            *equipment.slot_mut(equipable.slot) = Some(item);
        }
        debug!(holder = holder.0, item = item.0, slot = %equipable.slot, "equipped");
        self.messages
            .push(format!("You equip the {}.", name.to_lowercase()));
        Vec::new()
    }

    fn unequip(&mut self, holder: EntityId, item: EntityId) {
        let Some(h) = self.world.get_mut(holder) else {
            return;
        };
        let slot = h.components.equipment.and_then(|eq| {
            [Slot::Weapon, Slot::Armor]
                .into_iter()
                .find(|s| eq.slot(*s) == Some(item))
        });
        let Some(slot) = slot else {
            panic!("unequipping an item that is not equipped: {:?}", item);
        };
        if let Some(equipment) = h.components.equipment.as_mut() {
            *equipment.slot_mut(slot) = None;
        }
        Equipable::strip_from(item, &mut h.components);

        let name = h
            .components
            .inventory
            .as_ref()
            .and_then(|inv| inv.find(item))
            .map(|i| i.name.to_lowercase())
            .unwrap_or_else(|| String::from("item"));
        self.messages.push(format!("You unequip the {name}."));
    }

    fn consume(&mut self, holder: EntityId, item: EntityId) {
        let Some(inventory) = self
            .world
            .get_mut(holder)
            .and_then(|h| h.components.inventory.as_mut())
        else {
            return;
        };
        let used_up = inventory
            .find_mut(item)
            .and_then(|i| i.components.consumable.as_mut())
            .is_some_and(|c| c.consume());
        if used_up {
            if let Some(thing) = inventory.remove(item) {
                self.messages
                    .push(format!("The {} is used up.", thing.name.to_lowercase()));
            }
        }
    }
}
