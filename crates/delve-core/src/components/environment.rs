//! Environmental capabilities: burning, spreading, dissipating, encroaching
//! and swimming

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::damage::Elements;
use crate::effect::{Effect, EffectRecord};
use crate::entity::Entity;
use crate::maker;
use crate::rng::GameRng;
use crate::world::World;

/// Reacts to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Burnable {
    /// Vegetation; turns into fire
    Fuel,
    /// Living things; take fire damage
    Flesh,
}

impl Burnable {
    pub fn burn(&self, owner: &Entity, config: &EngineConfig) -> Vec<EffectRecord> {
        match *self {
            Burnable::Fuel => vec![
                EffectRecord::message(format!("The {} catches fire.", owner.name.to_lowercase()))
                    .with(Effect::RemoveEntity(owner.id))
                    .with(Effect::AddEntity(Box::new(maker::fire(owner.pos, config)))),
            ],
            Burnable::Flesh => vec![
                EffectRecord::message(format!("{} is burned!", owner.name)).with(
                    Effect::Damage {
                        source: None,
                        target: owner.id,
                        amount: config.burn_damage,
                        elements: Elements::FIRE,
                    },
                ),
            ],
        }
    }
}

/// Disappears by chance each turn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dissipatable {
    pub probability: f64,
}

impl Dissipatable {
    pub fn dissipate(&self, owner: &Entity, rng: &mut GameRng) -> Vec<EffectRecord> {
        if rng.chance(self.probability) {
            debug!(entity = owner.id.0, name = %owner.name, "dissipated");
            vec![EffectRecord::single(Effect::RemoveEntity(owner.id))]
        } else {
            Vec::new()
        }
    }
}

/// Propagates to neighbouring tiles by chance each turn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Spreadable {
    /// Ignites one random adjacent burnable
    Fire { probability: f64 },
    /// Rolls separately for every adjacent open tile without steam
    Steam { probability: f64 },
}

/// Spread and dissipate probabilities of a steam cloud spawned by a parent
/// with the given ones. Children spread less and dissipate more, so every
/// cloud dies out within a bounded number of generations.
pub fn steam_child(spread: f64, dissipate: f64, decay: f64, growth: f64) -> (f64, f64) {
    let spread = spread * decay;
    let dissipate = dissipate + (1.0 - dissipate) * growth;
    (spread, dissipate.min(1.0))
}

impl Spreadable {
    pub fn spread(
        &self,
        owner: &Entity,
        world: &World,
        rng: &mut GameRng,
        config: &EngineConfig,
    ) -> Vec<EffectRecord> {
        match *self {
            Spreadable::Fire { probability } => {
                if !rng.chance(probability) {
                    return Vec::new();
                }
                let fuel: Vec<_> = owner
                    .pos
                    .neighbors()
                    .into_iter()
                    .flat_map(|p| world.entities_at(p))
                    .filter(|e| e.id != owner.id && e.components.burnable.is_some())
                    .map(|e| e.id)
                    .collect();
                match rng.choose(&fuel) {
                    Some(&target) => {
                        debug!(from = ?owner.pos, target = target.0, "fire spreads");
                        vec![EffectRecord::single(Effect::Burn(target))]
                    }
                    None => Vec::new(),
                }
            }
            Spreadable::Steam { probability } => {
                let dissipate = owner
                    .components
                    .dissipatable
                    .map_or(config.steam_dissipate_probability, |d| d.probability);
                let (child_spread, child_dissipate) = steam_child(
                    probability,
                    dissipate,
                    config.steam_spread_decay,
                    config.steam_dissipate_growth,
                );

                let mut records = Vec::new();
                // gas drifts over creatures; only walls and other clouds stop it
                for p in owner.pos.neighbors() {
                    if !world.map.is_walkable(p) || world.map.has_steam(p) {
                        continue;
                    }
                    if rng.chance(probability) {
                        records.push(EffectRecord::single(Effect::AddEntity(Box::new(
                            maker::steam(p, child_spread, child_dissipate),
                        ))));
                    }
                }
                if !records.is_empty() {
                    debug!(from = ?owner.pos, clouds = records.len(), "steam spreads");
                }
                records
            }
        }
    }
}

/// Reacts to something standing on the same tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Encroachable {
    /// Forces a swim check
    Water,
    /// Trampled into grass
    Shrub,
    NecroticSoil { damage: i32 },
    /// Burns whatever stands in it
    Fire,
}

impl Encroachable {
    pub fn encroach(&self, owner: &Entity, visitor: &Entity) -> Vec<EffectRecord> {
        match *self {
            Encroachable::Water => vec![EffectRecord::single(Effect::SwimCheck(visitor.id))],
            Encroachable::Shrub => vec![
                EffectRecord::message(format!("{} tramples the shrub.", visitor.name))
                    .with(Effect::RemoveEntity(owner.id))
                    .with(Effect::AddEntity(Box::new(maker::grass(owner.pos)))),
            ],
            Encroachable::NecroticSoil { damage } => vec![
                EffectRecord::message(format!("The necrotic soil saps {}.", visitor.name)).with(
                    Effect::Damage {
                        source: None,
                        target: visitor.id,
                        amount: damage,
                        elements: Elements::NECROTIC,
                    },
                ),
            ],
            Encroachable::Fire => {
                if visitor.components.burnable.is_some() {
                    vec![EffectRecord::single(Effect::Burn(visitor.id))]
                } else {
                    Vec::new()
                }
            }
        }
    }
}

/// Stamina spent while in deep water
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swimmable {
    pub stamina: i32,
    pub max_stamina: i32,
}

impl Swimmable {
    pub fn new(stamina: i32) -> Self {
        Self {
            stamina,
            max_stamina: stamina,
        }
    }

    /// Spend a turn swimming; true once stamina has run out
    pub fn swim(&mut self) -> bool {
        self.stamina = (self.stamina - 1).max(0);
        self.stamina == 0
    }

    pub fn regenerate(&mut self, amount: i32) {
        self.stamina = (self.stamina + amount).min(self.max_stamina);
    }
}

/// Never needs to swim
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Floatable;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use proptest::prelude::*;

    #[test]
    fn test_swim_runs_out() {
        let mut s = Swimmable::new(2);
        assert!(!s.swim());
        assert!(s.swim());
        assert!(s.swim());
        assert_eq!(s.stamina, 0);
        s.regenerate(5);
        assert_eq!(s.stamina, 2);
    }

    #[test]
    fn test_fuel_burns_into_fire_in_one_record() {
        let config = EngineConfig::default();
        let mut shrub = maker::shrub(Point::new(3, 3));
        shrub.id = crate::entity::EntityId(9);
        let records = Burnable::Fuel.burn(&shrub, &config);
        assert_eq!(records.len(), 1);
        let effects = records[0].effects();
        assert!(matches!(effects[1], Effect::RemoveEntity(crate::entity::EntityId(9))));
        assert!(matches!(&effects[2], Effect::AddEntity(e) if e.pos == Point::new(3, 3)));
    }

    #[test]
    fn test_dissipate_certain_and_never() {
        let mut rng = GameRng::new(4);
        let steam = maker::steam(Point::new(1, 1), 0.0, 1.0);
        assert_eq!(Dissipatable { probability: 1.0 }.dissipate(&steam, &mut rng).len(), 1);
        assert!(Dissipatable { probability: 0.0 }.dissipate(&steam, &mut rng).is_empty());
    }

    #[test]
    fn test_steam_drifts_over_creatures_but_not_walls() {
        use crate::map::{GameMap, Rect};

        let mut map = GameMap::new(5, 3);
        map.carve_room(Rect::new(1, 1, 2, 0));
        let mut world = World::new(map);
        world.spawn(maker::orc(Point::new(3, 1)));
        let cloud = world.spawn(maker::steam(Point::new(2, 1), 1.0, 0.0));

        let steam = world.get(cloud).unwrap();
        let spreadable = steam.components.spreadable.unwrap();
        let mut rng = GameRng::new(3);
        let records = spreadable.spread(steam, &world, &mut rng, &EngineConfig::default());

        let mut targets: Vec<_> = records
            .iter()
            .flat_map(|r| r.effects())
            .filter_map(|e| match e {
                Effect::AddEntity(e) => Some(e.pos),
                _ => None,
            })
            .collect();
        targets.sort();
        assert_eq!(targets, vec![Point::new(1, 1), Point::new(3, 1)]);
    }

    proptest! {
        #[test]
        fn prop_steam_children_decay(
            spread in 0.0001f64..=1.0,
            dissipate in 0.0f64..0.9999,
            decay in 0.0f64..0.9999,
            growth in 0.0001f64..=1.0,
        ) {
            let (s, d) = steam_child(spread, dissipate, decay, growth);
            prop_assert!(s < spread);
            prop_assert!(d > dissipate);
            prop_assert!(d <= 1.0);
        }

        #[test]
        fn prop_steam_spread_terminates(spread in 0.0f64..=1.0, dissipate in 0.0f64..=1.0) {
            let config = EngineConfig::default();
            let (mut s, mut d) = (spread, dissipate);
            let mut generations = 0;
            while s > 0.01 && d < 0.99 {
                (s, d) = steam_child(s, d, config.steam_spread_decay, config.steam_dissipate_growth);
                generations += 1;
                prop_assert!(generations < 64);
            }
        }
    }
}
