//! Attacker, Harmable and Defender

use serde::{Deserialize, Serialize};

use crate::damage::{DamageContext, Elements, Pipeline};
use crate::effect::{Effect, EffectRecord};
use crate::entity::EntityId;
use crate::world::World;

/// Deals melee blows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attacker {
    pub power: i32,
    pub elements: Elements,
    /// Outgoing transformers and callbacks (weapon bonuses, sweeps)
    pub pipeline: Pipeline,
}

impl Attacker {
    pub fn new(power: i32) -> Self {
        Self {
            power,
            elements: Elements::PHYSICAL,
            pipeline: Pipeline::new(),
        }
    }

    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Blow dealt by this attacker before the target's defences
    pub fn outgoing(&self) -> (i32, Elements) {
        self.pipeline.transform(self.power, self.elements)
    }

    /// Strike `target`.
    ///
    /// The main blow is the last record so it resolves before anything the
    /// outgoing callbacks queued.
    pub fn attack(&self, owner: EntityId, target: EntityId, world: &World) -> Vec<EffectRecord> {
        let (amount, elements) = self.outgoing();
        let ctx = DamageContext {
            source: Some(owner),
            target,
            amount,
            elements,
        };

        let mut records = self.pipeline.notify(&ctx, world);
        records.push(
            EffectRecord::message(format!(
                "{} attacks {}.",
                world.name_of(owner),
                world.name_of(target)
            ))
            .with(Effect::Damage {
                source: Some(owner),
                target,
                amount,
                elements,
            }),
        );
        records
    }
}

/// Hit points and incoming resistances
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vitality {
    pub hp: i32,
    pub max_hp: i32,
    pub pipeline: Pipeline,
}

impl Vitality {
    pub fn new(hp: i32) -> Self {
        Self {
            hp,
            max_hp: hp,
            pipeline: Pipeline::new(),
        }
    }
}

/// Result of a harm call
#[derive(Debug, Clone, Default)]
pub struct HarmOutcome {
    /// HP actually lost; negative when healed
    pub taken: i32,
    pub records: Vec<EffectRecord>,
}

/// Takes damage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Harmable {
    #[default]
    Null,
    Standard(Vitality),
    /// Splits off a clone with half its HP whenever it survives a hit
    PinkJelly(Vitality),
}

impl Harmable {
    pub fn standard(hp: i32) -> Self {
        Harmable::Standard(Vitality::new(hp))
    }

    pub fn pink_jelly(hp: i32) -> Self {
        Harmable::PinkJelly(Vitality::new(hp))
    }

    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        if let Some(v) = self.vitality_mut() {
            v.pipeline = pipeline;
        }
        self
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Harmable::Null)
    }

    pub fn vitality(&self) -> Option<&Vitality> {
        match self {
            Harmable::Null => None,
            Harmable::Standard(v) | Harmable::PinkJelly(v) => Some(v),
        }
    }

    pub fn vitality_mut(&mut self) -> Option<&mut Vitality> {
        match self {
            Harmable::Null => None,
            Harmable::Standard(v) | Harmable::PinkJelly(v) => Some(v),
        }
    }

    pub fn hp(&self) -> Option<i32> {
        self.vitality().map(|v| v.hp)
    }

    /// Apply damage (or healing, when negative) to `owner`.
    ///
    /// Death is reported as a [`Effect::DeadEntity`] record; HP is left as
    /// computed, negative values included.
    pub fn harm(&mut self, owner: EntityId, amount: i32, elements: Elements) -> HarmOutcome {
        let splits = matches!(self, Harmable::PinkJelly(_));
        let Some(v) = self.vitality_mut() else {
            return HarmOutcome::default();
        };

        let (amount, _) = v.pipeline.transform(amount, elements);
        let before = v.hp;
        v.hp = if amount < 0 {
            // healing never lifts HP past max, nor lowers an overhealed value
            (v.hp - amount).min(v.max_hp.max(v.hp))
        } else {
            v.hp - amount
        };

        let mut records = Vec::new();
        if v.hp <= 0 {
            records.push(EffectRecord::single(Effect::DeadEntity(owner)));
        } else if splits && amount > 0 && v.hp >= 2 {
            records.push(EffectRecord::single(Effect::Split {
                entity: owner,
                hp: v.hp / 2,
            }));
        }

        HarmOutcome {
            taken: before - v.hp,
            records,
        }
    }
}

/// Applies incoming transformers and callbacks before harm
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defender {
    pub pipeline: Pipeline,
}

impl Defender {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    /// Transform an incoming blow and collect the callbacks it triggers.
    /// Callbacks see the transformed amount.
    pub fn transform(
        &self,
        ctx: DamageContext,
        world: &World,
    ) -> (DamageContext, Vec<EffectRecord>) {
        let (amount, elements) = self.pipeline.transform(ctx.amount, ctx.elements);
        let ctx = DamageContext {
            amount,
            elements,
            ..ctx
        };
        let records = self.pipeline.notify(&ctx, world);
        (ctx, records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::damage::DamageTransformer;

    const ORC: EntityId = EntityId(5);

    fn is_dead(records: &[EffectRecord]) -> usize {
        records
            .iter()
            .flat_map(|r| r.effects())
            .filter(|e| matches!(e, Effect::DeadEntity(ORC)))
            .count()
    }

    #[test]
    fn test_harm_survivable() {
        let mut orc = Harmable::standard(10);
        let out = orc.harm(ORC, 3, Elements::PHYSICAL);
        assert_eq!(out.taken, 3);
        assert_eq!(orc.hp(), Some(7));
        assert_eq!(is_dead(&out.records), 0);
    }

    #[test]
    fn test_harm_lethal_keeps_negative_hp() {
        let mut orc = Harmable::standard(10);
        orc.vitality_mut().unwrap().hp = 3;
        let out = orc.harm(ORC, 5, Elements::PHYSICAL);
        assert_eq!(orc.hp(), Some(-2));
        assert_eq!(is_dead(&out.records), 1);
    }

    #[test]
    fn test_healing_caps_at_max() {
        let mut orc = Harmable::standard(10);
        orc.harm(ORC, 4, Elements::PHYSICAL);
        let out = orc.harm(ORC, -10, Elements::HEALING);
        assert_eq!(orc.hp(), Some(10));
        assert_eq!(out.taken, -4);
    }

    #[test]
    fn test_resistance_applies_before_hp_loss() {
        let pipeline = Pipeline::new().with_transformer(DamageTransformer::Elemental {
            strength: 2,
            element: Elements::NECROTIC,
        });
        let mut zombie = Harmable::standard(6).with_pipeline(pipeline);
        zombie.harm(ORC, 3, Elements::NECROTIC);
        assert_eq!(zombie.hp(), Some(5));
        zombie.harm(ORC, 3, Elements::PHYSICAL);
        assert_eq!(zombie.hp(), Some(2));
    }

    #[test]
    fn test_null_harmable_is_inert() {
        let mut null = Harmable::Null;
        let out = null.harm(ORC, 50, Elements::PHYSICAL);
        assert_eq!(out.taken, 0);
        assert!(out.records.is_empty());
    }

    #[test]
    fn test_pink_jelly_splits_on_survivable_hit() {
        let mut jelly = Harmable::pink_jelly(20);
        let out = jelly.harm(ORC, 4, Elements::PHYSICAL);
        assert_eq!(jelly.hp(), Some(16));
        let split = out
            .records
            .iter()
            .flat_map(|r| r.effects())
            .find_map(|e| match e {
                Effect::Split { hp, .. } => Some(*hp),
                _ => None,
            });
        assert_eq!(split, Some(8));
    }

    #[test]
    fn test_pink_jelly_does_not_split_when_too_small() {
        let mut jelly = Harmable::pink_jelly(3);
        let out = jelly.harm(ORC, 2, Elements::PHYSICAL);
        assert_eq!(jelly.hp(), Some(1));
        assert!(out.records.is_empty());
    }

    #[test]
    fn test_attacker_outgoing_applies_bonus() {
        let attacker = Attacker::new(3)
            .with_pipeline(Pipeline::new().with_transformer(DamageTransformer::Bonus { amount: 2 }));
        assert_eq!(attacker.outgoing(), (5, Elements::PHYSICAL));
    }
}
