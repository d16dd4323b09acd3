//! Damage pipeline
//!
//! Raw damage passes through an ordered chain of transformers (armor,
//! elemental resistance, weapon bonuses) before it turns into HP loss.
//! Callbacks observe the transformed amount and may queue further effects
//! (reflection, sweeping blows) but never change the amount itself.
//! Healing is negative damage tagged [`Elements::HEALING`].

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::effect::{Effect, EffectRecord};
use crate::entity::EntityId;
use crate::world::World;

bitflags! {
    /// Element tags carried by a damage effect
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Elements: u8 {
        const PHYSICAL = 0x01;
        const FIRE = 0x02;
        const WATER = 0x04;
        const NECROTIC = 0x08;
        const MAGIC = 0x10;
        const HEALING = 0x20;
    }
}

impl Serialize for Elements {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Elements {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(Elements::from_bits_truncate(bits))
    }
}

/// A step in the damage pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageTransformer {
    /// Reduce damage carrying `element` by `strength`, floored at zero.
    /// A negative strength is a weakness.
    Elemental { strength: i32, element: Elements },
    /// Reduce physical damage by `defense`, floored at zero
    Armor { defense: i32 },
    /// Add to outgoing damage
    Bonus { amount: i32 },
    /// Tag outgoing damage with an extra element
    Imbue { element: Elements },
}

impl DamageTransformer {
    /// Apply this step; healing (non-positive amounts) passes through untouched
    pub fn transform(&self, amount: i32, elements: Elements) -> (i32, Elements) {
        if amount <= 0 {
            return (amount, elements);
        }
        match *self {
            DamageTransformer::Elemental { strength, element } => {
                if elements.intersects(element) {
                    ((amount - strength).max(0), elements)
                } else {
                    (amount, elements)
                }
            }
            DamageTransformer::Armor { defense } => {
                if elements.contains(Elements::PHYSICAL) {
                    ((amount - defense).max(0), elements)
                } else {
                    (amount, elements)
                }
            }
            DamageTransformer::Bonus { amount: bonus } => ((amount + bonus).max(0), elements),
            DamageTransformer::Imbue { element } => (amount, elements | element),
        }
    }
}

/// What a callback gets to observe about a blow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageContext {
    pub source: Option<EntityId>,
    pub target: EntityId,
    pub amount: i32,
    pub elements: Elements,
}

/// Side effects triggered by a blow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageCallback {
    /// Defender side: send up to `amount` back at the source.
    /// Reflected damage carries no source, so it cannot bounce again.
    Reflect { amount: i32 },
    /// Attacker side: also strike the two tiles flanking the target
    Sweep,
}

impl DamageCallback {
    pub fn invoke(&self, ctx: &DamageContext, world: &World) -> Vec<EffectRecord> {
        match *self {
            DamageCallback::Reflect { amount } => {
                let Some(source) = ctx.source else {
                    return Vec::new();
                };
                let reflected = amount.min(ctx.amount);
                if reflected <= 0 || world.get(source).is_none() {
                    return Vec::new();
                }
                let name = world.name_of(ctx.target);
                vec![
                    EffectRecord::message(format!("{name}'s armor reflects the blow."))
                        .with(Effect::Damage {
                            source: None,
                            target: source,
                            amount: reflected,
                            elements: ctx.elements,
                        }),
                ]
            }
            DamageCallback::Sweep => sweep(ctx, world),
        }
    }
}

fn sweep(ctx: &DamageContext, world: &World) -> Vec<EffectRecord> {
    let Some(source) = ctx.source.and_then(|id| world.get(id)) else {
        return Vec::new();
    };
    let Some(target) = world.get(ctx.target) else {
        return Vec::new();
    };
    let Some(dir) = source.pos.direction_to(target.pos) else {
        return Vec::new();
    };
    if ctx.amount <= 0 {
        return Vec::new();
    }

    [dir.rotate_ccw(), dir.rotate_cw()]
        .into_iter()
        .filter_map(|flank| world.blocking_at(source.pos + flank))
        .filter(|victim| victim.id != source.id && !victim.components.harmable.is_null())
        .map(|victim| {
            EffectRecord::message(format!("The sweep catches {}.", victim.name)).with(
                Effect::Damage {
                    source: Some(source.id),
                    target: victim.id,
                    amount: ctx.amount,
                    elements: ctx.elements,
                },
            )
        })
        .collect()
}

/// Where a pipeline entry came from; equipment entries are removed by origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    Intrinsic,
    Item(EntityId),
}

/// A pipeline entry tagged with its origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifier<T> {
    pub origin: Origin,
    pub value: T,
}

/// Ordered transformers and callbacks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    transformers: Vec<Modifier<DamageTransformer>>,
    callbacks: Vec<Modifier<DamageCallback>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form for intrinsic transformers
    pub fn with_transformer(mut self, transformer: DamageTransformer) -> Self {
        self.add_transformer(Origin::Intrinsic, transformer);
        self
    }

    /// Builder form for intrinsic callbacks
    pub fn with_callback(mut self, callback: DamageCallback) -> Self {
        self.add_callback(Origin::Intrinsic, callback);
        self
    }

    pub fn add_transformer(&mut self, origin: Origin, transformer: DamageTransformer) {
        self.transformers.push(Modifier {
            origin,
            value: transformer,
        });
    }

    pub fn add_callback(&mut self, origin: Origin, callback: DamageCallback) {
        self.callbacks.push(Modifier {
            origin,
            value: callback,
        });
    }

    /// Remove every entry added under `origin`, returning how many went
    pub fn remove_origin(&mut self, origin: Origin) -> usize {
        let before = self.transformers.len() + self.callbacks.len();
        self.transformers.retain(|m| m.origin != origin);
        self.callbacks.retain(|m| m.origin != origin);
        before - self.transformers.len() - self.callbacks.len()
    }

    pub fn transformers(&self) -> &[Modifier<DamageTransformer>] {
        &self.transformers
    }

    pub fn callbacks(&self) -> &[Modifier<DamageCallback>] {
        &self.callbacks
    }

    /// Run every transformer in registration order
    pub fn transform(&self, amount: i32, elements: Elements) -> (i32, Elements) {
        self.transformers
            .iter()
            .fold((amount, elements), |(amount, elements), m| {
                m.value.transform(amount, elements)
            })
    }

    /// Run every callback against the (already transformed) blow
    pub fn notify(&self, ctx: &DamageContext, world: &World) -> Vec<EffectRecord> {
        self.callbacks
            .iter()
            .flat_map(|m| m.value.invoke(ctx, world))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_elemental_only_matches_its_element() {
        let resist = DamageTransformer::Elemental {
            strength: 3,
            element: Elements::FIRE,
        };
        assert_eq!(resist.transform(5, Elements::FIRE), (2, Elements::FIRE));
        assert_eq!(resist.transform(5, Elements::PHYSICAL), (5, Elements::PHYSICAL));
        assert_eq!(resist.transform(2, Elements::FIRE), (0, Elements::FIRE));
    }

    #[test]
    fn test_weakness_amplifies() {
        let weak = DamageTransformer::Elemental {
            strength: -2,
            element: Elements::FIRE,
        };
        assert_eq!(weak.transform(3, Elements::FIRE).0, 5);
    }

    #[test]
    fn test_healing_passes_through() {
        let armor = DamageTransformer::Armor { defense: 4 };
        assert_eq!(
            armor.transform(-5, Elements::HEALING),
            (-5, Elements::HEALING)
        );
    }

    #[test]
    fn test_pipeline_runs_in_registration_order() {
        let pipeline = Pipeline::new()
            .with_transformer(DamageTransformer::Armor { defense: 2 })
            .with_transformer(DamageTransformer::Bonus { amount: 1 });
        // 1 - 2 floors at 0, then +1
        assert_eq!(pipeline.transform(1, Elements::PHYSICAL).0, 1);

        let reversed = Pipeline::new()
            .with_transformer(DamageTransformer::Bonus { amount: 1 })
            .with_transformer(DamageTransformer::Armor { defense: 2 });
        assert_eq!(reversed.transform(1, Elements::PHYSICAL).0, 0);
    }

    #[test]
    fn test_remove_origin_is_by_identity() {
        let bonus = DamageTransformer::Bonus { amount: 2 };
        let mut pipeline = Pipeline::new().with_transformer(bonus);
        pipeline.add_transformer(Origin::Item(EntityId(7)), bonus);
        pipeline.add_transformer(Origin::Item(EntityId(8)), bonus);

        assert_eq!(pipeline.remove_origin(Origin::Item(EntityId(7))), 1);
        assert_eq!(pipeline.transformers().len(), 2);
        assert_eq!(pipeline.transformers()[1].origin, Origin::Item(EntityId(8)));
    }

    proptest! {
        #[test]
        fn prop_elemental_reduces_only_on_match(
            amount in 0i32..200,
            strength in 0i32..50,
            hit_bits in 0u8..64,
        ) {
            let element = Elements::FIRE;
            let elements = Elements::from_bits_truncate(hit_bits);
            let t = DamageTransformer::Elemental { strength, element };
            let (out, tags) = t.transform(amount, elements);
            prop_assert_eq!(tags, elements);
            if elements.contains(element) && amount > 0 {
                prop_assert_eq!(out, (amount - strength).max(0));
            } else {
                prop_assert_eq!(out, amount);
            }
            prop_assert!(out >= 0);
        }
    }
}
