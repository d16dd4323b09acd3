//! Deferred effects
//!
//! Components and AI ticks never mutate shared state for side effects that
//! reach beyond their owner. They return [`EffectRecord`]s, which the turn
//! loop pushes onto a LIFO stack and applies one record at a time.

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::damage::Elements;
use crate::entity::{Entity, EntityId};
use crate::geometry::Point;

/// An animation request handed to the renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Animation {
    MagicMissile { source: Point, target: Point },
    Fireblast { center: Point, radius: i32 },
    /// Play one after another
    Concatenated(Vec<Animation>),
    /// Play together
    Simultaneous(Vec<Animation>),
}

/// One deferred consequence
#[derive(Debug, Clone, IntoStaticStr)]
pub enum Effect {
    Message(String),
    /// Raw damage; passes through the target's defender first
    Damage {
        source: Option<EntityId>,
        target: EntityId,
        amount: i32,
        elements: Elements,
    },
    /// Damage that has cleared the defender; negative heals
    Harm {
        target: EntityId,
        amount: i32,
        elements: Elements,
    },
    AddEntity(Box<Entity>),
    RemoveEntity(EntityId),
    DeadEntity(EntityId),
    MoveTowards {
        entity: EntityId,
        target: Point,
    },
    Move {
        entity: EntityId,
        dx: i32,
        dy: i32,
    },
    /// Fire touches an entity
    Burn(EntityId),
    /// Bud off a copy of `entity` holding `hp` of its hit points
    Split {
        entity: EntityId,
        hp: i32,
    },
    SwimCheck(EntityId),
    PickUp {
        entity: EntityId,
        item: EntityId,
    },
    Drop {
        entity: EntityId,
        item: EntityId,
    },
    Equip {
        entity: EntityId,
        item: EntityId,
    },
    Unequip {
        entity: EntityId,
        item: EntityId,
    },
    Consume {
        entity: EntityId,
        item: EntityId,
    },
    /// Suspends the turn loop until the renderer reports completion
    Animation(Animation),
    /// Marks the end of the effects an animation was holding back
    Restore,
}

impl Effect {
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

/// Effects applied together, in order, when popped
#[derive(Debug, Clone, Default)]
pub struct EffectRecord(pub Vec<Effect>);

impl EffectRecord {
    pub fn single(effect: Effect) -> Self {
        Self(vec![effect])
    }

    pub fn message(text: impl Into<String>) -> Self {
        Self::single(Effect::Message(text.into()))
    }

    pub fn with(mut self, effect: Effect) -> Self {
        self.0.push(effect);
        self
    }

    pub fn effects(&self) -> &[Effect] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_animation(&self) -> bool {
        self.0.iter().any(|e| matches!(e, Effect::Animation(_)))
    }

    /// Pull the first animation out, leaving the other effects in order
    pub fn split_animation(self) -> Result<(Animation, EffectRecord), EffectRecord> {
        if !self.has_animation() {
            return Err(self);
        }
        let mut animation = None;
        let rest = self
            .0
            .into_iter()
            .filter_map(|effect| match effect {
                Effect::Animation(a) if animation.is_none() => {
                    animation = Some(a);
                    None
                }
                other => Some(other),
            })
            .collect();
        match animation {
            Some(animation) => Ok((animation, EffectRecord(rest))),
            None => Err(EffectRecord(rest)),
        }
    }
}

impl From<Effect> for EffectRecord {
    fn from(effect: Effect) -> Self {
        Self::single(effect)
    }
}
