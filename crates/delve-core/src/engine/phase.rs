//! Enemy phase
//!
//! The phase is scheduled up front as a list of steps over the entities alive
//! when it begins, so it can pause for an animation partway through and pick
//! up where it left off. Entities spawned during the phase act next turn.

use std::collections::VecDeque;

use tracing::debug;

use super::{Engine, GameState, Phase};
use crate::effect::EffectRecord;
use crate::entity::{Entity, EntityId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum PhaseStep {
    /// Terrain reacts to whatever stands on it
    Encroach(EntityId),
    /// Tick an AI
    Act(EntityId),
    Spread(EntityId),
    Dissipate(EntityId),
    /// Stamina regeneration and a fresh field of view
    EndTurn,
}

impl Engine {
    pub(super) fn begin_enemy_phase(&mut self) {
        self.phase = Phase::Enemy;
        self.set_state(GameState::EnemyTurn);
        self.recompute_fov();

        let player = self.world.player_id();
        let world = &self.world;
        let ids_with = |has: fn(&Entity) -> bool| -> Vec<EntityId> {
            world.entities().filter(|e| has(e)).map(|e| e.id).collect()
        };

        let mut steps = VecDeque::new();
        steps.extend(player.map(PhaseStep::Encroach));
        steps.extend(ids_with(|e| e.components.ai.is_some()).into_iter().map(PhaseStep::Act));
        steps.extend(
            ids_with(|e| e.components.spreadable.is_some())
                .into_iter()
                .map(PhaseStep::Spread),
        );
        steps.extend(
            ids_with(|e| e.components.dissipatable.is_some())
                .into_iter()
                .map(PhaseStep::Dissipate),
        );
        steps.extend(
            ids_with(|e| e.components.movable.is_some())
                .into_iter()
                .filter(|id| Some(*id) != player)
                .map(PhaseStep::Encroach),
        );
        steps.push_back(PhaseStep::EndTurn);

        debug!(turn = self.turn, steps = steps.len(), "enemy phase scheduled");
        self.steps = steps;
    }

    pub(super) fn end_enemy_phase(&mut self) {
        self.phase = Phase::Player;
        self.turn += 1;
        self.set_state(GameState::PlayerTurn);
    }

    pub(super) fn run_step(&mut self, step: PhaseStep) -> Vec<EffectRecord> {
        match step {
            PhaseStep::Encroach(id) => self.encroach_on_all(id),
            PhaseStep::Act(id) => self.act(id),
            PhaseStep::Spread(id) => match self.world.get(id) {
                Some(e) => e
                    .components
                    .spreadable
                    .map(|s| s.spread(e, &self.world, &mut self.rng, &self.config))
                    .unwrap_or_default(),
                None => Vec::new(),
            },
            PhaseStep::Dissipate(id) => match self.world.get(id) {
                Some(e) => e
                    .components
                    .dissipatable
                    .map(|d| d.dissipate(e, &mut self.rng))
                    .unwrap_or_default(),
                None => Vec::new(),
            },
            PhaseStep::EndTurn => {
                self.regenerate_stamina();
                self.recompute_fov();
                Vec::new()
            }
        }
    }

    /// Tick one AI against the player. The tree is taken out of its owner
    /// while it runs so the owner stays readable through the world.
    fn act(&mut self, id: EntityId) -> Vec<EffectRecord> {
        let Some(target) = self.world.player_id() else {
            return Vec::new();
        };
        let Some(mut ai) = self.world.get_mut(id).and_then(|e| e.components.ai.take()) else {
            return Vec::new();
        };
        let tick = ai
            .tree
            .tick(id, target, &self.world, &mut self.rng, &self.config);
        if let Some(e) = self.world.get_mut(id) {
            e.components.ai = Some(ai);
        }
        tick.effects
    }

    /// Reactions of every encroachable entity sharing `id`'s tile.
    /// Remains of something killed earlier in the phase trigger nothing.
    pub fn encroach_on_all(&self, id: EntityId) -> Vec<EffectRecord> {
        let Some(visitor) = self.world.get(id) else {
            return Vec::new();
        };
        if !visitor.is_alive() || visitor.components.movable.is_none() {
            return Vec::new();
        }
        self.world
            .entities_at(visitor.pos)
            .filter(|e| e.id != id)
            .filter_map(|e| e.components.encroachable.map(|enc| enc.encroach(e, visitor)))
            .flatten()
            .collect()
    }

    fn regenerate_stamina(&mut self) {
        let regen = self.config.stamina_regen;
        let dry: Vec<_> = self
            .world
            .entities()
            .filter(|e| e.components.swimmable.is_some() && !self.world.map.is_water(e.pos))
            .map(|e| e.id)
            .collect();
        for id in dry {
            if let Some(s) = self
                .world
                .get_mut(id)
                .and_then(|e| e.components.swimmable.as_mut())
            {
                s.regenerate(regen);
            }
        }
    }
}
