//! Turn engine
//!
//! The engine owns the world and two LIFO stacks of pending effect records,
//! one for the player's turn and one for the enemy phase. Records are popped
//! and applied one at a time; whatever an effect produces is pushed back and
//! resolved before anything older, so consequences nest depth-first.
//!
//! Draining stops early in two cases: the player dies, or a record carries an
//! animation. In the second case the rest of the record and a
//! [`Effect::Restore`] marker are pushed back, and the caller plays the
//! animation and reports completion through [`Engine::animation_tick`].

mod dispatch;
mod phase;
mod player;

use std::collections::VecDeque;

use strum::{Display, EnumIter};
use tracing::info;

use crate::components::Uses;
use crate::config::EngineConfig;
use crate::effect::{Animation, Effect, EffectRecord};
use crate::entity::{Color, EntityId, RenderOrder};
use crate::geometry::Point;
use crate::rng::GameRng;
use crate::world::World;

use phase::PhaseStep;

/// Normalized player input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move { dx: i32, dy: i32 },
    Wait,
    Pickup,
    ShowInventory,
    DropInventory,
    ThrowInventory,
    InventoryIndex(usize),
    CursorSelect { x: i32, y: i32 },
    Cancel,
    Exit,
}

/// Global game state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum GameState {
    PlayerTurn,
    EnemyTurn,
    ShowInventory,
    DropInventory,
    ThrowInventory,
    Targeting,
    AnimationPlaying,
    PlayerDead,
    Exited,
}

/// What the caller should do next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Waiting for input
    Idle,
    /// Play this animation, then call [`Engine::animation_tick`]
    Animate(Animation),
    /// An animation is still in flight
    Animating,
    PlayerDied,
    Exit,
}

/// `(name, current, maximum)` triple for a status bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBar {
    pub name: &'static str,
    pub current: i32,
    pub maximum: i32,
}

/// What a renderer needs to draw one entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderEntity {
    pub id: EntityId,
    pub pos: Point,
    pub glyph: char,
    pub color: Color,
    pub render_order: RenderOrder,
}

/// Which stack is draining
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Player,
    Enemy,
}

/// The turn-resolution engine
#[derive(Debug)]
pub struct Engine {
    world: World,
    config: EngineConfig,
    rng: GameRng,
    state: GameState,
    phase: Phase,
    player_stack: Vec<EffectRecord>,
    enemy_stack: Vec<EffectRecord>,
    steps: VecDeque<PhaseStep>,
    /// Set when the queued player records spend the turn
    player_acted: bool,
    animation: Option<Animation>,
    animation_holds: u32,
    deferred_corpses: Vec<EntityId>,
    recently_harmed: VecDeque<EntityId>,
    messages: Vec<String>,
    pending_throw: Option<EntityId>,
    turn: u64,
}

impl Engine {
    pub fn new(world: World, config: EngineConfig, rng: GameRng) -> Self {
        let mut engine = Self {
            world,
            config,
            rng,
            state: GameState::PlayerTurn,
            phase: Phase::Player,
            player_stack: Vec::new(),
            enemy_stack: Vec::new(),
            steps: VecDeque::new(),
            player_acted: false,
            animation: None,
            animation_holds: 0,
            deferred_corpses: Vec::new(),
            recently_harmed: VecDeque::new(),
            messages: Vec::new(),
            pending_throw: None,
            turn: 0,
        };
        engine.recompute_fov();
        engine
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn player_id(&self) -> Option<EntityId> {
        self.world.player_id()
    }

    /// The animation currently being played, if any
    pub fn animation(&self) -> Option<&Animation> {
        self.animation.as_ref()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn drain_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }

    /// Recently harmed entities, oldest first
    pub fn recently_harmed(&self) -> Vec<EntityId> {
        self.recently_harmed.iter().copied().collect()
    }

    /// Entities awaiting corpse conversion until the current animation ends
    pub fn deferred_corpses(&self) -> &[EntityId] {
        &self.deferred_corpses
    }

    fn set_state(&mut self, state: GameState) {
        if self.state != state {
            info!(from = %self.state, to = %state, "game state");
            self.state = state;
        }
    }

    /// Feed one player action in
    pub fn handle_action(&mut self, action: Action) -> Outcome {
        match self.state {
            GameState::Exited => Outcome::Exit,
            GameState::PlayerDead => {
                if action == Action::Exit {
                    self.set_state(GameState::Exited);
                    Outcome::Exit
                } else {
                    Outcome::PlayerDied
                }
            }
            GameState::AnimationPlaying => Outcome::Animating,
            GameState::EnemyTurn => self.run(),
            _ => {
                // `None` means the player asked to quit
                let Some(turn) = self.player_action(action) else {
                    return Outcome::Exit;
                };
                if turn.records.is_empty() && !turn.consumes_turn {
                    return Outcome::Idle;
                }
                self.player_acted = turn.consumes_turn;
                self.submit(turn.records)
            }
        }
    }

    /// Queue records on the player stack and resolve them.
    ///
    /// This is also the entry point for outside requests (scripted spawns,
    /// tests); they do not end the player's turn unless an action already
    /// spent it.
    pub fn submit(&mut self, records: Vec<EffectRecord>) -> Outcome {
        match self.state {
            GameState::PlayerDead => return Outcome::PlayerDied,
            GameState::Exited => return Outcome::Exit,
            GameState::AnimationPlaying => return Outcome::Animating,
            _ => {}
        }
        self.phase = Phase::Player;
        self.player_stack.extend(records);
        self.run()
    }

    /// Report animation progress; `finished` resumes the turn loop
    pub fn animation_tick(&mut self, finished: bool) -> Outcome {
        if self.state != GameState::AnimationPlaying {
            return Outcome::Idle;
        }
        if !finished {
            return Outcome::Animating;
        }
        info!("animation finished, resuming");
        self.animation = None;
        self.set_state(match self.phase {
            Phase::Player => GameState::PlayerTurn,
            Phase::Enemy => GameState::EnemyTurn,
        });
        self.run()
    }

    /// Drain stacks and step the enemy phase until input is needed
    fn run(&mut self) -> Outcome {
        loop {
            if let Some(outcome) = self.drain() {
                return outcome;
            }
            match self.phase {
                Phase::Player => {
                    if !std::mem::take(&mut self.player_acted) {
                        return Outcome::Idle;
                    }
                    self.begin_enemy_phase();
                }
                Phase::Enemy => {
                    let Some(step) = self.steps.pop_front() else {
                        self.end_enemy_phase();
                        return Outcome::Idle;
                    };
                    let records = self.run_step(step);
                    self.enemy_stack.extend(records);
                }
            }
        }
    }

    fn stack(&mut self) -> &mut Vec<EffectRecord> {
        match self.phase {
            Phase::Player => &mut self.player_stack,
            Phase::Enemy => &mut self.enemy_stack,
        }
    }

    /// Pop and apply records until the active stack is empty; returns an
    /// outcome when draining has to stop early
    fn drain(&mut self) -> Option<Outcome> {
        while let Some(record) = self.stack().pop() {
            let record = match record.split_animation() {
                Ok((animation, rest)) => {
                    self.stack().push(EffectRecord::single(Effect::Restore));
                    if !rest.is_empty() {
                        self.stack().push(rest);
                    }
                    self.animation_holds += 1;
                    self.animation = Some(animation.clone());
                    info!(holds = self.animation_holds, ?animation, "suspending for animation");
                    self.set_state(GameState::AnimationPlaying);
                    return Some(Outcome::Animate(animation));
                }
                Err(record) => record,
            };

            let mut produced = Vec::new();
            for effect in record.0 {
                produced.extend(self.apply(effect));
                if self.state == GameState::PlayerDead {
                    self.abort_turn();
                    return Some(Outcome::PlayerDied);
                }
            }
            self.stack().extend(produced);
        }
        None
    }

    /// Player death: nothing queued matters any more
    fn abort_turn(&mut self) {
        self.player_stack.clear();
        self.enemy_stack.clear();
        self.steps.clear();
        self.animation = None;
        self.animation_holds = 0;
        self.flush_corpses();
    }

    fn recompute_fov(&mut self) {
        if let Some(pos) = self.world.player().map(|p| p.pos) {
            self.world.map.compute_fov(pos, self.config.fov_radius);
        }
    }

    /// HP and, for swimmers, stamina
    pub fn status_bars(&self, entity: EntityId) -> Vec<StatusBar> {
        let Some(e) = self.world.get(entity) else {
            return Vec::new();
        };
        let mut bars = Vec::new();
        if let Some(v) = e.components.harmable.vitality() {
            bars.push(StatusBar {
                name: "HP",
                current: v.hp,
                maximum: v.max_hp,
            });
        }
        if let Some(s) = e.components.swimmable {
            bars.push(StatusBar {
                name: "Stamina",
                current: s.stamina,
                maximum: s.max_stamina,
            });
        }
        bars
    }

    /// Entities in draw order, terrain first
    pub fn render_list(&self) -> Vec<RenderEntity> {
        let mut list: Vec<_> = self
            .world
            .entities()
            .map(|e| RenderEntity {
                id: e.id,
                pos: e.pos,
                glyph: e.glyph,
                color: e.color,
                render_order: e.render_order,
            })
            .collect();
        list.sort_by_key(|r| r.render_order);
        list
    }

    /// Player inventory as `(name, equipped, uses left)` lines for menus
    pub fn inventory_listing(&self) -> Vec<(String, bool, Option<u32>)> {
        let Some(player) = self.world.player() else {
            return Vec::new();
        };
        let equipment = player.components.equipment.unwrap_or_default();
        player
            .components
            .inventory
            .iter()
            .flat_map(|inv| inv.items.iter())
            .map(|item| {
                let uses = item.components.consumable.and_then(|c| match c.uses {
                    Uses::Finite(n) => Some(n),
                    Uses::Infinite => None,
                });
                (item.name.clone(), equipment.is_equipped(item.id), uses)
            })
            .collect()
    }
}
