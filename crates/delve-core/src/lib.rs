//! delve-core: turn-resolution engine for a component-based dungeon crawler
//!
//! This crate contains the entity/component model, the behavior-tree AI
//! evaluator, the shared map state and the deferred-effect turn loop.
//! It performs no rendering and reads no input devices: callers feed it
//! normalized [`Action`]s and play back the [`Animation`]s it asks for.

pub mod arena;
pub mod behavior;
pub mod components;
pub mod config;
pub mod damage;
pub mod effect;
pub mod engine;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod maker;
pub mod map;
pub mod world;

mod consts;
mod rng;

pub use arena::Arena;
pub use config::EngineConfig;
pub use consts::*;
pub use damage::Elements;
pub use effect::{Animation, Effect, EffectRecord};
pub use engine::{Action, Engine, GameState, Outcome, RenderEntity, StatusBar};
pub use entity::{Entity, EntityId, RenderOrder};
pub use error::{ArenaError, ConfigError, DelveError, Result};
pub use geometry::{Direction, Point};
pub use map::{GameMap, Layer, TileFlags};
pub use rng::GameRng;
pub use world::World;
