//! Engine constants
//!
//! Tuning defaults mirror the reference content; every probability here can be
//! overridden through [`crate::EngineConfig`].

/// Sight radius used for the player's field of view
pub const DEFAULT_FOV_RADIUS: i32 = 8;

/// Fire spread/burn-out chances per turn
pub const FIRE_SPREAD_PROBABILITY: f64 = 0.3;
pub const FIRE_DISSIPATE_PROBABILITY: f64 = 0.2;

/// Steam spread/dissipate chances per turn for a first-generation cloud
pub const STEAM_SPREAD_PROBABILITY: f64 = 0.4;
pub const STEAM_DISSIPATE_PROBABILITY: f64 = 0.15;

/// Each steam generation multiplies its spread chance by this factor
pub const STEAM_SPREAD_DECAY: f64 = 0.5;

/// Each steam generation closes this fraction of the gap between its
/// dissipate chance and certainty
pub const STEAM_DISSIPATE_GROWTH: f64 = 0.25;

/// Attempts made when searching for a random free tile
pub const SPAWN_MAX_TRIES: u32 = 10;

/// Inventory slots (a-z)
pub const INVENTORY_CAPACITY: usize = 26;

/// Entries kept in the recently-harmed display queue
pub const RECENTLY_HARMED_LIMIT: usize = 3;

/// Swimming
pub const SWIM_STAMINA: i32 = 5;
pub const DROWN_DAMAGE: i32 = 3;
pub const STAMINA_REGEN: i32 = 1;

/// Damage dealt by necrotic soil to whatever stands on it
pub const NECROTIC_DAMAGE: i32 = 2;

/// Damage dealt to flesh standing in fire
pub const BURN_DAMAGE: i32 = 2;

/// Map glyphs
pub const S_WALL: char = '#';
pub const S_FLOOR: char = '.';
pub const S_WATER: char = '~';
pub const S_ICE: char = '_';
pub const S_SHRUB: char = '"';
pub const S_GRASS: char = ',';
pub const S_NECROTIC: char = '&';
pub const S_FIRE: char = '^';
pub const S_STEAM: char = ':';
pub const S_CORPSE: char = '%';
pub const S_PLAYER: char = '@';
