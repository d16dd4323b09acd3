//! Error types
//!
//! Only boundary operations (loading configuration, parsing an arena) return
//! errors. Inside the turn loop a failed action is a message, never an `Err`.

use thiserror::Error;

/// Configuration loading and validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Could not read config '{path}': {reason}")]
    CouldNotRead { path: String, reason: String },

    #[error("Malformed config: {0}")]
    Malformed(String),

    #[error("Config value '{field}' = {value} is outside {range}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        range: &'static str,
    },

    #[error("Config value '{field}' must be greater than zero")]
    Zero { field: &'static str },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Malformed(err.to_string())
    }
}

/// Arena layout parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
    #[error("Could not read arena '{path}': {reason}")]
    CouldNotRead { path: String, reason: String },

    #[error("Arena layout is empty")]
    Empty,

    #[error("Row {row} has width {found}, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Unknown glyph '{glyph}' at ({x}, {y})")]
    UnknownGlyph { glyph: char, x: i32, y: i32 },

    #[error("Arena has no player start")]
    MissingPlayer,

    #[error("Second player start at ({x}, {y})")]
    DuplicatePlayer { x: i32, y: i32 },
}

/// Any error surfaced by the crate's public boundary
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DelveError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Arena(#[from] ArenaError),
}

pub type Result<T> = core::result::Result<T, DelveError>;
