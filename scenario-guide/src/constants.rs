//! Shared numeric constants for prompt logic.

/// Supply point tables are indexed by player count and stop at four players.
pub const MAX_PLAYER_COUNT: usize = 4;

/// A player count below one is treated as a solo game.
pub const MIN_PLAYER_COUNT: usize = 1;

/// Cost charged for a supply id that is missing from the prompt's catalog.
pub const DEFAULT_SUPPLY_COST: u32 = 1;
