//! Lode Runner simulation core: tile grid, tick scheduler, enemy
//! pathfinding and the rules that tie them together.
//!
//! The terminal front end lives in the binary (`src/main.rs`, `src/ui/`).

pub mod config;
pub mod domain;
pub mod sim;
