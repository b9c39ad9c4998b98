pub mod entity;
pub mod grid;
pub mod pathfind;
pub mod rules;
pub mod tile;
