/// Events emitted during simulation.
/// The presentation layer consumes these as fire-and-forget display
/// notifications; nothing in the core waits on how they are handled.

use crate::domain::entity::{ActorId, EnemyId};
use crate::domain::tile::Coord;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// One-cell shift of an actor (walk, climb or fall step).
    ActorMoved { actor: ActorId, dx: i32, dy: i32 },
    /// Actor placed directly, without walking (spawn / respawn).
    ActorPlaced { actor: ActorId, x: usize, y: usize },
    EnemyRemoved { id: EnemyId },
    CellHidden { x: usize, y: usize },
    CellShown { x: usize, y: usize },
    CellCleared { x: usize, y: usize },
    GoldCollected { x: usize, y: usize, coins: u32 },
    LivesChanged { lives: u32 },
    LaddersRevealed { count: usize },
    LevelComplete,
    Victory,
    Defeat,
}

/// Payloads carried by the tick scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    /// Recurring chase step for one enemy.
    EnemyMove(EnemyId),
    /// Restore a dug brick and crush whoever stands in it.
    Refill(Coord),
}
