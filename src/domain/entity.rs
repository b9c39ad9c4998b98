/// Entities: the Player and its pursuing Enemies.
/// Both live on grid coordinates and never own cells; all terrain
/// questions go through `Grid` by coordinate.

use super::tile::Coord;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn dx(self) -> i32 {
        match self {
            Facing::Left => -1,
            Facing::Right => 1,
        }
    }
}

/// One of the four unit moves.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Left,
    Right,
    Up,
    Down,
}

impl MoveDir {
    /// Pathfinder expansion order.
    pub const SEARCH_ORDER: [MoveDir; 4] = [MoveDir::Left, MoveDir::Right, MoveDir::Down, MoveDir::Up];

    pub fn delta(self) -> (i32, i32) {
        match self {
            MoveDir::Left => (-1, 0),
            MoveDir::Right => (1, 0),
            MoveDir::Up => (0, -1),
            MoveDir::Down => (0, 1),
        }
    }
}

/// A discrete player command for one frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Move(MoveDir),
    Dig(Facing),
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct EnemyId(pub usize);

/// Who is moving: the shared movement contract works on either.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ActorId {
    Player,
    Enemy(EnemyId),
}

#[derive(Clone, Debug)]
pub struct Player {
    pub x: usize,
    pub y: usize,
    pub lives: u32,
    /// Respawn anchor, moved to the spawn symbol of each level.
    pub spawn: Coord,
    pub coins: u32,
}

impl Player {
    pub fn new(x: usize, y: usize, lives: u32) -> Self {
        Player { x, y, lives, spawn: (x, y), coins: 0 }
    }

    pub fn pos(&self) -> Coord {
        (self.x, self.y)
    }

    pub fn is_alive(&self) -> bool {
        self.lives > 0
    }

    /// Reaching the top row completes the level.
    pub fn at_exit(&self) -> bool {
        self.y == 0
    }
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub id: EnemyId,
    pub x: usize,
    pub y: usize,
    /// Level-start position. Enemies die permanently, so this is
    /// informational only.
    pub spawn: Coord,
}

impl Enemy {
    pub fn new(id: EnemyId, x: usize, y: usize) -> Self {
        Enemy { id, x, y, spawn: (x, y) }
    }

    pub fn pos(&self) -> Coord {
        (self.x, self.y)
    }
}
