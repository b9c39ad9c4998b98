/// World: the complete state of a running game session.
///
/// ## Ownership
///
/// Two lifetimes live side by side:
///   - SESSION — `player` (lives, coins, respawn anchor). Survives level
///     loads; at most one player exists.
///   - LEVEL   — `grid`, `enemies` (+ their movement handles), `scheduler`,
///     `ladders_revealed`.
///     Replaced wholesale by `level::load_level`, so nothing leaks from
///     one level into the next (pending refills included).
///
/// All mutation rules live in `sim::step`; this module only stores state
/// and answers position queries.

use std::collections::BTreeMap;

use crate::config::RulesConfig;
use crate::domain::entity::{ActorId, Enemy, EnemyId, Player};
use crate::domain::grid::Grid;
use crate::domain::tile::Coord;
use super::event::{GameEvent, Task};
use super::scheduler::{EventHandle, Scheduler};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    LevelComplete,
    GameOver,
    Victory,
}

pub struct World {
    // ── Level ──
    pub grid: Grid,
    pub enemies: Vec<Enemy>,
    pub scheduler: Scheduler<Task>,
    /// Recurring movement event of each live enemy.
    pub enemy_moves: BTreeMap<EnemyId, EventHandle>,
    pub ladders_revealed: bool,
    pub level: usize,

    // ── Session ──
    pub player: Option<Player>,
    pub rules: RulesConfig,
    pub phase: Phase,

    next_enemy_id: usize,
    events: Vec<GameEvent>,
}

impl World {
    pub fn new(rules: RulesConfig) -> Self {
        World {
            grid: Grid::default(),
            enemies: vec![],
            scheduler: Scheduler::new(),
            enemy_moves: BTreeMap::new(),
            ladders_revealed: false,
            level: 0,
            player: None,
            rules,
            phase: Phase::Playing,
            next_enemy_id: 0,
            events: vec![],
        }
    }

    /// Reset per-level state. The player is kept.
    pub fn reset_level(&mut self, level: usize, grid: Grid) {
        self.grid = grid;
        self.enemies.clear();
        self.enemy_moves.clear();
        self.scheduler = Scheduler::new();
        self.ladders_revealed = false;
        self.level = level;
        self.phase = Phase::Playing;
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drain queued display notifications.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn alloc_enemy_id(&mut self) -> EnemyId {
        let id = EnemyId(self.next_enemy_id);
        self.next_enemy_id += 1;
        id
    }
}

// ── Position queries ──

impl World {
    /// Player position, only while the player still has lives.
    pub fn live_player_pos(&self) -> Option<Coord> {
        self.player.as_ref().filter(|p| p.is_alive()).map(Player::pos)
    }

    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    /// Live enemies standing exactly on `pos`.
    pub fn enemies_at(&self, pos: Coord) -> Vec<EnemyId> {
        self.enemies.iter().filter(|e| e.pos() == pos).map(|e| e.id).collect()
    }

    pub fn actor_pos(&self, actor: ActorId) -> Option<Coord> {
        match actor {
            ActorId::Player => self.player.as_ref().map(Player::pos),
            ActorId::Enemy(id) => self.enemy(id).map(Enemy::pos),
        }
    }

    pub fn set_actor_pos(&mut self, actor: ActorId, (x, y): Coord) {
        match actor {
            ActorId::Player => {
                if let Some(p) = self.player.as_mut() {
                    p.x = x;
                    p.y = y;
                }
            }
            ActorId::Enemy(id) => {
                if let Some(e) = self.enemies.iter_mut().find(|e| e.id == id) {
                    e.x = x;
                    e.y = y;
                }
            }
        }
    }
}
