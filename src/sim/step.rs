/// Simulation rules applied to the world: movement, gravity, digging,
/// refills, enemy pursuit and the per-frame tick.
///
/// Processing order of one frame:
///   1. Player command (move or dig), with gravity and pickups
///   2. Scheduler tick: due enemy moves and refills fire in FIFO order
///   3. Exit reveal once the last gold is gone
///   4. Exit check (player on the top row)
///
/// ## Player post-move hooks
/// Run once at the final position, after any chained fall, whenever
/// the player actually changed cell:
///   collect gold → enemy contact (lose a life)
///
/// Enemies only check contact in their own movement callback; an enemy
/// that falls onto the player does not hurt it until its next move.

use crate::domain::entity::{ActorId, Command, Enemy, EnemyId, Facing, MoveDir};
use crate::domain::pathfind;
use crate::domain::rules;
use crate::domain::tile::Coord;
use super::event::{GameEvent, Task};
use super::world::{Phase, World};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

/// Advance the world by one frame and return the display events it produced.
pub fn frame(world: &mut World, command: Option<Command>) -> Vec<GameEvent> {
    if world.phase != Phase::Playing {
        return world.take_events();
    }

    if let Some(command) = command {
        apply_command(world, command);
    }
    if world.phase == Phase::Playing {
        advance(world);
    }
    if world.phase == Phase::Playing {
        reveal_exit_if_ready(world);
        if world.player.as_ref().is_some_and(|p| p.is_alive() && p.at_exit()) {
            world.phase = Phase::LevelComplete;
            world.emit(GameEvent::LevelComplete);
            log::info!("level {} complete", world.level);
        }
    }

    world.take_events()
}

/// Returns true if the command changed anything.
pub fn apply_command(world: &mut World, command: Command) -> bool {
    match command {
        Command::Move(dir) => player_move(world, dir),
        Command::Dig(facing) => player_dig(world, facing),
    }
}

/// One scheduler tick: fire and dispatch everything due.
pub fn advance(world: &mut World) {
    for fired in world.scheduler.advance() {
        log::trace!("tick {}: {:?}", fired.tick, fired.payload);
        match fired.payload {
            Task::EnemyMove(id) => enemy_move(world, id),
            Task::Refill(coord) => refill(world, coord),
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Shared movement
// ══════════════════════════════════════════════════════════════

/// Single legal step, no gravity.
fn step_actor(world: &mut World, actor: ActorId, dir: MoveDir) -> bool {
    let Some(from) = world.actor_pos(actor) else { return false };
    let Some(to) = rules::move_target(&world.grid, from, dir) else { return false };
    world.set_actor_pos(actor, to);
    let (dx, dy) = dir.delta();
    world.emit(GameEvent::ActorMoved { actor, dx, dy });
    true
}

/// Step, then let gravity settle the mover.
pub fn try_move(world: &mut World, actor: ActorId, dir: MoveDir) -> bool {
    if !step_actor(world, actor, dir) {
        return false;
    }
    fall(world, actor);
    true
}

/// Drop until supported. Returns true if the actor fell at least one row.
pub fn fall(world: &mut World, actor: ActorId) -> bool {
    let mut fell = false;
    while let Some(pos) = world.actor_pos(actor) {
        if !rules::should_fall(&world.grid, pos) {
            break;
        }
        let below = (pos.0, pos.1 + 1);
        world.set_actor_pos(actor, below);
        world.emit(GameEvent::ActorMoved { actor, dx: 0, dy: 1 });
        fell = true;
    }
    fell
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

pub fn player_move(world: &mut World, dir: MoveDir) -> bool {
    if world.live_player_pos().is_none() {
        return false;
    }
    if !try_move(world, ActorId::Player, dir) {
        return false;
    }
    after_player_moved(world);
    true
}

fn after_player_moved(world: &mut World) {
    let Some(pos) = world.live_player_pos() else { return };

    if world.grid.try_collect(pos) {
        let coins = match world.player.as_mut() {
            Some(p) => {
                p.coins += 1;
                p.coins
            }
            None => return,
        };
        world.emit(GameEvent::CellCleared { x: pos.0, y: pos.1 });
        world.emit(GameEvent::GoldCollected { x: pos.0, y: pos.1, coins });
        log::debug!("gold at {pos:?}, {} left", world.grid.gold_remaining());
    }

    if !world.enemies_at(pos).is_empty() {
        lose_life(world);
    }
}

/// Take one life. Respawns the player while lives remain, otherwise
/// ends the game.
pub fn lose_life(world: &mut World) {
    let Some(player) = world.player.as_mut() else { return };
    player.lives = player.lives.saturating_sub(1);
    let lives = player.lives;
    world.emit(GameEvent::LivesChanged { lives });
    log::info!("player lost a life, {lives} left");

    if lives > 0 {
        respawn(world);
    } else {
        world.phase = Phase::GameOver;
        world.emit(GameEvent::Defeat);
        log::info!("game over on level {}", world.level);
    }
}

/// Put the player back on its spawn cell and let it settle.
pub fn respawn(world: &mut World) {
    let Some(player) = world.player.as_mut() else { return };
    let (x, y) = player.spawn;
    player.x = x;
    player.y = y;
    world.emit(GameEvent::ActorPlaced { actor: ActorId::Player, x, y });
    if fall(world, ActorId::Player) {
        after_player_moved(world);
    }
}

/// Dig the brick diagonally below the player. The hole refills after
/// `rules.refill_delay` ticks.
pub fn player_dig(world: &mut World, facing: Facing) -> bool {
    let Some(pos) = world.live_player_pos() else { return false };
    let Some(target) = rules::dig_target(&world.grid, pos, facing) else { return false };
    if !world.grid.dig(target) {
        return false;
    }
    world.emit(GameEvent::CellHidden { x: target.0, y: target.1 });
    let delay = world.rules.refill_delay;
    world.scheduler.schedule(Task::Refill(target), delay, false);
    log::debug!("dug {target:?} at tick {}", world.scheduler.now());

    if fall(world, ActorId::Player) {
        after_player_moved(world);
    }
    let ids: Vec<EnemyId> = world.enemies.iter().map(|e| e.id).collect();
    for id in ids {
        fall(world, ActorId::Enemy(id));
    }
    true
}

// ══════════════════════════════════════════════════════════════
// Enemies
// ══════════════════════════════════════════════════════════════

/// Create an enemy at `(x, y)` and start its recurring pursuit.
pub fn spawn_enemy(world: &mut World, x: usize, y: usize) -> EnemyId {
    let id = world.alloc_enemy_id();
    let period = world.rules.enemy_move_period;
    let handle = world.scheduler.schedule(Task::EnemyMove(id), period, true);
    world.enemies.push(Enemy::new(id, x, y));
    world.enemy_moves.insert(id, handle);
    world.emit(GameEvent::ActorPlaced { actor: ActorId::Enemy(id), x, y });
    id
}

/// One pursuit step: plan toward the player, move, then check contact.
pub fn enemy_move(world: &mut World, id: EnemyId) {
    let Some(target) = world.live_player_pos() else { return };
    let Some(from) = world.enemy(id).map(Enemy::pos) else { return };

    if let Some(dir) = pathfind::next_step(&world.grid, from, target) {
        try_move(world, ActorId::Enemy(id), dir);
    }

    if world.enemy(id).map(Enemy::pos) == world.live_player_pos() {
        lose_life(world);
    }
}

/// Remove an enemy and stop its movement. Safe to call twice.
pub fn enemy_die(world: &mut World, id: EnemyId) -> bool {
    let Some(index) = world.enemies.iter().position(|e| e.id == id) else { return false };
    let enemy = world.enemies.remove(index);
    if let Some(handle) = world.enemy_moves.remove(&id) {
        world.scheduler.cancel(handle);
    }
    world.emit(GameEvent::EnemyRemoved { id });
    log::debug!("enemy {} died at {:?}", id.0, enemy.pos());
    true
}

// ══════════════════════════════════════════════════════════════
// Terrain timers
// ══════════════════════════════════════════════════════════════

/// Restore a dug brick. Whoever is inside at this moment is crushed.
pub fn refill(world: &mut World, coord: Coord) {
    if !world.grid.reveal(coord) {
        return;
    }
    world.emit(GameEvent::CellShown { x: coord.0, y: coord.1 });

    if world.live_player_pos() == Some(coord) {
        lose_life(world);
    }
    for id in world.enemies_at(coord) {
        enemy_die(world, id);
    }
}

/// Reveal the hidden exit ladders the first time no gold remains.
pub fn reveal_exit_if_ready(world: &mut World) {
    if world.ladders_revealed || !world.grid.all_gold_taken() {
        return;
    }
    world.ladders_revealed = true;
    let shown = world.grid.reveal_all_hidden_ladders();
    for &(x, y) in &shown {
        world.emit(GameEvent::CellShown { x, y });
    }
    world.emit(GameEvent::LaddersRevealed { count: shown.len() });
    log::info!("all gold taken, {} exit ladders revealed", shown.len());
}

/// The last level has been cleared.
pub fn complete_game(world: &mut World) {
    world.phase = Phase::Victory;
    world.emit(GameEvent::Victory);
    log::info!("victory");
}
