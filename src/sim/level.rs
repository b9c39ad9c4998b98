/// Level source and character population.
///
/// ## File format (`levels/level{n}.csv`)
///
/// One map row per line, one symbol per comma-separated field:
///   ```text
///   0,0,0,0,2,0
///   0,P,0,4,2,B
///   1,1,1,1,1,1
///   ```
///
/// ## Symbol legend:
///   '0' = Empty          '1' = Brick (diggable)
///   '2' = Ladder         '3' = Rope
///   '4' = Gold           '5' = Hidden ladder (appears when gold is gone)
///   'P' = Player spawn   'B' = Enemy spawn
///   anything else = Empty
///
/// Rows must all have the same length. When a level file is missing, the
/// built-in copy of that level (if any) is used instead.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::entity::{ActorId, Player};
use crate::domain::grid::Grid;
use super::event::GameEvent;
use super::step;
use super::world::World;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("level {number} has no rows")]
    Empty { number: usize },
    #[error("level {number}: row {row} has {found} cells, expected {expected}")]
    Ragged { number: usize, row: usize, expected: usize, found: usize },
    #[error("level {number} not found in {} and no built-in copy exists", .dir.display())]
    Missing { number: usize, dir: PathBuf },
}

/// A level as delivered by the level source: a rectangular symbol matrix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelDef {
    pub number: usize,
    pub rows: Vec<Vec<char>>,
}

/// What `load_level` found while populating characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadReport {
    pub player_found: bool,
    pub enemies: usize,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Replace the level in `world` with `def` and populate its characters.
///
/// Live enemies are killed first. The first 'P' creates the player or,
/// when one survives from an earlier level, moves its respawn anchor here
/// and respawns it (lives and coins are kept). Later 'P's are ignored.
/// Every 'B' becomes a new enemy.
pub fn load_level(world: &mut World, def: &LevelDef) -> LoadReport {
    let ids: Vec<_> = world.enemies.iter().map(|e| e.id).collect();
    for id in ids {
        step::enemy_die(world, id);
    }

    world.reset_level(def.number, Grid::load(&def.rows));
    let width = world.grid.width();

    let mut player_found = false;
    for (y, row) in def.rows.iter().enumerate() {
        if row.len() > width {
            log::warn!("level {}: row {y} is wider than {width} cells, extra cells ignored", def.number);
        }
        for (x, &symbol) in row.iter().take(width).enumerate() {
            match symbol {
                'P' if !player_found => {
                    place_player(world, x, y);
                    player_found = true;
                }
                'P' => log::debug!("level {}: extra player symbol at ({x}, {y}) ignored", def.number),
                'B' => {
                    step::spawn_enemy(world, x, y);
                }
                _ => {}
            }
        }
    }

    if !player_found {
        log::warn!("level {} has no player symbol 'P'", def.number);
    }

    let report = LoadReport { player_found, enemies: world.enemies.len() };
    log::info!(
        "level {} loaded: {}x{}, {} gold, {} enemies",
        def.number, world.grid.width(), world.grid.height(),
        world.grid.gold_remaining(), report.enemies,
    );
    report
}

fn place_player(world: &mut World, x: usize, y: usize) {
    match world.player.as_mut() {
        None => {
            let player = Player::new(x, y, world.rules.initial_lives);
            log::info!("player created at ({x}, {y}) with {} lives", player.lives);
            let lives = player.lives;
            world.player = Some(player);
            world.emit(GameEvent::ActorPlaced { actor: ActorId::Player, x, y });
            world.emit(GameEvent::LivesChanged { lives });
        }
        Some(player) => {
            player.spawn = (x, y);
            let lives = player.lives;
            step::respawn(world);
            world.emit(GameEvent::LivesChanged { lives });
        }
    }
}

/// Read level `number` from `dir`, falling back to the built-in copy
/// when the file does not exist.
pub fn read_level(dir: &Path, number: usize) -> Result<LevelDef, LevelError> {
    let path = level_path(dir, number);
    match std::fs::read_to_string(&path) {
        Ok(text) => parse_csv(number, &text),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("{} not found, trying built-in level {number}", path.display());
            embedded_level(number).ok_or(LevelError::Missing { number, dir: dir.to_path_buf() })
        }
        Err(source) => Err(LevelError::Io { path, source }),
    }
}

pub fn level_path(dir: &Path, number: usize) -> PathBuf {
    dir.join(format!("level{number}.csv"))
}

/// A field is one symbol. Empty or multi-character fields read as '0'.
fn symbol_of(field: &str) -> char {
    let mut chars = field.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => ch,
        _ => '0',
    }
}

/// Parse the CSV level format. Blank lines are skipped; see `symbol_of`
/// for how fields map to symbols.
pub fn parse_csv(number: usize, text: &str) -> Result<LevelDef, LevelError> {
    let rows: Vec<Vec<char>> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            line.split(',')
                .map(|field| symbol_of(field.trim()))
                .collect()
        })
        .collect();

    let expected = match rows.first() {
        Some(first) if !first.is_empty() => first.len(),
        _ => return Err(LevelError::Empty { number }),
    };
    if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
        return Err(LevelError::Ragged { number, row, expected, found: r.len() });
    }

    Ok(LevelDef { number, rows })
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

pub fn embedded_level(number: usize) -> Option<LevelDef> {
    let map: &[&str] = match number {
        1 => &[
            "000000000000500000000",
            "000000000000500000000",
            "000400000000500004000",
            "111111211111511112111",
            "000000233333333332000",
            "000000200000000002000",
            "0B0000200040000B02000",
            "111211111112111111121",
            "000200000002000000020",
            "000200400002000400020",
            "000211111112111112020",
            "000200000002000000020",
            "0P0200000B02000000020",
            "111111111111111111111",
        ],
        2 => &[
            "500000000000000000005",
            "500000000000000000005",
            "500040003333333000045",
            "511111102000000211115",
            "000000002000000200000",
            "000B00002004000200B00",
            "111112111111111112111",
            "000002000000000002000",
            "040002333333333332040",
            "111002000000000002011",
            "000002000004000002000",
            "0P0002000011100002000",
            "111111111111111111111",
        ],
        _ => return None,
    };
    Some(LevelDef { number, rows: map.iter().map(|r| r.chars().collect()).collect() })
}

#[cfg(test)]
pub(crate) fn def_from(number: usize, rows: &[&str]) -> LevelDef {
    LevelDef { number, rows: rows.iter().map(|r| r.chars().collect()).collect() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use crate::domain::tile::CellKind;
    use crate::sim::world::Phase;

    fn world() -> World {
        World::new(RulesConfig::default())
    }

    // ── parsing ──

    #[test]
    fn parse_csv_basic() {
        let def = parse_csv(3, "0,1,2\n3,4,5\nP,B,0\n").unwrap();
        assert_eq!(def.number, 3);
        assert_eq!(def.rows[0], vec!['0', '1', '2']);
        assert_eq!(def.rows[2], vec!['P', 'B', '0']);
    }

    #[test]
    fn parse_csv_trims_and_skips_blank_lines() {
        let def = parse_csv(1, " 0 , 1 \r\n\n1,1\n").unwrap();
        assert_eq!(def.rows, vec![vec!['0', '1'], vec!['1', '1']]);
    }

    #[test]
    fn parse_csv_empty_field_is_empty_cell() {
        let def = parse_csv(1, "1,,1\n").unwrap();
        assert_eq!(def.rows[0], vec!['1', '0', '1']);
    }

    #[test]
    fn parse_csv_multi_char_field_is_empty_cell() {
        let def = parse_csv(1, "11,1P,0\n1,1,1\n").unwrap();
        assert_eq!(def.rows[0], vec!['0', '0', '0']);
        let grid = Grid::load(&def.rows);
        assert_eq!(grid.cell_at((0, 0)).kind, CellKind::Empty);
        assert_eq!(grid.cell_at((1, 0)).kind, CellKind::Empty);

        let mut w = world();
        assert!(!load_level(&mut w, &def).player_found);
    }

    #[test]
    fn parse_csv_rejects_ragged_rows() {
        let err = parse_csv(2, "0,0,0\n0,0\n").unwrap_err();
        assert!(matches!(err, LevelError::Ragged { row: 1, expected: 3, found: 2, .. }));
    }

    #[test]
    fn parse_csv_rejects_empty() {
        assert!(matches!(parse_csv(1, "\n  \n"), Err(LevelError::Empty { number: 1 })));
    }

    #[test]
    fn embedded_levels_are_rectangular_with_one_player() {
        for n in [1, 2] {
            let def = embedded_level(n).unwrap();
            let w = def.rows[0].len();
            assert!(def.rows.iter().all(|r| r.len() == w), "level {n}");
            let players = def.rows.iter().flatten().filter(|&&c| c == 'P').count();
            assert_eq!(players, 1, "level {n}");
        }
        assert!(embedded_level(99).is_none());
    }

    #[test]
    fn read_level_falls_back_to_embedded() {
        let dir = std::env::temp_dir().join("loderunner-no-such-levels-dir");
        let def = read_level(&dir, 1).unwrap();
        assert_eq!(def, embedded_level(1).unwrap());
        assert!(matches!(read_level(&dir, 42), Err(LevelError::Missing { number: 42, .. })));
    }

    // ── character population ──

    #[test]
    fn load_creates_player_and_enemies() {
        let mut w = world();
        let report = load_level(&mut w, &def_from(1, &["P0B0B", "11111"]));
        assert_eq!(report, LoadReport { player_found: true, enemies: 2 });
        let p = w.player.as_ref().unwrap();
        assert_eq!(p.pos(), (0, 0));
        assert_eq!(p.lives, RulesConfig::default().initial_lives);
        assert_eq!(w.enemies[0].pos(), (2, 0));
        assert_eq!(w.enemies[1].pos(), (4, 0));
        assert_eq!(w.grid.cell_at((0, 0)).kind, CellKind::Empty);
        assert_eq!(w.grid.cell_at((2, 0)).kind, CellKind::Empty);
        // One recurring movement event per enemy.
        assert_eq!(w.scheduler.pending(), 2);
    }

    #[test]
    fn only_first_player_symbol_counts() {
        let mut w = world();
        load_level(&mut w, &def_from(1, &["00P", "P00", "111"]));
        assert_eq!(w.player.as_ref().unwrap().pos(), (2, 0));
    }

    #[test]
    fn missing_player_is_reported_not_fatal() {
        let mut w = world();
        let report = load_level(&mut w, &def_from(1, &["0B0", "111"]));
        assert!(!report.player_found);
        assert!(w.player.is_none());
        assert_eq!(w.grid.width(), 3);
        assert_eq!(report.enemies, 1);
    }

    #[test]
    fn missing_player_on_reload_keeps_session_player() {
        let mut w = world();
        load_level(&mut w, &def_from(1, &["P00", "111"]));
        step::lose_life(&mut w);
        w.player.as_mut().unwrap().coins = 2;

        let report = load_level(&mut w, &def_from(2, &["0B0", "111"]));
        assert!(!report.player_found);
        let p = w.player.as_ref().unwrap();
        assert_eq!(p.lives, RulesConfig::default().initial_lives - 1);
        assert_eq!(p.coins, 2);
    }

    #[test]
    fn symbols_beyond_grid_width_are_ignored() {
        let mut w = world();
        let report = load_level(&mut w, &def_from(1, &["P00", "111B", "1111P"]));
        assert_eq!(w.grid.width(), 3);
        assert_eq!(report.enemies, 0);
        assert_eq!(w.player.as_ref().unwrap().pos(), (0, 0));
        // Nothing outside the grid gets simulated.
        for _ in 0..=RulesConfig::default().enemy_move_period {
            step::advance(&mut w);
        }
    }

    #[test]
    fn reload_keeps_lives_and_replaces_enemies() {
        let mut w = world();
        load_level(&mut w, &def_from(1, &["P0B", "111"]));
        step::lose_life(&mut w);
        w.player.as_mut().unwrap().coins = 4;
        let old_enemy = w.enemies[0].id;

        let report = load_level(&mut w, &def_from(2, &["B000", "000P", "1111"]));
        assert!(report.player_found);
        let p = w.player.as_ref().unwrap();
        assert_eq!(p.lives, RulesConfig::default().initial_lives - 1);
        assert_eq!(p.coins, 4);
        assert_eq!(p.spawn, (3, 1));
        assert_eq!(p.pos(), (3, 1));
        assert_eq!(w.enemies.len(), 1);
        assert_ne!(w.enemies[0].id, old_enemy);
        assert_eq!(w.level, 2);
        assert_eq!(w.scheduler.now(), 0);
        assert_eq!(w.phase, Phase::Playing);
    }

    #[test]
    fn reload_respawn_applies_gravity() {
        let mut w = world();
        load_level(&mut w, &def_from(1, &["P", "1"]));
        load_level(&mut w, &def_from(2, &["P", "0", "1"]));
        assert_eq!(w.player.as_ref().unwrap().pos(), (0, 1));
    }

    #[test]
    fn reload_drops_pending_refills() {
        let mut w = world();
        load_level(&mut w, &def_from(1, &["P00", "111"]));
        assert!(step::player_dig(&mut w, crate::domain::entity::Facing::Right));
        load_level(&mut w, &def_from(2, &["P00", "111"]));
        assert_eq!(w.scheduler.pending(), 0);
    }
}
