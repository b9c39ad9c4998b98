/// Enemy pathfinding — BFS over the cells an enemy can currently occupy.
///
/// A cell is NAVIGABLE when it is in bounds, passable, and the enemy
/// could rest there: the cell is grabbable, or the cell below is standable
/// (on the bottom row the cell itself must be standable).
///
/// Moving up additionally requires the cell being left to be climbable or
/// grabbable, exactly as for real movement.
///
/// Only the first step of the shortest path is returned; enemies re-plan
/// on every movement tick, so dug holes and revealed ladders are picked up
/// as soon as they change.

use std::collections::VecDeque;

use super::entity::MoveDir;
use super::grid::Grid;
use super::rules;
use super::tile::Coord;

/// Can an enemy stand, hang or climb at `pos`?
pub fn is_navigable(grid: &Grid, (x, y): Coord) -> bool {
    let here = grid.props_at((x, y));
    if !here.passable {
        return false;
    }
    if here.grabbable {
        return true;
    }
    if y + 1 < grid.height() {
        grid.props_at((x, y + 1)).standable
    } else {
        here.standable
    }
}

/// Legal single steps out of `pos`, in search order (left, right, down, up).
fn moves_from(grid: &Grid, pos: Coord) -> impl Iterator<Item = (MoveDir, Coord)> + '_ {
    let can_rise = rules::can_leave_upward(grid, pos);
    MoveDir::SEARCH_ORDER.into_iter().filter_map(move |dir| {
        let (dx, dy) = dir.delta();
        if dy < 0 && !can_rise {
            return None;
        }
        let next = rules::offset(grid, pos, dx, dy)?;
        if is_navigable(grid, next) { Some((dir, next)) } else { None }
    })
}

/// First step of a shortest navigable path from `from` to `target`.
///
/// Returns None when the two already coincide or no path exists.
pub fn next_step(grid: &Grid, from: Coord, target: Coord) -> Option<MoveDir> {
    if from == target {
        return None;
    }

    let mut visited = vec![false; grid.width() * grid.height()];
    visited[grid.index_of(from.0, from.1)] = true;

    let mut queue: VecDeque<(Coord, MoveDir)> = VecDeque::with_capacity(64);

    // Direct contact wins outright, before any layer is expanded.
    for (dir, next) in moves_from(grid, from) {
        if next == target {
            return Some(dir);
        }
        visited[grid.index_of(next.0, next.1)] = true;
        queue.push_back((next, dir));
    }

    while let Some((pos, first)) = queue.pop_front() {
        for (_, next) in moves_from(grid, pos) {
            if next == target {
                return Some(first);
            }
            let i = grid.index_of(next.0, next.1);
            if !visited[i] {
                visited[i] = true;
                queue.push_back((next, first));
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::grid_from;

    fn manhattan(a: Coord, b: Coord) -> usize {
        a.0.abs_diff(b.0) + a.1.abs_diff(b.1)
    }

    fn apply(pos: Coord, dir: MoveDir) -> Coord {
        let (dx, dy) = dir.delta();
        ((pos.0 as i32 + dx) as usize, (pos.1 as i32 + dy) as usize)
    }

    // ── navigability ──

    #[test]
    fn brick_not_navigable() {
        let g = grid_from(&["1", "1"]);
        assert!(!is_navigable(&g, (0, 0)));
    }

    #[test]
    fn empty_over_brick_navigable() {
        let g = grid_from(&["0", "1"]);
        assert!(is_navigable(&g, (0, 0)));
    }

    #[test]
    fn empty_over_air_not_navigable() {
        let g = grid_from(&["0", "0", "1"]);
        assert!(!is_navigable(&g, (0, 0)));
    }

    #[test]
    fn bottom_row_uses_own_standability() {
        let g = grid_from(&["00", "02"]);
        assert!(!is_navigable(&g, (0, 1)));
        assert!(is_navigable(&g, (1, 1)));
    }

    #[test]
    fn rope_navigable_in_midair() {
        let g = grid_from(&["3", "0", "0"]);
        assert!(is_navigable(&g, (0, 0)));
    }

    // ── next_step ──

    #[test]
    fn open_grid_always_closes_distance() {
        // All rope: every cell navigable, every direction allowed.
        let g = grid_from(&["3333", "3333", "3333", "3333"]);
        for ty in 0..4 {
            for tx in 0..4 {
                for fy in 0..4 {
                    for fx in 0..4 {
                        let (from, target) = ((fx, fy), (tx, ty));
                        match next_step(&g, from, target) {
                            Some(dir) => assert!(
                                manhattan(apply(from, dir), target) < manhattan(from, target),
                                "{from:?} -> {target:?} via {dir:?}",
                            ),
                            None => assert_eq!(from, target),
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn walks_along_floor() {
        let g = grid_from(&["00000", "11111"]);
        assert_eq!(next_step(&g, (0, 0), (4, 0)), Some(MoveDir::Right));
        assert_eq!(next_step(&g, (4, 0), (0, 0)), Some(MoveDir::Left));
    }

    #[test]
    fn adjacent_target_returns_direct_move() {
        let g = grid_from(&["000", "111"]);
        assert_eq!(next_step(&g, (1, 0), (2, 0)), Some(MoveDir::Right));
        assert_eq!(next_step(&g, (1, 0), (0, 0)), Some(MoveDir::Left));
    }

    #[test]
    fn enclosed_target_has_no_path() {
        let g = grid_from(&[
            "00111",
            "00101",
            "11111",
        ]);
        assert_eq!(next_step(&g, (0, 1), (3, 1)), None);
    }

    #[test]
    fn same_cell_has_no_step() {
        let g = grid_from(&["0", "1"]);
        assert_eq!(next_step(&g, (0, 0), (0, 0)), None);
    }

    #[test]
    fn climbs_ladder_toward_upper_floor() {
        let g = grid_from(&[
            "0000",
            "1121",
            "0020",
            "1111",
        ]);
        // Enemy on the ground floor left of the ladder, player upstairs.
        assert_eq!(next_step(&g, (0, 2), (0, 0)), Some(MoveDir::Right));
        assert_eq!(next_step(&g, (2, 2), (0, 0)), Some(MoveDir::Up));
    }

    #[test]
    fn cannot_jump_without_ladder() {
        let g = grid_from(&[
            "000",
            "101",
            "000",
            "111",
        ]);
        // Upper floor unreachable: nothing to climb.
        assert_eq!(next_step(&g, (0, 2), (0, 0)), None);
    }

    #[test]
    fn dug_hole_becomes_reachable() {
        let mut g = grid_from(&[
            "000",
            "111",
            "111",
        ]);
        assert_eq!(next_step(&g, (1, 0), (1, 1)), None);
        g.dig((1, 1));
        assert_eq!(next_step(&g, (1, 0), (1, 1)), Some(MoveDir::Down));
    }

    #[test]
    fn hole_removes_support_for_cell_above() {
        let mut g = grid_from(&[
            "000",
            "111",
        ]);
        assert_eq!(next_step(&g, (0, 0), (2, 0)), Some(MoveDir::Right));
        g.dig((1, 1));
        // (1,0) now hangs over the hole and is no longer a resting cell.
        assert_eq!(next_step(&g, (0, 0), (2, 0)), None);
    }

    #[test]
    fn target_must_itself_be_navigable() {
        // Player hanging in mid-air (e.g. mid-fall) cannot be reached.
        let g = grid_from(&["000", "000", "111"]);
        assert_eq!(next_step(&g, (0, 1), (2, 0)), None);
    }
}
