/// Movement, gravity and dig rules — truth-table driven.
///
/// Pure functions over the grid — no side effects.
/// These encode "what is legal" without performing the action.
///
/// ## Move (any of the four directions)
/// ┌────────────────────────────────┬─────────┐
/// │ Condition                       │ Allow?  │
/// ├────────────────────────────────┼─────────┤
/// │ Dest out of bounds              │ DENY    │
/// │ Dest not passable               │ DENY    │
/// │ Up, here neither climbable      │ DENY    │
/// │     nor grabbable               │         │
/// │ Otherwise                       │ ALLOW   │
/// └────────────────────────────────┴─────────┘
///
/// ## Fall
/// ┌────────────────────────────────┬─────────┐
/// │ Condition                       │ Falls?  │
/// ├────────────────────────────────┼─────────┤
/// │ On bottom row                   │ NO      │
/// │ Below is standable              │ NO      │
/// │ Here is grabbable               │ NO      │
/// │ Otherwise                       │ YES     │
/// └────────────────────────────────┴─────────┘
///
/// ## Dig (target = one column over, one row down)
/// ┌────────────────────────────────┬─────────┐
/// │ Condition                       │ Allow?  │
/// ├────────────────────────────────┼─────────┤
/// │ Digger on bottom row            │ DENY    │
/// │ Target out of bounds            │ DENY    │
/// │ Here climbable or grabbable     │ DENY    │
/// │ Target not diggable             │ DENY    │
/// │ Otherwise                       │ ALLOW   │
/// └────────────────────────────────┴─────────┘
///
/// Every rule reads the current (possibly dug / hidden) properties.

use super::entity::{Facing, MoveDir};
use super::grid::Grid;
use super::tile::Coord;

/// Offset `from` by `(dx, dy)`, or None if that leaves the grid.
pub fn offset(grid: &Grid, (x, y): Coord, dx: i32, dy: i32) -> Option<Coord> {
    let nx = x as i32 + dx;
    let ny = y as i32 + dy;
    if grid.in_bounds(nx, ny) {
        Some((nx as usize, ny as usize))
    } else {
        None
    }
}

/// May a mover standing at `pos` go up?
#[inline]
pub fn can_leave_upward(grid: &Grid, pos: Coord) -> bool {
    let here = grid.props_at(pos);
    here.climbable || here.grabbable
}

/// Destination of a legal move, None if the move is rejected.
pub fn move_target(grid: &Grid, from: Coord, dir: MoveDir) -> Option<Coord> {
    let (dx, dy) = dir.delta();
    let to = offset(grid, from, dx, dy)?;
    if !grid.props_at(to).passable {
        return None;
    }
    if dy < 0 && !can_leave_upward(grid, from) {
        return None;
    }
    Some(to)
}

/// Does gravity pull a mover at `pos` down one row?
pub fn should_fall(grid: &Grid, (x, y): Coord) -> bool {
    if y + 1 >= grid.height() {
        return false;
    }
    if grid.props_at((x, y + 1)).standable {
        return false;
    }
    !grid.props_at((x, y)).grabbable
}

/// Target cell of a dig from `pos` toward `dir`, if the dig is legal.
pub fn dig_target(grid: &Grid, pos: Coord, dir: Facing) -> Option<Coord> {
    if pos.1 + 1 >= grid.height() {
        return None;
    }
    if can_leave_upward(grid, pos) {
        return None;
    }
    let target = offset(grid, pos, dir.dx(), 1)?;
    if grid.props_at(target).diggable {
        Some(target)
    } else {
        None
    }
}
