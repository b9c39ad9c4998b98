/// Grid: the level's terrain, one `Cell` per coordinate.
///
/// ## Layout
///
/// Cells are stored row-major in a flat `Vec`, `index = x + y * width`.
///
/// ## Bounds
///
/// Every accessor that takes a coordinate panics when it is out of range.
/// Callers bounds-check with `in_bounds()` first (movement, digging and
/// the pathfinder all do); reaching the panic is a bug, never gameplay.
///
/// ## Level-wide bookkeeping
///
///   - `gold_remaining` — incremented per Gold cell built, decremented per
///     successful collection. Reaching zero triggers the hidden-ladder reveal.
///   - `hidden_ladders` — every HiddenLadder registered at load, drained by
///     `reveal_all_hidden_ladders()`.

use super::tile::{Cell, CellKind, Coord, Prop, Props};

#[derive(Clone, Debug, Default)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    gold_remaining: usize,
    hidden_ladders: Vec<Coord>,
}

impl Grid {
    /// Build a grid from a symbol matrix. Width is taken from the first
    /// row; missing symbols in a short row read as Empty.
    pub fn load(rows: &[Vec<char>]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        let mut grid = Grid {
            width,
            height,
            cells: Vec::with_capacity(width * height),
            gold_remaining: 0,
            hidden_ladders: Vec::new(),
        };

        for (y, row) in rows.iter().enumerate() {
            for x in 0..width {
                let symbol = row.get(x).copied().unwrap_or('0');
                let kind = CellKind::from_symbol(symbol);
                match kind {
                    CellKind::Gold => grid.gold_remaining += 1,
                    CellKind::HiddenLadder => grid.hidden_ladders.push((x, y)),
                    _ => {}
                }
                grid.cells.push(Cell::new(kind, (x, y)));
            }
        }

        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Signed bounds test shared by movement, digging and pathing.
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    pub fn index_of(&self, x: usize, y: usize) -> usize {
        x + y * self.width
    }

    #[inline]
    pub fn coord_of(&self, index: usize) -> Coord {
        (index % self.width, index / self.width)
    }

    fn checked_index(&self, (x, y): Coord) -> usize {
        assert!(
            x < self.width && y < self.height,
            "grid access out of bounds: ({x}, {y}) on {}x{} grid",
            self.width, self.height,
        );
        self.index_of(x, y)
    }

    pub fn cell_at(&self, coord: Coord) -> &Cell {
        &self.cells[self.checked_index(coord)]
    }

    /// Current properties at `coord` (hidden cells report the inert set).
    #[inline]
    pub fn props_at(&self, coord: Coord) -> Props {
        self.cell_at(coord).props()
    }

    #[inline]
    pub fn query(&self, coord: Coord, prop: Prop) -> bool {
        self.props_at(coord).get(prop)
    }

    /// Replace the cell with an Empty one.
    pub fn clear(&mut self, coord: Coord) {
        let idx = self.checked_index(coord);
        self.cells[idx] = Cell::empty(coord);
    }

    /// Hide a diggable cell. Returns false when there is nothing to dig.
    pub fn dig(&mut self, coord: Coord) -> bool {
        let idx = self.checked_index(coord);
        if !self.cells[idx].props().diggable {
            return false;
        }
        self.cells[idx].hide();
        true
    }

    /// Restore a hidden cell. Returns false if it was already shown.
    pub fn reveal(&mut self, coord: Coord) -> bool {
        let idx = self.checked_index(coord);
        if !self.cells[idx].is_hidden() {
            return false;
        }
        self.cells[idx].show();
        true
    }

    /// Collect whatever is at `coord`. Only a shown Gold cell yields
    /// anything; every other kind is a no-op returning false.
    pub fn try_collect(&mut self, coord: Coord) -> bool {
        let idx = self.checked_index(coord);
        let cell = self.cells[idx];
        match cell.kind {
            CellKind::Gold if cell.props().takable => {
                self.gold_remaining = self.gold_remaining.saturating_sub(1);
                self.cells[idx] = Cell::empty(coord);
                true
            }
            CellKind::Gold
            | CellKind::Empty
            | CellKind::Brick
            | CellKind::Ladder
            | CellKind::Rope
            | CellKind::HiddenLadder => false,
        }
    }

    pub fn gold_remaining(&self) -> usize {
        self.gold_remaining
    }

    pub fn all_gold_taken(&self) -> bool {
        self.gold_remaining == 0
    }

    pub fn hidden_ladders(&self) -> &[Coord] {
        &self.hidden_ladders
    }

    /// Show every registered hidden ladder and forget them.
    /// Returns the coordinates that were revealed.
    pub fn reveal_all_hidden_ladders(&mut self) -> Vec<Coord> {
        let ladders = std::mem::take(&mut self.hidden_ladders);
        ladders.into_iter().filter(|&c| self.reveal(c)).collect()
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

#[cfg(test)]
pub(crate) fn grid_from(rows: &[&str]) -> Grid {
    let rows: Vec<Vec<char>> = rows.iter().map(|r| r.chars().collect()).collect();
    Grid::load(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_dimensions_and_kinds() {
        let g = grid_from(&["0123", "45PB"]);
        assert_eq!(g.width(), 4);
        assert_eq!(g.height(), 2);
        assert_eq!(g.cell_at((1, 0)).kind, CellKind::Brick);
        assert_eq!(g.cell_at((3, 0)).kind, CellKind::Rope);
        assert_eq!(g.cell_at((0, 1)).kind, CellKind::Gold);
        assert_eq!(g.cell_at((1, 1)).kind, CellKind::HiddenLadder);
        assert_eq!(g.cell_at((2, 1)).kind, CellKind::Empty);
        assert_eq!(g.cell_at((3, 1)).kind, CellKind::Empty);
        assert_eq!(g.cell_at((3, 1)).coord, (3, 1));
    }

    #[test]
    fn load_counts_gold_and_hidden_ladders() {
        let g = grid_from(&["4405", "5004"]);
        assert_eq!(g.gold_remaining(), 3);
        assert_eq!(g.hidden_ladders(), &[(3, 0), (0, 1)]);
    }

    #[test]
    fn reload_resets_counters() {
        let _ = grid_from(&["444"]);
        let g = grid_from(&["040"]);
        assert_eq!(g.gold_remaining(), 1);
    }

    #[test]
    fn index_coord_round_trip() {
        let g = grid_from(&["00000", "00000", "00000"]);
        for y in 0..g.height() {
            for x in 0..g.width() {
                assert_eq!(g.coord_of(g.index_of(x, y)), (x, y));
            }
        }
    }

    #[test]
    fn in_bounds_edges() {
        let g = grid_from(&["000", "000"]);
        assert!(g.in_bounds(0, 0));
        assert!(g.in_bounds(2, 1));
        assert!(!g.in_bounds(-1, 0));
        assert!(!g.in_bounds(0, -1));
        assert!(!g.in_bounds(3, 0));
        assert!(!g.in_bounds(0, 2));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn out_of_bounds_query_panics() {
        let g = grid_from(&["00", "00"]);
        g.query((2, 0), Prop::Passable);
    }

    #[test]
    fn dig_hides_brick_and_reveal_restores() {
        let mut g = grid_from(&["1"]);
        let before = g.props_at((0, 0));
        assert!(g.dig((0, 0)));
        assert_eq!(g.props_at((0, 0)), Props::INERT);
        assert_eq!(g.cell_at((0, 0)).kind, CellKind::Brick);
        assert!(g.reveal((0, 0)));
        assert_eq!(g.props_at((0, 0)), before);
    }

    #[test]
    fn dig_refuses_non_diggable() {
        let mut g = grid_from(&["2304"]);
        for x in 0..4 {
            assert!(!g.dig((x, 0)));
        }
    }

    #[test]
    fn dug_brick_cannot_be_dug_again() {
        let mut g = grid_from(&["1"]);
        assert!(g.dig((0, 0)));
        assert!(!g.dig((0, 0)));
    }

    #[test]
    fn collect_gold_clears_and_counts() {
        let mut g = grid_from(&["44"]);
        assert!(g.try_collect((0, 0)));
        assert_eq!(g.cell_at((0, 0)).kind, CellKind::Empty);
        assert_eq!(g.gold_remaining(), 1);
        assert!(!g.all_gold_taken());
        assert!(!g.try_collect((0, 0)));
        assert!(g.try_collect((1, 0)));
        assert!(g.all_gold_taken());
    }

    #[test]
    fn collect_is_noop_on_other_kinds() {
        let mut g = grid_from(&["01235"]);
        for x in 0..5 {
            assert!(!g.try_collect((x, 0)));
        }
    }

    #[test]
    fn clear_replaces_with_empty() {
        let mut g = grid_from(&["2"]);
        g.clear((0, 0));
        assert_eq!(g.cell_at((0, 0)).kind, CellKind::Empty);
        assert!(g.query((0, 0), Prop::Passable));
        assert!(!g.query((0, 0), Prop::Climbable));
    }

    #[test]
    fn reveal_all_hidden_ladders_once() {
        let mut g = grid_from(&["5", "5", "1"]);
        assert!(!g.query((0, 0), Prop::Climbable));
        let shown = g.reveal_all_hidden_ladders();
        assert_eq!(shown, vec![(0, 0), (0, 1)]);
        assert!(g.query((0, 0), Prop::Climbable));
        assert!(g.query((0, 1), Prop::Standable));
        assert!(g.reveal_all_hidden_ladders().is_empty());
    }

    #[test]
    fn level_without_gold_is_already_cleared() {
        let g = grid_from(&["000"]);
        assert!(g.all_gold_taken());
    }
}
