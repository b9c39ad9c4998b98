/// Cell kinds and their movement properties.
/// Properties are derived from (kind, hidden) on every query,
/// so tile semantics are centralized here.

pub type Coord = (usize, usize);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CellKind {
    Empty,
    Brick,        // Standable + Diggable
    Ladder,       // Climbable
    Rope,         // Grabbable (horizontal bar)
    Gold,         // Pickup target
    HiddenLadder, // Appears when all gold collected
}

impl CellKind {
    /// Terrain symbol from the level source. `P`, `B` and anything
    /// unknown leave the terrain empty.
    pub fn from_symbol(ch: char) -> CellKind {
        match ch {
            '1' => CellKind::Brick,
            '2' => CellKind::Ladder,
            '3' => CellKind::Rope,
            '4' => CellKind::Gold,
            '5' => CellKind::HiddenLadder,
            _ => CellKind::Empty,
        }
    }

    /// Property set while the cell is shown.
    pub fn props(self) -> Props {
        match self {
            CellKind::Empty => Props::INERT,
            CellKind::Brick => Props {
                passable: false,
                standable: true,
                diggable: true,
                ..Props::INERT
            },
            CellKind::Ladder | CellKind::HiddenLadder => Props {
                standable: true,
                climbable: true,
                grabbable: true,
                ..Props::INERT
            },
            CellKind::Rope => Props { grabbable: true, ..Props::INERT },
            CellKind::Gold => Props { takable: true, ..Props::INERT },
        }
    }
}

/// Named property, for `Grid::query`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Prop {
    Passable,
    Takable,
    Standable,
    Climbable,
    Grabbable,
    Diggable,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Props {
    pub passable: bool,
    pub takable: bool,
    pub standable: bool,
    pub climbable: bool,
    pub grabbable: bool,
    pub diggable: bool,
}

impl Props {
    /// What every hidden cell reports: nothing but passable.
    pub const INERT: Props = Props {
        passable: true,
        takable: false,
        standable: false,
        climbable: false,
        grabbable: false,
        diggable: false,
    };

    pub fn get(self, prop: Prop) -> bool {
        match prop {
            Prop::Passable => self.passable,
            Prop::Takable => self.takable,
            Prop::Standable => self.standable,
            Prop::Climbable => self.climbable,
            Prop::Grabbable => self.grabbable,
            Prop::Diggable => self.diggable,
        }
    }
}

/// One grid cell. `kind` never changes; a dug brick stays a Brick
/// while hidden so that `show()` can restore it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cell {
    pub kind: CellKind,
    pub coord: Coord,
    hidden: bool,
}

impl Cell {
    /// Hidden ladders start out hidden; everything else is shown.
    pub fn new(kind: CellKind, coord: Coord) -> Self {
        Cell { kind, coord, hidden: kind == CellKind::HiddenLadder }
    }

    pub fn empty(coord: Coord) -> Self {
        Cell::new(CellKind::Empty, coord)
    }

    pub fn props(&self) -> Props {
        if self.hidden { Props::INERT } else { self.kind.props() }
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn hide(&mut self) {
        self.hidden = true;
    }

    pub fn show(&mut self) {
        self.hidden = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [CellKind; 6] = [
        CellKind::Empty, CellKind::Brick, CellKind::Ladder,
        CellKind::Rope, CellKind::Gold, CellKind::HiddenLadder,
    ];

    #[test]
    fn symbols_map_to_catalog() {
        assert_eq!(CellKind::from_symbol('0'), CellKind::Empty);
        assert_eq!(CellKind::from_symbol('1'), CellKind::Brick);
        assert_eq!(CellKind::from_symbol('2'), CellKind::Ladder);
        assert_eq!(CellKind::from_symbol('3'), CellKind::Rope);
        assert_eq!(CellKind::from_symbol('4'), CellKind::Gold);
        assert_eq!(CellKind::from_symbol('5'), CellKind::HiddenLadder);
        assert_eq!(CellKind::from_symbol('P'), CellKind::Empty);
        assert_eq!(CellKind::from_symbol('B'), CellKind::Empty);
        assert_eq!(CellKind::from_symbol('x'), CellKind::Empty);
    }

    #[test]
    fn brick_blocks_and_supports() {
        let p = CellKind::Brick.props();
        assert!(!p.passable);
        assert!(p.standable);
        assert!(p.diggable);
        assert!(!p.climbable);
    }

    #[test]
    fn rope_only_grabbable() {
        let p = CellKind::Rope.props();
        assert!(p.passable);
        assert!(p.grabbable);
        assert!(!p.standable);
        assert!(!p.climbable);
    }

    #[test]
    fn hidden_ladder_starts_inert() {
        let c = Cell::new(CellKind::HiddenLadder, (0, 0));
        assert!(c.is_hidden());
        assert_eq!(c.props(), Props::INERT);
    }

    #[test]
    fn hide_always_inert() {
        for kind in ALL {
            let mut c = Cell::new(kind, (1, 1));
            c.hide();
            assert_eq!(c.props(), Props::INERT, "{kind:?}");
        }
    }

    #[test]
    fn hide_then_show_restores() {
        for kind in ALL {
            let mut c = Cell::new(kind, (2, 3));
            c.show();
            let before = c.props();
            c.hide();
            c.show();
            assert_eq!(c.props(), before, "{kind:?}");
            assert_eq!(c.kind, kind);
        }
    }

    #[test]
    fn prop_lookup_by_name() {
        let p = CellKind::Ladder.props();
        assert!(p.get(Prop::Climbable));
        assert!(p.get(Prop::Standable));
        assert!(!p.get(Prop::Diggable));
        assert!(!p.get(Prop::Takable));
    }
}
