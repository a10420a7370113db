/// Cell variants and their properties.
/// Properties are queried via methods, not stored as flags,
/// so cell semantics are centralized here.
///
/// A cell carries no position: the layer's index IS the position.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CellColor {
    Red,
    Green,
    Blue,
    Yellow,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cell {
    Blank,
    Wall,              // Impassable, immovable
    Box,               // Pushable, uncolored
    Player,            // At most one in the contents layer
    Target(CellColor), // Ground marker a matching trophy must cover
    Trophy(CellColor), // Pushable, colored
    Hole,              // Destroys whatever lands on it, then vanishes
}

impl Cell {
    /// Can the player shove this cell one space onward?
    pub fn is_pushable(self) -> bool {
        matches!(self, Cell::Box | Cell::Trophy(_))
    }

    /// Can the player step straight onto this cell?
    /// (Pushables are not walkable; they get their own push path.)
    pub fn is_walkable(self) -> bool {
        matches!(self, Cell::Blank | Cell::Target(_) | Cell::Player | Cell::Hole)
    }

    pub fn is_player(self) -> bool {
        matches!(self, Cell::Player)
    }

    /// The trophy color, if this is a trophy.
    pub fn trophy_color(self) -> Option<CellColor> {
        match self {
            Cell::Trophy(c) => Some(c),
            _ => None,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Blank
    }
}
