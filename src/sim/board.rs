/// Board: two co-indexed cell layers over one bounded grid.
///
/// ## Layer Architecture
///
///   - `ground`   — the backdrop as loaded. **Never mutated** after load.
///                  Holds Blank and Target cells (anything else is inert
///                  for win-checking).
///   - `contents` — the dynamic layer: Wall, Box, Player, Trophy, Hole,
///                  Blank. Each move produces a new contents layer.
///
/// Both layers are dense row-major vectors indexed by (x, y), so every
/// position inside the rectangle exists exactly once per layer — gaps
/// and duplicates are unrepresentable — and lookups are O(1).

use thiserror::Error;

use crate::domain::cell::Cell;
use crate::domain::grid::{BoardSize, Dir, Pos};
use crate::domain::rules::{self, LevelStatus};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum BoardError {
    /// Lookup at a position a layer does not cover. A well-formed board
    /// never produces this; it signals corruption.
    #[error("no cell at {0}")]
    CellNotFound(Pos),

    /// A move would step outside the grid. Unreachable on a walled
    /// level; the driver treats it as a rejected move.
    #[error("moving {dir} from {from} leaves the board")]
    OutOfBoard { from: Pos, dir: Dir },

    /// Ground and contents layers describe different rectangles.
    #[error("ground layer is {ground} but contents layer is {contents}")]
    LayerMismatch { ground: BoardSize, contents: BoardSize },
}

// ── Layer ──

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Layer {
    size: BoardSize,
    cells: Vec<Cell>,
}

impl Layer {
    /// A layer with every cell set to `fill`.
    pub fn filled(size: BoardSize, fill: Cell) -> Self {
        Layer { size, cells: vec![fill; size.area()] }
    }

    /// Build from row-major cells. The vector length must equal the
    /// rectangle's area; the level loader guarantees this.
    pub fn from_cells(size: BoardSize, cells: Vec<Cell>) -> Self {
        debug_assert_eq!(cells.len(), size.area());
        Layer { size, cells }
    }

    pub fn size(&self) -> BoardSize {
        self.size
    }

    #[inline]
    fn index(&self, pos: Pos) -> Option<usize> {
        if self.size.contains(pos) {
            Some((pos.y as usize - 1) * self.size.width as usize + (pos.x as usize - 1))
        } else {
            None
        }
    }

    pub fn cell_at(&self, pos: Pos) -> Result<Cell, BoardError> {
        self.index(pos)
            .map(|i| self.cells[i])
            .ok_or(BoardError::CellNotFound(pos))
    }

    /// Overwrite one position. Out-of-range writes are ignored, matching
    /// the bounds discipline of the read path.
    pub fn put(&mut self, pos: Pos, cell: Cell) {
        if let Some(i) = self.index(pos) {
            self.cells[i] = cell;
        }
    }

    /// Position of the sole Player cell, or None if the player is gone.
    pub fn find_player(&self) -> Option<Pos> {
        self.iter().find(|(_, c)| c.is_player()).map(|(p, _)| p)
    }

    /// Row-major traversal: (position, cell) for every covered position.
    pub fn iter(&self) -> impl Iterator<Item = (Pos, Cell)> + '_ {
        let w = self.size.width;
        self.cells.iter().enumerate().map(move |(i, &c)| {
            let x = (i as i32 % w) + 1;
            let y = (i as i32 / w) + 1;
            (Pos::new(x, y), c)
        })
    }
}

// ── Board ──

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    pub size: BoardSize,
    pub ground: Layer,
    pub contents: Layer,
}

impl Board {
    pub fn new(ground: Layer, contents: Layer) -> Result<Self, BoardError> {
        if ground.size() != contents.size() {
            return Err(BoardError::LayerMismatch {
                ground: ground.size(),
                contents: contents.size(),
            });
        }
        Ok(Board { size: ground.size(), ground, contents })
    }

    /// A zero-size board. Vacuously won; the session holds one before
    /// any level is loaded.
    pub fn empty() -> Self {
        let size = BoardSize::new(0, 0);
        Board {
            size,
            ground: Layer::filled(size, Cell::Blank),
            contents: Layer::filled(size, Cell::Blank),
        }
    }

    pub fn find_player(&self) -> Option<Pos> {
        self.contents.find_player()
    }

    /// The contents cell one step from `pos` in `dir`, with its position.
    /// Fails with OutOfBoard if the step leaves the rectangle.
    pub fn next_in_direction(&self, pos: Pos, dir: Dir) -> Result<(Pos, Cell), BoardError> {
        let next = pos.step(dir);
        if !self.size.contains(next) {
            return Err(BoardError::OutOfBoard { from: pos, dir });
        }
        Ok((next, self.contents.cell_at(next)?))
    }

    /// Every position is a good pair (Target covered by same-color Trophy).
    pub fn level_won(&self) -> bool {
        rules::level_won(
            self.ground
                .iter()
                .zip(self.contents.iter())
                .map(|((_, g), (_, c))| (g, c)),
        )
    }

    pub fn status(&self) -> LevelStatus {
        rules::resolve_status(self.level_won(), self.find_player().is_some())
    }

    /// True once the level is decided either way.
    pub fn should_end(&self) -> bool {
        self.status() != LevelStatus::Playing
    }
}
