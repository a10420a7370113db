/// Grid coordinates and directions.
///
/// Positions are 1-indexed: a board of size `w × h` covers
/// `x in 1..=w`, `y in 1..=h`. Row 1 is the top row, so moving up
/// decreases `y`. `Pos::step` does unchecked arithmetic; bounds are
/// a separate question answered by `BoardSize::contains`.

use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub fn new(x: i32, y: i32) -> Self {
        Pos { x, y }
    }

    /// The adjacent position one cell away in `dir`. May leave the board.
    pub fn step(self, dir: Dir) -> Pos {
        match dir {
            Dir::Right => Pos { x: self.x + 1, y: self.y },
            Dir::Left  => Pos { x: self.x - 1, y: self.y },
            Dir::Up    => Pos { x: self.x, y: self.y - 1 },
            Dir::Down  => Pos { x: self.x, y: self.y + 1 },
        }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dir {
    Right,
    Left,
    Up,
    Down,
}

impl fmt::Display for Dir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dir::Right => "right",
            Dir::Left => "left",
            Dir::Up => "up",
            Dir::Down => "down",
        })
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BoardSize {
    pub width: i32,
    pub height: i32,
}

impl BoardSize {
    pub fn new(width: i32, height: i32) -> Self {
        BoardSize { width, height }
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.x >= 1 && pos.x <= self.width && pos.y >= 1 && pos.y <= self.height
    }

    /// Cell count of the covered rectangle.
    pub fn area(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }
}

impl fmt::Display for BoardSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
