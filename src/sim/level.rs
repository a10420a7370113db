/// Level loader.
///
/// ## Sources (priority order):
///   1. `levels/` directory (individual `.txt` files)
///   2. Built-in embedded levels
///
/// ## Level file format (`.txt`):
///   ```
///   # Level Name
///   <ground rows>
///   ---
///   <contents rows>
///   ```
///
/// The two blocks are separated by a line containing only `---` and
/// must have identical dimensions. Rows within a block must all have
/// the same width.
///
/// ## Cell legend:
///   '_' = blank                  'W' = wall
///   'R'/'G'/'Y' = target red/green/yellow
///   'B' = target blue (ground block) / box (contents block)
///   'r'/'g'/'b'/'y' = trophy red/green/blue/yellow
///   'H' = hole
///   '>'/'<'/'^'/'v' = player (contents block only; facing is cosmetic
///                     and discarded)

use std::path::Path;

use thiserror::Error;

use crate::domain::cell::{Cell, CellColor};
use crate::domain::grid::{BoardSize, Pos};
use crate::sim::board::{Board, BoardError, Layer};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LevelError {
    #[error("level has no `---` separator between ground and contents")]
    MissingSeparator,
    #[error("level block is empty")]
    EmptyBlock,
    #[error("block dimensions do not agree: expected {expected}, found {found}")]
    DimensionMismatch { expected: BoardSize, found: BoardSize },
    #[error("invalid cell character {ch:?} at {pos}")]
    InvalidCellChar { ch: char, pos: Pos },
    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Runtime level data (owned strings, loaded from file or embedded).
/// Kept as raw rows so a restart can rebuild the board from scratch.
#[derive(Clone, Debug)]
pub struct LevelDef {
    pub name: String,
    pub ground_rows: Vec<String>,
    pub contents_rows: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Block {
    Ground,
    Contents,
}

impl LevelDef {
    pub fn build(&self) -> Result<Board, LevelError> {
        let ground = parse_block(&self.ground_rows, Block::Ground)?;
        let contents = parse_block(&self.contents_rows, Block::Contents)?;
        if ground.size() != contents.size() {
            return Err(LevelError::DimensionMismatch {
                expected: ground.size(),
                found: contents.size(),
            });
        }
        Ok(Board::new(ground, contents)?)
    }
}

// ══════════════════════════════════════════════════════════════
// Parsing
// ══════════════════════════════════════════════════════════════

fn parse_block(rows: &[String], block: Block) -> Result<Layer, LevelError> {
    let height = rows.len() as i32;
    let width = rows.first().map_or(0, |r| r.chars().count()) as i32;
    if width == 0 || height == 0 {
        return Err(LevelError::EmptyBlock);
    }
    let size = BoardSize::new(width, height);

    let mut cells = Vec::with_capacity(size.area());
    for (row_idx, row) in rows.iter().enumerate() {
        let y = row_idx as i32 + 1;
        let row_width = row.chars().count() as i32;
        if row_width != width {
            return Err(LevelError::DimensionMismatch {
                expected: size,
                found: BoardSize::new(row_width, height),
            });
        }
        for (col_idx, ch) in row.chars().enumerate() {
            let x = col_idx as i32 + 1;
            cells.push(parse_cell(ch, block, Pos::new(x, y))?);
        }
    }
    Ok(Layer::from_cells(size, cells))
}

fn parse_cell(ch: char, block: Block, pos: Pos) -> Result<Cell, LevelError> {
    let cell = match ch {
        '_' => Cell::Blank,
        'W' => Cell::Wall,
        'H' => Cell::Hole,
        'R' => Cell::Target(CellColor::Red),
        'G' => Cell::Target(CellColor::Green),
        'Y' => Cell::Target(CellColor::Yellow),
        // 'B' is the one context-dependent glyph: blue target on the
        // ground, box in the contents.
        'B' => match block {
            Block::Ground => Cell::Target(CellColor::Blue),
            Block::Contents => Cell::Box,
        },
        'r' => Cell::Trophy(CellColor::Red),
        'g' => Cell::Trophy(CellColor::Green),
        'b' => Cell::Trophy(CellColor::Blue),
        'y' => Cell::Trophy(CellColor::Yellow),
        '>' | '<' | '^' | 'v' if block == Block::Contents => Cell::Player,
        _ => return Err(LevelError::InvalidCellChar { ch, pos }),
    };
    Ok(cell)
}

pub fn parse_level_file(content: &str) -> Result<LevelDef, LevelError> {
    let mut name = String::new();
    let mut ground_rows = vec![];
    let mut contents_rows = vec![];
    let mut past_separator = false;

    for line in content.lines() {
        let line = line.trim_end_matches('\r');
        if line.starts_with('#') && name.is_empty() && is_name_line(line) {
            name = line[1..].trim().to_string();
        } else if line.trim() == "---" {
            past_separator = true;
        } else if past_separator {
            contents_rows.push(line.to_string());
        } else {
            ground_rows.push(line.to_string());
        }
    }

    if !past_separator {
        return Err(LevelError::MissingSeparator);
    }

    trim_blank_edges(&mut ground_rows);
    trim_blank_edges(&mut contents_rows);

    if name.is_empty() {
        name = "Unnamed Level".to_string();
    }

    Ok(LevelDef { name, ground_rows, contents_rows })
}

fn trim_blank_edges(rows: &mut Vec<String>) {
    while rows.last().map_or(false, |r| r.trim().is_empty()) {
        rows.pop();
    }
    while rows.first().map_or(false, |r| r.trim().is_empty()) {
        rows.remove(0);
    }
}

/// Distinguish `# Courtyard` from a row of level data that happens to
/// start with `#`: a name line contains at least one letter.
fn is_name_line(line: &str) -> bool {
    line[1..].chars().any(|c| c.is_alphabetic())
}

// ══════════════════════════════════════════════════════════════
// Directory loading (individual .txt files)
// ══════════════════════════════════════════════════════════════

/// Load every parseable `.txt` level from `dir`, sorted by filename.
/// Unparseable files are skipped.
pub fn load_from_directory(dir: &Path) -> Vec<LevelDef> {
    let mut found: Vec<(String, LevelDef)> = vec![];

    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return vec![],
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map_or(false, |e| e == "txt") {
            if let Ok(content) = std::fs::read_to_string(&path) {
                if let Ok(def) = parse_level_file(&content) {
                    let filename = path.file_name()
                        .unwrap_or_default()
                        .to_string_lossy()
                        .to_string();
                    found.push((filename, def));
                }
            }
        }
    }

    found.sort_by(|a, b| a.0.cmp(&b.0));
    found.into_iter().map(|(_, def)| def).collect()
}

// ══════════════════════════════════════════════════════════════
// Embedded levels
// ══════════════════════════════════════════════════════════════

pub fn embedded_levels() -> Vec<LevelDef> {
    vec![
        make_embedded("Courtyard",
            &[
                "________",
                "___R____",
                "________",
                "_B____Y_",
                "________",
                "___G____",
                "________",
            ],
            &[
                "__WWW___",
                "__W_WW__",
                "WW_r_WWW",
                "W_b>y__W",
                "WWHgWWWW",
                "_WW_W___",
                "__WWW___",
            ]),
        make_embedded("Warehouse",
            &[
                "________",
                "________",
                "_B______",
                "_____G__",
                "_R______",
                "____Y___",
                "______R_",
                "____G___",
                "________",
            ],
            &[
                "__WWWWW_",
                "WWW___W_",
                "W_<b__W_",
                "WWW_g_W_",
                "W_WWy_W_",
                "W_W___WW",
                "Wr_bgr_W",
                "W______W",
                "WWWWWWWW",
            ]),
        make_embedded("Sinkholes",
            &[
                "_______",
                "_______",
                "_______",
                "__R____",
                "_______",
                "_______",
                "_______",
            ],
            &[
                "WWWWWWW",
                "W_>___W",
                "W_H_r_W",
                "WH_HB_W",
                "W_H___W",
                "W_____W",
                "WWWWWWW",
            ]),
    ]
}

fn make_embedded(name: &str, ground: &[&str], contents: &[&str]) -> LevelDef {
    LevelDef {
        name: name.to_string(),
        ground_rows: ground.iter().map(|s| s.to_string()).collect(),
        contents_rows: contents.iter().map(|s| s.to_string()).collect(),
    }
}
