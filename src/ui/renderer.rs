/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws. Boards are
/// small, so the whole board is drawn centered; there is no camera.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::cell::{Cell as BoardCell, CellColor};
use crate::domain::grid::Pos;
use crate::sim::board::Board;
use crate::sim::session::{Phase, Session};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 4],
    ch_len: u8,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells.
    ///
    /// On VTE-based Linux terminals the inter-row gap pixels use the
    /// background color from the last Clear. Using the SAME explicit RGB
    /// for `Clear(ClearType::All)` and every cell's background keeps the
    /// gap color identical to the cell color, so no horizontal lines show.
    const BASE_BG: Color = Color::Rgb { r: 24, g: 22, b: 30 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
    };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
    };

    /// Normalize bg: Color::Reset → BASE_BG so that every cell gets an
    /// explicit background color (never terminal-default).
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        let len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.ch_len = len;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell
    }

    fn as_str(&self) -> &str {
        if self.ch_len == 0 {
            return "";
        }
        unsafe { std::str::from_utf8_unchecked(&self.ch[..self.ch_len as usize]) }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell::from_char(ch, fg, bg));
            cx += 1;
        }
    }
}

// ── Renderer ──

/// Each game cell = 2 terminal columns, so square-ish boards look square.
const CELL_W: usize = 2;

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, session: &Session) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            // Force full repaint after resize.
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Phase change → clear for clean transition
        let phase_changed = self.last_phase != Some(session.phase);
        if phase_changed {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(session.phase);
        }

        // Build front buffer
        self.front.clear();

        match session.phase {
            Phase::Title => self.compose_title(session),
            Phase::Playing => self.compose_game(session),
            Phase::LevelWon | Phase::LevelLost => {
                self.compose_game(session);
                self.compose_verdict(session);
            }
            Phase::GameComplete => self.compose_game_complete(session),
        }

        // Diff and emit
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Set explicit base colors at start of frame.
        // IMPORTANT: not ResetColor — that resets to the terminal's
        // native default, which may differ from BASE_BG and cause line
        // artifacts.
        queue!(
            self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_game(&mut self, s: &Session) {
        let buf_w = self.front.width;
        let hud_bg = Color::Rgb { r: 20, g: 20, b: 60 };

        // ── HUD row ──
        let hud = format!(
            " Level {:<2} {}  Moves: {} ",
            s.current_level + 1,
            s.level_name,
            s.moves,
        );
        for x in 0..buf_w {
            self.front.set(x, HUD_ROW, Cell::from_char(' ', Color::White, hud_bg));
        }
        self.front.put_str(0, HUD_ROW, &hud, Color::White, hud_bg);

        // ── Board (centered) ──
        let board = &s.board;
        let board_cols = board.size.width.max(0) as usize * CELL_W;
        let board_rows = board.size.height.max(0) as usize;
        let ox = buf_w.saturating_sub(board_cols) / 2;

        for gy in 0..board_rows {
            let row = MAP_ROW + gy;
            if row >= self.front.height {
                break;
            }
            for gx in 0..board.size.width.max(0) as usize {
                let col = ox + gx * CELL_W;
                if col + 1 >= buf_w {
                    break;
                }
                let pos = Pos::new(gx as i32 + 1, gy as i32 + 1);
                self.compose_board_cell(board, pos, col, row);
            }
        }

        // ── Message bar ──
        let msg_row = MAP_ROW + board_rows + 1;
        if msg_row < self.front.height && !s.message.is_empty() {
            let msg_bg = Color::Rgb { r: 200, g: 180, b: 50 };
            let msg = format!(" ◈ {} ", s.message);
            for x in 0..buf_w {
                self.front.set(x, msg_row, Cell::from_char(' ', Color::Black, msg_bg));
            }
            self.front.put_str(0, msg_row, &msg, Color::Black, msg_bg);
        }

        // ── Help bar ──
        let help_row = MAP_ROW + board_rows + 3;
        if help_row < self.front.height {
            let help = " ←→↑↓/WASD: Move   R: Restart   ESC: Title";
            self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
        }
    }

    /// Write the visual for the board cell at `pos` into the front
    /// buffer at (col, row). Contents draw over the ground; a blank
    /// contents cell shows the ground through it.
    fn compose_board_cell(&mut self, board: &Board, pos: Pos, col: usize, row: usize) {
        let contents = board.contents.cell_at(pos).unwrap_or(BoardCell::Blank);
        let ground = board.ground.cell_at(pos).unwrap_or(BoardCell::Blank);

        let floor_bg = Color::Rgb { r: 34, g: 32, b: 42 };
        let (c0, c1, fg, bg) = match contents {
            BoardCell::Wall => ('█', '█', Color::Rgb { r: 120, g: 120, b: 120 }, Color::Rgb { r: 70, g: 70, b: 70 }),
            BoardCell::Box => ('▣', ' ', Color::Rgb { r: 210, g: 150, b: 70 }, floor_bg),
            BoardCell::Trophy(color) => ('♦', ' ', color_rgb(color), floor_bg),
            BoardCell::Hole => ('▼', ' ', Color::Rgb { r: 90, g: 70, b: 40 }, Color::Rgb { r: 12, g: 10, b: 8 }),
            BoardCell::Player => ('☻', ' ', Color::Rgb { r: 255, g: 255, b: 200 }, floor_bg),
            // Contents blank (or a stray target): show the ground.
            BoardCell::Blank | BoardCell::Target(_) => match ground {
                BoardCell::Target(color) => ('◎', ' ', color_rgb(color), floor_bg),
                _ => (' ', ' ', Color::White, floor_bg),
            },
        };
        self.front.set(col, row, Cell::from_char(c0, fg, bg));
        self.front.set(col + 1, row, Cell::from_char(c1, fg, bg));
    }

    // ── Static screens ──

    fn compose_title(&mut self, s: &Session) {
        let title = [
            r"   ___  ___    _    _____  ___  ___  _  _  ___  ___  _____ ",
            r"  / __|| _ \  /_\  |_   _|| __|/ __|| || ||_ _|| __||_   _|",
            r" | (__ |   / / _ \   | |  | _| \__ \| __ | | | | _|   | |  ",
            r"  \___||_|_\/_/ \_\  |_|  |___||___/|_||_||___||_|    |_|  ",
        ];
        let gold = Color::Rgb { r: 255, g: 200, b: 50 };
        for (i, line) in title.iter().enumerate() {
            self.front.put_str(2, 2 + i, line, gold, Color::Reset);
        }

        let subtitle = "◈◈  Terminal Push Puzzle  ◈◈";
        let sx = 2 + (title[1].chars().count().saturating_sub(subtitle.chars().count())) / 2;
        self.front.put_str(sx, 7, subtitle, Color::Rgb { r: 80, g: 255, b: 80 }, Color::Reset);

        let menu_base = 10;
        let hi = Color::Rgb { r: 80, g: 255, b: 80 };
        self.front.put_str(8, menu_base, "ENTER   Start", hi, Color::Reset);
        self.front.put_str(8, menu_base + 1, "  Q     Quit", Color::White, Color::Reset);

        let roster = format!("      {} levels loaded", s.levels.len());
        self.front.put_str(8, menu_base + 3, &roster, Color::DarkGrey, Color::Reset);

        let help = [
            "Controls",
            "  ←→↑↓ / WASD / <>^v   Move and push",
            "  R                    Restart level",
            "  ESC                  Back to title",
            "",
            "Push every trophy onto the matching",
            "target ring. Mind the sinkholes.",
        ];
        let help_base = menu_base + 5;
        for (i, line) in help.iter().enumerate() {
            let color = if i == 0 { gold } else { Color::White };
            self.front.put_str(8, help_base + i, line, color, Color::Reset);
        }

        if !s.message.is_empty() {
            let msg_row = self.front.height.saturating_sub(1);
            let msg_bg = Color::Rgb { r: 200, g: 180, b: 50 };
            let msg = format!(" ◈ {} ", s.message);
            self.front.put_str(0, msg_row, &msg, Color::Black, msg_bg);
        }
    }

    /// Won/lost banner drawn over the final board state.
    fn compose_verdict(&mut self, s: &Session) {
        let (box_art, color) = if s.phase == Phase::LevelWon {
            (
                [
                    "╔═══════════════════════════╗",
                    "║     ★  LEVEL  WON  ★      ║",
                    "╚═══════════════════════════╝",
                ],
                Color::Rgb { r: 80, g: 255, b: 80 },
            )
        } else {
            (
                [
                    "╔═══════════════════════════╗",
                    "║     ✕  LEVEL  LOST  ✕     ║",
                    "╚═══════════════════════════╝",
                ],
                Color::Rgb { r: 255, g: 60, b: 60 },
            )
        };

        let box_w = box_art[0].chars().count();
        let bx = self.front.width.saturating_sub(box_w) / 2;
        let by = MAP_ROW + s.board.size.height.max(0) as usize + 4;
        for (i, l) in box_art.iter().enumerate() {
            self.front.put_str(bx, by + i, l, color, Color::Reset);
        }

        let hint = if s.phase == Phase::LevelWon {
            "▸ ENTER: Next Level    ESC: Title"
        } else {
            "▸ ENTER: Retry    ESC: Title"
        };
        let blink = (s.anim_tick / 8) % 2 == 0;
        let hint_fg = if blink { Color::White } else { Color::DarkGrey };
        let hx = self.front.width.saturating_sub(hint.chars().count()) / 2;
        self.front.put_str(hx, by + 4, hint, hint_fg, Color::Reset);
    }

    fn compose_game_complete(&mut self, s: &Session) {
        let gold = Color::Rgb { r: 255, g: 220, b: 50 };
        let box_art = [
            "╔══════════════════════════════════════╗",
            "║   ★  ALL  LEVELS  CLEARED!  ★        ║",
            "╚══════════════════════════════════════╝",
        ];
        for (i, l) in box_art.iter().enumerate() {
            self.front.put_str(4, 4 + i, l, gold, Color::Reset);
        }
        let levels = format!("◈ All {} levels solved!", s.levels.len());
        self.front.put_str(6, 9, &levels, Color::Rgb { r: 80, g: 255, b: 80 }, Color::Reset);
        self.front.put_str(6, 11, "▸ ENTER / ESC: Back to Title", Color::Rgb { r: 80, g: 255, b: 80 }, Color::Reset);
    }
}

fn color_rgb(color: CellColor) -> Color {
    match color {
        CellColor::Red => Color::Rgb { r: 255, g: 80, b: 80 },
        CellColor::Green => Color::Rgb { r: 80, g: 255, b: 80 },
        CellColor::Blue => Color::Rgb { r: 100, g: 160, b: 255 },
        CellColor::Yellow => Color::Rgb { r: 255, g: 220, b: 50 },
    }
}
