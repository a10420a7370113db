/// Session state: the current board, phase machine, and level roster.
///
/// Phase transitions:
///   Title      → Playing        (start)
///   Playing    → LevelWon       (every target satisfied)
///   Playing    → LevelLost      (player swallowed by a hole)
///   LevelWon   → Playing        (next level) | GameComplete (roster done)
///   LevelLost  → Playing        (retry same level)
///   GameComplete → Title

use crate::domain::rules::LevelStatus;
use crate::sim::board::Board;
use crate::sim::level::LevelDef;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    Playing,
    LevelWon,
    LevelLost,
    GameComplete,
}

pub struct Session {
    pub board: Board,
    pub phase: Phase,
    pub levels: Vec<LevelDef>,
    pub current_level: usize,
    pub level_name: String,
    pub moves: u32,
    pub message: String,
    pub message_timer: u32,
    pub anim_tick: u32,
}

impl Session {
    pub fn new(levels: Vec<LevelDef>) -> Self {
        Session {
            board: Board::empty(),
            phase: Phase::Title,
            levels,
            current_level: 0,
            level_name: String::new(),
            moves: 0,
            message: String::new(),
            message_timer: 0,
            anim_tick: 0,
        }
    }

    /// Load level `idx` and enter Playing. Past the roster end the game
    /// is complete. A level that fails to build is reported in the
    /// message bar and the session stays where it was.
    pub fn load_level(&mut self, idx: usize) -> bool {
        if idx >= self.levels.len() {
            self.phase = Phase::GameComplete;
            return false;
        }

        let def = self.levels[idx].clone();
        match def.build() {
            Ok(board) => {
                self.board = board;
                self.current_level = idx;
                self.level_name = def.name.clone();
                self.moves = 0;
                self.phase = Phase::Playing;
                self.set_message(&def.name, 80);
                true
            }
            Err(err) => {
                self.set_message(&format!("bad level {:?}: {err}", def.name), 120);
                false
            }
        }
    }

    pub fn restart_level(&mut self) {
        self.load_level(self.current_level);
    }

    /// Inspect the board after a resolved move and advance the phase.
    pub fn check_outcome(&mut self) {
        if !self.board.should_end() {
            return;
        }
        match self.board.status() {
            LevelStatus::Playing => {}
            LevelStatus::Won => {
                self.phase = Phase::LevelWon;
                self.set_message("Level Won", 0);
            }
            LevelStatus::Lost => {
                self.phase = Phase::LevelLost;
                self.set_message("Level Lost", 0);
            }
        }
    }

    /// Show a transient message. `timer` is in ticks; 0 pins it until
    /// replaced.
    pub fn set_message(&mut self, msg: &str, timer: u32) {
        self.message = msg.to_string();
        self.message_timer = timer;
    }

    pub fn tick_message(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message.clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::{embedded_levels, LevelDef};

    fn bad_level() -> LevelDef {
        LevelDef {
            name: "broken".to_string(),
            ground_rows: vec!["__".to_string()],
            contents_rows: vec!["_".to_string()],
        }
    }

    #[test]
    fn new_session_starts_at_the_title() {
        let s = Session::new(embedded_levels());
        assert_eq!(s.phase, Phase::Title);
        assert!(s.board.find_player().is_none());
    }

    #[test]
    fn loading_a_level_enters_playing() {
        let mut s = Session::new(embedded_levels());
        assert!(s.load_level(0));
        assert_eq!(s.phase, Phase::Playing);
        assert_eq!(s.level_name, "Courtyard");
        assert!(s.board.find_player().is_some());
        assert_eq!(s.moves, 0);
    }

    #[test]
    fn loading_past_the_roster_completes_the_game() {
        let mut s = Session::new(embedded_levels());
        assert!(!s.load_level(99));
        assert_eq!(s.phase, Phase::GameComplete);
    }

    #[test]
    fn broken_level_reports_and_stays_put() {
        let mut s = Session::new(vec![bad_level()]);
        assert!(!s.load_level(0));
        assert_eq!(s.phase, Phase::Title);
        assert!(s.message.contains("broken"));
    }

    #[test]
    fn restart_resets_the_move_counter() {
        let mut s = Session::new(embedded_levels());
        s.load_level(1);
        s.moves = 7;
        s.restart_level();
        assert_eq!(s.moves, 0);
        assert_eq!(s.current_level, 1);
        assert_eq!(s.level_name, "Warehouse");
    }

    #[test]
    fn message_timer_expires() {
        let mut s = Session::new(vec![]);
        s.set_message("hi", 2);
        s.tick_message();
        assert_eq!(s.message, "hi");
        s.tick_message();
        assert!(s.message.is_empty());
        s.tick_message(); // no underflow
    }
}
