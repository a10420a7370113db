/// The step function: resolves one move of the player.
///
/// Pure: `(Board, Dir) -> StepResult` with a fresh Board inside; the
/// input board is never touched, so a caller can only ever observe a
/// fully resolved move.
///
/// Dispatch on the destination cell:
///   - Blank / Target  → player walks on
///   - Player          → treated as Blank (defensive; a well-formed
///                       board has one player)
///   - Wall            → rejected, board unchanged
///   - Hole            → player destroyed, hole consumed
///   - Box / Trophy    → push attempt: the cell beyond decides
///                       (rules::accepts_push); player and pushable
///                       advance together or not at all
///
/// A blocked move is an ordinary outcome, not an error. OutOfBoard is
/// an error because a walled level never produces it; the driver keeps
/// the old board and logs it.

use crate::domain::cell::Cell;
use crate::domain::grid::{Dir, Pos};
use crate::domain::rules;
use super::board::{Board, BoardError, Layer};
use super::event::GameEvent;

#[derive(Debug)]
pub struct StepResult {
    pub board: Board,
    pub events: Vec<GameEvent>,
}

impl StepResult {
    /// Did anything actually move? False for wall bumps and blocked pushes.
    pub fn moved(&self) -> bool {
        !self.events.is_empty()
    }
}

pub fn step(board: &Board, dir: Dir) -> Result<StepResult, BoardError> {
    let mut events = Vec::new();

    // No player means termination already happened; stepping a dead
    // board is a no-op rather than a panic.
    let player = match board.find_player() {
        Some(p) => p,
        None => return Ok(StepResult { board: board.clone(), events }),
    };

    let (dest, dest_cell) = board.next_in_direction(player, dir)?;

    let mut contents = board.contents.clone();
    if dest_cell.is_pushable() {
        resolve_push(board, &mut contents, &mut events, player, dest, dest_cell, dir)?;
    } else if dest_cell == Cell::Hole {
        contents.put(dest, Cell::Blank);
        contents.put(player, Cell::Blank);
        events.push(GameEvent::PlayerSwallowed { at: dest });
    } else if dest_cell.is_walkable() {
        contents.put(dest, Cell::Player);
        contents.put(player, Cell::Blank);
        events.push(GameEvent::PlayerMoved { from: player, to: dest });
    }
    // Wall: rejected, nothing to write.

    let board = Board::new(board.ground.clone(), contents)?;
    Ok(StepResult { board, events })
}

/// Two-body move: the pushable advances into the cell beyond it and the
/// player takes its place — contingent on that cell accepting the push.
/// There is no partial state where one body moves without the other.
fn resolve_push(
    board: &Board,
    contents: &mut Layer,
    events: &mut Vec<GameEvent>,
    player: Pos,
    at: Pos,
    pushable: Cell,
    dir: Dir,
) -> Result<(), BoardError> {
    let (beyond, beyond_cell) = board.next_in_direction(at, dir)?;

    if !rules::accepts_push(beyond_cell) {
        return Ok(());
    }

    if beyond_cell == Cell::Hole {
        contents.put(beyond, Cell::Blank);
        events.push(GameEvent::PushableSwallowed { at: beyond });
    } else {
        contents.put(beyond, pushable);
        events.push(GameEvent::PushableMoved { from: at, to: beyond });
    }
    contents.put(at, Cell::Player);
    contents.put(player, Cell::Blank);
    events.push(GameEvent::PlayerMoved { from: player, to: at });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cell::CellColor;
    use crate::domain::rules::LevelStatus;
    use crate::sim::board::tests::{board_from, layer_from};

    fn stepped(board: &Board, dir: Dir) -> Board {
        step(board, dir).unwrap().board
    }

    /// Every position appears exactly once per layer, and at most one
    /// player exists — checked after each resolution in these tests.
    fn assert_invariants(board: &Board) {
        assert_eq!(board.ground.size(), board.size);
        assert_eq!(board.contents.size(), board.size);
        assert_eq!(board.ground.iter().count(), board.size.area());
        assert_eq!(board.contents.iter().count(), board.size.area());
        let players = board.contents.iter().filter(|(_, c)| c.is_player()).count();
        assert!(players <= 1, "found {players} players");
    }

    // ── Walking ──

    #[test]
    fn walk_around_a_square() {
        // 2x2 all-blank, player at (1,1); down, right, up, left
        // returns the player home.
        let ground = ["__", "__"];
        let board = board_from(&ground, &["@_", "__"]);

        let b1 = stepped(&board, Dir::Down);
        assert_eq!(b1.find_player(), Some(Pos::new(1, 2)));
        assert_eq!(b1.contents.cell_at(Pos::new(1, 1)), Ok(Cell::Blank));
        assert_invariants(&b1);

        let b2 = stepped(&b1, Dir::Right);
        assert_eq!(b2.find_player(), Some(Pos::new(2, 2)));

        let b3 = stepped(&b2, Dir::Up);
        assert_eq!(b3.find_player(), Some(Pos::new(2, 1)));

        let b4 = stepped(&b3, Dir::Left);
        assert_eq!(b4.find_player(), Some(Pos::new(1, 1)));
        assert_eq!(b4, board);
    }

    #[test]
    fn walking_onto_ground_target_leaves_it_intact() {
        let board = board_from(&["_R", "__"], &["@_", "__"]);
        let b = stepped(&board, Dir::Right);
        assert_eq!(b.find_player(), Some(Pos::new(2, 1)));
        assert_eq!(b.ground.cell_at(Pos::new(2, 1)), Ok(Cell::Target(CellColor::Red)));
    }

    #[test]
    fn walking_into_wall_returns_equal_board() {
        let board = board_from(&["__", "__"], &["@W", "__"]);
        let result = step(&board, Dir::Right).unwrap();
        assert!(!result.moved());
        assert_eq!(result.board, board);
    }

    #[test]
    fn walking_onto_second_player_treated_as_blank() {
        // Defensive: two players should not exist, but the move must not
        // wedge. The moving player overwrites the other.
        let board = board_from(&["__", "__"], &["@@", "__"]);
        let b = stepped(&board, Dir::Right);
        assert_eq!(b.find_player(), Some(Pos::new(2, 1)));
        assert_invariants(&b);
    }

    #[test]
    fn contents_layer_target_is_walkable() {
        // A target sitting in the contents layer (unusual but legal)
        // is walkable like any other target.
        let size = crate::domain::grid::BoardSize::new(3, 1);
        let contents = crate::sim::board::Layer::from_cells(
            size,
            vec![Cell::Player, Cell::Target(CellColor::Blue), Cell::Blank],
        );
        let board = Board::new(layer_from(&["___"]), contents).unwrap();
        let b = stepped(&board, Dir::Right);
        assert_eq!(b.find_player(), Some(Pos::new(2, 1)));
    }

    // ── Pushing ──

    #[test]
    fn push_trophy_into_open_space() {
        // Player (4,4), blue trophy (3,4), blank (2,4).
        let ground = ["_____", "_____", "_____", "_____"];
        let board = board_from(&ground, &[
            "_____",
            "_____",
            "_____",
            "__b@_",
        ]);
        let b = stepped(&board, Dir::Left);
        assert_eq!(b.contents.cell_at(Pos::new(2, 4)), Ok(Cell::Trophy(CellColor::Blue)));
        assert_eq!(b.find_player(), Some(Pos::new(3, 4)));
        assert_eq!(b.contents.cell_at(Pos::new(4, 4)), Ok(Cell::Blank));
        assert_invariants(&b);
    }

    #[test]
    fn push_blocked_by_wall_moves_nothing() {
        // Same layout, but a wall beyond the trophy.
        let ground = ["_____", "_____", "_____", "_____"];
        let board = board_from(&ground, &[
            "_____",
            "_____",
            "_____",
            "_Wb@_",
        ]);
        let result = step(&board, Dir::Left).unwrap();
        assert!(!result.moved());
        assert_eq!(result.board, board);
    }

    #[test]
    fn push_blocked_by_every_ineligible_cell() {
        // Push contingency: wall, box, or trophy beyond the pushable
        // leaves both bodies in place.
        for blocker in ["WB@_", "BB@_", "bB@_"] {
            let board = board_from(&["____"], &[blocker]);
            let result = step(&board, Dir::Left).unwrap();
            assert_eq!(result.board, board, "blocker row {blocker:?}");
        }
    }

    #[test]
    fn push_blocked_by_player_beyond() {
        // Column layout so the mover is found before the blocking
        // player in scan order.
        let board = board_from(&["_", "_", "_"], &["@", "B", "@"]);
        let result = step(&board, Dir::Down).unwrap();
        assert_eq!(result.board, board);
    }

    #[test]
    fn push_box_onto_target_square() {
        let board = board_from(&["R___"], &["_B@_"]);
        let b = stepped(&board, Dir::Left);
        assert_eq!(b.contents.cell_at(Pos::new(1, 1)), Ok(Cell::Box));
        assert_eq!(b.find_player(), Some(Pos::new(2, 1)));
    }

    #[test]
    fn push_preserves_trophy_color() {
        let board = board_from(&["____"], &["_y@_"]);
        let b = stepped(&board, Dir::Left);
        assert_eq!(b.contents.cell_at(Pos::new(1, 1)), Ok(Cell::Trophy(CellColor::Yellow)));
    }

    // ── Holes ──

    #[test]
    fn player_into_hole_is_lost() {
        // Player beside a hole. The uncovered target keeps the board
        // unwon, so losing the player decides the level as Lost.
        let board = board_from(&["__R", "___"], &["@H_", "___"]);
        let result = step(&board, Dir::Right).unwrap();
        let b = result.board;
        assert_eq!(b.find_player(), None);
        assert_eq!(b.contents.cell_at(Pos::new(2, 1)), Ok(Cell::Blank));
        assert_eq!(b.contents.cell_at(Pos::new(1, 1)), Ok(Cell::Blank));
        assert_eq!(b.status(), LevelStatus::Lost);
        assert!(result.events.contains(&GameEvent::PlayerSwallowed { at: Pos::new(2, 1) }));
    }

    #[test]
    fn pushable_into_hole_consumes_both() {
        for pushable in ['B', 'b'] {
            let row: String = format!("H{pushable}@_");
            let board = board_from(&["____"], &[row.as_str()]);
            let b = stepped(&board, Dir::Left);
            // Hole and pushable both gone; player advanced one cell.
            assert_eq!(b.contents.cell_at(Pos::new(1, 1)), Ok(Cell::Blank));
            assert_eq!(b.find_player(), Some(Pos::new(2, 1)));
            assert_invariants(&b);
        }
    }

    #[test]
    fn hole_is_not_recreated_by_later_moves() {
        let board = board_from(&["____"], &["HB@_"]);
        let b1 = stepped(&board, Dir::Left); // box swallowed, player at (2,1)
        let b2 = stepped(&b1, Dir::Left);    // player walks onto the old hole cell
        assert_eq!(b2.find_player(), Some(Pos::new(1, 1)));
        let b3 = stepped(&b2, Dir::Right);
        assert_eq!(b3.contents.cell_at(Pos::new(1, 1)), Ok(Cell::Blank));
        assert_eq!(b3.find_player(), Some(Pos::new(2, 1)));
    }

    // ── Errors and degenerate boards ──

    #[test]
    fn stepping_off_an_unwalled_rim() {
        let board = board_from(&["__"], &["@_"]);
        assert_eq!(
            step(&board, Dir::Up).unwrap_err(),
            BoardError::OutOfBoard { from: Pos::new(1, 1), dir: Dir::Up }
        );
    }

    #[test]
    fn push_probe_off_the_rim_propagates() {
        // Pushable sits on the rim; the cell beyond it does not exist.
        let board = board_from(&["___"], &["B@_"]);
        assert_eq!(
            step(&board, Dir::Left).unwrap_err(),
            BoardError::OutOfBoard { from: Pos::new(1, 1), dir: Dir::Left }
        );
    }

    #[test]
    fn playerless_board_steps_to_itself() {
        let board = board_from(&["_R", "__"], &["_b", "__"]);
        let result = step(&board, Dir::Down).unwrap();
        assert!(!result.moved());
        assert_eq!(result.board, board);
    }

    // ── Win through movement ──

    #[test]
    fn pushing_last_trophy_home_wins() {
        let board = board_from(
            &["G___"],
            &["_g@_"],
        );
        let b = stepped(&board, Dir::Left);
        assert_eq!(b.status(), LevelStatus::Won);
    }

    #[test]
    fn wrong_color_on_target_does_not_win() {
        let board = board_from(
            &["G___"],
            &["_r@_"],
        );
        let b = stepped(&board, Dir::Left);
        assert_eq!(b.status(), LevelStatus::Playing);
    }
}
