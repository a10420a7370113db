/// Push and win rules — truth-table driven.
///
/// Pure functions over cell values — no side effects.
/// These encode "what is legal" without performing the move.
///
/// ## Push Eligibility Truth Table
///
/// When the player walks into a pushable (Box/Trophy), the cell beyond
/// it decides whether the push happens at all. The player's own move is
/// entirely contingent on the push: either both bodies advance one cell
/// or nothing moves.
///
/// ┌──────────────────────┬───────────┬─────────────────────────┐
/// │ Cell beyond pushable  │ Eligible? │ Notes                   │
/// ├──────────────────────┼───────────┼─────────────────────────┤
/// │ Blank                 │ YES       │ ordinary push           │
/// │ Target                │ YES       │ push onto a target      │
/// │ Hole                  │ YES       │ pushable is destroyed   │
/// │ Wall                  │ NO        │                         │
/// │ Box                   │ NO        │ no chained pushes       │
/// │ Trophy                │ NO        │ no chained pushes       │
/// │ Player                │ NO        │                         │
/// └──────────────────────┴───────────┴─────────────────────────┘
///
/// ## Good Pair Truth Table (win condition, per position)
///
/// ┌──────────────────────┬────────────────────┬────────────────┐
/// │ Ground cell           │ Contents cell      │ Good pair?     │
/// ├──────────────────────┼────────────────────┼────────────────┤
/// │ not a Target          │ anything           │ YES (inert)    │
/// │ Target(c)             │ Trophy(c)          │ YES            │
/// │ Target(c)             │ Trophy(other)      │ NO             │
/// │ Target(c)             │ anything else      │ NO             │
/// └──────────────────────┴────────────────────┴────────────────┘
///
/// The level is won when every position is a good pair. An empty
/// board is vacuously won.

use super::cell::Cell;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LevelStatus {
    Playing,
    Won,
    Lost,
}

/// Can a pushable be shoved into this cell? See truth table above.
pub fn accepts_push(beyond: Cell) -> bool {
    matches!(beyond, Cell::Blank | Cell::Target(_) | Cell::Hole)
}

/// Per-position win check. Only Target ground cells constrain anything;
/// every other ground variant pairs with any content.
pub fn good_pair(ground: Cell, contents: Cell) -> bool {
    match ground {
        Cell::Target(color) => contents.trophy_color() == Some(color),
        _ => true,
    }
}

/// All positions are good pairs. Vacuously true for an empty board.
pub fn level_won<I>(pairs: I) -> bool
where
    I: IntoIterator<Item = (Cell, Cell)>,
{
    pairs.into_iter().all(|(g, c)| good_pair(g, c))
}

/// Won is checked before Lost: a degenerate board with no player but
/// every pair satisfied reports Won.
pub fn resolve_status(won: bool, player_present: bool) -> LevelStatus {
    if won {
        LevelStatus::Won
    } else if !player_present {
        LevelStatus::Lost
    } else {
        LevelStatus::Playing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cell::CellColor;

    #[test]
    fn push_eligibility_table() {
        assert!(accepts_push(Cell::Blank));
        assert!(accepts_push(Cell::Target(CellColor::Red)));
        assert!(accepts_push(Cell::Hole));
        assert!(!accepts_push(Cell::Wall));
        assert!(!accepts_push(Cell::Box));
        assert!(!accepts_push(Cell::Trophy(CellColor::Blue)));
        assert!(!accepts_push(Cell::Player));
    }

    #[test]
    fn good_pair_requires_exact_color() {
        let target = Cell::Target(CellColor::Red);
        assert!(good_pair(target, Cell::Trophy(CellColor::Red)));
        assert!(!good_pair(target, Cell::Trophy(CellColor::Yellow)));
        assert!(!good_pair(target, Cell::Box));
        assert!(!good_pair(target, Cell::Blank));
        assert!(!good_pair(target, Cell::Player));
        assert!(!good_pair(target, Cell::Wall));
        assert!(!good_pair(target, Cell::Hole));
    }

    #[test]
    fn non_target_ground_is_inert() {
        for ground in [Cell::Blank, Cell::Wall, Cell::Box, Cell::Hole] {
            assert!(good_pair(ground, Cell::Player));
            assert!(good_pair(ground, Cell::Trophy(CellColor::Green)));
            assert!(good_pair(ground, Cell::Blank));
        }
    }

    #[test]
    fn empty_board_is_vacuously_won() {
        assert!(level_won(std::iter::empty()));
    }

    #[test]
    fn level_won_needs_every_pair() {
        let good = (Cell::Target(CellColor::Blue), Cell::Trophy(CellColor::Blue));
        let bad = (Cell::Target(CellColor::Blue), Cell::Blank);
        assert!(level_won([good]));
        assert!(!level_won([good, bad]));
    }

    #[test]
    fn won_takes_precedence_over_lost() {
        assert_eq!(resolve_status(true, false), LevelStatus::Won);
        assert_eq!(resolve_status(true, true), LevelStatus::Won);
        assert_eq!(resolve_status(false, false), LevelStatus::Lost);
        assert_eq!(resolve_status(false, true), LevelStatus::Playing);
    }
}
