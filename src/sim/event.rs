/// Events emitted while resolving a move.
/// The driver consumes these for the move counter and message line.

use crate::domain::grid::Pos;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameEvent {
    PlayerMoved { from: Pos, to: Pos },
    PushableMoved { from: Pos, to: Pos },
    /// A box or trophy was pushed into a hole; both are gone.
    PushableSwallowed { at: Pos },
    /// The player stepped into a hole; both are gone.
    PlayerSwallowed { at: Pos },
}
