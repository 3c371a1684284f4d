//! Victory evaluation hook.
//!
//! No winning rule is defined yet: the engine calls the hook after every
//! claim and once more when the game ends, and [`NoVictory`] never declares a
//! winner. Swap in another [`VictoryRule`] with
//! [`Game::with_victory`](crate::game::Game::with_victory).

use crate::clock::Status;
use crate::grid::{Grid, Team};
use crate::score::Scores;

pub trait VictoryRule: Send {
    /// Inspect the current state and optionally declare a winning team.
    fn evaluate(&mut self, grid: &Grid, scores: Scores, status: Status) -> Option<Team>;
}

/// Never declares a winner.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoVictory;

impl VictoryRule for NoVictory {
    fn evaluate(&mut self, _grid: &Grid, _scores: Scores, _status: Status) -> Option<Team> {
        None
    }
}
