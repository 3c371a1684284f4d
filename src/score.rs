//! Per-team cell counts.

use std::fmt;

use crate::grid::{Occupation, Team};

/// Number of cells held by each team.
///
/// Always recomputed from the occupation array, never patched incrementally.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Scores {
    pub team_a: usize,
    pub team_b: usize,
}

impl Scores {
    /// Count cells per team in one pass.
    pub fn recompute(occupation: &[Occupation]) -> Self {
        let mut scores = Scores::default();
        for cell in occupation {
            match cell.team() {
                Some(Team::A) => scores.team_a += 1,
                Some(Team::B) => scores.team_b += 1,
                None => {}
            }
        }
        scores
    }

    pub fn get(&self, team: Team) -> usize {
        match team {
            Team::A => self.team_a,
            Team::B => self.team_b,
        }
    }
}

impl fmt::Display for Scores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A {} : B {}", self.team_a, self.team_b)
    }
}
