//! Random walkers that stand in for a keyboard.
//!
//! A walker picks a direction, holds it for a few ticks, then either picks
//! another or lets go for a moment. The `simulate` command feeds these codes
//! into [`Engine::bind`](crate::engine::Engine::bind) as raw input.

use crate::step::MoveCode;

/// Longest hold, in ticks.
pub const MAX_HOLD_TICKS: u32 = 4;

/// Chance in percent that a walker releases instead of choosing a direction.
const RELEASE_PERCENT: u8 = 15;

pub struct RandomWalker {
    rng: fastrand::Rng,
}

impl RandomWalker {
    /// A walker with a fixed seed, so runs are repeatable.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Next raw code: usually a non-neutral direction, sometimes neutral.
    pub fn next_code(&mut self) -> MoveCode {
        if self.rng.u8(0..100) < RELEASE_PERCENT {
            return MoveCode::NEUTRAL;
        }
        let directions: Vec<MoveCode> = MoveCode::all().filter(|c| !c.is_neutral()).collect();
        directions[self.rng.usize(..directions.len())]
    }

    /// How many ticks to hold the current code.
    pub fn hold_ticks(&mut self) -> u32 {
        self.rng.u32(1..=MAX_HOLD_TICKS)
    }
}
