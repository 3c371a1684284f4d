//! A single game instance: grid, clock, scores and the move resolver.
//!
//! `Game` is single-threaded and does no waiting. The threaded
//! [`Engine`](crate::engine::Engine) wraps it to run the phase timers and to
//! serialize moves arriving from several input streams; tests can drive it
//! directly by calling [`Game::start`] and [`Game::advance`].

use std::fmt;

use crate::clock::{Clock, Phase, Status, Subscriber};
use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::fill::enclose;
use crate::grid::{Grid, Occupation, Team};
use crate::score::Scores;
use crate::step::MoveCode;
use crate::victory::{NoVictory, VictoryRule};

/// A consistent copy of everything a renderer needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub grid: Grid,
    pub scores: Scores,
    pub status: Status,
    pub winner: Option<Team>,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.grid)?;
        write!(f, "{} [{}]", self.scores, self.status)?;
        if let Some(team) = self.winner {
            write!(f, " winner: {team}")?;
        }
        writeln!(f)
    }
}

pub struct Game {
    grid: Grid,
    clock: Clock,
    scores: Scores,
    victory: Box<dyn VictoryRule>,
    winner: Option<Team>,
}

impl Game {
    /// Create a game with default timings.
    pub fn new(size: usize, player_count: usize) -> Result<Self, ConfigError> {
        Self::with_config(&GameConfig::new(size, player_count))
    }

    pub fn with_config(config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = Grid::new(config.size, config.player_count);
        let scores = Scores::recompute(grid.occupation());
        Ok(Self {
            grid,
            clock: Clock::new(config.timings),
            scores,
            victory: Box::new(NoVictory),
            winner: None,
        })
    }

    /// Replace the victory rule.
    pub fn with_victory(mut self, rule: impl VictoryRule + 'static) -> Self {
        self.victory = Box::new(rule);
        self
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn occupation(&self) -> &[Occupation] {
        self.grid.occupation()
    }

    pub fn positions(&self) -> &[usize] {
        self.grid.positions()
    }

    pub fn scores(&self) -> Scores {
        self.scores
    }

    pub fn status(&self) -> Status {
        self.clock.status()
    }

    pub fn winner(&self) -> Option<Team> {
        self.winner
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            grid: self.grid.clone(),
            scores: self.scores,
            status: self.status(),
            winner: self.winner,
        }
    }

    pub fn subscribe(&mut self, subscriber: Subscriber) {
        self.clock.subscribe(subscriber);
    }

    /// Reinitialize in place and return to `Initial`.
    pub fn reset(&mut self) {
        self.grid.reset();
        self.scores = Scores::recompute(self.grid.occupation());
        self.winner = None;
        self.clock.reset();
        log::info!("game reset (epoch {})", self.clock.epoch());
    }

    /// Enter `Standby`; returns the phase that will open play.
    pub fn start(&mut self) -> Option<Phase> {
        self.clock.start()
    }

    /// Apply a scheduled phase; returns the next one to schedule.
    pub fn advance(&mut self, phase: Phase) -> Option<Phase> {
        let before = self.clock.status();
        let next = self.clock.advance(phase);
        if before != Status::Ended && self.clock.status() == Status::Ended {
            self.check_victory();
        }
        next
    }

    /// Move a player's marker one step.
    ///
    /// Returns `true` only when the destination cell changed owner. A move is
    /// refused outside `Ongoing`, and a step that the grid edge clamps back
    /// onto the current cell is a no-op.
    pub fn move_player(&mut self, player: usize, code: MoveCode) -> bool {
        if self.clock.status() != Status::Ongoing {
            return false;
        }
        if player >= self.grid.player_count() {
            log::warn!("move for unknown player {player}");
            return false;
        }

        let from = self.grid.position(player);
        let to = self.grid.target(from, code.step());
        if to == from {
            return false;
        }

        let team = Team::of_player(player);
        self.grid.place(player, to);
        let changed = self.grid.claim(to, team.occupation());
        log::debug!(
            "player {player} {:?} -> {:?}{}",
            self.grid.decode(from),
            self.grid.decode(to),
            if changed { " (claimed)" } else { "" }
        );
        if changed {
            enclose(&mut self.grid, to, team);
            self.scores = Scores::recompute(self.grid.occupation());
            self.check_victory();
        }
        changed
    }

    fn check_victory(&mut self) {
        if self.winner.is_some() {
            return;
        }
        self.winner = self
            .victory
            .evaluate(&self.grid, self.scores, self.clock.status());
        if let Some(team) = self.winner {
            log::info!("{team} wins with {}", self.scores);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Start a game and skip straight to `Ongoing`.
    fn ongoing(size: usize) -> Game {
        let mut game = Game::new(size, 2).unwrap();
        let standby = game.start().unwrap();
        game.advance(standby).unwrap();
        game
    }

    #[test]
    fn test_new_scores_seeds() {
        let game = Game::new(13, 2).unwrap();
        assert_eq!(game.scores(), Scores { team_a: 1, team_b: 1 });
        assert_eq!(game.status(), Status::Initial);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(Game::new(2, 2), Err(ConfigError::SizeTooSmall(2))));
    }

    #[test]
    fn test_move_rejected_before_ongoing() {
        let mut game = Game::new(9, 2).unwrap();
        let before = game.snapshot();
        assert!(!game.move_player(0, MoveCode::RIGHT));
        game.start();
        assert!(!game.move_player(0, MoveCode::RIGHT));
        assert_eq!(game.grid(), &before.grid);
    }

    #[test]
    fn test_move_claims_cell() {
        let mut game = ongoing(9);
        let from = game.positions()[0];
        assert!(game.move_player(0, MoveCode::RIGHT));
        assert_eq!(game.positions()[0], from + 1);
        assert_eq!(game.occupation()[from + 1], Occupation::TeamA);
        assert_eq!(game.scores().team_a, 2);
    }

    #[test]
    fn test_move_onto_own_cell_is_not_a_change() {
        let mut game = ongoing(9);
        let from = game.positions()[0];
        assert!(game.move_player(0, MoveCode::RIGHT));
        assert!(!game.move_player(0, MoveCode::LEFT));
        assert_eq!(game.positions()[0], from);
        assert_eq!(game.scores().team_a, 2);
    }

    #[test]
    fn test_neutral_is_noop() {
        let mut game = ongoing(9);
        let before = game.snapshot();
        assert!(!game.move_player(1, MoveCode::NEUTRAL));
        assert_eq!(game.snapshot(), before);
    }

    #[test]
    fn test_unknown_player_is_refused() {
        let mut game = ongoing(9);
        assert!(!game.move_player(5, MoveCode::RIGHT));
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut game = ongoing(9);
        game.move_player(0, MoveCode::DOWN);
        game.reset();
        let fresh = Game::new(9, 2).unwrap();
        assert_eq!(game.snapshot(), fresh.snapshot());
    }

    struct FirstClaim;

    impl VictoryRule for FirstClaim {
        fn evaluate(&mut self, _grid: &Grid, scores: Scores, _status: Status) -> Option<Team> {
            (scores.team_b > 1).then_some(Team::B)
        }
    }

    #[test]
    fn test_victory_hook_after_claim() {
        let mut game = Game::new(9, 2).unwrap().with_victory(FirstClaim);
        let standby = game.start().unwrap();
        game.advance(standby);
        assert_eq!(game.winner(), None);
        game.move_player(1, MoveCode::UP);
        assert_eq!(game.winner(), Some(Team::B));
    }

    struct AtEnd;

    impl VictoryRule for AtEnd {
        fn evaluate(&mut self, _grid: &Grid, _scores: Scores, status: Status) -> Option<Team> {
            (status == Status::Ended).then_some(Team::A)
        }
    }

    #[test]
    fn test_victory_hook_at_end() {
        let mut game = Game::new(9, 2).unwrap().with_victory(AtEnd);
        let standby = game.start().unwrap();
        let play = game.advance(standby).unwrap();
        assert_eq!(game.winner(), None);
        game.advance(play);
        assert_eq!(game.status(), Status::Ended);
        assert_eq!(game.winner(), Some(Team::A));
        assert!(!game.move_player(0, MoveCode::RIGHT));
    }
}
