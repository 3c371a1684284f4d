//! Square grid: per-cell occupation plus one marker position per player.
//!
//! Cells are stored row-major in a flat vector, `index = y * size + x`.

use std::fmt;

use crate::constants::SEED_OFFSET;
use crate::step::Step;

/// A team. Players alternate teams by id parity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Team {
    A,
    B,
}

impl Team {
    /// Team of a player id: even ids play A, odd ids play B.
    pub fn of_player(player: usize) -> Self {
        if player % 2 == 0 { Team::A } else { Team::B }
    }

    /// The occupation value this team paints.
    pub fn occupation(self) -> Occupation {
        match self {
            Team::A => Occupation::TeamA,
            Team::B => Occupation::TeamB,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::A => write!(f, "team A"),
            Team::B => write!(f, "team B"),
        }
    }
}

/// Who has claimed a cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Occupation {
    #[default]
    Empty,
    TeamA,
    TeamB,
}

impl Occupation {
    /// Owning team, or `None` for an empty cell.
    pub fn team(self) -> Option<Team> {
        match self {
            Occupation::Empty => None,
            Occupation::TeamA => Some(Team::A),
            Occupation::TeamB => Some(Team::B),
        }
    }
}

/// The grid model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    occupation: Vec<Occupation>,
    positions: Vec<usize>,
}

impl Grid {
    /// Build an empty grid with seeded start positions.
    ///
    /// The caller guarantees `size >= MIN_SIZE` and at least two players;
    /// [`GameConfig::validate`](crate::config::GameConfig::validate) checks both.
    pub fn new(size: usize, player_count: usize) -> Self {
        let mut grid = Self {
            size,
            occupation: vec![Occupation::Empty; size * size],
            positions: vec![0; player_count],
        };
        grid.reset();
        grid
    }

    /// Clear every cell and put the markers back on their start cells.
    ///
    /// Players 0 and 1 sit `SEED_OFFSET` cells either side of the centre;
    /// anyone else starts on the centre itself.
    pub fn reset(&mut self) {
        self.occupation.fill(Occupation::Empty);
        let centre = self.cell_count() / 2;
        for (player, pos) in self.positions.iter_mut().enumerate() {
            *pos = match player {
                0 => centre - SEED_OFFSET,
                1 => centre + SEED_OFFSET,
                _ => centre,
            };
        }
        for player in 0..self.positions.len() {
            let idx = self.positions[player];
            self.occupation[idx] = Team::of_player(player).occupation();
        }
    }

    /// Side length of the grid.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total number of cells, `size * size`.
    pub fn cell_count(&self) -> usize {
        self.occupation.len()
    }

    /// Number of player markers on the grid.
    pub fn player_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn encode(&self, x: usize, y: usize) -> usize {
        y * self.size + x
    }

    #[inline]
    pub fn decode(&self, idx: usize) -> (usize, usize) {
        (idx % self.size, idx / self.size)
    }

    /// Occupation of every cell, indexed by encoded position.
    pub fn occupation(&self) -> &[Occupation] {
        &self.occupation
    }

    /// Encoded marker position of every player.
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Occupation of one cell.
    pub fn at(&self, idx: usize) -> Occupation {
        self.occupation[idx]
    }

    /// Encoded marker position of one player.
    pub fn position(&self, player: usize) -> usize {
        self.positions[player]
    }

    /// True if any player's marker stands on `idx`.
    pub fn has_marker(&self, idx: usize) -> bool {
        self.positions.contains(&idx)
    }

    /// True if `idx` lies on the outer ring of the grid.
    pub fn is_edge(&self, idx: usize) -> bool {
        let (x, y) = self.decode(idx);
        let last = self.size - 1;
        x == 0 || y == 0 || x == last || y == last
    }

    /// Orthogonal in-bounds neighbors of `idx`.
    pub fn neighbors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        let (x, y) = self.decode(idx);
        let s = self.size;
        let mut v = Vec::with_capacity(4);
        if x > 0 {
            v.push(idx - 1);
        }
        if x + 1 < s {
            v.push(idx + 1);
        }
        if y > 0 {
            v.push(idx - s);
        }
        if y + 1 < s {
            v.push(idx + s);
        }
        v.into_iter()
    }

    /// Where `step` would take a marker standing on `idx`.
    ///
    /// Each axis is clamped independently: an axis that would leave the grid
    /// stays where it was while the other axis may still move.
    pub fn target(&self, idx: usize, step: Step) -> usize {
        let (x, y) = self.decode(idx);
        let nx = self.clamp_axis(x, step.x.delta());
        let ny = self.clamp_axis(y, step.y.delta());
        self.encode(nx, ny)
    }

    fn clamp_axis(&self, v: usize, delta: isize) -> usize {
        match v.checked_add_signed(delta) {
            Some(n) if n < self.size => n,
            _ => v,
        }
    }

    pub(crate) fn place(&mut self, player: usize, idx: usize) {
        self.positions[player] = idx;
    }

    /// Set a cell's occupation, returning whether it changed.
    pub(crate) fn claim(&mut self, idx: usize, occupation: Occupation) -> bool {
        let changed = self.occupation[idx] != occupation;
        self.occupation[idx] = occupation;
        changed
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.size {
            for x in 0..self.size {
                let idx = self.encode(x, y);
                let marked = self.has_marker(idx);
                let ch = match (self.occupation[idx], marked) {
                    (Occupation::Empty, false) => '.',
                    (Occupation::Empty, true) => '*',
                    (Occupation::TeamA, false) => 'x',
                    (Occupation::TeamA, true) => 'X',
                    (Occupation::TeamB, false) => 'o',
                    (Occupation::TeamB, true) => 'O',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::{Direction, MoveCode};

    #[test]
    fn test_encode_decode_roundtrip() {
        let grid = Grid::new(7, 2);
        for y in 0..7 {
            for x in 0..7 {
                assert_eq!(grid.decode(grid.encode(x, y)), (x, y));
            }
        }
    }

    #[test]
    fn test_seed_positions() {
        let grid = Grid::new(13, 2);
        assert_eq!(grid.positions(), &[169 / 2 - 3, 169 / 2 + 3]);
        assert_eq!(grid.at(81), Occupation::TeamA);
        assert_eq!(grid.at(87), Occupation::TeamB);
        let claimed = grid
            .occupation()
            .iter()
            .filter(|o| **o != Occupation::Empty)
            .count();
        assert_eq!(claimed, 2);
    }

    #[test]
    fn test_extra_players_start_in_centre() {
        let grid = Grid::new(9, 4);
        assert_eq!(grid.position(2), 40);
        assert_eq!(grid.position(3), 40);
        // player 3 painted last
        assert_eq!(grid.at(40), Occupation::TeamB);
    }

    #[test]
    fn test_reset_clears_in_place() {
        let mut grid = Grid::new(5, 2);
        grid.claim(0, Occupation::TeamB);
        grid.place(0, 0);
        grid.reset();
        assert_eq!(grid, Grid::new(5, 2));
    }

    #[test]
    fn test_edges() {
        let grid = Grid::new(5, 2);
        assert!(grid.is_edge(grid.encode(0, 2)));
        assert!(grid.is_edge(grid.encode(4, 4)));
        assert!(grid.is_edge(grid.encode(2, 0)));
        assert!(!grid.is_edge(grid.encode(1, 1)));
        assert!(!grid.is_edge(grid.encode(3, 3)));
    }

    #[test]
    fn test_neighbors_corner_and_centre() {
        let grid = Grid::new(5, 2);
        let mut corner: Vec<usize> = grid.neighbors(0).collect();
        corner.sort();
        assert_eq!(corner, vec![1, 5]);
        assert_eq!(grid.neighbors(grid.encode(2, 2)).count(), 4);
    }

    #[test]
    fn test_target_clamps_each_axis() {
        let grid = Grid::new(5, 2);
        let corner = grid.encode(0, 0);
        assert_eq!(grid.target(corner, MoveCode::LEFT.step()), corner);
        assert_eq!(grid.target(corner, MoveCode::UP.step()), corner);
        // up-right from the top edge only moves right
        let up_right = Step::new(Direction::Forward, Direction::Back);
        assert_eq!(grid.target(corner, up_right), grid.encode(1, 0));

        let far = grid.encode(4, 4);
        assert_eq!(grid.target(far, MoveCode::RIGHT.step()), far);
        assert_eq!(grid.target(far, MoveCode::DOWN.step()), far);
        assert_eq!(grid.target(far, MoveCode::UP.step()), grid.encode(4, 3));
    }

    #[test]
    fn test_display() {
        let grid = Grid::new(3, 2);
        // 9 cells, seeds at 1 and 7
        assert_eq!(grid.to_string(), ". X . \n. . . \n. O . \n");
    }
}
