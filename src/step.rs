//! Move codes: a two-axis direction packed into one small integer.
//!
//! Each axis is one of Back (-1), Still (0) or Forward (1), and the pair is
//! encoded as `x + 3 * y`:
//!
//! ```text
//! -4 | -3 | -2
//! -1 |  0 |  1
//!  2 |  3 |  4
//! ```
//!
//! `y` grows downwards, so `-3` is up and `3` is down.

use std::fmt;

use crate::error::CodeError;

/// Movement along one axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Back = -1,
    Still = 0,
    Forward = 1,
}

impl Direction {
    pub const ALL: [Direction; 3] = [Direction::Back, Direction::Still, Direction::Forward];

    /// Signed offset along one axis.
    pub fn delta(self) -> isize {
        self as isize
    }

    fn from_delta(d: i32) -> Self {
        match d {
            -1 => Direction::Back,
            1 => Direction::Forward,
            _ => Direction::Still,
        }
    }
}

/// A decoded move: one direction per axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Step {
    pub x: Direction,
    pub y: Direction,
}

impl Step {
    pub const STILL: Step = Step::new(Direction::Still, Direction::Still);

    /// Combine one direction per axis.
    pub const fn new(x: Direction, y: Direction) -> Self {
        Self { x, y }
    }

    /// Encode to the packed integer form.
    pub fn code(self) -> MoveCode {
        MoveCode((self.x as i8) + 3 * (self.y as i8))
    }

    /// Decode a packed code back into its axis pair.
    pub fn from_code(code: MoveCode) -> Self {
        let c = code.0 as i32;
        // c + 4 is in 0..=8, so the division never rounds towards zero from below
        let y = (c + 4) / 3 - 1;
        let x = c - y * 3;
        Self {
            x: Direction::from_delta(x),
            y: Direction::from_delta(y),
        }
    }
}

/// One of the nine valid move codes, `-4..=4`.
///
/// Only constructible through [`TryFrom<i32>`] or [`Step::code`], so an
/// out-of-range code cannot reach the move resolver.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MoveCode(i8);

impl MoveCode {
    pub const NEUTRAL: MoveCode = MoveCode(0);
    pub const UP: MoveCode = MoveCode(-3);
    pub const DOWN: MoveCode = MoveCode(3);
    pub const LEFT: MoveCode = MoveCode(-1);
    pub const RIGHT: MoveCode = MoveCode(1);

    /// All nine codes in ascending order.
    pub fn all() -> impl Iterator<Item = MoveCode> {
        (-4..=4).map(MoveCode)
    }

    /// The raw integer code.
    pub fn value(self) -> i32 {
        self.0 as i32
    }

    /// Whether this is the neutral (no movement) code.
    pub fn is_neutral(self) -> bool {
        self.0 == 0
    }

    /// Decode into per-axis directions.
    pub fn step(self) -> Step {
        Step::from_code(self)
    }
}

impl TryFrom<i32> for MoveCode {
    type Error = CodeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        if (-4..=4).contains(&value) {
            Ok(MoveCode(value as i8))
        } else {
            Err(CodeError(value))
        }
    }
}

impl From<Step> for MoveCode {
    fn from(step: Step) -> Self {
        step.code()
    }
}

impl fmt::Display for MoveCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
