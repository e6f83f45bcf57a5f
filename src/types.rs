//! Common types used throughout the match coordinator

use crate::error::CoordinatorError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for match sessions
pub type SessionId = Uuid;

/// The two seats of a session, in pairing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    First,
    Second,
}

impl Seat {
    /// The opposing seat
    pub fn other(self) -> Seat {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }
}

/// A participant's choice for one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Rock,
    Paper,
    Scissors,
}

impl Move {
    /// Cyclic dominance: each move beats exactly one other
    pub fn beats(self, other: Move) -> bool {
        matches!(
            (self, other),
            (Move::Rock, Move::Scissors)
                | (Move::Paper, Move::Rock)
                | (Move::Scissors, Move::Paper)
        )
    }

    /// Resolve a round between the first and second seat
    pub fn duel(self, other: Move) -> RoundVerdict {
        if self == other {
            RoundVerdict::Tie
        } else if self.beats(other) {
            RoundVerdict::Winner(Seat::First)
        } else {
            RoundVerdict::Winner(Seat::Second)
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Move::Rock => write!(f, "rock"),
            Move::Paper => write!(f, "paper"),
            Move::Scissors => write!(f, "scissors"),
        }
    }
}

impl FromStr for Move {
    type Err = CoordinatorError;

    /// Accepts the single-letter shorthand or the full word, any case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "r" | "rock" => Ok(Move::Rock),
            "p" | "paper" => Ok(Move::Paper),
            "s" | "scissors" => Ok(Move::Scissors),
            _ => Err(CoordinatorError::InvalidMove {
                token: s.to_string(),
            }),
        }
    }
}

/// Outcome of a single round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundVerdict {
    Winner(Seat),
    Tie,
}
