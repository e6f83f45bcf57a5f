//! Match scoring for the best-of-N protocol

use crate::types::{RoundVerdict, Seat};

/// Running score of one match: two win counters and the current round number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchScore {
    first_wins: u8,
    second_wins: u8,
    round: u32,
    rounds_to_win: u8,
}

impl MatchScore {
    /// A fresh score; `rounds_to_win` of 2 gives the best-of-3 format
    pub fn new(rounds_to_win: u8) -> Self {
        Self {
            first_wins: 0,
            second_wins: 0,
            round: 1,
            rounds_to_win,
        }
    }

    /// Current round number, starting at 1
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Round wins for one seat
    pub fn wins(&self, seat: Seat) -> u8 {
        match seat {
            Seat::First => self.first_wins,
            Seat::Second => self.second_wins,
        }
    }

    /// Apply a round verdict; ties score no one
    pub fn record(&mut self, verdict: RoundVerdict) {
        match verdict {
            RoundVerdict::Winner(Seat::First) => self.first_wins += 1,
            RoundVerdict::Winner(Seat::Second) => self.second_wins += 1,
            RoundVerdict::Tie => {}
        }
    }

    /// Increment the round number; runs after every round regardless of outcome
    pub fn advance_round(&mut self) {
        self.round += 1;
    }

    /// The seat that has reached the required win count, if any
    pub fn match_winner(&self) -> Option<Seat> {
        if self.first_wins >= self.rounds_to_win {
            Some(Seat::First)
        } else if self.second_wins >= self.rounds_to_win {
            Some(Seat::Second)
        } else {
            None
        }
    }

    /// Back to zero wins and round 1, for a rematch
    pub fn reset(&mut self) {
        self.first_wins = 0;
        self.second_wins = 0;
        self.round = 1;
    }
}
