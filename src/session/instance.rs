//! Session instance and lifecycle
//!
//! A session exclusively owns two connections, drives the match state machine,
//! and finishes by disposing of both seats exactly once: live participants go
//! back to the waiting pool, dead ones are closed.

use crate::config::GameSettings;
use crate::error::{CoordinatorError, Result};
use crate::lobby::WaitingPool;
use crate::net::PlayerConnection;
use crate::protocol;
use crate::session::score::MatchScore;
use crate::types::{Move, RoundVerdict, Seat, SessionId};
use crate::utils::current_timestamp;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Phases of a session's state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Broadcasting the match-start announcement
    Announce,
    /// Collecting and resolving moves for the current round
    RoundInProgress,
    /// A side has reached the required win count
    MatchDecided,
    /// Asking both participants whether to play again
    RematchPrompt,
    /// Both accepted; announcing the fresh match
    RematchAnnounce,
    /// Terminal state
    Terminated,
}

/// One running match between exactly two participants
pub struct Session {
    id: SessionId,
    phase: SessionPhase,
    score: MatchScore,
    first_name: String,
    second_name: String,
    first: Option<PlayerConnection>,
    second: Option<PlayerConnection>,
    pool: Arc<WaitingPool>,
    created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        first: PlayerConnection,
        second: PlayerConnection,
        pool: Arc<WaitingPool>,
        settings: GameSettings,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: SessionPhase::Announce,
            score: MatchScore::new(settings.rounds_to_win),
            first_name: first.name().to_string(),
            second_name: second.name().to_string(),
            first: Some(first),
            second: Some(second),
            pool,
            created_at: current_timestamp(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Run the session to completion and dispose of both participants.
    ///
    /// A disconnect aborts the phase loop; the disposition step still runs,
    /// exactly once, on every termination path.
    pub async fn run(mut self) {
        info!(
            session = %self.id,
            "Session started: '{}' vs '{}'", self.first_name, self.second_name
        );

        if let Err(e) = self.drive().await {
            info!(session = %self.id, "Session aborted: {}", e);
        }
        self.phase = SessionPhase::Terminated;

        self.dispose().await;
        let elapsed = current_timestamp() - self.created_at;
        debug!(
            session = %self.id,
            "Session finished after {}s", elapsed.num_seconds()
        );
    }

    async fn drive(&mut self) -> Result<()> {
        loop {
            match self.phase {
                SessionPhase::Announce => {
                    let line = protocol::match_start_line(&self.first_name, &self.second_name);
                    self.broadcast(&line).await;
                    self.phase = SessionPhase::RoundInProgress;
                }
                SessionPhase::RoundInProgress => {
                    self.play_round().await?;
                    if let Some(winner) = self.score.match_winner() {
                        let line = protocol::match_winner_line(self.seat_name(winner));
                        self.broadcast(&line).await;
                        self.phase = SessionPhase::MatchDecided;
                    }
                }
                SessionPhase::MatchDecided => {
                    self.phase = SessionPhase::RematchPrompt;
                }
                SessionPhase::RematchPrompt => {
                    self.negotiate_rematch().await?;
                }
                SessionPhase::RematchAnnounce => {
                    self.broadcast(protocol::NEW_MATCH_LINE).await;
                    self.score.reset();
                    self.phase = SessionPhase::Announce;
                }
                SessionPhase::Terminated => return Ok(()),
            }
        }
    }

    /// One full round: header, both moves in seat order, verdict and score
    async fn play_round(&mut self) -> Result<()> {
        let header = protocol::round_header(self.score.round());
        self.broadcast(&header).await;

        // Strictly sequential: the first seat answers before the second is prompted
        let first_move = self.prompt_move(Seat::First).await?;
        let second_move = self.prompt_move(Seat::Second).await?;

        let verdict = first_move.duel(second_move);
        self.score.record(verdict);

        let verdict_line = match verdict {
            RoundVerdict::Tie => protocol::tie_line(first_move, second_move),
            RoundVerdict::Winner(Seat::First) => {
                protocol::round_win_line(&self.first_name, first_move, second_move)
            }
            RoundVerdict::Winner(Seat::Second) => {
                protocol::round_win_line(&self.second_name, second_move, first_move)
            }
        };
        self.broadcast(&verdict_line).await;

        let score_line = protocol::score_line(
            &self.first_name,
            self.score.wins(Seat::First),
            self.score.wins(Seat::Second),
            &self.second_name,
        );
        self.broadcast(&score_line).await;

        self.score.advance_round();
        Ok(())
    }

    /// Prompt one seat until a parseable move arrives; bounded only by the
    /// participant's cooperation
    async fn prompt_move(&mut self, seat: Seat) -> Result<Move> {
        let prompt = protocol::move_prompt(self.seat_name(seat));
        let conn = self.seat_mut(seat)?;
        loop {
            let reply = conn.request(&prompt).await?;
            match reply.parse::<Move>() {
                Ok(chosen) => return Ok(chosen),
                Err(_) => conn.send(protocol::INVALID_MOVE_LINE).await,
            }
        }
    }

    /// Sequential yes/no exchange deciding whether the pair plays again
    async fn negotiate_rematch(&mut self) -> Result<()> {
        let first_reply = self
            .seat_mut(Seat::First)?
            .request(protocol::REMATCH_PROMPT)
            .await?;
        let second_reply = self
            .seat_mut(Seat::Second)?
            .request(protocol::REMATCH_PROMPT)
            .await?;

        let first_again = protocol::is_affirmative(&first_reply);
        let second_again = protocol::is_affirmative(&second_reply);

        match (first_again, second_again) {
            (true, true) => {
                self.phase = SessionPhase::RematchAnnounce;
            }
            (true, false) => {
                self.part_ways(Seat::First, Seat::Second).await;
                self.phase = SessionPhase::Terminated;
            }
            (false, true) => {
                self.part_ways(Seat::Second, Seat::First).await;
                self.phase = SessionPhase::Terminated;
            }
            (false, false) => {
                self.broadcast(protocol::CLOSING_LINE).await;
                self.phase = SessionPhase::Terminated;
            }
        }
        Ok(())
    }

    /// Farewell the decliner and return the still-willing participant to the
    /// pool immediately, vacating their seat so the disposition step only
    /// handles the decliner.
    async fn part_ways(&mut self, affirmative: Seat, decliner: Seat) {
        if let Ok(conn) = self.seat_mut(decliner) {
            conn.send(protocol::FAREWELL_LINE).await;
        }

        let slot = match affirmative {
            Seat::First => self.first.take(),
            Seat::Second => self.second.take(),
        };
        if let Some(mut conn) = slot {
            if conn.is_live() {
                self.pool.enqueue(conn).await;
            } else {
                conn.close().await;
            }
        }
    }

    /// Final reconciliation, once per session: re-queue live seats, close dead
    /// ones
    async fn dispose(&mut self) {
        let pool = Arc::clone(&self.pool);
        for slot in [self.first.take(), self.second.take()] {
            if let Some(mut conn) = slot {
                if conn.is_live() {
                    pool.enqueue(conn).await;
                } else {
                    conn.close().await;
                }
            }
        }
    }

    async fn broadcast(&mut self, line: &str) {
        if let Some(conn) = self.first.as_mut() {
            conn.send(line).await;
        }
        if let Some(conn) = self.second.as_mut() {
            conn.send(line).await;
        }
    }

    fn seat_name(&self, seat: Seat) -> &str {
        match seat {
            Seat::First => &self.first_name,
            Seat::Second => &self.second_name,
        }
    }

    fn seat_mut(&mut self, seat: Seat) -> Result<&mut PlayerConnection> {
        let slot = match seat {
            Seat::First => self.first.as_mut(),
            Seat::Second => self.second.as_mut(),
        };
        slot.ok_or_else(|| {
            CoordinatorError::InternalError {
                message: format!("{:?} seat is vacant", seat),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{scripted_conn, wait_for_line};
    use tokio::io::{AsyncBufReadExt, BufReader, DuplexStream};
    use tokio::io::Lines;

    async fn run_session(
        first_script: &[&str],
        second_script: &[&str],
    ) -> (
        Arc<WaitingPool>,
        Lines<BufReader<DuplexStream>>,
        Lines<BufReader<DuplexStream>>,
    ) {
        let (first, first_client) = scripted_conn("Alice", first_script).await;
        let (second, second_client) = scripted_conn("Bob", second_script).await;
        let pool = Arc::new(WaitingPool::new());

        let session = Session::new(
            first,
            second,
            Arc::clone(&pool),
            GameSettings::default(),
        );
        session.run().await;

        (
            pool,
            BufReader::new(first_client).lines(),
            BufReader::new(second_client).lines(),
        )
    }

    #[tokio::test]
    async fn test_full_match_follows_the_scored_script() {
        // Alice: rock, paper, rock, rock — Bob: scissors, paper, paper, scissors
        // Round wins: Alice, tie, Bob, Alice => 2-1 Alice
        let (pool, mut alice, _bob) = run_session(
            &["r", "p", "r", "r", "n"],
            &["s", "p", "p", "s", "n"],
        )
        .await;

        wait_for_line(&mut alice, "Match starting: Alice vs Bob").await;
        wait_for_line(&mut alice, "-- ROUND 1 --").await;
        wait_for_line(&mut alice, "Alice wins this round! (rock beats scissors)").await;
        wait_for_line(&mut alice, "Score: Alice 1 - 0 Bob").await;
        wait_for_line(&mut alice, "-- ROUND 2 --").await;
        wait_for_line(&mut alice, "Tie! (paper vs paper)").await;
        wait_for_line(&mut alice, "Score: Alice 1 - 0 Bob").await;
        wait_for_line(&mut alice, "-- ROUND 3 --").await;
        wait_for_line(&mut alice, "Bob wins this round! (paper beats rock)").await;
        wait_for_line(&mut alice, "Score: Alice 1 - 1 Bob").await;
        wait_for_line(&mut alice, "-- ROUND 4 --").await;
        wait_for_line(&mut alice, "Score: Alice 2 - 1 Bob").await;
        wait_for_line(&mut alice, ">>> Alice WINS THE MATCH! <<<").await;
        wait_for_line(&mut alice, protocol::CLOSING_LINE).await;

        // Both declined; the disposition step returns both to the pool
        assert_eq!(pool.len().await, 2);
    }

    #[tokio::test]
    async fn test_invalid_move_is_reprompted_without_advancing() {
        let (_pool, mut alice, _bob) =
            run_session(&["lizard", "r", "r", "n"], &["s", "s", "n"]).await;

        wait_for_line(&mut alice, protocol::INVALID_MOVE_LINE).await;
        // The round still resolves once a valid token arrives
        wait_for_line(&mut alice, "Score: Alice 1 - 0 Bob").await;
        wait_for_line(&mut alice, ">>> Alice WINS THE MATCH! <<<").await;
    }

    #[tokio::test]
    async fn test_rematch_accepted_resets_score_and_reannounces() {
        let (pool, mut alice, _bob) = run_session(
            &["r", "r", "y", "r", "r", "n"],
            &["s", "s", "y", "s", "s", "n"],
        )
        .await;

        wait_for_line(&mut alice, "Score: Alice 2 - 0 Bob").await;
        wait_for_line(&mut alice, protocol::NEW_MATCH_LINE).await;
        // The rematch re-announces and replays from a reset score
        wait_for_line(&mut alice, "Match starting: Alice vs Bob").await;
        wait_for_line(&mut alice, "-- ROUND 1 --").await;
        wait_for_line(&mut alice, "Score: Alice 1 - 0 Bob").await;
        wait_for_line(&mut alice, "Score: Alice 2 - 0 Bob").await;

        assert_eq!(pool.len().await, 2);
    }

    #[tokio::test]
    async fn test_one_sided_decline_requeues_affirmative_first() {
        let (pool, _alice, mut bob) =
            run_session(&["r", "r", "y"], &["s", "s", "n"]).await;

        // The decliner is told goodbye
        wait_for_line(&mut bob, protocol::FAREWELL_LINE).await;

        // Both return to the pool: the affirmative participant ahead of the
        // decliner
        assert_eq!(pool.len().await, 2);
        assert_eq!(pool.take().await.name(), "Alice");
        assert_eq!(pool.take().await.name(), "Bob");
    }

    #[tokio::test]
    async fn test_decline_by_first_seat_requeues_second_first() {
        let (pool, mut alice, _bob) =
            run_session(&["r", "r", "n"], &["s", "s", "y"]).await;

        wait_for_line(&mut alice, protocol::FAREWELL_LINE).await;

        assert_eq!(pool.len().await, 2);
        assert_eq!(pool.take().await.name(), "Bob");
        assert_eq!(pool.take().await.name(), "Alice");
    }

    #[tokio::test]
    async fn test_disconnect_aborts_session_and_requeues_survivor() {
        let (first, first_client) = scripted_conn("Alice", &[]).await;
        let (second, _second_client) = scripted_conn("Bob", &[]).await;
        let pool = Arc::new(WaitingPool::new());

        // Alice vanishes before the first prompt
        drop(first_client);

        let session = Session::new(
            first,
            second,
            Arc::clone(&pool),
            GameSettings::default(),
        );
        session.run().await;

        // The session aborted: Bob survives and waits again, Alice is gone
        assert_eq!(pool.len().await, 1);
        assert_eq!(pool.take().await.name(), "Bob");
    }
}
