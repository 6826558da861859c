//! # Game Session
//!
//! One match from setup to result. The session owns the live board and is
//! the only place it is mutated; the AI worker only ever sees snapshots.
//!
//! Turn policy:
//! - Human moves arrive through [`GameSession::attempt_human_move`]. Anything
//!   invalid (occupied cell, wrong seat, game over, AI thinking) is ignored.
//! - AI moves are driven by [`GameSession::tick`], called once per frame. It
//!   starts at most one computation and applies its result through the same
//!   path a human move takes.
//! - After every accepted move the board's win check decides between ending
//!   the game and passing the turn.

use crate::ai_worker::{AiHandle, AiPoll, AiWorker};
use crate::audio::{AudioSink, SoundEvent};
use hex_engine::{Cell, Difficulty, HexBoard, Player};
use std::fmt;
use std::mem;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Consecutive computations that may end without a move before the AI gives up.
pub const MAX_AI_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameMode {
    PlayerVsPlayer,
    PlayerVsAi,
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameMode::PlayerVsPlayer => f.write_str("Player vs Player"),
            GameMode::PlayerVsAi => f.write_str("Player vs AI"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    InProgress,
    Won(Player),
}

/// Observable state of the AI computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiPhase {
    Idle,
    Running,
    Ready(Cell),
    /// Gave up after [`MAX_AI_ATTEMPTS`] computations ended without a move.
    Failed,
}

#[derive(Debug)]
enum AiComputation {
    Idle,
    Running(AiHandle),
    Ready(Cell),
    Failed,
}

pub struct GameSession {
    board: HexBoard,
    turn: Player,
    mode: GameMode,
    human_seat: Option<Player>,
    difficulty: Difficulty,
    last_move: Option<Cell>,
    status: SessionStatus,
    pending: AiComputation,
    worker: Option<AiWorker>,
    audio: Arc<dyn AudioSink>,
    move_count: usize,
    ai_failures: u32,
}

impl GameSession {
    /// Both seats are human.
    pub fn player_vs_player(board: HexBoard, audio: Arc<dyn AudioSink>) -> Self {
        Self::with_parts(
            board,
            GameMode::PlayerVsPlayer,
            Difficulty::default(),
            None,
            None,
            audio,
        )
    }

    /// `human_seat` plays through input; the other seat is computed by `worker`.
    pub fn player_vs_ai(
        board: HexBoard,
        difficulty: Difficulty,
        human_seat: Player,
        worker: AiWorker,
        audio: Arc<dyn AudioSink>,
    ) -> Self {
        Self::with_parts(
            board,
            GameMode::PlayerVsAi,
            difficulty,
            Some(human_seat),
            Some(worker),
            audio,
        )
    }

    fn with_parts(
        board: HexBoard,
        mode: GameMode,
        difficulty: Difficulty,
        human_seat: Option<Player>,
        worker: Option<AiWorker>,
        audio: Arc<dyn AudioSink>,
    ) -> Self {
        GameSession {
            board,
            turn: Player::One,
            mode,
            human_seat,
            difficulty,
            last_move: None,
            status: SessionStatus::InProgress,
            pending: AiComputation::Idle,
            worker,
            audio,
            move_count: 0,
            ai_failures: 0,
        }
    }

    pub fn board(&self) -> &HexBoard {
        &self.board
    }

    pub fn turn(&self) -> Player {
        self.turn
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn human_seat(&self) -> Option<Player> {
        self.human_seat
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn last_move(&self) -> Option<Cell> {
        self.last_move
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn winner(&self) -> Option<Player> {
        match self.status {
            SessionStatus::Won(player) => Some(player),
            SessionStatus::InProgress => None,
        }
    }

    pub fn move_count(&self) -> usize {
        self.move_count
    }

    pub fn ai_phase(&self) -> AiPhase {
        match self.pending {
            AiComputation::Idle => AiPhase::Idle,
            AiComputation::Running(_) => AiPhase::Running,
            AiComputation::Ready(cell) => AiPhase::Ready(cell),
            AiComputation::Failed => AiPhase::Failed,
        }
    }

    /// True while the computer owns the move.
    pub fn is_ai_turn(&self) -> bool {
        self.mode == GameMode::PlayerVsAi
            && self.status == SessionStatus::InProgress
            && self.human_seat != Some(self.turn)
    }

    pub fn is_thinking(&self) -> bool {
        matches!(self.pending, AiComputation::Running(_))
    }

    /// Plays `cell` for the side to move if a human may act now.
    pub fn attempt_human_move(&mut self, cell: Cell) {
        if self.status != SessionStatus::InProgress {
            return;
        }
        if !matches!(self.pending, AiComputation::Idle) {
            return;
        }
        if self.mode == GameMode::PlayerVsAi && self.human_seat != Some(self.turn) {
            return;
        }
        if !self.apply_move(cell) {
            debug!(%cell, "ignored move on occupied or missing cell");
        }
    }

    /// Per-frame update: drives the AI computation when it is the AI's turn.
    pub fn tick(&mut self) {
        if !self.is_ai_turn() {
            return;
        }

        if let AiComputation::Running(handle) = &self.pending {
            match handle.poll() {
                AiPoll::Pending => return,
                AiPoll::Ready(cell) => {
                    debug!(%cell, ms = handle.elapsed().as_millis() as u64, "ai result received");
                    self.pending = AiComputation::Ready(cell);
                }
                AiPoll::Abandoned => {
                    warn!("ai computation ended without a move");
                    self.record_ai_failure();
                    return;
                }
            }
        }

        match mem::replace(&mut self.pending, AiComputation::Idle) {
            AiComputation::Idle => {
                let Some(worker) = &self.worker else {
                    return;
                };
                debug!(
                    player = %self.turn,
                    difficulty = %self.difficulty,
                    "starting ai computation"
                );
                let handle = worker.start(self.board.clone(), self.turn, self.difficulty);
                self.pending = AiComputation::Running(handle);
            }
            AiComputation::Ready(cell) => {
                if self.apply_move(cell) {
                    self.ai_failures = 0;
                } else {
                    warn!(%cell, "discarding illegal ai move");
                    self.record_ai_failure();
                }
            }
            parked @ (AiComputation::Running(_) | AiComputation::Failed) => self.pending = parked,
        }
    }

    /// Parks the AI in `Failed` once too many computations in a row came to
    /// nothing; otherwise the next tick tries again.
    fn record_ai_failure(&mut self) {
        self.ai_failures += 1;
        if self.ai_failures >= MAX_AI_ATTEMPTS {
            error!(attempts = self.ai_failures, "ai produced no usable move, giving up");
            self.pending = AiComputation::Failed;
        } else {
            self.pending = AiComputation::Idle;
        }
    }

    /// Starts the same match over; mode, seat and difficulty are kept.
    pub fn reset(&mut self) {
        self.board = HexBoard::new(self.board.rows(), self.board.cols());
        self.turn = Player::One;
        self.last_move = None;
        self.status = SessionStatus::InProgress;
        self.pending = AiComputation::Idle;
        self.move_count = 0;
        self.ai_failures = 0;
        info!(mode = %self.mode, "session reset");
    }

    /// The winner's connecting chain, empty while the game is running.
    pub fn winning_path(&self) -> Vec<Cell> {
        self.winner()
            .map(|winner| self.board.winning_path(winner))
            .unwrap_or_default()
    }

    pub fn turn_banner(&self) -> String {
        if self.is_thinking() {
            return "Thinking...".to_string();
        }
        if matches!(self.pending, AiComputation::Failed) {
            return "AI failed to move".to_string();
        }
        match self.human_seat {
            None => format!("Turn: {}", self.turn.name()),
            Some(seat) if seat == self.turn => format!("Turn: {} (You)", self.turn.name()),
            Some(_) => format!("Turn: {} (AI)", self.turn.name()),
        }
    }

    pub fn outcome_banner(&self) -> Option<String> {
        self.winner().map(|winner| format!("{} Wins!", winner.name()))
    }

    fn apply_move(&mut self, cell: Cell) -> bool {
        if !self.board.make_move(cell.row, cell.col, self.turn) {
            return false;
        }
        debug!(
            player = %self.turn,
            %cell,
            red_needs = self.board.shortest_distance(Player::One),
            blue_needs = self.board.shortest_distance(Player::Two),
            "move applied"
        );
        self.last_move = Some(cell);
        self.move_count += 1;
        self.audio.play(SoundEvent::Move);
        self.resolve_win();
        true
    }

    fn resolve_win(&mut self) {
        let Some(winner) = self.board.check_win() else {
            self.turn = self.turn.opponent();
            return;
        };
        self.status = SessionStatus::Won(winner);
        // A result still in flight belongs to a finished game.
        self.pending = AiComputation::Idle;
        let celebrate = match self.mode {
            GameMode::PlayerVsPlayer => true,
            GameMode::PlayerVsAi => self.human_seat == Some(winner),
        };
        self.audio
            .play(if celebrate { SoundEvent::Win } else { SoundEvent::Lose });
        info!(%winner, moves = self.move_count, "game over");
        debug!("final position:\n{}", self.board);
    }
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("mode", &self.mode)
            .field("turn", &self.turn)
            .field("human_seat", &self.human_seat)
            .field("difficulty", &self.difficulty)
            .field("last_move", &self.last_move)
            .field("status", &self.status)
            .field("pending", &self.pending)
            .field("move_count", &self.move_count)
            .finish_non_exhaustive()
    }
}
