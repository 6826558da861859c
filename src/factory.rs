//! Builds fresh sessions for the game screen.

use crate::ai_worker::AiWorker;
use crate::audio::AudioSink;
use crate::config::is_supported_board_size;
use crate::error::SessionError;
use crate::session::{GameMode, GameSession};
use hex_engine::{AiStrategy, Difficulty, HexBoard, Player};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::sync::Arc;
use tracing::info;

pub struct SessionFactory {
    rng: Xoshiro256PlusPlus,
    worker: AiWorker,
    audio: Arc<dyn AudioSink>,
}

impl SessionFactory {
    /// `seed` fixes the seat draws; without one the draws are unpredictable.
    pub fn new(
        seed: Option<u64>,
        strategy: Arc<dyn AiStrategy>,
        audio: Arc<dyn AudioSink>,
    ) -> Self {
        let rng = Xoshiro256PlusPlus::seed_from_u64(seed.unwrap_or_else(rand::random));
        SessionFactory {
            rng,
            worker: AiWorker::new(strategy),
            audio,
        }
    }

    pub fn audio(&self) -> &Arc<dyn AudioSink> {
        &self.audio
    }

    pub fn create(
        &mut self,
        mode: GameMode,
        difficulty: Difficulty,
        board_size: usize,
    ) -> Result<GameSession, SessionError> {
        if !is_supported_board_size(board_size) {
            return Err(SessionError::UnsupportedBoardSize(board_size));
        }
        let board = HexBoard::new(board_size, board_size);
        let session = match mode {
            GameMode::PlayerVsPlayer => {
                GameSession::player_vs_player(board, Arc::clone(&self.audio))
            }
            GameMode::PlayerVsAi => {
                let seat = if self.rng.random_bool(0.5) {
                    Player::One
                } else {
                    Player::Two
                };
                GameSession::player_vs_ai(
                    board,
                    difficulty,
                    seat,
                    self.worker.clone(),
                    Arc::clone(&self.audio),
                )
            }
        };
        info!(
            %mode,
            %difficulty,
            board_size,
            seat = ?session.human_seat(),
            "new session"
        );
        Ok(session)
    }
}
