//! Background move computation.
//!
//! Each request gets its own thread and a one-shot channel. The UI thread
//! polls the [`AiHandle`] once per frame and never blocks on it. Dropping the
//! handle abandons the result: the thread finishes its search and its send
//! fails silently.

use hex_engine::{AiStrategy, Cell, Difficulty, HexBoard, Player};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Outcome of polling an [`AiHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiPoll {
    Pending,
    Ready(Cell),
    /// The computation ended without a move: no legal move, a panic, or a
    /// thread that could not be spawned.
    Abandoned,
}

/// Receiving end of one computation.
#[derive(Debug)]
pub struct AiHandle {
    rx: Receiver<Cell>,
    started: Instant,
}

impl AiHandle {
    pub fn poll(&self) -> AiPoll {
        match self.rx.try_recv() {
            Ok(cell) => AiPoll::Ready(cell),
            Err(TryRecvError::Empty) => AiPoll::Pending,
            Err(TryRecvError::Disconnected) => AiPoll::Abandoned,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Launches move searches off the UI thread.
#[derive(Clone)]
pub struct AiWorker {
    strategy: Arc<dyn AiStrategy>,
}

impl AiWorker {
    pub fn new(strategy: Arc<dyn AiStrategy>) -> Self {
        AiWorker { strategy }
    }

    /// Starts a search on a snapshot of the board. The caller keeps ownership
    /// of the live board.
    pub fn start(&self, snapshot: HexBoard, player: Player, difficulty: Difficulty) -> AiHandle {
        let (tx, rx) = mpsc::channel();
        let strategy = Arc::clone(&self.strategy);
        let spawned = thread::Builder::new()
            .name("hex-ai".to_string())
            .spawn(move || {
                let started = Instant::now();
                match strategy.select_move(&snapshot, player, difficulty) {
                    Some(cell) => {
                        let ms = started.elapsed().as_millis() as u64;
                        debug!(%player, %cell, ms, "ai move ready");
                        // The receiver may be gone if the session was closed.
                        let _ = tx.send(cell);
                    }
                    None => debug!(%player, "ai found no move"),
                }
            });
        if let Err(err) = spawned {
            error!(%err, "failed to spawn ai thread");
        }
        AiHandle {
            rx,
            started: Instant::now(),
        }
    }
}

impl std::fmt::Debug for AiWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiWorker").finish_non_exhaustive()
    }
}
