//! # Hex Engine
//!
//! Rules and search for the connection game Hex, played on an `rows × cols`
//! grid of hexagons with odd rows shifted half a cell to the right.
//!
//! - [`board`]: the board engine. Stone placement, incremental connectivity
//!   per player, win detection and winning-path reconstruction.
//! - [`ai`]: the computer opponent. A pluggable [`AiStrategy`] trait and the
//!   default [`MctsStrategy`] (Monte Carlo tree search with RAVE statistics,
//!   parallelised at the root with rayon).
//!
//! Red (player one) connects the left and right edges; Blue (player two)
//! connects the top and bottom edges.

pub mod ai;
pub mod board;
mod dsu;

pub use ai::{AiStrategy, Difficulty, EngineError, MctsConfig, MctsStrategy};
pub use board::{Cell, HexBoard, Player, UNREACHABLE};
