//! # Hex Client
//!
//! Session control for a terminal Hex client: two humans, or a human against
//! a Monte Carlo opponent, on an offset hexagonal board.
//!
//! ## Modules
//! - [`layout`]: cell ↔ virtual pixel geometry
//! - [`session`]: turn order, AI coordination and win resolution
//! - [`ai_worker`]: background move computation with a one-shot channel
//! - [`factory`]: fresh sessions with randomized seats
//! - [`app`]: screen state machine
//! - [`config`], [`audio`], [`widgets`], [`tui`]: collaborators
//!
//! Rules and search live in the `hex_engine` crate.

pub mod ai_worker;
pub mod app;
pub mod audio;
pub mod config;
pub mod error;
pub mod factory;
pub mod layout;
pub mod session;
pub mod tui;
pub mod widgets;

pub use app::{App, Screen, ScreenId};
pub use config::{HexConfig, Settings, SettingsStore};
pub use error::{AppError, ConfigError, SessionError};
pub use factory::SessionFactory;
pub use session::{GameMode, GameSession, SessionStatus};
