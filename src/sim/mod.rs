//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies; output is a list of `GameEvent`s

pub mod autoplay;
pub mod drop;
pub mod events;
pub mod span;
pub mod state;
pub mod tick;

pub use autoplay::AutoPlayer;
pub use drop::{DropOutcome, classify_hit, drop_block};
pub use events::{GameEvent, HitKind};
pub use span::Span;
pub use state::{Block, Direction, GamePhase, GameSession, GameState};
pub use tick::{TickInput, step, tick};
