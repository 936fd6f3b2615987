//! Game session management for GameBot.
//!
//! A session is one running game, scoped to one guild. Each session runs
//! as an isolated Tokio task (actor model): the actor owns the player
//! roster, the lifecycle state, and the game's own state, and everything
//! outside talks to it through a command channel. That structure is what
//! makes the concurrency rules hold — answer registration, rank
//! assignment, and state transitions are serialized by construction
//! instead of guarded by ad-hoc locks.
//!
//! # Key types
//!
//! - [`Game`] — the trait concrete games implement (every hook mandatory)
//! - [`SessionCore`] — the session state a game mutates from its hooks
//! - [`SessionHandle`] — send events to a running session actor
//! - [`SessionState`] — lifecycle state machine
//! - [`GameRegistry`] — name → constructor catalog of game types

mod actor;
mod error;
mod game;
mod registry;
mod session;
mod state;

pub use actor::{SessionHandle, SessionInfo, spawn_session};
pub use session::{SessionCore, SessionId};
pub use error::{GameError, SessionError};
pub use game::{Game, TimerToken};
pub use registry::{GameRegistry, GameType, SpawnFn};
pub use state::SessionState;
