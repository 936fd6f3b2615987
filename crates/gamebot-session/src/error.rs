//! Error types for the session layer.

use gamebot_platform::PlatformError;

use crate::SessionId;

/// Errors that can occur during session management.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A game type with this name is already registered. Registry misuse —
    /// fatal at startup, never user-facing.
    #[error("game type {0:?} already registered")]
    DuplicateType(String),

    /// `register_player` was invoked while the session was active.
    #[error("cannot register players while session {0} is active")]
    RegisterWhileActive(SessionId),

    /// The session's command channel is closed or full.
    #[error("session {0} is unavailable")]
    Unavailable(SessionId),
}

/// Errors surfaced by a [`Game`](crate::Game) hook.
///
/// These never reach users: the session actor logs them and drops the
/// triggering event, so a misbehaving hook cannot take down the session
/// or the shared event pump.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// An outbound platform call failed.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// A programming-contract violation inside the game (for example, a
    /// round operation in the wrong state).
    #[error("game contract violation: {0}")]
    Contract(String),
}

impl GameError {
    /// Builds a [`GameError::Contract`] from any message.
    pub fn contract(msg: impl Into<String>) -> Self {
        Self::Contract(msg.into())
    }
}

impl From<SessionError> for GameError {
    fn from(err: SessionError) -> Self {
        Self::Contract(err.to_string())
    }
}
