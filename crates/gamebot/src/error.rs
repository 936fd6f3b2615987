use gamebot_platform::PlatformError;
use gamebot_session::SessionError;

/// Top-level error type: every fault the directory can surface.
#[derive(Debug, thiserror::Error)]
pub enum GameBotError {
    /// An outbound platform call failed.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// A session-layer operation failed.
    #[error(transparent)]
    Session(#[from] SessionError),
}
