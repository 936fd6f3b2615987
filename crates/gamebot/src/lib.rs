//! GameBot: a session-oriented event router for turn-based chat games.
//!
//! A messaging gateway feeds message and reaction events into a
//! [`SessionDirectory`]. The directory creates game sessions on command,
//! routes every later event to the sessions interested in it, and retires
//! sessions once their game ends. Each session is an isolated actor
//! owning one [`Game`](gamebot_session::Game) implementation; games talk
//! back to the platform through the [`Messenger`](gamebot_platform::Messenger)
//! trait, so the whole stack runs against a real gateway or an in-memory
//! mock alike.
//!
//! # Wiring it up
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use gamebot::prelude::*;
//! # async fn run<M: Messenger>(messenger: Arc<M>) -> Result<(), GameBotError> {
//! let registry = GameRegistry::new();
//! // ... register game types ...
//! let mut directory = SessionDirectory::new(
//!     messenger,
//!     registry,
//!     DirectoryConfig::new(UserId(1)),
//! );
//! directory.start().await?;
//! // pump gateway events into directory.handle_message / handle_reaction
//! # Ok(())
//! # }
//! ```

mod directory;
mod error;

pub use directory::{CreateOutcome, DirectoryConfig, SessionDirectory};
pub use error::GameBotError;

/// Installs the process-wide tracing subscriber, filtered by `RUST_LOG`.
///
/// Call once at startup. Embedders that install their own subscriber
/// should skip this.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

/// The types most integrations need, in one import.
pub mod prelude {
    pub use gamebot_platform::{
        ChannelId, Embed, GuildId, MessageEvent, MessageId, Messenger,
        PlatformError, ReactionEvent, UserId,
    };
    pub use gamebot_session::{
        Game, GameError, GameRegistry, SessionCore, SessionError, SessionHandle,
        SessionId, SessionInfo, SessionState, TimerToken,
    };

    pub use crate::{CreateOutcome, DirectoryConfig, GameBotError, SessionDirectory};
}
