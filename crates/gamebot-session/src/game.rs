//! The `Game` trait — the extension point concrete games implement.
//!
//! Every hook is mandatory. There are deliberately no default no-op
//! bodies: a new game type must spell out what it does (or explicitly
//! does not do) for each event category, so required behavior cannot be
//! omitted silently.

use std::fmt;
use std::future::Future;

use gamebot_platform::{ChannelId, MessageEvent, Messenger, ReactionEvent, UserId};
use serde::{Deserialize, Serialize};

use crate::{GameError, SessionCore};

/// An opaque token identifying a timer a game scheduled via
/// [`SessionCore::schedule_timer`]. The session layer never interprets
/// it; the game picks the encoding (the quiz game uses round indices).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerToken(pub u64);

impl fmt::Display for TimerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T-{}", self.0)
    }
}

/// The capability contract between a session and its game.
///
/// Hooks are invoked by the session actor, one at a time, with exclusive
/// access to the [`SessionCore`]. The actor forwards events
/// unconditionally — filtering by session state and guild is the
/// directory's responsibility, not the game's.
///
/// Methods return `impl Future + Send` rather than `async fn` so the
/// actor's task future stays `Send` across `tokio::spawn`.
pub trait Game<M: Messenger>: Send + 'static {
    /// Invoked once when the session starts, from the channel the start
    /// command was issued in. `host` is already registered as a player.
    fn on_start(
        &mut self,
        core: &mut SessionCore<M>,
        channel: ChannelId,
        host: UserId,
    ) -> impl Future<Output = Result<(), GameError>> + Send;

    /// A message posted in a guild channel of this session's guild, by a
    /// session member or bystander.
    fn on_guild_message(
        &mut self,
        core: &mut SessionCore<M>,
        evt: MessageEvent,
    ) -> impl Future<Output = Result<(), GameError>> + Send;

    /// A direct message from any user.
    fn on_direct_message(
        &mut self,
        core: &mut SessionCore<M>,
        evt: MessageEvent,
    ) -> impl Future<Output = Result<(), GameError>> + Send;

    /// A reaction added to any message the directory routed here.
    fn on_reaction(
        &mut self,
        core: &mut SessionCore<M>,
        evt: ReactionEvent,
    ) -> impl Future<Output = Result<(), GameError>> + Send;

    /// A timer previously scheduled through
    /// [`SessionCore::schedule_timer`] has fired. May arrive arbitrarily
    /// late; implementations must treat stale tokens as no-ops.
    fn on_timer(
        &mut self,
        core: &mut SessionCore<M>,
        token: TimerToken,
    ) -> impl Future<Output = Result<(), GameError>> + Send;
}
