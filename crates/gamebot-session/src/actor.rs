//! Session actor: an isolated Tokio task that owns one running game.
//!
//! Each session runs in its own task, communicating with the directory
//! through an mpsc channel. No shared mutable state — inbound events,
//! timer firings, and info queries all serialize through the channel, so
//! game hooks execute one at a time with exclusive access to the session.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use gamebot_platform::{
    ChannelId, GuildId, MessageEvent, Messenger, ReactionEvent, UserId,
};
use tokio::sync::{mpsc, oneshot};

use crate::{
    Game, GameError, SessionCore, SessionError, SessionId, SessionState, TimerToken,
};

/// Command channel size for session actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Commands sent to a session actor through its channel.
pub(crate) enum SessionCommand {
    /// Begin the session: enter `Starting`, register the host, run the
    /// game's start hook. The reply is an ack, not a result — start-hook
    /// failures are internal faults, logged and dropped like any other.
    Start {
        channel: ChannelId,
        host: UserId,
        reply: oneshot::Sender<()>,
    },

    /// Deliver a guild message event.
    GuildMessage(MessageEvent),

    /// Deliver a direct message event.
    DirectMessage(MessageEvent),

    /// Deliver a reaction event.
    Reaction(ReactionEvent),

    /// A timer scheduled by the game has fired.
    Timer { token: TimerToken },

    /// Request a snapshot of the session's routing-relevant state.
    Info { reply: oneshot::Sender<SessionInfo> },

    /// Shut down the actor. Used by the directory's reaper.
    Shutdown,
}

/// A snapshot of the state the directory needs for routing decisions.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub session_id: SessionId,
    pub guild_id: GuildId,
    pub state: SessionState,
    pub players: HashSet<UserId>,
    /// When the session entered `Inactive`, if it has.
    pub ended_at: Option<Instant>,
}

/// Handle to a running session actor. Cheap to clone — it's just an
/// `mpsc::Sender` wrapper. The directory holds one per session.
#[derive(Clone)]
pub struct SessionHandle {
    session_id: SessionId,
    sender: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    fn unavailable(&self) -> SessionError {
        SessionError::Unavailable(self.session_id)
    }

    /// Starts the session and waits for the start hook to complete.
    pub async fn start(&self, channel: ChannelId, host: UserId) -> Result<(), SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::Start {
                channel,
                host,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Delivers a guild message event (fire-and-forget).
    pub async fn guild_message(&self, evt: MessageEvent) -> Result<(), SessionError> {
        self.sender
            .send(SessionCommand::GuildMessage(evt))
            .await
            .map_err(|_| self.unavailable())
    }

    /// Delivers a direct message event (fire-and-forget).
    pub async fn direct_message(&self, evt: MessageEvent) -> Result<(), SessionError> {
        self.sender
            .send(SessionCommand::DirectMessage(evt))
            .await
            .map_err(|_| self.unavailable())
    }

    /// Delivers a reaction event (fire-and-forget).
    pub async fn reaction(&self, evt: ReactionEvent) -> Result<(), SessionError> {
        self.sender
            .send(SessionCommand::Reaction(evt))
            .await
            .map_err(|_| self.unavailable())
    }

    /// Requests the current session info.
    pub async fn info(&self) -> Result<SessionInfo, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(SessionCommand::Info { reply: reply_tx })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Tells the session actor to shut down.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.sender
            .send(SessionCommand::Shutdown)
            .await
            .map_err(|_| self.unavailable())
    }
}

/// The internal session actor. Runs inside a Tokio task.
struct SessionActor<M: Messenger, G: Game<M>> {
    core: SessionCore<M>,
    game: G,
    receiver: mpsc::Receiver<SessionCommand>,
}

impl<M: Messenger, G: Game<M>> SessionActor<M, G> {
    async fn run(mut self) {
        let session_id = self.core.session_id();
        tracing::info!(%session_id, "session actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                SessionCommand::Start {
                    channel,
                    host,
                    reply,
                } => {
                    self.handle_start(channel, host).await;
                    let _ = reply.send(());
                }
                SessionCommand::GuildMessage(evt) => {
                    let result = self.game.on_guild_message(&mut self.core, evt).await;
                    self.check("on_guild_message", result);
                }
                SessionCommand::DirectMessage(evt) => {
                    let result = self.game.on_direct_message(&mut self.core, evt).await;
                    self.check("on_direct_message", result);
                }
                SessionCommand::Reaction(evt) => {
                    let result = self.game.on_reaction(&mut self.core, evt).await;
                    self.check("on_reaction", result);
                }
                SessionCommand::Timer { token } => {
                    let result = self.game.on_timer(&mut self.core, token).await;
                    self.check("on_timer", result);
                }
                SessionCommand::Info { reply } => {
                    let _ = reply.send(self.info());
                }
                SessionCommand::Shutdown => {
                    tracing::info!(%session_id, "session shutting down");
                    break;
                }
            }
        }

        tracing::info!(%session_id, "session actor stopped");
    }

    async fn handle_start(&mut self, channel: ChannelId, host: UserId) {
        self.core.begin_starting();
        // Cannot fail while Starting, but keep the contract path uniform.
        let registered = self.core.register_player(host).map_err(GameError::from);
        self.check("register_host", registered);
        let result = self.game.on_start(&mut self.core, channel, host).await;
        self.check("on_start", result);
    }

    /// Logs a failed hook and drops the event. Hook failures never
    /// propagate to the event pump or terminate the session.
    fn check(&self, hook: &'static str, result: Result<(), GameError>) {
        if let Err(error) = result {
            tracing::error!(
                session_id = %self.core.session_id(),
                hook,
                %error,
                "game hook failed, event dropped"
            );
        }
    }

    fn info(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.core.session_id(),
            guild_id: self.core.guild_id(),
            state: self.core.state(),
            players: self.core.players().clone(),
            ended_at: self.core.ended_at(),
        }
    }
}

/// Spawns a new session actor task and returns a handle to it.
///
/// The actor owns `game` and all session state for its lifetime; the
/// handle (and clones of it) is the only way to reach either.
pub fn spawn_session<M, G>(
    session_id: SessionId,
    guild_id: GuildId,
    messenger: Arc<M>,
    game: G,
) -> SessionHandle
where
    M: Messenger,
    G: Game<M>,
{
    let (tx, rx) = mpsc::channel(DEFAULT_CHANNEL_SIZE);
    let core = SessionCore::new(session_id, guild_id, messenger, tx.clone());
    let actor = SessionActor {
        core,
        game,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    SessionHandle {
        session_id,
        sender: tx,
    }
}
