//! `SessionDirectory`: the top-level router between gateway events and
//! running session actors.
//!
//! The directory owns the session table. It creates sessions from the
//! start command, fans inbound events out to the sessions that are
//! interested in them, and reaps sessions that have been inactive longer
//! than the retention period. It runs on the gateway's event pump, so a
//! single `&mut self` caller drives it; the sessions themselves are
//! isolated actors and never block the pump for long.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use gamebot_platform::{
    GuildId, MessageEvent, Messenger, ReactionEvent, UserId,
};
use gamebot_session::{
    GameRegistry, SessionHandle, SessionId, SessionInfo, SessionState,
};

use crate::GameBotError;

/// The admin's direct-message command that shuts the bot down.
const QUIT_COMMAND: &str = "quit";

/// Directory tunables.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// The operator. Only this user's direct `quit` disconnects the bot.
    pub admin: UserId,

    /// Guild-message prefix that creates a session, followed by the game
    /// type name.
    pub command_prefix: String,

    /// How long an ended session stays queryable before it is reaped.
    pub retention: Duration,

    /// Reaction posted on a start command naming an unregistered type.
    pub unknown_type_emoji: String,

    /// Reply sent to a start command from a user without the manage
    /// permission.
    pub refusal_text: String,
}

impl DirectoryConfig {
    pub fn new(admin: UserId) -> Self {
        Self {
            admin,
            command_prefix: "%start".to_string(),
            retention: Duration::from_secs(300),
            unknown_type_emoji: "\u{2753}".to_string(), // ❓
            refusal_text: "Nope!".to_string(),
        }
    }
}

/// What happened to a start command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    /// A session was spawned and started.
    Created(SessionId),
    /// The requester lacks the manage permission; they got the refusal
    /// reply.
    Unauthorized,
    /// No such game type is registered; the command got the marker
    /// reaction.
    UnknownType,
}

/// The session table and the event-routing rules over it.
pub struct SessionDirectory<M> {
    messenger: Arc<M>,
    registry: GameRegistry<M>,
    config: DirectoryConfig,
    sessions: HashMap<SessionId, SessionHandle>,
    next_id: u64,
}

impl<M: Messenger> SessionDirectory<M> {
    pub fn new(
        messenger: Arc<M>,
        registry: GameRegistry<M>,
        config: DirectoryConfig,
    ) -> Self {
        Self {
            messenger,
            registry,
            config,
            sessions: HashMap::new(),
            next_id: 0,
        }
    }

    /// Announces the bot's presence on the platform. Call once, before
    /// pumping events.
    pub async fn start(&self) -> Result<(), GameBotError> {
        self.messenger.set_online().await?;
        tracing::info!(game_types = self.registry.len(), "directory online");
        Ok(())
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Routes one inbound message event.
    ///
    /// Authorless (system) messages and the bot's own messages are
    /// dropped. Direct messages go to every `Active` session regardless of
    /// guild; guild messages either create a session (start command) or go
    /// to the `Active` sessions of that guild.
    pub async fn handle_message(
        &mut self,
        evt: MessageEvent,
    ) -> Result<(), GameBotError> {
        let Some(author) = evt.author else {
            return Ok(());
        };
        if author == self.messenger.self_id() {
            return Ok(());
        }

        if evt.is_direct() {
            if author == self.config.admin && evt.content.trim() == QUIT_COMMAND {
                tracing::info!(%author, "quit command received, disconnecting");
                self.messenger.disconnect().await?;
                return Ok(());
            }
            for (id, handle, info) in self.live_sessions().await {
                if info.state.is_active() {
                    self.deliver(id, handle.direct_message(evt.clone()).await);
                }
            }
            return Ok(());
        }

        if let Some(type_name) = self.parse_start_command(&evt.content) {
            let type_name = type_name.to_string();
            let Some(guild) = evt.guild else {
                return Ok(());
            };
            self.create_session(&evt, author, guild, &type_name).await?;
            return Ok(());
        }

        for (id, handle, info) in self.live_sessions().await {
            if info.state.is_active() && Some(info.guild_id) == evt.guild {
                self.deliver(id, handle.guild_message(evt.clone()).await);
            }
        }
        Ok(())
    }

    /// Routes one inbound reaction event.
    ///
    /// A session hears a reaction while it is `Starting` (anyone may be
    /// joining), or while `Active` from its own players. Ended sessions
    /// hear nothing. Sessions scope themselves to their own channels, so
    /// there is no guild filter here.
    pub async fn handle_reaction(
        &mut self,
        evt: ReactionEvent,
    ) -> Result<(), GameBotError> {
        if evt.user == self.messenger.self_id() {
            return Ok(());
        }
        for (id, handle, info) in self.live_sessions().await {
            let interested = match info.state {
                SessionState::Starting => true,
                SessionState::Active => info.players.contains(&evt.user),
                SessionState::Inactive => false,
            };
            if interested {
                self.deliver(id, handle.reaction(evt.clone()).await);
            }
        }
        Ok(())
    }

    /// Handles a start command: spawns a session of the named type, or
    /// explains on the originating message why it can't.
    pub async fn create_session(
        &mut self,
        evt: &MessageEvent,
        author: UserId,
        guild: GuildId,
        type_name: &str,
    ) -> Result<CreateOutcome, GameBotError> {
        if !self.messenger.member_can_manage(guild, author).await? {
            tracing::warn!(%author, %guild, "start command refused");
            self.messenger
                .send_message(evt.channel, &self.config.refusal_text, Some(evt.message))
                .await?;
            return Ok(CreateOutcome::Unauthorized);
        }

        let Some(game_type) = self.registry.lookup(type_name) else {
            tracing::debug!(game_type = type_name, "unknown game type requested");
            self.messenger
                .add_reaction(evt.channel, evt.message, &self.config.unknown_type_emoji)
                .await?;
            return Ok(CreateOutcome::UnknownType);
        };

        let session_id = SessionId(self.next_id + 1);
        let handle = game_type.spawn(session_id, guild, Arc::clone(&self.messenger));
        self.next_id += 1;
        handle.start(evt.channel, author).await?;
        self.sessions.insert(session_id, handle);
        tracing::info!(%session_id, game_type = type_name, %guild, "session created");
        Ok(CreateOutcome::Created(session_id))
    }

    /// Removes sessions that ended longer than the retention period ago.
    /// Also runs opportunistically on every routed event. Returns how many
    /// sessions were removed.
    pub async fn reap(&mut self) -> usize {
        let before = self.sessions.len();
        let _ = self.live_sessions().await;
        before - self.sessions.len()
    }

    /// The type name of a start command, or `None` if the message is not
    /// one. Only `"%start <type>"` counts: a bare prefix, or a prefix with
    /// nothing after it, is ordinary chat and falls through to fan-out.
    fn parse_start_command<'a>(&self, content: &'a str) -> Option<&'a str> {
        let rest = content.strip_prefix(&self.config.command_prefix)?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let name = rest.trim();
        if name.is_empty() {
            return None;
        }
        Some(name)
    }

    /// Snapshots every live session's routing info. Sessions whose actor
    /// is gone are pruned, and ended sessions past retention are reaped,
    /// as a side effect.
    async fn live_sessions(&mut self) -> Vec<(SessionId, SessionHandle, SessionInfo)> {
        let handles: Vec<(SessionId, SessionHandle)> = self
            .sessions
            .iter()
            .map(|(id, handle)| (*id, handle.clone()))
            .collect();

        let mut live = Vec::with_capacity(handles.len());
        for (id, handle) in handles {
            match handle.info().await {
                Ok(info) => {
                    let expired = info.state == SessionState::Inactive
                        && info
                            .ended_at
                            .is_some_and(|t| t.elapsed() >= self.config.retention);
                    if expired {
                        tracing::info!(session_id = %id, "reaping ended session");
                        let _ = handle.shutdown().await;
                        self.sessions.remove(&id);
                    } else {
                        live.push((id, handle, info));
                    }
                }
                Err(_) => {
                    tracing::warn!(session_id = %id, "session actor gone, pruning");
                    self.sessions.remove(&id);
                }
            }
        }
        live
    }

    /// Drops a session whose actor refused delivery.
    fn deliver(&mut self, id: SessionId, result: Result<(), gamebot_session::SessionError>) {
        if let Err(error) = result {
            tracing::warn!(session_id = %id, %error, "delivery failed, pruning session");
            self.sessions.remove(&id);
        }
    }
}
