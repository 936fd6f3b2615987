//! `SessionCore`: the state a running session owns.
//!
//! The core lives inside the session actor and is handed to game hooks as
//! `&mut SessionCore`. Only the actor task ever touches it, so every
//! mutation here is single-writer by construction rather than guarded by
//! locks.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use gamebot_platform::{GuildId, Messenger, UserId};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::actor::SessionCommand;
use crate::{SessionError, SessionState, TimerToken};

/// An opaque identifier for one session in the directory's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

/// The mutable heart of one session: roster, lifecycle state, and the
/// handles a game needs to act on the platform and on its own timers.
pub struct SessionCore<M> {
    session_id: SessionId,
    guild_id: GuildId,
    players: HashSet<UserId>,
    state: SessionState,
    /// Set on the transition to `Inactive`; feeds the directory's
    /// retention-based reaper.
    ended_at: Option<Instant>,
    messenger: Arc<M>,
    /// Sender into this session's own command channel, used to deliver
    /// timer firings back into the actor.
    commands: mpsc::Sender<SessionCommand>,
}

impl<M: Messenger> SessionCore<M> {
    pub(crate) fn new(
        session_id: SessionId,
        guild_id: GuildId,
        messenger: Arc<M>,
        commands: mpsc::Sender<SessionCommand>,
    ) -> Self {
        Self {
            session_id,
            guild_id,
            players: HashSet::new(),
            state: SessionState::Inactive,
            ended_at: None,
            messenger,
            commands,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn players(&self) -> &HashSet<UserId> {
        &self.players
    }

    pub(crate) fn ended_at(&self) -> Option<Instant> {
        self.ended_at
    }

    /// The messaging collaborator. All outbound actions go through this.
    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    /// Adds a player to the roster.
    ///
    /// The bot's own identity is silently skipped — a session never counts
    /// itself as a player. Fails once the session is `Active`: the roster
    /// is frozen when the game starts.
    pub fn register_player(&mut self, player: UserId) -> Result<(), SessionError> {
        if player == self.messenger.self_id() {
            return Ok(());
        }
        if !self.state.accepts_players() {
            return Err(SessionError::RegisterWhileActive(self.session_id));
        }
        tracing::info!(session_id = %self.session_id, %player, "player registered");
        self.players.insert(player);
        Ok(())
    }

    pub(crate) fn begin_starting(&mut self) {
        self.transition(SessionState::Starting);
    }

    /// Marks the game as running. Called by the concrete game when it
    /// decides the lobby is complete.
    pub fn set_active(&mut self) {
        self.transition(SessionState::Active);
    }

    /// Ends the session. Terminal re-entry into `Inactive` on the same
    /// session object; the directory reaps it after the retention period.
    pub fn set_inactive(&mut self) {
        if self.transition(SessionState::Inactive) {
            self.ended_at = Some(Instant::now());
        }
    }

    /// Applies a lifecycle transition. Invalid transitions are logged and
    /// ignored, leaving the state untouched.
    fn transition(&mut self, target: SessionState) -> bool {
        if !self.state.can_transition_to(target) {
            tracing::warn!(
                session_id = %self.session_id,
                from = %self.state,
                to = %target,
                "invalid state transition ignored"
            );
            return false;
        }
        tracing::info!(session_id = %self.session_id, state = %target, "session state changed");
        self.state = target;
        true
    }

    /// Schedules a one-shot timer that re-enters the actor as an
    /// [`on_timer`](crate::Game::on_timer) call after `delay`.
    ///
    /// Fire-and-forget: the timer is never cancelled. A firing that
    /// arrives after the interested party has moved on must land on an
    /// idempotent target.
    pub fn schedule_timer(&self, token: TimerToken, delay: Duration) {
        let commands = self.commands.clone();
        let session_id = self.session_id;
        tracing::debug!(%session_id, %token, ?delay, "timer scheduled");
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if commands
                .send(SessionCommand::Timer { token })
                .await
                .is_err()
            {
                tracing::trace!(%session_id, %token, "session gone before timer fired");
            }
        });
    }
}
