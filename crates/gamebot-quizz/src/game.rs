//! `QuizzGame`: lobby management, host semantics, and event routing.

use std::time::Duration;

use gamebot_platform::{
    ChannelId, MessageEvent, MessageId, Messenger, ReactionEvent, UserId,
    strip_self_mention,
};
use gamebot_session::{
    Game, GameError, GameRegistry, SessionCore, SessionError, SessionState,
    TimerToken, spawn_session,
};
use serde::{Deserialize, Serialize};

use crate::QuizzRound;

/// The registry name of this game type.
pub const GAME_TYPE: &str = "quizz";

const LOBBY_PROMPT: &str = "**Starting a quiz!**\n\
    React to this message to join.\n\n\
    When the host reacts, the game begins.";
const NOT_ENOUGH_PLAYERS: &str = "There are not enough players!";
const HOST_INSTRUCTIONS: &str = "Whenever you are ready, send the question.\n\
    Send `stop` to end the quiz.";
const ANSWER_CHANNEL_NOTICE: &str =
    "*The game just started, you will receive the questions here.*";
const GAME_OVER: &str = "**The quiz is over**";
const STOP_COMMAND: &str = "stop";

/// Tunables for the quiz game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizzConfig {
    /// Name of the channel category whose sub-channels (minus the lobby
    /// channel) receive question relays and collect answers.
    pub answer_category: String,

    /// How long a round stays open before it stops on its own.
    pub round_timeout: Duration,

    /// Reaction players use to join the lobby.
    pub join_emoji: String,

    /// Reaction acknowledging the host's question message.
    pub ack_emoji: String,

    /// Reaction attached to the tracked question message; the host reacts
    /// with it to stop that round early.
    pub record_emoji: String,
}

impl Default for QuizzConfig {
    fn default() -> Self {
        Self {
            answer_category: "questions".to_string(),
            round_timeout: Duration::from_secs(60),
            join_emoji: "\u{2705}".to_string(),   // ✅
            ack_emoji: "\u{2705}".to_string(),    // ✅
            record_emoji: "\u{1F4BE}".to_string(), // 💾
        }
    }
}

/// The quiz game. One instance per session, owned by the session actor.
pub struct QuizzGame {
    config: QuizzConfig,
    /// The player who created the session and authors questions.
    host: Option<UserId>,
    /// The join-prompt message posted at session start.
    lobby: Option<(ChannelId, MessageId)>,
    /// Append-only; the current round is always the last element, and
    /// stopped rounds remain as immutable history.
    rounds: Vec<QuizzRound>,
}

impl QuizzGame {
    pub fn new() -> Self {
        Self::with_config(QuizzConfig::default())
    }

    pub fn with_config(config: QuizzConfig) -> Self {
        Self {
            config,
            host: None,
            lobby: None,
            rounds: Vec::new(),
        }
    }

    /// Registers this game type in a registry under [`GAME_TYPE`].
    pub fn register<M: Messenger>(
        registry: &mut GameRegistry<M>,
        config: QuizzConfig,
    ) -> Result<(), SessionError> {
        registry.register(GAME_TYPE, move |id, guild, messenger| {
            spawn_session(id, guild, messenger, Self::with_config(config.clone()))
        })
    }

    /// Session players minus the host.
    fn actual_players<M: Messenger>(&self, core: &SessionCore<M>) -> Vec<UserId> {
        core.players()
            .iter()
            .copied()
            .filter(|id| Some(*id) != self.host)
            .collect()
    }

    /// All channels under the configured category, excluding the lobby
    /// channel. A collaborator query, not game state.
    async fn answer_channels<M: Messenger>(
        &self,
        core: &SessionCore<M>,
    ) -> Result<Vec<ChannelId>, GameError> {
        let Some((lobby_channel, _)) = self.lobby else {
            return Ok(Vec::new());
        };
        let channels = core
            .messenger()
            .channels_in_category(core.guild_id(), &self.config.answer_category)
            .await?;
        Ok(channels
            .into_iter()
            .filter(|c| *c != lobby_channel)
            .collect())
    }

    /// The host reacted on the lobby message with players present: the
    /// game begins.
    async fn launch<M: Messenger>(
        &mut self,
        core: &mut SessionCore<M>,
    ) -> Result<(), GameError> {
        let Some((lobby_channel, lobby_message)) = self.lobby else {
            return Err(GameError::contract("launch without a lobby message"));
        };
        let Some(host) = self.host else {
            return Err(GameError::contract("launch without a host"));
        };

        core.set_active();

        let mut mentions = Vec::new();
        for player in self.actual_players(core) {
            mentions.push(core.messenger().mention(core.guild_id(), player).await?);
        }
        let roster = mentions.join("\n \u{2022} ");
        let content = format!("**The quiz has started**\nPlayers:\n \u{2022} {roster}");
        core.messenger()
            .edit_message(lobby_channel, lobby_message, &content)
            .await?;
        core.messenger()
            .clear_reactions(lobby_channel, lobby_message)
            .await?;

        let dm = core.messenger().open_direct_channel(host).await?;
        core.messenger()
            .send_message(dm, HOST_INSTRUCTIONS, None)
            .await?;

        for chan in self.answer_channels(core).await? {
            core.messenger()
                .send_message(chan, ANSWER_CHANNEL_NOTICE, None)
                .await?;
        }
        Ok(())
    }

    /// The host sent a question: create the next round and start it.
    async fn start_round<M: Messenger>(
        &mut self,
        core: &mut SessionCore<M>,
        title: String,
        description: Option<String>,
        source: (ChannelId, MessageId),
    ) -> Result<(), GameError> {
        let Some((lobby_channel, _)) = self.lobby else {
            return Err(GameError::contract("round started without a lobby"));
        };

        // At most one round runs at a time: a new question closes out a
        // still-open round.
        if let Some(round) = self.rounds.last_mut() {
            round.stop(core).await?;
        }

        let token = TimerToken(self.rounds.len() as u64);
        let answer_channels = self.answer_channels(core).await?;
        self.rounds
            .push(QuizzRound::new(lobby_channel, title, description));
        if let Some(round) = self.rounds.last_mut() {
            round
                .start(core, &self.config, token, source, &answer_channels)
                .await?;
        }
        Ok(())
    }

    /// Routes a non-host message to the latest round as an answer
    /// submission; silently ignored when no round is running. A reply
    /// reporting the player's rank is sent back where the answer came
    /// from, unless the submission was a duplicate.
    async fn submit_answer<M: Messenger>(
        &mut self,
        core: &mut SessionCore<M>,
        player: UserId,
        text: String,
        reply_channel: ChannelId,
        reply_to: MessageId,
    ) -> Result<(), GameError> {
        let actual_players = self.actual_players(core).len();
        let Some(round) = self.rounds.last_mut() else {
            return Ok(());
        };
        if !round.is_running() {
            return Ok(());
        }
        let reply = round.on_answer(core, player, text, actual_players).await?;
        if let Some(reply) = reply {
            core.messenger()
                .send_message(reply_channel, &reply, Some(reply_to))
                .await?;
        }
        Ok(())
    }
}

impl Default for QuizzGame {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Messenger> Game<M> for QuizzGame {
    async fn on_start(
        &mut self,
        core: &mut SessionCore<M>,
        channel: ChannelId,
        host: UserId,
    ) -> Result<(), GameError> {
        self.host = Some(host);
        let message = core
            .messenger()
            .send_message(channel, LOBBY_PROMPT, None)
            .await?;
        core.messenger()
            .add_reaction(channel, message, &self.config.join_emoji)
            .await?;
        self.lobby = Some((channel, message));
        Ok(())
    }

    async fn on_reaction(
        &mut self,
        core: &mut SessionCore<M>,
        evt: ReactionEvent,
    ) -> Result<(), GameError> {
        let Some((lobby_channel, lobby_message)) = self.lobby else {
            return Ok(());
        };
        if evt.guild.is_none() || evt.channel != lobby_channel {
            return Ok(());
        }
        let is_host = self.host == Some(evt.user);

        if evt.message == lobby_message {
            if core.state() != SessionState::Starting {
                return Ok(());
            }
            core.register_player(evt.user)?;
            if !is_host {
                return Ok(());
            }
            // The host reacting is the go signal.
            if self.actual_players(core).is_empty() {
                core.set_inactive();
                core.messenger()
                    .edit_message(lobby_channel, lobby_message, NOT_ENOUGH_PLAYERS)
                    .await?;
                core.messenger()
                    .clear_reactions(lobby_channel, lobby_message)
                    .await?;
                return Ok(());
            }
            return self.launch(core).await;
        }

        if !is_host {
            return Ok(());
        }
        // Host reacted on a round's question message: stop that round.
        // Newest first; stop is idempotent on already-stopped rounds.
        if let Some(idx) = self
            .rounds
            .iter()
            .rposition(|r| r.message_id() == Some(evt.message))
        {
            self.rounds[idx].stop(core).await?;
        }
        Ok(())
    }

    async fn on_direct_message(
        &mut self,
        core: &mut SessionCore<M>,
        evt: MessageEvent,
    ) -> Result<(), GameError> {
        let Some(author) = evt.author else {
            return Err(GameError::contract("direct message without an author"));
        };

        if Some(author) == self.host {
            let (first, rest) = match evt.content.split_once('\n') {
                Some((first, rest)) => (first, Some(rest)),
                None => (evt.content.as_str(), None),
            };
            if first == STOP_COMMAND {
                core.set_inactive();
                let Some((lobby_channel, _)) = self.lobby else {
                    return Err(GameError::contract("stop without a lobby"));
                };
                core.messenger()
                    .send_message(lobby_channel, GAME_OVER, None)
                    .await?;
                return Ok(());
            }
            let title = first.to_string();
            let description = rest.filter(|r| !r.is_empty()).map(str::to_string);
            return self
                .start_round(core, title, description, (evt.channel, evt.message))
                .await;
        }

        let text = evt.content.clone();
        self.submit_answer(core, author, text, evt.channel, evt.message)
            .await
    }

    async fn on_guild_message(
        &mut self,
        core: &mut SessionCore<M>,
        evt: MessageEvent,
    ) -> Result<(), GameError> {
        let Some(author) = evt.author else {
            return Err(GameError::contract("guild message without an author"));
        };
        // The host never answers their own question.
        if Some(author) == self.host {
            return Ok(());
        }
        let Some(answer) = strip_self_mention(&evt.content, core.messenger().self_id())
        else {
            return Ok(());
        };
        let text = answer.to_string();
        self.submit_answer(core, author, text, evt.channel, evt.message)
            .await
    }

    async fn on_timer(
        &mut self,
        core: &mut SessionCore<M>,
        token: TimerToken,
    ) -> Result<(), GameError> {
        let idx = token.0 as usize;
        if let Some(round) = self.rounds.get_mut(idx) {
            tracing::debug!(round = idx, "round timeout fired");
            round.stop(core).await?;
        }
        Ok(())
    }
}
