//! `QuizzRound`: one timed question/answer cycle.
//!
//! The round owns the answer list and the tracked question message. All
//! calls arrive through the session actor, so answer registration and
//! rank assignment are serialized — two players answering "at the same
//! time" are handled one after the other, and ties are structurally
//! impossible.

use std::time::{Duration, Instant};

use gamebot_platform::{
    ChannelId, Embed, MessageId, Messenger, PlatformError, UserId,
};
use gamebot_session::{GameError, SessionCore, TimerToken};

use crate::game::QuizzConfig;

/// Embed field title holding the answer list.
const ANSWERS_FIELD: &str = "Answers";
/// Body shown while the round runs and nobody has answered yet.
const WAITING_PLACEHOLDER: &str = "*Waiting for answers...*";
/// Body shown when the round ended with no answers at all.
const NO_ANSWERS_PLACEHOLDER: &str = "*No answers.*";

/// Errors from the round state machine.
///
/// `AlreadyRunning` and `NotRunning` are programming-contract violations:
/// with correct routing they never occur, and when they do the session
/// actor logs them and drops the event.
#[derive(Debug, thiserror::Error)]
pub enum RoundError {
    #[error("round already running")]
    AlreadyRunning,

    #[error("round not running")]
    NotRunning,

    /// An outbound platform call failed.
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl From<RoundError> for GameError {
    fn from(err: RoundError) -> Self {
        match err {
            RoundError::Platform(e) => GameError::Platform(e),
            other => GameError::Contract(other.to_string()),
        }
    }
}

/// One recorded answer. Immutable once created; at most one per player
/// per round.
#[derive(Debug, Clone)]
pub struct Answer {
    pub user: UserId,
    pub at: Instant,
    pub text: String,
}

/// A single round: question, answer set, timeout, ranked reveal.
///
/// Lifecycle is `created → running → stopped`, with the `running` flag
/// transitioning true→false exactly once. A stopped round stays in the
/// game's round list as an immutable historical record.
pub struct QuizzRound {
    channel: ChannelId,
    title: String,
    description: Option<String>,
    started_at: Option<Instant>,
    /// The tracked question message, set once `start` posts it.
    message: Option<MessageId>,
    /// Answers in arrival order; the index is the rank.
    answers: Vec<Answer>,
    running: bool,
}

impl QuizzRound {
    pub fn new(channel: ChannelId, title: String, description: Option<String>) -> Self {
        Self {
            channel,
            title,
            description,
            started_at: None,
            message: None,
            answers: Vec::new(),
            running: false,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The tracked question message, if the round has been started.
    pub fn message_id(&self) -> Option<MessageId> {
        self.message
    }

    /// Recorded answers in arrival order.
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn answer_of(&self, player: UserId) -> Option<&Answer> {
        self.answers.iter().find(|a| a.user == player)
    }

    /// Starts the round: acknowledges the host's question message, posts
    /// the tracked question embed with its record reaction, relays the
    /// question to every answer channel, and arms the timeout.
    ///
    /// The timer is fire-and-forget — it is not cancelled on early stop
    /// and lands on the idempotent [`stop`](Self::stop) when it fires.
    pub async fn start<M: Messenger>(
        &mut self,
        core: &SessionCore<M>,
        config: &QuizzConfig,
        token: TimerToken,
        source: (ChannelId, MessageId),
        answer_channels: &[ChannelId],
    ) -> Result<(), RoundError> {
        if self.running {
            return Err(RoundError::AlreadyRunning);
        }
        self.running = true;
        self.started_at = Some(Instant::now());
        tracing::info!(title = %self.title, "round started");

        let messenger = core.messenger();
        messenger
            .add_reaction(source.0, source.1, &config.ack_emoji)
            .await?;

        let message = messenger
            .send_embed(self.channel, &self.embed_with(&[]))
            .await?;
        self.message = Some(message);
        messenger
            .add_reaction(self.channel, message, &config.record_emoji)
            .await?;

        let relay = match &self.description {
            Some(desc) => format!("> **{}**\n{}", self.title, desc),
            None => format!("> **{}**", self.title),
        };
        for chan in answer_channels {
            messenger.send_message(*chan, &relay, None).await?;
        }

        core.schedule_timer(token, config.round_timeout);
        Ok(())
    }

    /// Registers an answer and returns the reply to send the player, or
    /// `None` for a duplicate submission (intentional idempotence — the
    /// player gets no reply, not an error).
    ///
    /// The rank is the arrival index; when it reaches `actual_players`
    /// the round stops itself. The reply is produced either way.
    pub async fn on_answer<M: Messenger>(
        &mut self,
        core: &SessionCore<M>,
        player: UserId,
        text: String,
        actual_players: usize,
    ) -> Result<Option<String>, RoundError> {
        if !self.running {
            return Err(RoundError::NotRunning);
        }
        let started = self.started_at.ok_or(RoundError::NotRunning)?;
        if self.answers.iter().any(|a| a.user == player) {
            tracing::debug!(%player, "duplicate answer ignored");
            return Ok(None);
        }

        let answer = Answer {
            user: player,
            at: Instant::now(),
            text,
        };
        let elapsed = answer.at.duration_since(started);
        self.answers.push(answer);
        let rank = self.answers.len();
        tracing::info!(%player, rank, "answer registered");

        if rank == actual_players {
            // Everyone has answered; the stop rewrites the message.
            self.stop(core).await?;
        } else {
            self.refresh_message(core).await?;
        }

        Ok(Some(format!(
            "You are {} ({}s)",
            ordinal(rank),
            format_seconds(elapsed)
        )))
    }

    /// Ends the round. No-op when not running; on the running→stopped
    /// transition, rewrites the tracked message to reveal every answer in
    /// arrival order and clears its reactions.
    pub async fn stop<M: Messenger>(
        &mut self,
        core: &SessionCore<M>,
    ) -> Result<(), RoundError> {
        if !self.running {
            return Ok(());
        }
        self.running = false;
        tracing::info!(title = %self.title, answers = self.answers.len(), "round ended");

        let Some(message) = self.message else {
            return Ok(());
        };
        let lines = self.describe_answers(core, true).await?;
        core.messenger()
            .edit_embed(self.channel, message, &self.embed_with(&lines))
            .await?;
        core.messenger()
            .clear_reactions(self.channel, message)
            .await?;
        Ok(())
    }

    /// Rewrites the tracked message with the current unrevealed ranking.
    async fn refresh_message<M: Messenger>(
        &self,
        core: &SessionCore<M>,
    ) -> Result<(), RoundError> {
        let Some(message) = self.message else {
            return Ok(());
        };
        let lines = self.describe_answers(core, false).await?;
        core.messenger()
            .edit_embed(self.channel, message, &self.embed_with(&lines))
            .await?;
        Ok(())
    }

    /// Renders one line per answer in arrival order: mention and response
    /// time, plus the answer text once `revealed`.
    async fn describe_answers<M: Messenger>(
        &self,
        core: &SessionCore<M>,
        revealed: bool,
    ) -> Result<Vec<String>, RoundError> {
        let started = self.started_at.ok_or(RoundError::NotRunning)?;
        let mut lines = Vec::with_capacity(self.answers.len());
        for answer in &self.answers {
            let mention = core
                .messenger()
                .mention(core.guild_id(), answer.user)
                .await?;
            let seconds = format_seconds(answer.at.duration_since(started));
            if revealed {
                lines.push(format!("{mention} ({seconds}s): {}", answer.text));
            } else {
                lines.push(format!("{mention} ({seconds}s)"));
            }
        }
        Ok(lines)
    }

    fn embed_with(&self, lines: &[String]) -> Embed {
        Embed::new(self.title.clone(), self.description.clone())
            .field(ANSWERS_FIELD, answers_body(lines, self.running))
    }
}

/// Builds the body of the answers field: numbered lines in arrival order,
/// a continuation marker while running, or the appropriate placeholder.
fn answers_body(lines: &[String], running: bool) -> String {
    if lines.is_empty() {
        return if running {
            WAITING_PLACEHOLDER
        } else {
            NO_ANSWERS_PLACEHOLDER
        }
        .to_string();
    }
    let mut body = String::new();
    for (i, line) in lines.iter().enumerate() {
        body.push_str(&format!("{}) {line}\n", i + 1));
    }
    if running {
        body.push_str("...");
    }
    body
}

/// English ordinal for a 1-based rank: 1st, 2nd, 3rd, 4th, 11th, 22nd...
fn ordinal(rank: usize) -> String {
    let suffix = match (rank % 10, rank % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{rank}{suffix}")
}

/// Elapsed response time in seconds, two-decimal precision.
fn format_seconds(elapsed: Duration) -> String {
    format!("{:.2}", elapsed.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal_basic() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(10), "10th");
    }

    #[test]
    fn test_ordinal_teens_take_th() {
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(13), "13th");
        assert_eq!(ordinal(111), "111th");
    }

    #[test]
    fn test_ordinal_past_teens() {
        assert_eq!(ordinal(21), "21st");
        assert_eq!(ordinal(22), "22nd");
        assert_eq!(ordinal(23), "23rd");
    }

    #[test]
    fn test_format_seconds_two_decimals() {
        assert_eq!(format_seconds(Duration::from_millis(1234)), "1.23");
        assert_eq!(format_seconds(Duration::from_secs(2)), "2.00");
        assert_eq!(format_seconds(Duration::ZERO), "0.00");
    }

    #[test]
    fn test_answers_body_running_empty_shows_waiting() {
        assert_eq!(answers_body(&[], true), WAITING_PLACEHOLDER);
    }

    #[test]
    fn test_answers_body_stopped_empty_shows_no_answers() {
        assert_eq!(answers_body(&[], false), NO_ANSWERS_PLACEHOLDER);
    }

    #[test]
    fn test_answers_body_numbers_lines_in_order() {
        let lines = vec!["<@1> (0.50s)".to_string(), "<@2> (1.20s)".to_string()];
        let body = answers_body(&lines, false);
        assert_eq!(body, "1) <@1> (0.50s)\n2) <@2> (1.20s)\n");
    }

    #[test]
    fn test_answers_body_running_appends_continuation() {
        let lines = vec!["<@1> (0.50s)".to_string()];
        let body = answers_body(&lines, true);
        assert!(body.ends_with("..."));
    }
}
