//! Inbound platform events.
//!
//! These are the two event shapes the gateway delivers to the bot core.
//! The core routes them; it never produces them.

use serde::{Deserialize, Serialize};

use crate::{ChannelId, GuildId, MessageId, UserId};

/// A new message, either in a guild channel or a direct channel.
///
/// `author` is absent for platform-generated system messages, and `guild`
/// is absent for direct messages. Routing branches on both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    /// Who wrote the message. `None` for system messages.
    pub author: Option<UserId>,
    /// The guild the message was posted in. `None` for direct messages.
    pub guild: Option<GuildId>,
    /// The channel the message was posted in.
    pub channel: ChannelId,
    /// The message's own id, usable as a reply reference.
    pub message: MessageId,
    /// Plain-text content.
    pub content: String,
}

impl MessageEvent {
    /// Returns `true` if this message arrived over a direct channel.
    pub fn is_direct(&self) -> bool {
        self.guild.is_none()
    }
}

/// A reaction added to an existing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionEvent {
    /// Who reacted.
    pub user: UserId,
    /// The guild the reacted message lives in. `None` for direct channels.
    pub guild: Option<GuildId>,
    /// The channel containing the reacted message.
    pub channel: ChannelId,
    /// The message that was reacted to.
    pub message: MessageId,
    /// The reaction marker (a unicode emoji).
    pub emoji: String,
}

/// Strips a leading mention of `self_id` from `content`.
///
/// The platform renders mentions as `<@123>` or `<@!123>` (the latter for
/// nickname mentions). Returns the trimmed remainder when the message
/// starts with a mention of the bot, `None` otherwise. This is how guild
/// messages are recognized as answer submissions.
pub fn strip_self_mention(content: &str, self_id: UserId) -> Option<&str> {
    let plain = format!("<@{}>", self_id.0);
    let nick = format!("<@!{}>", self_id.0);
    content
        .strip_prefix(&plain)
        .or_else(|| content.strip_prefix(&nick))
        .map(str::trim)
}
