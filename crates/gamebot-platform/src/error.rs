//! Error types for the platform layer.

use crate::{ChannelId, GuildId, MessageId, UserId};

/// Errors surfaced by a [`Messenger`](crate::Messenger) implementation.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The channel does not exist or is not visible to the bot.
    #[error("channel {0} not found")]
    ChannelNotFound(ChannelId),

    /// The message does not exist (deleted, or wrong channel).
    #[error("message {0} not found in channel {1}")]
    MessageNotFound(MessageId, ChannelId),

    /// No channel category with the given name exists in the guild.
    #[error("category {0:?} not found in guild {1}")]
    CategoryNotFound(String, GuildId),

    /// The user does not exist or is not a member of the guild.
    #[error("user {0} not found")]
    UserNotFound(UserId),

    /// The underlying gateway connection failed.
    #[error("gateway error: {0}")]
    Gateway(String),
}
