//! The `Messenger` trait — the bot core's view of the messaging platform.
//!
//! GameBot doesn't implement the gateway itself; the transport is an
//! external collaborator. This trait is the complete capability set the
//! core consumes: outbound sends and edits, reaction management, permission
//! and directory queries, and connection-level actions. A production
//! gateway implements it against the real platform; tests implement it
//! in memory.
//!
//! Every outbound call is async — handlers compose these without blocking
//! the shared event pump, so a new inbound event may be handled before a
//! previous handler's outbound action has completed.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{ChannelId, GuildId, MessageId, PlatformError, UserId};

/// One titled field inside an [`Embed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
}

/// A structured message body.
///
/// The core only supplies the data; how the platform renders it is the
/// gateway's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<EmbedField>,
}

impl Embed {
    /// Creates an embed with a title and optional description, no fields.
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            title: title.into(),
            description,
            fields: Vec::new(),
        }
    }

    /// Appends a titled field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
        });
        self
    }
}

/// The outbound capability set the core needs from the platform.
///
/// Methods return `impl Future + Send` rather than using `async fn` so the
/// futures can cross task boundaries — session actors run inside
/// `tokio::spawn`, which requires `Send`.
pub trait Messenger: Send + Sync + 'static {
    /// The bot's own identity. Events authored by this id are ignored
    /// everywhere; it is never registered as a player.
    fn self_id(&self) -> UserId;

    /// Creates a plain-text message, optionally as a reply to `reply_to`.
    fn send_message(
        &self,
        channel: ChannelId,
        content: &str,
        reply_to: Option<MessageId>,
    ) -> impl Future<Output = Result<MessageId, PlatformError>> + Send;

    /// Creates a message carrying a structured embed body.
    fn send_embed(
        &self,
        channel: ChannelId,
        embed: &Embed,
    ) -> impl Future<Output = Result<MessageId, PlatformError>> + Send;

    /// Replaces a message's plain-text content.
    fn edit_message(
        &self,
        channel: ChannelId,
        message: MessageId,
        content: &str,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Replaces a message's embed body.
    fn edit_embed(
        &self,
        channel: ChannelId,
        message: MessageId,
        embed: &Embed,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Adds a reaction marker to a message.
    fn add_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Removes every reaction from a message.
    fn clear_reactions(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Returns `true` if the guild member holds session-management
    /// authority (the platform-level "manage" permission).
    fn member_can_manage(
        &self,
        guild: GuildId,
        user: UserId,
    ) -> impl Future<Output = Result<bool, PlatformError>> + Send;

    /// Returns the display mention for a guild member.
    fn mention(
        &self,
        guild: GuildId,
        user: UserId,
    ) -> impl Future<Output = Result<String, PlatformError>> + Send;

    /// Opens (or resolves) the private channel shared with a user.
    fn open_direct_channel(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<ChannelId, PlatformError>> + Send;

    /// Lists the text channels under the named category in a guild.
    fn channels_in_category(
        &self,
        guild: GuildId,
        category: &str,
    ) -> impl Future<Output = Result<Vec<ChannelId>, PlatformError>> + Send;

    /// Sets the bot's visible presence to online.
    fn set_online(&self) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Terminates the gateway connection cleanly.
    fn disconnect(&self) -> impl Future<Output = Result<(), PlatformError>> + Send;
}
