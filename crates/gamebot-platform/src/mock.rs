//! An in-memory [`Messenger`] that records every outbound action.
//!
//! Used by the test suites of every crate in the workspace. The mock vends
//! monotonically increasing message ids, resolves direct channels
//! deterministically, and lets tests pre-seed the permission and
//! category-directory queries.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::{
    ChannelId, Embed, GuildId, MessageId, Messenger, PlatformError, UserId,
};

/// Direct channels are resolved as `DIRECT_CHANNEL_BASE + user id`, so
/// tests can predict them without querying the mock.
pub const DIRECT_CHANNEL_BASE: u64 = 0x1000_0000;

/// One recorded outbound action, in invocation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    MessageSent {
        channel: ChannelId,
        message: MessageId,
        content: String,
        reply_to: Option<MessageId>,
    },
    EmbedSent {
        channel: ChannelId,
        message: MessageId,
        embed: Embed,
    },
    MessageEdited {
        channel: ChannelId,
        message: MessageId,
        content: String,
    },
    EmbedEdited {
        channel: ChannelId,
        message: MessageId,
        embed: Embed,
    },
    ReactionAdded {
        channel: ChannelId,
        message: MessageId,
        emoji: String,
    },
    ReactionsCleared {
        channel: ChannelId,
        message: MessageId,
    },
    WentOnline,
    Disconnected,
}

#[derive(Default)]
struct Inner {
    actions: Vec<Action>,
    next_message: u64,
    managers: HashSet<(GuildId, UserId)>,
    categories: HashMap<(GuildId, String), Vec<ChannelId>>,
}

/// A recording test double for the messaging platform.
pub struct MockMessenger {
    self_id: UserId,
    inner: Mutex<Inner>,
}

impl MockMessenger {
    pub fn new(self_id: UserId) -> Self {
        Self {
            self_id,
            inner: Mutex::new(Inner {
                next_message: 1000,
                ..Inner::default()
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Grants the "manage" permission to a guild member.
    pub fn grant_manage(&self, guild: GuildId, user: UserId) {
        self.lock().managers.insert((guild, user));
    }

    /// Seeds the channel list returned for a category-name lookup.
    pub fn set_category(&self, guild: GuildId, name: &str, channels: Vec<ChannelId>) {
        self.lock()
            .categories
            .insert((guild, name.to_string()), channels);
    }

    /// Returns a snapshot of every recorded action, in order.
    pub fn actions(&self) -> Vec<Action> {
        self.lock().actions.clone()
    }

    /// Returns the plain-text messages sent to a channel, in order.
    pub fn texts_sent_to(&self, channel: ChannelId) -> Vec<String> {
        self.lock()
            .actions
            .iter()
            .filter_map(|a| match a {
                Action::MessageSent {
                    channel: c,
                    content,
                    ..
                } if *c == channel => Some(content.clone()),
                _ => None,
            })
            .collect()
    }

    /// Returns every reply message (a send carrying a reply reference).
    pub fn replies(&self) -> Vec<(ChannelId, MessageId, String)> {
        self.lock()
            .actions
            .iter()
            .filter_map(|a| match a {
                Action::MessageSent {
                    channel,
                    reply_to: Some(r),
                    content,
                    ..
                } => Some((*channel, *r, content.clone())),
                _ => None,
            })
            .collect()
    }

    /// Returns the most recent embed body written to a message, whether by
    /// the original send or a later edit.
    pub fn last_embed(&self, message: MessageId) -> Option<Embed> {
        self.lock()
            .actions
            .iter()
            .rev()
            .find_map(|a| match a {
                Action::EmbedSent { message: m, embed, .. }
                | Action::EmbedEdited { message: m, embed, .. }
                    if *m == message =>
                {
                    Some(embed.clone())
                }
                _ => None,
            })
    }

    /// Returns how many times `message` had its embed body edited.
    pub fn embed_edit_count(&self, message: MessageId) -> usize {
        self.lock()
            .actions
            .iter()
            .filter(|a| matches!(a, Action::EmbedEdited { message: m, .. } if *m == message))
            .count()
    }

    /// Returns `true` if reactions were cleared from `message`.
    pub fn reactions_cleared(&self, message: MessageId) -> bool {
        self.lock()
            .actions
            .iter()
            .any(|a| matches!(a, Action::ReactionsCleared { message: m, .. } if *m == message))
    }

    fn record(&self, action: Action) {
        self.lock().actions.push(action);
    }

    fn next_message_id(&self) -> MessageId {
        let mut inner = self.lock();
        inner.next_message += 1;
        MessageId(inner.next_message)
    }
}

impl Messenger for MockMessenger {
    fn self_id(&self) -> UserId {
        self.self_id
    }

    async fn send_message(
        &self,
        channel: ChannelId,
        content: &str,
        reply_to: Option<MessageId>,
    ) -> Result<MessageId, PlatformError> {
        let message = self.next_message_id();
        self.record(Action::MessageSent {
            channel,
            message,
            content: content.to_string(),
            reply_to,
        });
        Ok(message)
    }

    async fn send_embed(
        &self,
        channel: ChannelId,
        embed: &Embed,
    ) -> Result<MessageId, PlatformError> {
        let message = self.next_message_id();
        self.record(Action::EmbedSent {
            channel,
            message,
            embed: embed.clone(),
        });
        Ok(message)
    }

    async fn edit_message(
        &self,
        channel: ChannelId,
        message: MessageId,
        content: &str,
    ) -> Result<(), PlatformError> {
        self.record(Action::MessageEdited {
            channel,
            message,
            content: content.to_string(),
        });
        Ok(())
    }

    async fn edit_embed(
        &self,
        channel: ChannelId,
        message: MessageId,
        embed: &Embed,
    ) -> Result<(), PlatformError> {
        self.record(Action::EmbedEdited {
            channel,
            message,
            embed: embed.clone(),
        });
        Ok(())
    }

    async fn add_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<(), PlatformError> {
        self.record(Action::ReactionAdded {
            channel,
            message,
            emoji: emoji.to_string(),
        });
        Ok(())
    }

    async fn clear_reactions(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<(), PlatformError> {
        self.record(Action::ReactionsCleared { channel, message });
        Ok(())
    }

    async fn member_can_manage(
        &self,
        guild: GuildId,
        user: UserId,
    ) -> Result<bool, PlatformError> {
        Ok(self.lock().managers.contains(&(guild, user)))
    }

    async fn mention(
        &self,
        _guild: GuildId,
        user: UserId,
    ) -> Result<String, PlatformError> {
        Ok(format!("<@{}>", user.0))
    }

    async fn open_direct_channel(
        &self,
        user: UserId,
    ) -> Result<ChannelId, PlatformError> {
        Ok(ChannelId(DIRECT_CHANNEL_BASE + user.0))
    }

    async fn channels_in_category(
        &self,
        guild: GuildId,
        category: &str,
    ) -> Result<Vec<ChannelId>, PlatformError> {
        self.lock()
            .categories
            .get(&(guild, category.to_string()))
            .cloned()
            .ok_or_else(|| PlatformError::CategoryNotFound(category.to_string(), guild))
    }

    async fn set_online(&self) -> Result<(), PlatformError> {
        self.record(Action::WentOnline);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), PlatformError> {
        self.record(Action::Disconnected);
        Ok(())
    }
}
