//! Messaging-platform contract for GameBot.
//!
//! The bot core never talks to the real-time messaging platform directly.
//! Everything it needs from the outside world — inbound events, outbound
//! sends and edits, directory lookups, permission checks — goes through
//! the [`Messenger`] trait defined here. The real gateway implements it;
//! tests use the recording [`mock::MockMessenger`].
//!
//! # Key types
//!
//! - [`UserId`], [`GuildId`], [`ChannelId`], [`MessageId`] — identity newtypes
//! - [`MessageEvent`], [`ReactionEvent`] — inbound platform events
//! - [`Messenger`] — the outbound capability set
//! - [`Embed`] — the structured message body the core supplies

mod error;
mod event;
mod ids;
mod messenger;
pub mod mock;

pub use error::PlatformError;
pub use event::{MessageEvent, ReactionEvent, strip_self_mention};
pub use ids::{ChannelId, GuildId, MessageId, UserId};
pub use messenger::{Embed, EmbedField, Messenger};
