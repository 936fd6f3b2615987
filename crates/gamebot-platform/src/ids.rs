//! Identity newtypes for platform entities.
//!
//! Each wraps the platform's numeric snowflake in a named struct so a
//! `ChannelId` can never be passed where a `UserId` is expected. The
//! `#[serde(transparent)]` attribute keeps the wire representation a plain
//! number, which is what the gateway hands us.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique identifier for a user (player, host, or the bot itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

/// A unique identifier for a guild (one community on the platform).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuildId(pub u64);

impl fmt::Display for GuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G-{}", self.0)
    }
}

/// A unique identifier for a text channel (guild channel or direct channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

/// A unique identifier for a single message within a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_serializes_as_plain_number() {
        // `#[serde(transparent)]` means UserId(42) → `42`, not `{"0":42}`.
        let json = serde_json::to_string(&UserId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_user_id_deserializes_from_plain_number() {
        let id: UserId = serde_json::from_str("42").unwrap();
        assert_eq!(id, UserId(42));
    }

    #[test]
    fn test_display_prefixes() {
        assert_eq!(UserId(7).to_string(), "U-7");
        assert_eq!(GuildId(3).to_string(), "G-3");
        assert_eq!(ChannelId(9).to_string(), "C-9");
        assert_eq!(MessageId(11).to_string(), "M-11");
    }
}
