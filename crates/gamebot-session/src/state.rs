//! Session lifecycle state machine.

use serde::{Deserialize, Serialize};

/// The lifecycle state of a session.
///
/// ```text
/// Inactive → Starting → Active → Inactive
///               └────────────────────┘
/// ```
///
/// - **Inactive**: not running. Entered once more when the session ends —
///   a terminal re-entry on the same session, never a new one.
/// - **Starting**: the lobby phase. Entered at session creation; players
///   can still join.
/// - **Active**: the game is running. The roster is frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Inactive,
    Starting,
    Active,
}

impl SessionState {
    /// Returns `true` if the session is running its game.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns `true` if players may still be registered.
    pub fn accepts_players(&self) -> bool {
        matches!(self, Self::Inactive | Self::Starting)
    }

    /// Returns `true` if transitioning to `target` is valid.
    ///
    /// `Starting` may fall back to `Inactive` directly (for example, a
    /// lobby closed with too few players).
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Inactive, Self::Starting)
                | (Self::Starting, Self::Active)
                | (Self::Starting, Self::Inactive)
                | (Self::Active, Self::Inactive)
        )
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inactive => write!(f, "Inactive"),
            Self::Starting => write!(f, "Starting"),
            Self::Active => write!(f, "Active"),
        }
    }
}
