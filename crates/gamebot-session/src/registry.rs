//! `GameRegistry`: the process-wide catalog of game types.
//!
//! Maps a game-type name to a spawn function producing a running session
//! actor. Lookup returns an explicit `Option` — callers branch on absence
//! rather than catching a fault downstream.

use std::collections::HashMap;
use std::sync::Arc;

use gamebot_platform::{GuildId, Messenger};

use crate::{SessionError, SessionHandle, SessionId, spawn_session};

/// The constructor a game type registers: given the session's identity
/// and the messaging collaborator, spawn the session actor.
pub type SpawnFn<M> =
    Arc<dyn Fn(SessionId, GuildId, Arc<M>) -> SessionHandle + Send + Sync>;

/// A single registered game type. Immutable once registered.
pub struct GameType<M> {
    name: String,
    spawn: SpawnFn<M>,
}

impl<M: Messenger> GameType<M> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Spawns a new session running this game type.
    pub fn spawn(
        &self,
        session_id: SessionId,
        guild_id: GuildId,
        messenger: Arc<M>,
    ) -> SessionHandle {
        (self.spawn)(session_id, guild_id, messenger)
    }
}

/// A catalog of game types, keyed by name. Names are unique; registering
/// a duplicate fails without mutating the registry.
pub struct GameRegistry<M> {
    types: HashMap<String, GameType<M>>,
}

impl<M: Messenger> GameRegistry<M> {
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Registers a game type under `name`.
    pub fn register(
        &mut self,
        name: &str,
        spawn: impl Fn(SessionId, GuildId, Arc<M>) -> SessionHandle + Send + Sync + 'static,
    ) -> Result<(), SessionError> {
        if self.types.contains_key(name) {
            return Err(SessionError::DuplicateType(name.to_string()));
        }
        tracing::info!(game_type = name, "game type registered");
        self.types.insert(
            name.to_string(),
            GameType {
                name: name.to_string(),
                spawn: Arc::new(spawn),
            },
        );
        Ok(())
    }

    /// Looks up a game type by name. `None` means "not registered" —
    /// never a fault.
    pub fn lookup(&self, name: &str) -> Option<&GameType<M>> {
        self.types.get(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl<M: Messenger> Default for GameRegistry<M> {
    fn default() -> Self {
        Self::new()
    }
}
