//! Host lifecycle handling.
//!
//! When the host loads a save, every script instance that issued a request
//! may be gone. The listener cancels and forgets all outstanding requests
//! so nothing is delivered into the reloaded world.

use crate::registry::HandleRegistry;
use std::sync::Arc;

/// Messages broadcast by the host to its plugins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostMessage {
    /// All game data finished loading.
    DataLoaded,
    /// A new game was started.
    NewGame,
    /// A save is about to be loaded.
    PreLoadGame,
    /// A save finished loading; the world has been replaced.
    PostLoadGame,
    /// The game was saved.
    SaveGame,
}

impl HostMessage {
    /// Returns true for the message that invalidates outstanding requests.
    #[must_use]
    pub fn is_world_reload(self) -> bool {
        matches!(self, Self::PostLoadGame)
    }
}

/// Invalidates all requests on world reload.
#[derive(Debug, Clone)]
pub struct LifecycleListener {
    registry: Arc<HandleRegistry>,
}

impl LifecycleListener {
    /// Creates a listener over `registry`.
    #[must_use]
    pub fn new(registry: Arc<HandleRegistry>) -> Self {
        Self { registry }
    }

    /// Handles one host message. Returns how many requests were invalidated.
    pub fn on_message(&self, message: HostMessage) -> usize {
        if !message.is_world_reload() {
            tracing::trace!(?message, "ignoring host message");
            return 0;
        }

        let invalidated = self.registry.invalidate_all();
        tracing::info!(invalidated, "world reloaded; outstanding requests invalidated");
        invalidated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ObjectHandle;

    fn registry_with(count: usize) -> Arc<HandleRegistry> {
        let registry = Arc::new(HandleRegistry::new());
        for _ in 0..count {
            registry.allocate("S".into(), ObjectHandle::from_raw(1)).unwrap();
        }
        registry
    }

    #[test]
    fn post_load_clears_registry() {
        let registry = registry_with(3);
        let listener = LifecycleListener::new(Arc::clone(&registry));

        assert_eq!(listener.on_message(HostMessage::PostLoadGame), 3);
        assert!(registry.is_empty());
    }

    #[test]
    fn other_messages_are_ignored() {
        let registry = registry_with(2);
        let listener = LifecycleListener::new(Arc::clone(&registry));

        for message in [
            HostMessage::DataLoaded,
            HostMessage::NewGame,
            HostMessage::PreLoadGame,
            HostMessage::SaveGame,
        ] {
            assert_eq!(listener.on_message(message), 0);
        }
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn only_post_load_is_a_reload() {
        assert!(HostMessage::PostLoadGame.is_world_reload());
        assert!(!HostMessage::PreLoadGame.is_world_reload());
    }
}
