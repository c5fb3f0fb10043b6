//! Application event hub.
//!
//! An explicitly owned publish/subscribe registry. The session facade owns
//! one and hands out references; it is disposed together with the session,
//! after which nothing is delivered and nobody can subscribe.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::auth::UserProfile;

/// Events broadcast across the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A user signed in (or an existing session was restored).
    SignedIn { user: UserProfile },
    /// The user signed out.
    SignedOut,
    /// The session died and could not be renewed.
    SessionExpired,
    /// A note was created on some page.
    NoteCreated { note_id: String },
}

/// Handle returned by [`EventHub::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Registry<E> {
    handlers: HashMap<SubscriptionId, Handler<E>>,
    disposed: bool,
}

/// Publish/subscribe registry for `E`.
pub struct EventHub<E> {
    registry: Mutex<Registry<E>>,
    next_id: AtomicU64,
}

impl<E> Default for EventHub<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventHub<E> {
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(Registry {
                handlers: HashMap::new(),
                disposed: false,
            }),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a handler. Returns `None` once the hub is disposed.
    pub fn subscribe<F>(&self, handler: F) -> Option<SubscriptionId>
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let mut registry = self.lock();
        if registry.disposed {
            return None;
        }
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        registry.handlers.insert(id, Arc::new(handler));
        Some(id)
    }

    /// Remove a handler. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.lock().handlers.remove(&id).is_some()
    }

    /// Deliver `event` to every handler and return how many received it.
    ///
    /// Handlers run outside the registry lock, so a handler may subscribe or
    /// unsubscribe without deadlocking.
    pub fn publish(&self, event: &E) -> usize {
        let handlers: Vec<Handler<E>> = {
            let registry = self.lock();
            if registry.disposed {
                return 0;
            }
            registry.handlers.values().cloned().collect()
        };
        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().handlers.len()
    }

    /// Drop every handler and refuse further use.
    pub fn dispose(&self) {
        let mut registry = self.lock();
        registry.disposed = true;
        registry.handlers.clear();
    }

    pub fn is_disposed(&self) -> bool {
        self.lock().disposed
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry<E>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<E> fmt::Debug for EventHub<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.lock();
        f.debug_struct("EventHub")
            .field("subscribers", &registry.handlers.len())
            .field("disposed", &registry.disposed)
            .finish()
    }
}
