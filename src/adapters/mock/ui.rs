//! Recording navigator and notifier for testing.
//!
//! Both record every call so tests can assert that a redirect or a notice
//! happened exactly once (or never).

use std::sync::{Arc, Mutex};

use crate::traits::{Navigator, Notice, Notifier};

/// Navigator that records every navigation.
///
/// # Example
///
/// ```ignore
/// use notedeck::adapters::mock::RecordingNavigator;
/// use notedeck::traits::Navigator;
///
/// let nav = RecordingNavigator::at("/projects");
/// nav.navigate("/login");
/// assert_eq!(nav.history(), vec!["/login".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct RecordingNavigator {
    current: Arc<Mutex<String>>,
    history: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    /// Start on `route`.
    pub fn at(route: &str) -> Self {
        Self {
            current: Arc::new(Mutex::new(route.to_string())),
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every route navigated to, in order.
    pub fn history(&self) -> Vec<String> {
        self.history.lock().unwrap().clone()
    }

    /// How many times `route` was navigated to.
    pub fn navigations_to(&self, route: &str) -> usize {
        self.history
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.as_str() == route)
            .count()
    }

    /// Move without recording (the user clicked somewhere).
    pub fn set_route(&self, route: &str) {
        *self.current.lock().unwrap() = route.to_string();
    }
}

impl Default for RecordingNavigator {
    fn default() -> Self {
        Self::at("/")
    }
}

impl Navigator for RecordingNavigator {
    fn current_route(&self) -> String {
        self.current.lock().unwrap().clone()
    }

    fn navigate(&self, route: &str) {
        *self.current.lock().unwrap() = route.to_string();
        self.history.lock().unwrap().push(route.to_string());
    }
}

/// Notifier that records every notice.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    /// Number of session-expired notices shown.
    pub fn expired_count(&self) -> usize {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .filter(|n| matches!(n, Notice::SessionExpired { .. }))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.lock().unwrap().is_empty()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}
