//! Terminal navigator and notifier used by the CLI.
//!
//! There are no pages in a terminal, so the "route" is just a remembered
//! string and notices go to stderr.

use std::sync::{Arc, Mutex, PoisonError};

use crate::traits::{Navigator, Notice, Notifier};

#[derive(Debug, Clone)]
pub struct TerminalUi {
    route: Arc<Mutex<String>>,
}

impl TerminalUi {
    pub fn new(initial_route: &str) -> Self {
        Self {
            route: Arc::new(Mutex::new(initial_route.to_string())),
        }
    }
}

impl Navigator for TerminalUi {
    fn current_route(&self) -> String {
        self.route
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn navigate(&self, route: &str) {
        tracing::info!("Navigating to {}", route);
        *self.route.lock().unwrap_or_else(PoisonError::into_inner) = route.to_string();
    }
}

impl Notifier for TerminalUi {
    fn notify(&self, notice: Notice) {
        eprintln!("! {}", notice);
    }
}
