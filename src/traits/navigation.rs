//! Navigation and user-notification seams.
//!
//! The session core never renders anything itself. When a renewal fails in a
//! way the user must see, it asks a [`Notifier`] to show the notice and a
//! [`Navigator`] to move to the unauthenticated entry route.

use std::fmt;

/// A user-visible notice raised by the session core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The session ended and could not be renewed.
    SessionExpired { message: String },
    /// The sign-in handshake or exchange failed.
    SignInFailed { message: String },
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::SessionExpired { message } | Notice::SignInFailed { message } => message,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Route control for the host application.
pub trait Navigator: Send + Sync {
    /// The route currently displayed.
    fn current_route(&self) -> String;

    /// Move to another route.
    fn navigate(&self, route: &str);

    /// Whether the current route is `route`.
    fn is_on(&self, route: &str) -> bool {
        self.current_route() == route
    }
}

/// Surface for user-visible notices (toast, banner, stderr).
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FixedRoute(Mutex<String>);

    impl Navigator for FixedRoute {
        fn current_route(&self) -> String {
            self.0.lock().unwrap().clone()
        }

        fn navigate(&self, route: &str) {
            *self.0.lock().unwrap() = route.to_string();
        }
    }

    #[test]
    fn test_is_on_uses_current_route() {
        let nav = FixedRoute(Mutex::new("/projects".to_string()));
        assert!(nav.is_on("/projects"));
        assert!(!nav.is_on("/login"));

        nav.navigate("/login");
        assert!(nav.is_on("/login"));
    }

    #[test]
    fn test_notice_message() {
        let notice = Notice::SessionExpired {
            message: "expired".to_string(),
        };
        assert_eq!(notice.message(), "expired");
        assert_eq!(notice.to_string(), "expired");
    }
}
