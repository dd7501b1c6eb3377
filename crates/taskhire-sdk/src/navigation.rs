//! Navigation state of the host UI
//!
//! The profile retry policy sends a persistently unauthorized user to the
//! login route. The SDK reaches the host's router through [`Navigator`].

use parking_lot::RwLock;
use taskhire_common::constants::LOGIN_ROUTE;

pub trait Navigator: Send + Sync {
    /// Path of the current location, without query string
    fn current_path(&self) -> String;

    /// Push a new history entry
    fn push_state(&self, path: &str);
}

/// Whether `path` is already a login route
pub fn is_login_route(path: &str) -> bool {
    path.starts_with(LOGIN_ROUTE)
}

/// Login route that returns to `next` afterwards
pub fn login_redirect(next: &str) -> String {
    format!("{LOGIN_ROUTE}?next={next}")
}

/// History kept in memory
#[derive(Debug)]
pub struct MemoryNavigator {
    history: RwLock<Vec<String>>,
}

impl MemoryNavigator {
    pub fn new(initial_path: impl Into<String>) -> Self {
        Self {
            history: RwLock::new(vec![initial_path.into()]),
        }
    }

    /// Full entry at the top of the history, query string included
    pub fn current_location(&self) -> String {
        self.history.read().last().cloned().unwrap_or_default()
    }

    pub fn history(&self) -> Vec<String> {
        self.history.read().clone()
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        let location = self.current_location();
        match location.split_once('?') {
            Some((path, _)) => path.to_string(),
            None => location,
        }
    }

    fn push_state(&self, path: &str) {
        self.history.write().push(path.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_route_detection() {
        assert!(is_login_route("/login"));
        assert!(is_login_route("/login/telegram"));
        assert!(!is_login_route("/tasks"));
        assert!(!is_login_route("/"));
    }

    #[test]
    fn test_memory_navigator_strips_query() {
        let navigator = MemoryNavigator::new("/projects/p1");
        assert_eq!(navigator.current_path(), "/projects/p1");

        navigator.push_state(&login_redirect("/projects/p1"));
        assert_eq!(navigator.current_location(), "/login?next=/projects/p1");
        assert_eq!(navigator.current_path(), "/login");
        assert_eq!(navigator.history().len(), 2);
    }
}
