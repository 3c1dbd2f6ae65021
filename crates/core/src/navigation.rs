//! Navigation seam between the data layer and whatever renders routes

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::debug;

/// Receives forced navigations (login redirects, post-login landing)
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    /// Move to `path`
    fn navigate(&self, path: &str);

    /// Path of the current location
    fn current(&self) -> String;
}

/// Well-known routes the session layer redirects to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTargets {
    /// Where anonymous users are sent
    pub login: String,
    /// Where authenticated users land
    pub landing: String,
}

impl Default for RouteTargets {
    fn default() -> Self {
        Self {
            login: "/login".to_string(),
            landing: "/dashboard".to_string(),
        }
    }
}

/// In-process navigation history
#[derive(Debug)]
pub struct History {
    entries: Mutex<Vec<String>>,
}

impl History {
    #[must_use]
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            entries: Mutex::new(vec![initial.into()]),
        }
    }

    /// All visited paths, oldest first
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for History {
    fn navigate(&self, path: &str) {
        debug!("Navigating to {path}");
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(path.to_string());
    }

    fn current(&self) -> String {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .last()
            .cloned()
            .unwrap_or_else(|| "/".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_records_navigation() {
        let history = History::default();
        assert_eq!(history.current(), "/");

        history.navigate("/projects");
        history.navigate("/login");

        assert_eq!(history.current(), "/login");
        assert_eq!(history.entries(), vec!["/", "/projects", "/login"]);
    }
}
