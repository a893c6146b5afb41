use edubrain_core::Navigator;
use parking_lot::RwLock;
use tracing::info;

/// Navigator that only tracks the current path.
#[derive(Debug)]
pub struct HeadlessNavigator {
    path: RwLock<String>,
    history: RwLock<Vec<String>>,
}

impl HeadlessNavigator {
    pub fn new(initial_path: impl Into<String>) -> Self {
        Self { path: RwLock::new(initial_path.into()), history: RwLock::new(Vec::new()) }
    }

    /// Every redirect target, oldest first.
    pub fn redirects(&self) -> Vec<String> {
        self.history.read().clone()
    }

    /// Record a navigation performed by the host itself.
    pub fn set_path(&self, path: impl Into<String>) {
        *self.path.write() = path.into();
    }
}

impl Default for HeadlessNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for HeadlessNavigator {
    fn current_path(&self) -> String {
        self.path.read().clone()
    }

    fn redirect(&self, path: &str) {
        info!(from = %self.path.read(), to = path, "redirecting");
        self.history.write().push(path.to_string());
        *self.path.write() = path.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_moves_current_path() {
        let navigator = HeadlessNavigator::new("/courses/7");
        navigator.redirect("/login");

        assert_eq!(navigator.current_path(), "/login");
        assert_eq!(navigator.redirects(), vec!["/login".to_string()]);
    }
}
