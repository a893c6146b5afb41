use edubrain_core::ClientEnvironment;

/// Fixed URL and agent string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticEnvironment {
    url: String,
    user_agent: String,
}

impl StaticEnvironment {
    pub fn new(url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self { url: url.into(), user_agent: user_agent.into() }
    }
}

impl Default for StaticEnvironment {
    fn default() -> Self {
        Self::new("app://edubrain/", concat!("edubrain-client/", env!("CARGO_PKG_VERSION")))
    }
}

impl ClientEnvironment for StaticEnvironment {
    fn current_url(&self) -> String {
        self.url.clone()
    }

    fn user_agent(&self) -> String {
        self.user_agent.clone()
    }
}
