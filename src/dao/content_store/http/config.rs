use std::time::Duration;

/// Runtime configuration describing where the content files are served.
#[derive(Debug, Clone)]
pub struct HttpContentConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl HttpContentConfig {
    /// Construct a configuration pointing at the given site root.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(5),
        }
    }
}
