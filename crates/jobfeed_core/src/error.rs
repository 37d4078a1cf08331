use thiserror::Error;

const NETWORK_KEYWORDS: [&str; 3] = ["network", "internet", "connection"];

/// Failure of a full feed load, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error("No internet connection. Please check your network settings and try again.")]
    NetworkUnavailable,
    #[error("{0}")]
    FetchFailed(String),
}

impl FeedError {
    /// Classifies a raw failure message.
    ///
    /// Transport errors do not carry a reliable kind once they reach the UI,
    /// so the message text decides.
    pub fn classify(message: &str) -> Self {
        let lowered = message.to_lowercase();
        if NETWORK_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
            FeedError::NetworkUnavailable
        } else {
            FeedError::FetchFailed(message.to_string())
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, FeedError::NetworkUnavailable)
    }
}
