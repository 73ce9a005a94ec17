use thiserror::Error;

/// Substituted when a rejection body carries no usable message.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// The two failure kinds of the feed: the list fetch and the post
/// submission. Neither is retried; both are reported once and dropped.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The list endpoint answered with a non-success status.
    #[error("fetching posts failed with HTTP status {status}")]
    FetchStatus { status: u16 },

    /// The list request never completed, or its body was not a post list.
    #[error("fetching posts failed: {0}")]
    FetchTransport(#[source] reqwest::Error),

    /// The backend rejected the new post, with whatever message it supplied.
    #[error("publishing failed with HTTP status {status}: {message}")]
    SubmitRejected { status: u16, message: String },

    /// The create request never completed, or its body was unreadable.
    #[error("publishing failed: {0}")]
    SubmitTransport(#[source] reqwest::Error),
}

impl FeedError {
    /// Text shown in the page banner when a submission fails. The backend
    /// message when there is one, a generic phrase otherwise.
    pub fn user_message(&self) -> String {
        match self {
            FeedError::SubmitRejected { message, .. } => message.clone(),
            _ => "Please try again.".to_string(),
        }
    }
}
