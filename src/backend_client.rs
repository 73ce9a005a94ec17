use reqwest::Client;
use serde::Deserialize;
use spdlog::debug;

use crate::error::{FeedError, UNKNOWN_ERROR};
use crate::post::{NewPost, Post};

/// HTTP client for the two endpoints of the blog backend. The base URL is
/// injected at construction; nothing here is hard-coded.
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `GET {base}/posts` - the full collection, unsorted as the backend
    /// sends it. Non-success statuses become [FeedError::FetchStatus].
    pub async fn list_posts(&self) -> Result<Vec<Post>, FeedError> {
        let url = format!("{}/posts", self.base_url);
        debug!("Fetching post list from {}", url);

        let response = self.client
            .get(&url)
            .send()
            .await
            .map_err(FeedError::FetchTransport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::FetchStatus { status: status.as_u16() });
        }

        response.json::<Vec<Post>>()
            .await
            .map_err(FeedError::FetchTransport)
    }

    /// `POST {base}/posts` with a JSON body. A rejection carries the
    /// backend's `error` or `message` field when the body parses, the
    /// generic fallback otherwise.
    pub async fn create_post(&self, new_post: &NewPost) -> Result<Post, FeedError> {
        let url = format!("{}/posts", self.base_url);
        debug!("Publishing post \"{}\" to {}", new_post.title, url);

        let response = self.client
            .post(&url)
            .json(new_post)
            .send()
            .await
            .map_err(FeedError::SubmitTransport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::SubmitRejected {
                status: status.as_u16(),
                message: rejection_message(&body),
            });
        }

        response.json::<Post>()
            .await
            .map_err(FeedError::SubmitTransport)
    }
}

/// Pulls the human-readable message out of a rejection body. `error` wins
/// over `message`; anything unparsable collapses to [UNKNOWN_ERROR].
fn rejection_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct RejectionBody {
        error: Option<String>,
        message: Option<String>,
    }

    match serde_json::from_str::<RejectionBody>(body) {
        Ok(parsed) => parsed.error
            .or(parsed.message)
            .unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
        Err(_) => UNKNOWN_ERROR.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_message_error_field() {
        let msg = rejection_message(r#"{"error": "Title required"}"#);
        assert_eq!(msg, "Title required");
    }

    #[test]
    fn test_rejection_message_message_field() {
        let msg = rejection_message(r#"{"message": "All fields are required"}"#);
        assert_eq!(msg, "All fields are required");
    }

    #[test]
    fn test_rejection_message_error_wins_over_message() {
        let msg = rejection_message(r#"{"error": "bad title", "message": "ignored"}"#);
        assert_eq!(msg, "bad title");
    }

    #[test]
    fn test_rejection_message_unparsable_body() {
        assert_eq!(rejection_message("<html>502 Bad Gateway</html>"), UNKNOWN_ERROR);
        assert_eq!(rejection_message(""), UNKNOWN_ERROR);
        assert_eq!(rejection_message(r#"{"status": 500}"#), UNKNOWN_ERROR);
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = BackendClient::new("http://localhost:5000/");
        assert_eq!(client.base_url, "http://localhost:5000");
    }
}
