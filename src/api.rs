//! Wire types and HTTP client for the Q&A backend.
//!
//! The backend exposes three endpoints: `/ask` (multipart form in, JSON
//! answer out) and two logging endpoints, `/save_answers` and
//! `/save_feedback`, which take JSON bodies and whose responses are only
//! ever logged.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Response shape of `POST /ask`.
#[derive(Debug, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

/// One entry appended to the backend's answers log (`POST /save_answers`).
///
/// `Human-Ans` is empty on the positive feedback path and carries the user's
/// free-text correction on the negative path.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerRecord {
    #[serde(rename = "Prompt")]
    pub prompt: String,
    #[serde(rename = "Chat-Ans")]
    pub chat_ans: String,
    #[serde(rename = "Human-Ans")]
    pub human_ans: String,
}

/// One entry appended to the backend's feedback log (`POST /save_feedback`).
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackRecord {
    pub question: String,
    pub answer: String,
    #[serde(rename = "isCorrect")]
    pub is_correct: bool,
    pub feedback: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from backend calls. Each variant carries the target URL so a
/// logged failure is diagnosable without inspecting the originating error.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend replied with a non-2xx HTTP status code.
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },
    /// The request never completed (connect failure, timeout, ...).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// Response body could not be parsed as the expected JSON structure.
    #[error("malformed response from {url}: {detail}")]
    Body { url: String, detail: String },
}

// ---------------------------------------------------------------------------
// Backend seam
// ---------------------------------------------------------------------------

/// The controller's view of the backend. Tests substitute a recording mock.
#[allow(async_fn_in_trait)]
pub trait Backend {
    /// `POST /ask` with the three form fields; returns the raw answer text.
    async fn ask(
        &self,
        query_text: &str,
        selected_file: &str,
        selected_language: &str,
    ) -> Result<String, ApiError>;

    /// `POST /save_answers` with an answers-log entry.
    async fn save_answers(&self, record: &AnswerRecord) -> Result<(), ApiError>;

    /// `POST /save_feedback` with a feedback-log entry.
    async fn save_feedback(&self, record: &FeedbackRecord) -> Result<(), ApiError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Backend over HTTP, rooted at a base URL such as `http://127.0.0.1:5000`.
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        HttpBackend {
            client: Client::new(),
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Transport {
                url: url.clone(),
                source: e,
            })?;

        if !response.status().is_success() {
            return Err(ApiError::Http {
                status: response.status().as_u16(),
                url,
            });
        }

        // The logging endpoints return an acknowledgement we only log.
        let ack: serde_json::Value = response.json().await.map_err(|e| ApiError::Body {
            url: url.clone(),
            detail: e.to_string(),
        })?;
        debug!(%url, %ack, "log endpoint acknowledged");
        Ok(())
    }
}

impl Backend for HttpBackend {
    async fn ask(
        &self,
        query_text: &str,
        selected_file: &str,
        selected_language: &str,
    ) -> Result<String, ApiError> {
        let url = self.endpoint("ask");
        let form = reqwest::multipart::Form::new()
            .text("query_text", query_text.to_string())
            .text("selected_file", selected_file.to_string())
            .text("selected_language", selected_language.to_string());

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::Transport {
                url: url.clone(),
                source: e,
            })?;

        if !response.status().is_success() {
            return Err(ApiError::Http {
                status: response.status().as_u16(),
                url,
            });
        }

        let body: AskResponse = response.json().await.map_err(|e| ApiError::Body {
            url: url.clone(),
            detail: e.to_string(),
        })?;
        Ok(body.answer)
    }

    async fn save_answers(&self, record: &AnswerRecord) -> Result<(), ApiError> {
        self.post_json("save_answers", record).await
    }

    async fn save_feedback(&self, record: &FeedbackRecord) -> Result<(), ApiError> {
        self.post_json("save_feedback", record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_join() {
        let b = HttpBackend::new("http://127.0.0.1:5000");
        assert_eq!(b.endpoint("ask"), "http://127.0.0.1:5000/ask");
    }

    #[test]
    fn test_trailing_slash_normalized() {
        let b = HttpBackend::new("http://127.0.0.1:5000/");
        assert_eq!(b.endpoint("save_feedback"), "http://127.0.0.1:5000/save_feedback");
    }

    #[test]
    fn test_api_error_display_has_url() {
        let e = ApiError::Http {
            status: 502,
            url: "http://test/ask".to_string(),
        };
        assert_eq!(e.to_string(), "HTTP 502 from http://test/ask");
    }
}
