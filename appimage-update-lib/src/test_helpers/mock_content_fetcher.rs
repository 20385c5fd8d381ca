use crate::content_fetcher::ContentFetcher;
use crate::error::FetchError;
use reqwest::StatusCode;
use std::sync::Mutex;

/// Serves a canned body for every URL and records what was requested.
pub struct MockContentFetcher {
    body: Option<Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl MockContentFetcher {
    pub fn new(body: &str) -> Self {
        Self {
            body: Some(body.as_bytes().to_vec()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answers every request with a 404.
    pub fn failing() -> Self {
        Self {
            body: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl ContentFetcher for MockContentFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.body.clone().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: StatusCode::NOT_FOUND,
        })
    }
}
