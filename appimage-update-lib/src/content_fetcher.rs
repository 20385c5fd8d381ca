use crate::config::Config;
use crate::error::FetchError;
use crate::logging::{byte_counter_style, progress_bar_style};
use futures_util::StreamExt;
use reqwest::Client;
use tracing::instrument;
use tracing_indicatif::span_ext::IndicatifSpanExt;

pub trait ContentFetcher {
    /// Downloads `url` fully into memory.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

pub struct HttpContentFetcher {
    client: Client,
}

impl HttpContentFetcher {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        Ok(Self::with_client(config.http_client()?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl ContentFetcher for HttpContentFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status(),
            });
        }

        let current_span = tracing::Span::current();
        let declared_length = response.content_length();
        let style = match declared_length {
            Some(_) => progress_bar_style(),
            None => byte_counter_style(),
        };
        if let Ok(style) = style {
            current_span.pb_set_style(&style);
        }
        if let Some(length) = declared_length {
            current_span.pb_set_length(length);
        }
        current_span.pb_set_message(&format!("Downloading content data: {url}"));

        let mut buffer = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            buffer.extend_from_slice(&chunk);
            current_span.pb_set_position(buffer.len() as u64);
        }

        tracing::debug!("Fetched {} bytes of content data", buffer.len());
        Ok(buffer)
    }
}
