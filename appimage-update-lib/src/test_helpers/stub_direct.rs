use crate::error::{DirectError, UpdateError};
use crate::updaters::{ResolvedDownload, UpdateMethod};
use std::path::PathBuf;

/// Stand-in for the direct download strategy that counts calls instead of touching the network.
#[derive(Debug, Default)]
pub struct StubDirect {
    pub url: String,
    pub lookups: usize,
    pub downloads: usize,
    pub network_calls: usize,
}

impl UpdateMethod for StubDirect {
    fn identifier(&self) -> &'static str {
        "stub"
    }

    async fn lookup(&mut self) -> Result<bool, UpdateError> {
        self.lookups += 1;
        if self.url.is_empty() {
            return Ok(false);
        }
        self.network_calls += 1;
        Ok(true)
    }

    async fn download(&mut self) -> Result<PathBuf, UpdateError> {
        if self.url.is_empty() {
            return Err(DirectError::MissingUrl.into());
        }
        self.downloads += 1;
        self.network_calls += 1;
        Ok(PathBuf::from(self.url.rsplit('/').next().unwrap_or_default()))
    }
}

impl ResolvedDownload for StubDirect {
    fn set_url(&mut self, url: String) {
        self.url = url;
    }

    fn url(&self) -> &str {
        &self.url
    }
}
