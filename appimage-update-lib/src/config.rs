use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// User agent sent with every request
    pub user_agent: String,

    /// Directory that receives downloaded AppImages.
    /// When unset, downloads land next to the AppImage being updated.
    pub download_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: format!("appimage-update/{}", env!("CARGO_PKG_VERSION")),
            download_dir: None,
        }
    }
}

impl Config {
    pub fn with_download_dir(self, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: Some(download_dir.into()),
            ..self
        }
    }

    /// Builds the HTTP client shared by the metadata fetch and the download itself.
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(self.user_agent.as_str())
            .build()
    }
}
