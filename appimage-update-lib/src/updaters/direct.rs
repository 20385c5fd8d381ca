use crate::appimage::AppImage;
use crate::error::{DirectError, UpdateError};
use crate::logging::{byte_counter_style, progress_bar_style};
use crate::updaters::{ResolvedDownload, UpdateMethod};
use colored::Colorize;
use futures_util::StreamExt;
use reqwest::{Client, Response, Url};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::instrument;
use tracing_indicatif::span_ext::IndicatifSpanExt;

pub const METHOD: &str = "direct";

/// Downloads an AppImage straight from a known URL.
pub struct Direct {
    url: String,
    seed: AppImage,
    client: Client,
    download_dir: Option<PathBuf>,
    remote_file_name: Option<String>,
}

impl Direct {
    pub fn new(seed: AppImage, client: Client, download_dir: Option<PathBuf>) -> Self {
        Self {
            url: String::new(),
            seed,
            client,
            download_dir,
            remote_file_name: None,
        }
    }

    fn output_dir(&self) -> &Path {
        self.download_dir
            .as_deref()
            .unwrap_or_else(|| self.seed.directory())
    }

    fn file_name_for(&self, response_url: &Url) -> String {
        self.remote_file_name
            .clone()
            .or_else(|| remote_file_name(response_url))
            .or_else(|| self.seed.file_name().map(str::to_string))
            .unwrap_or_else(|| "update.AppImage".to_string())
    }

    async fn check_remote(&mut self) -> Result<bool, DirectError> {
        if self.url.is_empty() {
            tracing::debug!("No download URL resolved for {:?}", self.seed.path);
            return Ok(false);
        }

        let response = self.client.head(&self.url).send().await?;
        let response = ensure_success(&self.url, response)?;

        let remote_name = remote_file_name(response.url())
            .or_else(|| self.seed.file_name().map(str::to_string))
            .unwrap_or_default();
        let available = self.seed.file_name() != Some(remote_name.as_str());
        tracing::debug!(
            "Remote file '{}' {} the current AppImage",
            remote_name,
            if available { "differs from" } else { "matches" }
        );
        self.remote_file_name = Some(remote_name);

        Ok(available)
    }

    #[instrument(skip_all)]
    async fn download_to_disk(&self) -> Result<PathBuf, DirectError> {
        if self.url.is_empty() {
            return Err(DirectError::MissingUrl);
        }

        let response = self.client.get(&self.url).send().await?;
        let response = ensure_success(&self.url, response)?;

        let file_name = self.file_name_for(response.url());
        let output_dir = self.output_dir();
        tokio::fs::create_dir_all(output_dir).await?;
        let output_path = output_dir.join(&file_name);
        let partial_path = output_dir.join(format!("{file_name}.part"));

        let current_span = tracing::Span::current();
        let style = match response.content_length() {
            Some(length) => {
                current_span.pb_set_length(length);
                progress_bar_style()
            }
            None => byte_counter_style(),
        };
        if let Ok(style) = style {
            current_span.pb_set_style(&style);
        }
        current_span.pb_set_message(&format!("Downloading {file_name}..."));
        current_span.pb_set_finish_message(&format!("Downloading {file_name}... Complete!"));

        if let Err(e) = write_body(response, &partial_path, &current_span).await {
            let _ = tokio::fs::remove_file(&partial_path).await;
            return Err(e);
        }

        tokio::fs::rename(&partial_path, &output_path).await?;
        make_executable(&output_path)?;

        tracing::info!(
            "{} {}",
            "✓".green(),
            format!("Downloaded {}", output_path.display()).green()
        );
        Ok(output_path)
    }
}

impl UpdateMethod for Direct {
    fn identifier(&self) -> &'static str {
        METHOD
    }

    async fn lookup(&mut self) -> Result<bool, UpdateError> {
        Ok(self.check_remote().await?)
    }

    async fn download(&mut self) -> Result<PathBuf, UpdateError> {
        Ok(self.download_to_disk().await?)
    }
}

impl ResolvedDownload for Direct {
    fn set_url(&mut self, url: String) {
        self.url = url;
        self.remote_file_name = None;
    }

    fn url(&self) -> &str {
        &self.url
    }
}

fn ensure_success(url: &str, response: Response) -> Result<Response, DirectError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(DirectError::Status {
            url: url.to_string(),
            status: response.status(),
        })
    }
}

/// Last non-empty path segment of `url`.
fn remote_file_name(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .next_back()
        .map(str::to_string)
}

async fn write_body(
    response: Response,
    path: &Path,
    span: &tracing::Span,
) -> Result<(), DirectError> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut downloaded = 0u64;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
        span.pb_set_position(downloaded);
    }

    file.flush().await?;
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(perms.mode() | 0o755);
    std::fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
