//! Updates published on an OCS (Open Collaboration Services) store such as AppImageHub.
//!
//! The store's content data lists every file of a product as numbered
//! `downloadname<N>`/`downloadlink<N>` pairs without a count, so candidates are
//! probed from 1 upwards until the first missing name.

use crate::appimage::AppImage;
use crate::config::Config;
use crate::content_fetcher::{ContentFetcher, HttpContentFetcher};
use crate::error::{MetadataError, UpdateError};
use crate::metadata::MetadataDocument;
use crate::update_info::split_fields;
use crate::updaters::direct::Direct;
use crate::updaters::{ResolvedDownload, UpdateMethod};
use colored::Colorize;
use glob::{MatchOptions, Pattern};
use std::path::PathBuf;

pub const METHOD: &str = "ocs-v1-appimagehub-direct";

const EXPECTED_FORMAT: &str = "ocs-v1-appimagehub-direct|<api url>|<product id>|<file name>";

const FILE_NAME_MATCH: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

pub struct OcsAppImageHub<F = HttpContentFetcher, D = Direct> {
    direct: D,
    fetcher: F,

    api_v1_url: String,
    product_id: String,
    file_name: String,
}

impl OcsAppImageHub {
    pub fn new(update_info: &str, target: AppImage, config: &Config) -> Result<Self, UpdateError> {
        let fields = parse_update_info(update_info)?;
        let client = config
            .http_client()
            .map_err(crate::error::FetchError::from)?;
        let fetcher = HttpContentFetcher::with_client(client.clone());
        let direct = Direct::new(target, client, config.download_dir.clone());

        Ok(Self::from_fields(fields, fetcher, direct))
    }
}

impl<F, D> OcsAppImageHub<F, D>
where
    F: ContentFetcher,
    D: ResolvedDownload,
{
    /// Builds the updater around an existing fetcher and download strategy.
    pub fn with_collaborators(update_info: &str, fetcher: F, direct: D) -> Result<Self, UpdateError> {
        let fields = parse_update_info(update_info)?;
        Ok(Self::from_fields(fields, fetcher, direct))
    }

    fn from_fields([api_v1_url, product_id, file_name]: [&str; 3], fetcher: F, direct: D) -> Self {
        Self {
            direct,
            fetcher,
            api_v1_url: api_v1_url.to_string(),
            product_id: product_id.to_string(),
            file_name: file_name.to_string(),
        }
    }

    /// The strategy that performs the actual transfer.
    pub fn direct(&self) -> &D {
        &self.direct
    }

    /// Content data endpoint for the product. Fields are used verbatim.
    pub fn content_data_url(&self) -> String {
        format!(
            "https://{}/content/data/{}",
            self.api_v1_url, self.product_id
        )
    }

    /// Link of the first download whose name matches the file name pattern,
    /// or an empty string when none does.
    fn resolve_download_url(&self, document: &MetadataDocument) -> Result<String, UpdateError> {
        let pattern = Pattern::new(&file_name_glob(&self.file_name)).map_err(|source| UpdateError::InvalidPattern {
            pattern: self.file_name.clone(),
            source,
        })?;

        for index in 1.. {
            let Some(name) = document.find_text(&format!("downloadname{index}")) else {
                break;
            };
            tracing::debug!("Candidate {index}: {name}");

            if pattern.matches_with(name, FILE_NAME_MATCH) {
                return document
                    .find_text(&format!("downloadlink{index}"))
                    .map(str::to_string)
                    .ok_or_else(|| MetadataError::MissingDownloadLink(index).into());
            }
        }

        Ok(String::new())
    }
}

impl<F, D> UpdateMethod for OcsAppImageHub<F, D>
where
    F: ContentFetcher + Send + Sync,
    D: ResolvedDownload + Send,
{
    fn identifier(&self) -> &'static str {
        METHOD
    }

    async fn lookup(&mut self) -> Result<bool, UpdateError> {
        let url = self.content_data_url();
        tracing::debug!("Fetching content data from {url}");
        let data = self.fetcher.fetch(&url).await?;

        let document = MetadataDocument::parse(&data)?;
        let download_url = self.resolve_download_url(&document)?;
        if download_url.is_empty() {
            tracing::info!(
                "{}",
                format!("No download of product {} matches '{}'", self.product_id, self.file_name)
                    .yellow()
            );
        } else {
            tracing::debug!("Resolved download URL {download_url}");
        }

        self.direct.set_url(download_url);
        self.direct.lookup().await
    }

    async fn download(&mut self) -> Result<PathBuf, UpdateError> {
        self.direct.download().await
    }
}

/// Rewrites an fnmatch-style file name pattern into `glob` syntax:
/// runs of `*` collapse to one, `[^...]` negates like `[!...]`, `\x` matches `x`
/// literally and an unterminated `[` is an ordinary character.
fn file_name_glob(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut glob = String::with_capacity(pattern.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => {
                glob.push('*');
                while chars.get(i + 1) == Some(&'*') {
                    i += 1;
                }
            }
            '\\' => match chars.get(i + 1) {
                Some(&escaped) => {
                    push_literal(&mut glob, escaped);
                    i += 1;
                }
                None => glob.push('\\'),
            },
            '[' => match bracket_end(&chars, i) {
                Some(end) => {
                    let mut member = i + 1;
                    glob.push('[');
                    if chars[member] == '^' {
                        glob.push('!');
                        member += 1;
                    }
                    glob.extend(&chars[member..=end]);
                    i = end;
                }
                None => push_literal(&mut glob, '['),
            },
            other => glob.push(other),
        }
        i += 1;
    }

    glob
}

fn push_literal(glob: &mut String, c: char) {
    match c {
        '*' | '?' | '[' | ']' => {
            glob.push('[');
            glob.push(c);
            glob.push(']');
        }
        _ => glob.push(c),
    }
}

/// Index of the `]` closing the bracket expression opened at `start`.
/// A `]` right after the opening (or after its negation) is a set member.
fn bracket_end(chars: &[char], start: usize) -> Option<usize> {
    let mut first = start + 1;
    if matches!(chars.get(first), Some('!' | '^')) {
        first += 1;
    }
    if chars.get(first) == Some(&']') {
        first += 1;
    }
    chars
        .get(first..)?
        .iter()
        .position(|&c| c == ']')
        .map(|offset| first + offset)
}

fn parse_update_info(update_info: &str) -> Result<[&str; 3], UpdateError> {
    match split_fields::<4>(update_info) {
        Some([_method, api_v1_url, product_id, file_name]) => Ok([api_v1_url, product_id, file_name]),
        None => Err(UpdateError::InvalidUpdateInfo {
            method: "OCSAppImageHub",
            expected: EXPECTED_FORMAT,
        }),
    }
}
