use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("Invalid {method} update information. Expected: {expected}")]
    InvalidUpdateInfo {
        method: &'static str,
        expected: &'static str,
    },

    #[error("Unsupported update method '{0}'")]
    UnsupportedMethod(String),

    #[error("Invalid file name pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Direct(#[from] DirectError),
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {url} failed: {status}")]
    Status { url: String, status: StatusCode },
}

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Malformed content data: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Content data is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Content data contains an unknown entity '&{0};'")]
    UnknownEntity(String),

    #[error("Content data has no root element")]
    NoRootElement,

    #[error("Content data ends before <{0}> is closed")]
    UnclosedElement(String),

    #[error("Content data lists downloadname{0} without a matching downloadlink{0}")]
    MissingDownloadLink(usize),
}

#[derive(Error, Debug)]
pub enum DirectError {
    #[error("No download URL has been resolved")]
    MissingUrl,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {url} failed: {status}")]
    Status { url: String, status: StatusCode },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
