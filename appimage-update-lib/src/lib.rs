pub mod appimage;
pub mod config;
pub mod content_fetcher;
pub mod error;
pub mod logging;
mod metadata;
pub mod update_info;
pub mod updaters;

#[cfg(test)]
pub mod test_helpers;
