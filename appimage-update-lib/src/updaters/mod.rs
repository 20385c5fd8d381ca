pub mod direct;
pub mod ocs_appimagehub;

use crate::appimage::AppImage;
use crate::config::Config;
use crate::error::UpdateError;
use crate::update_info::method_of;
use ocs_appimagehub::OcsAppImageHub;
use std::path::PathBuf;

/// The contract every update source implements.
pub trait UpdateMethod {
    /// Name of the update method, as written in the first field of the update information.
    fn identifier(&self) -> &'static str;

    /// Checks whether an update is available.
    fn lookup(&mut self) -> impl Future<Output = Result<bool, UpdateError>> + Send;

    /// Downloads the update found by [`UpdateMethod::lookup`] and returns where it was written.
    fn download(&mut self) -> impl Future<Output = Result<PathBuf, UpdateError>> + Send;
}

/// An update method that transfers whatever URL it has been pointed at.
/// Resolving strategies own one and hand it the URL they found.
pub trait ResolvedDownload: UpdateMethod {
    fn set_url(&mut self, url: String);

    fn url(&self) -> &str;
}

/// Registry of the update methods understood by this crate.
pub enum Updater {
    OcsAppImageHub(OcsAppImageHub),
}

impl Updater {
    pub fn from_update_info(
        update_info: &str,
        target: AppImage,
        config: &Config,
    ) -> Result<Self, UpdateError> {
        match method_of(update_info) {
            ocs_appimagehub::METHOD => Ok(Self::OcsAppImageHub(OcsAppImageHub::new(
                update_info,
                target,
                config,
            )?)),
            other => Err(UpdateError::UnsupportedMethod(other.to_string())),
        }
    }
}

impl UpdateMethod for Updater {
    fn identifier(&self) -> &'static str {
        match self {
            Self::OcsAppImageHub(updater) => updater.identifier(),
        }
    }

    async fn lookup(&mut self) -> Result<bool, UpdateError> {
        match self {
            Self::OcsAppImageHub(updater) => updater.lookup().await,
        }
    }

    async fn download(&mut self) -> Result<PathBuf, UpdateError> {
        match self {
            Self::OcsAppImageHub(updater) => updater.download().await,
        }
    }
}

impl From<OcsAppImageHub> for Updater {
    fn from(updater: OcsAppImageHub) -> Self {
        Self::OcsAppImageHub(updater)
    }
}
