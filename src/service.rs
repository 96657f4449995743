use tracing::{Instrument, Span, info, info_span, warn};

use crate::config::Config;
use crate::core::Track;
use crate::error::{Result, SongFinderError};
use crate::registry::Registry;

/// Entry point for finding and downloading songs
#[derive(Clone)]
pub struct SongFinder {
    registry: Registry,
    span: Span,
}

impl SongFinder {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            span: info_span!("songfinder"),
        }
    }

    /// Validate `config` and register every built-in platform
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(Registry::from_config(config)?))
    }

    /// Log under `span` instead of the default one
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Search `platform` for `query`. No match is an empty list, not an error.
    pub async fn find(&self, query: &str, platform: &str) -> Result<Vec<Track>> {
        async {
            let tracks = self
                .registry
                .find_songs(query, platform)
                .await
                .map_err(|e| self.fail("find", query, platform, e))?;
            info!(query, platform, results = tracks.len(), "find completed");
            Ok::<_, SongFinderError>(tracks)
        }
        .instrument(self.span.clone())
        .await
    }

    /// Save the item behind `locator` on `platform` and return its metadata
    pub async fn download(&self, locator: &str, platform: &str) -> Result<Track> {
        async {
            let track = self
                .registry
                .extract_and_save(locator, platform)
                .await
                .map_err(|e| self.fail("download", locator, platform, e))?;

            if !track.is_saved() {
                let err = SongFinderError::AcquisitionFailed(format!(
                    "no audio saved for `{}`",
                    track.title()
                ));
                return Err(self.fail("download", locator, platform, err));
            }

            info!(
                locator,
                platform,
                title = track.title(),
                path = track.local_path(),
                "download completed"
            );
            Ok::<_, SongFinderError>(track)
        }
        .instrument(self.span.clone())
        .await
    }

    fn fail(
        &self,
        operation: &'static str,
        query: &str,
        platform: &str,
        err: SongFinderError,
    ) -> SongFinderError {
        warn!(operation, query, platform, kind = %err.kind(), error = %err, "request failed");
        err.with_request(operation, query, platform)
    }
}
