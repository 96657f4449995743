use std::path::PathBuf;

use async_trait::async_trait;
use futures_util::future::try_join_all;
use tracing::{Instrument, Span, debug, info, info_span};

use crate::config::Config;
use crate::core::{Extractor, Track, artifact_name};
use crate::error::{Result, SongFinderError};

pub mod core;
pub mod types;
pub mod utils;

#[cfg(test)]
pub(crate) mod stub;

pub use self::core::{YoutubeApi, YoutubeClient};
pub use types::{StreamInfo, VideoDetails};
pub use utils::{build_watch_url, parse_id, select_audio_stream};

/// Upper bound on hits requested from the search API
pub const MAX_SEARCH_RESULTS: usize = 10;

/// YouTube extractor implementing the Extractor trait
pub struct YoutubeExtractor<A = YoutubeClient> {
    api: A,
    output_dir: PathBuf,
    span: Span,
}

impl YoutubeExtractor<YoutubeClient> {
    pub fn from_config(config: &Config) -> Result<Self> {
        let api = YoutubeClient::new(
            config.youtube.clone(),
            config.request_timeout,
            config.stream_timeout,
        )?;
        Ok(Self::new(api, config.output_dir.clone()))
    }
}

impl<A: YoutubeApi> YoutubeExtractor<A> {
    pub fn new(api: A, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            api,
            output_dir: output_dir.into(),
            span: info_span!("youtube"),
        }
    }

    /// Log under `span` instead of the default one
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    async fn save(&self, file_name: &str, data: &[u8]) -> Result<()> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.output_dir.join(file_name);
        tokio::fs::write(&path, data).await?;
        info!(path = %path.display(), bytes = data.len(), "audio saved");
        Ok(())
    }
}

#[async_trait]
impl<A: YoutubeApi> Extractor for YoutubeExtractor<A> {
    async fn search(&self, query: &str) -> Result<Vec<Track>> {
        async {
            info!(query, "search started");
            let ids = self.api.search_ids(query, MAX_SEARCH_RESULTS).await?;

            let details = try_join_all(ids.iter().map(|id| self.api.video_details(id))).await?;
            let tracks: Vec<Track> = details
                .into_iter()
                .flatten()
                .map(|video| {
                    Track::new(video.title, video.description, build_watch_url(&video.id))
                })
                .collect();

            info!(query, results = tracks.len(), "search completed");
            Ok::<_, SongFinderError>(tracks)
        }
        .instrument(self.span.clone())
        .await
    }

    async fn extract_and_save(&self, locator: &str) -> Result<Track> {
        async {
            let video_id = parse_id(locator)?;
            info!(video_id = %video_id, "extraction started");

            let (details, streams) = tokio::try_join!(
                self.api.video_details(&video_id),
                self.api.stream_manifest(&video_id),
            )?;
            let details = details.ok_or_else(|| {
                SongFinderError::VideoUnavailable(format!("{video_id}: no metadata returned"))
            })?;

            let stream = select_audio_stream(&streams)
                .ok_or_else(|| SongFinderError::NoStreamAvailable(video_id.clone()))?;
            debug!(
                itag = stream.itag,
                bitrate = stream.bitrate,
                mime_type = %stream.mime_type,
                "audio stream selected"
            );

            let data = self.api.open_stream(stream).await?;

            let track = Track::new(
                details.title,
                details.description,
                build_watch_url(&video_id),
            )
            .with_thumbnail(details.thumbnail_url)
            .with_author(details.author);

            let file_name = artifact_name(track.title());
            self.save(&file_name, &data).await?;

            Ok::<_, SongFinderError>(track.with_local_path(file_name))
        }
        .instrument(self.span.clone())
        .await
    }
}
