//! In-memory `YoutubeApi` for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::{Result, SongFinderError};
use crate::youtube::core::YoutubeApi;
use crate::youtube::types::{StreamInfo, VideoDetails};

pub fn video(id: &str, title: &str) -> VideoDetails {
    VideoDetails {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("about {title}"),
        author: None,
        thumbnail_url: None,
    }
}

/// Audio stream whose bytes read back as `itag-<itag>`
pub fn audio(itag: u64, bitrate: u64) -> StreamInfo {
    StreamInfo {
        itag,
        mime_type: "audio/webm; codecs=\"opus\"".to_string(),
        bitrate,
        content_length: None,
        url: Some(format!("https://cdn.example/{itag}")),
    }
}

#[derive(Default)]
pub struct StubApi {
    hits: Vec<String>,
    videos: HashMap<String, VideoDetails>,
    streams: Vec<StreamInfo>,
    fail_search: bool,
    fail_details: bool,
    fail_manifest: bool,
    reject_streams: bool,
    calls: AtomicUsize,
    max_results: Mutex<Option<usize>>,
    opened: Mutex<Vec<u64>>,
}

impl StubApi {
    /// Known video that also shows up as a search hit
    pub fn with_video(mut self, video: VideoDetails) -> Self {
        self.hits.push(video.id.clone());
        self.videos.insert(video.id.clone(), video);
        self
    }

    /// Search hit with no metadata behind it
    pub fn with_search_hit(mut self, id: &str) -> Self {
        self.hits.push(id.to_string());
        self
    }

    pub fn with_stream(mut self, stream: StreamInfo) -> Self {
        self.streams.push(stream);
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub fn failing_details(mut self) -> Self {
        self.fail_details = true;
        self
    }

    pub fn failing_manifest(mut self) -> Self {
        self.fail_manifest = true;
        self
    }

    pub fn rejecting_streams(mut self) -> Self {
        self.reject_streams = true;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_results_requested(&self) -> Option<usize> {
        *self.max_results.lock().unwrap()
    }

    pub fn opened_itags(&self) -> Vec<u64> {
        self.opened.lock().unwrap().clone()
    }

    fn upstream_failure(what: &str) -> SongFinderError {
        SongFinderError::HttpError {
            status: 500,
            url: format!("https://stub.invalid/{what}"),
        }
    }
}

#[async_trait]
impl YoutubeApi for StubApi {
    async fn search_ids(&self, _query: &str, max_results: usize) -> Result<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.max_results.lock().unwrap() = Some(max_results);
        if self.fail_search {
            return Err(Self::upstream_failure("search"));
        }
        Ok(self.hits.iter().take(max_results).cloned().collect())
    }

    async fn video_details(&self, video_id: &str) -> Result<Option<VideoDetails>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_details {
            return Err(Self::upstream_failure("videos"));
        }
        Ok(self.videos.get(video_id).cloned())
    }

    async fn stream_manifest(&self, _video_id: &str) -> Result<Vec<StreamInfo>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_manifest {
            return Err(Self::upstream_failure("player"));
        }
        Ok(self.streams.clone())
    }

    async fn open_stream(&self, stream: &StreamInfo) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.opened.lock().unwrap().push(stream.itag);
        if self.reject_streams {
            return Err(SongFinderError::StreamUnavailable(format!(
                "itag {} rejected",
                stream.itag
            )));
        }
        Ok(format!("itag-{}", stream.itag).into_bytes())
    }
}
