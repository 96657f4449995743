use serde::{Deserialize, Serialize};

// ---- Data API v3 ----

#[derive(Debug, Clone, Deserialize)]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub id: ResourceId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceId {
    pub kind: String,
    #[serde(rename = "videoId")]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<Video>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Video {
    pub id: String,
    pub snippet: Snippet,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Snippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "channelTitle")]
    pub channel_title: Option<String>,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnails {
    pub default: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
    pub standard: Option<Thumbnail>,
    pub maxres: Option<Thumbnail>,
}

impl Thumbnails {
    /// First available thumbnail, smallest first
    pub fn first(&self) -> Option<&str> {
        [
            &self.default,
            &self.medium,
            &self.high,
            &self.standard,
            &self.maxres,
        ]
        .into_iter()
        .flatten()
        .map(|t| t.url.as_str())
        .find(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

// ---- InnerTube player ----

#[derive(Debug, Serialize)]
pub struct InnertubeRequest {
    #[serde(rename = "videoId")]
    pub video_id: String,
    pub context: InnertubeContext,
    #[serde(rename = "playbackContext")]
    pub playback_context: PlaybackContext,
    #[serde(rename = "contentCheckOk")]
    pub content_check_ok: bool,
    #[serde(rename = "racyCheckOk")]
    pub racy_check_ok: bool,
}

#[derive(Debug, Serialize)]
pub struct InnertubeContext {
    pub client: ClientInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub client_name: String,
    pub client_version: String,
    pub user_agent: String,
    pub os_name: String,
    pub os_version: String,
    pub hl: String,
    pub time_zone: String,
    pub utc_offset_minutes: i32,
}

#[derive(Debug, Serialize)]
pub struct PlaybackContext {
    #[serde(rename = "contentPlaybackContext")]
    pub content_playback_context: ContentPlaybackContext,
}

#[derive(Debug, Serialize)]
pub struct ContentPlaybackContext {
    #[serde(rename = "html5Preference")]
    pub html5_preference: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerResponse {
    #[serde(rename = "playabilityStatus")]
    pub playability_status: Option<PlayabilityStatus>,
    #[serde(rename = "streamingData")]
    pub streaming_data: Option<StreamingData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayabilityStatus {
    pub status: String,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamingData {
    #[serde(default)]
    pub formats: Vec<Format>,
    #[serde(rename = "adaptiveFormats", default)]
    pub adaptive_formats: Vec<Format>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Format {
    pub itag: u64,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    #[serde(default)]
    pub bitrate: u64,
    #[serde(rename = "contentLength")]
    pub content_length: Option<String>,
    pub url: Option<String>,
}

// ---- Adapter-facing values ----

/// Metadata of a single video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDetails {
    pub id: String,
    pub title: String,
    pub description: String,
    pub author: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl From<Video> for VideoDetails {
    fn from(video: Video) -> Self {
        let thumbnail_url = video.snippet.thumbnails.first().map(str::to_string);
        Self {
            id: video.id,
            title: video.snippet.title,
            description: video.snippet.description,
            author: video.snippet.channel_title,
            thumbnail_url,
        }
    }
}

/// One entry of a stream manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    pub itag: u64,
    pub mime_type: String,
    pub bitrate: u64,
    pub content_length: Option<u64>,
    /// Direct URL; absent when the platform only offers a ciphered one
    pub url: Option<String>,
}

impl StreamInfo {
    pub fn is_audio_only(&self) -> bool {
        self.mime_type.starts_with("audio/")
    }
}

impl From<Format> for StreamInfo {
    fn from(format: Format) -> Self {
        Self {
            itag: format.itag,
            mime_type: format.mime_type,
            bitrate: format.bitrate,
            content_length: format.content_length.and_then(|l| l.parse().ok()),
            url: format.url,
        }
    }
}
