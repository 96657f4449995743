use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, ORIGIN, USER_AGENT};
use tracing::debug;
use url::Url;

use crate::config::YoutubeConfig;
use crate::download::{download_binary, download_json, http_client, post_json};
use crate::error::{Result, SongFinderError};
use crate::youtube::types::{
    ClientInfo, ContentPlaybackContext, InnertubeContext, InnertubeRequest, PlaybackContext,
    PlayerResponse, SearchListResponse, StreamInfo, VideoDetails, VideoListResponse,
};
use crate::youtube::utils::{ANDROID_USER_AGENT, INNERTUBE_CLIENT_NAME, INNERTUBE_CLIENT_VERSION};

/// The upstream calls the YouTube extractor is built on
#[async_trait]
pub trait YoutubeApi: Send + Sync {
    /// Video IDs matching `query`, in platform order, at most `max_results`
    async fn search_ids(&self, query: &str, max_results: usize) -> Result<Vec<String>>;

    /// Metadata for one video, `None` if the platform does not know it
    async fn video_details(&self, video_id: &str) -> Result<Option<VideoDetails>>;

    /// Every stream variant advertised for the video
    async fn stream_manifest(&self, video_id: &str) -> Result<Vec<StreamInfo>>;

    /// Materialize an advertised stream
    async fn open_stream(&self, stream: &StreamInfo) -> Result<Vec<u8>>;
}

/// Data API v3 for search/metadata, InnerTube (Android client) for streams
#[derive(Debug, Clone)]
pub struct YoutubeClient {
    http: reqwest::Client,
    stream_http: reqwest::Client,
    config: YoutubeConfig,
}

impl YoutubeClient {
    /// API calls are bounded by `request_timeout`, stream bodies by `stream_timeout`
    pub fn new(
        config: YoutubeConfig,
        request_timeout: Duration,
        stream_timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            http: http_client(request_timeout, request_timeout)?,
            stream_http: http_client(request_timeout, stream_timeout)?,
            config,
        })
    }

    /// Use one client for every call
    pub fn with_http(http: reqwest::Client, config: YoutubeConfig) -> Self {
        Self {
            stream_http: http.clone(),
            http,
            config,
        }
    }

    fn data_api_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String> {
        let base = format!(
            "{}/{}",
            self.config.data_api_url.trim_end_matches('/'),
            endpoint
        );
        let params = params
            .iter()
            .copied()
            .chain([("key", self.config.api_key.as_str())]);
        Url::parse_with_params(&base, params)
            .map(String::from)
            .map_err(|e| SongFinderError::ConfigError(format!("Invalid data API URL {base}: {e}")))
    }

    fn data_api_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(&self.config.user_agent)?);
        Ok(headers)
    }

    fn player_request(video_id: &str) -> InnertubeRequest {
        InnertubeRequest {
            video_id: video_id.to_string(),
            context: InnertubeContext {
                client: ClientInfo {
                    client_name: INNERTUBE_CLIENT_NAME.to_string(),
                    client_version: INNERTUBE_CLIENT_VERSION.to_string(),
                    user_agent: ANDROID_USER_AGENT.to_string(),
                    os_name: "Android".to_string(),
                    os_version: "11".to_string(),
                    hl: "en".to_string(),
                    time_zone: "UTC".to_string(),
                    utc_offset_minutes: 0,
                },
            },
            playback_context: PlaybackContext {
                content_playback_context: ContentPlaybackContext {
                    html5_preference: "HTML5_PREF_WANTS".to_string(),
                },
            },
            content_check_ok: true,
            racy_check_ok: true,
        }
    }
}

#[async_trait]
impl YoutubeApi for YoutubeClient {
    async fn search_ids(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
        let max = max_results.to_string();
        let url = self.data_api_url(
            "search",
            &[
                ("part", "snippet"),
                ("type", "video"),
                ("q", query),
                ("maxResults", max.as_str()),
            ],
        )?;
        let response: SearchListResponse =
            download_json(&self.http, &url, self.data_api_headers()?).await?;

        let ids: Vec<String> = response
            .items
            .into_iter()
            .filter(|item| item.id.kind == "youtube#video")
            .filter_map(|item| item.id.video_id)
            .take(max_results)
            .collect();
        debug!(query, hits = ids.len(), "search list fetched");
        Ok(ids)
    }

    async fn video_details(&self, video_id: &str) -> Result<Option<VideoDetails>> {
        let url = self.data_api_url(
            "videos",
            &[("part", "snippet,contentDetails"), ("id", video_id)],
        )?;
        let response: VideoListResponse =
            download_json(&self.http, &url, self.data_api_headers()?).await?;
        Ok(response.items.into_iter().next().map(VideoDetails::from))
    }

    async fn stream_manifest(&self, video_id: &str) -> Result<Vec<StreamInfo>> {
        let url = format!(
            "{}/youtubei/v1/player?prettyPrint=false",
            self.config.innertube_url.trim_end_matches('/')
        );

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(ANDROID_USER_AGENT));
        headers.insert("X-YouTube-Client-Name", HeaderValue::from_static("3"));
        headers.insert(
            "X-YouTube-Client-Version",
            HeaderValue::from_static(INNERTUBE_CLIENT_VERSION),
        );
        headers.insert(ORIGIN, HeaderValue::from_static("https://www.youtube.com"));

        let player: PlayerResponse =
            post_json(&self.http, &url, &Self::player_request(video_id), headers).await?;

        if let Some(status) = &player.playability_status
            && status.status != "OK"
        {
            let reason = status.reason.as_deref().unwrap_or("Unknown error");
            return Err(SongFinderError::VideoUnavailable(format!(
                "{video_id}: {reason}"
            )));
        }

        let streaming_data = player.streaming_data.unwrap_or_default();
        let streams: Vec<StreamInfo> = streaming_data
            .adaptive_formats
            .into_iter()
            .chain(streaming_data.formats)
            .map(StreamInfo::from)
            .collect();
        debug!(video_id, streams = streams.len(), "stream manifest fetched");
        Ok(streams)
    }

    async fn open_stream(&self, stream: &StreamInfo) -> Result<Vec<u8>> {
        let url = stream.url.as_deref().ok_or_else(|| {
            SongFinderError::StreamUnavailable(format!("itag {} has no direct URL", stream.itag))
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(ANDROID_USER_AGENT));
        headers.insert("Range", HeaderValue::from_static("bytes=0-"));

        let bytes = download_binary(&self.stream_http, url, headers)
            .await
            .map_err(|e| match e {
                SongFinderError::HttpError { status, .. } => SongFinderError::StreamUnavailable(
                    format!("itag {} rejected with HTTP {}", stream.itag, status),
                ),
                other => other,
            })?;

        if let Some(expected) = stream.content_length
            && bytes.len() as u64 != expected
        {
            return Err(SongFinderError::StreamUnavailable(format!(
                "itag {} returned {} of {} bytes",
                stream.itag,
                bytes.len(),
                expected
            )));
        }
        debug!(itag = stream.itag, bytes = bytes.len(), "stream read");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> YoutubeClient {
        let config = YoutubeConfig {
            api_key: "test-key".to_string(),
            data_api_url: format!("{}/youtube/v3", server.uri()),
            innertube_url: server.uri(),
            ..YoutubeConfig::default()
        };
        YoutubeClient::new(config, Duration::from_secs(5), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn search_keeps_videos_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/youtube/v3/search"))
            .and(query_param("q", "lofi beats"))
            .and(query_param("maxResults", "10"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    { "id": { "kind": "youtube#video", "videoId": "bbbbbbbbbbb" } },
                    { "id": { "kind": "youtube#channel", "channelId": "UC123" } },
                    { "id": { "kind": "youtube#video", "videoId": "aaaaaaaaaaa" } }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let ids = client(&server).search_ids("lofi beats", 10).await.unwrap();
        assert_eq!(ids, vec!["bbbbbbbbbbb", "aaaaaaaaaaa"]);
    }

    #[tokio::test]
    async fn search_failure_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/youtube/v3/search"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = client(&server).search_ids("lofi", 10).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
    }

    #[tokio::test]
    async fn unknown_video_has_no_details() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/youtube/v3/videos"))
            .and(query_param("id", "abcDEF12345"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": []
            })))
            .mount(&server)
            .await;

        let details = client(&server).video_details("abcDEF12345").await.unwrap();
        assert!(details.is_none());
    }

    #[tokio::test]
    async fn manifest_lists_adaptive_formats() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/youtubei/v1/player"))
            .and(body_partial_json(serde_json::json!({
                "videoId": "abcDEF12345",
                "context": { "client": { "clientName": "ANDROID" } }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "playabilityStatus": { "status": "OK" },
                "streamingData": {
                    "adaptiveFormats": [
                        { "itag": 137, "mimeType": "video/mp4", "bitrate": 4000000, "url": "https://cdn/137" },
                        { "itag": 251, "mimeType": "audio/webm; codecs=\"opus\"", "bitrate": 160000, "url": "https://cdn/251" },
                        { "itag": 140, "mimeType": "audio/mp4", "bitrate": 130000, "contentLength": "42" }
                    ]
                }
            })))
            .mount(&server)
            .await;

        let streams = client(&server)
            .stream_manifest("abcDEF12345")
            .await
            .unwrap();
        assert_eq!(streams.len(), 3);
        assert_eq!(streams[1].itag, 251);
        assert!(streams[1].is_audio_only());
        assert_eq!(streams[2].url, None);
        assert_eq!(streams[2].content_length, Some(42));
    }

    #[tokio::test]
    async fn unplayable_video_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/youtubei/v1/player"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "playabilityStatus": { "status": "LOGIN_REQUIRED", "reason": "Sign in" }
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .stream_manifest("abcDEF12345")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert!(err.to_string().contains("Sign in"));
    }

    #[tokio::test]
    async fn rejected_stream_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videoplayback"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let stream = StreamInfo {
            itag: 251,
            mime_type: "audio/webm".to_string(),
            bitrate: 160000,
            content_length: None,
            url: Some(format!("{}/videoplayback", server.uri())),
        };
        let err = client(&server).open_stream(&stream).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StreamUnavailable);
    }

    #[tokio::test]
    async fn ciphered_stream_is_unavailable() {
        let server = MockServer::start().await;
        let stream = StreamInfo {
            itag: 140,
            mime_type: "audio/mp4".to_string(),
            bitrate: 130000,
            content_length: None,
            url: None,
        };
        let err = client(&server).open_stream(&stream).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StreamUnavailable);
    }

    #[tokio::test]
    async fn opens_stream_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videoplayback"))
            .respond_with(ResponseTemplate::new(206).set_body_bytes(b"ID3audio".to_vec()))
            .mount(&server)
            .await;

        let stream = StreamInfo {
            itag: 251,
            mime_type: "audio/webm".to_string(),
            bitrate: 160000,
            content_length: None,
            url: Some(format!("{}/videoplayback", server.uri())),
        };
        let bytes = client(&server).open_stream(&stream).await.unwrap();
        assert_eq!(bytes, b"ID3audio");
    }

    #[tokio::test]
    async fn short_stream_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videoplayback"))
            .respond_with(ResponseTemplate::new(206).set_body_bytes(b"ID3audio".to_vec()))
            .mount(&server)
            .await;

        let mut stream = StreamInfo {
            itag: 251,
            mime_type: "audio/webm".to_string(),
            bitrate: 160000,
            content_length: Some(8),
            url: Some(format!("{}/videoplayback", server.uri())),
        };
        let api = client(&server);
        assert_eq!(api.open_stream(&stream).await.unwrap().len(), 8);

        stream.content_length = Some(4096);
        let err = api.open_stream(&stream).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StreamUnavailable);
    }

    #[tokio::test]
    async fn stream_body_gets_its_own_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videoplayback"))
            .respond_with(
                ResponseTemplate::new(206)
                    .set_body_bytes(b"ID3audio".to_vec())
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;

        let config = YoutubeConfig {
            api_key: "test-key".to_string(),
            ..YoutubeConfig::default()
        };
        let api =
            YoutubeClient::new(config, Duration::from_millis(100), Duration::from_secs(5)).unwrap();
        let stream = StreamInfo {
            itag: 251,
            mime_type: "audio/webm".to_string(),
            bitrate: 160000,
            content_length: None,
            url: Some(format!("{}/videoplayback", server.uri())),
        };
        assert_eq!(api.open_stream(&stream).await.unwrap(), b"ID3audio");
    }
}
