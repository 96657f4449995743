use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, SongFinderError};
use crate::youtube::types::StreamInfo;

pub const ANDROID_USER_AGENT: &str =
    "com.google.android.youtube/20.10.38 (Linux; U; Android 11) gzip";
pub const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
pub const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

static VIDEO_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[?&]v=([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)").expect("static pattern")
});

/// Parse the 11 character video ID out of a `?v=` / `&v=` locator
pub fn parse_id(locator: &str) -> Result<String> {
    VIDEO_ID
        .captures(locator)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            SongFinderError::InvalidLocator(format!("Cannot extract video ID from: {}", locator))
        })
}

/// Audio-only stream with the highest bitrate. Ties keep the first one seen.
pub fn select_audio_stream(streams: &[StreamInfo]) -> Option<&StreamInfo> {
    streams
        .iter()
        .filter(|s| s.is_audio_only())
        .reduce(|best, s| if s.bitrate > best.bitrate { s } else { best })
}

/// Construct YouTube watch URL from video ID
pub fn build_watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}
