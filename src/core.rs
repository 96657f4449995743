use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
pub use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::error::Result;

/// Extension of every saved artifact.
pub const ARTIFACT_EXTENSION: &str = ".mp3";

static UNSAFE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^A-Za-z0-9_]+").expect("static pattern"));

/// Built-in platforms
#[derive(
    EnumIter, Display, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Copy,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
}

/// Replace every run of characters outside `[A-Za-z0-9_]` with a single `_`.
pub fn sanitize_title(title: &str) -> String {
    UNSAFE_RUN.replace_all(title, "_").into_owned()
}

/// File name an extracted track is saved under.
pub fn artifact_name(title: &str) -> String {
    format!("{}{}", sanitize_title(title), ARTIFACT_EXTENSION)
}

/// Normalized result of a platform search or extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    title: String,
    description: String,
    source_url: String,
    local_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<String>,
}

impl Track {
    /// Substituted when a platform reports no title.
    pub const UNTITLED: &'static str = "Untitled";

    /// Create a new track with no local artifact
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        let title = title.into();
        let title = if title.trim().is_empty() {
            Self::UNTITLED.to_string()
        } else {
            title
        };
        Self {
            title,
            description: description.into(),
            source_url: source_url.into(),
            local_path: String::new(),
            thumbnail_url: None,
            author: None,
        }
    }

    /// Set thumbnail URL
    pub fn with_thumbnail(mut self, thumbnail_url: Option<String>) -> Self {
        self.thumbnail_url = thumbnail_url.filter(|u| !u.is_empty());
        self
    }

    /// Set author / channel name
    pub fn with_author(mut self, author: Option<String>) -> Self {
        self.author = author.filter(|a| !a.is_empty());
        self
    }

    /// Set the path of the saved artifact, relative to the output directory
    pub fn with_local_path(mut self, local_path: impl Into<String>) -> Self {
        self.local_path = local_path.into();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn local_path(&self) -> &str {
        &self.local_path
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail_url.as_deref()
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    /// Whether an artifact was produced for this track
    pub fn is_saved(&self) -> bool {
        !self.local_path.is_empty()
    }
}

/// Trait for searching and extracting audio from a platform
#[async_trait::async_trait]
pub trait Extractor: Send + Sync {
    /// Keyword search. Results never carry a local path.
    async fn search(&self, query: &str) -> Result<Vec<Track>>;

    /// Resolve the item behind `locator`, save its best audio stream and
    /// return its metadata with the local path filled in.
    async fn extract_and_save(&self, locator: &str) -> Result<Track>;
}
