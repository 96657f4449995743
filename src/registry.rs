use std::collections::HashMap;
use std::sync::Arc;

use tracing::{Instrument, Span, debug, info_span, warn};

use crate::config::Config;
use crate::core::{Extractor, IntoEnumIterator, Platform, Track};
use crate::error::{Result, SongFinderError};
use crate::youtube::YoutubeExtractor;

fn normalize(name: &str) -> String {
    name.to_lowercase()
}

/// Collects platform registrations before the registry is frozen
#[derive(Default)]
pub struct RegistryBuilder {
    extractors: HashMap<String, Arc<dyn Extractor>>,
    span: Option<Span>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `extractor` under `name`. Names compare case-insensitively
    /// and must be unique.
    pub fn register(self, name: &str, extractor: impl Extractor + 'static) -> Result<Self> {
        self.register_shared(name, Arc::new(extractor))
    }

    pub fn register_shared(mut self, name: &str, extractor: Arc<dyn Extractor>) -> Result<Self> {
        let key = normalize(name);
        if key.trim().is_empty() {
            return Err(SongFinderError::ConfigError(
                "platform name must not be blank".to_string(),
            ));
        }
        if self.extractors.contains_key(&key) {
            return Err(SongFinderError::ConfigError(format!(
                "platform `{key}` registered twice"
            )));
        }
        self.extractors.insert(key, extractor);
        Ok(self)
    }

    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn build(self) -> Registry {
        Registry {
            extractors: Arc::new(self.extractors),
            span: self.span.unwrap_or_else(|| info_span!("registry")),
        }
    }
}

/// Immutable map from platform name to extractor, dispatching every call
/// through a name check
#[derive(Clone)]
pub struct Registry {
    extractors: Arc<HashMap<String, Arc<dyn Extractor>>>,
    span: Span,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Registry holding every built-in platform
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = RegistryBuilder::new();
        for platform in Platform::iter() {
            let extractor: Arc<dyn Extractor> = match platform {
                Platform::Youtube => Arc::new(YoutubeExtractor::from_config(config)?),
            };
            builder = builder.register_shared(&platform.to_string(), extractor)?;
        }
        Ok(builder.build())
    }

    /// A builder seeded with this registry's entries, for producing an
    /// extended registry. `self` is left untouched.
    pub fn to_builder(&self) -> RegistryBuilder {
        RegistryBuilder {
            extractors: self.extractors.as_ref().clone(),
            span: Some(self.span.clone()),
        }
    }

    /// Registered platform names, sorted
    pub fn platforms(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.extractors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn contains(&self, platform: &str) -> bool {
        self.extractors.contains_key(&normalize(platform))
    }

    fn lookup(&self, platform: &str) -> Result<&Arc<dyn Extractor>> {
        self.extractors.get(&normalize(platform)).ok_or_else(|| {
            let _enter = self.span.enter();
            warn!(platform, "no extractor registered");
            SongFinderError::UnknownPlatform(platform.to_string())
        })
    }

    /// Search `platform` for `query`
    pub async fn find_songs(&self, query: &str, platform: &str) -> Result<Vec<Track>> {
        let extractor = self.lookup(platform)?;
        debug!(parent: &self.span, query, platform, "dispatching search");
        extractor.search(query).instrument(self.span.clone()).await
    }

    /// Extract and save the item behind `locator` from `platform`
    pub async fn extract_and_save(&self, locator: &str, platform: &str) -> Result<Track> {
        let extractor = self.lookup(platform)?;
        debug!(parent: &self.span, locator, platform, "dispatching extraction");
        extractor
            .extract_and_save(locator)
            .instrument(self.span.clone())
            .await
    }
}
