pub mod config;
pub mod core;
mod download;
pub mod error;
pub mod registry;
pub mod service;
pub mod youtube;

pub use config::Config;
pub use crate::core::{Extractor, Platform, Track, artifact_name, sanitize_title};
pub use error::{ErrorKind, Result, SongFinderError};
pub use registry::{Registry, RegistryBuilder};
pub use service::SongFinder;
pub use youtube::YoutubeExtractor;
