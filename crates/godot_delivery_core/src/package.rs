use crate::constants::files::PACKAGE_EXTENSION;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized platform identifier, e.g. `linuxx11` for the engine label `Linux/X11`.
///
/// Always matches `[0-9a-z]*`, see [`Platform::from_label`]. Deserialized values are slugged too.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Platform(String);

impl Platform {
    /// Derives the slug of an engine platform label: lowercase, keep ASCII letters and digits, drop everything else.
    pub fn from_label(label: &str) -> Self {
        Self(platform_slug(label))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Platform {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<Platform> for String {
    fn from(platform: Platform) -> Self {
        platform.0
    }
}

impl AsRef<str> for Platform {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub fn platform_slug(label: &str) -> String {
    label
        .chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// The final path segment of a repository URL with one trailing `.git` removed.
pub fn repository_base_name(url: &str) -> &str {
    let trimmed = url.trim_end_matches('/');
    let segment = trimmed.rsplit('/').next().unwrap_or(trimmed);
    segment.strip_suffix(".git").unwrap_or(segment)
}

/// `<repo-base>-<platform-slug>.pck`
pub fn package_filename(repository: &str, platform: &Platform) -> String {
    format!(
        "{}-{}.{PACKAGE_EXTENSION}",
        repository_base_name(repository),
        platform
    )
}

/// Metadata of one exported package, as stored in the cache and the cache file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PckMetadata {
    /// File name below `<storage>/pcks`, unique per platform and repository.
    pub filename: String,
    pub platform: Platform,
    /// The repository URL the package was built from.
    #[serde(rename = "origin_repo")]
    pub origin_repository: String,
    #[serde(rename = "game_name")]
    pub gamename: String,
    /// Resource path of the main scene, may be empty.
    pub main_scene: String,
}
