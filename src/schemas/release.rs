// Data shapes for GE-Proton releases as returned by the GitHub release API,
// plus the user-facing version token that selects one of them.

use serde::Deserialize;
use std::fmt;

/// Every GE-Proton tag starts with this prefix (e.g. `GE-Proton9-20`).
pub const PACKAGE_PREFIX: &str = "GE-Proton";

/// The literal token that selects the most recent release.
pub const LATEST: &str = "latest";

/// A release as returned by `/releases/latest` or `/releases/tags/{tag}`.
/// Only the fields the installer reads are modelled; serde ignores the rest.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ReleaseDescriptor {
    /// Canonical release identifier; also the name of the installed directory.
    pub tag_name: String,
    /// Downloadable files attached to the release, in API order.
    pub assets: Vec<AssetRef>,
    /// Human-facing release page, logged in debug mode.
    #[serde(default)]
    pub html_url: Option<String>,
}

/// A single downloadable file attached to a release.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AssetRef {
    pub name: String,
    /// Direct download link (GitHub calls it `browser_download_url`).
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
}

/// Which release the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionToken {
    Latest,
    /// A fully prefixed tag name, e.g. `GE-Proton9-20`.
    Tag(String),
}

impl VersionToken {
    /// Normalizes raw user input.
    ///
    /// `latest` (or a blank string) selects the newest release; anything else is
    /// treated as a tag and gets [`PACKAGE_PREFIX`] prepended unless it already
    /// starts with it, so `9-20` and `GE-Proton9-20` name the same release.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw == LATEST {
            VersionToken::Latest
        } else if raw.starts_with(PACKAGE_PREFIX) {
            VersionToken::Tag(raw.to_string())
        } else {
            VersionToken::Tag(format!("{PACKAGE_PREFIX}{raw}"))
        }
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionToken::Latest => f.write_str(LATEST),
            VersionToken::Tag(tag) => f.write_str(tag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_version_gets_prefix() {
        assert_eq!(
            VersionToken::parse("9.20"),
            VersionToken::Tag("GE-Proton9.20".to_string())
        );
    }

    #[test]
    fn prefixed_version_is_not_prefixed_twice() {
        let once = VersionToken::parse("GE-Proton9-20");
        assert_eq!(once, VersionToken::Tag("GE-Proton9-20".to_string()));
        // Normalizing the normalized form is a no-op.
        assert_eq!(VersionToken::parse(&once.to_string()), once);
    }

    #[test]
    fn latest_and_blank_select_latest() {
        assert_eq!(VersionToken::parse("latest"), VersionToken::Latest);
        assert_eq!(VersionToken::parse("   "), VersionToken::Latest);
        assert_eq!(VersionToken::Latest.to_string(), "latest");
    }

    #[test]
    fn release_json_decodes_with_extra_fields() {
        let json = r#"{
            "url": "https://api.github.com/repos/x/y/releases/1",
            "tag_name": "GE-Proton9-20",
            "html_url": "https://github.com/x/y/releases/tag/GE-Proton9-20",
            "assets": [
                {"name": "GE-Proton9-20.tar.gz", "browser_download_url": "https://dl/a.tar.gz", "size": 1},
                {"name": "GE-Proton9-20.sha512sum", "browser_download_url": "https://dl/a.sha512sum"}
            ]
        }"#;
        let release: ReleaseDescriptor = serde_json::from_str(json).expect("valid release json");
        assert_eq!(release.tag_name, "GE-Proton9-20");
        assert_eq!(release.assets.len(), 2);
        assert_eq!(release.assets[1].download_url, "https://dl/a.sha512sum");
    }
}
