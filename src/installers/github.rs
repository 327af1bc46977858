// This module resolves a GE-Proton version token to a concrete GitHub release.
// It builds the release API URL (latest or by tag), performs a single GET and
// decodes the JSON body into a `ReleaseDescriptor`. No retries: a failed
// lookup is reported with the URL that was requested.

use crate::libs::errors::InstallError;
use crate::libs::utilities::http::{FetchError, HttpFetcher};
use crate::schemas::release::{ReleaseDescriptor, VersionToken};
use crate::{log_debug, log_info};
use colored::Colorize;

/// Public GitHub REST API root.
pub const DEFAULT_API_BASE: &str = "https://api.github.com/";

/// Repository the GE-Proton releases are published under.
pub const RELEASES_PATH: &str = "repos/GloriousEggroll/proton-ge-custom/releases/";

/// Looks releases up through the GitHub release API.
pub struct ReleaseResolver<'a> {
    fetcher: &'a dyn HttpFetcher,
    api_base: String,
}

impl<'a> ReleaseResolver<'a> {
    /// `api_base` is the API root, with or without a trailing slash.
    pub fn new(fetcher: &'a dyn HttpFetcher, api_base: &str) -> Self {
        let mut api_base = api_base.to_string();
        if !api_base.ends_with('/') {
            api_base.push('/');
        }
        ReleaseResolver { fetcher, api_base }
    }

    /// The API URL that describes the release selected by `token`.
    pub fn release_url(&self, token: &VersionToken) -> String {
        match token {
            VersionToken::Latest => format!("{}{}latest", self.api_base, RELEASES_PATH),
            VersionToken::Tag(tag) => format!("{}{}tags/{}", self.api_base, RELEASES_PATH, tag),
        }
    }

    /// Resolves `token` to a release.
    ///
    /// # Errors
    /// * `InstallError::NotFound` when the API answers with a non-2xx status.
    /// * `InstallError::Transport` when the request cannot be completed.
    /// * `InstallError::Decode` when the body is not a release description.
    pub fn resolve(&self, token: &VersionToken) -> Result<ReleaseDescriptor, InstallError> {
        let url = self.release_url(token);
        log_debug!("[Release] Fetching release information from {}", url.blue());

        let body = self.fetcher.fetch(&url).map_err(|err| match err {
            FetchError::Status { url, code, .. } => InstallError::NotFound {
                version: token.to_string(),
                url,
                status: code,
            },
            other => InstallError::from(other),
        })?;

        let release: ReleaseDescriptor =
            serde_json::from_reader(body).map_err(|source| InstallError::Decode { url: url.clone(), source })?;

        log_info!("[Release] found release: {}", release.tag_name.bold());
        if let Some(page) = &release.html_url {
            log_debug!("[Release] Release page: {}", page.dimmed());
        }
        Ok(release)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::utilities::http::fake::FakeFetcher;

    const LATEST_URL: &str = "https://api.github.com/repos/GloriousEggroll/proton-ge-custom/releases/latest";

    fn release_json(tag: &str) -> String {
        format!(
            r#"{{"tag_name":"{tag}","assets":[
                {{"name":"{tag}.tar.gz","browser_download_url":"https://dl/{tag}.tar.gz"}},
                {{"name":"{tag}.sha512sum","browser_download_url":"https://dl/{tag}.sha512sum"}}]}}"#
        )
    }

    #[test]
    fn latest_uses_latest_endpoint() {
        let fetcher = FakeFetcher::new().with_body(LATEST_URL, release_json("GE-Proton9-20"));
        let release = ReleaseResolver::new(&fetcher, DEFAULT_API_BASE)
            .resolve(&VersionToken::Latest)
            .expect("resolve");
        assert_eq!(release.tag_name, "GE-Proton9-20");
        assert_eq!(fetcher.requests(), vec![LATEST_URL.to_string()]);
    }

    #[test]
    fn bare_version_requests_prefixed_tag_once() {
        let fetcher = FakeFetcher::new();
        let resolver = ReleaseResolver::new(&fetcher, "https://api.github.com");
        for raw in ["9-20", "GE-Proton9-20"] {
            assert_eq!(
                resolver.release_url(&VersionToken::parse(raw)),
                "https://api.github.com/repos/GloriousEggroll/proton-ge-custom/releases/tags/GE-Proton9-20"
            );
        }
    }

    #[test]
    fn missing_tag_is_not_found_with_url() {
        let url = "https://api.github.com/repos/GloriousEggroll/proton-ge-custom/releases/tags/GE-Proton9.20";
        let fetcher = FakeFetcher::new().with_status(url, 404);

        let result = ReleaseResolver::new(&fetcher, DEFAULT_API_BASE).resolve(&VersionToken::parse("9.20"));

        match result {
            Err(InstallError::NotFound { version, url: reported, status }) => {
                assert_eq!(version, "GE-Proton9.20");
                assert_eq!(reported, url);
                assert_eq!(status, 404);
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn unreachable_api_is_transport_error() {
        let fetcher = FakeFetcher::new();
        let result = ReleaseResolver::new(&fetcher, DEFAULT_API_BASE).resolve(&VersionToken::Latest);
        assert!(matches!(result, Err(InstallError::Transport { .. })));
    }

    #[test]
    fn wrong_shape_is_decode_error() {
        let fetcher = FakeFetcher::new().with_body(LATEST_URL, r#"{"message":"rate limited"}"#);
        let result = ReleaseResolver::new(&fetcher, DEFAULT_API_BASE).resolve(&VersionToken::Latest);
        assert!(matches!(result, Err(InstallError::Decode { .. })));
    }
}
