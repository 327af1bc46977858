// Release assets: picking the archive and its checksum file out of a release,
// and streaming the archive to disk.

use crate::libs::errors::InstallError;
use crate::libs::utilities::http::HttpFetcher;
use crate::libs::utilities::progress::ProgressReporter;
use crate::schemas::release::{AssetRef, ReleaseDescriptor};
use crate::{log_debug, log_info};
use colored::Colorize;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Detached checksum files are named `<tag>.sha512sum`.
pub const CHECKSUM_SUFFIX: &str = "sha512sum";

/// The two assets an install needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedAssets<'a> {
    /// The `.tar.gz` archive.
    pub payload: &'a AssetRef,
    /// The `.sha512sum` file describing `payload`.
    pub checksum: &'a AssetRef,
}

/// Splits a release's assets into payload and checksum by file name suffix.
///
/// Exactly one asset must land in each bucket; anything else means the
/// release is not shaped like a GE-Proton release and must not be installed.
/// The payload name is also used as a local file name, so it has to be a
/// plain name without path separators.
///
/// # Arguments
/// * `release`: The release description returned by the resolver.
///
/// # Returns
/// * `Ok(SelectedAssets)` borrowing the archive and checksum entries from `release`.
/// * `Err(InstallError::MalformedRelease)` naming the tag and what was wrong.
pub fn classify_assets(release: &ReleaseDescriptor) -> Result<SelectedAssets<'_>, InstallError> {
    // Everything that is not a checksum file is a payload candidate.
    let (checksums, payloads): (Vec<&AssetRef>, Vec<&AssetRef>) = release
        .assets
        .iter()
        .partition(|asset| asset.name.ends_with(CHECKSUM_SUFFIX));

    let malformed = |reason: String| InstallError::MalformedRelease {
        tag: release.tag_name.clone(),
        reason,
    };

    // Ambiguity is refused outright instead of guessing by position.
    let payload = match payloads.as_slice() {
        [single] => *single,
        [] => return Err(malformed("no archive asset".to_string())),
        many => return Err(malformed(format!("{} archive candidates: {}", many.len(), names(many)))),
    };
    let checksum = match checksums.as_slice() {
        [single] => *single,
        [] => return Err(malformed(format!("no *{CHECKSUM_SUFFIX} asset"))),
        many => return Err(malformed(format!("{} checksum candidates: {}", many.len(), names(many)))),
    };

    // The name becomes `<root>/<name>` on disk, so `../x` or `a/b` must not pass.
    if Path::new(&payload.name).file_name().and_then(|n| n.to_str()) != Some(payload.name.as_str()) {
        return Err(malformed(format!("archive name {:?} is not a plain file name", payload.name)));
    }

    log_debug!("[Release] Payload asset: {}, checksum asset: {}", payload.name, checksum.name);
    Ok(SelectedAssets { payload, checksum })
}

fn names(assets: &[&AssetRef]) -> String {
    assets.iter().map(|a| a.name.as_str()).collect::<Vec<_>>().join(", ")
}

/// Streams assets to local files while a progress reporter ticks on stderr.
pub struct Downloader<'a> {
    fetcher: &'a dyn HttpFetcher,
    tick: Duration,
}

impl<'a> Downloader<'a> {
    pub fn new(fetcher: &'a dyn HttpFetcher, tick: Duration) -> Self {
        Downloader { fetcher, tick }
    }

    /// Downloads `url` into `dest`, creating or truncating it first.
    ///
    /// The body is copied straight from the socket to the file. On failure any
    /// bytes already written stay on disk; removing them is the caller's job.
    ///
    /// # Arguments
    /// * `dest`: The local file to write. Its parent directory must exist.
    /// * `url`: The asset's download URL.
    ///
    /// # Returns
    /// * `Ok(PathBuf)` with `dest` once the whole body is on disk and synced.
    /// * `Err(InstallError::Transport)` for HTTP failures, `Err(InstallError::Io)` for local ones.
    pub fn download(&self, dest: &Path, url: &str) -> Result<PathBuf, InstallError> {
        log_debug!("[Download] Starting download from URL: {}", url.blue());

        // Create (or truncate) the file first, so a bad destination fails before
        // any network traffic.
        let mut file = File::create(dest).map_err(InstallError::io("creating", dest))?;

        // Stopped and joined when it goes out of scope, on every return below.
        let reporter = ProgressReporter::start("downloading", self.tick);

        // Stream the body to disk; it is never held in memory as a whole.
        let mut body = self.fetcher.fetch(url)?;
        let written = io::copy(&mut body, &mut file).map_err(InstallError::io("writing", dest))?;
        file.sync_all().map_err(InstallError::io("flushing", dest))?;

        // Stop the dots before logging so the two don't interleave.
        reporter.finish();
        log_info!(
            "[Download] Successfully downloaded {} ({} bytes)",
            dest.display().to_string().green(),
            written
        );
        Ok(dest.to_path_buf())
    }
}
