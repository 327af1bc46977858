// This module drives one GE-Proton install from start to finish:
//
//   Resolving -> CheckingExisting -> Downloading -> Verifying -> Extracting -> Done
//
// Any stage may fail, which ends the run; finding the release already
// installed ends it early and successfully. The downloaded archive is removed
// on every path once a download has been attempted.

use crate::installers::github::ReleaseResolver;
use crate::libs::errors::InstallError;
use crate::libs::utilities::assets::{Downloader, classify_assets};
use crate::libs::utilities::checksum::{self, Verification};
use crate::libs::utilities::compression::extract_tar_gz;
use crate::libs::utilities::http::HttpFetcher;
use crate::libs::utilities::path_helpers::{ensure_destination_root, remove_if_present};
use crate::schemas::install_target::InstallTarget;
use crate::schemas::release::VersionToken;
use crate::{log_debug, log_info, log_warn};
use colored::Colorize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// What the user asked for.
#[derive(Debug, Clone)]
pub struct InstallRequest {
    pub version: VersionToken,
    /// Steam's `compatibilitytools.d`.
    pub destination_root: PathBuf,
    /// Replace an existing install of the same tag.
    pub force: bool,
}

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed { tag: String, path: PathBuf },
    AlreadyInstalled { tag: String, path: PathBuf },
}

/// Pipeline stages, used for debug logging of transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolving,
    CheckingExisting,
    Downloading,
    Verifying,
    Extracting,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Resolving => "resolving",
            Stage::CheckingExisting => "checking existing install",
            Stage::Downloading => "downloading",
            Stage::Verifying => "verifying",
            Stage::Extracting => "extracting",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Owns the downloaded archive and deletes it when dropped.
struct DownloadedArtifact {
    path: PathBuf,
}

impl DownloadedArtifact {
    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DownloadedArtifact {
    fn drop(&mut self) {
        match remove_if_present(&self.path) {
            Ok(true) => log_debug!("[Install] Removed {}", self.path.display()),
            Ok(false) => {}
            Err(err) => log_warn!("[Install] Could not remove {}: {}", self.path.display(), err),
        }
    }
}

/// Runs the install pipeline against an HTTP fetcher.
pub struct Installer<'a> {
    fetcher: &'a dyn HttpFetcher,
    api_base: String,
    progress_tick: Duration,
}

impl<'a> Installer<'a> {
    pub fn new(fetcher: &'a dyn HttpFetcher, api_base: &str, progress_tick: Duration) -> Self {
        Installer {
            fetcher,
            api_base: api_base.to_string(),
            progress_tick,
        }
    }

    /// Installs the requested release under `request.destination_root`.
    ///
    /// Returns `AlreadyInstalled` without downloading anything when the tag is
    /// present and `force` is off. With `force`, the old install is deleted
    /// before the download starts.
    ///
    /// # Arguments
    /// * `request`: Which version to install, where, and whether to replace an existing install.
    ///
    /// # Returns
    /// * `Ok(InstallOutcome::Installed)` with `<root>/<tag>` once the archive is extracted.
    /// * `Ok(InstallOutcome::AlreadyInstalled)` with the existing path when nothing was done.
    /// * `Err(InstallError)` from whichever stage failed first. A failed extraction
    ///   leaves the partially written tree in place.
    pub fn install(&self, request: &InstallRequest) -> Result<InstallOutcome, InstallError> {
        // 1. Ask the release API which tag we are installing.
        //    "latest" is only known by name after this lookup.
        enter(Stage::Resolving);
        let release = ReleaseResolver::new(self.fetcher, &self.api_base).resolve(&request.version)?;
        let tag = release.tag_name.clone();

        // 2. Look for `<root>/<tag>`. Without `--force` an existing entry ends the
        //    run successfully; with it, the entry is removed before any download.
        enter(Stage::CheckingExisting);
        let mut target = InstallTarget::locate(&request.destination_root, &tag)?;
        if let Some(existing) = target.existing_entry.clone() {
            if !request.force {
                log_info!("[Install] {} already is installed under {}", tag.bold(), existing.display());
                return Ok(InstallOutcome::AlreadyInstalled { tag, path: existing });
            }
            log_info!("[Install] Removing existing install at {}", existing.display().to_string().yellow());
            target.remove_existing()?;
        }

        // The download lands inside the destination root, so it has to exist now.
        ensure_destination_root(&target.destination_root)?;
        let assets = classify_assets(&release)?;

        // 3. Download the archive. From here on `artifact` owns the local file
        //    and deletes it when this function returns, whatever the outcome.
        enter(Stage::Downloading);
        let artifact = DownloadedArtifact {
            path: target.destination_root.join(&assets.payload.name),
        };
        Downloader::new(self.fetcher, self.progress_tick).download(artifact.path(), &assets.payload.download_url)?;

        // 4. Nothing is extracted unless the archive matches the published digest.
        enter(Stage::Verifying);
        if let Verification::Mismatch { expected, actual } =
            checksum::verify(self.fetcher, artifact.path(), &assets.checksum.download_url)?
        {
            return Err(InstallError::Integrity {
                path: artifact.path().to_path_buf(),
                expected,
                actual,
            });
        }

        // 5. Unpack next to the archive. A failure here is not rolled back.
        enter(Stage::Extracting);
        let install_dir = target.install_dir();
        let summary = extract_tar_gz(artifact.path(), &target.destination_root).inspect_err(|_| {
            log_warn!(
                "[Install] Extraction stopped part-way; {} may be incomplete. Re-run with --force to reinstall.",
                install_dir.display()
            );
        })?;
        log_info!(
            "[Install] Extracted {} files, {} directories and {} symlinks",
            summary.files,
            summary.directories,
            summary.symlinks
        );
        // Steam lists tools by directory, so a release without `<tag>/` at its top
        // is installed but probably invisible.
        if !install_dir.is_dir() {
            log_warn!(
                "[Install] Archive did not contain a top-level {} directory; Steam may not list it",
                tag.yellow()
            );
        }

        // 6. Remove the archive before reporting success.
        drop(artifact);
        enter(Stage::Done);
        Ok(InstallOutcome::Installed { tag, path: install_dir })
    }
}

fn enter(stage: Stage) {
    log_debug!("[Install] Stage: {}", stage);
}
