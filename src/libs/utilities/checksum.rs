// SHA-512 verification of a downloaded release archive against the release's
// detached `.sha512sum` file.

use crate::libs::errors::InstallError;
use crate::libs::utilities::http::HttpFetcher;
use crate::{log_debug, log_info};
use colored::Colorize;
use sha2::{Digest, Sha512};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

// A sha512sum line is ~130 bytes; anything far larger is not a checksum file.
const MAX_CHECKSUM_FILE_BYTES: u64 = 64 * 1024;

/// Result of comparing the published digest with the local one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Match,
    Mismatch { expected: String, actual: String },
}

/// Fetches the published digest: the first whitespace-separated token of the checksum file.
///
/// GE-Proton publishes `sha512sum` output, `<hex>  <file name>`. Only the hex
/// part is kept; the file name is not checked against the asset.
///
/// # Arguments
/// * `fetcher`: The HTTP seam used for every request of the run.
/// * `url`: Download URL of the `.sha512sum` asset.
///
/// # Returns
/// * `Ok(String)` with the digest exactly as published.
/// * `Err(InstallError::ChecksumFormat)` when the file is empty or only whitespace.
pub fn fetch_expected_digest(fetcher: &dyn HttpFetcher, url: &str) -> Result<String, InstallError> {
    log_debug!("[Checksum] Fetching checksum file from {}", url.blue());
    let body = fetcher.fetch(url)?;
    // Read at most `MAX_CHECKSUM_FILE_BYTES`; a read error mid-body is a transport problem.
    let mut text = String::new();
    body.take(MAX_CHECKSUM_FILE_BYTES)
        .read_to_string(&mut text)
        .map_err(|err| InstallError::Transport {
            url: url.to_string(),
            reason: err.to_string(),
        })?;
    text.split_whitespace()
        .next()
        .map(str::to_string)
        .ok_or_else(|| InstallError::ChecksumFormat { url: url.to_string() })
}

/// Streams `path` through SHA-512 and returns the lowercase hex digest.
/// The archive is hundreds of megabytes, so it is never read into memory.
pub fn sha512_file(path: &Path) -> Result<String, InstallError> {
    let mut file = File::open(path).map_err(InstallError::io("opening", path))?;
    let mut hasher = Sha512::new();
    // `Sha512` implements `Write`, so `io::copy` does the chunking for us.
    io::copy(&mut file, &mut hasher).map_err(InstallError::io("hashing", path))?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Compares two hex digests exactly.
pub fn compare(expected: &str, actual: &str) -> Verification {
    if expected == actual {
        Verification::Match
    } else {
        Verification::Mismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// Checks the archive at `artifact` against the checksum file at `checksum_url`.
///
/// # Arguments
/// * `fetcher`: The HTTP seam used to fetch the checksum file.
/// * `artifact`: The downloaded archive on disk.
/// * `checksum_url`: Download URL of the `.sha512sum` asset.
///
/// # Returns
/// * `Ok(Verification)`; a mismatch is a value, not an error, so the caller
///   decides what it means.
/// * `Err(InstallError)` if either digest could not be obtained.
pub fn verify(fetcher: &dyn HttpFetcher, artifact: &Path, checksum_url: &str) -> Result<Verification, InstallError> {
    let expected = fetch_expected_digest(fetcher, checksum_url)?;
    let actual = sha512_file(artifact)?;
    let verification = compare(&expected, &actual);
    match &verification {
        Verification::Match => log_info!("[Checksum] Checksums matching!"),
        Verification::Mismatch { .. } => {
            log_debug!("[Checksum] Published {} but computed {}", expected.yellow(), actual.red())
        }
    }
    Ok(verification)
}
