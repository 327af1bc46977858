// Error type shared by every stage of the install pipeline.
// Inner stages only ever return `InstallError`; `main` is the single place
// where an error is turned into a diagnostic and a non-zero exit code.

use crate::libs::utilities::http::FetchError;
use std::io;
use std::path::{Path, PathBuf};

/// Everything that can make an install run fail.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    /// The HTTP request could not be completed, or a download returned a non-2xx status.
    #[error("transport failure for {url}: {reason}")]
    Transport { url: String, reason: String },

    /// The release API answered a lookup with a non-2xx status.
    #[error("invalid release version: {version} {{{url}}} (HTTP {status})")]
    NotFound {
        version: String,
        url: String,
        status: u16,
    },

    /// The release API answered 2xx but the body was not a release description.
    #[error("could not decode release information from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The checksum file contained no digest token.
    #[error("checksum file at {url} does not contain a digest")]
    ChecksumFormat { url: String },

    /// The release's assets cannot be split into one archive and one checksum file.
    #[error("release {tag} is malformed: {reason}")]
    MalformedRelease { tag: String, reason: String },

    /// The downloaded archive does not match the published digest.
    #[error("checksums not matching for {}: expected {expected}, computed {actual}", .path.display())]
    Integrity {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// A file entry yielded fewer bytes than its header declared.
    #[error("only wrote {written} bytes to {}; expected {expected}", .path.display())]
    ShortWrite {
        path: PathBuf,
        written: u64,
        expected: u64,
    },

    /// The archive holds an entry kind that cannot be recreated.
    #[error("tar entry {entry} has unsupported type {kind}")]
    Format { entry: String, kind: String },

    /// An archive entry would land outside the destination directory.
    #[error("tar entry {entry} escapes the destination directory")]
    UnsafeEntryPath { entry: String },

    /// A local filesystem operation failed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl InstallError {
    /// Builds a `map_err` adapter that records what was being done to which path.
    ///
    /// ```ignore
    /// fs::create_dir_all(&dir).map_err(InstallError::io("creating", &dir))?;
    /// ```
    pub fn io(action: &str, path: &Path) -> impl FnOnce(io::Error) -> Self {
        let context = format!("{} {}", action, path.display());
        move |source| InstallError::Io { context, source }
    }
}

// Downloads and checksum fetches treat every HTTP failure as a transport problem.
// The release lookup maps `FetchError::Status` to `NotFound` itself.
impl From<FetchError> for InstallError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Status { url, code, reason } => InstallError::Transport {
                url,
                reason: format!("bad status: {code} {reason}"),
            },
            FetchError::Transport { url, reason } => InstallError::Transport { url, reason },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_adapter_names_action_and_path() {
        let err = InstallError::io("creating", Path::new("/tmp/x"))(io::Error::other("boom"));
        assert_eq!(err.to_string(), "creating /tmp/x: boom");
    }

    #[test]
    fn http_status_becomes_transport_failure() {
        let err: InstallError = FetchError::Status {
            url: "https://dl/a.tar.gz".to_string(),
            code: 503,
            reason: "Service Unavailable".to_string(),
        }
        .into();
        assert!(matches!(err, InstallError::Transport { ref reason, .. } if reason == "bad status: 503 Service Unavailable"));
    }

    #[test]
    fn not_found_names_the_url() {
        let err = InstallError::NotFound {
            version: "GE-Proton9.20".to_string(),
            url: "https://api.example/tags/GE-Proton9.20".to_string(),
            status: 404,
        };
        let message = err.to_string();
        assert!(message.contains("https://api.example/tags/GE-Proton9.20"));
        assert!(message.contains("404"));
    }
}
