// Path helpers: where Steam lives, where compatibility tools go, and the
// small filesystem chores the installer performs around them.

use crate::libs::errors::InstallError;
use crate::{log_debug, log_info};
use colored::Colorize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Steam's data directory inside the home directory.
pub const DEFAULT_STEAM_DIR: &str = ".steam";

/// Where Steam looks for third-party compatibility tools, relative to the Steam root.
pub const COMPAT_TOOLS_SUBDIR: &str = "root/compatibilitytools.d";

/// Expands a leading `~` to the home directory.
/// Paths without a tilde are returned unchanged.
pub fn expand_tilde(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// `~/.steam`, or `None` when the home directory cannot be determined.
pub fn default_steam_root() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(DEFAULT_STEAM_DIR))
}

/// `<steam_root>/root/compatibilitytools.d`
pub fn compat_tools_dir(steam_root: &Path) -> PathBuf {
    steam_root.join(COMPAT_TOOLS_SUBDIR)
}

/// Makes sure the destination root exists and is a directory.
///
/// A missing root is created with its ancestors. A non-directory sitting at
/// that path is an error rather than something to replace.
///
/// # Arguments
/// * `root`: Steam's `compatibilitytools.d` directory.
///
/// # Returns
/// * `Ok(())` once `root` is an existing directory.
/// * `Err(InstallError::Io)` if it is something else or cannot be created.
pub fn ensure_destination_root(root: &Path) -> Result<(), InstallError> {
    // `metadata` follows symlinks, so a link to a directory is accepted.
    match fs::metadata(root) {
        Ok(meta) if meta.is_dir() => {
            log_debug!("[Install] Destination {} already exists", root.display());
            Ok(())
        }
        Ok(_) => Err(InstallError::io("using destination", root)(io::Error::new(
            io::ErrorKind::NotADirectory,
            "exists but is not a directory",
        ))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(root).map_err(InstallError::io("creating", root))?;
            log_info!("[Install] Created {}", root.display().to_string().cyan());
            Ok(())
        }
        Err(err) => Err(InstallError::io("inspecting", root)(err)),
    }
}

/// Removes a file if it exists.
///
/// # Returns
/// * `Ok(true)` if a file was removed, `Ok(false)` if there was nothing there.
/// * The underlying `io::Error` for anything other than "not found".
pub fn remove_if_present(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tilde_is_expanded_against_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/.steam/"), home.join(".steam/"));
        }
        assert_eq!(expand_tilde("/opt/steam"), PathBuf::from("/opt/steam"));
    }

    #[test]
    fn default_steam_root_is_in_home() {
        assert_eq!(default_steam_root(), dirs::home_dir().map(|h| h.join(".steam")));
    }

    #[test]
    fn compat_tools_dir_is_under_root() {
        assert_eq!(
            compat_tools_dir(Path::new("/home/u/.steam")),
            PathBuf::from("/home/u/.steam/root/compatibilitytools.d")
        );
    }

    #[test]
    fn missing_destination_is_created() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let root = tmp.path().join("root/compatibilitytools.d");
        ensure_destination_root(&root).expect("create");
        assert!(root.is_dir());
        // Second call sees an existing directory.
        ensure_destination_root(&root).expect("existing");
    }

    #[test]
    fn file_at_destination_is_an_io_error() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let root = tmp.path().join("compatibilitytools.d");
        fs::write(&root, b"stray").expect("write");
        assert!(matches!(ensure_destination_root(&root), Err(InstallError::Io { .. })));
    }

    #[test]
    fn remove_if_present_reports_whether_it_removed() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let path = tmp.path().join("a.tar.gz");
        fs::write(&path, b"x").expect("write");
        assert!(remove_if_present(&path).expect("remove"));
        assert!(!remove_if_present(&path).expect("second remove"));
    }
}
