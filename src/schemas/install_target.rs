// Where a resolved release is installed, and whether something is already there.

use crate::libs::errors::InstallError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The `<destination_root>/<tag>` slot for one release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTarget {
    /// Steam's `compatibilitytools.d` directory.
    pub destination_root: PathBuf,
    /// Set when `<destination_root>/<tag>` already exists (as anything, including a dangling symlink).
    pub existing_entry: Option<PathBuf>,
    tag_name: String,
}

impl InstallTarget {
    /// Looks up `<destination_root>/<tag_name>` without following symlinks.
    pub fn locate(destination_root: &Path, tag_name: &str) -> Result<Self, InstallError> {
        let install_dir = destination_root.join(tag_name);
        let existing_entry = match fs::symlink_metadata(&install_dir) {
            Ok(_) => Some(install_dir),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => return Err(InstallError::io("inspecting", &install_dir)(err)),
        };
        Ok(InstallTarget {
            destination_root: destination_root.to_path_buf(),
            existing_entry,
            tag_name: tag_name.to_string(),
        })
    }

    /// The directory the archive is expected to produce.
    pub fn install_dir(&self) -> PathBuf {
        self.destination_root.join(&self.tag_name)
    }

    /// Deletes a previous install entirely: directories recursively, files and links directly.
    pub fn remove_existing(&mut self) -> Result<(), InstallError> {
        let Some(existing) = self.existing_entry.take() else {
            return Ok(());
        };
        let metadata = fs::symlink_metadata(&existing).map_err(InstallError::io("inspecting", &existing))?;
        if metadata.is_dir() {
            fs::remove_dir_all(&existing).map_err(InstallError::io("removing", &existing))?;
        } else {
            fs::remove_file(&existing).map_err(InstallError::io("removing", &existing))?;
        }
        Ok(())
    }
}
