// This module unpacks the GE-Proton `.tar.gz` release archive.
// Entries are recreated one by one under an explicit destination directory,
// rather than through `tar::Archive::unpack`, so that every entry kind the
// release may contain is handled deliberately and anything else is refused.

// Shared error type; filesystem failures carry the action and path they hit.
use crate::libs::errors::InstallError;
// Our custom logging macros to give us nicely formatted (and colored!) output.
use crate::{log_debug, log_info};
// The 'colored' crate helps us make our console output look pretty and readable.
use colored::Colorize;
// Decompresses the gzip layer around the tar stream.
use flate2::read::GzDecoder;
// `DirBuilder` and `OpenOptions` let us pick permission bits at creation time.
use std::fs::{self, DirBuilder, File, OpenOptions};
use std::io;
use std::path::{Component, Path};
// The `tar` crate reads the archive entry by entry.
use tar::{Archive, EntryType};

// Unix-only extensions for setting modes on created files and directories.
#[cfg(unix)]
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};

// Permission bits for directories, whatever the archive recorded.
const DIR_MODE: u32 = 0o755;

/// What an extraction produced, for the final log line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub directories: usize,
    pub files: usize,
    pub symlinks: usize,
    /// Metadata-only entries such as pax global headers.
    pub skipped: usize,
}

/// Unpacks the gzip-compressed tar archive at `archive_path` into `dest`.
///
/// Entries are handled in stream order. A file whose parent directory has not
/// been seen yet gets its parents created on demand. There is no partial
/// success: the first failing entry aborts, leaving what was already written.
///
/// # Arguments
/// * `archive_path`: The downloaded `.tar.gz` release archive.
/// * `dest`: The directory the archive's top-level entries are created in
///   (Steam's `compatibilitytools.d`). It must already exist.
///
/// # Returns
/// * `Ok(ExtractionSummary)` with per-kind entry counts when every entry was recreated.
///
/// # Errors
/// * `InstallError::Io` for any filesystem or decompression failure.
/// * `InstallError::Format` for entry kinds other than directory, regular file,
///   symlink or pax global header.
/// * `InstallError::UnsafeEntryPath` for absolute paths, `..` components, or
///   paths that pass through a symlink already on disk.
/// * `InstallError::ShortWrite` when a file entry ends before its declared size.
pub fn extract_tar_gz(archive_path: &Path, dest: &Path) -> Result<ExtractionSummary, InstallError> {
    log_info!("[Extract] Extract archive {}", archive_path.display().to_string().cyan());

    // Open the archive and stack the gzip decoder and tar reader on top of it.
    // Nothing is buffered in memory beyond what the decoders need.
    let file = File::open(archive_path).map_err(InstallError::io("opening", archive_path))?;
    let mut archive = Archive::new(GzDecoder::new(file));
    let mut summary = ExtractionSummary::default();

    // `entries()` yields one header+body at a time; a corrupt gzip stream
    // surfaces here or on the first `next()` as an I/O error.
    let entries = archive.entries().map_err(InstallError::io("reading", archive_path))?;
    for entry in entries {
        let mut entry = entry.map_err(InstallError::io("reading", archive_path))?;
        let kind = entry.header().entry_type();
        let relative = entry
            .path()
            .map_err(InstallError::io("reading entry name in", archive_path))?
            .into_owned();
        let display_name = relative.display().to_string();

        // Both checks run before this entry touches the filesystem.
        // First the name itself, then whatever already exists along its path.
        ensure_contained(&relative, &display_name)?;
        ensure_no_symlink_ancestors(dest, &relative, &display_name)?;
        let target = dest.join(&relative);

        match kind {
            EntryType::Directory => {
                // Creates missing parents too; an existing directory is fine.
                create_dir(&target)?;
                summary.directories += 1;
            }
            EntryType::Regular => {
                // A file may arrive before its directory entry.
                ensure_parent(&target)?;
                // An existing symlink at the target would be followed by `open`.
                reject_symlink_at(&target, &display_name)?;
                let mode = entry.header().mode().map_err(InstallError::io("reading mode of", &target))?;
                let expected = entry.size();
                let mut out = open_for_write(&target, mode)?;
                // Copy the body and compare against the size the header declared.
                // A stream that ends early copies fewer bytes without erroring.
                let written = io::copy(&mut entry, &mut out).map_err(InstallError::io("writing", &target))?;
                if written != expected {
                    return Err(InstallError::ShortWrite {
                        path: target,
                        written,
                        expected,
                    });
                }
                summary.files += 1;
            }
            EntryType::Symlink => {
                let link_target = entry
                    .link_name()
                    .map_err(InstallError::io("reading link target of", &target))?
                    .ok_or_else(|| InstallError::Format {
                        entry: display_name.clone(),
                        kind: "symlink without target".to_string(),
                    })?
                    .into_owned();
                ensure_parent(&target)?;
                // The link is created as recorded; later entries that try to
                // write through it are refused by `ensure_no_symlink_ancestors`.
                create_symlink(&link_target, &target, &display_name)?;
                summary.symlinks += 1;
            }
            // Written by `git archive`; carries no filesystem effect.
            EntryType::XGlobalHeader => {
                log_debug!("[Extract] Skipping global header entry {}", display_name);
                summary.skipped += 1;
            }
            other => {
                return Err(InstallError::Format {
                    entry: display_name,
                    kind: format!("{other:?}"),
                });
            }
        }
    }

    log_debug!(
        "[Extract] {} directories, {} files, {} symlinks, {} skipped",
        summary.directories,
        summary.files,
        summary.symlinks,
        summary.skipped
    );
    Ok(summary)
}

/// Rejects entry names that would be written outside the destination.
///
/// Only the name is inspected here; see `ensure_no_symlink_ancestors` for
/// what is already on disk.
fn ensure_contained(relative: &Path, display_name: &str) -> Result<(), InstallError> {
    let escapes = relative
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
    if escapes {
        return Err(InstallError::UnsafeEntryPath {
            entry: display_name.to_string(),
        });
    }
    Ok(())
}

/// Walks the existing ancestors of `relative` below `dest` and rejects the
/// entry if any of them is a symlink.
///
/// An earlier symlink entry such as `GE-Proton9-20/escape -> /elsewhere`
/// would otherwise let `GE-Proton9-20/escape/file` be written through it.
/// The walk stops at the first ancestor that does not exist yet, since
/// nothing below it can exist either.
///
/// # Arguments
/// * `dest`: The extraction root; it is trusted and not inspected itself.
/// * `relative`: The entry's path inside the archive, already checked by `ensure_contained`.
/// * `display_name`: The entry name used in the error.
fn ensure_no_symlink_ancestors(dest: &Path, relative: &Path, display_name: &str) -> Result<(), InstallError> {
    let Some(parent) = relative.parent() else {
        return Ok(());
    };

    let mut current = dest.to_path_buf();
    for component in parent.components() {
        // `./` prefixes are common in tarballs and add nothing to the path.
        let Component::Normal(name) = component else {
            continue;
        };
        current.push(name);
        match fs::symlink_metadata(&current) {
            Ok(meta) if meta.file_type().is_symlink() => {
                log_debug!(
                    "[Extract] {} passes through symlink {}",
                    display_name,
                    current.display().to_string().red()
                );
                return Err(InstallError::UnsafeEntryPath {
                    entry: display_name.to_string(),
                });
            }
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => break,
            Err(err) => return Err(InstallError::io("inspecting", &current)(err)),
        }
    }
    Ok(())
}

/// Refuses to write a regular file over an existing symlink.
fn reject_symlink_at(path: &Path, display_name: &str) -> Result<(), InstallError> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => Err(InstallError::UnsafeEntryPath {
            entry: display_name.to_string(),
        }),
        Ok(_) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(InstallError::io("inspecting", path)(err)),
    }
}

/// Creates `path` and any missing ancestors with `DIR_MODE`.
fn create_dir(path: &Path) -> Result<(), InstallError> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(DIR_MODE);
    // `recursive(true)` already succeeds when the directory exists.
    builder.create(path).map_err(InstallError::io("creating directory", path))
}

/// Creates the parent directory of `path` unless it is already there.
fn ensure_parent(path: &Path) -> Result<(), InstallError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => create_dir(parent),
        _ => Ok(()),
    }
}

/// Opens `path` for writing with the entry's permission bits.
///
/// # Arguments
/// * `path`: The file to create or truncate.
/// * `mode`: The mode recorded in the tar header; only the permission and
///   setuid/setgid/sticky bits are kept.
///
/// # Returns
/// * A `File` positioned at offset zero, ready for `io::copy`.
fn open_for_write(path: &Path, mode: u32) -> Result<File, InstallError> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(mode & 0o7777);
    #[cfg(not(unix))]
    let _ = mode;
    options.open(path).map_err(InstallError::io("creating file", path))
}

#[cfg(unix)]
fn create_symlink(link_target: &Path, path: &Path, _entry: &str) -> Result<(), InstallError> {
    std::os::unix::fs::symlink(link_target, path).map_err(InstallError::io("creating symlink", path))
}

#[cfg(not(unix))]
fn create_symlink(_link_target: &Path, _path: &Path, entry: &str) -> Result<(), InstallError> {
    Err(InstallError::Format {
        entry: entry.to_string(),
        kind: "symlink on a platform without symlinks".to_string(),
    })
}
