// Building blocks of the install pipeline.

// Selecting release assets and streaming them to disk.
pub mod assets;
// SHA-512 verification against the release's checksum file.
pub mod checksum;
// Unpacking the `.tar.gz` release archive.
pub mod compression;
// The HTTP client seam.
pub mod http;
// Steam paths and small filesystem chores.
pub mod path_helpers;
// Background progress ticks during downloads.
pub mod progress;
