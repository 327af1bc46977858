// Data types shared across the pipeline.

// Release, asset and version-token shapes.
pub mod release;
// The on-disk slot a release is installed into.
pub mod install_target;
