// Release sources the installer can pull from.

/// Resolves GE-Proton versions against GitHub releases.
pub(crate) mod github;
