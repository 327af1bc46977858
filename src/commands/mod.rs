// Application commands.
// The installer has a single action; its handler lives in `install`.

// Runs one install and reports the outcome.
pub mod install;
