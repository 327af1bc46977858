// Installer internals: the pipeline orchestrator, its error type and the
// utilities each stage is built from.

// Error type shared by all stages.
pub mod errors;
// Resolve -> download -> verify -> extract orchestration.
pub mod tool_installer;
// Per-stage building blocks.
pub mod utilities;
