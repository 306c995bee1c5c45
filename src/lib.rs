// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod duration;
pub mod engine;
pub mod program;
pub mod queue;
pub mod runtime;
pub mod settings;
pub mod store;
pub mod summary;
pub mod workout_log;
