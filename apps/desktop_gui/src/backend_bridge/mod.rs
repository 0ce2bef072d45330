//! Bridge between the egui thread and the tokio worker that talks to the backend.

pub mod commands;
pub mod runtime;
