//! UI layer for the desktop console: the app shell and the per-screen renderers.

pub mod app;
pub mod screens;

pub use app::ConsoleApp;
