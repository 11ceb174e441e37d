//! UI components for the TUI

pub mod components;
mod app;
mod input;
mod requests;

pub use app::{App, Tab};
pub use input::{InputMode, KeyBindings, Navigation};
