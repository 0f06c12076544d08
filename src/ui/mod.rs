//! UI rendering module for the Indexa+ converter
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod converter;
pub mod help_overlay;
pub mod widgets;

pub use converter::render as render_converter;
pub use help_overlay::render as render_help_overlay;
