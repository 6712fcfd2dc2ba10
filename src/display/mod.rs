//! Terminal styling for CLI output.

pub mod theme;

pub use theme::{THEME, Theme};
