//! User-facing output utilities for clean, colored terminal messages
//!
//! Keeps user-visible warnings and errors free of internal logging noise
//! (timestamps, log levels, crate names). Log macros are for operators;
//! these helpers are for people.

use owo_colors::OwoColorize;

/// Display a warning message in yellow with padding
pub fn warn(message: &str) {
    eprintln!("\n{}\n", message.yellow());
}

/// Display an error message in red with padding
pub fn error(message: &str) {
    eprintln!("\n{}\n", message.red());
}

/// Display a success message in green with padding
pub fn success(message: &str) {
    eprintln!("\n{}\n", message.green());
}
