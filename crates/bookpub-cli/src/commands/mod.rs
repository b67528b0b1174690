//! Command implementations for the bookpub CLI.
//!
//! - [`build`] - Convert the manuscript and render print output
//! - [`dev`] - Watch-and-rebuild session next to the dev server
//! - [`new`] - Project scaffolding
//! - [`lint`] - EJS template checks
//!
//! Each command provides an `execute` function that takes the parsed command
//! arguments and the project context and returns a Result.

pub mod build;
pub mod dev;
pub mod lint;
pub mod new;
mod templates;

pub use build::execute as build_execute;
pub use dev::execute as dev_execute;
pub use lint::execute as lint_execute;
pub use new::execute as new_execute;
