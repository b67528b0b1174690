//! bookpub CLI - publish a Markdown manuscript as a web book or a PDF.
//!
//! # Architecture
//!
//! - [`process`] - Process Supervisor: spawns children, reports their
//!   lifecycle as events on a [`process::ProcessHandle`]
//! - [`pipeline`] - Build Pipeline Dispatcher: conversion, then print render
//! - [`dev`] - Dev Orchestrator: session state machine, watcher, dev server
//! - [`commands`] - `build`, `dev`, `new` and `lint`
//! - [`context`] - Per-invocation project settings
//! - [`error`] - Error types with actionable messages
//! - [`logger`] - Structured logging with tracing
//! - [`ui`] - Terminal status lines and build summaries
//!
//! Watcher configuration resolution lives in the `bookpub-config` crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use bookpub_cli::context::ProjectContext;
//! use bookpub_cli::pipeline::Dispatcher;
//!
//! # async fn run() -> bookpub_cli::Result<()> {
//! let ctx = ProjectContext::discover(None)?;
//! let report = Dispatcher::for_project(&ctx).build_type(&ctx, "html").await?;
//! println!("{}", report.artifact().display());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod commands;
pub mod context;
pub mod dev;
pub mod error;
pub mod logger;
pub mod pipeline;
pub mod process;
pub mod ui;
mod walk;

pub use error::{BuildError, CliError, ConfigError, Result, ResultExt};
