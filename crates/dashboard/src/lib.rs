//! Terminal dashboard for monitoring bulk actions.
//!
//! The `bulkwatch` binary parses the [`cli`], loads [`config`], and runs
//! the requested view through [`app::App`], which renders with [`view`].

pub mod app;
pub mod cli;
pub mod config;
pub mod view;
