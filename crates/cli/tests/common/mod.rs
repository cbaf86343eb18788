//! Common utilities for integration tests

#[macro_use]
pub mod cli;

#[allow(unused_imports)]
pub use cli::{CommandResult, DirwatchCommand};
