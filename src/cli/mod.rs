//! Command-line interface.
//!
//! - [`commands`]: clap definitions
//! - [`handlers`]: one function per subcommand

pub mod commands;
pub mod handlers;

pub use commands::{Cli, Commands};
