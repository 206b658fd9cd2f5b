//! Command-line surface: flags only, no config file.
//!
//! - `serve`: single-node server.
//! - `cluster`: cluster-node server with role and peer configuration.

mod args;

pub use args::{Cli, Command};
