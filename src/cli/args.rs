//! CLI argument definitions using clap.
//!
//! - `wardkv serve --host --port --data-dir --index`
//! - `wardkv cluster --host --port --data-dir --index --role --peers`

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "wardkv")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a standalone node with no replication.
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 8765)]
        port: u16,
        #[arg(long)]
        data_dir: PathBuf,
        #[arg(long, default_value_t = false)]
        index: bool,
    },

    /// Run a node that participates in primary/secondary replication.
    Cluster {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long)]
        port: u16,
        #[arg(long)]
        data_dir: PathBuf,
        #[arg(long, default_value_t = false)]
        index: bool,
        #[arg(long)]
        role: CliRole,
        /// Comma-separated peer base URLs, e.g. "http://host:port,http://host2:port2".
        #[arg(long, default_value = "")]
        peers: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CliRole {
    Primary,
    Secondary,
}

impl From<CliRole> for crate::replication::Role {
    fn from(role: CliRole) -> Self {
        match role {
            CliRole::Primary => crate::replication::Role::Primary,
            CliRole::Secondary => crate::replication::Role::Secondary,
        }
    }
}

impl Command {
    /// Splits the `--peers` flag into a list of non-empty peer URLs.
    pub fn parse_peers(peers: &str) -> Vec<String> {
        peers
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_peers_string_yields_empty_list() {
        assert!(Command::parse_peers("").is_empty());
    }

    #[test]
    fn peers_are_split_and_trimmed() {
        assert_eq!(
            Command::parse_peers("http://a:1, http://b:2"),
            vec!["http://a:1".to_string(), "http://b:2".to_string()]
        );
    }
}
