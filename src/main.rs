//! wardkv CLI entry point: parse args, build the engine, serve HTTP.

use std::net::SocketAddr;
use std::process;
use std::sync::Arc;

use serde_json::json;

use wardkv::cli::{Cli, Command};
use wardkv::engine::KvEngine;
use wardkv::http::{AppState, HttpServer};
use wardkv::replication::{ReplicatedEngine, Role};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    if let Err(e) = run(cli.command).await {
        eprintln!("{}", json!({"status": "error", "message": e}));
        process::exit(1);
    }
}

async fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Serve { host, port, data_dir, index } => {
            println!("starting wardkv: data_dir={} index={}", data_dir.display(), index);
            let engine = KvEngine::open(&data_dir).map_err(|e| e.to_string())?;
            let replicated = ReplicatedEngine::new(engine, Role::Primary, vec![]);
            let state = Arc::new(AppState::new(replicated, index));
            let addr: SocketAddr = format!("{host}:{port}").parse().map_err(|e: std::net::AddrParseError| e.to_string())?;
            let server = HttpServer::new(addr, state, false);
            server.serve().await.map_err(|e| e.to_string())
        }
        Command::Cluster { host, port, data_dir, index, role, peers } => {
            let peer_list = Command::parse_peers(&peers);
            println!(
                "starting wardkv cluster node: data_dir={} index={} role={:?} peers={:?}",
                data_dir.display(),
                index,
                role,
                peer_list
            );
            let engine = KvEngine::open(&data_dir).map_err(|e| e.to_string())?;
            let replicated = ReplicatedEngine::new(engine, role.into(), peer_list);
            let state = Arc::new(AppState::new(replicated, index));
            let addr: SocketAddr = format!("{host}:{port}").parse().map_err(|e: std::net::AddrParseError| e.to_string())?;
            let server = HttpServer::new(addr, state, true);
            server.serve().await.map_err(|e| e.to_string())
        }
    }
}
