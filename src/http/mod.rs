//! HTTP/JSON wire surface: thin framing over the replicated engine.

pub mod cluster_routes;
pub mod routes;
mod server;
pub mod state;

pub use server::HttpServer;
pub use state::AppState;
