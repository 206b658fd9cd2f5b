//! Builds and serves the axum router over a bound TCP listener.

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;

use crate::http::state::AppState;
use crate::http::{cluster_routes, routes};

pub struct HttpServer {
    addr: SocketAddr,
    state: Arc<AppState>,
    cluster_enabled: bool,
}

impl HttpServer {
    pub fn new(addr: SocketAddr, state: Arc<AppState>, cluster_enabled: bool) -> Self {
        HttpServer { addr, state, cluster_enabled }
    }

    fn build_router(&self) -> axum::Router {
        let mut router = routes::router(self.state.clone());
        if self.cluster_enabled {
            router = router.merge(cluster_routes::router(self.state.clone()));
        }
        router.layer(CorsLayer::permissive())
    }

    pub async fn serve(self) -> std::io::Result<()> {
        let router = self.build_router();
        println!("listening on {}", self.addr);
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        axum::serve(listener, router).await
    }
}
