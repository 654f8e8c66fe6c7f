use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use tower_http::trace::{self, TraceLayer};
use tracing::Level;

use super::api;

pub fn router() -> Router {
    Router::new()
        .route("/execute/:compute_name", post(api::execute))
        .route("/healthz", get(api::healthz))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
}

pub async fn server(addr: SocketAddr) -> color_eyre::Result<()> {
    tracing::info!("start http server: {:?}", addr);
    axum::Server::try_bind(&addr)?
        .serve(router().into_make_service())
        .await?;
    Ok(())
}
