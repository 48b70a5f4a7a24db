use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::provider::{BlobInfo, SignedUrlProvider, Value};

#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<SignedUrlProvider>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolveQuery {
    pub content_identity: Option<String>,
    pub length: Option<u64>,
}

/// `uri` is `None` when the caller should serve the binary itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolveResponse {
    pub uri: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(|| async move { (StatusCode::OK, "Ok").into_response() }))
        .route("/resolve", get(resolve_handler))
        .with_state(state)
}

pub async fn run(host: String, port: u16, state: AppState) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("parsing listen address {host}:{port}"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    info!(%addr, "Listening");
    axum::serve(listener, router(state))
        .await
        .context("serving HTTP")?;

    Ok(())
}

async fn resolve_handler(
    State(state): State<AppState>,
    Query(params): Query<ResolveQuery>,
) -> Json<ResolveResponse> {
    let blob = BlobInfo {
        length: params.length,
        content_identity: params.content_identity,
    };
    let uri = state
        .provider
        .to_uri(&Value::Binary(&blob))
        .map(|uri| uri.to_string());

    Json(ResolveResponse { uri })
}
