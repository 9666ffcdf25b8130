use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

/// Per-IP governor applied to every route in `main`
pub type GlobalGovernorLayer = GovernorLayer<
    tower_governor::key_extractor::PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware<governor::clock::QuantaInstant>,
    Body,
>;

/// Sized for several depot terminals behind one NAT address, each holding an SSE
/// feed and re-fetching its collections after every change: a token every 60ms,
/// burst 1000. Keys on the peer address, so the server needs connect info.
pub fn create_global_governor() -> Option<GlobalGovernorLayer> {
    let config = GovernorConfigBuilder::default()
        .per_millisecond(60)
        .burst_size(1000)
        .finish()?;

    Some(GovernorLayer::new(Arc::new(config)))
}

/// Request log keyed by client address. Governor rejections and any 4xx/5xx
/// are logged at `warn`, next to the access gate's own denial lines.
pub async fn log_request(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    tracing::debug!(client_ip = %addr.ip(), method = %method, uri = %uri, "Incoming request");

    let response = next.run(request).await;
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        tracing::warn!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            "Rate limited"
        );
    } else if status.is_client_error() || status.is_server_error() {
        tracing::warn!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            status = %status,
            "Request failed"
        );
    } else {
        tracing::debug!(client_ip = %addr.ip(), method = %method, uri = %uri, status = %status, "Request completed");
    }

    response
}
