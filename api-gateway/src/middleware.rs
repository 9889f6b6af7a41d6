use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{error, info, warn};

pub async fn request_logging(req: Request, next: Next) -> Result<Response, StatusCode> {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;
    let status = response.status();
    let duration = start.elapsed();

    if status.is_success() {
        info!(
            "Request completed: {} {} - {} ({}ms)",
            method,
            uri,
            status,
            duration.as_millis()
        );
    } else if status.is_client_error() {
        warn!(
            "Client error: {} {} - {} ({}ms)",
            method,
            uri,
            status,
            duration.as_millis()
        );
    } else {
        error!(
            "Server error: {} {} - {} ({}ms)",
            method,
            uri,
            status,
            duration.as_millis()
        );
    }

    Ok(response)
}
