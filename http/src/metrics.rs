use crate::{
    error::AppError,
    router::AppState,
};
use axum::{
    extract::State,
    http::{
        header::CONTENT_TYPE,
        HeaderMap,
    },
    response::{
        IntoResponse,
        Response,
    },
};
use nifi_exporter_collectors::{
    encode,
    ScrapeContext,
};
use nifi_exporter_config::OnError;
use std::time::Duration;

/// Sent by Prometheus with every scrape.
pub const SCRAPE_TIMEOUT_HEADER: &str = "X-Prometheus-Scrape-Timeout-Seconds";

pub(crate) async fn handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    let timeout = scrape_timeout(&headers, state.exporter.scrape_timeout);
    let gathered = state.registry.gather(&ScrapeContext::with_timeout(timeout)).await;

    if !gathered.failures.is_empty() {
        match state.exporter.on_error {
            OnError::Continue => {
                debug!(failures = gathered.failures.len(), "serving a partial scrape");
            }
            OnError::HttpError => {
                let messages = gathered
                    .failures
                    .iter()
                    .map(|failure| format!("{}: {}", failure.descriptor.name(), failure.error))
                    .collect();
                return Err(AppError::Scrape(messages));
            }
        }
    }

    let body = encode::encode(&gathered.samples)?;
    Ok(([(CONTENT_TYPE, encode::content_type())], body).into_response())
}

/// The timeout Prometheus announced, never more than `limit`.
fn scrape_timeout(headers: &HeaderMap, limit: Duration) -> Duration {
    headers
        .get(SCRAPE_TIMEOUT_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|seconds| seconds.is_finite() && *seconds > 0.0)
        .and_then(|seconds| Duration::try_from_secs_f64(seconds).ok())
        .map_or(limit, |announced| announced.min(limit))
}
