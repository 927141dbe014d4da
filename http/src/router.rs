use crate::metrics;
use axum::{
    response::Html,
    routing::get,
    Router,
};
use nifi_exporter_collectors::Registry;
use nifi_exporter_config::ExporterConfig;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub exporter: ExporterConfig,
}

pub fn create_router(registry: Registry, exporter: ExporterConfig) -> Router {
    let metrics_path = exporter.metrics_path.clone();
    let landing = landing_page(&metrics_path);
    let state = AppState {
        registry: Arc::new(registry),
        exporter,
    };

    let mut router = Router::new()
        .route(&metrics_path, get(metrics::handler))
        .route("/healthz", get(healthz));
    if metrics_path != "/" {
        router = router.route("/", get(move || async move { Html(landing) }));
    }
    router.with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

fn landing_page(metrics_path: &str) -> String {
    format!(
        "<html>\n\
         <head><title>NiFi Exporter</title></head>\n\
         <body>\n\
         <h1>NiFi Exporter</h1>\n\
         <p><a href=\"{metrics_path}\">Metrics</a></p>\n\
         </body>\n\
         </html>\n"
    )
}
