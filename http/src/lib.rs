//! HTTP surface of the exporter: the metrics endpoint, a health check and a
//! landing page.

#[macro_use]
extern crate tracing;

pub mod error;
pub mod metrics;
pub mod router;
mod targets;

pub use error::AppError;
pub use router::{
    create_router,
    AppState,
};
pub use targets::{
    build_registry,
    collectors_for,
};
