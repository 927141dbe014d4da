//! # NiFi REST API client
//!
//! Fetches the status resources the exporter republishes: connections,
//! counters, process group status and system diagnostics. Access is read-only
//! apart from the token login.
//!
//! [`NifiApi`] is the seam the collectors depend on; [`NifiClient`] is the
//! `reqwest` implementation of it.

#[macro_use]
extern crate tracing;

mod client;
mod error;
pub mod model;

pub use client::{
    ClientOptions,
    Credentials,
    NifiClient,
};
pub use error::ClientError;
pub use model::*;

use std::{
    future::Future,
    pin::Pin,
};

pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ClientError>> + Send + 'a>>;

/// Read access to the NiFi status endpoints.
///
/// Implementations must be safe to share between collectors running
/// concurrently.
pub trait NifiApi: Send + Sync {
    /// `GET /process-groups/{id}/connections`
    fn connections<'a>(&'a self, process_group_id: &'a str) -> ApiFuture<'a, Vec<ConnectionEntity>>;

    /// `GET /counters`
    fn counters<'a>(&'a self, query: &'a CounterQuery) -> ApiFuture<'a, CountersDto>;

    /// `GET /flow/process-groups/{id}/status`, recursive and node-wise.
    fn process_group_status<'a>(&'a self, process_group_id: &'a str) -> ApiFuture<'a, ProcessGroupStatusDto>;

    /// `GET /system-diagnostics`, node-wise.
    fn system_diagnostics(&self) -> ApiFuture<'_, SystemDiagnosticsDto>;
}
