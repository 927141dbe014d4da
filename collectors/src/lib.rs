//! # NiFi exporter collectors
//!
//! Turns NiFi status resources into Prometheus samples.
//!
//! ## Architecture
//!
//! - **`resolve`**: picks per-node or aggregate snapshots of an entity
//! - **`collector`**: the [`Collector`] trait and the shared fetch, emit and
//!   time cycle every collector runs
//! - **Collectors**: one per resource kind
//!   - **`ConnectionsCollector`**: queue statistics (`nifi_conn_*`)
//!   - **`CountersCollector`**: processor counters (`nifi_counter_*`)
//!   - **`ProcessGroupsCollector`**: flow statistics (`nifi_pg_*`)
//!   - **`SystemDiagnosticsCollector`**: JVM and storage figures (`nifi_sysdiag_*`)
//! - **`registry`**: runs collectors concurrently against a shared sink
//! - **`encode`**: renders gathered samples as exposition text

#[macro_use]
extern crate tracing;

mod collector;
mod connections;
mod counters;
mod descriptor;
pub mod encode;
pub mod labels;
mod node;
mod process_groups;
mod registry;
mod resolve;
mod sink;
mod system_diagnostics;
#[cfg(test)]
mod testing;

pub use collector::{
    CollectFuture,
    Collector,
    ScrapeContext,
    ScrapeError,
};
pub use connections::ConnectionsCollector;
pub use counters::CountersCollector;
pub use descriptor::{
    ConstLabels,
    Descriptor,
    MetricKind,
};
pub use node::{
    NodeId,
    AGGREGATE_NODE_ID,
};
pub use process_groups::ProcessGroupsCollector;
pub use registry::{
    NifiCollector,
    Registry,
    RegistryError,
};
pub use resolve::{
    resolve,
    StatusSnapshots,
};
pub use sink::{
    channel,
    Emission,
    Failure,
    Gathered,
    Sample,
    Sink,
};
pub use system_diagnostics::SystemDiagnosticsCollector;
