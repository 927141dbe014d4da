//! Data transfer objects returned by the NiFi REST API.
//!
//! Only the fields the exporter reads are modelled. Every struct is lenient:
//! missing fields fall back to their defaults so that older or newer NiFi
//! versions still decode.

use serde::{
    Deserialize,
    Serialize,
};

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-
// Connections

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionsEntity {
    pub connections: Vec<ConnectionEntity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionEntity {
    pub id: String,
    pub status: Option<ConnectionStatusDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionStatusDto {
    pub id: String,
    pub group_id: String,
    pub name: String,
    pub source_name: String,
    pub destination_name: String,
    pub stats_last_refreshed: Option<String>,
    pub aggregate_snapshot: Option<ConnectionStatusSnapshotDto>,
    pub node_snapshots: Vec<NodeConnectionStatusSnapshotDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeConnectionStatusSnapshotDto {
    pub node_id: String,
    pub address: String,
    pub api_port: i32,
    pub status_snapshot: Option<ConnectionStatusSnapshotDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionStatusSnapshotDto {
    pub id: String,
    pub group_id: String,
    pub name: String,
    pub source_id: String,
    pub source_name: String,
    pub destination_id: String,
    pub destination_name: String,
    pub flow_files_in: i64,
    pub bytes_in: i64,
    pub flow_files_out: i64,
    pub bytes_out: i64,
    pub flow_files_queued: i64,
    pub bytes_queued: i64,
    pub percent_use_count: Option<i64>,
    pub percent_use_bytes: Option<i64>,
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-
// Counters

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CountersEntity {
    pub counters: CountersDto,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CountersDto {
    pub aggregate_snapshot: Option<CountersSnapshotDto>,
    pub node_snapshots: Vec<NodeCountersSnapshotDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeCountersSnapshotDto {
    pub node_id: String,
    pub address: String,
    pub api_port: i32,
    pub snapshot: Option<CountersSnapshotDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CountersSnapshotDto {
    pub generated: Option<String>,
    pub counters: Vec<CounterDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CounterDto {
    pub id: String,
    pub context: String,
    pub name: String,
    /// Formatted value, e.g. `"1,024"`.
    pub value: String,
    pub value_count: i64,
}

/// Query parameters of `GET /counters`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CounterQuery {
    /// Ask a clustered NiFi for a per-node breakdown next to the aggregate.
    pub nodewise: bool,
    /// Restrict the answer to a single cluster node.
    pub cluster_node_id: Option<String>,
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-
// Process groups

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessGroupStatusEntity {
    pub process_group_status: ProcessGroupStatusDto,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessGroupStatusDto {
    pub id: String,
    pub name: String,
    pub stats_last_refreshed: Option<String>,
    pub aggregate_snapshot: Option<ProcessGroupStatusSnapshotDto>,
    pub node_snapshots: Vec<NodeProcessGroupStatusSnapshotDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeProcessGroupStatusSnapshotDto {
    pub node_id: String,
    pub address: String,
    pub api_port: i32,
    pub status_snapshot: Option<ProcessGroupStatusSnapshotDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessGroupStatusSnapshotDto {
    pub id: String,
    pub name: String,
    pub flow_files_in: i64,
    pub bytes_in: i64,
    pub flow_files_out: i64,
    pub bytes_out: i64,
    pub flow_files_queued: i64,
    pub bytes_queued: i64,
    pub bytes_read: i64,
    pub bytes_written: i64,
    pub flow_files_received: i64,
    pub bytes_received: i64,
    pub flow_files_sent: i64,
    pub bytes_sent: i64,
    pub flow_files_transferred: i64,
    pub bytes_transferred: i64,
    pub active_thread_count: i64,
    pub terminated_thread_count: i64,
    /// Child groups, present when the status was requested recursively.
    pub process_group_status_snapshots: Vec<ProcessGroupStatusSnapshotEntity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessGroupStatusSnapshotEntity {
    pub id: String,
    pub process_group_status_snapshot: Option<ProcessGroupStatusSnapshotDto>,
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-
// System diagnostics

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemDiagnosticsEntity {
    pub system_diagnostics: SystemDiagnosticsDto,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemDiagnosticsDto {
    pub aggregate_snapshot: Option<SystemDiagnosticsSnapshotDto>,
    pub node_snapshots: Vec<NodeSystemDiagnosticsSnapshotDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeSystemDiagnosticsSnapshotDto {
    pub node_id: String,
    pub address: String,
    pub api_port: i32,
    pub snapshot: Option<SystemDiagnosticsSnapshotDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemDiagnosticsSnapshotDto {
    pub total_non_heap_bytes: i64,
    pub used_non_heap_bytes: i64,
    pub free_non_heap_bytes: i64,
    pub max_non_heap_bytes: i64,
    pub total_heap_bytes: i64,
    pub used_heap_bytes: i64,
    pub free_heap_bytes: i64,
    pub max_heap_bytes: i64,
    pub available_processors: i64,
    pub processor_load_average: f64,
    pub total_threads: i64,
    pub daemon_threads: i64,
    pub uptime: String,
    pub flow_file_repository_storage_usage: Option<StorageUsageDto>,
    pub content_repository_storage_usage: Vec<StorageUsageDto>,
    pub provenance_repository_storage_usage: Vec<StorageUsageDto>,
    pub garbage_collection: Vec<GarbageCollectionDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageUsageDto {
    pub identifier: Option<String>,
    pub free_space_bytes: i64,
    pub total_space_bytes: i64,
    pub used_space_bytes: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GarbageCollectionDto {
    pub name: String,
    pub collection_count: i64,
    pub collection_millis: i64,
}
