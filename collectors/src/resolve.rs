//! Reconciles cluster-wide and per-node status representations.
//!
//! A clustered NiFi reports one snapshot per node and usually an aggregate over
//! all of them; a standalone instance only reports the aggregate. Per-node data
//! wins when both are present: the aggregate can be recomputed from it by the
//! monitoring backend, while publishing both would double count.

use crate::node::NodeId;
use nifi_client::{
    ConnectionEntity,
    ConnectionStatusSnapshotDto,
    CountersDto,
    CountersSnapshotDto,
    ProcessGroupStatusDto,
    ProcessGroupStatusSnapshotDto,
    SystemDiagnosticsDto,
    SystemDiagnosticsSnapshotDto,
};
use std::collections::BTreeMap;

/// An upstream entity carrying aggregate and/or per-node status snapshots.
pub trait StatusSnapshots {
    type Snapshot;

    fn aggregate_snapshot(&self) -> Option<&Self::Snapshot>;

    /// `(node id, snapshot)` for every node that reported data.
    fn node_snapshots(&self) -> Vec<(&str, &Self::Snapshot)>;
}

/// Maps node identifiers to the snapshots to publish for `entity`.
///
/// The result holds either node entries or a single [`NodeId::Aggregate`]
/// entry, never both. It is empty when the entity has no status data yet.
pub fn resolve<E>(entity: &E) -> BTreeMap<NodeId, &E::Snapshot>
where
    E: StatusSnapshots + ?Sized,
{
    let nodes = entity.node_snapshots();
    if !nodes.is_empty() {
        return nodes
            .into_iter()
            .map(|(node_id, snapshot)| (NodeId::Node(node_id.to_string()), snapshot))
            .collect();
    }

    entity
        .aggregate_snapshot()
        .map(|snapshot| (NodeId::Aggregate, snapshot))
        .into_iter()
        .collect()
}

impl StatusSnapshots for ConnectionEntity {
    type Snapshot = ConnectionStatusSnapshotDto;

    fn aggregate_snapshot(&self) -> Option<&Self::Snapshot> {
        self.status.as_ref()?.aggregate_snapshot.as_ref()
    }

    fn node_snapshots(&self) -> Vec<(&str, &Self::Snapshot)> {
        self.status
            .iter()
            .flat_map(|status| &status.node_snapshots)
            .filter_map(|node| Some((node.node_id.as_str(), node.status_snapshot.as_ref()?)))
            .collect()
    }
}

impl StatusSnapshots for CountersDto {
    type Snapshot = CountersSnapshotDto;

    fn aggregate_snapshot(&self) -> Option<&Self::Snapshot> {
        self.aggregate_snapshot.as_ref()
    }

    fn node_snapshots(&self) -> Vec<(&str, &Self::Snapshot)> {
        self.node_snapshots
            .iter()
            .filter_map(|node| Some((node.node_id.as_str(), node.snapshot.as_ref()?)))
            .collect()
    }
}

impl StatusSnapshots for ProcessGroupStatusDto {
    type Snapshot = ProcessGroupStatusSnapshotDto;

    fn aggregate_snapshot(&self) -> Option<&Self::Snapshot> {
        self.aggregate_snapshot.as_ref()
    }

    fn node_snapshots(&self) -> Vec<(&str, &Self::Snapshot)> {
        self.node_snapshots
            .iter()
            .filter_map(|node| Some((node.node_id.as_str(), node.status_snapshot.as_ref()?)))
            .collect()
    }
}

impl StatusSnapshots for SystemDiagnosticsDto {
    type Snapshot = SystemDiagnosticsSnapshotDto;

    fn aggregate_snapshot(&self) -> Option<&Self::Snapshot> {
        self.aggregate_snapshot.as_ref()
    }

    fn node_snapshots(&self) -> Vec<(&str, &Self::Snapshot)> {
        self.node_snapshots
            .iter()
            .filter_map(|node| Some((node.node_id.as_str(), node.snapshot.as_ref()?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nifi_client::{
        ConnectionStatusDto,
        NodeConnectionStatusSnapshotDto,
        NodeCountersSnapshotDto,
    };
    use pretty_assertions::assert_eq;

    fn snapshot(queued: i64) -> ConnectionStatusSnapshotDto {
        ConnectionStatusSnapshotDto {
            flow_files_queued: queued,
            ..Default::default()
        }
    }

    fn node(node_id: &str, queued: i64) -> NodeConnectionStatusSnapshotDto {
        NodeConnectionStatusSnapshotDto {
            node_id: node_id.to_string(),
            status_snapshot: Some(snapshot(queued)),
            ..Default::default()
        }
    }

    fn connection(
        aggregate: Option<ConnectionStatusSnapshotDto>,
        nodes: Vec<NodeConnectionStatusSnapshotDto>,
    ) -> ConnectionEntity {
        ConnectionEntity {
            id: "conn".to_string(),
            status: Some(ConnectionStatusDto {
                aggregate_snapshot: aggregate,
                node_snapshots: nodes,
                ..Default::default()
            }),
        }
    }

    fn queued(resolved: &BTreeMap<NodeId, &ConnectionStatusSnapshotDto>) -> Vec<(String, i64)> {
        resolved
            .iter()
            .map(|(node, snapshot)| (node.to_string(), snapshot.flow_files_queued))
            .collect()
    }

    #[test]
    fn per_node_snapshots_are_keyed_by_node() {
        let entity = connection(None, vec![node("n1", 5), node("n2", 12)]);

        let resolved = resolve(&entity);
        assert_eq!(queued(&resolved), vec![("n1".to_string(), 5), ("n2".to_string(), 12)]);
        assert!(!resolved.contains_key(&NodeId::Aggregate));
    }

    #[test]
    fn aggregate_only_uses_the_sentinel() {
        let entity = connection(Some(snapshot(9)), vec![]);

        let resolved = resolve(&entity);
        assert_eq!(queued(&resolved), vec![("aggregate".to_string(), 9)]);
    }

    #[test]
    fn per_node_data_wins_over_the_aggregate() {
        let entity = connection(Some(snapshot(17)), vec![node("n1", 5), node("n2", 12)]);

        let resolved = resolve(&entity);
        assert_eq!(resolved.len(), 2);
        assert!(resolved.keys().all(|node| !node.is_aggregate()));
    }

    #[test]
    fn no_status_resolves_to_nothing() {
        let missing_status = ConnectionEntity {
            id: "new".to_string(),
            status: None,
        };
        assert!(resolve(&missing_status).is_empty());
        assert!(resolve(&connection(None, vec![])).is_empty());
    }

    #[test]
    fn nodes_without_a_snapshot_fall_back_to_the_aggregate() {
        let empty_node = NodeConnectionStatusSnapshotDto {
            node_id: "n1".to_string(),
            status_snapshot: None,
            ..Default::default()
        };
        let entity = connection(Some(snapshot(4)), vec![empty_node]);

        assert_eq!(queued(&resolve(&entity)), vec![("aggregate".to_string(), 4)]);
    }

    #[test]
    fn counters_resolve_like_any_other_entity() {
        let counters = CountersDto {
            aggregate_snapshot: Some(CountersSnapshotDto::default()),
            node_snapshots: vec![NodeCountersSnapshotDto {
                node_id: "n1".to_string(),
                snapshot: Some(CountersSnapshotDto::default()),
                ..Default::default()
            }],
        };

        let keys: Vec<_> = resolve(&counters).into_keys().collect();
        assert_eq!(keys, vec![NodeId::Node("n1".to_string())]);
    }
}
