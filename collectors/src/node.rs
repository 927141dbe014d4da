/// Label value used for samples that describe the whole cluster.
pub const AGGREGATE_NODE_ID: &str = "aggregate";

/// Key of a resolved status snapshot.
///
/// `Aggregate` is the cluster-wide (or standalone) view, `Node` a single
/// cluster member. NiFi node identifiers are UUIDs, so a real node never
/// renders as [`AGGREGATE_NODE_ID`]; collectors rely on that when they use
/// [`NodeId::as_label`] as the `node_id` label value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeId {
    Aggregate,
    Node(String),
}

impl NodeId {
    pub fn as_label(&self) -> &str {
        match self {
            NodeId::Aggregate => AGGREGATE_NODE_ID,
            NodeId::Node(id) => id,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self, NodeId::Aggregate)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}
