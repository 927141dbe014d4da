//! Metric naming and label schemas shared by all collectors.

/// Namespace token of every metric the exporter publishes.
pub const METRIC_NAME_PREFIX: &str = "nifi_";

/// Appended to a resource prefix to name the collector's own latency gauge.
pub const SCRAPE_DURATION_SUFFIX: &str = "scrape_collector_duration_seconds";

/// Root process group alias understood by the REST API.
pub const ROOT_PROCESS_GROUP_ID: &str = "root";

pub const NODE_ID: &str = "node_id";

pub const CONNECTION_LABELS: &[&str] = &[
    NODE_ID,
    "connection_name",
    "connection_id",
    "group_id",
    "source_name",
    "destination_name",
];

pub const COUNTER_LABELS: &[&str] = &[NODE_ID, "id", "context", "name"];

pub const PROCESS_GROUP_LABELS: &[&str] = &[NODE_ID, "group_id", "group_name"];

pub const SYSTEM_LABELS: &[&str] = &[NODE_ID];

pub const REPOSITORY_LABELS: &[&str] = &[NODE_ID, "repository", "identifier"];

pub const GARBAGE_COLLECTOR_LABELS: &[&str] = &[NODE_ID, "name"];

/// Every variable label name any collector may use. Constant labels must not
/// reuse one of them.
pub fn variable_label_names() -> impl Iterator<Item = &'static str> {
    [
        CONNECTION_LABELS,
        COUNTER_LABELS,
        PROCESS_GROUP_LABELS,
        SYSTEM_LABELS,
        REPOSITORY_LABELS,
        GARBAGE_COLLECTOR_LABELS,
    ]
    .into_iter()
    .flatten()
    .copied()
}

/// `[a-zA-Z_][a-zA-Z0-9_]*`, without the reserved `__` prefix.
pub fn is_valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    let leading = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    leading && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && !name.starts_with("__")
}

/// `<prefix><resource>_`
pub fn resource_prefix(resource: &str) -> String {
    format!("{METRIC_NAME_PREFIX}{resource}_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_names() {
        assert!(is_valid_label_name("environment"));
        assert!(is_valid_label_name("_cluster2"));
        assert!(!is_valid_label_name(""));
        assert!(!is_valid_label_name("2fast"));
        assert!(!is_valid_label_name("data-center"));
        assert!(!is_valid_label_name("__name__"));
    }

    #[test]
    fn node_id_leads_every_schema() {
        for schema in [
            CONNECTION_LABELS,
            COUNTER_LABELS,
            PROCESS_GROUP_LABELS,
            SYSTEM_LABELS,
            REPOSITORY_LABELS,
            GARBAGE_COLLECTOR_LABELS,
        ] {
            assert_eq!(schema[0], NODE_ID);
        }
    }
}
