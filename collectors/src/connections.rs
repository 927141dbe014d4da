use crate::{
    collector::{
        CollectFuture,
        Collector,
        CollectorCore,
        ScrapeContext,
    },
    descriptor::{
        ConstLabels,
        Descriptor,
        Field,
        FieldSet,
        MetricKind,
    },
    labels::CONNECTION_LABELS,
    resolve::resolve,
    sink::Sink,
};
use nifi_client::{
    ConnectionEntity,
    ConnectionStatusSnapshotDto,
    NifiApi,
};
use std::sync::Arc;

const FIELDS: &[Field<ConnectionStatusSnapshotDto>; 8] = &[
    Field {
        name: "flow_files_queued",
        help: "The number of FlowFiles that are currently queued in the connection",
        kind: MetricKind::Gauge,
        value: |s| Some(s.flow_files_queued as f64),
    },
    Field {
        name: "bytes_queued",
        help: "The size of the FlowFiles that are currently queued in the connection",
        kind: MetricKind::Gauge,
        value: |s| Some(s.bytes_queued as f64),
    },
    Field {
        name: "flow_files_in",
        help: "The number of FlowFiles that have come into the connection in the last 5 minutes",
        kind: MetricKind::Gauge,
        value: |s| Some(s.flow_files_in as f64),
    },
    Field {
        name: "bytes_in",
        help: "The size of the FlowFiles that have come into the connection in the last 5 minutes",
        kind: MetricKind::Gauge,
        value: |s| Some(s.bytes_in as f64),
    },
    Field {
        name: "flow_files_out",
        help: "The number of FlowFiles that have left the connection in the last 5 minutes",
        kind: MetricKind::Gauge,
        value: |s| Some(s.flow_files_out as f64),
    },
    Field {
        name: "bytes_out",
        help: "The size of the FlowFiles that have left the connection in the last 5 minutes",
        kind: MetricKind::Gauge,
        value: |s| Some(s.bytes_out as f64),
    },
    Field {
        name: "percent_use_count",
        help: "Queued FlowFile count as a percentage of the back pressure object threshold",
        kind: MetricKind::Gauge,
        value: |s| s.percent_use_count.map(|v| v as f64),
    },
    Field {
        name: "percent_use_bytes",
        help: "Queued FlowFile size as a percentage of the back pressure data size threshold",
        kind: MetricKind::Gauge,
        value: |s| s.percent_use_bytes.map(|v| v as f64),
    },
];

/// Queue statistics of every connection below a process group.
pub struct ConnectionsCollector {
    api: Arc<dyn NifiApi>,
    core: CollectorCore,
    process_group_id: String,
    fields: FieldSet<ConnectionStatusSnapshotDto>,
    flow_files_queued: Arc<Descriptor>,
}

impl ConnectionsCollector {
    pub fn new(
        api: Arc<dyn NifiApi>,
        target: impl Into<String>,
        process_group_id: impl Into<String>,
        const_labels: &ConstLabels,
    ) -> Self {
        let core = CollectorCore::new(
            "conn",
            "Duration of connections collector scrape.",
            target.into(),
            const_labels,
        );
        let fields = FieldSet::new(&core.prefix(), FIELDS, CONNECTION_LABELS, const_labels);
        let flow_files_queued = Arc::clone(fields.primary());

        Self {
            api,
            core,
            process_group_id: process_group_id.into(),
            fields,
            flow_files_queued,
        }
    }

    fn emit(&self, entities: Vec<ConnectionEntity>, sink: &dyn Sink) {
        for entity in &entities {
            let nodes = resolve(entity);
            if nodes.is_empty() {
                trace!(connection = %entity.id, "connection has no status snapshot yet");
            }
            for (node_id, snapshot) in nodes {
                let labels = connection_labels(node_id.as_label(), entity, snapshot);
                self.fields.emit(sink, snapshot, &labels);
            }
        }
    }
}

/// Label values in [`CONNECTION_LABELS`] order. Snapshot fields are preferred,
/// the entity's status fills in what a snapshot leaves empty.
fn connection_labels(node_id: &str, entity: &ConnectionEntity, snapshot: &ConnectionStatusSnapshotDto) -> Vec<String> {
    let status = entity.status.as_ref();
    let pick = |own: &str, fallback: Option<&str>| {
        if own.is_empty() {
            fallback.unwrap_or_default().to_string()
        } else {
            own.to_string()
        }
    };

    vec![
        node_id.to_string(),
        pick(&snapshot.name, status.map(|s| s.name.as_str())),
        pick(&snapshot.id, Some(entity.id.as_str())),
        pick(&snapshot.group_id, status.map(|s| s.group_id.as_str())),
        pick(&snapshot.source_name, status.map(|s| s.source_name.as_str())),
        pick(&snapshot.destination_name, status.map(|s| s.destination_name.as_str())),
    ]
}

impl Collector for ConnectionsCollector {
    fn describe(&self) -> Vec<Arc<Descriptor>> {
        self.fields
            .descriptors()
            .chain([self.core.duration_descriptor()])
            .cloned()
            .collect()
    }

    fn collect<'a>(&'a self, ctx: &'a ScrapeContext, sink: &'a dyn Sink) -> CollectFuture<'a> {
        Box::pin(async move {
            self.core
                .cycle(
                    &self.flow_files_queued,
                    ctx,
                    sink,
                    self.api.connections(&self.process_group_id),
                    |entities, sink| self.emit(entities, sink),
                )
                .await
        })
    }

    fn name(&self) -> &'static str {
        "connections"
    }
}
