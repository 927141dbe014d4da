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
    labels::PROCESS_GROUP_LABELS,
    resolve::resolve,
    sink::Sink,
};
use nifi_client::{
    NifiApi,
    ProcessGroupStatusDto,
    ProcessGroupStatusSnapshotDto,
};
use std::sync::Arc;

macro_rules! gauge {
    ($name:literal, $field:ident, $help:literal) => {
        Field {
            name: $name,
            help: $help,
            kind: MetricKind::Gauge,
            value: |s: &ProcessGroupStatusSnapshotDto| Some(s.$field as f64),
        }
    };
}

const FIELDS: &[Field<ProcessGroupStatusSnapshotDto>; 16] = &[
    gauge!("flow_files_in", flow_files_in, "The number of FlowFiles that have come into this process group in the last 5 minutes"),
    gauge!("bytes_in", bytes_in, "The number of bytes that have come into this process group in the last 5 minutes"),
    gauge!("flow_files_out", flow_files_out, "The number of FlowFiles that have left this process group in the last 5 minutes"),
    gauge!("bytes_out", bytes_out, "The number of bytes that have left this process group in the last 5 minutes"),
    gauge!("flow_files_queued", flow_files_queued, "The number of FlowFiles queued in this process group"),
    gauge!("bytes_queued", bytes_queued, "The number of bytes queued in this process group"),
    gauge!("bytes_read", bytes_read, "The number of bytes read by components in this process group in the last 5 minutes"),
    gauge!("bytes_written", bytes_written, "The number of bytes written by components in this process group in the last 5 minutes"),
    gauge!("flow_files_received", flow_files_received, "The number of FlowFiles received from remote systems in the last 5 minutes"),
    gauge!("bytes_received", bytes_received, "The number of bytes received from remote systems in the last 5 minutes"),
    gauge!("flow_files_sent", flow_files_sent, "The number of FlowFiles sent to remote systems in the last 5 minutes"),
    gauge!("bytes_sent", bytes_sent, "The number of bytes sent to remote systems in the last 5 minutes"),
    gauge!("flow_files_transferred", flow_files_transferred, "The number of FlowFiles transferred within this process group in the last 5 minutes"),
    gauge!("bytes_transferred", bytes_transferred, "The number of bytes transferred within this process group in the last 5 minutes"),
    gauge!("active_threads", active_thread_count, "The number of active threads in this process group"),
    gauge!("terminated_threads", terminated_thread_count, "The number of terminated threads in this process group"),
];

/// Flow statistics of a process group and, recursively, of all its children.
pub struct ProcessGroupsCollector {
    api: Arc<dyn NifiApi>,
    core: CollectorCore,
    process_group_id: String,
    fields: FieldSet<ProcessGroupStatusSnapshotDto>,
    primary: Arc<Descriptor>,
}

impl ProcessGroupsCollector {
    pub fn new(
        api: Arc<dyn NifiApi>,
        target: impl Into<String>,
        process_group_id: impl Into<String>,
        const_labels: &ConstLabels,
    ) -> Self {
        let core = CollectorCore::new(
            "pg",
            "Duration of process group collector scrape.",
            target.into(),
            const_labels,
        );
        let fields = FieldSet::new(&core.prefix(), FIELDS, PROCESS_GROUP_LABELS, const_labels);
        let primary = Arc::clone(fields.primary());

        Self {
            api,
            core,
            process_group_id: process_group_id.into(),
            fields,
            primary,
        }
    }

    fn emit(&self, status: ProcessGroupStatusDto, sink: &dyn Sink) {
        for (node_id, root) in resolve(&status) {
            let mut pending = vec![root];
            while let Some(group) = pending.pop() {
                let labels = vec![node_id.to_string(), group.id.clone(), group.name.clone()];
                self.fields.emit(sink, group, &labels);

                pending.extend(
                    group
                        .process_group_status_snapshots
                        .iter()
                        .rev()
                        .filter_map(|child| child.process_group_status_snapshot.as_ref()),
                );
            }
        }
    }
}

impl Collector for ProcessGroupsCollector {
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
                    &self.primary,
                    ctx,
                    sink,
                    self.api.process_group_status(&self.process_group_id),
                    |status, sink| self.emit(status, sink),
                )
                .await
        })
    }

    fn name(&self) -> &'static str {
        "process_groups"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        sink::Gathered,
        testing::FakeNifi,
    };
    use nifi_client::{
        NodeProcessGroupStatusSnapshotDto,
        ProcessGroupStatusSnapshotEntity,
    };
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn group(id: &str, queued: i64, children: Vec<ProcessGroupStatusSnapshotDto>) -> ProcessGroupStatusSnapshotDto {
        ProcessGroupStatusSnapshotDto {
            id: id.to_string(),
            name: format!("{id} group"),
            flow_files_queued: queued,
            active_thread_count: 1,
            process_group_status_snapshots: children
                .into_iter()
                .map(|child| ProcessGroupStatusSnapshotEntity {
                    id: child.id.clone(),
                    process_group_status_snapshot: Some(child),
                })
                .collect(),
            ..Default::default()
        }
    }

    fn tree() -> ProcessGroupStatusSnapshotDto {
        group(
            "root",
            6,
            vec![group("ingest", 4, vec![group("parse", 3, vec![])]), group("egress", 2, vec![])],
        )
    }

    async fn scrape(status: ProcessGroupStatusDto) -> Gathered {
        let collector = ProcessGroupsCollector::new(
            Arc::new(FakeNifi::with_process_groups(status)),
            "http://nifi",
            "root",
            &ConstLabels::new(),
        );
        let ctx = ScrapeContext::with_timeout(Duration::from_secs(5));
        let (sink, receiver) = crate::sink::channel();
        collector.collect(&ctx, &sink).await;
        drop(sink);
        Gathered::from_receiver(receiver)
    }

    fn queued(gathered: &Gathered) -> Vec<(String, String, f64)> {
        gathered
            .named("nifi_pg_flow_files_queued")
            .map(|s| (s.label_values[0].clone(), s.label_values[1].clone(), s.value))
            .collect()
    }

    #[tokio::test]
    async fn walks_the_whole_tree() {
        let gathered = scrape(ProcessGroupStatusDto {
            id: "root".to_string(),
            aggregate_snapshot: Some(tree()),
            ..Default::default()
        })
        .await;

        let expected = [("root", 6.0), ("ingest", 4.0), ("parse", 3.0), ("egress", 2.0)]
            .map(|(id, value)| ("aggregate".to_string(), id.to_string(), value))
            .to_vec();
        assert_eq!(queued(&gathered), expected);

        let names: Vec<_> = gathered
            .named("nifi_pg_active_threads")
            .map(|s| s.label_values[2].as_str())
            .collect();
        assert_eq!(names, vec!["root group", "ingest group", "parse group", "egress group"]);
        assert_eq!(gathered.samples.len(), FIELDS.len() * 4 + 1);
    }

    #[tokio::test]
    async fn each_node_reports_its_own_tree() {
        let node = |node_id: &str| NodeProcessGroupStatusSnapshotDto {
            node_id: node_id.to_string(),
            status_snapshot: Some(group("root", 1, vec![group("child", 1, vec![])])),
            ..Default::default()
        };
        let gathered = scrape(ProcessGroupStatusDto {
            aggregate_snapshot: Some(group("root", 2, vec![])),
            node_snapshots: vec![node("n1"), node("n2")],
            ..Default::default()
        })
        .await;

        let nodes: Vec<_> = queued(&gathered).into_iter().map(|(node, id, _)| format!("{node}/{id}")).collect();
        assert_eq!(nodes, vec!["n1/root", "n1/child", "n2/root", "n2/child"]);
    }

    #[tokio::test]
    async fn failure_is_reported_against_the_first_field() {
        let collector = ProcessGroupsCollector::new(
            Arc::new(FakeNifi::failing()),
            "http://nifi",
            "root",
            &ConstLabels::new(),
        );
        let ctx = ScrapeContext::with_timeout(Duration::from_secs(5));
        let (sink, receiver) = crate::sink::channel();
        collector.collect(&ctx, &sink).await;
        drop(sink);

        let gathered = Gathered::from_receiver(receiver);
        assert!(gathered.samples.is_empty());
        assert_eq!(gathered.failures.len(), 1);
        assert_eq!(gathered.failures[0].descriptor.name(), "nifi_pg_flow_files_in");
    }
}
