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
    labels::{
        GARBAGE_COLLECTOR_LABELS,
        REPOSITORY_LABELS,
        SYSTEM_LABELS,
    },
    resolve::resolve,
    sink::Sink,
};
use nifi_client::{
    GarbageCollectionDto,
    NifiApi,
    StorageUsageDto,
    SystemDiagnosticsDto,
    SystemDiagnosticsSnapshotDto,
};
use std::sync::Arc;

macro_rules! field {
    ($kind:ident, $snapshot:ty, $name:literal, $field:ident, $help:literal) => {
        Field {
            name: $name,
            help: $help,
            kind: MetricKind::$kind,
            value: |s: &$snapshot| Some(s.$field as f64),
        }
    };
}

const SYSTEM_FIELDS: &[Field<SystemDiagnosticsSnapshotDto>; 12] = &[
    field!(Gauge, SystemDiagnosticsSnapshotDto, "heap_used_bytes", used_heap_bytes, "The number of bytes of JVM heap in use"),
    field!(Gauge, SystemDiagnosticsSnapshotDto, "heap_free_bytes", free_heap_bytes, "The number of bytes of JVM heap that are free"),
    field!(Gauge, SystemDiagnosticsSnapshotDto, "heap_max_bytes", max_heap_bytes, "The maximum number of bytes the JVM heap can grow to"),
    field!(Gauge, SystemDiagnosticsSnapshotDto, "heap_total_bytes", total_heap_bytes, "The number of bytes of JVM heap currently committed"),
    field!(Gauge, SystemDiagnosticsSnapshotDto, "non_heap_used_bytes", used_non_heap_bytes, "The number of bytes of JVM non-heap memory in use"),
    field!(Gauge, SystemDiagnosticsSnapshotDto, "non_heap_free_bytes", free_non_heap_bytes, "The number of bytes of JVM non-heap memory that are free"),
    field!(Gauge, SystemDiagnosticsSnapshotDto, "non_heap_max_bytes", max_non_heap_bytes, "The maximum number of bytes of JVM non-heap memory"),
    field!(Gauge, SystemDiagnosticsSnapshotDto, "non_heap_total_bytes", total_non_heap_bytes, "The number of bytes of JVM non-heap memory currently committed"),
    field!(Gauge, SystemDiagnosticsSnapshotDto, "available_processors", available_processors, "The number of processors available to the JVM"),
    field!(Gauge, SystemDiagnosticsSnapshotDto, "processor_load_average", processor_load_average, "The system load average over the last minute"),
    field!(Gauge, SystemDiagnosticsSnapshotDto, "total_threads", total_threads, "The number of live JVM threads"),
    field!(Gauge, SystemDiagnosticsSnapshotDto, "daemon_threads", daemon_threads, "The number of live JVM daemon threads"),
];

const REPOSITORY_FIELDS: &[Field<StorageUsageDto>; 3] = &[
    field!(Gauge, StorageUsageDto, "repository_used_bytes", used_space_bytes, "The number of bytes used on the repository storage"),
    field!(Gauge, StorageUsageDto, "repository_free_bytes", free_space_bytes, "The number of bytes free on the repository storage"),
    field!(Gauge, StorageUsageDto, "repository_total_bytes", total_space_bytes, "The capacity of the repository storage in bytes"),
];

const GARBAGE_COLLECTOR_FIELDS: &[Field<GarbageCollectionDto>; 2] = &[
    field!(Counter, GarbageCollectionDto, "gc_collections_total", collection_count, "The number of garbage collections run by this collector"),
    field!(Counter, GarbageCollectionDto, "gc_time_millis_total", collection_millis, "The time spent in garbage collection by this collector in milliseconds"),
];

/// JVM, repository storage and garbage collector figures of every node.
pub struct SystemDiagnosticsCollector {
    api: Arc<dyn NifiApi>,
    core: CollectorCore,
    system: FieldSet<SystemDiagnosticsSnapshotDto>,
    repositories: FieldSet<StorageUsageDto>,
    garbage_collectors: FieldSet<GarbageCollectionDto>,
    primary: Arc<Descriptor>,
}

impl SystemDiagnosticsCollector {
    pub fn new(api: Arc<dyn NifiApi>, target: impl Into<String>, const_labels: &ConstLabels) -> Self {
        let core = CollectorCore::new(
            "sysdiag",
            "Duration of system diagnostics collector scrape.",
            target.into(),
            const_labels,
        );
        let prefix = core.prefix();
        let system = FieldSet::new(&prefix, SYSTEM_FIELDS, SYSTEM_LABELS, const_labels);
        let repositories = FieldSet::new(&prefix, REPOSITORY_FIELDS, REPOSITORY_LABELS, const_labels);
        let garbage_collectors = FieldSet::new(&prefix, GARBAGE_COLLECTOR_FIELDS, GARBAGE_COLLECTOR_LABELS, const_labels);
        let primary = Arc::clone(system.primary());

        Self {
            api,
            core,
            system,
            repositories,
            garbage_collectors,
            primary,
        }
    }

    fn emit(&self, diagnostics: SystemDiagnosticsDto, sink: &dyn Sink) {
        for (node_id, snapshot) in resolve(&diagnostics) {
            let node = node_id.to_string();
            self.system.emit(sink, snapshot, &[node.clone()]);

            let repositories = snapshot
                .flow_file_repository_storage_usage
                .iter()
                .map(|usage| ("flowfile", usage))
                .chain(snapshot.content_repository_storage_usage.iter().map(|usage| ("content", usage)))
                .chain(snapshot.provenance_repository_storage_usage.iter().map(|usage| ("provenance", usage)));
            for (repository, usage) in repositories {
                let labels = [
                    node.clone(),
                    repository.to_string(),
                    usage.identifier.clone().unwrap_or_default(),
                ];
                self.repositories.emit(sink, usage, &labels);
            }

            for gc in &snapshot.garbage_collection {
                self.garbage_collectors.emit(sink, gc, &[node.clone(), gc.name.clone()]);
            }
        }
    }
}

impl Collector for SystemDiagnosticsCollector {
    fn describe(&self) -> Vec<Arc<Descriptor>> {
        self.system
            .descriptors()
            .chain(self.repositories.descriptors())
            .chain(self.garbage_collectors.descriptors())
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
                    self.api.system_diagnostics(),
                    |diagnostics, sink| self.emit(diagnostics, sink),
                )
                .await
        })
    }

    fn name(&self) -> &'static str {
        "system_diagnostics"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        sink::Gathered,
        testing::FakeNifi,
    };
    use nifi_client::NodeSystemDiagnosticsSnapshotDto;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn diagnostics() -> SystemDiagnosticsSnapshotDto {
        SystemDiagnosticsSnapshotDto {
            used_heap_bytes: 512,
            max_heap_bytes: 2048,
            available_processors: 4,
            processor_load_average: 1.5,
            flow_file_repository_storage_usage: Some(StorageUsageDto {
                identifier: None,
                used_space_bytes: 10,
                ..Default::default()
            }),
            content_repository_storage_usage: vec![StorageUsageDto {
                identifier: Some("default".to_string()),
                used_space_bytes: 20,
                ..Default::default()
            }],
            provenance_repository_storage_usage: vec![StorageUsageDto {
                identifier: Some("default".to_string()),
                used_space_bytes: 30,
                ..Default::default()
            }],
            garbage_collection: vec![GarbageCollectionDto {
                name: "G1 Young Generation".to_string(),
                collection_count: 17,
                collection_millis: 250,
            }],
            ..Default::default()
        }
    }

    async fn scrape(system: SystemDiagnosticsDto) -> Gathered {
        let collector =
            SystemDiagnosticsCollector::new(Arc::new(FakeNifi::with_system(system)), "http://nifi", &ConstLabels::new());
        let ctx = ScrapeContext::with_timeout(Duration::from_secs(5));
        let (sink, receiver) = crate::sink::channel();
        collector.collect(&ctx, &sink).await;
        drop(sink);
        Gathered::from_receiver(receiver)
    }

    #[tokio::test]
    async fn publishes_jvm_repository_and_gc_figures() {
        let gathered = scrape(SystemDiagnosticsDto {
            aggregate_snapshot: Some(diagnostics()),
            node_snapshots: vec![],
        })
        .await;

        let heap: Vec<_> = gathered.named("nifi_sysdiag_heap_used_bytes").collect();
        assert_eq!(heap.len(), 1);
        assert_eq!(heap[0].label_values, vec!["aggregate"]);
        assert_eq!(heap[0].value, 512.0);
        assert_eq!(gathered.named("nifi_sysdiag_processor_load_average").next().unwrap().value, 1.5);

        let repositories: Vec<_> = gathered
            .named("nifi_sysdiag_repository_used_bytes")
            .map(|s| (s.label_values.clone(), s.value))
            .collect();
        assert_eq!(
            repositories,
            vec![
                (vec!["aggregate".to_string(), "flowfile".to_string(), String::new()], 10.0),
                (vec!["aggregate".to_string(), "content".to_string(), "default".to_string()], 20.0),
                (vec!["aggregate".to_string(), "provenance".to_string(), "default".to_string()], 30.0),
            ]
        );

        let gc = gathered.named("nifi_sysdiag_gc_collections_total").next().unwrap();
        assert_eq!(gc.label_values, vec!["aggregate", "G1 Young Generation"]);
        assert_eq!(gc.value, 17.0);
        assert_eq!(gc.descriptor.kind(), MetricKind::Counter);
        assert_eq!(gathered.named("nifi_sysdiag_gc_time_millis_total").next().unwrap().value, 250.0);
    }

    #[tokio::test]
    async fn one_series_per_node() {
        let node = |node_id: &str| NodeSystemDiagnosticsSnapshotDto {
            node_id: node_id.to_string(),
            snapshot: Some(diagnostics()),
            ..Default::default()
        };
        let gathered = scrape(SystemDiagnosticsDto {
            aggregate_snapshot: Some(diagnostics()),
            node_snapshots: vec![node("n1"), node("n2")],
        })
        .await;

        let nodes: Vec<_> = gathered
            .named("nifi_sysdiag_total_threads")
            .map(|s| s.label_values[0].as_str())
            .collect();
        assert_eq!(nodes, vec!["n1", "n2"]);
        let per_node = SYSTEM_FIELDS.len() + 3 * REPOSITORY_FIELDS.len() + GARBAGE_COLLECTOR_FIELDS.len();
        assert_eq!(gathered.samples.len(), per_node * 2 + 1);
    }

    #[test]
    fn describe_covers_all_three_schemas() {
        let collector =
            SystemDiagnosticsCollector::new(Arc::new(FakeNifi::default()), "http://nifi", &ConstLabels::new());
        let descriptors = collector.describe();

        assert_eq!(
            descriptors.len(),
            SYSTEM_FIELDS.len() + REPOSITORY_FIELDS.len() + GARBAGE_COLLECTOR_FIELDS.len() + 1
        );
        let gc = descriptors
            .iter()
            .find(|d| d.name() == "nifi_sysdiag_gc_time_millis_total")
            .unwrap();
        assert_eq!(gc.variable_labels(), GARBAGE_COLLECTOR_LABELS);
    }
}
