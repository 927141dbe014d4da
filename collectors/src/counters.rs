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
        MetricKind,
    },
    labels::COUNTER_LABELS,
    resolve::resolve,
    sink::{
        Emission,
        Sink,
    },
};
use nifi_client::{
    CounterQuery,
    CountersDto,
    NifiApi,
};
use std::sync::Arc;

/// User-defined processor counters.
pub struct CountersCollector {
    api: Arc<dyn NifiApi>,
    core: CollectorCore,
    query: CounterQuery,
    total: Arc<Descriptor>,
}

impl CountersCollector {
    pub fn new(api: Arc<dyn NifiApi>, target: impl Into<String>, const_labels: &ConstLabels) -> Self {
        let core = CollectorCore::new(
            "counter",
            "Duration of counter collector scrape.",
            target.into(),
            const_labels,
        );
        let total = Descriptor::new(
            format!("{}total", core.prefix()),
            "The value of the counter.",
            MetricKind::Counter,
            COUNTER_LABELS,
            const_labels,
        );

        Self {
            api,
            core,
            query: CounterQuery {
                nodewise: true,
                cluster_node_id: None,
            },
            total,
        }
    }

    fn emit(&self, counters: CountersDto, sink: &dyn Sink) {
        for (node_id, snapshot) in resolve(&counters) {
            for counter in &snapshot.counters {
                let labels = vec![
                    node_id.to_string(),
                    counter.id.clone(),
                    counter.context.clone(),
                    counter.name.clone(),
                ];
                sink.emit(Emission::Sample(self.total.sample(counter.value_count as f64, labels)));
            }
        }
    }
}

impl Collector for CountersCollector {
    fn describe(&self) -> Vec<Arc<Descriptor>> {
        vec![Arc::clone(&self.total), Arc::clone(self.core.duration_descriptor())]
    }

    fn collect<'a>(&'a self, ctx: &'a ScrapeContext, sink: &'a dyn Sink) -> CollectFuture<'a> {
        Box::pin(async move {
            self.core
                .cycle(
                    &self.total,
                    ctx,
                    sink,
                    self.api.counters(&self.query),
                    |counters, sink| self.emit(counters, sink),
                )
                .await
        })
    }

    fn name(&self) -> &'static str {
        "counters"
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
        CounterDto,
        CountersSnapshotDto,
        NodeCountersSnapshotDto,
    };
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn hits(value_count: i64) -> CountersSnapshotDto {
        CountersSnapshotDto {
            generated: Some("12:00:00 UTC".to_string()),
            counters: vec![CounterDto {
                id: "c1".to_string(),
                context: "ctx".to_string(),
                name: "hits".to_string(),
                value: value_count.to_string(),
                value_count,
            }],
        }
    }

    async fn scrape(fake: &Arc<FakeNifi>) -> Gathered {
        let api: Arc<dyn NifiApi> = fake.clone();
        let collector = CountersCollector::new(api, "http://nifi", &ConstLabels::new());
        let ctx = ScrapeContext::with_timeout(Duration::from_secs(5));
        let (sink, receiver) = crate::sink::channel();
        collector.collect(&ctx, &sink).await;
        drop(sink);
        Gathered::from_receiver(receiver)
    }

    #[tokio::test]
    async fn aggregate_counter() {
        let fake = Arc::new(FakeNifi::with_counters(CountersDto {
            aggregate_snapshot: Some(hits(42)),
            node_snapshots: vec![],
        }));
        let gathered = scrape(&fake).await;

        let totals: Vec<_> = gathered.named("nifi_counter_total").collect();
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].label_values, vec!["aggregate", "c1", "ctx", "hits"]);
        assert_eq!(totals[0].value, 42.0);
        assert_eq!(totals[0].descriptor.kind(), MetricKind::Counter);
        assert_eq!(gathered.named("nifi_counter_scrape_collector_duration_seconds").count(), 1);
    }

    #[tokio::test]
    async fn requests_a_node_wise_view() {
        let fake = Arc::new(FakeNifi::default());
        scrape(&fake).await;
        assert_eq!(fake.requests(), vec!["counters nodewise=true cluster_node_id="]);
    }

    #[tokio::test]
    async fn per_node_counters() {
        let fake = Arc::new(FakeNifi::with_counters(CountersDto {
            aggregate_snapshot: Some(hits(10)),
            node_snapshots: vec![
                NodeCountersSnapshotDto {
                    node_id: "n1".to_string(),
                    snapshot: Some(hits(3)),
                    ..Default::default()
                },
                NodeCountersSnapshotDto {
                    node_id: "n2".to_string(),
                    snapshot: Some(hits(7)),
                    ..Default::default()
                },
            ],
        }));
        let gathered = scrape(&fake).await;

        let values: Vec<_> = gathered
            .named("nifi_counter_total")
            .map(|sample| (sample.label_values[0].as_str(), sample.value))
            .collect();
        assert_eq!(values, vec![("n1", 3.0), ("n2", 7.0)]);
    }

    #[tokio::test]
    async fn failure_is_the_only_emission() {
        let fake = Arc::new(FakeNifi::failing());
        let gathered = scrape(&fake).await;

        assert!(gathered.samples.is_empty());
        assert_eq!(gathered.failures.len(), 1);
        assert_eq!(gathered.failures[0].descriptor.name(), "nifi_counter_total");
    }

    #[tokio::test]
    async fn no_counters_still_reports_the_duration() {
        let fake = Arc::new(FakeNifi::default());
        let gathered = scrape(&fake).await;

        assert_eq!(gathered.samples.len(), 1);
        assert!(gathered.samples[0].label_values.is_empty());
        assert!(gathered.samples[0].value >= 0.0);
    }
}
