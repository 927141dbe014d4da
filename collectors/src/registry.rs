use crate::{
    collector::{
        CollectFuture,
        Collector,
        ScrapeContext,
    },
    connections::ConnectionsCollector,
    counters::CountersCollector,
    descriptor::Descriptor,
    process_groups::ProcessGroupsCollector,
    sink::{
        self,
        Gathered,
        Sink,
    },
    system_diagnostics::SystemDiagnosticsCollector,
};
use futures::future;
use std::sync::Arc;

/// The resource kinds the exporter knows how to scrape.
pub enum NifiCollector {
    Connections(ConnectionsCollector),
    Counters(CountersCollector),
    ProcessGroups(ProcessGroupsCollector),
    SystemDiagnostics(SystemDiagnosticsCollector),
}

impl NifiCollector {
    fn inner(&self) -> &dyn Collector {
        match self {
            NifiCollector::Connections(c) => c,
            NifiCollector::Counters(c) => c,
            NifiCollector::ProcessGroups(c) => c,
            NifiCollector::SystemDiagnostics(c) => c,
        }
    }
}

impl Collector for NifiCollector {
    fn describe(&self) -> Vec<Arc<Descriptor>> {
        self.inner().describe()
    }

    fn collect<'a>(&'a self, ctx: &'a ScrapeContext, sink: &'a dyn Sink) -> CollectFuture<'a> {
        self.inner().collect(ctx, sink)
    }

    fn name(&self) -> &'static str {
        self.inner().name()
    }
}

impl From<ConnectionsCollector> for NifiCollector {
    fn from(collector: ConnectionsCollector) -> Self {
        NifiCollector::Connections(collector)
    }
}

impl From<CountersCollector> for NifiCollector {
    fn from(collector: CountersCollector) -> Self {
        NifiCollector::Counters(collector)
    }
}

impl From<ProcessGroupsCollector> for NifiCollector {
    fn from(collector: ProcessGroupsCollector) -> Self {
        NifiCollector::ProcessGroups(collector)
    }
}

impl From<SystemDiagnosticsCollector> for NifiCollector {
    fn from(collector: SystemDiagnosticsCollector) -> Self {
        NifiCollector::SystemDiagnostics(collector)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum RegistryError {
    #[error("{name} is already registered with the same constant labels")]
    Duplicate { name: String },
    #[error("{name} is already registered with a different help, type or label schema")]
    Inconsistent { name: String },
}

/// All collectors served by one exporter, possibly for several NiFi instances.
///
/// A metric may be registered several times as long as the schema is identical
/// and the constant labels tell the instances apart.
#[derive(Default)]
pub struct Registry {
    collectors: Vec<NifiCollector>,
    descriptors: Vec<Arc<Descriptor>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, collector: impl Into<NifiCollector>) -> Result<(), RegistryError> {
        let collector = collector.into();
        let described = collector.describe();

        for descriptor in &described {
            for known in self.descriptors.iter().filter(|known| known.name() == descriptor.name()) {
                if !known.same_schema(descriptor) {
                    return Err(RegistryError::Inconsistent {
                        name: descriptor.name().to_string(),
                    });
                }
                if known.const_labels() == descriptor.const_labels() {
                    return Err(RegistryError::Duplicate {
                        name: descriptor.name().to_string(),
                    });
                }
            }
        }

        debug!(collector = collector.name(), metrics = described.len(), "registered collector");
        self.descriptors.extend(described);
        self.collectors.push(collector);
        Ok(())
    }

    /// Every registered descriptor, in registration order.
    pub fn describe(&self) -> &[Arc<Descriptor>] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }

    /// Runs every collector concurrently and collects what they emitted.
    pub async fn gather(&self, ctx: &ScrapeContext) -> Gathered {
        let (sender, receiver) = sink::channel();
        future::join_all(self.collectors.iter().map(|collector| collector.collect(ctx, &sender))).await;
        drop(sender);
        Gathered::from_receiver(receiver)
    }
}
