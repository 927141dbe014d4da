use crate::{
    descriptor::{
        ConstLabels,
        Descriptor,
        MetricKind,
    },
    labels,
    sink::{
        Emission,
        Failure,
        Sink,
    },
};
use nifi_client::ClientError;
use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    time::Duration,
};
use tokio::time::Instant;

pub type CollectFuture<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// One resource kind published by the exporter.
pub trait Collector: Send + Sync {
    /// Every descriptor this collector may ever emit, whether or not data is
    /// currently available.
    fn describe(&self) -> Vec<Arc<Descriptor>>;

    /// Runs one scrape cycle, writing samples (or a single failure) to `sink`.
    fn collect<'a>(&'a self, ctx: &'a ScrapeContext, sink: &'a dyn Sink) -> CollectFuture<'a>;

    /// Get the name of this collector
    fn name(&self) -> &'static str;
}

/// Per-request scrape parameters.
#[derive(Debug, Clone, Copy)]
pub struct ScrapeContext {
    /// Fetches still running at this instant are abandoned.
    pub deadline: Instant,
    pub timeout: Duration,
}

impl ScrapeContext {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now() + timeout,
            timeout,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    #[error("cannot retrieve {resource} from {target}: {source}")]
    Fetch {
        resource: &'static str,
        target: String,
        source: ClientError,
    },
    #[error("retrieving {resource} from {target} did not finish within {timeout:?}")]
    Timeout {
        resource: &'static str,
        target: String,
        timeout: Duration,
    },
}

/// State shared by every collector: what it scrapes, where, and how its own
/// latency is reported.
pub(crate) struct CollectorCore {
    resource: &'static str,
    target: String,
    duration: Arc<Descriptor>,
}

impl CollectorCore {
    /// `resource` is the metric name segment, e.g. `conn` for `nifi_conn_*`.
    pub fn new(resource: &'static str, help: &str, target: String, const_labels: &ConstLabels) -> Self {
        let duration = Descriptor::new(
            format!("{}{}", labels::resource_prefix(resource), labels::SCRAPE_DURATION_SUFFIX),
            help,
            MetricKind::Gauge,
            &[],
            const_labels,
        );
        Self {
            resource,
            target,
            duration,
        }
    }

    pub fn prefix(&self) -> String {
        labels::resource_prefix(self.resource)
    }

    pub fn duration_descriptor(&self) -> &Arc<Descriptor> {
        &self.duration
    }

    /// Start → fetch → emit → finish.
    ///
    /// A failed or timed out fetch emits one [`Emission::Invalid`] against
    /// `primary` and nothing else. On success `emit` publishes the entities
    /// and the cycle ends with exactly one duration sample.
    pub async fn cycle<T, F, E>(&self, primary: &Arc<Descriptor>, ctx: &ScrapeContext, sink: &dyn Sink, fetch: F, emit: E)
    where
        F: Future<Output = Result<T, ClientError>>,
        E: FnOnce(T, &dyn Sink),
    {
        let begin = Instant::now();

        let fetched = match tokio::time::timeout_at(ctx.deadline, fetch).await {
            Ok(Ok(fetched)) => fetched,
            Ok(Err(source)) => {
                return self.fail(
                    primary,
                    sink,
                    ScrapeError::Fetch {
                        resource: self.resource,
                        target: self.target.clone(),
                        source,
                    },
                )
            }
            Err(_) => {
                return self.fail(
                    primary,
                    sink,
                    ScrapeError::Timeout {
                        resource: self.resource,
                        target: self.target.clone(),
                        timeout: ctx.timeout,
                    },
                )
            }
        };

        emit(fetched, sink);

        let elapsed = begin.elapsed();
        debug!(resource = self.resource, target = %self.target, ?elapsed, "scrape finished");
        sink.emit(Emission::Sample(self.duration.sample(elapsed.as_secs_f64(), Vec::new())));
    }

    fn fail(&self, primary: &Arc<Descriptor>, sink: &dyn Sink, error: ScrapeError) {
        warn!(resource = self.resource, target = %self.target, %error, "scrape failed");
        sink.emit(Emission::Invalid(Failure {
            descriptor: Arc::clone(primary),
            error,
        }));
    }
}
