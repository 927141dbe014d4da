//! In-memory [`NifiApi`] for collector tests.

use nifi_client::{
    ApiFuture,
    ClientError,
    ConnectionEntity,
    CounterQuery,
    CountersDto,
    NifiApi,
    ProcessGroupStatusDto,
    SystemDiagnosticsDto,
};
use reqwest::StatusCode;
use std::{
    sync::{
        Arc,
        Mutex,
    },
    time::Duration,
};
use url::Url;

#[derive(Debug, Default, Clone)]
pub struct FakeNifi {
    pub connections: Vec<ConnectionEntity>,
    pub counters: CountersDto,
    pub process_groups: ProcessGroupStatusDto,
    pub system: SystemDiagnosticsDto,
    failing: bool,
    delay: Option<Duration>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeNifi {
    pub fn with_connections(connections: Vec<ConnectionEntity>) -> Self {
        Self {
            connections,
            ..Default::default()
        }
    }

    pub fn with_counters(counters: CountersDto) -> Self {
        Self {
            counters,
            ..Default::default()
        }
    }

    pub fn with_process_groups(process_groups: ProcessGroupStatusDto) -> Self {
        Self {
            process_groups,
            ..Default::default()
        }
    }

    pub fn with_system(system: SystemDiagnosticsDto) -> Self {
        Self {
            system,
            ..Default::default()
        }
    }

    /// Every endpoint answers 503.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    /// Every endpoint answers after `delay`.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests served so far, e.g. `counters nodewise=true`.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn respond<'a, T>(&'a self, request: String, value: &T) -> ApiFuture<'a, T>
    where
        T: Clone + Send + 'a,
    {
        let value = value.clone();
        Box::pin(async move {
            self.requests.lock().unwrap().push(request);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.failing {
                return Err(ClientError::Status {
                    url: Url::parse("http://nifi/nifi-api").unwrap(),
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    body: "cluster is still being formed".to_string(),
                });
            }
            Ok(value)
        })
    }
}

impl NifiApi for FakeNifi {
    fn connections<'a>(&'a self, process_group_id: &'a str) -> ApiFuture<'a, Vec<ConnectionEntity>> {
        self.respond(format!("connections {process_group_id}"), &self.connections)
    }

    fn counters<'a>(&'a self, query: &'a CounterQuery) -> ApiFuture<'a, CountersDto> {
        let request = format!(
            "counters nodewise={} cluster_node_id={}",
            query.nodewise,
            query.cluster_node_id.as_deref().unwrap_or_default()
        );
        self.respond(request, &self.counters)
    }

    fn process_group_status<'a>(&'a self, process_group_id: &'a str) -> ApiFuture<'a, ProcessGroupStatusDto> {
        self.respond(format!("process_group_status {process_group_id}"), &self.process_groups)
    }

    fn system_diagnostics(&self) -> ApiFuture<'_, SystemDiagnosticsDto> {
        self.respond("system_diagnostics".to_string(), &self.system)
    }
}
