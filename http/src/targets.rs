use eyre::{
    Context as _,
    Result,
};
use nifi_client::{
    ClientOptions,
    Credentials,
    NifiApi,
    NifiClient,
};
use nifi_exporter_collectors::{
    ConnectionsCollector,
    ConstLabels,
    CountersCollector,
    NifiCollector,
    ProcessGroupsCollector,
    Registry,
    SystemDiagnosticsCollector,
};
use nifi_exporter_config::{
    CollectorKind,
    Config,
    NodeConfig,
};
use std::sync::Arc;

/// Creates one client per configured node and registers its collectors.
pub fn build_registry(config: &Config) -> Result<Registry> {
    let mut registry = Registry::new();
    for node in &config.nodes {
        let api: Arc<dyn NifiApi> = Arc::new(client_for(node)?);
        for collector in collectors_for(node, api) {
            registry
                .register(collector)
                .wrap_err_with(|| format!("Failed to register collectors of {}", node.url))?;
        }
        info!(url = %node.url, collectors = ?node.collectors, "scraping node");
    }
    Ok(registry)
}

fn client_for(node: &NodeConfig) -> Result<NifiClient> {
    let mut options = ClientOptions::new(node.parsed_url().wrap_err_with(|| format!("Invalid url {}", node.url))?);
    options.credentials = match (&node.username, &node.password) {
        (Some(username), Some(password)) => Some(Credentials {
            username: username.clone(),
            password: password.clone(),
        }),
        _ => None,
    };
    options.ca_certificates = node.ca_certificates.clone();
    options.request_timeout = node.request_timeout;

    NifiClient::new(options).wrap_err_with(|| format!("Failed to create client for {}", node.url))
}

/// The enabled collectors of `node`, all sharing `api`.
pub fn collectors_for(node: &NodeConfig, api: Arc<dyn NifiApi>) -> Vec<NifiCollector> {
    let labels: &ConstLabels = &node.labels;
    node.collectors
        .iter()
        .map(|kind| -> NifiCollector {
            match kind {
                CollectorKind::Connections => {
                    ConnectionsCollector::new(api.clone(), &node.url, &node.root_process_group, labels).into()
                }
                CollectorKind::Counters => CountersCollector::new(api.clone(), &node.url, labels).into(),
                CollectorKind::ProcessGroups => {
                    ProcessGroupsCollector::new(api.clone(), &node.url, &node.root_process_group, labels).into()
                }
                CollectorKind::SystemDiagnostics => SystemDiagnosticsCollector::new(api.clone(), &node.url, labels).into(),
            }
        })
        .collect()
}
