use serde::{
    Deserialize,
    Serialize,
};
use std::{
    collections::BTreeMap,
    path::PathBuf,
    time::Duration,
};
use strum::IntoEnumIterator as _;

/// Resource kinds that can be scraped from a node.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CollectorKind {
    Connections,
    Counters,
    ProcessGroups,
    SystemDiagnostics,
}

impl CollectorKind {
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

/// One NiFi instance (standalone or any node of a cluster) to scrape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Root of the REST API, e.g. `https://nifi:8443/nifi-api`.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// PEM bundle of additional trusted root certificates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_certificates: Option<PathBuf>,
    #[serde(default = "default_root_process_group")]
    pub root_process_group: String,
    #[serde(default = "default_request_timeout", with = "crate::duration")]
    pub request_timeout: Duration,
    /// Constant labels added to every sample of this node.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default = "CollectorKind::all")]
    pub collectors: Vec<CollectorKind>,
}

fn default_root_process_group() -> String {
    nifi_exporter_collectors::labels::ROOT_PROCESS_GROUP_ID.to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

impl NodeConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
            ca_certificates: None,
            root_process_group: default_root_process_group(),
            request_timeout: default_request_timeout(),
            labels: BTreeMap::new(),
            collectors: CollectorKind::all(),
        }
    }

    pub fn parsed_url(&self) -> Result<url::Url, url::ParseError> {
        url::Url::parse(&self.url)
    }

    pub fn is_enabled(&self, kind: CollectorKind) -> bool {
        self.collectors.contains(&kind)
    }

    pub(crate) fn redact(&mut self) {
        if self.password.is_some() {
            self.password = Some("<redacted>".to_string());
        }
    }
}
