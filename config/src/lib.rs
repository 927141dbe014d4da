#[macro_use]
extern crate tracing;

mod app_dirs;
mod args;
mod duration;
mod node_config;

pub use app_dirs::get_config_dir;
pub use args::{
    Args,
    LogFormat,
};
use color_eyre::Result;
use eyre::{
    bail,
    Context as _,
};
use nifi_exporter_collectors::labels;
pub use node_config::{
    CollectorKind,
    NodeConfig,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    net::SocketAddr,
    time::Duration,
};

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

/// What the exporter does when a collector fails during a scrape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OnError {
    /// Log the failure and serve whatever was collected.
    Continue,
    /// Answer the scrape with HTTP 500 listing every failure.
    #[default]
    HttpError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExporterConfig {
    pub listen_address: SocketAddr,
    pub metrics_path: String,
    /// Upper bound for a scrape, also when Prometheus announces a longer one.
    #[serde(with = "crate::duration")]
    pub scrape_timeout: Duration,
    #[serde(default)]
    pub on_error: OnError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub exporter: ExporterConfig,
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,
}

impl Config {
    /// Layers the built-in defaults, the configuration file and `args`, in
    /// that order, and validates the result.
    pub fn new(args: &Args) -> Result<Self> {
        let mut builder =
            config::Config::builder().add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml));

        builder = match &args.config {
            Some(path) => builder.add_source(config::File::from(path.as_path()).format(config::FileFormat::Yaml)),
            None => {
                let path = get_config_dir().join("config.yaml");
                debug!(?path, "looking for configuration file");
                builder.add_source(
                    config::File::from(path)
                        .format(config::FileFormat::Yaml)
                        .required(false),
                )
            }
        };

        builder = builder.add_source(args.clone());

        let cfg: Self = builder
            .build()
            .and_then(config::Config::try_deserialize)
            .wrap_err("Failed to load configuration")?;
        cfg.validate()?;

        Ok(cfg)
    }

    /// Parses a complete configuration document, defaults included.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let cfg: Self = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml))
            .add_source(config::File::from_str(yaml, config::FileFormat::Yaml))
            .build()
            .and_then(config::Config::try_deserialize)
            .wrap_err("Failed to parse configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.exporter.metrics_path.starts_with('/') {
            bail!(
                "exporter.metrics_path must start with '/', got '{}'",
                self.exporter.metrics_path
            );
        }
        if self.exporter.metrics_path == "/healthz" {
            bail!("exporter.metrics_path cannot be '/healthz', it is the health check");
        }
        if self.exporter.scrape_timeout.is_zero() {
            bail!("exporter.scrape_timeout must be greater than zero");
        }
        if self.nodes.is_empty() {
            bail!("at least one entry in 'nodes' is required");
        }

        for (index, node) in self.nodes.iter().enumerate() {
            validate_node(node).wrap_err_with(|| format!("invalid node #{index} ({})", node.url))?;
        }

        for (index, node) in self.nodes.iter().enumerate() {
            if let Some(other) = self.nodes[..index].iter().position(|other| other.labels == node.labels) {
                bail!(
                    "nodes #{other} and #{index} have identical labels, their series cannot be told apart; add a \
                     distinguishing label such as 'instance'"
                );
            }
        }

        Ok(())
    }

    /// A copy safe to print: passwords are masked.
    pub fn redacted(&self) -> Self {
        let mut clone = self.clone();
        clone.nodes.iter_mut().for_each(NodeConfig::redact);
        clone
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yml::to_string(self).wrap_err("Failed to serialize configuration")
    }
}

fn validate_node(node: &NodeConfig) -> Result<()> {
    let url = node.parsed_url().wrap_err("cannot parse url")?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("url must use http or https, got '{}'", url.scheme());
    }
    match (&node.username, &node.password) {
        (Some(_), None) => bail!("username is set without a password"),
        (None, Some(_)) => bail!("password is set without a username"),
        _ => {}
    }
    if node.root_process_group.is_empty() {
        bail!("root_process_group must not be empty");
    }
    if node.request_timeout.is_zero() {
        bail!("request_timeout must be greater than zero");
    }
    if node.collectors.is_empty() {
        warn!(url = %node.url, "no collectors enabled for node");
    }
    for name in node.labels.keys() {
        if !labels::is_valid_label_name(name) {
            bail!("'{name}' is not a valid label name");
        }
        if labels::variable_label_names().any(|reserved| reserved == name) {
            bail!("label '{name}' is already used by the exporter's own metrics");
        }
    }
    Ok(())
}
