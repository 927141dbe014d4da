use clap::Parser;
use std::{
    net::SocketAddr,
    path::PathBuf,
};

/// Prometheus exporter for Apache NiFi
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, long_version = version(), about, long_about = None)]
pub struct Args {
    /// YAML configuration file. Defaults to `config.yaml` in the config directory.
    #[arg(long, env = "NIFI_EXPORTER_CONFIG_FILE", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address to serve metrics on, overriding `exporter.listen_address`.
    #[arg(long, env = "NIFI_EXPORTER_LISTEN_ADDRESS", value_name = "ADDR")]
    pub listen_address: Option<SocketAddr>,

    /// Log line format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(short, long, action)]
    pub verbose: bool,

    /// Validate the configuration, print it without secrets and exit.
    #[arg(long, action)]
    pub check_config: bool,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if let Some(listen_address) = &self.listen_address {
                cache.insert("exporter.listen_address".to_string(), listen_address.to_string().into());
            }
            Ok(cache)
        }
    }
}

pub fn version() -> String {
    let version = clap::crate_version!();
    let author = clap::crate_authors!();
    let config_dir_path = crate::get_config_dir().display().to_string();

    format!(
        "\
{version}

Authors: {author}

Config directory: {config_dir_path}"
    )
}
