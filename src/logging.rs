use color_eyre::Result;
use nifi_exporter_config::LogFormat;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
    Layer,
};

/// Directive used when `RUST_LOG` is not set.
fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "nifi_exporter=debug,nifi_exporter_http=debug,nifi_exporter_collectors=debug,nifi_client=debug,\
         nifi_exporter_config=debug"
    } else {
        "nifi_exporter=info,nifi_exporter_http=info,nifi_exporter_collectors=info,nifi_client=info,\
         nifi_exporter_config=info"
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

pub fn init_logging(format: LogFormat, verbose: bool) -> Result<()> {
    let fmt_layer = match format {
        LogFormat::Text => fmt::layer().with_target(true).boxed(),
        LogFormat::Json => fmt::layer().json().flatten_event(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(env_filter(verbose)))
        .with(tracing_error::ErrorLayer::default())
        .try_init()?;
    Ok(())
}
