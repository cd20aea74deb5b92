use anyhow::Context as _;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,steal_finder=debug";

/// Install the global subscriber. `RUST_LOG` wins over the default filter.
pub fn init() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .context("build log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    Ok(())
}
