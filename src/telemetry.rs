use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

/// Sends log lines to stderr, as plain text or JSON.
///
/// `RUST_LOG` directives take precedence over `level`. Fails if a global
/// subscriber is already installed.
pub fn init_tracing(json: bool, level: Level) -> Result<(), TryInitError> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();
    let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(layer.json()).try_init()
    } else {
        registry.with(layer).try_init()
    }
}
