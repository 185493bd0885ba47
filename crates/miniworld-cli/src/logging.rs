use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins over `level` when set. Logs go to stderr so JSON / CSV on
/// stdout stays pipeable.
pub fn init_logging(level: &str) {
    let default_filter = format!("mwdos={level},miniworld_core={level}");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .without_time(),
        )
        .try_init();
}
