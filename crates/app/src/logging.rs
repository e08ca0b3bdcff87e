use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. Falls back to `warn` on a bad filter.
pub fn init(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    if let Err(err) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
    {
        eprintln!("logging disabled: {err}");
    }
}
