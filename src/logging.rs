use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "self_quiz=info";

/// Logs go to stderr so they never interleave with the quiz on stdout.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
