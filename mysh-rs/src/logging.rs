use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "MYSH_LOG";
const DEFAULT_FILTER: &str = "warn";

/// Installs the stderr subscriber. `MYSH_LOG` takes an `EnvFilter` directive
/// such as `debug` or `mysh_rs::pipeline=trace`.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .without_time()
        .try_init();
}
