use tracing_subscriber::EnvFilter;

/// Env var that overrides the `-v` flags, e.g. `TASKY_LOG=tasky=debug`.
pub const LOG_ENV: &str = "TASKY_LOG";

/// Sends logs to stderr so they never mix with command output.
pub fn init(verbosity: u8) {
    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
