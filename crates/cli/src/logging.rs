// crates/cli/src/logging.rs
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn,report_portal=info";
const VERBOSE_FILTER: &str = "warn,report_portal=debug";

/// Log to stderr so command output on stdout stays clean. `RUST_LOG` wins
/// over `-v`.
pub fn init(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
