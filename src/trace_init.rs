//! Optional JSON-lines trace file, enabled with the `trace` feature.

/// Log file created inside the directory passed to [`init_tracing`].
pub const TRACE_FILE_NAME: &str = "recast-trace.jsonl";

/// Filter used when `RUST_LOG` is unset: debug for every workspace crate.
pub const DEFAULT_TRACE_FILTER: &str =
    "recast_engine=debug,recast_session=debug,recast_core=debug,recast_cli=debug";

#[cfg(feature = "trace")]
mod enabled {
    use std::path::Path;
    use std::sync::OnceLock;

    use tracing_appender::non_blocking::WorkerGuard;
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    use super::{DEFAULT_TRACE_FILTER, TRACE_FILE_NAME};

    // Keeps the writer thread alive for the rest of the process.
    static WRITER_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

    pub fn init_tracing(log_dir: &Path) {
        WRITER_GUARD.get_or_init(|| {
            let appender = tracing_appender::rolling::never(log_dir, TRACE_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_TRACE_FILTER));

            tracing_subscriber::fmt()
                .json()
                .with_writer(writer)
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_env_filter(filter)
                .init();
            guard
        });
    }
}

/// Send `tracing` output as JSON lines to `<log_dir>/recast-trace.jsonl`.
/// Only the first call has an effect. `RUST_LOG` overrides the default filter.
#[cfg(feature = "trace")]
pub use enabled::init_tracing;

#[cfg(not(feature = "trace"))]
pub fn init_tracing(_log_dir: &std::path::Path) {}
