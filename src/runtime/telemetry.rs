use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Installs a basic tracing subscriber (if one is not already active).
///
/// The subscriber honours `RUST_LOG` if it is present, otherwise it falls back to `info`.
/// Calling this function multiple times is harmless.
pub fn init_tracing() {
    if TRACING_INIT.get().is_some() {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Status lines own stdout; logs must stay off it or the in-place
    // redraw loses track of its own block.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();

    let _ = TRACING_INIT.set(());
}

/// Lightweight counters covering one invocation of the tool.
#[derive(Default, Debug)]
pub struct Telemetry {
    tasks_launched: AtomicU64,
    launch_failures: AtomicU64,
    describe_rounds: AtomicU64,
}

impl Telemetry {
    pub fn record_tasks_launched(&self, count: u64) {
        if count == 0 {
            return;
        }
        self.tasks_launched.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_launch_failure(&self) {
        self.launch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_describe_round(&self) {
        self.describe_rounds.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            tasks_launched: self.tasks_launched.load(Ordering::Relaxed),
            launch_failures: self.launch_failures.load(Ordering::Relaxed),
            describe_rounds: self.describe_rounds.load(Ordering::Relaxed),
        }
    }

    pub fn tasks_launched(&self) -> u64 {
        self.tasks_launched.load(Ordering::Relaxed)
    }

    pub fn launch_failures(&self) -> u64 {
        self.launch_failures.load(Ordering::Relaxed)
    }

    pub fn describe_rounds(&self) -> u64 {
        self.describe_rounds.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Copy, Clone)]
pub struct TelemetrySnapshot {
    pub tasks_launched: u64,
    pub launch_failures: u64,
    pub describe_rounds: u64,
}
