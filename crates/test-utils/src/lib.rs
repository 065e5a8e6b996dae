pub mod builders;
pub mod counting_store;

use std::sync::Once;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tideps::config::ConfigFile;
use tideps::deps::DepContext;
use tideps::engine::{Snapshot, TiRequest};
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Midnight UTC, `n` days after 2024-01-01.
pub fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
}

/// Snapshot of an unmapped task instance with an empty context.
pub fn snapshot(cfg: &ConfigFile, task_id: &str, run_id: &str) -> Snapshot {
    snapshot_with(cfg, task_id, run_id, DepContext::default())
}

pub fn snapshot_with(cfg: &ConfigFile, task_id: &str, run_id: &str, ctx: DepContext) -> Snapshot {
    let request = TiRequest {
        task_id: task_id.to_string(),
        run_id: run_id.to_string(),
        map_index: -1,
    };
    Snapshot::from_config(cfg, &request, ctx).expect("failed to build snapshot")
}

/// Run a future with a 5-second timeout.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}
