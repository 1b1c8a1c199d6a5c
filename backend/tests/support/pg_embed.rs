//! Bootstraps embedded PostgreSQL clusters for integration tests.
//!
//! `pg-embed-setup-unpriv` installs into `/var/tmp` unless `PG_RUNTIME_DIR`
//! and `PG_DATA_DIR` are set. When either is missing, both are pointed at a
//! fresh directory under the cargo target directory for the duration of the
//! bootstrap. Bootstraps are serialised because they mutate the environment.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use pg_embedded_setup_unpriv::TestCluster;

static BOOTSTRAP_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
static BOOTSTRAP_SEQUENCE: AtomicU32 = AtomicU32::new(0);

/// Attempts after the first when the binary download fails transiently.
const MAX_RETRIES: u32 = 3;

/// Delay before the first retry; doubles each time.
const RETRY_DELAY_MS: u64 = 500;

fn target_dir() -> PathBuf {
    std::env::var_os("CARGO_TARGET_DIR").map_or_else(
        || {
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("..")
                .join("target")
        },
        PathBuf::from,
    )
}

fn unique_cluster_dirs() -> Result<(PathBuf, PathBuf), std::io::Error> {
    let sequence = BOOTSTRAP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let base = target_dir()
        .join("pg-embed")
        .join(format!("bootstrap-{}-{sequence}", std::process::id()));
    let runtime_dir = base.join("install");
    let data_dir = base.join("data");
    std::fs::create_dir_all(&runtime_dir)?;
    std::fs::create_dir_all(&data_dir)?;
    Ok((runtime_dir, data_dir))
}

fn is_transient(message: &str) -> bool {
    const PATTERNS: [&str; 6] = [
        "error decoding response body",
        "connection reset",
        "timed out",
        "timeout",
        "temporarily unavailable",
        "dns error",
    ];
    let lowered = message.to_lowercase();
    PATTERNS.iter().any(|pattern| lowered.contains(pattern))
}

/// Start a [`TestCluster`], retrying transient download failures.
pub fn test_cluster() -> Result<TestCluster, String> {
    let _bootstrap_guard = BOOTSTRAP_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let needs_override =
        std::env::var_os("PG_RUNTIME_DIR").is_none() || std::env::var_os("PG_DATA_DIR").is_none();
    let _env_guard = if needs_override {
        let (runtime_dir, data_dir) = unique_cluster_dirs().map_err(|err| err.to_string())?;
        Some(env_lock::lock_env([
            ("PG_RUNTIME_DIR", Some(runtime_dir.to_string_lossy().into_owned())),
            ("PG_DATA_DIR", Some(data_dir.to_string_lossy().into_owned())),
        ]))
    } else {
        None
    };

    let mut last_error = String::new();
    for attempt in 0..=MAX_RETRIES {
        match TestCluster::new() {
            Ok(cluster) => return Ok(cluster),
            Err(err) => {
                last_error = format!("{err:?}");
                if attempt == MAX_RETRIES || !is_transient(&last_error) {
                    break;
                }
                let delay = Duration::from_millis(RETRY_DELAY_MS << attempt);
                eprintln!(
                    "pg-embed: transient error on attempt {}, retrying in {delay:?}: {last_error}",
                    attempt + 1
                );
                std::thread::sleep(delay);
            }
        }
    }
    Err(last_error)
}
