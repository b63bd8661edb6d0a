//! Tracing setup for the `bluread` binary.
//!
//! Console output is compact and human oriented; `--json-logs` switches to one
//! JSON object per event with span context, for piping into log collectors.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::Level;

use crate::config::AppConfig;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Configuration for the logging system.
pub struct LogConfig {
    /// Output logs as JSON (for machine parsing)
    pub json: bool,
    /// Enable verbose logging (sets default level to DEBUG)
    pub verbose: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            json: false,
            verbose: false,
        }
    }
}

impl From<&AppConfig> for LogConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            json: config.json_logs,
            verbose: config.verbose,
        }
    }
}

/// Install the global subscriber. Call once, after config is loaded.
///
/// `RUST_LOG` replaces the default `bluread=info` (or `bluread=debug` with
/// `verbose`) filter entirely.
///
/// ```ignore
/// bluread::logging::init(LogConfig { verbose: true, ..Default::default() });
/// ```
pub fn init(config: LogConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config.verbose)));

    if config.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_current_span(true)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn default_directive(verbose: bool) -> String {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    format!("bluread={}", level.as_str().to_lowercase())
}

/// A rate limiter for throttling log messages.
///
/// Used by the copy loops so per-buffer progress is reported at most once per
/// interval.
pub struct LogThrottle {
    interval_ms: u64,
    /// Stores the last log time in ms, or u64::MAX to indicate "never logged"
    last_log_ms: AtomicU64,
    start: Instant,
}

/// Sentinel value indicating the throttle has never logged
const NEVER_LOGGED: u64 = u64::MAX;

impl LogThrottle {
    /// Create a new throttle with the given minimum interval between logs.
    pub fn new(interval: std::time::Duration) -> Self {
        Self {
            interval_ms: interval.as_millis() as u64,
            last_log_ms: AtomicU64::new(NEVER_LOGGED),
            start: Instant::now(),
        }
    }

    /// Returns true if enough time has passed since the last log.
    ///
    /// This is thread-safe and uses atomic operations.
    pub fn should_log(&self) -> bool {
        let now_ms = self.start.elapsed().as_millis() as u64;
        let last = self.last_log_ms.load(Ordering::Relaxed);

        // First call (never logged) or enough time has passed
        let should = last == NEVER_LOGGED || now_ms.saturating_sub(last) >= self.interval_ms;

        if should {
            // Try to update; if we lose the race, another thread logged
            self.last_log_ms
                .compare_exchange(last, now_ms, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
        } else {
            false
        }
    }

    /// Reset the throttle, allowing the next log immediately.
    pub fn reset(&self) {
        self.last_log_ms.store(NEVER_LOGGED, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn throttle_allows_first_log() {
        let throttle = LogThrottle::new(Duration::from_secs(1));
        assert!(throttle.should_log());
    }

    #[test]
    fn throttle_blocks_immediate_second_log() {
        let throttle = LogThrottle::new(Duration::from_secs(1));
        assert!(throttle.should_log());
        assert!(!throttle.should_log());
    }

    #[test]
    fn default_directive_follows_verbose() {
        assert_eq!(default_directive(false), "bluread=info");
        assert_eq!(default_directive(true), "bluread=debug");
    }

    #[test]
    fn log_config_from_app_config() {
        let app = AppConfig {
            json_logs: true,
            ..AppConfig::default()
        };
        let config = LogConfig::from(&app);
        assert!(config.json);
        assert!(!config.verbose);
    }

    #[test]
    fn throttle_reset_allows_log() {
        let throttle = LogThrottle::new(Duration::from_secs(100));
        assert!(throttle.should_log());
        assert!(!throttle.should_log());
        throttle.reset();
        assert!(throttle.should_log());
    }
}
