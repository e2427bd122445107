#![expect(
    clippy::module_name_repetitions,
    reason = "Configuration types intentionally mirror the module name for clarity"
)]

use std::time::Duration;

use backoff::backoff::Constant;

const DEFAULT_PING_DEADLINE_DURATION: Duration = Duration::from_secs(10);
const DEFAULT_RECONNECT_INTERVAL_DURATION: Duration = Duration::from_secs(30);
const DEFAULT_RECONNECT_MAX_ATTEMPTS: u32 = 30;

/// Configuration for gateway client behavior.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum time allowed to answer a transport ping with a pong before the
    /// connection is considered dead
    pub ping_deadline: Duration,
    /// Reconnection strategy configuration
    pub reconnect: ReconnectConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ping_deadline: DEFAULT_PING_DEADLINE_DURATION,
            reconnect: ReconnectConfig::default(),
        }
    }
}

/// Configuration for automatic reconnection behavior.
///
/// The gateway retries on a fixed cadence: every [`Self::interval`], up to
/// [`Self::max_attempts`] times. Exhausting the bound leaves the client
/// permanently disconnected.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Maximum number of reconnection attempts before giving up.
    /// `None` means infinite retries.
    pub max_attempts: Option<u32>,
    /// Fixed delay between consecutive reconnection attempts
    pub interval: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: Some(DEFAULT_RECONNECT_MAX_ATTEMPTS),
            interval: DEFAULT_RECONNECT_INTERVAL_DURATION,
        }
    }
}

impl From<ReconnectConfig> for Constant {
    fn from(config: ReconnectConfig) -> Self {
        // Max attempts are enforced by the reconnect loop, not the strategy
        Constant::new(config.interval)
    }
}

#[cfg(test)]
mod tests {
    use backoff::backoff::Backoff as _;

    use super::*;

    #[test]
    fn reconnect_interval_is_constant() {
        let config = ReconnectConfig {
            max_attempts: Some(3),
            interval: Duration::from_millis(250),
        };
        let mut backoff: Constant = config.into();

        for _ in 0..5 {
            assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(250)));
        }
    }

    #[test]
    fn defaults_are_thirty_seconds_thirty_attempts() {
        let config = Config::default();
        assert_eq!(config.ping_deadline, Duration::from_secs(10));
        assert_eq!(config.reconnect.interval, Duration::from_secs(30));
        assert_eq!(config.reconnect.max_attempts, Some(30));
    }
}
