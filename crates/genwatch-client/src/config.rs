//! Polling configuration.

use std::time::Duration;

/// Default interval between connection attempts.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// Default cap on a single attempt's lifetime, measured from successful open.
pub const DEFAULT_ATTEMPT_LIFETIME: Duration = Duration::from_millis(800);

/// Default locale passed to the status channel.
pub const DEFAULT_LOCALE: &str = "cn";

/// Configuration for one poll session.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Base URL of the service, e.g. `http://127.0.0.1:4200/research_chat`.
    /// `http`/`https` schemes are rewritten to `ws`/`wss` for the status
    /// channel.
    pub endpoint: String,

    /// Authentication token. The transport does not support out-of-band
    /// headers, so it travels as a query parameter of the connection URI.
    pub credential: String,

    /// Locale for server-side log messages.
    pub locale: String,

    /// Interval between connection attempts.
    pub tick_interval: Duration,

    /// Cap on a single attempt's lifetime after the connection opens.
    pub attempt_lifetime: Duration,
}

impl PollConfig {
    /// Create a config with default locale and timing.
    pub fn new(endpoint: impl Into<String>, credential: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            credential: credential.into(),
            locale: DEFAULT_LOCALE.to_string(),
            tick_interval: DEFAULT_TICK_INTERVAL,
            attempt_lifetime: DEFAULT_ATTEMPT_LIFETIME,
        }
    }

    /// Builder method to set the locale.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Builder method to set the tick interval.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Builder method to set the per-attempt lifetime cap.
    pub fn with_attempt_lifetime(mut self, lifetime: Duration) -> Self {
        self.attempt_lifetime = lifetime;
        self
    }
}
