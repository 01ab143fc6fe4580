//! Engine configuration.
//!
//! Variables:
//! - `PGW_RPC_TIMEOUT_MS`: deadline for all chain calls of one operation
//!   (default: 15000). Must be a positive integer.

use std::time::Duration;

use crate::error::ConfigError;

pub const RPC_TIMEOUT_VAR: &str = "PGW_RPC_TIMEOUT_MS";

const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Budget for every chain call made by one audit, autofix, or decode.
    /// In bulk operations the budget applies per route.
    pub rpc_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rpc_timeout: DEFAULT_RPC_TIMEOUT,
        }
    }
}

impl EngineConfig {
    /// Load from the process environment.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] if a variable is set but malformed.
    /// Unset variables take their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load using `lookup` in place of the environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = lookup(RPC_TIMEOUT_VAR) {
            config.rpc_timeout = parse_timeout_ms(RPC_TIMEOUT_VAR, &raw)?;
        }
        Ok(config)
    }

    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = timeout;
        self
    }
}

/// Parse a positive millisecond count.
pub fn parse_timeout_ms(var: &str, raw: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        var: var.to_string(),
        value: raw.to_string(),
        reason: reason.to_string(),
    };
    let ms: u64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid("expected a whole number of milliseconds"))?;
    if ms == 0 {
        return Err(invalid("must be greater than zero"));
    }
    Ok(Duration::from_millis(ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        let cfg = EngineConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.rpc_timeout, Duration::from_secs(15));
    }

    #[test]
    fn reads_timeout() {
        let cfg = EngineConfig::from_lookup(|v| (v == RPC_TIMEOUT_VAR).then(|| "2500".into())).unwrap();
        assert_eq!(cfg.rpc_timeout, Duration::from_millis(2500));
    }

    #[test]
    fn rejects_malformed_timeout() {
        let err = EngineConfig::from_lookup(|_| Some("fast".into())).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref var, .. } if var == RPC_TIMEOUT_VAR));
        assert!(EngineConfig::from_lookup(|_| Some("0".into())).is_err());
    }
}
