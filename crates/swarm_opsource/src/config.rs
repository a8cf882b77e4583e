//! Configuration for an endpoint.

/// How strictly the endpoint enforces stream order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderingPolicy {
    /// Only handshake repeats and malformed patches are rejected.
    ///
    /// Ordering of ops relative to handshakes and teardown is left to
    /// the layer above.
    #[default]
    Permissive,
    /// Additionally rejects non-handshake addresses in handshake calls,
    /// ops before the handshake they depend on, and any traffic other
    /// than error signals once the stream has ended or errored.
    Strict,
}

/// Configuration for one endpoint instance.
#[derive(Debug, Clone)]
pub struct OpSourceConfig {
    /// Name used in log events.
    pub name: String,
    /// Whether to write a diagnostic line for every event.
    pub debug: bool,
    /// Ordering policy.
    pub policy: OrderingPolicy,
}

impl OpSourceConfig {
    /// Creates a new configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            debug: false,
            policy: OrderingPolicy::default(),
        }
    }

    /// Enables or disables diagnostic lines.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the ordering policy.
    pub fn with_policy(mut self, policy: OrderingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns true under the strict ordering policy.
    pub fn is_strict(&self) -> bool {
        self.policy == OrderingPolicy::Strict
    }
}

impl Default for OpSourceConfig {
    fn default() -> Self {
        Self::new("opsource")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = OpSourceConfig::new("peer-1")
            .with_debug(true)
            .with_policy(OrderingPolicy::Strict);

        assert_eq!(config.name, "peer-1");
        assert!(config.debug);
        assert!(config.is_strict());
    }

    #[test]
    fn defaults_are_permissive_and_quiet() {
        let config = OpSourceConfig::default();
        assert!(!config.debug);
        assert_eq!(config.policy, OrderingPolicy::Permissive);
    }
}
