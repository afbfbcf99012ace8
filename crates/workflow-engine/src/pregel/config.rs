//! Pregel runtime configuration
//!
//! Configuration for the superstep scheduler: round limit, parallelism,
//! inbox ordering and status tracking.

use serde::{Deserialize, Serialize};

/// Default safety bound on the number of supersteps
pub const DEFAULT_MAX_SUPERSTEPS: usize = 100;

/// Order in which messages addressed to one vertex are delivered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageOrder {
    /// Routing order: senders in node-declaration order, each outbox in emission order.
    #[default]
    Arrival,

    /// Stable sort of each inbox by sender ID.
    BySender,
}

/// Pregel runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PregelConfig {
    /// Maximum supersteps before the execution is aborted
    pub max_supersteps: usize,

    /// Maximum concurrent vertex computations within one superstep
    pub parallelism: usize,

    /// Delivery order of same-superstep messages to one vertex
    pub message_order: MessageOrder,

    /// Record per-node Pending/Running/Succeeded/Failed status
    pub track_status: bool,
}

impl Default for PregelConfig {
    fn default() -> Self {
        Self {
            max_supersteps: DEFAULT_MAX_SUPERSTEPS,
            parallelism: num_cpus::get().max(1),
            message_order: MessageOrder::default(),
            track_status: true,
        }
    }
}

impl PregelConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum supersteps
    pub fn with_max_supersteps(mut self, max: usize) -> Self {
        self.max_supersteps = max;
        self
    }

    /// Set parallelism level (at least 1)
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    /// Set inbox ordering
    pub fn with_message_order(mut self, order: MessageOrder) -> Self {
        self.message_order = order;
        self
    }

    /// Enable or disable per-node status tracking
    pub fn with_status_tracking(mut self, enabled: bool) -> Self {
        self.track_status = enabled;
        self
    }

    /// Parallelism actually used by the runtime
    pub fn effective_parallelism(&self) -> usize {
        self.parallelism.max(1)
    }
}
