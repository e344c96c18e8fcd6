//! Configuration for settling a network
//!
//! This module provides the knobs that control how the scheduler evaluates a
//! generation and when it gives up on a network that never stabilizes.

use serde::{Deserialize, Serialize};

/// How the nodes of one generation are evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvaluationMode {
    /// All read phases of a generation run before all write phases.
    /// The result does not depend on queue order.
    Synchronous,
    /// The generation is shuffled and each node runs read then write before
    /// the next one. Breaks symmetric startup oscillations (RS latches);
    /// deterministic for a given seed.
    Shuffled { seed: u64 },
}

impl Default for EvaluationMode {
    fn default() -> Self {
        EvaluationMode::Synchronous
    }
}

/// Default number of iterations before a settle call is treated as oscillating
pub const DEFAULT_OSCILLATION_CAP: usize = 1000;

/// Collection window used for recovery when none is configured
pub const DEFAULT_RECOVERY_WINDOW: usize = 100;

/// Configuration for simulation execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Iterations a single settle call may take before oscillation is assumed.
    /// Zero is treated as one.
    pub oscillation_cap: usize,
    /// Extra iterations run after the cap to collect the oscillating nodes.
    /// With zero the fault names the last pending generation only.
    pub oscillation_window: usize,
    /// Evaluation order within a generation
    pub evaluation: EvaluationMode,
    /// Evaluate the collection window shuffled so a symmetric oscillation
    /// can break itself; the network settles if the queue drains in time.
    /// Uses [`DEFAULT_RECOVERY_WINDOW`] when no window is set. Hides real
    /// design errors, so it is off by default.
    pub recover_from_oscillation: bool,
}

impl SimulationConfig {
    /// Create a new configuration with default values
    ///
    /// Default configuration is synchronous evaluation with a cap of
    /// [`DEFAULT_OSCILLATION_CAP`] iterations and no collection window.
    pub fn new() -> Self {
        Self {
            oscillation_cap: DEFAULT_OSCILLATION_CAP,
            oscillation_window: 0,
            evaluation: EvaluationMode::default(),
            recover_from_oscillation: false,
        }
    }

    /// Set the iteration cap; at least one iteration is always allowed
    pub fn with_oscillation_cap(mut self, cap: usize) -> Self {
        self.oscillation_cap = cap.max(1);
        self
    }

    /// Set the number of iterations used to collect oscillating nodes
    pub fn with_oscillation_window(mut self, window: usize) -> Self {
        self.oscillation_window = window;
        self
    }

    pub fn with_evaluation(mut self, mode: EvaluationMode) -> Self {
        self.evaluation = mode;
        self
    }

    pub fn with_recover_from_oscillation(mut self, recover: bool) -> Self {
        self.recover_from_oscillation = recover;
        self
    }

    /// Iterations run after the cap is hit
    pub fn collection_window(&self) -> usize {
        match (self.oscillation_window, self.recover_from_oscillation) {
            (0, true) => DEFAULT_RECOVERY_WINDOW,
            (window, _) => window,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new()
    }
}
