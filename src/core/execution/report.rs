use crate::core::types::Generation;
use serde::{Deserialize, Serialize};

/// Outcome of a successful settle call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettleReport {
    /// Generations run until the queue drained
    pub iterations: usize,
    /// Node activations over all generations
    pub evaluations: usize,
    /// Generation counter after the call
    pub generation: Generation,
}

impl SettleReport {
    /// Fold a later settle call into this one
    pub fn absorb(&mut self, later: SettleReport) {
        self.iterations += later.iterations;
        self.evaluations += later.evaluations;
        self.generation = later.generation;
    }
}

/// Outcome of running the clock up to a break
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakInfo {
    /// Label of the break that fired, `None` on timeout
    pub label: Option<String>,
    /// Half clock cycles run
    pub steps: usize,
    /// True if the run stopped because the timeout elapsed
    pub timeout: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absorb() {
        let mut first = SettleReport {
            iterations: 3,
            evaluations: 7,
            generation: 3,
        };
        first.absorb(SettleReport {
            iterations: 2,
            evaluations: 2,
            generation: 5,
        });
        assert_eq!(first.iterations, 5);
        assert_eq!(first.evaluations, 9);
        assert_eq!(first.generation, 5);
    }
}
