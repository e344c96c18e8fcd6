use crate::core::types::{Generation, NodeId, ValueId};
use thiserror::Error;

/// Result type of every fallible engine operation
pub type SimResult<T> = Result<T, Fault>;

/// Fault conditions raised while building or settling a network
///
/// A fault aborts the current settle call. The payload names the values,
/// nodes and generation involved so a front end can point at the problem
/// without simulating again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    /// A node read a value that carries floating (high-z) bits
    #[error("read of floating value {}{}", .value, origin(.node, .generation))]
    FloatingRead {
        value: ValueId,
        node: Option<NodeId>,
        generation: Option<Generation>,
    },

    /// Two drivers put different levels on the same bus bit
    #[error("short circuit on {}: drivers {} disagree (generation {})", .value, list(.drivers), .generation)]
    DriverConflict {
        value: ValueId,
        drivers: Vec<NodeId>,
        generation: Generation,
    },

    /// Declared bit widths disagree at wiring time
    #[error("{} has {} bits but {} bits are required{}", .value, .found, .expected, origin(.node, &None))]
    WidthMismatch {
        value: ValueId,
        node: Option<NodeId>,
        expected: u8,
        found: u8,
    },

    /// The settle loop did not reach a fixed point within the iteration cap
    #[error("network seems to oscillate: no fixed point after {} iterations (generation {}), affected {}", .iterations, .generation, list(.nodes))]
    Oscillation {
        nodes: Vec<NodeId>,
        generation: Generation,
        iterations: usize,
    },

    /// The network was built or driven in a way the engine cannot accept
    #[error("malformed network: {}", .reason)]
    Malformed { reason: String },
}

impl Fault {
    /// Create a malformed network fault
    pub fn malformed(reason: impl Into<String>) -> Self {
        Fault::Malformed {
            reason: reason.into(),
        }
    }

    /// Attach the node and generation to a fault raised without that context
    ///
    /// Context already present is left untouched.
    pub fn at(self, at_node: NodeId, at_generation: Generation) -> Self {
        match self {
            Fault::FloatingRead {
                value,
                node,
                generation,
            } => Fault::FloatingRead {
                value,
                node: node.or(Some(at_node)),
                generation: generation.or(Some(at_generation)),
            },
            Fault::WidthMismatch {
                value,
                node,
                expected,
                found,
            } => Fault::WidthMismatch {
                value,
                node: node.or(Some(at_node)),
                expected,
                found,
            },
            other => other,
        }
    }

    /// Nodes named by this fault
    pub fn nodes(&self) -> Vec<NodeId> {
        match self {
            Fault::FloatingRead { node, .. } | Fault::WidthMismatch { node, .. } => {
                node.iter().copied().collect()
            }
            Fault::DriverConflict { drivers, .. } => drivers.clone(),
            Fault::Oscillation { nodes, .. } => nodes.clone(),
            Fault::Malformed { .. } => Vec::new(),
        }
    }

    /// The signal value named by this fault, if any
    pub fn value(&self) -> Option<ValueId> {
        match self {
            Fault::FloatingRead { value, .. }
            | Fault::DriverConflict { value, .. }
            | Fault::WidthMismatch { value, .. } => Some(*value),
            Fault::Oscillation { .. } | Fault::Malformed { .. } => None,
        }
    }
}

fn origin(node: &Option<NodeId>, generation: &Option<Generation>) -> String {
    match (node, generation) {
        (Some(node), Some(generation)) => format!(" in {} (generation {})", node, generation),
        (Some(node), None) => format!(" at {}", node),
        (None, Some(generation)) => format!(" (generation {})", generation),
        (None, None) => String::new(),
    }
}

fn list(nodes: &[NodeId]) -> String {
    let names: Vec<String> = nodes.iter().map(|n| n.to_string()).collect();
    format!("[{}]", names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_fills_missing_context() {
        let fault = Fault::FloatingRead {
            value: ValueId(2),
            node: None,
            generation: None,
        };
        let fault = fault.at(NodeId(5), 7);
        assert_eq!(
            fault,
            Fault::FloatingRead {
                value: ValueId(2),
                node: Some(NodeId(5)),
                generation: Some(7),
            }
        );
        assert_eq!(
            fault.to_string(),
            "read of floating value value#2 in node#5 (generation 7)"
        );
    }

    #[test]
    fn test_at_keeps_existing_context() {
        let fault = Fault::WidthMismatch {
            value: ValueId(1),
            node: Some(NodeId(1)),
            expected: 8,
            found: 4,
        };
        assert_eq!(fault.clone().at(NodeId(9), 3), fault);
        assert_eq!(fault.nodes(), vec![NodeId(1)]);
        assert_eq!(fault.value(), Some(ValueId(1)));
    }

    #[test]
    fn test_messages() {
        let conflict = Fault::DriverConflict {
            value: ValueId(0),
            drivers: vec![NodeId(1), NodeId(2)],
            generation: 4,
        };
        assert_eq!(
            conflict.to_string(),
            "short circuit on value#0: drivers [node#1, node#2] disagree (generation 4)"
        );
        assert_eq!(
            Fault::malformed("no clock").to_string(),
            "malformed network: no clock"
        );
        assert!(Fault::malformed("x").nodes().is_empty());
    }
}
