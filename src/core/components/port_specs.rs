use crate::core::types::ValueId;

/// How a node is wired to one signal value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortKind {
    /// Read during the read phase; a change re-schedules the node
    Input,
    /// Read during the read phase but never re-schedules the node
    /// (e.g. the data input of an edge triggered flip-flop)
    Passive,
    /// Written during the write phase
    Output,
}

impl PortKind {
    /// Whether the node must be notified when the value changes
    pub fn observes(&self) -> bool {
        matches!(self, PortKind::Input)
    }

    pub fn is_output(&self) -> bool {
        matches!(self, PortKind::Output)
    }
}

/// Wiring declaration of a node
///
/// Nodes hand their ports to the model on registration; the model checks
/// widths, attaches listeners and claims the outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    /// Pin name used in diagnostics
    pub name: &'static str,
    pub kind: PortKind,
    pub value: ValueId,
    /// Width the node expects
    pub bits: u8,
}

impl Port {
    pub fn input(name: &'static str, value: ValueId, bits: u8) -> Self {
        Self {
            name,
            kind: PortKind::Input,
            value,
            bits,
        }
    }

    pub fn passive(name: &'static str, value: ValueId, bits: u8) -> Self {
        Self {
            name,
            kind: PortKind::Passive,
            value,
            bits,
        }
    }

    pub fn output(name: &'static str, value: ValueId, bits: u8) -> Self {
        Self {
            name,
            kind: PortKind::Output,
            value,
            bits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_kinds() {
        assert!(Port::input("A", ValueId(0), 1).kind.observes());
        assert!(!Port::passive("D", ValueId(0), 1).kind.observes());
        assert!(Port::output("Y", ValueId(0), 1).kind.is_output());
        assert!(!Port::output("Y", ValueId(0), 1).kind.observes());
    }
}
