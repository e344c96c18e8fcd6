use super::evaluation_context::{InitContext, ReadContext, WriteContext};
use super::port_specs::Port;
use crate::core::fault::SimResult;
use std::fmt;

/// Family a node belongs to, used for diagnostics and statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Combinational primitive
    Gate,
    /// Edge triggered storage (flip-flops, counters, memories)
    FlipFlop,
    /// Block defined by a user function or a flattened sub-circuit
    Composite,
    /// Clock source driven by the scheduler
    Clock,
    /// Simulation control elements (reset, break)
    Io,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Gate => "gate",
            NodeKind::FlipFlop => "flip-flop",
            NodeKind::Composite => "composite",
            NodeKind::Clock => "clock",
            NodeKind::Io => "io",
        };
        write!(f, "{}", name)
    }
}

/// Two-phase update contract every logic element implements
///
/// The scheduler first calls [`Node::read`] on every node of a generation,
/// then [`Node::write`] on the same nodes. The read phase only sees input
/// values and latches what it needs into the node itself; the write phase
/// can only drive the node's outputs. Keeping the phases apart makes the
/// outcome of a generation independent of the order nodes are visited in.
///
/// At startup [`Node::write`] runs once before any read, so outputs carry
/// the node's power-on state (stored value, gate result 0) when the first
/// generation reads them.
pub trait Node {
    /// Element type name, e.g. `"And"`
    fn type_name(&self) -> &'static str;

    fn kind(&self) -> NodeKind {
        NodeKind::Gate
    }

    /// User visible label, if the element has one
    fn label(&self) -> Option<&str> {
        None
    }

    /// Values this node reads and drives
    fn ports(&self) -> Vec<Port>;

    /// One-time hook, run after the network is complete and before the first settle
    fn init(&mut self, _ctx: &InitContext) -> SimResult<()> {
        Ok(())
    }

    /// Called once the network has stabilized after initialization;
    /// returning true schedules the node again
    fn start(&mut self) -> bool {
        false
    }

    /// Read phase: consume inputs into internal state. Only values declared
    /// as input or passive ports can be read.
    fn read(&mut self, ctx: &ReadContext<'_>) -> SimResult<()>;

    /// Write phase: drive outputs from internal state
    fn write(&mut self, ctx: &mut WriteContext<'_>) -> SimResult<()>;
}
