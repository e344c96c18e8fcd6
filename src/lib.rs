pub mod core;

// Re-export commonly used types
pub use crate::core::components::{
    InitContext, Node, NodeKind, Port, PortKind, ReadContext, WriteContext,
};
pub use crate::core::execution::{
    BreakInfo, EvaluationMode, Model, ModelState, SettleReport, SimulationConfig,
    SimulationObserver,
};
pub use crate::core::fault::{Fault, SimResult};
pub use crate::core::probes::{Probe, ProbeKind, ProbeRegistry};
pub use crate::core::types::{Generation, NodeId, ValueId};
pub use crate::core::values::{Pull, SignalValue, ValueSnapshot};
