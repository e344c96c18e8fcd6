use super::report::SettleReport;
use crate::core::fault::Fault;
use crate::core::types::{Generation, NodeId};

/// Observer trait for simulation events
///
/// Waveform recorders and GUIs hook in here. All methods default to doing
/// nothing.
pub trait SimulationObserver {
    /// Called once when initialization has stabilized the network
    fn on_start(&mut self, _report: &SettleReport) {}

    /// Called after every generation with the nodes it evaluated
    fn on_micro_step(&mut self, _generation: Generation, _nodes: &[NodeId]) {}

    /// Called when a settle call reached a fixed point
    fn on_step(&mut self, _report: &SettleReport) {}

    /// Called when a fault aborts a settle call
    fn on_fault(&mut self, _fault: &Fault) {}
}
