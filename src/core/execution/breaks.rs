use crate::core::fault::{Fault, SimResult};
use crate::core::types::{NodeId, ValueId};

/// Run-to-break state of one Break element
#[derive(Debug, Clone)]
pub(crate) struct BreakWatch {
    pub(crate) node: NodeId,
    pub(crate) input: ValueId,
    pub(crate) label: String,
    cycles: usize,
    steps: usize,
    last: bool,
}

impl BreakWatch {
    pub(crate) fn new(node: NodeId, input: ValueId, label: &str, cycles: usize) -> Self {
        Self {
            node,
            input,
            label: label.to_string(),
            cycles,
            steps: 0,
            last: false,
        }
    }

    /// Start a new run from the current input level
    pub(crate) fn arm(&mut self, level: bool) {
        self.last = level;
        self.steps = 0;
    }

    /// Track the input level; true on a rising edge
    pub(crate) fn edge(&mut self, level: bool) -> bool {
        let fired = level && !self.last;
        self.last = level;
        if fired {
            self.steps = 0;
        }
        fired
    }

    /// Count a half clock cycle that passed without the break firing.
    /// A budget of zero cycles never times out.
    pub(crate) fn tick(&mut self) -> SimResult<()> {
        self.steps += 1;
        if self.cycles > 0 && self.steps > self.cycles * 2 {
            return Err(Fault::malformed(format!(
                "break timeout: '{}' did not fire within {} cycles",
                self.label, self.cycles
            )));
        }
        Ok(())
    }

    /// Feed the input level seen after a half clock cycle
    ///
    /// Returns true on a rising edge.
    pub(crate) fn detect(&mut self, level: bool) -> SimResult<bool> {
        if self.edge(level) {
            return Ok(true);
        }
        self.tick()?;
        Ok(false)
    }
}
