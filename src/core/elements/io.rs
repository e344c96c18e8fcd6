use crate::core::components::{InitContext, Node, NodeKind, Port, ReadContext, WriteContext};
use crate::core::fault::{Fault, SimResult};
use crate::core::types::ValueId;

/// Clock source
///
/// The clock output is an external value toggled by the model on a clock
/// edge request, so the node itself never writes anything.
pub struct Clock {
    label: String,
    output: ValueId,
}

impl Clock {
    pub fn new(label: &str, output: ValueId) -> Self {
        Self {
            label: label.to_string(),
            output,
        }
    }

    pub fn output(&self) -> ValueId {
        self.output
    }
}

impl Node for Clock {
    fn type_name(&self) -> &'static str {
        "Clock"
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Clock
    }

    fn label(&self) -> Option<&str> {
        Some(&self.label)
    }

    fn ports(&self) -> Vec<Port> {
        Vec::new()
    }

    fn read(&mut self, _ctx: &ReadContext<'_>) -> SimResult<()> {
        Ok(())
    }

    fn write(&mut self, _ctx: &mut WriteContext<'_>) -> SimResult<()> {
        Ok(())
    }
}

/// Holds its output at 0 while the network starts up, then releases it to 1
pub struct Reset {
    output: ValueId,
    released: bool,
}

impl Reset {
    pub fn new(output: ValueId) -> Self {
        Self {
            output,
            released: false,
        }
    }
}

impl Node for Reset {
    fn type_name(&self) -> &'static str {
        "Reset"
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Io
    }

    fn ports(&self) -> Vec<Port> {
        vec![Port::output("Reset", self.output, 1)]
    }

    fn start(&mut self) -> bool {
        self.released = true;
        true
    }

    fn read(&mut self, _ctx: &ReadContext<'_>) -> SimResult<()> {
        Ok(())
    }

    fn write(&mut self, ctx: &mut WriteContext<'_>) -> SimResult<()> {
        ctx.set_bool(self.output, self.released)
    }
}

/// Break point watched by `Model::run_to_break`
///
/// Run-to-break toggles the single clock of the network, so a network with
/// a break must have exactly one clock source.
pub struct Break {
    label: String,
    input: ValueId,
    cycles: usize,
}

impl Break {
    pub fn new(label: &str, input: ValueId, cycles: usize) -> Self {
        Self {
            label: label.to_string(),
            input,
            cycles,
        }
    }

    pub fn input(&self) -> ValueId {
        self.input
    }

    /// Clock cycles allowed before the break counts as timed out
    pub fn cycles(&self) -> usize {
        self.cycles
    }
}

impl Node for Break {
    fn type_name(&self) -> &'static str {
        "Break"
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Io
    }

    fn label(&self) -> Option<&str> {
        Some(&self.label)
    }

    fn ports(&self) -> Vec<Port> {
        vec![Port::passive("brk", self.input, 1)]
    }

    fn init(&mut self, ctx: &InitContext) -> SimResult<()> {
        if ctx.clocks() != 1 {
            return Err(Fault::malformed(format!(
                "break '{}' needs exactly one clock, found {}",
                self.label,
                ctx.clocks()
            )));
        }
        Ok(())
    }

    fn read(&mut self, _ctx: &ReadContext<'_>) -> SimResult<()> {
        Ok(())
    }

    fn write(&mut self, _ctx: &mut WriteContext<'_>) -> SimResult<()> {
        Ok(())
    }
}
