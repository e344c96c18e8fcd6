use crate::core::components::{Node, Port, ReadContext, WriteContext};
use crate::core::fault::{Fault, SimResult};
use crate::core::types::ValueId;
use crate::core::values::bits;

/// Drives a fixed value
///
/// Evaluated once during initialization. Mostly used as a bus driver; for a
/// plain constant signal see `Model::add_const`.
pub struct Const {
    output: ValueId,
    bits: u8,
    value: u64,
}

impl Const {
    pub fn new(output: ValueId, bits: u8, value: u64) -> Self {
        Self {
            output,
            bits,
            value,
        }
    }
}

impl Node for Const {
    fn type_name(&self) -> &'static str {
        "Const"
    }

    fn ports(&self) -> Vec<Port> {
        vec![Port::output("out", self.output, self.bits)]
    }

    fn read(&mut self, _ctx: &ReadContext<'_>) -> SimResult<()> {
        Ok(())
    }

    fn write(&mut self, ctx: &mut WriteContext<'_>) -> SimResult<()> {
        ctx.set_value(self.output, self.value)
    }
}

/// Tri-state buffer: passes its input while `sel` is 1, floats otherwise
pub struct Driver {
    input: ValueId,
    select: ValueId,
    output: ValueId,
    bits: u8,
    latched: Option<u64>,
}

impl Driver {
    pub fn new(input: ValueId, select: ValueId, output: ValueId, bits: u8) -> Self {
        Self {
            input,
            select,
            output,
            bits,
            latched: None,
        }
    }
}

impl Node for Driver {
    fn type_name(&self) -> &'static str {
        "Driver"
    }

    fn ports(&self) -> Vec<Port> {
        vec![
            Port::input("in", self.input, self.bits),
            Port::input("sel", self.select, 1),
            Port::output("out", self.output, self.bits),
        ]
    }

    fn read(&mut self, ctx: &ReadContext<'_>) -> SimResult<()> {
        self.latched = if ctx.get_bool(self.select)? {
            Some(ctx.get(self.input)?)
        } else {
            None
        };
        Ok(())
    }

    fn write(&mut self, ctx: &mut WriteContext<'_>) -> SimResult<()> {
        match self.latched {
            Some(value) => ctx.set_value(self.output, value),
            None => ctx.set_high_z(self.output),
        }
    }
}

/// Selects one of 2^n data inputs
pub struct Multiplexer {
    select: ValueId,
    inputs: Vec<ValueId>,
    output: ValueId,
    bits: u8,
    selected: u64,
}

impl Multiplexer {
    /// The select width is derived from the number of data inputs
    pub fn new(select: ValueId, inputs: Vec<ValueId>, output: ValueId, bits: u8) -> Self {
        Self {
            select,
            inputs,
            output,
            bits,
            selected: 0,
        }
    }

    pub fn select_bits(&self) -> u8 {
        bits::address_bits(self.inputs.len()).max(1)
    }
}

impl Node for Multiplexer {
    fn type_name(&self) -> &'static str {
        "Multiplexer"
    }

    fn ports(&self) -> Vec<Port> {
        let mut ports = vec![Port::input("sel", self.select, self.select_bits())];
        ports.extend(
            self.inputs
                .iter()
                .map(|v| Port::input("in", *v, self.bits)),
        );
        ports.push(Port::output("out", self.output, self.bits));
        ports
    }

    fn read(&mut self, ctx: &ReadContext<'_>) -> SimResult<()> {
        let index = ctx.get(self.select)?;
        let input = usize::try_from(index)
            .ok()
            .and_then(|i| self.inputs.get(i))
            .ok_or_else(|| {
                Fault::malformed(format!(
                    "multiplexer {} has no input {}",
                    ctx.node(),
                    index
                ))
            })?;
        self.selected = ctx.get(*input)?;
        Ok(())
    }

    fn write(&mut self, ctx: &mut WriteContext<'_>) -> SimResult<()> {
        ctx.set_value(self.output, self.selected)
    }
}
