use crate::core::components::{Node, NodeKind, Port, ReadContext, WriteContext};
use crate::core::fault::SimResult;
use crate::core::types::ValueId;
use crate::core::values::bits;

/// Edge triggered D flip-flop
///
/// Captures `D` when `C` goes from 0 to 1. `D` is a passive input, so data
/// changes never re-evaluate the flip-flop between clock edges.
pub struct DFlipFlop {
    label: Option<String>,
    data: ValueId,
    clock: ValueId,
    q: ValueId,
    q_inv: Option<ValueId>,
    bits: u8,
    value: u64,
    last_clock: bool,
}

impl DFlipFlop {
    pub fn new(data: ValueId, clock: ValueId, q: ValueId, bits: u8) -> Self {
        Self {
            label: None,
            data,
            clock,
            q,
            q_inv: None,
            bits,
            value: 0,
            last_clock: false,
        }
    }

    /// Also drive the inverted output `~Q`
    pub fn with_inverted(mut self, q_inv: ValueId) -> Self {
        self.q_inv = Some(q_inv);
        self
    }

    /// Value held before the first clock edge
    pub fn with_default(mut self, value: u64) -> Self {
        self.value = value & bits::mask(self.bits);
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// Currently stored value
    pub fn stored(&self) -> u64 {
        self.value
    }
}

impl Node for DFlipFlop {
    fn type_name(&self) -> &'static str {
        "D_FF"
    }

    fn kind(&self) -> NodeKind {
        NodeKind::FlipFlop
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn ports(&self) -> Vec<Port> {
        let mut ports = vec![
            Port::passive("D", self.data, self.bits),
            Port::input("C", self.clock, 1),
            Port::output("Q", self.q, self.bits),
        ];
        if let Some(q_inv) = self.q_inv {
            ports.push(Port::output("~Q", q_inv, self.bits));
        }
        ports
    }

    fn read(&mut self, ctx: &ReadContext<'_>) -> SimResult<()> {
        let clock = ctx.get_bool(self.clock)?;
        if clock && !self.last_clock {
            self.value = ctx.get(self.data)?;
        }
        self.last_clock = clock;
        Ok(())
    }

    fn write(&mut self, ctx: &mut WriteContext<'_>) -> SimResult<()> {
        ctx.set_value(self.q, self.value)?;
        if let Some(q_inv) = self.q_inv {
            ctx.set_value(q_inv, !self.value)?;
        }
        Ok(())
    }
}

/// Binary counter with enable and synchronous clear
///
/// Counts on the rising clock edge while `en` is 1; `ovf` is 1 while the
/// counter holds its maximum value and counting is enabled.
pub struct Counter {
    label: Option<String>,
    enable: ValueId,
    clock: ValueId,
    clear: ValueId,
    out: ValueId,
    overflow: ValueId,
    bits: u8,
    counter: u64,
    last_clock: bool,
    overflow_out: bool,
}

impl Counter {
    pub fn new(
        enable: ValueId,
        clock: ValueId,
        clear: ValueId,
        out: ValueId,
        overflow: ValueId,
        bits: u8,
    ) -> Self {
        Self {
            label: None,
            enable,
            clock,
            clear,
            out,
            overflow,
            bits,
            counter: 0,
            last_clock: false,
            overflow_out: false,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }
}

impl Node for Counter {
    fn type_name(&self) -> &'static str {
        "Counter"
    }

    fn kind(&self) -> NodeKind {
        NodeKind::FlipFlop
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn ports(&self) -> Vec<Port> {
        vec![
            Port::input("en", self.enable, 1),
            Port::input("C", self.clock, 1),
            Port::passive("clr", self.clear, 1),
            Port::output("out", self.out, self.bits),
            Port::output("ovf", self.overflow, 1),
        ]
    }

    fn read(&mut self, ctx: &ReadContext<'_>) -> SimResult<()> {
        let max = bits::mask(self.bits);
        let clock = ctx.get_bool(self.clock)?;
        let enable = ctx.get_bool(self.enable)?;
        if clock && !self.last_clock {
            if enable {
                self.counter = if self.counter == max { 0 } else { self.counter + 1 };
            }
            if ctx.get_bool(self.clear)? {
                self.counter = 0;
            }
        }
        self.last_clock = clock;
        self.overflow_out = self.counter == max && enable;
        Ok(())
    }

    fn write(&mut self, ctx: &mut WriteContext<'_>) -> SimResult<()> {
        ctx.set_bool(self.overflow, self.overflow_out)?;
        ctx.set_value(self.out, self.counter)
    }
}
