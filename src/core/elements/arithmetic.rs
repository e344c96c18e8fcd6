use crate::core::components::{Node, Port, ReadContext, WriteContext};
use crate::core::fault::SimResult;
use crate::core::types::ValueId;
use crate::core::values::bits;

/// Binary adder: `s = a + b + c_i`, carry out in `c_o`
pub struct Adder {
    a: ValueId,
    b: ValueId,
    carry_in: ValueId,
    sum: ValueId,
    carry_out: ValueId,
    bits: u8,
    result: u64,
    carry: bool,
}

impl Adder {
    pub fn new(
        a: ValueId,
        b: ValueId,
        carry_in: ValueId,
        sum: ValueId,
        carry_out: ValueId,
        bits: u8,
    ) -> Self {
        Self {
            a,
            b,
            carry_in,
            sum,
            carry_out,
            bits,
            result: 0,
            carry: false,
        }
    }
}

impl Node for Adder {
    fn type_name(&self) -> &'static str {
        "Add"
    }

    fn ports(&self) -> Vec<Port> {
        vec![
            Port::input("a", self.a, self.bits),
            Port::input("b", self.b, self.bits),
            Port::input("c_i", self.carry_in, 1),
            Port::output("s", self.sum, self.bits),
            Port::output("c_o", self.carry_out, 1),
        ]
    }

    fn read(&mut self, ctx: &ReadContext<'_>) -> SimResult<()> {
        let full = u128::from(ctx.get(self.a)?)
            + u128::from(ctx.get(self.b)?)
            + u128::from(ctx.get(self.carry_in)?);
        self.result = (full & u128::from(bits::mask(self.bits))) as u64;
        self.carry = (full >> self.bits) & 1 == 1;
        Ok(())
    }

    fn write(&mut self, ctx: &mut WriteContext<'_>) -> SimResult<()> {
        ctx.set_value(self.sum, self.result)?;
        ctx.set_bool(self.carry_out, self.carry)
    }
}
