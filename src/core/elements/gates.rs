use crate::core::components::{Node, Port, ReadContext, WriteContext};
use crate::core::fault::{Fault, SimResult};
use crate::core::types::ValueId;

macro_rules! gates {
    ($($Gate:ident: $op:expr, $invert:expr);* $(;)?) => {
        $(
            /// Bitwise gate over any number of equally wide inputs
            pub struct $Gate {
                inputs: Vec<ValueId>,
                output: ValueId,
                bits: u8,
                result: u64,
            }

            impl $Gate {
                pub fn new(inputs: Vec<ValueId>, output: ValueId, bits: u8) -> Self {
                    Self {
                        inputs,
                        output,
                        bits,
                        result: 0,
                    }
                }
            }

            impl Node for $Gate {
                fn type_name(&self) -> &'static str {
                    stringify!($Gate)
                }

                fn ports(&self) -> Vec<Port> {
                    let mut ports: Vec<Port> = self
                        .inputs
                        .iter()
                        .map(|v| Port::input("In", *v, self.bits))
                        .collect();
                    ports.push(Port::output("out", self.output, self.bits));
                    ports
                }

                fn read(&mut self, ctx: &ReadContext<'_>) -> SimResult<()> {
                    let Some((first, rest)) = self.inputs.split_first() else {
                        return Err(Fault::malformed(format!(
                            "{} at {} has no inputs",
                            stringify!($Gate),
                            ctx.node()
                        )));
                    };
                    let op: fn(u64, u64) -> u64 = $op;
                    let mut acc = ctx.get(*first)?;
                    for input in rest {
                        acc = op(acc, ctx.get(*input)?);
                    }
                    self.result = if $invert { !acc } else { acc };
                    Ok(())
                }

                fn write(&mut self, ctx: &mut WriteContext<'_>) -> SimResult<()> {
                    ctx.set_value(self.output, self.result)
                }
            }
        )*
    };
}

gates! {
    And: |a, b| a & b, false;
    Or: |a, b| a | b, false;
    Xor: |a, b| a ^ b, false;
    Nand: |a, b| a & b, true;
    Nor: |a, b| a | b, true;
    Xnor: |a, b| a ^ b, true;
}

/// Bitwise inverter
pub struct Not {
    input: ValueId,
    output: ValueId,
    bits: u8,
    result: u64,
}

impl Not {
    pub fn new(input: ValueId, output: ValueId, bits: u8) -> Self {
        Self {
            input,
            output,
            bits,
            result: 0,
        }
    }
}

impl Node for Not {
    fn type_name(&self) -> &'static str {
        "Not"
    }

    fn ports(&self) -> Vec<Port> {
        vec![
            Port::input("in", self.input, self.bits),
            Port::output("out", self.output, self.bits),
        ]
    }

    fn read(&mut self, ctx: &ReadContext<'_>) -> SimResult<()> {
        self.result = !ctx.get(self.input)?;
        Ok(())
    }

    fn write(&mut self, ctx: &mut WriteContext<'_>) -> SimResult<()> {
        ctx.set_value(self.output, self.result)
    }
}
