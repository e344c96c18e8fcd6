use crate::core::components::{InitContext, Node, NodeKind, Port, ReadContext, WriteContext};
use crate::core::fault::{Fault, SimResult};
use crate::core::types::ValueId;
use crate::core::values::bits;
use std::collections::HashMap;

/// Widest address a RAM accepts
pub const MAX_ADDRESS_BITS: u8 = 32;

/// Signals a single port RAM is wired to
#[derive(Debug, Clone, Copy)]
pub struct RamPins {
    /// Address `A`
    pub address: ValueId,
    /// Data written on a store `D_in`
    pub data_in: ValueId,
    /// Store enable `str`
    pub store: ValueId,
    /// Clock `C`
    pub clock: ValueId,
    /// Output enable `ld`
    pub load: ValueId,
    /// Data output `D`
    pub data_out: ValueId,
}

/// Single port RAM with separate data in and out
///
/// Writes `D_in` to `A` on a rising clock edge while `str` is 1. While `ld`
/// is 1 the word at `A` is driven on `D`, otherwise `D` floats. Unwritten
/// words read as zero.
pub struct Ram {
    label: Option<String>,
    pins: RamPins,
    address_bits: u8,
    data_bits: u8,
    memory: HashMap<u64, u64>,
    last_clock: bool,
    output: Option<u64>,
}

impl Ram {
    pub fn new(pins: RamPins, address_bits: u8, data_bits: u8) -> Self {
        Self {
            label: None,
            pins,
            address_bits,
            data_bits,
            memory: HashMap::new(),
            last_clock: false,
            output: None,
        }
    }

    /// Fill memory from address zero upwards
    pub fn with_contents(mut self, words: &[u64]) -> Self {
        let mask = bits::mask(self.data_bits);
        for (address, word) in words.iter().enumerate() {
            self.memory.insert(address as u64, word & mask);
        }
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// Word stored at `address`
    pub fn word(&self, address: u64) -> u64 {
        self.memory.get(&address).copied().unwrap_or(0)
    }
}

impl Node for Ram {
    fn type_name(&self) -> &'static str {
        "RAMSinglePort"
    }

    fn kind(&self) -> NodeKind {
        NodeKind::FlipFlop
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    fn ports(&self) -> Vec<Port> {
        vec![
            Port::input("A", self.pins.address, self.address_bits),
            Port::passive("D_in", self.pins.data_in, self.data_bits),
            Port::passive("str", self.pins.store, 1),
            Port::input("C", self.pins.clock, 1),
            Port::input("ld", self.pins.load, 1),
            Port::output("D", self.pins.data_out, self.data_bits),
        ]
    }

    fn init(&mut self, _ctx: &InitContext) -> SimResult<()> {
        if self.address_bits > MAX_ADDRESS_BITS {
            return Err(Fault::malformed(format!(
                "RAM with {} address bits exceeds the limit of {}",
                self.address_bits, MAX_ADDRESS_BITS
            )));
        }
        Ok(())
    }

    fn read(&mut self, ctx: &ReadContext<'_>) -> SimResult<()> {
        let clock = ctx.get_bool(self.pins.clock)?;
        let load = ctx.get_bool(self.pins.load)?;
        if clock && !self.last_clock && ctx.get_bool(self.pins.store)? {
            let address = ctx.get(self.pins.address)?;
            let word = ctx.get(self.pins.data_in)?;
            self.memory.insert(address, word);
        }
        self.last_clock = clock;

        self.output = if load {
            Some(self.word(ctx.get(self.pins.address)?))
        } else {
            None
        };
        Ok(())
    }

    fn write(&mut self, ctx: &mut WriteContext<'_>) -> SimResult<()> {
        match self.output {
            Some(word) => ctx.set_value(self.pins.data_out, word),
            None => ctx.set_high_z(self.pins.data_out),
        }
    }
}
