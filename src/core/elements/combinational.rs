use crate::core::components::{Node, NodeKind, Port, ReadContext, WriteContext};
use crate::core::fault::{Fault, SimResult};
use crate::core::types::ValueId;

/// Evaluation function of a [`Combinational`] block: input words to output words
pub type EvaluateFn = Box<dyn FnMut(&[u64]) -> Vec<u64>>;

/// Composite block defined by a function of its inputs
///
/// Stands in for a flattened sub-circuit or a lookup table. The function
/// sees all input words in declaration order and returns one word per
/// output.
pub struct Combinational {
    name: String,
    inputs: Vec<(ValueId, u8)>,
    outputs: Vec<(ValueId, u8)>,
    evaluate_fn: EvaluateFn,
    results: Vec<u64>,
}

impl Combinational {
    pub fn new(name: &str, evaluate_fn: impl FnMut(&[u64]) -> Vec<u64> + 'static) -> Self {
        Self {
            name: name.to_string(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            evaluate_fn: Box::new(evaluate_fn),
            results: Vec::new(),
        }
    }

    pub fn input(mut self, value: ValueId, bits: u8) -> Self {
        self.inputs.push((value, bits));
        self
    }

    pub fn output(mut self, value: ValueId, bits: u8) -> Self {
        self.outputs.push((value, bits));
        self
    }
}

impl Node for Combinational {
    fn type_name(&self) -> &'static str {
        "Combinational"
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Composite
    }

    fn label(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn ports(&self) -> Vec<Port> {
        let inputs = self
            .inputs
            .iter()
            .map(|(value, bits)| Port::input("in", *value, *bits));
        let outputs = self
            .outputs
            .iter()
            .map(|(value, bits)| Port::output("out", *value, *bits));
        inputs.chain(outputs).collect()
    }

    fn read(&mut self, ctx: &ReadContext<'_>) -> SimResult<()> {
        let words = self
            .inputs
            .iter()
            .map(|(value, _)| ctx.get(*value))
            .collect::<SimResult<Vec<u64>>>()?;
        let results = (self.evaluate_fn)(&words);
        if results.len() != self.outputs.len() {
            return Err(Fault::malformed(format!(
                "block '{}' returned {} words for {} outputs",
                self.name,
                results.len(),
                self.outputs.len()
            )));
        }
        self.results = results;
        Ok(())
    }

    fn write(&mut self, ctx: &mut WriteContext<'_>) -> SimResult<()> {
        for ((value, _), word) in self.outputs.iter().zip(&self.results) {
            ctx.set_value(*value, *word)?;
        }
        Ok(())
    }
}
