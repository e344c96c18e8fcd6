use crate::core::execution::pending::PendingQueue;
use crate::core::fault::{Fault, SimResult};
use crate::core::types::{Generation, NodeId, ValueId};
use crate::core::values::signal_value::{Drive, SignalValue};
use crate::core::values::ValueSnapshot;

fn lookup(values: &[SignalValue], id: ValueId) -> SimResult<&SignalValue> {
    values
        .get(id.0)
        .ok_or_else(|| Fault::malformed(format!("unknown signal {}", id)))
}

/// Read phase view of the network
///
/// Offers read access to the values the node declared as input or passive
/// ports; a node cannot change any value while it holds this context.
pub struct ReadContext<'a> {
    node: NodeId,
    generation: Generation,
    values: &'a [SignalValue],
    readable: &'a [ValueId],
}

impl<'a> ReadContext<'a> {
    pub(crate) fn new(
        node: NodeId,
        generation: Generation,
        values: &'a [SignalValue],
        readable: &'a [ValueId],
    ) -> Self {
        Self {
            node,
            generation,
            values,
            readable,
        }
    }

    fn value(&self, id: ValueId) -> SimResult<&'a SignalValue> {
        let value = lookup(self.values, id)?;
        if self.readable.binary_search(&id).is_err() {
            return Err(Fault::malformed(format!(
                "{} reads {} ('{}') which is not one of its inputs",
                self.node,
                id,
                value.name()
            )));
        }
        Ok(value)
    }

    /// The node being evaluated
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Defined value of an input; floating bits raise a fault
    pub fn get(&self, id: ValueId) -> SimResult<u64> {
        self.value(id)?
            .get()
            .map_err(|f| f.at(self.node, self.generation))
    }

    pub fn get_signed(&self, id: ValueId) -> SimResult<i64> {
        self.value(id)?
            .get_signed()
            .map_err(|f| f.at(self.node, self.generation))
    }

    pub fn get_bool(&self, id: ValueId) -> SimResult<bool> {
        self.get(id).map(|v| v != 0)
    }

    /// Value with floating bits read as zero; never faults on high-z
    pub fn get_high_z_is_zero(&self, id: ValueId) -> SimResult<u64> {
        Ok(self.value(id)?.get_high_z_is_zero())
    }

    /// Floating bit mask of an input
    pub fn high_z(&self, id: ValueId) -> SimResult<u64> {
        Ok(self.value(id)?.high_z())
    }

    pub fn snapshot(&self, id: ValueId) -> SimResult<ValueSnapshot> {
        Ok(self.value(id)?.snapshot())
    }
}

/// Write phase view of the network
///
/// Offers no read access; a node may only change values it drives.
pub struct WriteContext<'a> {
    node: NodeId,
    generation: Generation,
    values: &'a mut [SignalValue],
    pending: &'a mut PendingQueue,
}

impl<'a> WriteContext<'a> {
    pub(crate) fn new(
        node: NodeId,
        generation: Generation,
        values: &'a mut [SignalValue],
        pending: &'a mut PendingQueue,
    ) -> Self {
        Self {
            node,
            generation,
            values,
            pending,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Drive an output; listeners of a changed value are queued for the next generation
    pub fn set(&mut self, id: ValueId, value: u64, high_z: u64) -> SimResult<()> {
        let node = self.node;
        let target = self
            .values
            .get_mut(id.0)
            .ok_or_else(|| Fault::malformed(format!("unknown signal {}", id)))?;
        let mask = target.mask();

        let resolved = match &mut target.drive {
            Drive::Owned(owner) if *owner == node => Some((value, high_z)),
            Drive::Bus(bus) => {
                if !bus.contribute(node, value & mask, high_z & mask) {
                    return Err(Fault::malformed(format!(
                        "{} is not a driver of bus {}",
                        node, id
                    )));
                }
                let resolved = bus.resolve(mask);
                if bus.is_conflict() {
                    self.pending.record_conflict(id);
                }
                Some(resolved)
            }
            _ => None,
        };
        let Some((value, high_z)) = resolved else {
            return Err(Fault::malformed(format!(
                "{} writes {} ('{}') which it does not drive",
                node,
                id,
                target.name()
            )));
        };

        target.set(value, high_z, &mut *self.pending)?;
        Ok(())
    }

    pub fn set_value(&mut self, id: ValueId, value: u64) -> SimResult<()> {
        self.set(id, value, 0)
    }

    pub fn set_bool(&mut self, id: ValueId, value: bool) -> SimResult<()> {
        self.set(id, u64::from(value), 0)
    }

    /// Release an output: every bit floats
    pub fn set_high_z(&mut self, id: ValueId) -> SimResult<()> {
        self.set(id, 0, u64::MAX)
    }
}

/// Network facts handed to the one-time initialization hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitContext {
    pub(crate) nodes: usize,
    pub(crate) clocks: usize,
}

impl InitContext {
    /// Number of registered nodes
    pub fn nodes(&self) -> usize {
        self.nodes
    }

    /// Number of registered clock sources
    pub fn clocks(&self) -> usize {
        self.clocks
    }
}
