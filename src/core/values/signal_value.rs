use super::bits;
use super::bus::Bus;
use super::snapshot::ValueSnapshot;
use crate::core::fault::{Fault, SimResult};
use crate::core::types::{NodeId, ValueId};

/// Receiver of change notifications
///
/// `mark_dirty` is called synchronously from [`SignalValue::set`] and must
/// only record the node for a later update, never evaluate it.
pub trait ChangeListener {
    fn mark_dirty(&mut self, node: NodeId);
}

/// Who is allowed to change a signal value
#[derive(Debug, Clone)]
pub(crate) enum Drive {
    /// Not yet claimed by any node
    Unassigned,
    /// Set from outside the network (primary inputs, clocks)
    External,
    /// Never changes after construction
    Constant,
    /// Written by exactly one node
    Owned(NodeId),
    /// Resolved from several drivers
    Bus(Bus),
}

/// A fixed width multi-valued signal with change notification
///
/// Each bit is either 0, 1 or floating. Floating bits are stored as zero in
/// `value` and flagged in `high_z`.
#[derive(Debug, Clone)]
pub struct SignalValue {
    id: ValueId,
    name: String,
    bits: u8,
    mask: u64,
    value: u64,
    high_z: u64,
    listeners: Vec<NodeId>,
    pub(crate) drive: Drive,
}

impl SignalValue {
    /// Create a floating value
    pub(crate) fn new(id: ValueId, name: &str, bits: u8) -> SimResult<Self> {
        if bits == 0 || bits > bits::MAX_BITS {
            return Err(Fault::malformed(format!(
                "value '{}' declares {} bits, allowed are 1..={}",
                name,
                bits,
                bits::MAX_BITS
            )));
        }
        let mask = bits::mask(bits);
        Ok(Self {
            id,
            name: name.to_string(),
            bits,
            mask,
            value: 0,
            high_z: mask,
            listeners: Vec::new(),
            drive: Drive::Unassigned,
        })
    }

    pub fn id(&self) -> ValueId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    pub fn mask(&self) -> u64 {
        self.mask
    }

    /// Store a new state, notifying every listener if it differs from the old one
    ///
    /// Returns whether the state changed. Bits above the width are dropped.
    pub fn set(
        &mut self,
        value: u64,
        high_z: u64,
        listener: &mut dyn ChangeListener,
    ) -> SimResult<bool> {
        let high_z = high_z & self.mask;
        let value = value & self.mask & !high_z;
        if high_z == self.high_z && value == self.value {
            return Ok(false);
        }
        if matches!(self.drive, Drive::Constant) {
            return Err(Fault::malformed(format!(
                "tried to modify constant value '{}' ({})",
                self.name, self.id
            )));
        }

        self.high_z = high_z;
        self.value = value;
        for node in &self.listeners {
            listener.mark_dirty(*node);
        }
        Ok(true)
    }

    /// Set the initial state without notifying anyone
    pub(crate) fn preset(&mut self, value: u64, high_z: u64) {
        self.high_z = high_z & self.mask;
        self.value = value & self.mask & !self.high_z;
    }

    /// The defined value, failing if any bit floats
    pub fn get(&self) -> SimResult<u64> {
        if self.high_z != 0 {
            return Err(Fault::FloatingRead {
                value: self.id,
                node: None,
                generation: None,
            });
        }
        Ok(self.value)
    }

    /// The defined value, sign extended from the declared width
    pub fn get_signed(&self) -> SimResult<i64> {
        self.get().map(|v| bits::sign_extend(v, self.bits))
    }

    pub fn get_bool(&self) -> SimResult<bool> {
        self.get().map(|v| v != 0)
    }

    /// The value with every floating bit read as zero
    pub fn get_high_z_is_zero(&self) -> u64 {
        self.value
    }

    pub fn high_z(&self) -> u64 {
        self.high_z
    }

    pub fn is_high_z(&self) -> bool {
        self.high_z != 0
    }

    /// Fail if this value is not `bits` wide
    pub fn check_width(&self, bits: u8) -> SimResult<()> {
        if self.bits != bits {
            return Err(Fault::WidthMismatch {
                value: self.id,
                node: None,
                expected: bits,
                found: self.bits,
            });
        }
        Ok(())
    }

    /// Fail if `other` is not as wide as this value
    pub fn check_compatible(&self, other: &SignalValue) -> SimResult<()> {
        other.check_width(self.bits)
    }

    /// Register a node to be notified on change, used only while wiring
    pub fn add_listener(&mut self, node: NodeId) {
        if !self.listeners.contains(&node) {
            self.listeners.push(node);
        }
    }

    pub fn listeners(&self) -> &[NodeId] {
        &self.listeners
    }

    pub fn snapshot(&self) -> ValueSnapshot {
        ValueSnapshot {
            bits: self.bits,
            value: self.value,
            high_z: self.high_z,
        }
    }

    /// Owning node, if the value has exactly one driver
    pub fn owner(&self) -> Option<NodeId> {
        match self.drive {
            Drive::Owned(node) => Some(node),
            _ => None,
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self.drive, Drive::External)
    }

    pub fn is_constant(&self) -> bool {
        matches!(self.drive, Drive::Constant)
    }

    pub fn bus(&self) -> Option<&Bus> {
        match &self.drive {
            Drive::Bus(bus) => Some(bus),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        dirty: Vec<NodeId>,
    }

    impl ChangeListener for Recorder {
        fn mark_dirty(&mut self, node: NodeId) {
            self.dirty.push(node);
        }
    }

    fn value(bits: u8) -> SignalValue {
        SignalValue::new(ValueId(0), "v", bits).unwrap()
    }

    #[test]
    fn test_new_value_is_floating() {
        let v = value(4);
        assert!(v.is_high_z());
        assert_eq!(v.high_z(), 0xf);
        assert!(matches!(v.get(), Err(Fault::FloatingRead { .. })));
    }

    #[test]
    fn test_rejects_bad_width() {
        assert!(SignalValue::new(ValueId(0), "zero", 0).is_err());
        assert!(SignalValue::new(ValueId(0), "wide", 65).is_err());
        assert!(SignalValue::new(ValueId(0), "full", 64).is_ok());
    }

    #[test]
    fn test_set_masks_and_notifies() {
        let mut v = value(4);
        v.add_listener(NodeId(1));
        v.add_listener(NodeId(2));
        v.add_listener(NodeId(1));
        let mut rec = Recorder::default();

        assert!(v.set(0x1f, 0, &mut rec).unwrap());
        assert_eq!(v.get().unwrap(), 0xf);
        assert_eq!(rec.dirty, vec![NodeId(1), NodeId(2)]);
    }

    #[test]
    fn test_unchanged_set_is_silent() {
        let mut v = value(8);
        v.add_listener(NodeId(0));
        let mut rec = Recorder::default();
        v.set(5, 0, &mut rec).unwrap();
        rec.dirty.clear();

        assert!(!v.set(5, 0, &mut rec).unwrap());
        // bits above the width do not count as a change
        assert!(!v.set(0x105, 0, &mut rec).unwrap());
        assert!(rec.dirty.is_empty());
    }

    #[test]
    fn test_floating_bits_ignore_value() {
        let mut v = value(4);
        let mut rec = Recorder::default();
        v.set(0b0110, 0b0010, &mut rec).unwrap();
        assert_eq!(v.get_high_z_is_zero(), 0b0100);
        // only the value under a floating bit differs
        assert!(!v.set(0b0100, 0b0010, &mut rec).unwrap());
    }

    #[test]
    fn test_signed_and_bool() {
        let mut v = value(8);
        let mut rec = Recorder::default();
        v.set(0xfe, 0, &mut rec).unwrap();
        assert_eq!(v.get_signed().unwrap(), -2);
        assert!(v.get_bool().unwrap());
    }

    #[test]
    fn test_constant_rejects_change() {
        let mut v = value(1);
        v.drive = Drive::Constant;
        v.preset(1, 0);
        let mut rec = Recorder::default();
        assert!(!v.set(1, 0, &mut rec).unwrap());
        assert!(matches!(v.set(0, 0, &mut rec), Err(Fault::Malformed { .. })));
    }

    #[test]
    fn test_check_width() {
        let a = value(4);
        let b = SignalValue::new(ValueId(1), "b", 8).unwrap();
        assert!(a.check_width(4).is_ok());
        assert_eq!(
            a.check_compatible(&b),
            Err(Fault::WidthMismatch {
                value: ValueId(1),
                node: None,
                expected: 4,
                found: 8,
            })
        );
    }
}
