use crate::core::types::NodeId;
use serde::{Deserialize, Serialize};

/// Level a bus takes on bits that no driver defines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pull {
    /// Undriven bits float
    None,
    /// Undriven bits read as 1
    Up,
    /// Undriven bits read as 0
    Down,
}

impl Default for Pull {
    fn default() -> Self {
        Pull::None
    }
}

#[derive(Debug, Clone)]
struct BusDriver {
    node: NodeId,
    value: u64,
    high_z: u64,
}

/// Resolution state of a signal value with several drivers
///
/// Every driver keeps its last contribution. The resolved value is the OR of
/// all defined bits; two drivers defining the same bit with different
/// levels is a short circuit.
#[derive(Debug, Clone)]
pub struct Bus {
    pull: Pull,
    drivers: Vec<BusDriver>,
    conflict: bool,
}

impl Bus {
    pub(crate) fn new(pull: Pull) -> Self {
        Self {
            pull,
            drivers: Vec::new(),
            conflict: false,
        }
    }

    /// Register a driver; its contribution starts out floating
    pub(crate) fn add_driver(&mut self, node: NodeId, mask: u64) {
        if !self.is_driver(node) {
            self.drivers.push(BusDriver {
                node,
                value: 0,
                high_z: mask,
            });
        }
    }

    pub fn is_driver(&self, node: NodeId) -> bool {
        self.drivers.iter().any(|d| d.node == node)
    }

    /// Store a driver's contribution, returns false for unknown drivers
    pub(crate) fn contribute(&mut self, node: NodeId, value: u64, high_z: u64) -> bool {
        match self.drivers.iter_mut().find(|d| d.node == node) {
            Some(driver) => {
                driver.high_z = high_z;
                driver.value = value & !high_z;
                true
            }
            None => false,
        }
    }

    /// Combine all contributions into the value seen by readers
    ///
    /// Returns `(value, high_z)` and updates the conflict flag.
    pub(crate) fn resolve(&mut self, mask: u64) -> (u64, u64) {
        let mut high_z = mask;
        let mut value = 0;
        for driver in &self.drivers {
            high_z &= driver.high_z;
            value |= driver.value;
        }

        self.conflict = self.drivers.iter().any(|driver| {
            let both_define = !(high_z | driver.high_z) & mask;
            value & both_define != driver.value & both_define
        });

        match self.pull {
            Pull::Up => ((value | high_z) & mask, 0),
            Pull::Down => (value, 0),
            Pull::None => (value, high_z),
        }
    }

    /// True if the last resolution found a short circuit
    pub fn is_conflict(&self) -> bool {
        self.conflict
    }

    /// Drivers currently defining at least one bit
    pub fn active_drivers(&self, mask: u64) -> Vec<NodeId> {
        self.drivers
            .iter()
            .filter(|d| d.high_z & mask != mask)
            .map(|d| d.node)
            .collect()
    }

    pub fn pull(&self) -> Pull {
        self.pull
    }

    pub fn driver_count(&self) -> usize {
        self.drivers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bus_with(pull: Pull, drivers: usize) -> Bus {
        let mut bus = Bus::new(pull);
        for i in 0..drivers {
            bus.add_driver(NodeId(i), 0xf);
        }
        bus
    }

    #[test]
    fn test_all_floating() {
        let mut bus = bus_with(Pull::None, 2);
        assert_eq!(bus.resolve(0xf), (0, 0xf));
        assert!(!bus.is_conflict());
        assert!(bus.active_drivers(0xf).is_empty());
    }

    #[test]
    fn test_single_driver_wins() {
        let mut bus = bus_with(Pull::None, 2);
        assert!(bus.contribute(NodeId(1), 0b1010, 0));
        assert_eq!(bus.resolve(0xf), (0b1010, 0));
        assert!(!bus.is_conflict());
        assert_eq!(bus.active_drivers(0xf), vec![NodeId(1)]);
    }

    #[test]
    fn test_disjoint_bits_combine() {
        let mut bus = bus_with(Pull::None, 2);
        bus.contribute(NodeId(0), 0b0011, 0b1100);
        bus.contribute(NodeId(1), 0b1000, 0b0011);
        assert_eq!(bus.resolve(0xf), (0b1011, 0));
        assert!(!bus.is_conflict());
    }

    #[test]
    fn test_conflict_detected() {
        let mut bus = bus_with(Pull::None, 2);
        bus.contribute(NodeId(0), 0b0001, 0);
        bus.contribute(NodeId(1), 0b0000, 0);
        bus.resolve(0xf);
        assert!(bus.is_conflict());
        assert_eq!(bus.active_drivers(0xf), vec![NodeId(0), NodeId(1)]);

        // one driver releases the bus
        bus.contribute(NodeId(1), 0, 0xf);
        assert_eq!(bus.resolve(0xf), (0b0001, 0));
        assert!(!bus.is_conflict());
    }

    #[test]
    fn test_pull_resistors() {
        let mut up = bus_with(Pull::Up, 1);
        up.contribute(NodeId(0), 0b0001, 0b1110);
        assert_eq!(up.resolve(0xf), (0b1111, 0));

        let mut down = bus_with(Pull::Down, 1);
        down.contribute(NodeId(0), 0b0001, 0b1110);
        assert_eq!(down.resolve(0xf), (0b0001, 0));
    }

    #[test]
    fn test_unknown_driver_rejected() {
        let mut bus = bus_with(Pull::None, 1);
        assert!(!bus.contribute(NodeId(7), 1, 0));
        assert_eq!(bus.driver_count(), 1);
    }
}
