use crate::core::fault::{Fault, SimResult};
use crate::core::types::ValueId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Role of a named signal for test-vector and waveform consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProbeKind {
    /// Primary input; test vectors inject values through it
    Input,
    /// Primary output; test vectors check it
    Output,
    /// Internal signal shown in waveforms
    Signal,
}

/// Named binding to a signal value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    name: String,
    kind: ProbeKind,
    value: ValueId,
    writer: Option<ValueId>,
}

impl Probe {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ProbeKind {
        self.kind
    }

    /// Value read through this probe
    pub fn value(&self) -> ValueId {
        self.value
    }

    /// External value written through this probe; differs from
    /// [`Probe::value`] for bidirectional pins
    pub fn writer(&self) -> Option<ValueId> {
        self.writer
    }
}

/// Ordered registry of named signals
///
/// Names are unique within one network and are kept in registration order.
#[derive(Debug, Clone, Default)]
pub struct ProbeRegistry {
    probes: IndexMap<String, Probe>,
}

impl ProbeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical form of a probe name: trimmed, blanks replaced by `_`
    pub fn normalize_name(name: &str) -> String {
        name.trim().replace(' ', "_")
    }

    /// Bind a name to a value
    pub fn register(
        &mut self,
        name: &str,
        kind: ProbeKind,
        value: ValueId,
        writer: Option<ValueId>,
    ) -> SimResult<&Probe> {
        let name = Self::normalize_name(name);
        if name.is_empty() {
            return Err(Fault::malformed("there is an unnamed probe"));
        }
        if self.probes.contains_key(&name) {
            return Err(Fault::malformed(format!(
                "probe name '{}' is not unique",
                name
            )));
        }

        let probe = Probe {
            name: name.clone(),
            kind,
            value,
            writer,
        };
        Ok(self.probes.entry(name).or_insert(probe))
    }

    /// Probe registered under `name`, which is normalized like on registration
    pub fn get(&self, name: &str) -> Option<&Probe> {
        self.probes.get(&Self::normalize_name(name))
    }

    /// Like [`ProbeRegistry::get`] but failing for unknown names
    pub fn lookup(&self, name: &str) -> SimResult<&Probe> {
        self.get(name)
            .ok_or_else(|| Fault::malformed(format!("unknown probe '{}'", name)))
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Probe> {
        self.probes.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.probes.keys().map(|k| k.as_str())
    }

    pub fn inputs(&self) -> impl Iterator<Item = &Probe> {
        self.of_kind(ProbeKind::Input)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Probe> {
        self.of_kind(ProbeKind::Output)
    }

    pub fn signals(&self) -> impl Iterator<Item = &Probe> {
        self.of_kind(ProbeKind::Signal)
    }

    fn of_kind(&self, kind: ProbeKind) -> impl Iterator<Item = &Probe> {
        self.probes.values().filter(move |p| p.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_order_is_kept() {
        let mut registry = ProbeRegistry::new();
        registry
            .register("B", ProbeKind::Input, ValueId(1), Some(ValueId(1)))
            .unwrap();
        registry
            .register("A", ProbeKind::Input, ValueId(0), Some(ValueId(0)))
            .unwrap();
        registry
            .register("Y", ProbeKind::Output, ValueId(2), None)
            .unwrap();

        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["B", "A", "Y"]);
        assert_eq!(registry.inputs().count(), 2);
        assert_eq!(registry.outputs().count(), 1);
        assert_eq!(registry.signals().count(), 0);
    }

    #[test]
    fn test_names_are_normalized() {
        let mut registry = ProbeRegistry::new();
        let probe = registry
            .register("  carry out ", ProbeKind::Signal, ValueId(0), None)
            .unwrap();
        assert_eq!(probe.name(), "carry_out");
        assert!(registry.get("carry_out").is_some());
        assert_eq!(registry.get("carry out").map(Probe::name), Some("carry_out"));
        assert!(registry.lookup(" carry out").is_ok());
    }

    #[test]
    fn test_rejects_duplicates_and_empty_names() {
        let mut registry = ProbeRegistry::new();
        registry
            .register("A", ProbeKind::Input, ValueId(0), None)
            .unwrap();
        assert!(matches!(
            registry.register("A ", ProbeKind::Output, ValueId(1), None),
            Err(Fault::Malformed { .. })
        ));
        assert!(matches!(
            registry.register("   ", ProbeKind::Output, ValueId(1), None),
            Err(Fault::Malformed { .. })
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_unknown() {
        let registry = ProbeRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.lookup("nope").is_err());
    }
}
