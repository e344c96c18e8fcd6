use super::breaks::BreakWatch;
use super::config::{EvaluationMode, SimulationConfig};
use super::observer::SimulationObserver;
use super::pending::PendingQueue;
use super::report::{BreakInfo, SettleReport};
use crate::core::components::{InitContext, Node, PortKind, ReadContext, WriteContext};
use crate::core::elements::{Break, Clock};
use crate::core::fault::{Fault, SimResult};
use crate::core::probes::{ProbeKind, ProbeRegistry};
use crate::core::types::{Generation, NodeId, ValueId};
use crate::core::values::signal_value::Drive;
use crate::core::values::{Bus, ChangeListener, Pull, SignalValue, ValueSnapshot};
use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeSet;

/// Lifecycle of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    /// Values and nodes may be added
    Building,
    /// Node init hooks have run but the first settle has not completed
    Initializing,
    /// The network is live; only stimulus is accepted
    Running,
}

#[derive(Debug, Clone, Copy)]
struct ClockSource {
    node: NodeId,
    output: ValueId,
}

/// A logic network and its dependency scheduler
///
/// The model owns every signal value and node. Nodes refer to values by
/// [`ValueId`] only, so the many-to-many wiring between them needs no
/// shared ownership. Changed values queue their listeners in the pending
/// queue, and [`Model::settle`] drains it one generation at a time until a
/// fixed point is reached.
pub struct Model {
    config: SimulationConfig,
    state: ModelState,
    nodes: Vec<Box<dyn Node>>,
    /// Sorted input and passive values of each node
    readable: Vec<Vec<ValueId>>,
    values: Vec<SignalValue>,
    pending: PendingQueue,
    clocks: Vec<ClockSource>,
    breaks: Vec<BreakWatch>,
    probes: ProbeRegistry,
    observers: Vec<Box<dyn SimulationObserver>>,
    rng: StdRng,
}

impl Model {
    pub fn new() -> Self {
        Self::with_config(SimulationConfig::default())
    }

    pub fn with_config(config: SimulationConfig) -> Self {
        let seed = match config.evaluation {
            EvaluationMode::Shuffled { seed } => seed,
            EvaluationMode::Synchronous => 0,
        };
        let rng = StdRng::seed_from_u64(seed);
        Self {
            config,
            state: ModelState::Building,
            nodes: Vec::new(),
            readable: Vec::new(),
            values: Vec::new(),
            pending: PendingQueue::new(),
            clocks: Vec::new(),
            breaks: Vec::new(),
            probes: ProbeRegistry::new(),
            observers: Vec::new(),
            rng,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ModelState::Running
    }

    fn ensure_building(&self, what: &str) -> SimResult<()> {
        if self.state != ModelState::Building {
            return Err(Fault::malformed(format!(
                "cannot add {} after the model was started",
                what
            )));
        }
        Ok(())
    }

    fn next_value(&self, name: &str, bits: u8) -> SimResult<SignalValue> {
        SignalValue::new(ValueId(self.values.len()), name, bits)
    }

    fn push_value(&mut self, value: SignalValue) -> ValueId {
        let id = value.id();
        self.values.push(value);
        id
    }

    // ------------------------------------------------------------------
    // Signal values
    // ------------------------------------------------------------------

    /// Create a floating value that exactly one node will drive
    pub fn add_value(&mut self, name: &str, bits: u8) -> SimResult<ValueId> {
        self.ensure_building("a value")?;
        let value = self.next_value(name, bits)?;
        Ok(self.push_value(value))
    }

    /// Create a primary input set from outside the network
    ///
    /// The input starts at 0 and is registered as an input probe under `name`.
    pub fn add_input(&mut self, name: &str, bits: u8) -> SimResult<ValueId> {
        self.ensure_building("an input")?;
        let mut value = self.next_value(name, bits)?;
        value.drive = Drive::External;
        value.preset(0, 0);
        let id = value.id();
        self.probes.register(name, ProbeKind::Input, id, Some(id))?;
        Ok(self.push_value(value))
    }

    /// Create a value fixed at `constant`
    pub fn add_const(&mut self, name: &str, bits: u8, constant: u64) -> SimResult<ValueId> {
        self.ensure_building("a constant")?;
        let mut value = self.next_value(name, bits)?;
        value.drive = Drive::Constant;
        value.preset(constant, 0);
        Ok(self.push_value(value))
    }

    /// Create a value several nodes may drive at once
    pub fn add_bus(&mut self, name: &str, bits: u8, pull: Pull) -> SimResult<ValueId> {
        self.ensure_building("a bus")?;
        let mut value = self.next_value(name, bits)?;
        let mut bus = Bus::new(pull);
        let (resolved, high_z) = bus.resolve(value.mask());
        value.preset(resolved, high_z);
        value.drive = Drive::Bus(bus);
        Ok(self.push_value(value))
    }

    pub fn value(&self, id: ValueId) -> SimResult<&SignalValue> {
        self.values
            .get(id.index())
            .ok_or_else(|| Fault::malformed(format!("unknown signal {}", id)))
    }

    /// Current state of a value
    pub fn read(&self, id: ValueId) -> SimResult<ValueSnapshot> {
        self.value(id).map(SignalValue::snapshot)
    }

    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    /// Wire a node into the network
    ///
    /// Port widths are checked against the values, listeners are attached
    /// for inputs and outputs are claimed. Nothing is changed if any port is
    /// rejected.
    pub fn add_node(&mut self, node: impl Node + 'static) -> SimResult<NodeId> {
        self.ensure_building("a node")?;
        let id = NodeId(self.nodes.len());
        let ports = node.ports();

        for port in &ports {
            let value = self.value(port.value)?;
            value
                .check_width(port.bits)
                .map_err(|f| f.at(id, self.pending.generation()))?;
            if port.kind.is_output() && !matches!(value.drive, Drive::Unassigned | Drive::Bus(_)) {
                return Err(Fault::malformed(format!(
                    "{} port '{}' drives {} ('{}') which already has a driver",
                    node.type_name(),
                    port.name,
                    port.value,
                    value.name()
                )));
            }
        }

        for port in &ports {
            let value = &mut self.values[port.value.index()];
            let mask = value.mask();
            match port.kind {
                PortKind::Input => value.add_listener(id),
                PortKind::Passive => {}
                PortKind::Output => match &mut value.drive {
                    Drive::Bus(bus) => bus.add_driver(id, mask),
                    drive => *drive = Drive::Owned(id),
                },
            }
        }

        let mut readable: Vec<ValueId> = ports
            .iter()
            .filter(|p| !p.kind.is_output())
            .map(|p| p.value)
            .collect();
        readable.sort_unstable();
        readable.dedup();

        self.nodes.push(Box::new(node));
        self.readable.push(readable);
        let registered = self.pending.register();
        debug_assert_eq!(registered, id);
        Ok(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Short human readable description of a node for diagnostics
    pub fn describe(&self, id: NodeId) -> SimResult<String> {
        let node = self
            .nodes
            .get(id.index())
            .ok_or_else(|| Fault::malformed(format!("unknown node {}", id)))?;
        Ok(match node.label() {
            Some(label) => format!("{} '{}' ({}, {})", node.type_name(), label, node.kind(), id),
            None => format!("{} ({}, {})", node.type_name(), node.kind(), id),
        })
    }

    // ------------------------------------------------------------------
    // Clocks and breaks
    // ------------------------------------------------------------------

    /// Add a clock source with a 1-bit output starting low
    ///
    /// The output is returned by [`Model::clock_output`] and registered as
    /// an input probe under `name`.
    pub fn add_clock(&mut self, name: &str) -> SimResult<NodeId> {
        self.ensure_building("a clock")?;
        let output = self.add_input(name, 1)?;
        let node = self.add_node(Clock::new(name, output))?;
        self.clocks.push(ClockSource { node, output });
        Ok(node)
    }

    /// Output value of a clock source
    pub fn clock_output(&self, clock: NodeId) -> SimResult<ValueId> {
        self.clock_source(clock).map(|c| c.output)
    }

    pub fn clocks(&self) -> Vec<NodeId> {
        self.clocks.iter().map(|c| c.node).collect()
    }

    fn clock_source(&self, clock: NodeId) -> SimResult<ClockSource> {
        self.clocks
            .iter()
            .find(|c| c.node == clock)
            .copied()
            .ok_or_else(|| Fault::malformed(format!("{} is not a clock source", clock)))
    }

    /// Add a break point watching `input`
    ///
    /// `cycles` is the number of clock cycles [`Model::run_to_break`] may run
    /// without the break firing; zero disables the limit.
    pub fn add_break(&mut self, label: &str, input: ValueId, cycles: usize) -> SimResult<NodeId> {
        let node = self.add_node(Break::new(label, input, cycles))?;
        self.breaks.push(BreakWatch::new(node, input, label, cycles));
        Ok(node)
    }

    // ------------------------------------------------------------------
    // Probes
    // ------------------------------------------------------------------

    /// Bind a name to a value
    ///
    /// Input probes write to the value they read, which must therefore be
    /// driven from outside the network.
    pub fn add_probe(&mut self, name: &str, kind: ProbeKind, value: ValueId) -> SimResult<()> {
        let writer = match kind {
            ProbeKind::Input => Some(value),
            ProbeKind::Output | ProbeKind::Signal => None,
        };
        self.register_probe(name, kind, value, writer)
    }

    /// Bind a name to a pin that is written through one value and read
    /// back through another, e.g. a tri-state pin with its own driver
    pub fn add_bidirectional_probe(
        &mut self,
        name: &str,
        read: ValueId,
        write: ValueId,
    ) -> SimResult<()> {
        self.register_probe(name, ProbeKind::Input, read, Some(write))
    }

    fn register_probe(
        &mut self,
        name: &str,
        kind: ProbeKind,
        value: ValueId,
        writer: Option<ValueId>,
    ) -> SimResult<()> {
        self.ensure_building("a probe")?;
        self.value(value)?;
        if let Some(writer) = writer {
            let target = self.value(writer)?;
            if !target.is_external() {
                return Err(Fault::malformed(format!(
                    "probe '{}' writes {} ('{}') which is driven inside the network",
                    name,
                    writer,
                    target.name()
                )));
            }
        }
        self.probes.register(name, kind, value, writer)?;
        Ok(())
    }

    pub fn probes(&self) -> &ProbeRegistry {
        &self.probes
    }

    pub fn read_probe(&self, name: &str) -> SimResult<ValueSnapshot> {
        let probe = self.probes.lookup(name)?;
        self.read(probe.value())
    }

    /// Inject a value through an input probe; call [`Model::settle`] afterwards
    pub fn write_probe(&mut self, name: &str, value: u64, high_z: u64) -> SimResult<()> {
        let probe = self.probes.lookup(name)?;
        let Some(writer) = probe.writer() else {
            return Err(Fault::malformed(format!("probe '{}' is read-only", name)));
        };
        self.set_external(writer, value, high_z)?;
        Ok(())
    }

    pub fn add_observer(&mut self, observer: Box<dyn SimulationObserver>) {
        self.observers.push(observer);
    }

    // ------------------------------------------------------------------
    // Stimulus
    // ------------------------------------------------------------------

    /// Change an externally driven value and queue its listeners
    ///
    /// Returns whether the value changed. Nothing is evaluated until the
    /// next [`Model::settle`].
    pub fn set_external(&mut self, id: ValueId, value: u64, high_z: u64) -> SimResult<bool> {
        let target = self
            .values
            .get_mut(id.index())
            .ok_or_else(|| Fault::malformed(format!("unknown signal {}", id)))?;
        if !target.is_external() {
            return Err(Fault::malformed(format!(
                "{} ('{}') is not an external input",
                id,
                target.name()
            )));
        }
        target.set(value, high_z, &mut self.pending)
    }

    pub fn set_input(&mut self, id: ValueId, value: u64) -> SimResult<bool> {
        self.set_external(id, value, 0)
    }

    /// Let every bit of an external input float
    pub fn set_input_high_z(&mut self, id: ValueId) -> SimResult<bool> {
        self.set_external(id, 0, u64::MAX)
    }

    // ------------------------------------------------------------------
    // Running
    // ------------------------------------------------------------------

    /// Start the network
    ///
    /// Runs the one-time node hooks and lets every node drive its power-on
    /// state. Then all nodes are evaluated until the network is stable, the
    /// reset elements are released and the network settles again.
    pub fn init(&mut self) -> SimResult<SettleReport> {
        match self.state {
            ModelState::Running => return Err(Fault::malformed("model is already running")),
            ModelState::Building => {
                let ctx = InitContext {
                    nodes: self.nodes.len(),
                    clocks: self.clocks.len(),
                };
                let generation = self.pending.generation();
                let failed = self.nodes.iter_mut().enumerate().find_map(|(index, node)| {
                    node.init(&ctx)
                        .err()
                        .map(|f| f.at(NodeId(index), generation))
                });
                if let Some(fault) = failed {
                    return Err(self.fail(fault));
                }
                self.state = ModelState::Initializing;

                // power-on state: every output is driven once before anything is read
                for index in 0..self.nodes.len() {
                    if let Err(fault) = self.write_node(NodeId(index), generation) {
                        return Err(self.fail(fault));
                    }
                }
            }
            ModelState::Initializing => {}
        }

        for index in 0..self.nodes.len() {
            self.pending.mark_dirty(NodeId(index));
        }
        let mut report = match self.settle_network() {
            Ok(report) => report,
            Err(fault) => return Err(self.fail(fault)),
        };

        let started: Vec<NodeId> = self
            .nodes
            .iter_mut()
            .enumerate()
            .filter_map(|(index, node)| node.start().then_some(NodeId(index)))
            .collect();
        self.pending.requeue(&started);
        match self.settle_network() {
            Ok(later) => report.absorb(later),
            Err(fault) => return Err(self.fail(fault)),
        }

        self.state = ModelState::Running;
        info!(
            "model started: {} nodes, {} values, {} iterations",
            self.nodes.len(),
            self.values.len(),
            report.iterations
        );
        for observer in &mut self.observers {
            observer.on_start(&report);
        }
        Ok(report)
    }

    /// Propagate pending changes until no node needs an update
    ///
    /// Starts the model first if [`Model::init`] has not completed yet.
    pub fn settle(&mut self) -> SimResult<SettleReport> {
        if !self.is_running() {
            return self.init();
        }
        match self.settle_network() {
            Ok(report) => {
                for observer in &mut self.observers {
                    observer.on_step(&report);
                }
                Ok(report)
            }
            Err(fault) => Err(self.fail(fault)),
        }
    }

    /// Run exactly one generation and return the nodes it evaluated
    pub fn micro_step(&mut self) -> SimResult<Vec<NodeId>> {
        if !self.is_running() {
            return Err(Fault::malformed("micro step before the model was started"));
        }
        let stepped = match self.step(false) {
            Ok(stepped) => stepped,
            Err(fault) => return Err(self.fail(fault)),
        };
        if !self.pending.needs_update() {
            if let Err(fault) = self.check_conflicts() {
                return Err(self.fail(fault));
            }
        }
        Ok(stepped)
    }

    pub fn needs_update(&self) -> bool {
        self.pending.needs_update()
    }

    /// Nodes queued for the next generation
    pub fn pending_nodes(&self) -> &[NodeId] {
        self.pending.pending()
    }

    pub fn generation(&self) -> Generation {
        self.pending.generation()
    }

    /// Toggle a clock and settle
    pub fn clock_edge(&mut self, clock: NodeId) -> SimResult<SettleReport> {
        let source = self.clock_source(clock)?;
        if !self.is_running() {
            self.init()?;
        }
        let level = self.values[source.output.index()].get_high_z_is_zero();
        self.set_external(source.output, !level & 1, 0)?;
        self.settle()
    }

    /// Two clock edges, a full period
    pub fn clock_cycle(&mut self, clock: NodeId) -> SimResult<SettleReport> {
        let mut report = self.clock_edge(clock)?;
        report.absorb(self.clock_edge(clock)?);
        Ok(report)
    }

    /// Toggle the clock until a break element sees a rising edge
    ///
    /// `timeout` limits the number of half cycles; `None` runs until a
    /// break fires or a break's own cycle budget is exceeded.
    pub fn run_to_break(&mut self, timeout: Option<usize>) -> SimResult<BreakInfo> {
        if self.breaks.is_empty() {
            return Err(Fault::malformed("run to break needs a break element"));
        }
        let clock = match self.clocks.as_slice() {
            [source] => source.node,
            _ => {
                return Err(Fault::malformed(format!(
                    "run to break needs exactly one clock, found {}",
                    self.clocks.len()
                )))
            }
        };
        if !self.is_running() {
            self.init()?;
        }
        self.arm_breaks();

        let mut steps = 0;
        loop {
            if timeout.is_some_and(|limit| steps >= limit) {
                info!("run to break timed out after {} half cycles", steps);
                return Ok(BreakInfo {
                    label: None,
                    steps,
                    timeout: true,
                });
            }
            self.clock_edge(clock)?;
            steps += 1;

            match self.detect_break() {
                Ok(Some(label)) => {
                    info!("break '{}' after {} half cycles", label, steps);
                    return Ok(BreakInfo {
                        label: Some(label),
                        steps,
                        timeout: false,
                    });
                }
                Ok(None) => {}
                Err(fault) => return Err(self.fail(fault)),
            }
        }
    }

    /// Like [`Model::run_to_break`] but checks the breaks after every micro step
    ///
    /// The run stops inside a settle as soon as a break input rises; the
    /// nodes not evaluated yet stay queued for the next [`Model::settle`] or
    /// [`Model::micro_step`]. The clock is only toggled once the network is
    /// stable. Without break elements the network is settled and `None` is
    /// returned. `timeout` limits the number of rounds, each finishing the
    /// pending settle or running the next half cycle.
    pub fn run_to_break_micro(&mut self, timeout: Option<usize>) -> SimResult<Option<BreakInfo>> {
        if self.breaks.is_empty() {
            self.settle()?;
            return Ok(None);
        }
        let clock = match self.clocks.as_slice() {
            [source] => source.output,
            _ => {
                return Err(Fault::malformed(format!(
                    "run to break needs exactly one clock, found {}",
                    self.clocks.len()
                )))
            }
        };
        if !self.is_running() {
            self.init()?;
        }
        self.arm_breaks();

        let mut steps = 0;
        loop {
            if timeout.is_some_and(|limit| steps >= limit) {
                info!("run to break timed out after {} half cycles", steps);
                return Ok(Some(BreakInfo {
                    label: None,
                    steps,
                    timeout: true,
                }));
            }
            if !self.pending.needs_update() {
                let level = self.values[clock.index()].get_high_z_is_zero();
                self.set_external(clock, !level & 1, 0)?;
            }
            steps += 1;

            match self.step_to_break() {
                Ok(Some(label)) => {
                    info!("break '{}' after {} half cycles (micro steps)", label, steps);
                    return Ok(Some(BreakInfo {
                        label: Some(label),
                        steps,
                        timeout: false,
                    }));
                }
                Ok(None) => {}
                Err(fault) => return Err(self.fail(fault)),
            }
        }
    }

    fn arm_breaks(&mut self) {
        for watch in &mut self.breaks {
            let level = self.values[watch.input.index()].get_high_z_is_zero() != 0;
            watch.arm(level);
        }
    }

    /// Micro step until a break input rises or the network is stable
    fn step_to_break(&mut self) -> SimResult<Option<String>> {
        let mut iterations = 0;
        while self.pending.needs_update() {
            if iterations >= self.config.oscillation_cap.max(1) {
                iterations += self.collect_oscillation(iterations)?;
                continue;
            }
            self.step(false)?;
            iterations += 1;

            for watch in &mut self.breaks {
                let level = self.values[watch.input.index()].get_high_z_is_zero() != 0;
                if watch.edge(level) {
                    trace!("break {} fired after {} micro steps", watch.node, iterations);
                    return Ok(Some(watch.label.clone()));
                }
            }
        }
        self.check_conflicts()?;
        for watch in &mut self.breaks {
            watch.tick()?;
        }
        Ok(None)
    }

    fn detect_break(&mut self) -> SimResult<Option<String>> {
        for watch in &mut self.breaks {
            let level = self.values[watch.input.index()].get_high_z_is_zero() != 0;
            if watch.detect(level)? {
                trace!("break {} fired", watch.node);
                return Ok(Some(watch.label.clone()));
            }
        }
        Ok(None)
    }

    // ------------------------------------------------------------------
    // Settle loop
    // ------------------------------------------------------------------

    fn settle_network(&mut self) -> SimResult<SettleReport> {
        let mut report = SettleReport::default();
        while self.pending.needs_update() {
            if report.iterations >= self.config.oscillation_cap.max(1) {
                report.iterations += self.collect_oscillation(report.iterations)?;
                continue;
            }
            let stepped = self.step(false)?;
            report.iterations += 1;
            report.evaluations += stepped.len();
        }
        self.check_conflicts()?;
        report.generation = self.pending.generation();
        debug!(
            "settle took {} iterations, {} evaluations",
            report.iterations, report.evaluations
        );
        Ok(report)
    }

    /// Step on past the cap to collect the nodes taking part in the loop
    ///
    /// Returns the number of extra iterations if the queue drained within
    /// the collection window, otherwise the oscillation fault. With
    /// recovery enabled the window is evaluated shuffled.
    fn collect_oscillation(&mut self, iterations: usize) -> SimResult<usize> {
        let mut nodes: BTreeSet<NodeId> = self.pending.pending().iter().copied().collect();
        let window = self.config.collection_window();
        let noise = self.config.recover_from_oscillation;
        if window > 0 {
            warn!(
                "no fixed point after {} iterations, collecting oscillating nodes",
                iterations
            );
        }
        for extra in 0..window {
            if !self.pending.needs_update() {
                info!("network settled {} iterations after the cap", extra);
                return Ok(extra);
            }
            nodes.extend(self.step(noise)?);
        }
        if !self.pending.needs_update() {
            info!("network settled {} iterations after the cap", window);
            return Ok(window);
        }
        Err(Fault::Oscillation {
            nodes: nodes.into_iter().collect(),
            generation: self.pending.generation(),
            iterations,
        })
    }

    /// One generation: snapshot the queue, then evaluate the snapshot
    ///
    /// With `noise` the generation is shuffled and interleaved whatever the
    /// configured mode. On a fault the snapshot is queued again so the
    /// network can be settled once the cause is fixed.
    fn step(&mut self, noise: bool) -> SimResult<Vec<NodeId>> {
        let mut snapshot = self.pending.take_snapshot();
        let generation = self.pending.generation();

        let result = match self.config.evaluation {
            EvaluationMode::Synchronous if !noise => self.run_two_phase(&snapshot, generation),
            _ => {
                snapshot.shuffle(&mut self.rng);
                self.run_interleaved(&snapshot, generation)
            }
        };
        if let Err(fault) = result {
            self.pending.requeue(&snapshot);
            return Err(fault);
        }

        trace!("generation {}: evaluated {} nodes", generation, snapshot.len());
        for observer in &mut self.observers {
            observer.on_micro_step(generation, &snapshot);
        }
        Ok(snapshot)
    }

    fn run_two_phase(&mut self, snapshot: &[NodeId], generation: Generation) -> SimResult<()> {
        for id in snapshot {
            self.read_node(*id, generation)?;
        }
        for id in snapshot {
            self.write_node(*id, generation)?;
        }
        Ok(())
    }

    fn run_interleaved(&mut self, snapshot: &[NodeId], generation: Generation) -> SimResult<()> {
        for id in snapshot {
            self.read_node(*id, generation)?;
            self.write_node(*id, generation)?;
        }
        Ok(())
    }

    fn read_node(&mut self, id: NodeId, generation: Generation) -> SimResult<()> {
        let node = self
            .nodes
            .get_mut(id.index())
            .ok_or_else(|| Fault::malformed(format!("unknown node {}", id)))?;
        let ctx = ReadContext::new(
            id,
            generation,
            &self.values,
            &self.readable[id.index()],
        );
        node.read(&ctx).map_err(|f| f.at(id, generation))
    }

    fn write_node(&mut self, id: NodeId, generation: Generation) -> SimResult<()> {
        let node = self
            .nodes
            .get_mut(id.index())
            .ok_or_else(|| Fault::malformed(format!("unknown node {}", id)))?;
        let mut ctx = WriteContext::new(id, generation, &mut self.values, &mut self.pending);
        node.write(&mut ctx).map_err(|f| f.at(id, generation))
    }

    /// Raise the first short circuit that is still present at the fixed point
    fn check_conflicts(&mut self) -> SimResult<()> {
        let values = &self.values;
        self.pending.retain_conflicts(|id| {
            values
                .get(id.index())
                .and_then(SignalValue::bus)
                .is_some_and(Bus::is_conflict)
        });

        let Some(&(value, generation)) = self.pending.conflicts().first() else {
            return Ok(());
        };
        let drivers = self
            .values
            .get(value.index())
            .and_then(|v| v.bus().map(|bus| bus.active_drivers(v.mask())))
            .unwrap_or_default();
        Err(Fault::DriverConflict {
            value,
            drivers,
            generation,
        })
    }

    fn fail(&mut self, fault: Fault) -> Fault {
        warn!("{}", fault);
        for observer in &mut self.observers {
            observer.on_fault(&fault);
        }
        fault
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}
