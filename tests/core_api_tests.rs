use digisim::core::elements::{And, Const, Counter, DFlipFlop, Not, Xor};
use digisim::{
    BreakInfo, Fault, Model, Node, Port, ProbeKind, Pull, ReadContext, SimResult,
    SimulationConfig, ValueId, WriteContext,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn level(model: &Model, id: ValueId) -> u64 {
    model.read(id).unwrap().value
}

/// Test component: swaps the two bits of its input
struct Swap {
    input: ValueId,
    output: ValueId,
    swapped: u64,
}

impl Node for Swap {
    fn type_name(&self) -> &'static str {
        "Swap"
    }

    fn ports(&self) -> Vec<Port> {
        vec![
            Port::input("in", self.input, 2),
            Port::output("out", self.output, 2),
        ]
    }

    fn read(&mut self, ctx: &ReadContext<'_>) -> SimResult<()> {
        let v = ctx.get(self.input)?;
        self.swapped = ((v & 1) << 1) | (v >> 1);
        Ok(())
    }

    fn write(&mut self, ctx: &mut WriteContext<'_>) -> SimResult<()> {
        ctx.set_value(self.output, self.swapped)
    }
}

#[test]
fn test_and_network_truth_table() {
    init_logger();
    let mut model = Model::new();
    let a = model.add_input("A", 1).unwrap();
    let b = model.add_input("B", 1).unwrap();
    let y = model.add_value("Y", 1).unwrap();
    model.add_node(And::new(vec![a, b], y, 1)).unwrap();
    model.init().unwrap();

    for (va, vb, expected) in [(0, 0, 0), (1, 0, 0), (0, 1, 0), (1, 1, 1)] {
        model.set_input(a, va).unwrap();
        model.set_input(b, vb).unwrap();
        let report = model.settle().unwrap();
        assert!(report.evaluations <= 1);
        assert_eq!(level(&model, y), expected, "A={} B={}", va, vb);
    }
}

#[test]
fn test_settle_is_idempotent() {
    init_logger();
    let mut model = Model::new();
    let a = model.add_input("A", 1).unwrap();
    let m = model.add_value("M", 1).unwrap();
    let y = model.add_value("Y", 1).unwrap();
    model.add_node(Not::new(a, m, 1)).unwrap();
    model.add_node(Not::new(m, y, 1)).unwrap();
    model.init().unwrap();

    model.set_input(a, 1).unwrap();
    model.settle().unwrap();
    let before: Vec<_> = [a, m, y].iter().map(|v| model.read(*v).unwrap()).collect();
    let generation = model.generation();

    let report = model.settle().unwrap();
    let after: Vec<_> = [a, m, y].iter().map(|v| model.read(*v).unwrap()).collect();
    assert_eq!(report.iterations, 0);
    assert_eq!(model.generation(), generation);
    assert_eq!(before, after);
    assert!(!model.needs_update());
}

#[test]
fn test_floating_read_is_reported() {
    init_logger();
    let mut model = Model::new();
    let x = model.add_value("x", 1).unwrap();
    let y = model.add_value("y", 1).unwrap();
    let not = model.add_node(Not::new(x, y, 1)).unwrap();

    let fault = model.init().unwrap_err();
    assert_eq!(
        fault,
        Fault::FloatingRead {
            value: x,
            node: Some(not),
            generation: Some(1),
        }
    );
    assert_eq!(
        fault.to_string(),
        "read of floating value value#0 in node#0 (generation 1)"
    );
}

#[test]
fn test_driver_conflict() {
    init_logger();
    let mut model = Model::new();
    let bus = model.add_bus("bus", 1, Pull::None).unwrap();
    let low = model.add_node(Const::new(bus, 1, 0)).unwrap();
    let high = model.add_node(Const::new(bus, 1, 1)).unwrap();

    let fault = model.init().unwrap_err();
    assert_eq!(
        fault,
        Fault::DriverConflict {
            value: bus,
            drivers: vec![low, high],
            generation: 0,
        }
    );
    assert_eq!(fault.nodes(), vec![low, high]);
    assert_eq!(fault.value(), Some(bus));
}

#[test]
fn test_combinational_loop_oscillates() {
    init_logger();
    let mut model = Model::with_config(SimulationConfig::new().with_oscillation_cap(25));
    let v = model.add_value("loop", 1).unwrap();
    let not = model.add_node(Not::new(v, v, 1)).unwrap();

    match model.init() {
        Err(Fault::Oscillation {
            nodes, iterations, ..
        }) => {
            assert_eq!(nodes, vec![not]);
            assert_eq!(iterations, 25);
        }
        other => panic!("expected oscillation, got {:?}", other),
    }
}

#[test]
fn test_flip_flop_captures_on_rising_edge() {
    init_logger();
    let mut model = Model::new();
    let clk = model.add_clock("C").unwrap();
    let clock = model.clock_output(clk).unwrap();
    let d = model.add_input("D", 1).unwrap();
    let q = model.add_value("Q", 1).unwrap();
    model.add_node(DFlipFlop::new(d, clock, q, 1)).unwrap();
    model.init().unwrap();
    assert_eq!(level(&model, q), 0);

    model.set_input(d, 1).unwrap();
    model.settle().unwrap();
    assert_eq!(level(&model, q), 0);

    model.clock_edge(clk).unwrap();
    assert_eq!(level(&model, clock), 1);
    assert_eq!(level(&model, q), 1);

    // data changes while the clock is held high
    model.set_input(d, 0).unwrap();
    model.settle().unwrap();
    assert_eq!(level(&model, q), 1);

    model.clock_edge(clk).unwrap();
    assert_eq!(level(&model, q), 1);

    model.clock_edge(clk).unwrap();
    assert_eq!(level(&model, q), 0);
}

#[test]
fn test_register_xor_feedback() {
    init_logger();
    let mut model = Model::new();
    let clk = model.add_clock("C").unwrap();
    let clock = model.clock_output(clk).unwrap();
    let x = model.add_input("X", 1).unwrap();
    let q = model.add_value("R", 1).unwrap();
    let x_out = model.add_value("X_out", 1).unwrap();
    model.add_node(Xor::new(vec![q, x], x_out, 1)).unwrap();
    model
        .add_node(DFlipFlop::new(x_out, clock, q, 1).with_label("R"))
        .unwrap();
    model.init().unwrap();
    assert_eq!(level(&model, q), 0);

    model.set_input(x, 1).unwrap();
    model.settle().unwrap();

    let mut previous = level(&model, q);
    for _ in 0..4 {
        model.clock_cycle(clk).unwrap();
        let current = level(&model, q);
        assert_eq!(current, previous ^ 1);
        previous = current;
    }
}

#[test]
fn test_custom_node() {
    init_logger();
    let mut model = Model::new();
    let input = model.add_input("in", 2).unwrap();
    let output = model.add_value("out", 2).unwrap();
    model
        .add_node(Swap {
            input,
            output,
            swapped: 0,
        })
        .unwrap();
    model.add_probe("out", ProbeKind::Output, output).unwrap();
    model.init().unwrap();

    model.write_probe("in", 0b01, 0).unwrap();
    model.settle().unwrap();
    assert_eq!(model.read_probe("out").unwrap().value, 0b10);
}

fn counter_with_break(cycles: usize) -> Model {
    let mut model = Model::new();
    let clk = model.add_clock("C").unwrap();
    let clock = model.clock_output(clk).unwrap();
    let en = model.add_const("en", 1, 1).unwrap();
    let clr = model.add_const("clr", 1, 0).unwrap();
    let out = model.add_value("out", 2).unwrap();
    let ovf = model.add_value("ovf", 1).unwrap();
    model
        .add_node(Counter::new(en, clock, clr, out, ovf, 2))
        .unwrap();
    model.add_break("full", ovf, cycles).unwrap();
    model
}

#[test]
fn test_run_to_break() {
    init_logger();
    let mut model = counter_with_break(0);
    let info = model.run_to_break(None).unwrap();
    assert_eq!(
        info,
        BreakInfo {
            label: Some("full".to_string()),
            steps: 5,
            timeout: false,
        }
    );
}

#[test]
fn test_run_to_break_timeout() {
    init_logger();
    let mut model = counter_with_break(0);
    let info = model.run_to_break(Some(3)).unwrap();
    assert!(info.timeout);
    assert_eq!(info.label, None);
    assert_eq!(info.steps, 3);
}

#[test]
fn test_break_cycle_budget() {
    init_logger();
    let mut model = counter_with_break(1);
    match model.run_to_break(None) {
        Err(Fault::Malformed { reason }) => assert!(reason.starts_with("break timeout")),
        other => panic!("expected break timeout, got {:?}", other),
    }
}

#[test]
fn test_run_to_break_micro_stops_mid_settle() {
    init_logger();
    let mut model = Model::new();
    let clk = model.add_clock("C").unwrap();
    let clock = model.clock_output(clk).unwrap();
    let x = model.add_value("x", 1).unwrap();
    let y = model.add_value("y", 1).unwrap();
    let z = model.add_value("z", 1).unwrap();
    model.add_node(Not::new(clock, x, 1)).unwrap();
    model.add_node(Not::new(x, y, 1)).unwrap();
    let last = model.add_node(Not::new(y, z, 1)).unwrap();
    model.add_break("y", y, 0).unwrap();
    model.init().unwrap();
    assert_eq!((level(&model, y), level(&model, z)), (0, 1));

    let info = model.run_to_break_micro(None).unwrap();
    assert_eq!(
        info,
        Some(BreakInfo {
            label: Some("y".to_string()),
            steps: 1,
            timeout: false,
        })
    );
    assert_eq!(level(&model, y), 1);
    assert_eq!(level(&model, z), 1);
    assert_eq!(model.pending_nodes(), &[last]);

    model.settle().unwrap();
    assert_eq!(level(&model, z), 0);
}

#[test]
fn test_run_to_break_micro_matches_half_cycles() {
    init_logger();
    let mut model = counter_with_break(0);
    let info = model.run_to_break_micro(None).unwrap().unwrap();
    assert_eq!(info.label.as_deref(), Some("full"));
    assert_eq!(info.steps, 5);

    let mut model = counter_with_break(0);
    let info = model.run_to_break_micro(Some(2)).unwrap().unwrap();
    assert!(info.timeout);
    assert_eq!(info.steps, 2);
}

#[test]
fn test_run_to_break_micro_without_breaks_settles() {
    init_logger();
    let mut model = Model::new();
    let a = model.add_input("A", 1).unwrap();
    let y = model.add_value("Y", 1).unwrap();
    model.add_node(Not::new(a, y, 1)).unwrap();
    assert_eq!(model.run_to_break_micro(None), Ok(None));
    assert_eq!(level(&model, y), 1);
}

#[test]
fn test_probe_names_with_blanks() {
    init_logger();
    let mut model = Model::new();
    let c_in = model.add_input("carry in", 1).unwrap();
    let c_out = model.add_value("carry out", 1).unwrap();
    model.add_node(Not::new(c_in, c_out, 1)).unwrap();
    model.add_probe("carry out", ProbeKind::Output, c_out).unwrap();
    model.init().unwrap();

    model.write_probe("carry in", 1, 0).unwrap();
    model.settle().unwrap();
    assert_eq!(model.read_probe("carry out").unwrap().value, 0);
    assert_eq!(model.read_probe("carry_out").unwrap().value, 0);
}

#[test]
fn test_probe_test_vectors() {
    init_logger();
    let mut model = Model::new();
    let a = model.add_input("A", 1).unwrap();
    let b = model.add_input("B", 1).unwrap();
    let s = model.add_value("S", 1).unwrap();
    let c = model.add_value("C", 1).unwrap();
    model.add_node(Xor::new(vec![a, b], s, 1)).unwrap();
    model.add_node(And::new(vec![a, b], c, 1)).unwrap();
    model.add_probe("S", ProbeKind::Output, s).unwrap();
    model.add_probe("C", ProbeKind::Output, c).unwrap();
    model.init().unwrap();

    let inputs: Vec<String> = model
        .probes()
        .inputs()
        .map(|p| p.name().to_string())
        .collect();
    assert_eq!(inputs, vec!["A", "B"]);

    // A B | S C
    let vectors = [[0, 0, 0, 0], [0, 1, 1, 0], [1, 0, 1, 0], [1, 1, 0, 1]];
    for row in vectors {
        model.write_probe("A", row[0], 0).unwrap();
        model.write_probe("B", row[1], 0).unwrap();
        model.settle().unwrap();
        assert_eq!(model.read_probe("S").unwrap().value, row[2]);
        assert_eq!(model.read_probe("C").unwrap().value, row[3]);
    }
}
