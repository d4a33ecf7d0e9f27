use gainflow::graphlib::DirectedGraph;
use gainflow::{FLOW_TOLERANCE, error::Error, greedy};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// Two lossy edges in series: 0→1 (cap 2, gain 0.5), 1→2 (cap 3, gain 0.8).
/// The optimum saturates the first edge; one unit arrives at vertex 1 and
/// 0.8 units reach the sink.
fn lossy_chain() -> (DirectedGraph, Vec<f64>, Vec<f64>) {
    let mut g = DirectedGraph::with_vertices(3);
    g.add_edge(0, 1);
    g.add_edge(1, 2);
    (g, vec![2.0, 3.0], vec![0.5, 0.8])
}

/// Two disjoint source-to-sink paths with different gains.
fn two_paths() -> (DirectedGraph, Vec<f64>, Vec<f64>) {
    let mut g = DirectedGraph::with_vertices(4);
    let mut cap = Vec::new();
    let mut gain = Vec::new();
    for (src, dst, c, w) in [
        (0, 1, 1.0, 0.9),
        (1, 3, 1.0, 0.9),
        (0, 2, 1.0, 0.5),
        (2, 3, 1.0, 0.5),
    ] {
        g.add_edge(src, dst);
        cap.push(c);
        gain.push(w);
    }
    (g, cap, gain)
}

/// Checks 0 ≤ flow ≤ cap and gain-weighted conservation at every vertex
/// other than the source and sink.
fn assert_feasible(g: &DirectedGraph, cap: &[f64], gain: &[f64], flow: &[f64], s: usize, t: usize) {
    for e in g.edges() {
        assert!(
            flow[e.index] >= -FLOW_TOLERANCE && flow[e.index] <= cap[e.index] + FLOW_TOLERANCE,
            "edge {} carries {} outside [0, {}]",
            e.index,
            flow[e.index],
            cap[e.index]
        );
    }
    for v in 0..g.vertex_count() {
        if v == s || v == t {
            continue;
        }
        let arriving: f64 = g.in_edges(v).map(|e| flow[e.index] * gain[e.index]).sum();
        let leaving: f64 = g.out_edges(v).map(|e| flow[e.index]).sum();
        assert!(
            (arriving - leaving).abs() < 1e-6,
            "vertex {v} not conserved: in {arriving}, out {leaving}"
        );
    }
}

#[test]
fn cold_start_solves_lossy_chain() {
    let (g, cap, gain) = lossy_chain();
    let assignment = greedy::generalized_maximum_flow(&g, &cap, &gain, 0, 2).unwrap();
    assert_close(assignment.value, 0.8);
    assert_close(assignment.flow[0], 2.0);
    assert_close(assignment.flow[1], 1.0);
}

#[test]
fn seeded_solves_lossy_chain() {
    let (g, cap, gain) = lossy_chain();
    let assignment = greedy::generalized_maximum_flow_seeded(&g, &cap, &gain, 0, 2).unwrap();
    assert_close(assignment.value, 0.8);
    assert_feasible(&g, &cap, &gain, &assignment.flow, 0, 2);
}

#[test]
fn cold_start_saturates_disjoint_paths() {
    let (g, cap, gain) = two_paths();
    let assignment = greedy::generalized_maximum_flow(&g, &cap, &gain, 0, 3).unwrap();
    // Both paths carry their full unit: 0.81 via the top, 0.25 via the bottom.
    assert_close(assignment.value, 1.06);
    assert_feasible(&g, &cap, &gain, &assignment.flow, 0, 3);
}

#[test]
fn initial_flow_is_feasible() {
    let (g, cap, gain) = two_paths();
    let flow = greedy::construct_initial_flow(&g, &cap, &gain, 0, 3).unwrap();
    assert_feasible(&g, &cap, &gain, &flow, 0, 3);
}

#[test]
fn refinement_never_loses_value() {
    let (g, cap, gain) = two_paths();
    let initial = greedy::construct_initial_flow(&g, &cap, &gain, 0, 3).unwrap();
    let seeded_value: f64 = g
        .in_edges(3)
        .map(|e| initial[e.index] * gain[e.index])
        .sum();
    let assignment = greedy::generalized_maximum_flow_seeded(&g, &cap, &gain, 0, 3).unwrap();
    assert!(assignment.value >= seeded_value - FLOW_TOLERANCE);
}

#[test]
fn seeded_matches_cold_start_on_disjoint_paths() {
    let (g, cap, gain) = two_paths();
    let cold = greedy::generalized_maximum_flow(&g, &cap, &gain, 0, 3).unwrap();
    let seeded = greedy::generalized_maximum_flow_seeded(&g, &cap, &gain, 0, 3).unwrap();
    assert_close(seeded.value, cold.value);
}

#[test]
fn greedy_prefers_high_gain_capacity() {
    // A shared bottleneck out of the source: the widest-path rule must spend
    // it on the 0.9-gain branch, not the 0.3 one.
    let mut g = DirectedGraph::with_vertices(4);
    g.add_edge(0, 1);
    g.add_edge(1, 3);
    g.add_edge(1, 2);
    g.add_edge(2, 3);
    let cap = vec![1.0, 1.0, 1.0, 1.0];
    let gain = vec![1.0, 0.9, 0.3, 1.0];
    let assignment = greedy::generalized_maximum_flow(&g, &cap, &gain, 0, 3).unwrap();
    assert_close(assignment.value, 0.9);
    assert_close(assignment.flow[2], 0.0);
}

#[test]
fn unreachable_sink_yields_zero() {
    let mut g = DirectedGraph::with_vertices(3);
    g.add_edge(0, 1);
    let assignment = greedy::generalized_maximum_flow(&g, &[1.0], &[0.5], 0, 2).unwrap();
    assert_close(assignment.value, 0.0);
    assert!(assignment.flow.iter().all(|&f| f == 0.0));

    let seeded = greedy::generalized_maximum_flow_seeded(&g, &[1.0], &[0.5], 0, 2).unwrap();
    assert_close(seeded.value, 0.0);
}

#[test]
fn source_equal_to_sink_is_rejected() {
    let (g, cap, gain) = lossy_chain();
    for result in [
        greedy::generalized_maximum_flow(&g, &cap, &gain, 1, 1),
        greedy::generalized_maximum_flow_seeded(&g, &cap, &gain, 1, 1),
    ] {
        assert!(matches!(result, Err(Error::SourceIsSink { vertex: 1 })));
    }
}
