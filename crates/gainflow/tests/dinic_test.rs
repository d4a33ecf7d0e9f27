use gainflow::graphlib::DirectedGraph;
use gainflow::{Error, dinic};

const TOL: f64 = 1e-6;

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < TOL, "expected {b}, got {a}");
}

/// A 6-vertex network with two crossing routes: max flow 1.5, realized as
/// 1.0 along 0→1→3→5 and 0.5 along 0→2→4→5.
fn diamond() -> (DirectedGraph, Vec<f64>) {
    let mut g = DirectedGraph::with_vertices(6);
    let mut cap = Vec::new();
    for (src, dst, c) in [
        (0, 1, 1.0),
        (0, 2, 1.0),
        (1, 2, 1.0),
        (1, 3, 1.0),
        (2, 4, 0.8),
        (3, 5, 1.0),
        (4, 3, 1.0),
        (4, 5, 0.5),
    ] {
        g.add_edge(src, dst);
        cap.push(c);
    }
    (g, cap)
}

#[test]
fn diamond_max_flow_is_one_point_five() {
    let (g, cap) = diamond();
    let (value, flow) = dinic::maximum_flow(&g, &cap, 0, 5).unwrap();
    assert_close(value, 1.5);
    assert_eq!(flow.len(), 8);
}

#[test]
fn flow_is_feasible_and_conserved() {
    let (g, cap) = diamond();
    let (value, flow) = dinic::maximum_flow(&g, &cap, 0, 5).unwrap();

    for e in 0..cap.len() {
        assert!(flow[e] >= -TOL, "negative flow on edge {e}");
        assert!(flow[e] <= cap[e] + TOL, "over capacity on edge {e}");
    }
    for v in 0..g.vertex_count() {
        if v == 0 || v == 5 {
            continue;
        }
        let inflow: f64 = g.in_edges(v).map(|e| flow[e.index]).sum();
        let outflow: f64 = g.out_edges(v).map(|e| flow[e.index]).sum();
        assert_close(inflow, outflow);
    }
    let into_sink: f64 = g.in_edges(5).map(|e| flow[e.index]).sum();
    assert_close(into_sink, value);
}

#[test]
fn single_edge() {
    let mut g = DirectedGraph::with_vertices(2);
    g.add_edge(0, 1);
    let (value, flow) = dinic::maximum_flow(&g, &[3.5], 0, 1).unwrap();
    assert_close(value, 3.5);
    assert_close(flow[0], 3.5);
}

#[test]
fn bottleneck_limits_the_path() {
    let mut g = DirectedGraph::with_vertices(3);
    g.add_edge(0, 1);
    g.add_edge(1, 2);
    let (value, _) = dinic::maximum_flow(&g, &[5.0, 2.0], 0, 2).unwrap();
    assert_close(value, 2.0);
}

#[test]
fn backward_traversal_reroutes_early_flow() {
    // The first blocking flow routes 0→1→3→5 and saturates 3→5, starving
    // the 2→3 branch. Reaching the maximum of 2 requires a later phase to
    // cancel flow on 1→3 and reroute vertex 1 through 1→4→5.
    let mut g = DirectedGraph::with_vertices(6);
    let cap = vec![1.0; 7];
    for (src, dst) in [(0, 1), (0, 2), (1, 3), (1, 4), (2, 3), (3, 5), (4, 5)] {
        g.add_edge(src, dst);
    }
    let (value, flow) = dinic::maximum_flow(&g, &cap, 0, 5).unwrap();
    assert_close(value, 2.0);
    let into_sink: f64 = g.in_edges(5).map(|e| flow[e.index]).sum();
    assert_close(into_sink, 2.0);
}

#[test]
fn unreachable_sink_yields_zero() {
    let mut g = DirectedGraph::with_vertices(4);
    g.add_edge(0, 1);
    g.add_edge(3, 2); // points away from the sink side
    let (value, flow) = dinic::maximum_flow(&g, &[1.0, 1.0], 0, 2).unwrap();
    assert_close(value, 0.0);
    assert!(flow.iter().all(|&f| f.abs() < TOL));
}

#[test]
fn source_equals_sink_is_an_error() {
    let mut g = DirectedGraph::with_vertices(2);
    g.add_edge(0, 1);
    let err = dinic::maximum_flow(&g, &[1.0], 1, 1).unwrap_err();
    assert!(matches!(err, Error::SourceIsSink { vertex: 1 }));
}
