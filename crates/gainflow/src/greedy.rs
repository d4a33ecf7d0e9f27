//! Greedy generalized maximum flow.
//!
//! Each round runs a widest-path search for the highest generalized volume
//! still deliverable to the sink (`income`), pushes it, and repeats until no
//! augmenting path remains. The result is always feasible and never exceeds
//! the optimum, but is not guaranteed optimal. The seeded variant first
//! builds a near-optimal flow by reducing the instance to an ordinary
//! max-flow problem and translating the answer back into gain-scaled terms.

use std::cmp::Ordering;

use gainflow_graphlib::DirectedGraph;
use tracing::debug;

use crate::dinic;
use crate::error::{Error, Result};
use crate::heap::PriorityQueue;
use crate::{FLOW_TOLERANCE, FlowAssignment, TRANSLATION_TOLERANCE, sink_value};

/// Stand-in for an unbounded income at the source.
const INFTY: f64 = 1e12;

/// Cold-start greedy solver: begins from the zero flow.
pub fn generalized_maximum_flow(
    g: &DirectedGraph,
    cap: &[f64],
    gain: &[f64],
    s: usize,
    t: usize,
) -> Result<FlowAssignment> {
    if s == t {
        return Err(Error::SourceIsSink { vertex: s });
    }
    let mut flow = vec![0.0; g.edge_count()];
    refine(g, cap, gain, s, t, &mut flow);
    Ok(FlowAssignment {
        value: sink_value(g, gain, &flow, t),
        flow,
    })
}

/// Exact-seed variant: starts the greedy refinement from the flow produced
/// by [`construct_initial_flow`].
pub fn generalized_maximum_flow_seeded(
    g: &DirectedGraph,
    cap: &[f64],
    gain: &[f64],
    s: usize,
    t: usize,
) -> Result<FlowAssignment> {
    let mut flow = construct_initial_flow(g, cap, gain, s, t)?;
    refine(g, cap, gain, s, t, &mut flow);
    Ok(FlowAssignment {
        value: sink_value(g, gain, &flow, t),
        flow,
    })
}

#[derive(Debug, Clone, Copy)]
struct WidestEntry {
    income: f64,
    vertex: usize,
    /// Edge used to reach `vertex`; `None` for the source.
    edge: Option<usize>,
}

// Ordered by descending income so the min-heap yields the widest entry
// first. Inputs are positive and finite, so `total_cmp` is a plain reversal.
impl Ord for WidestEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .income
            .total_cmp(&self.income)
            .then_with(|| self.vertex.cmp(&other.vertex))
            .then_with(|| self.edge.cmp(&other.edge))
    }
}

impl PartialOrd for WidestEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for WidestEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for WidestEntry {}

/// Augments `flow` in place until no path improves the sink's income.
fn refine(g: &DirectedGraph, cap: &[f64], gain: &[f64], s: usize, t: usize, flow: &mut [f64]) {
    let n = g.vertex_count();
    let mut income = vec![0.0; n];
    let mut prev: Vec<Option<usize>> = vec![None; n];
    let mut done = vec![false; n];
    let mut rounds = 0usize;

    loop {
        income.fill(0.0);
        prev.fill(None);
        done.fill(false);
        income[s] = INFTY;

        let mut queue = PriorityQueue::new();
        queue.enqueue(WidestEntry {
            income: INFTY,
            vertex: s,
            edge: None,
        });

        while let Some(entry) = queue.dequeue() {
            let v = entry.vertex;
            if done[v] {
                continue;
            }
            done[v] = true;
            prev[v] = entry.edge;
            if v == t {
                break;
            }
            for e in g.out_edges(v) {
                let new_income = income[v].min(cap[e.index] - flow[e.index]) * gain[e.index];
                if new_income > income[e.dst] {
                    income[e.dst] = new_income;
                    queue.enqueue(WidestEntry {
                        income: new_income,
                        vertex: e.dst,
                        edge: Some(e.index),
                    });
                }
            }
        }

        if income[t] < FLOW_TOLERANCE || prev[t].is_none() {
            break;
        }

        // Walk the path backward, growing the push by 1/gain per edge.
        let mut u = t;
        let mut f = income[t];
        while u != s {
            let e = prev[u].expect("path edge recorded for every reached vertex");
            f /= gain[e];
            flow[e] += f;
            u = g.edge(e).src;
        }
        rounds += 1;
    }

    debug!(rounds, "greedy refinement converged");
}

/// Builds a starting flow for the greedy solver (§exact seeding):
/// 1. best cumulative gain from the source to every vertex,
/// 2. capacities rescaled into source units (`cap / income[src]`), turning
///    the instance into an ordinary max-flow problem,
/// 3. exact max-flow on the rescaled capacities,
/// 4. translation of that flow back into gain-scaled terms.
pub fn construct_initial_flow(
    g: &DirectedGraph,
    cap: &[f64],
    gain: &[f64],
    s: usize,
    t: usize,
) -> Result<Vec<f64>> {
    if s == t {
        return Err(Error::SourceIsSink { vertex: s });
    }
    let n = g.vertex_count();
    let m = g.edge_count();

    // Best multiplicative gain reachable from the source.
    let mut income = vec![0.0; n];
    let mut done = vec![false; n];
    income[s] = 1.0;
    let mut queue = PriorityQueue::new();
    queue.enqueue(WidestEntry {
        income: 1.0,
        vertex: s,
        edge: None,
    });
    while let Some(entry) = queue.dequeue() {
        let v = entry.vertex;
        if done[v] {
            continue;
        }
        done[v] = true;
        for e in g.out_edges(v) {
            let new_income = income[v] * gain[e.index];
            if new_income > income[e.dst] {
                income[e.dst] = new_income;
                queue.enqueue(WidestEntry {
                    income: new_income,
                    vertex: e.dst,
                    edge: Some(e.index),
                });
            }
        }
    }

    // Rescale capacities by the source-side cumulative gain. Edges hanging
    // off unreachable vertices can never carry flow from s; zero them out.
    let mut cap2 = vec![0.0; m];
    for e in g.edges() {
        if income[e.src] > 0.0 {
            cap2[e.index] = cap[e.index] / income[e.src];
        }
    }

    let (_, raw) = dinic::maximum_flow(g, &cap2, s, t)?;
    translate_flow(g, cap, gain, &raw, t)
}

/// Distributes an ordinary flow over the gain-scaled network with one
/// post-order walk from the sink: a vertex is settled after every vertex
/// feeding raw flow into it, then each out-edge receives its proportional
/// share of the gain-discounted inflow. Handles join points where flow from
/// multiple paths merges; assumes the raw flow is a DAG, which blocking-flow
/// augmentation produces.
fn translate_flow(
    g: &DirectedGraph,
    cap: &[f64],
    gain: &[f64],
    raw: &[f64],
    t: usize,
) -> Result<Vec<f64>> {
    let m = g.edge_count();
    let mut flow = vec![0.0; m];
    let mut visited = vec![false; g.vertex_count()];
    let mut stack: Vec<(usize, usize)> = Vec::new();

    visited[t] = true;
    stack.push((t, 0));
    while let Some(top) = stack.last_mut() {
        let v = top.0;
        let ins = g.in_edge_indices(v);
        if top.1 < ins.len() {
            let e = ins[top.1];
            top.1 += 1;
            let src = g.edge(e).src;
            if raw[e] > 0.0 && !visited[src] {
                visited[src] = true;
                stack.push((src, 0));
            }
            continue;
        }
        stack.pop();

        // Raw inflow x and already-translated generalized inflow y.
        let mut x = 0.0;
        let mut y = 0.0;
        for &e in g.in_edge_indices(v) {
            x += raw[e];
            y += flow[e] * gain[e];
        }
        for &e in g.out_edge_indices(v) {
            if raw[e] <= 0.0 {
                continue;
            }
            let mut f = if x == 0.0 { raw[e] } else { y * raw[e] / x };
            if f > cap[e] {
                if f - cap[e] > TRANSLATION_TOLERANCE {
                    return Err(Error::TranslationOverflow {
                        edge: e,
                        flow: f,
                        cap: cap[e],
                    });
                }
                f = cap[e];
            }
            flow[e] = f;
        }
    }

    Ok(flow)
}
