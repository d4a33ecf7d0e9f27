//! ε-approximate generalized maximum flow (Fleischer–Wayne 2002).
//!
//! Multiplicative-weights scheme over per-edge lengths kept in log space:
//! repeatedly route one unit along the generalized shortest path, scale it
//! to respect capacities, bump the lengths of the edges used, and stop when
//! the dual value `Σ cap · exp(logLength)` reaches 1. Runs in O(ε⁻²·m²);
//! the computed flow is within a (1−ε) factor of the optimum.

use std::cmp::Ordering;

use gainflow_graphlib::DirectedGraph;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Error, Result};
use crate::heap::PriorityQueue;
use crate::sink_value;

/// How an approximate solve ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// The dual value reached 1; the (1−ε) guarantee holds.
    Converged,
    /// The iteration cap was hit first. The reported flow is feasible and is
    /// the best found so far, but carries no approximation guarantee.
    IterationCapped,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApproxOutcome {
    pub value: f64,
    pub flow: Vec<f64>,
    pub termination: Termination,
    pub iterations: usize,
}

#[derive(Debug, Clone, Copy)]
struct CostEntry {
    cost: f64,
    vertex: usize,
    /// Edge used to reach `vertex`; `None` for the source.
    edge: Option<usize>,
}

impl Ord for CostEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| self.vertex.cmp(&other.vertex))
            .then_with(|| self.edge.cmp(&other.edge))
    }
}

impl PartialOrd for CostEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for CostEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CostEntry {}

/// Computes an ε-approximate generalized maximum flow from `s` to `t`.
/// `max_iterations` optionally bounds the runtime on ill-conditioned
/// instances; see [`Termination`]. An unreachable sink yields value 0 with
/// an all-zero flow.
pub fn generalized_maximum_flow(
    g: &DirectedGraph,
    cap: &[f64],
    gain: &[f64],
    s: usize,
    t: usize,
    eps: f64,
    max_iterations: Option<usize>,
) -> Result<ApproxOutcome> {
    if s == t {
        return Err(Error::SourceIsSink { vertex: s });
    }
    debug_assert!(eps > 0.0);

    let n = g.vertex_count();
    let m = g.edge_count();
    let mut flow = vec![0.0; m];
    if m == 0 {
        return Ok(ApproxOutcome {
            value: 0.0,
            flow,
            termination: Termination::Converged,
            iterations: 0,
        });
    }

    let log_delta = -(m as f64).ln() / eps;
    let mut log_length: Vec<f64> = (0..m).map(|e| log_delta - cap[e].ln()).collect();

    let mut prev: Vec<Option<usize>> = vec![None; n];
    let mut cost = vec![0.0; n];
    let mut queue = PriorityQueue::new();

    let mut iterations = 0;
    let termination = loop {
        if iterations % 100 == 0 {
            trace!(iterations, "fleischer-wayne progress");
        }
        if !shortest_path(g, gain, &log_length, s, t, &mut prev, &mut cost, &mut queue) {
            // No generalized path at all; only possible before any flow is
            // routed, so the zero flow is the answer.
            return Ok(ApproxOutcome {
                value: 0.0,
                flow: vec![0.0; m],
                termination: Termination::Converged,
                iterations,
            });
        }
        update_flow_and_length(g, cap, gain, &mut flow, &mut log_length, s, t, eps, &prev);
        iterations += 1;

        let dual: f64 = (0..m).map(|e| cap[e] * log_length[e].exp()).sum();
        if dual >= 1.0 {
            break Termination::Converged;
        }
        if max_iterations.is_some_and(|limit| iterations >= limit) {
            break Termination::IterationCapped;
        }
    };

    rescale_to_feasible(cap, &mut flow);
    Ok(ApproxOutcome {
        value: sink_value(g, gain, &flow, t),
        flow,
        termination,
        iterations,
    })
}

/// Dijkstra over the dual lengths: reaching `w` through edge `e` from a
/// vertex with cost `c` costs `(c + exp(logLength[e])) / gain[e]` — the
/// division prices in the loss incurred on the way. Lazy deletion: the
/// first dequeue of a vertex wins, later entries are skipped.
fn shortest_path(
    g: &DirectedGraph,
    gain: &[f64],
    log_length: &[f64],
    s: usize,
    t: usize,
    prev: &mut [Option<usize>],
    cost: &mut [f64],
    queue: &mut PriorityQueue<CostEntry>,
) -> bool {
    let n = g.vertex_count();
    let mut done = vec![false; n];
    for v in 0..n {
        prev[v] = None;
        cost[v] = f64::INFINITY;
    }
    cost[s] = 0.0;
    queue.enqueue(CostEntry {
        cost: 0.0,
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
            let new_cost = (cost[v] + log_length[e.index].exp()) / gain[e.index];
            if new_cost < cost[e.dst] {
                cost[e.dst] = new_cost;
                queue.enqueue(CostEntry {
                    cost: new_cost,
                    vertex: e.dst,
                    edge: Some(e.index),
                });
            }
        }
    }

    queue.clear();
    done[t] && prev[t].is_some()
}

/// Pushes one (rescaled) unit along the shortest-path tree branch ending at
/// the sink. The backward walk accumulates the upstream requirement by
/// dividing by each gain; the largest flow/capacity ratio on the path fixes
/// the scale so no edge is pushed past its capacity share.
fn update_flow_and_length(
    g: &DirectedGraph,
    cap: &[f64],
    gain: &[f64],
    flow: &mut [f64],
    log_length: &mut [f64],
    s: usize,
    t: usize,
    eps: f64,
    prev: &[Option<usize>],
) {
    let mut max_violate_ratio = 0.0_f64;
    let mut value = 1.0;
    let mut u = t;
    while u != s {
        let e = prev[u].expect("path edge recorded up to the source");
        value /= gain[e];
        max_violate_ratio = max_violate_ratio.max(value / cap[e]);
        u = g.edge(e).src;
    }

    let mut value = 1.0 / max_violate_ratio;
    let mut u = t;
    while u != s {
        let e = prev[u].expect("path edge recorded up to the source");
        value /= gain[e];
        flow[e] += value;
        log_length[e] += (eps * value / cap[e]).ln_1p();
        u = g.edge(e).src;
    }
}

/// Divides every flow entry by the worst flow/capacity ratio (at least 1),
/// making the assignment feasible.
fn rescale_to_feasible(cap: &[f64], flow: &mut [f64]) {
    let mut max_violate_ratio = 1.0_f64;
    for e in 0..flow.len() {
        max_violate_ratio = max_violate_ratio.max(flow[e] / cap[e]);
    }
    for f in flow.iter_mut() {
        *f /= max_violate_ratio;
    }
}
