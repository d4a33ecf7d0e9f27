//! Generalized maximum flow solvers.
//!
//! A generalized flow network attaches a multiplicative gain to every edge:
//! flow entering an edge is scaled by its gain on the way out, modeling
//! lossy (gain < 1) or amplifying transfer. This crate ships an exact
//! blocking-flow max-flow solver for the gain-free case ([`dinic`]), a
//! greedy generalized solver with an exact-seeded variant ([`greedy`]), a
//! (1−ε)-approximate solver ([`fleischer_wayne`]), and a randomized graph
//! compressor that shrinks instances before solving ([`compress`]).
//!
//! All solvers share one contract: the graph plus parallel `cap`/`gain`
//! arrays indexed by arena edge index, source ≠ sink, producing a value and
//! a per-edge flow vector. `flow[e]` is the amount entering edge `e` at its
//! source; the amount leaving at its destination is `flow[e] · gain[e]`.

use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use gainflow_graphlib as graphlib;

pub mod compress;
pub mod dinic;
pub mod error;
pub mod fleischer_wayne;
pub mod greedy;
pub mod heap;

pub use error::{Error, Result};

use graphlib::DirectedGraph;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tolerance for flow/capacity comparisons. The residual convention all
/// solvers share: forward residual is `cap − flow`, backward residual is
/// `flow`, and either counts as exhausted below this threshold.
pub const FLOW_TOLERANCE: f64 = 1e-6;

/// Rounding slack allowed when flow translation marginally exceeds an
/// edge's capacity; anything larger is an internal invariant failure.
pub const TRANSLATION_TOLERANCE: f64 = 1e-8;

/// Value and per-edge flow returned by a solver.
#[derive(Debug, Clone, Serialize)]
pub struct FlowAssignment {
    pub value: f64,
    pub flow: Vec<f64>,
}

/// Solver selection for [`solve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    FleischerWayne,
    Greedy,
    GreedyImproved,
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "FleischerWayne" => Ok(Method::FleischerWayne),
            "Greedy" => Ok(Method::Greedy),
            "GreedyImproved" => Ok(Method::GreedyImproved),
            _ => Err(Error::UnknownMethod {
                name: s.to_string(),
            }),
        }
    }
}

/// Per-run report for drivers; the same data the experiment harness logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub vertex_count: usize,
    pub edge_count: usize,
    /// Original ids of the endpoints, for reporting only.
    pub source: i64,
    pub sink: i64,
    pub method: Method,
    pub eps: f64,
    pub solve_time_ms: u128,
    pub value: f64,
}

/// Runs the selected generalized-flow solver and reports a [`Summary`]
/// alongside the flow. `eps` is only consulted by
/// [`Method::FleischerWayne`].
pub fn solve(
    g: &DirectedGraph,
    cap: &[f64],
    gain: &[f64],
    s: usize,
    t: usize,
    method: Method,
    eps: f64,
) -> Result<(FlowAssignment, Summary)> {
    let started = Instant::now();
    let assignment = match method {
        Method::FleischerWayne => {
            let outcome = fleischer_wayne::generalized_maximum_flow(g, cap, gain, s, t, eps, None)?;
            FlowAssignment {
                value: outcome.value,
                flow: outcome.flow,
            }
        }
        Method::Greedy => greedy::generalized_maximum_flow(g, cap, gain, s, t)?,
        Method::GreedyImproved => greedy::generalized_maximum_flow_seeded(g, cap, gain, s, t)?,
    };
    let solve_time_ms = started.elapsed().as_millis();
    debug!(?method, value = assignment.value, solve_time_ms, "solve finished");

    let summary = Summary {
        vertex_count: g.vertex_count(),
        edge_count: g.edge_count(),
        source: g.vertex(s).original_id,
        sink: g.vertex(t).original_id,
        method,
        eps,
        solve_time_ms,
        value: assignment.value,
    };
    Ok((assignment, summary))
}

/// The generalized-flow value delivered to `t`: the gain-scaled flow over
/// its in-edges.
pub fn sink_value(g: &DirectedGraph, gain: &[f64], flow: &[f64], t: usize) -> f64 {
    g.in_edges(t)
        .map(|e| flow[e.index] * gain[e.index])
        .sum()
}
