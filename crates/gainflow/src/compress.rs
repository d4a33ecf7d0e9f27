//! Randomized graph compression.
//!
//! Samples edges independently, collapses each weakly connected component
//! of the sampled sub-graph to one vertex, and hands back the contracted
//! graph with both mappings (vertices and surviving edges). This is a lossy
//! size/accuracy trade: the compressed instance's generalized max flow
//! approximates the original's with no bound in either direction, so
//! drivers run several independent trials and keep the minimum value as a
//! conservative estimate.

use gainflow_graphlib::DirectedGraph;
use gainflow_graphlib::alg::{contract, weakly_connected_components};
use rand::Rng;
use tracing::debug;

use crate::error::{Error, Result};
use crate::fleischer_wayne::{self, ApproxOutcome};

/// A compressed graph plus the mappings needed to move between instances.
#[derive(Debug, Clone)]
pub struct Compressed {
    pub graph: DirectedGraph,
    /// Original vertex index → compressed vertex index.
    pub vertex_map: Vec<usize>,
    /// Compressed edge index → original edge index. Contraction drops and
    /// renumbers edges, so per-edge arrays must go through this.
    pub edge_map: Vec<usize>,
}

impl Compressed {
    /// Gathers a per-edge array of the original instance into the
    /// compressed edge order.
    pub fn map_edge_array(&self, values: &[f64]) -> Vec<f64> {
        self.edge_map.iter().map(|&e| values[e]).collect()
    }

    /// Whether `s` and `t` survive as distinct vertices.
    pub fn maps_apart(&self, s: usize, t: usize) -> bool {
        self.vertex_map[s] != self.vertex_map[t]
    }
}

/// Compresses `g` by contracting the components spanned by edges that an
/// independent Bernoulli(`prob`) draw selects. Randomness comes only from
/// the caller's generator; reruns with an equally seeded generator produce
/// the same compression.
pub fn compress<R: Rng + ?Sized>(g: &DirectedGraph, prob: f64, rng: &mut R) -> Compressed {
    let m = g.edge_count();
    let mut selected = vec![false; m];
    for slot in selected.iter_mut() {
        if rng.random::<f64>() < prob {
            *slot = true;
        }
    }

    let components = weakly_connected_components(g, Some(&selected));
    let contraction = contract(g, &components.ids, components.count);
    debug!(
        vertices = contraction.graph.vertex_count(),
        edges = contraction.graph.edge_count(),
        "compressed graph"
    );
    Compressed {
        graph: contraction.graph,
        vertex_map: components.ids,
        edge_map: contraction.kept_edges,
    }
}

/// Outcome of a compressed solve, carrying the compression that produced it
/// so callers can interpret the flow vector (indexed by compressed edges).
#[derive(Debug, Clone)]
pub struct CompressedOutcome {
    pub outcome: ApproxOutcome,
    pub compressed: Compressed,
    pub trials_run: usize,
    pub trials_skipped: usize,
}

/// One compression trial followed by an ε-approximate solve on the
/// compressed instance. When compression collapses source and sink into the
/// same vertex the flow problem degenerates; that is reported as
/// [`Error::DegenerateCompression`] and the caller may simply retry.
pub fn solve_compressed<R: Rng + ?Sized>(
    g: &DirectedGraph,
    cap: &[f64],
    gain: &[f64],
    s: usize,
    t: usize,
    prob: f64,
    eps: f64,
    rng: &mut R,
) -> Result<CompressedOutcome> {
    if s == t {
        return Err(Error::SourceIsSink { vertex: s });
    }
    let compressed = compress(g, prob, rng);
    if !compressed.maps_apart(s, t) {
        return Err(Error::DegenerateCompression);
    }

    let cap2 = compressed.map_edge_array(cap);
    let gain2 = compressed.map_edge_array(gain);
    let outcome = fleischer_wayne::generalized_maximum_flow(
        &compressed.graph,
        &cap2,
        &gain2,
        compressed.vertex_map[s],
        compressed.vertex_map[t],
        eps,
        None,
    )?;
    Ok(CompressedOutcome {
        outcome,
        compressed,
        trials_run: 1,
        trials_skipped: 0,
    })
}

/// Runs up to `trials` independent compression trials and keeps the one
/// with the minimum value, skipping degenerate trials. Errs only when every
/// trial degenerates.
pub fn solve_compressed_best<R: Rng + ?Sized>(
    g: &DirectedGraph,
    cap: &[f64],
    gain: &[f64],
    s: usize,
    t: usize,
    prob: f64,
    eps: f64,
    trials: usize,
    rng: &mut R,
) -> Result<CompressedOutcome> {
    let mut best: Option<CompressedOutcome> = None;
    let mut skipped = 0;
    let mut run = 0;

    for trial in 0..trials {
        match solve_compressed(g, cap, gain, s, t, prob, eps, rng) {
            Ok(candidate) => {
                run += 1;
                let better = best
                    .as_ref()
                    .is_none_or(|b| candidate.outcome.value < b.outcome.value);
                if better {
                    best = Some(candidate);
                }
            }
            Err(Error::DegenerateCompression) => {
                debug!(trial, "skipping degenerate compression trial");
                skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    match best {
        Some(mut outcome) => {
            outcome.trials_run = run;
            outcome.trials_skipped = skipped;
            Ok(outcome)
        }
        None => Err(Error::DegenerateCompression),
    }
}
