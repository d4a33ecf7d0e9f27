//! Exact maximum flow (no gain) via blocking flows on level graphs.
//!
//! Residual convention: there are no explicit reverse edges. An edge is
//! traversable forward while `cap - flow > FLOW_TOLERANCE` and traversable
//! backward (canceling flow already placed on it) while
//! `flow > FLOW_TOLERANCE`.

use std::collections::VecDeque;

use gainflow_graphlib::DirectedGraph;
use tracing::debug;

use crate::FLOW_TOLERANCE;
use crate::error::{Error, Result};

/// Computes the maximum `s`-`t` flow and returns `(value, flow)` with one
/// flow entry per arena edge. Fails fast when `s == t`.
pub fn maximum_flow(g: &DirectedGraph, cap: &[f64], s: usize, t: usize) -> Result<(f64, Vec<f64>)> {
    if s == t {
        return Err(Error::SourceIsSink { vertex: s });
    }
    debug_assert_eq!(cap.len(), g.edge_count());

    let n = g.vertex_count();
    let m = g.edge_count();
    let mut flow = vec![0.0; m];
    let mut total = 0.0;
    let mut phases = 0usize;

    loop {
        let level = bfs_levels(g, cap, &flow, s, t);
        let mut finished = vec![false; n];
        let mut augmented = false;
        let mut stack = Vec::new();
        loop {
            let f = augment(g, cap, &mut flow, &level, &mut finished, &mut stack, s, t);
            if f < FLOW_TOLERANCE {
                break;
            }
            total += f;
            augmented = true;
        }
        phases += 1;
        if !augmented {
            break;
        }
    }

    debug!(phases, value = total, "dinic finished");
    Ok((total, flow))
}

/// BFS over the residual graph. Level growth stops once the sink's level is
/// fixed; vertices on deeper levels keep `-1` and are never augmented over.
fn bfs_levels(g: &DirectedGraph, cap: &[f64], flow: &[f64], s: usize, t: usize) -> Vec<i32> {
    let n = g.vertex_count();
    let mut level = vec![-1i32; n];
    level[s] = 0;

    let mut queue = VecDeque::new();
    queue.push_back(s);
    let mut bound = n as i32;
    while let Some(&u) = queue.front() {
        if level[u] >= bound {
            break;
        }
        queue.pop_front();
        if u == t {
            bound = level[u];
        }
        for e in g.out_edges(u) {
            if cap[e.index] - flow[e.index] > FLOW_TOLERANCE && level[e.dst] == -1 {
                level[e.dst] = level[u] + 1;
                queue.push_back(e.dst);
            }
        }
        for e in g.in_edges(u) {
            if flow[e.index] > FLOW_TOLERANCE && level[e.src] == -1 {
                level[e.src] = level[u] + 1;
                queue.push_back(e.src);
            }
        }
    }
    level
}

#[derive(Debug, Clone, Copy)]
struct AugFrame {
    vertex: usize,
    limit: f64,
    /// Edge used to enter this frame and whether it was traversed forward.
    /// `None` only for the root.
    via: Option<(usize, bool)>,
    out_pos: usize,
    in_pos: usize,
}

/// One DFS augmentation restricted to level-increasing residual edges,
/// driven by an explicit stack. A vertex proven flowless in this phase is
/// marked `finished` and never revisited; vertices on a successful path are
/// un-finished so later augmentations may route through them again.
fn augment(
    g: &DirectedGraph,
    cap: &[f64],
    flow: &mut [f64],
    level: &[i32],
    finished: &mut [bool],
    stack: &mut Vec<AugFrame>,
    s: usize,
    t: usize,
) -> f64 {
    if finished[s] {
        return 0.0;
    }
    stack.clear();
    finished[s] = true;
    stack.push(AugFrame {
        vertex: s,
        limit: f64::INFINITY,
        via: None,
        out_pos: 0,
        in_pos: 0,
    });

    while let Some(top) = stack.last().copied() {
        let u = top.vertex;
        let outs = g.out_edge_indices(u);
        let ins = g.in_edge_indices(u);

        let mut next: Option<(usize, bool, f64)> = None;
        {
            let frame = stack.last_mut().expect("frame just observed");
            while frame.out_pos < outs.len() {
                let ei = outs[frame.out_pos];
                frame.out_pos += 1;
                let e = g.edge(ei);
                if level[e.dst] > level[u] {
                    next = Some((ei, true, cap[ei] - flow[ei]));
                    break;
                }
            }
            if next.is_none() {
                while frame.in_pos < ins.len() {
                    let ei = ins[frame.in_pos];
                    frame.in_pos += 1;
                    let e = g.edge(ei);
                    if level[e.src] > level[u] {
                        next = Some((ei, false, flow[ei]));
                        break;
                    }
                }
            }
        }

        let Some((ei, forward, residual)) = next else {
            // Every residual edge out of `u` is exhausted for this phase.
            stack.pop();
            continue;
        };

        let child_limit = top.limit.min(residual);
        if child_limit < FLOW_TOLERANCE {
            continue;
        }
        let e = g.edge(ei);
        let w = if forward { e.dst } else { e.src };

        if w == t {
            // Found an augmenting path; apply it along the stacked frames.
            apply(flow, ei, forward, child_limit);
            for frame in stack.drain(..).rev() {
                finished[frame.vertex] = false;
                if let Some((fe, ffwd)) = frame.via {
                    apply(flow, fe, ffwd, child_limit);
                }
            }
            return child_limit;
        }
        if finished[w] {
            continue;
        }
        finished[w] = true;
        stack.push(AugFrame {
            vertex: w,
            limit: child_limit,
            via: Some((ei, forward)),
            out_pos: 0,
            in_pos: 0,
        });
    }

    0.0
}

fn apply(flow: &mut [f64], edge: usize, forward: bool, f: f64) {
    if forward {
        flow[edge] += f;
    } else {
        flow[edge] -= f;
    }
}
