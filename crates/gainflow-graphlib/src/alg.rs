//! Component decomposition and contraction.

use crate::{DirectedGraph, Vertex};

/// Result of a component decomposition: `ids[v]` is the component id of
/// vertex `v`, in `[0, count)`.
#[derive(Debug, Clone)]
pub struct Components {
    pub count: usize,
    pub ids: Vec<usize>,
}

/// Decomposes the graph into weakly connected components, treating every
/// edge as undirected. When `mask` is given, edges whose slot is `false` are
/// ignored. The traversal is stack-based; call depth does not grow with the
/// graph.
pub fn weakly_connected_components(g: &DirectedGraph, mask: Option<&[bool]>) -> Components {
    let n = g.vertex_count();
    let mut ids: Vec<Option<usize>> = vec![None; n];
    let mut count = 0;
    let mut stack: Vec<usize> = Vec::new();

    let alive = |e: usize| mask.is_none_or(|m| m[e]);

    for start in 0..n {
        if ids[start].is_some() {
            continue;
        }
        ids[start] = Some(count);
        stack.push(start);
        while let Some(v) = stack.pop() {
            for e in g.out_edges(v) {
                if alive(e.index) && ids[e.dst].is_none() {
                    ids[e.dst] = Some(count);
                    stack.push(e.dst);
                }
            }
            for e in g.in_edges(v) {
                if alive(e.index) && ids[e.src].is_none() {
                    ids[e.src] = Some(count);
                    stack.push(e.src);
                }
            }
        }
        count += 1;
    }

    Components {
        count,
        ids: ids.into_iter().map(|id| id.unwrap_or(0)).collect(),
    }
}

/// A contracted graph plus the arena indices of the original edges that
/// survived, in the contracted graph's edge order. Contraction renumbers
/// edges, so callers holding per-edge arrays must remap them through
/// `kept_edges`.
#[derive(Debug, Clone)]
pub struct Contraction {
    pub graph: DirectedGraph,
    pub kept_edges: Vec<usize>,
}

/// Contracts the graph along `ids` (one new vertex per id in `[0, count)`).
/// Each new vertex takes the `original_id` of the first original vertex
/// mapped to it. Edges whose endpoints land on the same new vertex are
/// dropped; the rest are re-added in original edge order.
pub fn contract(g: &DirectedGraph, ids: &[usize], count: usize) -> Contraction {
    let mut graph = DirectedGraph::with_vertices(count);
    let mut named = vec![false; count];
    for (v, &id) in ids.iter().enumerate() {
        if !named[id] {
            named[id] = true;
            *graph.vertex_mut(id) = Vertex::new(g.vertex(v).original_id);
        }
    }

    let mut kept_edges = Vec::new();
    for e in g.edges() {
        let (src, dst) = (ids[e.src], ids[e.dst]);
        if src != dst {
            graph.add_edge(src, dst);
            kept_edges.push(e.index);
        }
    }

    Contraction { graph, kept_edges }
}
