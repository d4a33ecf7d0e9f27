//! Directed graph container used by `gainflow`.
//!
//! Edges live in a single arena indexed by insertion order; the per-vertex
//! adjacency lists store edge indices into that arena, never edge copies. All
//! per-edge data owned by callers (capacity, gain, flow) is kept in flat
//! arrays keyed by the same index, so an edge seen through `in_edges` and the
//! same edge seen through `out_edges` always agree.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

pub mod alg;

/// A vertex. `original_id` is the externally meaningful identifier and is
/// used only for reporting; algorithms address vertices by index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub original_id: i64,
}

impl Vertex {
    pub fn new(original_id: i64) -> Self {
        Self { original_id }
    }
}

/// A directed edge. `index` is the edge's position in the arena and in every
/// caller-side per-edge array; it never changes once the edge is added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub index: usize,
    pub src: usize,
    pub dst: usize,
}

#[derive(Debug, Clone, Default)]
pub struct DirectedGraph {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    in_edges: Vec<Vec<usize>>,
    out_edges: Vec<Vec<usize>>,
}

impl DirectedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// A graph with `vertex_count` default vertices already added.
    pub fn with_vertices(vertex_count: usize) -> Self {
        let mut g = Self::new();
        for _ in 0..vertex_count {
            g.add_vertex(Vertex::default());
        }
        g
    }

    /// Builds a graph from `(src, dst)` pairs of original ids, creating a
    /// vertex per distinct id in first-seen order.
    pub fn from_original_pairs(pairs: &[(i64, i64)]) -> Self {
        let mut g = Self::new();
        let mut index_of: FxHashMap<i64, usize> = FxHashMap::default();
        for &(src, dst) in pairs {
            let s = *index_of
                .entry(src)
                .or_insert_with(|| g.add_vertex(Vertex::new(src)));
            let d = *index_of
                .entry(dst)
                .or_insert_with(|| g.add_vertex(Vertex::new(dst)));
            g.add_edge(s, d);
        }
        g
    }

    /// Appends a vertex and returns its index.
    pub fn add_vertex(&mut self, vertex: Vertex) -> usize {
        let idx = self.vertices.len();
        self.vertices.push(vertex);
        self.in_edges.push(Vec::new());
        self.out_edges.push(Vec::new());
        idx
    }

    /// Appends an edge to the arena and both adjacency lists, returning its
    /// index. Both endpoints must already exist.
    pub fn add_edge(&mut self, src: usize, dst: usize) -> usize {
        let index = self.edges.len();
        self.edges.push(Edge { index, src, dst });
        self.out_edges[src].push(index);
        self.in_edges[dst].push(index);
        index
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn vertex(&self, v: usize) -> &Vertex {
        &self.vertices[v]
    }

    pub fn vertex_mut(&mut self, v: usize) -> &mut Vertex {
        &mut self.vertices[v]
    }

    pub fn edge(&self, e: usize) -> &Edge {
        &self.edges[e]
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Edges whose destination is `v`.
    pub fn in_edges(&self, v: usize) -> impl Iterator<Item = &Edge> {
        self.in_edges[v].iter().map(|&e| &self.edges[e])
    }

    /// Edges whose source is `v`.
    pub fn out_edges(&self, v: usize) -> impl Iterator<Item = &Edge> {
        self.out_edges[v].iter().map(|&e| &self.edges[e])
    }

    pub fn in_edge_indices(&self, v: usize) -> &[usize] {
        &self.in_edges[v]
    }

    pub fn out_edge_indices(&self, v: usize) -> &[usize] {
        &self.out_edges[v]
    }

    pub fn in_degree(&self, v: usize) -> usize {
        self.in_edges[v].len()
    }

    pub fn out_degree(&self, v: usize) -> usize {
        self.out_edges[v].len()
    }
}
