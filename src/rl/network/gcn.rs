//! Graph convolution layers using tch-rs (PyTorch bindings).
//!
//! This module is only available with the `gnn` feature.

use petgraph::visit::EdgeRef;
use tch::{nn, Device, Tensor};

use crate::types::TaskGraph;

/// Dense normalized adjacency `D_in^{-1/2} (A + I) D_out^{-1/2}`.
///
/// Row `d`, column `s` is non-zero when `s → d` is an edge (or `s == d`),
/// so `adj.matmul(h)` aggregates each node's predecessors into it.
pub fn normalized_adjacency(graph: &TaskGraph, device: Device) -> Tensor {
    let n = graph.node_count();
    let mut dense = vec![0f32; n * n];
    let mut in_degree = vec![0f32; n];
    let mut out_degree = vec![0f32; n];

    let self_loops = (0..n).map(|i| (i, i));
    let edges = graph
        .edge_references()
        .map(|e| (e.source().index(), e.target().index()));
    for (src, dst) in self_loops.chain(edges) {
        dense[dst * n + src] += 1.0;
        out_degree[src] += 1.0;
        in_degree[dst] += 1.0;
    }

    for dst in 0..n {
        let in_norm = in_degree[dst].max(1.0).powf(-0.5);
        for src in 0..n {
            dense[dst * n + src] *= in_norm * out_degree[src].max(1.0).powf(-0.5);
        }
    }

    Tensor::from_slice(&dense)
        .reshape([n as i64, n as i64])
        .to_device(device)
}

/// Single graph convolution: `adj · (h · W) + b`.
#[derive(Debug)]
pub struct GraphConv {
    ws: Tensor,
    bs: Tensor,
}

impl GraphConv {
    pub fn new(p: nn::Path, in_dim: i64, out_dim: i64) -> Self {
        let ws = p.kaiming_uniform("weight", &[in_dim, out_dim]);
        let bs = p.zeros("bias", &[out_dim]);
        Self { ws, bs }
    }

    pub fn forward(&self, adj: &Tensor, h: &Tensor) -> Tensor {
        adj.matmul(&h.matmul(&self.ws)) + &self.bs
    }
}

/// Two-layer graph network: `features → hidden → 1`, ReLU after each layer.
///
/// Produces one scalar per node.
#[derive(Debug)]
pub struct Gcn {
    conv1: GraphConv,
    conv2: GraphConv,
}

impl Gcn {
    pub fn new(p: &nn::Path, features: usize, hidden: usize) -> Self {
        Self {
            conv1: GraphConv::new(p / "conv1", features as i64, hidden as i64),
            conv2: GraphConv::new(p / "conv2", hidden as i64, 1),
        }
    }

    /// Forward pass: `[n, features]` → `[n]`.
    pub fn forward(&self, adj: &Tensor, inputs: &Tensor) -> Tensor {
        let h = self.conv1.forward(adj, inputs).relu();
        self.conv2.forward(adj, &h).relu().squeeze_dim(-1)
    }
}
