//! Layered (Sugiyama style) graph drawing.
//!
//! The algorithm runs in four phases:
//! 1. **Cycle breaking**: edges closing a cycle in a depth-first search are
//!    reversed, which leaves a DAG.
//! 2. **Layering**: longest path from the sources, then sources are pulled
//!    down next to their successors. Edges spanning several layers are split
//!    with virtual vertices, one per crossed layer.
//! 3. **Ordering**: barycenter sweeps, downwards then upwards, keeping the
//!    best ordering seen and stopping once a round brings no improvement.
//! 4. **Placement**: every vertex moves towards the mean of its neighbours in
//!    the adjacent layer, with order and spacing kept as hard constraints.
//!
//! Everything is computed top-down; the requested [`Direction`] is applied
//! only when mapping to pixel coordinates.

use std::collections::HashSet;

use anyhow::anyhow;
use petgraph::Direction::{Incoming, Outgoing};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{DfsEvent, depth_first_search};

use crate::layout::{Arrangement, Direction, LayoutBackend, LayoutInput, LayoutOptions, Rect};

/// Alternating down/up passes of the placement phase.
const ALIGN_PASSES: usize = 4;

/// The default [`LayoutBackend`].
#[derive(Debug, Clone, Default)]
pub struct Layered {
    options: LayoutOptions,
}

impl Layered {
    pub fn new(options: LayoutOptions) -> Self {
        Self { options }
    }
}

impl LayoutBackend for Layered {
    fn algorithm(&self) -> &'static str {
        "layered"
    }

    fn arrange(&self, input: &LayoutInput, direction: Direction) -> anyhow::Result<Arrangement> {
        let count = input.ids.len();
        if count == 0 {
            return Ok(Arrangement {
                boxes: Vec::new(),
                width: 0.0,
                height: 0.0,
            });
        }

        let arcs = acyclic_arcs(count, &input.arcs);
        let ranks = assign_ranks(count, &arcs)?;

        let mut layering = Layering::new(&ranks, &arcs);
        let crossings = layering.reduce_crossings(self.options.sweeps);

        tracing::debug!(
            nodes = count,
            layers = layering.layers.len(),
            crossings,
            "layered graph ordered"
        );

        Ok(layering.arrange(&self.options, direction))
    }
}

/// Edges with self-loops and repeats dropped and every DFS back edge reversed.
fn acyclic_arcs(count: usize, arcs: &[(usize, usize)]) -> Vec<(usize, usize)> {
    let mut graph = DiGraph::<(), ()>::with_capacity(count, arcs.len());
    for _ in 0..count {
        graph.add_node(());
    }

    let mut seen = HashSet::new();
    for &(u, v) in arcs {
        if u != v && seen.insert((u, v)) {
            graph.add_edge(NodeIndex::new(u), NodeIndex::new(v), ());
        }
    }

    let mut back = HashSet::new();
    depth_first_search(&graph, graph.node_indices(), |event| {
        if let DfsEvent::BackEdge(u, v) = event {
            back.insert((u.index(), v.index()));
        }
    });

    let mut seen = HashSet::new();
    let mut result = Vec::with_capacity(graph.edge_count());

    for edge in graph.raw_edges() {
        let (u, v) = (edge.source().index(), edge.target().index());
        let arc = if back.contains(&(u, v)) { (v, u) } else { (u, v) };
        if seen.insert(arc) {
            result.push(arc);
        }
    }

    result
}

/// Layer of every node; all edges point from a lower to a higher layer.
fn assign_ranks(count: usize, arcs: &[(usize, usize)]) -> anyhow::Result<Vec<usize>> {
    let mut graph = DiGraph::<(), ()>::with_capacity(count, arcs.len());
    for _ in 0..count {
        graph.add_node(());
    }
    for &(u, v) in arcs {
        graph.add_edge(NodeIndex::new(u), NodeIndex::new(v), ());
    }

    let order = toposort(&graph, None)
        .map_err(|cycle| anyhow!("cycle through node {} left after reversal", cycle.node_id().index()))?;

    let mut rank = vec![0usize; count];
    for &u in &order {
        for v in graph.neighbors_directed(u, Outgoing) {
            rank[v.index()] = rank[v.index()].max(rank[u.index()] + 1);
        }
    }

    // sources sit right above their closest successor
    for &u in order.iter().rev() {
        if graph.neighbors_directed(u, Incoming).next().is_some() {
            continue;
        }
        if let Some(closest) = graph
            .neighbors_directed(u, Outgoing)
            .map(|v| rank[v.index()])
            .min()
        {
            rank[u.index()] = closest - 1;
        }
    }

    let lowest = rank.iter().copied().min().unwrap_or(0);
    Ok(rank.into_iter().map(|r| r - lowest).collect())
}

/// Proper layered graph: every edge connects two consecutive layers.
///
/// Vertices `0..count` are the input nodes, anything after is virtual.
struct Layering {
    /// Input node behind each vertex, `None` for virtual ones.
    origin: Vec<Option<usize>>,
    rank: Vec<usize>,
    layers: Vec<Vec<usize>>,
    /// Neighbours in the layer above.
    upper: Vec<Vec<usize>>,
    /// Neighbours in the layer below.
    lower: Vec<Vec<usize>>,
}

impl Layering {
    fn new(ranks: &[usize], arcs: &[(usize, usize)]) -> Self {
        let depth = ranks.iter().max().map_or(0, |r| r + 1);

        let mut this = Self {
            origin: Vec::new(),
            rank: Vec::new(),
            layers: vec![Vec::new(); depth],
            upper: Vec::new(),
            lower: Vec::new(),
        };

        for (node, &rank) in ranks.iter().enumerate() {
            this.push(Some(node), rank);
        }

        for &(u, v) in arcs {
            let mut prev = u;
            for rank in ranks[u] + 1..ranks[v] {
                let dummy = this.push(None, rank);
                this.link(prev, dummy);
                prev = dummy;
            }
            this.link(prev, v);
        }

        this
    }

    fn push(&mut self, origin: Option<usize>, rank: usize) -> usize {
        let vertex = self.origin.len();
        self.origin.push(origin);
        self.rank.push(rank);
        self.upper.push(Vec::new());
        self.lower.push(Vec::new());
        self.layers[rank].push(vertex);
        vertex
    }

    fn link(&mut self, above: usize, below: usize) {
        self.lower[above].push(below);
        self.upper[below].push(above);
    }

    fn positions(&self) -> Vec<usize> {
        let mut position = vec![0; self.origin.len()];
        for layer in &self.layers {
            for (i, &v) in layer.iter().enumerate() {
                position[v] = i;
            }
        }
        position
    }

    /// Number of edge crossings between every pair of adjacent layers.
    fn crossings(&self, position: &[usize]) -> usize {
        self.layers
            .windows(2)
            .map(|pair| {
                let mut ends: Vec<(usize, usize)> = pair[0]
                    .iter()
                    .flat_map(|&u| self.lower[u].iter().map(move |&v| (position[u], position[v])))
                    .collect();
                ends.sort_unstable();

                let mut count = 0;
                for i in 0..ends.len() {
                    for j in i + 1..ends.len() {
                        if ends[i].0 < ends[j].0 && ends[i].1 > ends[j].1 {
                            count += 1;
                        }
                    }
                }
                count
            })
            .sum()
    }

    /// Reorders layer `r` by the barycenter of each vertex's neighbours in the
    /// layer above (`downward`) or below. Vertices without such neighbours
    /// keep their current position as the key; ties keep the current order.
    fn sort_layer(&mut self, r: usize, position: &mut [usize], downward: bool) {
        let mut keyed: Vec<(f64, usize)> = self.layers[r]
            .iter()
            .map(|&v| {
                let neighbours = if downward { &self.upper[v] } else { &self.lower[v] };
                let key = match neighbours.len() {
                    0 => position[v] as f64,
                    len => neighbours.iter().map(|&u| position[u] as f64).sum::<f64>() / len as f64,
                };
                (key, v)
            })
            .collect();

        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

        self.layers[r] = keyed.into_iter().map(|(_, v)| v).collect();
        for (i, &v) in self.layers[r].iter().enumerate() {
            position[v] = i;
        }
    }

    /// Returns the number of crossings left.
    fn reduce_crossings(&mut self, sweeps: usize) -> usize {
        let mut position = self.positions();
        let mut best = self.layers.clone();
        let mut best_crossings = self.crossings(&position);

        for _ in 0..sweeps {
            if best_crossings == 0 {
                break;
            }

            for r in 1..self.layers.len() {
                self.sort_layer(r, &mut position, true);
            }
            for r in (0..self.layers.len().saturating_sub(1)).rev() {
                self.sort_layer(r, &mut position, false);
            }

            let crossings = self.crossings(&position);
            if crossings < best_crossings {
                best_crossings = crossings;
                best = self.layers.clone();
            } else {
                break;
            }
        }

        self.layers = best;
        best_crossings
    }

    /// Center of every vertex along the order axis, leftmost edge at zero.
    fn place(&self, options: &LayoutOptions, breadth: f64) -> Vec<f64> {
        let size = |v: usize| if self.origin[v].is_some() { breadth } else { 0.0 };
        let separation = |a: usize, b: usize| {
            let gap = match (self.origin[a], self.origin[b]) {
                (Some(_), Some(_)) => options.node_spacing,
                _ => options.edge_spacing,
            };
            size(a) / 2.0 + gap + size(b) / 2.0
        };

        let mut center = vec![0.0; self.origin.len()];
        for layer in &self.layers {
            let mut at = 0.0;
            for (i, &v) in layer.iter().enumerate() {
                if i > 0 {
                    at += separation(layer[i - 1], v);
                }
                center[v] = at;
            }
        }

        // start with every layer centered under the widest one
        let spans: Vec<f64> = self
            .layers
            .iter()
            .map(|layer| layer.last().map_or(0.0, |&v| center[v]))
            .collect();
        let widest = spans.iter().copied().fold(0.0, f64::max);
        for (layer, span) in self.layers.iter().zip(&spans) {
            for &v in layer {
                center[v] += (widest - span) / 2.0;
            }
        }

        for _ in 0..ALIGN_PASSES {
            for r in 1..self.layers.len() {
                self.align(r, &mut center, true, &separation);
            }
            for r in (0..self.layers.len().saturating_sub(1)).rev() {
                self.align(r, &mut center, false, &separation);
            }
        }

        let left = (0..center.len())
            .map(|v| center[v] - size(v) / 2.0)
            .fold(f64::INFINITY, f64::min);
        for c in &mut center {
            *c -= left;
        }

        center
    }

    fn align(
        &self,
        r: usize,
        center: &mut [f64],
        downward: bool,
        separation: &impl Fn(usize, usize) -> f64,
    ) {
        let layer = &self.layers[r];

        let desired: Vec<f64> = layer
            .iter()
            .map(|&v| {
                let neighbours = if downward { &self.upper[v] } else { &self.lower[v] };
                match neighbours.len() {
                    0 => center[v],
                    len => neighbours.iter().map(|&u| center[u]).sum::<f64>() / len as f64,
                }
            })
            .collect();

        let gaps: Vec<f64> = layer.windows(2).map(|w| separation(w[0], w[1])).collect();

        for (&v, x) in layer.iter().zip(fit_ordered(&desired, &gaps)) {
            center[v] = x;
        }
    }

    fn arrange(&self, options: &LayoutOptions, direction: Direction) -> Arrangement {
        let vertical = direction.is_vertical();
        let (breadth, depth) = match vertical {
            true => (options.node_width, options.node_height),
            false => (options.node_height, options.node_width),
        };

        let center = self.place(options, breadth);

        let order_extent = (0..center.len())
            .map(|v| match self.origin[v] {
                Some(_) => center[v] + breadth / 2.0,
                None => center[v],
            })
            .fold(0.0, f64::max);

        let layers = self.layers.len() as f64;
        let rank_extent = layers * depth + (layers - 1.0) * options.layer_spacing;

        let boxes = self
            .origin
            .iter()
            .enumerate()
            .filter(|(_, origin)| origin.is_some())
            .map(|(v, _)| {
                let order = center[v] - breadth / 2.0;
                let mut rank = self.rank[v] as f64 * (depth + options.layer_spacing);
                if direction.is_reversed() {
                    rank = rank_extent - rank - depth;
                }

                let (x, y) = match vertical {
                    true => (order, rank),
                    false => (rank, order),
                };

                Rect {
                    x: round(x + options.padding),
                    y: round(y + options.padding),
                    width: options.node_width,
                    height: options.node_height,
                }
            })
            .collect();

        let (width, height) = match vertical {
            true => (order_extent, rank_extent),
            false => (rank_extent, order_extent),
        };

        Arrangement {
            boxes,
            width: round(width + 2.0 * options.padding),
            height: round(height + 2.0 * options.padding),
        }
    }
}

/// Least-squares fit of `desired` positions that keeps their order and at
/// least `gaps[i]` between neighbours `i` and `i + 1`.
///
/// Subtracting the cumulative gaps turns this into isotonic regression,
/// solved with pool-adjacent-violators.
fn fit_ordered(desired: &[f64], gaps: &[f64]) -> Vec<f64> {
    let mut offset = Vec::with_capacity(desired.len());
    let mut acc = 0.0;
    for i in 0..desired.len() {
        if i > 0 {
            acc += gaps[i - 1];
        }
        offset.push(acc);
    }

    // (mean, weight)
    let mut blocks: Vec<(f64, usize)> = Vec::new();
    for (d, o) in desired.iter().zip(&offset) {
        blocks.push((d - o, 1));

        while let [.., (m1, w1), (m2, w2)] = blocks[..] {
            if m1 <= m2 {
                break;
            }
            blocks.truncate(blocks.len() - 2);
            let weight = w1 + w2;
            blocks.push(((m1 * w1 as f64 + m2 * w2 as f64) / weight as f64, weight));
        }
    }

    blocks
        .into_iter()
        .flat_map(|(mean, weight)| std::iter::repeat_n(mean, weight))
        .zip(offset)
        .map(|(mean, o)| mean + o)
        .collect()
}

fn round(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(ids: &[&'static str], arcs: &[(usize, usize)], direction: Direction) -> Arrangement {
        let input = LayoutInput {
            ids: ids.to_vec(),
            arcs: arcs.to_vec(),
        };
        Layered::default().arrange(&input, direction).unwrap()
    }

    #[test]
    fn chain_stacks_downwards() {
        let out = run(&["a", "b", "c"], &[(0, 1), (1, 2)], Direction::Down);

        let xs: Vec<_> = out.boxes.iter().map(|b| b.x).collect();
        let ys: Vec<_> = out.boxes.iter().map(|b| b.y).collect();
        assert_eq!(xs, vec![12.0, 12.0, 12.0]);
        assert_eq!(ys, vec![12.0, 172.0, 332.0]);
        assert_eq!((out.width, out.height), (184.0, 424.0));
        assert!(out.boxes.iter().all(|b| b.width == 160.0 && b.height == 80.0));
    }

    #[test]
    fn upward_flow_flips_layers() {
        let out = run(&["a", "b", "c"], &[(0, 1), (1, 2)], Direction::Up);
        let ys: Vec<_> = out.boxes.iter().map(|b| b.y).collect();
        assert_eq!(ys, vec![332.0, 172.0, 12.0]);
    }

    #[test]
    fn horizontal_flows_use_x_for_layers() {
        let right = run(&["a", "b"], &[(0, 1)], Direction::Right);
        assert!(right.boxes[0].x < right.boxes[1].x);
        assert_eq!(right.boxes[0].y, right.boxes[1].y);
        assert_eq!(right.width, 160.0 * 2.0 + 80.0 + 24.0);

        let left = run(&["a", "b"], &[(0, 1)], Direction::Left);
        assert!(left.boxes[0].x > left.boxes[1].x);
    }

    #[test]
    fn diamond_is_centered() {
        let out = run(
            &["a", "b", "c", "d"],
            &[(0, 1), (0, 2), (1, 3), (2, 3)],
            Direction::Down,
        );

        let xs: Vec<_> = out.boxes.iter().map(|b| b.x).collect();
        assert_eq!(xs, vec![132.0, 12.0, 252.0, 132.0]);
        assert_eq!(out.width, 424.0);
    }

    #[test]
    fn crossing_is_removed() {
        // a -> d, b -> c with c listed before d
        let out = run(&["a", "b", "c", "d"], &[(0, 3), (1, 2)], Direction::Down);
        let (a, b, c, d) = (out.boxes[0], out.boxes[1], out.boxes[2], out.boxes[3]);
        assert!(a.x < b.x);
        assert!(d.x < c.x);
    }

    #[test]
    fn cycles_are_laid_out() {
        let out = run(&["a", "b", "c"], &[(0, 1), (1, 2), (2, 0), (1, 1)], Direction::Down);
        assert_eq!(out.boxes.len(), 3);

        let mut ys: Vec<_> = out.boxes.iter().map(|b| b.y).collect();
        ys.dedup();
        assert_eq!(ys.len(), 3);
    }

    #[test]
    fn long_edges_keep_layer_order() {
        let out = run(&["a", "b", "c"], &[(0, 1), (1, 2), (0, 2)], Direction::Down);
        assert!(out.boxes[0].y < out.boxes[1].y);
        assert!(out.boxes[1].y < out.boxes[2].y);
    }

    #[test]
    fn repeated_runs_match() {
        let ids = ["a", "b", "c", "d", "e", "f"];
        let arcs = [(0, 2), (1, 2), (0, 3), (3, 4), (2, 4), (1, 5), (5, 0), (4, 1)];

        let first = run(&ids, &arcs, Direction::Down);
        let second = run(&ids, &arcs, Direction::Down);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_graph() {
        let out = run(&[], &[], Direction::Down);
        assert!(out.boxes.is_empty());
    }

    #[test]
    fn fit_keeps_spacing() {
        assert_eq!(fit_ordered(&[5.0, 5.0], &[10.0]), vec![0.0, 10.0]);
        assert_eq!(fit_ordered(&[0.0, 50.0], &[10.0]), vec![0.0, 50.0]);
        assert_eq!(fit_ordered(&[], &[]), Vec::<f64>::new());
    }
}
