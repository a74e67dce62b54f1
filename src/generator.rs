//! Random instance generators.
//!
//! Two models share the [`InstanceGenerator`] contract:
//! - Uniform (Erdős–Rényi): every vertex pair is kept independently with
//!   probability `p`
//! - Power-law cluster (Holme–Kim): preferential attachment with triad
//!   formation, `m = n - 2` edges per new vertex
//!
//! The random source is always passed in by the caller. A harness run seeds
//! one `StdRng` at startup and threads it through every call, so the same
//! seed and the same sequence of calls reproduce the same instances.

use crate::error::{HarnessError, Result};
use crate::instance::{Edge, Instance};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// Seed used when neither the config nor the command line provides one
pub const DEFAULT_SEED: u64 = 20250514;

/// Create the harness-wide random source
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Lower bound of the uniform edge-weight draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum WeightRange {
    /// Weights in `[0, max_weight]`
    FromZero,
    /// Weights in `[1, max_weight]`
    FromOne,
}

impl WeightRange {
    pub fn floor(self) -> u32 {
        match self {
            WeightRange::FromZero => 0,
            WeightRange::FromOne => 1,
        }
    }

    fn draw(self, rng: &mut dyn RngCore, max_weight: u32) -> u32 {
        rng.gen_range(self.floor()..=max_weight)
    }

    fn check(self, max_weight: u32) -> Result<()> {
        if max_weight < self.floor() {
            return Err(HarnessError::InvalidParameters(format!(
                "max_weight {} is below the weight floor {}",
                max_weight,
                self.floor()
            )));
        }
        Ok(())
    }
}

/// Random graph model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum GraphModel {
    ErdosRenyi,
    PowerlawCluster,
}

impl GraphModel {
    /// Name used in report file names
    pub fn as_str(self) -> &'static str {
        match self {
            GraphModel::ErdosRenyi => "erdos_renyi",
            GraphModel::PowerlawCluster => "powerlaw_cluster",
        }
    }

    /// Build the generator for this model. `weights` only affects the
    /// uniform model; power-law-cluster weights always start at 1.
    pub fn generator(self, weights: WeightRange) -> Box<dyn InstanceGenerator> {
        match self {
            GraphModel::ErdosRenyi => Box::new(UniformGenerator::new(weights)),
            GraphModel::PowerlawCluster => Box::new(PowerlawClusterGenerator::new()),
        }
    }
}

impl fmt::Display for GraphModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Produces one instance per call from `(k, n, p, max_weight)`
pub trait InstanceGenerator {
    /// Model this generator implements
    fn model(&self) -> GraphModel;

    fn generate(
        &self,
        rng: &mut dyn RngCore,
        k: usize,
        n: usize,
        p: f64,
        max_weight: u32,
    ) -> Result<Instance>;
}

/// Erdős–Rényi style generator
#[derive(Debug, Clone, Copy)]
pub struct UniformGenerator {
    weights: WeightRange,
}

impl UniformGenerator {
    pub fn new(weights: WeightRange) -> Self {
        Self { weights }
    }
}

impl InstanceGenerator for UniformGenerator {
    fn model(&self) -> GraphModel {
        GraphModel::ErdosRenyi
    }

    fn generate(
        &self,
        rng: &mut dyn RngCore,
        k: usize,
        n: usize,
        p: f64,
        max_weight: u32,
    ) -> Result<Instance> {
        self.weights.check(max_weight)?;
        debug!(k, n, p, max_weight, model = "erdos_renyi", "Generating graph");

        let mut edges = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                // The weight is drawn only for kept pairs
                if rng.gen::<f64>() < p {
                    edges.push(Edge::new(i, j, self.weights.draw(rng, max_weight)));
                }
            }
        }

        Ok(Instance::new(n, k, edges))
    }
}

/// Holme–Kim power-law-cluster generator with `m = n - 2`
#[derive(Debug, Clone, Copy, Default)]
pub struct PowerlawClusterGenerator;

impl PowerlawClusterGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl InstanceGenerator for PowerlawClusterGenerator {
    fn model(&self) -> GraphModel {
        GraphModel::PowerlawCluster
    }

    fn generate(
        &self,
        rng: &mut dyn RngCore,
        k: usize,
        n: usize,
        p: f64,
        max_weight: u32,
    ) -> Result<Instance> {
        if n < 3 {
            return Err(HarnessError::InvalidParameters(format!(
                "power-law-cluster graphs need n >= 3, got {}",
                n
            )));
        }
        if !(0.0..=1.0).contains(&p) {
            return Err(HarnessError::InvalidParameters(format!(
                "triad probability must be in [0, 1], got {}",
                p
            )));
        }
        WeightRange::FromOne.check(max_weight)?;
        debug!(k, n, p, max_weight, model = "powerlaw_cluster", "Generating graph");

        let topology = powerlaw_cluster_edges(rng, n, n - 2, p);
        let edges = topology
            .into_iter()
            .map(|(u, v)| Edge::new(u, v, WeightRange::FromOne.draw(rng, max_weight)))
            .collect();

        Ok(Instance::new(n, k, edges))
    }
}

/// Edge list of a Holme–Kim graph, in insertion order, each pair once as
/// `(smaller, larger)`.
fn powerlaw_cluster_edges(
    rng: &mut dyn RngCore,
    n: usize,
    m: usize,
    p: f64,
) -> Vec<(usize, usize)> {
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut present: HashSet<(usize, usize)> = HashSet::new();
    let mut edges = Vec::new();

    let mut add_edge = |a: usize, b: usize, adjacency: &mut Vec<Vec<usize>>| {
        let key = (a.min(b), a.max(b));
        if present.insert(key) {
            adjacency[a].push(b);
            adjacency[b].push(a);
            edges.push(key);
        }
    };

    // Every endpoint, repeated once per incident edge, for degree-weighted picks
    let mut repeated: Vec<usize> = (0..m).collect();

    for source in m..n {
        let mut targets = random_subset(rng, &repeated, m);

        let Some(mut target) = targets.pop() else {
            break;
        };
        add_edge(source, target, &mut adjacency);
        repeated.push(target);

        let mut count = 1;
        while count < m {
            if rng.gen::<f64>() < p {
                let neighborhood: Vec<usize> = adjacency[target]
                    .iter()
                    .copied()
                    .filter(|&nbr| nbr != source && !adjacency[source].contains(&nbr))
                    .collect();
                if let Some(&nbr) = neighborhood.choose(&mut *rng) {
                    add_edge(source, nbr, &mut adjacency);
                    repeated.push(nbr);
                    count += 1;
                    continue;
                }
            }
            match targets.pop() {
                Some(next) => target = next,
                None => break,
            }
            add_edge(source, target, &mut adjacency);
            repeated.push(target);
            count += 1;
        }

        repeated.extend(std::iter::repeat(source).take(m));
    }

    edges
}

/// `size` distinct values picked from `seq` with replacement until enough
/// distinct ones are seen
fn random_subset(rng: &mut dyn RngCore, seq: &[usize], size: usize) -> Vec<usize> {
    let mut picked: Vec<usize> = Vec::with_capacity(size);
    let distinct: HashSet<usize> = seq.iter().copied().collect();
    let size = size.min(distinct.len());
    while picked.len() < size {
        if let Some(&x) = seq.choose(&mut *rng) {
            if !picked.contains(&x) {
                picked.push(x);
            }
        }
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_simple_graph(instance: &Instance) {
        let mut seen = HashSet::new();
        for edge in &instance.edges {
            assert_ne!(edge.u, edge.v, "self loop in {:?}", edge);
            assert!(edge.u < instance.n && edge.v < instance.n);
            assert!(seen.insert((edge.u.min(edge.v), edge.u.max(edge.v))), "duplicate {:?}", edge);
        }
    }

    #[test]
    fn test_uniform_complete_graph() {
        let mut rng = seeded_rng(DEFAULT_SEED);
        let gen = UniformGenerator::new(WeightRange::FromZero);
        let instance = gen.generate(&mut rng, 2, 4, 1.0, 1000).unwrap();
        assert_eq!(instance.m(), 6);
        assert!(instance.edges.iter().all(|e| e.w <= 1000));
        assert_simple_graph(&instance);
    }

    #[test]
    fn test_uniform_empty_graph() {
        let mut rng = seeded_rng(7);
        let gen = UniformGenerator::new(WeightRange::FromOne);
        for n in [0, 1, 5, 40] {
            let instance = gen.generate(&mut rng, 2, n, 0.0, 10).unwrap();
            assert_eq!(instance.m(), 0);
            assert_eq!(instance.n, n);
        }
    }

    #[test]
    fn test_weight_floor_respected() {
        let mut rng = seeded_rng(1);
        let from_one = UniformGenerator::new(WeightRange::FromOne);
        let instance = from_one.generate(&mut rng, 2, 30, 1.0, 2).unwrap();
        assert!(instance.edges.iter().all(|e| (1..=2).contains(&e.w)));

        let from_zero = UniformGenerator::new(WeightRange::FromZero);
        let instance = from_zero.generate(&mut rng, 2, 30, 1.0, 1).unwrap();
        assert!(instance.edges.iter().all(|e| e.w <= 1));
        assert!(instance.edges.iter().any(|e| e.w == 0));
    }

    #[test]
    fn test_weight_floor_above_max_rejected() {
        let mut rng = seeded_rng(1);
        let gen = UniformGenerator::new(WeightRange::FromOne);
        assert!(matches!(
            gen.generate(&mut rng, 2, 4, 0.5, 0),
            Err(HarnessError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_same_seed_same_instance() {
        let gen = UniformGenerator::new(WeightRange::FromZero);
        let a = gen.generate(&mut seeded_rng(99), 3, 12, 0.5, 1000).unwrap();
        let b = gen.generate(&mut seeded_rng(99), 3, 12, 0.5, 1000).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_powerlaw_cluster_is_simple_and_connected_to_new_nodes() {
        let mut rng = seeded_rng(DEFAULT_SEED);
        let gen = PowerlawClusterGenerator::new();
        for n in [3, 5, 10, 25] {
            let instance = gen.generate(&mut rng, 2, n, 0.3, 1000).unwrap();
            assert_simple_graph(&instance);
            assert_eq!(instance.n, n);
            assert!(instance.edges.iter().all(|e| (1..=1000).contains(&e.w)));
            // Both late vertices attach to at least one earlier vertex
            for v in (n - 2)..n {
                assert!(instance.edges.iter().any(|e| e.u == v || e.v == v));
            }
        }
    }

    #[test]
    fn test_powerlaw_cluster_without_triads_attaches_m_edges() {
        let mut rng = seeded_rng(3);
        let gen = PowerlawClusterGenerator::new();
        let instance = gen.generate(&mut rng, 2, 8, 0.0, 5).unwrap();
        // Vertex 6 links to all of 0..6; vertex 7 to six distinct targets
        assert_eq!(instance.m(), 12);
    }

    #[test]
    fn test_powerlaw_cluster_rejects_tiny_graphs() {
        let mut rng = seeded_rng(3);
        let gen = PowerlawClusterGenerator::new();
        assert!(gen.generate(&mut rng, 2, 2, 0.5, 5).is_err());
        assert!(gen.generate(&mut rng, 2, 5, 1.5, 5).is_err());
    }

    #[test]
    fn test_model_dispatch() {
        assert_eq!(
            GraphModel::ErdosRenyi.generator(WeightRange::FromZero).model(),
            GraphModel::ErdosRenyi
        );
        assert_eq!(
            GraphModel::PowerlawCluster.generator(WeightRange::FromZero).model(),
            GraphModel::PowerlawCluster
        );
        assert_eq!(GraphModel::PowerlawCluster.to_string(), "powerlaw_cluster");
    }
}
