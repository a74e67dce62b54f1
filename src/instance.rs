//! Test instances and their line protocol.
//!
//! Vertices and weights are stored 0-based. The shift to 1-based ids and
//! weights happens only when an instance is written out as text:
//!
//! ```text
//! {n} {m} {k}
//! {u+1} {v+1} {w+1}
//! ...
//! ```

use crate::error::{HarnessError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Undirected weighted edge between two distinct vertices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub u: usize,
    pub v: usize,
    pub w: u32,
}

impl Edge {
    pub fn new(u: usize, v: usize, w: u32) -> Self {
        Self { u, v, w }
    }
}

/// One weighted-graph test case with a target partition count `k`.
///
/// The edge count is always derived from `edges`, so the header written
/// by [`Instance::to_protocol`] cannot disagree with the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// Vertex count
    pub n: usize,
    /// Number of parts the solver must cut the graph into
    pub k: usize,
    /// Edges in generation order
    pub edges: Vec<Edge>,
}

impl Instance {
    pub fn new(n: usize, k: usize, edges: Vec<Edge>) -> Self {
        Self { n, k, edges }
    }

    /// Edge count
    pub fn m(&self) -> usize {
        self.edges.len()
    }

    /// Serialize into the text fed to solver executables.
    /// No validation happens here; `k > n` is written as-is.
    pub fn to_protocol(&self) -> String {
        self.to_string()
    }

    /// Parse text produced by [`Instance::to_protocol`], undoing the
    /// 1-based vertex ids and the weight shift.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines().filter(|line| !line.trim().is_empty());

        let header = lines
            .next()
            .ok_or_else(|| HarnessError::MalformedInstance("empty input".to_string()))?;
        let [n, m, k] = parse_triple(header)?;

        // `m` is untrusted until the edge lines are counted
        let mut edges = Vec::with_capacity(m.min(text.len()));
        for line in lines {
            let [u, v, w] = parse_triple(line)?;
            if u == 0 || v == 0 || u > n || v > n {
                return Err(HarnessError::MalformedInstance(format!(
                    "vertex out of range 1..={} in line {:?}",
                    n, line
                )));
            }
            if w == 0 {
                return Err(HarnessError::MalformedInstance(format!(
                    "weight must be at least 1 in line {:?}",
                    line
                )));
            }
            let w = u32::try_from(w - 1).map_err(|_| {
                HarnessError::MalformedInstance(format!("weight too large in line {:?}", line))
            })?;
            edges.push(Edge::new(u - 1, v - 1, w));
        }

        if edges.len() != m {
            return Err(HarnessError::MalformedInstance(format!(
                "header declares {} edges but {} were found",
                m,
                edges.len()
            )));
        }

        Ok(Self { n, k, edges })
    }
}

fn parse_triple(line: &str) -> Result<[usize; 3]> {
    let mut values = [0usize; 3];
    let mut fields = line.split_whitespace();
    for value in values.iter_mut() {
        let field = fields.next().ok_or_else(|| {
            HarnessError::MalformedInstance(format!("expected three integers in line {:?}", line))
        })?;
        *value = field.parse().map_err(|_| {
            HarnessError::MalformedInstance(format!(
                "invalid integer {:?} in line {:?}",
                field, line
            ))
        })?;
    }
    if fields.next().is_some() {
        return Err(HarnessError::MalformedInstance(format!(
            "trailing data in line {:?}",
            line
        )));
    }
    Ok(values)
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.n, self.m(), self.k)?;
        for edge in &self.edges {
            write!(f, "\n{} {} {}", edge.u + 1, edge.v + 1, u64::from(edge.w) + 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Instance {
        Instance::new(
            3,
            2,
            vec![Edge::new(0, 1, 4), Edge::new(1, 2, 0), Edge::new(0, 2, 9)],
        )
    }

    #[test]
    fn test_protocol_layout() {
        assert_eq!(triangle().to_protocol(), "3 3 2\n1 2 5\n2 3 1\n1 3 10");
    }

    #[test]
    fn test_protocol_without_edges_is_header_only() {
        let instance = Instance::new(5, 3, Vec::new());
        assert_eq!(instance.to_protocol(), "5 0 3");
    }

    #[test]
    fn test_k_larger_than_n_passes_through() {
        let instance = Instance::new(2, 7, vec![Edge::new(0, 1, 1)]);
        assert_eq!(instance.to_protocol(), "2 1 7\n1 2 2");
    }

    #[test]
    fn test_parse_inverts_protocol() {
        let original = triangle();
        let parsed = Instance::parse(&original.to_protocol()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_parse_accepts_trailing_newline() {
        let parsed = Instance::parse("2 1 2\n1 2 3\n").unwrap();
        assert_eq!(parsed.edges, vec![Edge::new(0, 1, 2)]);
    }

    #[test]
    fn test_parse_rejects_edge_count_mismatch() {
        let err = Instance::parse("3 2 2\n1 2 3").unwrap_err();
        assert!(matches!(err, HarnessError::MalformedInstance(_)));

        // Huge declared edge count with no edge lines
        let err = Instance::parse("1 18446744073709551615 1").unwrap_err();
        assert!(matches!(err, HarnessError::MalformedInstance(_)));
    }

    #[test]
    fn test_parse_rejects_zero_based_ids() {
        assert!(Instance::parse("3 1 2\n0 2 3").is_err());
        assert!(Instance::parse("3 1 2\n1 4 3").is_err());
        assert!(Instance::parse("3 1 2\n1 2 0").is_err());
    }
}
