//! Typed adjacency graph, bounded path enumeration and entity inference.
//!
//! The graph is arena-style: every node owns a sorted list of neighbors, and each neighbor
//! carries the sorted relation indices connecting the pair. Built once, read-only afterwards,
//! and safe to share across threads.

mod enumerate;
mod inference;

pub use enumerate::{EnumeratorConfig, PairEnumeration, PathEnumerator};
pub use inference::{infer_entities, infer_steps, EntityPath, InferenceOutcome, SearchBudget};

use crate::error::Result;
use crate::ingest::NamedTriple;
use crate::vocab::{Direction, NodeId, RelationId, Step, Vocabulary};

/// One typed directed edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    pub subject: NodeId,
    pub relation: RelationId,
    pub object: NodeId,
}

impl Edge {
    pub fn new(subject: NodeId, relation: RelationId, object: NodeId) -> Self {
        Self { subject, relation, object }
    }
}

/// A neighbor of some node together with the relations linking them.
///
/// In the forward list of `u`, `relations` are the `r` with `u -r-> node`. In the backward list
/// of `v`, `relations` are the `r` with `node -r-> v`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjacent {
    pub node: NodeId,
    pub relations: Vec<RelationId>,
}

/// Forward/backward adjacency over typed directed edges.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyGraph {
    children: Vec<Vec<Adjacent>>,
    parents: Vec<Vec<Adjacent>>,
    edge_count: usize,
}

impl AdjacencyGraph {
    /// Build the graph in one pass. Duplicate edges collapse; self loops are kept.
    /// `node_count` is grown if an edge references a larger index.
    pub fn build(node_count: usize, edges: impl IntoIterator<Item = Edge>) -> Self {
        let mut edges: Vec<Edge> = edges.into_iter().collect();
        let node_count = edges
            .iter()
            .map(|e| e.subject.index().max(e.object.index()) + 1)
            .max()
            .unwrap_or(0)
            .max(node_count);

        edges.sort_unstable_by_key(|e| (e.subject, e.object, e.relation));
        edges.dedup();

        let mut children: Vec<Vec<Adjacent>> = vec![Vec::new(); node_count];
        for edge in &edges {
            push_grouped(&mut children[edge.subject.index()], edge.object, edge.relation);
        }

        edges.sort_unstable_by_key(|e| (e.object, e.subject, e.relation));
        let mut parents: Vec<Vec<Adjacent>> = vec![Vec::new(); node_count];
        for edge in &edges {
            push_grouped(&mut parents[edge.object.index()], edge.subject, edge.relation);
        }

        Self {
            children,
            parents,
            edge_count: edges.len(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.children.len()
    }

    /// Number of distinct edges after duplicate collapse.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Forward neighbors of `node`, sorted by index. Empty for unknown nodes.
    pub fn out_edges(&self, node: NodeId) -> &[Adjacent] {
        self.children.get(node.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Backward neighbors of `node`, sorted by index. Empty for unknown nodes.
    pub fn in_edges(&self, node: NodeId) -> &[Adjacent] {
        self.parents.get(node.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Neighbors reachable from `node` when walking in `direction`.
    pub fn neighbors(&self, node: NodeId, direction: Direction) -> &[Adjacent] {
        match direction {
            Direction::Forward => self.out_edges(node),
            Direction::Inverse => self.in_edges(node),
        }
    }

    pub fn children_of(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.out_edges(node).iter().map(|adj| adj.node)
    }

    pub fn parents_of(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.in_edges(node).iter().map(|adj| adj.node)
    }

    /// Relations `r` such that `u -r-> v`, sorted. Empty when no edge exists.
    pub fn relations_between(&self, u: NodeId, v: NodeId) -> &[RelationId] {
        let out = self.out_edges(u);
        match out.binary_search_by_key(&v, |adj| adj.node) {
            Ok(pos) => &out[pos].relations,
            Err(_) => &[],
        }
    }

    /// Whether walking `step` from `from` can land on `to`.
    pub fn has_step(&self, from: NodeId, step: Step, to: NodeId) -> bool {
        let relations = match step.direction {
            Direction::Forward => self.relations_between(from, to),
            Direction::Inverse => self.relations_between(to, from),
        };
        relations.binary_search(&step.relation).is_ok()
    }
}

fn push_grouped(list: &mut Vec<Adjacent>, node: NodeId, relation: RelationId) {
    match list.last_mut() {
        Some(last) if last.node == node => last.relations.push(relation),
        _ => list.push(Adjacent {
            node,
            relations: vec![relation],
        }),
    }
}

/// Intern every triple and build the graph over the full edge set.
pub fn build_graph(triples: &[NamedTriple]) -> Result<(Vocabulary, AdjacencyGraph)> {
    let mut vocab = Vocabulary::new();
    let mut edges = Vec::with_capacity(triples.len());
    for triple in triples {
        let subject = vocab.intern_entity(&triple.subject)?;
        let relation = vocab.intern_relation(&triple.relation)?;
        let object = vocab.intern_entity(&triple.object)?;
        edges.push(Edge::new(subject, relation, object));
    }
    let graph = AdjacencyGraph::build(vocab.entity_count(), edges);
    log::info!(
        "Built graph: {} entities, {} relations, {} edges",
        vocab.entity_count(),
        vocab.relation_count(),
        graph.edge_count()
    );
    Ok((vocab, graph))
}
