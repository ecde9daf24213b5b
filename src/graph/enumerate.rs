//! Bounded-length path enumeration between entity pairs.
//!
//! Breadth-first from the subject, expanding forward edges as `r` and backward edges as `_r`.
//! A branch never revisits a node it already holds, and reaching the object ends the branch.
//! Within one depth, expansion order is forward before inverse, then neighbor index, then
//! relation index, so when the per-pair cap truncates the result the shortest paths are kept.

use std::collections::{HashSet, VecDeque};

use crate::error::{RelpathError, Result};
use crate::graph::AdjacencyGraph;
use crate::paths::{PathForm, EDGE_SEPARATOR};
use crate::vocab::{Direction, NodeId, Step, Vocabulary};

/// Limits and output shape of one enumeration pass.
#[derive(Debug, Clone)]
pub struct EnumeratorConfig {
    /// Maximum number of relation steps.
    pub max_length: usize,
    /// Keep interior entities (entity-bearing paths) instead of relation-only paths.
    pub include_entity: bool,
    /// Keep single-edge paths between the pair.
    pub include_path_len1: bool,
    /// Stop once this many distinct paths were found for a pair.
    pub max_paths_per_pair: usize,
    /// Stop once this many branches were expanded for a pair.
    pub max_expansions_per_pair: Option<usize>,
}

/// Paths found for one pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairEnumeration {
    /// Distinct paths in discovery order.
    pub paths: Vec<PathForm>,
    /// The per-pair path cap was reached.
    pub capped: bool,
    /// The expansion budget ran out before the search finished.
    pub budget_exhausted: bool,
}

struct Branch {
    nodes: Vec<NodeId>,
    steps: Vec<Step>,
}

/// Enumerates paths over a shared, read-only graph.
pub struct PathEnumerator<'a> {
    graph: &'a AdjacencyGraph,
    vocab: &'a Vocabulary,
    config: EnumeratorConfig,
}

impl<'a> PathEnumerator<'a> {
    pub fn new(graph: &'a AdjacencyGraph, vocab: &'a Vocabulary, config: EnumeratorConfig) -> Self {
        Self { graph, vocab, config }
    }

    pub fn config(&self) -> &EnumeratorConfig {
        &self.config
    }

    /// Enumerate by entity name. Names missing from the vocabulary have no paths.
    pub fn enumerate_names(&self, subject: &str, object: &str) -> Result<PairEnumeration> {
        match (self.vocab.entity(subject), self.vocab.entity(object)) {
            (Some(s), Some(o)) => self.enumerate(s, o),
            _ => Ok(PairEnumeration::default()),
        }
    }

    pub fn enumerate(&self, subject: NodeId, object: NodeId) -> Result<PairEnumeration> {
        let mut result = PairEnumeration::default();
        if self.config.max_length == 0 || self.config.max_paths_per_pair == 0 {
            return Ok(result);
        }

        let mut seen: HashSet<PathForm> = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(Branch {
            nodes: vec![subject],
            steps: Vec::new(),
        });
        let mut expansions = 0usize;

        while let Some(branch) = queue.pop_front() {
            if let Some(limit) = self.config.max_expansions_per_pair {
                if expansions >= limit {
                    result.budget_exhausted = true;
                    break;
                }
            }
            expansions += 1;

            let current = match branch.nodes.last() {
                Some(&node) => node,
                None => continue,
            };
            let depth = branch.steps.len() + 1;

            for direction in [Direction::Forward, Direction::Inverse] {
                for adj in self.graph.neighbors(current, direction) {
                    if branch.nodes.contains(&adj.node) {
                        continue;
                    }

                    for &relation in &adj.relations {
                        let step = Step { relation, direction };

                        if adj.node == object {
                            if depth == 1 && !self.config.include_path_len1 {
                                continue;
                            }
                            let form = self.render(&branch, step, object)?;
                            if seen.insert(form.clone()) {
                                result.paths.push(form);
                                if result.paths.len() >= self.config.max_paths_per_pair {
                                    result.capped = true;
                                    return Ok(result);
                                }
                            }
                        } else if depth < self.config.max_length {
                            let mut nodes = branch.nodes.clone();
                            nodes.push(adj.node);
                            let mut steps = branch.steps.clone();
                            steps.push(step);
                            queue.push_back(Branch { nodes, steps });
                        }
                    }
                }
            }
        }

        Ok(result)
    }

    fn render(&self, branch: &Branch, last: Step, object: NodeId) -> Result<PathForm> {
        let steps = branch.steps.iter().copied().chain(std::iter::once(last));

        if !self.config.include_entity {
            let tokens = steps
                .map(|step| self.vocab.step_token(step))
                .collect::<Result<Vec<_>>>()?;
            return Ok(PathForm::RelationOnly(tokens));
        }

        let mut tokens = Vec::with_capacity(branch.nodes.len() * 2 + 1);
        if let Some(&first) = branch.nodes.first() {
            tokens.push(self.entity_token(first)?);
        }
        let landings = branch.nodes.iter().skip(1).copied().chain(std::iter::once(object));
        for (step, node) in steps.zip(landings) {
            tokens.push(self.vocab.step_token(step)?);
            tokens.push(self.entity_token(node)?);
        }
        Ok(PathForm::EntityBearing(tokens))
    }

    /// Entity-bearing paths are split on `-`, so a hyphenated entity could not be read back.
    fn entity_token(&self, node: NodeId) -> Result<String> {
        let name = self.vocab.entity_token(node)?;
        if name.contains(EDGE_SEPARATOR) {
            return Err(RelpathError::Schema(format!(
                "entity {:?} contains '{}' and cannot appear in an entity-bearing path",
                name, EDGE_SEPARATOR
            )));
        }
        Ok(name.to_string())
    }
}
