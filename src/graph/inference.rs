//! Entity inference: recover the entity sequences a relation-only path may have walked.

use std::collections::VecDeque;

use crate::error::{RelpathError, Result};
use crate::graph::AdjacencyGraph;
use crate::paths::{PathForm, EDGE_SEPARATOR};
use crate::vocab::{NodeId, Step, Vocabulary};

/// Bounds on one inference search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchBudget {
    pub max_results: usize,
    pub max_expansions: usize,
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self {
            max_results: 1000,
            max_expansions: 100_000,
        }
    }
}

/// One entity sequence realizing a relation path: `nodes.len() == steps.len() + 1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityPath {
    pub nodes: Vec<NodeId>,
    pub steps: Vec<Step>,
}

impl EntityPath {
    /// Render as an entity-bearing path, `a-r1-b-_r2-c`.
    pub fn to_form(&self, vocab: &Vocabulary) -> Result<PathForm> {
        let mut tokens = Vec::with_capacity(self.nodes.len() + self.steps.len());
        for (i, &node) in self.nodes.iter().enumerate() {
            if i > 0 {
                tokens.push(vocab.step_token(self.steps[i - 1])?);
            }
            tokens.push(vocab.entity_token(node)?.to_string());
        }
        Ok(PathForm::EntityBearing(tokens))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InferenceOutcome {
    pub paths: Vec<EntityPath>,
    /// The budget ran out; more sequences may exist.
    pub truncated: bool,
}

impl InferenceOutcome {
    pub fn forms(&self, vocab: &Vocabulary) -> Result<Vec<PathForm>> {
        self.paths.iter().map(|p| p.to_form(vocab)).collect()
    }
}

/// Infer entity sequences for a relation-only path such as `r1-_r2` between two named entities.
///
/// Unknown entity or relation names are errors. No matching sequence is an empty outcome.
pub fn infer_entities(
    graph: &AdjacencyGraph,
    vocab: &Vocabulary,
    source: &str,
    target: &str,
    relation_path: &str,
    budget: SearchBudget,
) -> Result<InferenceOutcome> {
    let source = vocab.require_entity(source)?;
    let target = vocab.require_entity(target)?;
    let steps = parse_relation_path(vocab, relation_path)?;
    Ok(infer_steps(graph, source, target, &steps, budget))
}

pub(crate) fn parse_relation_path(vocab: &Vocabulary, relation_path: &str) -> Result<Vec<Step>> {
    let relation_path = relation_path.trim();
    if relation_path.is_empty() {
        return Err(RelpathError::Schema("relation path is empty".to_string()));
    }
    relation_path
        .split(EDGE_SEPARATOR)
        .map(|token| vocab.parse_step(token))
        .collect()
}

struct Partial {
    nodes: Vec<NodeId>,
}

/// Breadth-first search over `(node, entities so far, position)`.
pub fn infer_steps(
    graph: &AdjacencyGraph,
    source: NodeId,
    target: NodeId,
    steps: &[Step],
    budget: SearchBudget,
) -> InferenceOutcome {
    let mut outcome = InferenceOutcome::default();
    let mut queue = VecDeque::new();
    queue.push_back(Partial { nodes: vec![source] });
    let mut expansions = 0usize;

    while let Some(partial) = queue.pop_front() {
        let position = partial.nodes.len() - 1;
        let current = partial.nodes[position];

        if position == steps.len() {
            if current == target {
                if outcome.paths.len() >= budget.max_results {
                    outcome.truncated = true;
                    break;
                }
                outcome.paths.push(EntityPath {
                    nodes: partial.nodes,
                    steps: steps.to_vec(),
                });
            }
            continue;
        }

        if expansions >= budget.max_expansions {
            outcome.truncated = true;
            break;
        }
        expansions += 1;

        let step = steps[position];
        for adj in graph.neighbors(current, step.direction) {
            if adj.relations.binary_search(&step.relation).is_err() {
                continue;
            }
            if partial.nodes.contains(&adj.node) {
                continue;
            }
            let mut nodes = partial.nodes.clone();
            nodes.push(adj.node);
            queue.push_back(Partial { nodes });
        }
    }

    if outcome.truncated {
        log::warn!(
            "Entity inference stopped early after {} expansions and {} results",
            expansions,
            outcome.paths.len()
        );
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use crate::ingest::NamedTriple;

    fn canonical(outcome: &InferenceOutcome, vocab: &Vocabulary) -> Vec<String> {
        outcome
            .forms(vocab)
            .unwrap()
            .iter()
            .map(PathForm::canonical)
            .collect()
    }

    fn chain() -> (Vocabulary, AdjacencyGraph) {
        build_graph(&[NamedTriple::new("a", "r1", "b"), NamedTriple::new("b", "r2", "c")]).unwrap()
    }

    #[test]
    fn test_chain_recovers_interior_entity() {
        let (vocab, graph) = chain();
        let outcome = infer_entities(&graph, &vocab, "a", "c", "r1-r2", SearchBudget::default()).unwrap();
        assert_eq!(canonical(&outcome, &vocab), vec!["a-r1-b-r2-c"]);
        assert!(!outcome.truncated);
    }

    #[test]
    fn test_inverse_steps_follow_parents() {
        let (vocab, graph) = chain();
        let outcome = infer_entities(&graph, &vocab, "c", "a", "_r2-_r1", SearchBudget::default()).unwrap();
        assert_eq!(canonical(&outcome, &vocab), vec!["c-_r2-b-_r1-a"]);
    }

    #[test]
    fn test_wrong_direction_finds_nothing() {
        let (vocab, graph) = chain();
        let outcome = infer_entities(&graph, &vocab, "a", "c", "_r1-r2", SearchBudget::default()).unwrap();
        assert!(outcome.paths.is_empty());
    }

    #[test]
    fn test_all_interior_choices_are_returned() {
        let (vocab, graph) = build_graph(&[
            NamedTriple::new("a", "r1", "b1"),
            NamedTriple::new("a", "r1", "b2"),
            NamedTriple::new("b1", "r2", "c"),
            NamedTriple::new("b2", "r2", "c"),
            NamedTriple::new("a", "r1", "b3"),
        ])
        .unwrap();
        let outcome = infer_entities(&graph, &vocab, "a", "c", "r1-r2", SearchBudget::default()).unwrap();
        assert_eq!(canonical(&outcome, &vocab), vec!["a-r1-b1-r2-c", "a-r1-b2-r2-c"]);
    }

    #[test]
    fn test_revisiting_an_entity_is_pruned() {
        // a -r1-> b -_r1-> a would reuse a
        let (vocab, graph) = build_graph(&[
            NamedTriple::new("a", "r1", "b"),
            NamedTriple::new("c", "r1", "b"),
        ])
        .unwrap();
        let outcome = infer_entities(&graph, &vocab, "a", "c", "r1-_r1", SearchBudget::default()).unwrap();
        assert_eq!(canonical(&outcome, &vocab), vec!["a-r1-b-_r1-c"]);
    }

    #[test]
    fn test_result_budget_truncates() {
        let (vocab, graph) = build_graph(&[
            NamedTriple::new("a", "r1", "b1"),
            NamedTriple::new("a", "r1", "b2"),
            NamedTriple::new("b1", "r2", "c"),
            NamedTriple::new("b2", "r2", "c"),
        ])
        .unwrap();
        let budget = SearchBudget {
            max_results: 1,
            max_expansions: 100,
        };
        let outcome = infer_entities(&graph, &vocab, "a", "c", "r1-r2", budget).unwrap();
        assert_eq!(outcome.paths.len(), 1);
        assert!(outcome.truncated);
    }

    #[test]
    fn test_unknown_names_are_errors() {
        let (vocab, graph) = chain();
        let budget = SearchBudget::default();
        assert!(matches!(
            infer_entities(&graph, &vocab, "a", "zzz", "r1", budget),
            Err(RelpathError::UnknownEntity(_))
        ));
        assert!(matches!(
            infer_entities(&graph, &vocab, "a", "c", "r1-r9", budget),
            Err(RelpathError::UnknownRelation(_))
        ));
        assert!(matches!(
            infer_entities(&graph, &vocab, "a", "c", "", budget),
            Err(RelpathError::Schema(_))
        ));
    }
}
