//! Entity and relation vocabularies.
//!
//! Names are interned to dense `u32` indices on first sight. Inverse relations are not separate
//! vocabulary entries: `_hypernym` parses to the `hypernym` index with [`Direction::Inverse`].

use std::collections::HashMap;

use crate::error::{RelpathError, Result};

/// Prefix marking the inverse traversal of a relation in path strings.
pub const INVERSE_PREFIX: char = '_';

/// Dense entity index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Dense relation index (forward form only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelationId(pub u32);

impl RelationId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Traversal direction of a relation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Forward,
    Inverse,
}

/// One relation step of a path: which relation, and which way it is walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Step {
    pub relation: RelationId,
    pub direction: Direction,
}

impl Step {
    pub fn forward(relation: RelationId) -> Self {
        Self { relation, direction: Direction::Forward }
    }

    pub fn inverse(relation: RelationId) -> Self {
        Self { relation, direction: Direction::Inverse }
    }
}

#[derive(Debug, Clone, Default)]
struct Interner {
    names: Vec<String>,
    index: HashMap<String, u32>,
}

impl Interner {
    fn intern(&mut self, name: &str) -> (u32, bool) {
        if let Some(&idx) = self.index.get(name) {
            return (idx, false);
        }
        let idx = self.names.len() as u32;
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), idx);
        (idx, true)
    }

    fn get(&self, name: &str) -> Option<u32> {
        self.index.get(name).copied()
    }

    fn name(&self, idx: u32) -> Option<&str> {
        self.names.get(idx as usize).map(String::as_str)
    }
}

/// Bidirectional entity/relation name maps.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    entities: Interner,
    relations: Interner,
    /// Untyped surface name (`bowl`) → typed entries (`object:bowl`, `location:bowl`).
    untyped: HashMap<String, Vec<NodeId>>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern an entity name. Commas and tabs are reserved by the path file format.
    pub fn intern_entity(&mut self, name: &str) -> Result<NodeId> {
        if name.is_empty() || name.contains(',') || name.contains('\t') {
            return Err(RelpathError::Schema(format!("invalid entity name: {:?}", name)));
        }
        let (idx, fresh) = self.entities.intern(name);
        let id = NodeId(idx);
        if fresh {
            if let Some(untyped) = untyped_name(name) {
                self.untyped.entry(untyped.to_string()).or_default().push(id);
            }
        }
        Ok(id)
    }

    /// Intern a forward relation name. `-` and a leading `_` are reserved by path strings.
    pub fn intern_relation(&mut self, name: &str) -> Result<RelationId> {
        if name.is_empty() || name.starts_with(INVERSE_PREFIX) || name.contains('-') || name.contains('\t') {
            return Err(RelpathError::Schema(format!("invalid relation name: {:?}", name)));
        }
        Ok(RelationId(self.relations.intern(name).0))
    }

    pub fn entity(&self, name: &str) -> Option<NodeId> {
        self.entities.get(name).map(NodeId)
    }

    pub fn relation(&self, name: &str) -> Option<RelationId> {
        self.relations.get(name).map(RelationId)
    }

    pub fn entity_name(&self, id: NodeId) -> Option<&str> {
        self.entities.name(id.0)
    }

    pub fn relation_name(&self, id: RelationId) -> Option<&str> {
        self.relations.name(id.0)
    }

    /// Look up an entity, failing with [`RelpathError::UnknownEntity`].
    pub fn require_entity(&self, name: &str) -> Result<NodeId> {
        self.entity(name)
            .ok_or_else(|| RelpathError::UnknownEntity(name.to_string()))
    }

    /// Parse a path token (`hypernym` or `_hypernym`) into a step.
    pub fn parse_step(&self, token: &str) -> Result<Step> {
        let (name, direction) = match token.strip_prefix(INVERSE_PREFIX) {
            Some(rest) => (rest, Direction::Inverse),
            None => (token, Direction::Forward),
        };
        let relation = self
            .relation(name)
            .ok_or_else(|| RelpathError::UnknownRelation(token.to_string()))?;
        Ok(Step { relation, direction })
    }

    /// Render a step back to its path token.
    pub fn step_token(&self, step: Step) -> Result<String> {
        let name = self
            .relation_name(step.relation)
            .ok_or_else(|| RelpathError::UnknownRelation(format!("#{}", step.relation.0)))?;
        Ok(match step.direction {
            Direction::Forward => name.to_string(),
            Direction::Inverse => format!("{}{}", INVERSE_PREFIX, name),
        })
    }

    pub fn entity_token(&self, id: NodeId) -> Result<&str> {
        self.entity_name(id)
            .ok_or_else(|| RelpathError::UnknownEntity(format!("#{}", id.0)))
    }

    /// Typed vocabulary entries whose untyped name is `name`.
    pub fn entities_with_untyped_name(&self, name: &str) -> &[NodeId] {
        self.untyped.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn entity_count(&self) -> usize {
        self.entities.names.len()
    }

    pub fn relation_count(&self) -> usize {
        self.relations.names.len()
    }

    /// Entity names in index order.
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.names.iter().map(String::as_str)
    }

    /// Relation names in index order.
    pub fn relation_names(&self) -> impl Iterator<Item = &str> {
        self.relations.names.iter().map(String::as_str)
    }
}

/// Everything after the first `:` of a typed entity name.
pub fn untyped_name(name: &str) -> Option<&str> {
    name.split_once(':').map(|(_, rest)| rest)
}
