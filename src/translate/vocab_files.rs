//! Vocabulary files of a translated dataset.

use std::fs;
use std::path::Path;

use serde_json::{json, Map, Value};

use crate::error::Result;
use crate::ingest::EntityTypes;
use crate::vocab::{Vocabulary, INVERSE_PREFIX};

pub const DOMAIN_LABEL_FILE: &str = "domain-label";
pub const RELATION_VOCAB_FILE: &str = "relation_vocab.txt";
pub const ENTITY_VOCAB_FILE: &str = "entity_vocab.txt";
pub const ENTITY_TYPE_VOCAB_FILE: &str = "entity_type_vocab.txt";
pub const ENTITY_TO_TYPES_FILE: &str = "entity_to_list_type.json";

pub const PAD_TOKEN: &str = "#PAD_TOKEN";
pub const END_RELATION: &str = "#END_RELATION";

fn write_json(path: &Path, value: &Value) -> Result<()> {
    fs::write(path, serde_json::to_string(value)?)?;
    Ok(())
}

fn index_map(names: impl IntoIterator<Item = String>, reserved: &[&str]) -> Map<String, Value> {
    let mut map = Map::new();
    for name in names {
        let idx = map.len();
        map.entry(name).or_insert(json!(idx));
    }
    for token in reserved {
        let idx = map.len();
        map.insert(token.to_string(), json!(idx));
    }
    map
}

/// Labels as the downstream model sees them: `1` is 1, `-1` is 0.
pub fn write_domain_label(dir: &Path) -> Result<()> {
    write_json(
        &dir.join(DOMAIN_LABEL_FILE),
        &json!({"domain": {"1": 1, "-1": 0}, "name": "label"}),
    )
}

/// Relation vocabulary: forward relations in index order, then their inverses, then the
/// reserved tokens.
pub fn relation_vocab(vocab: &Vocabulary) -> Map<String, Value> {
    let forward = vocab.relation_names().map(str::to_string);
    let inverse = vocab
        .relation_names()
        .map(|name| format!("{}{}", INVERSE_PREFIX, name));
    index_map(forward.chain(inverse), &[PAD_TOKEN, END_RELATION])
}

pub fn write_relation_vocab(dir: &Path, vocab: &Vocabulary) -> Result<()> {
    write_json(&dir.join(RELATION_VOCAB_FILE), &Value::Object(relation_vocab(vocab)))
}

pub fn write_entity_vocab(dir: &Path, vocab: &Vocabulary) -> Result<()> {
    let map = index_map(vocab.entity_names().map(str::to_string), &[PAD_TOKEN]);
    write_json(&dir.join(ENTITY_VOCAB_FILE), &Value::Object(map))
}

/// Type vocabulary in first-appearance order, and the type list of every typed entity.
///
/// The table is keyed by untyped names; each list is attached to every vocabulary entry with
/// that untyped name (`bowl` covers `object:bowl` and `location:bowl`). Returns the number of
/// typed entities covered.
pub fn write_entity_types(dir: &Path, vocab: &Vocabulary, types: &EntityTypes) -> Result<usize> {
    let mut type_names = Vec::new();
    let mut entity_to_types = Map::new();

    for (entity, labels) in types.iter() {
        type_names.extend(labels.iter().cloned());
        for &node in vocab.entities_with_untyped_name(entity) {
            let name = vocab.entity_token(node)?;
            entity_to_types.insert(name.to_string(), json!(labels));
        }
    }

    let type_vocab = index_map(type_names, &[PAD_TOKEN]);
    write_json(&dir.join(ENTITY_TYPE_VOCAB_FILE), &Value::Object(type_vocab))?;

    let covered = entity_to_types.len();
    write_json(&dir.join(ENTITY_TO_TYPES_FILE), &Value::Object(entity_to_types))?;
    if covered == 0 && !types.is_empty() {
        log::warn!("No vocabulary entity matched the entity types table");
    }
    Ok(covered)
}
