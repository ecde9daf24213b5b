//! Edge list reader: one `subject<TAB>relation<TAB>object` triple per line.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{RelpathError, Result};

/// A triple of names as it appears in the edge list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedTriple {
    pub subject: String,
    pub relation: String,
    pub object: String,
}

impl NamedTriple {
    pub fn new(subject: impl Into<String>, relation: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            relation: relation.into(),
            object: object.into(),
        }
    }
}

/// Read all triples. Blank lines and `#` comments are skipped; anything else that is not
/// exactly three tab-separated fields is a schema violation.
pub fn read_edges(path: &Path) -> Result<Vec<NamedTriple>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut triples = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 3 {
            return Err(RelpathError::Schema(format!(
                "{}:{}: expected 3 tab-separated fields, found {}",
                path.display(),
                line_no + 1,
                fields.len()
            )));
        }
        triples.push(NamedTriple::new(fields[0].trim(), fields[1].trim(), fields[2].trim()));
    }

    log::info!("Read {} edges from {}", triples.len(), path.display());
    Ok(triples)
}
