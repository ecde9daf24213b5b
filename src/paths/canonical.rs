//! Normalization of raw path strings into [`PathForm`]s.
//!
//! Two inputs are accepted. Strings produced by an external random-walk extractor are
//! bracketed, `-r1-r2-`, and may carry a trailing `,<weight>`; the first and last `-`-separated
//! tokens are artifacts and are dropped. Strings produced by this crate carry no brackets.
//! A leading `-` tells the two apart.

use super::{PathForm, PathKind, PathSet, EDGE_SEPARATOR, PATHS_SEPARATOR};
use crate::error::{RelpathError, Result};

/// Canonicalizes raw path strings of one path directory.
#[derive(Debug, Clone, Copy)]
pub struct PathCanonicalizer {
    kind: PathKind,
}

impl PathCanonicalizer {
    /// `kind` applies to unbracketed strings; bracketed strings are always relation-only.
    pub fn new(kind: PathKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> PathKind {
        self.kind
    }

    pub fn canonicalize(&self, raw: &str) -> Result<PathForm> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(RelpathError::Schema("empty path string".to_string()));
        }

        if raw.starts_with(EDGE_SEPARATOR) {
            // weights may be written in exponent form, `9.765625E-4`
            let body = raw.rsplit_once(',').map_or(raw, |(body, _)| body);
            let parts: Vec<&str> = body.split(EDGE_SEPARATOR).collect();
            if parts.len() < 3 {
                return Err(RelpathError::Schema(format!("bracketed path has no relations: {:?}", raw)));
            }
            let tokens = owned_tokens(&parts[1..parts.len() - 1], raw)?;
            return Ok(PathForm::RelationOnly(tokens));
        }

        let parts: Vec<&str> = raw.split(EDGE_SEPARATOR).collect();
        let tokens = owned_tokens(&parts, raw)?;
        match self.kind {
            PathKind::RelationOnly => Ok(PathForm::RelationOnly(tokens)),
            PathKind::EntityBearing => {
                if tokens.len() < 3 || tokens.len() % 2 == 0 {
                    return Err(RelpathError::Schema(format!(
                        "entity-bearing path needs an odd number (>= 3) of tokens: {:?}",
                        raw
                    )));
                }
                Ok(PathForm::EntityBearing(tokens))
            }
        }
    }

    /// Canonicalize the `-#-`-separated path field of one instance line, collapsing duplicates.
    pub fn canonicalize_field(&self, field: &str) -> Result<PathSet> {
        field
            .split(PATHS_SEPARATOR)
            .map(|raw| self.canonicalize(raw))
            .collect()
    }
}

fn owned_tokens(parts: &[&str], raw: &str) -> Result<Vec<String>> {
    if parts.iter().any(|p| p.is_empty()) {
        return Err(RelpathError::Schema(format!("path has an empty token: {:?}", raw)));
    }
    Ok(parts.iter().map(|p| p.to_string()).collect())
}

/// Canonical string of one raw path.
pub fn canonical_string(raw: &str, kind: PathKind) -> Result<String> {
    PathCanonicalizer::new(kind).canonicalize(raw).map(|p| p.canonical())
}
