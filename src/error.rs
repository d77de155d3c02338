use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum TaxError {
    #[error("invalid rank: {0}")]
    InvalidRank(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("{table} line {line}: expected at least {expected} tab-separated fields, found {found}")]
    #[diagnostic(help("every row of this table is required; fix or remove the row"))]
    MalformedRow {
        table: &'static str,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("rank table line {line}: lineage path {path:?} has no taxon name segment")]
    MalformedLineagePath { line: usize, path: String },

    #[error("taxonomy tree is malformed at byte {offset}: {message}")]
    TreeParse { offset: usize, message: String },

    #[error("taxonomy tree has an unlabeled non-root node (index {0})")]
    UnlabeledNode(usize),

    #[error("taxon id {0} appears in the tree but not in the rank table")]
    UnknownTaxon(String),

    #[error("accession {accession} refers to taxon id {taxon_id} which has no lineage")]
    #[diagnostic(help("the accession map and the taxonomy tree come from different releases?"))]
    MissingLineage { accession: String, taxon_id: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
