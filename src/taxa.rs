use std::io::BufRead;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::domain::{Rank, TaxonId};
use crate::error::TaxError;

const TABLE: &str = "rank table";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonRecord {
    pub rank: Option<Rank>,
    pub rank_label: String,
    pub raw_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct TaxonRecordStore {
    records: IndexMap<TaxonId, TaxonRecord>,
}

impl TaxonRecordStore {
    pub fn parse<R: BufRead>(reader: R) -> Result<Self, TaxError> {
        let mut records = IndexMap::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|err| TaxError::Filesystem(err.to_string()))?;
            let line_no = idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let fields: Vec<&str> = trimmed.split('\t').collect();
            if fields.len() < 3 {
                return Err(TaxError::MalformedRow {
                    table: TABLE,
                    line: line_no,
                    expected: 3,
                    found: fields.len(),
                });
            }

            let raw_name = node_name(fields[0]).ok_or_else(|| TaxError::MalformedLineagePath {
                line: line_no,
                path: fields[0].to_string(),
            })?;
            let taxon_id = TaxonId::new(fields[1]);
            let rank_label = fields[2].trim().to_string();
            let record = TaxonRecord {
                rank: rank_label.parse().ok(),
                rank_label,
                raw_name: raw_name.to_string(),
            };

            if let Some(previous) = records.insert(taxon_id.clone(), record) {
                warn!(taxon_id = %taxon_id, previous = %previous.raw_name, "duplicate taxon id, keeping last row");
            }
        }
        debug!(records = records.len(), "parsed rank table");
        Ok(Self { records })
    }

    pub fn get(&self, taxon_id: &str) -> Option<&TaxonRecord> {
        self.records.get(taxon_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// Second-to-last segment of `A;B;C;`.
pub fn node_name(lineage_path: &str) -> Option<&str> {
    let segments: Vec<&str> = lineage_path.trim().split(';').collect();
    if segments.len() < 2 {
        return None;
    }
    Some(segments[segments.len() - 2].trim())
}
