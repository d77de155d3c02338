use std::io::BufRead;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::domain::TaxonId;
use crate::error::TaxError;

pub const DEFAULT_HEADER_TOKEN: &str = "primaryAccession";

const TABLE: &str = "accession map";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessionRecord {
    // accession.start.stop
    pub full_accession: String,
    pub species_name: String,
    pub taxon_id: TaxonId,
}

pub fn parse_accession_map<R: BufRead>(
    reader: R,
    header_token: &str,
) -> Result<Vec<AccessionRecord>, TaxError> {
    let mut records: IndexMap<String, AccessionRecord> = IndexMap::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|err| TaxError::Filesystem(err.to_string()))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(header_token) {
            continue;
        }

        let fields: Vec<&str> = trimmed.split('\t').collect();
        if fields.len() < 6 {
            return Err(TaxError::MalformedRow {
                table: TABLE,
                line: idx + 1,
                expected: 6,
                found: fields.len(),
            });
        }

        let record = AccessionRecord {
            full_accession: fields[..3].join("."),
            species_name: fields[4].trim().to_string(),
            taxon_id: TaxonId::new(fields[5]),
        };
        if let Some(previous) = records.insert(record.full_accession.clone(), record) {
            warn!(accession = %previous.full_accession, "duplicate accession, keeping last row");
        }
    }
    debug!(accessions = records.len(), "parsed accession map");
    Ok(records.into_values().collect())
}
