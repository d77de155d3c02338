use std::fmt;
use std::io::Write;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::accession::AccessionRecord;
use crate::error::TaxError;
use crate::propagate::PropagatedLineages;
use crate::sanitize::NameSanitizer;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SpeciesLabel {
    /// `accession \t lineage`
    #[default]
    Omit,
    /// `accession \t lineage \t s__species`
    Column,
    /// `accession \t lineage; s__species`
    Rank,
}

impl fmt::Display for SpeciesLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeciesLabel::Omit => write!(f, "omit"),
            SpeciesLabel::Column => write!(f, "column"),
            SpeciesLabel::Rank => write!(f, "rank"),
        }
    }
}

pub struct LineageWriter<'a> {
    lineages: &'a PropagatedLineages,
    sanitizer: &'a NameSanitizer,
    species: SpeciesLabel,
}

impl<'a> LineageWriter<'a> {
    pub fn new(
        lineages: &'a PropagatedLineages,
        sanitizer: &'a NameSanitizer,
        species: SpeciesLabel,
    ) -> Self {
        Self {
            lineages,
            sanitizer,
            species,
        }
    }

    pub fn row(&self, record: &AccessionRecord) -> Result<String, TaxError> {
        let lineage = self
            .lineages
            .get(record.taxon_id.as_str())
            .ok_or_else(|| TaxError::MissingLineage {
                accession: record.full_accession.clone(),
                taxon_id: record.taxon_id.to_string(),
            })?;
        let mut row = format!("{}\t{}", record.full_accession, lineage);
        match self.species {
            SpeciesLabel::Omit => {}
            SpeciesLabel::Column => {
                row.push_str("\ts__");
                row.push_str(&self.sanitizer.sanitize(&record.species_name));
            }
            SpeciesLabel::Rank => {
                row.push_str("; s__");
                row.push_str(&self.sanitizer.sanitize(&record.species_name));
            }
        }
        row.push('\n');
        Ok(row)
    }

    pub fn write_all<W: Write + ?Sized>(
        &self,
        records: &[AccessionRecord],
        out: &mut W,
    ) -> Result<usize, TaxError> {
        for record in records {
            let row = self.row(record)?;
            out.write_all(row.as_bytes())
                .map_err(|err| TaxError::Filesystem(err.to_string()))?;
        }
        out.flush()
            .map_err(|err| TaxError::Filesystem(err.to_string()))?;
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::domain::{DEFAULT_FALLBACK_NAME, RankScheme, TaxonId};
    use crate::lineage::{LineageMap, Lineages};
    use crate::propagate::{CarryOver, PropagationStrategy};

    fn fixture() -> PropagatedLineages {
        let mut lineages = Lineages::new();
        lineages.insert(
            TaxonId::new("5"),
            LineageMap::from([(crate::domain::Rank::Domain, "Archaea")]),
        );
        CarryOver.propagate(&lineages, &RankScheme::default(), DEFAULT_FALLBACK_NAME)
    }

    fn record(taxon_id: &str) -> AccessionRecord {
        AccessionRecord {
            full_accession: "AB001.1.1400".to_string(),
            species_name: "uncultured archaeon".to_string(),
            taxon_id: TaxonId::new(taxon_id),
        }
    }

    #[test]
    fn species_modes() {
        let lineages = fixture();
        let sanitizer = NameSanitizer::new();
        let lineage = "d__Archaea; p__Archaea; c__Archaea; o__Archaea; f__Archaea; g__Archaea";

        let omit = LineageWriter::new(&lineages, &sanitizer, SpeciesLabel::Omit);
        assert_eq!(omit.row(&record("5")).unwrap(), format!("AB001.1.1400\t{lineage}\n"));

        let column = LineageWriter::new(&lineages, &sanitizer, SpeciesLabel::Column);
        assert_eq!(
            column.row(&record("5")).unwrap(),
            format!("AB001.1.1400\t{lineage}\ts__uncultured_archaeon\n")
        );

        let rank = LineageWriter::new(&lineages, &sanitizer, SpeciesLabel::Rank);
        assert_eq!(
            rank.row(&record("5")).unwrap(),
            format!("AB001.1.1400\t{lineage}; s__uncultured_archaeon\n")
        );
    }

    #[test]
    fn missing_lineage_stops_the_pass() {
        let lineages = fixture();
        let sanitizer = NameSanitizer::new();
        let writer = LineageWriter::new(&lineages, &sanitizer, SpeciesLabel::Omit);
        let mut out = Vec::new();

        let err = writer
            .write_all(&[record("5"), record("99"), record("5")], &mut out)
            .unwrap_err();
        assert_matches!(err, TaxError::MissingLineage { ref taxon_id, .. } if taxon_id == "99");
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }
}
