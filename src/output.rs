use std::io::{self, Write};

use serde::Serialize;

use crate::app::CurationSummary;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Text,
    Json,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_summary(summary: &CurationSummary) -> io::Result<()> {
        Self::print_json(summary)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl crate::app::ProgressSink for JsonOutput {
    fn event(&self, _event: crate::app::ProgressEvent) {}
}

pub fn print_text_summary(summary: &CurationSummary) {
    println!("Number of taxonomy IDs: {}", summary.taxon_records);
    println!("Number of tree nodes: {}", summary.tree_nodes);
    println!(
        "Number of {{Full Accession: (species, TaxID)}} records in taxmap: {}",
        summary.accessions
    );
    println!(
        "Wrote {} fixed-rank lineages ({}; propagation {}, species {}) to {}",
        summary.rows_written,
        summary.ranks.join(", "),
        summary.propagation,
        summary.species_label,
        summary.output
    );
}
