use std::time::{Duration, Instant};

use camino::Utf8PathBuf;
use serde::Serialize;
use tracing::info;

use crate::accession::parse_accession_map;
use crate::config::CurationSettings;
use crate::error::TaxError;
use crate::fs_util;
use crate::lineage::LineageBuilder;
use crate::taxa::TaxonRecordStore;
use crate::tree::TaxonTree;
use crate::writer::LineageWriter;

#[derive(Debug, Clone)]
pub struct CurationInputs {
    pub rank_table: Utf8PathBuf,
    pub tree: Utf8PathBuf,
    pub accession_map: Utf8PathBuf,
    pub output: Utf8PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurationSummary {
    pub taxon_records: usize,
    pub tree_nodes: usize,
    pub lineages: usize,
    pub accessions: usize,
    pub rows_written: usize,
    pub ranks: Vec<String>,
    pub propagation: String,
    pub species_label: String,
    pub output: String,
    pub finished_at: String,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn event(&self, event: ProgressEvent) {
        match event.elapsed {
            Some(elapsed) => info!(elapsed_ms = elapsed.as_millis() as u64, "{}", event.message),
            None => info!("{}", event.message),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct App {
    settings: CurationSettings,
}

impl App {
    pub fn new(settings: CurationSettings) -> Self {
        Self { settings }
    }

    pub fn curate(
        &self,
        inputs: &CurationInputs,
        sink: &dyn ProgressSink,
    ) -> Result<CurationSummary, TaxError> {
        let settings = &self.settings;

        let started = Instant::now();
        let records = TaxonRecordStore::parse(fs_util::open_input(&inputs.rank_table)?)?;
        sink.event(ProgressEvent {
            message: format!("phase=Records; {} taxonomy ids", records.len()),
            elapsed: Some(started.elapsed()),
        });

        let started = Instant::now();
        let tree = TaxonTree::parse_newick(&fs_util::read_to_string(&inputs.tree)?)?;
        sink.event(ProgressEvent {
            message: format!("phase=Tree; {} nodes", tree.len()),
            elapsed: Some(started.elapsed()),
        });

        let started = Instant::now();
        let lineages =
            LineageBuilder::new(&tree, &records, &settings.scheme, &settings.sanitizer).build()?;
        sink.event(ProgressEvent {
            message: format!("phase=Lineages; {} base lineages", lineages.len()),
            elapsed: Some(started.elapsed()),
        });

        let started = Instant::now();
        let propagated = settings.propagation.strategy().propagate(
            &lineages,
            &settings.scheme,
            &settings.fallback_name,
        );
        sink.event(ProgressEvent {
            message: format!(
                "phase=Propagate; {} lineages ({})",
                propagated.len(),
                settings.propagation
            ),
            elapsed: Some(started.elapsed()),
        });

        let started = Instant::now();
        let accessions = parse_accession_map(
            fs_util::open_input(&inputs.accession_map)?,
            &settings.accession_header,
        )?;
        sink.event(ProgressEvent {
            message: format!("phase=Accessions; {} accession records", accessions.len()),
            elapsed: Some(started.elapsed()),
        });

        let started = Instant::now();
        let writer = LineageWriter::new(&propagated, &settings.sanitizer, settings.species_label);
        let rows_written =
            fs_util::write_atomic(&inputs.output, |out| writer.write_all(&accessions, out))?;
        sink.event(ProgressEvent {
            message: format!("phase=Write; {rows_written} rows to {}", inputs.output),
            elapsed: Some(started.elapsed()),
        });

        Ok(CurationSummary {
            taxon_records: records.len(),
            tree_nodes: tree.len(),
            lineages: propagated.len(),
            accessions: accessions.len(),
            rows_written,
            ranks: settings
                .scheme
                .ranks()
                .iter()
                .map(|rank| rank.to_string())
                .collect(),
            propagation: settings.propagation.to_string(),
            species_label: settings.species_label.to_string(),
            output: inputs.output.to_string(),
            finished_at: chrono::Utc::now().to_rfc3339(),
        })
    }
}
