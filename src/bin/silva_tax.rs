use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use silva_tax::app::{App, CurationInputs, TracingSink};
use silva_tax::config::ConfigLoader;
use silva_tax::error::TaxError;
use silva_tax::output::{JsonOutput, OutputMode, print_text_summary};
use silva_tax::propagate::PropagationKind;

#[derive(Parser)]
#[command(name = "silva-tax")]
#[command(about = "Creates a Greengenes-like fixed-rank taxonomy for SILVA")]
#[command(version, author)]
struct Cli {
    #[arg(short = 't', long = "taxonomy", help = "SILVA rank table (taxonomy path, taxon id, rank)")]
    taxonomy: Utf8PathBuf,

    #[arg(short = 'p', long = "taxonomy-tree", help = "SILVA taxonomic hierarchy in Newick format")]
    taxonomy_tree: Utf8PathBuf,

    #[arg(short = 'm', long = "taxonomy-map", help = "SILVA accession taxonomy map")]
    taxonomy_map: Utf8PathBuf,

    #[arg(short = 'o', long = "output-taxonomy", help = "Newly formatted taxonomy")]
    output_taxonomy: Utf8PathBuf,

    #[arg(
        short = 's',
        long = "include-species",
        help = "Append species labels as a third column. Species labels may not be accurate!"
    )]
    include_species: bool,

    #[arg(long, help = "JSON configuration file")]
    config: Option<String>,

    #[arg(long, value_enum, help = "How ranks missing from a lineage are filled")]
    propagation: Option<PropagationKind>,

    #[arg(long, help = "Print the run summary as JSON")]
    json: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<TaxError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &TaxError) -> u8 {
    match error {
        TaxError::MalformedRow { .. }
        | TaxError::MalformedLineagePath { .. }
        | TaxError::TreeParse { .. }
        | TaxError::UnlabeledNode(_)
        | TaxError::UnknownTaxon(_)
        | TaxError::MissingLineage { .. } => 2,
        TaxError::InvalidRank(_)
        | TaxError::InvalidConfig(_)
        | TaxError::ConfigRead(_)
        | TaxError::ConfigParse(_) => 3,
        TaxError::Filesystem(_) => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    let settings = ConfigLoader::resolve(cli.config.as_deref())?
        .with_overrides(cli.include_species, cli.propagation);

    let inputs = CurationInputs {
        rank_table: cli.taxonomy,
        tree: cli.taxonomy_tree,
        accession_map: cli.taxonomy_map,
        output: cli.output_taxonomy,
    };

    let app = App::new(settings);
    match output_mode {
        OutputMode::Json => {
            let summary = app.curate(&inputs, &JsonOutput)?;
            JsonOutput::print_summary(&summary).into_diagnostic()?;
        }
        OutputMode::Text => {
            let summary = app.curate(&inputs, &TracingSink)?;
            print_text_summary(&summary);
        }
    }
    Ok(())
}
