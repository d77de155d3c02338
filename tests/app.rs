use std::fs;

use assert_matches::assert_matches;
use camino::{Utf8Path, Utf8PathBuf};

use silva_tax::app::{App, CurationInputs, ProgressEvent, ProgressSink};
use silva_tax::config::CurationSettings;
use silva_tax::error::TaxError;
use silva_tax::writer::SpeciesLabel;

struct NoopSink;

impl ProgressSink for NoopSink {
    fn event(&self, _event: ProgressEvent) {}
}

fn fixture(name: &str) -> Utf8PathBuf {
    Utf8PathBuf::from("tests/fixtures").join(name)
}

fn write(dir: &Utf8Path, name: &str, content: &str) -> Utf8PathBuf {
    let path = dir.join(name);
    fs::write(path.as_std_path(), content).unwrap();
    path
}

fn species_app() -> App {
    App::new(CurationSettings {
        species_label: SpeciesLabel::Column,
        ..CurationSettings::default()
    })
}

#[test]
fn curate_fixture_release() {
    let temp = tempfile::tempdir().unwrap();
    let output = Utf8PathBuf::from_path_buf(temp.path().join("silva_taxonomy.tsv")).unwrap();
    let inputs = CurationInputs {
        rank_table: fixture("tax_slv_ssu.txt"),
        tree: fixture("tax_slv_ssu.tre"),
        accession_map: fixture("taxmap_slv_ssu_ref.txt"),
        output: output.clone(),
    };

    let summary = species_app().curate(&inputs, &NoopSink).unwrap();
    assert_eq!(summary.taxon_records, 11);
    assert_eq!(summary.tree_nodes, 12);
    assert_eq!(summary.lineages, 11);
    assert_eq!(summary.accessions, 3);
    assert_eq!(summary.rows_written, 3);
    assert_eq!(summary.propagation, "carry-over");

    let content = fs::read_to_string(output.as_std_path()).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "A16379.1.1485\td__Bacteria; p__Proteobacteria; c__Gammaproteobacteria; o__Pasteurellales; f__Pasteurellaceae; g__Haemophilus\ts__[Haemophilus]_ducreyi",
            "AB000001.1.1400\td__Archaea; p__Archaea; c__Archaea; o__Archaea; f__Archaea; g__Nitrososphaera\ts__Nitrososphaera_viennensis",
            "AF000002.10.1500\td__Bacteria; p__Cyanobacteria; c__Cyanobacteria; o__Cyanobacteria; f__Cyanobacteria; g__Candidatus_Gloeomargarita\ts__uncultured_cyanobacterium",
        ]
    );
}

#[test]
fn curate_haemophilus_chain_with_species() {
    let temp = tempfile::tempdir().unwrap();
    let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    let inputs = CurationInputs {
        rank_table: write(
            &dir,
            "ranks.txt",
            "Bacteria;\t3\tdomain\nBacteria;Proteobacteria;\t2375\tphylum\nBacteria;Proteobacteria;Haemophilus;\t3698\tgenus\n",
        ),
        tree: write(&dir, "tree.tre", "(((3698)2375)3);"),
        accession_map: write(
            &dir,
            "taxmap.txt",
            "ACC\t1\t100\tBacteria;Proteobacteria;Haemophilus;\tHaemophilus ducreyi\t3698\n",
        ),
        output: dir.join("out.tsv"),
    };

    species_app().curate(&inputs, &NoopSink).unwrap();

    let content = fs::read_to_string(inputs.output.as_std_path()).unwrap();
    assert_eq!(
        content,
        "ACC.1.100\td__Bacteria; p__Proteobacteria; c__Proteobacteria; o__Proteobacteria; f__Proteobacteria; g__Haemophilus\ts__Haemophilus_ducreyi\n"
    );
}

#[test]
fn unknown_accession_taxon_leaves_no_output() {
    let temp = tempfile::tempdir().unwrap();
    let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    let inputs = CurationInputs {
        rank_table: fixture("tax_slv_ssu.txt"),
        tree: fixture("tax_slv_ssu.tre"),
        accession_map: write(
            &dir,
            "taxmap.txt",
            "A16379\t1\t1485\tpath\tHaemophilus ducreyi\t3698\nX1\t1\t900\tpath\tunknown\t999999\nAB000001\t1\t1400\tpath\tN. viennensis\t50\n",
        ),
        output: dir.join("out.tsv"),
    };

    let err = App::default().curate(&inputs, &NoopSink).unwrap_err();
    assert_matches!(err, TaxError::MissingLineage { ref accession, ref taxon_id }
        if accession == "X1.1.900" && taxon_id == "999999");
    assert!(!inputs.output.as_std_path().exists());
}

#[test]
fn failed_run_keeps_previous_output() {
    let temp = tempfile::tempdir().unwrap();
    let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    let output = write(&dir, "out.tsv", "previous release\n");
    let inputs = CurationInputs {
        rank_table: fixture("tax_slv_ssu.txt"),
        tree: fixture("tax_slv_ssu.tre"),
        accession_map: write(
            &dir,
            "taxmap.txt",
            "A16379\t1\t1485\tpath\tHaemophilus ducreyi\t3698\nX1\t1\t900\tpath\tunknown\t999999\n",
        ),
        output: output.clone(),
    };

    let err = App::default().curate(&inputs, &NoopSink).unwrap_err();
    assert_matches!(err, TaxError::MissingLineage { .. });
    assert_eq!(
        fs::read_to_string(output.as_std_path()).unwrap(),
        "previous release\n"
    );
}

#[test]
fn tree_label_missing_from_rank_table_is_fatal() {
    let temp = tempfile::tempdir().unwrap();
    let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    let inputs = CurationInputs {
        rank_table: fixture("tax_slv_ssu.txt"),
        tree: write(&dir, "tree.tre", "((3698,12345)3);"),
        accession_map: fixture("taxmap_slv_ssu_ref.txt"),
        output: dir.join("out.tsv"),
    };

    let err = App::default().curate(&inputs, &NoopSink).unwrap_err();
    assert_matches!(err, TaxError::UnknownTaxon(ref id) if id == "12345");
}
