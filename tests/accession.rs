use std::fs;
use std::io::Cursor;

use assert_matches::assert_matches;

use silva_tax::accession::{DEFAULT_HEADER_TOKEN, parse_accession_map};
use silva_tax::error::TaxError;
use silva_tax::taxa::{TaxonRecordStore, node_name};

#[test]
fn parse_fixture_taxmap() {
    let content = fs::read_to_string("tests/fixtures/taxmap_slv_ssu_ref.txt").unwrap();
    let records = parse_accession_map(Cursor::new(content), DEFAULT_HEADER_TOKEN).unwrap();

    let accessions: Vec<&str> = records
        .iter()
        .map(|record| record.full_accession.as_str())
        .collect();
    assert_eq!(accessions, vec!["A16379.1.1485", "AB000001.1.1400", "AF000002.10.1500"]);
    assert_eq!(records[0].species_name, "[Haemophilus] ducreyi");
    assert_eq!(records[2].taxon_id.as_str(), "45");
}

#[test]
fn duplicate_accession_keeps_first_position_and_last_values() {
    let input = "A\t1\t2\tp\tfirst\t10\nB\t1\t2\tp\tother\t11\nA\t1\t2\tp\tsecond\t12\n";
    let records = parse_accession_map(Cursor::new(input), DEFAULT_HEADER_TOKEN).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].full_accession, "A.1.2");
    assert_eq!(records[0].species_name, "second");
    assert_eq!(records[0].taxon_id.as_str(), "12");
}

#[test]
fn custom_header_token() {
    let input = "#acc\tstart\tstop\tpath\tspecies\ttaxid\nA\t1\t2\tp\ts\t10\n";
    let records = parse_accession_map(Cursor::new(input), "#acc").unwrap();
    assert_eq!(records.len(), 1);

    assert_eq!(records[0].taxon_id.as_str(), "10");

    let records = parse_accession_map(Cursor::new(input), DEFAULT_HEADER_TOKEN).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].full_accession, "#acc.start.stop");
}

#[test]
fn rank_table_name_and_errors() {
    assert_eq!(node_name("Bacteria;Proteobacteria;"), Some("Proteobacteria"));

    let store = TaxonRecordStore::parse(Cursor::new(
        fs::read_to_string("tests/fixtures/tax_slv_ssu.txt").unwrap(),
    ))
    .unwrap();
    assert_eq!(store.len(), 11);
    assert_eq!(store.get("45").unwrap().raw_name, "Candidatus 'Gloeomargarita'");

    let err = TaxonRecordStore::parse(Cursor::new("Bacteria\t3\tdomain\n")).unwrap_err();
    assert_matches!(err, TaxError::MalformedLineagePath { line: 1, .. });
}
