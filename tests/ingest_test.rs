use std::io::Write;

use insectui::dataset::PEST;
use insectui::ingest::load_table;
use insectui::{load_dataset, FileFormat, IngestError, LoadError, OpenOptions, SchemaError};
use polars::prelude::*;

mod common;

#[test]
fn test_load_csv() {
    let (_dir, path) = common::write_file("usage.csv", common::USAGE_CSV);
    let dataset = load_dataset(&path, &OpenOptions::new()).unwrap();
    assert_eq!(dataset.height(), 6);
    let records = dataset.records().unwrap();
    assert_eq!(records[0].pest.as_deref(), Some("Green Aphid"));
    assert_eq!(records[5].crop.as_deref(), Some("Cotton"));
}

#[test]
fn test_load_tsv_uses_tab_delimiter() {
    let tsv = common::USAGE_CSV.replace(',', "\t");
    let (_dir, path) = common::write_file("usage.tsv", &tsv);
    let dataset = load_dataset(&path, &OpenOptions::new()).unwrap();
    assert_eq!(dataset.height(), 6);
}

#[test]
fn test_delimiter_override() {
    let csv = common::USAGE_CSV.replace(',', ";");
    let (_dir, path) = common::write_file("usage.csv", &csv);
    let dataset = load_dataset(&path, &OpenOptions::new().with_delimiter(b';')).unwrap();
    assert_eq!(dataset.height(), 6);
}

#[test]
fn test_padded_headers_load() {
    let csv = " PEST ,INSECTICIDE, Formulation ,CROP\nAphid,Malathion,EC,Rice\n";
    let (_dir, path) = common::write_file("padded.csv", csv);
    let dataset = load_dataset(&path, &OpenOptions::new()).unwrap();
    assert!(dataset.column_names().iter().any(|c| c == PEST));
}

#[test]
fn test_missing_column_is_a_schema_error() {
    let csv = "PEST,INSECTICIDE,Formulation\nAphid,Malathion,EC\n";
    let (_dir, path) = common::write_file("nocrop.csv", csv);
    match load_dataset(&path, &OpenOptions::new()) {
        Err(LoadError::Schema(SchemaError::MissingColumns { missing })) => {
            assert_eq!(missing, vec!["CROP".to_string()]);
        }
        other => panic!("expected missing CROP, got {:?}", other.map(|d| d.height())),
    }
}

#[test]
fn test_unknown_extension_is_an_ingest_error() {
    let (_dir, path) = common::write_file("usage.dat", common::USAGE_CSV);
    assert!(matches!(
        load_table(&path, &OpenOptions::new()),
        Err(IngestError::UnknownFormat { .. })
    ));

    // forcing the format reads it anyway
    let opts = OpenOptions::new().with_format(FileFormat::Csv);
    assert_eq!(load_table(&path, &opts).unwrap().height(), 6);
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.csv");
    assert!(matches!(
        load_dataset(&path, &OpenOptions::new()),
        Err(LoadError::Ingest(IngestError::Io { .. }))
    ));
}

#[test]
fn test_bzip2_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("usage.csv.bz2");
    let file = std::fs::File::create(&path).unwrap();
    let mut encoder = bzip2::write::BzEncoder::new(file, bzip2::Compression::default());
    encoder.write_all(common::USAGE_CSV.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let dataset = load_dataset(&path, &OpenOptions::new()).unwrap();
    assert_eq!(dataset.height(), 6);
}

#[test]
fn test_xz_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("usage.csv.xz");
    let file = std::fs::File::create(&path).unwrap();
    let mut encoder = xz2::write::XzEncoder::new(file, 6);
    encoder.write_all(common::USAGE_CSV.as_bytes()).unwrap();
    encoder.finish().unwrap();

    let dataset = load_dataset(&path, &OpenOptions::new()).unwrap();
    assert_eq!(dataset.height(), 6);
}

#[test]
fn test_parquet() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("usage.parquet");
    let mut df = common::usage_dataset().frame().clone();
    let file = std::fs::File::create(&path).unwrap();
    ParquetWriter::new(file).finish(&mut df).unwrap();

    let dataset = load_dataset(&path, &OpenOptions::new()).unwrap();
    assert_eq!(dataset.height(), 6);
}
