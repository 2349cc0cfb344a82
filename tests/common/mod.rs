#![allow(dead_code)]

use std::path::PathBuf;

use insectui::dataset::{CROP, FORMULATION, INSECTICIDE, PEST};
use insectui::schema::validate;
use insectui::Dataset;
use polars::prelude::*;
use tempfile::TempDir;

/// A small usage table with a mix of pests, crops and repeated insecticides.
pub const USAGE_CSV: &str = "\
PEST,INSECTICIDE,Formulation,CROP
Green Aphid,Imidacloprid,SC,Cotton
Black Aphid,Malathion,EC,Rice
Green Aphid,Imidacloprid,WG,Rice
Spider Mite,Abamectin,EC,Cotton
Whitefly,Imidacloprid,SC,Tomato
Thrips,Spinosad,SC,Cotton
";

/// Write `content` to `name` inside a fresh temp dir. Keep the dir alive while using the path.
pub fn write_file(name: &str, content: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    (dir, path)
}

pub fn usage_dataset() -> Dataset {
    let df = df!(
        PEST => ["Green Aphid", "Black Aphid", "Green Aphid", "Spider Mite", "Whitefly", "Thrips"],
        INSECTICIDE => ["Imidacloprid", "Malathion", "Imidacloprid", "Abamectin", "Imidacloprid", "Spinosad"],
        FORMULATION => ["SC", "EC", "WG", "EC", "SC", "SC"],
        CROP => ["Cotton", "Rice", "Rice", "Cotton", "Tomato", "Cotton"]
    )
    .unwrap();
    validate(df).unwrap()
}

/// Rows with missing insecticide and formulation values.
pub fn sparse_dataset() -> Dataset {
    let df = df!(
        PEST => ["Green Aphid", "Black Aphid", "Spider Mite"],
        INSECTICIDE => [Some("Imidacloprid"), None, None],
        FORMULATION => [None::<&str>, None, None],
        CROP => ["Cotton", "Rice", "Cotton"]
    )
    .unwrap();
    validate(df).unwrap()
}
