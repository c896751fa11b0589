//! Loader Integration Tests
//!
//! Loads spreadsheet exports from disk and feeds them through the optimizer
//! the same way the CLI does: select a field, drop non-producing wells,
//! protect some wells, search.

use std::collections::BTreeSet;
use std::io::Write;

use well_closure::config::DataConfig;
use well_closure::loader::{ColumnAliases, LoadError, WellTable};
use well_closure::types::FieldFilter;
use well_closure::optimize;

fn write_csv(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const SHEET: &str = "\
POÇO,Campo,Vazão Água (m³/dia),Lucratividade (USD/d)
PLR-1,Pilar,50,100
PLR-2,Pilar,60,80
PLR-3,Pilar,20,10
PLR-4,Pilar,0,5
\"FUR-1, north\",Furado,35,5
";

#[test]
fn load_select_and_optimize_pilar() {
    let file = write_csv(SHEET);
    let table = WellTable::load(file.path()).unwrap();
    assert_eq!(table.len(), 5);

    let pilar = table
        .select(&FieldFilter::Only("Pilar".into()))
        .producing()
        .into_wells();
    assert_eq!(pilar.len(), 3);

    let plan = optimize(&pilar, 70.0, 2, 2, &BTreeSet::new())
        .unwrap()
        .expect("plan exists");
    assert_eq!(plan.wells, vec!["PLR-2", "PLR-3"]);
    assert_eq!(plan.profit_impact_usd, 180.0);
}

#[test]
fn quoted_names_survive_and_can_be_protected() {
    let file = write_csv(SHEET);
    let table = WellTable::load(file.path()).unwrap();
    let others = table
        .select(&FieldFilter::Except("Pilar".into()))
        .producing()
        .into_wells();
    assert_eq!(others[0].id, "FUR-1, north");

    let protected: BTreeSet<String> = ["FUR-1, north".to_string()].into();
    assert!(optimize(&others, 10.0, 5, 3, &protected).unwrap().is_none());
}

#[test]
fn configured_aliases_map_custom_headers() {
    let file = write_csv("Nome,Agua,Lucro\nX-1,12.5,300\nX-2,7.5,-20\n");
    let data = DataConfig {
        extra_well_columns: vec!["Nome".into()],
        extra_flow_columns: vec!["agua".into()],
        extra_profit_columns: vec!["LUCRO".into()],
        ..Default::default()
    };

    assert!(matches!(
        WellTable::load(file.path()),
        Err(LoadError::MissingColumn { column: "well", .. })
    ));

    let table = WellTable::load_with(file.path(), &ColumnAliases::from_config(&data)).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.wells()[1].profit_usd_d, -20.0);
}

#[test]
fn bad_row_reports_line_number() {
    let file = write_csv("Well,Water Flow,Daily Profit\nA,1,1\n\nB,2,x\n");
    match WellTable::load(file.path()) {
        Err(LoadError::InvalidNumber { line, column, value }) => {
            assert_eq!(line, 4);
            assert_eq!(column, "Daily Profit");
            assert_eq!(value, "x");
        }
        other => panic!("expected InvalidNumber, got {other:?}"),
    }
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        WellTable::load(dir.path().join("absent.csv")),
        Err(LoadError::Io(_))
    ));
}
