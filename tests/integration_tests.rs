//! Integration tests for csv-explorer

use csv_explorer::{
    Cell, CleaningRules, Delimiter, Detector, ExplorerError, ExportFormat, Filter, RowAction,
    SampleSize, Session, Table, Upload, clean, describe, export, load_path, load_upload,
    parse_table, summarize,
};
use encoding_rs::{UTF_8, WINDOWS_1252};
use std::io::Write;
use tempfile::NamedTempFile;

const CATALOG: &str = "\
TÍTULO,GÉNERO,PLATAFORMA,AÑO,PRECIO,MEDIA,NOTAS
 zelda ,aventura,switch,2017,59.99,9.7,obra maestra
 zelda ,aventura,switch,2017,59.99,9.7,obra maestra
Mario Odyssey,plataformas,Switch,2017,49.99,9.3,
Hades,roguelike, PC ,2020,24.5,abc,indie
Celeste,plataformas,pc,,19.99,8.8,\"difícil, pero justo\"
";

fn upload(text: &str) -> Upload {
    Upload::new("juegos.csv", text.as_bytes().to_vec())
}

fn open(text: &str) -> Session {
    Session::open_upload(&upload(text), &Detector::new(), &CleaningRules::default()).unwrap()
}

fn text(s: &str) -> Cell {
    Cell::Text(s.to_string())
}

#[test]
fn test_delimiter_is_comma_iff_strictly_more_commas() {
    let lines = [
        ("a,b,c", b','),
        ("a;b;c", b';'),
        ("a,b;c", b';'),
        ("a,b,c;d", b','),
        ("a", b';'),
        ("", b';'),
        ("\"x,y\";b", b';'),
        ("\"x;y;z\",b,c", b';'),
    ];
    for (line, expected) in lines {
        let data = format!("{line}\n1,2;3\n");
        let detection = Detector::new().detect_bytes(data.as_bytes()).unwrap();
        assert_eq!(
            detection.delimiter.as_byte(),
            expected,
            "first line {line:?}"
        );
    }
}

#[test]
fn test_clean_catalog() {
    let session = open(CATALOG);
    let table = session.table();

    assert_eq!(table.num_rows(), 4);
    assert_eq!(table.num_columns(), 7);
    assert_eq!(
        table.rows()[0],
        vec![
            text("ZELDA"),
            text("AVENTURA"),
            text("SWITCH"),
            Cell::Number(2017.0),
            Cell::Number(59.99),
            Cell::Number(9.7),
            text("obra maestra"),
        ]
    );
    // MEDIA "abc" degrades to missing, NOTAS passes through untouched
    assert_eq!(table.rows()[2][5], Cell::Missing);
    assert_eq!(table.rows()[2][2], text("PC"));
    assert_eq!(table.rows()[3][3], Cell::Missing);
    assert_eq!(table.rows()[3][6], text("difícil, pero justo"));
}

#[test]
fn test_clean_is_idempotent() {
    let session = open(CATALOG);
    let once = session.table().clone();
    let twice = CleaningRules::default().clean(once.clone().into_table());
    assert_eq!(once, twice);
}

#[test]
fn test_dedup_keeps_first_occurrence() {
    let parsed = parse_table("a,b\nA,1\nA,1\nB,2\n", Delimiter::Comma).unwrap();
    let cleaned = clean(parsed.table);
    assert_eq!(
        cleaned.rows(),
        vec![vec![text("A"), text("1")], vec![text("B"), text("2")]]
    );
}

#[test]
fn test_latin1_semicolon_upload_via_fallback() {
    let bytes = b"T\xCDTULO;A\xD1O;PRECIO\n\"Foo\";2019;19,99\n".to_vec();
    let mut detector = Detector::new();
    detector.encoding(UTF_8);

    let session = Session::open_upload(
        &Upload::new("latin1.csv", bytes),
        &detector,
        &CleaningRules::default(),
    )
    .unwrap();

    let detection = session.detection();
    assert_eq!(detection.delimiter, Delimiter::Semicolon);
    assert!(detection.used_fallback());
    assert_eq!(detection.encoding, WINDOWS_1252);

    let table = session.table();
    assert_eq!(table.headers(), vec!["TÍTULO", "AÑO", "PRECIO"]);
    assert_eq!(
        table.rows(),
        vec![vec![text("FOO"), Cell::Number(2019.0), Cell::Missing]]
    );
}

#[test]
fn test_latin1_semicolon_upload_detected() {
    let bytes = b"T\xCDTULO;A\xD1O;PRECIO\n\"Foo\";2019;19,99\n".to_vec();
    let loaded = load_upload(&Upload::new("latin1.csv", bytes), &Detector::new()).unwrap();

    assert_eq!(loaded.detection.delimiter, Delimiter::Semicolon);
    assert_eq!(loaded.detection.encoding, WINDOWS_1252);
    assert_eq!(loaded.table.headers(), vec!["TÍTULO", "AÑO", "PRECIO"]);
    assert_eq!(loaded.table.rows()[0][0], text("Foo"));

    let cleaned = clean(loaded.table);
    assert_eq!(
        cleaned.rows(),
        vec![vec![text("FOO"), Cell::Number(2019.0), Cell::Missing]]
    );
}

#[test]
fn test_path_and_upload_converge() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(CATALOG.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let from_path = load_path(temp_file.path(), &Detector::new()).unwrap();
    let from_upload = load_upload(&upload(CATALOG), &Detector::new()).unwrap();

    assert_eq!(from_path.table, from_upload.table);
    assert_eq!(from_path.detection, from_upload.detection);
}

#[test]
fn test_path_falls_back_when_bad_bytes_follow_sample() {
    let mut data = b"TITULO,PRECIO\n".to_vec();
    while data.len() < 12_000 {
        data.extend_from_slice(b"juego,10\n");
    }
    data.extend_from_slice(b"caf\xE9,5\n");

    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(&data).unwrap();
    temp_file.flush().unwrap();

    let session = Session::open_path(
        temp_file.path(),
        &Detector::new(),
        &CleaningRules::default(),
    )
    .unwrap();

    assert!(session.detection().used_fallback());
    assert_eq!(session.detection().delimiter, Delimiter::Comma);
    let last = session.table().rows().last().unwrap();
    assert_eq!(last[0], text("café"));
}

#[test]
fn test_full_buffer_detection_for_uploads() {
    // A tiny sample would only see ASCII; uploads always look at everything.
    let mut detector = Detector::new();
    detector.sample_size(SampleSize::Bytes(4));
    let loaded = load_upload(
        &Upload::new("x.csv", b"a,b\nx,\xE9\n".to_vec()),
        &detector,
    )
    .unwrap();
    assert_ne!(loaded.detection.primary, UTF_8);
}

#[test]
fn test_malformed_rows_are_reported() {
    let session = open("a,b\n1,2\n3,4,5\n6\n");
    assert_eq!(session.table().num_rows(), 2);

    let malformed = session.malformed();
    assert_eq!(malformed.len(), 2);
    assert_eq!(malformed[0].line, 3);
    assert_eq!(malformed[0].action, RowAction::Skipped);
    assert_eq!(malformed[1].line, 4);
    assert_eq!(malformed[1].action, RowAction::Padded);
}

#[test]
fn test_missing_default_file_is_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("base_productos.csv");

    let err = Session::open_path(&path, &Detector::new(), &CleaningRules::default()).unwrap_err();
    assert!(matches!(err, ExplorerError::Load { .. }));
    assert!(err.to_string().contains("base_productos.csv"));
}

#[test]
fn test_upload_requires_csv_extension() {
    let err = Session::open_upload(
        &Upload::new("juegos.txt", b"a,b\n".to_vec()),
        &Detector::new(),
        &CleaningRules::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ExplorerError::UnsupportedUpload(_)));
}

#[test]
fn test_upload_decode_error_surfaces() {
    let mut detector = Detector::new();
    detector.encoding(UTF_8).fallback_encoding(UTF_8);

    let err = Session::open_upload(
        &Upload::new("x.csv", b"a,b\n\xFF,1\n".to_vec()),
        &detector,
        &CleaningRules::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ExplorerError::Decode { .. }));
}

#[test]
fn test_csv_export_round_trip() {
    let session = open(CATALOG);
    let bytes = session.export(ExportFormat::Csv).unwrap();

    let reloaded = load_upload(&Upload::new("export.csv", bytes), &Detector::new()).unwrap();
    assert_eq!(reloaded.detection.delimiter, Delimiter::Comma);
    assert_eq!(reloaded.table.headers(), session.table().headers());
    assert_eq!(reloaded.table.num_rows(), session.table().num_rows());

    let recleaned = CleaningRules::default().clean(reloaded.table);
    assert_eq!(&recleaned, session.table());
}

#[test]
fn test_negative_zero_survives_csv_round_trip() {
    let session = open("PRECIO\n-0\n");
    assert_eq!(session.table().rows(), vec![vec![Cell::Number(-0.0)]]);

    let bytes = session.export(ExportFormat::Csv).unwrap();
    assert_eq!(String::from_utf8(bytes.clone()).unwrap(), "PRECIO\n-0\n");

    let reloaded = load_upload(&Upload::new("export.csv", bytes), &Detector::new()).unwrap();
    let recleaned = CleaningRules::default().clean(reloaded.table);
    assert_eq!(&recleaned, session.table());
}

#[test]
fn test_hand_built_tables_keep_header_width() {
    let headers = vec!["TÍTULO".to_string(), "AÑO".to_string(), "GÉNERO".to_string()];
    let table = Table::from_rows(
        headers,
        vec![
            vec![text("x")],
            vec![text("y"), text("2020"), text("rpg"), text("extra")],
        ],
    );
    assert!(table.rows().iter().all(|row| row.len() == 3));

    let cleaned = clean(table);
    assert_eq!(
        cleaned.rows(),
        vec![
            vec![text("X"), Cell::Missing, Cell::Missing],
            vec![text("Y"), Cell::Number(2020.0), text("RPG")],
        ]
    );

    let mut filter = Filter::new();
    filter.genre("RPG");
    assert_eq!(filter.apply(&cleaned).num_rows(), 1);
    assert_eq!(summarize(&cleaned).missing, 2);
    assert_eq!(describe(&cleaned).len(), 3);
    assert!(export(&cleaned, ExportFormat::Json).is_ok());
}

#[test]
fn test_parse_export_preserves_shape() {
    let parsed = parse_table("x;y;z\n1;;a b\n2;3;\n", Delimiter::Semicolon).unwrap();
    let bytes = export(&parsed.table, ExportFormat::Csv).unwrap();
    let text = String::from_utf8(bytes).unwrap();

    let reparsed = parse_table(&text, Delimiter::Comma).unwrap();
    assert_eq!(reparsed.table, parsed.table);
}

#[test]
fn test_json_export() {
    let session = open(CATALOG);
    let bytes = session.export(ExportFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    let rows = value.as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["TÍTULO"], "ZELDA");
    assert_eq!(rows[0]["AÑO"], 2017);
    assert_eq!(rows[0]["PRECIO"], 59.99);
    assert!(rows[3]["AÑO"].is_null());
}

#[cfg(feature = "xlsx")]
#[test]
fn test_xlsx_export() {
    let session = open(CATALOG);
    let bytes = session.export(ExportFormat::Xlsx).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn test_filters_on_session() {
    let session = open(CATALOG);

    let mut filter = Filter::new();
    filter.platform("SWITCH");
    assert_eq!(session.filter(&filter).num_rows(), 2);

    let mut filter = Filter::new();
    filter.genre("PLATAFORMAS");
    // Celeste has no year, so only Mario survives the implicit year range
    let view = session.filter(&filter);
    assert_eq!(view.num_rows(), 1);
    assert_eq!(view.rows()[0][0], text("MARIO ODYSSEY"));

    let options = session.filter_options();
    assert_eq!(options.genres, vec!["AVENTURA", "PLATAFORMAS", "ROGUELIKE"]);
    assert_eq!(options.platforms, vec!["PC", "SWITCH"]);
    assert_eq!(options.years, Some((2017, 2020)));
}

#[test]
fn test_summary_metrics() {
    let session = open(CATALOG);
    let summary = session.summary();

    assert_eq!(summary.rows, 4);
    assert_eq!(summary.latest_year, Some(2020));
    let average = summary.average_price.unwrap();
    assert!((average - (59.99 + 49.99 + 24.5 + 19.99) / 4.0).abs() < 1e-9);
    // NOTAS empty once, MEDIA "abc", AÑO empty once
    assert_eq!(summary.missing, 3);

    let platforms = session.value_counts("PLATAFORMA", Some(10)).unwrap();
    assert_eq!(platforms, vec![(text("SWITCH"), 2), (text("PC"), 2)]);
}
