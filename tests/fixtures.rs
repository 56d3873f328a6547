use envtab::{EnvReader, EnvSource, EnvTable};

fn read_fixture(content: &str) -> EnvTable {
    EnvReader::new()
        .env_source(EnvSource::memory())
        .read_str(content)
}

#[test]
fn parses_basic_fixture() {
    let table = read_fixture(include_str!("fixtures/basic.env"));

    assert_eq!(table.len(), 9);
    assert_eq!(table.get::<String>("APP_NAME").expect("APP_NAME"), "demo");
    assert_eq!(
        table.get::<String>("APP_LABEL").expect("APP_LABEL"),
        "Demo App"
    );
    assert_eq!(table.get::<String>("EMPTY").expect("EMPTY"), "");
    assert_eq!(table.get::<String>("INLINE").expect("INLINE"), "value");
    assert_eq!(
        table.get::<String>("QUOTED_HASH").expect("QUOTED_HASH"),
        "a#b"
    );
    assert_eq!(
        table.get::<String>("SINGLE").expect("SINGLE"),
        "keep ${APP_NAME} raw"
    );
    assert!(table.get::<bool>("DEBUG").expect("DEBUG"));
    assert_eq!(table.get::<i64>("WORKERS").expect("WORKERS"), 3);
    assert_eq!(table.get::<f64>("RATIO").expect("RATIO"), 0.75);
    assert!(!table.contains("9BAD"));
}

#[test]
fn parses_multiline_fixture() {
    let table = read_fixture(include_str!("fixtures/multiline.env"));

    assert_eq!(table.len(), 3);
    assert_eq!(
        table.get::<String>("CERT").expect("CERT"),
        "-----BEGIN PUBLIC KEY-----\nLINE1\nLINE2\n-----END PUBLIC KEY-----"
    );
    assert_eq!(table.get::<String>("AFTER").expect("AFTER"), "after_line");
    assert_eq!(table.get::<String>("TICKED").expect("TICKED"), "first\nsecond");
}

#[test]
fn parses_interpolation_fixture() {
    let table = read_fixture(include_str!("fixtures/interpolation.env"));

    assert_eq!(table.get::<String>("BIN").expect("BIN"), "/opt/app/bin");
    assert_eq!(
        table.get::<String>("FROM_BARE").expect("FROM_BARE"),
        "/opt/app and more"
    );
    assert_eq!(
        table.get::<String>("MISSING_DASH").expect("MISSING_DASH"),
        "default-one"
    );
    assert_eq!(table.get::<String>("KEPT_EMPTY").expect("KEPT_EMPTY"), "");
    assert_eq!(table.get::<String>("FILLED").expect("FILLED"), "fallback");
    assert_eq!(table.get::<String>("LITERAL").expect("LITERAL"), "${BASE}");
}
