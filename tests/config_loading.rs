//! Configuration file loading and precedence tests

use chrono::NaiveDate;
use pool_revenue_calc::config::{Config, LogFormat};
use pool_revenue_calc::{DisplayUnit, FormulaType, Granularity, PayoutModel};
use std::io::Write;
use tempfile::NamedTempFile;
use tokio_test::{assert_err, assert_ok};

fn temp_config(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

#[tokio::test]
async fn test_yaml_file_fills_unset_values() {
    let file = temp_config(
        ".yaml",
        r#"
offline: true
network_hashrate: "500EH"
avg_block_fees: 0.0
hashrate: "1.5EH"
pool_fee: 2.5
payout_model: pps
granularity: weekly
start_date: 2025-01-01
end_date: 2025-06-30
display_unit: sats
log_format: json
"#,
    );
    let path = file.path().to_string_lossy().to_string();

    let config = assert_ok!(Config::load_from(["pool-revenue-calc", "--config-file", &path]).await);

    assert!(config.offline);
    assert_eq!(config.pool_hashrate().unwrap().value(), 1.5e18);
    assert_eq!(config.pool_fee, 2.5);
    assert_eq!(config.payout_model, PayoutModel::PpsPlus);
    assert_eq!(config.granularity, Granularity::Weekly);
    assert_eq!(config.display_unit, DisplayUnit::Sats);
    assert_eq!(config.log_format, LogFormat::Json);
    assert_eq!(
        config.date_range().unwrap(),
        (
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
        )
    );
}

#[tokio::test]
async fn test_json_file_by_extension() {
    let file = temp_config(
        ".json",
        r#"{"formula": "difficulty", "pool_growth": 5.0, "network_growth": 3.0, "horizon_months": 3}"#,
    );
    let path = file.path().to_string_lossy().to_string();

    let config = Config::load_from([
        "pool-revenue-calc",
        "--config-file",
        &path,
        "--start-date",
        "2025-01-01",
    ])
    .await
    .unwrap();

    assert_eq!(config.formula, FormulaType::Difficulty);
    assert_eq!(config.pool_growth, 5.0);
    assert_eq!(config.network_growth, 3.0);
    assert_eq!(
        config.date_range().unwrap().1,
        NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
    );
}

#[tokio::test]
async fn test_explicit_flags_beat_file() {
    let file = temp_config(".yml", "pool_fee: 4\ngranularity: daily\npage_size: 30\n");
    let path = file.path().to_string_lossy().to_string();

    let config = Config::load_from([
        "pool-revenue-calc",
        "--config-file",
        &path,
        "--granularity",
        "monthly",
    ])
    .await
    .unwrap();

    assert_eq!(config.granularity, Granularity::Monthly);
    assert_eq!(config.pool_fee, 4.0);
    assert_eq!(config.page_size, 30);
}

#[tokio::test]
async fn test_invalid_file_values_are_rejected() {
    let file = temp_config(".yaml", "pool_fee: -3\n");
    let path = file.path().to_string_lossy().to_string();
    assert_err!(Config::load_from(["pool-revenue-calc", "--config-file", &path]).await);

    let file = temp_config(".yaml", "granularity: hourly\n");
    let path = file.path().to_string_lossy().to_string();
    let err = assert_err!(Config::load_from(["pool-revenue-calc", "--config-file", &path]).await);
    assert_eq!(err.category(), "yaml");
}

#[tokio::test]
async fn test_missing_file_is_io_error() {
    let err = Config::load_from([
        "pool-revenue-calc",
        "--config-file",
        "/nonexistent/pool-revenue.yaml",
    ])
    .await
    .unwrap_err();
    assert_eq!(err.category(), "io");
}

#[tokio::test]
async fn test_unknown_flag_is_config_error() {
    let err = Config::load_from(["pool-revenue-calc", "--thread-count", "4"])
        .await
        .unwrap_err();
    assert_eq!(err.category(), "config");
}
