//! Defaults and parsing behaviour of the shared configuration.

use std::str::FromStr;

use rstest::rstest;

use qpbridge_config::{
    CaptureConfig, Config, DEFAULT_LOG_FILTER, HostLogLevel, LogFormat, default_log_format,
};

#[test]
fn default_config_captures_both_channels() {
    let config = Config::default();
    assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
    assert_eq!(config.log_format(), default_log_format());
    assert_eq!(config.host_log_level(), HostLogLevel::Info);
    assert!(config.capture().capture_primary);
    assert!(config.capture().capture_error);
}

#[test]
fn partial_json_falls_back_to_defaults() {
    let config: Config = serde_json::from_str(
        r#"{ "log_format": "compact", "capture": { "capture_primary": false } }"#,
    )
    .expect("config should deserialize");

    assert_eq!(config.log_format(), LogFormat::Compact);
    assert_eq!(config.log_filter(), DEFAULT_LOG_FILTER);
    assert_eq!(config.capture(), CaptureConfig::error_only());
}

#[test]
fn config_round_trips_through_json() {
    let config = Config {
        log_filter: String::from("qupath=debug"),
        log_format: LogFormat::Compact,
        host_log_level: HostLogLevel::Warn,
        capture: CaptureConfig::primary_only(),
    };
    let encoded = serde_json::to_string(&config).expect("config should serialize");
    let decoded: Config = serde_json::from_str(&encoded).expect("config should deserialize");
    assert_eq!(decoded, config);
}

#[rstest]
#[case("json", LogFormat::Json)]
#[case("COMPACT", LogFormat::Compact)]
fn parses_log_format_case_insensitively(#[case] raw: &str, #[case] expected: LogFormat) {
    assert_eq!(LogFormat::from_str(raw).expect("format should parse"), expected);
}

#[rstest]
#[case("debug", HostLogLevel::Debug)]
#[case("Info", HostLogLevel::Info)]
#[case("WARN", HostLogLevel::Warn)]
#[case("error", HostLogLevel::Error)]
fn parses_host_log_level(#[case] raw: &str, #[case] expected: HostLogLevel) {
    assert_eq!(
        HostLogLevel::from_str(raw).expect("level should parse"),
        expected
    );
}

#[test]
fn rejects_unknown_host_log_level() {
    assert!(HostLogLevel::from_str("verbose").is_err());
}

#[rstest]
#[case(CaptureConfig::both(), false)]
#[case(CaptureConfig::primary_only(), false)]
#[case(CaptureConfig::error_only(), false)]
#[case(CaptureConfig { capture_primary: false, capture_error: false }, true)]
fn reports_empty_channel_selection(#[case] config: CaptureConfig, #[case] empty: bool) {
    assert_eq!(config.is_empty(), empty);
}
