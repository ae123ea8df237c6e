//! Unit tests for the statistics types

use crate::models::MailType;

use super::*;

#[test]
fn test_month_names_cover_the_year() {
    assert_eq!(MONTH_NAMES.len(), 12);
    assert_eq!(MONTH_NAMES[0], "Janvier");
    assert_eq!(MONTH_NAMES[2], "Mars");
    assert_eq!(MONTH_NAMES[11], "Décembre");
}

#[test]
fn test_new_stats_zeroes_every_type() {
    let stats = MailStats::new("Mars", 2024);
    assert_eq!(stats.by_type.len(), 5);
    for mail_type in MailType::all() {
        assert_eq!(stats.by_type[&mail_type], 0);
    }
}

#[test]
fn test_stats_serialize_with_document_field_names() {
    let stats = MailStats::new("Mars", 2024);
    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["month"], "Mars");
    assert_eq!(json["incomingCount"], 0);
    assert_eq!(json["outgoingCount"], 0);
    // Histogram keys are the classification strings
    assert_eq!(json["byType"]["Administrative"], 0);
}

#[test]
fn test_trend_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&Trend::Up).unwrap(), "\"up\"");
    assert_eq!(serde_json::to_string(&Trend::Stable).unwrap(), "\"stable\"");
}

#[test]
fn test_negative_growth_renders_without_plus_sign() {
    let report = PerformanceReport {
        average_response_days: 4,
        efficiency_rate: 50,
        monthly_growth: -20,
        this_month_count: 4,
        last_month_count: 5,
        answered_count: 2,
    };
    let rows = report.metric_rows();
    assert_eq!(rows[2].value, "-20%");
    assert_eq!(rows[2].trend, Trend::Down);
    assert_eq!(rows[0].trend, Trend::Down);
}
