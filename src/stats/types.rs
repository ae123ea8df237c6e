//! Statistics type definitions

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{IncomingMail, MailType, OutgoingMail};

/// French month names, indexed by zero-based month
pub const MONTH_NAMES: [&str; 12] = [
    "Janvier",
    "Février",
    "Mars",
    "Avril",
    "Mai",
    "Juin",
    "Juillet",
    "Août",
    "Septembre",
    "Octobre",
    "Novembre",
    "Décembre",
];

/// Counts for one (year, month) group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailStats {
    /// French month name
    pub month: String,
    pub year: i32,
    pub incoming_count: u32,
    pub outgoing_count: u32,
    /// Classification histogram, fed by incoming mail only
    pub by_type: HashMap<MailType, u32>,
}

impl MailStats {
    /// Empty group for a (year, month) pair, histogram zeroed for every type
    pub fn new(month: &str, year: i32) -> Self {
        Self {
            month: month.to_string(),
            year,
            incoming_count: 0,
            outgoing_count: 0,
            by_type: MailType::all().into_iter().map(|t| (t, 0)).collect(),
        }
    }
}

/// One bar-chart row, serialized with the series names the charts expect
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChartRow {
    /// "<Mois> <année>"
    pub name: String,
    #[serde(rename = "Courriers Entrants")]
    pub incoming: u32,
    #[serde(rename = "Courriers Départs")]
    pub outgoing: u32,
}

/// Aggregates displayed on the landing dashboard
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_incoming: u32,
    pub total_outgoing: u32,
    /// Incoming mail still pending or in processing
    pub pending: u32,
    /// Incoming mail marked completed
    pub processed: u32,
    pub pending_outgoing: u32,
    pub recent_incoming: Vec<IncomingMail>,
    pub recent_outgoing: Vec<OutgoingMail>,
    /// Derived lateness, independent of any stored `Overdue` status
    pub overdue_mails: Vec<IncomingMail>,
}

/// Direction of a performance indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

/// Labelled indicator row for the statistics page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetric {
    pub label: String,
    pub value: String,
    pub trend: Trend,
    pub description: String,
}

/// Raw performance indicators computed from the collections
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    /// Mean days between registration and response, unanswered mail
    /// counting for the 3-day default
    pub average_response_days: i64,
    /// Share of all mail handled this month, in percent
    pub efficiency_rate: i64,
    /// Month-over-month volume change, in percent (signed)
    pub monthly_growth: i64,
    pub this_month_count: u32,
    pub last_month_count: u32,
    /// Incoming mail that actually carries a response date
    pub answered_count: u32,
}

impl PerformanceReport {
    /// The labelled rows shown on the statistics page
    pub fn metric_rows(&self) -> Vec<PerformanceMetric> {
        vec![
            PerformanceMetric {
                label: "Temps de réponse moyen".to_string(),
                value: format!("{} jours", self.average_response_days),
                trend: if self.average_response_days <= 3 {
                    Trend::Up
                } else {
                    Trend::Down
                },
                description: format!("Basé sur {} courriers traités", self.answered_count),
            },
            PerformanceMetric {
                label: "Taux d'efficacité".to_string(),
                value: format!("{}%", self.efficiency_rate),
                trend: if self.this_month_count >= self.last_month_count {
                    Trend::Up
                } else {
                    Trend::Down
                },
                description: "Ratio courriers traités ce mois".to_string(),
            },
            PerformanceMetric {
                label: "Croissance mensuelle".to_string(),
                value: format!(
                    "{}{}%",
                    if self.monthly_growth >= 0 { "+" } else { "" },
                    self.monthly_growth
                ),
                trend: if self.monthly_growth >= 0 {
                    Trend::Up
                } else {
                    Trend::Down
                },
                description: "Évolution par rapport au mois dernier".to_string(),
            },
        ]
    }
}
